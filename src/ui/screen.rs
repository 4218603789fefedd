use crate::config::LauncherConfig;
use crate::models::AppState;
use crate::services::PersistenceManager;
use crate::state::NavigationManager;
use crate::ui::Notice;

/// Everything a screen may touch during a frame.
pub struct ScreenContext<'a> {
    pub nav: &'a NavigationManager,
    pub config: &'a LauncherConfig,
    pub persistence: &'a PersistenceManager,
    pub notice: &'a mut Notice,
    pub(crate) quit_requested: &'a mut bool,
}

impl ScreenContext<'_> {
    /// Save the session and leave at the end of this frame.
    pub fn request_quit(&mut self) {
        *self.quit_requested = true;
    }
}

/// One screen of the launcher, driven by [`crate::ui::AppController`].
///
/// The controller keeps exactly one screen active: the one registered for the
/// current [`AppState`]. `activate` and `deactivate` run on every switch, before the
/// first and after the last `update` of that stretch.
pub trait Screen {
    /// State this screen is shown for.
    fn state(&self) -> AppState;

    fn activate(&mut self, _ctx: &mut ScreenContext<'_>) {}

    fn deactivate(&mut self, _ctx: &mut ScreenContext<'_>) {}

    /// Called once per frame while active.
    fn update(&mut self, ctx: &mut ScreenContext<'_>);
}
