// App Controller - drives screens, launches and background music once per frame
//
// This module contains the AppController which coordinates between:
// - NavigationManager (current screen, scratch data)
// - the registered Screens (one active at a time)
// - Launcher (emulator process supervision)
// - BgmManager and PersistenceManager
//
// It handles:
// - Activating the screen for the current state
// - Deferred BGM initialization after the splash screen
// - Turning launch requests into supervised emulator runs
// - Saving the session before every intentional exit

use crate::config::LauncherConfig;
use crate::metrics::Metrics;
use crate::models::AppState;
use crate::services::{
    BackgroundMusic, BgmManager, Launcher, PersistenceManager, ProcessRunner, TokioProcessRunner,
};
use crate::state::{NavigationManager, SessionBridge};
use crate::ui::{Notice, Screen, ScreenContext};
use indexmap::IndexMap;
use std::sync::Arc;

/// Frames the "Launching..." notice is shown for.
const LAUNCH_NOTICE_FRAMES: u32 = 90;

/// Frames a launch failure notice is shown for.
const ERROR_NOTICE_FRAMES: u32 = 120;

/// What the main loop should do after a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Continue,
    /// An emulator ran successfully. The session is saved and the process should exit
    /// so the device supervisor restarts it.
    ExitForRestart,
    /// The user quit. The session is saved.
    Quit,
}

/// Services the controller needs, constructed by the caller.
pub struct AppServices<R = TokioProcessRunner> {
    pub nav: NavigationManager,
    pub config: LauncherConfig,
    pub persistence: PersistenceManager,
    pub launcher: Launcher<R>,
    pub bgm: BgmManager,
    pub metrics: Arc<Metrics>,
}

/// Frame-loop coordinator
///
/// Each call to [`tick`](Self::tick) is one frame:
/// 1. BGM is initialized on the first frame after the splash, then polled for track end
/// 2. A launch requested on the previous frame is run (blocking until the emulator exits)
/// 3. A newly requested launch is armed and a "Launching..." notice shown
/// 4. Otherwise the screen for the current state is activated if needed and updated
///
/// # Example
/// ```ignore
/// let mut controller = AppController::new(services);
/// controller.register_screen(Box::new(SplashScreen::for_duration(3, 30)));
///
/// loop {
///     interval.tick().await;
///     if controller.tick().await != FrameOutcome::Continue {
///         break;
///     }
/// }
/// ```
pub struct AppController<R = TokioProcessRunner> {
    nav: NavigationManager,
    config: LauncherConfig,
    persistence: PersistenceManager,
    launcher: Launcher<R>,
    bgm: BgmManager,
    metrics: Arc<Metrics>,

    screens: IndexMap<AppState, Box<dyn Screen>>,
    /// State whose screen is currently active
    active_state: Option<AppState>,
    notice: Notice,

    /// Set on the frame a launch request is noticed; the launch runs next frame
    launch_armed: bool,
    bgm_initialized: bool,
    quit_requested: bool,
}

impl<R: ProcessRunner> AppController<R> {
    pub fn new(services: AppServices<R>) -> Self {
        tracing::info!(
            "App controller initialized with {} categories",
            services.config.category_count()
        );

        Self {
            nav: services.nav,
            config: services.config,
            persistence: services.persistence,
            launcher: services.launcher,
            bgm: services.bgm,
            metrics: services.metrics,
            screens: IndexMap::new(),
            active_state: None,
            notice: Notice::new(),
            launch_armed: false,
            bgm_initialized: false,
            quit_requested: false,
        }
    }

    /// Register the screen for its state, replacing any earlier one.
    pub fn register_screen(&mut self, screen: Box<dyn Screen>) {
        let state = screen.state();
        if self.screens.insert(state, screen).is_some() {
            tracing::warn!("Replaced screen for {}", state);
        }
    }

    pub fn nav(&self) -> &NavigationManager {
        &self.nav
    }

    pub fn notice(&self) -> &Notice {
        &self.notice
    }

    pub fn bgm(&self) -> &BgmManager {
        &self.bgm
    }

    pub fn launcher(&self) -> &Launcher<R> {
        &self.launcher
    }

    pub fn persistence(&self) -> &PersistenceManager {
        &self.persistence
    }

    pub fn active_state(&self) -> Option<AppState> {
        self.active_state
    }

    /// Ask the loop to save and quit after the current frame.
    pub fn request_quit(&mut self) {
        self.quit_requested = true;
    }

    /// Run one frame.
    pub async fn tick(&mut self) -> FrameOutcome {
        self.metrics.record_frame();
        let current = self.nav.current_state();

        if !self.bgm_initialized && current != AppState::Splash {
            self.bgm_initialized = true;
            self.start_bgm();
        }
        if self.bgm_initialized {
            self.bgm.check_music_end();
        }

        self.notice.tick();

        if self.launch_armed {
            self.launch_armed = false;
            return self.handle_pending_launch().await;
        }

        if let Some((rom, _)) = self.nav.pending_launch() {
            self.launch_armed = true;
            self.notice
                .show(format!("Launching {}...", rom.name), LAUNCH_NOTICE_FRAMES);
            return FrameOutcome::Continue;
        }

        self.update_screens(current);

        if self.quit_requested {
            self.shutdown();
            return FrameOutcome::Quit;
        }

        FrameOutcome::Continue
    }

    fn start_bgm(&mut self) {
        let settings = self.persistence.load_settings();
        self.bgm.set_volume(settings.bgm_volume_fraction());
        self.bgm.set_mode(settings.bgm_mode);

        if settings.bgm_enabled.is_on() {
            tracing::debug!("Deferred BGM initialization");
            self.bgm.play();
        } else {
            self.bgm.set_enabled(false);
        }
    }

    fn update_screens(&mut self, current: AppState) {
        let mut ctx = ScreenContext {
            nav: &self.nav,
            config: &self.config,
            persistence: &self.persistence,
            notice: &mut self.notice,
            quit_requested: &mut self.quit_requested,
        };

        if self.active_state != Some(current) {
            if let Some(previous) = self.active_state.take() {
                if let Some(screen) = self.screens.get_mut(&previous) {
                    screen.deactivate(&mut ctx);
                }
                self.metrics.record_state_transition();
            }

            match self.screens.get_mut(&current) {
                Some(screen) => screen.activate(&mut ctx),
                None => tracing::debug!("No screen registered for {}", current),
            }
            self.active_state = Some(current);
        }

        if let Some(screen) = self.screens.get_mut(&current) {
            screen.update(&mut ctx);
        }
    }

    /// Launch the ROM requested through the navigation manager.
    ///
    /// Without a core override, the core last used for this ROM is reused if the
    /// category still lists it. On success the core choice, history entry and session
    /// are saved and [`FrameOutcome::ExitForRestart`] is returned. On failure a notice
    /// is shown and the app keeps running. The request is cleared either way.
    pub async fn handle_pending_launch(&mut self) -> FrameOutcome {
        let Some((rom, category_name)) = self.nav.pending_launch() else {
            self.nav.clear_pending_launch();
            return FrameOutcome::Continue;
        };

        let Some(category) = self.config.category(&category_name).cloned() else {
            tracing::error!("Launch requested for unknown category {}", category_name);
            self.notice.show(
                format!("Launch failed: Unknown category {}", category_name),
                ERROR_NOTICE_FRAMES,
            );
            self.nav.clear_pending_launch();
            return FrameOutcome::Continue;
        };

        let rom_key = rom.path.as_str();
        let core = self.nav.temp_core_override().or_else(|| {
            self.persistence
                .last_core(rom_key)
                .filter(|core| category.has_core(core))
                .inspect(|core| tracing::info!("Using last core for this ROM: {}", core))
        });

        tracing::info!("Launching: {}", rom.name);
        self.metrics.record_launch_started();

        let report = self
            .launcher
            .launch_rom(&rom, &category, &self.config, core.as_deref(), &mut self.bgm)
            .await;

        self.nav.clear_pending_launch();

        if report.success {
            let core_used = report.core_used.unwrap_or_else(|| "unknown".to_string());
            self.persistence.save_core_choice(rom_key, &core_used);
            self.persistence
                .add_to_history(rom_key, &category.name, &core_used);
            SessionBridge::save(&self.nav, &self.persistence);

            self.metrics.record_launch_succeeded(report.duration);
            tracing::info!("Emulator exited, restarting for display handover");
            FrameOutcome::ExitForRestart
        } else {
            let error = report.error.unwrap_or_else(|| "unknown error".to_string());
            self.notice
                .show(format!("Launch failed: {}", error), ERROR_NOTICE_FRAMES);
            self.metrics.record_launch_failed();
            FrameOutcome::Continue
        }
    }

    /// Deactivate the active screen, stop music and save the session.
    pub fn shutdown(&mut self) {
        if let Some(state) = self.active_state.take() {
            let mut ctx = ScreenContext {
                nav: &self.nav,
                config: &self.config,
                persistence: &self.persistence,
                notice: &mut self.notice,
                quit_requested: &mut self.quit_requested,
            };
            if let Some(screen) = self.screens.get_mut(&state) {
                screen.deactivate(&mut ctx);
            }
        }

        self.bgm.stop();
        SessionBridge::save(&self.nav, &self.persistence);
        tracing::info!("Controller shut down");
    }
}
