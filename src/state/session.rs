//! Session snapshot save and restore.
//!
//! The launcher process exits after every successful launch and is restarted by the
//! device's supervisor script. The snapshot written right before that exit lets the
//! next run reopen the same screen, category and file list position.

use crate::models::{AppState, SessionSnapshot};
use crate::services::PersistenceManager;
use crate::state::NavigationManager;

pub struct SessionBridge;

impl SessionBridge {
    /// Build a snapshot of the current navigation context.
    ///
    /// The splash screen is recorded as the main menu.
    pub fn capture(nav: &NavigationManager) -> SessionSnapshot {
        nav.read(|ctx| {
            let current_state = match ctx.current_state {
                AppState::Splash => AppState::MainMenu,
                state => state,
            };
            let location = ctx.scratch.launch_location.as_ref();

            SessionSnapshot {
                current_state,
                selected_category: ctx.scratch.selected_category.clone(),
                category_positions: ctx.scratch.category_positions.clone(),
                launch_subdirectory: location.map(|l| l.subdirectory.clone()),
                launch_directory_stack: location.map(|l| l.directory_stack.clone()),
                launch_selected_index: location.map_or(0, |l| l.selected_index),
                launch_scroll_offset: location.map_or(0, |l| l.scroll_offset),
            }
        })
    }

    pub fn save(nav: &NavigationManager, persistence: &PersistenceManager) -> bool {
        persistence.save_session(&Self::capture(nav))
    }

    /// Load the saved session into `nav`. Returns `false` on first run.
    ///
    /// Nothing changes screens here: the restored state is stored as the post-splash
    /// state and applied by [`finish_splash`](Self::finish_splash). A restored file list
    /// gets `[main_menu]` as its history so back still works.
    pub fn restore(nav: &NavigationManager, persistence: &PersistenceManager) -> bool {
        let Some(snapshot) = persistence.load_session() else {
            tracing::info!("No saved session, starting fresh");
            return false;
        };

        nav.update(|ctx| {
            ctx.scratch.post_splash_state = Some(snapshot.current_state);
            if snapshot.current_state == AppState::FileList {
                ctx.state_history = vec![AppState::MainMenu];
            }

            ctx.scratch.category_positions = snapshot.category_positions.clone();
            if let Some(category) = snapshot.selected_category.clone().filter(|c| !c.is_empty()) {
                ctx.scratch.selected_category = Some(category);
            }
            if let Some(location) = snapshot.launch_location() {
                ctx.scratch.launch_location = Some(location);
            }
        });

        tracing::info!(
            "Session restored ({}, category: {})",
            snapshot.current_state,
            snapshot.selected_category.as_deref().unwrap_or("none")
        );
        true
    }

    /// Leave the splash screen for the restored state (or the main menu).
    ///
    /// Does not push history, and consumes the post-splash state.
    pub fn finish_splash(nav: &NavigationManager) -> AppState {
        let target = nav.post_splash_state().unwrap_or(AppState::MainMenu);
        nav.change_state(target, false);
        nav.set_post_splash_state(None);
        target
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CategoryPosition, LaunchLocation, RomFile};
    use camino::Utf8PathBuf;
    use tempfile::TempDir;

    fn persistence(temp_dir: &TempDir) -> PersistenceManager {
        let data_dir = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
        PersistenceManager::new(data_dir, 50)
    }

    #[test]
    fn test_capture_rewrites_splash() {
        let nav = NavigationManager::new();
        let snapshot = SessionBridge::capture(&nav);

        assert_eq!(snapshot.current_state, AppState::MainMenu);
        assert_eq!(snapshot.launch_subdirectory, None);
        assert_eq!(snapshot.launch_selected_index, 0);
    }

    #[test]
    fn test_capture_launch_location() {
        let nav = NavigationManager::new();
        nav.change_state(AppState::FileList, true);
        nav.request_launch(
            RomFile::file("/roms/nes/hacks/smb.nes", 0),
            "NES",
            LaunchLocation {
                subdirectory: "hacks".to_string(),
                directory_stack: vec![String::new()],
                selected_index: 4,
                scroll_offset: 2,
            },
        );

        let snapshot = SessionBridge::capture(&nav);
        assert_eq!(snapshot.current_state, AppState::FileList);
        assert_eq!(snapshot.launch_subdirectory.as_deref(), Some("hacks"));
        assert_eq!(snapshot.launch_directory_stack, Some(vec![String::new()]));
        assert_eq!(snapshot.launch_selected_index, 4);
        assert_eq!(snapshot.launch_scroll_offset, 2);
    }

    #[test]
    fn test_restore_without_session() {
        let temp_dir = TempDir::new().unwrap();
        let nav = NavigationManager::new();

        assert!(!SessionBridge::restore(&nav, &persistence(&temp_dir)));
        assert_eq!(SessionBridge::finish_splash(&nav), AppState::MainMenu);
        assert!(nav.history().is_empty());
    }

    #[test]
    fn test_restore_file_list_sets_back_history() {
        let temp_dir = TempDir::new().unwrap();
        let store = persistence(&temp_dir);

        let before = NavigationManager::new();
        before.change_state(AppState::MainMenu, false);
        before.change_state(AppState::FileList, true);
        before.set_selected_category(Some("NES".to_string()));
        before.save_category_position("NES", 7, 3);
        assert!(SessionBridge::save(&before, &store));

        let after = NavigationManager::new();
        assert!(SessionBridge::restore(&after, &store));

        // Still on the splash screen until it finishes
        assert_eq!(after.current_state(), AppState::Splash);
        assert_eq!(after.post_splash_state(), Some(AppState::FileList));

        assert_eq!(SessionBridge::finish_splash(&after), AppState::FileList);
        assert_eq!(after.history(), vec![AppState::MainMenu]);
        assert_eq!(after.selected_category(), Some("NES".to_string()));
        assert_eq!(after.category_position("NES"), CategoryPosition::new(7, 3));
        assert_eq!(after.post_splash_state(), None);

        assert!(after.go_back());
        assert_eq!(after.current_state(), AppState::MainMenu);
    }

    #[test]
    fn test_restore_settings_screen_has_no_history() {
        let temp_dir = TempDir::new().unwrap();
        let store = persistence(&temp_dir);

        let before = NavigationManager::new();
        before.change_state(AppState::Settings, true);
        SessionBridge::save(&before, &store);

        let after = NavigationManager::new();
        SessionBridge::restore(&after, &store);
        SessionBridge::finish_splash(&after);

        assert_eq!(after.current_state(), AppState::Settings);
        assert!(after.history().is_empty());
    }
}
