//! Integration tests for the launch → exit → restart → restore cycle
//!
//! Each "run" builds a fresh NavigationManager and AppController over the same data
//! directory, the way the supervisor restarts the process after an emulator exits.

use camino::Utf8PathBuf;
use romfront::metrics::Metrics;
use romfront::models::{LaunchLocation, RomFile};
use romfront::services::{
    BgmManager, LaunchCommand, LaunchError, Launcher, PersistenceManager, ProcessRunner,
};
use romfront::ui::{AppServices, FrameOutcome, SplashScreen};
use romfront::{AppController, AppState, LauncherConfig, NavigationManager, SessionBridge};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

struct InstantRunner;

impl ProcessRunner for InstantRunner {
    async fn run(&self, _command: &LaunchCommand) -> Result<(), LaunchError> {
        Ok(())
    }
}

struct Device {
    temp_dir: TempDir,
}

impl Device {
    fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("roms/FC/Platformers")).unwrap();
        fs::write(temp_dir.path().join("roms/FC/Platformers/mario.nes"), b"NES").unwrap();
        Self { temp_dir }
    }

    fn path(&self, relative: &str) -> Utf8PathBuf {
        Utf8PathBuf::try_from(self.temp_dir.path().join(relative)).unwrap()
    }

    fn persistence(&self) -> PersistenceManager {
        PersistenceManager::new(self.path("data"), 50)
    }

    fn config(&self) -> LauncherConfig {
        LauncherConfig::parse(&format!(
            "ROM_BASE={}\nTYPE_RA=/opt/ra/retroarch.sh\n-TITLE=NES\n-DIR=FC\n-EXT=nes\n-CORE=nestopia,fceumm\n",
            self.path("roms")
        ))
    }

    /// Fresh process: restore the session and show a one-frame splash.
    fn boot(&self) -> AppController<InstantRunner> {
        let nav = NavigationManager::new();
        let persistence = self.persistence();
        SessionBridge::restore(&nav, &persistence);

        let mut controller = AppController::new(AppServices {
            nav,
            config: self.config(),
            persistence,
            launcher: Launcher::new(InstantRunner, "/opt/romfront"),
            bgm: BgmManager::new(self.path("bgm"), "/nonexistent/player {track}"),
            metrics: Arc::new(Metrics::new()),
        });
        controller.register_screen(Box::new(SplashScreen::new(1)));
        controller
    }
}

#[tokio::test]
async fn test_first_run_lands_on_main_menu() {
    let device = Device::new();
    let mut controller = device.boot();

    assert_eq!(controller.tick().await, FrameOutcome::Continue);
    assert_eq!(controller.nav().current_state(), AppState::MainMenu);
    assert!(controller.nav().history().is_empty());
}

#[tokio::test]
async fn test_launch_then_restart_restores_file_list() {
    let device = Device::new();
    let rom = RomFile::file(device.path("roms/FC/Platformers/mario.nes"), 3);

    // First run: browse into a subdirectory of NES and launch
    let mut controller = device.boot();
    controller.tick().await;
    let nav = controller.nav();
    nav.set_selected_category(Some("NES".to_string()));
    nav.change_state(AppState::FileList, true);
    nav.save_category_position("NES", 4, 2);
    nav.request_launch(
        rom.clone(),
        "NES",
        LaunchLocation {
            subdirectory: "Platformers".to_string(),
            directory_stack: vec![String::new()],
            selected_index: 1,
            scroll_offset: 0,
        },
    );

    assert_eq!(controller.tick().await, FrameOutcome::Continue);
    assert_eq!(controller.tick().await, FrameOutcome::ExitForRestart);
    drop(controller);

    // Second run: splash hands over to the file list, back leads to the main menu
    let mut controller = device.boot();
    assert_eq!(controller.nav().current_state(), AppState::Splash);
    controller.tick().await;

    let nav = controller.nav();
    assert_eq!(nav.current_state(), AppState::FileList);
    assert_eq!(nav.history(), vec![AppState::MainMenu]);
    assert_eq!(nav.selected_category().as_deref(), Some("NES"));
    assert_eq!(nav.category_position("NES").index, 4);

    let location = nav.launch_location().unwrap();
    assert_eq!(location.subdirectory, "Platformers");
    assert_eq!(location.selected_index, 1);

    assert!(nav.go_back());
    assert_eq!(nav.current_state(), AppState::MainMenu);

    // The second run remembers the core used for the ROM
    assert_eq!(
        controller.persistence().last_core(rom.path.as_str()).as_deref(),
        Some("nestopia")
    );
}

#[tokio::test]
async fn test_quit_from_settings_restores_settings() {
    let device = Device::new();

    let mut controller = device.boot();
    controller.tick().await;
    controller.nav().change_state(AppState::Settings, true);
    controller.request_quit();
    assert_eq!(controller.tick().await, FrameOutcome::Quit);
    drop(controller);

    let mut controller = device.boot();
    controller.tick().await;
    assert_eq!(controller.nav().current_state(), AppState::Settings);
    // Only the file list gets a synthetic back-stack
    assert!(controller.nav().history().is_empty());
}

#[test]
fn test_session_file_shape() {
    let device = Device::new();
    let persistence = device.persistence();
    let nav = NavigationManager::new();
    nav.change_state(AppState::Recent, false);
    nav.set_selected_category(Some("NES".to_string()));

    assert!(SessionBridge::save(&nav, &persistence));

    let raw = fs::read_to_string(device.path("data/session.json")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(json["current_state"], "recent");
    assert_eq!(json["selected_category"], "NES");
    assert!(json["launch_subdirectory"].is_null());
}

#[test]
fn test_unknown_state_is_treated_as_first_run() {
    let device = Device::new();
    let persistence = device.persistence();
    fs::write(
        device.path("data/session.json"),
        r#"{"current_state": "retro_achievements", "selected_category": "NES"}"#,
    )
    .unwrap();

    let nav = NavigationManager::new();
    assert!(!SessionBridge::restore(&nav, &persistence));
    assert_eq!(SessionBridge::finish_splash(&nav), AppState::MainMenu);
}
