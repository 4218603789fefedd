//! Services module - launcher business logic with no UI dependencies.
//!
//! # Components
//!
//! - [`Launcher`]: resolves a ROM's core into an emulator command, runs it through a
//!   [`ProcessRunner`] and reports a [`LaunchReport`]. Stops and resumes background
//!   music around the launch.
//! - [`BgmManager`]: playlist-driven background music played by an external player
//!   process. The launcher only sees it through the [`BackgroundMusic`] trait.
//! - [`PersistenceManager`]: JSON stores for the session snapshot, play history,
//!   favorites, per-ROM core choice and user settings.
//! - [`RomScanner`]: category directory listing and name search.
//!
//! Services take everything they need as explicit parameters. They are constructed once
//! in `main` and handed to the [`crate::ui::AppController`].
//!
//! # Usage Example
//!
//! ```ignore
//! use romfront::services::{BgmManager, Launcher, TokioProcessRunner};
//!
//! let mut launcher = Launcher::new(TokioProcessRunner::default(), "/opt/romfront");
//! let mut bgm = BgmManager::new("assets/bgm", config.bgm_player());
//!
//! let report = launcher.launch_rom(&rom, &category, &config, None, &mut bgm).await;
//! if !report.success {
//!     println!("Launch failed: {}", report.error.unwrap_or_default());
//! }
//! ```

pub mod bgm;
pub mod launcher;
pub mod persistence;
pub mod rom_scanner;

pub use bgm::{BackgroundMusic, BgmError, BgmManager};
pub use launcher::{
    LaunchCommand, LaunchError, LaunchReport, Launcher, ProcessRunner, TokioProcessRunner,
};
pub use persistence::PersistenceManager;
pub use rom_scanner::{RomScanner, format_file_size};
