// romfront - ROM browser and emulator launcher for handheld devices
//
// This is the library crate containing navigation, launching and persistence.
// The binary crate (main.rs) runs the frame loop.

pub mod config;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod state;
pub mod ui;

// Re-export commonly used types for convenience
pub use config::{AppOptions, ConfigManager, LauncherConfig};
pub use models::AppState;
pub use services::Launcher;
pub use state::{NavigationManager, SessionBridge, StateChange};
pub use ui::AppController;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
