// UI module - screen lifecycle and the per-frame controller
//
// This module contains:
// - Screen / ScreenContext: the contract every screen implements
// - AppController: activates screens, runs launches, drives BGM each frame
// - SplashScreen: startup screen that hands over to the restored session
// - MenuItem: toggle and submenu entries for the settings menus
// - Notice: short on-screen messages

pub mod controller;
pub mod menu;
pub mod notice;
pub mod screen;
pub mod splash;

pub use controller::{AppController, AppServices, FrameOutcome};
pub use menu::MenuItem;
pub use notice::Notice;
pub use screen::{Screen, ScreenContext};
pub use splash::SplashScreen;
