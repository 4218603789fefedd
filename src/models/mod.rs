//! Data models for romfront.
//!
//! This module contains the core data structures used throughout the application:
//! - [`AppState`]: Identifier of the active screen
//! - [`Category`] / [`RomFile`]: Launcher config categories and scanned ROM entries
//! - [`CoreSpec`]: Parsed `RA`/`SA`/custom core specification
//! - [`NavigationContext`]: Current screen, back-stack and cross-screen [`Scratch`] data
//! - [`SessionSnapshot`], [`HistoryDocument`], [`FavoritesDocument`],
//!   [`CoreHistoryDocument`], [`SettingsDocument`]: JSON documents in the data directory
//!
//! # Architecture Note
//!
//! The persisted documents derive `Serialize`/`Deserialize` and default every
//! missing field, so a partially written or older data file still loads.

pub mod app_state;
pub mod category;
pub mod core_spec;
pub mod navigation;
pub mod records;

pub use app_state::{AppState, MAX_STATE_HISTORY, UnknownStateError};
pub use category::{Category, RomFile};
pub use core_spec::{CoreSpec, CoreSpecError, core_filename};
pub use navigation::{NavigationContext, Scratch};
pub use records::{
    CategoryPosition, CoreHistoryDocument, FavoriteEntry, FavoritesDocument, HistoryDocument,
    HistoryEntry, LaunchLocation, PlayMode, SessionSnapshot, Settings, SettingsDocument, Toggle,
    DEFAULT_HISTORY_LIMIT,
};
