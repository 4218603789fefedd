//! JSON data stores in the data directory.
//!
//! | File | Document |
//! |---|---|
//! | `session.json` | [`SessionSnapshot`] |
//! | `history.json` | [`HistoryDocument`] |
//! | `favorites.json` | [`FavoritesDocument`] |
//! | `core_history.json` | [`CoreHistoryDocument`] |
//! | `settings.json` | [`SettingsDocument`] |
//!
//! Every public method swallows I/O and parse errors after logging them and falls back
//! to an empty/default value, so the launcher stays usable with a missing or corrupt
//! data directory. Each change is a full read-modify-write of one file.

use crate::models::{
    CoreHistoryDocument, FavoriteEntry, FavoritesDocument, HistoryDocument, HistoryEntry,
    SessionSnapshot, Settings, SettingsDocument,
};
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use chrono::{Local, NaiveDateTime};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;

const SESSION_FILE: &str = "session.json";
const HISTORY_FILE: &str = "history.json";
const FAVORITES_FILE: &str = "favorites.json";
const CORE_HISTORY_FILE: &str = "core_history.json";
const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Clone)]
pub struct PersistenceManager {
    data_dir: Utf8PathBuf,
    /// `max_entries` for a history file that doesn't exist yet.
    history_limit: usize,
}

impl PersistenceManager {
    /// Create a manager rooted at `data_dir`, creating the directory if needed.
    pub fn new<P: AsRef<Utf8Path>>(data_dir: P, history_limit: usize) -> Self {
        let data_dir = data_dir.as_ref().to_path_buf();

        if let Err(e) = fs::create_dir_all(&data_dir) {
            tracing::error!("Failed to create data directory {}: {}", data_dir, e);
        }

        Self {
            data_dir,
            history_limit,
        }
    }

    pub fn data_dir(&self) -> &Utf8Path {
        &self.data_dir
    }

    fn path(&self, file: &str) -> Utf8PathBuf {
        self.data_dir.join(file)
    }

    fn read_json<T: DeserializeOwned>(path: &Utf8Path) -> Result<Option<T>> {
        if !path.exists() {
            return Ok(None);
        }

        let contents =
            fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))?;
        let value =
            serde_json::from_str(&contents).with_context(|| format!("Failed to parse {}", path))?;
        Ok(Some(value))
    }

    fn write_json<T: Serialize>(path: &Utf8Path, value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)
            .with_context(|| format!("Failed to serialize {}", path))?;
        fs::write(path, json).with_context(|| format!("Failed to write {}", path))?;
        Ok(())
    }

    fn load_or<T: DeserializeOwned>(&self, file: &str, default: impl FnOnce() -> T) -> T {
        let path = self.path(file);
        match Self::read_json(&path) {
            Ok(Some(value)) => value,
            Ok(None) => default(),
            Err(e) => {
                tracing::warn!("{:#}, using defaults", e);
                default()
            }
        }
    }

    fn save<T: Serialize>(&self, file: &str, value: &T) -> bool {
        match Self::write_json(&self.path(file), value) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("{:#}", e);
                false
            }
        }
    }

    fn now() -> NaiveDateTime {
        Local::now().naive_local()
    }

    // Session

    pub fn save_session(&self, snapshot: &SessionSnapshot) -> bool {
        let saved = self.save(SESSION_FILE, snapshot);
        if saved {
            tracing::info!("Session saved ({})", snapshot.current_state);
        }
        saved
    }

    /// The saved session, or `None` on first run or if the file is unreadable.
    pub fn load_session(&self) -> Option<SessionSnapshot> {
        let path = self.path(SESSION_FILE);
        match Self::read_json::<SessionSnapshot>(&path) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!("{:#}, ignoring saved session", e);
                None
            }
        }
    }

    pub fn clear_session(&self) {
        let path = self.path(SESSION_FILE);
        if path.exists() {
            if let Err(e) = fs::remove_file(&path) {
                tracing::error!("Failed to clear session {}: {}", path, e);
            }
        }
    }

    // Play history

    pub fn history(&self) -> HistoryDocument {
        self.load_or(HISTORY_FILE, || HistoryDocument::with_limit(self.history_limit))
    }

    /// Upsert a play of `rom_path`. See [`HistoryDocument::record_play`].
    pub fn add_to_history(&self, rom_path: &str, category: &str, core_used: &str) {
        let mut history = self.history();
        history.record_play(rom_path, category, core_used, Self::now());
        if self.save(HISTORY_FILE, &history) {
            tracing::info!("Added to history: {}", rom_path);
        }
    }

    /// Up to `limit` history entries, newest first.
    pub fn recent_history(&self, limit: usize) -> Vec<HistoryEntry> {
        self.history().recent(limit)
    }

    // Per-ROM core memory

    pub fn save_core_choice(&self, rom_path: &str, core: &str) {
        let mut core_history = self.load_or(CORE_HISTORY_FILE, CoreHistoryDocument::default);
        core_history
            .core_overrides
            .insert(rom_path.to_string(), core.to_string());
        self.save(CORE_HISTORY_FILE, &core_history);
    }

    pub fn last_core(&self, rom_path: &str) -> Option<String> {
        self.load_or(CORE_HISTORY_FILE, CoreHistoryDocument::default)
            .core_overrides
            .shift_remove(rom_path)
    }

    // Favorites

    pub fn favorites(&self) -> Vec<FavoriteEntry> {
        self.load_or(FAVORITES_FILE, FavoritesDocument::default).favorites
    }

    /// Add a favorite. Returns `false` if it was already present or couldn't be saved.
    pub fn add_favorite(&self, rom_path: &str, category: &str) -> bool {
        let mut favorites = self.load_or(FAVORITES_FILE, FavoritesDocument::default);
        if favorites.favorites.iter().any(|f| f.rom_path == rom_path) {
            tracing::debug!("Already in favorites: {}", rom_path);
            return false;
        }

        favorites.favorites.push(FavoriteEntry {
            rom_path: rom_path.to_string(),
            category: category.to_string(),
            added_timestamp: Self::now(),
        });
        self.save(FAVORITES_FILE, &favorites)
    }

    pub fn remove_favorite(&self, rom_path: &str) {
        let mut favorites = self.load_or(FAVORITES_FILE, FavoritesDocument::default);
        let before = favorites.favorites.len();
        favorites.favorites.retain(|f| f.rom_path != rom_path);

        if favorites.favorites.len() != before {
            self.save(FAVORITES_FILE, &favorites);
            tracing::info!("Removed from favorites: {}", rom_path);
        }
    }

    /// Add or remove; returns whether the ROM is a favorite afterwards.
    pub fn toggle_favorite(&self, rom_path: &str, category: &str) -> bool {
        if self.is_favorite(rom_path) {
            self.remove_favorite(rom_path);
            false
        } else {
            self.add_favorite(rom_path, category)
        }
    }

    pub fn is_favorite(&self, rom_path: &str) -> bool {
        self.favorites().iter().any(|f| f.rom_path == rom_path)
    }

    // Settings

    pub fn load_settings(&self) -> Settings {
        self.load_or(SETTINGS_FILE, SettingsDocument::default).settings
    }

    pub fn save_settings(&self, settings: &Settings) -> bool {
        let document = SettingsDocument {
            settings: settings.clone(),
            ..Default::default()
        };
        self.save(SETTINGS_FILE, &document)
    }
}
