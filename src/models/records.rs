use crate::models::AppState;
use chrono::NaiveDateTime;
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Format version written into every data file.
pub const DATA_FORMAT_VERSION: &str = "1.0";

/// Default number of play history entries kept.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

fn default_version() -> String {
    DATA_FORMAT_VERSION.to_string()
}

fn default_history_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}

/// List of rows where a row that doesn't parse is dropped with a warning instead of
/// failing the whole document.
fn lenient_rows<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let rows = Vec::<Value>::deserialize(deserializer)?;
    Ok(rows
        .into_iter()
        .filter_map(|row| match serde_json::from_value(row) {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!("Skipping invalid entry: {}", e);
                None
            }
        })
        .collect())
}

/// String map where non-string values are dropped with a warning.
fn lenient_string_map<'de, D>(deserializer: D) -> Result<IndexMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = IndexMap::<String, Value>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .filter_map(|(key, value)| match value {
            Value::String(value) => Some((key, value)),
            other => {
                tracing::warn!("Skipping invalid value for {}: {}", key, other);
                None
            }
        })
        .collect())
}

/// Cursor memory for one category's file list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryPosition {
    #[serde(default)]
    pub index: usize,
    #[serde(default)]
    pub scroll: usize,
}

impl CategoryPosition {
    pub fn new(index: usize, scroll: usize) -> Self {
        Self { index, scroll }
    }
}

/// Where the file list was when a launch was requested.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchLocation {
    pub subdirectory: String,
    pub directory_stack: Vec<String>,
    pub selected_index: usize,
    pub scroll_offset: usize,
}

/// Session state persisted right before an intentional exit (`session.json`).
///
/// `current_state` is never `splash`: see [`crate::state::session::SessionBridge::capture`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub current_state: AppState,

    #[serde(default)]
    pub selected_category: Option<String>,

    #[serde(default)]
    pub category_positions: IndexMap<String, CategoryPosition>,

    /// `None` when the file list was never opened. An empty string is the
    /// category's top directory.
    #[serde(default)]
    pub launch_subdirectory: Option<String>,

    #[serde(default)]
    pub launch_directory_stack: Option<Vec<String>>,

    #[serde(default)]
    pub launch_selected_index: usize,

    #[serde(default)]
    pub launch_scroll_offset: usize,
}

impl SessionSnapshot {
    /// File list location recorded in this snapshot, if any.
    pub fn launch_location(&self) -> Option<LaunchLocation> {
        self.launch_subdirectory.as_ref().map(|subdirectory| LaunchLocation {
            subdirectory: subdirectory.clone(),
            directory_stack: self.launch_directory_stack.clone().unwrap_or_default(),
            selected_index: self.launch_selected_index,
            scroll_offset: self.launch_scroll_offset,
        })
    }
}

/// One row of the play history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub rom_path: String,
    pub category: String,
    pub core_used: String,
    #[serde(default)]
    pub play_count: u32,
    pub last_played: NaiveDateTime,
}

/// Play history document (`history.json`). Newest entries first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryDocument {
    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default = "default_history_limit")]
    pub max_entries: usize,

    #[serde(default, deserialize_with = "lenient_rows")]
    pub entries: Vec<HistoryEntry>,
}

impl Default for HistoryDocument {
    fn default() -> Self {
        Self::with_limit(DEFAULT_HISTORY_LIMIT)
    }
}

impl HistoryDocument {
    pub fn with_limit(max_entries: usize) -> Self {
        Self {
            version: default_version(),
            max_entries,
            entries: Vec::new(),
        }
    }

    /// Record a play.
    ///
    /// A ROM already present gets its count incremented and its timestamp and core
    /// refreshed in place. A new ROM is inserted at the front with a count of 1.
    /// The list is then truncated to `max_entries`.
    pub fn record_play(&mut self, rom_path: &str, category: &str, core_used: &str, now: NaiveDateTime) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.rom_path == rom_path) {
            entry.play_count += 1;
            entry.last_played = now;
            entry.core_used = core_used.to_string();
        } else {
            self.entries.insert(
                0,
                HistoryEntry {
                    rom_path: rom_path.to_string(),
                    category: category.to_string(),
                    core_used: core_used.to_string(),
                    play_count: 1,
                    last_played: now,
                },
            );
        }

        self.entries.truncate(self.max_entries);
    }

    /// Up to `limit` entries sorted by last play time, newest first.
    pub fn recent(&self, limit: usize) -> Vec<HistoryEntry> {
        let mut entries: Vec<HistoryEntry> = self.entries.iter().take(limit).cloned().collect();
        entries.sort_by(|a, b| b.last_played.cmp(&a.last_played));
        entries
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteEntry {
    pub rom_path: String,
    pub category: String,
    pub added_timestamp: NaiveDateTime,
}

/// Favorites document (`favorites.json`), in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoritesDocument {
    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default, deserialize_with = "lenient_rows")]
    pub favorites: Vec<FavoriteEntry>,
}

impl Default for FavoritesDocument {
    fn default() -> Self {
        Self {
            version: default_version(),
            favorites: Vec::new(),
        }
    }
}

/// Last core used per ROM path (`core_history.json`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreHistoryDocument {
    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default, deserialize_with = "lenient_string_map")]
    pub core_overrides: IndexMap<String, String>,
}

impl Default for CoreHistoryDocument {
    fn default() -> Self {
        Self {
            version: default_version(),
            core_overrides: IndexMap::new(),
        }
    }
}

/// On/Off switch as stored in `settings.json`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Toggle {
    On,
    Off,
}

impl Toggle {
    pub fn is_on(self) -> bool {
        self == Toggle::On
    }
}

impl From<bool> for Toggle {
    fn from(value: bool) -> Self {
        if value { Toggle::On } else { Toggle::Off }
    }
}

/// BGM playback order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayMode {
    #[default]
    Normal,
    Shuffle,
}

/// User settings (`settings.json`, under the `settings` key).
///
/// Keys this build doesn't know are kept in `extra` so saving never drops them.
/// A known key holding a value of the wrong type keeps its default; the rest of the
/// file still loads.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settings {
    pub show_screenshots: Toggle,
    pub sort_mode: String,
    pub button_layout: String,
    pub auto_launch: Toggle,
    pub view_mode: String,
    pub resolution: String,
    pub bgm_enabled: Toggle,

    /// Volume step 0-10 stored as a string.
    pub bgm_volume: String,

    pub bgm_mode: PlayMode,

    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl<'de> Deserialize<'de> for Settings {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut raw = IndexMap::<String, Value>::deserialize(deserializer)?;
        let mut settings = Settings::default();

        take_setting(&mut raw, "show_screenshots", &mut settings.show_screenshots);
        take_setting(&mut raw, "sort_mode", &mut settings.sort_mode);
        take_setting(&mut raw, "button_layout", &mut settings.button_layout);
        take_setting(&mut raw, "auto_launch", &mut settings.auto_launch);
        take_setting(&mut raw, "view_mode", &mut settings.view_mode);
        take_setting(&mut raw, "resolution", &mut settings.resolution);
        take_setting(&mut raw, "bgm_enabled", &mut settings.bgm_enabled);
        take_setting(&mut raw, "bgm_volume", &mut settings.bgm_volume);
        take_setting(&mut raw, "bgm_mode", &mut settings.bgm_mode);

        settings.extra = raw;
        Ok(settings)
    }
}

fn take_setting<T: DeserializeOwned>(raw: &mut IndexMap<String, Value>, key: &str, slot: &mut T) {
    let Some(value) = raw.shift_remove(key) else {
        return;
    };
    match serde_json::from_value(value) {
        Ok(parsed) => *slot = parsed,
        Err(e) => tracing::warn!("Ignoring invalid setting {}: {}, using default", key, e),
    }
}

fn default_on() -> Toggle {
    Toggle::On
}

fn default_off() -> Toggle {
    Toggle::Off
}

fn default_sort_mode() -> String {
    "Name".to_string()
}

fn default_button_layout() -> String {
    "Nintendo".to_string()
}

fn default_view_mode() -> String {
    "list".to_string()
}

fn default_resolution() -> String {
    "1:1".to_string()
}

fn default_bgm_volume() -> String {
    "5".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            show_screenshots: default_on(),
            sort_mode: default_sort_mode(),
            button_layout: default_button_layout(),
            auto_launch: default_off(),
            view_mode: default_view_mode(),
            resolution: default_resolution(),
            bgm_enabled: default_on(),
            bgm_volume: default_bgm_volume(),
            bgm_mode: PlayMode::default(),
            extra: IndexMap::new(),
        }
    }
}

impl Settings {
    /// BGM volume as a 0.0-1.0 fraction. Unparseable values fall back to 0.5.
    pub fn bgm_volume_fraction(&self) -> f32 {
        self.bgm_volume
            .trim()
            .parse::<u8>()
            .map(|step| f32::from(step.min(10)) / 10.0)
            .unwrap_or(0.5)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsDocument {
    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default)]
    pub settings: Settings,
}

impl Default for SettingsDocument {
    fn default() -> Self {
        Self {
            version: default_version(),
            settings: Settings::default(),
        }
    }
}
