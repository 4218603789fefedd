use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum number of screens remembered for back navigation.
///
/// Pushing onto a full history silently drops the oldest entry. See
/// [`crate::state::NavigationManager::change_state`].
pub const MAX_STATE_HISTORY: usize = 10;

/// Identifier of the screen that is currently active.
///
/// Exactly one state is current at a time. The navigation manager performs no
/// legality checks: every state is reachable from every other state.
///
/// # Related Types
///
/// - [`crate::state::NavigationManager`]: owns the current state and back-stack
/// - [`crate::models::SessionSnapshot`]: persists the current state across restarts
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppState {
    /// Startup screen. Never saved as the current state of a session.
    #[default]
    Splash,
    MainMenu,
    FileList,
    CoreSelect,
    Favorites,
    Recent,
    Search,
    Settings,
    WifiSettings,
    KeyConfigMenu,
    KeyConfig,
    BgmConfig,
    DatetimeSettings,
    Statistics,
    About,
    QuitMenu,
}

impl AppState {
    /// All states in declaration order.
    pub const ALL: [AppState; 16] = [
        AppState::Splash,
        AppState::MainMenu,
        AppState::FileList,
        AppState::CoreSelect,
        AppState::Favorites,
        AppState::Recent,
        AppState::Search,
        AppState::Settings,
        AppState::WifiSettings,
        AppState::KeyConfigMenu,
        AppState::KeyConfig,
        AppState::BgmConfig,
        AppState::DatetimeSettings,
        AppState::Statistics,
        AppState::About,
        AppState::QuitMenu,
    ];

    /// Stable identifier used in the session file.
    pub fn as_str(&self) -> &'static str {
        match self {
            AppState::Splash => "splash",
            AppState::MainMenu => "main_menu",
            AppState::FileList => "file_list",
            AppState::CoreSelect => "core_select",
            AppState::Favorites => "favorites",
            AppState::Recent => "recent",
            AppState::Search => "search",
            AppState::Settings => "settings",
            AppState::WifiSettings => "wifi_settings",
            AppState::KeyConfigMenu => "key_config_menu",
            AppState::KeyConfig => "key_config",
            AppState::BgmConfig => "bgm_config",
            AppState::DatetimeSettings => "datetime_settings",
            AppState::Statistics => "statistics",
            AppState::About => "about",
            AppState::QuitMenu => "quit_menu",
        }
    }

    /// States whose "back" action jumps straight to the main menu and clears
    /// the history instead of popping one level.
    pub fn returns_directly_to_main_menu(&self) -> bool {
        matches!(self, AppState::Favorites | AppState::Recent)
    }
}

impl fmt::Display for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a session file names a screen this build doesn't know.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown screen state: {0}")]
pub struct UnknownStateError(pub String);

impl FromStr for AppState {
    type Err = UnknownStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AppState::ALL
            .iter()
            .copied()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| UnknownStateError(s.to_string()))
    }
}
