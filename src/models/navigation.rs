use crate::models::{AppState, CategoryPosition, LaunchLocation, MAX_STATE_HISTORY, RomFile};
use indexmap::IndexMap;
use serde_json::Value;

/// Cross-screen data shared through the navigation manager.
///
/// Typed fields cover what screens commonly pass to each other. `values` holds
/// anything else under string keys.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scratch {
    pub selected_category: Option<String>,
    pub selected_file: Option<RomFile>,
    pub selected_file_index: usize,
    pub file_list_scroll: usize,
    pub category_scroll: usize,
    pub selected_core: Option<String>,
    pub available_cores: Vec<String>,
    pub search_query: String,
    /// Core chosen on the core select screen for the next launch only.
    pub temp_core_override: Option<String>,
    pub category_positions: IndexMap<String, CategoryPosition>,

    /// Set by a screen to ask the controller to launch a ROM.
    pub rom_to_launch: Option<RomFile>,
    pub launch_category: Option<String>,
    pub launch_location: Option<LaunchLocation>,

    /// Screen the splash hands over to, set when a session is restored.
    pub post_splash_state: Option<AppState>,

    pub values: IndexMap<String, Value>,
}

/// Current screen, back-stack and scratch data.
///
/// Always accessed through [`crate::state::NavigationManager`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NavigationContext {
    pub current_state: AppState,
    pub previous_state: Option<AppState>,
    /// Back-stack, most recent last. Never longer than [`MAX_STATE_HISTORY`].
    pub state_history: Vec<AppState>,
    pub scratch: Scratch,
}

impl NavigationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch screens. See [`crate::state::NavigationManager::change_state`].
    pub fn change_state(&mut self, new_state: AppState, push_history: bool) {
        if push_history && new_state != self.current_state {
            self.state_history.push(self.current_state);
            if self.state_history.len() > MAX_STATE_HISTORY {
                self.state_history.remove(0);
            }
        }
        self.previous_state = Some(self.current_state);
        self.current_state = new_state;
    }

    /// Pop the back-stack. Returns `false` (and changes nothing) when it is empty.
    pub fn go_back(&mut self) -> bool {
        match self.state_history.pop() {
            Some(state) => {
                self.previous_state = Some(self.current_state);
                self.current_state = state;
                true
            }
            None => false,
        }
    }

    pub fn return_to_main_menu(&mut self) {
        self.previous_state = Some(self.current_state);
        self.current_state = AppState::MainMenu;
        self.state_history.clear();
    }

    /// Main menu, empty history, empty scratch.
    pub fn reset(&mut self) {
        *self = Self {
            current_state: AppState::MainMenu,
            ..Self::default()
        };
    }

    pub fn category_position(&self, category: &str) -> CategoryPosition {
        self.scratch
            .category_positions
            .get(category)
            .copied()
            .unwrap_or_default()
    }
}
