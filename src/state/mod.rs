// Navigation state module
//
// NavigationManager wraps the NavigationContext (current screen, back-stack, scratch data)
// with Arc<RwLock<T>> access and emits change events to subscribers.

pub mod session;

pub use session::SessionBridge;

use crate::models::{
    AppState, CategoryPosition, LaunchLocation, NavigationContext, RomFile,
};
use camino::Utf8PathBuf;
use serde_json::Value;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::broadcast;

/// Change events emitted when the navigation context is modified
#[derive(Clone, Debug, PartialEq)]
pub enum StateChange {
    /// The active screen changed
    ScreenChanged { from: AppState, to: AppState },

    /// The back-stack was emptied
    HistoryCleared,

    /// A different category was selected
    CategorySelected { category: Option<String> },

    /// A screen asked for a ROM to be launched
    LaunchRequested { rom_path: Utf8PathBuf },

    /// The pending launch was handled or abandoned
    LaunchCleared,

    /// Context has been reset
    StateReset,
}

/// Owner of the current screen, the bounded back-stack and cross-screen scratch data.
///
/// All screens go through this manager instead of touching [`NavigationContext`]
/// directly:
/// - [`read()`](Self::read) / [`snapshot()`](Self::snapshot) for reading
/// - [`update()`](Self::update) for mutations with automatic event emission
/// - [`subscribe()`](Self::subscribe) for listening to changes
///
/// # Related Types
///
/// - [`crate::models::NavigationContext`]: The underlying state structure
/// - [`SessionBridge`]: Persists and restores parts of the context across restarts
/// - [`crate::ui::AppController`]: Activates the screen matching the current state
pub struct NavigationManager {
    context: Arc<RwLock<NavigationContext>>,
    state_tx: broadcast::Sender<StateChange>,
}

impl NavigationManager {
    /// Create a manager starting on the splash screen
    ///
    /// # Returns
    /// A new NavigationManager with a broadcast channel buffer of 100 events
    pub fn new() -> Self {
        let (state_tx, _) = broadcast::channel(100);
        Self {
            context: Arc::new(RwLock::new(NavigationContext::new())),
            state_tx,
        }
    }

    /// Clone of the whole context.
    pub fn snapshot(&self) -> NavigationContext {
        self.read(NavigationContext::clone)
    }

    /// Execute a function with read access to the context
    ///
    /// # Example
    /// ```ignore
    /// let in_file_list = nav.read(|ctx| ctx.current_state == AppState::FileList);
    /// ```
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&NavigationContext) -> R,
    {
        let context = self.context.read().unwrap_or_else(PoisonError::into_inner);
        f(&context)
    }

    /// Update the context and emit change events
    ///
    /// # Returns
    /// The StateChange events that were emitted
    pub fn update<F>(&self, update_fn: F) -> Vec<StateChange>
    where
        F: FnOnce(&mut NavigationContext),
    {
        let mut context = self.context.write().unwrap_or_else(PoisonError::into_inner);
        let old = context.clone();

        update_fn(&mut context);

        let changes = Self::detect_changes(&old, &context);
        for change in &changes {
            self.emit(change.clone());
        }
        changes
    }

    /// Subscribe to change events
    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.state_tx.subscribe()
    }

    fn emit(&self, change: StateChange) {
        // Ignore send errors - it's OK if no one is listening
        let _ = self.state_tx.send(change);
    }

    fn detect_changes(old: &NavigationContext, new: &NavigationContext) -> Vec<StateChange> {
        let mut changes = Vec::new();

        if old.current_state != new.current_state {
            changes.push(StateChange::ScreenChanged {
                from: old.current_state,
                to: new.current_state,
            });
        }

        if old.scratch.selected_category != new.scratch.selected_category {
            changes.push(StateChange::CategorySelected {
                category: new.scratch.selected_category.clone(),
            });
        }

        match (&old.scratch.rom_to_launch, &new.scratch.rom_to_launch) {
            (_, Some(rom)) if old.scratch.rom_to_launch.as_ref() != Some(rom) => {
                changes.push(StateChange::LaunchRequested {
                    rom_path: rom.path.clone(),
                });
            }
            (Some(_), None) => changes.push(StateChange::LaunchCleared),
            _ => {}
        }

        changes
    }

    // Screen transitions

    pub fn current_state(&self) -> AppState {
        self.read(|ctx| ctx.current_state)
    }

    pub fn previous_state(&self) -> Option<AppState> {
        self.read(|ctx| ctx.previous_state)
    }

    /// Back-stack, most recent last.
    pub fn history(&self) -> Vec<AppState> {
        self.read(|ctx| ctx.state_history.clone())
    }

    /// Make `new_state` current.
    ///
    /// With `push_history`, the outgoing state is pushed onto the back-stack unless it
    /// equals `new_state`; a full stack drops its oldest entry. No transition is refused.
    pub fn change_state(&self, new_state: AppState, push_history: bool) -> Vec<StateChange> {
        let changes = self.update(|ctx| ctx.change_state(new_state, push_history));
        tracing::debug!(
            "State changed to {} (history: {})",
            new_state,
            self.read(|ctx| ctx.state_history.len())
        );
        changes
    }

    /// Return to the most recent history entry. `false` when there is nothing to go back to.
    pub fn go_back(&self) -> bool {
        let mut went_back = false;
        self.update(|ctx| went_back = ctx.go_back());
        if !went_back {
            tracing::debug!("No history to go back to");
        }
        went_back
    }

    /// Back action for screens reached from the main menu by shortcut (favorites, recent).
    pub fn return_to_main_menu(&self) -> Vec<StateChange> {
        let had_history = self.read(|ctx| !ctx.state_history.is_empty());
        let mut changes = self.update(NavigationContext::return_to_main_menu);
        if had_history {
            self.emit(StateChange::HistoryCleared);
            changes.push(StateChange::HistoryCleared);
        }
        changes
    }

    pub fn clear_history(&self) -> Vec<StateChange> {
        let mut changes = self.update(|ctx| ctx.state_history.clear());
        self.emit(StateChange::HistoryCleared);
        changes.push(StateChange::HistoryCleared);
        changes
    }

    /// Main menu with empty history and scratch data.
    pub fn reset(&self) -> Vec<StateChange> {
        let mut changes = self.update(NavigationContext::reset);
        self.emit(StateChange::StateReset);
        changes.push(StateChange::StateReset);
        changes
    }

    /// Replace the back-stack, keeping at most the newest entries that fit.
    pub fn set_history(&self, history: Vec<AppState>) {
        self.update(|ctx| {
            let skip = history.len().saturating_sub(crate::models::MAX_STATE_HISTORY);
            ctx.state_history = history.into_iter().skip(skip).collect();
        });
    }

    // Generic scratch values

    pub fn get_data(&self, key: &str) -> Option<Value> {
        self.read(|ctx| ctx.scratch.values.get(key).cloned())
    }

    /// `default` when `key` is absent.
    pub fn get_data_or(&self, key: &str, default: Value) -> Value {
        self.get_data(key).unwrap_or(default)
    }

    pub fn set_data(&self, key: impl Into<String>, value: impl Into<Value>) {
        let (key, value) = (key.into(), value.into());
        self.update(|ctx| {
            ctx.scratch.values.insert(key, value);
        });
    }

    // Typed scratch accessors

    pub fn selected_category(&self) -> Option<String> {
        self.read(|ctx| ctx.scratch.selected_category.clone())
    }

    pub fn set_selected_category(&self, category: Option<String>) -> Vec<StateChange> {
        self.update(|ctx| ctx.scratch.selected_category = category)
    }

    pub fn selected_file(&self) -> Option<RomFile> {
        self.read(|ctx| ctx.scratch.selected_file.clone())
    }

    pub fn selected_file_index(&self) -> usize {
        self.read(|ctx| ctx.scratch.selected_file_index)
    }

    pub fn set_selected_file(&self, file: Option<RomFile>, index: usize) {
        self.update(|ctx| {
            ctx.scratch.selected_file = file;
            ctx.scratch.selected_file_index = index;
        });
    }

    pub fn file_list_scroll(&self) -> usize {
        self.read(|ctx| ctx.scratch.file_list_scroll)
    }

    pub fn set_file_list_scroll(&self, scroll: usize) {
        self.update(|ctx| ctx.scratch.file_list_scroll = scroll);
    }

    pub fn category_scroll(&self) -> usize {
        self.read(|ctx| ctx.scratch.category_scroll)
    }

    pub fn set_category_scroll(&self, scroll: usize) {
        self.update(|ctx| ctx.scratch.category_scroll = scroll);
    }

    pub fn available_cores(&self) -> Vec<String> {
        self.read(|ctx| ctx.scratch.available_cores.clone())
    }

    pub fn set_available_cores(&self, cores: Vec<String>) {
        self.update(|ctx| ctx.scratch.available_cores = cores);
    }

    pub fn selected_core(&self) -> Option<String> {
        self.read(|ctx| ctx.scratch.selected_core.clone())
    }

    pub fn set_selected_core(&self, core: Option<String>) {
        self.update(|ctx| ctx.scratch.selected_core = core);
    }

    pub fn temp_core_override(&self) -> Option<String> {
        self.read(|ctx| ctx.scratch.temp_core_override.clone())
    }

    pub fn set_temp_core_override(&self, core: Option<String>) {
        self.update(|ctx| ctx.scratch.temp_core_override = core);
    }

    pub fn search_query(&self) -> String {
        self.read(|ctx| ctx.scratch.search_query.clone())
    }

    pub fn set_search_query(&self, query: impl Into<String>) {
        let query = query.into();
        self.update(|ctx| ctx.scratch.search_query = query);
    }

    /// Remember the file list cursor for a category.
    pub fn save_category_position(&self, category: &str, index: usize, scroll: usize) {
        self.update(|ctx| {
            ctx.scratch
                .category_positions
                .insert(category.to_string(), CategoryPosition::new(index, scroll));
        });
    }

    /// Saved cursor for `category`, `{0, 0}` if never saved.
    pub fn category_position(&self, category: &str) -> CategoryPosition {
        self.read(|ctx| ctx.category_position(category))
    }

    pub fn post_splash_state(&self) -> Option<AppState> {
        self.read(|ctx| ctx.scratch.post_splash_state)
    }

    pub fn set_post_splash_state(&self, state: Option<AppState>) {
        self.update(|ctx| ctx.scratch.post_splash_state = state);
    }

    pub fn launch_location(&self) -> Option<LaunchLocation> {
        self.read(|ctx| ctx.scratch.launch_location.clone())
    }

    pub fn set_launch_location(&self, location: Option<LaunchLocation>) {
        self.update(|ctx| ctx.scratch.launch_location = location);
    }

    // Launch requests

    /// Ask the controller to launch `rom` from `category`.
    ///
    /// `location` is the file list position saved with the session so the list
    /// reopens at the same place after the restart.
    pub fn request_launch(
        &self,
        rom: RomFile,
        category: impl Into<String>,
        location: LaunchLocation,
    ) -> Vec<StateChange> {
        let category = category.into();
        self.update(|ctx| {
            ctx.scratch.rom_to_launch = Some(rom);
            ctx.scratch.launch_category = Some(category);
            ctx.scratch.launch_location = Some(location);
        })
    }

    /// ROM and category name waiting to be launched.
    pub fn pending_launch(&self) -> Option<(RomFile, String)> {
        self.read(|ctx| {
            let rom = ctx.scratch.rom_to_launch.clone()?;
            let category = ctx.scratch.launch_category.clone()?;
            Some((rom, category))
        })
    }

    /// Drop the pending launch along with its one-shot core override.
    pub fn clear_pending_launch(&self) -> Vec<StateChange> {
        self.update(|ctx| {
            ctx.scratch.rom_to_launch = None;
            ctx.scratch.launch_category = None;
            ctx.scratch.temp_core_override = None;
        })
    }
}

impl Default for NavigationManager {
    fn default() -> Self {
        Self::new()
    }
}

// Clones share the same context and event channel
impl Clone for NavigationManager {
    fn clone(&self) -> Self {
        Self {
            context: Arc::clone(&self.context),
            state_tx: self.state_tx.clone(),
        }
    }
}
