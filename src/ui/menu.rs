//! Settings menu model.
//!
//! Menus are lists of [`MenuItem`]s: toggles that cycle through fixed values stored
//! under a settings key, and submenu entries that open another screen.

use crate::models::{AppState, Settings};
use crate::state::{NavigationManager, StateChange};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuItem {
    Toggle {
        label: String,
        /// Key in `settings.json`.
        key: String,
        values: Vec<String>,
        index: usize,
    },
    Submenu {
        label: String,
        target: AppState,
    },
}

impl MenuItem {
    pub fn toggle(label: &str, key: &str, values: &[&str]) -> Self {
        MenuItem::Toggle {
            label: label.to_string(),
            key: key.to_string(),
            values: values.iter().map(|v| v.to_string()).collect(),
            index: 0,
        }
    }

    pub fn submenu(label: &str, target: AppState) -> Self {
        MenuItem::Submenu {
            label: label.to_string(),
            target,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            MenuItem::Toggle { label, .. } | MenuItem::Submenu { label, .. } => label,
        }
    }

    /// Current toggle value. `None` for submenus.
    pub fn value(&self) -> Option<&str> {
        match self {
            MenuItem::Toggle { values, index, .. } => values.get(*index).map(String::as_str),
            MenuItem::Submenu { .. } => None,
        }
    }

    /// Step a toggle forward or backward, wrapping around. Returns the new value.
    pub fn cycle(&mut self, forward: bool) -> Option<&str> {
        let MenuItem::Toggle { values, index, .. } = self else {
            return None;
        };
        if values.is_empty() {
            return None;
        }

        *index = if forward {
            (*index + 1) % values.len()
        } else {
            (*index + values.len() - 1) % values.len()
        };
        values.get(*index).map(String::as_str)
    }

    /// Open a submenu's screen. Toggles do nothing.
    pub fn activate(&self, nav: &NavigationManager) -> Vec<StateChange> {
        match self {
            MenuItem::Submenu { target, .. } => nav.change_state(*target, true),
            MenuItem::Toggle { .. } => Vec::new(),
        }
    }

    /// Point a toggle at the value stored in `settings`. Unknown values select the first.
    pub fn load_from(&mut self, settings: &Settings) {
        if let MenuItem::Toggle {
            key, values, index, ..
        } = self
        {
            let stored = setting_value(settings, key);
            *index = stored
                .and_then(|stored| values.iter().position(|v| *v == stored))
                .unwrap_or(0);
        }
    }

    /// Write a toggle's value into `settings`.
    pub fn store_into(&self, settings: &mut Settings) -> Result<(), serde_json::Error> {
        match (self, self.value()) {
            (MenuItem::Toggle { key, .. }, Some(value)) => set_setting_value(settings, key, value),
            _ => Ok(()),
        }
    }
}

/// String form of a setting as stored in `settings.json`.
pub fn setting_value(settings: &Settings, key: &str) -> Option<String> {
    let json = serde_json::to_value(settings).ok()?;
    match json.get(key)? {
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Set a setting by its `settings.json` key. Keys without a typed field land in
/// [`Settings::extra`].
pub fn set_setting_value(
    settings: &mut Settings,
    key: &str,
    value: &str,
) -> Result<(), serde_json::Error> {
    let mut json = serde_json::to_value(&*settings)?;
    if let Value::Object(map) = &mut json {
        map.insert(key.to_string(), Value::String(value.to_string()));
    }
    *settings = serde_json::from_value(json)?;
    Ok(())
}

/// Top-level settings menu, with toggles loaded from `settings`.
pub fn settings_menu(settings: &Settings) -> Vec<MenuItem> {
    let mut items = vec![
        MenuItem::toggle("Resolution", "resolution", &["1:1", "4:3"]),
        MenuItem::toggle("Screenshots", "show_screenshots", &["On", "Off"]),
        MenuItem::submenu("Date/Time", AppState::DatetimeSettings),
        MenuItem::submenu("WiFi", AppState::WifiSettings),
        MenuItem::submenu("Key Config", AppState::KeyConfigMenu),
        MenuItem::submenu("BGM Config", AppState::BgmConfig),
        MenuItem::submenu("Statistics", AppState::Statistics),
        MenuItem::submenu("About", AppState::About),
        MenuItem::submenu("Quit", AppState::QuitMenu),
    ];
    for item in &mut items {
        item.load_from(settings);
    }
    items
}

/// BGM settings menu, with toggles loaded from `settings`.
pub fn bgm_menu(settings: &Settings) -> Vec<MenuItem> {
    let volumes: Vec<String> = (0..=10).map(|v| v.to_string()).collect();
    let volumes: Vec<&str> = volumes.iter().map(String::as_str).collect();

    let mut items = vec![
        MenuItem::toggle("BGM", "bgm_enabled", &["Off", "On"]),
        MenuItem::toggle("BGM Volume", "bgm_volume", &volumes),
        MenuItem::toggle("BGM Mode", "bgm_mode", &["Normal", "Shuffle"]),
    ];
    for item in &mut items {
        item.load_from(settings);
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PlayMode, Toggle};

    #[test]
    fn test_cycle_wraps() {
        let mut item = MenuItem::toggle("Resolution", "resolution", &["1:1", "4:3"]);
        assert_eq!(item.value(), Some("1:1"));
        assert_eq!(item.cycle(true), Some("4:3"));
        assert_eq!(item.cycle(true), Some("1:1"));
        assert_eq!(item.cycle(false), Some("4:3"));
    }

    #[test]
    fn test_submenu_has_no_value() {
        let mut item = MenuItem::submenu("About", AppState::About);
        assert_eq!(item.value(), None);
        assert_eq!(item.cycle(true), None);
        assert_eq!(item.label(), "About");
    }

    #[test]
    fn test_submenu_opens_target_with_history() {
        let nav = NavigationManager::new();
        nav.change_state(AppState::Settings, false);

        MenuItem::submenu("BGM Config", AppState::BgmConfig).activate(&nav);
        assert_eq!(nav.current_state(), AppState::BgmConfig);
        assert!(nav.go_back());
        assert_eq!(nav.current_state(), AppState::Settings);
    }

    #[test]
    fn test_bgm_menu_reads_settings() {
        let mut settings = Settings::default();
        settings.bgm_enabled = Toggle::Off;
        settings.bgm_volume = "8".to_string();
        settings.bgm_mode = PlayMode::Shuffle;

        let items = bgm_menu(&settings);
        let values: Vec<Option<&str>> = items.iter().map(MenuItem::value).collect();
        assert_eq!(values, vec![Some("Off"), Some("8"), Some("Shuffle")]);
    }

    #[test]
    fn test_store_into_settings() {
        let mut settings = Settings::default();
        let mut items = bgm_menu(&settings);

        items[0].cycle(true);
        items[2].cycle(true);
        for item in &items {
            item.store_into(&mut settings).unwrap();
        }

        assert_eq!(settings.bgm_enabled, Toggle::Off);
        assert_eq!(settings.bgm_mode, PlayMode::Shuffle);
        assert_eq!(settings.bgm_volume, "5");
    }

    #[test]
    fn test_unknown_key_goes_to_extra() {
        let mut settings = Settings::default();
        set_setting_value(&mut settings, "theme", "retro").unwrap();
        assert_eq!(settings.extra.get("theme"), Some(&Value::String("retro".to_string())));
        assert_eq!(setting_value(&settings, "theme").as_deref(), Some("retro"));
    }

    #[test]
    fn test_settings_menu_shape() {
        let items = settings_menu(&Settings::default());
        assert_eq!(items.len(), 9);
        assert_eq!(items[0].value(), Some("1:1"));
        assert!(matches!(
            items.last(),
            Some(MenuItem::Submenu { target: AppState::QuitMenu, .. })
        ));
    }
}
