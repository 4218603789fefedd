//! Launcher configuration and runtime options.
//!
//! - [`ConfigManager`] reads the launcher config file (`launcher.cfg`) that declares
//!   global variables (emulator paths, core directory, ROM base) and categories.
//! - [`AppOptions`] holds process-level options (data/log directories, frame rate)
//!   layered from defaults, an optional `romfront.toml` and `ROMFRONT_*` variables.
//!
//! # Launcher config format
//!
//! ```text
//! ; comment
//! ROM_BASE=/mnt/sdcard/Roms
//! CORE_PATH=$HOME/.config/retroarch/cores
//! TYPE_RA=./scripts/retroarch.sh
//! TYPE_SA_DRASTIC=./scripts/drastic.sh
//!
//! -TITLE=NES
//! -DIR=FC
//! -EXT=nes,zip
//! -CORE=nestopia,fceumm
//! ```

mod options;

pub use options::AppOptions;

use crate::models::Category;
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use regex::{Captures, Regex};
use std::fs;
use std::sync::LazyLock;

/// Player command used for BGM when `BGM_PLAYER` is not set.
pub const DEFAULT_BGM_PLAYER: &str = "ffplay -nodisp -autoexit -loglevel quiet -volume {volume} {track}";

const DEFAULT_SPLASH_SECONDS: u64 = 3;

static VAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$(?:\{(\w+)\}|(\w+))").expect("Invalid variable regex"));

/// Parsed launcher configuration: global variables plus ordered categories.
#[derive(Debug, Clone, Default)]
pub struct LauncherConfig {
    global_vars: IndexMap<String, String>,
    categories: IndexMap<String, Category>,
}

impl LauncherConfig {
    /// Parse the contents of a launcher config file.
    ///
    /// Unknown category keys and parameters appearing before the first `-TITLE=`
    /// are ignored.
    pub fn parse(contents: &str) -> Self {
        let mut config = Self::default();
        let mut current: Option<String> = None;

        for line in contents.lines() {
            let line = line.trim();

            if line.is_empty() || line.starts_with(';') {
                continue;
            }

            if let Some(param) = line.strip_prefix('-') {
                let Some((key, value)) = param.split_once('=') else {
                    continue;
                };
                let key = key.trim().to_uppercase();
                let value = config.expand_vars(value.trim());

                if key == "TITLE" {
                    config.categories.insert(value.clone(), Category::new(value.clone()));
                    current = Some(value);
                    continue;
                }

                let Some(category) = current
                    .as_ref()
                    .and_then(|name| config.categories.get_mut(name))
                else {
                    tracing::debug!("Ignoring -{} outside of a category", key);
                    continue;
                };

                match key.as_str() {
                    "DIR" => {
                        category.directory = Self::category_directory(&config.global_vars, &value);
                    }
                    "EXT" => category.extensions = split_list(&value),
                    "TYPE" => category.emulator_type = value,
                    "CORE" => category.cores = split_list(&value),
                    "TITLE_IMG" => {
                        category.title_image = value.strip_prefix("./").unwrap_or(&value).to_string();
                    }
                    other => tracing::debug!("Unknown category key -{}", other),
                }
                continue;
            }

            if let Some((key, value)) = line.split_once('=') {
                let value = config.expand_vars(value.trim());
                config.global_vars.insert(key.trim().to_string(), value);
            }
        }

        config
    }

    fn category_directory(globals: &IndexMap<String, String>, value: &str) -> Utf8PathBuf {
        if value.starts_with('/') {
            return Utf8PathBuf::from(value);
        }
        match globals.get("ROM_BASE").filter(|base| !base.is_empty()) {
            Some(base) => Utf8PathBuf::from(format!("{}/{}", base, value)),
            None => Utf8PathBuf::from(value),
        }
    }

    /// Expand `$VAR` / `${VAR}` from the environment first, then from globals
    /// defined earlier in the file. Unknown variables are left untouched.
    fn expand_vars(&self, value: &str) -> String {
        VAR_PATTERN
            .replace_all(value, |caps: &Captures| {
                let name = caps
                    .get(1)
                    .or_else(|| caps.get(2))
                    .map(|m| m.as_str())
                    .unwrap_or_default();
                std::env::var(name)
                    .ok()
                    .or_else(|| self.global_vars.get(name).cloned())
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }

    pub fn categories(&self) -> impl Iterator<Item = &Category> {
        self.categories.values()
    }

    pub fn category(&self, name: &str) -> Option<&Category> {
        self.categories.get(name)
    }

    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    pub fn global(&self, key: &str) -> Option<&str> {
        self.global_vars.get(key).map(String::as_str)
    }

    /// Executable path configured as `TYPE_<key>`.
    pub fn emulator_path(&self, key: &str) -> Option<&str> {
        self.global(&format!("TYPE_{}", key)).filter(|path| !path.is_empty())
    }

    /// Directory holding RetroArch cores, if configured.
    pub fn core_path(&self) -> Option<&Utf8Path> {
        self.global("CORE_PATH")
            .filter(|path| !path.is_empty())
            .map(Utf8Path::new)
    }

    pub fn rom_base(&self) -> &str {
        self.global("ROM_BASE").unwrap_or_default()
    }

    /// Splash duration in seconds, clamped to 1..=5 (default 3).
    pub fn splash_time(&self) -> u64 {
        self.global("SPLASH_TIME")
            .and_then(|value| value.trim().parse::<u64>().ok())
            .map(|secs| secs.clamp(1, 5))
            .unwrap_or(DEFAULT_SPLASH_SECONDS)
    }

    pub fn bgm_dir(&self) -> &str {
        self.global("BGM_DIR").unwrap_or("assets/bgm")
    }

    pub fn bgm_player(&self) -> &str {
        self.global("BGM_PLAYER")
            .filter(|cmd| !cmd.trim().is_empty())
            .unwrap_or(DEFAULT_BGM_PLAYER)
    }

    pub fn screenshot_dir(&self) -> &str {
        self.global("SCREENSHOT_DIR").unwrap_or("assets/screenshots")
    }

    pub fn is_debug(&self) -> bool {
        self.global("DEBUG")
            .map(|value| matches!(value.to_lowercase().as_str(), "true" | "1" | "yes" | "on"))
            .unwrap_or(false)
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Loads the launcher config file from disk.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_path: Utf8PathBuf,
}

impl ConfigManager {
    /// Create a new ConfigManager for the given launcher config file.
    pub fn new<P: AsRef<Utf8Path>>(config_path: P) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
        }
    }

    /// Load the launcher config.
    ///
    /// # Returns
    /// The parsed config, or an empty config if the file doesn't exist
    pub fn load(&self) -> Result<LauncherConfig> {
        if !self.config_path.exists() {
            tracing::warn!(
                "Launcher config not found at {}, starting with no categories",
                self.config_path
            );
            return Ok(LauncherConfig::default());
        }

        let contents = fs::read_to_string(&self.config_path)
            .with_context(|| format!("Failed to read launcher config: {}", self.config_path))?;

        let config = LauncherConfig::parse(&contents);
        tracing::info!(
            "Loaded launcher config from {} ({} categories)",
            self.config_path,
            config.category_count()
        );
        Ok(config)
    }

    pub fn config_path(&self) -> &Utf8Path {
        &self.config_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"
; globals
ROM_BASE=/mnt/roms
CORE_PATH=/opt/cores
TYPE_RA=./scripts/ra.sh
TYPE_SA_DRASTIC=$ROM_BASE/../drastic/launch.sh

-TITLE=NES
-DIR=FC
-EXT=nes, zip
-CORE=nestopia,SA:RETROARCH_ALT
-TITLE_IMG=./assets/nes.png

-TITLE=PSP
-DIR=/media/psp
-EXT=iso,cso
-TYPE=PPSSPP
-CORE=ppsspp
"#;

    #[test]
    fn test_parse_globals_and_categories() {
        let config = LauncherConfig::parse(SAMPLE);

        assert_eq!(config.category_count(), 2);
        assert_eq!(config.emulator_path("RA"), Some("./scripts/ra.sh"));
        assert_eq!(config.core_path(), Some(Utf8Path::new("/opt/cores")));

        let nes = config.category("NES").unwrap();
        assert_eq!(nes.directory, Utf8PathBuf::from("/mnt/roms/FC"));
        assert_eq!(nes.extensions, vec!["nes", "zip"]);
        assert_eq!(nes.cores, vec!["nestopia", "SA:RETROARCH_ALT"]);
        assert_eq!(nes.title_image, "assets/nes.png");

        let psp = config.category("PSP").unwrap();
        assert_eq!(psp.directory, Utf8PathBuf::from("/media/psp"));
        assert_eq!(psp.emulator_type, "PPSSPP");
    }

    #[test]
    fn test_categories_keep_file_order() {
        let config = LauncherConfig::parse(SAMPLE);
        let names: Vec<&str> = config.categories().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["NES", "PSP"]);
    }

    #[test]
    fn test_global_variable_expansion() {
        let config = LauncherConfig::parse(SAMPLE);
        assert_eq!(
            config.emulator_path("SA_DRASTIC"),
            Some("/mnt/roms/../drastic/launch.sh")
        );
    }

    #[test]
    fn test_unknown_variable_left_untouched() {
        let config = LauncherConfig::parse("BGM_DIR=${ROMFRONT_TEST_UNSET_VARIABLE}/bgm\n");
        assert_eq!(config.bgm_dir(), "${ROMFRONT_TEST_UNSET_VARIABLE}/bgm");
    }

    #[test]
    fn test_relative_dir_without_rom_base() {
        let config = LauncherConfig::parse("-TITLE=GB\n-DIR=gb\n");
        assert_eq!(config.category("GB").unwrap().directory, Utf8PathBuf::from("gb"));
    }

    #[test]
    fn test_params_before_title_are_ignored() {
        let config = LauncherConfig::parse("-DIR=/tmp\n-TITLE=GB\n");
        assert_eq!(config.category("GB").unwrap().directory, Utf8PathBuf::new());
    }

    #[test]
    fn test_splash_time_clamped() {
        assert_eq!(LauncherConfig::parse("").splash_time(), 3);
        assert_eq!(LauncherConfig::parse("SPLASH_TIME=9").splash_time(), 5);
        assert_eq!(LauncherConfig::parse("SPLASH_TIME=0").splash_time(), 1);
        assert_eq!(LauncherConfig::parse("SPLASH_TIME=abc").splash_time(), 3);
    }

    #[test]
    fn test_debug_flag() {
        assert!(LauncherConfig::parse("DEBUG=On").is_debug());
        assert!(!LauncherConfig::parse("DEBUG=no").is_debug());
        assert!(!LauncherConfig::parse("").is_debug());
    }

    #[test]
    fn test_empty_emulator_path_is_unset() {
        let config = LauncherConfig::parse("TYPE_RA=\n");
        assert_eq!(config.emulator_path("RA"), None);
    }

    #[test]
    fn test_missing_file_gives_empty_config() {
        let temp_dir = TempDir::new().unwrap();
        let path = Utf8PathBuf::try_from(temp_dir.path().join("missing.cfg")).unwrap();

        let config = ConfigManager::new(&path).load().unwrap();
        assert_eq!(config.category_count(), 0);
    }

    #[test]
    fn test_load_from_disk() {
        let temp_dir = TempDir::new().unwrap();
        let path = Utf8PathBuf::try_from(temp_dir.path().join("launcher.cfg")).unwrap();
        fs::write(&path, SAMPLE).unwrap();

        let manager = ConfigManager::new(&path);
        let config = manager.load().unwrap();
        assert!(config.category("NES").is_some());
        assert_eq!(manager.config_path(), path.as_path());
    }
}
