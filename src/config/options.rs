use crate::models::DEFAULT_HISTORY_LIMIT;
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;
use std::time::Duration;

/// Environment variable prefix for runtime options (e.g. `ROMFRONT_DATA_DIR`).
pub const ENV_PREFIX: &str = "ROMFRONT";

/// Process-level options, separate from the launcher config file.
///
/// Sources, lowest priority first:
/// 1. Built-in defaults
/// 2. Optional options file (`romfront.toml` next to the working directory)
/// 3. `ROMFRONT_*` environment variables
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppOptions {
    /// Directory holding the JSON data files.
    pub data_dir: Utf8PathBuf,

    /// Launcher config file (categories and emulator paths).
    pub config_file: Utf8PathBuf,

    pub log_dir: Utf8PathBuf,

    pub debug: bool,

    pub console_log: bool,

    /// Frames per second of the update loop.
    pub frame_rate: u32,

    /// How long a freshly spawned emulator must survive to count as started.
    pub launch_grace_ms: u64,

    /// Play history size used when `history.json` doesn't exist yet.
    pub history_limit: usize,

    /// Base directory for relative emulator paths. Defaults to the executable's directory.
    pub base_dir: Option<Utf8PathBuf>,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            data_dir: Utf8PathBuf::from("data"),
            config_file: Utf8PathBuf::from("data/launcher.cfg"),
            log_dir: Utf8PathBuf::from("logs"),
            debug: false,
            console_log: true,
            frame_rate: 30,
            launch_grace_ms: 100,
            history_limit: DEFAULT_HISTORY_LIMIT,
            base_dir: None,
        }
    }
}

impl AppOptions {
    /// Load options from `romfront.toml` (if present) and the environment.
    pub fn load() -> Result<Self> {
        Self::load_from(Some(Utf8Path::new("romfront.toml")))
    }

    /// Load options from an optional file plus the environment.
    pub fn load_from(options_file: Option<&Utf8Path>) -> Result<Self> {
        let mut builder = ::config::Config::builder();

        if let Some(path) = options_file {
            builder = builder.add_source(::config::File::from(path.as_std_path()).required(false));
        }

        let options = builder
            .add_source(::config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .context("Failed to collect runtime options")?
            .try_deserialize::<AppOptions>()
            .context("Failed to parse runtime options")?;

        Ok(options)
    }

    /// Base directory used to resolve relative emulator paths.
    ///
    /// Emulators inherit an unpredictable working directory, so this never falls
    /// back to the current directory unless the executable path is unavailable.
    pub fn resolved_base_dir(&self) -> Utf8PathBuf {
        if let Some(dir) = &self.base_dir {
            return dir.clone();
        }

        std::env::current_exe()
            .ok()
            .and_then(|exe| Utf8PathBuf::try_from(exe).ok())
            .and_then(|exe| exe.parent().map(Utf8Path::to_path_buf))
            .unwrap_or_else(|| Utf8PathBuf::from("."))
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs(1) / self.frame_rate.max(1)
    }

    pub fn launch_grace(&self) -> Duration {
        Duration::from_millis(self.launch_grace_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let options = AppOptions::default();
        assert_eq!(options.data_dir, Utf8PathBuf::from("data"));
        assert_eq!(options.frame_rate, 30);
        assert_eq!(options.launch_grace(), Duration::from_millis(100));
        assert_eq!(options.history_limit, 50);
    }

    #[test]
    fn test_missing_options_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = Utf8PathBuf::try_from(temp_dir.path().join("absent.toml")).unwrap();

        let options = AppOptions::load_from(Some(&path)).unwrap();
        assert_eq!(options.log_dir, Utf8PathBuf::from("logs"));
    }

    #[test]
    fn test_options_file_overrides_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = Utf8PathBuf::try_from(temp_dir.path().join("romfront.toml")).unwrap();
        fs::write(
            &path,
            "data_dir = \"/userdata/romfront\"\nframe_rate = 60\nbase_dir = \"/opt/romfront\"\n",
        )
        .unwrap();

        let options = AppOptions::load_from(Some(&path)).unwrap();
        assert_eq!(options.data_dir, Utf8PathBuf::from("/userdata/romfront"));
        assert_eq!(options.frame_rate, 60);
        assert_eq!(options.resolved_base_dir(), Utf8PathBuf::from("/opt/romfront"));
        // Untouched keys keep their defaults
        assert_eq!(options.launch_grace_ms, 100);
    }

    #[test]
    fn test_frame_interval_guards_zero() {
        let options = AppOptions {
            frame_rate: 0,
            ..Default::default()
        };
        assert_eq!(options.frame_interval(), Duration::from_secs(1));
    }
}
