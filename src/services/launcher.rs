//! Emulator launch pipeline.
//!
//! [`Launcher::launch_rom`] turns a ROM, its category and an optional core override into
//! an emulator command, runs it to completion and reports the outcome. Background music
//! is stopped before anything else happens and resumed only if the launch fails.

use crate::config::LauncherConfig;
use crate::models::{Category, CoreSpec, CoreSpecError, RomFile, core_filename};
use crate::services::bgm::BackgroundMusic;
use camino::{Utf8Path, Utf8PathBuf};
use std::fmt;
use std::io::ErrorKind;
use std::process::Stdio;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::process::Command;

/// How long a new emulator process must stay alive to count as started.
pub const DEFAULT_LAUNCH_GRACE: Duration = Duration::from_millis(100);

/// Errors that can occur while launching a ROM
#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("ROM file not found: {0}")]
    RomNotFound(Utf8PathBuf),

    #[error("No core configured for category {0}")]
    NoCoreConfigured(String),

    #[error("Invalid core: {0}")]
    InvalidCoreSpec(#[from] CoreSpecError),

    #[error("{}", missing_emulator_message(.key))]
    EmulatorNotConfigured { key: String },

    #[error("Emulator not found: {0}")]
    EmulatorNotFound(Utf8PathBuf),

    #[error("Emulator exited immediately with code {code}")]
    ExitedImmediately { code: i32 },

    #[error("Failed to start emulator: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("Failed to wait for emulator: {0}")]
    Wait(#[source] std::io::Error),
}

fn missing_emulator_message(key: &str) -> String {
    if key == "RA" {
        "RetroArch path not configured (TYPE_RA)".to_string()
    } else if key.starts_with("SA_") {
        format!("Standalone emulator not configured (TYPE_{})", key)
    } else {
        format!("Emulator not configured (TYPE_{})", key)
    }
}

/// A fully resolved emulator invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchCommand {
    pub program: Utf8PathBuf,
    pub args: Vec<String>,
}

impl LaunchCommand {
    /// Program followed by its arguments.
    pub fn argv(&self) -> Vec<String> {
        std::iter::once(self.program.to_string())
            .chain(self.args.iter().cloned())
            .collect()
    }
}

impl fmt::Display for LaunchCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.argv().join(" "))
    }
}

/// Outcome of [`Launcher::launch_rom`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchReport {
    pub success: bool,
    /// Raw core string that was (or would have been) used.
    pub core_used: Option<String>,
    pub error: Option<String>,
    pub duration: Duration,
}

/// Runs a resolved command and supervises it until exit.
#[allow(async_fn_in_trait)]
pub trait ProcessRunner {
    async fn run(&self, command: &LaunchCommand) -> Result<(), LaunchError>;
}

/// Spawns the emulator with tokio and waits for it.
///
/// A process still alive after the grace period counts as a successful start. Its
/// exit code is only logged.
#[derive(Debug, Clone)]
pub struct TokioProcessRunner {
    grace: Duration,
}

impl TokioProcessRunner {
    pub fn new(grace: Duration) -> Self {
        Self { grace }
    }
}

impl Default for TokioProcessRunner {
    fn default() -> Self {
        Self::new(DEFAULT_LAUNCH_GRACE)
    }
}

impl ProcessRunner for TokioProcessRunner {
    async fn run(&self, command: &LaunchCommand) -> Result<(), LaunchError> {
        tracing::info!("Executing: {}", command);
        let start = Instant::now();

        let mut child = Command::new(command.program.as_std_path())
            .args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => LaunchError::EmulatorNotFound(command.program.clone()),
                _ => LaunchError::Spawn(e),
            })?;

        tokio::time::sleep(self.grace).await;

        if let Some(status) = child.try_wait().map_err(LaunchError::Wait)? {
            let code = status.code().unwrap_or(-1);
            tracing::warn!("Emulator exited during the first {:?} (code {})", self.grace, code);
            return Err(LaunchError::ExitedImmediately { code });
        }

        let status = child.wait().await.map_err(LaunchError::Wait)?;
        tracing::info!(
            "Emulator finished after {:.1}s with exit code {}",
            start.elapsed().as_secs_f32(),
            status.code().unwrap_or(-1)
        );

        Ok(())
    }
}

/// Resolves core specs into commands and supervises the emulator.
pub struct Launcher<R = TokioProcessRunner> {
    runner: R,
    /// Relative emulator paths in the config are resolved against this directory.
    base_dir: Utf8PathBuf,
    last_error: Option<LaunchError>,
}

impl<R: ProcessRunner> Launcher<R> {
    pub fn new(runner: R, base_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            runner,
            base_dir: base_dir.into(),
            last_error: None,
        }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Error from the most recent launch, cleared by a successful one.
    pub fn last_error(&self) -> Option<&LaunchError> {
        self.last_error.as_ref()
    }

    /// Resolve the command for `rom`, returning it with the raw core string used.
    ///
    /// `core_override` wins over the category's first core. RetroArch cores are invoked
    /// as `[TYPE_RA, CORE_PATH/<core>_libretro.so, rom]`, everything else as
    /// `[TYPE_<key>, rom]`.
    pub fn resolve_command(
        &self,
        rom: &RomFile,
        category: &Category,
        config: &LauncherConfig,
        core_override: Option<&str>,
    ) -> Result<(LaunchCommand, String), LaunchError> {
        let raw = core_override
            .filter(|core| !core.trim().is_empty())
            .or_else(|| category.default_core())
            .ok_or_else(|| LaunchError::NoCoreConfigured(category.name.clone()))?;

        let spec = CoreSpec::parse_with_default(raw, category.default_launcher_type())?;
        tracing::debug!("Core {} resolved to {}", raw, spec);

        let key = spec.executable_key();
        let program = config
            .emulator_path(&key)
            .map(|path| self.resolve_executable(path))
            .ok_or_else(|| LaunchError::EmulatorNotConfigured { key: key.clone() })?;

        let rom_arg = rom.path.to_string();
        let args = match &spec {
            CoreSpec::RetroArch(name) => {
                let file = core_filename(name);
                let core = match config.core_path() {
                    Some(dir) => dir.join(&file).into_string(),
                    None => file,
                };
                vec![core, rom_arg]
            }
            CoreSpec::Standalone(_) | CoreSpec::Custom { .. } => vec![rom_arg],
        };

        Ok((LaunchCommand { program, args }, raw.to_string()))
    }

    fn resolve_executable(&self, path: &str) -> Utf8PathBuf {
        let path = Utf8Path::new(path);
        if path.is_absolute() {
            return path.to_path_buf();
        }
        let relative = path.strip_prefix("./").unwrap_or(path);
        self.base_dir.join(relative)
    }

    /// Launch `rom` and wait for the emulator to exit.
    ///
    /// Music playing beforehand is stopped first. It is resumed on failure when the
    /// user still has it enabled, and left stopped on success since the app restarts.
    pub async fn launch_rom<M: BackgroundMusic + ?Sized>(
        &mut self,
        rom: &RomFile,
        category: &Category,
        config: &LauncherConfig,
        core_override: Option<&str>,
        bgm: &mut M,
    ) -> LaunchReport {
        let start = Instant::now();

        let bgm_was_playing = bgm.is_playing();
        if bgm_was_playing {
            tracing::debug!("Stopping BGM before launch");
            bgm.stop();
        }

        let mut core_used = None;
        let result = self
            .try_launch(rom, category, config, core_override, &mut core_used)
            .await;

        match result {
            Ok(()) => {
                tracing::info!("Launched {} with {}", rom.name, core_used.as_deref().unwrap_or("?"));
                self.last_error = None;
                LaunchReport {
                    success: true,
                    core_used,
                    error: None,
                    duration: start.elapsed(),
                }
            }
            Err(e) => {
                tracing::error!("Failed to launch {}: {}", rom.path, e);
                if bgm_was_playing && bgm.is_enabled() {
                    tracing::debug!("Resuming BGM after failed launch");
                    bgm.play();
                }
                let message = e.to_string();
                self.last_error = Some(e);
                LaunchReport {
                    success: false,
                    core_used,
                    error: Some(message),
                    duration: start.elapsed(),
                }
            }
        }
    }

    async fn try_launch(
        &self,
        rom: &RomFile,
        category: &Category,
        config: &LauncherConfig,
        core_override: Option<&str>,
        core_used: &mut Option<String>,
    ) -> Result<(), LaunchError> {
        if !rom.path.exists() {
            return Err(LaunchError::RomNotFound(rom.path.clone()));
        }

        let (command, core) = self.resolve_command(rom, category, config, core_override)?;
        *core_used = Some(core);
        self.runner.run(&command).await
    }
}
