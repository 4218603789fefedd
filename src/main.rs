//! romfront - ROM browser and emulator launcher
//!
//! Main entry point for the launcher.
//!
//! # Overview
//!
//! This binary initializes:
//! - Runtime options ([`AppOptions`]) and the launcher config ([`ConfigManager`])
//! - Logging infrastructure (daily file rotation + optional console output)
//! - A current-thread tokio runtime driving the frame loop
//! - The services handed to the [`AppController`]
//!
//! # Execution Flow
//!
//! 1. Load options and `launcher.cfg`
//! 2. Initialize logging → logs/romfront.<date>
//! 3. Restore the saved session (if any) into the navigation manager
//! 4. Run frames at `frame_rate` until the controller asks to exit
//! 5. Log the metrics summary and exit with status 0
//!
//! After a successful emulator run the process exits on purpose: the device's
//! supervisor script restarts it, and the restored session puts the user back
//! where they were.

use anyhow::{Context, Result};
use romfront::logging::{self, LOG_PREFIX};
use romfront::metrics::Metrics;
use romfront::services::{BgmManager, PersistenceManager, TokioProcessRunner};
use romfront::ui::{AppServices, FrameOutcome, SplashScreen};
use romfront::{
    APP_NAME, AppController, AppOptions, ConfigManager, LauncherConfig, Launcher,
    NavigationManager, SessionBridge, VERSION,
};
use std::sync::Arc;
use tokio::time::MissedTickBehavior;

fn main() -> Result<()> {
    let options = AppOptions::load()?;
    let config = ConfigManager::new(&options.config_file).load()?;

    let _guard = logging::setup_logging_with_console(
        &options.log_dir,
        LOG_PREFIX,
        options.debug || config.is_debug(),
        options.console_log,
    )?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);
    tracing::info!(
        "Config {} with {} categories",
        options.config_file,
        config.category_count()
    );

    // Launches block the frame loop on purpose, so a single thread is enough
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create tokio runtime")?;

    let outcome = runtime.block_on(run(options, config))?;

    match outcome {
        FrameOutcome::ExitForRestart => tracing::info!("Exiting for restart after launch"),
        FrameOutcome::Quit => tracing::info!("Application shutdown complete"),
        FrameOutcome::Continue => {}
    }

    Ok(())
}

async fn run(options: AppOptions, config: LauncherConfig) -> Result<FrameOutcome> {
    let nav = NavigationManager::new();
    let persistence = PersistenceManager::new(&options.data_dir, options.history_limit);

    if SessionBridge::restore(&nav, &persistence) {
        tracing::info!("Resuming previous session after splash");
    }

    let splash = SplashScreen::for_duration(config.splash_time(), options.frame_rate);
    let bgm = BgmManager::new(config.bgm_dir(), config.bgm_player());
    let launcher = Launcher::new(
        TokioProcessRunner::new(options.launch_grace()),
        options.resolved_base_dir(),
    );
    let metrics = Arc::new(Metrics::new());

    let mut controller = AppController::new(AppServices {
        nav,
        config,
        persistence,
        launcher,
        bgm,
        metrics: Arc::clone(&metrics),
    });
    controller.register_screen(Box::new(splash));

    let mut interval = tokio::time::interval(options.frame_interval());
    // Don't replay the frames missed while an emulator was running
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut ctrl_c_available = true;

    let outcome = loop {
        tokio::select! {
            result = &mut ctrl_c, if ctrl_c_available => {
                if let Err(e) = result {
                    tracing::error!("Failed to listen for Ctrl-C: {}", e);
                    ctrl_c_available = false;
                    continue;
                }
                tracing::info!("Interrupted, saving session");
                controller.shutdown();
                break FrameOutcome::Quit;
            }
            _ = interval.tick() => {
                match controller.tick().await {
                    FrameOutcome::Continue => {}
                    outcome => break outcome,
                }
            }
        }
    };

    metrics.log_summary();
    Ok(outcome)
}
