// Runtime metrics module
//
// Lightweight counters for launches, screen transitions and frames

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Runtime metrics for one run of the launcher
///
/// Uses atomic operations so counters can be bumped through a shared reference.
/// A summary is logged when the process exits, which includes the exit right after
/// a successful launch.
#[derive(Debug)]
pub struct Metrics {
    /// Launch attempts handed to the launcher
    pub launches_started: AtomicU64,

    /// Launches where the emulator ran and exited normally
    pub launches_succeeded: AtomicU64,

    /// Launches that failed before or right after spawning
    pub launches_failed: AtomicU64,

    /// Time spent inside emulators in milliseconds
    pub play_time_ms: AtomicU64,

    /// Number of screen changes
    pub state_transitions: AtomicU64,

    /// Frames processed by the controller
    pub frames: AtomicU64,

    /// Application start time
    start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            launches_started: AtomicU64::new(0),
            launches_succeeded: AtomicU64::new(0),
            launches_failed: AtomicU64::new(0),
            play_time_ms: AtomicU64::new(0),
            state_transitions: AtomicU64::new(0),
            frames: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_launch_started(&self) {
        self.launches_started.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a successful launch and the time the emulator ran
    pub fn record_launch_succeeded(&self, play_time: Duration) {
        self.launches_succeeded.fetch_add(1, Ordering::Relaxed);
        self.play_time_ms
            .fetch_add(play_time.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn record_launch_failed(&self) {
        self.launches_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_state_transition(&self) {
        self.state_transitions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_frame(&self) {
        self.frames.fetch_add(1, Ordering::Relaxed);
    }

    /// Get total uptime
    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Log metrics summary
    pub fn log_summary(&self) {
        let uptime = self.uptime();
        tracing::info!("=== Runtime Metrics Summary ===");
        tracing::info!(
            "Uptime: {:.2}s, frames: {}",
            uptime.as_secs_f64(),
            self.frames.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Launches: {} started, {} succeeded, {} failed",
            self.launches_started.load(Ordering::Relaxed),
            self.launches_succeeded.load(Ordering::Relaxed),
            self.launches_failed.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Play time: {:.1}s, screen changes: {}",
            self.play_time_ms.load(Ordering::Relaxed) as f64 / 1000.0,
            self.state_transitions.load(Ordering::Relaxed)
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
