use crate::models::AppState;
use crate::state::SessionBridge;
use crate::ui::{Screen, ScreenContext};

/// Startup screen. Hands over to the restored session state after a fixed time.
#[derive(Debug, Clone)]
pub struct SplashScreen {
    duration_frames: u32,
    elapsed_frames: u32,
}

impl SplashScreen {
    pub fn new(duration_frames: u32) -> Self {
        Self {
            duration_frames: duration_frames.max(1),
            elapsed_frames: 0,
        }
    }

    /// Splash lasting `seconds` at `frame_rate` frames per second.
    pub fn for_duration(seconds: u64, frame_rate: u32) -> Self {
        let frames = seconds.saturating_mul(u64::from(frame_rate));
        Self::new(u32::try_from(frames).unwrap_or(u32::MAX))
    }
}

impl Screen for SplashScreen {
    fn state(&self) -> AppState {
        AppState::Splash
    }

    fn activate(&mut self, _ctx: &mut ScreenContext<'_>) {
        self.elapsed_frames = 0;
    }

    fn update(&mut self, ctx: &mut ScreenContext<'_>) {
        self.elapsed_frames += 1;
        if self.elapsed_frames >= self.duration_frames {
            let target = SessionBridge::finish_splash(ctx.nav);
            tracing::info!("Splash finished, entering {}", target);
        }
    }
}
