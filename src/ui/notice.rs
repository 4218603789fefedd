/// Frames a notice stays visible by default (2 seconds at 30 fps).
pub const DEFAULT_NOTICE_FRAMES: u32 = 60;

/// Short-lived message shown over the active screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Notice {
    message: String,
    remaining_frames: u32,
}

impl Notice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace any visible message.
    pub fn show(&mut self, message: impl Into<String>, frames: u32) {
        self.message = message.into();
        self.remaining_frames = frames;
        tracing::debug!("Notice: {}", self.message);
    }

    /// Count down one frame.
    pub fn tick(&mut self) {
        self.remaining_frames = self.remaining_frames.saturating_sub(1);
    }

    pub fn is_visible(&self) -> bool {
        self.remaining_frames > 0
    }

    /// The visible message, if any.
    pub fn message(&self) -> Option<&str> {
        self.is_visible().then_some(self.message.as_str())
    }
}
