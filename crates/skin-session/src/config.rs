//! Session configuration

use crate::SessionError;
use overlay_render::OverlayStyle;
use skin_analysis::metrics::DEFAULT_CONFIDENCE_WINDOW;
use skin_analysis::DEFAULT_ALPHA;

/// Default processing rate; the preview renders much faster but analysis is
/// throttled to this.
pub const DEFAULT_TARGET_FPS: f32 = 2.0;

/// Cadence of the scheduler loop itself (animation-frame analog). The FPS
/// gate decides which of these ticks actually do work.
pub const LOOP_TICK_MS: u64 = 16;

/// Skin session configuration
#[derive(Clone)]
pub struct SessionConfig {
    /// Target processed frames per second
    pub target_fps: f32,
    /// Run landmark detection and paint the diagnostic overlay
    pub enable_overlay: bool,
    /// Mirror the overlay horizontally to match a front-facing preview
    pub mirror_overlay: bool,
    /// EMA decay constant for temporal smoothing
    pub smoothing_alpha: f32,
    /// Rolling-history length for the confidence stability term
    pub confidence_window: usize,
    /// Overlay visual styling
    pub overlay_style: OverlayStyle,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            target_fps: DEFAULT_TARGET_FPS,
            enable_overlay: false,
            mirror_overlay: true,
            smoothing_alpha: DEFAULT_ALPHA,
            confidence_window: DEFAULT_CONFIDENCE_WINDOW,
            overlay_style: OverlayStyle::default(),
        }
    }
}

impl SessionConfig {
    /// Minimum wall-clock milliseconds between two processed ticks
    pub fn frame_interval_ms(&self) -> u64 {
        (1000.0 / self.target_fps.clamp(0.1, 60.0)).round() as u64
    }

    pub fn validate(&self) -> Result<(), SessionError> {
        if !self.target_fps.is_finite() || self.target_fps <= 0.0 {
            return Err(SessionError::Config(format!(
                "target_fps must be positive, got {}",
                self.target_fps
            )));
        }
        if !self.smoothing_alpha.is_finite()
            || self.smoothing_alpha <= 0.0
            || self.smoothing_alpha > 1.0
        {
            return Err(SessionError::Config(format!(
                "smoothing_alpha must be in (0, 1], got {}",
                self.smoothing_alpha
            )));
        }
        Ok(())
    }
}
