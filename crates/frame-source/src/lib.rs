//! Video Frame Acquisition Boundary
//!
//! The pipeline never talks to a camera directly. It polls a [`FrameSource`]
//! for readiness and captures a downsampled RGBA [`PixelBuffer`] that lives
//! for exactly one pipeline tick.

pub mod buffer;
pub mod synthetic;

pub use buffer::{PixelBuffer, MAX_ANALYSIS_DIM};
pub use synthetic::SyntheticSource;

use thiserror::Error;

/// Frame acquisition error types
#[derive(Error, Debug)]
pub enum FrameError {
    #[error("Frame source not ready")]
    NotReady,

    #[error("Capture failed: {0}")]
    Capture(String),

    #[error("Frame source released")]
    Released,
}

/// Readiness snapshot of a video source, polled once per tick.
///
/// A source is ready when it has known non-zero dimensions and at least one
/// decodable frame buffered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameStatus {
    /// Native frame width (0 = unknown)
    pub width: u32,
    /// Native frame height (0 = unknown)
    pub height: u32,
    /// Whether a frame is currently available to capture
    pub has_frame: bool,
}

impl FrameStatus {
    /// Whether the source can be captured from this tick
    pub fn is_ready(&self) -> bool {
        self.width > 0 && self.height > 0 && self.has_frame
    }
}

/// A live video frame source, polled (never pushed) by the scheduler.
pub trait FrameSource: Send + 'static {
    /// Report current readiness. Must be cheap; called every tick.
    fn status(&self) -> FrameStatus;

    /// Capture the current frame, downsampled so that neither dimension
    /// exceeds `max_dim`.
    fn capture(&mut self, max_dim: u32) -> Result<PixelBuffer, FrameError>;

    /// Release the underlying media resources. Called exactly once when the
    /// session stops; subsequent captures must fail with
    /// [`FrameError::Released`].
    fn release(&mut self);
}
