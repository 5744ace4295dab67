//! Skin Analysis Session
//!
//! Owns the real-time loop that turns live video frames plus face landmarks
//! into smoothed skin wellness metrics and an optional diagnostic overlay:
//!
//! - Frame scheduling under a target-FPS budget, decoupled from capture rate
//! - Graceful degradation when the source is not ready or landmarks are
//!   missing (whole-frame fallback, never an error to the caller)
//! - Single-slot asynchronous landmark detection (at most one outstanding
//!   inference; newer frames are dropped, not queued)
//! - Session lifecycle: Idle -> Running -> Idle, with full state reset on
//!   restart
//!
//! No exception ever propagates out of the pipeline: every failure path
//! resolves into a fallback metrics emission or a silently skipped tick.

pub mod config;
pub mod pipeline;
pub mod provider;
pub mod session;

pub use config::{SessionConfig, DEFAULT_TARGET_FPS};
pub use pipeline::{DispatchMode, SkinPipeline, TickOutcome};
pub use provider::{FixedLandmarkProvider, LandmarkProvider, NullLandmarkProvider};
pub use session::{OverlayCanvas, SkinSession};

pub use skin_analysis::{MetricSource, RegionMetrics, RegionName, SkinMetrics};

use thiserror::Error;

/// Session error types. Only `start()` can fail; a running session never
/// surfaces errors to the caller.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Overlay enabled but no overlay surface provided")]
    OverlaySurfaceMissing,

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Landmark detection error, caught at the dispatch site and never
/// propagated past it.
#[derive(Error, Debug)]
pub enum LandmarkError {
    #[error("Detector failure: {0}")]
    Detector(String),
}
