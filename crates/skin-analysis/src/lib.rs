//! Skin Wellness Analysis
//!
//! Per-frame skin metric extraction from a downsampled video frame and a set
//! of face landmarks:
//! - Landmark-to-region mapping (forehead, cheeks)
//! - Lighting normalization to cancel exposure drift
//! - Texture / redness / shine metric computation with confidence estimation
//! - Exponential temporal smoothing, stateful per session

pub mod metrics;
pub mod normalize;
pub mod roi;
pub mod smoothing;

pub use metrics::{MetricComputer, FALLBACK_CONFIDENCE_CAP};
pub use normalize::{normalize_lighting, TARGET_LUMA};
pub use roi::extract_regions;
pub use smoothing::{MetricSmoother, DEFAULT_ALPHA};

use face_geometry::NormalizedLandmark;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A named facial region of interest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionName {
    Forehead,
    LeftCheek,
    RightCheek,
}

impl RegionName {
    /// All regions the extractor knows about
    pub const ALL: [RegionName; 3] = [
        RegionName::Forehead,
        RegionName::LeftCheek,
        RegionName::RightCheek,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            RegionName::Forehead => "forehead",
            RegionName::LeftCheek => "left cheek",
            RegionName::RightCheek => "right cheek",
        }
    }
}

/// Region name -> polygon boundary points, only for regions that survived
/// validation (at least 6 valid points each).
pub type RegionMap = BTreeMap<RegionName, Vec<NormalizedLandmark>>;

/// How a metrics emission was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricSource {
    /// Per-region computation from detected landmarks
    Landmark,
    /// Whole-frame heuristic, used when no usable ROI exists
    Fallback,
}

/// Per-region raw scores
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegionMetrics {
    pub texture: f32,
    pub redness: f32,
    pub shine: f32,
}

/// One tick's skin wellness metrics. Every numeric field is clamped to
/// [0, 100] by the producer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkinMetrics {
    pub texture: f32,
    pub redness: f32,
    pub shine: f32,
    pub overall: f32,
    pub confidence: f32,
    pub source: MetricSource,
    /// Capture timestamp in milliseconds
    pub timestamp_ms: u64,
    /// Per-region breakdown, absent on the fallback path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regions: Option<BTreeMap<RegionName, RegionMetrics>>,
}

/// Clamp a score into the [0, 100] contract range
pub(crate) fn clamp_score(v: f32) -> f32 {
    if v.is_finite() {
        v.clamp(0.0, 100.0)
    } else {
        0.0
    }
}
