//! Diagnostic Overlay Rendering
//!
//! Draws convex-hull outlines of each facial region over the camera preview,
//! highlighting the single most severe anomaly per region, or a neutral
//! baseline guide when nothing crosses the significance threshold. A fixed
//! legend panel is drawn last. The renderer tolerates partial or malformed
//! region data by skipping silently; it never fails.

pub mod renderer;
pub mod severity;

pub use renderer::{OverlayRenderer, OverlayStyle};
pub use severity::{
    anomaly_scores, dominant_anomaly, highlight_for, AnomalyKind, OverlayHighlight,
    MIN_HIGHLIGHT_SEVERITY,
};
