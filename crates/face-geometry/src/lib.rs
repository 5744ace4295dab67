//! Facial Region Geometry
//!
//! Shared geometric primitives for the skin pipeline:
//! - Normalized face landmarks in [0,1] frame coordinates
//! - Pixel-space polygons with containment and interior scanning
//! - Convex hull reduction for clean, non-self-intersecting outlines

pub mod hull;
pub mod polygon;

pub use hull::convex_hull;
pub use polygon::{PixelPoint, PixelPolygon};

use serde::{Deserialize, Serialize};

/// A 2D face landmark normalized to [0,1] relative to frame width/height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedLandmark {
    pub x: f32,
    pub y: f32,
}

impl NormalizedLandmark {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Whether both coordinates are finite numbers. Detectors occasionally
    /// emit NaN for occluded mesh vertices; those points are dropped.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Scale normalized landmarks to pixel space, optionally mirroring
/// horizontally to match a front-facing camera preview.
///
/// Coordinates are clamped into the target dimensions so a landmark slightly
/// outside [0,1] cannot index out of the buffer.
pub fn scale_to_pixels(
    points: &[NormalizedLandmark],
    width: u32,
    height: u32,
    mirror: bool,
) -> Vec<PixelPoint> {
    let w = width.saturating_sub(1).max(1) as f32;
    let h = height.saturating_sub(1).max(1) as f32;
    points
        .iter()
        .filter(|p| p.is_finite())
        .map(|p| {
            let x = if mirror { 1.0 - p.x } else { p.x };
            PixelPoint {
                x: (x.clamp(0.0, 1.0) * w).round() as i32,
                y: (p.y.clamp(0.0, 1.0) * h).round() as i32,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_maps_unit_square_to_frame() {
        let pts = vec![
            NormalizedLandmark::new(0.0, 0.0),
            NormalizedLandmark::new(1.0, 1.0),
            NormalizedLandmark::new(0.5, 0.5),
        ];
        let scaled = scale_to_pixels(&pts, 321, 181, false);
        assert_eq!(scaled[0], PixelPoint { x: 0, y: 0 });
        assert_eq!(scaled[1], PixelPoint { x: 320, y: 180 });
        assert_eq!(scaled[2], PixelPoint { x: 160, y: 90 });
    }

    #[test]
    fn test_mirror_flips_x_only() {
        let pts = vec![NormalizedLandmark::new(0.25, 0.4)];
        let scaled = scale_to_pixels(&pts, 101, 101, true);
        assert_eq!(scaled[0], PixelPoint { x: 75, y: 40 });
    }

    #[test]
    fn test_non_finite_points_dropped() {
        let pts = vec![
            NormalizedLandmark::new(f32::NAN, 0.5),
            NormalizedLandmark::new(0.5, f32::INFINITY),
            NormalizedLandmark::new(0.5, 0.5),
        ];
        assert_eq!(scale_to_pixels(&pts, 100, 100, false).len(), 1);
    }

    #[test]
    fn test_out_of_range_points_clamped() {
        let pts = vec![NormalizedLandmark::new(1.5, -0.2)];
        let scaled = scale_to_pixels(&pts, 101, 101, false);
        assert_eq!(scaled[0], PixelPoint { x: 100, y: 0 });
    }
}
