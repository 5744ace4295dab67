//! Landmark-to-region mapping
//!
//! Slices a 468-point face-mesh landmark array into named polygonal regions
//! using fixed index tables. Validation is permissive: malformed points are
//! dropped silently and a region only disappears when fewer than 6 valid
//! points survive.

use crate::{RegionMap, RegionName};
use face_geometry::NormalizedLandmark;

/// Minimum valid boundary points for a region polygon to be usable
pub const MIN_REGION_POINTS: usize = 6;

/// Face-mesh indices outlining the forehead
const FOREHEAD: [usize; 16] = [
    10, 338, 297, 332, 284, 333, 299, 337, 151, 108, 69, 104, 68, 103, 67, 109,
];

/// Face-mesh indices outlining the left cheek
const LEFT_CHEEK: [usize; 11] = [234, 227, 116, 117, 118, 101, 36, 205, 187, 147, 123];

/// Face-mesh indices outlining the right cheek
const RIGHT_CHEEK: [usize; 11] = [454, 447, 345, 346, 347, 330, 266, 425, 411, 376, 352];

fn region_indices(region: RegionName) -> &'static [usize] {
    match region {
        RegionName::Forehead => &FOREHEAD,
        RegionName::LeftCheek => &LEFT_CHEEK,
        RegionName::RightCheek => &RIGHT_CHEEK,
    }
}

/// Map a raw landmark array into named facial regions.
///
/// Returns `None` when the landmark source is absent or yields no usable
/// region at all. Regions with fewer than [`MIN_REGION_POINTS`] surviving
/// points are omitted individually; the rest of the map is unaffected.
/// Never fails.
pub fn extract_regions(landmarks: Option<&[NormalizedLandmark]>) -> Option<RegionMap> {
    let landmarks = landmarks?;
    if landmarks.is_empty() {
        return None;
    }

    let mut map = RegionMap::new();
    for region in RegionName::ALL {
        let points: Vec<NormalizedLandmark> = region_indices(region)
            .iter()
            .filter_map(|&idx| landmarks.get(idx))
            .filter(|p| p.is_finite())
            .copied()
            .collect();

        if points.len() >= MIN_REGION_POINTS {
            map.insert(region, points);
        } else if !points.is_empty() {
            tracing::trace!(
                region = region.label(),
                valid = points.len(),
                "region dropped, too few valid landmarks"
            );
        }
    }

    if map.is_empty() {
        None
    } else {
        Some(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A full 468-point mesh laid out on a grid
    fn full_mesh() -> Vec<NormalizedLandmark> {
        (0..468)
            .map(|i| NormalizedLandmark::new((i % 24) as f32 / 24.0, (i / 24) as f32 / 20.0))
            .collect()
    }

    #[test]
    fn test_null_landmarks_yield_none() {
        assert!(extract_regions(None).is_none());
    }

    #[test]
    fn test_empty_landmarks_yield_none() {
        assert!(extract_regions(Some(&[])).is_none());
    }

    #[test]
    fn test_full_mesh_yields_all_regions() {
        let mesh = full_mesh();
        let map = extract_regions(Some(&mesh)).unwrap();
        assert_eq!(map.len(), 3);
        for (_, points) in &map {
            assert!(points.len() >= MIN_REGION_POINTS);
        }
    }

    #[test]
    fn test_short_array_drops_out_of_range_regions() {
        // Only the first 200 mesh points: right cheek indices (>= 266) are
        // all out of range, forehead and left cheek partially survive.
        let mesh: Vec<_> = full_mesh().into_iter().take(200).collect();
        let map = extract_regions(Some(&mesh)).unwrap();
        assert!(!map.contains_key(&RegionName::RightCheek));
        assert!(map.contains_key(&RegionName::LeftCheek));
    }

    #[test]
    fn test_malformed_points_dropped_not_fatal() {
        let mut mesh = full_mesh();
        // Poison a few forehead points; the region keeps its remaining
        // valid points.
        mesh[10] = NormalizedLandmark::new(f32::NAN, 0.5);
        mesh[338] = NormalizedLandmark::new(0.5, f32::NAN);
        let map = extract_regions(Some(&mesh)).unwrap();
        let forehead = &map[&RegionName::Forehead];
        assert_eq!(forehead.len(), FOREHEAD.len() - 2);
    }

    #[test]
    fn test_region_below_minimum_is_omitted_alone() {
        let mut mesh = full_mesh();
        // Invalidate all but 5 forehead points
        for &idx in FOREHEAD.iter().skip(5) {
            mesh[idx] = NormalizedLandmark::new(f32::NAN, f32::NAN);
        }
        let map = extract_regions(Some(&mesh)).unwrap();
        assert!(!map.contains_key(&RegionName::Forehead));
        assert!(map.contains_key(&RegionName::LeftCheek));
        assert!(map.contains_key(&RegionName::RightCheek));
    }
}
