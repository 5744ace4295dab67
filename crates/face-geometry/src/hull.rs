//! Convex hull reduction (Andrew's monotone chain)

use crate::polygon::PixelPoint;

/// Reduce a point set to its convex hull, in counter-clockwise order.
///
/// The result is always a subset of the input points. Fewer than 3 distinct
/// non-collinear input points yield a degenerate hull (<3 points) that the
/// overlay renderer skips.
pub fn convex_hull(points: &[PixelPoint]) -> Vec<PixelPoint> {
    let mut pts: Vec<PixelPoint> = points.to_vec();
    pts.sort_by(|a, b| a.x.cmp(&b.x).then(a.y.cmp(&b.y)));
    pts.dedup();

    if pts.len() < 3 {
        return pts;
    }

    let mut lower: Vec<PixelPoint> = Vec::with_capacity(pts.len());
    for &p in &pts {
        while lower.len() >= 2 && cross(lower[lower.len() - 2], lower[lower.len() - 1], p) <= 0 {
            lower.pop();
        }
        lower.push(p);
    }

    let mut upper: Vec<PixelPoint> = Vec::with_capacity(pts.len());
    for &p in pts.iter().rev() {
        while upper.len() >= 2 && cross(upper[upper.len() - 2], upper[upper.len() - 1], p) <= 0 {
            upper.pop();
        }
        upper.push(p);
    }

    // Endpoints of each chain are the other chain's start
    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

/// Cross product of (b - a) x (c - a); positive = counter-clockwise turn
fn cross(a: PixelPoint, b: PixelPoint, c: PixelPoint) -> i64 {
    (b.x as i64 - a.x as i64) * (c.y as i64 - a.y as i64)
        - (b.y as i64 - a.y as i64) * (c.x as i64 - a.x as i64)
}
