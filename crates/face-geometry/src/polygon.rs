//! Pixel-space polygons with containment tests and interior scanning

/// A point in integer pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelPoint {
    pub x: i32,
    pub y: i32,
}

impl PixelPoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A closed polygon in pixel space.
///
/// Containment treats boundary pixels (vertices and edges) as inside, so a
/// thin region still yields samples.
#[derive(Debug, Clone)]
pub struct PixelPolygon {
    points: Vec<PixelPoint>,
}

impl PixelPolygon {
    pub fn new(points: Vec<PixelPoint>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[PixelPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Axis-aligned bounding box as (min_x, min_y, max_x, max_y)
    pub fn bounds(&self) -> Option<(i32, i32, i32, i32)> {
        let first = self.points.first()?;
        let mut bounds = (first.x, first.y, first.x, first.y);
        for p in &self.points {
            bounds.0 = bounds.0.min(p.x);
            bounds.1 = bounds.1.min(p.y);
            bounds.2 = bounds.2.max(p.x);
            bounds.3 = bounds.3.max(p.y);
        }
        Some(bounds)
    }

    /// Ray-casting point-in-polygon test, boundary inclusive.
    pub fn contains(&self, p: PixelPoint) -> bool {
        let n = self.points.len();
        if n < 3 {
            return false;
        }
        if self.on_boundary(p) {
            return true;
        }

        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let vi = self.points[i];
            let vj = self.points[j];
            if (vi.y > p.y) != (vj.y > p.y) && left_of_edge(p, vi, vj) {
                inside = !inside;
            }
            j = i;
        }
        inside
    }

    fn on_boundary(&self, p: PixelPoint) -> bool {
        let n = self.points.len();
        for i in 0..n {
            let a = self.points[i];
            let b = self.points[(i + 1) % n];
            if on_segment(p, a, b) {
                return true;
            }
        }
        false
    }

    /// Iterate every pixel inside the polygon, scanning the bounding box
    /// row by row.
    pub fn interior_points(&self) -> impl Iterator<Item = PixelPoint> + '_ {
        let bounds = if self.points.len() >= 3 {
            self.bounds()
        } else {
            None
        };
        bounds
            .into_iter()
            .flat_map(move |(min_x, min_y, max_x, max_y)| {
                (min_y..=max_y).flat_map(move |y| (min_x..=max_x).map(move |x| PixelPoint { x, y }))
            })
            .filter(move |p| self.contains(*p))
    }
}

fn on_segment(p: PixelPoint, a: PixelPoint, b: PixelPoint) -> bool {
    let cross = (p.y as i64 - a.y as i64) * (b.x as i64 - a.x as i64)
        - (p.x as i64 - a.x as i64) * (b.y as i64 - a.y as i64);
    if cross != 0 {
        return false;
    }
    p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x) && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
}

// Integer-only edge-side test to avoid float precision at region borders.
fn left_of_edge(p: PixelPoint, a: PixelPoint, b: PixelPoint) -> bool {
    let dx = (b.x - a.x) as i64;
    let dy = (b.y - a.y) as i64;
    if dy == 0 {
        return false;
    }
    let lhs = (p.x - a.x) as i64 * dy;
    let rhs = dx * (p.y - a.y) as i64;
    if dy > 0 {
        lhs < rhs
    } else {
        lhs > rhs
    }
}
