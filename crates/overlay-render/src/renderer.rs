//! Overlay drawing
//!
//! Scales each region polygon to canvas pixels, reduces it to its convex
//! hull and paints either an anomaly highlight (severity-driven fill opacity
//! and glow) or a neutral baseline guide. Malformed regions are skipped
//! silently; the legend panel is drawn last, independent of data.

use crate::severity::{highlight_for, OverlayHighlight};
use crate::AnomalyKind;
use ab_glyph::{FontArc, PxScale};
use face_geometry::{convex_hull, scale_to_pixels, PixelPoint, PixelPolygon};
use image::{Pixel, Rgba, RgbaImage};
use imageproc::drawing::draw_antialiased_line_segment_mut;
use imageproc::pixelops::interpolate;
use skin_analysis::{RegionMap, RegionMetrics, RegionName};
use std::collections::BTreeMap;

/// Visual styling knobs for the overlay
#[derive(Clone)]
pub struct OverlayStyle {
    /// Draw the fixed legend panel
    pub show_legend: bool,
    /// Outline color for regions with no significant anomaly
    pub baseline_color: Rgba<u8>,
    /// Legend label font; swatch-only legend when absent
    pub font: Option<FontArc>,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            show_legend: true,
            baseline_color: Rgba([212, 212, 200, 255]),
            font: None,
        }
    }
}

/// Paints the diagnostic overlay into a caller-provided RGBA canvas.
pub struct OverlayRenderer {
    style: OverlayStyle,
}

impl OverlayRenderer {
    pub fn new(style: OverlayStyle) -> Self {
        Self { style }
    }

    /// Render one tick's overlay. The canvas is cleared first; regions
    /// missing from either map are skipped without complaint.
    pub fn render(
        &self,
        canvas: &mut RgbaImage,
        regions: &RegionMap,
        metrics: &BTreeMap<RegionName, RegionMetrics>,
        mirror: bool,
    ) {
        self.clear(canvas);
        let (w, h) = canvas.dimensions();
        if w == 0 || h == 0 {
            return;
        }

        for (name, points) in regions {
            let pixel_points = scale_to_pixels(points, w, h, mirror);
            if pixel_points.len() < 3 {
                continue;
            }
            let hull = convex_hull(&pixel_points);
            if hull.len() < 3 {
                tracing::trace!(region = name.label(), "degenerate hull, region skipped");
                continue;
            }

            match metrics.get(name).and_then(|m| highlight_for(*name, m)) {
                Some(highlight) => self.draw_highlight(canvas, &hull, highlight),
                None => self.draw_baseline(canvas, &hull),
            }
        }

        if self.style.show_legend {
            self.draw_legend(canvas);
        }
    }

    /// Reset the canvas to fully transparent. Also used on session stop.
    pub fn clear(&self, canvas: &mut RgbaImage) {
        for px in canvas.pixels_mut() {
            *px = Rgba([0, 0, 0, 0]);
        }
    }

    fn draw_highlight(&self, canvas: &mut RgbaImage, hull: &[PixelPoint], highlight: OverlayHighlight) {
        let severity = highlight.severity.clamp(0.0, 1.0);
        let base = highlight.color();

        // Severity maps monotonically to fill opacity and glow radius
        let fill_alpha = (30.0 + severity * 120.0) as u8;
        let fill = Rgba([base[0], base[1], base[2], fill_alpha]);
        let polygon = PixelPolygon::new(hull.to_vec());
        for p in polygon.interior_points() {
            blend_at(canvas, p.x, p.y, fill);
        }

        let glow_passes = 1 + (severity * 3.0).round() as u32;
        let centroid = centroid_of(hull);
        for pass in 0..glow_passes {
            let alpha = (200 / (pass + 1)).min(255) as u8;
            let color = Rgba([base[0], base[1], base[2], alpha]);
            let ring = expand_from_centroid(hull, centroid, pass as f32);
            outline(canvas, &ring, color);
        }
    }

    fn draw_baseline(&self, canvas: &mut RgbaImage, hull: &[PixelPoint]) {
        let c = self.style.baseline_color;
        outline(canvas, hull, Rgba([c[0], c[1], c[2], 140]));
    }

    fn draw_legend(&self, canvas: &mut RgbaImage) {
        const MARGIN: i32 = 8;
        const ROW_H: i32 = 16;
        const SWATCH: i32 = 10;

        let rows: Vec<(Rgba<u8>, &str)> = AnomalyKind::ALL
            .iter()
            .map(|k| (k.color(), k.label()))
            .chain(std::iter::once((self.style.baseline_color, "no anomaly")))
            .collect();

        let panel_w = if self.style.font.is_some() { 120 } else { SWATCH + 8 };
        let panel_h = ROW_H * rows.len() as i32 + 8;
        fill_rect_blend(canvas, MARGIN, MARGIN, panel_w, panel_h, Rgba([12, 12, 16, 170]));

        for (i, (color, label)) in rows.iter().enumerate() {
            let y = MARGIN + 4 + i as i32 * ROW_H;
            fill_rect_blend(canvas, MARGIN + 4, y, SWATCH, SWATCH, *color);
            if let Some(font) = &self.style.font {
                imageproc::drawing::draw_text_mut(
                    canvas,
                    Rgba([235, 235, 235, 255]),
                    MARGIN + 4 + SWATCH + 4,
                    y - 1,
                    PxScale::from(12.0),
                    font,
                    label,
                );
            }
        }
    }
}

impl Default for OverlayRenderer {
    fn default() -> Self {
        Self::new(OverlayStyle::default())
    }
}

fn blend_at(canvas: &mut RgbaImage, x: i32, y: i32, color: Rgba<u8>) {
    if x >= 0 && y >= 0 && (x as u32) < canvas.width() && (y as u32) < canvas.height() {
        canvas.get_pixel_mut(x as u32, y as u32).blend(&color);
    }
}

fn fill_rect_blend(canvas: &mut RgbaImage, x: i32, y: i32, w: i32, h: i32, color: Rgba<u8>) {
    for yy in y..y + h {
        for xx in x..x + w {
            blend_at(canvas, xx, yy, color);
        }
    }
}

fn outline(canvas: &mut RgbaImage, points: &[PixelPoint], color: Rgba<u8>) {
    let n = points.len();
    if n < 2 {
        return;
    }
    // Glow rings can extend past the canvas; clamp endpoints into bounds.
    let max_x = canvas.width().saturating_sub(1) as i32;
    let max_y = canvas.height().saturating_sub(1) as i32;
    let clamp = |p: PixelPoint| (p.x.clamp(0, max_x), p.y.clamp(0, max_y));
    for i in 0..n {
        let a = clamp(points[i]);
        let b = clamp(points[(i + 1) % n]);
        draw_antialiased_line_segment_mut(canvas, a, b, color, interpolate);
    }
}

fn centroid_of(points: &[PixelPoint]) -> (f32, f32) {
    let n = points.len().max(1) as f32;
    let sx: i64 = points.iter().map(|p| p.x as i64).sum();
    let sy: i64 = points.iter().map(|p| p.y as i64).sum();
    (sx as f32 / n, sy as f32 / n)
}

/// Push every vertex away from the centroid by `offset` pixels, producing
/// the expanded ring used for glow passes.
fn expand_from_centroid(points: &[PixelPoint], centroid: (f32, f32), offset: f32) -> Vec<PixelPoint> {
    if offset < 0.5 {
        return points.to_vec();
    }
    points
        .iter()
        .map(|p| {
            let dx = p.x as f32 - centroid.0;
            let dy = p.y as f32 - centroid.1;
            let len = (dx * dx + dy * dy).sqrt().max(1.0);
            PixelPoint {
                x: (p.x as f32 + dx / len * offset).round() as i32,
                y: (p.y as f32 + dy / len * offset).round() as i32,
            }
        })
        .collect()
}
