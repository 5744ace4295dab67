//! Skin metric computation
//!
//! Samples pixels inside each region polygon on the lighting-normalized
//! buffer and derives texture, redness and shine scores plus a confidence
//! estimate. Falls back to a whole-frame heuristic when no usable region is
//! available. Deterministic for identical inputs and never panics.

use crate::{clamp_score, MetricSource, RegionMap, RegionMetrics, SkinMetrics};
use face_geometry::{scale_to_pixels, PixelPolygon};
use frame_source::{buffer::luma, PixelBuffer};
use std::collections::{BTreeMap, VecDeque};

/// Luma above which a pixel counts as a specular highlight
const SPECULAR_LUMA: f32 = 220.0;

/// Mean neighbor luma difference that maps texture to 0
const CONTRAST_FULL_SCALE: f32 = 40.0;

/// Red-channel deviation that maps redness to 100
const REDNESS_FULL_SCALE: f32 = 64.0;

/// Highlight fraction that maps shine to 100
const SHINE_FULL_SCALE: f32 = 0.25;

/// ROI coverage (mask area / frame area) considered complete
const EXPECTED_COVERAGE: f32 = 0.08;

/// Raw-overall divergence from the rolling mean that zeroes stability
const STABILITY_FULL_SCALE: f32 = 25.0;

/// Minimum sampled pixels for a region to contribute
const MIN_REGION_AREA: usize = 16;

/// Confidence ceiling on the whole-frame fallback path
pub const FALLBACK_CONFIDENCE_CAP: f32 = 20.0;

/// Rolling-history length used for the stability term
pub const DEFAULT_CONFIDENCE_WINDOW: usize = 3;

/// Fixed weights for the overall score
const OVERALL_TEXTURE_WEIGHT: f32 = 0.45;
const OVERALL_REDNESS_WEIGHT: f32 = 0.30;
const OVERALL_SHINE_WEIGHT: f32 = 0.25;

/// Accumulates pixel statistics over a sampling mask
#[derive(Default)]
struct SampleAccumulator {
    count: usize,
    red_deviation_sum: f64,
    highlight_count: usize,
    gradient_sum: f64,
    gradient_count: usize,
}

impl SampleAccumulator {
    fn push(&mut self, px: [u8; 4], prev_luma_same_row: Option<f32>) {
        let l = luma(px[0], px[1], px[2]);
        self.count += 1;
        let baseline = (px[1] as f32 + px[2] as f32) / 2.0;
        self.red_deviation_sum += f64::from((px[0] as f32 - baseline).max(0.0));
        if l > SPECULAR_LUMA {
            self.highlight_count += 1;
        }
        if let Some(prev) = prev_luma_same_row {
            self.gradient_sum += f64::from((l - prev).abs());
            self.gradient_count += 1;
        }
    }

    fn finish(self) -> Option<(RegionMetrics, usize)> {
        if self.count < MIN_REGION_AREA {
            return None;
        }
        let contrast = if self.gradient_count > 0 {
            (self.gradient_sum / self.gradient_count as f64) as f32
        } else {
            0.0
        };
        let texture = clamp_score(100.0 * (1.0 - contrast / CONTRAST_FULL_SCALE));
        let red_dev = (self.red_deviation_sum / self.count as f64) as f32;
        let redness = clamp_score(100.0 * red_dev / REDNESS_FULL_SCALE);
        let highlight_frac = self.highlight_count as f32 / self.count as f32;
        let shine = clamp_score(100.0 * (highlight_frac / SHINE_FULL_SCALE).min(1.0));
        Some((
            RegionMetrics {
                texture,
                redness,
                shine,
            },
            self.count,
        ))
    }
}

/// Fixed weighted combination of the three scores. Redness and shine count
/// against wellness, texture counts for it.
fn overall_of(m: &RegionMetrics) -> f32 {
    clamp_score(
        OVERALL_TEXTURE_WEIGHT * m.texture
            + OVERALL_REDNESS_WEIGHT * (100.0 - m.redness)
            + OVERALL_SHINE_WEIGHT * (100.0 - m.shine),
    )
}

/// Per-session metric computer carrying the rolling raw-overall history used
/// for the confidence stability term.
pub struct MetricComputer {
    history: VecDeque<f32>,
    window: usize,
}

impl MetricComputer {
    pub fn new(window: usize) -> Self {
        Self {
            history: VecDeque::new(),
            window: window.max(1),
        }
    }

    /// Discard accumulated history (new session)
    pub fn reset(&mut self) {
        self.history.clear();
    }

    /// Compute this tick's raw metrics from the normalized buffer and the
    /// extracted regions, if any.
    pub fn compute(
        &mut self,
        buf: &PixelBuffer,
        regions: Option<&RegionMap>,
        timestamp_ms: u64,
    ) -> SkinMetrics {
        let mut per_region: BTreeMap<_, RegionMetrics> = BTreeMap::new();
        let mut total_area = 0usize;
        let mut tex_sum = 0.0f64;
        let mut red_sum = 0.0f64;
        let mut shine_sum = 0.0f64;

        if let Some(map) = regions {
            for (&name, points) in map {
                if let Some((m, area)) = region_stats(buf, points) {
                    tex_sum += f64::from(m.texture) * area as f64;
                    red_sum += f64::from(m.redness) * area as f64;
                    shine_sum += f64::from(m.shine) * area as f64;
                    total_area += area;
                    per_region.insert(name, m);
                }
            }
        }

        let metrics = if per_region.is_empty() {
            self.fallback_from_frame(buf, timestamp_ms)
        } else {
            let aggregate = RegionMetrics {
                texture: clamp_score((tex_sum / total_area as f64) as f32),
                redness: clamp_score((red_sum / total_area as f64) as f32),
                shine: clamp_score((shine_sum / total_area as f64) as f32),
            };
            let overall = overall_of(&aggregate);
            let coverage = total_area as f32 / buf.pixel_count().max(1) as f32;
            let confidence = self.confidence(coverage, overall);
            SkinMetrics {
                texture: aggregate.texture,
                redness: aggregate.redness,
                shine: aggregate.shine,
                overall,
                confidence,
                source: MetricSource::Landmark,
                timestamp_ms,
                regions: Some(per_region),
            }
        };

        self.remember(metrics.overall);
        metrics
    }

    /// Whole-frame heuristic: same statistics over every pixel, tagged as
    /// fallback with confidence capped low.
    fn fallback_from_frame(&self, buf: &PixelBuffer, timestamp_ms: u64) -> SkinMetrics {
        let mut acc = SampleAccumulator::default();
        for y in 0..buf.height {
            let mut prev = None;
            for x in 0..buf.width {
                if let Some(px) = buf.get_pixel(x, y) {
                    acc.push(px, prev);
                    prev = Some(luma(px[0], px[1], px[2]));
                }
            }
        }

        let m = acc
            .finish()
            .map(|(m, _)| m)
            .unwrap_or(RegionMetrics {
                texture: 50.0,
                redness: 50.0,
                shine: 50.0,
            });
        let overall = overall_of(&m);
        let confidence = self.confidence(0.0, overall).min(FALLBACK_CONFIDENCE_CAP);
        SkinMetrics {
            texture: m.texture,
            redness: m.redness,
            shine: m.shine,
            overall,
            confidence,
            source: MetricSource::Fallback,
            timestamp_ms,
            regions: None,
        }
    }

    /// Confidence from ROI coverage and temporal stability. Large
    /// frame-to-frame divergence of the raw overall score against its
    /// rolling mean models poor tracking.
    fn confidence(&self, coverage: f32, overall: f32) -> f32 {
        let coverage_score = (coverage / EXPECTED_COVERAGE).min(1.0);
        let stability_score = if self.history.is_empty() {
            1.0
        } else {
            let mean: f32 = self.history.iter().sum::<f32>() / self.history.len() as f32;
            1.0 - ((overall - mean).abs() / STABILITY_FULL_SCALE).min(1.0)
        };
        clamp_score(100.0 * (0.6 * coverage_score + 0.4 * stability_score))
    }

    fn remember(&mut self, overall: f32) {
        self.history.push_back(overall);
        while self.history.len() > self.window {
            self.history.pop_front();
        }
    }

    /// Safe emission for the scheduler's catch-all path: mid-range values,
    /// low confidence, fallback-tagged.
    pub fn safe_fallback(timestamp_ms: u64) -> SkinMetrics {
        SkinMetrics {
            texture: 50.0,
            redness: 50.0,
            shine: 50.0,
            overall: 50.0,
            confidence: 10.0,
            source: MetricSource::Fallback,
            timestamp_ms,
            regions: None,
        }
    }
}

impl Default for MetricComputer {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIDENCE_WINDOW)
    }
}

fn region_stats(buf: &PixelBuffer, points: &[face_geometry::NormalizedLandmark]) -> Option<(RegionMetrics, usize)> {
    let pixel_points = scale_to_pixels(points, buf.width, buf.height, false);
    if pixel_points.len() < 3 {
        return None;
    }
    let polygon = PixelPolygon::new(pixel_points);

    let mut acc = SampleAccumulator::default();
    let mut prev: Option<(i32, i32, f32)> = None;
    for p in polygon.interior_points() {
        if let Some(px) = buf.get_pixel(p.x as u32, p.y as u32) {
            let l = luma(px[0], px[1], px[2]);
            // Interior scan is row-major, so the previous sample is the left
            // neighbor exactly when it sits at (x-1, y).
            let left = match prev {
                Some((px_x, px_y, pl)) if px_y == p.y && px_x == p.x - 1 => Some(pl),
                _ => None,
            };
            acc.push(px, left);
            prev = Some((p.x, p.y, l));
        }
    }
    acc.finish()
}
