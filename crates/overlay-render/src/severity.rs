//! Anomaly severity scoring
//!
//! Four severity scores per region from fixed thresholds against the
//! region's smoothed metrics. The single highest score above the minimum
//! threshold wins; below it the region gets a neutral baseline guide.

use image::Rgba;
use skin_analysis::{RegionMetrics, RegionName};

/// Minimum severity for an anomaly to be highlighted at all
pub const MIN_HIGHLIGHT_SEVERITY: f32 = 0.2;

/// Texture score below which a deficit starts registering
const TEXTURE_DEFICIT_THRESHOLD: f32 = 60.0;

/// Redness score above which excess redness starts registering
const REDNESS_EXCESS_THRESHOLD: f32 = 40.0;

/// Shine score above which oiliness starts registering
const OILINESS_EXCESS_THRESHOLD: f32 = 45.0;

/// Shine score below which dryness starts registering (combined with a
/// degraded texture term; matte alone is not dryness)
const DRYNESS_SHINE_THRESHOLD: f32 = 20.0;
const DRYNESS_TEXTURE_THRESHOLD: f32 = 70.0;

/// Kinds of skin anomaly the overlay can highlight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnomalyKind {
    TextureDeficit,
    ExcessRedness,
    ExcessOiliness,
    ExcessDryness,
}

impl AnomalyKind {
    pub const ALL: [AnomalyKind; 4] = [
        AnomalyKind::TextureDeficit,
        AnomalyKind::ExcessRedness,
        AnomalyKind::ExcessOiliness,
        AnomalyKind::ExcessDryness,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            AnomalyKind::TextureDeficit => "uneven texture",
            AnomalyKind::ExcessRedness => "redness",
            AnomalyKind::ExcessOiliness => "oiliness",
            AnomalyKind::ExcessDryness => "dryness",
        }
    }

    pub fn color(&self) -> Rgba<u8> {
        match self {
            AnomalyKind::TextureDeficit => Rgba([176, 102, 255, 255]),
            AnomalyKind::ExcessRedness => Rgba([255, 72, 72, 255]),
            AnomalyKind::ExcessOiliness => Rgba([72, 196, 255, 255]),
            AnomalyKind::ExcessDryness => Rgba([255, 176, 64, 255]),
        }
    }
}

fn clamp01(v: f32) -> f32 {
    if v.is_finite() {
        v.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// All four severity scores for a region, in the fixed [`AnomalyKind::ALL`]
/// order. Every score lies in [0, 1].
pub fn anomaly_scores(m: &RegionMetrics) -> [(AnomalyKind, f32); 4] {
    let texture_deficit =
        clamp01((TEXTURE_DEFICIT_THRESHOLD - m.texture) / TEXTURE_DEFICIT_THRESHOLD);
    let excess_redness =
        clamp01((m.redness - REDNESS_EXCESS_THRESHOLD) / (100.0 - REDNESS_EXCESS_THRESHOLD));
    let excess_oiliness =
        clamp01((m.shine - OILINESS_EXCESS_THRESHOLD) / (100.0 - OILINESS_EXCESS_THRESHOLD));
    let excess_dryness = clamp01((DRYNESS_SHINE_THRESHOLD - m.shine) / DRYNESS_SHINE_THRESHOLD)
        * clamp01((DRYNESS_TEXTURE_THRESHOLD - m.texture) / DRYNESS_TEXTURE_THRESHOLD);

    [
        (AnomalyKind::TextureDeficit, texture_deficit),
        (AnomalyKind::ExcessRedness, excess_redness),
        (AnomalyKind::ExcessOiliness, excess_oiliness),
        (AnomalyKind::ExcessDryness, excess_dryness),
    ]
}

/// One region's highlight decision for the current tick. Derived from the
/// latest smoothed region metrics and consumed immediately by the renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayHighlight {
    pub region: RegionName,
    pub kind: AnomalyKind,
    /// Severity in [0, 1]; maps monotonically to fill opacity and glow
    pub severity: f32,
}

impl OverlayHighlight {
    pub fn color(&self) -> Rgba<u8> {
        self.kind.color()
    }
}

/// The highlight decision for one region, if any anomaly crosses the
/// significance threshold.
pub fn highlight_for(region: RegionName, m: &RegionMetrics) -> Option<OverlayHighlight> {
    dominant_anomaly(m).map(|(kind, severity)| OverlayHighlight {
        region,
        kind,
        severity,
    })
}

/// The single anomaly to highlight for a region, if any crosses the
/// threshold. Ties resolve to the earlier kind in the fixed order.
pub fn dominant_anomaly(m: &RegionMetrics) -> Option<(AnomalyKind, f32)> {
    anomaly_scores(m)
        .into_iter()
        .filter(|(_, s)| *s > MIN_HIGHLIGHT_SEVERITY)
        .fold(None, |best: Option<(AnomalyKind, f32)>, (kind, s)| match best {
            Some((_, bs)) if bs >= s => best,
            _ => Some((kind, s)),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(texture: f32, redness: f32, shine: f32) -> RegionMetrics {
        RegionMetrics {
            texture,
            redness,
            shine,
        }
    }

    #[test]
    fn test_healthy_region_has_no_dominant_anomaly() {
        // Smooth, calm, lightly hydrated skin: all severities <= 0.2
        let m = metrics(85.0, 30.0, 35.0);
        assert!(dominant_anomaly(&m).is_none());
        for (_, s) in anomaly_scores(&m) {
            assert!(s <= MIN_HIGHLIGHT_SEVERITY);
        }
    }

    #[test]
    fn test_high_redness_dominates() {
        let m = metrics(80.0, 90.0, 30.0);
        let (kind, severity) = dominant_anomaly(&m).unwrap();
        assert_eq!(kind, AnomalyKind::ExcessRedness);
        assert!(severity > 0.7);
    }

    #[test]
    fn test_dryness_needs_both_matte_and_rough() {
        // Matte but smooth: not dryness
        let smooth_matte = metrics(90.0, 20.0, 5.0);
        assert!(anomaly_scores(&smooth_matte)
            .iter()
            .all(|(k, s)| *k != AnomalyKind::ExcessDryness || *s < 0.01));

        // Matte and rough: dryness registers
        let dry = metrics(20.0, 20.0, 2.0);
        let (kind, _) = dominant_anomaly(&dry).unwrap();
        // Texture deficit also fires here; dryness must at least score
        let dryness = anomaly_scores(&dry)
            .iter()
            .find(|(k, _)| *k == AnomalyKind::ExcessDryness)
            .map(|(_, s)| *s)
            .unwrap();
        assert!(dryness > MIN_HIGHLIGHT_SEVERITY);
        assert!(matches!(
            kind,
            AnomalyKind::TextureDeficit | AnomalyKind::ExcessDryness
        ));
    }

    #[test]
    fn test_highlight_carries_region_and_color() {
        use skin_analysis::RegionName;

        let m = metrics(80.0, 90.0, 30.0);
        let h = highlight_for(RegionName::LeftCheek, &m).unwrap();
        assert_eq!(h.region, RegionName::LeftCheek);
        assert_eq!(h.kind, AnomalyKind::ExcessRedness);
        assert_eq!(h.color(), AnomalyKind::ExcessRedness.color());

        let healthy = metrics(85.0, 30.0, 35.0);
        assert!(highlight_for(RegionName::Forehead, &healthy).is_none());
    }

    #[test]
    fn test_oily_shine_registers() {
        let m = metrics(75.0, 25.0, 90.0);
        let (kind, severity) = dominant_anomaly(&m).unwrap();
        assert_eq!(kind, AnomalyKind::ExcessOiliness);
        assert!(severity > 0.5);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_scores_stay_in_unit_range(
                texture in 0.0f32..100.0,
                redness in 0.0f32..100.0,
                shine in 0.0f32..100.0
            ) {
                let m = metrics(texture, redness, shine);
                for (_, s) in anomaly_scores(&m) {
                    prop_assert!((0.0..=1.0).contains(&s));
                }
                if let Some((_, s)) = dominant_anomaly(&m) {
                    prop_assert!(s > MIN_HIGHLIGHT_SEVERITY);
                }
            }
        }
    }
}
