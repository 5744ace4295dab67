//! Temporal smoothing
//!
//! One exponential moving average per scalar output field. State lives for
//! the session and is reinitialized on session start, so a new session never
//! inherits the previous session's visual inertia.

use crate::metrics::FALLBACK_CONFIDENCE_CAP;
use crate::{clamp_score, MetricSource, SkinMetrics};

/// Default EMA decay constant
pub const DEFAULT_ALPHA: f32 = 0.25;

#[derive(Debug, Clone, Copy)]
struct FieldState {
    texture: f32,
    redness: f32,
    shine: f32,
    overall: f32,
    confidence: f32,
}

/// Stateful per-field EMA smoother: `s += alpha * (raw - s)`
#[derive(Debug)]
pub struct MetricSmoother {
    alpha: f32,
    state: Option<FieldState>,
}

impl MetricSmoother {
    pub fn new(alpha: f32) -> Self {
        Self {
            alpha: alpha.clamp(0.01, 1.0),
            state: None,
        }
    }

    /// Drop all accumulators; the next sample reseeds them
    pub fn reset(&mut self) {
        self.state = None;
    }

    /// Smooth one raw emission. The first sample seeds the accumulators;
    /// source, timestamp and per-region breakdown pass through unchanged.
    pub fn smooth(&mut self, raw: &SkinMetrics) -> SkinMetrics {
        let state = match self.state.as_mut() {
            Some(s) => {
                let a = self.alpha;
                s.texture += a * (raw.texture - s.texture);
                s.redness += a * (raw.redness - s.redness);
                s.shine += a * (raw.shine - s.shine);
                s.overall += a * (raw.overall - s.overall);
                s.confidence += a * (raw.confidence - s.confidence);
                *s
            }
            None => {
                let seeded = FieldState {
                    texture: raw.texture,
                    redness: raw.redness,
                    shine: raw.shine,
                    overall: raw.overall,
                    confidence: raw.confidence,
                };
                self.state = Some(seeded);
                seeded
            }
        };

        // A fallback-tagged emission keeps the raw path's confidence
        // ceiling even while the accumulator still carries a previous
        // landmark run. The accumulator itself keeps absorbing the raw
        // values so a recovered landmark run resumes smoothly.
        let confidence = match raw.source {
            MetricSource::Fallback => clamp_score(state.confidence).min(FALLBACK_CONFIDENCE_CAP),
            MetricSource::Landmark => clamp_score(state.confidence),
        };

        SkinMetrics {
            texture: clamp_score(state.texture),
            redness: clamp_score(state.redness),
            shine: clamp_score(state.shine),
            overall: clamp_score(state.overall),
            confidence,
            source: raw.source,
            timestamp_ms: raw.timestamp_ms,
            regions: raw.regions.clone(),
        }
    }
}

impl Default for MetricSmoother {
    fn default() -> Self {
        Self::new(DEFAULT_ALPHA)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MetricSource;

    fn raw(redness: f32) -> SkinMetrics {
        SkinMetrics {
            texture: 50.0,
            redness,
            shine: 50.0,
            overall: 50.0,
            confidence: 50.0,
            source: MetricSource::Landmark,
            timestamp_ms: 0,
            regions: None,
        }
    }

    #[test]
    fn test_redness_spike_decay_sequence() {
        // Raw sequence [80, 10, 10] at alpha 0.25 from an initial smoothed
        // value of 10 must produce 27.5, 23.125, 19.84...
        let mut smoother = MetricSmoother::new(0.25);
        smoother.smooth(&raw(10.0));
        assert!((smoother.smooth(&raw(80.0)).redness - 27.5).abs() < 1e-4);
        assert!((smoother.smooth(&raw(10.0)).redness - 23.125).abs() < 1e-4);
        assert!((smoother.smooth(&raw(10.0)).redness - 19.84375).abs() < 1e-4);
    }

    #[test]
    fn test_first_sample_seeds_state() {
        let mut smoother = MetricSmoother::default();
        let out = smoother.smooth(&raw(72.0));
        assert_eq!(out.redness, 72.0);
    }

    #[test]
    fn test_reset_discards_inertia() {
        let mut smoother = MetricSmoother::default();
        smoother.smooth(&raw(100.0));
        smoother.smooth(&raw(100.0));
        smoother.reset();
        // Fresh state: the next sample passes through unsmoothed
        assert_eq!(smoother.smooth(&raw(5.0)).redness, 5.0);
    }

    #[test]
    fn test_fallback_confidence_capped_after_confident_run() {
        let mut smoother = MetricSmoother::new(0.25);
        let mut confident = raw(40.0);
        confident.confidence = 90.0;
        for _ in 0..4 {
            smoother.smooth(&confident);
        }

        // Landmarks lost: the accumulator still sits near 90, but a
        // fallback emission must not report more than the cap
        let mut lost = raw(40.0);
        lost.source = MetricSource::Fallback;
        lost.confidence = 15.0;
        let out = smoother.smooth(&lost);
        assert_eq!(out.source, MetricSource::Fallback);
        assert!(out.confidence <= FALLBACK_CONFIDENCE_CAP);

        // Recovery resumes from the accumulator, not the capped value
        let back = smoother.smooth(&confident);
        assert_eq!(back.source, MetricSource::Landmark);
        assert!(back.confidence > FALLBACK_CONFIDENCE_CAP);
    }

    #[test]
    fn test_passthrough_of_non_scalar_fields() {
        let mut smoother = MetricSmoother::default();
        let mut m = raw(40.0);
        m.source = MetricSource::Fallback;
        m.timestamp_ms = 999;
        let out = smoother.smooth(&m);
        assert_eq!(out.source, MetricSource::Fallback);
        assert_eq!(out.timestamp_ms, 999);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_ema_step_bound(
                values in proptest::collection::vec(0.0f32..100.0, 2..30),
                alpha in 0.05f32..1.0
            ) {
                // |smoothed[t] - smoothed[t-1]| <= alpha * |raw[t] - smoothed[t-1]|
                let mut smoother = MetricSmoother::new(alpha);
                let mut prev = smoother.smooth(&raw(values[0])).redness;
                for &v in &values[1..] {
                    let next = smoother.smooth(&raw(v)).redness;
                    let bound = alpha * (v - prev).abs() + 1e-3;
                    prop_assert!((next - prev).abs() <= bound);
                    prev = next;
                }
            }

            #[test]
            fn prop_smoothed_stays_clamped(
                values in proptest::collection::vec(0.0f32..100.0, 1..30)
            ) {
                let mut smoother = MetricSmoother::default();
                for &v in &values {
                    let out = smoother.smooth(&raw(v));
                    prop_assert!((0.0..=100.0).contains(&out.redness));
                }
            }
        }
    }
}
