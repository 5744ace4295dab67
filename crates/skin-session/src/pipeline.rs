//! Per-tick pipeline engine
//!
//! Pure tick logic, driven by the session loop (or directly by tests and
//! embedders with their own clock): FPS gate -> readiness gate -> capture ->
//! landmark refresh -> ROI -> lighting normalization -> metrics -> smoothing
//! -> overlay. Any failure inside a tick degrades to a safe fallback
//! emission; the engine itself never fails.

use crate::config::SessionConfig;
use crate::provider::LandmarkProvider;
use crate::{LandmarkError, OverlayCanvas};
use face_geometry::NormalizedLandmark;
use frame_source::{FrameError, FrameSource, PixelBuffer, MAX_ANALYSIS_DIM};
use overlay_render::OverlayRenderer;
use skin_analysis::{
    extract_regions, normalize_lighting, MetricComputer, MetricSmoother, RegionMap, SkinMetrics,
};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// How detector invocations leave the tick path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchMode {
    /// Off-thread via `tokio::task::spawn_blocking` (requires a runtime)
    Spawn,
    /// Synchronous, on the caller's thread. For tests and embedders that
    /// drive [`SkinPipeline::tick`] themselves.
    Inline,
}

/// Result of one scheduler tick
#[derive(Debug, Clone)]
pub enum TickOutcome {
    /// Below the FPS budget; rescheduled without doing any work
    Throttled,
    /// Video source not ready; tick skipped, nothing emitted
    NotReady,
    /// One smoothed metrics emission for the caller
    Emitted(SkinMetrics),
}

/// Single-slot landmark detection state shared with the worker invocation.
///
/// At most one detector call is outstanding per session; dispatches that
/// arrive while one is in flight drop their frame and the tick proceeds
/// with the last known landmarks.
struct DetectorSlot<P> {
    provider: Arc<Mutex<P>>,
    latest: Arc<Mutex<Option<Vec<NormalizedLandmark>>>>,
    in_flight: Arc<AtomicBool>,
    failure_logged: Arc<AtomicBool>,
}

impl<P> Clone for DetectorSlot<P> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
            latest: Arc::clone(&self.latest),
            in_flight: Arc::clone(&self.in_flight),
            failure_logged: Arc::clone(&self.failure_logged),
        }
    }
}

impl<P: LandmarkProvider> DetectorSlot<P> {
    fn new(provider: P) -> Self {
        Self {
            provider: Arc::new(Mutex::new(provider)),
            latest: Arc::new(Mutex::new(None)),
            in_flight: Arc::new(AtomicBool::new(false)),
            failure_logged: Arc::new(AtomicBool::new(false)),
        }
    }

    fn latest(&self) -> Option<Vec<NormalizedLandmark>> {
        match self.latest.lock() {
            Ok(guard) => guard.clone(),
            Err(_) => None,
        }
    }

    fn clear(&self) {
        if let Ok(mut guard) = self.latest.lock() {
            *guard = None;
        }
    }

    fn dispatch(&self, frame: PixelBuffer, mode: DispatchMode) {
        if self.in_flight.swap(true, Ordering::AcqRel) {
            // One inference already outstanding; this frame is dropped
            return;
        }
        let slot = self.clone();
        match mode {
            DispatchMode::Inline => slot.run(frame),
            DispatchMode::Spawn => {
                tokio::task::spawn_blocking(move || slot.run(frame));
            }
        }
    }

    fn run(&self, frame: PixelBuffer) {
        let result = match self.provider.lock() {
            Ok(mut provider) => provider.detect(&frame),
            Err(_) => Err(LandmarkError::Detector("provider lock poisoned".into())),
        };
        match result {
            Ok(update) => {
                if let Ok(mut latest) = self.latest.lock() {
                    *latest = update;
                }
                self.failure_logged.store(false, Ordering::Release);
            }
            Err(e) => {
                // Last known landmarks are retained; log once per streak
                if !self.failure_logged.swap(true, Ordering::AcqRel) {
                    tracing::warn!(error = %e, "landmark detection failed, reusing last landmarks");
                }
            }
        }
        self.in_flight.store(false, Ordering::Release);
    }
}

/// The per-session pipeline engine. The session loop calls [`tick`] with the
/// current wall-clock time; embedders may drive it from their own loop.
///
/// [`tick`]: SkinPipeline::tick
pub struct SkinPipeline<S, P> {
    config: SessionConfig,
    source: S,
    detector: DetectorSlot<P>,
    computer: MetricComputer,
    smoother: MetricSmoother,
    renderer: OverlayRenderer,
    overlay: Option<OverlayCanvas>,
    dispatch: DispatchMode,
    last_processed_ms: Option<u64>,
    ready_state: Option<bool>,
    not_ready_transitions: u32,
    tick_failure_logged: bool,
}

impl<S: FrameSource, P: LandmarkProvider> SkinPipeline<S, P> {
    pub fn new(
        config: SessionConfig,
        source: S,
        provider: P,
        overlay: Option<OverlayCanvas>,
        dispatch: DispatchMode,
    ) -> Self {
        let renderer = OverlayRenderer::new(config.overlay_style.clone());
        Self {
            computer: MetricComputer::new(config.confidence_window),
            smoother: MetricSmoother::new(config.smoothing_alpha),
            renderer,
            detector: DetectorSlot::new(provider),
            source,
            overlay,
            dispatch,
            config,
            last_processed_ms: None,
            ready_state: None,
            not_ready_transitions: 0,
            tick_failure_logged: false,
        }
    }

    /// Run one tick at wall-clock `now_ms`. Never panics and never returns
    /// an error; failures degrade to a fallback emission.
    pub fn tick(&mut self, now_ms: u64) -> TickOutcome {
        if let Some(last) = self.last_processed_ms {
            if now_ms.saturating_sub(last) < self.config.frame_interval_ms() {
                return TickOutcome::Throttled;
            }
        }

        let status = self.source.status();
        if !status.is_ready() {
            if self.ready_state != Some(false) {
                self.not_ready_transitions += 1;
                tracing::warn!(
                    width = status.width,
                    height = status.height,
                    has_frame = status.has_frame,
                    "video source not ready, skipping ticks"
                );
                self.ready_state = Some(false);
            }
            return TickOutcome::NotReady;
        }
        if self.ready_state == Some(false) {
            tracing::info!("video source ready");
        }
        self.ready_state = Some(true);

        let metrics = match self.process(now_ms) {
            Ok(m) => {
                self.tick_failure_logged = false;
                m
            }
            Err(e) => {
                if !self.tick_failure_logged {
                    tracing::warn!(error = %e, "tick processing failed, emitting fallback metrics");
                    self.tick_failure_logged = true;
                }
                self.smoother.smooth(&MetricComputer::safe_fallback(now_ms))
            }
        };
        self.last_processed_ms = Some(now_ms);
        TickOutcome::Emitted(metrics)
    }

    fn process(&mut self, now_ms: u64) -> Result<SkinMetrics, FrameError> {
        let mut buf = self.source.capture(MAX_ANALYSIS_DIM)?;

        // Landmark detection runs only when the overlay is active; without
        // it every tick takes the whole-frame fallback path.
        let landmarks = if self.config.enable_overlay {
            self.detector.dispatch(buf.clone(), self.dispatch);
            self.detector.latest()
        } else {
            None
        };
        let regions = extract_regions(landmarks.as_deref());

        normalize_lighting(&mut buf);
        let raw = self.computer.compute(&buf, regions.as_ref(), now_ms);
        let smoothed = self.smoother.smooth(&raw);

        if self.config.enable_overlay {
            if let Some(canvas) = &self.overlay {
                if let Ok(mut c) = canvas.lock() {
                    let no_regions = RegionMap::new();
                    let no_metrics = BTreeMap::new();
                    self.renderer.render(
                        &mut c,
                        regions.as_ref().unwrap_or(&no_regions),
                        smoothed.regions.as_ref().unwrap_or(&no_metrics),
                        self.config.mirror_overlay,
                    );
                }
            }
        }

        Ok(smoothed)
    }

    /// Tear down session resources: release the media source, clear the
    /// overlay canvas, drop cached landmarks.
    pub fn shutdown(&mut self) {
        self.source.release();
        if let Some(canvas) = &self.overlay {
            if let Ok(mut c) = canvas.lock() {
                self.renderer.clear(&mut c);
            }
        }
        self.detector.clear();
        tracing::debug!("pipeline shut down");
    }

    /// Number of ready->not-ready transitions observed so far. Each one
    /// corresponds to exactly one warning log.
    pub fn not_ready_transitions(&self) -> u32 {
        self.not_ready_transitions
    }
}
