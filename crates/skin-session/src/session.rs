//! Session lifecycle
//!
//! A [`SkinSession`] owns one background tokio task running the scheduler
//! loop. Starting validates the configuration and fails fast on a missing
//! overlay surface; stopping flips the shared running flag and awaits the
//! loop, which tears the pipeline down on its way out. A stopped session is
//! gone for good; restarting means building a fresh one, so no smoothing or
//! confidence state ever leaks between sessions.

use crate::config::{SessionConfig, LOOP_TICK_MS};
use crate::pipeline::{DispatchMode, SkinPipeline, TickOutcome};
use crate::provider::LandmarkProvider;
use crate::SessionError;
use frame_source::FrameSource;
use image::RgbaImage;
use skin_analysis::SkinMetrics;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::task::JoinHandle;
use tracing::Instrument;
use uuid::Uuid;

/// Shared overlay surface the renderer paints into. The embedding layer
/// composites it over the camera preview at its own frame rate.
pub type OverlayCanvas = Arc<Mutex<RgbaImage>>;

/// A running skin analysis session
pub struct SkinSession {
    id: Uuid,
    running: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl SkinSession {
    /// Start the session loop on the current tokio runtime. Emissions are
    /// delivered to `sink` from the loop task; keep it cheap.
    pub fn start<S, P, F>(
        config: SessionConfig,
        source: S,
        provider: P,
        overlay: Option<OverlayCanvas>,
        mut sink: F,
    ) -> Result<Self, SessionError>
    where
        S: FrameSource,
        P: LandmarkProvider,
        F: FnMut(SkinMetrics) + Send + 'static,
    {
        config.validate()?;
        if config.enable_overlay && overlay.is_none() {
            return Err(SessionError::OverlaySurfaceMissing);
        }

        let id = Uuid::new_v4();
        let running = Arc::new(AtomicBool::new(true));
        let loop_flag = Arc::clone(&running);
        let mut pipeline = SkinPipeline::new(config, source, provider, overlay, DispatchMode::Spawn);

        let span = tracing::info_span!("skin_session", session = %id);
        let handle = tokio::spawn(
            async move {
                tracing::info!("session started");
                let mut interval = tokio::time::interval(Duration::from_millis(LOOP_TICK_MS));
                interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

                while loop_flag.load(Ordering::Acquire) {
                    interval.tick().await;
                    if !loop_flag.load(Ordering::Acquire) {
                        break;
                    }
                    if let TickOutcome::Emitted(metrics) = pipeline.tick(epoch_ms()) {
                        sink(metrics);
                    }
                }

                pipeline.shutdown();
                tracing::info!("session stopped");
            }
            .instrument(span),
        );

        Ok(Self {
            id,
            running,
            handle,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire) && !self.handle.is_finished()
    }

    /// Stop the loop and wait for pipeline teardown to complete
    pub async fn stop(self) {
        self.running.store(false, Ordering::Release);
        let _ = self.handle.await;
    }
}

fn epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
