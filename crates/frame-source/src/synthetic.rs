//! Synthetic frame sources for tests and headless runs

use crate::{FrameError, FrameSource, FrameStatus, PixelBuffer};
use image::{Rgba, RgbaImage};

/// An in-memory frame source with controllable readiness.
///
/// Serves the same frame on every capture until a new one is loaded, which
/// matches how a camera preview element is polled.
pub struct SyntheticSource {
    frame: Option<RgbaImage>,
    ready: bool,
    released: bool,
    captures: u64,
}

impl SyntheticSource {
    /// Source with a solid-color frame
    pub fn flat(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        Self {
            frame: Some(RgbaImage::from_pixel(width, height, Rgba(rgba))),
            ready: true,
            released: false,
            captures: 0,
        }
    }

    /// Source with deterministic per-pixel noise around a base color,
    /// useful for exercising the texture statistics.
    pub fn noisy(width: u32, height: u32, base: [u8; 3], amplitude: u8, seed: u64) -> Self {
        let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
        let img = RgbaImage::from_fn(width, height, |_, _| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let n = ((state >> 33) % (2 * amplitude as u64 + 1)) as i16 - amplitude as i16;
            let ch = |c: u8| (c as i16 + n).clamp(0, 255) as u8;
            Rgba([ch(base[0]), ch(base[1]), ch(base[2]), 255])
        });
        Self {
            frame: Some(img),
            ready: true,
            released: false,
            captures: 0,
        }
    }

    /// Source that reports zero dimensions (never ready)
    pub fn unready() -> Self {
        Self {
            frame: None,
            ready: false,
            released: false,
            captures: 0,
        }
    }

    /// Flip readiness at runtime
    pub fn set_ready(&mut self, ready: bool) {
        self.ready = ready;
    }

    /// Replace the served frame
    pub fn load_frame(&mut self, frame: RgbaImage) {
        self.frame = Some(frame);
        self.ready = true;
    }

    /// Number of successful captures so far
    pub fn captures(&self) -> u64 {
        self.captures
    }
}

impl FrameSource for SyntheticSource {
    fn status(&self) -> FrameStatus {
        if self.released || !self.ready {
            return FrameStatus::default();
        }
        match &self.frame {
            Some(f) => FrameStatus {
                width: f.width(),
                height: f.height(),
                has_frame: true,
            },
            None => FrameStatus::default(),
        }
    }

    fn capture(&mut self, max_dim: u32) -> Result<PixelBuffer, FrameError> {
        if self.released {
            return Err(FrameError::Released);
        }
        if !self.status().is_ready() {
            return Err(FrameError::NotReady);
        }
        let frame = self.frame.as_ref().ok_or(FrameError::NotReady)?;
        self.captures += 1;
        Ok(PixelBuffer::from_image(frame, max_dim))
    }

    fn release(&mut self) {
        self.released = true;
        self.frame = None;
        tracing::debug!("synthetic frame source released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MAX_ANALYSIS_DIM;

    #[test]
    fn test_unready_source_reports_not_ready() {
        let src = SyntheticSource::unready();
        assert!(!src.status().is_ready());
        assert_eq!(src.status().width, 0);
    }

    #[test]
    fn test_capture_after_release_fails() {
        let mut src = SyntheticSource::flat(64, 64, [0, 0, 0, 255]);
        src.release();
        assert!(matches!(
            src.capture(MAX_ANALYSIS_DIM),
            Err(FrameError::Released)
        ));
        assert!(!src.status().is_ready());
    }

    #[test]
    fn test_readiness_toggle() {
        let mut src = SyntheticSource::flat(64, 64, [0, 0, 0, 255]);
        assert!(src.status().is_ready());
        src.set_ready(false);
        assert!(!src.status().is_ready());
        assert!(matches!(
            src.capture(MAX_ANALYSIS_DIM),
            Err(FrameError::NotReady)
        ));
        src.set_ready(true);
        assert!(src.capture(MAX_ANALYSIS_DIM).is_ok());
        assert_eq!(src.captures(), 1);
    }

    #[test]
    fn test_noisy_source_is_deterministic() {
        let mut a = SyntheticSource::noisy(32, 32, [150, 110, 100], 20, 7);
        let mut b = SyntheticSource::noisy(32, 32, [150, 110, 100], 20, 7);
        let fa = a.capture(MAX_ANALYSIS_DIM).unwrap();
        let fb = b.capture(MAX_ANALYSIS_DIM).unwrap();
        assert_eq!(fa.data, fb.data);
    }
}
