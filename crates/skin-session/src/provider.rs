//! Landmark provider capability interface
//!
//! The face-landmark detector is an external collaborator. It is modeled as
//! a pluggable capability selected at construction time, with a null-object
//! fallback, rather than sniffed from the environment at runtime.

use crate::LandmarkError;
use face_geometry::NormalizedLandmark;
use frame_source::PixelBuffer;

/// A face landmark detector invoked with the current frame.
///
/// `detect` may be arbitrarily slow; the scheduler runs it off the tick path
/// and guarantees at most one outstanding invocation per session. A
/// synchronous getter is simply a fast `detect`.
pub trait LandmarkProvider: Send + 'static {
    /// Detect face landmarks on the given frame. `Ok(None)` means no face;
    /// an error is caught at the dispatch site and the previous landmarks
    /// are retained.
    fn detect(
        &mut self,
        frame: &PixelBuffer,
    ) -> Result<Option<Vec<NormalizedLandmark>>, LandmarkError>;
}

/// Null-object provider: never detects a face, forcing the whole-frame
/// fallback path. Used when no detector library is available.
pub struct NullLandmarkProvider;

impl LandmarkProvider for NullLandmarkProvider {
    fn detect(
        &mut self,
        _frame: &PixelBuffer,
    ) -> Result<Option<Vec<NormalizedLandmark>>, LandmarkError> {
        Ok(None)
    }
}

/// Provider that returns the same landmark set on every call. Useful for
/// tests and recorded-session playback.
pub struct FixedLandmarkProvider {
    landmarks: Vec<NormalizedLandmark>,
}

impl FixedLandmarkProvider {
    pub fn new(landmarks: Vec<NormalizedLandmark>) -> Self {
        Self { landmarks }
    }
}

impl LandmarkProvider for FixedLandmarkProvider {
    fn detect(
        &mut self,
        _frame: &PixelBuffer,
    ) -> Result<Option<Vec<NormalizedLandmark>>, LandmarkError> {
        Ok(Some(self.landmarks.clone()))
    }
}
