//! Lighting normalization
//!
//! Pulls each frame toward a fixed target luma with a clamped linear gain so
//! that exposure or white-balance drift between frames is not misread as a
//! redness or shine change.

use frame_source::PixelBuffer;

/// Target mean luma after normalization
pub const TARGET_LUMA: f32 = 128.0;

/// Gain clamp range; prevents runaway amplification of very dark frames
pub const GAIN_MIN: f32 = 0.6;
pub const GAIN_MAX: f32 = 1.6;

/// Normalize the buffer in place and return the gain that was applied.
///
/// Idempotent on an already-normalized buffer: its mean luma sits at the
/// target, so the recomputed gain is ~1.0 and a second pass changes channel
/// values by at most one quantization step.
pub fn normalize_lighting(buf: &mut PixelBuffer) -> f32 {
    let mean = buf.mean_luma();
    if mean < 1.0 {
        // Effectively black frame, nothing meaningful to correct
        return 1.0;
    }

    let gain = (TARGET_LUMA / mean).clamp(GAIN_MIN, GAIN_MAX);
    if (gain - 1.0).abs() < 0.005 {
        return 1.0;
    }

    for px in buf.data.chunks_exact_mut(4) {
        for c in px.iter_mut().take(3) {
            *c = (*c as f32 * gain).round().clamp(0.0, 255.0) as u8;
        }
        // Alpha untouched
    }
    gain
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn buffer(w: u32, h: u32, rgba: [u8; 4]) -> PixelBuffer {
        PixelBuffer::from_image(&RgbaImage::from_pixel(w, h, Rgba(rgba)), 320)
    }

    #[test]
    fn test_dim_frame_is_brightened() {
        let mut buf = buffer(32, 32, [90, 90, 90, 255]);
        let gain = normalize_lighting(&mut buf);
        assert!(gain > 1.0);
        assert!((buf.mean_luma() - TARGET_LUMA).abs() < 2.0);
    }

    #[test]
    fn test_bright_frame_is_darkened() {
        let mut buf = buffer(32, 32, [200, 200, 200, 255]);
        let gain = normalize_lighting(&mut buf);
        assert!(gain < 1.0);
        assert!((buf.mean_luma() - TARGET_LUMA).abs() < 2.0);
    }

    #[test]
    fn test_gain_is_clamped_for_dark_frames() {
        let mut buf = buffer(32, 32, [20, 20, 20, 255]);
        let gain = normalize_lighting(&mut buf);
        assert!((gain - GAIN_MAX).abs() < f32::EPSILON);
    }

    #[test]
    fn test_black_frame_untouched() {
        let mut buf = buffer(16, 16, [0, 0, 0, 255]);
        let before = buf.data.clone();
        assert_eq!(normalize_lighting(&mut buf), 1.0);
        assert_eq!(buf.data, before);
    }

    #[test]
    fn test_idempotent_on_normalized_buffer() {
        let mut buf = buffer(32, 32, [100, 110, 95, 255]);
        normalize_lighting(&mut buf);
        let once = buf.data.clone();
        normalize_lighting(&mut buf);
        for (a, b) in once.iter().zip(buf.data.iter()) {
            assert!((*a as i16 - *b as i16).abs() <= 1);
        }
    }

    #[test]
    fn test_channels_stay_in_range_and_alpha_preserved() {
        let mut buf = buffer(16, 16, [250, 10, 128, 200]);
        normalize_lighting(&mut buf);
        for px in buf.data.chunks_exact(4) {
            assert_eq!(px[3], 200);
        }
    }
}
