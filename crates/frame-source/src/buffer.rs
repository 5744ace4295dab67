//! Downsampled RGBA analysis buffer

use image::{imageops::FilterType, RgbaImage};

/// Maximum dimension of an analysis buffer. Frames are downsampled on
/// capture so that neither side exceeds this.
pub const MAX_ANALYSIS_DIM: u32 = 320;

/// A downsampled RGBA buffer captured from one video frame.
///
/// Exists only for the duration of a single pipeline tick and is never
/// persisted across ticks.
#[derive(Debug, Clone)]
pub struct PixelBuffer {
    /// RGBA pixel data (width * height * 4)
    pub data: Vec<u8>,
    /// Buffer width
    pub width: u32,
    /// Buffer height
    pub height: u32,
}

impl PixelBuffer {
    /// Create a buffer from raw RGBA data. Returns `None` when the data
    /// length does not match the dimensions.
    pub fn from_rgba(data: Vec<u8>, width: u32, height: u32) -> Option<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(4))?;
        if data.len() != expected {
            return None;
        }
        Some(Self {
            data,
            width,
            height,
        })
    }

    /// Capture from a full-resolution RGBA image, downsampling so that
    /// neither dimension exceeds `max_dim`.
    pub fn from_image(img: &RgbaImage, max_dim: u32) -> Self {
        let (w, h) = img.dimensions();
        let longest = w.max(h);
        if longest <= max_dim || max_dim == 0 {
            return Self {
                data: img.as_raw().clone(),
                width: w,
                height: h,
            };
        }

        let scale = max_dim as f32 / longest as f32;
        let nw = ((w as f32 * scale).round() as u32).max(1);
        let nh = ((h as f32 * scale).round() as u32).max(1);
        let resized = image::imageops::resize(img, nw, nh, FilterType::Triangle);
        Self {
            data: resized.into_raw(),
            width: nw,
            height: nh,
        }
    }

    /// Get RGBA pixel at (x, y)
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        Some([
            self.data[idx],
            self.data[idx + 1],
            self.data[idx + 2],
            self.data[idx + 3],
        ])
    }

    /// Luma of the pixel at (x, y) using the Rec. 601 weights
    pub fn luma_at(&self, x: u32, y: u32) -> Option<f32> {
        self.get_pixel(x, y).map(|p| luma(p[0], p[1], p[2]))
    }

    /// Mean luma over the whole buffer
    pub fn mean_luma(&self) -> f32 {
        if self.data.is_empty() {
            return 0.0;
        }
        let mut sum = 0.0f64;
        for px in self.data.chunks_exact(4) {
            sum += luma(px[0], px[1], px[2]) as f64;
        }
        (sum / (self.width as f64 * self.height as f64)) as f32
    }

    /// Total pixel count
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Luminance: 0.299*R + 0.587*G + 0.114*B
pub fn luma(r: u8, g: u8, b: u8) -> f32 {
    r as f32 * 0.299 + g as f32 * 0.587 + b as f32 * 0.114
}
