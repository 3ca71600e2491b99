// Color values as the engine sees them: three real channels, nominally [0,1].
use image::RgbImage;

use crate::types::PixelBuffer;

/// An (r, g, b) triple. The type never clamps; out-of-range values are kept as-is.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Grey with all three channels set to `v`.
    pub const fn splat(v: f32) -> Self {
        Self { r: v, g: v, b: v }
    }

    /// 8-bit channels mapped onto [0,1] by dividing by 255.
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    pub fn is_black(&self) -> bool {
        self.r <= 0.0 && self.g <= 0.0 && self.b <= 0.0
    }
}

/// Squared Euclidean distance between two colors. Total for all inputs.
#[inline]
pub fn distance2(c1: Color, c2: Color) -> f32 {
    let dr = c1.r - c2.r;
    let dg = c1.g - c2.g;
    let db = c1.b - c2.b;
    dr * dr + dg * dg + db * db
}

impl PixelBuffer<Color> {
    /// Build a color buffer from an 8-bit RGB raster (channel / 255).
    pub fn from_rgb8(img: &RgbImage) -> Self {
        let (w, h) = img.dimensions();
        PixelBuffer::from_fn(w, h, |x, y| {
            let p = img.get_pixel(x, y);
            Color::from_rgb8(p[0], p[1], p[2])
        })
    }
}
