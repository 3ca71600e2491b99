// Turns the session's selected buffer plus overlays into a displayable raster.
// Two alpha policies:
// on screen the matte is blended continuously as a black layer;
// on export of the base image a pixel turns fully transparent when its alpha
// byte is above 128 and is left untouched otherwise.
use image::Rgba;

use crate::color::Color;
use crate::config::OverlayStyle;
use crate::draw::{blend_over, plot_points, stroke_rect};
use crate::engine::SegmentationEngine;
use crate::error::{Error, Result};
use crate::session::Session;
use crate::types::{PixelBuffer, Raster, SelectionMode, ViewMode};

/// Alpha bytes strictly above this are cut out on export.
pub const EXPORT_ALPHA_THRESHOLD: u8 = 128;

/// Real channel value to byte: `value * 255` truncated, then wrapped to 8 bits.
/// Values outside [0,1] give out-of-range bytes instead of an error.
#[inline]
pub fn to_byte(value: f32) -> u8 {
    (value * 255.0) as i32 as u8
}

/// Byte back to the [0,1] range.
#[inline]
pub fn from_byte(byte: u8) -> f32 {
    byte as f32 / 255.0
}

/// Every buffer a frame can be built from, borrowed for the duration of one render.
#[derive(Debug, Clone, Copy)]
pub struct FrameSources<'a> {
    pub image: &'a PixelBuffer<Color>,
    pub alpha: &'a PixelBuffer<f32>,
    pub gmms: &'a PixelBuffer<Color>,
    pub nlinks: &'a PixelBuffer<f32>,
    pub tlinks: &'a PixelBuffer<Color>,
}

impl<'a> FrameSources<'a> {
    pub fn from_engine<E: SegmentationEngine + ?Sized>(
        image: &'a PixelBuffer<Color>,
        engine: &'a E,
    ) -> Self {
        Self {
            image,
            alpha: engine.alpha_image(),
            gmms: engine.gmms_image(),
            nlinks: engine.nlinks_image(),
            tlinks: engine.tlinks_image(),
        }
    }

    fn check(&self) -> Result<()> {
        let expected = self.image.dimensions();
        let buffers = [
            ("alpha buffer", self.alpha.dimensions()),
            ("GMM buffer", self.gmms.dimensions()),
            ("N-link buffer", self.nlinks.dimensions()),
            ("T-link buffer", self.tlinks.dimensions()),
        ];
        for (what, actual) in buffers {
            if actual != expected {
                return Err(Error::mismatch(what, expected, actual));
            }
        }
        Ok(())
    }
}

/// Opaque raster from a color buffer.
pub fn color_to_raster(buf: &PixelBuffer<Color>) -> Raster {
    let (w, h) = buf.dimensions();
    let mut out = Raster::new(w, h);
    for (px, c) in out.pixels_mut().zip(buf.pixels()) {
        *px = Rgba([to_byte(c.r), to_byte(c.g), to_byte(c.b), 255]);
    }
    out
}

/// Opaque grey raster from a scalar buffer.
pub fn scalar_to_raster(buf: &PixelBuffer<f32>) -> Raster {
    let (w, h) = buf.dimensions();
    let mut out = Raster::new(w, h);
    for (px, &v) in out.pixels_mut().zip(buf.pixels()) {
        let l = to_byte(v);
        *px = Rgba([l, l, l, 255]);
    }
    out
}

/// The raw buffer selected by `mode`, no overlays.
pub fn base_layer(mode: ViewMode, src: &FrameSources<'_>) -> Raster {
    match mode {
        ViewMode::BaseImage => color_to_raster(src.image),
        ViewMode::GmmMask => color_to_raster(src.gmms),
        ViewMode::NLinkMask => scalar_to_raster(src.nlinks),
        ViewMode::TLinkMask => color_to_raster(src.tlinks),
    }
}

/// On-screen frame for `session`. Pure: same session and buffers, same raster.
pub fn render_frame(
    session: &Session,
    src: &FrameSources<'_>,
    style: &OverlayStyle,
) -> Result<Raster> {
    src.check()?;
    let mut frame = base_layer(session.view_mode, src);

    if session.show_mask {
        for (px, &a) in frame.pixels_mut().zip(src.alpha.pixels()) {
            blend_over(px, style.mask_color, to_byte(a));
        }
    }

    match session.selection {
        SelectionMode::RectDrag => {
            stroke_rect(&mut frame, session.rect(), style.rect_width, style.rect_color)
        }
        SelectionMode::PaintForeground => plot_points(
            &mut frame,
            &session.stroke,
            style.stroke_width,
            style.foreground_color,
        ),
        SelectionMode::PaintBackground => plot_points(
            &mut frame,
            &session.stroke,
            style.stroke_width,
            style.background_color,
        ),
        SelectionMode::None => {}
    }

    Ok(frame)
}

/// Raster to save. Base image: pixels whose alpha byte exceeds
/// [`EXPORT_ALPHA_THRESHOLD`] become fully transparent, the rest keep their
/// color at full opacity (the source is RGB). Any other view: the selected
/// buffer as-is.
pub fn export_frame(view_mode: ViewMode, src: &FrameSources<'_>) -> Result<Raster> {
    let mut out = base_layer(view_mode, src);
    if view_mode != ViewMode::BaseImage {
        return Ok(out);
    }
    if src.alpha.dimensions() != src.image.dimensions() {
        return Err(Error::mismatch(
            "alpha buffer",
            src.image.dimensions(),
            src.alpha.dimensions(),
        ));
    }
    for (px, &a) in out.pixels_mut().zip(src.alpha.pixels()) {
        if to_byte(a) > EXPORT_ALPHA_THRESHOLD {
            *px = Rgba([0, 0, 0, 0]);
        }
    }
    Ok(out)
}

/// Pack a raster as `0x00RRGGBB` words for framebuffer windows. Alpha is dropped.
pub fn pack_rgb(img: &Raster) -> Vec<u32> {
    img.pixels()
        .map(|p| ((p[0] as u32) << 16) | ((p[1] as u32) << 8) | p[2] as u32)
        .collect()
}
