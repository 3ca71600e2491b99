// Tunables with fixed defaults. The brush radius is deliberately absent: it
// is the crate constant `BRUSH_RADIUS`.
use image::Rgba;

/// Colors and pen widths for the on-screen overlays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayStyle {
    pub rect_color: Rgba<u8>,
    pub rect_width: u32,
    pub foreground_color: Rgba<u8>,
    pub background_color: Rgba<u8>,
    pub stroke_width: u32,
    /// Color blended over the base using the engine's alpha as coverage.
    pub mask_color: Rgba<u8>,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            rect_color: Rgba([0, 128, 128, 255]), // dark cyan
            rect_width: 2,
            foreground_color: Rgba([255, 0, 0, 255]),
            background_color: Rgba([0, 0, 255, 255]),
            stroke_width: 4,
            mask_color: Rgba([0, 0, 0, 255]),
        }
    }
}

/// Bounds for the continuous refine loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefineConfig {
    /// Ticks after which an armed loop disarms even if not converged.
    pub max_iterations: u32,
}

impl Default for RefineConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
        }
    }
}
