// Core types shared by the session, the compositor and the engine seam.

/// Displayable 8-bit RGBA raster produced by the compositor.
pub type Raster = image::RgbaImage;

/// Half-width of the square every recorded stroke point expands to (a 5x5 patch).
pub const BRUSH_RADIUS: i32 = 2;

/// Pointer position in image pixel coordinates. May lie outside the image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle with inclusive corners, always stored normalized
/// so that `x0 <= x1` and `y0 <= y1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl Rect {
    /// Corners may come in any order.
    pub fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    pub fn from_corners(a: Point, b: Point) -> Self {
        Self::new(a.x, a.y, b.x, b.y)
    }

    /// The square brush patch centred on `p`.
    pub fn around(p: Point, radius: i32) -> Self {
        Self::new(
            p.x.saturating_sub(radius),
            p.y.saturating_sub(radius),
            p.x.saturating_add(radius),
            p.y.saturating_add(radius),
        )
    }

    /// Corner-to-corner span, saturating at `i32::MAX`.
    pub fn width(&self) -> i32 {
        self.x1.saturating_sub(self.x0)
    }

    pub fn height(&self) -> i32 {
        self.y1.saturating_sub(self.y0)
    }

    pub fn is_degenerate(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x0 && p.x <= self.x1 && p.y >= self.y0 && p.y <= self.y1
    }

    /// Validation every engine applies to a seeding rectangle: non-degenerate and
    /// with both corners on pixels of a `width` x `height` image.
    pub fn check_seed(&self, width: u32, height: u32) -> crate::Result<()> {
        if self.is_degenerate() {
            return Err(crate::Error::DegenerateRect(*self));
        }
        let inside = self.x0 >= 0
            && self.y0 >= 0
            && (self.x1 as i64) < width as i64
            && (self.y1 as i64) < height as i64;
        if !inside {
            return Err(crate::Error::RectOutOfBounds {
                rect: *self,
                width,
                height,
            });
        }
        Ok(())
    }
}

/// Dense 2-D buffer addressed by (x, y). Dimensions are fixed at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer<T> {
    width: u32,
    height: u32,
    data: Vec<T>,
}

impl<T: Clone> PixelBuffer<T> {
    pub fn filled(width: u32, height: u32, value: T) -> Self {
        Self {
            width,
            height,
            data: vec![value; width as usize * height as usize],
        }
    }

    pub fn fill(&mut self, value: T) {
        for v in &mut self.data {
            *v = value.clone();
        }
    }

    /// Overwrite every pixel of `rect` (inclusive). Both corners are clamped
    /// into the buffer first, so a rectangle hanging off an edge still paints
    /// the row or column it is clamped onto.
    pub fn fill_rect(&mut self, rect: Rect, value: T) {
        let off = rect.x1 < 0
            || rect.y1 < 0
            || rect.x0 as i64 >= self.width as i64
            || rect.y0 as i64 >= self.height as i64;
        if self.data.is_empty() || off {
            return;
        }
        let (x0, y0) = self.clamp(rect.x0, rect.y0);
        let (x1, y1) = self.clamp(rect.x1, rect.y1);
        for y in y0..=y1 {
            let row = y * self.width as usize;
            for v in &mut self.data[row + x0..=row + x1] {
                *v = value.clone();
            }
        }
    }
}

impl<T: Clone + Default> PixelBuffer<T> {
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, T::default())
    }
}

impl<T> PixelBuffer<T> {
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> T) -> Self {
        let mut data = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn get(&self, x: u32, y: u32) -> Option<&T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(self.index(x as usize, y as usize))
    }

    pub fn get_mut(&mut self, x: u32, y: u32) -> Option<&mut T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = self.index(x as usize, y as usize);
        self.data.get_mut(idx)
    }

    /// Out-of-range coordinates read the nearest edge pixel.
    /// Returns `None` only for an empty buffer.
    pub fn get_clamped(&self, x: i32, y: i32) -> Option<&T> {
        if self.data.is_empty() {
            return None;
        }
        let (x, y) = self.clamp(x, y);
        self.data.get(self.index(x, y))
    }

    /// Row-major pixel slice.
    pub fn pixels(&self) -> &[T] {
        &self.data
    }

    #[inline]
    fn index(&self, x: usize, y: usize) -> usize {
        y * self.width as usize + x
    }

    #[inline]
    fn clamp(&self, x: i32, y: i32) -> (usize, usize) {
        let x = (x.max(0) as u32).min(self.width.saturating_sub(1));
        let y = (y.max(0) as u32).min(self.height.saturating_sub(1));
        (x as usize, y as usize)
    }
}

/// Per-pixel classification handed to the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TrimapLabel {
    Background,
    Foreground,
    #[default]
    Unknown,
}

/// Which buffer the compositor shows as its base layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ViewMode {
    #[default]
    BaseImage,
    GmmMask,
    NLinkMask,
    TLinkMask,
}

impl ViewMode {
    pub const ALL: [ViewMode; 4] = [
        ViewMode::BaseImage,
        ViewMode::GmmMask,
        ViewMode::NLinkMask,
        ViewMode::TLinkMask,
    ];

    /// Mode for a menu/toolbar slot, `None` past the last one.
    pub fn from_index(i: usize) -> Option<Self> {
        Self::ALL.get(i).copied()
    }
}

/// The in-progress pointer gesture. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SelectionMode {
    #[default]
    None,
    RectDrag,
    PaintForeground,
    PaintBackground,
}

impl SelectionMode {
    pub fn is_painting(&self) -> bool {
        matches!(
            self,
            SelectionMode::PaintForeground | SelectionMode::PaintBackground
        )
    }

    /// Trimap label a paint gesture writes, `None` for non-paint modes.
    pub fn paint_label(&self) -> Option<TrimapLabel> {
        match self {
            SelectionMode::PaintForeground => Some(TrimapLabel::Foreground),
            SelectionMode::PaintBackground => Some(TrimapLabel::Background),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_normalizes_corners_given_in_any_order() {
        let r = Rect::from_corners(Point::new(50, 10), Point::new(10, 50));
        assert_eq!(r, Rect::new(10, 10, 50, 50));
        assert_eq!((r.width(), r.height()), (40, 40));
    }

    #[test]
    fn brush_patch_is_five_by_five() {
        let r = Rect::around(Point::new(20, 20), BRUSH_RADIUS);
        assert_eq!(r, Rect::new(18, 18, 22, 22));
        assert!(r.contains(Point::new(18, 22)));
        assert!(!r.contains(Point::new(23, 20)));
    }

    #[test]
    fn extreme_coordinates_saturate() {
        let r = Rect::around(Point::new(i32::MAX, i32::MIN), BRUSH_RADIUS);
        assert_eq!(r, Rect::new(i32::MAX - 2, i32::MIN, i32::MAX, i32::MIN + 2));
        let wide = Rect::new(i32::MIN, 0, i32::MAX, 1);
        assert_eq!(wide.width(), i32::MAX);
        assert!(!wide.is_degenerate());
    }

    #[test]
    fn seed_check_rejects_degenerate_and_outside() {
        assert!(matches!(
            Rect::new(5, 5, 5, 20).check_seed(64, 64),
            Err(crate::Error::DegenerateRect(_))
        ));
        assert!(matches!(
            Rect::new(-1, 0, 10, 10).check_seed(64, 64),
            Err(crate::Error::RectOutOfBounds { .. })
        ));
        assert!(matches!(
            Rect::new(0, 0, 64, 10).check_seed(64, 64),
            Err(crate::Error::RectOutOfBounds { .. })
        ));
        assert!(Rect::new(0, 0, 63, 63).check_seed(64, 64).is_ok());
    }

    #[test]
    fn fill_rect_clamps_and_is_inclusive() {
        let mut buf = PixelBuffer::<u8>::new(4, 3);
        buf.fill_rect(Rect::new(2, 1, 9, 9), 7);
        let expected: [u8; 12] = [0, 0, 0, 0, 0, 0, 7, 7, 0, 0, 7, 7];
        assert_eq!(buf.pixels(), &expected);
    }

    #[test]
    fn fill_rect_off_the_buffer_is_a_no_op() {
        let mut buf = PixelBuffer::<u8>::new(4, 3);
        buf.fill_rect(Rect::new(-9, 0, -2, 2), 7);
        buf.fill_rect(Rect::new(0, 3, 3, 8), 7);
        assert!(buf.pixels().iter().all(|&v| v == 0));
    }

    #[test]
    fn clamped_reads_hit_the_nearest_edge() {
        let buf = PixelBuffer::from_fn(3, 2, |x, y| x + 10 * y);
        assert_eq!(buf.get_clamped(-5, -5), Some(&0));
        assert_eq!(buf.get_clamped(99, 99), Some(&12));
        assert_eq!(buf.get(3, 0), None);
        assert_eq!(PixelBuffer::<u8>::new(0, 0).get_clamped(0, 0), None);
    }

    #[test]
    fn view_mode_slots_follow_menu_order() {
        assert_eq!(ViewMode::from_index(0), Some(ViewMode::BaseImage));
        assert_eq!(ViewMode::from_index(3), Some(ViewMode::TLinkMask));
        assert_eq!(ViewMode::from_index(4), None);
    }
}
