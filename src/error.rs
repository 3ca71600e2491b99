// Errors surfaced by the session, the compositor and the engine seam.
// Every variant states *where* things went wrong.
use crate::types::Rect;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Seeding rectangle has zero width or height.
    #[error("degenerate rectangle: {0:?}")]
    DegenerateRect(Rect),

    /// Seeding rectangle reaches outside the source image.
    #[error("rectangle {rect:?} is outside a {width}x{height} image")]
    RectOutOfBounds { rect: Rect, width: u32, height: u32 },

    /// Two buffers that must line up pixel for pixel do not.
    #[error("{what}: expected {expected:?}, got {actual:?}")]
    DimensionMismatch {
        what: &'static str,
        expected: (u32, u32),
        actual: (u32, u32),
    },

    /// The segmentation engine rejected or failed an operation.
    #[error("engine error: {0}")]
    Engine(String),

    /// The engine does not implement an optional operation.
    #[error("engine does not support {0}")]
    Unsupported(&'static str),

    #[cfg(feature = "window")]
    #[error("window error: {0}")]
    Window(String),
}

impl Error {
    pub fn engine(msg: impl Into<String>) -> Self {
        Self::Engine(msg.into())
    }

    pub(crate) fn mismatch(what: &'static str, expected: (u32, u32), actual: (u32, u32)) -> Self {
        Self::DimensionMismatch {
            what,
            expected,
            actual,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(Error::engine("x").to_string().starts_with("engine error:"));
        assert!(
            Error::Unsupported("mask seeding")
                .to_string()
                .contains("mask seeding")
        );
        let e = Error::mismatch("alpha", (4, 4), (2, 3));
        assert_eq!(e.to_string(), "alpha: expected (4, 4), got (2, 3)");
    }

    #[test]
    fn out_of_bounds_names_the_image_size() {
        let e = Error::RectOutOfBounds {
            rect: Rect::new(0, 0, 20, 20),
            width: 10,
            height: 10,
        };
        assert!(e.to_string().contains("10x10"));
    }
}
