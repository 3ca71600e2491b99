// Interactive front-end core for GrabCut-style segmentation.
// A rectangle drag seeds foreground/background, corrective strokes follow,
// and an external SegmentationEngine refines a per-pixel alpha matte.
// The session turns pointer input into engine calls; the compositor turns
// engine buffers plus overlays into a displayable raster.
pub mod color;
pub mod compositor;
pub mod config;
pub mod controller;
pub mod draw;
pub mod engine;
pub mod error;
pub mod pointer;
pub mod session;
pub mod types;
#[cfg(feature = "window")]
pub mod window;

pub use color::{Color, distance2};
pub use compositor::{FrameSources, export_frame, render_frame};
pub use config::{OverlayStyle, RefineConfig};
pub use controller::{RefineStatus, SessionController};
pub use engine::{EngineCall, SegmentationEngine};
pub use error::{Error, Result};
pub use pointer::{Buttons, PointerEvent, PointerKind, PointerTracker};
pub use session::{Command, Session, Transition};
pub use types::{
    BRUSH_RADIUS, PixelBuffer, Point, Raster, Rect, SelectionMode, TrimapLabel, ViewMode,
};
