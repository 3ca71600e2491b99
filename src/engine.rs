// Seam to the segmentation engine (GMM fitting and graph-cut refinement).
// The engine lives outside this crate; the session issues its requests as
// EngineCall values so transitions stay pure and replayable.
//
// Buffer policy: every exposed buffer is allocated at the source image's
// dimensions when the engine is constructed and zero-filled, so the read
// accessors are valid before the first build_images/refine_once (black
// views, transparent mask). The compositor still checks dimensions.
//
// The source is opaque RGB: loading takes an RgbImage, so any alpha the
// file carried is gone, and exported pixels that survive the cut keep
// alpha 255.
use crate::color::Color;
use crate::error::{Error, Result};
use crate::types::{PixelBuffer, Rect, TrimapLabel};

pub trait SegmentationEngine {
    /// Seed the trimap: inside `rect` tentatively foreground, outside background.
    /// Fails for a degenerate or out-of-bounds rectangle (see [`Rect::check_seed`]).
    fn initialize(&mut self, rect: Rect) -> Result<()>;

    /// Seed from a mask instead of a rectangle: every non-black pixel is
    /// tentatively foreground.
    fn initialize_with_mask(&mut self, _mask: &PixelBuffer<Color>) -> Result<()> {
        Err(Error::Unsupported("mask seeding"))
    }

    /// Re-estimate the color models from the current labels.
    fn fit_gmms(&mut self) -> Result<()>;

    /// Overwrite the label of every pixel in `rect`.
    fn set_trimap(&mut self, rect: Rect, label: TrimapLabel) -> Result<()>;

    /// One round of energy minimization. Returns how many pixels switched
    /// between foreground and background; zero means converged.
    fn refine_once(&mut self) -> Result<usize>;

    /// Regenerate the GMM, N-link and T-link visualization buffers.
    fn build_images(&mut self) -> Result<()>;

    fn alpha_image(&self) -> &PixelBuffer<f32>;
    fn nlinks_image(&self) -> &PixelBuffer<f32>;
    fn tlinks_image(&self) -> &PixelBuffer<Color>;
    fn gmms_image(&self) -> &PixelBuffer<Color>;
}

/// One request a state transition wants issued, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineCall {
    Initialize(Rect),
    FitGmms,
    SetTrimap(Rect, TrimapLabel),
    RefineOnce,
    BuildImages,
}

/// What running a batch of calls reported back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallOutcome {
    /// Changed-pixel count of the last `RefineOnce` in the batch, if any ran.
    pub last_changed: Option<usize>,
}

/// Issue `calls` in order, stopping at the first failure.
pub fn apply<E: SegmentationEngine + ?Sized>(
    engine: &mut E,
    calls: &[EngineCall],
) -> Result<CallOutcome> {
    let mut outcome = CallOutcome::default();
    for call in calls {
        match *call {
            EngineCall::Initialize(rect) => engine.initialize(rect)?,
            EngineCall::FitGmms => engine.fit_gmms()?,
            EngineCall::SetTrimap(rect, label) => engine.set_trimap(rect, label)?,
            EngineCall::RefineOnce => outcome.last_changed = Some(engine.refine_once()?),
            EngineCall::BuildImages => engine.build_images()?,
        }
    }
    Ok(outcome)
}
