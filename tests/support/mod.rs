#![allow(dead_code)]

use grabcut_session::{
    Color, EngineCall, Error, PixelBuffer, Rect, Result, SegmentationEngine, TrimapLabel,
};
use image::{Rgb, RgbImage};

/// Engine double: records every call, paints `set_trimap` straight into the
/// alpha buffer and reports scripted changed-pixel counts from `refine_once`.
pub struct RecordingEngine {
    pub calls: Vec<EngineCall>,
    pub mask_seeds: usize,
    /// Popped front to back by `refine_once`; empty means 0 (converged).
    pub refine_script: Vec<usize>,
    pub fail_fit: bool,
    pub fail_trimap: bool,
    pub fail_refine: bool,
    width: u32,
    height: u32,
    alpha: PixelBuffer<f32>,
    nlinks: PixelBuffer<f32>,
    tlinks: PixelBuffer<Color>,
    gmms: PixelBuffer<Color>,
}

impl RecordingEngine {
    pub fn new(source: &PixelBuffer<Color>) -> Self {
        let (w, h) = source.dimensions();
        Self {
            calls: Vec::new(),
            mask_seeds: 0,
            refine_script: Vec::new(),
            fail_fit: false,
            fail_trimap: false,
            fail_refine: false,
            width: w,
            height: h,
            alpha: PixelBuffer::new(w, h),
            nlinks: PixelBuffer::new(w, h),
            tlinks: PixelBuffer::new(w, h),
            gmms: PixelBuffer::new(w, h),
        }
    }

    pub fn with_refine_script(mut self, script: &[usize]) -> Self {
        self.refine_script = script.to_vec();
        self
    }

    pub fn alpha_mut(&mut self) -> &mut PixelBuffer<f32> {
        &mut self.alpha
    }
}

impl SegmentationEngine for RecordingEngine {
    fn initialize(&mut self, rect: Rect) -> Result<()> {
        self.calls.push(EngineCall::Initialize(rect));
        rect.check_seed(self.width, self.height)?;
        self.alpha.fill(0.0);
        self.alpha.fill_rect(rect, 1.0);
        Ok(())
    }

    fn initialize_with_mask(&mut self, mask: &PixelBuffer<Color>) -> Result<()> {
        self.mask_seeds += 1;
        self.alpha = PixelBuffer::from_fn(self.width, self.height, |x, y| {
            match mask.get(x, y) {
                Some(c) if !c.is_black() => 1.0,
                _ => 0.0,
            }
        });
        Ok(())
    }

    fn fit_gmms(&mut self) -> Result<()> {
        self.calls.push(EngineCall::FitGmms);
        if self.fail_fit {
            return Err(Error::engine("no pixels to cluster"));
        }
        Ok(())
    }

    fn set_trimap(&mut self, rect: Rect, label: TrimapLabel) -> Result<()> {
        self.calls.push(EngineCall::SetTrimap(rect, label));
        if self.fail_trimap {
            return Err(Error::engine("trimap locked"));
        }
        let v = if label == TrimapLabel::Foreground { 1.0 } else { 0.0 };
        self.alpha.fill_rect(rect, v);
        Ok(())
    }

    fn refine_once(&mut self) -> Result<usize> {
        self.calls.push(EngineCall::RefineOnce);
        if self.fail_refine {
            return Err(Error::engine("graph cut failed"));
        }
        if self.refine_script.is_empty() {
            return Ok(0);
        }
        Ok(self.refine_script.remove(0))
    }

    fn build_images(&mut self) -> Result<()> {
        self.calls.push(EngineCall::BuildImages);
        self.gmms = PixelBuffer::from_fn(self.width, self.height, |x, y| {
            match self.alpha.get(x, y) {
                Some(&a) if a > 0.5 => Color::new(1.0, 0.0, 0.0),
                _ => Color::new(0.0, 0.0, 1.0),
            }
        });
        self.nlinks.fill(0.5);
        self.tlinks.fill(Color::new(0.0, 1.0, 0.0));
        Ok(())
    }

    fn alpha_image(&self) -> &PixelBuffer<f32> {
        &self.alpha
    }

    fn nlinks_image(&self) -> &PixelBuffer<f32> {
        &self.nlinks
    }

    fn tlinks_image(&self) -> &PixelBuffer<Color> {
        &self.tlinks
    }

    fn gmms_image(&self) -> &PixelBuffer<Color> {
        &self.gmms
    }
}

/// Engine that only knows rectangle seeding: `initialize_with_mask` keeps
/// the trait default.
pub struct RectOnlyEngine(pub RecordingEngine);

impl SegmentationEngine for RectOnlyEngine {
    fn initialize(&mut self, rect: Rect) -> Result<()> {
        self.0.initialize(rect)
    }

    fn fit_gmms(&mut self) -> Result<()> {
        self.0.fit_gmms()
    }

    fn set_trimap(&mut self, rect: Rect, label: TrimapLabel) -> Result<()> {
        self.0.set_trimap(rect, label)
    }

    fn refine_once(&mut self) -> Result<usize> {
        self.0.refine_once()
    }

    fn build_images(&mut self) -> Result<()> {
        self.0.build_images()
    }

    fn alpha_image(&self) -> &PixelBuffer<f32> {
        self.0.alpha_image()
    }

    fn nlinks_image(&self) -> &PixelBuffer<f32> {
        self.0.nlinks_image()
    }

    fn tlinks_image(&self) -> &PixelBuffer<Color> {
        self.0.tlinks_image()
    }

    fn gmms_image(&self) -> &PixelBuffer<Color> {
        self.0.gmms_image()
    }
}

/// Flat grey test image.
pub fn grey_image(w: u32, h: u32) -> RgbImage {
    RgbImage::from_pixel(w, h, Rgb([100, 150, 200]))
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}
