// Owns the loaded image, its engine and the session, and runs transitions
// against them. Image and engine are only ever replaced together by `load`.
// While nothing is loaded every input is a silent no-op.
use image::RgbImage;
use tracing::{debug, info, warn};

use crate::color::Color;
use crate::compositor::{FrameSources, export_frame, render_frame};
use crate::config::{OverlayStyle, RefineConfig};
use crate::engine::{self, SegmentationEngine};
use crate::error::{Error, Result};
use crate::pointer::PointerEvent;
use crate::session::{Command, Session, Transition};
use crate::types::{PixelBuffer, Raster, ViewMode};

/// What one refine tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefineStatus {
    /// Loop not armed (or nothing loaded); no engine call made.
    Idle,
    /// One iteration ran and this many pixels changed.
    Refined { changed: usize },
    /// The last iteration changed nothing; loop disarmed.
    Converged,
    /// Iteration budget spent; loop disarmed.
    LimitReached,
}

struct Loaded<E> {
    source: PixelBuffer<Color>,
    engine: E,
    session: Session,
}

pub struct SessionController<E> {
    loaded: Option<Loaded<E>>,
    refine: RefineConfig,
    generation: u64,
}

impl<E> Default for SessionController<E> {
    fn default() -> Self {
        Self::new(RefineConfig::default())
    }
}

impl<E> SessionController<E> {
    pub fn new(refine: RefineConfig) -> Self {
        Self {
            loaded: None,
            refine,
            generation: 0,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    pub fn session(&self) -> Option<&Session> {
        self.loaded.as_ref().map(|l| &l.session)
    }

    pub fn engine(&self) -> Option<&E> {
        self.loaded.as_ref().map(|l| &l.engine)
    }

    /// Direct engine access. Counts as a mutation: the current frame is stale afterwards.
    pub fn engine_mut(&mut self) -> Option<&mut E> {
        self.touch();
        self.loaded.as_mut().map(|l| &mut l.engine)
    }

    pub fn source(&self) -> Option<&PixelBuffer<Color>> {
        self.loaded.as_ref().map(|l| &l.source)
    }

    /// Bumped by every call that changes session or engine state; a frame
    /// rendered at an older generation is stale.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn touch(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }
}

impl<E: SegmentationEngine> SessionController<E> {
    /// Replace image, engine and session in one step. `make_engine` builds the
    /// engine for the new source; if it fails the previous pair stays loaded.
    /// The source is read as opaque RGB.
    #[tracing::instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn load<F>(&mut self, image: &RgbImage, make_engine: F) -> Result<()>
    where
        F: FnOnce(&PixelBuffer<Color>) -> Result<E>,
    {
        let source = PixelBuffer::from_rgb8(image);
        let engine = make_engine(&source)?;
        self.loaded = Some(Loaded {
            source,
            engine,
            session: Session::new(),
        });
        self.touch();
        info!("image loaded, session reset");
        Ok(())
    }

    pub fn handle_pointer(&mut self, ev: &PointerEvent) -> Result<()> {
        let Some(loaded) = self.loaded.as_ref() else {
            debug!(?ev, "pointer ignored: no image loaded");
            return Ok(());
        };
        let t = loaded.session.on_pointer(ev);
        self.commit(t).map(|_| ())
    }

    pub fn execute(&mut self, cmd: Command) -> Result<()> {
        let Some(loaded) = self.loaded.as_ref() else {
            debug!(?cmd, "command ignored: no image loaded");
            return Ok(());
        };
        let t = loaded.session.on_command(cmd);
        if t.calls.is_empty() && t.next == loaded.session {
            debug!(?cmd, "command had no effect");
        }
        self.commit(t).map(|_| ())
    }

    pub fn request_refine_once(&mut self) -> Result<()> {
        self.execute(Command::RefineOnce)
    }

    pub fn request_fit_gmms(&mut self) -> Result<()> {
        self.execute(Command::FitGmms)
    }

    pub fn toggle_continuous_refine(&mut self, on: bool) -> Result<()> {
        self.execute(Command::ContinuousRefine(on))
    }

    pub fn request_abort_refine(&mut self) -> Result<()> {
        self.execute(Command::AbortRefine)
    }

    pub fn set_show_mask(&mut self, on: bool) -> Result<()> {
        self.execute(Command::ShowMask(on))
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) -> Result<()> {
        self.execute(Command::SetViewMode(mode))
    }

    /// Seed from a mask instead of a rectangle drag: engine
    /// `initialize_with_mask` then `fit_gmms`. Only valid while uninitialized.
    pub fn seed_with_mask(&mut self, mask: &PixelBuffer<Color>) -> Result<()> {
        let Some(loaded) = self.loaded.as_mut() else {
            return Ok(());
        };
        if loaded.session.initialized {
            debug!("mask seeding ignored: session already initialized");
            return Ok(());
        }
        if mask.dimensions() != loaded.source.dimensions() {
            return Err(Error::mismatch(
                "seed mask",
                loaded.source.dimensions(),
                mask.dimensions(),
            ));
        }
        loaded.engine.initialize_with_mask(mask)?;
        loaded.engine.fit_gmms()?;
        loaded.session = loaded.session.seeded();
        self.touch();
        info!("session seeded from mask");
        Ok(())
    }

    /// One step of the continuous refine loop, if armed.
    pub fn tick(&mut self) -> Result<RefineStatus> {
        let Some(loaded) = self.loaded.as_ref() else {
            return Ok(RefineStatus::Idle);
        };
        if !loaded.session.refining {
            return Ok(RefineStatus::Idle);
        }
        let t = loaded.session.on_tick(&self.refine);
        if t.calls.is_empty() {
            let ticks = loaded.session.refine_ticks;
            warn!(ticks, "refine loop stopped before converging");
            self.commit(t)?;
            return Ok(RefineStatus::LimitReached);
        }

        let changed = self.commit(t)?.unwrap_or(0);
        let converged = self.session().is_some_and(|s| !s.refining);
        if converged {
            info!("refine loop converged");
            Ok(RefineStatus::Converged)
        } else {
            debug!(changed, "refine iteration");
            Ok(RefineStatus::Refined { changed })
        }
    }

    /// Drive [`tick`](Self::tick) until the loop disarms. `abort` is polled
    /// before each iteration; returning true disarms the loop. Returns the
    /// number of iterations run.
    pub fn run_refine_until(&mut self, mut abort: impl FnMut() -> bool) -> Result<u32> {
        let mut iterations = 0;
        loop {
            if !self.session().is_some_and(|s| s.refining) {
                return Ok(iterations);
            }
            if abort() {
                info!(iterations, "refine loop aborted");
                self.request_abort_refine()?;
                return Ok(iterations);
            }
            match self.tick()? {
                RefineStatus::Refined { .. } | RefineStatus::Converged => iterations += 1,
                RefineStatus::Idle | RefineStatus::LimitReached => return Ok(iterations),
            }
        }
    }

    /// On-screen frame, `None` while nothing is loaded.
    pub fn render(&self, style: &OverlayStyle) -> Result<Option<Raster>> {
        let Some(loaded) = self.loaded.as_ref() else {
            return Ok(None);
        };
        let src = FrameSources::from_engine(&loaded.source, &loaded.engine);
        render_frame(&loaded.session, &src, style).map(Some)
    }

    /// Raster to save for the current view mode, `None` while nothing is loaded.
    pub fn export(&self) -> Result<Option<Raster>> {
        let Some(loaded) = self.loaded.as_ref() else {
            return Ok(None);
        };
        let src = FrameSources::from_engine(&loaded.source, &loaded.engine);
        export_frame(loaded.session.view_mode, &src).map(Some)
    }

    /// Issue the transition's engine calls; on success adopt its session.
    /// On failure keep the previous session with its gesture dropped.
    fn commit(&mut self, t: Transition) -> Result<Option<usize>> {
        let Some(loaded) = self.loaded.as_mut() else {
            return Ok(None);
        };
        match engine::apply(&mut loaded.engine, &t.calls) {
            Ok(outcome) => {
                loaded.session = match outcome.last_changed {
                    Some(changed) => t.next.after_refine(changed),
                    None => t.next,
                };
                self.touch();
                Ok(outcome.last_changed)
            }
            Err(e) => {
                warn!(error = %e, "engine call failed, gesture dropped");
                loaded.session = Session {
                    refining: false,
                    ..loaded.session.abandon_gesture()
                };
                self.touch();
                Err(e)
            }
        }
    }
}
