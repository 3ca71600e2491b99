// Interactive cut-out of one image file.
// Drag a rectangle around the object, then fix mistakes with strokes:
// left mouse paints foreground, right mouse paints background.
// Keys: R refine once, G refit colors, C continuous refine on/off, A abort,
// M mask on/off, 1-4 view mode, S save the current view, ESC quit.
//
//   cargo run --example viewer --features window -- photo.jpg [out.png]
//
// The engine here is a stand-in: one mean color per side instead of
// Gaussian mixtures, nearest-mean relabeling instead of a graph cut.
use grabcut_session::window::Viewer;
use grabcut_session::{
    Color, Error, OverlayStyle, PixelBuffer, Point, Rect, Result, SegmentationEngine,
    SessionController, TrimapLabel, ViewMode, distance2,
};
use minifb::Key;
use tracing::{info, warn};

struct MeanColorEngine {
    source: PixelBuffer<Color>,
    labels: PixelBuffer<TrimapLabel>,
    alpha: PixelBuffer<f32>,
    fg: Color,
    bg: Color,
    gmms: PixelBuffer<Color>,
    nlinks: PixelBuffer<f32>,
    tlinks: PixelBuffer<Color>,
}

impl MeanColorEngine {
    fn new(source: &PixelBuffer<Color>) -> Self {
        let (w, h) = source.dimensions();
        Self {
            source: source.clone(),
            labels: PixelBuffer::new(w, h),
            alpha: PixelBuffer::new(w, h),
            fg: Color::BLACK,
            bg: Color::BLACK,
            gmms: PixelBuffer::new(w, h),
            nlinks: PixelBuffer::new(w, h),
            tlinks: PixelBuffer::new(w, h),
        }
    }

    fn color(&self, x: u32, y: u32) -> Color {
        self.source.get(x, y).copied().unwrap_or(Color::BLACK)
    }

    fn nearest_is_fg(&self, c: Color) -> bool {
        distance2(c, self.fg) < distance2(c, self.bg)
    }
}

fn mean(sum: (f32, f32, f32), n: u32) -> Color {
    let n = n as f32;
    Color::new(sum.0 / n, sum.1 / n, sum.2 / n)
}

impl SegmentationEngine for MeanColorEngine {
    fn initialize(&mut self, rect: Rect) -> Result<()> {
        let (w, h) = self.source.dimensions();
        rect.check_seed(w, h)?;
        let inside = |x: u32, y: u32| rect.contains(Point::new(x as i32, y as i32));
        self.labels = PixelBuffer::from_fn(w, h, |x, y| {
            if inside(x, y) {
                TrimapLabel::Unknown
            } else {
                TrimapLabel::Background
            }
        });
        self.alpha = PixelBuffer::from_fn(w, h, |x, y| if inside(x, y) { 1.0 } else { 0.0 });
        Ok(())
    }

    fn fit_gmms(&mut self) -> Result<()> {
        let (w, h) = self.source.dimensions();
        let (mut fg, mut bg) = ((0.0, 0.0, 0.0), (0.0, 0.0, 0.0));
        let (mut nf, mut nb) = (0u32, 0u32);
        for y in 0..h {
            for x in 0..w {
                let c = self.color(x, y);
                let (sum, n) = match self.alpha.get(x, y) {
                    Some(&a) if a > 0.5 => (&mut fg, &mut nf),
                    _ => (&mut bg, &mut nb),
                };
                sum.0 += c.r;
                sum.1 += c.g;
                sum.2 += c.b;
                *n += 1;
            }
        }
        if nf == 0 || nb == 0 {
            return Err(Error::engine("one side of the cut is empty"));
        }
        self.fg = mean(fg, nf);
        self.bg = mean(bg, nb);
        Ok(())
    }

    fn set_trimap(&mut self, rect: Rect, label: TrimapLabel) -> Result<()> {
        self.labels.fill_rect(rect, label);
        let a = if label == TrimapLabel::Foreground { 1.0 } else { 0.0 };
        self.alpha.fill_rect(rect, a);
        Ok(())
    }

    fn refine_once(&mut self) -> Result<usize> {
        let (w, h) = self.source.dimensions();
        let mut changed = 0;
        let alpha = PixelBuffer::from_fn(w, h, |x, y| {
            let old = self.alpha.get(x, y).copied().unwrap_or(0.0);
            if self.labels.get(x, y) != Some(&TrimapLabel::Unknown) {
                return old;
            }
            let new = if self.nearest_is_fg(self.color(x, y)) { 1.0 } else { 0.0 };
            if new != old {
                changed += 1;
            }
            new
        });
        self.alpha = alpha;
        if changed > 0 {
            self.fit_gmms()?;
        }
        Ok(changed)
    }

    fn build_images(&mut self) -> Result<()> {
        let (w, h) = self.source.dimensions();
        self.gmms = PixelBuffer::from_fn(w, h, |x, y| {
            if self.nearest_is_fg(self.color(x, y)) {
                self.fg
            } else {
                self.bg
            }
        });
        self.nlinks = PixelBuffer::from_fn(w, h, |x, y| {
            let right = self.color((x + 1).min(w - 1), y);
            let below = self.color(x, (y + 1).min(h - 1));
            let c = self.color(x, y);
            (-(distance2(c, right) + distance2(c, below)) * 4.0).exp()
        });
        self.tlinks = PixelBuffer::from_fn(w, h, |x, y| {
            let c = self.color(x, y);
            Color::new(distance2(c, self.bg) / 3.0, distance2(c, self.fg) / 3.0, 0.0)
        });
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

/// Engine failures are shown and the session carries on.
fn report(r: Result<()>) {
    if let Err(e) = r {
        warn!(error = %e, "request failed");
    }
}

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().init();

    let mut args = std::env::args().skip(1);
    let path = args.next().ok_or("usage: viewer <image> [out.png]")?;
    let out_path = args.next().unwrap_or_else(|| "cutout.png".to_owned());

    let image = image::open(&path)?.to_rgb8();
    let mut ctl = SessionController::default();
    ctl.load(&image, |src| Ok(MeanColorEngine::new(src)))?;

    let (w, h) = image.dimensions();
    let mut viewer = Viewer::new("GrabCut", w as usize, h as usize)?;
    let style = OverlayStyle::default();
    let view_keys = [Key::Key1, Key::Key2, Key::Key3, Key::Key4];

    while viewer.is_open() {
        if let Some(ev) = viewer.poll_pointer() {
            report(ctl.handle_pointer(&ev));
        }

        let (refining, show_mask) = ctl
            .session()
            .map_or((false, false), |s| (s.refining, s.show_mask));
        if viewer.key_pressed(Key::R) {
            report(ctl.request_refine_once());
        }
        if viewer.key_pressed(Key::G) {
            report(ctl.request_fit_gmms());
        }
        if viewer.key_pressed(Key::C) {
            report(ctl.toggle_continuous_refine(!refining));
        }
        if viewer.key_pressed(Key::A) {
            report(ctl.request_abort_refine());
        }
        if viewer.key_pressed(Key::M) {
            report(ctl.set_show_mask(!show_mask));
        }
        for (i, key) in view_keys.iter().enumerate() {
            if viewer.key_pressed(*key) {
                if let Some(mode) = ViewMode::from_index(i) {
                    report(ctl.set_view_mode(mode));
                }
            }
        }
        if viewer.key_pressed(Key::S) {
            if let Some(out) = ctl.export()? {
                out.save(&out_path)?;
                info!(path = %out_path, "saved");
            }
        }

        report(ctl.tick().map(|_| ()));

        if let Some(frame) = ctl.render(&style)? {
            viewer.present(&frame)?;
        }
    }
    Ok(())
}
