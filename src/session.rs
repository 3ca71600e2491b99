// Interaction state for one loaded image, and the pure transitions over it.
// Every input (pointer event, command, refine tick) maps the current Session
// to a Transition: the next session plus the engine calls to issue, in order.
// Nothing here touches the engine.
use crate::config::RefineConfig;
use crate::engine::EngineCall;
use crate::pointer::{PointerEvent, PointerKind};
use crate::types::{BRUSH_RADIUS, Point, Rect, SelectionMode, ViewMode};

/// Discrete commands coming from menus, toolbars or shortcuts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    RefineOnce,
    FitGmms,
    ContinuousRefine(bool),
    AbortRefine,
    ShowMask(bool),
    SetViewMode(ViewMode),
}

/// Next session plus the engine calls that get it there.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub next: Session,
    pub calls: Vec<EngineCall>,
}

impl Transition {
    fn to(next: Session) -> Self {
        Self {
            next,
            calls: Vec::new(),
        }
    }

    fn with_calls(next: Session, calls: Vec<EngineCall>) -> Self {
        Self { next, calls }
    }
}

/// Fresh on every image load: uninitialized, no gesture, base view, mask hidden.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub view_mode: ViewMode,
    pub selection: SelectionMode,
    /// Corner where the rectangle drag started.
    pub rect_start: Point,
    /// Live opposite corner of the rectangle drag.
    pub rect_end: Point,
    /// Positions recorded by the current paint gesture. Empty unless painting.
    pub stroke: Vec<Point>,
    /// Rectangle (or mask) seeding has happened.
    pub initialized: bool,
    pub show_mask: bool,
    /// Continuous refine loop armed.
    pub refining: bool,
    /// Ticks the armed loop has run so far.
    pub refine_ticks: u32,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// The drag rectangle, normalized.
    pub fn rect(&self) -> Rect {
        Rect::from_corners(self.rect_start, self.rect_end)
    }

    /// Same session with any in-progress gesture dropped.
    pub fn abandon_gesture(&self) -> Session {
        Session {
            selection: SelectionMode::None,
            stroke: Vec::new(),
            ..self.clone()
        }
    }

    pub fn on_pointer(&self, ev: &PointerEvent) -> Transition {
        match (self.initialized, ev.kind) {
            (false, PointerKind::Press) => self.rect_press(ev),
            (false, PointerKind::Move) => self.rect_move(ev),
            (false, PointerKind::Release) => self.rect_release(ev),
            (true, PointerKind::Press) => self.paint_press(ev),
            (true, PointerKind::Move) => self.paint_move(ev),
            (true, PointerKind::Release) => self.paint_release(ev),
        }
    }

    pub fn on_command(&self, cmd: Command) -> Transition {
        match cmd {
            Command::RefineOnce => self.engine_command(EngineCall::RefineOnce),
            Command::FitGmms => self.engine_command(EngineCall::FitGmms),
            Command::ContinuousRefine(on) => self.set_refining(on),
            Command::AbortRefine => self.set_refining(false),
            Command::ShowMask(on) => Transition::to(Session {
                show_mask: on,
                ..self.clone()
            }),
            Command::SetViewMode(mode) => Transition::to(Session {
                view_mode: mode,
                ..self.clone()
            }),
        }
    }

    /// One step of the continuous loop. Disarms once the iteration budget is spent;
    /// convergence is only known after the engine answers, see [`Session::after_refine`].
    pub fn on_tick(&self, cfg: &RefineConfig) -> Transition {
        if !self.refining || !self.initialized {
            return Transition::to(self.clone());
        }
        if self.refine_ticks >= cfg.max_iterations {
            return Transition::to(Session {
                refining: false,
                ..self.clone()
            });
        }
        Transition::with_calls(
            Session {
                refine_ticks: self.refine_ticks + 1,
                ..self.clone()
            },
            vec![EngineCall::RefineOnce, EngineCall::BuildImages],
        )
    }

    /// Fold the engine's changed-pixel count back in: zero means converged.
    pub fn after_refine(&self, changed: usize) -> Session {
        if changed == 0 && self.refining {
            Session {
                refining: false,
                ..self.clone()
            }
        } else {
            self.clone()
        }
    }

    /// Seeding by mask lands in the same state as a finished rectangle drag.
    pub fn seeded(&self) -> Session {
        Session {
            selection: SelectionMode::None,
            stroke: Vec::new(),
            initialized: true,
            show_mask: true,
            ..self.clone()
        }
    }

    fn rect_press(&self, ev: &PointerEvent) -> Transition {
        if !ev.buttons.primary {
            return Transition::to(self.clone());
        }
        Transition::to(Session {
            selection: SelectionMode::RectDrag,
            rect_start: ev.pos,
            rect_end: ev.pos,
            ..self.clone()
        })
    }

    fn rect_move(&self, ev: &PointerEvent) -> Transition {
        if self.selection != SelectionMode::RectDrag {
            return Transition::to(self.clone());
        }
        Transition::to(Session {
            rect_end: ev.pos,
            ..self.clone()
        })
    }

    fn rect_release(&self, ev: &PointerEvent) -> Transition {
        if self.selection != SelectionMode::RectDrag {
            return Transition::to(self.clone());
        }
        let rect = Rect::from_corners(self.rect_start, ev.pos);
        let next = Session {
            rect_end: ev.pos,
            ..self.seeded()
        };
        Transition::with_calls(next, vec![EngineCall::Initialize(rect), EngineCall::FitGmms])
    }

    fn paint_press(&self, ev: &PointerEvent) -> Transition {
        let selection = if ev.buttons.primary {
            SelectionMode::PaintForeground
        } else {
            SelectionMode::PaintBackground
        };
        Transition::to(Session {
            selection,
            stroke: vec![ev.pos],
            ..self.clone()
        })
    }

    fn paint_move(&self, ev: &PointerEvent) -> Transition {
        if !self.selection.is_painting() {
            return Transition::to(self.clone());
        }
        let mut next = self.clone();
        next.stroke.push(ev.pos);
        Transition::to(next)
    }

    fn paint_release(&self, ev: &PointerEvent) -> Transition {
        let Some(label) = self.selection.paint_label() else {
            return Transition::to(self.clone());
        };
        let mut calls: Vec<EngineCall> = self
            .stroke
            .iter()
            .chain(std::iter::once(&ev.pos))
            .map(|&p| EngineCall::SetTrimap(Rect::around(p, BRUSH_RADIUS), label))
            .collect();
        calls.push(EngineCall::RefineOnce);
        calls.push(EngineCall::BuildImages);
        Transition::with_calls(self.abandon_gesture(), calls)
    }

    fn engine_command(&self, call: EngineCall) -> Transition {
        if !self.initialized {
            return Transition::to(self.clone());
        }
        Transition::with_calls(self.clone(), vec![call])
    }

    fn set_refining(&self, on: bool) -> Transition {
        if on && !self.initialized {
            return Transition::to(self.clone());
        }
        Transition::to(Session {
            refining: on,
            refine_ticks: if on { 0 } else { self.refine_ticks },
            ..self.clone()
        })
    }
}
