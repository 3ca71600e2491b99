// Pointer input as the session consumes it: press / move / release with a
// position and a button mask. `PointerTracker` turns polled mouse state
// (what a framebuffer window hands out every frame) into those events.
use crate::types::Point;

/// Buttons held while an event fires.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Buttons {
    pub primary: bool,
    pub secondary: bool,
}

impl Buttons {
    pub const NONE: Buttons = Buttons {
        primary: false,
        secondary: false,
    };
    pub const PRIMARY: Buttons = Buttons {
        primary: true,
        secondary: false,
    };
    pub const SECONDARY: Buttons = Buttons {
        primary: false,
        secondary: true,
    };

    pub fn any(&self) -> bool {
        self.primary || self.secondary
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Press,
    Move,
    Release,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub pos: Point,
    pub buttons: Buttons,
}

impl PointerEvent {
    pub fn press(x: i32, y: i32, buttons: Buttons) -> Self {
        Self {
            kind: PointerKind::Press,
            pos: Point::new(x, y),
            buttons,
        }
    }

    pub fn moved(x: i32, y: i32, buttons: Buttons) -> Self {
        Self {
            kind: PointerKind::Move,
            pos: Point::new(x, y),
            buttons,
        }
    }

    /// `buttons` are the ones still held after the release, usually none.
    pub fn release(x: i32, y: i32, buttons: Buttons) -> Self {
        Self {
            kind: PointerKind::Release,
            pos: Point::new(x, y),
            buttons,
        }
    }
}

/// Edge detector over sampled button state.
#[derive(Debug, Default)]
pub struct PointerTracker {
    held: Buttons,
    last: Option<Point>,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one sample. At most one event comes out per sample: a press when
    /// the first button goes down, a release when the last one comes up, and
    /// a move when the position changed while something is held.
    pub fn sample(&mut self, pos: Point, buttons: Buttons) -> Option<PointerEvent> {
        let was_held = self.held.any();
        let moved = self.last != Some(pos);
        self.held = buttons;
        self.last = Some(pos);

        match (was_held, buttons.any()) {
            (false, true) => Some(PointerEvent {
                kind: PointerKind::Press,
                pos,
                buttons,
            }),
            (true, false) => Some(PointerEvent {
                kind: PointerKind::Release,
                pos,
                buttons,
            }),
            (true, true) if moved => Some(PointerEvent {
                kind: PointerKind::Move,
                pos,
                buttons,
            }),
            _ => None,
        }
    }
}
