// Framebuffer window: shows composited frames and reports the pointer.
use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

use crate::compositor::pack_rgb;
use crate::error::{Error, Result};
use crate::pointer::{Buttons, PointerEvent, PointerTracker};
use crate::types::{Point, Raster};

pub struct Viewer {
    window: Window,
    tracker: PointerTracker,
}

impl Viewer {
    /// Open a window sized to the loaded image.
    pub fn new(title: &str, width: usize, height: usize) -> Result<Self> {
        let window = Window::new(title, width, height, WindowOptions::default())
            .map_err(|e| Error::Window(e.to_string()))?;
        Ok(Self {
            window,
            tracker: PointerTracker::new(),
        })
    }

    /// Push a rendered frame to the screen.
    pub fn present(&mut self, frame: &Raster) -> Result<()> {
        let (w, h) = frame.dimensions();
        self.window
            .update_with_buffer(&pack_rgb(frame), w as usize, h as usize)
            .map_err(|e| Error::Window(e.to_string()))
    }

    /// False once the user closed the window or pressed ESC.
    pub fn is_open(&self) -> bool {
        self.window.is_open() && !self.window.is_key_down(Key::Escape)
    }

    /// True on the frame `key` went down; held keys do not repeat.
    pub fn key_pressed(&self, key: Key) -> bool {
        self.window.is_key_pressed(key, KeyRepeat::No)
    }

    /// Sample the mouse and turn the change since the last sample into an event.
    pub fn poll_pointer(&mut self) -> Option<PointerEvent> {
        let (x, y) = self.window.get_mouse_pos(MouseMode::Clamp)?;
        let buttons = Buttons {
            primary: self.window.get_mouse_down(MouseButton::Left),
            secondary: self.window.get_mouse_down(MouseButton::Right),
        };
        self.tracker.sample(Point::new(x as i32, y as i32), buttons)
    }
}
