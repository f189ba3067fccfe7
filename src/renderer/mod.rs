//! Rendering boundary of the compositor
//!
//! The core never touches pixels itself. Element painting goes through the
//! [`Renderer`] capability, which offers exactly two primitives: fill a
//! rectangle and draw a run of text. Everything fancier (icons, gradients,
//! rounded chrome) belongs to paint hooks supplied by element owners.
//!
//! The frame pipeline additionally needs a [`Display`]: a renderer with an
//! off-screen buffer that can be clipped and whose dirty region can be
//! copied to the visible surface.

pub mod damage;
pub mod software;

use serde::{Deserialize, Serialize};

pub use damage::{DamageTracker, Point, Rect};
pub use software::SoftwareDisplay;

/// 32-bit ARGB colour (`0xAARRGGBB`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(pub u32);

impl Color {
    pub const TRANSPARENT: Color = Color(0x0000_0000);
    pub const BLACK: Color = Color(0xFF00_0000);
    pub const WHITE: Color = Color(0xFFFF_FFFF);

    pub const fn alpha(self) -> u8 {
        (self.0 >> 24) as u8
    }

    pub const fn red(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub const fn green(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn blue(self) -> u8 {
        self.0 as u8
    }

    pub const fn from_argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Color(((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    pub const fn is_transparent(self) -> bool {
        self.alpha() == 0
    }
}

/// Drawing primitives available to element painters.
pub trait Renderer {
    fn fill_rect(&mut self, rect: Rect, color: Color);
    fn draw_text(&mut self, text: &str, origin: Point, color: Color);
}

/// An off-screen buffer plus the visible surface it is presented to.
pub trait Display: Renderer {
    /// Screen size in pixels.
    fn size(&self) -> (i32, i32);

    /// Restricts subsequent drawing to `clip`; `None` lifts the restriction.
    fn set_clip(&mut self, clip: Option<Rect>);

    /// Copies `region` of the off-screen buffer to the visible surface.
    fn present(&mut self, region: Rect);

    fn as_renderer(&mut self) -> &mut dyn Renderer;
}

/// One call recorded by [`RecordingDisplay`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Fill { rect: Rect, color: Color },
    Text { text: String, origin: Point, color: Color },
    Clip(Option<Rect>),
    Present(Rect),
}

/// Display that records every call instead of drawing.
///
/// Handy for tests and for tracing what a frame would touch.
#[derive(Debug, Clone)]
pub struct RecordingDisplay {
    width: i32,
    height: i32,
    commands: Vec<DrawCommand>,
}

impl RecordingDisplay {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Rectangles filled since the last `take_commands`.
    pub fn fills(&self) -> Vec<Rect> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Fill { rect, .. } => Some(*rect),
                _ => None,
            })
            .collect()
    }

    /// Text runs drawn since the last `take_commands`.
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn presented(&self) -> Vec<Rect> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Present(r) => Some(*r),
                _ => None,
            })
            .collect()
    }
}

impl Renderer for RecordingDisplay {
    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.commands.push(DrawCommand::Fill { rect, color });
    }

    fn draw_text(&mut self, text: &str, origin: Point, color: Color) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            origin,
            color,
        });
    }
}

impl Display for RecordingDisplay {
    fn size(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    fn set_clip(&mut self, clip: Option<Rect>) {
        self.commands.push(DrawCommand::Clip(clip));
    }

    fn present(&mut self, region: Rect) {
        self.commands.push(DrawCommand::Present(region));
    }

    fn as_renderer(&mut self) -> &mut dyn Renderer {
        self
    }
}
