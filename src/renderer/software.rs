//! CPU framebuffer display backed by `tiny-skia` pixmaps.
//!
//! Two pixmaps are kept: the off-screen `back` buffer every primitive draws
//! into, and the `front` buffer standing in for video memory. `present`
//! copies a rectangle from back to front, nothing else ever writes `front`.

use anyhow::{anyhow, Context, Result};
use log::debug;
use std::path::Path;
use tiny_skia::{BlendMode, IntRect, Paint, Pixmap, PixmapPaint, Shader, Transform};

use super::{Color, Display, Point, Rect, Renderer};

/// Horizontal advance of one glyph cell.
pub const GLYPH_ADVANCE: i32 = 8;
/// Size of the filled box drawn for each visible character.
pub const GLYPH_WIDTH: i32 = 6;
pub const GLYPH_HEIGHT: i32 = 10;

pub struct SoftwareDisplay {
    back: Pixmap,
    front: Pixmap,
    clip: Option<Rect>,
}

impl std::fmt::Debug for SoftwareDisplay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoftwareDisplay")
            .field("width", &self.back.width())
            .field("height", &self.back.height())
            .field("clip", &self.clip)
            .finish()
    }
}

impl SoftwareDisplay {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let back = Pixmap::new(width, height)
            .ok_or_else(|| anyhow!("Invalid framebuffer size {}x{}", width, height))?;
        let front = back.clone();
        debug!("🖼️ Software display created ({}x{})", width, height);
        Ok(Self {
            back,
            front,
            clip: None,
        })
    }

    fn screen(&self) -> Rect {
        Rect::new(0, 0, self.back.width() as i32, self.back.height() as i32)
    }

    /// Colour of a visible pixel, `None` outside the screen.
    pub fn front_pixel(&self, x: i32, y: i32) -> Option<Color> {
        Self::read(&self.front, x, y)
    }

    /// Colour of an off-screen buffer pixel, `None` outside the screen.
    pub fn back_pixel(&self, x: i32, y: i32) -> Option<Color> {
        Self::read(&self.back, x, y)
    }

    fn read(pixmap: &Pixmap, x: i32, y: i32) -> Option<Color> {
        if x < 0 || y < 0 {
            return None;
        }
        let px = pixmap.pixel(x as u32, y as u32)?.demultiply();
        Some(Color::from_argb(px.alpha(), px.red(), px.green(), px.blue()))
    }

    /// Writes the visible surface to a PNG file.
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        self.front
            .save_png(path)
            .with_context(|| format!("Failed to write screenshot: {}", path.display()))
    }

    /// Area a primitive may touch: the screen, narrowed by the active clip.
    fn drawable(&self, rect: Rect) -> Option<Rect> {
        let mut area = rect.intersection(&self.screen())?;
        if let Some(clip) = self.clip {
            area = area.intersection(&clip)?;
        }
        Some(area)
    }
}

/// Solid paint that replaces destination pixels instead of blending.
fn solid_paint(color: Color) -> Paint<'static> {
    Paint {
        shader: Shader::SolidColor(tiny_skia::Color::from_rgba8(
            color.red(),
            color.green(),
            color.blue(),
            color.alpha(),
        )),
        blend_mode: BlendMode::Source,
        anti_alias: false,
        ..Default::default()
    }
}

impl Renderer for SoftwareDisplay {
    fn fill_rect(&mut self, rect: Rect, color: Color) {
        if color.is_transparent() {
            return;
        }
        let Some(area) = self.drawable(rect) else {
            return;
        };

        let Some(target) = tiny_skia::Rect::from_xywh(
            area.x as f32,
            area.y as f32,
            area.width as f32,
            area.height as f32,
        ) else {
            return;
        };
        self.back
            .fill_rect(target, &solid_paint(color), Transform::identity(), None);
    }

    fn draw_text(&mut self, text: &str, origin: Point, color: Color) {
        // No font rasteriser here: every visible character is a solid cell.
        for (i, ch) in text.chars().enumerate() {
            if ch.is_whitespace() {
                continue;
            }
            let x = origin.x + i as i32 * GLYPH_ADVANCE;
            self.fill_rect(Rect::new(x, origin.y, GLYPH_WIDTH, GLYPH_HEIGHT), color);
        }
    }
}

impl Display for SoftwareDisplay {
    fn size(&self) -> (i32, i32) {
        (self.back.width() as i32, self.back.height() as i32)
    }

    fn set_clip(&mut self, clip: Option<Rect>) {
        self.clip = clip;
    }

    fn present(&mut self, region: Rect) {
        let Some(area) = region.intersection(&self.screen()) else {
            return;
        };

        let patch = IntRect::from_xywh(area.x, area.y, area.width as u32, area.height as u32)
            .and_then(|rect| self.back.clone_rect(rect));
        let Some(patch) = patch else {
            return;
        };
        let paint = PixmapPaint {
            blend_mode: BlendMode::Source,
            ..Default::default()
        };
        self.front.draw_pixmap(
            area.x,
            area.y,
            patch.as_ref(),
            &paint,
            Transform::identity(),
            None,
        );
    }

    fn as_renderer(&mut self) -> &mut dyn Renderer {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Color = Color(0xFFFF_0000);

    #[test]
    fn test_zero_size_is_rejected() {
        assert!(SoftwareDisplay::new(0, 10).is_err());
    }

    #[test]
    fn test_fill_only_touches_back_buffer() {
        let mut display = SoftwareDisplay::new(20, 20).unwrap();
        display.fill_rect(Rect::new(2, 2, 4, 4), RED);

        assert_eq!(display.back_pixel(3, 3), Some(RED));
        assert_eq!(display.front_pixel(3, 3), Some(Color::TRANSPARENT));
        assert_eq!(display.back_pixel(6, 6), Some(Color::TRANSPARENT));
    }

    #[test]
    fn test_clip_restricts_fill() {
        let mut display = SoftwareDisplay::new(20, 20).unwrap();
        display.set_clip(Some(Rect::new(0, 0, 5, 5)));
        display.fill_rect(Rect::new(0, 0, 20, 20), RED);

        assert_eq!(display.back_pixel(4, 4), Some(RED));
        assert_eq!(display.back_pixel(5, 5), Some(Color::TRANSPARENT));
    }

    #[test]
    fn test_fill_outside_screen_is_clamped() {
        let mut display = SoftwareDisplay::new(10, 10).unwrap();
        display.fill_rect(Rect::new(-5, -5, 8, 8), RED);
        assert_eq!(display.back_pixel(0, 0), Some(RED));
        assert_eq!(display.back_pixel(3, 3), Some(Color::TRANSPARENT));
    }

    #[test]
    fn test_present_copies_only_region() {
        let mut display = SoftwareDisplay::new(20, 20).unwrap();
        display.fill_rect(Rect::new(0, 0, 20, 20), RED);
        display.present(Rect::new(5, 5, 5, 5));

        assert_eq!(display.front_pixel(5, 5), Some(RED));
        assert_eq!(display.front_pixel(9, 9), Some(RED));
        assert_eq!(display.front_pixel(10, 10), Some(Color::TRANSPARENT));
        assert_eq!(display.front_pixel(4, 5), Some(Color::TRANSPARENT));
    }

    #[test]
    fn test_fill_replaces_instead_of_blending() {
        let mut display = SoftwareDisplay::new(20, 20).unwrap();
        let translucent = Color(0x8000_00FF);
        display.fill_rect(Rect::new(0, 0, 20, 20), RED);
        display.fill_rect(Rect::new(4, 4, 8, 8), Color::WHITE);
        display.fill_rect(Rect::new(6, 6, 2, 2), translucent);

        assert_eq!(display.back_pixel(4, 4), Some(Color::WHITE));
        assert_eq!(display.back_pixel(11, 11), Some(Color::WHITE));
        assert_eq!(display.back_pixel(12, 12), Some(RED));
        assert_eq!(display.back_pixel(3, 4), Some(RED));
        // No red bleeds through the translucent fill
        let px = display.back_pixel(6, 6).unwrap();
        assert_eq!((px.alpha(), px.red()), (0x80, 0));
    }

    #[test]
    fn test_present_overwrites_previous_frame() {
        let mut display = SoftwareDisplay::new(20, 20).unwrap();
        display.fill_rect(Rect::new(0, 0, 20, 20), RED);
        display.present(Rect::new(0, 0, 20, 20));

        display.fill_rect(Rect::new(0, 0, 20, 20), Color(0x4000_0000));
        display.present(Rect::new(2, 2, 3, 3));
        assert_eq!(display.front_pixel(2, 2).map(Color::alpha), Some(0x40));
        assert_eq!(display.front_pixel(4, 4).map(Color::alpha), Some(0x40));
        assert_eq!(display.front_pixel(5, 5), Some(RED));
    }

    #[test]
    fn test_present_outside_screen_is_ignored() {
        let mut display = SoftwareDisplay::new(10, 10).unwrap();
        display.fill_rect(Rect::new(0, 0, 10, 10), RED);
        display.present(Rect::new(-20, -20, 5, 5));
        assert_eq!(display.front_pixel(0, 0), Some(Color::TRANSPARENT));
    }

    #[test]
    fn test_text_draws_glyph_cells() {
        let mut display = SoftwareDisplay::new(40, 20).unwrap();
        display.draw_text("a b", Point::new(0, 0), RED);

        assert_eq!(display.back_pixel(0, 0), Some(RED));
        // the space leaves its cell untouched
        assert_eq!(display.back_pixel(GLYPH_ADVANCE, 0), Some(Color::TRANSPARENT));
        assert_eq!(display.back_pixel(2 * GLYPH_ADVANCE, 0), Some(RED));
    }
}
