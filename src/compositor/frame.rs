//! Frame pipeline
//!
//! One frame, strictly in this order:
//!
//! 1. Drain the event queue and dispatch every event.
//! 2. Repaint the base layer clipped to the background damage, then clear
//!    that accumulator.
//! 3. Repaint the scene clipped to the content damage.
//! 4. Present the content damage and clear it.
//!
//! The pipeline is the only writer of the display's back buffer while a
//! frame runs.

use log::trace;

use super::GuiManager;
use crate::config::{ChromeConfig, ThemeConfig};
use crate::input::ShortcutAction;
use crate::renderer::{Color, Display, Point, Rect, Renderer};
use crate::scene::{Element, ElementKind};
use crate::window::{self, WindowControl, WindowState};

/// Paints the base layer (wallpaper, top bar, dock) inside the given area.
pub type BackgroundPainter = Box<dyn FnMut(&mut dyn Renderer, Rect)>;

/// What one frame did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    /// Events routed to an element
    pub events_dispatched: usize,
    /// Global shortcuts that fired, in order
    pub actions: Vec<ShortcutAction>,
    /// Base layer area repainted
    pub background: Option<Rect>,
    /// Scene area repainted
    pub repainted: Option<Rect>,
    /// Area copied to the visible buffer
    pub presented: Option<Rect>,
}

/// Text cell advance used to centre titles
const TEXT_ADVANCE: i32 = 8;
const TEXT_HEIGHT: i32 = 10;

impl GuiManager {
    /// Replaces the default solid-colour base layer.
    ///
    /// The whole screen is damaged so the next frame repaints the scene over
    /// the new base layer and presents it.
    pub fn set_background_painter(&mut self, painter: BackgroundPainter) {
        self.background_painter = Some(painter);
        let screen = self.screen_rect();
        self.damage.invalidate(screen);
    }

    /// Runs one frame against `display`.
    pub fn run_frame(&mut self, display: &mut dyn Display) -> FrameReport {
        let mut report = FrameReport::default();
        self.drain_events(&mut report);

        let screen = self.screen_rect();
        let background = self.damage.take_background();
        if let Some(area) = background.intersection(&screen) {
            display.set_clip(Some(area));
            self.paint_background(display.as_renderer(), area);
            report.background = Some(area);
        }

        if let Some(area) = self.damage.content().intersection(&screen) {
            display.set_clip(Some(area));
            self.paint_scene(display.as_renderer(), area);
            report.repainted = Some(area);
        }
        display.set_clip(None);

        report.presented = self.present(display);
        self.frames += 1;
        trace!(
            "🎞️ Frame {}: {} events, presented {:?}",
            self.frames,
            report.events_dispatched,
            report.presented
        );
        report
    }

    /// Copies the content damage to the visible buffer and resets both
    /// accumulators. Returns the presented area.
    pub fn present(&mut self, display: &mut dyn Display) -> Option<Rect> {
        let content = self.damage.content();
        self.damage.clear();
        let area = content.intersection(&self.screen_rect())?;
        display.present(area);
        Some(area)
    }

    fn paint_background(&mut self, renderer: &mut dyn Renderer, area: Rect) {
        match self.background_painter.as_mut() {
            Some(painter) => painter(renderer, area),
            None => renderer.fill_rect(area, self.config.theme.background),
        }
    }

    /// Paints every element intersecting `dirty`, parents before children.
    pub fn paint_scene(&self, renderer: &mut dyn Renderer, dirty: Rect) {
        let theme = &self.config.theme;
        let chrome = &self.config.chrome;
        self.scene.visit_damaged(dirty, &mut |_, element| {
            paint_element(renderer, element, theme, chrome);
        });
    }
}

fn paint_element(
    renderer: &mut dyn Renderer,
    element: &Element,
    theme: &ThemeConfig,
    chrome: &ChromeConfig,
) {
    if let Some(hook) = &element.paint_hook {
        hook(renderer, element);
        return;
    }

    let bounds = element.bounds;
    if let Some(background) = element.background {
        renderer.fill_rect(bounds, background);
    }

    match element.kind() {
        ElementKind::Panel => {}
        ElementKind::Label => {
            if let Some(text) = &element.text {
                renderer.draw_text(text, bounds.origin(), element.text_color);
            }
        }
        ElementKind::Window(win) => {
            paint_chrome(renderer, bounds, win, element.text_color, theme, chrome)
        }
    }

    if let Some(border) = element.border {
        paint_border(renderer, bounds, border);
    }
}

fn paint_chrome(
    renderer: &mut dyn Renderer,
    bounds: Rect,
    win: &WindowState,
    title_color: Color,
    theme: &ThemeConfig,
    chrome: &ChromeConfig,
) {
    let bar = window::title_bar(bounds, chrome);
    renderer.fill_rect(bar, theme.title_bar);

    let text_width = win.title.chars().count() as i32 * TEXT_ADVANCE;
    let title_at = Point::new(
        bar.x + (bar.width - text_width) / 2,
        bar.y + (bar.height - TEXT_HEIGHT) / 2,
    );
    renderer.draw_text(&win.title, title_at, title_color);

    let r = chrome.control_radius;
    for control in WindowControl::ALL {
        let c = window::control_center(bounds, chrome, control);
        let color = match control {
            WindowControl::Close => theme.control_close,
            WindowControl::Minimize => theme.control_minimize,
            WindowControl::Maximize => theme.control_maximize,
        };
        renderer.fill_rect(Rect::new(c.x - r, c.y - r, 2 * r, 2 * r), color);
    }

    let tabs = win.tabs();
    if tabs.is_empty() {
        return;
    }
    renderer.fill_rect(window::tab_bar(bounds, chrome), theme.tab_bar);
    for (index, tab) in tabs.iter().enumerate() {
        let rect = window::tab_rect(bounds, chrome, index, tabs.len());
        let color = if win.active_tab() == Some(index) {
            theme.tab_active
        } else {
            theme.tab_inactive
        };
        renderer.fill_rect(rect, color);
        let at = Point::new(rect.x + 4, rect.y + (rect.height - TEXT_HEIGHT) / 2);
        renderer.draw_text(&tab.title, at, title_color);
    }
}

fn paint_border(renderer: &mut dyn Renderer, b: Rect, color: Color) {
    renderer.fill_rect(Rect::new(b.x, b.y, b.width, 1), color);
    renderer.fill_rect(Rect::new(b.x, b.bottom() - 1, b.width, 1), color);
    renderer.fill_rect(Rect::new(b.x, b.y, 1, b.height), color);
    renderer.fill_rect(Rect::new(b.right() - 1, b.y, 1, b.height), color);
}
