//! Window state and chrome geometry
//!
//! A window is a scene element with a title bar, three round controls
//! (close, minimize, maximize) and an optional tab strip. This module holds
//! the per-window interaction state and the pure geometry used to hit-test
//! and paint the chrome. Transitions that touch the scene (moving, raising,
//! capturing the pointer) are driven by the compositor.

use crate::config::ChromeConfig;
use crate::ipc::{OwnerId, WindowInbox};
use crate::renderer::{Point, Rect};
use crate::scene::ElementId;
use crate::wm::WmNodeId;

/// One tab of a tabbed window
#[derive(Debug, Clone, PartialEq)]
pub struct Tab {
    pub title: String,
    pub content: ElementId,
}

/// Interaction mode derived from the window flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowMode {
    Normal,
    Dragging,
    Maximized,
    Minimized,
    Closed,
}

/// Title bar controls, right to left
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowControl {
    Close,
    Minimize,
    Maximize,
}

impl WindowControl {
    pub const ALL: [WindowControl; 3] = [
        WindowControl::Close,
        WindowControl::Minimize,
        WindowControl::Maximize,
    ];

    /// Position counted from the right edge
    fn slot(self) -> i32 {
        match self {
            WindowControl::Close => 0,
            WindowControl::Minimize => 1,
            WindowControl::Maximize => 2,
        }
    }
}

#[derive(Debug)]
pub struct WindowState {
    pub title: String,
    pub(crate) dragging: bool,
    pub(crate) drag_offset: Point,
    pub(crate) maximized: bool,
    pub(crate) minimized: bool,
    pub(crate) closed: bool,
    /// Bounds to restore when leaving maximized or minimized
    pub(crate) saved_bounds: Rect,
    pub(crate) tabs: Vec<Tab>,
    pub(crate) active_tab: Option<usize>,
    pub(crate) owner: OwnerId,
    pub(crate) inbox: WindowInbox,
    pub(crate) wm_node: Option<WmNodeId>,
}

impl WindowState {
    pub fn new(title: impl Into<String>, owner: OwnerId, inbox_capacity: usize) -> Self {
        Self {
            title: title.into(),
            dragging: false,
            drag_offset: Point::default(),
            maximized: false,
            minimized: false,
            closed: false,
            saved_bounds: Rect::EMPTY,
            tabs: Vec::new(),
            active_tab: None,
            owner,
            inbox: WindowInbox::new(inbox_capacity),
            wm_node: None,
        }
    }

    pub fn mode(&self) -> WindowMode {
        if self.closed {
            WindowMode::Closed
        } else if self.minimized {
            WindowMode::Minimized
        } else if self.dragging {
            WindowMode::Dragging
        } else if self.maximized {
            WindowMode::Maximized
        } else {
            WindowMode::Normal
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn is_maximized(&self) -> bool {
        self.maximized
    }

    pub fn is_minimized(&self) -> bool {
        self.minimized
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn saved_bounds(&self) -> Rect {
        self.saved_bounds
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn active_tab(&self) -> Option<usize> {
        self.active_tab
    }

    pub fn active_content(&self) -> Option<ElementId> {
        self.active_tab
            .and_then(|i| self.tabs.get(i))
            .map(|tab| tab.content)
    }

    pub fn owner(&self) -> OwnerId {
        self.owner
    }

    pub fn inbox(&self) -> &WindowInbox {
        &self.inbox
    }

    pub fn wm_node(&self) -> Option<WmNodeId> {
        self.wm_node
    }

    /// Starts a drag grabbed at `pointer` on a window whose origin is `origin`.
    pub(crate) fn begin_drag(&mut self, pointer: Point, origin: Point) {
        self.dragging = true;
        self.drag_offset = Point::new(
            pointer.x.saturating_sub(origin.x),
            pointer.y.saturating_sub(origin.y),
        );
    }

    /// Where the window origin goes while the pointer is at `pointer`.
    pub(crate) fn drag_target(&self, pointer: Point) -> Option<Point> {
        if !self.dragging || self.maximized {
            return None;
        }
        Some(Point::new(
            pointer.x.saturating_sub(self.drag_offset.x),
            pointer.y.saturating_sub(self.drag_offset.y),
        ))
    }

    /// Returns `true` if a drag was in progress.
    pub(crate) fn end_drag(&mut self) -> bool {
        std::mem::replace(&mut self.dragging, false)
    }

    /// Drops the tabs whose content satisfies `gone`, keeping the active
    /// index pointing at the same tab where possible.
    ///
    /// Returns `true` if the active tab itself was dropped.
    pub(crate) fn forget_tabs(&mut self, gone: impl Fn(ElementId) -> bool) -> bool {
        let active = self.active_content();
        let before = self.tabs.len();
        self.tabs.retain(|tab| !gone(tab.content));
        if self.tabs.len() == before {
            return false;
        }
        match active {
            Some(content) if gone(content) => {
                self.active_tab = None;
                true
            }
            Some(content) => {
                self.active_tab = self.tabs.iter().position(|t| t.content == content);
                false
            }
            None => false,
        }
    }
}

/// Title bar strip across the top of `bounds`.
pub fn title_bar(bounds: Rect, chrome: &ChromeConfig) -> Rect {
    Rect::new(bounds.x, bounds.y, bounds.width, chrome.title_bar_height)
}

/// Tab strip directly below the title bar.
pub fn tab_bar(bounds: Rect, chrome: &ChromeConfig) -> Rect {
    Rect::new(
        bounds.x,
        bounds.y.saturating_add(chrome.title_bar_height),
        bounds.width,
        chrome.tab_bar_height,
    )
}

/// Area the press-to-drag gesture starts from: the title bar, plus the tab
/// strip when the window has tabs.
pub fn drag_region(bounds: Rect, chrome: &ChromeConfig, has_tabs: bool) -> Rect {
    let extra = if has_tabs { chrome.tab_bar_height } else { 0 };
    Rect::new(
        bounds.x,
        bounds.y,
        bounds.width,
        chrome.title_bar_height + extra,
    )
}

/// Rectangle the active tab's content is laid out into.
pub fn content_rect(bounds: Rect, chrome: &ChromeConfig) -> Rect {
    let top = chrome.title_bar_height + chrome.tab_bar_height;
    let inset = chrome.content_inset;
    Rect::new(
        bounds.x.saturating_add(inset),
        bounds.y.saturating_add(top),
        (bounds.width - 2 * inset).max(0),
        (bounds.height - top - inset).max(0),
    )
}

/// Centre of a title bar control.
pub fn control_center(bounds: Rect, chrome: &ChromeConfig, control: WindowControl) -> Point {
    let close_x = bounds.right().saturating_sub(chrome.control_margin);
    Point::new(
        close_x.saturating_sub(control.slot() * chrome.control_spacing),
        bounds.y.saturating_add(chrome.title_bar_height / 2),
    )
}

/// The control under `p`, if any.
///
/// Controls are circles; only points inside the title bar qualify.
pub fn hit_control(bounds: Rect, chrome: &ChromeConfig, p: Point) -> Option<WindowControl> {
    if !title_bar(bounds, chrome).contains_point(p) {
        return None;
    }
    let r = chrome.control_radius as i64;
    WindowControl::ALL.into_iter().find(|&control| {
        let c = control_center(bounds, chrome, control);
        let dx = p.x as i64 - c.x as i64;
        let dy = p.y as i64 - c.y as i64;
        dx * dx + dy * dy <= r * r
    })
}

/// Rectangle of tab `index` when `count` tabs share the tab strip.
///
/// The last tab absorbs the rounding remainder.
pub fn tab_rect(bounds: Rect, chrome: &ChromeConfig, index: usize, count: usize) -> Rect {
    let strip = tab_bar(bounds, chrome);
    if count == 0 || index >= count {
        return Rect::EMPTY;
    }
    let count = count as i32;
    let index = index as i32;
    let width = strip.width / count;
    let x = strip.x + index * width;
    let w = if index == count - 1 { strip.right() - x } else { width };
    Rect::new(x, strip.y, w, strip.height)
}

/// The tab under `p`, if any.
pub fn tab_at(bounds: Rect, chrome: &ChromeConfig, count: usize, p: Point) -> Option<usize> {
    if count == 0 || !tab_bar(bounds, chrome).contains_point(p) {
        return None;
    }
    (0..count).find(|&i| tab_rect(bounds, chrome, i, count).contains_point(p))
}
