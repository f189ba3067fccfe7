//! Window interaction state machine
//!
//! Normal windows start a drag when pressed in the title bar (or the tab
//! strip) and follow the pointer until release. The title bar controls
//! close, minimize and toggle maximize. Tabs share the content area: only
//! the active tab's content is attached to the scene.

use log::{debug, info};

use super::GuiManager;
use crate::error::{GuiError, GuiResult};
use crate::input::{EventKind, GuiEvent};
use crate::renderer::Rect;
use crate::scene::ElementId;
use crate::window::{self, Tab, WindowControl, WindowState};

impl GuiManager {
    fn window_state(&self, id: ElementId) -> GuiResult<&WindowState> {
        self.scene
            .get(id)
            .ok_or(GuiError::StaleElement(id))?
            .window()
            .ok_or(GuiError::NotAWindow(id))
    }

    fn window_state_mut(&mut self, id: ElementId) -> GuiResult<&mut WindowState> {
        self.scene
            .get_mut(id)
            .ok_or(GuiError::StaleElement(id))?
            .window_mut()
            .ok_or(GuiError::NotAWindow(id))
    }

    fn bounds_of(&self, id: ElementId) -> GuiResult<Rect> {
        self.scene
            .get(id)
            .map(|e| e.bounds)
            .ok_or(GuiError::StaleElement(id))
    }

    pub(crate) fn handle_window_event(&mut self, id: ElementId, event: &GuiEvent) {
        let result = match event.kind {
            EventKind::MouseDown => self.window_pressed(id, event),
            EventKind::MouseUp => self.window_released(id),
            EventKind::MouseMove => self.window_dragged(id, event),
            _ => Ok(()),
        };
        if let Err(err) = result {
            debug!("Window event on {:?} ignored: {}", id, err);
        }
    }

    fn window_pressed(&mut self, id: ElementId, event: &GuiEvent) -> GuiResult<()> {
        self.bring_to_front(id)?;

        let bounds = self.bounds_of(id)?;
        let chrome = self.config.chrome;
        let p = event.position;

        if let Some(control) = window::hit_control(bounds, &chrome, p) {
            info!("🔘 {:?} pressed on {:?}", control, id);
            return match control {
                WindowControl::Close => self.close_window(id),
                WindowControl::Minimize => self.minimize_window(id),
                WindowControl::Maximize => self.toggle_maximize(id),
            };
        }

        let win = self.window_state(id)?;
        let tab_count = win.tabs().len();
        if let Some(index) = window::tab_at(bounds, &chrome, tab_count, p) {
            if win.active_tab() != Some(index) {
                return self.activate_tab(id, index);
            }
        }

        let grab = window::drag_region(bounds, &chrome, tab_count > 0);
        if grab.contains_point(p) && !win.is_maximized() {
            self.window_state_mut(id)?.begin_drag(p, bounds.origin());
            self.capture(id)?;
            debug!("✋ Started dragging {:?}", id);
        }
        Ok(())
    }

    fn window_released(&mut self, id: ElementId) -> GuiResult<()> {
        if self.window_state_mut(id)?.end_drag() {
            self.release_capture();
            debug!("✋ Stopped dragging {:?}", id);
        }
        Ok(())
    }

    fn window_dragged(&mut self, id: ElementId, event: &GuiEvent) -> GuiResult<()> {
        if let Some(origin) = self.window_state(id)?.drag_target(event.position) {
            self.set_position(id, origin.x, origin.y)?;
        }
        Ok(())
    }

    /// Enters or leaves the maximized state.
    ///
    /// Entering remembers the current bounds and fills the usable area;
    /// leaving restores the remembered bounds exactly. Minimized and closed
    /// windows are left alone.
    pub fn toggle_maximize(&mut self, id: ElementId) -> GuiResult<()> {
        let bounds = self.bounds_of(id)?;
        let usable = self.config.usable_area();
        let win = self.window_state_mut(id)?;
        if win.minimized || win.closed {
            debug!("🔲 Ignoring maximize toggle for hidden window {:?}", id);
            return Ok(());
        }
        win.dragging = false;

        let target = if win.maximized {
            win.maximized = false;
            win.saved_bounds
        } else {
            win.maximized = true;
            win.saved_bounds = bounds;
            usable
        };
        let maximized = win.maximized;
        if self.captured == Some(id) {
            self.release_capture();
        }

        self.set_bounds(id, target)?;
        info!(
            "🔲 Window {:?} {}",
            id,
            if maximized { "maximized" } else { "restored" }
        );
        Ok(())
    }

    /// Parks the window off-screen. Minimizing twice is a no-op.
    ///
    /// The bounds of a maximized window are not saved again so that a later
    /// restore still returns to the pre-maximize geometry.
    pub fn minimize_window(&mut self, id: ElementId) -> GuiResult<()> {
        let bounds = self.bounds_of(id)?;
        let hidden_x = self.parked_x(bounds);
        let win = self.window_state_mut(id)?;
        if win.minimized || win.closed {
            return Ok(());
        }
        if !win.maximized {
            win.saved_bounds = bounds;
        }
        win.minimized = true;
        win.dragging = false;

        self.drop_interaction(id);
        self.set_position(id, hidden_x, bounds.y)?;
        info!("➖ Window {:?} minimized", id);
        Ok(())
    }

    /// Brings a minimized window back, raised and focused.
    ///
    /// Returns `Ok(false)` if the window was not minimized or is closed.
    pub fn show_window(&mut self, id: ElementId) -> GuiResult<bool> {
        let usable = self.config.usable_area();
        let win = self.window_state_mut(id)?;
        if !win.minimized || win.closed {
            return Ok(false);
        }
        win.minimized = false;
        let target = if win.maximized {
            usable
        } else {
            win.saved_bounds
        };

        self.set_bounds(id, target)?;
        self.bring_to_front(id)?;
        self.focus_element(id);
        info!("🪟 Window {:?} shown", id);
        Ok(true)
    }

    /// Closes a window: notifies its hook and owner, then hides it.
    ///
    /// The element stays in the scene; callers free it with
    /// [`GuiManager::remove_element`] once the owner is done with it.
    pub fn close_window(&mut self, id: ElementId) -> GuiResult<()> {
        let bounds = self.bounds_of(id)?;
        let hidden_x = self.parked_x(bounds);
        let win = self.window_state(id)?;
        if win.closed {
            return Ok(());
        }

        let notice = GuiEvent::window_close();
        if !win.owner().is_kernel() {
            win.inbox().push(notice);
        }
        self.run_event_hook(id, &notice);

        let win = self.window_state_mut(id)?;
        win.closed = true;
        win.dragging = false;

        self.drop_interaction(id);
        self.damage.invalidate(bounds);
        self.set_position(id, hidden_x, bounds.y)?;
        info!("❌ Window {:?} closed", id);
        Ok(())
    }

    /// Off-screen x for a hidden window. Wide windows go further left so no
    /// column of them stays on screen.
    fn parked_x(&self, bounds: Rect) -> i32 {
        self.config
            .chrome
            .hidden_x
            .min(bounds.width.saturating_neg())
    }

    /// Clears focus, hover and capture held by `id` or its descendants.
    fn drop_interaction(&mut self, id: ElementId) {
        let scene = &self.scene;
        for handle in [&mut self.focused, &mut self.hovered, &mut self.captured] {
            if handle.is_some_and(|h| scene.is_ancestor_or_self(id, h)) {
                *handle = None;
            }
        }
    }

    /// Adds a tab to `window`. The first tab becomes active immediately;
    /// later tabs stay detached until activated.
    pub fn add_tab(
        &mut self,
        window: ElementId,
        title: impl Into<String>,
        content: ElementId,
    ) -> GuiResult<usize> {
        self.window_state(window)?;
        if !self.scene.contains(content) {
            return Err(GuiError::StaleElement(content));
        }
        if content == self.scene.root() {
            return Err(GuiError::RootImmutable);
        }
        if self.scene.is_ancestor_or_self(content, window) {
            return Err(GuiError::WouldCycle {
                parent: window,
                child: content,
            });
        }

        if let Some(bounds) = self
            .scene
            .get(content)
            .filter(|e| e.parent().is_some())
            .map(|e| e.bounds)
        {
            self.damage.invalidate(bounds);
            self.scene.detach(content);
        }

        let title = title.into();
        let win = self.window_state_mut(window)?;
        win.tabs.push(Tab {
            title: title.clone(),
            content,
        });
        let index = win.tabs.len() - 1;
        let first = win.active_tab.is_none();
        debug!("🗂️ Added tab '{}' to {:?}", title, window);

        if first {
            self.activate_tab(window, index)?;
        } else {
            let bounds = self.bounds_of(window)?;
            self.damage.invalidate(bounds);
        }
        Ok(index)
    }

    /// Swaps the attached content for the tab at `index`.
    pub fn activate_tab(&mut self, window: ElementId, index: usize) -> GuiResult<()> {
        let win = self.window_state(window)?;
        let Some(next) = win.tabs().get(index).map(|t| t.content) else {
            return Err(GuiError::NoSuchTab { window, index });
        };
        let attached = self.scene.get(next).and_then(|e| e.parent()) == Some(window);
        if win.active_tab() == Some(index) && attached {
            return Ok(());
        }
        let current = win.active_content();

        if let Some(current) = current.filter(|&c| c != next) {
            self.scene.detach(current);
            self.drop_interaction(current);
        }
        self.window_state_mut(window)?.active_tab = Some(index);
        self.scene.attach(window, next);

        let bounds = self.bounds_of(window)?;
        let rect = window::content_rect(bounds, &self.config.chrome);
        self.set_bounds(next, rect)?;
        self.damage.invalidate(bounds);
        debug!("🗂️ Window {:?} switched to tab {}", window, index);
        Ok(())
    }
}
