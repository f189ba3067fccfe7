//! Event routing
//!
//! Every event reaches exactly one target. Global shortcuts are checked
//! first and swallow the event. Mouse events then go to the capturing
//! element if there is one, otherwise to the hit-test result; key presses go
//! to the focused element, or the root when nothing has focus.

use log::{debug, trace};

use super::{FrameReport, GuiManager};
use crate::input::{EventKind, GuiEvent, ShortcutAction};
use crate::renderer::Point;
use crate::scene::{ElementId, VisualState};

impl GuiManager {
    /// Queues an event for the next frame.
    pub fn post_event(&mut self, event: GuiEvent) {
        trace!("📥 Queued {:?} at {:?}", event.kind, event.position);
        self.pending.push_back(event);
    }

    /// Routes and handles every queued event.
    pub(crate) fn drain_events(&mut self, report: &mut FrameReport) {
        while let Some(event) = self.pending.pop_front() {
            self.dispatch(event, report);
        }
    }

    /// Routes one event immediately, bypassing the queue.
    pub fn dispatch_event(&mut self, event: GuiEvent) -> FrameReport {
        let mut report = FrameReport::default();
        self.dispatch(event, &mut report);
        report
    }

    fn dispatch(&mut self, event: GuiEvent, report: &mut FrameReport) {
        if let Some(action) = self.shortcuts.match_event(&event) {
            self.apply_shortcut(action);
            report.actions.push(action);
            return;
        }

        let Some(target) = self.route(&event) else {
            debug!("Dropping unroutable {:?}", event.kind);
            return;
        };
        self.deliver(target, &event);
        report.events_dispatched += 1;
    }

    /// Picks the single element that receives `event`.
    fn route(&mut self, event: &GuiEvent) -> Option<ElementId> {
        match event.kind {
            kind if kind.is_mouse() => {
                if let Some(captured) = self.captured {
                    return Some(captured);
                }
                let target = self.scene.hit_test(event.position);
                if kind == EventKind::MouseDown {
                    self.focus_element(target);
                }
                Some(target)
            }
            EventKind::KeyPress => Some(self.focused.unwrap_or_else(|| self.scene.root())),
            _ => None,
        }
    }

    /// Runs the built-in behaviour and the owner hook for `target`, forwards a
    /// copy to the owning process and invalidates whatever changed.
    pub(crate) fn deliver(&mut self, target: ElementId, event: &GuiEvent) {
        let Some(before) = self.scene.get(target).map(|e| e.state) else {
            return;
        };
        let hovered_before = self.hovered;

        if self.scene.get(target).is_some_and(|e| e.is_window()) {
            self.handle_window_event(target, event);
        } else {
            self.handle_default(target, event);
        }
        self.run_event_hook(target, event);
        self.forward_to_owner(target, event);

        let Some((after, bounds)) = self.scene.get(target).map(|e| (e.state, e.bounds)) else {
            return;
        };
        let root = self.scene.root();
        let state_changed = after != before;

        if event.kind != EventKind::MouseMove {
            if state_changed || target != root {
                self.damage.invalidate(bounds);
            }
            return;
        }

        if state_changed {
            self.damage.invalidate(bounds);
        }
        if target == root {
            if let Some(previous) = self.hovered.take() {
                self.reset_hover(previous);
            }
        } else if hovered_before != Some(target) {
            if let Some(previous) = hovered_before.filter(|&p| p != root) {
                self.reset_hover(previous);
            }
            self.hovered = Some(target);
            self.damage.invalidate(bounds);
        }
    }

    fn reset_hover(&mut self, id: ElementId) {
        let Some(element) = self.scene.get_mut(id) else {
            return;
        };
        if element.state == VisualState::Hover {
            element.state = VisualState::Normal;
        }
        let bounds = element.bounds;
        self.damage.invalidate(bounds);
    }

    /// Press and hover feedback for panels and labels.
    fn handle_default(&mut self, id: ElementId, event: &GuiEvent) {
        if id == self.scene.root() {
            return;
        }
        let Some(element) = self.scene.get_mut(id) else {
            return;
        };
        if element.state == VisualState::Disabled {
            return;
        }
        let inside = element.bounds.contains_point(event.position);
        match event.kind {
            EventKind::MouseDown if inside => element.state = VisualState::Pressed,
            EventKind::MouseUp if element.state == VisualState::Pressed => {
                element.state = VisualState::Normal
            }
            EventKind::MouseMove => {
                if inside && element.state == VisualState::Normal {
                    element.state = VisualState::Hover;
                } else if !inside && element.state == VisualState::Hover {
                    element.state = VisualState::Normal;
                    if self.hovered == Some(id) {
                        self.hovered = None;
                    }
                }
            }
            _ => {}
        }
    }

    pub(crate) fn run_event_hook(&mut self, id: ElementId, event: &GuiEvent) {
        let Some(mut hook) = self.scene.get_mut(id).and_then(|e| e.event_hook.take()) else {
            return;
        };
        hook(id, event);
        if let Some(element) = self.scene.get_mut(id) {
            element.event_hook.get_or_insert(hook);
        }
    }

    /// Queues a translated copy of `event` for the process owning `target`.
    ///
    /// Mouse coordinates become relative to the window's client area: the
    /// window origin moved down by the title bar.
    fn forward_to_owner(&self, target: ElementId, event: &GuiEvent) {
        let Some(element) = self.scene.get(target) else {
            return;
        };
        let Some(win) = element.window() else {
            return;
        };
        if win.owner().is_kernel() {
            return;
        }

        let mut copy = *event;
        if event.kind.is_mouse() {
            let origin = element.bounds.origin();
            copy.position = Point::new(
                event.position.x - origin.x,
                event.position.y - (origin.y + self.config.chrome.title_bar_height),
            );
        }
        win.inbox().push(copy);
    }

    /// Window-level reactions to global shortcuts. The launcher is left to
    /// the caller.
    fn apply_shortcut(&mut self, action: ShortcutAction) {
        let Some(window) = self.focused.and_then(|f| self.scene.window_ancestor(f)) else {
            return;
        };
        let result = match action {
            ShortcutAction::ToggleLauncher => Ok(()),
            ShortcutAction::CloseFocused => self.close_window(window),
            ShortcutAction::MinimizeFocused => self.minimize_window(window),
            ShortcutAction::ToggleMaximizeFocused => self.toggle_maximize(window),
        };
        if let Err(err) = result {
            debug!("Shortcut {:?} ignored: {}", action, err);
        }
    }
}
