//! Input events and global shortcuts
//!
//! Drivers hand the compositor already-translated events: a kind, a pointer
//! position, a button, the held modifiers and a key code. Raw scancodes never
//! reach this layer.

use bitflags::bitflags;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::InputConfig;
use crate::renderer::Point;

/// Kind of an input or synthetic event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    MouseDown,
    MouseUp,
    MouseMove,
    MouseScroll,
    KeyPress,
    /// Synthetic notification delivered to a window that is being closed
    WindowClose,
}

impl EventKind {
    /// Mouse-class events are the ones mouse capture redirects.
    pub fn is_mouse(self) -> bool {
        matches!(
            self,
            EventKind::MouseDown | EventKind::MouseUp | EventKind::MouseMove | EventKind::MouseScroll
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MouseButton {
    #[default]
    None,
    Left,
    Right,
    Middle,
}

bitflags! {
    /// Modifier keys held while an event was produced
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct Modifiers: u8 {
        const SHIFT = 1 << 0;
        const CTRL = 1 << 1;
        const ALT = 1 << 2;
        const SUPER = 1 << 3;
    }
}

/// A translated input event
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GuiEvent {
    pub kind: EventKind,
    pub position: Point,
    pub button: MouseButton,
    pub modifiers: Modifiers,
    pub key: u8,
    /// Wheel steps for `MouseScroll`, usually +1 or -1
    pub scroll_delta: i32,
}

impl GuiEvent {
    fn mouse(kind: EventKind, x: i32, y: i32, button: MouseButton) -> Self {
        Self {
            kind,
            position: Point::new(x, y),
            button,
            modifiers: Modifiers::empty(),
            key: 0,
            scroll_delta: 0,
        }
    }

    pub fn mouse_down(x: i32, y: i32) -> Self {
        Self::mouse(EventKind::MouseDown, x, y, MouseButton::Left)
    }

    pub fn mouse_up(x: i32, y: i32) -> Self {
        Self::mouse(EventKind::MouseUp, x, y, MouseButton::Left)
    }

    pub fn mouse_move(x: i32, y: i32) -> Self {
        Self::mouse(EventKind::MouseMove, x, y, MouseButton::None)
    }

    pub fn scroll(x: i32, y: i32, delta: i32) -> Self {
        Self {
            scroll_delta: delta,
            ..Self::mouse(EventKind::MouseScroll, x, y, MouseButton::None)
        }
    }

    pub fn key_press(key: u8, modifiers: Modifiers) -> Self {
        Self {
            kind: EventKind::KeyPress,
            position: Point::default(),
            button: MouseButton::None,
            modifiers,
            key,
            scroll_delta: 0,
        }
    }

    pub fn window_close() -> Self {
        Self {
            kind: EventKind::WindowClose,
            position: Point::default(),
            button: MouseButton::None,
            modifiers: Modifiers::empty(),
            key: 0,
            scroll_delta: 0,
        }
    }

    pub fn with_button(mut self, button: MouseButton) -> Self {
        self.button = button;
        self
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// Desktop-level action triggered by a global shortcut
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShortcutAction {
    ToggleLauncher,
    CloseFocused,
    MinimizeFocused,
    ToggleMaximizeFocused,
}

/// Global shortcuts, checked before any key press is routed.
#[derive(Debug, Clone, Default)]
pub struct ShortcutTable {
    bindings: HashMap<(u8, Modifiers), ShortcutAction>,
}

impl ShortcutTable {
    pub fn new(config: &InputConfig) -> Self {
        let mut table = Self::default();
        for binding in &config.shortcuts {
            table.bind(binding.key, binding.modifiers, binding.action);
        }
        debug!("🔑 Loaded {} global shortcuts", table.len());
        table
    }

    pub fn bind(&mut self, key: u8, modifiers: Modifiers, action: ShortcutAction) {
        self.bindings.insert((key, modifiers), action);
    }

    pub fn unbind(&mut self, key: u8, modifiers: Modifiers) -> Option<ShortcutAction> {
        self.bindings.remove(&(key, modifiers))
    }

    /// Returns the action bound to `event`, if it is a matching key press.
    ///
    /// An exact modifier match wins. A key bound with no modifiers fires
    /// whatever modifiers are held, so the launcher keys work mid-chord.
    pub fn match_event(&self, event: &GuiEvent) -> Option<ShortcutAction> {
        if event.kind != EventKind::KeyPress {
            return None;
        }
        let action = self
            .bindings
            .get(&(event.key, event.modifiers))
            .or_else(|| self.bindings.get(&(event.key, Modifiers::empty())))
            .copied();
        if let Some(action) = action {
            info!("🚀 Shortcut {:#04x} triggered {:?}", event.key, action);
        }
        action
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mouse_classification() {
        assert!(EventKind::MouseDown.is_mouse());
        assert!(EventKind::MouseUp.is_mouse());
        assert!(EventKind::MouseMove.is_mouse());
        assert!(EventKind::MouseScroll.is_mouse());
        assert!(!EventKind::KeyPress.is_mouse());
        assert!(!EventKind::WindowClose.is_mouse());
    }

    #[test]
    fn test_event_constructors() {
        let down = GuiEvent::mouse_down(3, 4);
        assert_eq!(down.kind, EventKind::MouseDown);
        assert_eq!(down.position, Point::new(3, 4));
        assert_eq!(down.button, MouseButton::Left);

        let scroll = GuiEvent::scroll(1, 1, -1);
        assert_eq!(scroll.scroll_delta, -1);

        let key = GuiEvent::key_press(b'a', Modifiers::SHIFT);
        assert_eq!(key.key, b'a');
        assert_eq!(key.modifiers, Modifiers::SHIFT);

        let right = GuiEvent::mouse_up(0, 0).with_button(MouseButton::Right);
        assert_eq!(right.button, MouseButton::Right);
    }

    #[test]
    fn test_default_shortcuts_match_launcher_keys() {
        let table = ShortcutTable::new(&InputConfig::default());

        let left = GuiEvent::key_press(0x5B, Modifiers::empty());
        let right = GuiEvent::key_press(0x5C, Modifiers::empty());
        assert_eq!(table.match_event(&left), Some(ShortcutAction::ToggleLauncher));
        assert_eq!(table.match_event(&right), Some(ShortcutAction::ToggleLauncher));
    }

    #[test]
    fn test_shortcut_requires_exact_modifiers() {
        let mut table = ShortcutTable::default();
        table.bind(b'q', Modifiers::SUPER, ShortcutAction::CloseFocused);

        assert_eq!(
            table.match_event(&GuiEvent::key_press(b'q', Modifiers::SUPER)),
            Some(ShortcutAction::CloseFocused)
        );
        assert_eq!(table.match_event(&GuiEvent::key_press(b'q', Modifiers::empty())), None);
        assert_eq!(
            table.match_event(&GuiEvent::key_press(b'q', Modifiers::SUPER | Modifiers::SHIFT)),
            None
        );
    }

    #[test]
    fn test_unmodified_binding_matches_any_modifiers() {
        let table = ShortcutTable::new(&InputConfig::default());
        for modifiers in [Modifiers::SHIFT, Modifiers::CTRL | Modifiers::ALT, Modifiers::all()] {
            assert_eq!(
                table.match_event(&GuiEvent::key_press(0x5B, modifiers)),
                Some(ShortcutAction::ToggleLauncher)
            );
        }
    }

    #[test]
    fn test_exact_binding_beats_unmodified_one() {
        let mut table = ShortcutTable::default();
        table.bind(b'w', Modifiers::empty(), ShortcutAction::ToggleLauncher);
        table.bind(b'w', Modifiers::SUPER, ShortcutAction::CloseFocused);

        assert_eq!(
            table.match_event(&GuiEvent::key_press(b'w', Modifiers::SUPER)),
            Some(ShortcutAction::CloseFocused)
        );
        assert_eq!(
            table.match_event(&GuiEvent::key_press(b'w', Modifiers::CTRL)),
            Some(ShortcutAction::ToggleLauncher)
        );
    }

    #[test]
    fn test_shortcuts_ignore_mouse_events() {
        let table = ShortcutTable::new(&InputConfig::default());
        let mut click = GuiEvent::mouse_down(0, 0);
        click.key = 0x5B;
        assert_eq!(table.match_event(&click), None);
    }

    #[test]
    fn test_unbind() {
        let mut table = ShortcutTable::new(&InputConfig::default());
        assert_eq!(
            table.unbind(0x5B, Modifiers::empty()),
            Some(ShortcutAction::ToggleLauncher)
        );
        assert_eq!(table.len(), 1);
    }
}
