//! Scene graph and paint order
//!
//! Every on-screen element lives in one arena and is addressed by an
//! [`ElementId`]. Parent and child links are ids, never references, so a
//! removed element can't be reached through a stale link: lookups on a dead
//! id simply fail.
//!
//! A parent's `children` vector is its z-order, back to front. The last child
//! paints last and is hit first.

use log::trace;
use slotmap::{new_key_type, SlotMap};
use std::fmt;

use crate::input::GuiEvent;
use crate::renderer::{Color, Point, Rect, Renderer};
use crate::window::WindowState;

new_key_type! {
    /// Handle to an element in the scene arena
    pub struct ElementId;
}

/// Visual state used by default painting and hover/press feedback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VisualState {
    #[default]
    Normal,
    Hover,
    Pressed,
    Disabled,
}

/// Element variants. Windows carry their interaction state inline.
#[derive(Debug)]
pub enum ElementKind {
    Window(Box<WindowState>),
    Panel,
    Label,
}

/// Custom painter replacing an element's default look
pub type PaintHook = Box<dyn Fn(&mut dyn Renderer, &Element)>;

/// Owner callback invoked after the compositor handled an event for the element
pub type EventHook = Box<dyn FnMut(ElementId, &GuiEvent)>;

pub struct Element {
    kind: ElementKind,
    pub bounds: Rect,
    pub state: VisualState,
    pub text: Option<String>,
    pub background: Option<Color>,
    pub border: Option<Color>,
    pub text_color: Color,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    pub(crate) paint_hook: Option<PaintHook>,
    pub(crate) event_hook: Option<EventHook>,
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("kind", &self.kind)
            .field("bounds", &self.bounds)
            .field("state", &self.state)
            .field("text", &self.text)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("paint_hook", &self.paint_hook.is_some())
            .field("event_hook", &self.event_hook.is_some())
            .finish()
    }
}

impl Element {
    pub fn new(kind: ElementKind, bounds: Rect) -> Self {
        Self {
            kind,
            bounds,
            state: VisualState::Normal,
            text: None,
            background: None,
            border: None,
            text_color: Color::BLACK,
            parent: None,
            children: Vec::new(),
            paint_hook: None,
            event_hook: None,
        }
    }

    pub fn kind(&self) -> &ElementKind {
        &self.kind
    }

    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    /// Children in paint order, back to front
    pub fn children(&self) -> &[ElementId] {
        &self.children
    }

    pub fn is_window(&self) -> bool {
        matches!(self.kind, ElementKind::Window(_))
    }

    pub fn window(&self) -> Option<&WindowState> {
        match &self.kind {
            ElementKind::Window(win) => Some(win),
            _ => None,
        }
    }

    pub fn window_mut(&mut self) -> Option<&mut WindowState> {
        match &mut self.kind {
            ElementKind::Window(win) => Some(win),
            _ => None,
        }
    }

    pub fn has_paint_hook(&self) -> bool {
        self.paint_hook.is_some()
    }
}

/// Arena of elements rooted at a single full-screen element.
#[derive(Debug)]
pub struct SceneGraph {
    elements: SlotMap<ElementId, Element>,
    root: ElementId,
}

impl SceneGraph {
    /// Creates a scene whose root is `root`.
    pub fn new(root: Element) -> Self {
        let mut elements = SlotMap::with_key();
        let root = elements.insert(root);
        Self { elements, root }
    }

    pub fn root(&self) -> ElementId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.contains_key(id)
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id)
    }

    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.get_mut(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ElementId, &Element)> {
        self.elements.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (ElementId, &mut Element)> {
        self.elements.iter_mut()
    }

    /// Adds a detached element to the arena.
    pub fn insert(&mut self, element: Element) -> ElementId {
        self.elements.insert(element)
    }

    /// Drops an element from the arena. Links are not touched; callers detach
    /// first.
    pub fn free(&mut self, id: ElementId) -> Option<Element> {
        if id == self.root {
            return None;
        }
        self.elements.remove(id)
    }

    /// True if `ancestor` is `node` or one of its parents.
    pub fn is_ancestor_or_self(&self, ancestor: ElementId, node: ElementId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.elements.get(id).and_then(|e| e.parent);
        }
        false
    }

    /// Appends `child` as the topmost child of `parent`, detaching it from
    /// any previous parent first.
    ///
    /// Callers check liveness and cycles.
    pub fn attach(&mut self, parent: ElementId, child: ElementId) {
        self.detach(child);
        if let Some(el) = self.elements.get_mut(child) {
            el.parent = Some(parent);
        }
        if let Some(p) = self.elements.get_mut(parent) {
            p.children.push(child);
        }
    }

    /// Unlinks `child` from its parent. Returns `false` if it had none.
    pub fn detach(&mut self, child: ElementId) -> bool {
        let Some(parent) = self.elements.get_mut(child).and_then(|e| e.parent.take()) else {
            return false;
        };
        if let Some(p) = self.elements.get_mut(parent) {
            p.children.retain(|&c| c != child);
        }
        true
    }

    /// Moves `id` to the end of its sibling list.
    ///
    /// Returns `true` if the order changed.
    pub fn raise(&mut self, id: ElementId) -> bool {
        let Some(parent) = self.elements.get(id).and_then(|e| e.parent) else {
            return false;
        };
        let Some(siblings) = self.elements.get_mut(parent).map(|p| &mut p.children) else {
            return false;
        };
        if siblings.last() == Some(&id) {
            return false;
        }
        let Some(pos) = siblings.iter().position(|&c| c == id) else {
            return false;
        };
        siblings.remove(pos);
        siblings.push(id);
        true
    }

    /// `id` and all its attached descendants, pre-order.
    pub fn subtree(&self, id: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(el) = self.elements.get(current) else {
                continue;
            };
            out.push(current);
            stack.extend(el.children.iter().rev().copied());
        }
        out
    }

    /// Shifts every descendant of `id` (not `id` itself) by `(dx, dy)`.
    pub fn translate_descendants(&mut self, id: ElementId, dx: i32, dy: i32) {
        if dx == 0 && dy == 0 {
            return;
        }
        let descendants: Vec<ElementId> = self.subtree(id).into_iter().skip(1).collect();
        for child in descendants {
            if let Some(el) = self.elements.get_mut(child) {
                el.bounds = el.bounds.translate(dx, dy);
            }
        }
    }

    /// Topmost element containing `point`, falling back to the root.
    pub fn hit_test(&self, point: Point) -> ElementId {
        self.hit(self.root, point).unwrap_or(self.root)
    }

    fn hit(&self, id: ElementId, point: Point) -> Option<ElementId> {
        let el = self.elements.get(id)?;
        if !el.bounds.contains_point(point) {
            return None;
        }
        el.children
            .iter()
            .rev()
            .find_map(|&child| self.hit(child, point))
            .or(Some(id))
    }

    /// Visits the tree depth-first, pre-order, skipping every subtree whose
    /// bounds don't intersect `dirty`.
    pub fn visit_damaged(&self, dirty: Rect, visit: &mut dyn FnMut(ElementId, &Element)) {
        self.visit(self.root, dirty, visit);
    }

    fn visit(&self, id: ElementId, dirty: Rect, visit: &mut dyn FnMut(ElementId, &Element)) {
        let Some(el) = self.elements.get(id) else {
            return;
        };
        if !el.bounds.intersects(&dirty) {
            trace!("skip {:?} outside {:?}", id, dirty);
            return;
        }
        visit(id, el);
        for &child in &el.children {
            self.visit(child, dirty, visit);
        }
    }

    /// Nearest window at or above `id`.
    pub fn window_ancestor(&self, id: ElementId) -> Option<ElementId> {
        let mut current = Some(id);
        while let Some(cur) = current {
            let el = self.elements.get(cur)?;
            if el.is_window() {
                return Some(cur);
            }
            current = el.parent;
        }
        None
    }
}
