//! GUI manager
//!
//! [`GuiManager`] is the context object tying the subsystems together: the
//! scene arena, damage tracking, the placement tree, input routing and the
//! frame pipeline. One manager is created at boot and driven by the caller;
//! tests create as many as they like.
//!
//! Focus, hover and capture are element handles. Removing an element clears
//! every such handle pointing into the removed subtree, so a dead id never
//! receives events.

use anyhow::Result;
use log::{debug, info};
use std::collections::{HashSet, VecDeque};

use crate::config::MithlConfig;
use crate::error::{GuiError, GuiResult};
use crate::input::{GuiEvent, ShortcutTable};
use crate::ipc::{OwnerId, WindowInbox};
use crate::renderer::{Color, DamageTracker, Point, Rect};
use crate::scene::{Element, ElementId, ElementKind, EventHook, PaintHook, SceneGraph, VisualState};
use crate::window::{self, WindowState};
use crate::wm::WmTree;

mod frame;
mod placement;
mod router;
mod windows;

pub use frame::{BackgroundPainter, FrameReport};

pub struct GuiManager {
    config: MithlConfig,
    scene: SceneGraph,
    damage: DamageTracker,
    wm: WmTree,
    shortcuts: ShortcutTable,
    pending: VecDeque<GuiEvent>,
    focused: Option<ElementId>,
    hovered: Option<ElementId>,
    captured: Option<ElementId>,
    current_owner: OwnerId,
    background_painter: Option<BackgroundPainter>,
    frames: u64,
}

impl std::fmt::Debug for GuiManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuiManager")
            .field("elements", &self.scene.len())
            .field("wm_nodes", &self.wm.len())
            .field("pending", &self.pending.len())
            .field("focused", &self.focused)
            .field("hovered", &self.hovered)
            .field("captured", &self.captured)
            .field("damage", &self.damage)
            .field("frames", &self.frames)
            .finish()
    }
}

impl GuiManager {
    /// Builds a manager for the configured screen.
    ///
    /// The whole screen starts out damaged so the first frame paints
    /// everything.
    pub fn new(config: MithlConfig) -> Result<Self> {
        config.validate()?;
        info!("🏗️ Initializing GUI manager...");

        let screen = config.screen_rect();
        let scene = SceneGraph::new(Element::new(ElementKind::Panel, screen));
        debug!("🌳 Scene root spans {}x{}", screen.width, screen.height);

        let wm = WmTree::new(screen);
        let shortcuts = ShortcutTable::new(&config.input);

        let mut damage = DamageTracker::new();
        damage.invalidate(screen);

        info!("✅ GUI manager ready");

        Ok(Self {
            config,
            scene,
            damage,
            wm,
            shortcuts,
            pending: VecDeque::new(),
            focused: None,
            hovered: None,
            captured: None,
            current_owner: OwnerId::KERNEL,
            background_painter: None,
            frames: 0,
        })
    }

    pub fn config(&self) -> &MithlConfig {
        &self.config
    }

    pub fn screen_rect(&self) -> Rect {
        self.config.screen_rect()
    }

    pub fn root(&self) -> ElementId {
        self.scene.root()
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn wm(&self) -> &WmTree {
        &self.wm
    }

    pub fn damage(&self) -> &DamageTracker {
        &self.damage
    }

    pub fn shortcuts_mut(&mut self) -> &mut ShortcutTable {
        &mut self.shortcuts
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.scene.get(id)
    }

    pub fn window(&self, id: ElementId) -> Option<&WindowState> {
        self.scene.get(id).and_then(Element::window)
    }

    pub fn focused(&self) -> Option<ElementId> {
        self.focused
    }

    pub fn hovered(&self) -> Option<ElementId> {
        self.hovered
    }

    pub fn captured(&self) -> Option<ElementId> {
        self.captured
    }

    pub fn pending_events(&self) -> usize {
        self.pending.len()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    fn element_ref(&self, id: ElementId) -> GuiResult<&Element> {
        self.scene.get(id).ok_or(GuiError::StaleElement(id))
    }

    fn element_mut(&mut self, id: ElementId) -> GuiResult<&mut Element> {
        self.scene.get_mut(id).ok_or(GuiError::StaleElement(id))
    }

    // === Construction ===

    /// Owner recorded on windows created through [`GuiManager::create_window`].
    pub fn set_current_owner(&mut self, owner: OwnerId) {
        self.current_owner = owner;
    }

    pub fn current_owner(&self) -> OwnerId {
        self.current_owner
    }

    /// Creates a detached panel.
    pub fn create_panel(&mut self, bounds: Rect) -> ElementId {
        let mut element = Element::new(ElementKind::Panel, bounds);
        element.background = Some(self.config.theme.panel);
        self.scene.insert(element)
    }

    /// Creates a detached label.
    pub fn create_label(&mut self, text: impl Into<String>, bounds: Rect) -> ElementId {
        let mut element = Element::new(ElementKind::Label, bounds);
        element.text = Some(text.into());
        element.background = Some(self.config.theme.label);
        element.text_color = self.config.theme.label_text;
        self.scene.insert(element)
    }

    /// Creates a window owned by the current owner, attaches it under the
    /// root and hands it to the placement tree.
    pub fn create_window(&mut self, title: impl Into<String>, bounds: Rect) -> ElementId {
        let owner = self.current_owner;
        self.create_window_owned(owner, title, bounds)
    }

    pub fn create_window_owned(
        &mut self,
        owner: OwnerId,
        title: impl Into<String>,
        bounds: Rect,
    ) -> ElementId {
        let title = title.into();
        let state = WindowState::new(title.clone(), owner, self.config.input.inbox_capacity);
        let mut element = Element::new(ElementKind::Window(Box::new(state)), bounds);
        element.background = Some(self.config.theme.window_body);
        element.text_color = self.config.theme.title_text;

        let id = self.scene.insert(element);
        let root = self.scene.root();
        self.scene.attach(root, id);
        self.damage.invalidate(bounds);
        self.manage(id);

        info!("🪟 Created window '{}' ({:?}) for {}", title, id, owner);
        id
    }

    // === Appearance ===

    pub fn set_text(&mut self, id: ElementId, text: impl Into<String>) -> GuiResult<()> {
        let element = self.element_mut(id)?;
        element.text = Some(text.into());
        let bounds = element.bounds;
        self.damage.invalidate(bounds);
        Ok(())
    }

    pub fn set_background(&mut self, id: ElementId, color: Option<Color>) -> GuiResult<()> {
        let element = self.element_mut(id)?;
        element.background = color;
        let bounds = element.bounds;
        self.damage.invalidate(bounds);
        Ok(())
    }

    pub fn set_border(&mut self, id: ElementId, color: Option<Color>) -> GuiResult<()> {
        let element = self.element_mut(id)?;
        element.border = color;
        let bounds = element.bounds;
        self.damage.invalidate(bounds);
        Ok(())
    }

    pub fn set_visual_state(&mut self, id: ElementId, state: VisualState) -> GuiResult<()> {
        let element = self.element_mut(id)?;
        if element.state != state {
            element.state = state;
            let bounds = element.bounds;
            self.damage.invalidate(bounds);
        }
        Ok(())
    }

    /// Replaces the element's default painting.
    pub fn set_paint_hook(&mut self, id: ElementId, hook: PaintHook) -> GuiResult<()> {
        let element = self.element_mut(id)?;
        element.paint_hook = Some(hook);
        let bounds = element.bounds;
        self.damage.invalidate(bounds);
        Ok(())
    }

    /// Registers the owner callback run after built-in event handling.
    pub fn set_event_hook(&mut self, id: ElementId, hook: EventHook) -> GuiResult<()> {
        self.element_mut(id)?.event_hook = Some(hook);
        Ok(())
    }

    // === Tree structure ===

    /// Appends `child` as the topmost child of `parent`, moving it out of
    /// its previous parent.
    pub fn add_element(&mut self, parent: ElementId, child: ElementId) -> GuiResult<()> {
        self.element_ref(parent)?;
        self.element_ref(child)?;
        if child == self.scene.root() {
            return Err(GuiError::RootImmutable);
        }
        if self.scene.is_ancestor_or_self(child, parent) {
            return Err(GuiError::WouldCycle { parent, child });
        }

        if let Some(old) = self.scene.get(child).filter(|e| e.parent().is_some()) {
            let old_bounds = old.bounds;
            self.damage.invalidate(old_bounds);
        }
        self.scene.attach(parent, child);
        let bounds = self.element_ref(child)?.bounds;
        self.damage.invalidate(bounds);
        Ok(())
    }

    /// Detaches `id` and frees it together with its descendants.
    ///
    /// Returns `Ok(false)` without doing anything when the element has no
    /// parent (this includes the root).
    pub fn remove_element(&mut self, id: ElementId) -> GuiResult<bool> {
        if self.element_ref(id)?.parent().is_none() {
            return Ok(false);
        }
        let area = self.subtree_area(id);
        self.scene.detach(id);
        self.release_subtree(id);
        self.damage.invalidate(area);
        Ok(true)
    }

    /// Frees an element that is not attached anywhere, such as one that was
    /// created but never added.
    pub fn destroy_element(&mut self, id: ElementId) -> GuiResult<()> {
        if id == self.scene.root() {
            return Err(GuiError::RootImmutable);
        }
        if self.element_ref(id)?.parent().is_some() {
            self.remove_element(id)?;
            return Ok(());
        }
        self.release_subtree(id);
        Ok(())
    }

    fn subtree_area(&self, id: ElementId) -> Rect {
        self.scene
            .subtree(id)
            .into_iter()
            .filter_map(|member| self.scene.get(member))
            .fold(Rect::EMPTY, |area, e| area.union(&e.bounds))
    }

    /// Frees `id`, its descendants and the inactive tab contents of every
    /// window among them. `id` must already be detached.
    fn release_subtree(&mut self, id: ElementId) {
        let mut doomed = Vec::new();
        let mut seen = HashSet::new();
        let mut work = vec![id];
        while let Some(top) = work.pop() {
            for member in self.scene.subtree(top) {
                if !seen.insert(member) {
                    continue;
                }
                if let Some(win) = self.scene.get(member).and_then(Element::window) {
                    let active = win.active_content();
                    work.extend(win.tabs().iter().map(|t| t.content).filter(|&content| {
                        Some(content) != active
                            && self.scene.get(content).is_some_and(|c| c.parent().is_none())
                    }));
                }
                doomed.push(member);
            }
        }

        for handle in [&mut self.focused, &mut self.hovered, &mut self.captured] {
            if handle.is_some_and(|h| seen.contains(&h)) {
                *handle = None;
            }
        }

        let mut unmanaged = false;
        for &member in &doomed {
            if self.scene.get(member).is_some_and(Element::is_window) {
                unmanaged |= self.wm.unmanage(member).is_some();
            }
        }

        // Surviving windows may have lost a tab
        let mut orphaned = Vec::new();
        for (window_id, element) in self.scene.iter_mut() {
            if seen.contains(&window_id) {
                continue;
            }
            if let Some(win) = element.window_mut() {
                if win.forget_tabs(|content| seen.contains(&content)) && !win.tabs().is_empty() {
                    orphaned.push(window_id);
                }
            }
        }

        for member in &doomed {
            self.scene.free(*member);
        }
        debug!("🗑️ Released {} elements under {:?}", doomed.len(), id);

        for window_id in orphaned {
            // Keep exactly one tab attached
            if let Err(err) = self.activate_tab(window_id, 0) {
                debug!("Could not re-activate a tab on {:?}: {}", window_id, err);
            }
        }
        if unmanaged {
            self.relayout();
        }
    }

    /// Moves `id` to the top of its siblings.
    pub fn bring_to_front(&mut self, id: ElementId) -> GuiResult<()> {
        let bounds = self.element_ref(id)?.bounds;
        if self.scene.raise(id) {
            self.damage.invalidate(bounds);
        }
        Ok(())
    }

    // === Geometry ===

    /// Moves `id` so its origin is `(x, y)`. Descendants keep their offsets.
    pub fn set_position(&mut self, id: ElementId, x: i32, y: i32) -> GuiResult<()> {
        let bounds = self.element_ref(id)?.bounds;
        self.set_bounds(id, bounds.with_origin(x, y))
    }

    /// Moves and resizes `id`.
    ///
    /// Descendants follow the origin change; a window's active tab content
    /// is laid out into the new content rect. The union of the old and new
    /// bounds is invalidated.
    pub fn set_bounds(&mut self, id: ElementId, bounds: Rect) -> GuiResult<()> {
        let element = self.element_mut(id)?;
        let old = element.bounds;
        if old == bounds {
            return Ok(());
        }
        element.bounds = bounds;
        let content = element.window().and_then(WindowState::active_content);

        self.scene
            .translate_descendants(
                id,
                bounds.x.saturating_sub(old.x),
                bounds.y.saturating_sub(old.y),
            );
        self.damage.invalidate_move(old, bounds);

        if let Some(content) = content {
            let rect = window::content_rect(bounds, &self.config.chrome);
            self.set_bounds(content, rect)?;
        }
        Ok(())
    }

    // === Damage ===

    /// Marks `rect` for repaint. Empty rectangles are ignored.
    pub fn invalidate(&mut self, rect: Rect) {
        self.damage.invalidate(rect);
    }

    /// Marks only the base layer under `rect` for repaint.
    pub fn invalidate_background(&mut self, rect: Rect) {
        self.damage.invalidate_background(rect);
    }

    pub fn needs_redraw(&self) -> bool {
        self.damage.has_content_damage() || self.damage.has_background_damage()
    }

    // === Focus and capture ===

    /// Gives `id` keyboard focus. `None` is a no-op.
    pub fn set_focus(&mut self, id: impl Into<Option<ElementId>>) -> GuiResult<()> {
        let Some(id) = id.into() else {
            return Ok(());
        };
        self.element_ref(id)?;
        self.focus_element(id);
        Ok(())
    }

    pub fn clear_focus(&mut self) {
        if let Some(old) = self.focused.take() {
            self.invalidate_element(old);
        }
    }

    /// Routes every mouse event to `id` until released. `None` is a no-op.
    pub fn capture(&mut self, id: impl Into<Option<ElementId>>) -> GuiResult<()> {
        let Some(id) = id.into() else {
            return Ok(());
        };
        self.element_ref(id)?;
        if self.captured != Some(id) {
            debug!("🖱️ Mouse captured by {:?}", id);
            self.captured = Some(id);
        }
        Ok(())
    }

    pub fn release_capture(&mut self) {
        if let Some(id) = self.captured.take() {
            debug!("🖱️ Mouse released by {:?}", id);
        }
    }

    /// Focus change with repaint of both the old and the new target.
    fn focus_element(&mut self, id: ElementId) {
        if self.focused == Some(id) {
            return;
        }
        // The root draws no focus ring; damaging it would repaint the screen
        let root = self.scene.root();
        if let Some(old) = self.focused.replace(id).filter(|&old| old != root) {
            self.invalidate_element(old);
        }
        if id != root {
            self.invalidate_element(id);
        }
    }

    fn invalidate_element(&mut self, id: ElementId) {
        if let Some(bounds) = self.scene.get(id).map(|e| e.bounds) {
            self.damage.invalidate(bounds);
        }
    }

    /// Topmost element at `(x, y)`, the root if nothing else is there.
    pub fn hit_test(&self, x: i32, y: i32) -> ElementId {
        self.scene.hit_test(Point::new(x, y))
    }

    // === Cross-process ===

    /// Handle to the inbox of `window`, for the owning process's poll.
    pub fn window_inbox(&self, window: ElementId) -> GuiResult<WindowInbox> {
        let element = self.element_ref(window)?;
        element
            .window()
            .map(|win| win.inbox().clone())
            .ok_or(GuiError::NotAWindow(window))
    }

    /// Pops the next translated event queued for `window`. `Ok(None)` means
    /// no event is waiting.
    pub fn next_window_event(&self, window: ElementId) -> GuiResult<Option<GuiEvent>> {
        let element = self.element_ref(window)?;
        let win = element.window().ok_or(GuiError::NotAWindow(window))?;
        Ok(win.inbox().try_next())
    }
}
