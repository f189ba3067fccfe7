//! Placement tree glue
//!
//! Windows are managed by the placement tree as soon as they are created.
//! Layout passes compute bounds in the tree and then apply them to the scene
//! through [`GuiManager::set_bounds`], which takes care of damage and of the
//! windows' tab content.

use log::{debug, warn};

use super::GuiManager;
use crate::error::{GuiError, GuiResult};
use crate::renderer::Rect;
use crate::scene::ElementId;
use crate::wm::{LayoutMode, WmNodeId};

impl GuiManager {
    /// Puts a window under the placement root, raises it, focuses it and
    /// runs a layout pass.
    pub(crate) fn manage(&mut self, window: ElementId) {
        let Some(bounds) = self.scene.get(window).map(|e| e.bounds) else {
            return;
        };
        let node = self.wm.manage(window, bounds);
        if let Some(win) = self.scene.get_mut(window).and_then(|e| e.window_mut()) {
            win.wm_node = Some(node);
        }

        if let Err(err) = self.bring_to_front(window) {
            warn!("Could not raise managed window {:?}: {}", window, err);
        }
        self.focus_element(window);
        self.relayout();
    }

    /// Creates a detached container with its own bounds.
    pub fn create_container(&mut self, layout: LayoutMode, bounds: Rect) -> WmNodeId {
        let node = self.wm.create_container(layout, bounds);
        debug!("📐 Created {:?} container {:?}", layout, node);
        node
    }

    /// Placement node of a managed window.
    pub fn wm_node_of(&self, window: ElementId) -> GuiResult<WmNodeId> {
        self.scene
            .get(window)
            .ok_or(GuiError::StaleElement(window))?;
        self.wm.node_for(window).ok_or(GuiError::NotAWindow(window))
    }

    /// Moves `child` under `parent` in the placement tree and re-runs layout.
    pub fn wm_add_child(&mut self, parent: WmNodeId, child: WmNodeId) -> GuiResult<()> {
        self.wm.add_child(parent, child)?;
        self.relayout();
        Ok(())
    }

    pub fn set_layout_mode(&mut self, node: WmNodeId, layout: LayoutMode) -> GuiResult<()> {
        self.wm.set_layout(node, layout)?;
        self.relayout();
        Ok(())
    }

    pub fn set_split_ratio(&mut self, node: WmNodeId, ratio: f32) -> GuiResult<()> {
        self.wm.set_split_ratio(node, ratio)
    }

    /// Sets the bounds a container keeps under a floating parent.
    pub fn set_container_bounds(&mut self, node: WmNodeId, bounds: Rect) -> GuiResult<()> {
        self.wm.set_bounds(node, bounds)?;
        self.relayout();
        Ok(())
    }

    /// Lays out the subtree of `node` within `bounds` and applies the result.
    pub fn layout(&mut self, node: WmNodeId, bounds: Rect) -> GuiResult<()> {
        let scene = &self.scene;
        let own_bounds = |id: ElementId| scene.get(id).map(|e| e.bounds);
        let assigned = self.wm.layout(node, bounds, &own_bounds)?;

        for (window, rect) in assigned {
            // Parked and maximized windows keep their geometry
            let pinned = self
                .window(window)
                .is_some_and(|w| w.is_minimized() || w.is_closed() || w.is_maximized());
            if pinned {
                continue;
            }
            if let Err(err) = self.set_bounds(window, rect) {
                warn!("Layout skipped {:?}: {}", window, err);
            }
        }
        Ok(())
    }

    /// Full layout pass from the placement root over the whole screen.
    pub fn relayout(&mut self) {
        let root = self.wm.root();
        let screen = self.screen_rect();
        if let Err(err) = self.layout(root, screen) {
            warn!("Layout pass failed: {}", err);
        }
    }
}
