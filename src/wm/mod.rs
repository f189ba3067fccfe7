//! Window placement tree
//!
//! A logical hierarchy of containers and window leaves, separate from paint
//! order. Containers arrange their children by layout mode; the tree root is
//! always floating and spans the screen.
//!
//! The tree only computes geometry. Applying the resulting bounds to scene
//! elements (and invalidating what moved) is up to the compositor.

use log::debug;
use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, SlotMap};
use std::collections::HashMap;

use crate::error::{GuiError, GuiResult};
use crate::renderer::Rect;
use crate::scene::ElementId;

new_key_type! {
    /// Handle to a node of the placement tree
    pub struct WmNodeId;
}

/// How a container arranges its children
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutMode {
    /// Children keep their own bounds
    #[default]
    Floating,
    /// Width is divided equally among children
    SplitHorizontal,
    /// Height is divided equally among children
    SplitVertical,
    /// Children keep their own bounds; one is shown at a time
    Tabbed,
    /// Every child gets the full container bounds
    Stacked,
}

impl LayoutMode {
    /// Bounds assigned to child `index` of `count`, or `None` when the child
    /// keeps its own.
    fn partition(self, bounds: Rect, index: i32, count: i32) -> Option<Rect> {
        match self {
            LayoutMode::Floating | LayoutMode::Tabbed => None,
            LayoutMode::Stacked => Some(bounds),
            LayoutMode::SplitHorizontal => {
                let width = bounds.width / count;
                let x = bounds.x + index * width;
                let w = if index == count - 1 { bounds.right() - x } else { width };
                Some(Rect::new(x, bounds.y, w, bounds.height))
            }
            LayoutMode::SplitVertical => {
                let height = bounds.height / count;
                let y = bounds.y + index * height;
                let h = if index == count - 1 { bounds.bottom() - y } else { height };
                Some(Rect::new(bounds.x, y, bounds.width, h))
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct WmNode {
    window: Option<ElementId>,
    parent: Option<WmNodeId>,
    children: Vec<WmNodeId>,
    pub layout: LayoutMode,
    /// Reserved for unequal partitioning; splits are currently equal
    pub split_ratio: f32,
    /// Last bounds assigned to (or set on) this node
    pub bounds: Rect,
}

impl WmNode {
    fn new(window: Option<ElementId>, layout: LayoutMode, bounds: Rect) -> Self {
        Self {
            window,
            parent: None,
            children: Vec::new(),
            layout,
            split_ratio: 0.5,
            bounds,
        }
    }

    /// The window this node stands for; `None` for pure containers.
    pub fn window(&self) -> Option<ElementId> {
        self.window
    }

    pub fn parent(&self) -> Option<WmNodeId> {
        self.parent
    }

    pub fn children(&self) -> &[WmNodeId] {
        &self.children
    }
}

#[derive(Debug)]
pub struct WmTree {
    nodes: SlotMap<WmNodeId, WmNode>,
    root: WmNodeId,
    by_window: HashMap<ElementId, WmNodeId>,
}

impl WmTree {
    /// Creates a tree whose floating root spans `screen`.
    pub fn new(screen: Rect) -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(WmNode::new(None, LayoutMode::Floating, screen));
        Self {
            nodes,
            root,
            by_window: HashMap::new(),
        }
    }

    pub fn root(&self) -> WmNodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, node: WmNodeId) -> Option<&WmNode> {
        self.nodes.get(node)
    }

    fn node_mut(&mut self, node: WmNodeId) -> GuiResult<&mut WmNode> {
        self.nodes.get_mut(node).ok_or(GuiError::StaleNode(node))
    }

    /// Node standing for `window`, if it is managed.
    pub fn node_for(&self, window: ElementId) -> Option<WmNodeId> {
        self.by_window.get(&window).copied()
    }

    /// Adds `window` as the last child of the root.
    ///
    /// Managing an already managed window returns its existing node.
    pub fn manage(&mut self, window: ElementId, bounds: Rect) -> WmNodeId {
        if let Some(node) = self.node_for(window) {
            return node;
        }
        let node = self
            .nodes
            .insert(WmNode::new(Some(window), LayoutMode::Floating, bounds));
        self.by_window.insert(window, node);
        self.link(self.root, node);
        debug!("🪟 Managed window {:?} as node {:?}", window, node);
        node
    }

    /// Removes the node standing for `window`. Its children move to the root.
    pub fn unmanage(&mut self, window: ElementId) -> Option<WmNode> {
        let node = self.by_window.remove(&window)?;
        self.remove_node(node)
    }

    /// Creates a detached container.
    pub fn create_container(&mut self, layout: LayoutMode, bounds: Rect) -> WmNodeId {
        self.nodes.insert(WmNode::new(None, layout, bounds))
    }

    /// Removes a container or leaf. Its children move to the root.
    pub fn remove_node(&mut self, node: WmNodeId) -> Option<WmNode> {
        if node == self.root {
            return None;
        }
        self.unlink(node);
        let removed = self.nodes.remove(node)?;
        for &child in &removed.children {
            if let Some(c) = self.nodes.get_mut(child) {
                c.parent = None;
            }
            self.link(self.root, child);
        }
        if let Some(window) = removed.window {
            self.by_window.remove(&window);
        }
        Some(removed)
    }

    /// Makes `child` the last child of `parent`, detaching it from its
    /// previous parent.
    pub fn add_child(&mut self, parent: WmNodeId, child: WmNodeId) -> GuiResult<()> {
        if !self.nodes.contains_key(parent) {
            return Err(GuiError::StaleNode(parent));
        }
        if !self.nodes.contains_key(child) {
            return Err(GuiError::StaleNode(child));
        }
        if child == self.root {
            return Err(GuiError::RootImmutable);
        }
        if self.is_ancestor_or_self(child, parent) {
            return Err(GuiError::NodeCycle { parent, child });
        }
        self.unlink(child);
        self.link(parent, child);
        Ok(())
    }

    pub fn set_layout(&mut self, node: WmNodeId, layout: LayoutMode) -> GuiResult<()> {
        if node == self.root {
            return Err(GuiError::RootImmutable);
        }
        self.node_mut(node)?.layout = layout;
        Ok(())
    }

    pub fn set_bounds(&mut self, node: WmNodeId, bounds: Rect) -> GuiResult<()> {
        self.node_mut(node)?.bounds = bounds;
        Ok(())
    }

    /// Ratio is clamped to `[0.05, 0.95]`.
    pub fn set_split_ratio(&mut self, node: WmNodeId, ratio: f32) -> GuiResult<()> {
        self.node_mut(node)?.split_ratio = ratio.clamp(0.05, 0.95);
        Ok(())
    }

    /// True if `ancestor` is `node` or above it.
    pub fn is_ancestor_or_self(&self, ancestor: WmNodeId, node: WmNodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.nodes.get(id).and_then(|n| n.parent);
        }
        false
    }

    /// Runs a layout pass from `node` with `bounds`.
    ///
    /// Partitioning children get their assigned rectangle; floating and
    /// tabbed children keep their own bounds, read through `own_bounds` for
    /// window leaves. Returns the new bounds of every window the pass
    /// resized or moved, in tree order.
    pub fn layout(
        &mut self,
        node: WmNodeId,
        bounds: Rect,
        own_bounds: &dyn Fn(ElementId) -> Option<Rect>,
    ) -> GuiResult<Vec<(ElementId, Rect)>> {
        if !self.nodes.contains_key(node) {
            return Err(GuiError::StaleNode(node));
        }
        let mut assigned = Vec::new();
        self.layout_into(node, bounds, own_bounds, &mut assigned);
        Ok(assigned)
    }

    fn layout_into(
        &mut self,
        node: WmNodeId,
        bounds: Rect,
        own_bounds: &dyn Fn(ElementId) -> Option<Rect>,
        assigned: &mut Vec<(ElementId, Rect)>,
    ) {
        let Some((mode, children)) = self.nodes.get(node).map(|n| (n.layout, n.children.clone()))
        else {
            return;
        };
        let count = children.len() as i32;
        for (index, child) in children.into_iter().enumerate() {
            let child_bounds = match mode.partition(bounds, index as i32, count) {
                Some(rect) => {
                    if let Some(c) = self.nodes.get_mut(child) {
                        c.bounds = rect;
                        if let Some(window) = c.window {
                            assigned.push((window, rect));
                        }
                    }
                    rect
                }
                None => match self.nodes.get(child) {
                    Some(c) => c.window.and_then(own_bounds).unwrap_or(c.bounds),
                    None => continue,
                },
            };
            self.layout_into(child, child_bounds, own_bounds, assigned);
        }
    }

    fn link(&mut self, parent: WmNodeId, child: WmNodeId) {
        if let Some(c) = self.nodes.get_mut(child) {
            c.parent = Some(parent);
        }
        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.push(child);
        }
    }

    fn unlink(&mut self, child: WmNodeId) {
        let Some(parent) = self.nodes.get_mut(child).and_then(|c| c.parent.take()) else {
            return;
        };
        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.retain(|&c| c != child);
        }
    }
}

#[cfg(test)]
mod tests;
