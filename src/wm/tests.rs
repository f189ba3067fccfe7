//! Unit tests for the placement tree
//!
//! Tests container partitioning per layout mode, window management
//! bookkeeping, and structural edits.

use super::*;
use crate::scene::{Element, ElementKind, SceneGraph};

/// Real element ids to stand in for windows
fn element_ids(n: usize) -> Vec<ElementId> {
    let mut scene = SceneGraph::new(Element::new(ElementKind::Panel, Rect::new(0, 0, 10, 10)));
    (0..n)
        .map(|_| scene.insert(Element::new(ElementKind::Panel, Rect::EMPTY)))
        .collect()
}

fn no_bounds(_: ElementId) -> Option<Rect> {
    None
}

#[test]
fn test_split_horizontal_three_children() -> GuiResult<()> {
    let ids = element_ids(3);
    let mut tree = WmTree::new(Rect::new(0, 0, 1024, 768));
    let container = tree.create_container(LayoutMode::SplitHorizontal, Rect::new(0, 0, 300, 100));

    for &id in &ids {
        let leaf = tree.manage(id, Rect::new(5, 5, 10, 10));
        tree.add_child(container, leaf)?;
    }

    let assigned = tree.layout(container, Rect::new(0, 0, 300, 100), &no_bounds)?;
    assert_eq!(
        assigned,
        vec![
            (ids[0], Rect::new(0, 0, 100, 100)),
            (ids[1], Rect::new(100, 0, 100, 100)),
            (ids[2], Rect::new(200, 0, 100, 100)),
        ]
    );

    Ok(())
}

#[test]
fn test_split_vertical_last_child_takes_remainder() -> GuiResult<()> {
    let ids = element_ids(3);
    let mut tree = WmTree::new(Rect::new(0, 0, 1024, 768));
    let container = tree.create_container(LayoutMode::SplitVertical, Rect::EMPTY);
    for &id in &ids {
        let leaf = tree.manage(id, Rect::EMPTY);
        tree.add_child(container, leaf)?;
    }

    let assigned = tree.layout(container, Rect::new(10, 20, 50, 100), &no_bounds)?;
    assert_eq!(assigned[0].1, Rect::new(10, 20, 50, 33));
    assert_eq!(assigned[1].1, Rect::new(10, 53, 50, 33));
    assert_eq!(assigned[2].1, Rect::new(10, 86, 50, 34));

    Ok(())
}

#[test]
fn test_floating_and_tabbed_leave_children_alone() -> GuiResult<()> {
    for mode in [LayoutMode::Floating, LayoutMode::Tabbed] {
        let ids = element_ids(2);
        let mut tree = WmTree::new(Rect::new(0, 0, 1024, 768));
        let container = tree.create_container(mode, Rect::EMPTY);
        for &id in &ids {
            let leaf = tree.manage(id, Rect::new(1, 2, 3, 4));
            tree.add_child(container, leaf)?;
        }

        let assigned = tree.layout(container, Rect::new(0, 0, 300, 100), &no_bounds)?;
        assert!(assigned.is_empty(), "{:?} must not resize children", mode);
    }

    Ok(())
}

#[test]
fn test_stacked_gives_everyone_full_bounds() -> GuiResult<()> {
    let ids = element_ids(2);
    let mut tree = WmTree::new(Rect::new(0, 0, 1024, 768));
    let container = tree.create_container(LayoutMode::Stacked, Rect::EMPTY);
    for &id in &ids {
        let leaf = tree.manage(id, Rect::EMPTY);
        tree.add_child(container, leaf)?;
    }

    let full = Rect::new(0, 24, 640, 400);
    let assigned = tree.layout(container, full, &no_bounds)?;
    assert_eq!(assigned, vec![(ids[0], full), (ids[1], full)]);

    Ok(())
}

#[test]
fn test_nested_containers() -> GuiResult<()> {
    let ids = element_ids(3);
    let mut tree = WmTree::new(Rect::new(0, 0, 1024, 768));
    let outer = tree.create_container(LayoutMode::SplitHorizontal, Rect::EMPTY);
    let inner = tree.create_container(LayoutMode::SplitVertical, Rect::EMPTY);

    let left = tree.manage(ids[0], Rect::EMPTY);
    tree.add_child(outer, left)?;
    tree.add_child(outer, inner)?;
    for &id in &ids[1..] {
        let leaf = tree.manage(id, Rect::EMPTY);
        tree.add_child(inner, leaf)?;
    }

    let assigned = tree.layout(outer, Rect::new(0, 0, 200, 100), &no_bounds)?;
    assert_eq!(
        assigned,
        vec![
            (ids[0], Rect::new(0, 0, 100, 100)),
            (ids[1], Rect::new(100, 0, 100, 50)),
            (ids[2], Rect::new(100, 50, 100, 50)),
        ]
    );
    assert_eq!(tree.get(inner).map(|n| n.bounds), Some(Rect::new(100, 0, 100, 100)));

    Ok(())
}

#[test]
fn test_floating_parent_recurses_with_child_bounds() -> GuiResult<()> {
    let ids = element_ids(2);
    let mut tree = WmTree::new(Rect::new(0, 0, 1024, 768));
    let split = tree.create_container(LayoutMode::SplitHorizontal, Rect::new(0, 0, 400, 200));
    tree.add_child(tree.root(), split)?;
    for &id in &ids {
        let leaf = tree.manage(id, Rect::EMPTY);
        tree.add_child(split, leaf)?;
    }

    // The root floats, so the split container keeps its stored bounds
    let assigned = tree.layout(tree.root(), Rect::new(0, 0, 1024, 768), &no_bounds)?;
    assert_eq!(
        assigned,
        vec![
            (ids[0], Rect::new(0, 0, 200, 200)),
            (ids[1], Rect::new(200, 0, 200, 200)),
        ]
    );

    Ok(())
}

#[test]
fn test_window_leaf_uses_live_bounds_when_floating() -> GuiResult<()> {
    let ids = element_ids(2);
    let mut tree = WmTree::new(Rect::new(0, 0, 1024, 768));
    // A window with a split of its own WM children
    let parent = tree.manage(ids[0], Rect::new(0, 0, 10, 10));
    tree.set_layout(parent, LayoutMode::Stacked)?;
    let child = tree.manage(ids[1], Rect::EMPTY);
    tree.add_child(parent, child)?;

    let live = Rect::new(50, 60, 70, 80);
    let first = ids[0];
    let lookup = move |id: ElementId| if id == first { Some(live) } else { None };
    let assigned = tree.layout(tree.root(), Rect::new(0, 0, 1024, 768), &lookup)?;
    assert_eq!(assigned, vec![(ids[1], live)]);

    Ok(())
}

#[test]
fn test_manage_appends_under_root() {
    let ids = element_ids(2);
    let mut tree = WmTree::new(Rect::new(0, 0, 1024, 768));
    let a = tree.manage(ids[0], Rect::EMPTY);
    let b = tree.manage(ids[1], Rect::EMPTY);

    assert_eq!(tree.get(tree.root()).map(|n| n.children().to_vec()), Some(vec![a, b]));
    assert_eq!(tree.node_for(ids[0]), Some(a));
    assert_eq!(tree.get(a).and_then(|n| n.window()), Some(ids[0]));
    assert_eq!(tree.manage(ids[0], Rect::EMPTY), a, "managing twice is idempotent");
    assert_eq!(tree.len(), 3);
}

#[test]
fn test_unmanage_moves_children_to_root() -> GuiResult<()> {
    let ids = element_ids(3);
    let mut tree = WmTree::new(Rect::new(0, 0, 1024, 768));
    let container = tree.create_container(LayoutMode::SplitHorizontal, Rect::EMPTY);
    tree.add_child(tree.root(), container)?;
    let parent = tree.manage(ids[0], Rect::EMPTY);
    tree.add_child(container, parent)?;
    let child = tree.manage(ids[1], Rect::EMPTY);
    tree.add_child(parent, child)?;

    assert!(tree.unmanage(ids[0]).is_some());
    assert_eq!(tree.node_for(ids[0]), None);
    assert!(tree.get(parent).is_none());
    assert_eq!(tree.get(child).and_then(|n| n.parent()), Some(tree.root()));
    assert_eq!(tree.get(container).map(|n| n.children().len()), Some(0));

    assert!(tree.unmanage(ids[2]).is_none(), "never managed");

    Ok(())
}

#[test]
fn test_structural_errors() {
    let ids = element_ids(1);
    let mut tree = WmTree::new(Rect::new(0, 0, 1024, 768));
    let outer = tree.create_container(LayoutMode::SplitHorizontal, Rect::EMPTY);
    let inner = tree.create_container(LayoutMode::SplitVertical, Rect::EMPTY);
    tree.add_child(outer, inner).unwrap();

    assert_eq!(
        tree.add_child(inner, outer),
        Err(GuiError::NodeCycle { parent: inner, child: outer })
    );
    assert_eq!(
        tree.add_child(outer, outer),
        Err(GuiError::NodeCycle { parent: outer, child: outer })
    );
    assert_eq!(tree.add_child(outer, tree.root()), Err(GuiError::RootImmutable));
    assert_eq!(tree.set_layout(tree.root(), LayoutMode::Stacked), Err(GuiError::RootImmutable));

    let leaf = tree.manage(ids[0], Rect::EMPTY);
    tree.remove_node(leaf);
    assert_eq!(tree.add_child(outer, leaf), Err(GuiError::StaleNode(leaf)));
    assert!(tree.layout(leaf, Rect::EMPTY, &no_bounds).is_err());
    assert!(tree.remove_node(tree.root()).is_none());
}

#[test]
fn test_reparenting_detaches_from_old_parent() -> GuiResult<()> {
    let mut tree = WmTree::new(Rect::new(0, 0, 1024, 768));
    let a = tree.create_container(LayoutMode::SplitHorizontal, Rect::EMPTY);
    let b = tree.create_container(LayoutMode::SplitVertical, Rect::EMPTY);
    let c = tree.create_container(LayoutMode::Floating, Rect::EMPTY);
    tree.add_child(a, c)?;
    tree.add_child(b, c)?;

    assert_eq!(tree.get(a).map(|n| n.children().len()), Some(0));
    assert_eq!(tree.get(b).map(|n| n.children().to_vec()), Some(vec![c]));
    assert_eq!(tree.get(c).and_then(|n| n.parent()), Some(b));

    Ok(())
}

#[test]
fn test_split_ratio_is_clamped() -> GuiResult<()> {
    let mut tree = WmTree::new(Rect::new(0, 0, 1024, 768));
    let node = tree.create_container(LayoutMode::SplitHorizontal, Rect::EMPTY);
    assert_eq!(tree.get(node).map(|n| n.split_ratio), Some(0.5));

    tree.set_split_ratio(node, 2.0)?;
    assert_eq!(tree.get(node).map(|n| n.split_ratio), Some(0.95));

    Ok(())
}
