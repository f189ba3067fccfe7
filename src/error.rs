//! Error type shared by the scene graph, the placement tree and the manager.
//!
//! Only handle misuse is an error. Operations that the desktop treats as
//! harmless (invalidating an empty rect, removing a detached element, raising
//! the topmost sibling) return `Ok` and do nothing.

use thiserror::Error;

use crate::scene::ElementId;
use crate::wm::WmNodeId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GuiError {
    #[error("element {0:?} does not exist (already removed?)")]
    StaleElement(ElementId),

    #[error("placement node {0:?} does not exist")]
    StaleNode(WmNodeId),

    #[error("element {0:?} is not a window")]
    NotAWindow(ElementId),

    #[error("cannot attach {child:?} under {parent:?}: parent is inside the child's subtree")]
    WouldCycle { parent: ElementId, child: ElementId },

    #[error("cannot place node {child:?} under {parent:?}: parent is inside the child's subtree")]
    NodeCycle { parent: WmNodeId, child: WmNodeId },

    #[error("the root cannot be removed or reparented")]
    RootImmutable,

    #[error("window {window:?} has no tab at index {index}")]
    NoSuchTab { window: ElementId, index: usize },
}

pub type GuiResult<T> = std::result::Result<T, GuiError>;
