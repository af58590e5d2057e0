//! Canvas commands.
//!
//! Every user interaction that mutates the canvas is expressed as a
//! `CanvasCommand` and applied through [`Session::apply`](crate::Session::apply).
//! Grouping and dragging are multi-step workflows and live in their own
//! modules.

use crate::notice::Notice;
use ff_core::{DeleteMode, Node, NodeId};

#[derive(Debug, Clone)]
pub enum CanvasCommand {
    AddNode {
        node: Box<Node>,
    },
    MoveNode {
        id: NodeId,
        dx: f32,
        dy: f32,
    },
    /// Grow or shrink by a delta, as a resize handle reports it.
    ResizeNode {
        id: NodeId,
        dw: f32,
        dh: f32,
    },
    BringToFront {
        id: NodeId,
    },
    ToggleEditable {
        id: NodeId,
    },
    /// One click in the two-click linking protocol.
    AttemptLink {
        id: NodeId,
    },
    RemoveLink {
        a: NodeId,
        b: NodeId,
    },
    RemoveAllLinks {
        id: NodeId,
    },
    DeleteNode {
        id: NodeId,
        mode: DeleteMode,
    },
    Pan {
        dx: f32,
        dy: f32,
    },
    /// Pan so the node sits in the middle of the viewport.
    CenterNode {
        id: NodeId,
    },
}

/// What applying one command did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandOutcome {
    /// Whether the canvas changed.
    pub changed: bool,
    /// Messages for the user, in the order they arose.
    pub notices: Vec<Notice>,
}

impl CommandOutcome {
    pub fn changed(changed: bool) -> Self {
        Self {
            changed,
            notices: Vec::new(),
        }
    }

    pub fn unchanged() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_notice(mut self, notice: Notice) -> Self {
        self.notices.push(notice);
        self
    }
}
