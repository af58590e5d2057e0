//! Editing session: one canvas plus the interaction state around it.
//!
//! The session is what a UI holds. It applies [`CanvasCommand`]s, turns
//! engine outcomes into user-facing [`Notice`]s, runs the drag gesture,
//! and hands out render snapshots.

use crate::commands::{CanvasCommand, CommandOutcome};
use crate::drag::{DragGesture, DragStep};
use crate::grouping::{self, GridSelector};
use crate::notice::Notice;
use ff_core::{Canvas, DeleteMode, LayoutConfig, LinkOutcome, NodeId, Viewport, ZOrderAllocator};
use std::sync::Arc;

/// Interaction settings layered over the core [`LayoutConfig`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditorConfig {
    /// How far a gridded node must be dragged before it offers to leave
    /// its collection. Default: **300**.
    pub detach_distance: f32,

    /// Spare rows/columns shown past an existing grid when adding to it.
    /// Default: **2**.
    pub extra_grid_cells: usize,

    /// Side of the blank matrix offered for a new collection. Default: **10**.
    pub default_selector_size: usize,

    /// Where a newly created collection lands. Default: **(500, 500)**.
    pub new_collection_position: (f32, f32),
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            detach_distance: 300.0,
            extra_grid_cells: 2,
            default_selector_size: 10,
            new_collection_position: (500.0, 500.0),
        }
    }
}

#[derive(Debug)]
pub struct Session {
    pub canvas: Canvas,
    pub viewport: Viewport,
    config: EditorConfig,
    drag: Option<DragGesture>,
    notices: Vec<Notice>,
}

impl Session {
    /// A session over an empty canvas with its own stacking-order source.
    pub fn new(viewport: Viewport, layout: LayoutConfig, config: EditorConfig) -> Self {
        let canvas = Canvas::new(layout, Arc::new(ZOrderAllocator::new()));
        Self::with_canvas(canvas, viewport, config)
    }

    pub fn with_canvas(canvas: Canvas, viewport: Viewport, config: EditorConfig) -> Self {
        Self {
            canvas,
            viewport,
            config,
            drag: None,
            notices: Vec::new(),
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    // ─── Commands ────────────────────────────────────────────────────────

    /// Apply one command. Its notices are also queued for
    /// [`take_notices`](Self::take_notices).
    pub fn apply(&mut self, command: CanvasCommand) -> CommandOutcome {
        log::debug!("apply {command:?}");
        let outcome = match command {
            CanvasCommand::AddNode { node } => {
                let fresh = !self.canvas.contains(node.id);
                self.canvas.add_node(*node);
                CommandOutcome::changed(fresh)
            }
            CanvasCommand::MoveNode { id, dx, dy } => {
                CommandOutcome::changed(self.canvas.move_by(id, dx, dy))
            }
            CanvasCommand::ResizeNode { id, dw, dh } => self.resize(id, dw, dh),
            CanvasCommand::BringToFront { id } => {
                CommandOutcome::changed(self.canvas.bring_to_front(id).is_some())
            }
            CanvasCommand::ToggleEditable { id } => {
                CommandOutcome::changed(self.canvas.toggle_editable(id).is_some())
            }
            CanvasCommand::AttemptLink { id } => self.attempt_link(id),
            CanvasCommand::RemoveLink { a, b } => {
                let linked = self.canvas.is_linked(a, b);
                self.canvas.remove_link(a, b);
                CommandOutcome::changed(linked)
            }
            CanvasCommand::RemoveAllLinks { id } => {
                let linked = !self.canvas.links_of(id).is_empty();
                self.canvas.remove_all_links(id);
                CommandOutcome::changed(linked)
            }
            CanvasCommand::DeleteNode { id, mode } => {
                CommandOutcome::changed(self.canvas.delete_node(id, mode))
            }
            CanvasCommand::Pan { dx, dy } => {
                self.canvas.pan_by(dx, dy);
                CommandOutcome::changed(dx != 0.0 || dy != 0.0)
            }
            CanvasCommand::CenterNode { id } => {
                CommandOutcome::changed(self.canvas.center_node(id, self.viewport))
            }
        };
        self.notices.extend(outcome.notices.iter().copied());
        outcome
    }

    fn resize(&mut self, id: NodeId, dw: f32, dh: f32) -> CommandOutcome {
        let Some(clamp) = self.canvas.resize_by(id, dw, dh) else {
            return CommandOutcome::unchanged();
        };
        let min = self.canvas.config().min_node_size;
        let mut outcome = CommandOutcome::changed(true);
        if clamp.width {
            outcome = outcome.with_notice(Notice::WidthBelowMinimum { min });
        }
        if clamp.height {
            outcome = outcome.with_notice(Notice::HeightBelowMinimum { min });
        }
        outcome
    }

    /// Collections carry no link handle, so clicks on them are ignored.
    fn attempt_link(&mut self, id: NodeId) -> CommandOutcome {
        if self.canvas.get(id).is_none_or(|n| n.is_collection()) {
            return CommandOutcome::unchanged();
        }
        match self.canvas.attempt_link(id) {
            LinkOutcome::Ignored => CommandOutcome::unchanged(),
            LinkOutcome::Started | LinkOutcome::Cancelled => CommandOutcome::changed(true),
            LinkOutcome::AlreadyLinked => {
                CommandOutcome::changed(true).with_notice(Notice::LinkAlreadyExists)
            }
            LinkOutcome::Linked => CommandOutcome::changed(true).with_notice(Notice::LinkCreated),
        }
    }

    /// Drain queued notices, oldest first.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    // ─── Dragging ────────────────────────────────────────────────────────

    /// Pointer down on a node's title bar. Replaces any gesture in flight.
    pub fn begin_drag(&mut self, id: NodeId) -> bool {
        self.drag = DragGesture::begin(&mut self.canvas, id, self.config.detach_distance);
        self.drag.is_some()
    }

    /// Pointer moved by `(dx, dy)` during a drag.
    pub fn drag(&mut self, dx: f32, dy: f32) -> DragStep {
        let Some(gesture) = self.drag.as_mut() else {
            return DragStep::Ended;
        };
        let step = gesture.step(&mut self.canvas, dx, dy);
        if gesture.is_ended() {
            self.drag = None;
        }
        step
    }

    pub fn end_drag(&mut self) {
        self.drag = None;
    }

    pub fn dragging(&self) -> Option<NodeId> {
        self.drag.as_ref().map(DragGesture::id)
    }

    /// Pull `id` out of its collection and move it by the accumulated drag.
    pub fn detach(&mut self, id: NodeId, dx: f32, dy: f32) -> bool {
        if !self.canvas.delete_node(id, DeleteMode::Partial) {
            return false;
        }
        self.canvas.move_by(id, dx, dy);
        true
    }

    // ─── Grouping ────────────────────────────────────────────────────────

    pub fn plan_new_collection(&self) -> grouping::Result<GridSelector> {
        grouping::plan_new_collection(&self.canvas, &self.config)
    }

    pub fn plan_add_to_collection(&mut self) -> grouping::Result<GridSelector> {
        grouping::plan_add_to_collection(&mut self.canvas, &self.config)
    }

    pub fn grouping_available(&self) -> bool {
        grouping::grouping_available(&self.canvas)
    }

    /// Render view model of the canvas.
    pub fn snapshot(&self) -> serde_json::Value {
        crate::snapshot::snapshot(&self.canvas)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ff_core::Node;
    use pretty_assertions::assert_eq;

    fn session() -> Session {
        Session::new(Viewport::default(), LayoutConfig::default(), EditorConfig::default())
    }

    fn add(session: &mut Session, node: Node) -> NodeId {
        let id = node.id;
        session.apply(CanvasCommand::AddNode {
            node: Box::new(node),
        });
        id
    }

    #[test]
    fn resize_below_floor_reports_both_axes() {
        let mut s = session();
        let id = add(&mut s, Node::plain_text("t").sized(120.0, 120.0));

        let outcome = s.apply(CanvasCommand::ResizeNode {
            id,
            dw: -50.0,
            dh: -50.0,
        });

        assert!(outcome.changed);
        assert_eq!(
            outcome.notices,
            vec![
                Notice::WidthBelowMinimum { min: 100.0 },
                Notice::HeightBelowMinimum { min: 100.0 },
            ]
        );
        assert_eq!(s.take_notices().len(), 2);
        assert!(s.take_notices().is_empty());
    }

    #[test]
    fn duplicate_link_produces_notice() {
        let mut s = session();
        let a = add(&mut s, Node::plain_text("a"));
        let b = add(&mut s, Node::plain_text("b"));

        s.apply(CanvasCommand::AttemptLink { id: a });
        let made = s.apply(CanvasCommand::AttemptLink { id: b });
        assert_eq!(made.notices, vec![Notice::LinkCreated]);

        s.apply(CanvasCommand::AttemptLink { id: a });
        let dup = s.apply(CanvasCommand::AttemptLink { id: b });
        assert_eq!(dup.notices, vec![Notice::LinkAlreadyExists]);
        assert_eq!(s.canvas.link_count(), 1);
    }

    #[test]
    fn collections_cannot_be_linked() {
        let mut s = session();
        let grid = add(&mut s, Node::collection("g"));
        assert!(!s.apply(CanvasCommand::AttemptLink { id: grid }).changed);
        assert_eq!(s.canvas.link_state(), ff_core::LinkState::Idle);
    }

    #[test]
    fn center_uses_session_viewport() {
        let mut s = session();
        s.viewport = Viewport {
            width: 1000.0,
            height: 1000.0,
        };
        let id = add(&mut s, Node::plain_text("t").at(100.0, 100.0).sized(200.0, 200.0));

        assert!(s.apply(CanvasCommand::CenterNode { id }).changed);
        assert_eq!(s.canvas.pan(), (300.0, 300.0));
    }

    #[test]
    fn drag_detach_pulls_node_out_of_grid() {
        let mut s = session();
        let grid = add(&mut s, Node::collection("g"));
        let a = add(&mut s, Node::image("a.png").sized(100.0, 100.0));
        let b = add(&mut s, Node::image("b.png").sized(100.0, 100.0));
        s.canvas.assign_cell(b, 0, 1);
        s.canvas.add_to_grid(grid, &[a, b]);

        assert!(s.begin_drag(b));
        assert_eq!(s.dragging(), Some(b));
        let step = s.drag(400.0, 0.0);
        assert_eq!(step, DragStep::DetachRequested { dx: 400.0, dy: 0.0 });
        assert_eq!(s.dragging(), None);

        let before = s.canvas.get(b).unwrap().x;
        assert!(s.detach(b, 400.0, 0.0));
        assert_eq!(s.canvas.parent_grid(b), None);
        assert_eq!(s.canvas.get(b).unwrap().x, before + 400.0);
        assert_eq!(s.canvas.grid_children(grid), vec![a]);
    }
}
