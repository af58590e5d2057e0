//! Dragging a node by its title bar.
//!
//! A free node follows the pointer. A node inside a collection is placed
//! by its grid, so its motion is accumulated instead; once the pointer has
//! travelled far enough the gesture asks to pull the node out of the
//! collection and ends. The caller confirms with the user and then calls
//! [`Session::detach`](crate::Session::detach).

use ff_core::{Canvas, NodeId};

/// Result of feeding one pointer movement into a gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragStep {
    /// The node moved by the delta.
    Moved,
    /// The node is gridded; motion so far is `distance` pixels.
    Accumulating { distance: f32 },
    /// Far enough to leave the collection. The gesture has ended; the
    /// offsets are the total motion to apply after detaching.
    DetachRequested { dx: f32, dy: f32 },
    /// The gesture is over (detached, or the node is gone).
    Ended,
}

#[derive(Debug, Clone)]
pub struct DragGesture {
    id: NodeId,
    detach_distance: f32,
    acc_x: f32,
    acc_y: f32,
    ended: bool,
}

impl DragGesture {
    /// Start dragging `id`, raising it above everything else.
    /// Returns `None` if the node is not on the canvas.
    pub fn begin(canvas: &mut Canvas, id: NodeId, detach_distance: f32) -> Option<Self> {
        canvas.bring_to_front(id)?;
        Some(Self {
            id,
            detach_distance,
            acc_x: 0.0,
            acc_y: 0.0,
            ended: false,
        })
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }

    /// Feed one pointer movement.
    pub fn step(&mut self, canvas: &mut Canvas, dx: f32, dy: f32) -> DragStep {
        if self.ended || !canvas.contains(self.id) {
            self.ended = true;
            return DragStep::Ended;
        }

        if canvas.parent_grid(self.id).is_none() {
            canvas.move_by(self.id, dx, dy);
            return DragStep::Moved;
        }

        self.acc_x += dx;
        self.acc_y += dy;
        let distance = self.acc_x.hypot(self.acc_y);
        if distance > self.detach_distance {
            self.ended = true;
            let (dx, dy) = (self.acc_x, self.acc_y);
            self.acc_x = 0.0;
            self.acc_y = 0.0;
            log::debug!("{} dragged {distance}px out of its grid", self.id);
            return DragStep::DetachRequested { dx, dy };
        }
        DragStep::Accumulating { distance }
    }
}
