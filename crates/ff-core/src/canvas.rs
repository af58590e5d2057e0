//! The canvas: root collection of a board and the single entry point for
//! structural mutation.
//!
//! `Canvas` ties the node arena, the link manager and the grid layout
//! engine together so that every mutation leaves them consistent:
//!
//! - adding a node gives it root membership and a fresh stacking order;
//! - gridding, resizing or removing a node recomputes the affected grids
//!   upward through every nesting level;
//! - fully deleting a node tears down its links first, and a grid whose
//!   last child leaves deletes itself.
//!
//! The root collection's position is the pan offset of the whole board.

use crate::config::{LayoutConfig, Viewport};
use crate::grid;
use crate::id::NodeId;
use crate::link::{LinkManager, LinkOutcome, LinkState};
use crate::model::{Changes, Node, NodeArena, NodeKind};
use crate::zorder::ZOrderAllocator;
use petgraph::graph::NodeIndex;
use std::sync::Arc;

/// How far a deletion goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteMode {
    /// Leave the parent grid only. The node stays on the canvas with its links.
    Partial,
    /// Remove the node from the canvas entirely.
    Full,
}

/// Which axes of a resize request hit the minimum size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SizeClamp {
    pub width: bool,
    pub height: bool,
}

impl SizeClamp {
    pub fn is_clamped(self) -> bool {
        self.width || self.height
    }
}

/// One board of nodes with its links and grids.
#[derive(Debug)]
pub struct Canvas {
    arena: NodeArena,
    links: LinkManager,
    z_order: Arc<ZOrderAllocator>,
    config: LayoutConfig,
}

impl Canvas {
    /// An empty canvas drawing stacking order from `z_order`.
    #[must_use]
    pub fn new(config: LayoutConfig, z_order: Arc<ZOrderAllocator>) -> Self {
        Self {
            arena: NodeArena::new(),
            links: LinkManager::new(),
            z_order,
            config,
        }
    }

    // ─── Reads ───────────────────────────────────────────────────────────

    pub fn arena(&self) -> &NodeArena {
        &self.arena
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.arena.get(id)
    }

    pub fn index_of(&self, id: NodeId) -> Option<NodeIndex> {
        self.arena.index_of(id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.arena.contains(id)
    }

    /// Number of nodes on the canvas, root excluded.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Every node on the canvas, in the order it was added.
    pub fn members(&self) -> Vec<NodeId> {
        self.ids(self.arena.members())
    }

    /// Children of `collection`'s grid, in the order they were gridded.
    pub fn grid_children(&self, collection: NodeId) -> Vec<NodeId> {
        match self.arena.index_of(collection) {
            Some(idx) => self.ids(self.arena.grid_children(idx)),
            None => Vec::new(),
        }
    }

    /// The collection whose grid holds `id`.
    pub fn parent_grid(&self, id: NodeId) -> Option<NodeId> {
        let idx = self.arena.index_of(id)?;
        self.arena
            .parent_grid(idx)
            .map(|parent| self.arena.graph[parent].id)
    }

    /// The root collection that owns `id`.
    pub fn root_collection(&self, id: NodeId) -> Option<NodeId> {
        let idx = self.arena.index_of(id)?;
        self.arena
            .root_collection(idx)
            .map(|root| self.arena.graph[root].id)
    }

    pub fn root(&self) -> &Node {
        &self.arena.graph[self.arena.root]
    }

    /// Current pan offset (the root collection's position).
    pub fn pan(&self) -> (f32, f32) {
        let root = self.root();
        (root.x, root.y)
    }

    pub fn links_of(&self, id: NodeId) -> Vec<NodeId> {
        self.links.links_of(id)
    }

    pub fn link_state(&self) -> LinkState {
        self.links.state()
    }

    pub fn is_linked(&self, a: NodeId, b: NodeId) -> bool {
        self.links.is_linked(a, b)
    }

    pub fn link_count(&self) -> usize {
        self.links.edge_count()
    }

    // ─── Nodes ───────────────────────────────────────────────────────────

    /// Put `node` on the canvas on top of everything else.
    /// Adding an id that is already present changes nothing.
    pub fn add_node(&mut self, node: Node) -> NodeId {
        let id = node.id;
        if self.arena.contains(id) {
            return id;
        }
        let idx = self.arena.insert(node);
        self.arena.node_mut(idx).z_index = self.z_order.next();
        log::debug!("added {id}");
        id
    }

    /// Grid `ids` into `collection` at the cells they already carry, then
    /// lay the grid out once. Returns how many nodes joined.
    ///
    /// Skips unknown ids, nodes already in a grid, the collection itself
    /// and anything it is nested in.
    pub fn add_to_grid(&mut self, collection: NodeId, ids: &[NodeId]) -> usize {
        let Some(target) = self.arena.index_of(collection) else {
            return 0;
        };
        if !self.arena.graph[target].is_collection() {
            return 0;
        }

        let mut forbidden = self.arena.grid_ancestors(target);
        forbidden.extend([target, self.arena.root]);

        let mut added = 0;
        for &id in ids {
            let Some(idx) = self.arena.index_of(id) else {
                continue;
            };
            if forbidden.contains(&idx) || self.arena.parent_grid(idx).is_some() {
                log::debug!("{id} cannot join grid {collection}");
                continue;
            }
            self.arena.attach_to_grid(target, idx);
            self.arena.node_mut(idx).z_index = self.z_order.next();
            added += 1;
        }

        if added > 0 {
            grid::recompute(&mut self.arena, &self.config, target);
        }
        added
    }

    /// Record the grid cell of `id`. Takes effect on the next recompute.
    pub fn assign_cell(&mut self, id: NodeId, row: i32, column: i32) -> bool {
        match self.arena.get_mut(id) {
            Some(node) => {
                grid::assign_cell(node, row, column);
                true
            }
            None => false,
        }
    }

    /// Collapse the cells of `ids` to dense 0-based indices.
    pub fn normalize(&mut self, ids: &[NodeId]) {
        let indices: Vec<NodeIndex> = ids
            .iter()
            .filter_map(|&id| self.arena.index_of(id))
            .collect();
        grid::normalize(&mut self.arena, &indices);
    }

    /// Lay out `collection` and every grid it is nested in.
    pub fn recompute(&mut self, collection: NodeId) {
        if let Some(idx) = self.arena.index_of(collection) {
            grid::recompute(&mut self.arena, &self.config, idx);
        }
    }

    /// Set the size of `id`, flooring both axes at the minimum node size.
    ///
    /// Returns `None` for unknown ids, the root and collections (whose
    /// size follows their grid); otherwise which axes were clamped.
    pub fn set_size(&mut self, id: NodeId, width: f32, height: f32) -> Option<SizeClamp> {
        let idx = self.arena.index_of(id)?;
        if matches!(self.arena.graph[idx].kind, NodeKind::Root | NodeKind::Collection(_)) {
            return None;
        }

        let min = self.config.min_node_size;
        let clamp = SizeClamp {
            width: width.is_nan() || width < min,
            height: height.is_nan() || height < min,
        };
        let node = self.arena.node_mut(idx);
        node.width = width.max(min);
        node.height = height.max(min);

        if let Some(parent) = self.arena.parent_grid(idx) {
            grid::recompute(&mut self.arena, &self.config, parent);
        }
        Some(clamp)
    }

    /// Grow or shrink `id` by a delta. See [`set_size`](Self::set_size).
    pub fn resize_by(&mut self, id: NodeId, dw: f32, dh: f32) -> Option<SizeClamp> {
        let node = self.arena.get(id)?;
        let (width, height) = (node.width + dw, node.height + dh);
        self.set_size(id, width, height)
    }

    /// Move an ungridded node. A collection carries its children along.
    /// Gridded nodes are positioned by their grid and stay put.
    pub fn move_by(&mut self, id: NodeId, dx: f32, dy: f32) -> bool {
        let Some(idx) = self.arena.index_of(id) else {
            return false;
        };
        if idx == self.arena.root || self.arena.parent_grid(idx).is_some() {
            return false;
        }
        let node = &self.arena.graph[idx];
        let (x, y) = (node.x + dx, node.y + dy);
        grid::place(&mut self.arena, &self.config, idx, x, y);
        true
    }

    /// Raise `id` above everything else. Returns its new stacking order.
    pub fn bring_to_front(&mut self, id: NodeId) -> Option<u32> {
        let idx = self.arena.index_of(id)?;
        if idx == self.arena.root {
            return None;
        }
        let z = self.z_order.next();
        self.arena.node_mut(idx).z_index = z;
        self.on_z_order_changed(idx);
        Some(z)
    }

    pub fn set_editable(&mut self, id: NodeId, editable: bool) -> bool {
        match self.arena.get_mut(id) {
            Some(node) => {
                node.editable = editable;
                true
            }
            None => false,
        }
    }

    /// Flip editability. Returns the new value.
    pub fn toggle_editable(&mut self, id: NodeId) -> Option<bool> {
        let node = self.arena.get_mut(id)?;
        node.editable = !node.editable;
        Some(node.editable)
    }

    // ─── Links ───────────────────────────────────────────────────────────

    pub fn attempt_link(&mut self, id: NodeId) -> LinkOutcome {
        if self.arena.index_of(id) == Some(self.arena.root) {
            return LinkOutcome::Ignored;
        }
        self.links.attempt_link(&mut self.arena, id)
    }

    pub fn remove_link(&mut self, a: NodeId, b: NodeId) {
        self.links.remove_link(&mut self.arena, a, b);
    }

    pub fn remove_all_links(&mut self, id: NodeId) {
        self.links.remove_all_links(&mut self.arena, id);
    }

    // ─── Deletion ────────────────────────────────────────────────────────

    /// Delete `id`. Returns `false` if nothing happened.
    ///
    /// Full deletion of a collection deletes its children first, and a grid
    /// left without children is deleted as well.
    pub fn delete_node(&mut self, id: NodeId, mode: DeleteMode) -> bool {
        let Some(idx) = self.arena.index_of(id) else {
            return false;
        };
        if idx == self.arena.root {
            return false;
        }

        match mode {
            DeleteMode::Partial => self.leave_grid(idx),
            DeleteMode::Full => {
                self.on_before_delete(idx);
                // Removing the last child already deleted this collection.
                if self.arena.index_of(id) != Some(idx) {
                    return true;
                }
                self.links.remove_all_links(&mut self.arena, id);
                self.leave_grid(idx);
                self.arena.remove(idx);
                log::debug!("deleted {id}");
                true
            }
        }
    }

    // ─── View ────────────────────────────────────────────────────────────

    /// Shift the whole board.
    pub fn pan_by(&mut self, dx: f32, dy: f32) {
        let root = self.arena.root;
        let node = self.arena.node_mut(root);
        node.x += dx;
        node.y += dy;
    }

    /// Pan so `id` sits in the middle of `viewport`.
    pub fn center_node(&mut self, id: NodeId, viewport: Viewport) -> bool {
        let Some(node) = self.arena.get(id) else {
            return false;
        };
        let x = -node.x + viewport.width / 2.0 - node.width / 2.0;
        let y = -node.y + viewport.height / 2.0 - node.height / 2.0;
        let root = self.arena.root;
        let root = self.arena.node_mut(root);
        root.x = x;
        root.y = y;
        true
    }

    /// Drain the set of nodes changed or removed since the last call.
    pub fn take_changes(&mut self) -> Changes {
        self.arena.take_changes()
    }

    // ─── Hooks ───────────────────────────────────────────────────────────

    fn on_before_delete(&mut self, idx: NodeIndex) {
        let children = match self.arena.graph[idx].kind {
            NodeKind::Collection(_) => self.ids(self.arena.grid_children(idx)),
            _ => return,
        };
        for child in children {
            self.delete_node(child, DeleteMode::Full);
        }
    }

    fn on_z_order_changed(&mut self, idx: NodeIndex) {
        if self.arena.graph[idx].is_collection() {
            grid::bring_children_to_front(&mut self.arena, idx);
        }
    }

    /// Take `idx` out of its grid and fix up the grid it left.
    fn leave_grid(&mut self, idx: NodeIndex) -> bool {
        let Some(parent) = self.arena.detach_from_grid(idx) else {
            return false;
        };
        if self.arena.grid_children(parent).is_empty() {
            let parent_id = self.arena.graph[parent].id;
            log::debug!("grid {parent_id} is empty");
            self.delete_node(parent_id, DeleteMode::Full);
        } else {
            grid::recompute(&mut self.arena, &self.config, parent);
        }
        true
    }

    fn ids(&self, indices: Vec<NodeIndex>) -> Vec<NodeId> {
        indices
            .into_iter()
            .map(|idx| self.arena.graph[idx].id)
            .collect()
    }
}
