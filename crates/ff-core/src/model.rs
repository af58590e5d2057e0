//! Node entity model for FF canvases.
//!
//! Every block on the canvas (text, media, embeds, chats, grid collections)
//! is a [`Node`]: one structural record plus a closed [`NodeKind`] payload.
//! Nodes live in a [`NodeArena`]. Containment is stored as arena edges
//! (root → member, collection → gridded child) instead of owning pointers,
//! so a node can belong to the root and to one grid at the same time
//! without cyclic ownership.

use crate::config::DEFAULT_NODE_SIZE;
use crate::id::NodeId;
use petgraph::Direction;
use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::stable_graph::StableDiGraph;
use petgraph::visit::EdgeRef;
use serde::Serialize;
use smallvec::SmallVec;
use std::collections::{BTreeMap, HashMap, HashSet};

// ─── Kind payloads ───────────────────────────────────────────────────────

/// Who wrote a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChatRole {
    User,
    Chatbot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub message: String,
}

/// Derived sizing cache of a collection's grid.
///
/// Rebuilt from scratch by [`grid::recompute`](crate::grid::recompute);
/// never edit it by hand.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GridState {
    /// Column index → width of that column, margins included.
    pub column_widths: BTreeMap<i32, f32>,
    /// Row index → height of that row, margins included.
    pub row_heights: BTreeMap<i32, f32>,
    /// Highest occupied row index.
    pub row_count: i32,
    /// Highest occupied column index.
    pub col_count: i32,
}

impl GridState {
    /// Sum of the widths of all columns strictly left of `column`.
    pub fn column_offset(&self, column: i32) -> f32 {
        self.column_widths.range(..column).map(|(_, w)| w).sum()
    }

    /// Sum of the heights of all rows strictly above `row`.
    pub fn row_offset(&self, row: i32) -> f32 {
        self.row_heights.range(..row).map(|(_, h)| h).sum()
    }

    pub fn total_width(&self) -> f32 {
        self.column_widths.values().sum()
    }

    /// Height of all rows, excluding the title bar.
    pub fn total_rows_height(&self) -> f32 {
        self.row_heights.values().sum()
    }
}

/// What a node is. Each variant carries its own content.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum NodeKind {
    /// The top-level collection of a canvas. Its position is the pan offset.
    Root,

    /// Plain, non-editable text.
    PlainText { text: String },

    /// Formatted text (stored as HTML produced by the editor widget).
    RichText { html: String },

    Image { src: String },

    Video { src: String },

    /// An embedded web page.
    WebEmbed { url: String },

    /// A chat with an assistant, seeded by a system prompt.
    Chat {
        system_prompt: String,
        messages: Vec<ChatMessage>,
    },

    /// A grid container of other nodes.
    Collection(GridState),
}

impl NodeKind {
    /// Stable lowercase tag, used by renderers to pick a view.
    pub fn tag(&self) -> &'static str {
        match self {
            NodeKind::Root => "root",
            NodeKind::PlainText { .. } => "plain_text",
            NodeKind::RichText { .. } => "rich_text",
            NodeKind::Image { .. } => "image",
            NodeKind::Video { .. } => "video",
            NodeKind::WebEmbed { .. } => "web_embed",
            NodeKind::Chat { .. } => "chat",
            NodeKind::Collection(_) => "collection",
        }
    }
}

// ─── Node ────────────────────────────────────────────────────────────────

/// Axis-aligned box in canvas coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px <= self.x + self.width && py >= self.y && py <= self.y + self.height
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// A positioned, sized block on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
    pub title: Option<String>,

    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,

    /// Stacking order; higher draws on top.
    pub z_index: u32,

    /// Shows drag/resize/delete/link affordances.
    pub editable: bool,

    /// True iff `linked_peers` is non-empty.
    pub has_links: bool,
    /// True while this node is the chosen start of an unfinished link.
    pub pending_link: bool,
    /// Nodes linked to this one, in the order the links were made.
    pub linked_peers: SmallVec<[NodeId; 4]>,

    /// Cell coordinates; only meaningful while the node sits in a grid.
    pub grid_row: i32,
    pub grid_column: i32,
}

impl Node {
    pub fn new(id: NodeId, kind: NodeKind) -> Self {
        Self {
            id,
            kind,
            title: None,
            x: 0.0,
            y: 0.0,
            width: DEFAULT_NODE_SIZE,
            height: DEFAULT_NODE_SIZE,
            z_index: 0,
            editable: false,
            has_links: false,
            pending_link: false,
            linked_peers: SmallVec::new(),
            grid_row: 0,
            grid_column: 0,
        }
    }

    pub fn plain_text(text: impl Into<String>) -> Self {
        Self::new(
            NodeId::with_prefix("text"),
            NodeKind::PlainText { text: text.into() },
        )
    }

    pub fn rich_text(html: impl Into<String>) -> Self {
        Self::new(
            NodeId::with_prefix("richtext"),
            NodeKind::RichText { html: html.into() },
        )
    }

    pub fn image(src: impl Into<String>) -> Self {
        Self::new(NodeId::with_prefix("image"), NodeKind::Image { src: src.into() })
    }

    pub fn video(src: impl Into<String>) -> Self {
        Self::new(NodeId::with_prefix("video"), NodeKind::Video { src: src.into() })
    }

    pub fn web_embed(url: impl Into<String>) -> Self {
        Self::new(
            NodeId::with_prefix("web"),
            NodeKind::WebEmbed { url: url.into() },
        )
    }

    pub fn chat(system_prompt: impl Into<String>) -> Self {
        Self::new(
            NodeId::with_prefix("chat"),
            NodeKind::Chat {
                system_prompt: system_prompt.into(),
                messages: Vec::new(),
            },
        )
    }

    /// An empty collection. Its size is derived from its children.
    pub fn collection(title: impl Into<String>) -> Self {
        Self::new(
            NodeId::with_prefix("collection"),
            NodeKind::Collection(GridState::default()),
        )
        .titled(title)
    }

    #[must_use]
    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    #[must_use]
    pub fn sized(mut self, width: f32, height: f32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    #[must_use]
    pub fn titled(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn editable(mut self, editable: bool) -> Self {
        self.editable = editable;
        self
    }

    pub fn is_collection(&self) -> bool {
        matches!(self.kind, NodeKind::Collection(_))
    }

    pub fn grid(&self) -> Option<&GridState> {
        match &self.kind {
            NodeKind::Collection(grid) => Some(grid),
            _ => None,
        }
    }

    pub fn grid_mut(&mut self) -> Option<&mut GridState> {
        match &mut self.kind {
            NodeKind::Collection(grid) => Some(grid),
            _ => None,
        }
    }

    pub fn cell(&self) -> (i32, i32) {
        (self.grid_row, self.grid_column)
    }

    pub fn bounds(&self) -> Bounds {
        Bounds {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
        }
    }
}

// ─── Arena ───────────────────────────────────────────────────────────────

/// How a node is contained by the source of a membership edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership {
    /// Owned by the canvas root; removed only by full deletion.
    Root,
    /// Occupies a cell of a collection's grid.
    Grid,
}

/// Arena edge weight: the membership plus a sequence number giving
/// children a stable insertion order (node indices get reused).
#[derive(Debug, Clone, Copy)]
pub struct MemberEdge {
    pub membership: Membership,
    pub seq: u64,
}

/// Nodes touched since the last [`NodeArena::take_changes`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Changes {
    /// Live nodes whose state changed, sorted.
    pub updated: Vec<NodeId>,
    /// Nodes that left the arena, in removal order.
    pub removed: Vec<NodeId>,
}

impl Changes {
    pub fn is_empty(&self) -> bool {
        self.updated.is_empty() && self.removed.is_empty()
    }
}

/// Storage for every node of one canvas, keyed by identity.
///
/// Mutable access through [`get_mut`](Self::get_mut) or
/// [`node_mut`](Self::node_mut) records the node as changed, so a render
/// loop can poll [`take_changes`](Self::take_changes) instead of observing
/// individual fields.
#[derive(Debug, Clone)]
pub struct NodeArena {
    pub graph: StableDiGraph<Node, MemberEdge>,
    pub root: NodeIndex,
    id_index: HashMap<NodeId, NodeIndex>,
    next_seq: u64,
    dirty: HashSet<NodeId>,
    removed: Vec<NodeId>,
}

impl NodeArena {
    /// An arena holding only the root collection.
    #[must_use]
    pub fn new() -> Self {
        let mut graph = StableDiGraph::new();
        let root_id = NodeId::intern("root");
        let root = graph.add_node(Node::new(root_id, NodeKind::Root).sized(0.0, 0.0));

        let mut id_index = HashMap::new();
        id_index.insert(root_id, root);

        Self {
            graph,
            root,
            id_index,
            next_seq: 0,
            dirty: HashSet::new(),
            removed: Vec::new(),
        }
    }

    /// Add `node` as a member of the root. Returns the existing index if a
    /// node with the same id is already present.
    pub fn insert(&mut self, node: Node) -> NodeIndex {
        if let Some(&idx) = self.id_index.get(&node.id) {
            return idx;
        }
        let id = node.id;
        let idx = self.graph.add_node(node);
        self.link(self.root, idx, Membership::Root);
        self.id_index.insert(id, idx);
        self.dirty.insert(id);
        idx
    }

    /// Drop a node and every membership edge touching it.
    pub fn remove(&mut self, idx: NodeIndex) -> Option<Node> {
        if idx == self.root {
            return None;
        }
        let removed = self.graph.remove_node(idx)?;
        self.id_index.remove(&removed.id);
        self.dirty.remove(&removed.id);
        self.removed.push(removed.id);
        Some(removed)
    }

    pub fn index_of(&self, id: NodeId) -> Option<NodeIndex> {
        self.id_index.get(&id).copied()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.id_index.contains_key(&id)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.index_of(id).map(|idx| &self.graph[idx])
    }

    /// Mutable lookup by id; marks the node as changed.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let idx = self.index_of(id)?;
        Some(self.node_mut(idx))
    }

    /// Mutable access by index; marks the node as changed.
    ///
    /// # Panics
    /// If `idx` is not a live node.
    pub fn node_mut(&mut self, idx: NodeIndex) -> &mut Node {
        let node = &mut self.graph[idx];
        self.dirty.insert(node.id);
        node
    }

    /// Number of nodes, root excluded.
    pub fn len(&self) -> usize {
        self.graph.node_count() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Members of the root, in insertion order.
    pub fn members(&self) -> Vec<NodeIndex> {
        self.children_by(self.root, Membership::Root)
    }

    /// Children occupying cells of `collection`, in insertion order.
    pub fn grid_children(&self, collection: NodeIndex) -> Vec<NodeIndex> {
        self.children_by(collection, Membership::Grid)
    }

    /// The collection whose grid holds `idx`, if any.
    pub fn parent_grid(&self, idx: NodeIndex) -> Option<NodeIndex> {
        self.parent_by(idx, Membership::Grid)
    }

    /// The root collection owning `idx` (always the arena root for members).
    pub fn root_collection(&self, idx: NodeIndex) -> Option<NodeIndex> {
        self.parent_by(idx, Membership::Root)
    }

    /// Walk the chain of parent grids above `idx`, nearest first.
    pub fn grid_ancestors(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut chain = Vec::new();
        let mut current = self.parent_grid(idx);
        while let Some(parent) = current {
            chain.push(parent);
            current = self.parent_grid(parent);
        }
        chain
    }

    /// Put `child` into the grid of `collection`.
    pub fn attach_to_grid(&mut self, collection: NodeIndex, child: NodeIndex) {
        self.link(collection, child, Membership::Grid);
        self.touch(collection);
        self.touch(child);
    }

    /// Take `child` out of its grid. Returns the collection it left.
    pub fn detach_from_grid(&mut self, child: NodeIndex) -> Option<NodeIndex> {
        let (edge, collection): (EdgeIndex, NodeIndex) = self
            .graph
            .edges_directed(child, Direction::Incoming)
            .find(|e| e.weight().membership == Membership::Grid)
            .map(|e| (e.id(), e.source()))?;
        self.graph.remove_edge(edge);
        self.touch(collection);
        self.touch(child);
        Some(collection)
    }

    /// Record a node as changed without mutating it.
    pub fn touch(&mut self, idx: NodeIndex) {
        if let Some(node) = self.graph.node_weight(idx) {
            self.dirty.insert(node.id);
        }
    }

    /// Drain the change log.
    pub fn take_changes(&mut self) -> Changes {
        let mut updated: Vec<NodeId> = self.dirty.drain().collect();
        updated.sort_unstable();
        Changes {
            updated,
            removed: std::mem::take(&mut self.removed),
        }
    }

    fn link(&mut self, parent: NodeIndex, child: NodeIndex, membership: Membership) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.graph
            .add_edge(parent, child, MemberEdge { membership, seq });
    }

    fn parent_by(&self, idx: NodeIndex, membership: Membership) -> Option<NodeIndex> {
        self.graph
            .edges_directed(idx, Direction::Incoming)
            .find(|e| e.weight().membership == membership)
            .map(|e| e.source())
    }

    fn children_by(&self, idx: NodeIndex, membership: Membership) -> Vec<NodeIndex> {
        let mut children: Vec<(u64, NodeIndex)> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .filter(|e| e.weight().membership == membership)
            .map(|e| (e.weight().seq, e.target()))
            .collect();
        children.sort_unstable_by_key(|(seq, _)| *seq);
        children.into_iter().map(|(_, child)| child).collect()
    }
}

impl Default for NodeArena {
    fn default() -> Self {
        Self::new()
    }
}
