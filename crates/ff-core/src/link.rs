//! Link manager: undirected connections between nodes.
//!
//! Links are made with a two-click protocol. The first click on a node
//! picks it as the pending start; a second click on a different node
//! completes the link; clicking the pending start again cancels. The
//! protocol is an explicit two-state machine ([`LinkState`]) so there is
//! never more than one pending start.
//!
//! The adjacency lives in a `petgraph` [`UnGraphMap`] keyed by [`NodeId`],
//! which makes every edge symmetric and unique by construction. The
//! node-side mirror (`linked_peers`, `has_links`, `pending_link`) is kept
//! in step on every transition.

use crate::id::NodeId;
use crate::model::NodeArena;
use petgraph::graphmap::UnGraphMap;

/// Where the two-click protocol currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkState {
    #[default]
    Idle,
    /// One endpoint chosen, waiting for the second click.
    Pending(NodeId),
}

impl LinkState {
    pub fn pending(self) -> Option<NodeId> {
        match self {
            LinkState::Idle => None,
            LinkState::Pending(id) => Some(id),
        }
    }
}

/// Result of one click in the linking protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
    /// The clicked node is not on the canvas; nothing changed.
    Ignored,
    /// The clicked node became the pending start.
    Started,
    /// The pending start was clicked again; back to idle.
    Cancelled,
    /// The two nodes were already linked; back to idle without a new edge.
    AlreadyLinked,
    /// A new link was made.
    Linked,
}

impl LinkOutcome {
    /// Whether this click formed a link.
    pub fn formed(self) -> bool {
        matches!(self, LinkOutcome::Linked)
    }
}

/// Owns the link graph of one canvas and the pending-start state.
#[derive(Debug, Clone, Default)]
pub struct LinkManager {
    graph: UnGraphMap<NodeId, ()>,
    state: LinkState,
}

impl LinkManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensure `id` has an adjacency entry. Idempotent.
    pub fn register_node(&mut self, id: NodeId) {
        self.graph.add_node(id);
    }

    pub fn is_registered(&self, id: NodeId) -> bool {
        self.graph.contains_node(id)
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    pub fn pending(&self) -> Option<NodeId> {
        self.state.pending()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_linked(&self, a: NodeId, b: NodeId) -> bool {
        self.graph.contains_edge(a, b)
    }

    /// Feed one click on `id` into the protocol.
    pub fn attempt_link(&mut self, nodes: &mut NodeArena, id: NodeId) -> LinkOutcome {
        if !nodes.contains(id) {
            return LinkOutcome::Ignored;
        }
        self.register_node(id);

        match self.state {
            LinkState::Idle => self.begin(nodes, id),
            LinkState::Pending(start) if start == id => {
                if let Some(node) = nodes.get_mut(id) {
                    node.pending_link = false;
                }
                self.state = LinkState::Idle;
                log::debug!("link from {id} cancelled");
                LinkOutcome::Cancelled
            }
            LinkState::Pending(start) if !nodes.contains(start) => {
                // The start vanished without going through `remove_all_links`.
                self.state = LinkState::Idle;
                self.begin(nodes, id)
            }
            LinkState::Pending(start) => {
                self.register_node(start);
                self.complete(nodes, start, id)
            }
        }
    }

    /// Current peers of `id`; empty if it has none or is unknown.
    pub fn links_of(&self, id: NodeId) -> Vec<NodeId> {
        self.graph.neighbors(id).collect()
    }

    /// Remove every link of `id` and forget it. No-op if never registered.
    pub fn remove_all_links(&mut self, nodes: &mut NodeArena, id: NodeId) {
        if !self.graph.contains_node(id) {
            return;
        }

        let peers = self.links_of(id);
        for &peer in &peers {
            self.graph.remove_edge(id, peer);
            if let Some(node) = nodes.get_mut(peer) {
                node.linked_peers.retain(|p| *p != id);
                node.has_links = !node.linked_peers.is_empty();
            }
        }
        self.graph.remove_node(id);

        if self.state == LinkState::Pending(id) {
            self.state = LinkState::Idle;
        }
        if let Some(node) = nodes.get_mut(id) {
            node.linked_peers.clear();
            node.has_links = false;
            node.pending_link = false;
        }
        log::debug!("removed {} link(s) of {id}", peers.len());
    }

    /// Remove the single link between `a` and `b`, if there is one.
    pub fn remove_link(&mut self, nodes: &mut NodeArena, a: NodeId, b: NodeId) {
        if !self.graph.contains_node(a) || !self.graph.contains_node(b) {
            return;
        }
        if self.graph.remove_edge(a, b).is_some() {
            log::debug!("unlinked {a} and {b}");
        }

        for (this, other) in [(a, b), (b, a)] {
            if let Some(node) = nodes.get_mut(this) {
                node.linked_peers.retain(|p| *p != other);
                node.has_links = !node.linked_peers.is_empty();
            }
        }
    }

    fn begin(&mut self, nodes: &mut NodeArena, id: NodeId) -> LinkOutcome {
        if let Some(node) = nodes.get_mut(id) {
            node.pending_link = true;
        }
        self.state = LinkState::Pending(id);
        LinkOutcome::Started
    }

    fn complete(&mut self, nodes: &mut NodeArena, start: NodeId, end: NodeId) -> LinkOutcome {
        self.state = LinkState::Idle;

        if self.graph.contains_edge(start, end) {
            for id in [start, end] {
                if let Some(node) = nodes.get_mut(id) {
                    node.pending_link = false;
                }
            }
            log::debug!("{start} and {end} are already linked");
            return LinkOutcome::AlreadyLinked;
        }

        self.graph.add_edge(start, end, ());
        for (this, other) in [(start, end), (end, start)] {
            if let Some(node) = nodes.get_mut(this) {
                node.linked_peers.push(other);
                node.has_links = true;
                node.pending_link = false;
            }
        }
        log::debug!("linked {start} and {end}");
        LinkOutcome::Linked
    }
}
