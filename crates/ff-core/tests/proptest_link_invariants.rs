//! Property-based invariant tests for links, deletion and grid normalization.
//!
//! Verifies:
//! 1. Link symmetry: a's peers contain b iff b's peers contain a, and both
//!    mirror the link graph
//! 2. `has_links` is true iff the peer list is non-empty
//! 3. No duplicate links, no links to deleted nodes
//! 4. Only the pending start carries the `pending_link` flag
//! 5. Clicking the same node twice from idle changes nothing
//! 6. Every live collection still has at least one child
//! 7. Normalization is idempotent, dense and order-preserving
//! 8. Stacking order handed out by `bring_to_front` strictly increases

use ff_core::grid::normalize_cells;
use ff_core::{Canvas, DeleteMode, LayoutConfig, LinkState, Node, NodeId, ZOrderAllocator};
use proptest::prelude::*;
use std::collections::BTreeSet;
use std::sync::Arc;

const LOOSE: usize = 6;

// ── Strategy helpers ──────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum Op {
    Click(usize),
    Unlink(usize, usize),
    UnlinkAll(usize),
    Delete(usize, DeleteMode),
}

fn arb_op(n: usize) -> impl Strategy<Value = Op> {
    prop_oneof![
        6 => (0..n).prop_map(Op::Click),
        1 => (0..n, 0..n).prop_map(|(a, b)| Op::Unlink(a, b)),
        1 => (0..n).prop_map(Op::UnlinkAll),
        1 => (0..n, prop_oneof![Just(DeleteMode::Partial), Just(DeleteMode::Full)])
            .prop_map(|(i, mode)| Op::Delete(i, mode)),
    ]
}

/// Six loose tiles, two of which sit in a collection. The collection is
/// the last id.
fn board() -> (Canvas, Vec<NodeId>) {
    let mut canvas = Canvas::new(LayoutConfig::default(), Arc::new(ZOrderAllocator::new()));
    let mut ids: Vec<NodeId> = (0..LOOSE)
        .map(|i| canvas.add_node(Node::plain_text(format!("tile {i}"))))
        .collect();
    let grid = canvas.add_node(Node::collection("group"));
    canvas.assign_cell(ids[1], 0, 1);
    canvas.add_to_grid(grid, &ids[..2]);
    ids.push(grid);
    (canvas, ids)
}

fn apply(canvas: &mut Canvas, ids: &[NodeId], op: &Op) {
    match *op {
        Op::Click(i) => {
            canvas.attempt_link(ids[i]);
        }
        Op::Unlink(a, b) => canvas.remove_link(ids[a], ids[b]),
        Op::UnlinkAll(i) => canvas.remove_all_links(ids[i]),
        Op::Delete(i, mode) => {
            canvas.delete_node(ids[i], mode);
        }
    }
}

fn check_consistent(canvas: &Canvas, ids: &[NodeId]) -> Result<(), TestCaseError> {
    let mut mirrored = 0;
    for &id in ids {
        let Some(node) = canvas.get(id) else {
            prop_assert!(canvas.links_of(id).is_empty(), "{id} deleted but still linked");
            continue;
        };

        let peers: BTreeSet<NodeId> = node.linked_peers.iter().copied().collect();
        prop_assert_eq!(peers.len(), node.linked_peers.len(), "duplicate peer on {}", id);
        let graph: BTreeSet<NodeId> = canvas.links_of(id).into_iter().collect();
        prop_assert_eq!(&peers, &graph);
        prop_assert_eq!(node.has_links, !peers.is_empty());

        for &peer in &peers {
            prop_assert!(canvas.contains(peer), "{id} linked to deleted {peer}");
            let back = &canvas.get(peer).unwrap().linked_peers;
            prop_assert!(back.contains(&id), "{peer} does not link back to {id}");
        }
        mirrored += peers.len();

        prop_assert_eq!(node.pending_link, canvas.link_state() == LinkState::Pending(id));

        if node.is_collection() {
            prop_assert!(!canvas.grid_children(id).is_empty(), "empty grid {id} survived");
        }
    }
    prop_assert_eq!(mirrored, canvas.link_count() * 2);
    Ok(())
}

// ── Link and deletion invariants ──────────────────────────────────────

proptest! {
    #[test]
    fn links_stay_symmetric_and_mirrored(ops in prop::collection::vec(arb_op(LOOSE + 1), 0..60)) {
        let (mut canvas, ids) = board();
        for op in &ops {
            apply(&mut canvas, &ids, op);
            check_consistent(&canvas, &ids)?;
        }
    }

    #[test]
    fn double_click_from_idle_is_a_no_op(
        ops in prop::collection::vec(arb_op(LOOSE + 1), 0..30),
        target in 0..LOOSE,
    ) {
        let (mut canvas, ids) = board();
        for op in &ops {
            apply(&mut canvas, &ids, op);
        }
        let id = ids[target];
        prop_assume!(canvas.contains(id));
        prop_assume!(canvas.link_state() == LinkState::Idle);
        let links_before = canvas.link_count();
        let peers_before = canvas.links_of(id);

        canvas.attempt_link(id);
        canvas.attempt_link(id);

        prop_assert_eq!(canvas.link_state(), LinkState::Idle);
        prop_assert_eq!(canvas.link_count(), links_before);
        prop_assert_eq!(canvas.links_of(id), peers_before);
        prop_assert!(!canvas.get(id).unwrap().pending_link);
    }

    #[test]
    fn repeated_link_attempts_never_duplicate(a in 0..LOOSE, b in 0..LOOSE, rounds in 1usize..5) {
        prop_assume!(a != b);
        let (mut canvas, ids) = board();
        for _ in 0..rounds {
            canvas.attempt_link(ids[a]);
            canvas.attempt_link(ids[b]);
        }
        prop_assert_eq!(canvas.link_count(), 1);
        prop_assert_eq!(canvas.get(ids[a]).unwrap().linked_peers.len(), 1);
    }

    #[test]
    fn bring_to_front_strictly_increases(picks in prop::collection::vec(0..LOOSE + 1, 1..40)) {
        let (mut canvas, ids) = board();
        let mut last = 0;
        for i in picks {
            let z = canvas.bring_to_front(ids[i]).unwrap();
            prop_assert!(z > last);
            last = z;
        }
    }
}

// ── Normalization ─────────────────────────────────────────────────────

fn arb_cells() -> impl Strategy<Value = Vec<(i32, i32)>> {
    prop::collection::vec((-50i32..50, -50i32..50), 0..24)
}

proptest! {
    #[test]
    fn normalize_is_idempotent(cells in arb_cells()) {
        let once = normalize_cells(&cells);
        prop_assert_eq!(normalize_cells(&once), once);
    }

    #[test]
    fn normalize_is_dense(cells in arb_cells()) {
        let once = normalize_cells(&cells);
        let rows: BTreeSet<i32> = once.iter().map(|c| c.0).collect();
        let cols: BTreeSet<i32> = once.iter().map(|c| c.1).collect();
        prop_assert_eq!(rows.into_iter().collect::<Vec<_>>(), (0..rows_len(&cells)).collect::<Vec<_>>());
        prop_assert_eq!(cols.into_iter().collect::<Vec<_>>(), (0..cols_len(&cells)).collect::<Vec<_>>());
    }

    #[test]
    fn normalize_preserves_order(cells in arb_cells()) {
        let once = normalize_cells(&cells);
        for i in 0..cells.len() {
            for j in 0..cells.len() {
                prop_assert_eq!(cells[i].0.cmp(&cells[j].0), once[i].0.cmp(&once[j].0));
                prop_assert_eq!(cells[i].1.cmp(&cells[j].1), once[i].1.cmp(&once[j].1));
            }
        }
    }
}

fn rows_len(cells: &[(i32, i32)]) -> i32 {
    cells.iter().map(|c| c.0).collect::<BTreeSet<_>>().len() as i32
}

fn cols_len(cells: &[(i32, i32)]) -> i32 {
    cells.iter().map(|c| c.1).collect::<BTreeSet<_>>().len() as i32
}
