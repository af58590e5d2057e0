//! Integration tests: canvas → grid layout → verify sizes and positions.
//!
//! Exercises the full `ff-core` pipeline: nodes are added to a canvas,
//! gridded into collections, resized, and the resulting geometry is
//! checked against hand-computed values (border 5, top bar 20).

use ff_core::{Canvas, LayoutConfig, Node, NodeId, ZOrderAllocator};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn canvas() -> Canvas {
    let _ = env_logger::builder().is_test(true).try_init();
    Canvas::new(LayoutConfig::default(), Arc::new(ZOrderAllocator::new()))
}

fn add_sized(canvas: &mut Canvas, width: f32, height: f32) -> NodeId {
    canvas.add_node(Node::image("tile.png").sized(width, height))
}

fn position(canvas: &Canvas, id: NodeId) -> (f32, f32) {
    let node = canvas.get(id).expect("node on canvas");
    (node.x, node.y)
}

fn size(canvas: &Canvas, id: NodeId) -> (f32, f32) {
    let node = canvas.get(id).expect("node on canvas");
    (node.width, node.height)
}

// ─── Sizing ──────────────────────────────────────────────────────────────

#[test]
fn two_by_two_grid_sizes_tracks_and_places_children() {
    let mut c = canvas();
    let grid = c.add_node(Node::collection("board"));
    let a = add_sized(&mut c, 100.0, 100.0);
    let b = add_sized(&mut c, 150.0, 100.0);
    let d = add_sized(&mut c, 200.0, 100.0);
    c.assign_cell(a, 0, 0);
    c.assign_cell(b, 0, 1);
    c.assign_cell(d, 1, 0);

    assert_eq!(c.add_to_grid(grid, &[a, b, d]), 3);

    let state = c.get(grid).unwrap().grid().unwrap().clone();
    assert_eq!(state.column_widths.into_iter().collect::<Vec<_>>(), vec![(0, 205.0), (1, 160.0)]);
    assert_eq!(state.row_heights.into_iter().collect::<Vec<_>>(), vec![(0, 102.5), (1, 112.5)]);
    assert_eq!((state.row_count, state.col_count), (1, 1));
    assert_eq!(size(&c, grid), (365.0, 235.0));

    assert_eq!(position(&c, a), (5.0, 25.0));
    assert_eq!(position(&c, b), (210.0, 25.0));
    assert_eq!(position(&c, d), (5.0, 130.0));
}

#[test]
fn children_follow_collection_origin() {
    let mut c = canvas();
    let grid = c.add_node(Node::collection("board").at(200.0, -40.0));
    let a = add_sized(&mut c, 100.0, 100.0);
    c.add_to_grid(grid, &[a]);

    assert_eq!(size(&c, grid), (110.0, 130.0));
    assert_eq!(position(&c, a), (205.0, -15.0));
}

#[test]
fn sparse_cells_are_compacted_on_insert() {
    let mut c = canvas();
    let grid = c.add_node(Node::collection("board"));
    let a = add_sized(&mut c, 100.0, 100.0);
    let b = add_sized(&mut c, 100.0, 100.0);
    c.assign_cell(a, 3, 8);
    c.assign_cell(b, 3, 12);

    c.add_to_grid(grid, &[a, b]);

    assert_eq!(c.get(a).unwrap().cell(), (0, 0));
    assert_eq!(c.get(b).unwrap().cell(), (0, 1));
    assert_eq!(position(&c, b), (110.0, 25.0));
}

#[test]
fn resizing_a_child_regrows_its_track() {
    let mut c = canvas();
    let grid = c.add_node(Node::collection("board"));
    let a = add_sized(&mut c, 100.0, 100.0);
    let b = add_sized(&mut c, 100.0, 100.0);
    c.assign_cell(b, 0, 1);
    c.add_to_grid(grid, &[a, b]);
    assert_eq!(position(&c, b), (110.0, 25.0));

    c.resize_by(a, 50.0, 0.0);

    assert_eq!(size(&c, grid), (265.0, 130.0));
    assert_eq!(position(&c, b), (160.0, 25.0));
}

// ─── Nesting ─────────────────────────────────────────────────────────────

struct Nested {
    outer: NodeId,
    inner: NodeId,
    leaf: NodeId,
    side: NodeId,
}

/// outer ⊃ { inner ⊃ { leaf } at (0,0), side at (0,1) }
fn nested(c: &mut Canvas) -> Nested {
    let outer = c.add_node(Node::collection("outer"));
    let inner = c.add_node(Node::collection("inner"));
    let leaf = add_sized(c, 100.0, 100.0);
    let side = add_sized(c, 100.0, 100.0);

    c.add_to_grid(inner, &[leaf]);
    c.assign_cell(side, 0, 1);
    c.add_to_grid(outer, &[inner, side]);

    Nested {
        outer,
        inner,
        leaf,
        side,
    }
}

#[test]
fn nested_collection_sizes_as_a_child() {
    let mut c = canvas();
    let n = nested(&mut c);

    assert_eq!(size(&c, n.inner), (110.0, 130.0));
    assert_eq!(size(&c, n.outer), (225.0, 160.0));
    assert_eq!(position(&c, n.inner), (5.0, 25.0));
    assert_eq!(position(&c, n.leaf), (10.0, 50.0));
    assert_eq!(position(&c, n.side), (120.0, 25.0));
}

#[test]
fn resize_cascades_up_through_every_level() {
    let mut c = canvas();
    let n = nested(&mut c);

    c.resize_by(n.leaf, 100.0, 0.0);

    assert_eq!(size(&c, n.inner).0, 210.0);
    assert_eq!(size(&c, n.outer).0, 325.0);
    assert_eq!(position(&c, n.side), (220.0, 25.0));
    assert_eq!(position(&c, n.leaf), (10.0, 50.0));
}

#[test]
fn moving_outer_collection_moves_every_descendant() {
    let mut c = canvas();
    let n = nested(&mut c);

    assert!(c.move_by(n.outer, 100.0, 10.0));

    assert_eq!(position(&c, n.inner), (105.0, 35.0));
    assert_eq!(position(&c, n.leaf), (110.0, 60.0));
    assert_eq!(position(&c, n.side), (220.0, 35.0));
}

#[test]
fn nested_children_stack_above_their_parents() {
    let mut c = canvas();
    let n = nested(&mut c);

    let z = c.bring_to_front(n.outer).unwrap();
    assert_eq!(c.get(n.inner).unwrap().z_index, z + 1);
    assert_eq!(c.get(n.side).unwrap().z_index, z + 1);
    assert_eq!(c.get(n.leaf).unwrap().z_index, z + 2);
}

#[test]
fn layout_changes_are_reported() {
    let mut c = canvas();
    let n = nested(&mut c);
    c.take_changes();

    c.resize_by(n.leaf, 10.0, 10.0);

    let changes = c.take_changes();
    for id in [n.leaf, n.inner, n.outer, n.side] {
        assert!(changes.updated.contains(&id), "{id} not reported");
    }
    assert!(changes.removed.is_empty());
}
