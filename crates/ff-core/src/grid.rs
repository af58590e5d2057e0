//! Grid layout engine for collections.
//!
//! A collection lays its children out on a sparse grid of (row, column)
//! cells. After every membership or size change the grid is:
//!
//! 1. normalized: distinct rows/columns collapse to dense 0-based indices;
//! 2. sized: each column is as wide as its widest child and each row as
//!    tall as its tallest, plus border margins, and the collection takes
//!    the sum;
//! 3. placed: each child moves to its collection's origin plus the
//!    widths/heights of the tracks before it.
//!
//! Collections nest, so a recompute walks up through every parent grid,
//! and placing a collection re-places its own children.

use crate::config::LayoutConfig;
use crate::model::{GridState, Node, NodeArena};
use petgraph::graph::NodeIndex;
use std::collections::{BTreeMap, BTreeSet};

/// Record a cell on `node`.
///
/// Cell uniqueness is the caller's job; two children may share a cell.
pub fn assign_cell(node: &mut Node, row: i32, column: i32) {
    node.grid_row = row;
    node.grid_column = column;
}

/// Collapse `(row, column)` pairs into dense, order-preserving 0-based indices.
///
/// Rows and columns are remapped independently.
pub fn normalize_cells(cells: &[(i32, i32)]) -> Vec<(i32, i32)> {
    let rows = dense_index(cells.iter().map(|&(r, _)| r));
    let cols = dense_index(cells.iter().map(|&(_, c)| c));
    cells.iter().map(|(r, c)| (rows[r], cols[c])).collect()
}

fn dense_index(values: impl Iterator<Item = i32>) -> BTreeMap<i32, i32> {
    let distinct: BTreeSet<i32> = values.collect();
    distinct.into_iter().zip(0..).collect()
}

/// Normalize the cells of `nodes` in place. Unchanged nodes are not touched.
pub fn normalize(arena: &mut NodeArena, nodes: &[NodeIndex]) {
    let cells: Vec<(i32, i32)> = nodes.iter().map(|&idx| arena.graph[idx].cell()).collect();
    let dense = normalize_cells(&cells);
    for ((&idx, old), new) in nodes.iter().zip(cells).zip(dense) {
        if old != new {
            assign_cell(arena.node_mut(idx), new.0, new.1);
        }
    }
}

/// Rebuild the grid of `collection`, place its children, and cascade into
/// every parent grid above it. Does nothing if `collection` is not one.
pub fn recompute(arena: &mut NodeArena, config: &LayoutConfig, collection: NodeIndex) {
    let mut current = Some(collection);
    while let Some(idx) = current {
        if !arena.graph.node_weight(idx).is_some_and(Node::is_collection) {
            break;
        }
        resize_grid(arena, config, idx);
        bring_children_to_front(arena, idx);
        place_children(arena, config, idx);
        current = arena.parent_grid(idx);
    }
}

/// Move a node to `(x, y)`. A collection drags its children along.
pub fn place(arena: &mut NodeArena, config: &LayoutConfig, idx: NodeIndex, x: f32, y: f32) {
    let node = arena.node_mut(idx);
    node.x = x;
    node.y = y;
    if node.is_collection() {
        place_children(arena, config, idx);
    }
}

/// Stack every child one above `collection`, recursively for nested grids.
pub fn bring_children_to_front(arena: &mut NodeArena, collection: NodeIndex) {
    let z = arena.graph[collection].z_index + 1;
    for child in arena.grid_children(collection) {
        let node = arena.node_mut(child);
        node.z_index = z;
        if node.is_collection() {
            bring_children_to_front(arena, child);
        }
    }
}

/// Steps 1–5: normalize, rebuild the track caches, size the collection.
fn resize_grid(arena: &mut NodeArena, config: &LayoutConfig, collection: NodeIndex) {
    let children = arena.grid_children(collection);
    normalize(arena, &children);

    let border = config.border_width;
    let mut grid = GridState::default();
    for &child in &children {
        let (row, column) = arena.graph[child].cell();
        grid.row_count = grid.row_count.max(row);
        grid.col_count = grid.col_count.max(column);
    }

    // A track only grows when a child is wider/taller than the stored value,
    // and the stored value already includes its margins.
    for &child in &children {
        let node = &arena.graph[child];
        let (row, column) = node.cell();

        if grid.column_widths.get(&column).is_none_or(|w| *w < node.width) {
            let mut width = node.width + border;
            if column == grid.col_count {
                width += border;
            }
            grid.column_widths.insert(column, width);
        }

        if grid.row_heights.get(&row).is_none_or(|h| *h < node.height) {
            let mut height = node.height + border;
            if row == grid.row_count {
                height += border + border / 2.0;
            }
            if row == 0 {
                height -= border / 2.0;
            }
            grid.row_heights.insert(row, height);
        }
    }

    let node = arena.node_mut(collection);
    node.width = grid.total_width();
    node.height = grid.total_rows_height() + config.top_bar_height;
    log::debug!(
        "grid {} now {}x{} cells, {}x{}px",
        node.id,
        grid.row_count + 1,
        grid.col_count + 1,
        node.width,
        node.height
    );
    if let Some(cache) = node.grid_mut() {
        *cache = grid;
    }
}

/// Step 6: move every child to its cell's pixel position.
fn place_children(arena: &mut NodeArena, config: &LayoutConfig, collection: NodeIndex) {
    let node = &arena.graph[collection];
    let (origin_x, origin_y) = (node.x, node.y);
    let Some(grid) = node.grid().cloned() else {
        return;
    };

    let border = config.border_width;
    for child in arena.grid_children(collection) {
        let (row, column) = arena.graph[child].cell();
        let x = origin_x + grid.column_offset(column) + border;
        let mut y = origin_y + grid.row_offset(row) + config.top_bar_height + border;
        if row != 0 {
            y += border / 2.0;
        }
        log::trace!("place {} at ({x}, {y})", arena.graph[child].id);
        place(arena, config, child, x, y);
    }
}
