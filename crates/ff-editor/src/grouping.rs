//! Grouping nodes into collections.
//!
//! Two workflows share one [`GridSelector`]:
//!
//! - **create**: the editable, ungridded nodes on the canvas go into a new
//!   collection. The user first picks a grid size on a blank matrix, then
//!   clicks one cell per node, then names the collection.
//! - **add**: exactly one editable collection is chosen as the target and
//!   the editable, ungridded non-collection nodes are placed into free
//!   cells around its existing children.
//!
//! Nothing touches the canvas until [`GridSelector::commit`]; dropping a
//! selector cancels the workflow.

use crate::session::EditorConfig;
use ff_core::{Canvas, Node, NodeId};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GroupingError {
    #[error("Please assign nodes to the collection")]
    NoNodesSelected,

    #[error("There are no collections selected.")]
    NoCollectionSelected,

    #[error("Please only select one collection.")]
    TooManyCollections,

    #[error("The size of the grid must fit all of the selected nodes.")]
    GridTooSmall { cells: usize, nodes: usize },

    #[error("Choose a grid size first")]
    SizeNotChosen,

    #[error("This cell is already assigned to a node.")]
    CellOccupied { row: usize, column: usize },

    #[error("cell ({row}, {column}) is outside the {rows}x{columns} grid")]
    OutOfBounds {
        row: usize,
        column: usize,
        rows: usize,
        columns: usize,
    },

    #[error("Please assign nodes to the collection")]
    AssignmentIncomplete { remaining: usize },

    #[error("Please enter a title")]
    MissingTitle,

    #[error("collection {0} is no longer on the canvas")]
    CollectionMissing(NodeId),
}

pub type Result<T> = std::result::Result<T, GroupingError>;

/// The collection a selector fills.
#[derive(Debug, Clone)]
enum Target {
    /// A collection that joins the canvas on commit.
    New(Box<Node>),
    Existing(NodeId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Picking the extent of a blank grid.
    ChoosingSize,
    /// Clicking one cell per pending node.
    Assigning,
}

/// Cell picker for placing nodes into a collection's grid.
#[derive(Debug, Clone)]
pub struct GridSelector {
    target: Target,
    nodes: Vec<NodeId>,
    cells: Vec<(usize, usize)>,
    occupied: Vec<Vec<bool>>,
    phase: Phase,
    default_size: usize,
}

impl GridSelector {
    fn new(target: Target, nodes: Vec<NodeId>, default_size: usize) -> Self {
        Self {
            target,
            nodes,
            cells: Vec::new(),
            occupied: blank(default_size, default_size),
            phase: Phase::ChoosingSize,
            default_size,
        }
    }

    /// A selector around the existing children of `collection`. Their cells
    /// are taken; the matrix spans the highest occupied index plus
    /// `extra_grid_cells` on each axis.
    fn around_children(
        canvas: &Canvas,
        collection: NodeId,
        nodes: Vec<NodeId>,
        config: &EditorConfig,
    ) -> Self {
        let mut selector = Self::new(
            Target::Existing(collection),
            nodes,
            config.default_selector_size,
        );
        let children = canvas.grid_children(collection);
        let Some(grid) = canvas.get(collection).and_then(Node::grid) else {
            return selector;
        };
        if children.is_empty() {
            return selector;
        }

        let rows = grid.row_count.max(0) as usize + config.extra_grid_cells;
        let columns = grid.col_count.max(0) as usize + config.extra_grid_cells;
        selector.occupied = blank(rows, columns);
        for (row, column) in children.into_iter().filter_map(|id| canvas.get(id).map(Node::cell)) {
            if let Some(cell) = selector.cell_mut(row.max(0) as usize, column.max(0) as usize) {
                *cell = true;
            }
        }
        selector.phase = Phase::Assigning;
        selector
    }

    /// The nodes being placed, in assignment order.
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// The collection being filled, once it is on the canvas.
    pub fn collection(&self) -> Option<NodeId> {
        match &self.target {
            Target::New(_) => None,
            Target::Existing(id) => Some(*id),
        }
    }

    pub fn is_new_collection(&self) -> bool {
        matches!(self.target, Target::New(_))
    }

    /// Name the collection being created. Ignored when adding to one.
    pub fn set_title(&mut self, title: impl Into<String>) {
        if let Target::New(node) = &mut self.target {
            node.title = Some(title.into());
        }
    }

    /// `(rows, columns)` of the selector matrix.
    pub fn dimensions(&self) -> (usize, usize) {
        let rows = self.occupied.len();
        let columns = self.occupied.first().map_or(0, Vec::len);
        (rows, columns)
    }

    pub fn is_occupied(&self, row: usize, column: usize) -> bool {
        self.occupied
            .get(row)
            .and_then(|r| r.get(column))
            .copied()
            .unwrap_or(false)
    }

    pub fn needs_size(&self) -> bool {
        self.phase == Phase::ChoosingSize
    }

    /// The node the next click places.
    pub fn next_node(&self) -> Option<NodeId> {
        self.nodes.get(self.cells.len()).copied()
    }

    pub fn remaining(&self) -> usize {
        self.nodes.len() - self.cells.len()
    }

    pub fn is_done(&self) -> bool {
        self.phase == Phase::Assigning && self.remaining() == 0
    }

    /// Choose a blank grid spanning rows `0..=row` and columns `0..=column`.
    /// A grid too small for the nodes is rejected and the choice starts over.
    pub fn choose_size(&mut self, row: usize, column: usize) -> Result<()> {
        if self.phase != Phase::ChoosingSize {
            return Ok(());
        }
        self.check_bounds(row, column)?;

        let cells = (row + 1) * (column + 1);
        if cells < self.nodes.len() {
            self.occupied = blank(self.default_size, self.default_size);
            return Err(GroupingError::GridTooSmall {
                cells,
                nodes: self.nodes.len(),
            });
        }
        self.occupied = blank(row + 1, column + 1);
        self.phase = Phase::Assigning;
        Ok(())
    }

    /// Place the next pending node at `(row, column)`.
    ///
    /// Returns the node placed, or `None` once every node has a cell.
    pub fn click(&mut self, row: usize, column: usize) -> Result<Option<NodeId>> {
        if self.phase == Phase::ChoosingSize {
            return Err(GroupingError::SizeNotChosen);
        }
        let Some(node) = self.next_node() else {
            return Ok(None);
        };
        self.check_bounds(row, column)?;
        if self.is_occupied(row, column) {
            return Err(GroupingError::CellOccupied { row, column });
        }

        if let Some(cell) = self.cell_mut(row, column) {
            *cell = true;
        }
        self.cells.push((row, column));
        Ok(Some(node))
    }

    /// Write the chosen cells onto the canvas and grid the nodes. Returns
    /// the collection they joined.
    ///
    /// Nodes deleted or gridded elsewhere since planning are dropped. Every
    /// check runs before the first write, so an error leaves the canvas as
    /// it was.
    pub fn commit(self, canvas: &mut Canvas) -> Result<NodeId> {
        if !self.is_done() {
            return Err(GroupingError::AssignmentIncomplete {
                remaining: self.remaining(),
            });
        }

        let placements: Vec<(NodeId, (usize, usize))> = self
            .nodes
            .iter()
            .copied()
            .zip(self.cells.iter().copied())
            .filter(|&(id, _)| canvas.contains(id) && is_free(canvas, id))
            .collect();

        let target = match self.target {
            Target::New(node) => {
                if node.title.as_deref().is_none_or(|t| t.trim().is_empty()) {
                    return Err(GroupingError::MissingTitle);
                }
                Target::New(node)
            }
            Target::Existing(id) => {
                if !canvas.contains(id) {
                    return Err(GroupingError::CollectionMissing(id));
                }
                // The grid may have been compacted since planning.
                let taken: Vec<(i32, i32)> = canvas
                    .grid_children(id)
                    .into_iter()
                    .filter_map(|child| canvas.get(child).map(Node::cell))
                    .collect();
                if let Some(&(_, (row, column))) = placements
                    .iter()
                    .find(|(_, (row, column))| taken.contains(&(*row as i32, *column as i32)))
                {
                    return Err(GroupingError::CellOccupied { row, column });
                }
                Target::Existing(id)
            }
        };
        if placements.is_empty() {
            return Err(GroupingError::NoNodesSelected);
        }

        let collection = match target {
            Target::New(node) => canvas.add_node(*node),
            Target::Existing(id) => id,
        };
        let ids: Vec<NodeId> = placements.iter().map(|&(id, _)| id).collect();
        for &(id, (row, column)) in &placements {
            canvas.assign_cell(id, row as i32, column as i32);
        }
        let added = canvas.add_to_grid(collection, &ids);
        log::debug!("{added} node(s) grouped into {collection}");
        Ok(collection)
    }

    fn check_bounds(&self, row: usize, column: usize) -> Result<()> {
        let (rows, columns) = self.dimensions();
        if row >= rows || column >= columns {
            return Err(GroupingError::OutOfBounds {
                row,
                column,
                rows,
                columns,
            });
        }
        Ok(())
    }

    fn cell_mut(&mut self, row: usize, column: usize) -> Option<&mut bool> {
        self.occupied.get_mut(row)?.get_mut(column)
    }
}

fn blank(rows: usize, columns: usize) -> Vec<Vec<bool>> {
    vec![vec![false; columns]; rows]
}

// ─── Planning ────────────────────────────────────────────────────────────

fn is_free(canvas: &Canvas, id: NodeId) -> bool {
    canvas.parent_grid(id).is_none()
}

/// Start creating a collection from every editable, ungridded node.
pub fn plan_new_collection(canvas: &Canvas, config: &EditorConfig) -> Result<GridSelector> {
    let nodes: Vec<NodeId> = canvas
        .members()
        .into_iter()
        .filter(|&id| canvas.get(id).is_some_and(|n| n.editable) && is_free(canvas, id))
        .collect();
    if nodes.is_empty() {
        return Err(GroupingError::NoNodesSelected);
    }

    let (x, y) = config.new_collection_position;
    let collection = Node::collection("").at(x, y);
    log::debug!("planning {} with {} node(s)", collection.id, nodes.len());
    Ok(GridSelector::new(
        Target::New(Box::new(collection)),
        nodes,
        config.default_selector_size,
    ))
}

/// Start adding the editable, ungridded non-collection nodes to the single
/// editable collection. The target stops being editable.
pub fn plan_add_to_collection(canvas: &mut Canvas, config: &EditorConfig) -> Result<GridSelector> {
    let members = canvas.members();
    let targets: Vec<NodeId> = members
        .iter()
        .copied()
        .filter(|&id| canvas.get(id).is_some_and(|n| n.is_collection() && n.editable))
        .collect();
    let collection = match targets.as_slice() {
        [] => return Err(GroupingError::NoCollectionSelected),
        [one] => *one,
        _ => return Err(GroupingError::TooManyCollections),
    };

    let nodes: Vec<NodeId> = members
        .into_iter()
        .filter(|&id| {
            canvas
                .get(id)
                .is_some_and(|n| n.editable && !n.is_collection())
                && is_free(canvas, id)
        })
        .collect();
    if nodes.is_empty() {
        return Err(GroupingError::NoNodesSelected);
    }

    canvas.set_editable(collection, false);
    Ok(GridSelector::around_children(canvas, collection, nodes, config))
}

/// Whether "add to collection" makes sense: some collection exists and some
/// non-collection node is not in a grid yet.
pub fn grouping_available(canvas: &Canvas) -> bool {
    let mut has_collection = false;
    let mut has_free_node = false;
    for id in canvas.members() {
        let Some(node) = canvas.get(id) else {
            continue;
        };
        if node.is_collection() {
            has_collection = true;
        } else if is_free(canvas, id) {
            has_free_node = true;
        }
    }
    has_collection && has_free_node
}
