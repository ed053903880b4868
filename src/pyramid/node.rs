//! Pyramid node types.

use serde::Serialize;

/// Identity of a pyramid node: resolution level plus grid cell.
///
/// Ordered by level, then row, then column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct NodeKey {
    /// Resolution level (0 = full resolution)
    pub res_level: u32,

    /// Grid row at this level
    pub grid_row: i64,

    /// Grid column at this level
    pub grid_col: i64,
}

impl NodeKey {
    pub fn new(res_level: u32, grid_row: i64, grid_col: i64) -> Self {
        Self {
            res_level,
            grid_row,
            grid_col,
        }
    }

    /// Key of the covering cell one level up.
    pub fn parent(&self) -> NodeKey {
        let (row, col) = crate::grid::parent_cell(self.grid_row, self.grid_col);
        NodeKey::new(self.res_level + 1, row, col)
    }
}

/// Handle to a node in the forest: its level and its slot in that level's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeHandle {
    pub(crate) level: u32,
    pub(crate) slot: usize,
}

impl NodeHandle {
    /// Resolution level of the referenced node.
    pub fn level(&self) -> u32 {
        self.level
    }
}

/// A grid cell at one resolution level.
///
/// Only one child is remembered even though a cell can cover up to four
/// cells one level down; it is enough to reach some full-resolution tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PyramidNode {
    pub(crate) key: NodeKey,
    pub(crate) position_index: usize,
    pub(crate) parent: Option<NodeHandle>,
    pub(crate) child: Option<NodeHandle>,
}

impl PyramidNode {
    pub(crate) fn new(key: NodeKey, position_index: usize) -> Self {
        Self {
            key,
            position_index,
            parent: None,
            child: None,
        }
    }

    pub fn key(&self) -> NodeKey {
        self.key
    }

    pub fn res_level(&self) -> u32 {
        self.key.res_level
    }

    pub fn grid_row(&self) -> i64 {
        self.key.grid_row
    }

    pub fn grid_col(&self) -> i64 {
        self.key.grid_col
    }

    /// Stable index of this node within its resolution level.
    pub fn position_index(&self) -> usize {
        self.position_index
    }

    pub fn parent(&self) -> Option<NodeHandle> {
        self.parent
    }

    pub fn child(&self) -> Option<NodeHandle> {
        self.child
    }
}

/// Snapshot of a node as seen from a tile at some level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NodeInfo {
    #[serde(flatten)]
    pub key: NodeKey,
    pub position_index: usize,
}

impl From<&PyramidNode> for NodeInfo {
    fn from(node: &PyramidNode) -> Self {
        Self {
            key: node.key,
            position_index: node.position_index,
        }
    }
}
