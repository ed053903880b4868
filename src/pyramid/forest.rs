//! Arena of pyramid nodes, grouped by resolution level.
//!
//! Nodes are addressed by [`NodeHandle`] (level plus arena slot) and are never
//! removed, so handles stay valid for the lifetime of the forest. Each level
//! keeps an ordered map from grid cell to slot for exact-key lookup, and a map
//! from position index to slot for the reverse direction.

use std::collections::{BTreeMap, HashMap};

use tracing::{debug, error, trace};

use crate::error::IndexError;

use super::node::{NodeHandle, NodeKey, PyramidNode};

// =============================================================================
// Level Storage
// =============================================================================

#[derive(Debug, Clone, Default)]
struct LevelNodes {
    /// Nodes in creation order
    nodes: Vec<PyramidNode>,

    /// Grid cell to slot, ordered by (row, col)
    by_cell: BTreeMap<(i64, i64), usize>,

    /// Position index to slot
    by_position: HashMap<usize, usize>,
}

impl LevelNodes {
    fn insert(&mut self, node: PyramidNode) -> usize {
        let slot = self.nodes.len();
        self.by_cell
            .insert((node.key.grid_row, node.key.grid_col), slot);
        self.by_position.insert(node.position_index, slot);
        self.nodes.push(node);
        slot
    }
}

// =============================================================================
// PyramidForest
// =============================================================================

/// Every pyramid node ever needed, across all resolution levels.
#[derive(Debug, Clone, Default)]
pub struct PyramidForest {
    levels: Vec<LevelNodes>,
}

impl PyramidForest {
    /// Create an empty forest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of resolution levels holding at least one node.
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// Number of nodes at a resolution level.
    pub fn len_at_level(&self, level: u32) -> usize {
        self.levels
            .get(level as usize)
            .map_or(0, |l| l.nodes.len())
    }

    /// Total number of nodes across all levels.
    pub fn len(&self) -> usize {
        self.levels.iter().map(|l| l.nodes.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Get a node by handle.
    ///
    /// Handles are only minted by this forest and nodes are never removed.
    pub fn node(&self, handle: NodeHandle) -> &PyramidNode {
        &self.levels[handle.level as usize].nodes[handle.slot]
    }

    fn node_mut(&mut self, handle: NodeHandle) -> &mut PyramidNode {
        &mut self.levels[handle.level as usize].nodes[handle.slot]
    }

    /// Find the node with exactly this key.
    pub fn find(&self, key: NodeKey) -> Option<NodeHandle> {
        let level = self.levels.get(key.res_level as usize)?;
        let slot = *level.by_cell.get(&(key.grid_row, key.grid_col))?;
        Some(NodeHandle {
            level: key.res_level,
            slot,
        })
    }

    /// Find the node carrying `position_index` at `level`.
    pub fn find_by_position(&self, level: u32, position_index: usize) -> Option<NodeHandle> {
        let nodes = self.levels.get(level as usize)?;
        let slot = *nodes.by_position.get(&position_index)?;
        Some(NodeHandle { level, slot })
    }

    /// Nodes at a level in (row, col) order.
    pub fn nodes_at_level(&self, level: u32) -> impl Iterator<Item = &PyramidNode> + '_ {
        self.levels
            .get(level as usize)
            .into_iter()
            .flat_map(|l| l.by_cell.values().map(move |&slot| &l.nodes[slot]))
    }

    /// Insert a node at `key`, or return the existing one.
    ///
    /// A new node gets `position_index`; an existing node keeps its own.
    fn find_or_insert(&mut self, key: NodeKey, position_index: usize) -> NodeHandle {
        if let Some(handle) = self.find(key) {
            return handle;
        }

        let level = key.res_level as usize;
        while self.levels.len() <= level {
            debug!(level = self.levels.len(), "opening pyramid level");
            self.levels.push(LevelNodes::default());
        }

        trace!(
            level = key.res_level,
            row = key.grid_row,
            col = key.grid_col,
            position_index,
            "creating pyramid node"
        );
        let slot = self.levels[level].insert(PyramidNode::new(key, position_index));
        NodeHandle {
            level: key.res_level,
            slot,
        }
    }

    /// Full-resolution node for a tile at `(row, col)`.
    ///
    /// Tiles sharing a grid cell collapse onto the node created by the first
    /// of them, which carries that tile's index.
    pub fn full_res_node(&mut self, row: i64, col: i64, tile_index: usize) -> NodeHandle {
        self.find_or_insert(NodeKey::new(0, row, col), tile_index)
    }

    /// Walk up from `start`, creating and linking parents, until a node at
    /// `lowest_level` is reached.
    ///
    /// Existing parent links are followed as-is, so calling this again for the
    /// same node is cheap and changes nothing.
    pub fn link_to_level(&mut self, start: NodeHandle, lowest_level: u32) {
        let mut current = start;
        while current.level < lowest_level {
            if let Some(parent) = self.node(current).parent {
                current = parent;
                continue;
            }

            let parent_key = self.node(current).key.parent();
            let next_index = self.len_at_level(parent_key.res_level);
            let parent = self.find_or_insert(parent_key, next_index);

            self.node_mut(current).parent = Some(parent);
            self.node_mut(parent).child = Some(current);
            current = parent;
        }
    }

    /// Walk `levels_up` parent links from `start`.
    pub fn ancestor(&self, start: NodeHandle, levels_up: u32) -> Result<NodeHandle, IndexError> {
        let requested = start.level + levels_up;
        let mut current = start;
        for _ in 0..levels_up {
            let node = self.node(current);
            current = match node.parent {
                Some(parent) => parent,
                None => {
                    let err = IndexError::MissingParent {
                        requested,
                        level: node.key.res_level,
                        row: node.key.grid_row,
                        col: node.key.grid_col,
                    };
                    error!("{}", err);
                    return Err(err);
                }
            };
        }
        Ok(current)
    }

    /// Follow remembered children from `start` down to full resolution.
    ///
    /// Which full-resolution node is reached is unspecified when the cell
    /// covers more than one.
    pub fn descend_to_full_res(&self, start: NodeHandle) -> Result<NodeHandle, IndexError> {
        let mut current = start;
        while current.level > 0 {
            current = match self.node(current).child {
                Some(child) => child,
                None => {
                    let err = IndexError::MissingChild {
                        level: current.level,
                    };
                    error!("{}", err);
                    return Err(err);
                }
            };
        }
        Ok(current)
    }
}

// =============================================================================
// Tests
// =============================================================================
