use serde_json::{Map, Value};

use crate::pyramid::NodeHandle;

/// One acquired full-resolution tile.
///
/// The tile's position in the index's tile list is its full-resolution
/// position index. Properties belong to the caller and are never read by the
/// index.
#[derive(Debug, Clone, PartialEq)]
pub struct TilePosition {
    pub(crate) row: i32,
    pub(crate) col: i32,
    pub(crate) properties: Map<String, Value>,
    pub(crate) node: Option<NodeHandle>,
}

impl TilePosition {
    pub(crate) fn new(row: i32, col: i32, properties: Map<String, Value>) -> Self {
        Self {
            row,
            col,
            properties,
            node: None,
        }
    }

    /// Grid row at full resolution.
    pub fn row(&self) -> i32 {
        self.row
    }

    /// Grid column at full resolution.
    pub fn col(&self) -> i32 {
        self.col
    }

    /// Caller-supplied properties stored with the tile.
    pub fn properties(&self) -> &Map<String, Value> {
        &self.properties
    }

    /// Handle of the tile's level-0 pyramid node, once the pyramid has been built over it.
    pub fn node(&self) -> Option<NodeHandle> {
        self.node
    }
}
