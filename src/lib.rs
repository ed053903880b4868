//! # Tile Position Index
//!
//! Multi-resolution position index for tiled (stitched) microscopy
//! acquisitions.
//!
//! As tiles are acquired at full-resolution grid positions `(row, col)`, the
//! index assigns each a stable position index and lazily builds a pyramid of
//! coarser positions above them. Level `L + 1` halves level `L` in both axes,
//! and every coarse cell covering at least one acquired tile gets its own
//! stable position index within its level.
//!
//! ## Architecture
//!
//! - [`index`] - The position index and its thread-safe handle
//! - [`pyramid`] - Pyramid nodes and the arena holding them
//! - [`grid`] - Parent-cell arithmetic and grid bounds
//! - [`geometry`] - Tile sizes and overlap carried alongside the index
//! - [`position_list`] - Persisted tile lists
//! - [`stage`] - Stage micrometres to stitched pixel mapping
//! - [`config`] - CLI configuration for the `tile-index` tool
//!
//! ## Example
//!
//! ```rust
//! use tile_position_index::{PositionIndex, TilingGeometry};
//!
//! let mut index = PositionIndex::new(TilingGeometry::new(512, 512, 32, 32)).unwrap();
//! for (row, col) in [(0, 0), (0, 1), (1, 0), (1, 1)] {
//!     index.register_tile(row, col);
//! }
//!
//! // All four tiles sit under a single node one level up
//! assert_eq!(index.num_res_levels(), 2);
//! assert_eq!(index.low_res_position_index(3, 1).unwrap(), 0);
//! assert_eq!(index.grid_row(3, 1).unwrap(), 0);
//! ```

pub mod config;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod index;
pub mod position_list;
pub mod pyramid;
pub mod stage;

// Re-export commonly used types
pub use config::{Cli, Command, GeometryArgs, IndexArgs, LookupConfig, SummaryConfig};
pub use error::{Error, GeometryError, IndexError, PositionListError, StageError};
pub use geometry::TilingGeometry;
pub use grid::{
    levels_to_single_cell, parent_cell, parent_coordinate, GridBounds, MAX_RES_LEVEL,
};
pub use index::{PositionIndex, SharedPositionIndex, TilePosition};
pub use position_list::{PositionEntry, PositionList, GRID_COL_KEY, GRID_ROW_KEY};
pub use pyramid::{NodeHandle, NodeInfo, NodeKey, PyramidForest, PyramidNode};
pub use stage::{StageAnchor, StageMapping, StageTransform};
