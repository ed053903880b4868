//! Tile position index.
//!
//! - [`PositionIndex`]: acquired tiles and their pyramid, single-threaded
//! - [`SharedPositionIndex`]: the same behind one coarse lock
//! - [`TilePosition`]: one acquired full-resolution tile

mod position_index;
mod shared;
mod tile;

pub use position_index::PositionIndex;
pub use shared::SharedPositionIndex;
pub use tile::TilePosition;
