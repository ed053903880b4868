//! Multi-resolution pyramid of tile positions.
//!
//! Full-resolution tiles sit at level 0. Above them, each level holds one
//! node per grid cell that covers at least one acquired tile:
//!
//! ```text
//! level 2          (0,0)
//!                 /     \
//! level 1     (0,0)     (0,1)
//!             /  |        |
//! level 0  (0,0)(1,1)   (0,2)
//! ```
//!
//! Links point upward (`parent`) and, for one arbitrary covered cell, downward
//! (`child`). Nodes are created lazily and never removed.

mod forest;
mod node;

pub use forest::PyramidForest;
pub use node::{NodeHandle, NodeInfo, NodeKey, PyramidNode};
