use thiserror::Error;

/// Errors raised when the position index finds its own invariants broken.
///
/// None of these describe a normal condition. Absence of a tile or node at a
/// coordinate is reported as `None` by the lookup APIs, never through this type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
    /// Full-resolution position index is past the end of the tile list
    #[error("Tile index out of range: requested {index}, {count} tile(s) registered")]
    TileOutOfRange { index: usize, count: usize },

    /// A registered tile was never attached to a level-0 pyramid node
    #[error("Tile {tile} has no full resolution pyramid node")]
    MissingFullResNode { tile: usize },

    /// Parent chain ended before the requested resolution level
    #[error(
        "Pyramid not built to level {requested}: node ({row}, {col}) at level {level} has no parent"
    )]
    MissingParent {
        requested: u32,
        level: u32,
        row: i64,
        col: i64,
    },

    /// No node carries the requested position index at that level
    #[error("No pyramid node with position index {position_index} at level {level}")]
    NodeNotFound { level: u32, position_index: usize },

    /// Child chain did not reach full resolution
    #[error("Pyramid node at level {level} has no child to descend through")]
    MissingChild { level: u32 },

    /// The lock guarding a shared index was poisoned by a panicking holder
    #[error("Position index lock poisoned")]
    LockPoisoned,
}

/// Errors raised while reading a persisted position list
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PositionListError {
    /// The input is not valid JSON
    #[error("Invalid position list JSON: {0}")]
    Json(String),

    /// The root value is not a JSON array
    #[error("Position list must be a JSON array")]
    NotAnArray,

    /// An entry is missing one of the grid index fields
    #[error("Position {index} is missing field {field}")]
    MissingField { index: usize, field: &'static str },

    /// A grid index field is not an integer that fits a tile coordinate
    #[error("Position {index} has invalid {field}: {value}")]
    InvalidField {
        index: usize,
        field: &'static str,
        value: String,
    },
}

impl From<serde_json::Error> for PositionListError {
    fn from(err: serde_json::Error) -> Self {
        PositionListError::Json(err.to_string())
    }
}

/// Errors describing an unusable tiling geometry
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeometryError {
    /// A tile dimension is zero
    #[error("{name} must be greater than 0")]
    ZeroTileSize { name: &'static str },

    /// Overlap leaves no unique pixels in a tile
    #[error("{name} ({overlap}) must be smaller than the full tile size ({tile})")]
    OverlapTooLarge {
        name: &'static str,
        overlap: u32,
        tile: u32,
    },
}

/// Errors converting between stage and pixel coordinates
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StageError {
    /// The pixel to stage transform has no inverse
    #[error("Stage transform is not invertible")]
    SingularTransform,

    /// Stage coordinates were used before a stage mapping was set
    #[error("No stage mapping configured for this index")]
    NotConfigured,
}

/// Top-level error for building and querying an index from external input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Invariant violation inside the index
    #[error("Index error: {0}")]
    Index(#[from] IndexError),

    /// Malformed persisted position list
    #[error("Position list error: {0}")]
    PositionList(#[from] PositionListError),

    /// Invalid tiling geometry
    #[error("Geometry error: {0}")]
    Geometry(#[from] GeometryError),

    /// Stage coordinate conversion failed
    #[error("Stage error: {0}")]
    Stage(#[from] StageError),
}
