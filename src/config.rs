//! Command-line configuration for the `tile-index` tool.
//!
//! Options can also be set through environment variables with the `TPI_`
//! prefix:
//!
//! - `TPI_POSITIONS` - Path to a position list JSON file (`-` for stdin)
//! - `TPI_MAX_LEVEL` - Coarsest resolution level to build at least (default: 0)
//! - `TPI_TILE_WIDTH` / `TPI_TILE_HEIGHT` - Full tile size in pixels (default: 512)
//! - `TPI_OVERLAP_X` / `TPI_OVERLAP_Y` - Tile overlap in pixels (default: 0)

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::error::GeometryError;
use crate::geometry::{TilingGeometry, DEFAULT_TILE_HEIGHT, DEFAULT_TILE_WIDTH};
pub use crate::grid::MAX_RES_LEVEL;

// =============================================================================
// Default Values
// =============================================================================

/// Default coarsest level to build beyond what the grid extent requires.
pub const DEFAULT_MAX_LEVEL: u32 = 0;

// =============================================================================
// CLI Arguments
// =============================================================================

/// Tile Index - inspect the resolution pyramid of an acquired tile grid.
#[derive(Parser, Debug, Clone)]
#[command(name = "tile-index")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print the extent and per-level node counts of a position list.
    Summary(SummaryConfig),

    /// Look up the pyramid node covering one tile.
    Lookup(LookupConfig),
}

/// Options shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct IndexArgs {
    /// Position list JSON file, or `-` to read stdin.
    #[arg(long, env = "TPI_POSITIONS")]
    pub positions: PathBuf,

    /// Build the pyramid at least down to this resolution level.
    #[arg(long, default_value_t = DEFAULT_MAX_LEVEL, env = "TPI_MAX_LEVEL")]
    pub max_level: u32,

    #[command(flatten)]
    pub geometry: GeometryArgs,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl IndexArgs {
    pub fn validate(&self) -> Result<(), String> {
        if self.max_level > MAX_RES_LEVEL {
            return Err(format!("max_level must be at most {}", MAX_RES_LEVEL));
        }
        self.geometry.validate()
    }

    /// Whether the position list should be read from stdin.
    pub fn reads_stdin(&self) -> bool {
        self.positions.as_os_str() == "-"
    }
}

/// Tile size and overlap of the acquisition.
#[derive(Args, Debug, Clone)]
pub struct GeometryArgs {
    /// Full tile width in pixels.
    #[arg(long, default_value_t = DEFAULT_TILE_WIDTH, env = "TPI_TILE_WIDTH")]
    pub tile_width: u32,

    /// Full tile height in pixels.
    #[arg(long, default_value_t = DEFAULT_TILE_HEIGHT, env = "TPI_TILE_HEIGHT")]
    pub tile_height: u32,

    /// Horizontal overlap between neighbouring tiles in pixels.
    #[arg(long, default_value_t = 0, env = "TPI_OVERLAP_X")]
    pub overlap_x: u32,

    /// Vertical overlap between neighbouring tiles in pixels.
    #[arg(long, default_value_t = 0, env = "TPI_OVERLAP_Y")]
    pub overlap_y: u32,
}

impl GeometryArgs {
    pub fn validate(&self) -> Result<(), String> {
        self.to_geometry().map(|_| ()).map_err(|e| e.to_string())
    }

    /// Build a validated tiling geometry.
    pub fn to_geometry(&self) -> Result<TilingGeometry, GeometryError> {
        let geometry = TilingGeometry::new(
            self.tile_width,
            self.tile_height,
            self.overlap_x,
            self.overlap_y,
        );
        geometry.validate()?;
        Ok(geometry)
    }
}

/// `summary` subcommand.
#[derive(Args, Debug, Clone)]
pub struct SummaryConfig {
    #[command(flatten)]
    pub index: IndexArgs,

    /// Print the summary as JSON.
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

/// `lookup` subcommand.
#[derive(Args, Debug, Clone)]
pub struct LookupConfig {
    #[command(flatten)]
    pub index: IndexArgs,

    /// Full-resolution position index of the tile.
    #[arg(long)]
    pub tile: usize,

    /// Resolution level to look up.
    #[arg(long, default_value_t = 0)]
    pub level: u32,
}

impl LookupConfig {
    pub fn validate(&self) -> Result<(), String> {
        self.index.validate()?;
        if self.level > MAX_RES_LEVEL {
            return Err(format!("level must be at most {}", MAX_RES_LEVEL));
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
