//! Tiling geometry of an acquisition.
//!
//! The pyramid topology does not depend on these values. They are carried by
//! the index so that stitching and display code can ask one object for both
//! positions and tile sizes.

use serde::{Deserialize, Serialize};

use crate::error::GeometryError;

/// Default full tile width in pixels.
pub const DEFAULT_TILE_WIDTH: u32 = 512;

/// Default full tile height in pixels.
pub const DEFAULT_TILE_HEIGHT: u32 = 512;

/// Pixel sizes of acquired and displayed tiles.
///
/// Full tiles are what the camera records; display tiles are what remains
/// after cropping the overlap shared with neighbouring tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TilingGeometry {
    pub display_tile_width: u32,
    pub display_tile_height: u32,
    pub full_tile_width: u32,
    pub full_tile_height: u32,
    pub overlap_x: u32,
    pub overlap_y: u32,
}

impl Default for TilingGeometry {
    fn default() -> Self {
        Self::without_overlap(DEFAULT_TILE_WIDTH, DEFAULT_TILE_HEIGHT)
    }
}

impl TilingGeometry {
    /// Geometry for tiles of `full_width` x `full_height` overlapping by
    /// `overlap_x` / `overlap_y` pixels with their neighbours.
    pub fn new(full_width: u32, full_height: u32, overlap_x: u32, overlap_y: u32) -> Self {
        Self {
            display_tile_width: full_width.saturating_sub(overlap_x),
            display_tile_height: full_height.saturating_sub(overlap_y),
            full_tile_width: full_width,
            full_tile_height: full_height,
            overlap_x,
            overlap_y,
        }
    }

    /// Geometry for tiles that do not overlap.
    pub fn without_overlap(width: u32, height: u32) -> Self {
        Self::new(width, height, 0, 0)
    }

    /// Check that every tile keeps at least one pixel of its own.
    ///
    /// Full sizes are checked first, then overlaps, then the display sizes
    /// derived from them.
    pub fn validate(&self) -> Result<(), GeometryError> {
        check_nonzero("full_tile_width", self.full_tile_width)?;
        check_nonzero("full_tile_height", self.full_tile_height)?;

        if self.overlap_x >= self.full_tile_width {
            return Err(GeometryError::OverlapTooLarge {
                name: "overlap_x",
                overlap: self.overlap_x,
                tile: self.full_tile_width,
            });
        }
        if self.overlap_y >= self.full_tile_height {
            return Err(GeometryError::OverlapTooLarge {
                name: "overlap_y",
                overlap: self.overlap_y,
                tile: self.full_tile_height,
            });
        }

        check_nonzero("display_tile_width", self.display_tile_width)?;
        check_nonzero("display_tile_height", self.display_tile_height)
    }

    /// Distance in full-resolution pixels between the origins of neighbouring
    /// tiles, `(x, y)`.
    pub fn tile_step(&self) -> (u32, u32) {
        (
            self.full_tile_width.saturating_sub(self.overlap_x),
            self.full_tile_height.saturating_sub(self.overlap_y),
        )
    }

    /// Tile `(row, col)` whose display area contains the absolute
    /// full-resolution display pixel `(x, y)`.
    ///
    /// Tile `(0, 0)` spans pixels `0..display_tile_width` horizontally;
    /// coordinates left of or above it map to negative rows and columns.
    pub fn tile_at_display_pixel(&self, x: i64, y: i64) -> (i32, i32) {
        let row = nearest_tile(y, self.display_tile_height);
        let col = nearest_tile(x, self.display_tile_width);
        (row, col)
    }
}

fn check_nonzero(name: &'static str, size: u32) -> Result<(), GeometryError> {
    if size == 0 {
        return Err(GeometryError::ZeroTileSize { name });
    }
    Ok(())
}

/// Index of the tile whose centre is nearest to `pixel`, i.e.
/// `floor(pixel / size)`, saturated to the tile coordinate range.
fn nearest_tile(pixel: i64, size: u32) -> i32 {
    let index = pixel.div_euclid(i64::from(size.max(1)));
    index.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}
