//! Mapping between stage coordinates and stitched display pixels.
//!
//! The XY stage reports positions in micrometres. A 2x2 matrix turns a pixel
//! displacement into a stage displacement, and one anchor tile with a known
//! stage position fixes the translation. Stage positions always refer to the
//! centre of a tile's display area.
//!
//! ```text
//!   stage = anchor_stage + M * (pixel - anchor_centre_pixel)
//!   anchor_centre_pixel = ((col + 0.5) * display_w, (row + 0.5) * display_h)
//! ```

use serde::{Deserialize, Serialize};

use crate::error::StageError;
use crate::geometry::TilingGeometry;

// =============================================================================
// StageTransform
// =============================================================================

/// Linear part of the pixel to stage mapping.
///
/// `stage_dx = m00 * dx + m01 * dy`, `stage_dy = m10 * dx + m11 * dy`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StageTransform {
    pub m00: f64,
    pub m01: f64,
    pub m10: f64,
    pub m11: f64,
}

impl StageTransform {
    pub fn new(m00: f64, m01: f64, m10: f64, m11: f64) -> Self {
        Self { m00, m01, m10, m11 }
    }

    /// Axis-aligned transform with square pixels of `um_per_pixel`.
    pub fn scale(um_per_pixel: f64) -> Self {
        Self::new(um_per_pixel, 0.0, 0.0, um_per_pixel)
    }

    pub fn determinant(&self) -> f64 {
        self.m00 * self.m11 - self.m01 * self.m10
    }

    /// Stage displacement of a pixel displacement.
    pub fn apply(&self, dx: f64, dy: f64) -> (f64, f64) {
        (
            self.m00 * dx + self.m01 * dy,
            self.m10 * dx + self.m11 * dy,
        )
    }

    /// The transform taking stage displacements back to pixel displacements.
    pub fn inverse(&self) -> Result<Self, StageError> {
        let det = self.determinant();
        if det == 0.0 || !det.is_finite() {
            return Err(StageError::SingularTransform);
        }
        Ok(Self::new(
            self.m11 / det,
            -self.m01 / det,
            -self.m10 / det,
            self.m00 / det,
        ))
    }
}

// =============================================================================
// StageMapping
// =============================================================================

/// Tile whose stage position is known.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StageAnchor {
    pub row: i32,
    pub col: i32,
    pub stage_x: f64,
    pub stage_y: f64,
}

impl StageAnchor {
    pub fn new(row: i32, col: i32, stage_x: f64, stage_y: f64) -> Self {
        Self {
            row,
            col,
            stage_x,
            stage_y,
        }
    }
}

/// Invertible pixel to stage mapping anchored at one tile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageMapping {
    transform: StageTransform,
    inverse: StageTransform,
    anchor: StageAnchor,
}

impl StageMapping {
    /// Fails if `transform` cannot be inverted.
    pub fn new(transform: StageTransform, anchor: StageAnchor) -> Result<Self, StageError> {
        let inverse = transform.inverse()?;
        Ok(Self {
            transform,
            inverse,
            anchor,
        })
    }

    pub fn transform(&self) -> &StageTransform {
        &self.transform
    }

    pub fn anchor(&self) -> &StageAnchor {
        &self.anchor
    }

    fn anchor_centre(&self, geometry: &TilingGeometry) -> (f64, f64) {
        (
            (f64::from(self.anchor.col) + 0.5) * f64::from(geometry.display_tile_width),
            (f64::from(self.anchor.row) + 0.5) * f64::from(geometry.display_tile_height),
        )
    }

    /// Absolute full-resolution display pixel at a stage position.
    ///
    /// Fractional pixels are floored.
    pub fn pixel_from_stage(&self, geometry: &TilingGeometry, x: f64, y: f64) -> (i64, i64) {
        let (cx, cy) = self.anchor_centre(geometry);
        let (dx, dy) = self
            .inverse
            .apply(x - self.anchor.stage_x, y - self.anchor.stage_y);
        ((cx + dx).floor() as i64, (cy + dy).floor() as i64)
    }

    /// Stage position of an absolute full-resolution display pixel.
    pub fn stage_from_pixel(&self, geometry: &TilingGeometry, x: i64, y: i64) -> (f64, f64) {
        let (cx, cy) = self.anchor_centre(geometry);
        let (dx, dy) = self.transform.apply(x as f64 - cx, y as f64 - cy);
        (self.anchor.stage_x + dx, self.anchor.stage_y + dy)
    }

    /// Stage position of the centre of tile `(row, col)`.
    ///
    /// Neighbouring tiles are one full tile minus the overlap apart.
    pub fn stage_position_of_tile(&self, geometry: &TilingGeometry, row: i32, col: i32) -> (f64, f64) {
        let (step_x, step_y) = geometry.tile_step();
        let dx = (i64::from(col) - i64::from(self.anchor.col)) as f64 * f64::from(step_x);
        let dy = (i64::from(row) - i64::from(self.anchor.row)) as f64 * f64::from(step_y);
        let (sx, sy) = self.transform.apply(dx, dy);
        (self.anchor.stage_x + sx, self.anchor.stage_y + sy)
    }
}

// =============================================================================
// Tests
// =============================================================================
