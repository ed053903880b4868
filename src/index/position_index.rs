//! The multi-resolution tile position index.
//!
//! Tiles are registered by full-resolution grid `(row, col)` as they are
//! acquired. Registration appends to the tile list, so a tile's index never
//! changes, and then extends the pyramid until the grid extent fits in the
//! span of one cell at the coarsest level. A grid straddling row or column 0
//! still has several nodes there, since cells `-1` and `0` never merge.
//!
//! # Example
//!
//! ```
//! use tile_position_index::{PositionIndex, TilingGeometry};
//!
//! let mut index = PositionIndex::new(TilingGeometry::default()).unwrap();
//! assert_eq!(index.register_tile(0, 0), 0);
//! assert_eq!(index.register_tile(0, 1), 1);
//! assert_eq!(index.register_tile(0, 0), 0);
//!
//! // Both tiles share one node a level up
//! assert_eq!(index.low_res_position_index(1, 1).unwrap(), 0);
//! assert_eq!(index.position_index_from_tile_position(1, 0, 0), Some(0));
//! assert_eq!(index.position_index_from_tile_position(1, 5, 5), None);
//! ```

use serde_json::{Map, Value};
use tracing::{debug, error, warn};

use crate::error::{Error, GeometryError, IndexError, StageError};
use crate::geometry::TilingGeometry;
use crate::grid::{levels_to_single_cell, GridBounds, MAX_RES_LEVEL};
use crate::position_list::{PositionEntry, PositionList};
use crate::pyramid::{NodeHandle, NodeInfo, NodeKey, PyramidForest, PyramidNode};
use crate::stage::StageMapping;

use super::tile::TilePosition;

// =============================================================================
// PositionIndex
// =============================================================================

/// Acquired tile positions plus the pyramid of coarser positions above them.
///
/// Not synchronized; wrap in [`SharedPositionIndex`](super::SharedPositionIndex)
/// to share between an acquisition thread and readers.
#[derive(Debug, Clone)]
pub struct PositionIndex {
    geometry: TilingGeometry,

    /// Full-resolution tiles in registration order
    tiles: Vec<TilePosition>,

    forest: PyramidForest,

    /// Bounds over all registered tiles, `None` until the first registration
    bounds: Option<GridBounds>,

    /// Every tile before this one is linked up to `linked_level`
    linked_tiles: usize,
    linked_level: u32,

    stage: Option<StageMapping>,
}

impl PositionIndex {
    /// Create an empty index.
    pub fn new(geometry: TilingGeometry) -> Result<Self, GeometryError> {
        geometry.validate()?;
        Ok(Self {
            geometry,
            tiles: Vec::new(),
            forest: PyramidForest::new(),
            bounds: None,
            linked_tiles: 0,
            linked_level: 0,
            stage: None,
        })
    }

    /// Rebuild an index from a previously acquired tile list.
    ///
    /// Tiles keep their order, so their indices match the ones handed out when
    /// they were first registered. The pyramid is built down to at least
    /// `max_res_level`, and further if the grid extent requires it.
    pub fn from_tiles<I>(
        geometry: TilingGeometry,
        tiles: I,
        max_res_level: u32,
    ) -> Result<Self, GeometryError>
    where
        I: IntoIterator<Item = (i32, i32)>,
    {
        let mut index = Self::new(geometry)?;
        index.tiles = tiles
            .into_iter()
            .map(|(row, col)| TilePosition::new(row, col, Map::new()))
            .collect();
        index.rebuild(max_res_level);
        Ok(index)
    }

    /// Rebuild an index from a persisted position list, keeping each entry's
    /// properties.
    pub fn from_position_list(
        geometry: TilingGeometry,
        list: PositionList,
        max_res_level: u32,
    ) -> Result<Self, Error> {
        let mut index = Self::new(geometry)?;
        index.tiles = list
            .into_entries()
            .into_iter()
            .map(|entry| TilePosition::new(entry.row, entry.col, entry.properties))
            .collect();
        index.rebuild(max_res_level);
        Ok(index)
    }

    fn rebuild(&mut self, max_res_level: u32) {
        self.bounds = GridBounds::from_tiles(self.tiles.iter().map(|t| (t.row, t.col)));
        debug!(
            tiles = self.tiles.len(),
            max_res_level, "rebuilding position index"
        );
        self.ensure_pyramid_to_level(max_res_level);
        self.auto_extend_pyramid();
    }

    /// Tiling geometry supplied at construction.
    pub fn geometry(&self) -> &TilingGeometry {
        &self.geometry
    }

    // -------------------------------------------------------------------------
    // Registration
    // -------------------------------------------------------------------------

    /// Position index of the tile at `(row, col)`, registering it if unseen.
    pub fn register_tile(&mut self, row: i32, col: i32) -> usize {
        self.register_tile_with_properties(row, col, Map::new())
    }

    /// Like [`register_tile`](Self::register_tile), storing `properties` with
    /// a newly created tile. Properties are dropped if the tile already exists.
    pub fn register_tile_with_properties(
        &mut self,
        row: i32,
        col: i32,
        properties: Map<String, Value>,
    ) -> usize {
        if let Some(index) = self.find_tile(row, col) {
            return index;
        }
        let index = self.append_tile(row, col, properties);
        self.auto_extend_pyramid();
        index
    }

    /// Register a batch of tiles, extending the pyramid once at the end.
    ///
    /// Returns the position index of each pair, in input order.
    pub fn register_tiles(&mut self, tiles: &[(i32, i32)]) -> Vec<usize> {
        let before = self.tiles.len();
        let indices = tiles
            .iter()
            .map(|&(row, col)| match self.find_tile(row, col) {
                Some(index) => index,
                None => self.append_tile(row, col, Map::new()),
            })
            .collect();
        if self.tiles.len() > before {
            self.auto_extend_pyramid();
        }
        indices
    }

    /// Register the tile whose display area contains the absolute
    /// full-resolution display pixel `(x, y)`.
    pub fn register_tile_at_display_pixel(&mut self, x: i64, y: i64) -> usize {
        let (row, col) = self.geometry.tile_at_display_pixel(x, y);
        self.register_tile(row, col)
    }

    /// Register the tile containing stage position `(x, y)`.
    ///
    /// Fails only when no stage mapping has been set.
    pub fn register_tile_at_stage(&mut self, x: f64, y: f64) -> Result<usize, StageError> {
        let (px, py) = self.pixel_from_stage(x, y)?;
        Ok(self.register_tile_at_display_pixel(px, py))
    }

    fn append_tile(&mut self, row: i32, col: i32, properties: Map<String, Value>) -> usize {
        let index = self.tiles.len();
        self.tiles.push(TilePosition::new(row, col, properties));
        match self.bounds.as_mut() {
            Some(bounds) => bounds.include(row, col),
            None => self.bounds = Some(GridBounds::from_tile(row, col)),
        }
        debug!(row, col, index, "registered tile");
        index
    }

    /// Position index of an already registered tile at `(row, col)`.
    pub fn find_tile(&self, row: i32, col: i32) -> Option<usize> {
        self.tiles.iter().position(|t| t.row == row && t.col == col)
    }

    // -------------------------------------------------------------------------
    // Stage Coordinates
    // -------------------------------------------------------------------------

    /// Use `mapping` for every later stage coordinate conversion.
    pub fn set_stage_mapping(&mut self, mapping: StageMapping) {
        debug!(
            row = mapping.anchor().row,
            col = mapping.anchor().col,
            "stage mapping set"
        );
        self.stage = Some(mapping);
    }

    pub fn stage_mapping(&self) -> Option<&StageMapping> {
        self.stage.as_ref()
    }

    fn require_stage(&self) -> Result<&StageMapping, StageError> {
        self.stage.as_ref().ok_or_else(|| {
            error!("{}", StageError::NotConfigured);
            StageError::NotConfigured
        })
    }

    /// Absolute full-resolution display pixel at stage position `(x, y)`.
    pub fn pixel_from_stage(&self, x: f64, y: f64) -> Result<(i64, i64), StageError> {
        Ok(self.require_stage()?.pixel_from_stage(&self.geometry, x, y))
    }

    /// Stage position of an absolute full-resolution display pixel.
    pub fn stage_from_pixel(&self, x: i64, y: i64) -> Result<(f64, f64), StageError> {
        Ok(self.require_stage()?.stage_from_pixel(&self.geometry, x, y))
    }

    /// Stage position of the centre of grid cell `(row, col)`, acquired or not.
    pub fn stage_position(&self, row: i32, col: i32) -> Result<(f64, f64), StageError> {
        Ok(self
            .require_stage()?
            .stage_position_of_tile(&self.geometry, row, col))
    }

    /// Stage position of a registered tile.
    pub fn tile_stage_position(&self, full_res_position_index: usize) -> Result<(f64, f64), Error> {
        let tile = self.registered_tile(full_res_position_index)?;
        Ok(self.stage_position(tile.row, tile.col)?)
    }

    // -------------------------------------------------------------------------
    // Pyramid Maintenance
    // -------------------------------------------------------------------------

    /// Make sure every tile has an ancestor at `lowest_res_level`.
    ///
    /// Never removes nodes; asking for a level finer than one already built
    /// only links tiles that are not linked yet. Levels past
    /// [`MAX_RES_LEVEL`] are clamped to it.
    pub fn ensure_pyramid_to_level(&mut self, lowest_res_level: u32) {
        if lowest_res_level > MAX_RES_LEVEL {
            warn!(
                requested = lowest_res_level,
                max = MAX_RES_LEVEL,
                "clamping requested resolution level"
            );
        }
        let lowest_res_level = lowest_res_level.min(MAX_RES_LEVEL);
        let start = if lowest_res_level > self.linked_level {
            debug!(
                from = self.linked_level,
                to = lowest_res_level,
                "extending pyramid"
            );
            self.linked_level = lowest_res_level;
            0
        } else {
            self.linked_tiles
        };
        let target = self.linked_level;

        for i in start..self.tiles.len() {
            let handle = match self.tiles[i].node {
                Some(handle) => handle,
                None => {
                    let tile = &self.tiles[i];
                    let handle =
                        self.forest
                            .full_res_node(i64::from(tile.row), i64::from(tile.col), i);
                    self.tiles[i].node = Some(handle);
                    handle
                }
            };
            self.forest.link_to_level(handle, target);
        }
        self.linked_tiles = self.tiles.len();
    }

    /// Extend the pyramid until the grid extent fits in one cell's span.
    ///
    /// The target is the larger of the coarsest level already present and
    /// `ceil(log2(max(num_rows, num_cols)))`, so the pyramid only ever grows.
    pub fn auto_extend_pyramid(&mut self) {
        let grid_length = self.bounds.map_or(0, |b| b.grid_length());
        let present = (self.forest.level_count() as u32).saturating_sub(1);
        let target = present.max(levels_to_single_cell(grid_length));
        self.ensure_pyramid_to_level(target);
    }

    // -------------------------------------------------------------------------
    // Lookups
    // -------------------------------------------------------------------------

    /// Some full-resolution tile under the node with `low_res_position_index`
    /// at `res_level`.
    ///
    /// When the node covers several tiles, which one is returned is
    /// unspecified.
    pub fn full_res_position_index(
        &self,
        low_res_position_index: usize,
        res_level: u32,
    ) -> Result<usize, IndexError> {
        let handle = self
            .forest
            .find_by_position(res_level, low_res_position_index)
            .ok_or_else(|| {
                let err = IndexError::NodeNotFound {
                    level: res_level,
                    position_index: low_res_position_index,
                };
                error!("{}", err);
                err
            })?;
        let leaf = self.forest.descend_to_full_res(handle)?;
        Ok(self.forest.node(leaf).position_index())
    }

    /// Position index at `res_level` of the node covering a full-resolution tile.
    pub fn low_res_position_index(
        &self,
        full_res_position_index: usize,
        res_level: u32,
    ) -> Result<usize, IndexError> {
        Ok(self
            .node_at_level(full_res_position_index, res_level)?
            .position_index())
    }

    /// Grid row at `res_level` of the node covering a full-resolution tile.
    pub fn grid_row(
        &self,
        full_res_position_index: usize,
        res_level: u32,
    ) -> Result<i64, IndexError> {
        Ok(self
            .node_at_level(full_res_position_index, res_level)?
            .grid_row())
    }

    /// Grid column at `res_level` of the node covering a full-resolution tile.
    pub fn grid_col(
        &self,
        full_res_position_index: usize,
        res_level: u32,
    ) -> Result<i64, IndexError> {
        Ok(self
            .node_at_level(full_res_position_index, res_level)?
            .grid_col())
    }

    /// Key and position index at `res_level` of the node covering a
    /// full-resolution tile.
    pub fn node_info(
        &self,
        full_res_position_index: usize,
        res_level: u32,
    ) -> Result<NodeInfo, IndexError> {
        self.node_at_level(full_res_position_index, res_level)
            .map(NodeInfo::from)
    }

    fn node_at_level(
        &self,
        full_res_position_index: usize,
        res_level: u32,
    ) -> Result<&PyramidNode, IndexError> {
        let handle = self.full_res_handle(full_res_position_index)?;
        let handle = self.forest.ancestor(handle, res_level)?;
        Ok(self.forest.node(handle))
    }

    fn registered_tile(&self, full_res_position_index: usize) -> Result<&TilePosition, IndexError> {
        self.tiles.get(full_res_position_index).ok_or_else(|| {
            let err = IndexError::TileOutOfRange {
                index: full_res_position_index,
                count: self.tiles.len(),
            };
            error!("{}", err);
            err
        })
    }

    fn full_res_handle(&self, full_res_position_index: usize) -> Result<NodeHandle, IndexError> {
        let tile = self.registered_tile(full_res_position_index)?;
        tile.node.ok_or_else(|| {
            let err = IndexError::MissingFullResNode {
                tile: full_res_position_index,
            };
            error!("{}", err);
            err
        })
    }

    /// Position index of the node at `(res_level, grid_row, grid_col)`, or
    /// `None` if nothing has been acquired under that cell.
    pub fn position_index_from_tile_position(
        &self,
        res_level: u32,
        grid_row: i64,
        grid_col: i64,
    ) -> Option<usize> {
        let key = NodeKey::new(res_level, grid_row, grid_col);
        self.forest
            .find(key)
            .map(|handle| self.forest.node(handle).position_index())
    }

    // -------------------------------------------------------------------------
    // Extent
    // -------------------------------------------------------------------------

    /// Number of full-resolution rows spanned by acquired tiles.
    pub fn num_rows(&self) -> u64 {
        self.bounds.map_or(0, |b| b.num_rows())
    }

    /// Number of full-resolution columns spanned by acquired tiles.
    pub fn num_cols(&self) -> u64 {
        self.bounds.map_or(0, |b| b.num_cols())
    }

    pub fn min_row(&self) -> i32 {
        self.bounds.map_or(0, |b| b.min_row)
    }

    pub fn min_col(&self) -> i32 {
        self.bounds.map_or(0, |b| b.min_col)
    }

    pub fn max_row(&self) -> i32 {
        self.bounds.map_or(0, |b| b.max_row)
    }

    pub fn max_col(&self) -> i32 {
        self.bounds.map_or(0, |b| b.max_col)
    }

    /// Bounds over all registered tiles.
    pub fn bounds(&self) -> Option<GridBounds> {
        self.bounds
    }

    /// Number of registered full-resolution tiles.
    pub fn num_positions(&self) -> usize {
        self.tiles.len()
    }

    /// Number of resolution levels built, including full resolution.
    pub fn num_res_levels(&self) -> usize {
        self.forest.level_count()
    }

    /// Number of pyramid nodes at `res_level`.
    pub fn num_nodes_at_level(&self, res_level: u32) -> usize {
        self.forest.len_at_level(res_level)
    }

    /// Pyramid nodes at `res_level`, ordered by grid row then column.
    pub fn nodes_at_level(&self, res_level: u32) -> impl Iterator<Item = &PyramidNode> + '_ {
        self.forest.nodes_at_level(res_level)
    }

    /// The pyramid itself.
    pub fn forest(&self) -> &PyramidForest {
        &self.forest
    }

    pub fn tile(&self, full_res_position_index: usize) -> Option<&TilePosition> {
        self.tiles.get(full_res_position_index)
    }

    pub fn tiles(&self) -> &[TilePosition] {
        &self.tiles
    }

    /// Tile list in registration order, ready to be persisted.
    pub fn to_position_list(&self) -> PositionList {
        self.tiles
            .iter()
            .map(|t| PositionEntry {
                row: t.row,
                col: t.col,
                properties: t.properties.clone(),
            })
            .collect()
    }
}

// =============================================================================
// Tests
// =============================================================================
