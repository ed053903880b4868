//! Thread-safe handle to a position index.
//!
//! Acquisition callbacks register tiles from one thread while display and
//! storage code read positions from others. A single lock covers the whole
//! index and every call holds it for its full duration.

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::error;

use crate::error::{Error, IndexError};
use crate::position_list::PositionList;
use crate::pyramid::NodeInfo;
use crate::stage::StageMapping;

use super::position_index::PositionIndex;

/// Cloneable, lock-guarded [`PositionIndex`].
///
/// # Example
///
/// ```
/// use std::thread;
/// use tile_position_index::{PositionIndex, SharedPositionIndex, TilingGeometry};
///
/// let index = SharedPositionIndex::new(PositionIndex::new(TilingGeometry::default()).unwrap());
///
/// let writer = index.clone();
/// thread::spawn(move || writer.register_tile(0, 1).unwrap())
///     .join()
///     .unwrap();
///
/// assert_eq!(index.num_positions().unwrap(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct SharedPositionIndex {
    inner: Arc<Mutex<PositionIndex>>,
}

impl SharedPositionIndex {
    pub fn new(index: PositionIndex) -> Self {
        Self {
            inner: Arc::new(Mutex::new(index)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, PositionIndex>, IndexError> {
        self.inner.lock().map_err(|_| {
            error!("position index lock poisoned");
            IndexError::LockPoisoned
        })
    }

    /// Run `f` with shared access to the index, holding the lock throughout.
    pub fn read<R>(&self, f: impl FnOnce(&PositionIndex) -> R) -> Result<R, IndexError> {
        Ok(f(&*self.lock()?))
    }

    /// Run `f` with exclusive access to the index, holding the lock throughout.
    pub fn write<R>(&self, f: impl FnOnce(&mut PositionIndex) -> R) -> Result<R, IndexError> {
        Ok(f(&mut *self.lock()?))
    }

    pub fn register_tile(&self, row: i32, col: i32) -> Result<usize, IndexError> {
        self.write(|index| index.register_tile(row, col))
    }

    pub fn register_tiles(&self, tiles: &[(i32, i32)]) -> Result<Vec<usize>, IndexError> {
        self.write(|index| index.register_tiles(tiles))
    }

    pub fn set_stage_mapping(&self, mapping: StageMapping) -> Result<(), IndexError> {
        self.write(|index| index.set_stage_mapping(mapping))
    }

    /// Register the tile containing a stage position.
    pub fn register_tile_at_stage(&self, x: f64, y: f64) -> Result<usize, Error> {
        Ok(self.lock()?.register_tile_at_stage(x, y)?)
    }

    pub fn ensure_pyramid_to_level(&self, lowest_res_level: u32) -> Result<(), IndexError> {
        self.write(|index| index.ensure_pyramid_to_level(lowest_res_level))
    }

    pub fn full_res_position_index(
        &self,
        low_res_position_index: usize,
        res_level: u32,
    ) -> Result<usize, IndexError> {
        self.lock()?
            .full_res_position_index(low_res_position_index, res_level)
    }

    pub fn low_res_position_index(
        &self,
        full_res_position_index: usize,
        res_level: u32,
    ) -> Result<usize, IndexError> {
        self.lock()?
            .low_res_position_index(full_res_position_index, res_level)
    }

    pub fn grid_row(&self, full_res_position_index: usize, res_level: u32) -> Result<i64, IndexError> {
        self.lock()?.grid_row(full_res_position_index, res_level)
    }

    pub fn grid_col(&self, full_res_position_index: usize, res_level: u32) -> Result<i64, IndexError> {
        self.lock()?.grid_col(full_res_position_index, res_level)
    }

    pub fn node_info(
        &self,
        full_res_position_index: usize,
        res_level: u32,
    ) -> Result<NodeInfo, IndexError> {
        self.lock()?.node_info(full_res_position_index, res_level)
    }

    /// Position index at a grid cell; the outer `Result` only fails on a
    /// poisoned lock.
    pub fn position_index_from_tile_position(
        &self,
        res_level: u32,
        grid_row: i64,
        grid_col: i64,
    ) -> Result<Option<usize>, IndexError> {
        self.read(|index| index.position_index_from_tile_position(res_level, grid_row, grid_col))
    }

    pub fn num_rows(&self) -> Result<u64, IndexError> {
        self.read(PositionIndex::num_rows)
    }

    pub fn num_cols(&self) -> Result<u64, IndexError> {
        self.read(PositionIndex::num_cols)
    }

    pub fn min_row(&self) -> Result<i32, IndexError> {
        self.read(PositionIndex::min_row)
    }

    pub fn min_col(&self) -> Result<i32, IndexError> {
        self.read(PositionIndex::min_col)
    }

    pub fn num_positions(&self) -> Result<usize, IndexError> {
        self.read(PositionIndex::num_positions)
    }

    pub fn num_res_levels(&self) -> Result<usize, IndexError> {
        self.read(PositionIndex::num_res_levels)
    }

    /// Snapshot of the tile list for persistence.
    pub fn to_position_list(&self) -> Result<PositionList, IndexError> {
        self.read(PositionIndex::to_position_list)
    }
}

impl From<PositionIndex> for SharedPositionIndex {
    fn from(index: PositionIndex) -> Self {
        Self::new(index)
    }
}
