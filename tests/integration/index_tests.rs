//! Registration and extent tests.
//!
//! Tests verify:
//! - Registering a tile twice returns the same index without growing the list
//! - Indices are handed out in registration order and never change
//! - Extent always matches the min/max over every registered tile
//! - Absent cells report `None` rather than failing

use tile_position_index::{IndexError, NodeKey, PositionIndex, TilingGeometry};

use super::test_utils::{distinct, empty_index, index_with, scattered_tiles, spiral_tiles};

// =============================================================================
// Registration
// =============================================================================

#[test]
fn test_registration_is_idempotent() {
    let mut index = empty_index();
    let first = index.register_tile(-4, 9);
    let count = index.num_positions();
    let levels = index.num_res_levels();

    let second = index.register_tile(-4, 9);
    assert_eq!(first, second);
    assert_eq!(index.num_positions(), count);
    assert_eq!(index.num_res_levels(), levels);
}

#[test]
fn test_indices_are_stable_over_long_acquisition() {
    let tiles = spiral_tiles(400);
    let mut index = empty_index();
    let mut assigned = Vec::new();

    for (i, &(row, col)) in tiles.iter().enumerate() {
        let position = index.register_tile(row, col);
        assert_eq!(position, i);
        assigned.push(position);

        // Every earlier tile keeps its index
        if i % 50 == 0 {
            for (j, &(r, c)) in tiles[..=i].iter().enumerate() {
                assert_eq!(index.find_tile(r, c), Some(assigned[j]));
            }
        }
    }
}

#[test]
fn test_scattered_registration_with_duplicates() {
    let tiles = scattered_tiles(500, 20, 7);
    let unique = distinct(&tiles);
    let mut index = empty_index();

    for &(row, col) in &tiles {
        let position = index.register_tile(row, col);
        assert_eq!(unique[position], (row, col));
    }
    assert_eq!(index.num_positions(), unique.len());
}

#[test]
fn test_batch_matches_single_registration() {
    let tiles = scattered_tiles(120, 10, 42);

    let single = index_with(&tiles);
    let mut batch = empty_index();
    let indices = batch.register_tiles(&tiles);

    for (i, &(row, col)) in tiles.iter().enumerate() {
        assert_eq!(single.find_tile(row, col), Some(indices[i]));
    }
    for level in 0..single.num_res_levels() as u32 {
        let a: Vec<_> = single.nodes_at_level(level).map(|n| (n.key(), n.position_index())).collect();
        let b: Vec<_> = batch.nodes_at_level(level).map(|n| (n.key(), n.position_index())).collect();
        assert_eq!(a, b, "level {}", level);
    }
}

#[test]
fn test_register_at_display_pixel_uses_display_size() {
    let mut index = PositionIndex::new(TilingGeometry::new(1100, 1100, 100, 100)).unwrap();

    assert_eq!(index.register_tile_at_display_pixel(500, 500), 0);
    assert_eq!(index.register_tile_at_display_pixel(1500, 999), 1);
    assert_eq!(index.register_tile_at_display_pixel(-1, 0), 2);

    let tiles: Vec<_> = index.tiles().iter().map(|t| (t.row(), t.col())).collect();
    assert_eq!(tiles, vec![(0, 0), (0, 1), (0, -1)]);
}

// =============================================================================
// Extent
// =============================================================================

#[test]
fn test_bounds_match_brute_force() {
    let tiles = scattered_tiles(300, 50, 99);
    let mut index = empty_index();

    for (i, &(row, col)) in tiles.iter().enumerate() {
        index.register_tile(row, col);
        let seen = &tiles[..=i];
        let min_row = seen.iter().map(|t| t.0).min().unwrap();
        let max_row = seen.iter().map(|t| t.0).max().unwrap();
        let min_col = seen.iter().map(|t| t.1).min().unwrap();
        let max_col = seen.iter().map(|t| t.1).max().unwrap();

        assert_eq!(index.num_rows(), (1 + max_row - min_row) as u64);
        assert_eq!(index.num_cols(), (1 + max_col - min_col) as u64);
        assert_eq!(index.min_row(), min_row);
        assert_eq!(index.min_col(), min_col);
    }
}

#[test]
fn test_bounds_do_not_include_origin() {
    let index = index_with(&[(100, 200), (101, 203)]);
    assert_eq!(index.min_row(), 100);
    assert_eq!(index.min_col(), 200);
    assert_eq!(index.num_rows(), 2);
    assert_eq!(index.num_cols(), 4);
    assert_eq!(index.num_res_levels(), 3);
}

// =============================================================================
// Lookups
// =============================================================================

#[test]
fn test_absent_cell_is_none() {
    let index = index_with(&[(0, 0), (5, 5)]);
    assert_eq!(index.position_index_from_tile_position(0, 1, 1), None);
    assert_eq!(index.position_index_from_tile_position(1, 1, 1), None);
    assert_eq!(index.position_index_from_tile_position(9, 0, 0), None);
    assert_eq!(index.position_index_from_tile_position(0, 5, 5), Some(1));
}

#[test]
fn test_lookup_errors_are_reported() {
    let index = index_with(&[(0, 0)]);
    assert_eq!(
        index.low_res_position_index(1, 0),
        Err(IndexError::TileOutOfRange { index: 1, count: 1 })
    );
    assert!(matches!(
        index.grid_col(0, 1),
        Err(IndexError::MissingParent { requested: 1, .. })
    ));
    assert_eq!(
        index.full_res_position_index(0, 3),
        Err(IndexError::NodeNotFound {
            level: 3,
            position_index: 0
        })
    );
}

#[test]
fn test_node_info_reports_key() {
    let index = index_with(&[(6, -5), (0, 0)]);
    let info = index.node_info(0, 2).unwrap();
    assert_eq!(info.key, NodeKey::new(2, 1, -2));
    assert_eq!(index.grid_row(0, 2).unwrap(), 1);
    assert_eq!(index.grid_col(0, 2).unwrap(), -2);
    assert_eq!(info.position_index, index.low_res_position_index(0, 2).unwrap());
}
