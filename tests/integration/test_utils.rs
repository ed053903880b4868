//! Test utilities for integration tests.
//!
//! Builders for indices and tile sequences, plus checks that walk a whole
//! index and assert its structural invariants.

use std::collections::HashSet;

use tile_position_index::{parent_coordinate, PositionIndex, TilingGeometry};

// =============================================================================
// Builders
// =============================================================================

/// Empty index with default geometry.
pub fn empty_index() -> PositionIndex {
    PositionIndex::new(TilingGeometry::default()).expect("default geometry is valid")
}

/// Index with `tiles` registered one at a time, in order.
pub fn index_with(tiles: &[(i32, i32)]) -> PositionIndex {
    let mut index = empty_index();
    for &(row, col) in tiles {
        index.register_tile(row, col);
    }
    index
}

/// Tiles visited by an outward square spiral starting at `(0, 0)`.
///
/// This is the order an explore-style acquisition typically grows in.
pub fn spiral_tiles(count: usize) -> Vec<(i32, i32)> {
    let mut tiles = Vec::with_capacity(count);
    let (mut row, mut col) = (0i32, 0i32);
    let directions = [(0, 1), (1, 0), (0, -1), (-1, 0)];
    let mut leg = 1;
    let mut dir = 0;

    tiles.push((row, col));
    while tiles.len() < count {
        for _ in 0..2 {
            let (dr, dc) = directions[dir % 4];
            for _ in 0..leg {
                row += dr;
                col += dc;
                if tiles.len() < count {
                    tiles.push((row, col));
                }
            }
            dir += 1;
        }
        leg += 1;
    }
    tiles
}

/// Deterministic pseudo-random tiles in `[-span, span)` on both axes,
/// duplicates included.
pub fn scattered_tiles(count: usize, span: i32, seed: u64) -> Vec<(i32, i32)> {
    let mut state = seed;
    let mut next = move || {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        ((state >> 33) % (2 * span as u64)) as i32 - span
    };
    (0..count).map(|_| (next(), next())).collect()
}

// =============================================================================
// Invariant Checks
// =============================================================================

/// Assert that every linked node's parent is its floor-halved cell one level up.
pub fn assert_parent_law(index: &PositionIndex) {
    let forest = index.forest();
    for level in 0..index.num_res_levels() as u32 {
        for node in index.nodes_at_level(level) {
            if let Some(parent) = node.parent() {
                let parent = forest.node(parent);
                assert_eq!(parent.res_level(), level + 1);
                assert_eq!(parent.grid_row(), parent_coordinate(node.grid_row()));
                assert_eq!(parent.grid_col(), parent_coordinate(node.grid_col()));
                assert_eq!(parent.grid_row(), node.grid_row().div_euclid(2));
                assert_eq!(parent.grid_col(), node.grid_col().div_euclid(2));
            }
        }
    }
}

/// Assert that every node below the coarsest level is linked and that
/// position indices are dense and unique per level.
pub fn assert_fully_linked(index: &PositionIndex) {
    let levels = index.num_res_levels() as u32;
    for level in 0..levels {
        let mut seen = HashSet::new();
        for node in index.nodes_at_level(level) {
            if level + 1 < levels {
                assert!(
                    node.parent().is_some(),
                    "node {:?} has no parent",
                    node.key()
                );
            }
            assert!(seen.insert(node.position_index()));
        }
        if level > 0 {
            let count = index.num_nodes_at_level(level);
            assert_eq!(seen, (0..count).collect::<HashSet<_>>());
        }
    }
}

/// Distinct tiles in first-seen order.
pub fn distinct(tiles: &[(i32, i32)]) -> Vec<(i32, i32)> {
    let mut seen = HashSet::new();
    tiles.iter().copied().filter(|t| seen.insert(*t)).collect()
}
