//! Reconstruction tests.
//!
//! Tests verify:
//! - Rebuilding from a tile list reproduces incremental indices exactly
//! - Persisted properties survive a load/export cycle
//! - Malformed position lists are rejected before an index exists

use serde_json::json;

use tile_position_index::{
    Error, PositionIndex, PositionList, PositionListError, TilingGeometry,
};

use super::test_utils::{distinct, index_with, scattered_tiles, spiral_tiles};

fn node_table(index: &PositionIndex) -> Vec<Vec<(i64, i64, usize)>> {
    (0..index.num_res_levels() as u32)
        .map(|level| {
            index
                .nodes_at_level(level)
                .map(|n| (n.grid_row(), n.grid_col(), n.position_index()))
                .collect()
        })
        .collect()
}

// =============================================================================
// From Tiles
// =============================================================================

#[test]
fn test_rebuild_matches_incremental() {
    for tiles in [spiral_tiles(100), distinct(&scattered_tiles(150, 25, 5))] {
        let incremental = index_with(&tiles);
        let rebuilt = PositionIndex::from_tiles(
            TilingGeometry::default(),
            tiles.iter().copied(),
            incremental.num_res_levels() as u32 - 1,
        )
        .unwrap();

        assert_eq!(rebuilt.num_positions(), incremental.num_positions());
        assert_eq!(node_table(&rebuilt), node_table(&incremental));
        for tile in 0..tiles.len() {
            for level in 0..incremental.num_res_levels() as u32 {
                assert_eq!(
                    rebuilt.node_info(tile, level).unwrap(),
                    incremental.node_info(tile, level).unwrap()
                );
            }
        }
    }
}

#[test]
fn test_rebuild_extends_past_requested_level() {
    let index =
        PositionIndex::from_tiles(TilingGeometry::default(), vec![(0, 0), (0, 9)], 0).unwrap();
    assert_eq!(index.num_res_levels(), 5);
    assert_eq!(index.num_cols(), 10);
}

#[test]
fn test_rebuild_honours_deeper_max_level() {
    let index =
        PositionIndex::from_tiles(TilingGeometry::default(), vec![(0, 0), (0, 1)], 6).unwrap();
    assert_eq!(index.num_res_levels(), 7);
    assert_eq!(index.num_nodes_at_level(6), 1);
}

#[test]
fn test_rebuild_then_continue_acquiring() {
    let tiles = spiral_tiles(30);
    let mut rebuilt =
        PositionIndex::from_tiles(TilingGeometry::default(), tiles[..20].iter().copied(), 0)
            .unwrap();
    for &(row, col) in &tiles[20..] {
        rebuilt.register_tile(row, col);
    }

    let incremental = index_with(&tiles);
    assert_eq!(node_table(&rebuilt), node_table(&incremental));
}

#[test]
fn test_rebuild_empty() {
    let index = PositionIndex::from_tiles(TilingGeometry::default(), Vec::new(), 3).unwrap();
    assert_eq!(index.num_positions(), 0);
    assert_eq!(index.num_res_levels(), 0);
    assert_eq!(index.num_rows(), 0);
}

// =============================================================================
// From Position Lists
// =============================================================================

#[test]
fn test_position_list_round_trip() {
    let input = json!([
        {"GridRowIndex": 0, "GridColumnIndex": 0, "Properties": {"label": "a"}},
        {"GridRowIndex": 0, "GridColumnIndex": 1, "DeviceCoordinatesUm": {"XY": [10.0, 0.0]}},
        {"GridRowIndex": -1, "GridColumnIndex": 1}
    ]);
    let list = PositionList::from_value(input.clone()).unwrap();
    let mut index = PositionIndex::from_position_list(TilingGeometry::default(), list, 1).unwrap();

    assert_eq!(index.num_positions(), 3);
    assert_eq!(index.find_tile(-1, 1), Some(2));
    assert_eq!(index.tile(0).unwrap().properties()["Properties"], json!({"label": "a"}));
    assert_eq!(index.to_position_list().to_value(), input);

    index.register_tile(3, 3);
    let exported = index.to_position_list();
    assert_eq!(exported.len(), 4);
    assert_eq!(
        exported.to_value()[3],
        json!({"GridRowIndex": 3, "GridColumnIndex": 3})
    );
}

#[test]
fn test_duplicate_persisted_tiles_collapse() {
    let list = PositionList::from_json(
        r#"[
            {"GridRowIndex": 2, "GridColumnIndex": 2},
            {"GridRowIndex": 2, "GridColumnIndex": 3},
            {"GridRowIndex": 2, "GridColumnIndex": 2}
        ]"#,
    )
    .unwrap();
    let index = PositionIndex::from_position_list(TilingGeometry::default(), list, 0).unwrap();

    assert_eq!(index.num_positions(), 3);
    assert_eq!(index.num_nodes_at_level(0), 2);
    assert_eq!(index.low_res_position_index(2, 0).unwrap(), 0);
    assert_eq!(index.position_index_from_tile_position(0, 2, 2), Some(0));
    assert_eq!(index.find_tile(2, 2), Some(0));
}

#[test]
fn test_malformed_position_list_rejected() {
    let cases = [
        ("not json", "Invalid position list JSON"),
        (r#"{"GridRowIndex": 1}"#, "must be a JSON array"),
        (r#"[{"GridColumnIndex": 1}]"#, "missing field GridRowIndex"),
        (
            r#"[{"GridRowIndex": 1, "GridColumnIndex": null}]"#,
            "invalid GridColumnIndex",
        ),
    ];
    for (input, message) in cases {
        let err = PositionList::from_json(input).unwrap_err();
        assert!(
            err.to_string().contains(message),
            "{:?} -> {}",
            input,
            err
        );
    }
}

#[test]
fn test_bad_geometry_rejected_on_rebuild() {
    let list = PositionList::from_json(r#"[{"GridRowIndex": 0, "GridColumnIndex": 0}]"#).unwrap();
    let geometry = TilingGeometry::new(256, 256, 300, 0);
    let err = PositionIndex::from_position_list(geometry, list, 0).unwrap_err();
    assert!(matches!(err, Error::Geometry(_)));
}

#[test]
fn test_position_list_error_converts() {
    let err: Error = PositionListError::NotAnArray.into();
    assert!(err.to_string().starts_with("Position list error"));
}
