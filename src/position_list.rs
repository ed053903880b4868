//! Persisted tile position lists.
//!
//! Acquisitions store their tiles as a JSON array, one object per tile in
//! registration order:
//!
//! ```json
//! [
//!   { "GridRowIndex": 0, "GridColumnIndex": 0, "Properties": {} },
//!   { "GridRowIndex": 0, "GridColumnIndex": 1, "Properties": {} }
//! ]
//! ```
//!
//! Only the two grid index fields are read. Everything else in an entry is
//! kept untouched as that tile's properties and written back on export.

use serde_json::{Map, Value};

use crate::error::PositionListError;

/// Field holding a tile's full-resolution grid row.
pub const GRID_ROW_KEY: &str = "GridRowIndex";

/// Field holding a tile's full-resolution grid column.
pub const GRID_COL_KEY: &str = "GridColumnIndex";

/// One persisted tile.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PositionEntry {
    pub row: i32,
    pub col: i32,

    /// Every field of the entry other than the grid indices
    pub properties: Map<String, Value>,
}

impl PositionEntry {
    pub fn new(row: i32, col: i32) -> Self {
        Self {
            row,
            col,
            properties: Map::new(),
        }
    }

    fn from_value(index: usize, value: Value) -> Result<Self, PositionListError> {
        let mut object = match value {
            Value::Object(object) => object,
            other => {
                return Err(PositionListError::InvalidField {
                    index,
                    field: "entry",
                    value: other.to_string(),
                })
            }
        };
        let row = take_grid_index(&mut object, index, GRID_ROW_KEY)?;
        let col = take_grid_index(&mut object, index, GRID_COL_KEY)?;
        Ok(Self {
            row,
            col,
            properties: object,
        })
    }

    fn to_value(&self) -> Value {
        let mut object = self.properties.clone();
        object.insert(GRID_ROW_KEY.to_string(), Value::from(self.row));
        object.insert(GRID_COL_KEY.to_string(), Value::from(self.col));
        Value::Object(object)
    }
}

fn take_grid_index(
    object: &mut Map<String, Value>,
    index: usize,
    field: &'static str,
) -> Result<i32, PositionListError> {
    let value = object
        .remove(field)
        .ok_or(PositionListError::MissingField { index, field })?;
    value
        .as_i64()
        .and_then(|v| i32::try_from(v).ok())
        .ok_or_else(|| PositionListError::InvalidField {
            index,
            field,
            value: value.to_string(),
        })
}

/// Ordered list of persisted tiles.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PositionList {
    entries: Vec<PositionEntry>,
}

impl PositionList {
    pub fn new(entries: Vec<PositionEntry>) -> Self {
        Self { entries }
    }

    /// Parse a position list from JSON text.
    pub fn from_json(json: &str) -> Result<Self, PositionListError> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Parse a position list from an already decoded JSON value.
    ///
    /// The whole list is validated before anything is returned.
    pub fn from_value(value: Value) -> Result<Self, PositionListError> {
        let Value::Array(items) = value else {
            return Err(PositionListError::NotAnArray);
        };
        let entries = items
            .into_iter()
            .enumerate()
            .map(|(index, item)| PositionEntry::from_value(index, item))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { entries })
    }

    pub fn to_value(&self) -> Value {
        Value::Array(self.entries.iter().map(PositionEntry::to_value).collect())
    }

    /// Serialize to compact JSON text.
    pub fn to_json(&self) -> String {
        self.to_value().to_string()
    }

    pub fn entries(&self) -> &[PositionEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<PositionEntry> {
        self.entries
    }

    /// `(row, col)` of each entry, in order.
    pub fn tiles(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.entries.iter().map(|e| (e.row, e.col))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<PositionEntry> for PositionList {
    fn from_iter<I: IntoIterator<Item = PositionEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
