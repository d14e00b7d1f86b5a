//! Row types

use crate::cell::Cell;

/// A table row
///
/// Cells are aligned positionally with the table's columns; `None` marks a
/// position covered by a span or left empty.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase", default)
)]
pub struct Row {
    /// Caller-side row identifier
    pub key: Option<String>,
    /// Cells in column order
    pub cells: Vec<Option<Cell>>,
    /// Row was inserted at runtime; its addresses come from the caller's
    /// address counter rather than the sheet template
    pub is_virtual: bool,
}

impl Row {
    /// Create a row from its cells
    pub fn new<I: IntoIterator<Item = Cell>>(cells: I) -> Self {
        Self {
            cells: cells.into_iter().map(Some).collect(),
            ..Self::default()
        }
    }

    /// Create a runtime-inserted row
    pub fn new_virtual<I: IntoIterator<Item = Cell>>(cells: I) -> Self {
        Self {
            is_virtual: true,
            ..Self::new(cells)
        }
    }

    /// Set the caller-side key
    pub fn with_key<S: Into<String>>(mut self, key: S) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Get a cell by column position
    pub fn cell(&self, col: usize) -> Option<&Cell> {
        self.cells.get(col).and_then(Option::as_ref)
    }

    /// Iterate over the cells that are present
    pub fn present_cells(&self) -> impl Iterator<Item = &Cell> + '_ {
        self.cells.iter().flatten()
    }

    /// Number of positions in the row
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }
}
