//! Table type
//!
//! A [`Table`] is one snapshot of the on-screen review table: ordered
//! columns, ordered rows, and cells aligned positionally with the columns.

use std::collections::HashSet;

use crate::cell::Cell;
use crate::column::Column;
use crate::error::{Error, Result};
use crate::row::Row;

/// A review table snapshot
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase", default)
)]
pub struct Table {
    /// Columns in display order
    pub columns: Vec<Column>,
    /// Rows in display order
    pub rows: Vec<Row>,
}

impl Table {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table with the given columns and no rows
    pub fn with_columns<I: IntoIterator<Item = Column>>(columns: I) -> Self {
        Self {
            columns: columns.into_iter().collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row
    pub fn push_row(&mut self, row: Row) -> &mut Self {
        self.rows.push(row);
        self
    }

    /// Number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Iterate over every cell formulas can see: present, not hidden, and
    /// addressed. Rows come in display order, cells in column order.
    pub fn visible_cells(&self) -> impl Iterator<Item = &Cell> + '_ {
        self.rows
            .iter()
            .flat_map(Row::present_cells)
            .filter(|cell| cell.is_visible())
    }

    /// Check the table's data invariants
    ///
    /// Reports the first cell that is both an input and a formula, or the
    /// first address shared by two visible cells. Calculation never requires
    /// a valid table; this is a lint for callers that assemble snapshots.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();

        for cell in self.visible_cells() {
            let Some(addr) = cell.addr else { continue };

            if cell.is_input && cell.is_formula() {
                return Err(Error::InputFormulaConflict(addr.to_string()));
            }
            if !seen.insert(addr) {
                return Err(Error::DuplicateAddress(addr.to_string()));
            }
        }

        Ok(())
    }
}
