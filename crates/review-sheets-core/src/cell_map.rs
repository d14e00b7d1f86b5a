//! Address-keyed views of a table
//!
//! [`build_cell_map`] normalizes a [`Table`] into a [`CellMap`] for the
//! calculation engine, and [`build_initial_inputs`] seeds the [`InputsMap`]
//! the UI edits. [`ComputedMap`] is what the engine hands back.

use std::collections::BTreeMap;
use std::fmt;

use crate::cell::{CellAddress, CellValue};
use crate::table::Table;

/// What the engine needs to know about one cell
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase", default)
)]
pub struct CellEntry {
    /// Literal value
    pub value: CellValue,
    /// Cell is edited by the user
    pub is_input: bool,
    /// Formula text, if any
    pub formula: Option<String>,
}

impl CellEntry {
    /// Check if this entry carries a formula
    pub fn is_formula(&self) -> bool {
        self.formula.is_some()
    }
}

/// Normalized view of a table snapshot keyed by address
pub type CellMap = BTreeMap<CellAddress, CellEntry>;

/// Current user-entered text keyed by address
pub type InputsMap = BTreeMap<CellAddress, String>;

/// Value produced by a formula cell
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(untagged)
)]
pub enum ComputedValue {
    /// Numeric result (booleans arrive here as 1 or 0)
    Number(f64),
    /// Text result
    Text(String),
}

impl ComputedValue {
    /// Get as number if this is a numeric result
    pub fn as_number(&self) -> Option<f64> {
        match self {
            ComputedValue::Number(n) => Some(*n),
            ComputedValue::Text(_) => None,
        }
    }

    /// Get as text if this is a text result
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ComputedValue::Text(s) => Some(s),
            ComputedValue::Number(_) => None,
        }
    }
}

impl fmt::Display for ComputedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComputedValue::Number(n) => write!(f, "{}", n),
            ComputedValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<ComputedValue> for CellValue {
    fn from(value: ComputedValue) -> Self {
        match value {
            ComputedValue::Number(n) => CellValue::Number(n),
            ComputedValue::Text(s) => CellValue::Text(s),
        }
    }
}

/// Formula results keyed by address
pub type ComputedMap = BTreeMap<CellAddress, ComputedValue>;

/// Build the address-keyed view of a table
///
/// Hidden and unaddressed cells are skipped. If two visible cells share an
/// address the later one wins.
pub fn build_cell_map(table: &Table) -> CellMap {
    let mut map = CellMap::new();
    for cell in table.visible_cells() {
        if let Some(addr) = cell.addr {
            map.insert(
                addr,
                CellEntry {
                    value: cell.value.clone(),
                    is_input: cell.is_input,
                    formula: cell.formula.clone(),
                },
            );
        }
    }
    map
}

/// Seed the inputs map from the table's input cells
///
/// Every visible input cell contributes its literal value rendered as text;
/// an empty value seeds the empty string.
pub fn build_initial_inputs(table: &Table) -> InputsMap {
    table
        .visible_cells()
        .filter(|cell| cell.is_input)
        .filter_map(|cell| cell.addr.map(|addr| (addr, cell.value.to_input_string())))
        .collect()
}
