//! # review-sheets-core
//!
//! Core data structures for the review-sheets formula engine.
//!
//! This crate provides the fundamental types used throughout review-sheets:
//! - [`CellAddress`] and [`CellRange`] - A1 addressing and rectangular ranges
//! - [`CellValue`] and [`Cell`] - Literal values, inputs and formula cells
//! - [`Table`], [`Row`], [`Column`] - One snapshot of a review table
//! - [`CellMap`] and [`InputsMap`] - Address-keyed views the engine consumes
//! - [`ComputedMap`] - Formula results the engine produces
//!
//! ## Example
//!
//! ```rust
//! use review_sheets_core::{build_cell_map, build_initial_inputs, Cell, CellAddress, Row, Table};
//!
//! let a1: CellAddress = "A1".parse().unwrap();
//! let b1: CellAddress = "B1".parse().unwrap();
//!
//! let mut table = Table::new();
//! table.push_row(Row::new([Cell::input(a1, 3), Cell::formula(b1, "=A1*2")]));
//!
//! let cell_map = build_cell_map(&table);
//! let inputs = build_initial_inputs(&table);
//!
//! assert!(cell_map[&b1].is_formula());
//! assert_eq!(inputs[&a1], "3");
//! ```

pub mod cell;
pub mod cell_map;
pub mod column;
pub mod error;
pub mod row;
pub mod table;

// Re-exports for convenience
pub use cell::{
    col_to_number, expand_range, number_to_col, parse_number, Cell, CellAddress, CellRange,
    CellValue,
};
pub use cell_map::{
    build_cell_map, build_initial_inputs, CellEntry, CellMap, ComputedMap, ComputedValue,
    InputsMap,
};
pub use column::Column;
pub use error::{Error, Result};
pub use row::Row;
pub use table::Table;
