//! Cell-related types and utilities
//!
//! This module contains:
//! - [`CellValue`] - The literal value stored in a cell
//! - [`CellAddress`] - A cell's address (e.g., "A1")
//! - [`CellRange`] - A rectangular range of cells (e.g., "A1:B10")
//! - [`Cell`] - Complete cell data including formula and input flags

mod address;
mod data;
mod value;

pub use address::{col_to_number, expand_range, number_to_col, CellAddress, CellRange};
pub use data::Cell;
pub use value::{parse_number, CellValue};
