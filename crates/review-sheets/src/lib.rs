//! # review-sheets
//!
//! Formula engine behind the on-screen performance-review table.
//!
//! A review table holds literal values, user-entered inputs and formulas
//! that reference other cells, including cells of virtual rows inserted at
//! runtime. Whenever an input changes, every formula result is recomputed.
//!
//! ## Features
//!
//! - A1 addressing with normalized references and ranges
//! - A small formula language: arithmetic, comparisons, percent literals,
//!   string literals and `SUM`, `IF`, `AND`, `ROUND`, `MIN`, `MAX`
//! - Dependency-ordered calculation with bounded relaxation for cycles
//! - Per-cell failures never abort a calculation
//!
//! ## Example
//!
//! ```rust
//! use review_sheets::prelude::*;
//!
//! let cell = |s: &str| s.parse::<CellAddress>().unwrap();
//!
//! let mut table = Table::new();
//! table
//!     .push_row(Row::new([Cell::input(cell("A1"), 3), Cell::input(cell("B1"), 4)]))
//!     .push_row(Row::new([Cell::formula(cell("A2"), "=SUM(A1:B1)")]));
//!
//! let cell_map = build_cell_map(&table);
//! let mut inputs = build_initial_inputs(&table);
//! inputs.insert(cell("B1"), "10".into());
//!
//! let computed = compute_computed_by_addr(&table, &inputs, &cell_map);
//! assert_eq!(computed[&cell("A2")], ComputedValue::Number(13.0));
//! ```

pub mod calculation;
pub mod prelude;

// Re-export calculation types
pub use calculation::{
    calculate, compute_computed_by_addr, Calculation, CalculationOptions, CalculationStats,
    TableCalculationExt,
};

// Re-export core types
pub use review_sheets_core::{
    build_cell_map,
    build_initial_inputs,
    // Addressing
    col_to_number,
    expand_range,
    number_to_col,
    // Cell types
    Cell,
    CellAddress,
    CellEntry,
    // Address-keyed views
    CellMap,
    CellRange,
    CellValue,
    Column,
    ComputedMap,
    ComputedValue,
    // Error types
    Error,
    InputsMap,
    Result,
    Row,
    // Main types
    Table,
};

// Re-export formula types
pub use review_sheets_formula::{
    evaluate, extract_deps, parse_formula, CellLookup, DependencyGraph, EvaluationContext,
    FormulaError, FormulaExpr, FormulaResult, FormulaValue,
};
