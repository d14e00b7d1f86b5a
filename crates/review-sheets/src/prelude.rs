//! Prelude module - common imports for review-sheets users
//!
//! ```rust
//! use review_sheets::prelude::*;
//! ```

pub use crate::{
    build_cell_map,
    build_initial_inputs,
    // Calculation
    calculate,
    compute_computed_by_addr,
    Calculation,
    CalculationOptions,
    CalculationStats,
    // Cell types
    Cell,
    CellAddress,
    CellMap,
    CellRange,
    CellValue,
    Column,
    ComputedMap,
    ComputedValue,
    // Error types
    Error,
    FormulaError,
    InputsMap,
    Result,
    Row,
    // Main types
    Table,
    // Extension traits
    TableCalculationExt,
};
