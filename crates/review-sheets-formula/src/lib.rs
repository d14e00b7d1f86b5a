//! # review-sheets-formula
//!
//! Formula parser and evaluator for review-sheets.
//!
//! This crate provides:
//! - Formula parsing (text → AST), with a fixed token set and bounded nesting
//! - Formula evaluation (AST → value) against any [`CellLookup`]
//! - Built-in functions: `SUM`, `MIN`, `MAX`, `ROUND`, `IF`, `AND`
//! - Dependency extraction and ordering for calculation chains
//!
//! ## Example
//!
//! ```rust
//! use review_sheets_core::CellAddress;
//! use review_sheets_formula::{evaluate, parse_formula, EvaluationContext, FormulaValue};
//! use std::collections::BTreeMap;
//!
//! let mut cells = BTreeMap::new();
//! cells.insert(CellAddress::parse("A1").unwrap(), 150.0);
//!
//! let ast = parse_formula("=IF(A1>100,\"big\",\"small\")").unwrap();
//! let result = evaluate(&ast, &EvaluationContext::new(&cells)).unwrap();
//! assert_eq!(result, FormulaValue::String("big".into()));
//! ```

pub mod ast;
pub mod dependency;
pub mod error;
pub mod evaluator;
pub mod functions;
pub mod parser;

pub use ast::{BinaryOperator, FormulaExpr, UnaryOperator};
pub use dependency::{extract_deps, DependencyGraph, TopologicalOrder};
pub use error::{FormulaError, FormulaResult};
pub use evaluator::{evaluate, evaluate_argument, CellLookup, EvaluationContext, FormulaValue};
pub use functions::{FunctionDef, FunctionRegistry};
pub use parser::{parse_formula, MAX_FORMULA_LENGTH, MAX_NESTING_DEPTH, MAX_RANGE_CELLS};
