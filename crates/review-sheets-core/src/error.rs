//! Error types for review-sheets-core

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in review-sheets-core
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// Invalid cell address format
    #[error("Invalid cell address: {0}")]
    InvalidAddress(String),

    /// Invalid cell range format
    #[error("Invalid cell range: {0}")]
    InvalidRange(String),

    /// Column letters decode to a number that does not fit
    #[error("Column '{0}' is out of bounds")]
    ColumnOutOfBounds(String),

    /// A cell is flagged as an input but also carries a formula
    #[error("Cell {0} has a formula and is also marked as an input")]
    InputFormulaConflict(String),

    /// Two visible cells share one address
    #[error("Address {0} is used by more than one visible cell")]
    DuplicateAddress(String),
}
