//! Formula error types

use thiserror::Error;

/// Result type for formula operations
pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

/// Errors that can occur during formula parsing or evaluation
///
/// The calculation engine treats every variant the same way: the cell keeps
/// its previous value. The variants exist for diagnostics.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FormulaError {
    /// Formula parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Formula evaluation error (division by zero, non-finite result, ...)
    #[error("Evaluation error: {0}")]
    Evaluation(String),

    /// Operand or argument of the wrong type
    #[error("Type error: {0}")]
    Type(String),

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    Argument(String),

    /// Unknown function
    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    /// Wrong number of arguments
    #[error("Wrong number of arguments for {function}: expected {expected}, got {actual}")]
    ArgumentCount {
        function: String,
        expected: String,
        actual: usize,
    },

    /// Reference to invalid cell
    #[error("Invalid reference: {0}")]
    InvalidReference(String),
}
