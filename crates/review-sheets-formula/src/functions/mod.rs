//! Built-in table functions

pub mod logical;
pub mod math;

use crate::ast::FormulaExpr;
use crate::error::FormulaResult;
use crate::evaluator::{evaluate_argument, EvaluationContext, FormulaValue};
use std::collections::HashMap;

/// Function implementation signature
///
/// Arguments arrive unevaluated. Implementations evaluate them through
/// [`crate::evaluate`] or [`evaluate_argument`], which lets `IF` skip the
/// branch it does not take.
pub type FunctionImpl = fn(&[FormulaExpr], &EvaluationContext) -> FormulaResult<FormulaValue>;

/// Function definition
pub struct FunctionDef {
    /// Function name (uppercase)
    pub name: &'static str,
    /// Minimum arguments
    pub min_args: usize,
    /// Maximum arguments (None = unlimited)
    pub max_args: Option<usize>,
    /// Implementation
    pub implementation: FunctionImpl,
}

/// Function registry
pub struct FunctionRegistry {
    functions: HashMap<String, FunctionDef>,
}

impl FunctionRegistry {
    /// Create a new registry with all built-in functions
    pub fn new() -> Self {
        let mut registry = Self {
            functions: HashMap::new(),
        };

        registry.register_math_functions();
        registry.register_logical_functions();

        registry
    }

    /// Look up a function by name
    pub fn get(&self, name: &str) -> Option<&FunctionDef> {
        self.functions.get(&name.to_uppercase())
    }

    /// Register a function
    pub fn register(&mut self, def: FunctionDef) {
        self.functions.insert(def.name.to_uppercase(), def);
    }

    /// Names of all registered functions, sorted
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.functions.values().map(|def| def.name).collect();
        names.sort_unstable();
        names
    }

    fn register_math_functions(&mut self) {
        // SUM
        self.register(FunctionDef {
            name: "SUM",
            min_args: 0,
            max_args: None,
            implementation: math::fn_sum,
        });

        // MIN
        self.register(FunctionDef {
            name: "MIN",
            min_args: 0,
            max_args: None,
            implementation: math::fn_min,
        });

        // MAX
        self.register(FunctionDef {
            name: "MAX",
            min_args: 0,
            max_args: None,
            implementation: math::fn_max,
        });

        // ROUND
        self.register(FunctionDef {
            name: "ROUND",
            min_args: 1,
            max_args: Some(2),
            implementation: math::fn_round,
        });
    }

    fn register_logical_functions(&mut self) {
        // IF
        self.register(FunctionDef {
            name: "IF",
            min_args: 2,
            max_args: Some(3),
            implementation: logical::fn_if,
        });

        // AND
        self.register(FunctionDef {
            name: "AND",
            min_args: 0,
            max_args: None,
            implementation: logical::fn_and,
        });
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Evaluate every argument and flatten ranges into one list of numbers
///
/// Strings are a type error.
pub(crate) fn collect_numbers(
    args: &[FormulaExpr],
    ctx: &EvaluationContext,
) -> FormulaResult<Vec<f64>> {
    let mut numbers = Vec::with_capacity(args.len());
    for arg in args {
        match evaluate_argument(arg, ctx)? {
            FormulaValue::Array(cells) => {
                for cell in &cells {
                    numbers.push(cell.to_number()?);
                }
            }
            value => numbers.push(value.to_number()?),
        }
    }
    Ok(numbers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_registry_names() {
        let registry = FunctionRegistry::new();
        assert_eq!(
            registry.names(),
            vec!["AND", "IF", "MAX", "MIN", "ROUND", "SUM"]
        );
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let registry = FunctionRegistry::new();
        assert_eq!(registry.get("round").map(|def| def.name), Some("ROUND"));
        assert!(registry.get("VLOOKUP").is_none());
    }
}
