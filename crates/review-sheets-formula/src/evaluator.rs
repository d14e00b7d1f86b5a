//! Formula evaluator
//!
//! Evaluates formula ASTs to produce values.

use crate::ast::{BinaryOperator, FormulaExpr, UnaryOperator};
use crate::error::{FormulaError, FormulaResult};
use crate::functions::FunctionRegistry;
use crate::parser::MAX_RANGE_CELLS;
use review_sheets_core::{CellAddress, CellRange, CellValue, ComputedValue};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Global function registry (lazily initialized)
static FUNCTION_REGISTRY: OnceLock<FunctionRegistry> = OnceLock::new();

fn get_function_registry() -> &'static FunctionRegistry {
    FUNCTION_REGISTRY.get_or_init(FunctionRegistry::new)
}

/// Value types during formula evaluation
#[derive(Debug, Clone, PartialEq)]
pub enum FormulaValue {
    Number(f64),
    String(String),
    Boolean(bool),
    /// Cells of a range argument, row-major
    Array(Vec<FormulaValue>),
}

impl FormulaValue {
    /// Convert to number, if possible
    ///
    /// Strings are never numbers here.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FormulaValue::Number(n) => Some(*n),
            FormulaValue::Boolean(true) => Some(1.0),
            FormulaValue::Boolean(false) => Some(0.0),
            _ => None,
        }
    }

    /// Force conversion to number for arithmetic
    pub fn to_number(&self) -> FormulaResult<f64> {
        self.as_number().ok_or_else(|| {
            FormulaError::Type(format!("expected a number, got {}", self.type_name()))
        })
    }

    /// Convert to boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FormulaValue::Boolean(b) => Some(*b),
            FormulaValue::Number(n) => Some(*n != 0.0),
            _ => None,
        }
    }

    /// Get the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            FormulaValue::Number(_) => "number",
            FormulaValue::String(_) => "string",
            FormulaValue::Boolean(_) => "boolean",
            FormulaValue::Array(_) => "range",
        }
    }

    /// Convert a final formula result into a cell value
    ///
    /// Booleans become 1 or 0.
    pub fn into_computed(self) -> FormulaResult<ComputedValue> {
        match self {
            FormulaValue::String(s) => Ok(ComputedValue::Text(s)),
            FormulaValue::Array(_) => Err(FormulaError::Type(
                "a range cannot be a cell value".into(),
            )),
            other => other.to_number().map(ComputedValue::Number),
        }
    }
}

/// Source of cell values during evaluation
///
/// Returns `None` for cells that are missing or hold no number; those read as
/// 0 in formulas.
pub trait CellLookup {
    fn lookup(&self, addr: &CellAddress) -> Option<f64>;
}

impl CellLookup for BTreeMap<CellAddress, f64> {
    fn lookup(&self, addr: &CellAddress) -> Option<f64> {
        self.get(addr).copied()
    }
}

impl CellLookup for BTreeMap<CellAddress, CellValue> {
    fn lookup(&self, addr: &CellAddress) -> Option<f64> {
        self.get(addr).and_then(CellValue::as_number)
    }
}

/// Context for formula evaluation
pub struct EvaluationContext<'a> {
    /// Cell values visible to references
    pub cells: Option<&'a dyn CellLookup>,
}

impl<'a> EvaluationContext<'a> {
    /// Create a new evaluation context
    pub fn new(cells: &'a dyn CellLookup) -> Self {
        Self { cells: Some(cells) }
    }

    /// Create a simple context without cells (for testing)
    pub fn simple() -> Self {
        Self { cells: None }
    }

    /// Get a cell value; missing and non-numeric cells are 0
    pub fn get_cell_value(&self, addr: &CellAddress) -> f64 {
        self.cells
            .and_then(|cells| cells.lookup(addr))
            .unwrap_or(0.0)
    }

    /// Get a range of cell values, row-major
    pub fn get_range_values(&self, range: &CellRange) -> Vec<FormulaValue> {
        range
            .cells()
            .map(|addr| FormulaValue::Number(self.get_cell_value(&addr)))
            .collect()
    }

    /// Sum of a range, the value a range takes in scalar position
    pub fn get_range_sum(&self, range: &CellRange) -> f64 {
        range.cells().map(|addr| self.get_cell_value(&addr)).sum()
    }
}

/// Evaluate a formula expression to a scalar
pub fn evaluate(expr: &FormulaExpr, ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    match expr {
        // === Literals ===
        FormulaExpr::Number(n) => Ok(FormulaValue::Number(*n)),
        FormulaExpr::String(s) => Ok(FormulaValue::String(s.clone())),

        // === References ===
        FormulaExpr::CellRef(addr) => Ok(FormulaValue::Number(ctx.get_cell_value(addr))),
        FormulaExpr::RangeRef(range) => finite(ctx.get_range_sum(checked_range(range)?)),

        // === Operators ===
        FormulaExpr::BinaryOp { op, left, right } => evaluate_binary_op(*op, left, right, ctx),

        FormulaExpr::UnaryOp { op, operand } => evaluate_unary_op(*op, operand, ctx),

        // === Functions ===
        FormulaExpr::Function { name, args } => evaluate_function(name, args, ctx),
    }
}

/// Evaluate a function argument
///
/// Same as [`evaluate`], except that a range written directly as the
/// argument expands to an [`FormulaValue::Array`] of its cells.
pub fn evaluate_argument(
    expr: &FormulaExpr,
    ctx: &EvaluationContext,
) -> FormulaResult<FormulaValue> {
    match expr {
        FormulaExpr::RangeRef(range) => Ok(FormulaValue::Array(
            ctx.get_range_values(checked_range(range)?),
        )),
        other => evaluate(other, ctx),
    }
}

/// Ranges built without the parser still obey its size limit
fn checked_range(range: &CellRange) -> FormulaResult<&CellRange> {
    if range.cell_count() > MAX_RANGE_CELLS {
        return Err(FormulaError::Evaluation(format!(
            "range {} covers more than {} cells",
            range, MAX_RANGE_CELLS
        )));
    }
    Ok(range)
}

/// Wrap an arithmetic result, rejecting infinities and NaN
fn finite(n: f64) -> FormulaResult<FormulaValue> {
    if n.is_finite() {
        Ok(FormulaValue::Number(n))
    } else {
        Err(FormulaError::Evaluation("result is not a finite number".into()))
    }
}

/// Evaluate a binary operation
fn evaluate_binary_op(
    op: BinaryOperator,
    left: &FormulaExpr,
    right: &FormulaExpr,
    ctx: &EvaluationContext,
) -> FormulaResult<FormulaValue> {
    // Evaluate operands first
    let left_val = evaluate(left, ctx)?;
    let right_val = evaluate(right, ctx)?;

    if op.is_comparison() {
        let ordering = compare_values(op, &left_val, &right_val)?;
        let result = match op {
            BinaryOperator::Equal => ordering == Ordering::Equal,
            BinaryOperator::NotEqual => ordering != Ordering::Equal,
            BinaryOperator::LessThan => ordering == Ordering::Less,
            BinaryOperator::LessEqual => ordering != Ordering::Greater,
            BinaryOperator::GreaterThan => ordering == Ordering::Greater,
            _ => ordering != Ordering::Less,
        };
        return Ok(FormulaValue::Boolean(result));
    }

    let l = left_val.to_number()?;
    let r = right_val.to_number()?;

    match op {
        BinaryOperator::Add => finite(l + r),
        BinaryOperator::Subtract => finite(l - r),
        BinaryOperator::Multiply => finite(l * r),
        BinaryOperator::Divide => {
            if r == 0.0 {
                Err(FormulaError::Evaluation("division by zero".into()))
            } else {
                finite(l / r)
            }
        }
        _ => Err(FormulaError::Evaluation(format!(
            "{:?} is not an arithmetic operator",
            op
        ))),
    }
}

/// Compare two values for ordering
///
/// Numbers (booleans included) compare numerically. Two strings compare
/// case-insensitively, but only for `=` and `<>`.
fn compare_values(
    op: BinaryOperator,
    left: &FormulaValue,
    right: &FormulaValue,
) -> FormulaResult<Ordering> {
    match (left, right) {
        (FormulaValue::String(l), FormulaValue::String(r))
            if matches!(op, BinaryOperator::Equal | BinaryOperator::NotEqual) =>
        {
            Ok(l.to_lowercase().cmp(&r.to_lowercase()))
        }
        _ => {
            let l = left.to_number()?;
            let r = right.to_number()?;
            // Operands are finite, so partial_cmp always succeeds
            Ok(l.partial_cmp(&r).unwrap_or(Ordering::Equal))
        }
    }
}

/// Evaluate a unary operation
fn evaluate_unary_op(
    op: UnaryOperator,
    operand: &FormulaExpr,
    ctx: &EvaluationContext,
) -> FormulaResult<FormulaValue> {
    let n = evaluate(operand, ctx)?.to_number()?;

    match op {
        UnaryOperator::Negate => finite(-n),
        UnaryOperator::Percent => finite(n / 100.0),
    }
}

/// Evaluate a function call
fn evaluate_function(
    name: &str,
    args: &[FormulaExpr],
    ctx: &EvaluationContext,
) -> FormulaResult<FormulaValue> {
    let registry = get_function_registry();

    let func = registry
        .get(name)
        .ok_or_else(|| FormulaError::UnknownFunction(name.to_string()))?;

    // Check argument count
    if args.len() < func.min_args {
        return Err(FormulaError::ArgumentCount {
            function: name.to_string(),
            expected: format!("at least {}", func.min_args),
            actual: args.len(),
        });
    }

    if let Some(max) = func.max_args {
        if args.len() > max {
            return Err(FormulaError::ArgumentCount {
                function: name.to_string(),
                expected: format!("at most {}", max),
                actual: args.len(),
            });
        }
    }

    // Arguments are handed over unevaluated so IF can pick a branch
    (func.implementation)(args, ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_formula;
    use pretty_assertions::assert_eq;

    fn addr(s: &str) -> CellAddress {
        CellAddress::parse(s).unwrap()
    }

    fn eval(formula: &str) -> FormulaResult<FormulaValue> {
        let ast = parse_formula(formula)?;
        let ctx = EvaluationContext::simple();
        evaluate(&ast, &ctx)
    }

    fn eval_with(formula: &str, cells: &[(&str, f64)]) -> FormulaResult<FormulaValue> {
        let cells: BTreeMap<CellAddress, f64> =
            cells.iter().map(|(a, n)| (addr(a), *n)).collect();
        let ast = parse_formula(formula)?;
        evaluate(&ast, &EvaluationContext::new(&cells))
    }

    #[test]
    fn test_evaluate_number() {
        assert_eq!(eval("=42").unwrap(), FormulaValue::Number(42.0));
        assert_eq!(eval("=3.14").unwrap(), FormulaValue::Number(3.14));
    }

    #[test]
    fn test_evaluate_string() {
        assert_eq!(
            eval("=\"Hello\"").unwrap(),
            FormulaValue::String("Hello".into())
        );
    }

    #[test]
    fn test_evaluate_arithmetic() {
        assert_eq!(eval("=1+2").unwrap(), FormulaValue::Number(3.0));
        assert_eq!(eval("=10-3").unwrap(), FormulaValue::Number(7.0));
        assert_eq!(eval("=4*5").unwrap(), FormulaValue::Number(20.0));
        assert_eq!(eval("=20/4").unwrap(), FormulaValue::Number(5.0));
    }

    #[test]
    fn test_evaluate_precedence() {
        assert_eq!(eval("=1+2*3").unwrap(), FormulaValue::Number(7.0));
        assert_eq!(eval("=(1+2)*3").unwrap(), FormulaValue::Number(9.0));
        assert_eq!(eval("=2+3*4-5").unwrap(), FormulaValue::Number(9.0));
        assert_eq!(eval("=8/2/2").unwrap(), FormulaValue::Number(2.0));
    }

    #[test]
    fn test_evaluate_unary() {
        assert_eq!(eval("=-5").unwrap(), FormulaValue::Number(-5.0));
        assert_eq!(eval("=50%").unwrap(), FormulaValue::Number(0.5));
        assert_eq!(eval("=--5").unwrap(), FormulaValue::Number(5.0));
        assert_eq!(eval("=3--2").unwrap(), FormulaValue::Number(5.0));
        assert_eq!(eval("=3+-2").unwrap(), FormulaValue::Number(1.0));
        assert_eq!(eval("=200*10%").unwrap(), FormulaValue::Number(20.0));
    }

    #[test]
    fn test_evaluate_comparison() {
        assert_eq!(eval("=1<2").unwrap(), FormulaValue::Boolean(true));
        assert_eq!(eval("=1>2").unwrap(), FormulaValue::Boolean(false));
        assert_eq!(eval("=5=5").unwrap(), FormulaValue::Boolean(true));
        assert_eq!(eval("=5==5").unwrap(), FormulaValue::Boolean(true));
        assert_eq!(eval("=5<>5").unwrap(), FormulaValue::Boolean(false));
        assert_eq!(eval("=5!=4").unwrap(), FormulaValue::Boolean(true));
        assert_eq!(eval("=5<=5").unwrap(), FormulaValue::Boolean(true));
        assert_eq!(eval("=5>=6").unwrap(), FormulaValue::Boolean(false));
    }

    #[test]
    fn test_evaluate_string_comparison() {
        assert_eq!(eval("=\"abc\"=\"ABC\"").unwrap(), FormulaValue::Boolean(true));
        assert_eq!(eval("=\"abc\"<>\"abd\"").unwrap(), FormulaValue::Boolean(true));
        assert!(matches!(eval("=\"a\"<\"b\""), Err(FormulaError::Type(_))));
        assert!(matches!(eval("=\"1\"=1"), Err(FormulaError::Type(_))));
    }

    #[test]
    fn test_strings_are_not_numbers() {
        assert!(matches!(eval("=\"5\"+1"), Err(FormulaError::Type(_))));
        assert!(matches!(eval("=-\"5\""), Err(FormulaError::Type(_))));
    }

    #[test]
    fn test_evaluate_division_by_zero() {
        assert!(matches!(eval("=1/0"), Err(FormulaError::Evaluation(_))));
        assert!(matches!(
            eval_with("=A1/B1", &[("A1", 1.0)]),
            Err(FormulaError::Evaluation(_))
        ));
    }

    #[test]
    fn test_overflow_is_not_a_number() {
        let big = format!("={}", "9".repeat(300));
        assert!(matches!(
            eval(&format!("{}*{}", big, "9".repeat(300))),
            Err(FormulaError::Evaluation(_))
        ));
    }

    #[test]
    fn test_evaluate_cell_references() {
        let cells = [("A1", 10.0), ("B1", 32.0)];
        assert_eq!(eval_with("=A1+B1", &cells).unwrap(), FormulaValue::Number(42.0));
        assert_eq!(eval_with("=a1*2", &cells).unwrap(), FormulaValue::Number(20.0));
        // Missing cells read as 0
        assert_eq!(eval_with("=A1+Z99", &cells).unwrap(), FormulaValue::Number(10.0));
        assert_eq!(eval("=A1").unwrap(), FormulaValue::Number(0.0));
    }

    #[test]
    fn test_range_in_scalar_position_is_sum() {
        let cells = [("A1", 1.0), ("A2", 2.0), ("B1", 3.0), ("B2", 4.0)];
        assert_eq!(eval_with("=A1:B2", &cells).unwrap(), FormulaValue::Number(10.0));
        assert_eq!(eval_with("=A1:A2*2", &cells).unwrap(), FormulaValue::Number(6.0));
    }

    #[test]
    fn test_evaluate_argument_expands_ranges() {
        let cells: BTreeMap<CellAddress, f64> =
            [(addr("A1"), 1.0), (addr("B1"), 2.0), (addr("A2"), 3.0)].into_iter().collect();
        let ctx = EvaluationContext::new(&cells);

        let range = parse_formula("=A1:B2").unwrap();
        assert_eq!(
            evaluate_argument(&range, &ctx).unwrap(),
            FormulaValue::Array(vec![
                FormulaValue::Number(1.0),
                FormulaValue::Number(2.0),
                FormulaValue::Number(3.0),
                FormulaValue::Number(0.0),
            ])
        );

        let sum = parse_formula("=A1:B2+0").unwrap();
        assert_eq!(evaluate_argument(&sum, &ctx).unwrap(), FormulaValue::Number(6.0));
    }

    #[test]
    fn test_oversized_range_is_rejected() {
        let huge = FormulaExpr::RangeRef(CellRange::new(addr("A1"), addr("ZZ999999")));
        let ctx = EvaluationContext::simple();

        assert!(matches!(evaluate(&huge, &ctx), Err(FormulaError::Evaluation(_))));
        assert!(matches!(
            evaluate_argument(&huge, &ctx),
            Err(FormulaError::Evaluation(_))
        ));
    }

    #[test]
    fn test_cell_value_lookup() {
        let cells: BTreeMap<CellAddress, CellValue> = [
            (addr("A1"), CellValue::Text(" 4 ".into())),
            (addr("A2"), CellValue::Text("abc".into())),
            (addr("A3"), CellValue::Number(2.0)),
        ]
        .into_iter()
        .collect();
        let ast = parse_formula("=A1+A2+A3").unwrap();
        assert_eq!(
            evaluate(&ast, &EvaluationContext::new(&cells)).unwrap(),
            FormulaValue::Number(6.0)
        );
    }

    #[test]
    fn test_unknown_function() {
        assert!(matches!(
            eval("=AVERAGE(1,2)"),
            Err(FormulaError::UnknownFunction(name)) if name == "AVERAGE"
        ));
    }

    #[test]
    fn test_argument_count() {
        assert!(matches!(
            eval("=ROUND(1,2,3)"),
            Err(FormulaError::ArgumentCount { actual: 3, .. })
        ));
        assert!(matches!(
            eval("=IF(1)"),
            Err(FormulaError::ArgumentCount { actual: 1, .. })
        ));
    }

    #[test]
    fn test_into_computed() {
        assert_eq!(
            FormulaValue::Boolean(true).into_computed().unwrap(),
            ComputedValue::Number(1.0)
        );
        assert_eq!(
            FormulaValue::String("big".into()).into_computed().unwrap(),
            ComputedValue::Text("big".into())
        );
        assert!(FormulaValue::Array(vec![]).into_computed().is_err());
    }
}
