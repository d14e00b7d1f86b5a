//! Logical functions

use super::collect_numbers;
use crate::ast::FormulaExpr;
use crate::error::{FormulaError, FormulaResult};
use crate::evaluator::{evaluate, EvaluationContext, FormulaValue};

/// IF function
///
/// Only the selected branch is evaluated. Without an else branch a false
/// condition yields FALSE.
pub fn fn_if(args: &[FormulaExpr], ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let (condition, if_true) = match args {
        [condition, if_true, ..] => (condition, if_true),
        _ => {
            return Err(FormulaError::Argument(
                "IF requires at least 2 arguments".into(),
            ))
        }
    };
    let if_false = args.get(2);

    let condition = evaluate(condition, ctx)?;
    let condition_bool = condition.as_bool().ok_or_else(|| {
        FormulaError::Type(format!(
            "IF condition must be a number, got {}",
            condition.type_name()
        ))
    })?;

    if condition_bool {
        evaluate(if_true, ctx)
    } else {
        match if_false {
            Some(expr) => evaluate(expr, ctx),
            None => Ok(FormulaValue::Boolean(false)),
        }
    }
}

/// AND function
///
/// TRUE when every value, range cells included, is non-zero.
pub fn fn_and(args: &[FormulaExpr], ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let numbers = collect_numbers(args, ctx)?;
    Ok(FormulaValue::Boolean(numbers.iter().all(|n| *n != 0.0)))
}
