//! Math functions

use super::collect_numbers;
use crate::ast::FormulaExpr;
use crate::error::{FormulaError, FormulaResult};
use crate::evaluator::{evaluate, EvaluationContext, FormulaValue};
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// SUM function
pub fn fn_sum(args: &[FormulaExpr], ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let sum: f64 = collect_numbers(args, ctx)?.into_iter().sum();
    if sum.is_finite() {
        Ok(FormulaValue::Number(sum))
    } else {
        Err(FormulaError::Evaluation("SUM overflowed".into()))
    }
}

/// MIN function
pub fn fn_min(args: &[FormulaExpr], ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    collect_numbers(args, ctx)?
        .into_iter()
        .reduce(f64::min)
        .map(FormulaValue::Number)
        .ok_or_else(|| FormulaError::Evaluation("MIN of no values".into()))
}

/// MAX function
pub fn fn_max(args: &[FormulaExpr], ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    collect_numbers(args, ctx)?
        .into_iter()
        .reduce(f64::max)
        .map(FormulaValue::Number)
        .ok_or_else(|| FormulaError::Evaluation("MAX of no values".into()))
}

/// ROUND(number, [num_digits]) - Rounds half away from zero
///
/// Digits default to 0 and are truncated toward zero; negative digits round
/// to the left of the decimal point.
pub fn fn_round(args: &[FormulaExpr], ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let number = match args.first() {
        Some(arg) => evaluate(arg, ctx)?.to_number()?,
        None => return Err(FormulaError::Argument("ROUND requires a number".into())),
    };

    let num_digits = match args.get(1) {
        // `as` saturates out-of-range digit counts
        Some(arg) => evaluate(arg, ctx)?.to_number()?.trunc() as i32,
        None => 0,
    };

    Ok(FormulaValue::Number(round_half_away_from_zero(
        number, num_digits,
    )))
}

/// Round `number` to `num_digits` decimal places, half away from zero
///
/// Works on the shortest decimal representation of `number`, so values like
/// `2.345` (stored as 2.34499...) still round up to `2.35`.
pub fn round_half_away_from_zero(number: f64, num_digits: i32) -> f64 {
    round_decimal(number, num_digits).unwrap_or_else(|| round_binary(number, num_digits))
}

fn round_decimal(number: f64, num_digits: i32) -> Option<f64> {
    let decimal = Decimal::from_str(&number.to_string()).ok()?;

    let rounded = if num_digits >= 0 {
        decimal.round_dp_with_strategy(num_digits as u32, RoundingStrategy::MidpointAwayFromZero)
    } else {
        let factor = Decimal::from(10u64.checked_pow(num_digits.unsigned_abs())?);
        decimal
            .checked_div(factor)?
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .checked_mul(factor)?
    };

    rounded.to_string().parse().ok()
}

/// Multiplier approach for values outside the decimal range
fn round_binary(number: f64, num_digits: i32) -> f64 {
    let multiplier = 10_f64.powi(num_digits);
    if !multiplier.is_finite() || multiplier == 0.0 {
        return if num_digits > 0 { number } else { 0.0 };
    }
    // Past 2^52 every f64 is already a whole number
    if (number * multiplier).abs() >= 4_503_599_627_370_496.0 {
        return number;
    }

    let result = if number >= 0.0 {
        (number * multiplier + 0.5).floor() / multiplier
    } else {
        (number * multiplier - 0.5).ceil() / multiplier
    };

    if result.is_finite() {
        result
    } else {
        number
    }
}
