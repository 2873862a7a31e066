//! Number constraints
//!
//! Limits that are field references resolve against the parent value; a
//! reference that does not resolve to a number makes the constraint pass.

use super::{Check, format_number};
use crate::foundation::Verdict;
use crate::rule::{Bound, Constraint};
use serde_json::Value;

pub(super) fn validate(constraint: &Constraint, check: &Check<'_>) -> Option<Verdict> {
    let number = check.value.and_then(Value::as_f64);
    let verdict = match constraint {
        Constraint::Min(bound) => compare(check, number, bound, |n, b| n >= b, |b| {
            format!("Must be greater than or equal {b}")
        }),
        Constraint::Max(bound) => compare(check, number, bound, |n, b| n <= b, |b| {
            format!("Must be less than or equal {b}")
        }),
        Constraint::GreaterThan(bound) => compare(check, number, bound, |n, b| n > b, |b| {
            format!("Must be greater than {b}")
        }),
        Constraint::LessThan(bound) => compare(check, number, bound, |n, b| n < b, |b| {
            format!("Must be less than {b}")
        }),
        Constraint::Integer => match number {
            Some(n) if n.fract() != 0.0 => check.fail("Must be an integer"),
            _ => Verdict::Valid,
        },
        Constraint::Precision(bound) => {
            let limit = bound.resolve(check.parent()).and_then(Value::as_f64);
            match (check.value, limit) {
                (Some(Value::Number(n)), Some(limit)) if decimal_places(&n.to_string()) as f64 > limit => {
                    check.fail(format!("Max precision is {}", format_number(limit)))
                }
                _ => Verdict::Valid,
            }
        }
        _ => return None,
    };
    Some(verdict)
}

fn compare(
    check: &Check<'_>,
    number: Option<f64>,
    bound: &Bound,
    holds: impl Fn(f64, f64) -> bool,
    message: impl Fn(String) -> String,
) -> Verdict {
    let limit = bound.resolve(check.parent()).and_then(Value::as_f64);
    match (number, limit) {
        (Some(n), Some(limit)) if !holds(n, limit) => check.fail(message(format_number(limit))),
        _ => Verdict::Valid,
    }
}

/// Decimal places of a numeric literal, accounting for an exponent
/// (`1.25` → 2, `1.5e-7` → 8, `1.25e2` → 0).
fn decimal_places(literal: &str) -> usize {
    let (mantissa, exponent) = match literal.find(['e', 'E']) {
        Some(at) => (&literal[..at], literal[at + 1..].parse::<i64>().unwrap_or(0)),
        None => (literal, 0),
    };
    let fraction = mantissa
        .split_once('.')
        .map_or(0, |(_, digits)| digits.len());
    let places = i64::try_from(fraction).unwrap_or(i64::MAX).saturating_sub(exponent);
    usize::try_from(places.max(0)).unwrap_or(0)
}
