//! Array constraints
//!
//! `valid` and `unique` blame individual items: the resulting error carries
//! one relative path per offending item, keyed by `_key` when the item has
//! one.

use super::{Check, format_number, is_empty, item_segment};
use crate::foundation::{Path, ValidationError, Verdict, deep_equals};
use crate::rule::{Bound, Constraint, Presence};
use serde_json::Value;

pub(super) fn validate(constraint: &Constraint, check: &Check<'_>) -> Option<Verdict> {
    let items = check.value.and_then(Value::as_array);
    let verdict = match constraint {
        Constraint::Presence(Presence::Required) if is_empty(check.value) => check.fail("Required"),
        Constraint::Presence(_) => Verdict::Valid,
        Constraint::Min(bound) => count(check, items, bound, |n, b| n >= b, |b| {
            format!("Must have at least {b} items")
        }),
        Constraint::Max(bound) => count(check, items, bound, |n, b| n <= b, |b| {
            format!("Must have at most {b} items")
        }),
        Constraint::Length(bound) => count(check, items, bound, |n, b| n == b, |b| {
            format!("Must have exactly {b} items")
        }),
        Constraint::Valid(allowed) => match items {
            Some(items) => {
                let paths = blame(items, |item| {
                    !allowed.iter().any(|candidate| deep_equals(candidate, item))
                });
                item_error(check, paths, "Value did not match any allowed values")
            }
            None => Verdict::Valid,
        },
        Constraint::Unique => match items {
            Some(items) => item_error(check, duplicate_paths(items), "Can't be a duplicate"),
            None => Verdict::Valid,
        },
        _ => return None,
    };
    Some(verdict)
}

fn count(
    check: &Check<'_>,
    items: Option<&Vec<Value>>,
    bound: &Bound,
    holds: impl Fn(f64, f64) -> bool,
    message: impl Fn(String) -> String,
) -> Verdict {
    let limit = bound.resolve(check.parent()).and_then(Value::as_f64);
    match (items, limit) {
        (Some(items), Some(limit)) if !holds(items.len() as f64, limit) => {
            check.fail(message(format_number(limit)))
        }
        _ => Verdict::Valid,
    }
}

fn blame(items: &[Value], offending: impl Fn(&Value) -> bool) -> Vec<Path> {
    items
        .iter()
        .enumerate()
        .filter(|(_, item)| offending(item))
        .map(|(index, item)| Path::root().child(item_segment(item, index)))
        .collect()
}

/// Pairwise scan; every index taking part in a duplicate pair is reported
/// once, in order of first appearance.
fn duplicate_paths(items: &[Value]) -> Vec<Path> {
    let mut duplicates: Vec<usize> = Vec::new();
    for (x, a) in items.iter().enumerate() {
        for (y, b) in items.iter().enumerate().skip(x + 1) {
            if !deep_equals(a, b) {
                continue;
            }
            for index in [x, y] {
                if !duplicates.contains(&index) {
                    duplicates.push(index);
                }
            }
        }
    }
    duplicates
        .into_iter()
        .map(|index| Path::root().child(item_segment(&items[index], index)))
        .collect()
}

fn item_error(check: &Check<'_>, paths: Vec<Path>, default: &'static str) -> Verdict {
    if paths.is_empty() {
        return Verdict::Valid;
    }
    let error = match check.message {
        Some(message) => ValidationError::new(message.to_owned()),
        None => ValidationError::new(default),
    };
    error.with_paths(paths).into()
}
