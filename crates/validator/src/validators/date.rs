//! Date constraints
//!
//! Accepts RFC 3339 date-times and plain `YYYY-MM-DD` dates (read as
//! midnight UTC).

use super::Check;
use crate::foundation::Verdict;
use crate::rule::{Bound, Constraint};
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;

pub(super) fn validate(constraint: &Constraint, check: &Check<'_>) -> Option<Verdict> {
    let verdict = match constraint {
        Constraint::Type(_) => match check.value {
            None => Verdict::Valid,
            Some(value) if value.as_str().and_then(parse_date).is_some() => Verdict::Valid,
            Some(_) => check.fail("Must be a valid date"),
        },
        Constraint::Min(bound) => compare(check, bound, |date, limit| date >= limit, "Must be at or after"),
        Constraint::Max(bound) => compare(check, bound, |date, limit| date <= limit, "Must be at or before"),
        _ => return None,
    };
    Some(verdict)
}

fn compare(
    check: &Check<'_>,
    bound: &Bound,
    holds: impl Fn(DateTime<Utc>, DateTime<Utc>) -> bool,
    prefix: &str,
) -> Verdict {
    let limit = bound.resolve(check.parent()).and_then(Value::as_str);
    let date = check.value.and_then(Value::as_str).and_then(parse_date);
    match (date, limit) {
        (Some(date), Some(limit)) => match parse_date(limit) {
            Some(parsed) if !holds(date, parsed) => check.fail(format!("{prefix} {limit}")),
            _ => Verdict::Valid,
        },
        _ => Verdict::Valid,
    }
}

/// Parses an RFC 3339 date-time or a `YYYY-MM-DD` date.
pub(crate) fn parse_date(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(date_time) = DateTime::parse_from_rfc3339(text) {
        return Some(date_time.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
