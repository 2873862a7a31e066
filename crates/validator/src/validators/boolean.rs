//! Boolean constraints

use super::Check;
use crate::foundation::Verdict;
use crate::rule::{Constraint, Presence};
use serde_json::Value;

pub(super) fn validate(constraint: &Constraint, check: &Check<'_>) -> Option<Verdict> {
    match constraint {
        Constraint::Presence(Presence::Required) => Some(match check.value {
            Some(Value::Bool(_)) => Verdict::Valid,
            _ => check.fail("Required"),
        }),
        _ => None,
    }
}
