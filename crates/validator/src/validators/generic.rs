//! Constraints shared by every base type

use super::{Check, Failure, is_empty, type_name_of};
use crate::error::ValidatorContractError;
use crate::foundation::{Operation, ValidationError, Verdict, deep_equals};
use crate::rule::{Constraint, CustomCheck, Presence, Rule};
use futures::future::try_join_all;
use std::borrow::Cow;
use tokio::time::{Instant, timeout};

pub(super) async fn validate(constraint: &Constraint, check: &Check<'_>) -> Result<Verdict, Failure> {
    match constraint {
        Constraint::Type(expected) => Ok(match check.value {
            Some(value) if type_name_of(value) != expected.as_str() => check.fail(format!(
                "Expected type \"{expected}\", got \"{}\"",
                type_name_of(value)
            )),
            _ => Verdict::Valid,
        }),
        Constraint::Presence(Presence::Required) if is_empty(check.value) => {
            Ok(check.fail("Required"))
        }
        Constraint::Presence(_) => Ok(Verdict::Valid),
        Constraint::Valid(allowed) => Ok(match check.value {
            Some(value) if !allowed.iter().any(|candidate| deep_equals(candidate, value)) => {
                check.fail("Value did not match any allowed values")
            }
            _ => Verdict::Valid,
        }),
        Constraint::Custom(custom) => run_custom(custom, check).await,
        Constraint::All(children) => {
            let results = run_children(children, check).await?;
            if results.iter().all(Vec::is_empty) {
                return Ok(Verdict::Valid);
            }
            Ok(composite(check, "All of the following must be true", results, Operation::And))
        }
        Constraint::Either(children) => {
            let results = run_children(children, check).await?;
            if results.is_empty() || results.iter().any(Vec::is_empty) {
                return Ok(Verdict::Valid);
            }
            Ok(composite(check, "Must match one of the following", results, Operation::Or))
        }
        other => Err(ValidatorContractError::UnsupportedConstraint {
            flag: other.flag(),
            target: check.rule.base_type().map_or_else(
                || "rule without declared type".to_owned(),
                |ty| format!("type \"{ty}\""),
            ),
        }
        .into()),
    }
}

async fn run_children(
    children: &[Rule],
    check: &Check<'_>,
) -> Result<Vec<Vec<crate::foundation::ValidationMarker>>, Failure> {
    let runs = children
        .iter()
        .map(|child| child.validate(check.value, check.context));
    Ok(try_join_all(runs).await?)
}

fn composite(
    check: &Check<'_>,
    default: &'static str,
    results: Vec<Vec<crate::foundation::ValidationMarker>>,
    operation: Operation,
) -> Verdict {
    let message: Cow<'static, str> = match check.message {
        Some(message) => Cow::Owned(message.to_owned()),
        None => Cow::Borrowed(default),
    };
    ValidationError::new(message)
        .with_children(results.into_iter().flatten().collect())
        .with_operation(operation)
        .into()
}

/// Runs a custom check under the custom concurrency cap, logging when it
/// exceeds the slow threshold. Slow validators are awaited, never cancelled.
pub(super) async fn run_custom(custom: &CustomCheck, check: &Check<'_>) -> Result<Verdict, Failure> {
    let services = check.context.services();
    let _permit = match services.custom_limiter() {
        Some(limiter) if !custom.bypasses_concurrency_limit() => {
            Some(limiter.acquire().await.map_err(anyhow::Error::from)?)
        }
        _ => None,
    };

    let threshold = services.options().slow_custom_warning;
    let started = Instant::now();
    let mut call = custom.validator().validate(check.value, check.context);
    let result = match timeout(threshold, &mut call).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(
                path = %check.context.path(),
                elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
                "custom validator is taking longer than expected to respond"
            );
            call.await
        }
    };

    Ok(override_message(result?, check.message))
}

fn override_message(verdict: Verdict, message: Option<&str>) -> Verdict {
    let Some(message) = message else {
        return verdict;
    };
    match verdict {
        Verdict::Message(_) => Verdict::Message(message.to_owned()),
        Verdict::Raw(serde_json::Value::String(_)) => Verdict::Message(message.to_owned()),
        Verdict::Error(error) if error.is_node_level() => {
            Verdict::Error(error.clone_with_message(message.to_owned()))
        }
        other => other,
    }
}
