//! The validator registry
//!
//! One module per [`BaseType`]. Each type table handles the constraints it
//! knows and defers everything else to the [`generic`] table, which covers
//! `type`, `presence`, `valid`, `custom`, `all` and `either` and rejects the
//! rest as unsupported for the rule's type.
//!
//! Semantic validators attached by the type normalizer live next to the
//! tables: [`slug`], [`reference`] (existence check) and [`block`].
//!
//! Every validator except `custom`, `all`, `either` and `block` is
//! synchronous.

mod array;
pub mod block;
mod boolean;
mod date;
mod generic;
mod number;
mod object;
pub mod reference;
pub mod slug;
mod string;

pub use object::UnknownFieldsValidator;

use crate::document::ValidationContext;
use crate::error::{EngineError, ValidatorContractError};
use crate::foundation::{PathSegment, Verdict};
use crate::rule::{BaseType, Constraint, Rule};
use serde_json::Value;

/// Everything a validator needs to judge one constraint.
pub(crate) struct Check<'a> {
    pub rule: &'a Rule,
    pub value: Option<&'a Value>,
    pub message: Option<&'a str>,
    pub context: &'a ValidationContext<'a>,
}

impl Check<'_> {
    fn fail(&self, default: impl Into<String>) -> Verdict {
        Verdict::fail(self.message, default)
    }

    fn parent(&self) -> Option<&Value> {
        self.context.parent()
    }
}

/// Why a validator produced no verdict.
pub(crate) enum Failure {
    /// User or collaborator code failed; reported as a marker.
    Exception(anyhow::Error),
    /// The run must abort.
    Engine(EngineError),
}

impl From<anyhow::Error> for Failure {
    fn from(error: anyhow::Error) -> Self {
        Self::Exception(error)
    }
}

impl From<EngineError> for Failure {
    fn from(error: EngineError) -> Self {
        Self::Engine(error)
    }
}

impl From<ValidatorContractError> for Failure {
    fn from(error: ValidatorContractError) -> Self {
        Self::Engine(error.into())
    }
}

/// Runs `constraint` with the table selected by the rule's base type.
pub(crate) async fn dispatch(constraint: &Constraint, check: &Check<'_>) -> Result<Verdict, Failure> {
    let base_type = check.rule.base_type();
    if let (Some(BaseType::Object), Constraint::Block(block)) = (base_type, constraint) {
        return generic::run_custom(block, check).await;
    }

    let specific = match base_type {
        Some(BaseType::Boolean) => boolean::validate(constraint, check),
        Some(BaseType::Number) => number::validate(constraint, check),
        Some(BaseType::String) => string::validate(constraint, check),
        Some(BaseType::Array) => array::validate(constraint, check),
        Some(BaseType::Object) => object::validate(constraint, check),
        Some(BaseType::Date) => date::validate(constraint, check),
        None => None,
    };
    match specific {
        Some(verdict) => Ok(verdict),
        None => generic::validate(constraint, check).await,
    }
}

// ============================================================================
// HELPERS
// ============================================================================

/// Name of the JSON type of `value` as used in type-mismatch messages.
pub(crate) fn type_name_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "Boolean",
        Value::Number(_) => "Number",
        Value::String(_) => "String",
        Value::Array(_) => "Array",
        Value::Object(_) => "Object",
    }
}

/// Path segment addressing an array item: its `_key` if it has one,
/// otherwise its index.
pub(crate) fn item_segment(item: &Value, index: usize) -> PathSegment {
    match item.get("_key").and_then(Value::as_str) {
        Some(key) => PathSegment::keyed(key),
        None => PathSegment::Index(index),
    }
}

/// Formats a number the way it reads in messages (`5`, not `5.0`).
pub(crate) fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// True for absent or null values.
pub(crate) fn is_empty(value: Option<&Value>) -> bool {
    value.is_none_or(Value::is_null)
}
