//! Object constraints

use super::Check;
use crate::document::ValidationContext;
use crate::foundation::{Path, ValidationError, Verdict};
use crate::rule::{Constraint, CustomValidator, Presence};
use async_trait::async_trait;
use serde_json::Value;

/// Keys that do not make an object "present".
const METADATA_KEYS: [&str; 3] = ["_key", "_type", "_weak"];

pub(super) fn validate(constraint: &Constraint, check: &Check<'_>) -> Option<Verdict> {
    let verdict = match constraint {
        Constraint::Presence(Presence::Required) => {
            let present = check.value.and_then(Value::as_object).is_some_and(|object| {
                object.keys().any(|key| !METADATA_KEYS.contains(&key.as_str()))
            });
            if present {
                Verdict::Valid
            } else {
                check.fail("Required")
            }
        }
        Constraint::Reference => match check.value {
            Some(value) if !value.is_null() && !value.get("_ref").is_some_and(Value::is_string) => {
                check.fail("Must be a reference to a document")
            }
            _ => Verdict::Valid,
        },
        Constraint::AssetRequired(kind) => {
            let has_asset = check
                .value
                .and_then(|value| value.get("asset"))
                .and_then(|asset| asset.get("_ref"))
                .and_then(Value::as_str)
                .is_some_and(|reference| !reference.is_empty());
            if has_asset {
                Verdict::Valid
            } else {
                check.fail(kind.message())
            }
        }
        _ => return None,
    };
    Some(verdict)
}

/// Reports properties that are not declared fields of the object type.
///
/// Properties starting with `_` are metadata and never reported. Attached as
/// a warning by the document validator in the CLI environment.
#[derive(Debug, Clone)]
pub struct UnknownFieldsValidator {
    declared: Vec<String>,
}

impl UnknownFieldsValidator {
    /// Creates a validator for an object type with the given field names.
    pub fn new<I, S>(declared: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            declared: declared.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl CustomValidator for UnknownFieldsValidator {
    async fn validate(
        &self,
        value: Option<&Value>,
        _context: &ValidationContext<'_>,
    ) -> anyhow::Result<Verdict> {
        let Some(object) = value.and_then(Value::as_object) else {
            return Ok(Verdict::Valid);
        };
        let unknown: Vec<Verdict> = object
            .keys()
            .filter(|key| !key.starts_with('_') && !self.declared.iter().any(|name| name == *key))
            .map(|key| {
                ValidationError::new(format!("Property \"{key}\" is not defined in schema"))
                    .with_path(Path::root().child(key.as_str()))
                    .into()
            })
            .collect();
        Ok(Verdict::Many(unknown))
    }
}
