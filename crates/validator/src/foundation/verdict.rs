//! Validator results and their conversion into markers
//!
//! Every validator (built-in or custom) produces a [`Verdict`]. The marker
//! converter [`to_markers`] normalizes a verdict into a flat list of
//! path-qualified [`ValidationMarker`]s.

use crate::error::ValidatorContractError;
use crate::foundation::{Level, Path, PathSegment, ValidationError, ValidationMarker};
use serde_json::Value;

// ============================================================================
// VERDICT
// ============================================================================

/// The outcome of one validator invocation.
///
/// `Raw` accepts loosely-shaped JSON results from custom validators: `true`
/// passes, a string is a message, an array is converted element-wise and an
/// object with a string `message` (and optional `paths`) is treated like a
/// [`ValidationError`]. Anything else is a contract violation.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// The constraint is satisfied.
    Valid,
    /// Violation at the current node.
    Message(String),
    /// Structured violation.
    Error(ValidationError),
    /// Several results.
    Many(Vec<Verdict>),
    /// Loosely-shaped result from user code.
    Raw(Value),
}

impl Verdict {
    /// Builds a message verdict, preferring the rule's override message.
    pub fn fail(message: Option<&str>, default: impl Into<String>) -> Self {
        Self::Message(message.map_or_else(|| default.into(), str::to_owned))
    }
}

impl From<bool> for Verdict {
    fn from(ok: bool) -> Self {
        if ok { Self::Valid } else { Self::Raw(Value::Bool(false)) }
    }
}

impl From<&str> for Verdict {
    fn from(message: &str) -> Self {
        Self::Message(message.to_owned())
    }
}

impl From<String> for Verdict {
    fn from(message: String) -> Self {
        Self::Message(message)
    }
}

impl From<ValidationError> for Verdict {
    fn from(error: ValidationError) -> Self {
        Self::Error(error)
    }
}

impl From<Vec<Verdict>> for Verdict {
    fn from(results: Vec<Verdict>) -> Self {
        Self::Many(results)
    }
}

// ============================================================================
// MARKER CONVERSION
// ============================================================================

/// Converts a verdict into markers at `path` with `level`.
///
/// - `Valid` → no markers
/// - `Message` → one marker at `path`
/// - `Many` → concatenation of the converted elements
/// - `Error` with empty `paths` → one marker at `path`
/// - `Error` with `paths` → one marker per relative path, prefixed with `path`
///
/// Uninterpretable `Raw` values fail with
/// [`ValidatorContractError::InvalidOutput`].
pub fn to_markers(
    verdict: Verdict,
    level: Level,
    path: &Path,
) -> Result<Vec<ValidationMarker>, ValidatorContractError> {
    match verdict {
        Verdict::Valid => Ok(Vec::new()),
        Verdict::Message(message) => to_markers(
            Verdict::Error(ValidationError::new(message)),
            level,
            path,
        ),
        Verdict::Many(results) => {
            let mut markers = Vec::new();
            for result in results {
                markers.extend(to_markers(result, level, path)?);
            }
            Ok(markers)
        }
        Verdict::Error(error) => {
            if error.paths.is_empty() {
                return Ok(vec![ValidationMarker::new(level, path.clone(), error)]);
            }
            Ok(error
                .paths
                .iter()
                .map(|relative| ValidationMarker::new(level, path.concat(relative), error.clone()))
                .collect())
        }
        Verdict::Raw(value) => to_markers(interpret_raw(value, path)?, level, path),
    }
}

fn interpret_raw(value: Value, path: &Path) -> Result<Verdict, ValidatorContractError> {
    match value {
        Value::Bool(true) => Ok(Verdict::Valid),
        Value::String(message) => Ok(Verdict::Message(message)),
        Value::Array(items) => Ok(Verdict::Many(items.into_iter().map(Verdict::Raw).collect())),
        Value::Object(ref map) => match map.get("message") {
            Some(Value::String(message)) => {
                let paths = map
                    .get("paths")
                    .and_then(Value::as_array)
                    .map(|paths| paths.iter().filter_map(raw_path).collect())
                    .unwrap_or_default();
                Ok(Verdict::Error(
                    ValidationError::new(message.clone()).with_paths(paths),
                ))
            }
            _ => Err(invalid_output(&value, path)),
        },
        other => Err(invalid_output(&other, path)),
    }
}

fn raw_path(value: &Value) -> Option<Path> {
    value
        .as_array()?
        .iter()
        .map(|segment| serde_json::from_value::<PathSegment>(segment.clone()).ok())
        .collect()
}

fn invalid_output(value: &Value, path: &Path) -> ValidatorContractError {
    ValidatorContractError::InvalidOutput {
        path: path.clone(),
        found: value.to_string(),
    }
}
