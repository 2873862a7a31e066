//! Validation errors and markers
//!
//! A [`ValidationError`] is the payload of one violated constraint. It can
//! point at the node it was raised on (empty `paths`) or at specific
//! sub-paths relative to that node (used by array validators that blame
//! individual items).
//!
//! A [`ValidationMarker`] is the engine's only output: one marker per
//! (document path, violated constraint), carrying the [`Level`] of the rule
//! that produced it.
//!
//! Message strings use `Cow<'static, str>` so the built-in messages never
//! allocate.

use crate::foundation::Path;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

// ============================================================================
// LEVEL
// ============================================================================

/// Severity of a marker.
///
/// `Error` markers typically block publishing in the consuming UI, `Warning`
/// and `Info` are advisory. The engine only carries the level through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// Must be fixed (default).
    #[default]
    Error,
    /// Should be addressed.
    Warning,
    /// Informational.
    Info,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        })
    }
}

/// How the children of a composite error were combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Operation {
    /// Every child rule had to pass (`Rule::all`).
    And,
    /// At least one child rule had to pass (`Rule::either`).
    Or,
}

// ============================================================================
// VALIDATION ERROR
// ============================================================================

/// A violated constraint.
///
/// # Examples
///
/// ```rust,ignore
/// use lattice_validator::foundation::{Path, ValidationError};
///
/// // Applies to the node itself
/// let error = ValidationError::new("Required");
///
/// // Applies to items 0 and 2 of the array being validated
/// let error = ValidationError::new("Can't be a duplicate")
///     .with_paths(vec![path![0usize], path![2usize]]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValidationError {
    /// Human-readable message.
    pub message: Cow<'static, str>,

    /// Sub-paths, relative to the validated node, that this error applies
    /// to. Empty means "the node itself".
    #[serde(default)]
    pub paths: Vec<Path>,

    /// Markers of child rules (`all` / `either`).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ValidationMarker>,

    /// How `children` were combined.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<Operation>,
}

impl ValidationError {
    /// Creates an error that applies to the current node.
    pub fn new(message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            message: message.into(),
            paths: Vec::new(),
            children: Vec::new(),
            operation: None,
        }
    }

    /// Sets the relative sub-paths this error applies to.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_paths(mut self, paths: Vec<Path>) -> Self {
        self.paths = paths;
        self
    }

    /// Adds a single relative sub-path.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_path(mut self, path: Path) -> Self {
        self.paths.push(path);
        self
    }

    /// Attaches the markers of child rules.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_children(mut self, children: Vec<ValidationMarker>) -> Self {
        self.children = children;
        self
    }

    /// Sets how the children were combined.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_operation(mut self, operation: Operation) -> Self {
        self.operation = Some(operation);
        self
    }

    /// Returns a copy with the message replaced.
    #[must_use]
    pub fn clone_with_message(&self, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            message: message.into(),
            ..self.clone()
        }
    }

    /// True if the error targets the node itself.
    #[must_use]
    pub fn is_node_level(&self) -> bool {
        self.paths.is_empty()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)?;
        if !self.children.is_empty() {
            for child in &self.children {
                write!(f, "\n  - {child}")?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

// ============================================================================
// VALIDATION MARKER
// ============================================================================

/// One violated constraint at one document path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValidationMarker {
    /// Severity of the rule that produced the marker.
    pub level: Level,
    /// Absolute path of the offending node.
    pub path: Path,
    /// The violated constraint.
    pub item: ValidationError,
}

impl ValidationMarker {
    /// Creates a marker.
    pub fn new(level: Level, path: Path, item: ValidationError) -> Self {
        Self { level, path, item }
    }

    /// Creates an error-level marker with a plain message.
    pub fn error(path: Path, message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(Level::Error, path, ValidationError::new(message))
    }

    /// Creates a warning-level marker with a plain message.
    pub fn warning(path: Path, message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(Level::Warning, path, ValidationError::new(message))
    }

    /// The marker message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.item.message
    }
}

impl fmt::Display for ValidationMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.level, self.path, self.item)
    }
}

/// Sorts markers by path, then message, then level.
///
/// Marker order across nodes is unspecified; callers that compare or render
/// marker lists should sort them first.
pub fn sort_markers(markers: &mut [ValidationMarker]) {
    markers.sort_by(|a, b| {
        a.path
            .cmp(&b.path)
            .then_with(|| a.item.message.cmp(&b.item.message))
            .then_with(|| a.level.to_string().cmp(&b.level.to_string()))
    });
}
