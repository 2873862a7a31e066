//! Engine error types
//!
//! Violated constraints are *not* errors: they become
//! [`ValidationMarker`](crate::foundation::ValidationMarker)s. The types here
//! cover the failures that abort work:
//!
//! - [`RuleBuildError`]: a malformed rule, raised while rules are built
//!   (usually at schema-compile time).
//! - [`ValidatorContractError`]: a validator produced something the engine
//!   cannot interpret. This is a programming defect in schema code.
//! - [`SchemaError`]: the schema graph could not be compiled.
//! - [`EngineError`]: what `Rule::validate` and item validation return.

use crate::foundation::Path;

// ============================================================================
// RULE BUILD ERROR
// ============================================================================

/// A rule could not be constructed.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum RuleBuildError {
    /// `Rule::of_type` got a name outside Boolean/Number/String/Array/Object/Date.
    #[error("Unknown type \"{name}\"")]
    UnknownType {
        /// The rejected name.
        name: String,
    },

    /// `Rule::merge` on two rules with different base types.
    #[error("merge() failed: conflicting types \"{left}\" and \"{right}\"")]
    ConflictingTypes {
        /// Base type of the receiver.
        left: String,
        /// Base type of the argument.
        right: String,
    },

    /// `Rule::uri` was given an empty scheme list.
    #[error("scheme must have at least 1 scheme specified")]
    EmptySchemeList,

    /// A regular expression did not compile.
    #[error("invalid pattern `{pattern}`: {source}")]
    InvalidPattern {
        /// The source pattern.
        pattern: String,
        /// The regex compiler error.
        #[source]
        source: regex::Error,
    },

    /// `Rule::fields` called on a rule that is not object-typed.
    #[error("fields() can only be called on an object type, got {found}")]
    FieldsOnNonObject {
        /// The rule's base type, or "untyped".
        found: String,
    },
}

// ============================================================================
// VALIDATOR CONTRACT ERROR
// ============================================================================

/// A validator broke the result contract.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ValidatorContractError {
    /// A custom validator returned something that is neither `true`, a
    /// string, nor an object with a string `message`.
    #[error("{path}: Validator must return true, a string, or a ValidationError-like object (got {found})")]
    InvalidOutput {
        /// Node being validated.
        path: Path,
        /// JSON rendering of the offending value.
        found: String,
    },

    /// A constraint was attached to a rule whose base type has no validator
    /// for it (e.g. `unique()` on a string rule).
    #[error("Validator for flag \"{flag}\" not found for {target}")]
    UnsupportedConstraint {
        /// Constraint flag.
        flag: &'static str,
        /// `type "X"` or `rule without declared type`.
        target: String,
    },
}

// ============================================================================
// SCHEMA ERROR
// ============================================================================

/// The schema graph could not be compiled.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum SchemaError {
    /// A type definition extends a name that is not registered.
    #[error("unknown type \"{name}\" referenced by \"{referenced_by}\"")]
    UnknownType {
        /// Missing type name.
        name: String,
        /// The definition that referenced it.
        referenced_by: String,
    },

    /// Two named types share a name.
    #[error("type \"{0}\" is defined more than once")]
    DuplicateType(String),

    /// A type inherits from itself.
    #[error("type \"{0}\" inherits from itself")]
    CircularInheritance(String),
}

// ============================================================================
// ENGINE ERROR
// ============================================================================

/// Failure that aborts a validation run.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum EngineError {
    /// A rule could not be built (e.g. inside a `fields()` rule builder).
    #[error(transparent)]
    Build(#[from] RuleBuildError),

    /// A validator broke its result contract.
    #[error(transparent)]
    Contract(#[from] ValidatorContractError),
}
