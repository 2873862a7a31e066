//! Prelude module for convenient imports.
//!
//! Provides a single `use lattice_validator::prelude::*;` import that brings
//! in the rule builder, the schema builder and the document validator.
//!
//! # Examples
//!
//! ```rust,ignore
//! use lattice_validator::prelude::*;
//!
//! let title = Rule::string().required().max(80);
//! let homepage = Rule::string().uri(UriOptions::default().scheme(["https"]))?;
//! ```

// ============================================================================
// FOUNDATION: Markers and paths
// ============================================================================

pub use crate::foundation::{
    Level, Operation, Path, PathSegment, ValidationError, ValidationMarker, Verdict, sort_markers,
};
pub use crate::path;

// ============================================================================
// RULES
// ============================================================================

pub use crate::rule::{
    BaseType, Bound, Casing, Constraint, CustomCheck, CustomValidator, FieldRef, FnValidator,
    RegexOptions, Rule, UriOptions,
};

// ============================================================================
// SCHEMA AND DOCUMENTS
// ============================================================================

pub use crate::config::{Environment, ValidationOptions};
pub use crate::document::{
    Collaborators, DocumentExists, DocumentValidator, QueryClient, ValidationContext,
    validate_document,
};
pub use crate::error::{EngineError, RuleBuildError, SchemaError, ValidatorContractError};
pub use crate::normalize::{RuleIndex, infer_from_schema, normalize_validation_rules};
pub use crate::schema::{JsonType, Schema, SchemaBuilder, TypeDef, TypeId, Validation};
