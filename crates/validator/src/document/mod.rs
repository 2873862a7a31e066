//! Document validator
//!
//! Walks a document against its schema type and collects the markers of
//! every rule on every node. Configuration errors found while running
//! ([`EngineError`]) abort the run and surface as one root-level error
//! marker, so [`DocumentValidator::validate`] always returns a marker list.
//!
//! # Examples
//!
//! ```rust,ignore
//! use lattice_validator::prelude::*;
//! use std::sync::Arc;
//!
//! let schema = Schema::builder()
//!     .define(
//!         TypeDef::document("post")
//!             .field("title", TypeDef::of("string").validation(Validation::rule(Rule::required))),
//!     )
//!     .build()?;
//!
//! let validator = DocumentValidator::new(Arc::new(schema))?;
//! let markers = validator.validate(&json!({"_id": "p1", "_type": "post"})).await;
//! assert_eq!(markers[0].message(), "Required");
//! ```

mod context;
mod resolve;
mod walker;

pub use context::{Collaborators, DocumentExists, QueryClient, ValidationContext};
pub use resolve::resolve_type_for_array_item;

use crate::config::{Environment, ValidationOptions};
use crate::error::{EngineError, RuleBuildError};
use crate::foundation::{Path, ValidationMarker};
use crate::normalize::{RuleIndex, infer_from_schema};
use crate::schema::{Schema, TypeId};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, warn};
use walker::Walker;

/// Validates documents against one schema.
///
/// Rules are derived once, when the validator is created. The validator is
/// cheap to share across tasks behind an `Arc`.
#[derive(Debug)]
pub struct DocumentValidator {
    schema: Arc<Schema>,
    index: RuleIndex,
    services: Collaborators,
}

impl DocumentValidator {
    /// Derives the rules of every type in `schema`.
    ///
    /// Fails when a type's validation builds an invalid rule.
    pub fn new(schema: Arc<Schema>) -> Result<Self, RuleBuildError> {
        let index = infer_from_schema(&schema)?;
        Ok(Self {
            schema,
            index,
            services: Collaborators::default(),
        })
    }

    /// Sets the run options.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_options(mut self, options: ValidationOptions) -> Self {
        self.services = self.services.with_options(options);
        self
    }

    /// Sets the query client used by slug uniqueness checks.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_client(mut self, client: Arc<dyn QueryClient>) -> Self {
        self.services = self.services.with_client(client);
        self
    }

    /// Sets the lookup used by reference existence checks.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_document_exists(mut self, lookup: Arc<dyn DocumentExists>) -> Self {
        self.services = self.services.with_document_exists(lookup);
        self
    }

    /// The schema.
    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// The run options.
    #[must_use]
    pub fn options(&self) -> &ValidationOptions {
        self.services.options()
    }

    /// Validates a whole document, selecting the schema type by `_type`.
    pub async fn validate(&self, document: &Value) -> Vec<ValidationMarker> {
        run_document(&self.schema, &self.index, &self.services, document).await
    }

    /// Validates `value` as `type_id` at `path` with no enclosing document.
    pub async fn validate_item(
        &self,
        value: &Value,
        type_id: TypeId,
        path: Path,
    ) -> Result<Vec<ValidationMarker>, EngineError> {
        let walker = Walker {
            schema: &self.schema,
            index: &self.index,
            services: &self.services,
            document: None,
        };
        walker.validate_item(Some(value), Some(type_id), path, None).await
    }
}

/// One-shot validation of `document` against `schema`.
///
/// Derives rules on every call; build a [`DocumentValidator`] to validate
/// many documents.
pub async fn validate_document(
    document: &Value,
    schema: &Schema,
    services: &Collaborators,
) -> Vec<ValidationMarker> {
    match infer_from_schema(schema) {
        Ok(index) => run_document(schema, &index, services, document).await,
        Err(err) => {
            error!(error = %err, "schema validation rules could not be built");
            vec![ValidationMarker::error(Path::root(), err.to_string())]
        }
    }
}

async fn run_document(
    schema: &Schema,
    index: &RuleIndex,
    services: &Collaborators,
    document: &Value,
) -> Vec<ValidationMarker> {
    let Some(type_name) = document.get("_type").and_then(Value::as_str) else {
        return vec![ValidationMarker::error(
            Path::root(),
            "Tried to validate a value without a '_type'",
        )];
    };
    let document_id = document.get("_id").and_then(Value::as_str).unwrap_or_default();

    let Some(type_id) = schema.get(type_name) else {
        return match services.options().environment {
            Environment::Studio => {
                warn!(
                    document_type = type_name,
                    "schema type for document not found, skipping validation"
                );
                Vec::new()
            }
            Environment::Cli => vec![ValidationMarker::warning(
                Path::root(),
                format!("Could not find schema type for type '{type_name}', skipping validation"),
            )],
        };
    };

    debug!(document_id, document_type = type_name, "validating document");
    let walker = Walker {
        schema,
        index,
        services,
        document: Some(document),
    };
    match walker
        .validate_item(Some(document), Some(type_id), Path::root(), None)
        .await
    {
        Ok(markers) => {
            debug!(document_id, markers = markers.len(), "document validated");
            markers
        }
        Err(err) => {
            error!(document_id, error = %err, "document validation aborted");
            vec![ValidationMarker::error(Path::root(), err.to_string())]
        }
    }
}
