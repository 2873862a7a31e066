//! Validation context and collaborators

use crate::config::{Environment, ValidationOptions};
use crate::foundation::Path;
use crate::schema::{Schema, SchemaType, TypeId};
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tokio::sync::Semaphore;

// ============================================================================
// COLLABORATORS
// ============================================================================

/// Runs content-lake queries for validators that need them (slug
/// uniqueness).
#[async_trait]
pub trait QueryClient: Send + Sync {
    /// Executes `query` with `params`. `tag` identifies the caller.
    async fn fetch(&self, query: &str, params: &Value, tag: &str) -> anyhow::Result<Value>;
}

/// Answers whether a published document exists (reference checks).
#[async_trait]
pub trait DocumentExists: Send + Sync {
    /// `id` never carries the `drafts.` prefix.
    async fn exists(&self, id: &str) -> anyhow::Result<bool>;
}

/// Services and settings shared by every node of a validation run.
#[derive(Clone, Default)]
pub struct Collaborators {
    client: Option<Arc<dyn QueryClient>>,
    document_exists: Option<Arc<dyn DocumentExists>>,
    options: ValidationOptions,
    custom_limiter: Option<Arc<Semaphore>>,
}

impl Collaborators {
    /// Sets the query client.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_client(mut self, client: Arc<dyn QueryClient>) -> Self {
        self.client = Some(client);
        self
    }

    /// Sets the document existence lookup.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_document_exists(mut self, lookup: Arc<dyn DocumentExists>) -> Self {
        self.document_exists = Some(lookup);
        self
    }

    /// Sets the options. A custom concurrency cap creates a fresh semaphore.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_options(mut self, options: ValidationOptions) -> Self {
        self.custom_limiter = options
            .max_custom_concurrency
            .map(|permits| Arc::new(Semaphore::new(permits.max(1))));
        self.options = options;
        self
    }

    /// The query client, if provided.
    #[must_use]
    pub fn client(&self) -> Option<&dyn QueryClient> {
        self.client.as_deref()
    }

    /// The existence lookup, if provided.
    #[must_use]
    pub fn document_exists(&self) -> Option<&dyn DocumentExists> {
        self.document_exists.as_deref()
    }

    /// Options of the run.
    #[must_use]
    pub fn options(&self) -> &ValidationOptions {
        &self.options
    }

    pub(crate) fn custom_limiter(&self) -> Option<&Semaphore> {
        self.custom_limiter.as_deref()
    }
}

impl fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collaborators")
            .field("client", &self.client.is_some())
            .field("document_exists", &self.document_exists.is_some())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// VALIDATION CONTEXT
// ============================================================================

/// Where a value sits in the document being validated.
///
/// Passed to every validator. Cheap to derive: builder methods move the
/// context and only the path is owned.
#[derive(Debug, Clone)]
pub struct ValidationContext<'a> {
    document: Option<&'a Value>,
    parent: Option<&'a Value>,
    path: Path,
    schema: Option<&'a Schema>,
    type_id: Option<TypeId>,
    services: &'a Collaborators,
}

impl<'a> ValidationContext<'a> {
    /// A context at the root with nothing but services.
    #[must_use]
    pub fn new(services: &'a Collaborators) -> Self {
        Self {
            document: None,
            parent: None,
            path: Path::root(),
            schema: None,
            type_id: None,
            services,
        }
    }

    /// Sets the document being validated.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_document(mut self, document: &'a Value) -> Self {
        self.document = Some(document);
        self
    }

    /// Sets the enclosing value.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_parent(mut self, parent: &'a Value) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Sets the path of the value.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_path(mut self, path: Path) -> Self {
        self.path = path;
        self
    }

    /// Sets the schema type of the value.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_type(mut self, schema: &'a Schema, type_id: TypeId) -> Self {
        self.schema = Some(schema);
        self.type_id = Some(type_id);
        self
    }

    /// The document being validated.
    #[must_use]
    pub fn document(&self) -> Option<&'a Value> {
        self.document
    }

    /// The value enclosing the current one.
    #[must_use]
    pub fn parent(&self) -> Option<&'a Value> {
        self.parent
    }

    /// Path of the current value.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The schema, when validating through one.
    #[must_use]
    pub fn schema(&self) -> Option<&'a Schema> {
        self.schema
    }

    /// Schema type of the current value.
    #[must_use]
    pub fn schema_type(&self) -> Option<&'a SchemaType> {
        Some(&self.schema?[self.type_id?])
    }

    /// Shared services.
    #[must_use]
    pub fn services(&self) -> &'a Collaborators {
        self.services
    }

    /// Shortcut for `services().options().environment`.
    #[must_use]
    pub fn environment(&self) -> Environment {
        self.services.options.environment
    }
}
