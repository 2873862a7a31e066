//! Reference existence check
//!
//! Attached by the type normalizer to non-weak reference types. The
//! referenced document must exist in published form.

use crate::document::ValidationContext;
use crate::foundation::Verdict;
use crate::rule::CustomValidator;
use anyhow::Context as _;
use async_trait::async_trait;
use serde_json::Value;

/// Fails when a strong reference points at a missing or unpublished
/// document.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceExistsValidator;

/// Strips the `drafts.` prefix from a document id.
#[must_use]
pub fn published_id(id: &str) -> &str {
    id.strip_prefix("drafts.").unwrap_or(id)
}

#[async_trait]
impl CustomValidator for ReferenceExistsValidator {
    async fn validate(
        &self,
        value: Option<&Value>,
        context: &ValidationContext<'_>,
    ) -> anyhow::Result<Verdict> {
        let Some(reference) = value
            .and_then(|value| value.get("_ref"))
            .and_then(Value::as_str)
        else {
            return Ok(Verdict::Valid);
        };

        let lookup = context
            .services()
            .document_exists()
            .context("`getDocumentExists` was not provided in validation context")?;

        if lookup.exists(published_id(reference)).await? {
            Ok(Verdict::Valid)
        } else {
            Ok("Referenced document does not exist or is not published".into())
        }
    }
}
