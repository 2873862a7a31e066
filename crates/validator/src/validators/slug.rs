//! Slug validation
//!
//! A slug is an object with a `current` string. Uniqueness is checked with
//! the [`QueryClient`](crate::document::QueryClient) collaborator: no other
//! document of the same type (ignoring this document's draft and published
//! versions) may use the same slug at the same path.

use crate::document::ValidationContext;
use crate::foundation::{Path, PathSegment, Verdict};
use crate::rule::CustomValidator;
use anyhow::Context as _;
use async_trait::async_trait;
use serde_json::{Value, json};

/// Tag attached to the uniqueness query.
pub const SLUG_QUERY_TAG: &str = "validation.slug-is-unique";

const DRAFTS_PREFIX: &str = "drafts.";

/// Validates slug values and their uniqueness.
#[derive(Debug, Clone, Copy, Default)]
pub struct SlugValidator;

#[async_trait]
impl CustomValidator for SlugValidator {
    async fn validate(
        &self,
        value: Option<&Value>,
        context: &ValidationContext<'_>,
    ) -> anyhow::Result<Verdict> {
        let Some(slug) = value.filter(|value| !value.is_null()) else {
            return Ok(Verdict::Valid);
        };
        let Some(slug) = slug.as_object() else {
            return Ok("Slug must be an object".into());
        };
        let Some(current) = slug
            .get("current")
            .and_then(Value::as_str)
            .filter(|current| !current.is_empty())
        else {
            return Ok("Slug must have a value".into());
        };

        if is_unique(current, context).await? {
            Ok(Verdict::Valid)
        } else {
            Ok("Slug is already in use".into())
        }
    }
}

/// Asks the query client whether `slug` is free at the context path.
///
/// Without a document in context there is nothing to compare against and
/// the slug counts as unique.
pub async fn is_unique(slug: &str, context: &ValidationContext<'_>) -> anyhow::Result<bool> {
    let Some((id, doc_type)) = context.document().and_then(|document| {
        let id = document.get("_id")?.as_str()?;
        let doc_type = document.get("_type")?.as_str()?;
        Some((id, doc_type))
    }) else {
        return Ok(true);
    };

    let client = context
        .services()
        .client()
        .context("`getClient` was not provided in validation context")?;

    let published = id.strip_prefix(DRAFTS_PREFIX).unwrap_or(id);
    let query = format!(
        "!defined(*[_type == $docType && !(_id in [$draft, $published]) && {} == $slug][0]._id)",
        query_attribute(context.path())
    );
    let params = json!({
        "docType": doc_type,
        "draft": format!("{DRAFTS_PREFIX}{published}"),
        "published": published,
        "slug": slug,
    });

    let answer = client.fetch(&query, &params, SLUG_QUERY_TAG).await?;
    Ok(answer == Value::Bool(true))
}

/// Query attribute holding the slug text at `path`.
///
/// Array segments become `[]` so the comparison matches the slug in any item
/// of the array, whatever its key or position in the other document.
fn query_attribute(path: &Path) -> String {
    let mut attribute = String::new();
    for segment in path.segments() {
        match segment {
            PathSegment::Key(key) => {
                if !attribute.is_empty() {
                    attribute.push('.');
                }
                attribute.push_str(key);
            }
            PathSegment::Index(_) | PathSegment::Keyed { .. } => attribute.push_str("[]"),
        }
    }
    if !attribute.is_empty() {
        attribute.push('.');
    }
    attribute.push_str("current");
    attribute
}
