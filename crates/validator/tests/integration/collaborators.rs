//! Validators that consult injected services.

use crate::support::{compile, summary};
use async_trait::async_trait;
use lattice_validator::prelude::*;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct TakenSlugs {
    taken: Vec<&'static str>,
    calls: Mutex<Vec<(String, Value, String)>>,
}

#[async_trait]
impl QueryClient for TakenSlugs {
    async fn fetch(&self, query: &str, params: &Value, tag: &str) -> anyhow::Result<Value> {
        self.calls
            .lock()
            .unwrap()
            .push((query.to_owned(), params.clone(), tag.to_owned()));
        let slug = params["slug"].as_str().unwrap_or_default();
        Ok(Value::Bool(!self.taken.contains(&slug)))
    }
}

struct Published(Vec<&'static str>);

#[async_trait]
impl DocumentExists for Published {
    async fn exists(&self, id: &str) -> anyhow::Result<bool> {
        Ok(self.0.contains(&id))
    }
}

fn post_schema() -> Arc<Schema> {
    compile(
        Schema::builder().define(
            TypeDef::document("post")
                .field("slugField", TypeDef::of("slug"))
                .field("author", TypeDef::of("reference"))
                .field("related", TypeDef::of("reference").weak())
                .field("cover", TypeDef::of("image")),
        ),
    )
}

#[tokio::test]
async fn slug_uniqueness_asks_the_query_client() {
    let client = Arc::new(TakenSlugs {
        taken: vec!["hello-world"],
        ..TakenSlugs::default()
    });
    let validator = DocumentValidator::new(post_schema())
        .unwrap()
        .with_client(client.clone());

    let document = json!({
        "_id": "drafts.post-1",
        "_type": "post",
        "slugField": {"_type": "slug", "current": "hello-world"}
    });
    let markers = validator.validate(&document).await;
    assert_eq!(
        summary(&markers),
        vec![(path!["slugField"], Level::Error, "Slug is already in use".to_owned())]
    );

    let calls = client.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    let (query, params, tag) = &calls[0];
    assert_eq!(
        query,
        "!defined(*[_type == $docType && !(_id in [$draft, $published]) && slugField.current == $slug][0]._id)"
    );
    assert_eq!(
        params,
        &json!({
            "docType": "post",
            "draft": "drafts.post-1",
            "published": "post-1",
            "slug": "hello-world"
        })
    );
    assert_eq!(tag, "validation.slug-is-unique");
}

#[tokio::test]
async fn free_slugs_pass() {
    let validator = DocumentValidator::new(post_schema())
        .unwrap()
        .with_client(Arc::new(TakenSlugs::default()));

    let document = json!({
        "_id": "post-1",
        "_type": "post",
        "slugField": {"_type": "slug", "current": "fresh"}
    });
    assert!(validator.validate(&document).await.is_empty());
}

#[tokio::test]
async fn missing_client_becomes_an_exception_marker() {
    let validator = DocumentValidator::new(post_schema()).unwrap();

    let document = json!({
        "_id": "post-1",
        "_type": "post",
        "slugField": {"_type": "slug", "current": "fresh"}
    });
    let markers = validator.validate(&document).await;
    assert_eq!(
        summary(&markers),
        vec![(
            path!["slugField"],
            Level::Error,
            "slugField: Exception occurred while validating value: `getClient` was not provided in validation context"
                .to_owned()
        )]
    );
}

#[tokio::test]
async fn strong_references_must_resolve() {
    let validator = DocumentValidator::new(post_schema())
        .unwrap()
        .with_document_exists(Arc::new(Published(vec!["author-1"])));

    let good = json!({
        "_id": "post-1",
        "_type": "post",
        "author": {"_type": "reference", "_ref": "drafts.author-1"}
    });
    assert!(validator.validate(&good).await.is_empty());

    let dangling = json!({
        "_id": "post-1",
        "_type": "post",
        "author": {"_type": "reference", "_ref": "ghost"},
        "related": {"_type": "reference", "_ref": "ghost"}
    });
    assert_eq!(
        summary(&validator.validate(&dangling).await),
        vec![(
            path!["author"],
            Level::Error,
            "Referenced document does not exist or is not published".to_owned()
        )]
    );
}

#[tokio::test]
async fn weak_references_never_look_up_documents() {
    // No lookup service: a lookup attempt would surface as an exception marker.
    let validator = DocumentValidator::new(post_schema()).unwrap();

    let document = json!({
        "_id": "post-1",
        "_type": "post",
        "related": {"_type": "reference", "_ref": "ghost"},
        "cover": {"_type": "image", "asset": {"_type": "reference", "_ref": "image-abc"}}
    });
    assert!(validator.validate(&document).await.is_empty());
}

#[tokio::test]
async fn slugs_inside_array_items_compare_across_all_items() {
    let client = Arc::new(TakenSlugs {
        taken: vec!["intro"],
        ..TakenSlugs::default()
    });
    let schema = compile(
        Schema::builder()
            .define(TypeDef::object("section").field("slug", TypeDef::of("slug")))
            .define(
                TypeDef::document("page")
                    .field("sections", TypeDef::array().member(TypeDef::of("section"))),
            ),
    );
    let validator = DocumentValidator::new(schema).unwrap().with_client(client.clone());

    let document = json!({
        "_id": "page-1",
        "_type": "page",
        "sections": [
            {"_key": "a", "slug": {"_type": "slug", "current": "intro"}},
            {"slug": {"_type": "slug", "current": "outro"}}
        ]
    });
    let markers = validator.validate(&document).await;
    assert_eq!(
        summary(&markers),
        vec![(
            path!["sections", PathSegment::keyed("a"), "slug"],
            Level::Error,
            "Slug is already in use".to_owned()
        )]
    );

    let calls = client.calls.lock().unwrap();
    let queries: Vec<&str> = calls.iter().map(|(query, _, _)| query.as_str()).collect();
    let expected =
        "!defined(*[_type == $docType && !(_id in [$draft, $published]) && sections[].slug.current == $slug][0]._id)";
    assert_eq!(queries, vec![expected, expected]);
}
