//! Whole-document validation.

use crate::support::{required, summary, validator};
use lattice_validator::prelude::*;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;

fn this_is_required() -> Validation {
    Validation::rules(|rule| {
        vec![
            rule.clone().required().error("This is required!"),
            rule.max(160).warning("Too long!"),
        ]
    })
}

#[tokio::test]
async fn null_required_string_reports_type_then_presence() {
    let validator = validator(
        Schema::builder().define(
            TypeDef::document("simpleDoc")
                .title("Simple Document")
                .field("title", TypeDef::of("string").validation(required())),
        ),
    );
    let document = json!({
        "_id": "testId",
        "_type": "simpleDoc",
        "_rev": "exampleRev",
        "title": null
    });

    let markers = validator.validate(&document).await;
    assert_eq!(
        summary(&markers),
        vec![
            (path!["title"], Level::Error, "Expected type \"String\", got \"null\"".to_owned()),
            (path!["title"], Level::Error, "Required".to_owned()),
        ]
    );
}

#[tokio::test]
async fn null_required_date_reports_type_then_presence() {
    let validator = validator(
        Schema::builder().define(
            TypeDef::document("event").field("due", TypeDef::of("datetime").validation(required())),
        ),
    );
    let markers = validator
        .validate(&json!({"_id": "e1", "_type": "event", "due": null}))
        .await;
    assert_eq!(
        summary(&markers),
        vec![
            (path!["due"], Level::Error, "Must be a valid date".to_owned()),
            (path!["due"], Level::Error, "Required".to_owned()),
        ]
    );
}

#[tokio::test]
async fn required_objects_are_walked_even_when_absent() {
    let validator = validator(
        Schema::builder()
            .define(TypeDef::named("registeredString", "string").validation(this_is_required()))
            .define(
                TypeDef::object("registeredObjectField")
                    .field("foo", TypeDef::of("string").validation(this_is_required())),
            )
            .define(
                TypeDef::object("testObj")
                    .field("registeredString", TypeDef::of("registeredString"))
                    .field("inlineString", TypeDef::of("string").validation(this_is_required()))
                    .field(
                        "registeredObject",
                        TypeDef::of("registeredObjectField").validation(required()),
                    )
                    .field(
                        "inlineObject",
                        TypeDef::of("object")
                            .field("foo", TypeDef::of("string").validation(this_is_required()))
                            .validation(required()),
                    )
                    .field("notRequiredRegisteredObject", TypeDef::of("registeredObjectField"))
                    .field(
                        "notRequiredInlineObject",
                        TypeDef::of("object")
                            .field("foo", TypeDef::of("string").validation(this_is_required())),
                    ),
            ),
    );
    let test_obj = validator.schema().get("testObj").unwrap();

    let markers = validator
        .validate_item(&json!({}), test_obj, Path::root())
        .await
        .unwrap();
    assert_eq!(
        summary(&markers),
        vec![
            (path!["registeredString"], Level::Error, "This is required!".to_owned()),
            (path!["inlineString"], Level::Error, "This is required!".to_owned()),
            (path!["registeredObject"], Level::Error, "Required".to_owned()),
            (path!["registeredObject", "foo"], Level::Error, "This is required!".to_owned()),
            (path!["inlineObject"], Level::Error, "Required".to_owned()),
            (path!["inlineObject", "foo"], Level::Error, "This is required!".to_owned()),
        ]
    );
}

#[tokio::test]
async fn object_level_field_rules_are_deduplicated() {
    let validator = validator(
        Schema::builder().define(
            TypeDef::object("testObj")
                .field("foo", TypeDef::of("string"))
                .field("bar", TypeDef::of("string"))
                .validation(Validation::Builder(Arc::new(
                    |rule: Rule| -> Result<Vec<Rule>, RuleBuildError> {
                        Ok(vec![
                            rule.clone().required(),
                            rule.fields([("foo", required()), ("bar", required())])?,
                        ])
                    },
                ))),
        ),
    );
    let test_obj = validator.schema().get("testObj").unwrap();

    let markers = validator
        .validate_item(&json!({"foo": 5}), test_obj, Path::root())
        .await
        .unwrap();
    assert_eq!(
        summary(&markers),
        vec![
            (path!["foo"], Level::Error, "Expected type \"String\", got \"Number\"".to_owned()),
            (path!["bar"], Level::Error, "Required".to_owned()),
        ]
    );
}

#[tokio::test]
async fn single_member_type_is_assumed_for_untyped_items() {
    let validator = validator(
        Schema::builder()
            .define(TypeDef::object("foo").field("title", TypeDef::of("string")))
            .define(
                TypeDef::document("listDoc")
                    .field("items", TypeDef::array().member(TypeDef::of("foo"))),
            ),
    );
    let document = json!({
        "_id": "a",
        "_type": "listDoc",
        "items": [{"_key": "exampleKey", "title": 5}]
    });

    let markers = validator.validate(&document).await;
    assert_eq!(
        summary(&markers),
        vec![(
            path!["items", PathSegment::keyed("exampleKey"), "title"],
            Level::Error,
            "Expected type \"String\", got \"Number\"".to_owned()
        )]
    );
}

#[tokio::test]
async fn unresolvable_items_are_reported() {
    let validator = validator(
        Schema::builder().define(
            TypeDef::document("mixed").field(
                "items",
                TypeDef::array()
                    .member(TypeDef::of("string"))
                    .member(TypeDef::object("card").field("title", TypeDef::of("string"))),
            ),
        ),
    );
    let document = json!({
        "_id": "a",
        "_type": "mixed",
        "items": ["ok", {"_key": "k1", "_type": "card"}, {"_key": "k2", "_type": "poster"}, 7]
    });

    let markers = validator.validate(&document).await;
    assert_eq!(
        summary(&markers),
        vec![
            (
                path!["items", PathSegment::keyed("k2")],
                Level::Error,
                "Unable to resolve type for item".to_owned()
            ),
            (path!["items", 3usize], Level::Error, "Unable to resolve type for item".to_owned()),
        ]
    );
}

#[tokio::test]
async fn arrays_report_duplicates_and_bad_urls() {
    let validator = validator(
        Schema::builder().define(
            TypeDef::document("page")
                .field(
                    "tags",
                    TypeDef::array()
                        .member(TypeDef::of("string"))
                        .validation(Validation::rule(|rule| rule.unique())),
                )
                .field("homepage", TypeDef::of("url")),
        ),
    );
    let document = json!({
        "_id": "a",
        "_type": "page",
        "tags": ["rust", "json", "rust"],
        "homepage": "ftp://example.com/file"
    });

    let mut markers = validator.validate(&document).await;
    sort_markers(&mut markers);
    assert_eq!(
        summary(&markers),
        vec![
            (path!["homepage"], Level::Error, "Does not match allowed protocols/schemes".to_owned()),
            (path!["tags", 0usize], Level::Error, "Can't be a duplicate".to_owned()),
            (path!["tags", 2usize], Level::Error, "Can't be a duplicate".to_owned()),
        ]
    );
}

#[tokio::test]
async fn list_options_restrict_values() {
    let validator = validator(
        Schema::builder().define(
            TypeDef::document("car").field(
                "color",
                TypeDef::of("string").list([
                    json!({"title": "Red", "value": "red"}),
                    json!({"title": "Blue", "value": "blue"}),
                ]),
            ),
        ),
    );

    let ok = validator
        .validate(&json!({"_id": "a", "_type": "car", "color": "blue"}))
        .await;
    assert!(ok.is_empty());

    let bad = validator
        .validate(&json!({"_id": "a", "_type": "car", "color": "green"}))
        .await;
    assert_eq!(bad[0].message(), "Value did not match any allowed values");
}

#[tokio::test]
async fn annotations_of_blocks_are_validated() {
    let validator = validator(
        Schema::builder().define(
            TypeDef::document("article").field(
                "body",
                TypeDef::array().member(
                    TypeDef::of("block").annotation(
                        TypeDef::object("link")
                            .field("href", TypeDef::of("url").validation(required())),
                    ),
                ),
            ),
        ),
    );
    let document = json!({
        "_id": "a",
        "_type": "article",
        "body": [{
            "_key": "b1",
            "_type": "block",
            "children": [{"_key": "s1", "_type": "span", "text": "hi", "marks": ["l1", "shout"]}],
            "markDefs": [{"_key": "l1", "_type": "link"}]
        }]
    });

    let mut markers = validator.validate(&document).await;
    sort_markers(&mut markers);
    assert_eq!(
        summary(&markers),
        vec![
            (
                path!["body", PathSegment::keyed("b1"), "children", PathSegment::keyed("s1"), "marks"],
                Level::Error,
                "Mark \"shout\" does not match a decorator or an annotation".to_owned()
            ),
            (
                path!["body", PathSegment::keyed("b1"), "markDefs", PathSegment::keyed("l1"), "href"],
                Level::Error,
                "Required".to_owned()
            ),
        ]
    );
}

#[tokio::test]
async fn documents_without_type_get_a_root_marker() {
    let validator = validator(Schema::builder());
    let markers = validator.validate(&json!({"_id": "a"})).await;
    assert_eq!(
        summary(&markers),
        vec![(
            Path::root(),
            Level::Error,
            "Tried to validate a value without a '_type'".to_owned()
        )]
    );
}

#[tokio::test]
async fn unknown_document_types_depend_on_environment() {
    let document = json!({"_id": "a", "_type": "ghost"});

    let studio = validator(Schema::builder());
    assert!(studio.validate(&document).await.is_empty());

    let cli = validator(Schema::builder())
        .with_options(ValidationOptions::default().with_environment(Environment::Cli));
    assert_eq!(
        summary(&cli.validate(&document).await),
        vec![(
            Path::root(),
            Level::Warning,
            "Could not find schema type for type 'ghost', skipping validation".to_owned()
        )]
    );
}

#[tokio::test]
async fn cli_warns_about_undeclared_properties() {
    let builder = || {
        Schema::builder()
            .define(TypeDef::object("myObject").field("title", TypeDef::of("string")))
            .define(TypeDef::named("objectAlias", "myObject"))
            .define(
                TypeDef::document("myDocument")
                    .field("title", TypeDef::of("string"))
                    .field("nested", TypeDef::of("objectAlias")),
            )
    };
    let document = json!({
        "_id": "a",
        "_type": "myDocument",
        "_createdAt": "2021-08-27T14:48:51.650Z",
        "title": "hello",
        "unknownField": 1,
        "nested": {"title": "x", "other": true}
    });

    let studio = validator(builder());
    assert!(studio.validate(&document).await.is_empty());

    let cli = validator(builder())
        .with_options(ValidationOptions::default().with_environment(Environment::Cli));
    let mut markers = cli.validate(&document).await;
    sort_markers(&mut markers);
    assert_eq!(
        summary(&markers),
        vec![
            (
                path!["nested", "other"],
                Level::Warning,
                "Property \"other\" is not defined in schema".to_owned()
            ),
            (
                path!["unknownField"],
                Level::Warning,
                "Property \"unknownField\" is not defined in schema".to_owned()
            ),
        ]
    );
}

#[tokio::test]
async fn configuration_errors_abort_with_one_root_marker() {
    let validator = validator(
        Schema::builder().define(
            TypeDef::document("post")
                .field("title", TypeDef::of("string").validation(Validation::rule(|rule| rule.unique())))
                .field("body", TypeDef::of("string").validation(required())),
        ),
    );

    let markers = validator
        .validate(&json!({"_id": "a", "_type": "post", "title": "x"}))
        .await;
    assert_eq!(
        summary(&markers),
        vec![(
            Path::root(),
            Level::Error,
            "Validator for flag \"unique\" not found for type \"String\"".to_owned()
        )]
    );
}

#[tokio::test]
async fn custom_validator_failures_become_markers() {
    let validator = validator(
        Schema::builder().define(
            TypeDef::document("post").field(
                "title",
                TypeDef::of("string").validation(Validation::rule(|rule| {
                    rule.custom_fn(|_, _| Err(anyhow::anyhow!("boom")))
                })),
            ),
        ),
    );

    let markers = validator
        .validate(&json!({"_id": "a", "_type": "post", "title": "x"}))
        .await;
    assert_eq!(
        summary(&markers),
        vec![(
            path!["title"],
            Level::Error,
            "title: Exception occurred while validating value: boom".to_owned()
        )]
    );
}

#[tokio::test]
async fn field_references_compare_against_siblings() {
    let validator = validator(
        Schema::builder().define(
            TypeDef::document("event")
                .field("start", TypeDef::of("datetime"))
                .field(
                    "end",
                    TypeDef::of("datetime")
                        .validation(Validation::rule(|rule| rule.min(Rule::value_of_field("start")))),
                ),
        ),
    );

    let markers = validator
        .validate(&json!({
            "_id": "a",
            "_type": "event",
            "start": "2024-05-02T10:00:00Z",
            "end": "2024-05-01T10:00:00Z"
        }))
        .await;
    assert_eq!(markers.len(), 1);
    assert_eq!(markers[0].path, path!["end"]);
    assert_eq!(markers[0].message(), "Must be at or after 2024-05-02T10:00:00Z");
}

#[tokio::test]
async fn one_shot_validation_matches_the_validator() {
    let schema = Schema::builder()
        .define(TypeDef::document("post").field("title", TypeDef::of("string").validation(required())))
        .build()
        .unwrap();
    let document = json!({"_id": "a", "_type": "post"});

    let markers = validate_document(&document, &schema, &Collaborators::default()).await;
    assert_eq!(
        summary(&markers),
        vec![(path!["title"], Level::Error, "Required".to_owned())]
    );
}

#[tokio::test]
async fn required_self_references_stop_at_the_first_repeat() {
    let validator = validator(
        Schema::builder()
            .define(
                TypeDef::object("node")
                    .field("label", TypeDef::of("string"))
                    .field("next", TypeDef::of("node").validation(required())),
            )
            .define(TypeDef::document("chain").field("root", TypeDef::of("node"))),
    );
    let document = json!({"_id": "a", "_type": "chain", "root": {"label": "x"}});

    let markers = tokio::time::timeout(std::time::Duration::from_secs(5), validator.validate(&document))
        .await
        .expect("absent recursive fields should not be walked forever");
    assert_eq!(
        summary(&markers),
        vec![
            (path!["root", "next"], Level::Error, "Required".to_owned()),
            (path!["root", "next", "next"], Level::Error, "Required".to_owned()),
        ]
    );
}

#[tokio::test]
async fn present_values_restart_the_recursion_guard() {
    let validator = validator(
        Schema::builder()
            .define(
                TypeDef::object("node")
                    .field("label", TypeDef::of("string").validation(required()))
                    .field("next", TypeDef::of("node")),
            )
            .define(TypeDef::document("chain").field("root", TypeDef::of("node"))),
    );
    let document = json!({
        "_id": "a",
        "_type": "chain",
        "root": {"label": "x", "next": {"next": {"label": "z"}}}
    });

    let markers = validator.validate(&document).await;
    assert_eq!(
        summary(&markers),
        vec![(path!["root", "next", "label"], Level::Error, "Required".to_owned())]
    );
}
