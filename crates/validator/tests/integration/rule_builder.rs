//! Rule construction and direct rule execution.

use lattice_validator::prelude::*;
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{Value, json};

async fn run(rule: &Rule, value: Option<&Value>) -> Result<Vec<ValidationMarker>, EngineError> {
    let services = Collaborators::default();
    let context = ValidationContext::new(&services).with_path(path!["field"]);
    rule.validate(value, &context).await
}

async fn messages(rule: &Rule, value: Value) -> Vec<String> {
    run(rule, Some(&value))
        .await
        .unwrap()
        .iter()
        .map(|marker| marker.message().to_owned())
        .collect()
}

#[test]
fn builders_never_touch_the_receiver() {
    let base = Rule::string();
    let required = base.clone().required().max(10);

    assert!(!base.is_required());
    assert_eq!(base.constraints().len(), 1);
    assert!(required.is_required());
    assert_eq!(required.constraints().len(), 3);
}

#[rstest]
#[case("number", BaseType::Number)]
#[case("Number", BaseType::Number)]
#[case("date", BaseType::Date)]
#[case("object", BaseType::Object)]
fn type_names_are_case_insensitive_on_the_first_letter(#[case] name: &str, #[case] expected: BaseType) {
    let rule = Rule::new().of_type(name).unwrap();
    assert_eq!(rule.base_type(), Some(expected));
}

#[test]
fn construction_errors_are_immediate() {
    let unknown = Rule::new().of_type("Integerish").unwrap_err();
    assert_eq!(unknown.to_string(), "Unknown type \"Integerish\"");

    let empty = Rule::string()
        .uri(UriOptions::default().scheme(Vec::<&str>::new()))
        .unwrap_err();
    assert!(matches!(empty, RuleBuildError::EmptySchemeList));

    let pattern = Rule::string().pattern("(", RegexOptions::default()).unwrap_err();
    assert!(matches!(pattern, RuleBuildError::InvalidPattern { .. }));

    let conflict = Rule::string().merge(&Rule::number()).unwrap_err();
    assert!(matches!(conflict, RuleBuildError::ConflictingTypes { .. }));
}

#[test]
fn merge_keeps_the_receiver_level_unless_it_is_the_default() {
    let warning = Rule::string().warning("");
    let info = Rule::string().info("");

    assert_eq!(warning.merge(&info).unwrap().level(), Level::Warning);
    assert_eq!(Rule::string().merge(&info).unwrap().level(), Level::Info);

    let merged = Rule::string().optional().merge(&Rule::string().required()).unwrap();
    assert!(merged.is_required());
}

#[tokio::test]
async fn rule_message_replaces_builtin_messages() {
    let rule = Rule::string().min(5).error("Too short");
    assert_eq!(messages(&rule, json!("abc")).await, vec!["Too short"]);
}

#[tokio::test]
async fn level_carries_through_to_markers() {
    let rule = Rule::string().max(3).warning("");
    let markers = run(&rule, Some(&json!("abcdef"))).await.unwrap();
    assert_eq!(markers[0].level, Level::Warning);
    assert_eq!(markers[0].message(), "Must be at most 3 characters long");
}

#[tokio::test]
async fn loosely_shaped_custom_results_are_interpreted() {
    let rule = Rule::object().custom_fn(|_, _| {
        Ok(Verdict::Raw(json!([
            true,
            "plain",
            {"message": "nested", "paths": [["a", 0]]}
        ])))
    });

    let markers = run(&rule, Some(&json!({"a": [1]}))).await.unwrap();
    let found: Vec<_> = markers
        .iter()
        .map(|marker| (marker.path.clone(), marker.message().to_owned()))
        .collect();
    assert_eq!(
        found,
        vec![
            (path!["field"], "plain".to_owned()),
            (path!["field", "a", 0usize], "nested".to_owned()),
        ]
    );
}

#[tokio::test]
async fn uninterpretable_custom_results_break_the_contract() {
    let rule = Rule::string().custom_fn(|_, _| Ok(Verdict::Raw(json!(42))));
    let err = run(&rule, Some(&json!("x"))).await.unwrap_err();
    assert!(matches!(
        err,
        EngineError::Contract(ValidatorContractError::InvalidOutput { .. })
    ));
    assert!(err.to_string().starts_with("field: Validator must return true"));
}

#[tokio::test]
async fn all_and_either_nest_children() {
    let rule = Rule::string().all(vec![Rule::string().min(2), Rule::string().max(4)]);
    assert!(messages(&rule, json!("abc")).await.is_empty());

    let markers = run(&rule, Some(&json!("abcdef"))).await.unwrap();
    assert_eq!(markers[0].message(), "All of the following must be true");
    assert_eq!(markers[0].item.operation, Some(Operation::And));
    assert_eq!(markers[0].item.children[0].message(), "Must be at most 4 characters long");

    let either = Rule::number().either(vec![Rule::number().max(0), Rule::number().min(10)]);
    assert!(messages(&either, json!(11)).await.is_empty());
    assert_eq!(messages(&either, json!(5)).await, vec!["Must match one of the following"]);
}

#[rstest]
#[case(json!("https://example.com"), Vec::<&str>::new())]
#[case(json!("/relative"), vec!["Relative URLs are not allowed"])]
#[case(json!("https://user:pw@example.com"), vec!["Username/password not allowed"])]
#[case(json!("mailto:someone@example.com"), vec!["Does not match allowed protocols/schemes"])]
#[tokio::test]
async fn uri_defaults(#[case] value: Value, #[case] expected: Vec<&str>) {
    let rule = Rule::string().uri(UriOptions::default()).unwrap();
    assert_eq!(messages(&rule, value).await, expected);
}

#[tokio::test]
async fn uri_options_widen_the_defaults() {
    let rule = Rule::string()
        .uri(
            UriOptions::default()
                .scheme(["mailto", "https"])
                .allow_relative()
                .allow_credentials(),
        )
        .unwrap();
    for value in ["mailto:someone@example.com", "/relative", "https://u:p@example.com"] {
        assert!(messages(&rule, json!(value)).await.is_empty(), "{value}");
    }

    let relative = Rule::string().uri(UriOptions::default().relative_only()).unwrap();
    assert_eq!(
        messages(&relative, json!("https://example.com")).await,
        vec!["Only relative URLs are allowed"]
    );
}
