//! Recursive document walk
//!
//! Every node contributes independent units: its own rules (self checks),
//! object-level field rules, and one nested walk per field, array item or
//! annotation. Units are merged with bounded concurrency and each yields to
//! the scheduler once before it starts.
//!
//! Required object types are walked even when their value is absent, so a
//! recursive type with a required self-typed field never bottoms out on its
//! own. Each branch carries the types it entered through absent values;
//! reaching one of them again runs only the self checks.

use super::context::{Collaborators, ValidationContext};
use super::resolve::resolve_type_for_array_item;
use crate::config::Environment;
use crate::error::EngineError;
use crate::foundation::{Path, ValidationMarker};
use crate::normalize::{RuleIndex, derive_rules, normalize_validation_rules};
use crate::rule::{CustomCheck, Rule};
use crate::schema::{JsonType, Schema, TypeId};
use crate::validators::{UnknownFieldsValidator, item_segment};
use futures::future::{BoxFuture, FutureExt};
use futures::stream::{self, StreamExt, TryStreamExt};
use serde_json::Value;
use smallvec::SmallVec;
use std::collections::HashSet;

type Unit<'u> = BoxFuture<'u, Result<Vec<ValidationMarker>, EngineError>>;

/// Types entered through absent values on the current branch, outermost first.
type AbsentChain = SmallVec<[TypeId; 4]>;

/// Object types that report undeclared properties in the CLI.
const STRICT_OBJECT_TYPES: [&str; 4] = ["object", "document", "file", "image"];

#[derive(Clone, Copy)]
pub(crate) struct Walker<'a> {
    pub(crate) schema: &'a Schema,
    pub(crate) index: &'a RuleIndex,
    pub(crate) services: &'a Collaborators,
    pub(crate) document: Option<&'a Value>,
}

impl<'a> Walker<'a> {
    /// Validates `value` as `type_id` at `path`, then everything below it.
    pub(crate) fn validate_item(
        self,
        value: Option<&'a Value>,
        type_id: Option<TypeId>,
        path: Path,
        parent: Option<&'a Value>,
    ) -> Unit<'a> {
        self.visit(value, type_id, path, parent, AbsentChain::new())
    }

    fn visit(
        self,
        value: Option<&'a Value>,
        type_id: Option<TypeId>,
        path: Path,
        parent: Option<&'a Value>,
        absent: AbsentChain,
    ) -> Unit<'a> {
        self.walk(value, type_id, path, parent, absent).boxed()
    }

    async fn walk(
        self,
        value: Option<&'a Value>,
        type_id: Option<TypeId>,
        path: Path,
        parent: Option<&'a Value>,
        absent: AbsentChain,
    ) -> Result<Vec<ValidationMarker>, EngineError> {
        let Some(type_id) = type_id else {
            return Ok(vec![ValidationMarker::error(path, "Unable to resolve type for item")]);
        };
        let schema = self.schema;
        let ty = &schema[type_id];

        let derived;
        let rules: &[Rule] = match self.index.get(type_id) {
            Some(rules) => rules,
            None => {
                derived = normalize_validation_rules(schema, type_id)?;
                &derived
            }
        };
        let unknown_fields = self.unknown_fields_rule(type_id);
        let context = self.context(path.clone(), Some(type_id), parent);

        let has_field_rules = rules.iter().any(|rule| rule.field_rules().is_some());
        let is_required = rules.iter().any(Rule::is_required);
        let is_absent = value.is_none_or(Value::is_null);
        let revisited = is_absent && absent.contains(&type_id);
        let recurse_object = ty.json_type() == JsonType::Object
            && (value.is_some_and(is_truthy) || (is_absent && is_required && !revisited));
        let field_value = |name: &str| value.and_then(Value::as_object).and_then(|object| object.get(name));

        let mut field_checks = Vec::new();
        if recurse_object {
            for field_rules in rules.iter().filter_map(Rule::field_rules) {
                for (name, validation) in field_rules {
                    let field_type = ty.field(name).map(|field| field.type_id);
                    let derived_rules = derive_rules(schema, field_type, validation)?;
                    let field_context = self.context(path.child(name.as_str()), field_type, value);
                    field_checks.push((derived_rules, field_value(name), field_context));
                }
            }
        }

        let mut units: Vec<Unit<'_>> = Vec::new();
        for rule in rules.iter().chain(unknown_fields.as_ref()) {
            units.push(rule.validate(value, &context));
        }
        for (derived_rules, nested, field_context) in &field_checks {
            for rule in derived_rules {
                units.push(rule.validate(*nested, field_context));
            }
        }

        if recurse_object {
            let chain: AbsentChain = if is_absent {
                absent.iter().copied().chain([type_id]).collect()
            } else {
                AbsentChain::new()
            };
            for field in ty.fields() {
                units.push(self.visit(
                    field_value(&field.name),
                    Some(field.type_id),
                    path.child(field.name.as_str()),
                    value,
                    chain.clone(),
                ));
            }
        }

        if ty.json_type() == JsonType::Array {
            if let Some(items) = value.and_then(Value::as_array) {
                for (index, item) in items.iter().enumerate() {
                    let item_type = resolve_type_for_array_item(schema, Some(item), ty.of());
                    units.push(self.validate_item(
                        Some(item),
                        item_type,
                        path.child(item_segment(item, index)),
                        value,
                    ));
                }
            }
        }

        if schema.chain_contains(type_id, &["block"]) {
            let mark_defs = value.and_then(|block| block.get("markDefs"));
            let annotations = self.span_annotations(type_id);
            for (index, definition) in mark_defs.and_then(Value::as_array).into_iter().flatten().enumerate() {
                let annotation = definition
                    .get("_type")
                    .and_then(Value::as_str)
                    .and_then(|name| annotations.iter().copied().find(|id| schema[*id].name() == name));
                if let Some(annotation) = annotation {
                    units.push(self.validate_item(
                        Some(definition),
                        Some(annotation),
                        path.child("markDefs").child(item_segment(definition, index)),
                        mark_defs,
                    ));
                }
            }
        }

        let width = self.services.options().effective_concurrency();
        let results: Vec<Vec<ValidationMarker>> = stream::iter(units.into_iter().map(after_yield))
            .buffered(width)
            .try_collect()
            .await?;

        let mut markers: Vec<ValidationMarker> = results.into_iter().flatten().collect();
        if has_field_rules {
            let mut seen = HashSet::new();
            markers.retain(|marker| seen.insert(marker.clone()));
        }
        Ok(markers)
    }

    fn context(self, path: Path, type_id: Option<TypeId>, parent: Option<&'a Value>) -> ValidationContext<'a> {
        let mut context = ValidationContext::new(self.services).with_path(path);
        if let Some(type_id) = type_id {
            context = context.with_type(self.schema, type_id);
        }
        if let Some(document) = self.document {
            context = context.with_document(document);
        }
        if let Some(parent) = parent {
            context = context.with_parent(parent);
        }
        context
    }

    /// Warning-level check for undeclared properties, CLI only.
    fn unknown_fields_rule(self, type_id: TypeId) -> Option<Rule> {
        if self.services.options().environment != Environment::Cli {
            return None;
        }
        let ty = &self.schema[type_id];
        if ty.json_type() != JsonType::Object || !self.schema.chain_contains(type_id, &STRICT_OBJECT_TYPES) {
            return None;
        }
        let declared = ty.fields().iter().map(|field| field.name.clone());
        let check = CustomCheck::new(UnknownFieldsValidator::new(declared)).bypass_concurrency_limit();
        Some(Rule::new().custom_check(check).warning(""))
    }

    /// Annotation types of the span members of a block type.
    fn span_annotations(self, block: TypeId) -> &'a [TypeId] {
        let schema = self.schema;
        schema[block]
            .field("children")
            .and_then(|children| {
                schema[children.type_id]
                    .of()
                    .iter()
                    .copied()
                    .find(|member| schema.chain_contains(*member, &["span"]))
            })
            .map(|span| schema[span].annotations())
            .unwrap_or_default()
    }
}

fn after_yield(unit: Unit<'_>) -> Unit<'_> {
    async move {
        tokio::task::yield_now().await;
        unit.await
    }
    .boxed()
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|number| number != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
