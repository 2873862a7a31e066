//! Type normalizer
//!
//! Derives the rules that apply to a schema type. The inferred base rule
//! carries the JSON type of the type plus the checks implied by the
//! built-in type at the root of its chain (`url` implies `uri`, `slug`
//! implies the slug validator, ...). A type's declared [`Validation`] then
//! decides what happens to that base rule.
//!
//! Derived rules are memoized in a [`RuleIndex`] keyed by [`TypeId`]; the
//! schema itself is never modified.

use crate::error::RuleBuildError;
use crate::rule::{BaseType, Rule, UriOptions};
use crate::schema::{JsonType, Schema, TypeId, Validation};
use crate::validators::block::{BlockValidator, DEFAULT_DECORATORS};
use crate::validators::reference::ReferenceExistsValidator;
use crate::validators::slug::SlugValidator;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

// ============================================================================
// RULE DERIVATION
// ============================================================================

/// Rules for one type.
///
/// The nearest declared validation up the inheritance chain is used.
/// `Disabled` yields no rules, `Inherit` (nothing declared anywhere) yields
/// the base rule alone, a fixed rule list is used as-is and a builder
/// receives the base rule.
pub fn normalize_validation_rules(schema: &Schema, id: TypeId) -> Result<Vec<Rule>, RuleBuildError> {
    let validation = schema
        .type_chain(id)
        .map(|(_, ty)| ty.validation())
        .find(|validation| !matches!(validation, Validation::Inherit))
        .unwrap_or(&Validation::Inherit);
    derive_rules(schema, Some(id), validation)
}

/// Applies `validation` to the base rule of `id`, or to an untyped rule
/// when the type is unknown.
pub(crate) fn derive_rules(
    schema: &Schema,
    id: Option<TypeId>,
    validation: &Validation,
) -> Result<Vec<Rule>, RuleBuildError> {
    match validation {
        Validation::Disabled => Ok(Vec::new()),
        Validation::Rules(rules) => Ok(rules.clone()),
        Validation::Inherit | Validation::Builder(_) => {
            let base = match id {
                Some(id) => base_rule(schema, id)?,
                None => Rule::new(),
            };
            match validation {
                Validation::Builder(build) => build(base),
                _ => Ok(vec![base]),
            }
        }
    }
}

/// The rule inferred from the type alone, ignoring declared validation.
pub fn base_rule(schema: &Schema, id: TypeId) -> Result<Rule, RuleBuildError> {
    let ty = &schema[id];
    let root = schema.root_name(id);
    let mut base = Rule::typed(base_type_of(ty.json_type())).for_type_name(root);

    base = match root {
        "date" | "datetime" => base.with_type(BaseType::Date),
        "url" => base.uri(UriOptions::default())?,
        "email" => base.email(),
        "slug" => base.custom(SlugValidator),
        "reference" if ty.is_weak() => base.reference(),
        "reference" => base.reference().custom(ReferenceExistsValidator),
        "block" => base.block(match &ty.options().decorators {
            Some(decorators) => BlockValidator::new(decorators.iter().cloned()),
            None => BlockValidator::new(DEFAULT_DECORATORS),
        }),
        _ => base,
    };

    if let Some(list) = &ty.options().list {
        let declares_value = ty.json_type() == JsonType::Object && ty.field("value").is_some();
        let allowed: Vec<Value> = list
            .iter()
            .map(|option| match option.get("value") {
                Some(value) if option.is_object() && !declares_value => value.clone(),
                _ => option.clone(),
            })
            .collect();
        base = base.valid(Value::Array(allowed));
    }

    Ok(base)
}

fn base_type_of(json_type: JsonType) -> BaseType {
    match json_type {
        JsonType::String => BaseType::String,
        JsonType::Number => BaseType::Number,
        JsonType::Boolean => BaseType::Boolean,
        JsonType::Object => BaseType::Object,
        JsonType::Array => BaseType::Array,
    }
}

// ============================================================================
// RULE INDEX
// ============================================================================

/// Derived rules keyed by type identity.
#[derive(Debug, Clone, Default)]
pub struct RuleIndex {
    rules: HashMap<TypeId, Arc<[Rule]>>,
}

impl RuleIndex {
    /// Rules of `id`, if it was reached while building the index.
    #[must_use]
    pub fn get(&self, id: TypeId) -> Option<&[Rule]> {
        self.rules.get(&id).map(|rules| &**rules)
    }

    /// Number of indexed types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether nothing was indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Derives rules for every named type and everything reachable from it
/// through fields, array members and annotations.
pub fn infer_from_schema(schema: &Schema) -> Result<RuleIndex, RuleBuildError> {
    let mut index = RuleIndex::default();
    let mut visited = HashSet::new();
    let mut roots: Vec<TypeId> = schema.named_types().map(|(_, id)| id).collect();
    roots.sort();
    for id in roots {
        infer_type(schema, id, &mut visited, &mut index)?;
    }
    Ok(index)
}

fn infer_type(
    schema: &Schema,
    id: TypeId,
    visited: &mut HashSet<TypeId>,
    index: &mut RuleIndex,
) -> Result<(), RuleBuildError> {
    if !visited.insert(id) {
        return Ok(());
    }
    let rules = normalize_validation_rules(schema, id)?;
    index.rules.insert(id, rules.into());

    let ty = &schema[id];
    let children = ty
        .fields()
        .iter()
        .map(|field| field.type_id)
        .chain(ty.of().iter().copied())
        .chain(ty.annotations().iter().copied());
    for child in children {
        infer_type(schema, child, visited, index)?;
    }
    Ok(())
}
