//! Array member type resolution

use crate::schema::{Schema, TypeId};
use serde_json::Value;

/// Picks the member type of an array item among `candidates`.
///
/// A single candidate is used without looking at the item. Otherwise
/// primitives match the first candidate of the same JSON type, typed
/// objects match by the name of a candidate's parent type, then by the
/// candidate's own name, and untyped objects match a plain `object`
/// candidate. Null and absent items resolve to nothing.
#[must_use]
pub fn resolve_type_for_array_item(
    schema: &Schema,
    item: Option<&Value>,
    candidates: &[TypeId],
) -> Option<TypeId> {
    if let [only] = candidates {
        return Some(*only);
    }

    let item = item.filter(|item| !item.is_null())?;
    let type_name = item.get("_type").and_then(Value::as_str);
    let Some(type_name) = type_name else {
        let kind = primitive_kind(item);
        if kind == "object" {
            return candidates.iter().copied().find(|id| schema[*id].name() == "object");
        }
        return candidates
            .iter()
            .copied()
            .find(|id| schema[*id].json_type().as_str() == kind);
    };

    candidates
        .iter()
        .copied()
        .find(|id| {
            schema[*id]
                .parent()
                .is_some_and(|parent| schema[parent].name() == type_name)
        })
        .or_else(|| candidates.iter().copied().find(|id| schema[*id].name() == type_name))
}

fn primitive_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
