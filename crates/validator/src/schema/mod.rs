//! Schema type graph
//!
//! A [`Schema`] is an arena of [`SchemaType`]s addressed by [`TypeId`].
//! Types form an inheritance tree rooted at the built-in types (`string`,
//! `object`, `document`, `block`, ...); fields and array members point at
//! other types by id, so recursive schemas are plain cycles in the arena.

mod builder;
mod types;

pub use builder::{SchemaBuilder, TypeDef};
pub use types::{Field, JsonType, RuleBuilderFn, SchemaType, TypeId, TypeOptions, Validation};

use std::collections::HashMap;
use std::ops::Index;

/// A compiled schema.
#[derive(Debug, Clone)]
pub struct Schema {
    types: Vec<SchemaType>,
    named: HashMap<String, TypeId>,
}

impl Schema {
    /// Starts a schema definition.
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::new()
    }

    /// Looks a named type up.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<TypeId> {
        self.named.get(name).copied()
    }

    /// Walks from `id` to the root of its inheritance chain, `id` first.
    pub fn type_chain(&self, id: TypeId) -> impl Iterator<Item = (TypeId, &SchemaType)> + '_ {
        std::iter::successors(Some(id), |current| self[*current].parent)
            .map(|current| (current, &self[current]))
    }

    /// Whether any type in the chain of `id` is named one of `names`.
    #[must_use]
    pub fn chain_contains(&self, id: TypeId, names: &[&str]) -> bool {
        self.type_chain(id)
            .any(|(_, ty)| names.contains(&ty.name()))
    }

    /// Name of the built-in type at the root of the chain.
    #[must_use]
    pub fn root_name(&self, id: TypeId) -> &str {
        self.type_chain(id)
            .last()
            .map_or("", |(_, ty)| ty.name())
    }

    /// Named types, in no particular order.
    pub fn named_types(&self) -> impl Iterator<Item = (&str, TypeId)> + '_ {
        self.named.iter().map(|(name, id)| (name.as_str(), *id))
    }

    /// Number of types, inline ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Never true: built-in types are always present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl Index<TypeId> for Schema {
    type Output = SchemaType;

    fn index(&self, id: TypeId) -> &Self::Output {
        &self.types[id.0]
    }
}
