//! Schema compiler
//!
//! Turns [`TypeDef`] declarations into the [`Schema`] type graph. Names are
//! resolved after every named type has been reserved, so definitions may
//! reference types declared later and may reference themselves (through
//! fields or array members). Inherited fields, members, annotations and
//! options are copied down the inheritance chain at compile time.

use super::types::{Field, JsonType, SchemaType, TypeId, TypeOptions, Validation};
use super::Schema;
use crate::error::SchemaError;
use serde_json::Value;
use std::collections::HashMap;

// ============================================================================
// TYPE DEFINITIONS
// ============================================================================

/// Declaration of a schema type.
///
/// # Examples
///
/// ```rust,ignore
/// use lattice_validator::prelude::*;
///
/// let schema = Schema::builder()
///     .define(
///         TypeDef::document("post")
///             .field("title", TypeDef::of("string").validation(Validation::rule(Rule::required)))
///             .field("tags", TypeDef::array().member(TypeDef::of("string"))),
///     )
///     .build()?;
/// ```
#[derive(Debug, Clone, Default)]
#[must_use = "builder methods must be chained or built"]
pub struct TypeDef {
    name: Option<String>,
    extends: Option<String>,
    json_type: Option<JsonType>,
    title: Option<String>,
    fields: Vec<(String, TypeDef)>,
    of: Vec<TypeDef>,
    annotations: Vec<TypeDef>,
    options: TypeOptions,
    validation: Validation,
    weak: Option<bool>,
}

impl TypeDef {
    /// A named type extending `extends`.
    pub fn named(name: impl Into<String>, extends: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            extends: Some(extends.into()),
            ..Self::default()
        }
    }

    /// A named document type.
    pub fn document(name: impl Into<String>) -> Self {
        Self::named(name, "document")
    }

    /// A named object type.
    pub fn object(name: impl Into<String>) -> Self {
        Self::named(name, "object")
    }

    /// An anonymous type extending `extends` (used for fields and members).
    pub fn of(extends: impl Into<String>) -> Self {
        Self {
            extends: Some(extends.into()),
            ..Self::default()
        }
    }

    /// An anonymous array type.
    pub fn array() -> Self {
        Self::of("array")
    }

    fn root(name: &str, json_type: JsonType) -> Self {
        Self {
            name: Some(name.to_owned()),
            json_type: Some(json_type),
            ..Self::default()
        }
    }

    /// Sets the display title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Adds an object field.
    pub fn field(mut self, name: impl Into<String>, def: TypeDef) -> Self {
        self.fields.push((name.into(), def));
        self
    }

    /// Adds an array member type.
    pub fn member(mut self, def: TypeDef) -> Self {
        self.of.push(def);
        self
    }

    /// Adds an annotation type. On a block type the annotations are
    /// attached to its spans.
    pub fn annotation(mut self, def: TypeDef) -> Self {
        self.annotations.push(def);
        self
    }

    /// Restricts values to a list. Entries may be plain values or
    /// `{title, value}` pairs.
    pub fn list(mut self, values: impl IntoIterator<Item = Value>) -> Self {
        self.options.list = Some(values.into_iter().collect());
        self
    }

    /// Sets the decorators allowed on block spans.
    pub fn decorators<I, S>(mut self, decorators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options.decorators = Some(decorators.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the validation.
    pub fn validation(mut self, validation: Validation) -> Self {
        self.validation = validation;
        self
    }

    /// Marks a reference type as weak.
    pub fn weak(mut self) -> Self {
        self.weak = Some(true);
        self
    }
}

fn builtin_types() -> Vec<TypeDef> {
    use JsonType::{Array, Boolean, Number, Object, String};

    let asset = || TypeDef::of("reference").weak();
    vec![
        TypeDef::root("string", String),
        TypeDef::root("text", String),
        TypeDef::root("url", String),
        TypeDef::root("email", String),
        TypeDef::root("datetime", String),
        TypeDef::root("date", String),
        TypeDef::root("number", Number),
        TypeDef::root("boolean", Boolean),
        TypeDef::root("object", Object),
        TypeDef::root("array", Array),
        TypeDef::root("document", Object),
        TypeDef::root("slug", Object).field("current", TypeDef::of("string")),
        TypeDef::root("reference", Object)
            .field("_ref", TypeDef::of("string"))
            .field("_weak", TypeDef::of("boolean")),
        TypeDef::root("image", Object).field("asset", asset()),
        TypeDef::root("file", Object).field("asset", asset()),
        TypeDef::root("span", Object)
            .field("text", TypeDef::of("string"))
            .field("marks", TypeDef::array().member(TypeDef::of("string"))),
        TypeDef::root("block", Object)
            .field("children", TypeDef::array().member(TypeDef::of("span")))
            .field("style", TypeDef::of("string"))
            .field("listItem", TypeDef::of("string"))
            .field("level", TypeDef::of("number")),
    ]
}

// ============================================================================
// SCHEMA BUILDER
// ============================================================================

/// Collects type definitions and compiles them into a [`Schema`].
#[derive(Debug, Default)]
#[must_use = "builder methods must be chained or built"]
pub struct SchemaBuilder {
    types: Vec<TypeDef>,
}

impl SchemaBuilder {
    /// Creates an empty builder. Built-in types are always present.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a named type.
    pub fn define(mut self, def: TypeDef) -> Self {
        self.types.push(def);
        self
    }

    /// Compiles the schema.
    pub fn build(self) -> Result<Schema, SchemaError> {
        let defs: Vec<TypeDef> = builtin_types().into_iter().chain(self.types).collect();
        let mut compiler = Compiler::default();

        let mut reserved = Vec::with_capacity(defs.len());
        for def in &defs {
            let name = def
                .name
                .clone()
                .or_else(|| def.extends.clone())
                .unwrap_or_default();
            if compiler.named.contains_key(&name) {
                return Err(SchemaError::DuplicateType(name));
            }
            let id = compiler.reserve(&name);
            compiler.named.insert(name, id);
            reserved.push(id);
        }
        for (id, def) in reserved.into_iter().zip(defs) {
            compiler.fill(id, def, None)?;
        }

        compiler.finish()
    }
}

// ============================================================================
// COMPILER
// ============================================================================

#[derive(Default)]
struct Draft {
    name: String,
    title: Option<String>,
    json_type: Option<JsonType>,
    parent: Option<TypeId>,
    fields: Vec<Field>,
    of: Vec<TypeId>,
    annotations: Vec<TypeId>,
    options: TypeOptions,
    validation: Validation,
    weak: Option<bool>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Visit {
    Fresh,
    Visiting,
    Done,
}

#[derive(Default)]
struct Compiler {
    drafts: Vec<Draft>,
    named: HashMap<String, TypeId>,
}

impl Compiler {
    fn reserve(&mut self, name: &str) -> TypeId {
        let id = TypeId(self.drafts.len());
        self.drafts.push(Draft {
            name: name.to_owned(),
            ..Draft::default()
        });
        id
    }

    fn anonymous(&mut self, def: TypeDef, owner: &str) -> Result<TypeId, SchemaError> {
        let name = def.name.clone().or_else(|| def.extends.clone()).unwrap_or_default();
        let id = self.reserve(&name);
        self.fill(id, def, Some(owner))?;
        Ok(id)
    }

    /// Compiles `def` into the reserved slot. `owner` names the enclosing
    /// type of an inline definition.
    fn fill(&mut self, id: TypeId, def: TypeDef, owner: Option<&str>) -> Result<(), SchemaError> {
        let name = self.drafts[id.0].name.clone();
        let parent = match &def.extends {
            Some(extends) => Some(*self.named.get(extends).ok_or_else(|| {
                SchemaError::UnknownType {
                    name: extends.clone(),
                    referenced_by: owner.unwrap_or(&name).to_owned(),
                }
            })?),
            None => None,
        };

        let mut field_defs = def.fields;
        let mut annotation_defs = def.annotations;
        if def.extends.as_deref() == Some("block") && !annotation_defs.is_empty() {
            let mut span = TypeDef::of("span");
            span.annotations = std::mem::take(&mut annotation_defs);
            field_defs.push(("children".to_owned(), TypeDef::array().member(span)));
        }

        let mut fields = Vec::with_capacity(field_defs.len());
        for (field_name, field_def) in field_defs {
            let type_id = self.anonymous(field_def, &name)?;
            fields.push(Field {
                name: field_name,
                type_id,
            });
        }
        let of = def
            .of
            .into_iter()
            .map(|member| self.anonymous(member, &name))
            .collect::<Result<Vec<_>, _>>()?;
        let annotations = annotation_defs
            .into_iter()
            .map(|annotation| self.anonymous(annotation, &name))
            .collect::<Result<Vec<_>, _>>()?;

        self.drafts[id.0] = Draft {
            name,
            title: def.title,
            json_type: def.json_type,
            parent,
            fields,
            of,
            annotations,
            options: def.options,
            validation: def.validation,
            weak: def.weak,
        };
        Ok(())
    }

    fn inherit(&mut self, id: TypeId, visits: &mut [Visit]) -> Result<(), SchemaError> {
        match visits[id.0] {
            Visit::Done => return Ok(()),
            Visit::Visiting => {
                return Err(SchemaError::CircularInheritance(self.drafts[id.0].name.clone()));
            }
            Visit::Fresh => {}
        }
        visits[id.0] = Visit::Visiting;

        if let Some(parent) = self.drafts[id.0].parent {
            self.inherit(parent, visits)?;
            let inherited = &self.drafts[parent.0];
            let json_type = inherited.json_type;
            let mut fields = inherited.fields.clone();
            let of = inherited.of.clone();
            let annotations = inherited.annotations.clone();
            let options = inherited.options.clone();
            let weak = inherited.weak;

            let draft = &mut self.drafts[id.0];
            draft.json_type = draft.json_type.or(json_type);
            for own in std::mem::take(&mut draft.fields) {
                match fields.iter_mut().find(|field| field.name == own.name) {
                    Some(existing) => *existing = own,
                    None => fields.push(own),
                }
            }
            draft.fields = fields;
            if draft.of.is_empty() {
                draft.of = of;
            }
            if draft.annotations.is_empty() {
                draft.annotations = annotations;
            }
            if draft.options.list.is_none() {
                draft.options.list = options.list;
            }
            if draft.options.decorators.is_none() {
                draft.options.decorators = options.decorators;
            }
            draft.weak = draft.weak.or(weak);
        }

        visits[id.0] = Visit::Done;
        Ok(())
    }

    fn finish(mut self) -> Result<Schema, SchemaError> {
        let mut visits = vec![Visit::Fresh; self.drafts.len()];
        for index in 0..self.drafts.len() {
            self.inherit(TypeId(index), &mut visits)?;
        }

        let types = self
            .drafts
            .into_iter()
            .map(|draft| SchemaType {
                name: draft.name,
                title: draft.title,
                json_type: draft.json_type.unwrap_or(JsonType::Object),
                parent: draft.parent,
                fields: draft.fields,
                of: draft.of,
                annotations: draft.annotations,
                options: draft.options,
                validation: draft.validation,
                weak: draft.weak.unwrap_or(false),
            })
            .collect();
        Ok(Schema {
            types,
            named: self.named,
        })
    }
}
