//! Compiled schema types

use crate::error::RuleBuildError;
use crate::rule::Rule;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Identity of a type inside one [`Schema`](super::Schema).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub(crate) usize);

impl TypeId {
    /// Position of the type in its schema.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// JSON shape of values of a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JsonType {
    /// JSON string.
    String,
    /// JSON number.
    Number,
    /// JSON boolean.
    Boolean,
    /// JSON object.
    Object,
    /// JSON array.
    Array,
}

impl JsonType {
    /// Lowercase name, matching the primitive classification of values.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Object => "object",
            Self::Array => "array",
        }
    }
}

/// A named field of an object type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Property name.
    pub name: String,
    /// Type of the property value.
    pub type_id: TypeId,
}

/// Type options the engine reads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeOptions {
    /// Allowed values. Entries may be `{title, value}` pairs.
    pub list: Option<Vec<Value>>,
    /// Decorators allowed on block spans.
    pub decorators: Option<Vec<String>>,
}

/// Signature of a rule builder function.
pub type RuleBuilderFn = Arc<dyn Fn(Rule) -> Result<Vec<Rule>, RuleBuildError> + Send + Sync>;

/// How a type declares its validation.
#[derive(Clone, Default)]
pub enum Validation {
    /// Use the nearest declaration up the inheritance chain.
    #[default]
    Inherit,
    /// No validation at all (`validation: false`).
    Disabled,
    /// A fixed list of rules, used as-is.
    Rules(Vec<Rule>),
    /// A function receiving the inferred base rule.
    Builder(RuleBuilderFn),
}

impl Validation {
    /// A builder returning a single rule.
    ///
    /// ```rust,ignore
    /// let validation = Validation::rule(|rule| rule.required().max(80));
    /// ```
    pub fn rule<F>(f: F) -> Self
    where
        F: Fn(Rule) -> Rule + Send + Sync + 'static,
    {
        Self::Builder(Arc::new(move |rule| Ok(vec![f(rule)])))
    }

    /// A builder returning several rules.
    pub fn rules<F>(f: F) -> Self
    where
        F: Fn(Rule) -> Vec<Rule> + Send + Sync + 'static,
    {
        Self::Builder(Arc::new(move |rule| Ok(f(rule))))
    }

    /// A builder that may fail (e.g. because it calls `uri` or `fields`).
    pub fn try_rule<F>(f: F) -> Self
    where
        F: Fn(Rule) -> Result<Rule, RuleBuildError> + Send + Sync + 'static,
    {
        Self::Builder(Arc::new(move |rule| f(rule).map(|rule| vec![rule])))
    }
}

impl fmt::Debug for Validation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inherit => f.write_str("Inherit"),
            Self::Disabled => f.write_str("Disabled"),
            Self::Rules(rules) => f.debug_tuple("Rules").field(rules).finish(),
            Self::Builder(_) => f.write_str("Builder(..)"),
        }
    }
}

/// One node of the schema type graph.
#[derive(Debug, Clone)]
pub struct SchemaType {
    pub(crate) name: String,
    pub(crate) title: Option<String>,
    pub(crate) json_type: JsonType,
    pub(crate) parent: Option<TypeId>,
    pub(crate) fields: Vec<Field>,
    pub(crate) of: Vec<TypeId>,
    pub(crate) annotations: Vec<TypeId>,
    pub(crate) options: TypeOptions,
    pub(crate) validation: Validation,
    pub(crate) weak: bool,
}

impl SchemaType {
    /// Type name. Anonymous types carry the name of the type they extend.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Display title.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// JSON shape.
    #[must_use]
    pub fn json_type(&self) -> JsonType {
        self.json_type
    }

    /// The type this one extends.
    #[must_use]
    pub fn parent(&self) -> Option<TypeId> {
        self.parent
    }

    /// Object fields, inherited ones included.
    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Looks a field up by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Candidate member types of an array type.
    #[must_use]
    pub fn of(&self) -> &[TypeId] {
        &self.of
    }

    /// Annotation types of a span type.
    #[must_use]
    pub fn annotations(&self) -> &[TypeId] {
        &self.annotations
    }

    /// Options.
    #[must_use]
    pub fn options(&self) -> &TypeOptions {
        &self.options
    }

    /// Declared validation of this type alone (not inherited).
    #[must_use]
    pub fn validation(&self) -> &Validation {
        &self.validation
    }

    /// Weak references skip the existence check.
    #[must_use]
    pub fn is_weak(&self) -> bool {
        self.weak
    }
}
