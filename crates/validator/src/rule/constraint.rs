//! Constraint declarations carried by a [`Rule`](super::Rule)
//!
//! Each builder call appends one [`Constraint`]. Dispatch happens in
//! [`crate::validators`] with an exhaustive `match` over the constraint and
//! the rule's [`BaseType`].

use crate::error::RuleBuildError;
use crate::rule::{CustomCheck, Rule};
use regex::Regex;
use serde_json::Value;
use std::fmt;

// ============================================================================
// BASE TYPE
// ============================================================================

/// The JSON-level type a rule validates against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseType {
    /// JSON boolean.
    Boolean,
    /// JSON number.
    Number,
    /// JSON string.
    String,
    /// JSON array.
    Array,
    /// JSON object.
    Object,
    /// Date or date-time string.
    Date,
}

impl BaseType {
    const ALL: [Self; 6] = [
        Self::Array,
        Self::Boolean,
        Self::Date,
        Self::Number,
        Self::Object,
        Self::String,
    ];

    /// Parses a type name, accepting a lowercase first letter
    /// (`"string"` and `"String"` both map to [`BaseType::String`]).
    pub fn parse(name: &str) -> Result<Self, RuleBuildError> {
        let mut chars = name.chars();
        let canonical: String = match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        };
        Self::ALL
            .into_iter()
            .find(|ty| ty.as_str() == canonical)
            .ok_or_else(|| RuleBuildError::UnknownType {
                name: name.to_owned(),
            })
    }

    /// Canonical name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Boolean => "Boolean",
            Self::Number => "Number",
            Self::String => "String",
            Self::Array => "Array",
            Self::Object => "Object",
            Self::Date => "Date",
        }
    }
}

impl fmt::Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Explicit presence requirement. Unset means "only run custom validators on
/// absent values".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Presence {
    /// Absence is a violation.
    Required,
    /// Absence short-circuits the whole rule.
    Optional,
}

// ============================================================================
// BOUNDS
// ============================================================================

/// A reference to a sibling field, resolved against the parent value at
/// validation time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldRef {
    path: Vec<String>,
}

impl FieldRef {
    /// Creates a reference from a dotted path (`"dimensions.width"`).
    pub fn new(path: &str) -> Self {
        Self {
            path: path.split('.').map(str::to_owned).collect(),
        }
    }

    /// Looks the referenced value up in `parent`.
    #[must_use]
    pub fn resolve<'v>(&self, parent: Option<&'v Value>) -> Option<&'v Value> {
        self.path
            .iter()
            .try_fold(parent?, |node, key| node.as_object()?.get(key))
    }
}

/// Numeric, length or date limit: either a literal or a field reference.
#[derive(Debug, Clone, PartialEq)]
pub enum Bound {
    /// Fixed value.
    Literal(Value),
    /// Value of another field of the same parent.
    FieldRef(FieldRef),
}

impl Bound {
    /// Resolves the bound. `None` when a field reference does not resolve.
    #[must_use]
    pub fn resolve<'v>(&'v self, parent: Option<&'v Value>) -> Option<&'v Value> {
        match self {
            Self::Literal(value) => Some(value),
            Self::FieldRef(field) => field.resolve(parent),
        }
    }
}

impl From<FieldRef> for Bound {
    fn from(field: FieldRef) -> Self {
        Self::FieldRef(field)
    }
}

impl From<f64> for Bound {
    fn from(value: f64) -> Self {
        Self::Literal(Value::from(value))
    }
}

impl From<i64> for Bound {
    fn from(value: i64) -> Self {
        Self::Literal(Value::from(value))
    }
}

impl From<i32> for Bound {
    fn from(value: i32) -> Self {
        Self::Literal(Value::from(value))
    }
}

impl From<usize> for Bound {
    fn from(value: usize) -> Self {
        Self::Literal(Value::from(value))
    }
}

impl From<&str> for Bound {
    fn from(value: &str) -> Self {
        Self::Literal(Value::from(value))
    }
}

// ============================================================================
// STRING PAYLOADS
// ============================================================================

/// Letter casing required by `uppercase()` / `lowercase()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Casing {
    /// All uppercase.
    Uppercase,
    /// All lowercase.
    Lowercase,
}

/// Naming and inversion for a `regex` constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegexOptions {
    /// Name used in the violation message instead of the pattern.
    pub name: Option<String>,
    /// Fail when the pattern *does* match.
    pub invert: bool,
}

impl RegexOptions {
    /// Names the pattern.
    #[must_use = "builder methods must be chained or built"]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Inverts the match.
    #[must_use = "builder methods must be chained or built"]
    pub fn inverted(mut self) -> Self {
        self.invert = true;
        self
    }
}

/// A compiled `regex` constraint.
#[derive(Debug, Clone)]
pub struct RegexConstraint {
    /// The pattern.
    pub pattern: Regex,
    /// Optional display name.
    pub name: Option<String>,
    /// Inverted match.
    pub invert: bool,
}

impl RegexConstraint {
    /// Name shown in messages: the configured name or `/pattern/`.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("/{}/", self.pattern.as_str()))
    }
}

/// Matches a URL scheme (without the trailing `:`).
#[derive(Debug, Clone)]
pub enum SchemeMatcher {
    /// Exact scheme name.
    Name(String),
    /// Regular expression tested against the scheme.
    Pattern(Regex),
}

impl SchemeMatcher {
    /// Tests a scheme.
    #[must_use]
    pub fn matches(&self, scheme: &str) -> bool {
        match self {
            Self::Name(name) => name == scheme,
            Self::Pattern(pattern) => pattern.is_match(scheme),
        }
    }
}

impl From<&str> for SchemeMatcher {
    fn from(name: &str) -> Self {
        Self::Name(name.to_owned())
    }
}

impl From<Regex> for SchemeMatcher {
    fn from(pattern: Regex) -> Self {
        Self::Pattern(pattern)
    }
}

/// Options accepted by `Rule::uri`.
///
/// `scheme: None` means `http` and `https`.
#[derive(Debug, Clone, Default)]
pub struct UriOptions {
    /// Allowed schemes.
    pub scheme: Option<Vec<SchemeMatcher>>,
    /// Accept relative URLs as well as absolute ones.
    pub allow_relative: bool,
    /// Accept only relative URLs.
    pub relative_only: bool,
    /// Accept `user:password@` in absolute URLs.
    pub allow_credentials: bool,
}

impl UriOptions {
    /// Restricts the allowed schemes.
    #[must_use = "builder methods must be chained or built"]
    pub fn scheme<I, S>(mut self, schemes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SchemeMatcher>,
    {
        self.scheme = Some(schemes.into_iter().map(Into::into).collect());
        self
    }

    /// Accepts relative URLs.
    #[must_use = "builder methods must be chained or built"]
    pub fn allow_relative(mut self) -> Self {
        self.allow_relative = true;
        self
    }

    /// Accepts only relative URLs.
    #[must_use = "builder methods must be chained or built"]
    pub fn relative_only(mut self) -> Self {
        self.relative_only = true;
        self
    }

    /// Accepts credentials.
    #[must_use = "builder methods must be chained or built"]
    pub fn allow_credentials(mut self) -> Self {
        self.allow_credentials = true;
        self
    }
}

/// A normalized `uri` constraint with a non-empty scheme list.
#[derive(Debug, Clone)]
pub struct UriConstraint {
    /// Allowed schemes, never empty.
    pub schemes: Vec<SchemeMatcher>,
    /// Accept relative URLs.
    pub allow_relative: bool,
    /// Accept only relative URLs.
    pub relative_only: bool,
    /// Accept credentials.
    pub allow_credentials: bool,
}

impl TryFrom<UriOptions> for UriConstraint {
    type Error = RuleBuildError;

    fn try_from(options: UriOptions) -> Result<Self, Self::Error> {
        let schemes = options
            .scheme
            .unwrap_or_else(|| vec!["http".into(), "https".into()]);
        if schemes.is_empty() {
            return Err(RuleBuildError::EmptySchemeList);
        }
        Ok(Self {
            schemes,
            allow_relative: options.allow_relative || options.relative_only,
            relative_only: options.relative_only,
            allow_credentials: options.allow_credentials,
        })
    }
}

// ============================================================================
// OBJECT PAYLOADS
// ============================================================================

/// Kind of asset named in `assetRequired` messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    /// Image asset.
    Image,
    /// File asset.
    File,
    /// Anything else.
    Asset,
}

impl AssetKind {
    /// Infers the kind from the root type name of a schema type.
    #[must_use]
    pub fn from_type_name(name: Option<&str>) -> Self {
        match name {
            Some("image") => Self::Image,
            Some("file") => Self::File,
            _ => Self::Asset,
        }
    }

    /// Default violation message.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Image => "Image required",
            Self::File => "File required",
            Self::Asset => "Asset required",
        }
    }
}

// ============================================================================
// CONSTRAINT
// ============================================================================

/// One declared constraint of a rule.
#[derive(Debug, Clone)]
pub enum Constraint {
    /// Structural type check.
    Type(BaseType),
    /// `required()` / `optional()`.
    Presence(Presence),
    /// Every child rule must pass.
    All(Vec<Rule>),
    /// At least one child rule must pass.
    Either(Vec<Rule>),
    /// User code.
    Custom(CustomCheck),
    /// Lower limit (length, count, value or date depending on the type).
    Min(Bound),
    /// Upper limit.
    Max(Bound),
    /// Exact length or count.
    Length(Bound),
    /// Allowed values.
    Valid(Vec<Value>),
    /// Whole number.
    Integer,
    /// Maximum number of decimal places.
    Precision(Bound),
    /// Strict lower limit.
    GreaterThan(Bound),
    /// Strict upper limit.
    LessThan(Bound),
    /// Letter casing.
    StringCasing(Casing),
    /// Pattern match.
    Regex(RegexConstraint),
    /// Email address.
    Email,
    /// URL.
    Uri(UriConstraint),
    /// No duplicate array items.
    Unique,
    /// Value is a document reference.
    Reference,
    /// Asset reference is set.
    AssetRequired(AssetKind),
    /// Portable-text block check supplied by user code.
    Block(CustomCheck),
}

impl Constraint {
    /// Flag name used in diagnostics.
    #[must_use]
    pub const fn flag(&self) -> &'static str {
        match self {
            Self::Type(_) => "type",
            Self::Presence(_) => "presence",
            Self::All(_) => "all",
            Self::Either(_) => "either",
            Self::Custom(_) => "custom",
            Self::Min(_) => "min",
            Self::Max(_) => "max",
            Self::Length(_) => "length",
            Self::Valid(_) => "valid",
            Self::Integer => "integer",
            Self::Precision(_) => "precision",
            Self::GreaterThan(_) => "greaterThan",
            Self::LessThan(_) => "lessThan",
            Self::StringCasing(_) => "stringCasing",
            Self::Regex(_) => "regex",
            Self::Email => "email",
            Self::Uri(_) => "uri",
            Self::Unique => "unique",
            Self::Reference => "reference",
            Self::AssetRequired(_) => "assetRequired",
            Self::Block(_) => "block",
        }
    }

    /// Flags that replace an earlier constraint of the same flag instead of
    /// accumulating.
    #[must_use]
    pub const fn is_exclusive(&self) -> bool {
        matches!(self, Self::Type(_) | Self::Uri(_) | Self::Email)
    }

    /// True for user-supplied validators.
    #[must_use]
    pub const fn is_custom(&self) -> bool {
        matches!(self, Self::Custom(_))
    }
}
