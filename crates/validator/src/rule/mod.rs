//! The rule builder
//!
//! A [`Rule`] is a value: an optional [`BaseType`], an ordered list of
//! [`Constraint`]s, a [`Level`], an optional override message and a
//! tri-state presence flag. Builder methods consume the rule and return the
//! extended one, so a rule that has been handed to a schema is never
//! changed afterwards. Clone a rule to branch from it.
//!
//! # Examples
//!
//! ```rust,ignore
//! use lattice_validator::prelude::*;
//!
//! let title = Rule::string().required().min(3).max(80);
//! let homepage = Rule::string().uri(UriOptions::default().scheme(["https"]))?;
//! let tags = Rule::array().unique().max(10).warning("Too many tags");
//! ```

mod constraint;
mod custom;
mod validate;

pub use constraint::{
    AssetKind, BaseType, Bound, Casing, Constraint, FieldRef, Presence, RegexConstraint,
    RegexOptions, SchemeMatcher, UriConstraint, UriOptions,
};
pub use custom::{CustomCheck, CustomValidator, FnValidator};

use crate::document::ValidationContext;
use crate::error::RuleBuildError;
use crate::foundation::{Level, Verdict};
use crate::schema::Validation;
use indexmap::IndexMap;
use regex::Regex;
use serde_json::Value;
use std::sync::Arc;

/// Rules applied to named child fields of an object, set with
/// [`Rule::fields`].
pub type FieldRules = IndexMap<String, Validation>;

/// An immutable rule specification.
#[derive(Debug, Clone, Default)]
pub struct Rule {
    base_type: Option<BaseType>,
    level: Level,
    required: Option<Presence>,
    message: Option<String>,
    constraints: Vec<Constraint>,
    field_rules: Option<Arc<FieldRules>>,
    type_name: Option<String>,
}

// ============================================================================
// CONSTRUCTORS
// ============================================================================

impl Rule {
    /// An untyped rule.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A rule with a base type.
    #[must_use]
    pub fn typed(base_type: BaseType) -> Self {
        Self::new().with_type(base_type)
    }

    /// `Rule::typed(BaseType::String)`.
    #[must_use]
    pub fn string() -> Self {
        Self::typed(BaseType::String)
    }

    /// `Rule::typed(BaseType::Number)`.
    #[must_use]
    pub fn number() -> Self {
        Self::typed(BaseType::Number)
    }

    /// `Rule::typed(BaseType::Boolean)`.
    #[must_use]
    pub fn boolean() -> Self {
        Self::typed(BaseType::Boolean)
    }

    /// `Rule::typed(BaseType::Array)`.
    #[must_use]
    pub fn array() -> Self {
        Self::typed(BaseType::Array)
    }

    /// `Rule::typed(BaseType::Object)`.
    #[must_use]
    pub fn object() -> Self {
        Self::typed(BaseType::Object)
    }

    /// `Rule::typed(BaseType::Date)`.
    #[must_use]
    pub fn date_time() -> Self {
        Self::typed(BaseType::Date)
    }

    /// A bound that reads a sibling field at validation time.
    ///
    /// ```rust,ignore
    /// let end = Rule::date_time().min(Rule::value_of_field("start"));
    /// ```
    #[must_use]
    pub fn value_of_field(path: &str) -> FieldRef {
        FieldRef::new(path)
    }
}

// ============================================================================
// ACCESSORS
// ============================================================================

impl Rule {
    /// The declared base type, if any.
    #[must_use]
    pub fn base_type(&self) -> Option<BaseType> {
        self.base_type
    }

    /// Marker level.
    #[must_use]
    pub fn level(&self) -> Level {
        self.level
    }

    /// Override message.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Explicit presence, `None` when neither `required()` nor `optional()`
    /// was called.
    #[must_use]
    pub fn presence(&self) -> Option<Presence> {
        self.required
    }

    /// True after `required()`.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required == Some(Presence::Required)
    }

    /// Declared constraints, in order.
    #[must_use]
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Child field rules set with [`Rule::fields`].
    #[must_use]
    pub fn field_rules(&self) -> Option<&FieldRules> {
        self.field_rules.as_deref()
    }

    /// Root schema type name the rule was derived for.
    #[must_use]
    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }
}

// ============================================================================
// COMPOSITION
// ============================================================================

impl Rule {
    /// Records the root schema type name (used by `asset_required`).
    #[must_use = "builder methods must be chained or built"]
    pub fn for_type_name(mut self, name: impl Into<String>) -> Self {
        self.type_name = Some(name.into());
        self
    }

    /// Appends constraints. `type`, `uri` and `email` replace an existing
    /// constraint of the same flag.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_constraints(mut self, constraints: Vec<Constraint>) -> Self {
        for constraint in &constraints {
            if let Constraint::Type(base_type) = constraint {
                self.base_type = Some(*base_type);
            }
        }
        self.constraints.retain(|existing| {
            !(existing.is_exclusive()
                && constraints.iter().any(|new| new.flag() == existing.flag()))
        });
        self.constraints.extend(constraints);
        self
    }

    fn with(self, constraint: Constraint) -> Self {
        self.with_constraints(vec![constraint])
    }

    /// Combines two rules.
    ///
    /// Presence becomes required if either is required, else optional if
    /// either is optional. The level is `other`'s when `self` is at the
    /// default `Error` level, otherwise `self`'s.
    pub fn merge(&self, other: &Rule) -> Result<Rule, RuleBuildError> {
        if let (Some(left), Some(right)) = (self.base_type, other.base_type) {
            if left != right {
                return Err(RuleBuildError::ConflictingTypes {
                    left: left.to_string(),
                    right: right.to_string(),
                });
            }
        }

        let mut merged = self.clone().with_constraints(other.constraints.clone());
        merged.base_type = self.base_type.or(other.base_type);
        merged.message = self.message.clone().or_else(|| other.message.clone());
        merged.required = match (self.required, other.required) {
            (Some(Presence::Required), _) | (_, Some(Presence::Required)) => {
                Some(Presence::Required)
            }
            (Some(Presence::Optional), _) | (_, Some(Presence::Optional)) => {
                Some(Presence::Optional)
            }
            _ => None,
        };
        merged.level = if self.level == Level::Error {
            other.level
        } else {
            self.level
        };
        Ok(merged)
    }

    /// Clears everything except the type constraint.
    #[must_use = "builder methods must be chained or built"]
    pub fn reset(mut self) -> Self {
        self.constraints
            .retain(|constraint| matches!(constraint, Constraint::Type(_)));
        self.message = None;
        self.required = None;
        self.level = Level::Error;
        self.field_rules = None;
        self
    }

    /// Sets the base type.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_type(self, base_type: BaseType) -> Self {
        self.with(Constraint::Type(base_type))
    }

    /// Sets the base type by name (case-insensitive first letter).
    pub fn of_type(self, name: &str) -> Result<Self, RuleBuildError> {
        Ok(self.with_type(BaseType::parse(name)?))
    }

    /// Every child rule must pass.
    #[must_use = "builder methods must be chained or built"]
    pub fn all(self, children: Vec<Rule>) -> Self {
        self.with(Constraint::All(children))
    }

    /// At least one child rule must pass.
    #[must_use = "builder methods must be chained or built"]
    pub fn either(self, children: Vec<Rule>) -> Self {
        self.with(Constraint::Either(children))
    }
}

// ============================================================================
// LEVEL AND MESSAGE
// ============================================================================

impl Rule {
    fn leveled(mut self, level: Level, message: &str) -> Self {
        self.level = level;
        self.message = (!message.is_empty()).then(|| message.to_owned());
        self
    }

    /// Error level with an override message (empty for none).
    #[must_use = "builder methods must be chained or built"]
    pub fn error(self, message: &str) -> Self {
        self.leveled(Level::Error, message)
    }

    /// Warning level with an override message (empty for none).
    #[must_use = "builder methods must be chained or built"]
    pub fn warning(self, message: &str) -> Self {
        self.leveled(Level::Warning, message)
    }

    /// Info level with an override message (empty for none).
    #[must_use = "builder methods must be chained or built"]
    pub fn info(self, message: &str) -> Self {
        self.leveled(Level::Info, message)
    }
}

// ============================================================================
// SHARED CONSTRAINTS
// ============================================================================

impl Rule {
    /// Absence is a violation.
    #[must_use = "builder methods must be chained or built"]
    pub fn required(mut self) -> Self {
        self.required = Some(Presence::Required);
        self.with(Constraint::Presence(Presence::Required))
    }

    /// Absence skips every constraint.
    #[must_use = "builder methods must be chained or built"]
    pub fn optional(mut self) -> Self {
        self.required = Some(Presence::Optional);
        self.with(Constraint::Presence(Presence::Optional))
    }

    /// Runs user code.
    #[must_use = "builder methods must be chained or built"]
    pub fn custom(self, validator: impl CustomValidator + 'static) -> Self {
        self.with(Constraint::Custom(CustomCheck::new(validator)))
    }

    /// Runs a prepared custom check.
    #[must_use = "builder methods must be chained or built"]
    pub fn custom_check(self, check: CustomCheck) -> Self {
        self.with(Constraint::Custom(check))
    }

    /// Runs a synchronous closure.
    #[must_use = "builder methods must be chained or built"]
    pub fn custom_fn<F>(self, f: F) -> Self
    where
        F: Fn(Option<&Value>, &ValidationContext<'_>) -> anyhow::Result<Verdict>
            + Send
            + Sync
            + 'static,
    {
        self.custom(FnValidator::new(f))
    }

    /// Lower limit: characters, items, value or date by base type.
    #[must_use = "builder methods must be chained or built"]
    pub fn min(self, bound: impl Into<Bound>) -> Self {
        self.with(Constraint::Min(bound.into()))
    }

    /// Upper limit: characters, items, value or date by base type.
    #[must_use = "builder methods must be chained or built"]
    pub fn max(self, bound: impl Into<Bound>) -> Self {
        self.with(Constraint::Max(bound.into()))
    }

    /// Exact characters or items.
    #[must_use = "builder methods must be chained or built"]
    pub fn length(self, bound: impl Into<Bound>) -> Self {
        self.with(Constraint::Length(bound.into()))
    }

    /// Allowed values. An array is a list of alternatives; anything else is
    /// a single allowed value.
    #[must_use = "builder methods must be chained or built"]
    pub fn valid(self, values: impl Into<Value>) -> Self {
        let values = match values.into() {
            Value::Array(values) => values,
            value => vec![value],
        };
        self.with(Constraint::Valid(values))
    }
}

// ============================================================================
// NUMBER CONSTRAINTS
// ============================================================================

impl Rule {
    /// Whole numbers only.
    #[must_use = "builder methods must be chained or built"]
    pub fn integer(self) -> Self {
        self.with(Constraint::Integer)
    }

    /// At most `limit` decimal places.
    #[must_use = "builder methods must be chained or built"]
    pub fn precision(self, limit: impl Into<Bound>) -> Self {
        self.with(Constraint::Precision(limit.into()))
    }

    /// `min(0)`.
    #[must_use = "builder methods must be chained or built"]
    pub fn positive(self) -> Self {
        self.min(0)
    }

    /// `less_than(0)`.
    #[must_use = "builder methods must be chained or built"]
    pub fn negative(self) -> Self {
        self.less_than(0)
    }

    /// Strict lower limit.
    #[must_use = "builder methods must be chained or built"]
    pub fn greater_than(self, bound: impl Into<Bound>) -> Self {
        self.with(Constraint::GreaterThan(bound.into()))
    }

    /// Strict upper limit.
    #[must_use = "builder methods must be chained or built"]
    pub fn less_than(self, bound: impl Into<Bound>) -> Self {
        self.with(Constraint::LessThan(bound.into()))
    }
}

// ============================================================================
// STRING CONSTRAINTS
// ============================================================================

impl Rule {
    /// All uppercase.
    #[must_use = "builder methods must be chained or built"]
    pub fn uppercase(self) -> Self {
        self.with(Constraint::StringCasing(Casing::Uppercase))
    }

    /// All lowercase.
    #[must_use = "builder methods must be chained or built"]
    pub fn lowercase(self) -> Self {
        self.with(Constraint::StringCasing(Casing::Lowercase))
    }

    /// Must match `pattern`.
    #[must_use = "builder methods must be chained or built"]
    pub fn regex(self, pattern: Regex) -> Self {
        self.regex_with(pattern, RegexOptions::default())
    }

    /// Must match (or, inverted, must not match) `pattern`.
    #[must_use = "builder methods must be chained or built"]
    pub fn regex_with(self, pattern: Regex, options: RegexOptions) -> Self {
        self.with(Constraint::Regex(RegexConstraint {
            pattern,
            name: options.name,
            invert: options.invert,
        }))
    }

    /// Compiles `pattern` and adds it as a `regex` constraint.
    pub fn pattern(self, pattern: &str, options: RegexOptions) -> Result<Self, RuleBuildError> {
        let compiled = Regex::new(pattern).map_err(|source| RuleBuildError::InvalidPattern {
            pattern: pattern.to_owned(),
            source,
        })?;
        Ok(self.regex_with(compiled, options))
    }

    /// Email address.
    #[must_use = "builder methods must be chained or built"]
    pub fn email(self) -> Self {
        self.with(Constraint::Email)
    }

    /// URL with scheme and relative/credential policy.
    pub fn uri(self, options: UriOptions) -> Result<Self, RuleBuildError> {
        Ok(self.with(Constraint::Uri(UriConstraint::try_from(options)?)))
    }
}

// ============================================================================
// ARRAY AND OBJECT CONSTRAINTS
// ============================================================================

impl Rule {
    /// No two items may be deep-equal (ignoring `_key`).
    #[must_use = "builder methods must be chained or built"]
    pub fn unique(self) -> Self {
        self.with(Constraint::Unique)
    }

    /// Must carry a string `_ref`.
    #[must_use = "builder methods must be chained or built"]
    pub fn reference(self) -> Self {
        self.with(Constraint::Reference)
    }

    /// Portable-text block check.
    #[must_use = "builder methods must be chained or built"]
    pub fn block(self, validator: impl CustomValidator + 'static) -> Self {
        self.with(Constraint::Block(CustomCheck::new(validator)))
    }

    /// Rules for named child fields, validated with each field's own type.
    ///
    /// Only object rules accept field rules.
    pub fn fields<I, K>(mut self, rules: I) -> Result<Self, RuleBuildError>
    where
        I: IntoIterator<Item = (K, Validation)>,
        K: Into<String>,
    {
        if self.base_type != Some(BaseType::Object) {
            return Err(RuleBuildError::FieldsOnNonObject {
                found: self
                    .base_type
                    .map_or_else(|| "untyped".to_owned(), |ty| ty.to_string()),
            });
        }
        self.field_rules = Some(Arc::new(
            rules.into_iter().map(|(name, rule)| (name.into(), rule)).collect(),
        ));
        Ok(self)
    }

    /// `asset._ref` must be set. The message names the asset kind of the
    /// schema type the rule was derived for.
    #[must_use = "builder methods must be chained or built"]
    pub fn asset_required(self) -> Self {
        let kind = AssetKind::from_type_name(self.type_name.as_deref());
        self.with(Constraint::AssetRequired(kind))
    }
}
