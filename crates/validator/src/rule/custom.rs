//! User-supplied validators
//!
//! [`CustomValidator`] is the only place arbitrary, possibly slow, possibly
//! I/O-bound code runs during validation. Errors returned by a custom
//! validator are not fatal: they become a marker at the validated node.

use crate::document::ValidationContext;
use crate::foundation::Verdict;
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// A user-supplied validation function.
///
/// `value` is `None` when the field is absent from its parent.
///
/// # Examples
///
/// ```rust,ignore
/// use lattice_validator::prelude::*;
///
/// struct NotAdmin;
///
/// #[async_trait::async_trait]
/// impl CustomValidator for NotAdmin {
///     async fn validate(
///         &self,
///         value: Option<&Value>,
///         _context: &ValidationContext<'_>,
///     ) -> anyhow::Result<Verdict> {
///         Ok(match value.and_then(Value::as_str) {
///             Some("admin") => "Reserved name".into(),
///             _ => Verdict::Valid,
///         })
///     }
/// }
///
/// let rule = Rule::string().custom(NotAdmin);
/// ```
#[async_trait]
pub trait CustomValidator: Send + Sync {
    /// Validates `value`.
    async fn validate(
        &self,
        value: Option<&Value>,
        context: &ValidationContext<'_>,
    ) -> anyhow::Result<Verdict>;
}

/// Adapter for synchronous closures.
pub struct FnValidator<F>(F);

impl<F> FnValidator<F>
where
    F: Fn(Option<&Value>, &ValidationContext<'_>) -> anyhow::Result<Verdict> + Send + Sync,
{
    /// Wraps a closure.
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

#[async_trait]
impl<F> CustomValidator for FnValidator<F>
where
    F: Fn(Option<&Value>, &ValidationContext<'_>) -> anyhow::Result<Verdict> + Send + Sync,
{
    async fn validate(
        &self,
        value: Option<&Value>,
        context: &ValidationContext<'_>,
    ) -> anyhow::Result<Verdict> {
        (self.0)(value, context)
    }
}

/// A custom validator attached to a rule.
#[derive(Clone)]
pub struct CustomCheck {
    validator: Arc<dyn CustomValidator>,
    bypass_concurrency_limit: bool,
}

impl CustomCheck {
    /// Wraps a validator.
    pub fn new(validator: impl CustomValidator + 'static) -> Self {
        Self::from_arc(Arc::new(validator))
    }

    /// Wraps a shared validator.
    pub fn from_arc(validator: Arc<dyn CustomValidator>) -> Self {
        Self {
            validator,
            bypass_concurrency_limit: false,
        }
    }

    /// Exempts the check from `max_custom_concurrency`.
    #[must_use = "builder methods must be chained or built"]
    pub fn bypass_concurrency_limit(mut self) -> Self {
        self.bypass_concurrency_limit = true;
        self
    }

    /// True if the check ignores the custom concurrency cap.
    #[must_use]
    pub fn bypasses_concurrency_limit(&self) -> bool {
        self.bypass_concurrency_limit
    }

    /// The wrapped validator.
    #[must_use]
    pub fn validator(&self) -> &dyn CustomValidator {
        self.validator.as_ref()
    }
}

impl fmt::Debug for CustomCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomCheck")
            .field("bypass_concurrency_limit", &self.bypass_concurrency_limit)
            .finish_non_exhaustive()
    }
}
