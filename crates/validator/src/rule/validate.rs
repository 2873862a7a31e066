//! Rule execution

use super::{Constraint, Presence, Rule};
use crate::document::ValidationContext;
use crate::error::EngineError;
use crate::foundation::{Level, ValidationMarker, Verdict, to_markers};
use crate::validators::{self, Check, Failure};
use futures::future::{BoxFuture, FutureExt, try_join_all};
use serde_json::Value;

impl Rule {
    /// Validates `value` (`None` when absent) and returns the markers of
    /// every violated constraint.
    ///
    /// - An `optional()` rule on an absent or null value produces nothing.
    /// - A rule with unset presence only runs its custom validators on an
    ///   absent or null value.
    /// - Errors raised by custom validators become a marker at
    ///   `context.path`.
    ///
    /// Fails when a validator breaks the result contract, or when a
    /// constraint has no validator for the rule's base type.
    pub fn validate<'a>(
        &'a self,
        value: Option<&'a Value>,
        context: &'a ValidationContext<'a>,
    ) -> BoxFuture<'a, Result<Vec<ValidationMarker>, EngineError>> {
        self.run_all(value, context).boxed()
    }

    async fn run_all(
        &self,
        value: Option<&Value>,
        context: &ValidationContext<'_>,
    ) -> Result<Vec<ValidationMarker>, EngineError> {
        let is_empty = value.is_none_or(Value::is_null);
        if is_empty && self.required == Some(Presence::Optional) {
            return Ok(Vec::new());
        }
        let only_custom = is_empty && self.required.is_none();

        let checks = self
            .constraints
            .iter()
            .filter(|constraint| !only_custom || constraint.is_custom())
            .map(|constraint| self.run(constraint, value, context));
        let results = try_join_all(checks).await?;
        Ok(results.into_iter().flatten().collect())
    }

    async fn run(
        &self,
        constraint: &Constraint,
        value: Option<&Value>,
        context: &ValidationContext<'_>,
    ) -> Result<Vec<ValidationMarker>, EngineError> {
        let check = Check {
            rule: self,
            value,
            message: self.message.as_deref(),
            context,
        };
        match validators::dispatch(constraint, &check).await {
            Ok(verdict) => Ok(to_markers(verdict, self.level, context.path())?),
            Err(Failure::Engine(error)) => Err(error),
            Err(Failure::Exception(error)) => {
                let message = format!(
                    "{}: Exception occurred while validating value: {error}",
                    context.path()
                );
                Ok(to_markers(Verdict::Message(message), Level::Error, context.path())?)
            }
        }
    }
}
