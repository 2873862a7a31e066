//! Validation run options

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Where the validation run happens.
///
/// The studio is interactive: unknown document types are only logged. The
/// CLI reports them as markers and also flags properties that are not
/// declared in the schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Interactive editing.
    #[default]
    Studio,
    /// Batch validation from the command line.
    Cli,
}

/// Options for a [`DocumentValidator`](crate::document::DocumentValidator).
///
/// # Examples
///
/// ```rust,ignore
/// use lattice_validator::config::{Environment, ValidationOptions};
///
/// let options: ValidationOptions = serde_json::from_str(r#"{"environment": "cli"}"#)?;
/// assert_eq!(options.concurrency, 40);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationOptions {
    /// Maximum in-flight validation units merged per node.
    pub concurrency: usize,

    /// Custom validators running longer than this log a warning. They are
    /// never cancelled.
    #[serde(with = "duration_ms")]
    pub slow_custom_warning: Duration,

    /// Cap on concurrently running custom validators across a validator.
    pub max_custom_concurrency: Option<usize>,

    /// Run environment.
    pub environment: Environment,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            concurrency: 40,
            slow_custom_warning: Duration::from_secs(5),
            max_custom_concurrency: None,
            environment: Environment::Studio,
        }
    }
}

impl ValidationOptions {
    /// Effective fan-out width; zero is treated as one.
    #[must_use]
    pub fn effective_concurrency(&self) -> usize {
        self.concurrency.max(1)
    }

    /// Sets the fan-out width.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Sets the slow custom validator threshold.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_slow_custom_warning(mut self, threshold: Duration) -> Self {
        self.slow_custom_warning = threshold;
        self
    }

    /// Caps concurrently running custom validators.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_max_custom_concurrency(mut self, limit: usize) -> Self {
        self.max_custom_concurrency = Some(limit);
        self
    }

    /// Sets the run environment.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
