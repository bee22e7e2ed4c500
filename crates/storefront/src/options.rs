// ABOUTME: Configuration options for extraction including RetryPolicy, Options, and ExtractorBuilder.
// ABOUTME: ExtractorBuilder provides a fluent API for constructing validated Extractor instances.

use std::time::Duration;

use crate::error::ExtractError;
use crate::extract::Extractor;
use crate::loader::load_builtin_schema;
use crate::schema::ExtractionSchema;

/// How often and how patiently to re-fetch a page that came back blocked.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total fetch attempts, including the first one. Zero is treated as one.
    pub max_attempts: u32,
    /// Wait before the second attempt.
    pub backoff: Duration,
    /// Multiplier applied to the wait after each further attempt.
    pub backoff_factor: f64,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_secs(1),
            backoff_factor: 2.0,
            max_backoff: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// A policy that retries immediately, mostly useful in tests.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            backoff: Duration::ZERO,
            backoff_factor: 1.0,
            max_backoff: Duration::ZERO,
        }
    }

    /// Wait after the given failed attempt (1-based) before the next one.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(64) as i32;
        let secs = self.backoff.as_secs_f64() * self.backoff_factor.max(1.0).powi(exp);
        if secs.is_finite() && secs < self.max_backoff.as_secs_f64() {
            Duration::from_secs_f64(secs)
        } else {
            self.max_backoff
        }
    }

    pub(crate) fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

/// Configuration options for an Extractor.
#[derive(Debug, Clone, Default)]
pub struct Options {
    pub retry: RetryPolicy,
}

/// Builder for constructing Extractor instances with custom configuration.
#[derive(Debug, Clone, Default)]
pub struct ExtractorBuilder {
    schema: Option<ExtractionSchema>,
    builtin: Option<String>,
    opts: Options,
}

impl ExtractorBuilder {
    /// Create a new ExtractorBuilder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an explicit schema.
    pub fn schema(mut self, schema: ExtractionSchema) -> Self {
        self.schema = Some(schema);
        self.builtin = None;
        self
    }

    /// Use one of the built-in schemas by name.
    pub fn builtin(mut self, name: impl Into<String>) -> Self {
        self.builtin = Some(name.into());
        self.schema = None;
        self
    }

    /// Replace the whole retry policy.
    pub fn retry(mut self, policy: RetryPolicy) -> Self {
        self.opts.retry = policy;
        self
    }

    /// Set the total number of fetch attempts for blocked pages.
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.opts.retry.max_attempts = attempts;
        self
    }

    /// Set the initial wait between blocked attempts.
    pub fn backoff(mut self, backoff: Duration) -> Self {
        self.opts.retry.backoff = backoff;
        self
    }

    /// Build the Extractor, validating the schema.
    ///
    /// Without an explicit schema the `amazon-product` built-in is used.
    pub fn build(self) -> Result<Extractor, ExtractError> {
        let schema = match (self.schema, self.builtin) {
            (Some(schema), _) => schema,
            (None, Some(name)) => load_builtin_schema(&name)?,
            (None, None) => load_builtin_schema(crate::loader::DEFAULT_SCHEMA)?,
        };
        Extractor::new(schema, self.opts)
    }
}
