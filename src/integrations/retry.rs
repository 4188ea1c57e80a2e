//! Retry with exponential backoff for GitHub and JIRA calls
//!
//! Transient failures (connection drops, 5xx, rate limits) are retried with
//! exponential backoff and jitter. Everything else fails on the first attempt
//! so the batch can log it and move on.

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Configuration for retry behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (not including the initial attempt)
    pub max_retries: u32,

    /// Initial backoff duration
    #[serde(with = "millis")]
    pub initial_backoff: Duration,

    /// Maximum backoff duration, also caps server-supplied Retry-After
    #[serde(with = "millis")]
    pub max_backoff: Duration,

    /// Backoff multiplier
    pub multiplier: f64,

    /// Add random jitter to the computed backoff
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(60),
            multiplier: 2.0,
            jitter: true,
        }
    }
}

impl RetryConfig {
    /// Single attempt, no retries
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Short backoff, used by tests and interactive runs
    pub fn quick() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(5),
            multiplier: 2.0,
            jitter: true,
        }
    }

    /// Calculate backoff duration for a given attempt
    pub fn backoff_duration(&self, attempt: u32) -> Duration {
        let base = self.initial_backoff.as_secs_f64() * self.multiplier.powi(attempt as i32);
        let capped = base.min(self.max_backoff.as_secs_f64());

        let final_duration = if self.jitter {
            // 0-25% jitter
            capped * (1.0 + rand_jitter() * 0.25)
        } else {
            capped
        };

        Duration::from_secs_f64(final_duration)
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}

/// Pseudo-random jitter in [0.0, 1.0)
fn rand_jitter() -> f64 {
    use std::time::SystemTime;
    let nanos = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    (nanos % 1000) as f64 / 1000.0
}

/// Retry classification for errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry with computed backoff
    Retry,
    /// Retry after a specific duration (e.g., from Retry-After header)
    RetryAfter(Duration),
    /// Permanent failure
    NoRetry,
}

/// Errors that know whether they are worth retrying
pub trait RetryableError {
    fn retry_decision(&self) -> RetryDecision;
}

/// Execute an async operation with retry logic
///
/// Returns the first success, or the last error once retries are exhausted
/// or a permanent error is seen.
pub async fn with_retry<F, Fut, T, E>(
    config: &RetryConfig,
    operation_name: &str,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: RetryableError + std::fmt::Display,
{
    let mut attempt = 0;

    loop {
        let e = match operation().await {
            Ok(result) => return Ok(result),
            Err(e) => e,
        };

        let decision = e.retry_decision();
        if decision == RetryDecision::NoRetry {
            debug!(operation = operation_name, attempt, error = %e, "Permanent failure");
            return Err(e);
        }

        if attempt >= config.max_retries {
            warn!(
                operation = operation_name,
                attempts = attempt + 1,
                error = %e,
                "Giving up after retries"
            );
            return Err(e);
        }

        let backoff = match decision {
            RetryDecision::RetryAfter(d) => d.min(config.max_backoff),
            _ => config.backoff_duration(attempt),
        };

        warn!(
            operation = operation_name,
            attempt = attempt + 1,
            max_attempts = config.max_retries + 1,
            backoff_secs = backoff.as_secs_f64(),
            error = %e,
            "Retrying after transient error"
        );

        sleep(backoff).await;
        attempt += 1;
    }
}
