//! Retry with Exponential Backoff
//!
//! Used for notification delivery only. Credential-store calls are never
//! retried within a scan; the next scan recomputes from the store's state.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

use crate::error::{ScanError, ScanResult};

/// Backoff schedule for a retried call
///
/// Durations use humantime notation in configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts including the first; values below 1 mean 1
    pub max_attempts: u32,

    /// Delay before the second attempt
    #[serde(with = "humantime_serde")]
    pub initial_backoff: Duration,

    /// Growth factor between consecutive delays
    pub backoff_multiplier: f32,

    /// Upper bound on any single delay
    #[serde(with = "humantime_serde")]
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(200),
            backoff_multiplier: 2.0,
            max_backoff: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// Single attempt, no delays
    pub const fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            initial_backoff: Duration::ZERO,
            backoff_multiplier: 1.0,
            max_backoff: Duration::ZERO,
        }
    }

    /// Attempts actually made
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Delay after failed attempt number `attempt` (zero-based)
    ///
    /// Exponential in `attempt`, jittered by ±10%, capped at `max_backoff`.
    pub fn backoff_duration(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let base = self.initial_backoff.as_secs_f64()
            * f64::from(self.backoff_multiplier).powi(exponent);
        let jitter = rand::rng().random_range(0.9..=1.1);

        Duration::try_from_secs_f64(base * jitter)
            .unwrap_or(self.max_backoff)
            .min(self.max_backoff)
    }
}

/// Run `f` until it succeeds or the policy's attempts are used up
///
/// Each failure is logged at `warn!`. An error that is not
/// [transient](ScanError::is_transient) is returned at once. Exhaustion yields
/// [`ScanError::MaxRetriesExceeded`] carrying the last error text.
pub async fn retry_with_backoff<F, Fut, T>(
    policy: &RetryPolicy,
    operation: &str,
    mut f: F,
) -> ScanResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ScanResult<T>>,
{
    let attempts = policy.attempts();
    let mut last_error = None;

    for attempt in 0..attempts {
        match f().await {
            Ok(value) => return Ok(value),
            Err(err) if !err.is_transient() => {
                tracing::warn!(operation, error = %err, "Permanent failure, not retrying");
                return Err(err);
            }
            Err(err) => {
                tracing::warn!(
                    operation,
                    attempt = attempt + 1,
                    max_attempts = attempts,
                    error = %err,
                    "Attempt failed"
                );

                if attempt + 1 < attempts {
                    let backoff = policy.backoff_duration(attempt);
                    tracing::debug!(
                        operation,
                        backoff_ms = u64::try_from(backoff.as_millis()).unwrap_or(u64::MAX),
                        "Backing off before next attempt"
                    );
                    tokio::time::sleep(backoff).await;
                }
                last_error = Some(err);
            }
        }
    }

    let detail = last_error
        .map(|err| format!(" (last error: {err})"))
        .unwrap_or_default();

    Err(ScanError::MaxRetriesExceeded {
        operation: format!("{operation}{detail}"),
        max_attempts: attempts,
    })
}
