//! Retry with exponential backoff for ledger reads
//!
//! Errors are classified by their text. Permanent errors (contract errors,
//! missing roles, malformed input) halt immediately; transient and unknown
//! errors are retried until the attempt budget runs out.

use std::future::Future;
use std::time::Duration;

use eyre::Result;
use tracing::{debug, warn};

/// Retry configuration
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts after the first failure
    pub max_retries: u32,
    /// Initial backoff duration
    pub initial_backoff: Duration,
    /// Maximum backoff duration
    pub max_backoff: Duration,
    /// Backoff multiplier for exponential growth
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_secs(2),
            max_backoff: Duration::from_secs(60),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    pub fn new(max_retries: u32, initial_backoff_ms: u64) -> Self {
        Self {
            max_retries,
            initial_backoff: Duration::from_millis(initial_backoff_ms),
            ..Self::default()
        }
    }

    /// No retries; used by tests and dry-runs against local state
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
            backoff_multiplier: 1.0,
        }
    }

    /// Calculate backoff duration for a given attempt (0-indexed)
    pub fn backoff_for_attempt(&self, attempt: u32) -> Duration {
        let backoff_secs =
            self.initial_backoff.as_secs_f64() * self.backoff_multiplier.powi(attempt as i32);
        let capped = backoff_secs.min(self.max_backoff.as_secs_f64());
        Duration::from_secs_f64(capped)
    }

    /// Check if we should retry based on attempt count
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_retries
    }
}

/// Classifies errors for retry decisions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorClass {
    /// Temporary failure - should retry (LCD timeout, network issues)
    Transient,
    /// Permanent failure - do not retry (contract error, missing role)
    Permanent,
    /// Unknown error - may retry with backoff
    Unknown,
}

/// Classify an error for retry decisions
pub fn classify_error(error: &str) -> ErrorClass {
    let error_lower = error.to_lowercase();

    if error_lower.contains("timeout")
        || error_lower.contains("timed out")
        || error_lower.contains("connection")
        || error_lower.contains("network")
        || error_lower.contains("rate limit exceeded")
        || error_lower.contains("too many requests")
        || error_lower.contains("503")
        || error_lower.contains("502")
        || error_lower.contains("temporarily unavailable")
    {
        return ErrorClass::Transient;
    }

    if error_lower.contains("unauthorized")
        || error_lower.contains("generic error")
        || error_lower.contains("invalid")
        || error_lower.contains("unknown")
        || error_lower.contains("not found")
        || error_lower.contains("insufficient funds")
        || error_lower.contains("overflow")
        || error_lower.contains("cannot")
        || error_lower.contains("contract is paused")
        || error_lower.contains("not initialised")
        || error_lower.contains("incorrect payment")
    {
        return ErrorClass::Permanent;
    }

    ErrorClass::Unknown
}

/// Run `op` until it succeeds, fails permanently, or the retry budget is spent
pub async fn with_retry<T, F, Fut>(config: &RetryConfig, label: &str, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0u32;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                let message = format!("{:#}", err);
                if classify_error(&message) == ErrorClass::Permanent {
                    return Err(err);
                }
                if !config.should_retry(attempt) {
                    warn!(label, attempt, error = %message, "Retries exhausted");
                    return Err(err);
                }
                let backoff = config.backoff_for_attempt(attempt);
                debug!(label, attempt, ?backoff, error = %message, "Retrying");
                tokio::time::sleep(backoff).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eyre::eyre;
    use std::cell::Cell;

    #[test]
    fn test_backoff_grows_and_caps() {
        let config = RetryConfig::default();
        assert_eq!(config.backoff_for_attempt(0), Duration::from_secs(2));
        assert_eq!(config.backoff_for_attempt(1), Duration::from_secs(4));
        assert_eq!(config.backoff_for_attempt(2), Duration::from_secs(8));
        assert_eq!(config.backoff_for_attempt(10), Duration::from_secs(60));
    }

    #[test]
    fn test_should_retry() {
        let config = RetryConfig::new(2, 10);
        assert!(config.should_retry(0));
        assert!(config.should_retry(1));
        assert!(!config.should_retry(2));
        assert!(!RetryConfig::none().should_retry(0));
    }

    #[test]
    fn test_classify_error() {
        assert_eq!(classify_error("request timeout"), ErrorClass::Transient);
        assert_eq!(
            classify_error("error sending request: connection refused"),
            ErrorClass::Transient
        );
        assert_eq!(classify_error("HTTP 503 Service Unavailable"), ErrorClass::Transient);
        assert_eq!(
            classify_error("Unauthorized: terra1abc is missing role 0x00"),
            ErrorClass::Permanent
        );
        assert_eq!(
            classify_error("Generic error: Querier contract error: Unknown rate limit bucket"),
            ErrorClass::Permanent
        );
        assert_eq!(classify_error("something odd"), ErrorClass::Unknown);
    }

    #[tokio::test]
    async fn test_transient_failures_are_retried() {
        let calls = Cell::new(0u32);
        let config = RetryConfig::new(3, 0);
        let value = with_retry(&config, "test", || {
            calls.set(calls.get() + 1);
            let n = calls.get();
            async move {
                if n < 3 {
                    Err(eyre!("connection reset"))
                } else {
                    Ok(n)
                }
            }
        })
        .await
        .unwrap();
        assert_eq!(value, 3);
    }

    #[tokio::test]
    async fn test_permanent_failure_halts() {
        let calls = Cell::new(0u32);
        let config = RetryConfig::new(5, 0);
        let result: Result<()> = with_retry(&config, "test", || {
            calls.set(calls.get() + 1);
            async { Err(eyre!("Unauthorized caller: expected terra1x")) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test]
    async fn test_budget_exhausted() {
        let calls = Cell::new(0u32);
        let config = RetryConfig::new(2, 0);
        let result: Result<()> = with_retry(&config, "test", || {
            calls.set(calls.get() + 1);
            async { Err(eyre!("network unreachable")) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.get(), 3);
    }
}
