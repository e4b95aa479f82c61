//! The one retry helper every provider goes through
//!
//! Policy: retry on rate limits and transport failures (429, 5xx,
//! network); fail fast on every other 4xx so a bad request never burns
//! the retry budget. Backoff is quadratic (1s, 4s, 9s …) and the whole
//! loop runs under one overall deadline, so a sleep can never outlive
//! the caller's patience.

use std::future::Future;
use std::time::Duration;

use codemap_core::{CancelFlag, CodemapError, Result};
use tracing::warn;

/// Retry/deadline knobs for one LLM operation.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    /// Overall deadline covering every attempt and every backoff sleep.
    pub deadline: Duration,
    /// Base backoff unit; attempt `n` sleeps `base · n²`.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_retries: 3,
            deadline: Duration::from_secs(120),
            base_delay: Duration::from_secs(1),
        }
    }
}

/// Run `op` under the policy. The operation is re-invoked on retryable
/// errors only; cancellation is re-checked before every attempt and
/// after every failure.
pub async fn with_retries<T, F, Fut>(
    policy: &RetryPolicy,
    cancel: &CancelFlag,
    what: &str,
    mut op: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let attempts = async {
        let mut attempt = 0u32;
        loop {
            if cancel.is_cancelled() {
                return Err(CodemapError::LlmTransport(format!("{what}: cancelled")));
            }
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < policy.max_retries => {
                    if cancel.is_cancelled() {
                        return Err(CodemapError::LlmTransport(format!("{what}: cancelled")));
                    }
                    attempt += 1;
                    let factor = attempt * attempt;
                    let delay = policy.base_delay * factor;
                    warn!("{what} failed ({e}), retry {attempt}/{} in {delay:?}", policy.max_retries);
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    };

    match tokio::time::timeout(policy.deadline, attempts).await {
        Ok(result) => result,
        Err(_) => Err(CodemapError::LlmTransport(format!(
            "{what}: deadline of {:?} exceeded",
            policy.deadline
        ))),
    }
}

/// Map an HTTP status to the error taxonomy.
pub fn error_for_status(status: reqwest::StatusCode, body: &str, provider: &str) -> CodemapError {
    let detail = body.chars().take(300).collect::<String>();
    match status.as_u16() {
        401 | 403 => CodemapError::LlmAuth(format!("{provider}: {detail}")),
        429 => CodemapError::LlmQuota,
        400 if detail.contains("context_length") || detail.contains("too long") => {
            CodemapError::LlmContext(format!("{provider}: {detail}"))
        }
        404 if detail.contains("model") => {
            CodemapError::LlmRefused(format!("{provider}: model not found: {detail}"))
        }
        s if (400..500).contains(&s) => CodemapError::LlmRefused(format!("{provider}: {detail}")),
        _ => CodemapError::LlmTransport(format!("{provider}: status {status}: {detail}")),
    }
}

/// Map a reqwest transport error to the taxonomy.
pub fn error_for_transport(e: reqwest::Error, provider: &str) -> CodemapError {
    CodemapError::LlmTransport(format!("{provider}: {e}"))
}
