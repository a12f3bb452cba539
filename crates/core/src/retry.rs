//! Bounded retry with exponential backoff for fallible async operations.
//!
//! [`with_retry`] is the generic executor; [`retry_generation`] is the
//! specialization used by the pipeline for its four generation steps
//! (fixed attempt count, step-tagged logging, and a failure hook that
//! fires only after final exhaustion).
//!
//! This module performs no I/O of its own beyond the timer sleep and
//! the supplied hooks.

use std::future::Future;
use std::time::Duration;

use crate::error::CoreError;
use crate::step::GenerationStep;

/// Attempts made by [`retry_generation`] before giving up.
pub const GENERATION_ATTEMPTS: u32 = 3;

/// Initial backoff delay used by [`retry_generation`].
pub const GENERATION_INITIAL_DELAY: Duration = Duration::from_secs(2);

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Retry behaviour knobs.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Delay before the second attempt.
    pub initial_delay: Duration,
    /// Ceiling on backoff growth.
    pub max_delay: Duration,
    /// Multiplier applied per attempt.
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
        }
    }
}

/// Delay applied after the given 1-based failed attempt:
/// `min(initial * multiplier^(attempt-1), max)`.
pub fn backoff_delay(config: &RetryConfig, attempt: u32) -> Duration {
    let factor = config.backoff_multiplier.powi(attempt.saturating_sub(1) as i32);
    config.initial_delay.mul_f64(factor).min(config.max_delay)
}

// ---------------------------------------------------------------------------
// Generic executor
// ---------------------------------------------------------------------------

/// Execute `op`, retrying on failure with exponential backoff.
///
/// On each failure with attempts remaining, `on_retry(&error, attempt)`
/// is invoked (attempt is 1-based) and the caller is suspended for the
/// backoff delay. After `max_attempts` consecutive failures the result
/// is [`CoreError::RetryExhausted`] wrapping the last underlying error;
/// its message names the attempt count.
pub async fn with_retry<T, F, Fut, R>(
    mut op: F,
    config: &RetryConfig,
    mut on_retry: R,
) -> Result<T, CoreError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, CoreError>>,
    R: FnMut(&CoreError, u32),
{
    let mut last_err: Option<CoreError> = None;

    for attempt in 1..=config.max_attempts {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                // No hook and no sleep on the final attempt.
                if attempt == config.max_attempts {
                    last_err = Some(err);
                    break;
                }

                on_retry(&err, attempt);

                let delay = backoff_delay(config, attempt);
                tracing::debug!(
                    attempt,
                    max_attempts = config.max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    "Operation failed, retrying after backoff"
                );
                last_err = Some(err);
                tokio::time::sleep(delay).await;
            }
        }
    }

    let source = last_err
        .unwrap_or_else(|| CoreError::Internal("retry executor ran zero attempts".into()));
    Err(CoreError::retry_exhausted(config.max_attempts, source))
}

// ---------------------------------------------------------------------------
// Generation specialization
// ---------------------------------------------------------------------------

/// Retry a generation step with the pipeline's fixed policy
/// (3 attempts, 2 s initial delay).
///
/// Per-attempt failures are logged tagged with the step name. Only
/// after final exhaustion is `on_failure(total_attempts)` awaited,
/// before the exhaustion error is returned.
pub async fn retry_generation<T, F, Fut, H, HFut>(
    step: GenerationStep,
    op: F,
    on_failure: H,
) -> Result<T, CoreError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, CoreError>>,
    H: FnOnce(u32) -> HFut,
    HFut: Future<Output = ()>,
{
    let config = RetryConfig {
        max_attempts: GENERATION_ATTEMPTS,
        initial_delay: GENERATION_INITIAL_DELAY,
        ..RetryConfig::default()
    };

    let result = with_retry(op, &config, |error, attempt| {
        tracing::error!(
            step = %step,
            attempt,
            error = %error,
            "Generation step attempt failed"
        );
    })
    .await;

    match result {
        Ok(value) => Ok(value),
        Err(err) => {
            on_failure(GENERATION_ATTEMPTS).await;
            Err(err)
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
