//! Bounded exponential-backoff retry for API calls.

use std::future::Future;
use std::time::Duration;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_millis(1000);

/// Run `op` up to `max_attempts` times, sleeping `initial_delay` before the
/// first retry and doubling the delay after each one. The last error is
/// propagated unchanged.
///
/// Every error is retried identically: no jitter, and no distinction
/// between transient failures and client errors. Callers that must fail
/// fast should call the operation directly instead of wrapping it.
pub async fn with_retry<T, E, F, Fut>(
    mut op: F,
    max_attempts: u32,
    initial_delay: Duration,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let max_attempts = max_attempts.max(1);
    let mut delay = initial_delay;
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if attempt >= max_attempts {
                    return Err(err);
                }
                tokio::time::sleep(delay).await;
                delay *= 2;
                attempt += 1;
            }
        }
    }
}

/// [`with_retry`] with the standard 3 attempts / 1 s initial delay.
pub async fn with_default_retry<T, E, F, Fut>(op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    with_retry(op, DEFAULT_MAX_ATTEMPTS, DEFAULT_INITIAL_DELAY).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    const FAST: Duration = Duration::from_millis(1);

    #[tokio::test]
    async fn succeeds_on_third_attempt_after_two_failures() {
        let calls = Cell::new(0u32);
        let result: Result<&str, &str> = with_retry(
            || {
                calls.set(calls.get() + 1);
                let attempt = calls.get();
                async move {
                    if attempt < 3 {
                        Err("transient")
                    } else {
                        Ok("done")
                    }
                }
            },
            3,
            FAST,
        )
        .await;

        assert_eq!(result, Ok("done"));
        assert_eq!(calls.get(), 3);
    }

    #[tokio::test]
    async fn exhausts_attempts_and_returns_the_original_error() {
        let calls = Cell::new(0u32);
        let result: Result<(), String> = with_retry(
            || {
                calls.set(calls.get() + 1);
                async { Err("permanent failure".to_string()) }
            },
            3,
            FAST,
        )
        .await;

        assert_eq!(result.unwrap_err(), "permanent failure");
        assert_eq!(calls.get(), 3);
    }

    #[tokio::test]
    async fn immediate_success_makes_a_single_call() {
        let calls = Cell::new(0u32);
        let result: Result<u32, ()> = with_retry(
            || {
                calls.set(calls.get() + 1);
                async { Ok(42) }
            },
            3,
            FAST,
        )
        .await;

        assert_eq!(result, Ok(42));
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test]
    async fn zero_attempts_still_runs_the_operation_once() {
        let calls = Cell::new(0u32);
        let _: Result<(), ()> = with_retry(
            || {
                calls.set(calls.get() + 1);
                async { Err(()) }
            },
            0,
            FAST,
        )
        .await;
        assert_eq!(calls.get(), 1);
    }
}
