//! Retry logic.
//!
//! # Responsibilities
//! - Re-run an async operation while its error is retryable
//! - Space attempts with exponential backoff + jitter
//! - Give up after the configured number of attempts
//!
//! # Design Decisions
//! - The caller decides what is retryable; reverts never are
//! - The last error is returned unchanged once attempts run out

use std::future::Future;

use crate::resilience::backoff::Backoff;

/// Run `op` until it succeeds, returns a non-retryable error, or attempts run out.
///
/// `on_retry` is called with the failed attempt number and its error before sleeping.
pub async fn retry_with_backoff<T, E, F, Fut, R, N>(
    backoff: Backoff,
    mut op: F,
    is_retryable: R,
    mut on_retry: N,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    R: Fn(&E) -> bool,
    N: FnMut(u32, &E),
{
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if is_retryable(&e) => match backoff.delay(attempt) {
                Some(delay) => {
                    on_retry(attempt, &e);
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                None => return Err(e),
            },
            Err(e) => return Err(e),
        }
    }
}
