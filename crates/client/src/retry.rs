use std::time::Duration;

use log::warn;

/// Runs `f` up to `max_attempts` times, sleeping `delay` between attempts.
/// An error is retried only while `should_retry` says so; anything else is
/// returned immediately.
pub async fn retry<T, E, F>(
    mut f: F,
    max_attempts: usize,
    delay: Duration,
    should_retry: impl Fn(&E) -> bool,
) -> Result<T, E>
where
    E: std::fmt::Display,
    F: AsyncFnMut() -> Result<T, E>,
{
    assert!(max_attempts > 0, "max_attempts must be greater than 0");
    let mut err = None;
    for attempt in 1..=max_attempts {
        match f().await {
            Ok(result) => return Ok(result),
            Err(e) if should_retry(&e) && attempt < max_attempts => {
                warn!("attempt {}/{} failed: {}", attempt, max_attempts, e);
                err = Some(e);
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
    Err(err.unwrap_or_else(|| {
        panic!("all attempts failed, but no error was captured. This should not happen.");
    }))
}
