//! Bounded polling for eventual consistency
//!
//! Used by resource managers where no stock wait condition applies,
//! e.g. waiting for an object to disappear after deletion.

use std::future::Future;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::time::sleep;
use tracing::debug;

/// Polling errors
#[derive(Error, Debug)]
pub enum PollError {
    #[error("Timed out after {timeout_secs}s waiting for {what}")]
    Timeout { what: String, timeout_secs: u64 },

    #[error("Check failed while waiting for {what}: {source}")]
    Check {
        what: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Poll `check` every `interval` until it returns `Ok(true)` or `timeout`
/// elapses. A check returning `Ok(false)` is retried; an `Err` aborts the
/// wait immediately.
pub async fn poll_until<F, Fut>(
    what: &str,
    timeout: Duration,
    interval: Duration,
    mut check: F,
) -> Result<(), PollError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = anyhow::Result<bool>>,
{
    let start = Instant::now();

    loop {
        match check().await {
            Ok(true) => {
                debug!(
                    "{} satisfied after {}ms",
                    what,
                    start.elapsed().as_millis()
                );
                return Ok(());
            }
            Ok(false) => {}
            Err(source) => {
                return Err(PollError::Check {
                    what: what.to_string(),
                    source,
                });
            }
        }

        if start.elapsed() + interval > timeout {
            return Err(PollError::Timeout {
                what: what.to_string(),
                timeout_secs: timeout.as_secs(),
            });
        }

        sleep(interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_poll_succeeds_after_retries() {
        let attempts = AtomicU32::new(0);

        let result = tokio_test::block_on(poll_until(
            "counter to reach 3",
            Duration::from_secs(5),
            Duration::from_millis(1),
            || {
                let n = attempts.fetch_add(1, Ordering::SeqCst);
                async move { Ok(n >= 2) }
            },
        ));

        assert!(result.is_ok());
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_poll_times_out() {
        let result = tokio_test::block_on(poll_until(
            "the impossible",
            Duration::from_millis(20),
            Duration::from_millis(5),
            || async { Ok(false) },
        ));

        match result {
            Err(PollError::Timeout { what, .. }) => assert_eq!(what, "the impossible"),
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[test]
    fn test_poll_aborts_on_check_error() {
        let result = tokio_test::block_on(poll_until(
            "a failing check",
            Duration::from_secs(5),
            Duration::from_millis(1),
            || async { Err(anyhow::anyhow!("boom")) },
        ));

        assert!(matches!(result, Err(PollError::Check { .. })));
    }
}
