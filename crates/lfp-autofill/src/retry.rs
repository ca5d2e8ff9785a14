//! Retry with exponential backoff for completion calls.
//!
//! Retries only on transport errors (connection failures, timeouts). A
//! response with any status is returned to the caller immediately.

use std::time::Duration;

/// Base delay between retries; doubles each attempt.
const BASE_DELAY_MS: u64 = 100;

/// Upper bound on a single backoff delay.
const MAX_DELAY_MS: u64 = 30_000;

/// Delay before retry number `attempt + 1`.
fn backoff(attempt: u32) -> Duration {
    let ms = BASE_DELAY_MS.saturating_mul(2u64.saturating_pow(attempt));
    Duration::from_millis(ms.min(MAX_DELAY_MS))
}

/// Call `f` up to `max_retries + 1` times until it yields a response.
pub(crate) async fn retry_send<F, Fut>(max_retries: u32, f: F) -> Result<reqwest::Response, reqwest::Error>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<reqwest::Response, reqwest::Error>>,
{
    for attempt in 0..max_retries {
        match f().await {
            Ok(resp) => return Ok(resp),
            Err(e) => {
                let delay = backoff(attempt);
                tracing::warn!(
                    attempt = attempt + 1,
                    max_retries,
                    "completion request failed, retrying in {delay:?}: {e}"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
    f().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    async fn closed_port() -> Result<reqwest::Response, reqwest::Error> {
        reqwest::Client::builder()
            .timeout(Duration::from_millis(50))
            .build()
            .unwrap()
            .post("http://127.0.0.1:1/v1/autofill")
            .send()
            .await
    }

    #[test]
    fn backoff_doubles_then_saturates() {
        assert_eq!(backoff(0), Duration::from_millis(100));
        assert_eq!(backoff(3), Duration::from_millis(800));
        assert_eq!(backoff(58), Duration::from_millis(MAX_DELAY_MS));
        assert_eq!(backoff(u32::MAX), Duration::from_millis(MAX_DELAY_MS));
    }

    #[tokio::test]
    async fn retry_exhausts_all_attempts_on_transport_failure() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = calls.clone();

        let result = retry_send(2, || {
            let c = c.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                closed_port().await
            }
        })
        .await;

        assert!(result.is_err(), "request to closed port must fail");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn zero_retries_means_one_attempt() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = calls.clone();
        let _ = retry_send(0, || {
            let c = c.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                closed_port().await
            }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
