//! Fixed-delay retry for page fetches.
//!
//! Transient failures (transport errors, 5xx) are retried after a constant
//! pause. Permanent failures (4xx) are returned immediately.

use std::future::Future;
use std::time::Duration;

use crate::error::FetchError;

/// Executes `operation` up to `max_attempts` times in total.
///
/// On a retriable error the function sleeps `delay_ms` milliseconds and tries
/// again. No sleep happens before the first attempt or after the last one.
/// Non-retriable errors are returned immediately without sleeping.
///
/// `max_attempts` of `0` is treated as `1`: every operation runs at least once.
pub(crate) async fn retry_fixed_delay<T, F, Fut>(
    max_attempts: u32,
    delay_ms: u64,
    mut operation: F,
) -> Result<T, FetchError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 1u32;

    loop {
        match operation(attempt).await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !err.is_retriable() || attempt >= max_attempts {
                    return Err(err);
                }
                tracing::warn!(
                    attempt,
                    max_attempts,
                    delay_ms,
                    error = %err,
                    "transient fetch error; retrying after delay"
                );
            }
        }

        if delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        }
        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn server_error() -> FetchError {
        FetchError::ServerError {
            status: 503,
            url: "https://mapy.com/search".to_owned(),
        }
    }

    #[tokio::test]
    async fn succeeds_immediately_on_first_try() {
        let call_count = Arc::new(AtomicU32::new(0));
        let cc = Arc::clone(&call_count);
        let result = retry_fixed_delay(3, 0, |_| {
            let cc = Arc::clone(&cc);
            async move {
                cc.fetch_add(1, Ordering::SeqCst);
                Ok::<u32, FetchError>(42)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(call_count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_server_error_then_succeeds() {
        let call_count = Arc::new(AtomicU32::new(0));
        let cc = Arc::clone(&call_count);
        let result = retry_fixed_delay(3, 0, |_| {
            let cc = Arc::clone(&cc);
            async move {
                let n = cc.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    Err(server_error())
                } else {
                    Ok::<u32, FetchError>(99)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 99);
        assert_eq!(call_count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let call_count = Arc::new(AtomicU32::new(0));
        let cc = Arc::clone(&call_count);
        let result = retry_fixed_delay(2, 0, |_| {
            let cc = Arc::clone(&cc);
            async move {
                cc.fetch_add(1, Ordering::SeqCst);
                Err::<u32, FetchError>(server_error())
            }
        })
        .await;
        // max_attempts counts the first try.
        assert_eq!(call_count.load(Ordering::SeqCst), 2);
        assert!(matches!(result, Err(FetchError::ServerError { status: 503, .. })));
    }

    #[tokio::test]
    async fn retries_connection_errors_until_exhausted() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/search", listener.local_addr().unwrap());
        drop(listener);

        let client = reqwest::Client::new();
        let call_count = Arc::new(AtomicU32::new(0));
        let cc = Arc::clone(&call_count);
        let result = retry_fixed_delay(3, 0, |_| {
            let cc = Arc::clone(&cc);
            let request = client.get(&url).send();
            async move {
                cc.fetch_add(1, Ordering::SeqCst);
                request.await.map_err(FetchError::Http)
            }
        })
        .await;

        assert_eq!(call_count.load(Ordering::SeqCst), 3);
        let err = result.unwrap_err();
        assert!(matches!(err, FetchError::Http(ref e) if e.is_connect()));
        assert!(err.is_retriable());
    }

    #[tokio::test]
    async fn does_not_retry_client_error() {
        let call_count = Arc::new(AtomicU32::new(0));
        let cc = Arc::clone(&call_count);
        let result = retry_fixed_delay(5, 0, |_| {
            let cc = Arc::clone(&cc);
            async move {
                cc.fetch_add(1, Ordering::SeqCst);
                Err::<u32, FetchError>(FetchError::ClientError {
                    status: 404,
                    url: "https://mapy.com/place/missing".to_owned(),
                })
            }
        })
        .await;
        assert_eq!(call_count.load(Ordering::SeqCst), 1);
        assert!(matches!(result, Err(FetchError::ClientError { status: 404, .. })));
    }

    #[tokio::test]
    async fn zero_attempts_still_runs_once() {
        let call_count = Arc::new(AtomicU32::new(0));
        let cc = Arc::clone(&call_count);
        let result = retry_fixed_delay(0, 0, |_| {
            let cc = Arc::clone(&cc);
            async move {
                cc.fetch_add(1, Ordering::SeqCst);
                Err::<u32, FetchError>(server_error())
            }
        })
        .await;
        assert_eq!(call_count.load(Ordering::SeqCst), 1);
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn passes_one_based_attempt_numbers() {
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let s = Arc::clone(&seen);
        let _ = retry_fixed_delay(3, 0, |attempt| {
            let s = Arc::clone(&s);
            async move {
                s.lock().unwrap().push(attempt);
                Err::<u32, FetchError>(server_error())
            }
        })
        .await;
        assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3]);
    }
}
