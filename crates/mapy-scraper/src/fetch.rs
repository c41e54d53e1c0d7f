//! Retrieval layer: GET a page as text with bounded retries.

use std::time::Duration;

use mapy_core::ScraperSettings;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE};
use reqwest::Client;

use crate::error::{FetchError, ScraperError};
use crate::retry::retry_fixed_delay;

/// HTTP client shared by every fetch in a run.
///
/// Owns the connection pool, default headers, and the retry policy. Build it
/// once and pass it by reference; it is safe to use from concurrent fetches.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
    /// Total attempts per URL, including the first.
    max_retries: u32,
    /// Fixed pause between attempts.
    sleep_between_requests_ms: u64,
}

impl PageFetcher {
    /// Creates a `PageFetcher` with the configured timeout, `User-Agent`, and
    /// retry policy.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed (e.g. the user agent is not a valid header value).
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        sleep_between_requests_ms: u64,
    ) -> Result<Self, ScraperError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs.min(10)))
            .user_agent(user_agent)
            .default_headers(headers)
            .build()?;
        Ok(Self {
            client,
            max_retries,
            sleep_between_requests_ms,
        })
    }

    /// # Errors
    ///
    /// See [`PageFetcher::new`].
    pub fn from_settings(settings: &ScraperSettings) -> Result<Self, ScraperError> {
        Self::new(
            settings.timeout_seconds,
            &settings.user_agent,
            settings.max_retries,
            settings.sleep_between_requests_ms,
        )
    }

    /// Fetches `url` and returns the body text, or `None` once every attempt
    /// has failed.
    ///
    /// - Status below 400: success.
    /// - 5xx and transport failures: retried after the fixed delay, up to
    ///   `max_retries` attempts in total.
    /// - Other 4xx and above: given up immediately.
    ///
    /// Never returns an error; failures are logged as warnings.
    pub async fn fetch_with_retries(&self, url: &str) -> Option<String> {
        let result = retry_fixed_delay(self.max_retries, self.sleep_between_requests_ms, |attempt| {
            self.fetch_page(url, attempt)
        })
        .await;

        match result {
            Ok(body) => Some(body),
            Err(err) => {
                tracing::warn!(url, error = %err, "giving up on URL");
                None
            }
        }
    }

    /// Performs one GET and classifies the outcome.
    async fn fetch_page(&self, url: &str, attempt: u32) -> Result<String, FetchError> {
        tracing::debug!(url, attempt, max_attempts = self.max_retries.max(1), "fetching");

        let response = self.client.get(url).send().await?;
        let status = response.status();

        if status.is_server_error() {
            return Err(FetchError::ServerError {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }
        if status.as_u16() >= 400 {
            return Err(FetchError::ClientError {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }

        Ok(response.text().await?)
    }
}
