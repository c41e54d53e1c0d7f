use thiserror::Error;

/// Errors from constructing the scraper.
///
/// Running a job never returns an error; retrieval and parse failures degrade
/// to missing records or fields.
#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },
}

/// Outcome of a single failed fetch attempt.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network or transport failure: timeout, connection error, body read.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server error {status} from {url}")]
    ServerError { status: u16, url: String },

    #[error("client error {status} from {url}")]
    ClientError { status: u16, url: String },
}

impl FetchError {
    /// Returns `true` if the failure is transient and worth another attempt.
    ///
    /// Retriable: transport failures and 5xx responses.
    /// Not retriable: 4xx responses and malformed request URLs, since
    /// repeating the request returns the same answer.
    #[must_use]
    pub fn is_retriable(&self) -> bool {
        match self {
            FetchError::Http(e) => !e.is_builder(),
            FetchError::ServerError { .. } => true,
            FetchError::ClientError { .. } => false,
        }
    }
}
