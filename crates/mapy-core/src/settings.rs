//! Scraper settings: defaults, JSON settings file, and env-var overrides.
//!
//! Settings never fail to load. Every field falls back to its default on its
//! own when it is missing or cannot be interpreted, so one bad value does not
//! discard the rest of the file.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_BASE_URL: &str = "https://mapy.com";
pub const DEFAULT_USER_AGENT: &str = "MapyScraper/1.0 (+https://bitbash.dev)";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 15;
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_SLEEP_BETWEEN_REQUESTS_MS: u64 = 500;
pub const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 1;

/// Process-lifetime configuration for the retrieval client and orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScraperSettings {
    /// Site root used to build search URLs and resolve relative links.
    pub base_url: String,
    /// Per-request timeout, applied to every attempt.
    pub timeout_seconds: u64,
    pub user_agent: String,
    /// Total attempts per URL, including the first one.
    pub max_retries: u32,
    /// Fixed delay between retry attempts.
    pub sleep_between_requests_ms: u64,
    /// Upper bound on in-flight detail-page fetches within a job.
    /// `1` keeps fetching strictly sequential.
    pub max_concurrent_requests: usize,
}

impl Default for ScraperSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_retries: DEFAULT_MAX_RETRIES,
            sleep_between_requests_ms: DEFAULT_SLEEP_BETWEEN_REQUESTS_MS,
            max_concurrent_requests: DEFAULT_MAX_CONCURRENT_REQUESTS,
        }
    }
}

/// Load settings from a JSON file.
///
/// A missing file, unreadable file, or invalid JSON yields
/// [`ScraperSettings::default`] with a warning.
#[must_use]
pub fn load_settings(path: &Path) -> ScraperSettings {
    if !path.exists() {
        tracing::warn!(
            path = %path.display(),
            "settings file not found; falling back to defaults"
        );
        return ScraperSettings::default();
    }

    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to read settings file; falling back to defaults");
            return ScraperSettings::default();
        }
    };

    match serde_json::from_str::<Value>(&content) {
        Ok(value) => settings_from_value(&value),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to parse settings JSON; falling back to defaults");
            ScraperSettings::default()
        }
    }
}

/// Build settings from a parsed JSON document, field by field.
///
/// Non-object documents yield the defaults.
#[must_use]
pub fn settings_from_value(value: &Value) -> ScraperSettings {
    let defaults = ScraperSettings::default();
    let Some(obj) = value.as_object() else {
        tracing::warn!("settings document is not a JSON object; falling back to defaults");
        return defaults;
    };

    let string_field = |key: &str| {
        obj.get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };
    let u64_field = |key: &str| obj.get(key).and_then(value_as_u64);

    ScraperSettings {
        base_url: string_field("baseUrl").unwrap_or(defaults.base_url),
        timeout_seconds: u64_field("timeoutSeconds").unwrap_or(defaults.timeout_seconds),
        user_agent: string_field("userAgent").unwrap_or(defaults.user_agent),
        max_retries: u64_field("maxRetries")
            .and_then(|v| u32::try_from(v).ok())
            .unwrap_or(defaults.max_retries),
        sleep_between_requests_ms: u64_field("sleepBetweenRequestsMs")
            .unwrap_or(defaults.sleep_between_requests_ms),
        max_concurrent_requests: u64_field("maxConcurrentRequests")
            .and_then(|v| usize::try_from(v).ok())
            .filter(|v| *v > 0)
            .unwrap_or(defaults.max_concurrent_requests),
    }
}

/// Accepts non-negative integers and integer strings (`15`, `"15"`).
fn value_as_u64(value: &Value) -> Option<u64> {
    value
        .as_u64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse::<u64>().ok()))
}

/// Overlay `MAPY_*` environment variables on top of `settings`.
///
/// The lookup is injected so the parsing logic can be tested with a plain
/// map instead of mutating the process environment. Values that fail to
/// parse are ignored with a warning and the existing setting is kept.
#[must_use]
pub fn apply_env_overrides<F>(settings: ScraperSettings, lookup: F) -> ScraperSettings
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let string_var = |var: &str| {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let parsed_var = |var: &str| -> Option<u64> {
        let raw = string_var(var)?;
        match raw.parse::<u64>() {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!(var, value = %raw, error = %e, "ignoring unparsable env override");
                None
            }
        }
    };

    ScraperSettings {
        base_url: string_var("MAPY_BASE_URL").unwrap_or(settings.base_url),
        timeout_seconds: parsed_var("MAPY_TIMEOUT_SECONDS").unwrap_or(settings.timeout_seconds),
        user_agent: string_var("MAPY_USER_AGENT").unwrap_or(settings.user_agent),
        max_retries: parsed_var("MAPY_MAX_RETRIES")
            .and_then(|v| u32::try_from(v).ok())
            .unwrap_or(settings.max_retries),
        sleep_between_requests_ms: parsed_var("MAPY_SLEEP_BETWEEN_REQUESTS_MS")
            .unwrap_or(settings.sleep_between_requests_ms),
        max_concurrent_requests: parsed_var("MAPY_MAX_CONCURRENT_REQUESTS")
            .and_then(|v| usize::try_from(v).ok())
            .filter(|v| *v > 0)
            .unwrap_or(settings.max_concurrent_requests),
    }
}

/// Load settings from `path`, then apply overrides from the process environment.
#[must_use]
pub fn load_settings_with_env(path: &Path) -> ScraperSettings {
    apply_env_overrides(load_settings(path), |key| std::env::var(key))
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
