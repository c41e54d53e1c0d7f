use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::ConfigError;

pub const DEFAULT_MAX_RESULTS: usize = 100;

/// One unit of scraping work.
///
/// A job may search (`query` + `city`), fetch direct `urls`, or both. A job
/// with neither is valid and simply produces no records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Job {
    pub query: Option<String>,
    pub city: Option<String>,
    #[serde(deserialize_with = "null_as_empty")]
    pub urls: Vec<String>,
    /// Accept search cards as-is instead of fetching each detail page.
    pub fast_mode: bool,
    /// Drop search cards whose name does not contain `query` (case-insensitive).
    pub exact_match: bool,
    /// Maximum number of accepted search results for this job. Negative
    /// values are read as 0.
    #[serde(deserialize_with = "clamp_non_negative")]
    pub max_results: usize,
}

impl Default for Job {
    fn default() -> Self {
        Self {
            query: None,
            city: None,
            urls: Vec::new(),
            fast_mode: false,
            exact_match: false,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }
}

impl Job {
    /// Returns the trimmed `(query, city)` pair when both are non-blank.
    #[must_use]
    pub fn search_terms(&self) -> Option<(&str, &str)> {
        let query = self.query.as_deref().map(str::trim).filter(|q| !q.is_empty())?;
        let city = self.city.as_deref().map(str::trim).filter(|c| !c.is_empty())?;
        Some((query, city))
    }

    /// `true` when the job can produce no records at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.search_terms().is_none() && self.urls.is_empty()
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

fn clamp_non_negative<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    let value = i64::deserialize(deserializer)?;
    Ok(usize::try_from(value.max(0)).unwrap_or(usize::MAX))
}

/// Load and validate job descriptors from a JSON file, or YAML when the
/// extension is `.yaml`/`.yml`.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, is not valid JSON/YAML,
/// or is not an array of job objects.
pub fn load_jobs(path: &Path) -> Result<Vec<Job>, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

    let jobs = if is_yaml {
        parse_jobs_yaml(&content, path)?
    } else {
        parse_jobs_json(&content, path)?
    };

    warn_on_unproductive_jobs(&jobs);
    Ok(jobs)
}

fn parse_jobs_json(content: &str, path: &Path) -> Result<Vec<Job>, ConfigError> {
    let json_err = |source| ConfigError::JsonParse {
        path: path.display().to_string(),
        source,
    };
    let value: serde_json::Value = serde_json::from_str(content).map_err(json_err)?;
    if !value.is_array() {
        return Err(ConfigError::Validation(
            "jobs file must contain an array of job objects".to_string(),
        ));
    }
    serde_json::from_value(value).map_err(json_err)
}

fn parse_jobs_yaml(content: &str, path: &Path) -> Result<Vec<Job>, ConfigError> {
    let yaml_err = |source| ConfigError::YamlParse {
        path: path.display().to_string(),
        source,
    };
    let value: serde_yaml::Value = serde_yaml::from_str(content).map_err(yaml_err)?;
    if !value.is_sequence() {
        return Err(ConfigError::Validation(
            "jobs file must contain a sequence of job objects".to_string(),
        ));
    }
    serde_yaml::from_value(value).map_err(yaml_err)
}

fn warn_on_unproductive_jobs(jobs: &[Job]) {
    for (idx, job) in jobs.iter().enumerate() {
        let position = idx + 1;
        if job.max_results == 0 && job.search_terms().is_some() {
            tracing::warn!(
                job = position,
                "job has maxResults 0; its search will accept no results"
            );
        }
        if job.is_empty() {
            tracing::warn!(
                job = position,
                "job has neither query+city nor urls; it will produce no records"
            );
        }
    }
}

#[cfg(test)]
#[path = "jobs_test.rs"]
mod tests;
