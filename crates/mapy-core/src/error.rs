use thiserror::Error;

/// Errors raised while loading job descriptors.
///
/// Settings loading never fails: a missing or malformed settings file falls
/// back to defaults. Job files have no sensible default, so they surface
/// these errors to the caller.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    FileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    JsonParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid YAML in {path}: {source}")]
    YamlParse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("validation error: {0}")]
    Validation(String),
}
