pub mod error;
pub mod jobs;
pub mod settings;

pub use error::ConfigError;
pub use jobs::{load_jobs, Job, DEFAULT_MAX_RESULTS};
pub use settings::{
    apply_env_overrides, load_settings, load_settings_with_env, settings_from_value,
    ScraperSettings,
};

/// Value of `source` on every record produced by this scraper.
pub const SOURCE_SITE: &str = "mapy.com";
