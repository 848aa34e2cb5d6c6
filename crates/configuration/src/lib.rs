//! # Peerscope Configuration Crate
//!
//! Loads run settings from an optional `peerscope.toml` plus `PEERSCOPE__*`
//! environment overrides, and owns the tracing setup shared by every binary.
use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::init_tracing;
pub use settings::{
    DataPaths, LoggingSettings, ScoreConfiguration, ScoringDefaults, Settings,
    validate_percentile_threshold, validate_sigma_threshold,
};

const CONFIG_FILE_STEM: &str = "peerscope";
const ENV_PREFIX: &str = "PEERSCOPE";

/// Loads the application configuration.
///
/// Reads `peerscope.toml` from the working directory if present, then applies
/// environment overrides such as `PEERSCOPE__SCORING__WINDOW_DAYS=90`. Every
/// field has a default, so an empty environment yields `Settings::default()`.
pub fn load_config() -> Result<Settings, ConfigError> {
    build(config::File::with_name(CONFIG_FILE_STEM).required(false))
}

/// Like [`load_config`], but the given file must exist.
pub fn load_config_from(path: &Path) -> Result<Settings, ConfigError> {
    build(config::File::from(path).required(true))
}

fn build<S>(file: S) -> Result<Settings, ConfigError>
where
    S: config::Source + Send + Sync + 'static,
{
    let builder = config::Config::builder()
        .add_source(file)
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let settings = builder.try_deserialize::<Settings>()?;
    settings
        .scoring
        .score_configuration(core_types::StatisticKind::Percentile)
        .validate()?;

    Ok(settings)
}
