use configuration::error::ConfigError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("Unknown metric '{0}': the table has no such column")]
    UnknownMetric(String),

    #[error("At least one metric must be requested")]
    EmptyMetricList,

    #[error("Invalid scoring configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),
}
