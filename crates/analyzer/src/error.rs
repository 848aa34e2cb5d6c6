use configuration::error::ConfigError;
use core_types::{CoreError, StatisticKind};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("Unknown metric '{0}': not in the catalog or not scored")]
    UnknownMetric(String),

    #[error("A {threshold} threshold cannot classify {statistic} statistics")]
    ThresholdMismatch {
        threshold: &'static str,
        statistic: StatisticKind,
    },

    #[error("Invalid threshold: {0}")]
    InvalidThreshold(#[from] ConfigError),

    #[error(transparent)]
    InvalidInput(#[from] CoreError),
}
