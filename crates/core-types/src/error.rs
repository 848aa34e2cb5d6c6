use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Invalid metric direction '{0}': expected 'lower' or 'higher'")]
    InvalidDirection(String),

    #[error("Invalid outlier direction '{0}': expected 'favorable' or 'unfavorable'")]
    InvalidOutlierDirection(String),

    #[error("Invalid statistic kind '{0}': expected 'zscore', 'percentile' or 'mad'")]
    InvalidStatisticKind(String),

    #[error("Invalid sort key '{0}'")]
    InvalidSortKey(String),
}
