use crate::error::ConfigError;
use core_types::StatisticKind;
use serde::Deserialize;
use std::path::PathBuf;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub data: DataPaths,
    pub scoring: ScoringDefaults,
    pub logging: LoggingSettings,
}

/// Where snapshot partitions and results live on disk.
///
/// The raw snapshot directories are relative to `root`; `results` and
/// `verdicts` are resolved on their own.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DataPaths {
    pub root: PathBuf,
    pub sf1: PathBuf,
    pub tickers: PathBuf,
    pub results: PathBuf,
    /// Optional analyst notes, `ticker,comment,date`.
    pub verdicts: PathBuf,
}

impl Default for DataPaths {
    fn default() -> Self {
        Self {
            root: PathBuf::from("data"),
            sf1: PathBuf::from("raw/sf1"),
            tickers: PathBuf::from("raw/tickers"),
            results: PathBuf::from("results"),
            verdicts: PathBuf::from("verdicts.csv"),
        }
    }
}

impl DataPaths {
    /// Paths rooted at `root` with the default sub-layout.
    pub fn rooted(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    pub fn sf1_dir(&self) -> PathBuf {
        self.root.join(&self.sf1)
    }

    pub fn tickers_dir(&self) -> PathBuf {
        self.root.join(&self.tickers)
    }
}

/// Defaults for every scoring run; command-line flags take precedence.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScoringDefaults {
    pub window_days: i64,
    pub sigma_threshold: f64,
    pub percentile_threshold: f64,
    pub segment_column: String,
    pub date_column: String,
    pub entity_column: String,
    /// Drop filings published more than this many days after the fiscal period end.
    pub max_data_delay_days: Option<i64>,
    /// Extra history loaded before the first window so early dates have peers.
    pub lookback_padding_days: i64,
}

impl Default for ScoringDefaults {
    fn default() -> Self {
        Self {
            window_days: 180,
            sigma_threshold: 2.0,
            percentile_threshold: 90.0,
            segment_column: "segment".to_string(),
            date_column: "datekey".to_string(),
            entity_column: "ticker".to_string(),
            max_data_delay_days: None,
            lookback_padding_days: 365,
        }
    }
}

impl ScoringDefaults {
    /// Builds the per-run configuration, picking the threshold that matches `kind`.
    pub fn score_configuration(&self, kind: StatisticKind) -> ScoreConfiguration {
        let threshold = match kind {
            StatisticKind::Percentile => self.percentile_threshold,
            StatisticKind::ZScore | StatisticKind::Mad => self.sigma_threshold,
        };
        ScoreConfiguration {
            window_days: self.window_days,
            segment_column: self.segment_column.clone(),
            date_column: self.date_column.clone(),
            threshold,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Filter used when `RUST_LOG` is not set.
    pub level: String,
    /// When set, logs are also written to a daily rolling file here.
    pub directory: Option<PathBuf>,
    pub file_prefix: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
            file_prefix: "peerscope.log".to_string(),
        }
    }
}

/// Per-call scoring parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScoreConfiguration {
    pub window_days: i64,
    pub segment_column: String,
    pub date_column: String,
    /// Sigma multiple for z/MAD scores, percentile cut for percentile scores.
    pub threshold: f64,
}

impl Default for ScoreConfiguration {
    fn default() -> Self {
        ScoringDefaults::default().score_configuration(StatisticKind::Percentile)
    }
}

impl ScoreConfiguration {
    pub fn with_window_days(mut self, window_days: i64) -> Self {
        self.window_days = window_days;
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Checks the fields that are independent of the statistic kind.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_days < 0 {
            return Err(ConfigError::ValidationError(format!(
                "window_days must be non-negative, got {}",
                self.window_days
            )));
        }
        if self.segment_column.is_empty() || self.date_column.is_empty() {
            return Err(ConfigError::ValidationError(
                "segment and date column names must not be empty".to_string(),
            ));
        }
        if !self.threshold.is_finite() {
            return Err(ConfigError::ValidationError(format!(
                "threshold must be finite, got {}",
                self.threshold
            )));
        }
        Ok(())
    }

    /// Full validation, including the threshold range for `kind`.
    pub fn validate_for(&self, kind: StatisticKind) -> Result<(), ConfigError> {
        self.validate()?;
        match kind {
            StatisticKind::Percentile => validate_percentile_threshold(self.threshold),
            StatisticKind::ZScore | StatisticKind::Mad => validate_sigma_threshold(self.threshold),
        }
    }
}

/// A sigma threshold must be a finite, non-negative multiple.
pub fn validate_sigma_threshold(sigma: f64) -> Result<(), ConfigError> {
    if !sigma.is_finite() || sigma < 0.0 {
        return Err(ConfigError::ValidationError(format!(
            "sigma threshold must be a non-negative number, got {sigma}"
        )));
    }
    Ok(())
}

/// A percentile threshold `t` flags the top and bottom `100 - t` percent, so it must lie in (50, 100].
pub fn validate_percentile_threshold(threshold: f64) -> Result<(), ConfigError> {
    if !threshold.is_finite() || threshold <= 50.0 || threshold > 100.0 {
        return Err(ConfigError::ValidationError(format!(
            "percentile threshold must be in (50, 100], got {threshold}"
        )));
    }
    Ok(())
}
