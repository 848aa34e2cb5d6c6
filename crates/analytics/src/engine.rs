use crate::error::AnalyticsError;
use crate::report::{ScoredRow, ScoredTable, WindowedStatistic};
use crate::window;
use configuration::ScoreConfiguration;
use core_types::{METRIC_CATALOG, ObservationTable, StatisticKind};
use rayon::prelude::*;
use std::collections::BTreeSet;
use tracing::{debug, info};

/// A stateless calculator for trailing-window peer statistics.
///
/// Every row is compared only against rows of the same segment dated within
/// `window_days` on or before its own date, so no statistic can see data that
/// was published later.
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    config: ScoreConfiguration,
    kind: StatisticKind,
    positive_only: BTreeSet<String>,
}

impl ScoringEngine {
    /// Creates an engine after validating the window configuration.
    pub fn new(config: ScoreConfiguration, kind: StatisticKind) -> Result<Self, AnalyticsError> {
        config.validate()?;
        Ok(Self {
            config,
            kind,
            positive_only: BTreeSet::new(),
        })
    }

    /// An engine that treats every catalog metric as positive-only.
    pub fn for_catalog(config: ScoreConfiguration, kind: StatisticKind) -> Result<Self, AnalyticsError> {
        Ok(Self::new(config, kind)?.with_positive_only(METRIC_CATALOG.iter().map(|m| m.name)))
    }

    /// Restricts the given metrics to strictly positive values.
    pub fn with_positive_only<I, S>(mut self, metrics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.positive_only.extend(metrics.into_iter().map(Into::into));
        self
    }

    pub fn kind(&self) -> StatisticKind {
        self.kind
    }

    pub fn config(&self) -> &ScoreConfiguration {
        &self.config
    }

    /// The main entry point: scores `metrics` for every row of `table`.
    ///
    /// # Arguments
    ///
    /// * `table` - The observations; it is not modified.
    /// * `metrics` - Metric columns to score. Duplicates are ignored.
    ///
    /// # Returns
    ///
    /// A `ScoredTable` with the input rows in input order, or an
    /// `AnalyticsError` if a metric is unknown or none was requested.
    pub fn score(&self, table: &ObservationTable, metrics: &[&str]) -> Result<ScoredTable, AnalyticsError> {
        let metrics = self.resolve_metrics(table, metrics)?;
        info!(
            kind = %self.kind,
            window_days = self.config.window_days,
            rows = table.len(),
            metrics = metrics.len(),
            "Scoring observation table"
        );

        // Metrics are independent; collect() keeps request order.
        let columns: Vec<Vec<WindowedStatistic>> = metrics
            .par_iter()
            .map(|metric| {
                let stats = window::score_metric(
                    &table.rows,
                    metric,
                    self.kind,
                    self.config.window_days,
                    self.positive_only.contains(metric),
                );
                debug!(metric = %metric, scored = stats.iter().filter(|s| s.score().is_some()).count(), "Metric scored");
                stats
            })
            .collect();

        let mut rows: Vec<ScoredRow> = table.rows.iter().cloned().map(ScoredRow::new).collect();
        for (metric, column) in metrics.iter().zip(columns) {
            for (row, stat) in rows.iter_mut().zip(column) {
                row.statistics.insert(metric.clone(), stat);
            }
        }

        Ok(ScoredTable {
            kind: self.kind,
            window_days: self.config.window_days,
            metrics,
            metric_columns: table.metric_columns.clone(),
            rows,
        })
    }

    /// Re-scores a previously scored table from its raw values only.
    pub fn rescore(&self, scored: ScoredTable, metrics: &[&str]) -> Result<ScoredTable, AnalyticsError> {
        self.score(&scored.into_observations(), metrics)
    }

    fn resolve_metrics(&self, table: &ObservationTable, metrics: &[&str]) -> Result<Vec<String>, AnalyticsError> {
        if metrics.is_empty() {
            return Err(AnalyticsError::EmptyMetricList);
        }
        let mut resolved: Vec<String> = Vec::with_capacity(metrics.len());
        for metric in metrics {
            if !table.has_metric(metric) {
                return Err(AnalyticsError::UnknownMetric(metric.to_string()));
            }
            if !resolved.iter().any(|m| m == metric) {
                resolved.push(metric.to_string());
            }
        }
        Ok(resolved)
    }
}
