use crate::classifier::{Threshold, classify_statistic};
use crate::error::AnalyzerError;
use analytics::ScoredRow;
use chrono::NaiveDate;
use core_types::{Direction, MetricDefinition, OutlierDirection, StatisticKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One (entity, date, metric) cell of a scored table in long format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LongRow {
    pub entity_id: String,
    pub as_of_date: NaiveDate,
    pub segment: String,
    pub metric_name: String,
    pub metric_direction: Direction,
    pub raw_value: Option<f64>,
    pub statistic: Option<f64>,
    pub statistic_kind: StatisticKind,
    pub peer_center: Option<f64>,
    pub peer_spread: Option<f64>,
    pub population: Option<usize>,
    pub is_outlier: bool,
    pub outlier_direction: Option<OutlierDirection>,
}

/// Pivots scored rows into one row per (input row, metric), in input order
/// and then metric order.
pub fn melt(
    rows: &[ScoredRow],
    metrics: &[MetricDefinition],
    threshold: Threshold,
) -> Result<Vec<LongRow>, AnalyzerError> {
    let mut long = Vec::with_capacity(rows.len() * metrics.len());
    for row in rows {
        for metric in metrics {
            let statistic = row
                .statistic(metric.name)
                .ok_or_else(|| AnalyzerError::UnknownMetric(metric.name.to_string()))?;
            let classification = classify_statistic(statistic, metric.direction, threshold)?;
            long.push(LongRow {
                entity_id: row.entity_id().to_string(),
                as_of_date: row.as_of_date(),
                segment: row.segment().to_string(),
                metric_name: metric.name.to_string(),
                metric_direction: metric.direction,
                raw_value: row.observation.value(metric.name),
                statistic: statistic.score(),
                statistic_kind: statistic.kind(),
                peer_center: statistic.peer_center(),
                peer_spread: statistic.peer_spread(),
                population: statistic.population(),
                is_outlier: classification.is_outlier,
                outlier_direction: classification.direction,
            });
        }
    }
    Ok(long)
}

/// Post-filter for long-format rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlierFilter {
    pub outlier_only: bool,
    pub direction: Option<OutlierDirection>,
    pub entities: Option<BTreeSet<String>>,
}

impl Default for OutlierFilter {
    fn default() -> Self {
        Self {
            outlier_only: true,
            direction: None,
            entities: None,
        }
    }
}

impl OutlierFilter {
    /// Parses the direction filter, failing on anything but `favorable`/`unfavorable`.
    pub fn new(outlier_only: bool, direction: Option<&str>) -> Result<Self, AnalyzerError> {
        let direction = direction.map(str::parse::<OutlierDirection>).transpose()?;
        Ok(Self {
            outlier_only,
            direction,
            entities: None,
        })
    }

    /// Keeps every row.
    pub fn all() -> Self {
        Self {
            outlier_only: false,
            ..Self::default()
        }
    }

    pub fn with_entities<I, S>(mut self, entities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entities = Some(entities.into_iter().map(Into::into).collect());
        self
    }

    pub fn matches(&self, row: &LongRow) -> bool {
        if self.outlier_only && !row.is_outlier {
            return false;
        }
        if self.direction.is_some_and(|d| row.outlier_direction != Some(d)) {
            return false;
        }
        self.entities
            .as_ref()
            .is_none_or(|entities| entities.contains(&row.entity_id))
    }

    pub fn apply(&self, rows: Vec<LongRow>) -> Vec<LongRow> {
        rows.into_iter().filter(|r| self.matches(r)).collect()
    }
}
