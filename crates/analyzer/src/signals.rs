use crate::classifier::{Threshold, classify_statistic};
use crate::error::AnalyzerError;
use analytics::ScoredRow;
use core_types::{MetricDefinition, Observed, ObservationRow, OutlierDirection};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Outlier tallies for one row across a metric list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalCounts {
    pub favorable_count: usize,
    pub unfavorable_count: usize,
    /// Metrics with a usable statistic on this row.
    pub metrics_available: usize,
}

impl SignalCounts {
    pub fn total_signal_count(&self) -> usize {
        self.favorable_count + self.unfavorable_count
    }

    pub fn net_signal(&self) -> i64 {
        self.favorable_count as i64 - self.unfavorable_count as i64
    }
}

/// A scored row with its aggregate signal counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalRow {
    pub scored: ScoredRow,
    pub counts: SignalCounts,
}

impl Observed for SignalRow {
    fn observation(&self) -> &ObservationRow {
        &self.scored.observation
    }
}

/// Classifies every metric on every row and tallies the outliers.
///
/// Rows whose total signal count is below `min_total_signal_count` are
/// dropped. Every metric in `metrics` must have been scored.
pub fn count_signals(
    rows: &[ScoredRow],
    metrics: &[MetricDefinition],
    threshold: Threshold,
    min_total_signal_count: Option<usize>,
) -> Result<Vec<SignalRow>, AnalyzerError> {
    let mut counted = Vec::with_capacity(rows.len());

    for row in rows {
        let mut counts = SignalCounts::default();
        for metric in metrics {
            let statistic = row
                .statistic(metric.name)
                .ok_or_else(|| AnalyzerError::UnknownMetric(metric.name.to_string()))?;
            let classification = classify_statistic(statistic, metric.direction, threshold)?;

            if statistic.score().is_some() {
                counts.metrics_available += 1;
            }
            match classification.direction {
                Some(OutlierDirection::Favorable) => counts.favorable_count += 1,
                Some(OutlierDirection::Unfavorable) => counts.unfavorable_count += 1,
                None => {}
            }
        }

        if min_total_signal_count.is_some_and(|min| counts.total_signal_count() < min) {
            continue;
        }
        counted.push(SignalRow {
            scored: row.clone(),
            counts,
        });
    }

    debug!(rows = rows.len(), kept = counted.len(), "Counted outlier signals");
    Ok(counted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use analytics::ScoringEngine;
    use chrono::NaiveDate;
    use configuration::ScoreConfiguration;
    use core_types::{Direction, METRIC_CATALOG, ObservationTable, StatisticKind, find_metric};

    fn create_test_rows(kind: StatisticKind) -> Vec<ScoredRow> {
        let on = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        let table = ObservationTable::new(vec![
            ObservationRow::new("AAA", on, "Tech").with_value("pe_ratio", 10.0),
            ObservationRow::new("BBB", on, "Tech").with_value("pe_ratio", 15.0),
            ObservationRow::new("CCC", on, "Tech").with_value("pe_ratio", 100.0),
        ]);
        ScoringEngine::new(ScoreConfiguration::default().with_window_days(180), kind)
            .unwrap()
            .score(&table, &["pe_ratio"])
            .unwrap()
            .rows
    }

    #[test]
    fn test_scenario_flags_only_the_expensive_entity() {
        let rows = create_test_rows(StatisticKind::ZScore);
        let pe = *find_metric("pe_ratio").unwrap();
        let counted = count_signals(&rows, &[pe], Threshold::sigma(1.0).unwrap(), None).unwrap();

        let unfavorable: usize = counted.iter().map(|r| r.counts.unfavorable_count).sum();
        let favorable: usize = counted.iter().map(|r| r.counts.favorable_count).sum();
        assert_eq!(unfavorable, 1);
        assert_eq!(favorable, 0);
        assert!(counted.iter().all(|r| r.counts.metrics_available == 1));

        let flagged = counted.iter().find(|r| r.counts.unfavorable_count == 1).unwrap();
        assert_eq!(flagged.scored.entity_id(), "CCC");
        assert_eq!(flagged.counts.net_signal(), -1);
        assert_eq!(flagged.counts.total_signal_count(), 1);
    }

    #[test]
    fn test_min_total_signal_count_filters_rows() {
        let rows = create_test_rows(StatisticKind::ZScore);
        let pe = *find_metric("pe_ratio").unwrap();
        let counted = count_signals(&rows, &[pe], Threshold::Sigma(1.0), Some(1)).unwrap();
        assert_eq!(counted.len(), 1);
    }

    #[test]
    fn test_unscored_catalog_metric_is_rejected() {
        let rows = create_test_rows(StatisticKind::Percentile);
        let result = count_signals(&rows, &METRIC_CATALOG, Threshold::Percentile(90.0), None);
        assert!(matches!(result, Err(AnalyzerError::UnknownMetric(m)) if m == "pb_ratio"));
    }

    #[test]
    fn test_mismatched_threshold_is_rejected() {
        let rows = create_test_rows(StatisticKind::Percentile);
        let pe = *find_metric("pe_ratio").unwrap();
        assert!(matches!(
            count_signals(&rows, &[pe], Threshold::Sigma(2.0), None),
            Err(AnalyzerError::ThresholdMismatch { .. })
        ));
    }

    #[test]
    fn test_higher_is_better_metric_counts_favorable() {
        let rows = create_test_rows(StatisticKind::ZScore);
        let flipped = MetricDefinition {
            direction: Direction::Higher,
            ..*find_metric("pe_ratio").unwrap()
        };
        let counted = count_signals(&rows, &[flipped], Threshold::Sigma(1.0), Some(1)).unwrap();
        assert_eq!(counted[0].counts.favorable_count, 1);
        assert_eq!(counted[0].counts.net_signal(), 1);
    }
}
