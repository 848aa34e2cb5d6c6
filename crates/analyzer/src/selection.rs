use crate::classifier::Threshold;
use crate::error::AnalyzerError;
use crate::melt::{LongRow, melt};
use crate::signals::{SignalRow, count_signals};
use analytics::ScoredRow;
use core_types::{
    Direction, METRIC_CATALOG, MetricDefinition, Observed, OutlierDirection, SignalSortKey,
    find_metric,
};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::info;

/// Keeps the most recent row of each entity, ordered by entity id.
///
/// When an entity has several rows on its latest date, the last one in input
/// order wins.
pub fn latest_per_entity<R: Observed + Clone>(rows: &[R]) -> Vec<R> {
    let mut latest: BTreeMap<&str, &R> = BTreeMap::new();
    for row in rows {
        let observation = row.observation();
        let id = observation.entity_id.as_str();
        let is_newer = latest
            .get(id)
            .is_none_or(|current| current.observation().as_of_date <= observation.as_of_date);
        if is_newer {
            latest.insert(id, row);
        }
    }
    latest.into_values().cloned().collect()
}

/// Ranked rows plus the number of entities that passed the filters before truncation.
#[derive(Debug, Clone)]
pub struct ScreenOutcome {
    pub matched: usize,
    pub rows: Vec<SignalRow>,
}

/// Parameters for ranking entities by how many outliers they show.
#[derive(Debug, Clone)]
pub struct SignalScreen {
    pub threshold: Threshold,
    pub metrics: Vec<MetricDefinition>,
    pub min_signals: usize,
    pub max_signals: Option<usize>,
    pub sort_by: SignalSortKey,
    pub ascending: bool,
    pub top_n: Option<usize>,
}

impl SignalScreen {
    /// A screen over the whole catalog with the command-line defaults.
    pub fn new(threshold: Threshold) -> Self {
        Self {
            threshold,
            metrics: METRIC_CATALOG.to_vec(),
            min_signals: 1,
            max_signals: None,
            sort_by: SignalSortKey::NetSignal,
            ascending: false,
            top_n: Some(20),
        }
    }

    /// Counts, filters, reduces to the latest row per entity, then ranks.
    pub fn run(&self, rows: &[ScoredRow]) -> Result<ScreenOutcome, AnalyzerError> {
        // 1. Count and apply the lower bound
        let counted = count_signals(rows, &self.metrics, self.threshold, Some(self.min_signals))?;

        // 2. Upper bound
        let bounded: Vec<SignalRow> = counted
            .into_iter()
            .filter(|r| self.max_signals.is_none_or(|max| r.counts.total_signal_count() <= max))
            .collect();

        // 3. Latest row per entity
        let mut ranked = latest_per_entity(&bounded);
        let matched = ranked.len();
        info!(entities = matched, "Entities within the signal range");

        // 4. Rank
        ranked.sort_by(|a, b| {
            let ordering = sort_value(a, self.sort_by).cmp(&sort_value(b, self.sort_by));
            let ordering = if self.ascending { ordering } else { ordering.reverse() };
            ordering.then_with(|| a.scored.entity_id().cmp(b.scored.entity_id()))
        });
        if let Some(n) = self.top_n {
            ranked.truncate(n);
        }
        Ok(ScreenOutcome { matched, rows: ranked })
    }
}

fn sort_value(row: &SignalRow, key: SignalSortKey) -> i64 {
    match key {
        SignalSortKey::NetSignal => row.counts.net_signal(),
        SignalSortKey::FavorableCount => row.counts.favorable_count as i64,
        SignalSortKey::UnfavorableCount => row.counts.unfavorable_count as i64,
        SignalSortKey::TotalSignalCount => row.counts.total_signal_count() as i64,
    }
}

/// Finds entities flagged in `direction` on one catalog metric, most extreme first.
///
/// If fewer than `min_entities` are flagged, falls back to the `min_entities`
/// rows that have a statistic, ordered toward the requested side.
pub fn select_metric_outliers(
    rows: &[ScoredRow],
    metric_name: &str,
    direction: OutlierDirection,
    threshold: Threshold,
    min_entities: usize,
) -> Result<Vec<LongRow>, AnalyzerError> {
    let metric = find_metric(metric_name).ok_or_else(|| AnalyzerError::UnknownMetric(metric_name.to_string()))?;
    let long = melt(rows, &[*metric], threshold)?;
    let neutral = threshold.neutral_score();

    let mut flagged: Vec<LongRow> = long
        .iter()
        .filter(|r| r.outlier_direction == Some(direction))
        .cloned()
        .collect();
    flagged.sort_by(|a, b| {
        let extremity = |r: &LongRow| r.statistic.map_or(0.0, |s| (s - neutral).abs());
        extremity(b).total_cmp(&extremity(a))
    });

    if flagged.len() >= min_entities {
        return Ok(flagged);
    }

    info!(
        metric = metric_name,
        flagged = flagged.len(),
        min_entities,
        "Too few outliers, falling back to the closest candidates"
    );
    let ascending = matches!(
        (direction, metric.direction),
        (OutlierDirection::Favorable, Direction::Lower) | (OutlierDirection::Unfavorable, Direction::Higher)
    );
    let mut candidates: Vec<LongRow> = long.into_iter().filter(|r| r.statistic.is_some()).collect();
    candidates.sort_by(|a, b| {
        let ordering = a
            .statistic
            .zip(b.statistic)
            .map_or(Ordering::Equal, |(x, y)| x.total_cmp(&y));
        if ascending { ordering } else { ordering.reverse() }
    });
    candidates.truncate(min_entities);
    Ok(candidates)
}
