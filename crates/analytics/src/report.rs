use chrono::NaiveDate;
use core_types::{ObservationRow, ObservationTable, Observed, StatisticKind};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Column suffix carrying the sub-population size.
pub const POPULATION_SUFFIX: &str = "population";

/// Peer statistics for one (entity, as-of date, metric).
///
/// Every field is `None` when the peer data cannot support it: a
/// sub-population of one has no spread, a zero spread has no score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum WindowedStatistic {
    ZScore {
        mean: Option<f64>,
        std: Option<f64>,
        zscore: Option<f64>,
        population: Option<usize>,
    },
    Percentile {
        percentile: Option<f64>,
        population: Option<usize>,
        // Peer distribution summary, for reporting.
        median: Option<f64>,
        p10: Option<f64>,
        p90: Option<f64>,
    },
    Mad {
        median: Option<f64>,
        mad: Option<f64>,
        mad_score: Option<f64>,
        population: Option<usize>,
    },
}

impl WindowedStatistic {
    /// An all-null statistic of the given kind.
    pub fn empty(kind: StatisticKind) -> Self {
        match kind {
            StatisticKind::ZScore => WindowedStatistic::ZScore {
                mean: None,
                std: None,
                zscore: None,
                population: None,
            },
            StatisticKind::Percentile => WindowedStatistic::Percentile {
                percentile: None,
                population: None,
                median: None,
                p10: None,
                p90: None,
            },
            StatisticKind::Mad => WindowedStatistic::Mad {
                median: None,
                mad: None,
                mad_score: None,
                population: None,
            },
        }
    }

    pub fn kind(&self) -> StatisticKind {
        match self {
            WindowedStatistic::ZScore { .. } => StatisticKind::ZScore,
            WindowedStatistic::Percentile { .. } => StatisticKind::Percentile,
            WindowedStatistic::Mad { .. } => StatisticKind::Mad,
        }
    }

    /// The per-row score the classifier reads: z-score, percentile or MAD score.
    pub fn score(&self) -> Option<f64> {
        let score = match self {
            WindowedStatistic::ZScore { zscore, .. } => *zscore,
            WindowedStatistic::Percentile { percentile, .. } => *percentile,
            WindowedStatistic::Mad { mad_score, .. } => *mad_score,
        };
        score.filter(|s| s.is_finite())
    }

    pub fn population(&self) -> Option<usize> {
        match self {
            WindowedStatistic::ZScore { population, .. }
            | WindowedStatistic::Percentile { population, .. }
            | WindowedStatistic::Mad { population, .. } => *population,
        }
    }

    /// Location of the peer distribution (mean or median).
    pub fn peer_center(&self) -> Option<f64> {
        match self {
            WindowedStatistic::ZScore { mean, .. } => *mean,
            WindowedStatistic::Percentile { median, .. } | WindowedStatistic::Mad { median, .. } => {
                *median
            }
        }
    }

    /// Dispersion of the peer distribution (std or MAD); percentiles carry none.
    pub fn peer_spread(&self) -> Option<f64> {
        match self {
            WindowedStatistic::ZScore { std, .. } => *std,
            WindowedStatistic::Percentile { .. } => None,
            WindowedStatistic::Mad { mad, .. } => *mad,
        }
    }

    /// Column suffixes written for a statistic kind, in output order.
    pub fn suffixes(kind: StatisticKind) -> &'static [&'static str] {
        match kind {
            StatisticKind::ZScore => &["mean", "std", "zscore", POPULATION_SUFFIX],
            StatisticKind::Percentile => &["percentile", POPULATION_SUFFIX, "median", "p10", "p90"],
            StatisticKind::Mad => &["median", "mad", "mad_score", POPULATION_SUFFIX],
        }
    }

    /// Value of the field serialized under `suffix`, `None` if null or not part of this kind.
    pub fn field(&self, suffix: &str) -> Option<f64> {
        let as_f64 = |n: &Option<usize>| n.map(|n| n as f64);
        match (self, suffix) {
            (WindowedStatistic::ZScore { mean, .. }, "mean") => *mean,
            (WindowedStatistic::ZScore { std, .. }, "std") => *std,
            (WindowedStatistic::ZScore { zscore, .. }, "zscore") => *zscore,
            (WindowedStatistic::Percentile { percentile, .. }, "percentile") => *percentile,
            (WindowedStatistic::Percentile { median, .. }, "median") => *median,
            (WindowedStatistic::Percentile { p10, .. }, "p10") => *p10,
            (WindowedStatistic::Percentile { p90, .. }, "p90") => *p90,
            (WindowedStatistic::Mad { median, .. }, "median") => *median,
            (WindowedStatistic::Mad { mad, .. }, "mad") => *mad,
            (WindowedStatistic::Mad { mad_score, .. }, "mad_score") => *mad_score,
            (stat, POPULATION_SUFFIX) => as_f64(&stat.population()),
            _ => None,
        }
    }

    /// Rebuilds a statistic from serialized `{metric}_{suffix}` cells.
    pub fn from_fields(kind: StatisticKind, field: impl Fn(&str) -> Option<f64>) -> Self {
        let population = field(POPULATION_SUFFIX).map(|n| n.round() as usize);
        match kind {
            StatisticKind::ZScore => WindowedStatistic::ZScore {
                mean: field("mean"),
                std: field("std"),
                zscore: field("zscore"),
                population,
            },
            StatisticKind::Percentile => WindowedStatistic::Percentile {
                percentile: field("percentile"),
                population,
                median: field("median"),
                p10: field("p10"),
                p90: field("p90"),
            },
            StatisticKind::Mad => WindowedStatistic::Mad {
                median: field("median"),
                mad: field("mad"),
                mad_score: field("mad_score"),
                population,
            },
        }
    }
}

/// An input row plus the statistics computed for it, keyed by metric name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredRow {
    pub observation: ObservationRow,
    pub statistics: BTreeMap<String, WindowedStatistic>,
}

impl ScoredRow {
    pub fn new(observation: ObservationRow) -> Self {
        Self {
            observation,
            statistics: BTreeMap::new(),
        }
    }

    pub fn entity_id(&self) -> &str {
        &self.observation.entity_id
    }

    pub fn as_of_date(&self) -> NaiveDate {
        self.observation.as_of_date
    }

    pub fn segment(&self) -> &str {
        &self.observation.segment
    }

    pub fn statistic(&self, metric: &str) -> Option<&WindowedStatistic> {
        self.statistics.get(metric)
    }

    pub fn score(&self, metric: &str) -> Option<f64> {
        self.statistic(metric).and_then(WindowedStatistic::score)
    }
}

impl Observed for ScoredRow {
    fn observation(&self) -> &ObservationRow {
        &self.observation
    }
}

/// The engine's output: every input row, in input order, with its statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredTable {
    pub kind: StatisticKind,
    pub window_days: i64,
    /// Metrics that were scored, in request order.
    pub metrics: Vec<String>,
    /// Every metric column of the source table, scored or not.
    pub metric_columns: BTreeSet<String>,
    pub rows: Vec<ScoredRow>,
}

impl ScoredTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn is_scored(&self, metric: &str) -> bool {
        self.metrics.iter().any(|m| m == metric)
    }

    /// Drops every derived statistic and returns the source table.
    pub fn into_observations(self) -> ObservationTable {
        ObservationTable {
            rows: self.rows.into_iter().map(|r| r.observation).collect(),
            metric_columns: self.metric_columns,
        }
    }
}
