use crate::enums::OutlierDirection;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Segment label used when an entity has no peer-group information.
pub const UNKNOWN_SEGMENT: &str = "Unknown";

/// One entity's metric snapshot at the date it became knowable.
///
/// A metric missing from `values` is null. Non-finite values may be stored;
/// the scoring engine excludes them from every sub-population.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationRow {
    pub entity_id: String,
    pub as_of_date: NaiveDate,
    pub segment: String,
    pub values: BTreeMap<String, f64>,
}

impl ObservationRow {
    pub fn new(
        entity_id: impl Into<String>,
        as_of_date: NaiveDate,
        segment: impl Into<String>,
    ) -> Self {
        Self {
            entity_id: entity_id.into(),
            as_of_date,
            segment: segment.into(),
            values: BTreeMap::new(),
        }
    }

    pub fn with_value(mut self, metric: impl Into<String>, value: f64) -> Self {
        self.values.insert(metric.into(), value);
        self
    }

    /// Sets the metric when `value` is present and leaves it null otherwise.
    pub fn with_optional(mut self, metric: impl Into<String>, value: Option<f64>) -> Self {
        let metric = metric.into();
        match value {
            Some(v) => {
                self.values.insert(metric, v);
            }
            None => {
                self.values.remove(&metric);
            }
        }
        self
    }

    /// The raw metric value, `None` when null.
    pub fn value(&self, metric: &str) -> Option<f64> {
        self.values.get(metric).copied()
    }
}

/// A row-oriented table of observations plus the set of metric columns it carries.
///
/// `metric_columns` records columns that exist even when every row is null
/// for them, so "unknown metric" can be told apart from "all null".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObservationTable {
    pub rows: Vec<ObservationRow>,
    pub metric_columns: BTreeSet<String>,
}

impl ObservationTable {
    /// Builds a table whose metric columns are the union of every row's keys.
    pub fn new(rows: Vec<ObservationRow>) -> Self {
        let metric_columns = rows
            .iter()
            .flat_map(|r| r.values.keys().cloned())
            .collect();
        Self {
            rows,
            metric_columns,
        }
    }

    /// Declares additional metric columns, e.g. the whole catalog.
    pub fn with_metric_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.metric_columns
            .extend(columns.into_iter().map(Into::into));
        self
    }

    pub fn has_metric(&self, metric: &str) -> bool {
        self.metric_columns.contains(metric)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl FromIterator<ObservationRow> for ObservationTable {
    fn from_iter<T: IntoIterator<Item = ObservationRow>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Anything that carries an observation row (raw or augmented).
pub trait Observed {
    fn observation(&self) -> &ObservationRow;
}

impl Observed for ObservationRow {
    fn observation(&self) -> &ObservationRow {
        self
    }
}

/// Raw quarterly fundamentals for one (ticker, fiscal period), as published on `datekey`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FundamentalRecord {
    pub ticker: String,
    pub reportperiod: Option<NaiveDate>,
    pub datekey: Option<NaiveDate>,
    pub price: Option<f64>,
    pub epsdil: Option<f64>,
    pub bvps: Option<f64>,
    pub sps: Option<f64>,
    pub cashneq: Option<f64>,
    pub sharesbas: Option<f64>,
    pub ev: Option<f64>,
    pub ebitda: Option<f64>,
    pub netinccmn: Option<f64>,
    pub equity: Option<f64>,
    pub ebit: Option<f64>,
    pub ebt: Option<f64>,
    pub taxexp: Option<f64>,
    pub debt: Option<f64>,
    pub assets: Option<f64>,
    pub assetsc: Option<f64>,
    pub liabilitiesc: Option<f64>,
    pub intexp: Option<f64>,
    pub marketcap: Option<f64>,
    pub revenue: Option<f64>,
}

/// Ticker metadata used for peer segmentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerRecord {
    pub ticker: String,
    pub sector: Option<String>,
}

/// Outcome of comparing one statistic against the outlier threshold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlierClassification {
    pub is_outlier: bool,
    pub direction: Option<OutlierDirection>,
}

impl OutlierClassification {
    pub const NEUTRAL: Self = Self {
        is_outlier: false,
        direction: None,
    };

    pub fn flagged(direction: OutlierDirection) -> Self {
        Self {
            is_outlier: true,
            direction: Some(direction),
        }
    }

    pub fn is(&self, direction: OutlierDirection) -> bool {
        self.direction == Some(direction)
    }
}
