use crate::error::DatasetError;
use crate::frame::{date_column, has_column, numeric_columns, optional_f64, optional_str, read_frame, required_str, write_frame};
use analytics::{POPULATION_SUFFIX, ScoredRow, ScoredTable, WindowedStatistic};
use configuration::ScoringDefaults;
use core_types::{ObservationRow, ObservationTable, StatisticKind, UNKNOWN_SEGMENT};
use polars::prelude::*;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, warn};

/// Names of the identifying columns in an on-disk table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    pub entity_column: String,
    pub date_column: String,
    pub segment_column: String,
}

impl Default for TableSchema {
    fn default() -> Self {
        Self::from_defaults(&ScoringDefaults::default())
    }
}

impl TableSchema {
    pub fn from_defaults(defaults: &ScoringDefaults) -> Self {
        Self {
            entity_column: defaults.entity_column.clone(),
            date_column: defaults.date_column.clone(),
            segment_column: defaults.segment_column.clone(),
        }
    }

    fn identifiers(&self) -> [&str; 3] {
        [&self.entity_column, &self.date_column, &self.segment_column]
    }
}

/// Imports an observation table from a `.parquet` or `.csv` file.
///
/// Every numeric column other than the identifiers becomes a metric column.
/// A missing segment column (or a null segment) maps to `"Unknown"`; rows
/// without an entity id or a parseable date are dropped.
pub fn read_observation_table(path: &Path, schema: &TableSchema) -> Result<ObservationTable, DatasetError> {
    let df = read_frame(path)?;
    let ids = required_str(&df, &schema.entity_column)?;
    let dates = date_column(&df, &schema.date_column, true)?;
    if !has_column(&df, &schema.segment_column) {
        warn!(column = %schema.segment_column, "Segment column missing, every row is treated as one peer group");
    }
    let segments = optional_str(&df, &schema.segment_column)?;

    let metric_names = numeric_columns(&df, &schema.identifiers());
    let metric_values = metric_names
        .iter()
        .map(|name| optional_f64(&df, name))
        .collect::<Result<Vec<_>, _>>()?;

    let mut skipped = 0usize;
    let mut rows = Vec::with_capacity(df.height());
    for (i, ((id, date), segment)) in ids.into_iter().zip(dates).zip(segments).enumerate() {
        let (Some(id), Some(date)) = (id, date) else {
            skipped += 1;
            continue;
        };
        let segment = segment.unwrap_or_else(|| UNKNOWN_SEGMENT.to_string());
        let row = metric_names
            .iter()
            .zip(&metric_values)
            .fold(ObservationRow::new(id, date, segment), |row, (name, values)| {
                row.with_optional(name.as_str(), values[i])
            });
        rows.push(row);
    }
    if skipped > 0 {
        warn!(skipped, "Dropped rows without an entity id or date");
    }
    info!(rows = rows.len(), metrics = metric_names.len(), path = %path.display(), "Loaded observation table");

    Ok(ObservationTable::new(rows).with_metric_columns(metric_names))
}

/// Exports a scored table with `{metric}_{suffix}` statistic columns.
///
/// Dates are written as ISO strings and populations as integers. Parent
/// directories are created as needed.
pub fn write_scored_table(path: &Path, table: &ScoredTable, schema: &TableSchema) -> Result<(), DatasetError> {
    let rows = &table.rows;
    let mut columns = vec![
        Series::new(
            &schema.entity_column,
            rows.iter().map(|r| r.entity_id().to_string()).collect::<Vec<_>>(),
        ),
        Series::new(
            &schema.date_column,
            rows.iter().map(|r| r.as_of_date().to_string()).collect::<Vec<_>>(),
        ),
        Series::new(
            &schema.segment_column,
            rows.iter().map(|r| r.segment().to_string()).collect::<Vec<_>>(),
        ),
    ];

    for metric in &table.metric_columns {
        let values: Vec<Option<f64>> = rows.iter().map(|r| r.observation.value(metric)).collect();
        columns.push(Series::new(metric, values));
    }

    for metric in &table.metrics {
        for suffix in WindowedStatistic::suffixes(table.kind) {
            let name = format!("{metric}_{suffix}");
            let cell = |r: &ScoredRow| r.statistic(metric).and_then(|s| s.field(suffix));
            let series = if *suffix == POPULATION_SUFFIX {
                let counts: Vec<Option<i64>> = rows
                    .iter()
                    .map(|r| r.statistic(metric).and_then(WindowedStatistic::population).map(|n| n as i64))
                    .collect();
                Series::new(&name, counts)
            } else {
                Series::new(&name, rows.iter().map(cell).collect::<Vec<_>>())
            };
            columns.push(series);
        }
    }

    let mut df = DataFrame::new(columns)?;
    write_frame(path, &mut df)?;
    info!(rows = df.height(), columns = df.width(), path = %path.display(), "Wrote scored table");
    Ok(())
}

/// Reads back a table written by [`write_scored_table`].
///
/// A metric counts as scored when its `{metric}_{score}` column is present
/// for `kind`; the remaining numeric columns are raw metric values.
pub fn read_scored_table(
    path: &Path,
    schema: &TableSchema,
    kind: StatisticKind,
    window_days: i64,
) -> Result<ScoredTable, DatasetError> {
    let df = read_frame(path)?;
    let suffixes = WindowedStatistic::suffixes(kind);
    let score_suffix = kind.score_suffix();

    let derived: Vec<String> = df
        .get_column_names()
        .iter()
        .filter_map(|c| c.strip_suffix(score_suffix)?.strip_suffix('_'))
        .map(str::to_string)
        .collect();
    let is_derived = |column: &str| {
        derived.iter().any(|metric| {
            suffixes
                .iter()
                .any(|suffix| column == format!("{metric}_{suffix}"))
        })
    };

    let mut observations = read_observation_table(path, schema)?;
    observations.metric_columns.retain(|c| !is_derived(c.as_str()));
    for row in &mut observations.rows {
        row.values.retain(|c, _| !is_derived(c.as_str()));
    }

    let mut fields: BTreeMap<String, Vec<Option<f64>>> = BTreeMap::new();
    for metric in &derived {
        for suffix in suffixes {
            let name = format!("{metric}_{suffix}");
            fields.insert(name.clone(), optional_f64(&df, &name)?);
        }
    }

    // Row positions must survive the id/date filter applied on import.
    let ids = required_str(&df, &schema.entity_column)?;
    let dates = date_column(&df, &schema.date_column, true)?;
    let kept = (0..df.height()).filter(|&i| ids[i].is_some() && dates[i].is_some());

    let rows = observations
        .rows
        .into_iter()
        .zip(kept)
        .map(|(observation, i)| {
            let mut row = ScoredRow::new(observation);
            for metric in &derived {
                let statistic = WindowedStatistic::from_fields(kind, |suffix| {
                    fields
                        .get(&format!("{metric}_{suffix}"))
                        .and_then(|column| column[i])
                });
                row.statistics.insert(metric.clone(), statistic);
            }
            row
        })
        .collect();

    Ok(ScoredTable {
        kind,
        window_days,
        metrics: derived,
        metric_columns: observations.metric_columns,
        rows,
    })
}
