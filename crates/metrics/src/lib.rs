//! # Peerscope Metrics Crate
//!
//! Turns raw quarterly fundamentals into the observation table the scoring
//! engine consumes: one row per filing, keyed by the date the filing became
//! public, carrying the eleven catalog ratios, the size levels, their
//! period-over-period growth and the entity's sector.
use core_types::{FundamentalRecord, ObservationRow, ObservationTable, all_metrics};
use tracing::{debug, warn};

pub mod growth;
pub mod ratios;
pub mod segmentation;
pub mod size;

pub use growth::{GROWTH_METRICS, derive_growth, temporal_change};
pub use ratios::RATIO_FORMULAS;
pub use segmentation::SegmentMap;
pub use size::SIZE_FEATURES;

/// Derives every catalog and supplementary metric for records that have a `datekey`.
///
/// Records without a publication date cannot be placed in time and are
/// skipped, but still serve as the base of a later filing's growth. The
/// resulting table declares every metric column even if it is null for all
/// rows.
pub fn derive_observations(records: &[FundamentalRecord], segments: &SegmentMap) -> ObservationTable {
    let growth = derive_growth(records);
    let mut skipped = 0usize;
    let rows: Vec<ObservationRow> = records
        .iter()
        .zip(growth)
        .filter_map(|(record, growth)| {
            let Some(as_of_date) = record.datekey else {
                skipped += 1;
                return None;
            };
            let row = ObservationRow::new(
                record.ticker.clone(),
                as_of_date,
                segments.segment_for(&record.ticker),
            );
            let row = RATIO_FORMULAS
                .iter()
                .chain(SIZE_FEATURES.iter())
                .fold(row, |row, (name, formula)| row.with_optional(*name, formula(record)));
            let row = growth
                .into_iter()
                .fold(row, |row, (name, change)| row.with_optional(name, change));
            Some(row)
        })
        .collect();

    if skipped > 0 {
        warn!(skipped, "Dropped fundamentals without a datekey");
    }
    debug!(rows = rows.len(), "Derived observation rows");

    ObservationTable::new(rows).with_metric_columns(all_metrics().map(|m| m.name))
}
