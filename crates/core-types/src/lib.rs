pub mod catalog;
pub mod enums;
pub mod error;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use catalog::{
    METRIC_CATALOG, MetricDefinition, SUPPLEMENTARY_METRICS, all_metrics, find_metric, metric_names,
    metrics_in,
};
pub use enums::{Direction, MetricCategory, OutlierDirection, SignalSortKey, StatisticKind};
pub use error::CoreError;
pub use structs::{
    FundamentalRecord, ObservationRow, ObservationTable, Observed, OutlierClassification,
    TickerRecord, UNKNOWN_SEGMENT,
};
