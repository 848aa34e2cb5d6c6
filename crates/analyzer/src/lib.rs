//! # Peerscope Analyzer Crate
//!
//! Turns windowed peer statistics into outlier signals.
//!
//! ## Architectural Principles
//!
//! - **Layer 2 Logic:** Consumes `analytics::ScoredRow`s and never recomputes a
//!   statistic; it only compares them against a `Threshold`.
//! - **One Decision Table:** Aggregate counts, long-format rows and metric
//!   selection all label cells through `classify`, so a metric can never be
//!   favorable in one view and unfavorable in another.
//!
//! ## Public API
//!
//! - `classify`, `Threshold`: the favorable/unfavorable decision table.
//! - `count_signals`, `SignalScreen`: per-row tallies and the ranked screen.
//! - `melt`, `OutlierFilter`: the long-format reshaper and its post-filter.
//! - `select_metric_outliers`, `latest_per_entity`: drill-down helpers.

pub mod classifier;
pub mod error;
pub mod melt;
pub mod selection;
pub mod signals;

pub use classifier::{Threshold, classify, classify_statistic};
pub use error::AnalyzerError;
pub use melt::{LongRow, OutlierFilter, melt};
pub use selection::{ScreenOutcome, SignalScreen, latest_per_entity, select_metric_outliers};
pub use signals::{SignalCounts, SignalRow, count_signals};
