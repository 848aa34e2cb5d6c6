//! # Peerscope Reporter Crate
//!
//! Pure presentation: the single-entity text report and terminal tables for
//! ranked screens and metric drill-downs. Nothing here recomputes a statistic.

pub mod entity;
pub mod format;
pub mod tables;

pub use entity::format_entity_report;
pub use format::{format_score, format_value};
pub use tables::{outlier_table, signal_table};
