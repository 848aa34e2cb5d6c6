//! # Peerscope Analytics Engine
//!
//! This crate computes point-in-time peer statistics for fundamental metrics.
//! For every (entity, as-of date) it compares each metric against the same
//! segment's values published within a trailing calendar window, using one
//! of three interchangeable backends: z-score, mid-rank percentile, or
//! median/MAD.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It performs no I/O and
//!   depends only on `core-types` and `configuration` (Layer 0).
//! - **No Look-Ahead:** A row's statistics are built solely from rows dated on
//!   or before it, never from later publications.
//! - **Stateless Calculation:** The `ScoringEngine` takes an `ObservationTable`
//!   and returns a new `ScoredTable`. Degenerate peer groups produce `None`,
//!   never an error.
//!
//! ## Public API
//!
//! - `ScoringEngine`: validates the request and runs the windowed statistics.
//! - `WindowedStatistic`, `ScoredRow`, `ScoredTable`: the augmented output.
//! - `AnalyticsError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod engine;
pub mod error;
pub mod report;
pub mod stats;
pub mod window;

// Re-export the key components to create a clean, public-facing API.
pub use engine::ScoringEngine;
pub use error::AnalyticsError;
pub use report::{POPULATION_SUFFIX, ScoredRow, ScoredTable, WindowedStatistic};
pub use stats::{MAD_SCALE, mean_std, mid_rank_percentile, quantile};
pub use window::{admits, window_start};
