//! # Peerscope Dataset Crate
//!
//! This crate is the system's only door to disk. It reads dated snapshot
//! partitions of raw fundamentals and ticker metadata, imports prepared
//! observation tables and exports scored ones.
//!
//! ## Architectural Principles
//!
//! - **Layer 3 Adapter:** This crate encapsulates all file-format logic. It
//!   hands the rest of the application plain `core-types` and `analytics`
//!   structs and hides `polars` frames entirely.
//! - **Point-in-Time:** A read for an as-of date only ever opens the latest
//!   snapshot dated on or before it, and keeps the first publication of each
//!   fiscal period.
//! - **Boundary Naming:** The `{metric}_{suffix}` column convention exists
//!   only here; in memory, statistics stay typed.
//!
//! ## Public API
//!
//! - `DataReader`: point-in-time reads of `sf1` and `tickers` snapshots.
//! - `read_observation_table`, `write_scored_table`, `read_scored_table`:
//!   parquet/CSV import and export.
//! - `read_verdicts`: optional analyst notes keyed by ticker.
//! - `DatasetError`: the specific error types that can be returned from this crate.

pub mod error;
mod frame;
pub mod reader;
pub mod snapshot;
pub mod table_io;
pub mod verdicts;

pub use error::DatasetError;
pub use reader::DataReader;
pub use snapshot::{Snapshot, find_latest_snapshot, list_snapshots};
pub use table_io::{TableSchema, read_observation_table, read_scored_table, write_scored_table};
pub use verdicts::read_verdicts;
