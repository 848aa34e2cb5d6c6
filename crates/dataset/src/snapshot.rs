use crate::error::DatasetError;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A dated snapshot partition, `{prefix}_snapshot_YYYY-MM-DD.parquet`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub date: NaiveDate,
    pub path: PathBuf,
}

fn parse_snapshot_name(name: &str, prefix: &str) -> Option<NaiveDate> {
    let date = name
        .strip_prefix(prefix)?
        .strip_prefix("_snapshot_")?
        .strip_suffix(".parquet")?;
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

/// Lists every snapshot for `prefix` in `dir`, oldest first.
pub fn list_snapshots(dir: &Path, prefix: &str) -> Result<Vec<Snapshot>, DatasetError> {
    if !dir.is_dir() {
        return Err(DatasetError::NotFound(format!(
            "no {prefix} snapshot files found in {}",
            dir.display()
        )));
    }

    let mut snapshots = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if let Some(date) = parse_snapshot_name(name, prefix) {
            snapshots.push(Snapshot { date, path });
        }
    }
    snapshots.sort_by_key(|s| s.date);
    Ok(snapshots)
}

/// The most recent snapshot dated on or before `as_of`.
pub fn find_latest_snapshot(dir: &Path, prefix: &str, as_of: NaiveDate) -> Result<Snapshot, DatasetError> {
    let snapshots = list_snapshots(dir, prefix)?;
    if snapshots.is_empty() {
        return Err(DatasetError::NotFound(format!(
            "no {prefix} snapshot files found in {}",
            dir.display()
        )));
    }

    let selected = snapshots
        .into_iter()
        .take_while(|s| s.date <= as_of)
        .last()
        .ok_or_else(|| DatasetError::NotFound(format!("no {prefix} snapshot file dated on or before {as_of}")))?;
    debug!(path = %selected.path.display(), "Selected snapshot");
    Ok(selected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn create_test_dir(names: &[&str]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for name in names {
            File::create(dir.path().join(name)).unwrap();
        }
        dir
    }

    #[test]
    fn test_picks_most_recent_on_or_before() {
        let dir = create_test_dir(&[
            "sf1_snapshot_2024-01-31.parquet",
            "sf1_snapshot_2024-03-31.parquet",
            "sf1_snapshot_2024-02-29.parquet",
            "tickers_snapshot_2024-03-15.parquet",
            "notes.txt",
        ]);

        let picked = find_latest_snapshot(dir.path(), "sf1", date(2024, 3, 15)).unwrap();
        assert_eq!(picked.date, date(2024, 2, 29));

        let exact = find_latest_snapshot(dir.path(), "sf1", date(2024, 3, 31)).unwrap();
        assert_eq!(exact.date, date(2024, 3, 31));
    }

    #[test]
    fn test_nothing_old_enough_is_not_found() {
        let dir = create_test_dir(&["tickers_snapshot_2024-03-15.parquet"]);
        let result = find_latest_snapshot(dir.path(), "tickers", date(1900, 1, 1));
        assert!(matches!(result, Err(DatasetError::NotFound(_))));
    }

    #[test]
    fn test_missing_directory_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let result = find_latest_snapshot(&dir.path().join("raw/sf1"), "sf1", date(2024, 1, 1));
        assert!(matches!(result, Err(DatasetError::NotFound(_))));
    }

    #[test]
    fn test_malformed_dates_are_ignored() {
        assert_eq!(parse_snapshot_name("sf1_snapshot_2024-13-01.parquet", "sf1"), None);
        assert_eq!(parse_snapshot_name("sf1_snapshot_2024-01-01.csv", "sf1"), None);
        assert_eq!(
            parse_snapshot_name("sf1_snapshot_2024-01-01.parquet", "sf1"),
            Some(date(2024, 1, 1))
        );
    }
}
