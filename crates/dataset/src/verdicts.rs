use crate::error::DatasetError;
use crate::frame::{read_frame, required_str};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// Loads analyst notes keyed by ticker.
///
/// Each `ticker, comment, date` row renders as `comment (date)`; notes for one
/// ticker are joined with newlines in file order. A missing or empty file
/// yields `None`.
pub fn read_verdicts(path: &Path) -> Result<Option<HashMap<String, String>>, DatasetError> {
    if !path.is_file() {
        debug!(path = %path.display(), "No verdicts file");
        return Ok(None);
    }
    let df = read_frame(path)?;
    if df.height() == 0 {
        return Ok(None);
    }

    let tickers = required_str(&df, "ticker")?;
    let comments = required_str(&df, "comment")?;
    let dates = required_str(&df, "date")?;

    let mut verdicts: HashMap<String, String> = HashMap::new();
    for ((ticker, comment), date) in tickers.into_iter().zip(comments).zip(dates) {
        let (Some(ticker), Some(comment), Some(date)) = (ticker, comment, date) else {
            continue;
        };
        let entry = format!("{comment} ({date})");
        verdicts
            .entry(ticker)
            .and_modify(|v| {
                v.push('\n');
                v.push_str(&entry);
            })
            .or_insert(entry);
    }
    Ok(Some(verdicts))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdicts_are_grouped_per_ticker() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("verdicts.csv");
        std::fs::write(
            &path,
            "ticker,comment,date\nAAA,cheap but shrinking,2024-01-05\nBBB,pass,2024-02-01\nAAA,revisit after Q2,2024-04-10\n",
        )
        .unwrap();

        let verdicts = read_verdicts(&path).unwrap().unwrap();
        assert_eq!(verdicts.len(), 2);
        assert_eq!(
            verdicts["AAA"],
            "cheap but shrinking (2024-01-05)\nrevisit after Q2 (2024-04-10)"
        );
        assert_eq!(verdicts["BBB"], "pass (2024-02-01)");
    }

    #[test]
    fn test_missing_file_disables_verdicts() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_verdicts(&dir.path().join("verdicts.csv")).unwrap().is_none());
    }
}
