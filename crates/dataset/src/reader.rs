use crate::error::DatasetError;
use crate::frame::{date_column, optional_f64, optional_str, read_frame, required_str};
use crate::snapshot::find_latest_snapshot;
use chrono::NaiveDate;
use configuration::DataPaths;
use core_types::{FundamentalRecord, TickerRecord};
use polars::prelude::DataFrame;
use tracing::info;

type FieldSetter = fn(&mut FundamentalRecord, Option<f64>);

const FUNDAMENTAL_FIELDS: [(&str, FieldSetter); 20] = [
    ("price", |r, v| r.price = v),
    ("epsdil", |r, v| r.epsdil = v),
    ("bvps", |r, v| r.bvps = v),
    ("sps", |r, v| r.sps = v),
    ("cashneq", |r, v| r.cashneq = v),
    ("sharesbas", |r, v| r.sharesbas = v),
    ("ev", |r, v| r.ev = v),
    ("ebitda", |r, v| r.ebitda = v),
    ("netinccmn", |r, v| r.netinccmn = v),
    ("equity", |r, v| r.equity = v),
    ("ebit", |r, v| r.ebit = v),
    ("ebt", |r, v| r.ebt = v),
    ("taxexp", |r, v| r.taxexp = v),
    ("debt", |r, v| r.debt = v),
    ("assets", |r, v| r.assets = v),
    ("assetsc", |r, v| r.assetsc = v),
    ("liabilitiesc", |r, v| r.liabilitiesc = v),
    ("intexp", |r, v| r.intexp = v),
    ("marketcap", |r, v| r.marketcap = v),
    ("revenue", |r, v| r.revenue = v),
];

/// Point-in-time access to the snapshot partitions under a data root.
#[derive(Debug, Clone)]
pub struct DataReader {
    paths: DataPaths,
}

impl DataReader {
    pub fn new(paths: DataPaths) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &DataPaths {
        &self.paths
    }

    /// Reads fundamentals published in `[start, end]` from the latest snapshot dated `<= end`.
    ///
    /// With `max_data_delay_days`, filings published more than that many days
    /// after their fiscal period end are dropped. Only the earliest
    /// publication of each (ticker, report period) is kept, so restatements
    /// never replace what was first knowable. The result is sorted by
    /// ticker, report period and datekey. An empty result is not an error.
    pub fn read_fundamentals(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        max_data_delay_days: Option<i64>,
    ) -> Result<Vec<FundamentalRecord>, DatasetError> {
        let snapshot = find_latest_snapshot(&self.paths.sf1_dir(), "sf1", end)?;
        info!(file = %snapshot.path.display(), "Reading fundamentals");
        let df = read_frame(&snapshot.path)?;

        let mut records: Vec<FundamentalRecord> = fundamentals_from_frame(&df)?
            .into_iter()
            .filter(|r| r.datekey.is_some_and(|d| start <= d && d <= end))
            .collect();
        info!(records = records.len(), %start, %end, "After datekey filter");

        if let Some(max_delay) = max_data_delay_days {
            let before = records.len();
            records.retain(|r| match (r.datekey, r.reportperiod) {
                (Some(datekey), Some(period)) => (datekey - period).num_days() <= max_delay,
                _ => false,
            });
            info!(
                records = records.len(),
                removed = before - records.len(),
                max_delay,
                "After data delay filter"
            );
        }

        records.sort_by(|a, b| {
            (&a.ticker, a.reportperiod, a.datekey).cmp(&(&b.ticker, b.reportperiod, b.datekey))
        });
        records.dedup_by(|later, first| later.ticker == first.ticker && later.reportperiod == first.reportperiod);
        info!(records = records.len(), "After keeping the first datekey per report period");
        Ok(records)
    }

    /// Reads ticker metadata from the latest snapshot dated `<= snapshot_date`.
    pub fn read_tickers(&self, snapshot_date: NaiveDate) -> Result<Vec<TickerRecord>, DatasetError> {
        let snapshot = find_latest_snapshot(&self.paths.tickers_dir(), "tickers", snapshot_date)?;
        info!(file = %snapshot.path.display(), "Reading tickers");
        let df = read_frame(&snapshot.path)?;

        let tickers = required_str(&df, "ticker")?;
        let sectors = optional_str(&df, "sector")?;
        Ok(tickers
            .into_iter()
            .zip(sectors)
            .filter_map(|(ticker, sector)| ticker.map(|ticker| TickerRecord { ticker, sector }))
            .collect())
    }
}

fn fundamentals_from_frame(df: &DataFrame) -> Result<Vec<FundamentalRecord>, DatasetError> {
    let tickers = required_str(df, "ticker")?;
    let datekeys = date_column(df, "datekey", true)?;
    let periods = date_column(df, "reportperiod", false)?;

    let mut records: Vec<FundamentalRecord> = tickers
        .into_iter()
        .zip(datekeys)
        .zip(periods)
        .map(|((ticker, datekey), reportperiod)| FundamentalRecord {
            ticker: ticker.unwrap_or_default(),
            datekey,
            reportperiod,
            ..FundamentalRecord::default()
        })
        .collect();

    for (name, set) in FUNDAMENTAL_FIELDS {
        for (record, value) in records.iter_mut().zip(optional_f64(df, name)?) {
            set(record, value);
        }
    }

    records.retain(|r| !r.ticker.is_empty());
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;
    use std::fs::{File, create_dir_all};
    use std::path::Path;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn write_parquet(path: &Path, mut df: DataFrame) {
        create_dir_all(path.parent().unwrap()).unwrap();
        let mut file = File::create(path).unwrap();
        ParquetWriter::new(&mut file).finish(&mut df).unwrap();
    }

    fn create_test_reader() -> (tempfile::TempDir, DataReader) {
        let dir = tempfile::tempdir().unwrap();
        let paths = DataPaths::rooted(dir.path());

        let sf1 = DataFrame::new(vec![
            Series::new("ticker", &["AAA", "AAA", "AAA", "BBB", "BBB", "CCC"]),
            Series::new(
                "reportperiod",
                &["2023-12-31", "2023-12-31", "2024-03-31", "2023-12-31", "2023-09-30", "2023-12-31"],
            ),
            Series::new(
                "datekey",
                &["2024-02-10", "2024-02-01", "2024-05-01", "2024-04-15", "2023-11-01", "2024-02-20"],
            ),
            Series::new("price", &[10.0, 10.0, 12.0, 30.0, 28.0, 5.0]),
            Series::new("epsdil", &[1.0, 1.25, 1.5, 2.0, 1.5, 0.0]),
            Series::new("revenue", &[900.0, 1000.0, 1100.0, 40.0, 35.0, 7.0]),
        ])
        .unwrap();
        write_parquet(&paths.sf1_dir().join("sf1_snapshot_2024-06-30.parquet"), sf1);

        let stale = DataFrame::new(vec![
            Series::new("ticker", &["ZZZ"]),
            Series::new("reportperiod", &["2023-12-31"]),
            Series::new("datekey", &["2024-02-01"]),
        ])
        .unwrap();
        write_parquet(&paths.sf1_dir().join("sf1_snapshot_2024-12-31.parquet"), stale);

        let tickers = DataFrame::new(vec![
            Series::new("ticker", &["AAA", "BBB"]),
            Series::new("sector", &[Some("Technology"), None]),
        ])
        .unwrap();
        write_parquet(&paths.tickers_dir().join("tickers_snapshot_2024-06-01.parquet"), tickers);

        (dir, DataReader::new(paths))
    }

    #[test]
    fn test_read_fundamentals_keeps_first_publication() {
        let (_dir, reader) = create_test_reader();
        let records = reader
            .read_fundamentals(date(2024, 1, 1), date(2024, 6, 30), None)
            .unwrap();

        let keys: Vec<(&str, Option<NaiveDate>)> = records.iter().map(|r| (r.ticker.as_str(), r.datekey)).collect();
        assert_eq!(
            keys,
            [
                ("AAA", Some(date(2024, 2, 1))),
                ("AAA", Some(date(2024, 5, 1))),
                ("BBB", Some(date(2024, 4, 15))),
                ("CCC", Some(date(2024, 2, 20))),
            ]
        );
        assert_eq!(records[0].epsdil, Some(1.25));
        assert_eq!(records[0].revenue, Some(1000.0));
        assert_eq!(records[1].revenue, Some(1100.0));
        assert_eq!(records[0].bvps, None);
        assert_eq!(records[0].marketcap, None);
    }

    #[test]
    fn test_read_fundamentals_applies_delay_filter() {
        let (_dir, reader) = create_test_reader();
        let records = reader
            .read_fundamentals(date(2024, 1, 1), date(2024, 6, 30), Some(60))
            .unwrap();
        // BBB was published 106 days after its period end.
        assert!(records.iter().all(|r| r.ticker != "BBB"));
        assert_eq!(records.len(), 3);
    }

    #[test]
    fn test_read_fundamentals_empty_range_is_empty() {
        let (_dir, reader) = create_test_reader();
        let records = reader
            .read_fundamentals(date(2024, 6, 1), date(2024, 6, 30), None)
            .unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_read_fundamentals_before_first_snapshot_is_not_found() {
        let (_dir, reader) = create_test_reader();
        let result = reader.read_fundamentals(date(2023, 1, 1), date(2023, 12, 31), None);
        assert!(matches!(result, Err(DatasetError::NotFound(_))));
    }

    #[test]
    fn test_read_tickers() {
        let (_dir, reader) = create_test_reader();
        let tickers = reader.read_tickers(date(2024, 6, 30)).unwrap();
        assert_eq!(tickers.len(), 2);
        assert_eq!(tickers[0].sector.as_deref(), Some("Technology"));
        assert_eq!(tickers[1].sector, None);

        assert!(matches!(
            reader.read_tickers(date(1900, 1, 1)),
            Err(DatasetError::NotFound(_))
        ));
    }
}
