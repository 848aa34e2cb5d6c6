//! Period-over-period change of fundamentals within one ticker's filing history.
//!
//! The comparison filing is found by position, not by calendar: a ticker's
//! filings are ordered by report period and the filing one (QoQ) or four
//! (YoY) places earlier is the base.
use crate::ratios::{calculate_roe, calculate_roic};
use core_types::FundamentalRecord;

/// How far back the comparison filing lies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lag {
    QuarterOverQuarter,
    YearOverYear,
}

impl Lag {
    pub fn filings(&self) -> usize {
        match self {
            Lag::QuarterOverQuarter => 1,
            Lag::YearOverYear => 4,
        }
    }
}

/// A growth column: the series it tracks, the lag and the zero-crossing rule.
#[derive(Debug, Clone, Copy)]
pub struct GrowthMetric {
    pub name: &'static str,
    pub value: fn(&FundamentalRecord) -> Option<f64>,
    pub lag: Lag,
    /// Null the change when the series crosses (or touches) zero.
    pub check_sign_crossing: bool,
}

const fn growth(
    name: &'static str,
    value: fn(&FundamentalRecord) -> Option<f64>,
    lag: Lag,
    check_sign_crossing: bool,
) -> GrowthMetric {
    GrowthMetric {
        name,
        value,
        lag,
        check_sign_crossing,
    }
}

fn revenue(r: &FundamentalRecord) -> Option<f64> {
    r.revenue
}

fn marketcap(r: &FundamentalRecord) -> Option<f64> {
    r.marketcap
}

fn assets(r: &FundamentalRecord) -> Option<f64> {
    r.assets
}

fn epsdil(r: &FundamentalRecord) -> Option<f64> {
    r.epsdil
}

/// Growth columns, in `SUPPLEMENTARY_METRICS` order.
pub const GROWTH_METRICS: [GrowthMetric; 12] = [
    growth("revenue_growth_qoq", revenue, Lag::QuarterOverQuarter, false),
    growth("revenue_growth_yoy", revenue, Lag::YearOverYear, false),
    growth("marketcap_growth_qoq", marketcap, Lag::QuarterOverQuarter, false),
    growth("marketcap_growth_yoy", marketcap, Lag::YearOverYear, false),
    growth("assets_growth_qoq", assets, Lag::QuarterOverQuarter, false),
    growth("assets_growth_yoy", assets, Lag::YearOverYear, false),
    growth("eps_growth_qoq", epsdil, Lag::QuarterOverQuarter, false),
    growth("eps_growth_yoy", epsdil, Lag::YearOverYear, false),
    growth("roe_calculated_growth_qoq", calculate_roe, Lag::QuarterOverQuarter, true),
    growth("roe_calculated_growth_yoy", calculate_roe, Lag::YearOverYear, true),
    growth("roic_calculated_growth_qoq", calculate_roic, Lag::QuarterOverQuarter, true),
    growth("roic_calculated_growth_yoy", calculate_roic, Lag::YearOverYear, true),
];

/// Relative change `(current - previous) / |previous|`.
///
/// `None` when either value is missing or `previous` is zero, and, with
/// `check_sign_crossing`, when the two values do not share a strict sign.
pub fn temporal_change(current: Option<f64>, previous: Option<f64>, check_sign_crossing: bool) -> Option<f64> {
    let (current, previous) = (current?, previous?);
    if previous == 0.0 || (check_sign_crossing && current * previous <= 0.0) {
        return None;
    }
    let change = (current - previous) / previous.abs();
    change.is_finite().then_some(change)
}

/// For each record, the index of the filing `lag` places earlier for the same ticker.
pub fn predecessors(records: &[FundamentalRecord], lag: Lag) -> Vec<Option<usize>> {
    let mut order: Vec<usize> = (0..records.len()).collect();
    order.sort_by(|&a, &b| {
        let (a, b) = (&records[a], &records[b]);
        (&a.ticker, a.reportperiod, a.datekey).cmp(&(&b.ticker, b.reportperiod, b.datekey))
    });

    let step = lag.filings();
    let mut previous = vec![None; records.len()];
    for (position, &index) in order.iter().enumerate().skip(step) {
        let candidate = order[position - step];
        // Sorted by ticker, so a match `step` back means every filing between is the same ticker too.
        if records[candidate].ticker == records[index].ticker {
            previous[index] = Some(candidate);
        }
    }
    previous
}

/// Growth values for every record, aligned with `records`.
pub fn derive_growth(records: &[FundamentalRecord]) -> Vec<Vec<(&'static str, Option<f64>)>> {
    let quarter = predecessors(records, Lag::QuarterOverQuarter);
    let year = predecessors(records, Lag::YearOverYear);

    records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            GROWTH_METRICS
                .iter()
                .map(|metric| {
                    let base = match metric.lag {
                        Lag::QuarterOverQuarter => quarter[index],
                        Lag::YearOverYear => year[index],
                    };
                    let previous = base.and_then(|b| (metric.value)(&records[b]));
                    let change = temporal_change((metric.value)(record), previous, metric.check_sign_crossing);
                    (metric.name, change)
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use chrono::NaiveDate;
    use core_types::{MetricCategory, SUPPLEMENTARY_METRICS};

    fn quarter_end(year: i32, quarter: u32) -> NaiveDate {
        let month = quarter * 3;
        let day = if month == 6 || month == 9 { 30 } else { 31 };
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn filing(ticker: &str, year: i32, quarter: u32, revenue: f64) -> FundamentalRecord {
        FundamentalRecord {
            ticker: ticker.to_string(),
            reportperiod: Some(quarter_end(year, quarter)),
            revenue: Some(revenue),
            ..Default::default()
        }
    }

    fn value(row: &[(&str, Option<f64>)], name: &str) -> Option<f64> {
        row.iter().find(|(n, _)| *n == name).and_then(|(_, v)| *v)
    }

    #[test]
    fn test_temporal_change() {
        assert_abs_diff_eq!(temporal_change(Some(110.0), Some(100.0), false).unwrap(), 0.1);
        // Denominator is the magnitude, so recovering losses read as growth.
        assert_abs_diff_eq!(temporal_change(Some(-1.0), Some(-2.0), false).unwrap(), 0.5);
        assert_abs_diff_eq!(temporal_change(Some(1.0), Some(-2.0), false).unwrap(), 1.5);
        assert_eq!(temporal_change(Some(5.0), Some(0.0), false), None);
        assert_eq!(temporal_change(None, Some(1.0), false), None);
        assert_eq!(temporal_change(Some(1.0), None, false), None);
    }

    #[test]
    fn test_sign_crossing_is_null_when_checked() {
        assert_eq!(temporal_change(Some(0.1), Some(-0.2), true), None);
        assert_eq!(temporal_change(Some(0.0), Some(0.2), true), None);
        assert_abs_diff_eq!(temporal_change(Some(-0.1), Some(-0.2), true).unwrap(), 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(temporal_change(Some(0.3), Some(0.2), true).unwrap(), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_predecessors_follow_report_period_within_ticker() {
        // Deliberately out of order and interleaved across tickers.
        let records = vec![
            filing("AAA", 2023, 3, 120.0),
            filing("BBB", 2023, 1, 50.0),
            filing("AAA", 2023, 1, 100.0),
            filing("AAA", 2023, 2, 110.0),
            filing("BBB", 2023, 2, 55.0),
        ];
        assert_eq!(
            predecessors(&records, Lag::QuarterOverQuarter),
            vec![Some(3), None, None, Some(2), Some(1)]
        );
        assert_eq!(predecessors(&records, Lag::YearOverYear), vec![None; 5]);
    }

    #[test]
    fn test_year_over_year_skips_four_filings() {
        let records: Vec<FundamentalRecord> = (0..6)
            .map(|i| filing("AAA", 2022 + (i / 4) as i32, (i % 4 + 1) as u32, 100.0 + 10.0 * i as f64))
            .collect();
        let growth = derive_growth(&records);

        assert_eq!(value(&growth[3], "revenue_growth_yoy"), None);
        // 2023Q1 (140) against 2022Q1 (100).
        assert_abs_diff_eq!(value(&growth[4], "revenue_growth_yoy").unwrap(), 0.4, epsilon = 1e-12);
        // 2023Q2 (150) against 2023Q1 (140).
        assert_abs_diff_eq!(value(&growth[5], "revenue_growth_qoq").unwrap(), 10.0 / 140.0, epsilon = 1e-12);
        assert_eq!(value(&growth[0], "revenue_growth_qoq"), None);
    }

    #[test]
    fn test_profitability_change_nulls_on_sign_crossing() {
        let mut first = filing("AAA", 2023, 1, 100.0);
        first.netinccmn = Some(-50.0);
        first.equity = Some(1000.0);
        let mut second = filing("AAA", 2023, 2, 100.0);
        second.netinccmn = Some(80.0);
        second.equity = Some(1000.0);
        let mut third = filing("AAA", 2023, 3, 100.0);
        third.netinccmn = Some(100.0);
        third.equity = Some(1000.0);

        let growth = derive_growth(&[first, second, third]);
        assert_eq!(value(&growth[1], "roe_calculated_growth_qoq"), None);
        assert_abs_diff_eq!(value(&growth[2], "roe_calculated_growth_qoq").unwrap(), 0.25, epsilon = 1e-12);
        // EPS growth is not sign-checked, but there is no EPS here.
        assert_eq!(value(&growth[2], "eps_growth_qoq"), None);
    }

    #[test]
    fn test_growth_columns_match_supplementary_metrics() {
        let catalog: Vec<&str> = SUPPLEMENTARY_METRICS
            .iter()
            .filter(|m| m.category == MetricCategory::Growth)
            .map(|m| m.name)
            .collect();
        let names: Vec<&str> = GROWTH_METRICS.iter().map(|m| m.name).collect();
        assert_eq!(names, catalog);
    }
}
