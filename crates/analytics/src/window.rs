//! Trailing-window, same-segment sub-populations.
//!
//! Rows are grouped by segment and stably sorted by date once. Two monotonic
//! pointers then walk the admitted samples as the evaluation date advances,
//! so every evaluation point sees exactly the samples dated in
//! `[date - window_days, date]`.
use crate::report::WindowedStatistic;
use crate::stats::PeerPopulation;
use chrono::{Days, NaiveDate};
use core_types::{ObservationRow, StatisticKind};
use std::collections::HashMap;

/// First date inside the trailing window ending at `date`.
pub fn window_start(date: NaiveDate, window_days: i64) -> NaiveDate {
    let days = Days::new(window_days.max(0) as u64);
    date.checked_sub_days(days).unwrap_or(NaiveDate::MIN)
}

/// Whether a raw value enters peer sub-populations.
pub fn admits(value: f64, positive_only: bool) -> bool {
    value.is_finite() && (!positive_only || value > 0.0)
}

/// Scores one metric for every row; the result is aligned with `rows`.
pub(crate) fn score_metric(
    rows: &[ObservationRow],
    metric: &str,
    kind: StatisticKind,
    window_days: i64,
    positive_only: bool,
) -> Vec<WindowedStatistic> {
    let sample = |row: &ObservationRow| row.value(metric).filter(|v| admits(*v, positive_only));

    let mut segments: HashMap<&str, Vec<usize>> = HashMap::new();
    for (index, row) in rows.iter().enumerate() {
        segments.entry(row.segment.as_str()).or_default().push(index);
    }

    let mut scored = vec![WindowedStatistic::empty(kind); rows.len()];

    for indices in segments.values_mut() {
        indices.sort_by_key(|&i| rows[i].as_of_date);

        let samples: Vec<(NaiveDate, f64)> = indices
            .iter()
            .filter_map(|&i| sample(&rows[i]).map(|v| (rows[i].as_of_date, v)))
            .collect();

        let (mut lo, mut hi) = (0usize, 0usize);
        // Evaluation points are the distinct dates of the unfiltered segment.
        for point in indices.chunk_by(|&a, &b| rows[a].as_of_date == rows[b].as_of_date) {
            let date = rows[point[0]].as_of_date;
            let start = window_start(date, window_days);

            while hi < samples.len() && samples[hi].0 <= date {
                hi += 1;
            }
            while lo < hi && samples[lo].0 < start {
                lo += 1;
            }

            let peers = PeerPopulation::new(samples[lo..hi].iter().map(|&(_, v)| v).collect(), kind);
            for &i in point {
                scored[i] = peers.statistic_for(kind, sample(&rows[i]));
            }
        }
    }

    scored
}
