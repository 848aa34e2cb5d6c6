//! Summary statistics over one trailing-window peer sub-population.
use crate::report::WindowedStatistic;
use core_types::StatisticKind;

/// Consistency constant that puts MAD scores on the z-score scale.
pub const MAD_SCALE: f64 = 0.6745;

/// The admitted values of one (date, segment) evaluation point.
pub(crate) struct PeerPopulation {
    /// Values in date order, then input order within a date.
    values: Vec<f64>,
    sorted: Vec<f64>,
}

impl PeerPopulation {
    pub(crate) fn new(values: Vec<f64>, kind: StatisticKind) -> Self {
        let sorted = match kind {
            StatisticKind::ZScore => Vec::new(),
            StatisticKind::Percentile | StatisticKind::Mad => {
                let mut sorted = values.clone();
                sorted.sort_by(f64::total_cmp);
                sorted
            }
        };
        Self { values, sorted }
    }

    pub(crate) fn len(&self) -> usize {
        self.values.len()
    }

    /// Statistic for a row at this evaluation point; `value` is `None` when the
    /// row's own value was not admitted.
    pub(crate) fn statistic_for(&self, kind: StatisticKind, value: Option<f64>) -> WindowedStatistic {
        match kind {
            StatisticKind::ZScore => self.zscore(value),
            StatisticKind::Percentile => match value {
                Some(v) => self.percentile(v),
                None => WindowedStatistic::empty(kind),
            },
            StatisticKind::Mad => match value {
                Some(v) => self.mad(v),
                None => WindowedStatistic::empty(kind),
            },
        }
    }

    fn zscore(&self, value: Option<f64>) -> WindowedStatistic {
        let n = self.len();
        let population = (n > 0).then_some(n);
        let Some((mean, std)) = mean_std(&self.values) else {
            return WindowedStatistic::ZScore {
                mean: None,
                std: None,
                zscore: None,
                population,
            };
        };
        let zscore = value.filter(|_| std > 0.0).map(|v| (v - mean) / std);
        WindowedStatistic::ZScore {
            mean: Some(mean),
            std: Some(std),
            zscore,
            population,
        }
    }

    fn percentile(&self, value: f64) -> WindowedStatistic {
        WindowedStatistic::Percentile {
            percentile: mid_rank_percentile(&self.sorted, value),
            population: Some(self.len()),
            median: quantile(&self.sorted, 0.5),
            p10: quantile(&self.sorted, 0.1),
            p90: quantile(&self.sorted, 0.9),
        }
    }

    fn mad(&self, value: f64) -> WindowedStatistic {
        let median = quantile(&self.sorted, 0.5);
        let mad = median.and_then(|m| {
            let mut deviations: Vec<f64> = self.sorted.iter().map(|x| (x - m).abs()).collect();
            deviations.sort_by(f64::total_cmp);
            quantile(&deviations, 0.5)
        });
        let mad_score = match (median, mad) {
            (Some(m), Some(d)) if d > 0.0 => Some(MAD_SCALE * (value - m) / d),
            _ => None,
        };
        WindowedStatistic::Mad {
            median,
            mad,
            mad_score,
            population: Some(self.len()),
        }
    }
}

/// Mean and sample standard deviation; `None` below two members.
pub fn mean_std(values: &[f64]) -> Option<(f64, f64)> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    let sum_sq: f64 = values.iter().map(|x| (x - mean).powi(2)).sum();
    Some((mean, (sum_sq / (n - 1) as f64).sqrt()))
}

/// Mid-rank percentile of `value` within `sorted`, on a 0-100 scale.
///
/// Ties share the average of their ranks and every rank is offset by half a
/// step, so a single-member population yields 50.
pub fn mid_rank_percentile(sorted: &[f64], value: f64) -> Option<f64> {
    let n = sorted.len();
    if n == 0 {
        return None;
    }
    let below = sorted.partition_point(|x| *x < value);
    let at_or_below = sorted.partition_point(|x| *x <= value);
    let tied = (at_or_below - below) as f64;
    // A value outside the population still ranks as if it were a member.
    let tied = tied.max(1.0);
    Some((below as f64 + (tied - 1.0) / 2.0 + 0.5) / n as f64 * 100.0)
}

/// Linearly interpolated quantile of an ascending slice.
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    match sorted.len() {
        0 => None,
        1 => Some(sorted[0]),
        n => {
            let position = q.clamp(0.0, 1.0) * (n - 1) as f64;
            let lower = position.floor() as usize;
            let upper = position.ceil() as usize;
            let weight = position - lower as f64;
            Some(sorted[lower] + (sorted[upper] - sorted[lower]) * weight)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_mean_std_is_sample_statistic() {
        let (mean, std) = mean_std(&[10.0, 15.0, 100.0]).unwrap();
        assert_abs_diff_eq!(mean, 125.0 / 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(std, 50.579_969_685, epsilon = 1e-6);
        assert!(mean_std(&[4.0]).is_none());
    }

    #[test]
    fn test_mid_rank_percentile_with_ties() {
        let sorted = [1.0, 2.0, 2.0, 3.0];
        // below = 1, tied = 2 -> (1 + 0.5 + 0.5) / 4
        assert_abs_diff_eq!(mid_rank_percentile(&sorted, 2.0).unwrap(), 50.0);
        assert_abs_diff_eq!(mid_rank_percentile(&sorted, 3.0).unwrap(), 87.5);
        assert_abs_diff_eq!(mid_rank_percentile(&sorted, 1.0).unwrap(), 12.5);
        assert_abs_diff_eq!(mid_rank_percentile(&[7.0], 7.0).unwrap(), 50.0);
        assert_eq!(mid_rank_percentile(&[], 7.0), None);
    }

    #[test]
    fn test_quantile_interpolates() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_abs_diff_eq!(quantile(&sorted, 0.5).unwrap(), 2.5);
        assert_abs_diff_eq!(quantile(&sorted, 0.0).unwrap(), 1.0);
        assert_abs_diff_eq!(quantile(&sorted, 1.0).unwrap(), 4.0);
    }

    #[test]
    fn test_mad_score_null_when_spread_is_zero() {
        let peers = PeerPopulation::new(vec![5.0, 5.0, 5.0, 9.0], StatisticKind::Mad);
        let stat = peers.statistic_for(StatisticKind::Mad, Some(9.0));
        assert_eq!(stat.peer_center(), Some(5.0));
        assert_eq!(stat.peer_spread(), Some(0.0));
        assert_eq!(stat.score(), None);
    }

    #[test]
    fn test_mad_score_scaled() {
        let peers = PeerPopulation::new(vec![1.0, 2.0, 3.0, 4.0, 100.0], StatisticKind::Mad);
        // median 3, deviations [2, 1, 0, 1, 97] -> MAD 1
        let stat = peers.statistic_for(StatisticKind::Mad, Some(100.0));
        assert_abs_diff_eq!(stat.score().unwrap(), MAD_SCALE * 97.0, epsilon = 1e-12);
        assert_eq!(stat.population(), Some(5));
    }
}
