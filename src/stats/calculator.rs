//! Statistics Calculator Module
//! Descriptive statistics, frequency tables, box statistics, correlations and Welch's t-test.

use crate::data::Restaurant;
use rayon::prelude::*;
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, StudentsT};
use std::collections::HashMap;

/// Significance threshold for t-test
pub const SIGNIFICANCE_THRESHOLD: f64 = 0.05;

/// Descriptive statistics for a sample.
#[derive(Debug, Clone, Serialize)]
pub struct DescriptiveStats {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub variance: f64,
    pub p95: f64,
    pub p05: f64,
    pub min: f64,
    pub max: f64,
}

impl Default for DescriptiveStats {
    fn default() -> Self {
        Self {
            count: 0,
            mean: f64::NAN,
            median: f64::NAN,
            std: f64::NAN,
            variance: f64::NAN,
            p95: f64::NAN,
            p05: f64::NAN,
            min: f64::NAN,
            max: f64::NAN,
        }
    }
}

/// One row of a frequency table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountEntry {
    pub label: String,
    pub count: usize,
}

/// Five-number summary plus mean and deviation, as drawn by a box plot.
#[derive(Debug, Clone, Serialize)]
pub struct BoxStats {
    pub label: String,
    pub count: usize,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub whisker_low: f64,
    pub whisker_high: f64,
    pub mean: f64,
    pub std: f64,
    pub outliers: Vec<f64>,
}

/// Equal-width histogram.
#[derive(Debug, Clone, Serialize)]
pub struct Histogram {
    pub min: f64,
    pub bin_width: f64,
    pub counts: Vec<usize>,
}

impl Histogram {
    /// Lower and upper edge of bin `i`.
    pub fn bin_edges(&self, i: usize) -> (f64, f64) {
        let lo = self.min + i as f64 * self.bin_width;
        (lo, lo + self.bin_width)
    }

    pub fn max(&self) -> f64 {
        self.min + self.counts.len() as f64 * self.bin_width
    }
}

/// Pairwise Pearson correlations. `None` where undefined.
#[derive(Debug, Clone, Serialize)]
pub struct CorrelationMatrix {
    pub labels: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

/// Handles statistical calculations with multi-threading support.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Compute descriptive statistics for an array of values.
    pub fn compute_descriptive_stats(values: &[f64]) -> DescriptiveStats {
        let n = values.len();
        if n == 0 {
            return DescriptiveStats::default();
        }

        let sorted = Self::sorted(values);

        let mean = values.iter().sum::<f64>() / n as f64;
        let median = Self::percentile(&sorted, 50.0);

        let variance = if n > 1 {
            values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64
        } else {
            0.0
        };

        DescriptiveStats {
            count: n,
            mean,
            median,
            std: variance.sqrt(),
            variance,
            p95: Self::percentile(&sorted, 95.0),
            p05: Self::percentile(&sorted, 5.0),
            min: sorted[0],
            max: sorted[n - 1],
        }
    }

    fn sorted(values: &[f64]) -> Vec<f64> {
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        sorted
    }

    /// Calculate percentile using linear interpolation (NumPy compatible).
    pub fn percentile(sorted_values: &[f64], p: f64) -> f64 {
        let n = sorted_values.len();
        if n == 0 {
            return f64::NAN;
        }
        if n == 1 {
            return sorted_values[0];
        }

        let rank = (p / 100.0) * (n - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = (rank.ceil() as usize).min(n - 1);
        let frac = rank - lower as f64;

        if lower == upper {
            sorted_values[lower]
        } else {
            sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
        }
    }

    /// Arithmetic mean, `None` for an empty sample.
    pub fn mean<I: IntoIterator<Item = f64>>(values: I) -> Option<f64> {
        let (sum, n) = values
            .into_iter()
            .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
        (n > 0).then(|| sum / n as f64)
    }

    /// Count occurrences and keep the `top_n` most frequent labels.
    ///
    /// Ties are broken alphabetically so the order is stable across runs.
    pub fn value_counts<I, S>(labels: I, top_n: Option<usize>) -> Vec<CountEntry>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for label in labels {
            *counts.entry(label.as_ref().to_string()).or_default() += 1;
        }

        let mut entries: Vec<CountEntry> = counts
            .into_iter()
            .map(|(label, count)| CountEntry { label, count })
            .collect();
        entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));

        if let Some(n) = top_n {
            entries.truncate(n);
        }
        entries
    }

    /// Box plot statistics with whiskers at 1.5 x IQR. Returns `None` for an empty sample.
    pub fn box_stats(label: &str, values: &[f64]) -> Option<BoxStats> {
        if values.is_empty() {
            return None;
        }
        let sorted = Self::sorted(values);
        let desc = Self::compute_descriptive_stats(values);

        let q1 = Self::percentile(&sorted, 25.0);
        let q3 = Self::percentile(&sorted, 75.0);
        let iqr = q3 - q1;
        let low_fence = q1 - 1.5 * iqr;
        let high_fence = q3 + 1.5 * iqr;

        let whisker_low = sorted
            .iter()
            .copied()
            .find(|&v| v >= low_fence)
            .unwrap_or(q1);
        let whisker_high = sorted
            .iter()
            .rev()
            .copied()
            .find(|&v| v <= high_fence)
            .unwrap_or(q3);
        let outliers = sorted
            .iter()
            .copied()
            .filter(|&v| v < low_fence || v > high_fence)
            .collect();

        Some(BoxStats {
            label: label.to_string(),
            count: values.len(),
            q1,
            median: desc.median,
            q3,
            whisker_low,
            whisker_high,
            mean: desc.mean,
            std: desc.std,
            outliers,
        })
    }

    /// Box statistics for several groups, computed in parallel. Empty groups are skipped.
    pub fn box_stats_parallel(groups: &[(String, Vec<f64>)]) -> Vec<BoxStats> {
        groups
            .par_iter()
            .filter_map(|(label, values)| Self::box_stats(label, values))
            .collect()
    }

    /// Equal-width histogram over the sample range.
    pub fn histogram(values: &[f64], bins: usize) -> Option<Histogram> {
        if values.is_empty() || bins == 0 {
            return None;
        }
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        let range = max - min;
        let (min, bin_width) = if range > f64::EPSILON {
            (min, range / bins as f64)
        } else {
            // Degenerate sample: a single bin centred on the value.
            (min - 0.05, 0.1)
        };
        let bins = if range > f64::EPSILON { bins } else { 1 };

        let mut counts = vec![0usize; bins];
        for &v in values {
            let idx = (((v - min) / bin_width).floor() as usize).min(bins - 1);
            counts[idx] += 1;
        }

        Some(Histogram {
            min,
            bin_width,
            counts,
        })
    }

    /// Pearson correlation over pairs where both values are present.
    pub fn pearson(pairs: &[(f64, f64)]) -> Option<f64> {
        let n = pairs.len();
        if n < 2 {
            return None;
        }
        let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n as f64;
        let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n as f64;

        let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
        for &(x, y) in pairs {
            let dx = x - mean_x;
            let dy = y - mean_y;
            cov += dx * dy;
            var_x += dx * dx;
            var_y += dy * dy;
        }

        if var_x <= 0.0 || var_y <= 0.0 {
            return None;
        }
        Some((cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0))
    }

    /// Correlation matrix over named numeric fields of the restaurants.
    pub fn correlation_matrix(
        rows: &[&Restaurant],
        fields: &[(&str, fn(&Restaurant) -> Option<f64>)],
    ) -> CorrelationMatrix {
        let values = fields
            .iter()
            .map(|(_, fx)| {
                fields
                    .iter()
                    .map(|(_, fy)| {
                        let pairs: Vec<(f64, f64)> = rows
                            .iter()
                            .filter_map(|r| Some((fx(r)?, fy(r)?)))
                            .collect();
                        Self::pearson(&pairs)
                    })
                    .collect()
            })
            .collect();

        CorrelationMatrix {
            labels: fields.iter().map(|(name, _)| name.to_string()).collect(),
            values,
        }
    }

    /// Perform Welch's t-test (independent samples, unequal variance).
    ///
    /// Returns `(p_value, is_significant)`; `p_value` is NaN when either sample has fewer than two values.
    pub fn perform_ttest(group_values: &[f64], control_values: &[f64]) -> (f64, bool) {
        let n1 = group_values.len() as f64;
        let n2 = control_values.len() as f64;

        if n1 < 2.0 || n2 < 2.0 {
            return (f64::NAN, false);
        }

        let mean1 = group_values.iter().sum::<f64>() / n1;
        let mean2 = control_values.iter().sum::<f64>() / n2;

        let var1 = group_values
            .iter()
            .map(|x| (x - mean1).powi(2))
            .sum::<f64>()
            / (n1 - 1.0);
        let var2 = control_values
            .iter()
            .map(|x| (x - mean2).powi(2))
            .sum::<f64>()
            / (n2 - 1.0);

        let se = (var1 / n1 + var2 / n2).sqrt();
        if se == 0.0 {
            return (1.0, false);
        }

        let t = (mean1 - mean2) / se;

        // Welch-Satterthwaite degrees of freedom
        let df_num = (var1 / n1 + var2 / n2).powi(2);
        let df_denom = (var1 / n1).powi(2) / (n1 - 1.0) + (var2 / n2).powi(2) / (n2 - 1.0);
        let df = df_num / df_denom;

        if let Ok(dist) = StudentsT::new(0.0, 1.0, df) {
            let p_value = 2.0 * (1.0 - dist.cdf(t.abs()));
            (p_value, p_value <= SIGNIFICANCE_THRESHOLD)
        } else {
            (f64::NAN, false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_descriptive_stats_basic() {
        let s = StatsCalculator::compute_descriptive_stats(&[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(s.count, 4);
        assert!(approx(s.mean, 2.5));
        assert!(approx(s.median, 2.5));
        assert!(approx(s.variance, 5.0 / 3.0));
        assert!(approx(s.min, 1.0));
        assert!(approx(s.max, 4.0));
        assert!(approx(s.p95, 3.85));
    }

    #[test]
    fn test_descriptive_stats_empty_is_nan() {
        let s = StatsCalculator::compute_descriptive_stats(&[]);
        assert_eq!(s.count, 0);
        assert!(s.mean.is_nan());
    }

    #[test]
    fn test_value_counts_orders_by_count_then_label() {
        let labels = ["BTM", "HSR", "BTM", "Whitefield", "HSR", "Arekere"];
        let counts = StatsCalculator::value_counts(labels, Some(3));
        let flat: Vec<(&str, usize)> = counts.iter().map(|c| (c.label.as_str(), c.count)).collect();
        assert_eq!(flat, vec![("BTM", 2), ("HSR", 2), ("Arekere", 1)]);
    }

    #[test]
    fn test_box_stats_whiskers_and_outliers() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 100.0];
        let b = StatsCalculator::box_stats("x", &values).unwrap();
        assert!(approx(b.q1, 2.25));
        assert!(approx(b.median, 3.5));
        assert!(approx(b.q3, 4.75));
        assert!(approx(b.whisker_low, 1.0));
        assert!(approx(b.whisker_high, 5.0));
        assert_eq!(b.outliers, vec![100.0]);
        assert!(StatsCalculator::box_stats("empty", &[]).is_none());
    }

    #[test]
    fn test_histogram_bins_cover_range() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        let h = StatsCalculator::histogram(&values, 4).unwrap();
        assert_eq!(h.counts.iter().sum::<usize>(), 5);
        assert!(approx(h.bin_width, 1.0));
        assert_eq!(h.counts, vec![1, 1, 1, 2]);
        assert!(approx(h.max(), 5.0));

        let flat = StatsCalculator::histogram(&[3.0, 3.0], 30).unwrap();
        assert_eq!(flat.counts, vec![2]);
        assert!(StatsCalculator::histogram(&[], 30).is_none());
    }

    #[test]
    fn test_pearson_perfect_and_undefined() {
        let up: Vec<(f64, f64)> = (0..5).map(|i| (i as f64, 2.0 * i as f64 + 1.0)).collect();
        assert!(approx(StatsCalculator::pearson(&up).unwrap(), 1.0));

        let down: Vec<(f64, f64)> = (0..5).map(|i| (i as f64, -(i as f64))).collect();
        assert!(approx(StatsCalculator::pearson(&down).unwrap(), -1.0));

        let flat = [(1.0, 2.0), (2.0, 2.0), (3.0, 2.0)];
        assert!(StatsCalculator::pearson(&flat).is_none());
        assert!(StatsCalculator::pearson(&[(1.0, 1.0)]).is_none());
    }

    #[test]
    fn test_correlation_matrix_uses_pairwise_rows() {
        let rows = vec![
            Restaurant {
                rate: Some(3.0),
                votes: Some(10.0),
                cost_for_two: Some(300.0),
                ..Default::default()
            },
            Restaurant {
                rate: Some(4.0),
                votes: Some(20.0),
                cost_for_two: None,
                ..Default::default()
            },
            Restaurant {
                rate: Some(5.0),
                votes: Some(30.0),
                cost_for_two: Some(100.0),
                ..Default::default()
            },
        ];
        let refs: Vec<&Restaurant> = rows.iter().collect();
        let m = StatsCalculator::correlation_matrix(
            &refs,
            &[
                ("rate", |r| r.rate),
                ("votes", |r| r.votes),
                ("cost", |r| r.cost_for_two),
            ],
        );
        assert_eq!(m.labels, vec!["rate", "votes", "cost"]);
        assert!(approx(m.values[0][1].unwrap(), 1.0));
        assert!(approx(m.values[0][2].unwrap(), -1.0));
        assert!(approx(m.values[2][2].unwrap(), 1.0));
    }

    #[test]
    fn test_ttest_detects_shift() {
        let a = [4.0, 4.1, 4.2, 4.3, 4.1, 4.2];
        let b = [3.0, 3.1, 3.2, 3.1, 3.0, 3.2];
        let (p, sig) = StatsCalculator::perform_ttest(&a, &b);
        assert!(p < 0.001);
        assert!(sig);

        let (p, sig) = StatsCalculator::perform_ttest(&a, &a);
        assert!(p > 0.9);
        assert!(!sig);

        let (p, sig) = StatsCalculator::perform_ttest(&[1.0], &b);
        assert!(p.is_nan());
        assert!(!sig);
    }

    #[test]
    fn test_mean_of_empty_is_none() {
        assert_eq!(StatsCalculator::mean(Vec::<f64>::new()), None);
        assert_eq!(StatsCalculator::mean(vec![1.0, 3.0]), Some(2.0));
    }
}
