//! Density-based bucketing of magnitudes.
//!
//! # Algorithm
//!
//! 1. Take the sorted distinct finite magnitudes `v₀ < v₁ < … < vₙ₋₁`.
//! 2. Min-max normalise them into `[0, 1]`.
//! 3. Choose `k = min(n, max_clusters)` buckets. The `k - 1` widest gaps
//!    between neighbouring normalised values are the lowest-density regions
//!    of the distribution; cut there. Equal gaps are cut left to right.
//! 4. Bucket `b ∈ 0..k` scores `score_min + (score_max - score_min) · b / (k - 1)`.
//!    A single bucket scores `score_min`.
//!
//! Buckets are contiguous runs of the sorted values, so scores are
//! non-decreasing in magnitude. No randomness is involved; refitting is
//! deterministic.

use flowmine_core::MiningError;
use flowmine_core::config::ScaleConfig;
use tracing::{instrument, trace};

use super::{ScaleStrategy, ScaleTable, bound_score, distinct_sorted};

/// Gap-based density clustering into at most `max_clusters` buckets.
#[derive(Debug, Clone, PartialEq)]
pub struct DensityBuckets {
    pub max_clusters: usize,
    pub score_min: f64,
    pub score_max: f64,
}

impl Default for DensityBuckets {
    fn default() -> Self {
        let config = ScaleConfig::default();
        Self {
            max_clusters: config.max_clusters,
            score_min: config.score_min,
            score_max: config.score_max,
        }
    }
}

impl DensityBuckets {
    /// Strategy with the bucket cap and score range of `config`.
    ///
    /// # Errors
    ///
    /// Returns [`MiningError::InvalidScaleBounds`] if the score range is
    /// inverted or not finite.
    pub fn from_config(config: &ScaleConfig) -> Result<Self, MiningError> {
        config.validate()?;
        Ok(Self {
            max_clusters: config.max_clusters.max(1),
            score_min: config.score_min,
            score_max: config.score_max,
        })
    }

    /// Bucket index for each sorted distinct value.
    fn assign_buckets(&self, values: &[f64]) -> Vec<usize> {
        let n = values.len();
        let k = n.min(self.max_clusters).max(1);
        if n <= 1 || k == 1 {
            return vec![0; n];
        }

        let lo = values[0];
        let span = values[n - 1] - lo;
        let normalised: Vec<f64> = values.iter().map(|v| (v - lo) / span).collect();

        // (gap width, index of the value right after the gap)
        let mut gaps: Vec<(f64, usize)> = normalised
            .windows(2)
            .enumerate()
            .map(|(i, pair)| (pair[1] - pair[0], i + 1))
            .collect();
        gaps.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)));

        let mut cuts: Vec<usize> = gaps.iter().take(k - 1).map(|&(_, at)| at).collect();
        cuts.sort_unstable();
        trace!(?cuts, k, "density bucket cuts");

        let mut buckets = Vec::with_capacity(n);
        let mut bucket = 0;
        for i in 0..n {
            while bucket < cuts.len() && cuts[bucket] <= i {
                bucket += 1;
            }
            buckets.push(bucket);
        }
        buckets
    }

    #[allow(clippy::cast_precision_loss)]
    fn score(&self, bucket: usize, bucket_count: usize) -> f64 {
        if bucket_count <= 1 {
            return self.score_min;
        }
        let t = bucket as f64 / (bucket_count - 1) as f64;
        let score = (self.score_max - self.score_min).mul_add(t, self.score_min);
        bound_score(score, self.score_min, self.score_max)
    }
}

impl ScaleStrategy for DensityBuckets {
    #[instrument(skip_all, fields(magnitudes = magnitudes.len()))]
    fn fit(&self, magnitudes: &[f64]) -> ScaleTable {
        let values = distinct_sorted(magnitudes);
        let buckets = self.assign_buckets(&values);
        let bucket_count = buckets.last().map_or(0, |&b| b + 1);

        let pairs = values
            .into_iter()
            .zip(buckets)
            .map(|(value, bucket)| (value, self.score(bucket, bucket_count)))
            .collect();
        ScaleTable::from_pairs(pairs)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_approx_eq(actual: f64, expected: f64) {
        let tolerance = 1e-10;
        assert!(
            (actual - expected).abs() <= tolerance,
            "actual ({actual}) != expected ({expected})"
        );
    }

    #[test]
    fn empty_input_fits_empty_table() {
        let table = DensityBuckets::default().fit(&[]);
        assert!(table.is_empty());
    }

    #[test]
    fn single_value_scores_minimum() {
        let table = DensityBuckets::default().fit(&[7.0, 7.0]);
        assert_eq!(table.len(), 1);
        assert_approx_eq(table.lookup(7.0).expect("seen"), 0.1);
    }

    #[test]
    fn few_values_get_one_bucket_each() {
        let table = DensityBuckets::default().fit(&[0.0, 5.0, 10.0]);
        assert_approx_eq(table.lookup(0.0).expect("seen"), 0.1);
        assert_approx_eq(table.lookup(5.0).expect("seen"), 0.295);
        assert_approx_eq(table.lookup(10.0).expect("seen"), 0.49);
    }

    #[test]
    fn dense_runs_share_a_bucket() {
        let strategy = DensityBuckets {
            max_clusters: 2,
            ..DensityBuckets::default()
        };
        let table = strategy.fit(&[1.0, 2.0, 3.0, 100.0, 101.0]);
        assert_approx_eq(table.lookup(1.0).expect("seen"), 0.1);
        assert_approx_eq(table.lookup(3.0).expect("seen"), 0.1);
        assert_approx_eq(table.lookup(100.0).expect("seen"), 0.49);
        assert_approx_eq(table.lookup(101.0).expect("seen"), 0.49);
    }

    #[test]
    fn bucket_count_is_capped() {
        let magnitudes: Vec<f64> = (0..50).map(|i| f64::from(i * i)).collect();
        let table = DensityBuckets::default().fit(&magnitudes);
        let mut distinct: Vec<f64> = table.scores().to_vec();
        distinct.dedup();
        assert_eq!(distinct.len(), 8);
        assert_approx_eq(table.scores()[0], 0.1);
        assert_approx_eq(*table.scores().last().expect("non-empty"), 0.49);
    }

    #[test]
    fn scores_are_monotone() {
        let magnitudes = [3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0, 5.0, 3.0, 58.0, 97.0];
        let table = DensityBuckets::default().fit(&magnitudes);
        assert!(table.scores().windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn from_config_rejects_bad_bounds() {
        let inverted = ScaleConfig {
            score_min: 0.5,
            score_max: 0.2,
            ..ScaleConfig::default()
        };
        let err = DensityBuckets::from_config(&inverted).expect_err("inverted");
        assert!(matches!(err, MiningError::InvalidScaleBounds { .. }));

        let nan = ScaleConfig {
            score_min: f64::NAN,
            ..ScaleConfig::default()
        };
        assert!(DensityBuckets::from_config(&nan).is_err());
    }

    #[test]
    fn hand_built_bad_bounds_do_not_panic() {
        let strategy = DensityBuckets {
            max_clusters: 8,
            score_min: f64::NAN,
            score_max: 0.2,
        };
        let table = strategy.fit(&[1.0, 2.0, 3.0]);
        assert_eq!(table.len(), 3);

        let inverted = DensityBuckets {
            score_min: 0.5,
            score_max: 0.2,
            ..DensityBuckets::default()
        };
        assert_eq!(inverted.fit(&[1.0, 2.0]).len(), 2);
    }

    #[test]
    fn equal_gaps_cut_left_to_right() {
        let strategy = DensityBuckets {
            max_clusters: 2,
            ..DensityBuckets::default()
        };
        let table = strategy.fit(&[0.0, 1.0, 2.0]);
        assert_approx_eq(table.lookup(0.0).expect("seen"), 0.1);
        assert_approx_eq(table.lookup(1.0).expect("seen"), 0.49);
        assert_approx_eq(table.lookup(2.0).expect("seen"), 0.49);
    }
}
