//! Frequency-to-visual-scale mapping.
//!
//! # Overview
//!
//! Edge thickness is driven by how often a directly-follows relation was
//! observed. Raw counts span orders of magnitude, so they are first bucketed
//! by a [`ScaleStrategy`] into a small number of bounded scale scores.
//!
//! The engine only relies on the contract:
//!
//! - every distinct fitted magnitude gets exactly one score,
//! - larger magnitudes never get smaller scores,
//! - fitting the same magnitudes twice gives the same table.
//!
//! [`DensityBuckets`] is the default strategy. [`LinearScale`] is a simpler
//! alternative that spreads magnitudes proportionally over the score range.

pub mod density;
pub mod linear;

pub use density::DensityBuckets;
pub use linear::LinearScale;

use std::cmp::Ordering;

use flowmine_core::MiningError;

/// Buckets a set of magnitudes into monotone scale scores.
pub trait ScaleStrategy {
    /// Fit a scale table over `magnitudes`. Duplicates and non-finite values
    /// are ignored.
    fn fit(&self, magnitudes: &[f64]) -> ScaleTable;
}

/// Sorted distinct magnitudes paired with their scale scores.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScaleTable {
    values: Vec<f64>,
    scores: Vec<f64>,
}

impl ScaleTable {
    /// Build a table from `(magnitude, score)` pairs.
    ///
    /// Pairs are sorted by magnitude; for repeated magnitudes the first pair
    /// wins. Non-finite magnitudes are dropped.
    #[must_use]
    pub fn from_pairs(mut pairs: Vec<(f64, f64)>) -> Self {
        pairs.retain(|(value, _)| value.is_finite());
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
        pairs.dedup_by(|later, earlier| later.0.total_cmp(&earlier.0) == Ordering::Equal);
        let (values, scores) = pairs.into_iter().unzip();
        Self { values, scores }
    }

    /// Scale score for a magnitude that was present at fit time.
    ///
    /// # Errors
    ///
    /// Returns [`MiningError::NotFound`] for a magnitude the table was not
    /// fitted on.
    pub fn lookup(&self, value: f64) -> Result<f64, MiningError> {
        self.values
            .binary_search_by(|probe| probe.total_cmp(&value))
            .map(|i| self.scores[i])
            .map_err(|_| MiningError::NotFound { magnitude: value })
    }

    /// Fitted magnitudes in ascending order.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Scores aligned with [`Self::values`].
    #[must_use]
    pub fn scores(&self) -> &[f64] {
        &self.scores
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Sorted, deduplicated, finite copy of `magnitudes`.
pub(crate) fn distinct_sorted(magnitudes: &[f64]) -> Vec<f64> {
    let mut values: Vec<f64> = magnitudes.iter().copied().filter(|v| v.is_finite()).collect();
    values.sort_by(f64::total_cmp);
    values.dedup_by(|a, b| a.total_cmp(b) == Ordering::Equal);
    values
}

/// Confine `score` to `[lo, hi]` without panicking on inverted or NaN bounds.
pub(crate) fn bound_score(score: f64, lo: f64, hi: f64) -> f64 {
    score.max(lo).min(hi)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
