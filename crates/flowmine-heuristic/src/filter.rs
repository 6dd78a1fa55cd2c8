//! Threshold filtering of the dependency graph.
//!
//! An edge `i → j` survives iff
//!
//! ```text
//! S[i][j] >= min_frequency  AND  dep[i][j] >= dependency_threshold
//! ```
//!
//! Surviving cells keep their succession count; everything else becomes 0.
//! The filter is elementwise and pure, so running it again over its own
//! output with the same parameters reproduces that output.

use flowmine_core::{Matrix, MiningError, SuccessionMatrix};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::dependency::DependencyMatrix;

// ---------------------------------------------------------------------------
// HeuristicParams
// ---------------------------------------------------------------------------

/// Per-invocation graph parameters, typically driven by UI sliders.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeuristicParams {
    /// Minimum node/edge occurrence count to stay visible.
    pub min_frequency: f64,
    /// Minimum dependency strength for an edge to stay visible.
    pub dependency_threshold: f64,
}

impl Default for HeuristicParams {
    fn default() -> Self {
        Self {
            min_frequency: 1.0,
            dependency_threshold: 0.5,
        }
    }
}

impl HeuristicParams {
    #[must_use]
    pub const fn new(min_frequency: f64, dependency_threshold: f64) -> Self {
        Self {
            min_frequency,
            dependency_threshold,
        }
    }

    /// Reject out-of-range parameters before any filtering happens.
    ///
    /// # Errors
    ///
    /// - [`MiningError::InvalidMinFrequency`] if `min_frequency` is negative
    ///   or not finite.
    /// - [`MiningError::InvalidDependencyThreshold`] if
    ///   `dependency_threshold` is outside `[0, 1]` or NaN.
    pub fn validate(&self) -> Result<(), MiningError> {
        if !self.min_frequency.is_finite() || self.min_frequency < 0.0 {
            return Err(MiningError::InvalidMinFrequency(self.min_frequency));
        }
        if !(0.0..=1.0).contains(&self.dependency_threshold) {
            return Err(MiningError::InvalidDependencyThreshold(
                self.dependency_threshold,
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FilteredGraph
// ---------------------------------------------------------------------------

/// Succession counts that cleared both thresholds; all other cells are 0.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredGraph {
    counts: SuccessionMatrix,
}

impl FilteredGraph {
    /// Apply both thresholds elementwise.
    ///
    /// Parameters are assumed valid; see [`HeuristicParams::validate`].
    #[must_use]
    #[instrument(skip(dependency, succession), fields(dim = succession.dim()))]
    #[allow(clippy::cast_precision_loss)]
    pub fn filter(
        dependency: &DependencyMatrix,
        succession: &SuccessionMatrix,
        params: HeuristicParams,
    ) -> Self {
        debug_assert_eq!(dependency.dim(), succession.dim());
        let counts = succession.map(|i, j, count| {
            let frequent = count as f64 >= params.min_frequency;
            let dependent = dependency.get(i, j) >= params.dependency_threshold;
            if frequent && dependent { count } else { 0 }
        });
        let graph = Self { counts };
        debug!(edges = graph.edge_count(), "filtered dependency graph");
        graph
    }

    /// Wrap an existing count matrix, e.g. to build fixtures.
    #[must_use]
    pub const fn from_counts(counts: SuccessionMatrix) -> Self {
        Self { counts }
    }

    #[must_use]
    pub const fn dim(&self) -> usize {
        self.counts.dim()
    }

    /// Surviving count for `row → column`, or 0.
    #[must_use]
    pub fn get(&self, row: usize, column: usize) -> u64 {
        self.counts.get(row, column)
    }

    /// The surviving counts as a matrix of the succession shape.
    #[must_use]
    pub const fn counts(&self) -> &Matrix<u64> {
        &self.counts
    }

    /// Nonzero cells as `(source, target, count)` in row-major order.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize, u64)> + '_ {
        self.counts.cells().filter(|&(_, _, count)| count != 0)
    }

    /// Number of nonzero cells, self-loops included.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges().count()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
