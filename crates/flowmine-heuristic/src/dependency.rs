//! Dependency-strength scoring over directly-follows counts.
//!
//! # Formula
//!
//! For a succession matrix `S`:
//!
//! ```text
//! dep[i][i] = S[i][i] / (S[i][i] + 1)                         self-loop, in [0, 1)
//! dep[i][j] = (S[i][j] - S[j][i]) / (S[i][j] + S[j][i] + 1)   i ≠ j, in (-1, 1)
//! ```
//!
//! The `+1` in each denominator damps pairs that were observed only a few
//! times: a single `A → B` observation scores 0.5, not 1.0.
//!
//! The two off-diagonal entries of a pair share a denominator, so the sign
//! of `dep[i][j]` tells which direction dominates.

use flowmine_core::{Matrix, SuccessionMatrix};
use tracing::instrument;

/// Dependency strengths derived once from a [`SuccessionMatrix`].
#[derive(Debug, Clone, PartialEq)]
pub struct DependencyMatrix {
    scores: Matrix<f64>,
}

impl DependencyMatrix {
    /// Score every cell of `succession`.
    #[must_use]
    #[instrument(skip(succession), fields(dim = succession.dim()))]
    pub fn build(succession: &SuccessionMatrix) -> Self {
        let scores = Matrix::from_fn(succession.dim(), |i, j| {
            if i == j {
                self_loop_score(succession.get(i, i))
            } else {
                pair_score(succession.get(i, j), succession.get(j, i))
            }
        });
        Self { scores }
    }

    /// Dependency strength of `row → column`.
    #[must_use]
    pub fn get(&self, row: usize, column: usize) -> f64 {
        self.scores.get(row, column)
    }

    #[must_use]
    pub const fn dim(&self) -> usize {
        self.scores.dim()
    }
}

#[allow(clippy::cast_precision_loss)]
fn self_loop_score(count: u64) -> f64 {
    let n = count as f64;
    n / (n + 1.0)
}

#[allow(clippy::cast_precision_loss)]
fn pair_score(forward: u64, backward: u64) -> f64 {
    let f = forward as f64;
    let b = backward as f64;
    (f - b) / (f + b + 1.0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
