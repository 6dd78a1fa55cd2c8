//! Dense square matrices indexed by event position.
//!
//! Every matrix in the mining pipeline (succession counts, dependency
//! scores, filtered graphs) shares one shape: `n × n` where `n` is the
//! number of events in the [`EventIndex`](super::EventIndex). Storage is a
//! flat row-major `Vec<T>`.

use serde::{Serialize, Serializer};

use crate::error::MiningError;

/// A dense `dim × dim` matrix stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix<T> {
    dim: usize,
    cells: Vec<T>,
}

impl<T: Copy> Matrix<T> {
    /// Build a matrix from nested rows.
    ///
    /// # Errors
    ///
    /// Returns [`MiningError::ShapeMismatch`] if any row length differs
    /// from the number of rows.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Self, MiningError> {
        let dim = rows.len();
        let mut cells = Vec::with_capacity(dim * dim);
        for row in rows {
            if row.len() != dim {
                return Err(MiningError::ShapeMismatch {
                    rows: dim,
                    columns: row.len(),
                    expected: dim,
                });
            }
            cells.extend(row);
        }
        Ok(Self { dim, cells })
    }

    /// Build a matrix by evaluating `f(row, column)` for every cell.
    pub fn from_fn(dim: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut cells = Vec::with_capacity(dim * dim);
        for i in 0..dim {
            for j in 0..dim {
                cells.push(f(i, j));
            }
        }
        Self { dim, cells }
    }

    /// Number of rows (equal to the number of columns).
    #[must_use]
    pub const fn dim(&self) -> usize {
        self.dim
    }

    /// Value at `(row, column)`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    #[must_use]
    pub fn get(&self, row: usize, column: usize) -> T {
        assert!(row < self.dim && column < self.dim, "matrix index out of bounds");
        self.cells[row * self.dim + column]
    }

    /// Borrow one row.
    #[must_use]
    pub fn row(&self, row: usize) -> &[T] {
        &self.cells[row * self.dim..(row + 1) * self.dim]
    }

    /// Iterate over `(row, column, value)` in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, T)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(|(k, &v)| (k / self.dim, k % self.dim, v))
    }

    /// Apply `f` to every cell, keeping the shape.
    #[must_use]
    pub fn map<U: Copy>(&self, mut f: impl FnMut(usize, usize, T) -> U) -> Matrix<U> {
        Matrix::from_fn(self.dim, |i, j| f(i, j, self.get(i, j)))
    }

    /// Copy the matrix back out into nested rows.
    #[must_use]
    pub fn to_rows(&self) -> Vec<Vec<T>> {
        (0..self.dim).map(|i| self.row(i).to_vec()).collect()
    }
}

impl<T: Copy + Serialize> Serialize for Matrix<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_rows().serialize(serializer)
    }
}

/// Directly-follows counts: `M[i][j]` is how often event `i` was
/// immediately followed by event `j`.
pub type SuccessionMatrix = Matrix<u64>;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_rows_accepts_square_input() {
        let m = Matrix::from_rows(vec![vec![1_u64, 2], vec![3, 4]]).expect("square");
        assert_eq!(m.dim(), 2);
        assert_eq!(m.get(0, 1), 2);
        assert_eq!(m.get(1, 0), 3);
        assert_eq!(m.row(1), &[3, 4]);
    }

    #[test]
    fn from_rows_rejects_ragged_input() {
        let err = Matrix::from_rows(vec![vec![1_u64, 2], vec![3]]).expect_err("ragged");
        assert!(matches!(
            err,
            MiningError::ShapeMismatch {
                rows: 2,
                columns: 1,
                expected: 2
            }
        ));
    }

    #[test]
    fn from_rows_rejects_wide_input() {
        let err = Matrix::from_rows(vec![vec![1_u64, 2, 3]]).expect_err("not square");
        assert!(matches!(err, MiningError::ShapeMismatch { columns: 3, .. }));
    }

    #[test]
    fn empty_matrix_is_valid() {
        let m = Matrix::<u64>::from_rows(Vec::new()).expect("empty");
        assert_eq!(m.dim(), 0);
        assert_eq!(m.cells().count(), 0);
    }

    #[test]
    fn cells_are_row_major() {
        let m = Matrix::from_fn(2, |i, j| i * 10 + j);
        let cells: Vec<_> = m.cells().collect();
        assert_eq!(cells, vec![(0, 0, 0), (0, 1, 1), (1, 0, 10), (1, 1, 11)]);
    }

    #[test]
    fn serializes_as_nested_rows() {
        let m = Matrix::from_rows(vec![vec![0_u64, 5], vec![1, 0]]).expect("square");
        let json = serde_json::to_string(&m).expect("serialize");
        assert_eq!(json, "[[0,5],[1,0]]");
    }
}
