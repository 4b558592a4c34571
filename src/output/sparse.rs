use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::output::DenseMatrix;

/// Sparse matrix holding only non-zero cells, ordered by `(row, col)`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseMatrix {
    rows: usize,
    cols: usize,
    cells: BTreeMap<(usize, usize), f64>,
}

impl SparseMatrix {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: BTreeMap::new(),
        }
    }

    /// Discards the content and reshapes to an all-zero `rows` x `cols` matrix.
    pub fn reset(&mut self, rows: usize, cols: usize) {
        self.rows = rows;
        self.cols = cols;
        self.cells.clear();
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of stored non-zero cells.
    #[inline]
    pub fn nnz(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.cells.get(&(row, col)).copied().unwrap_or(0.0)
    }

    /// Writes a cell. Writing zero removes it.
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        assert!(row < self.rows && col < self.cols, "index out of bounds");
        if value == 0.0 {
            self.cells.remove(&(row, col));
        } else {
            self.cells.insert((row, col), value);
        }
    }

    /// Adds `value` to a cell.
    pub fn add(&mut self, row: usize, col: usize, value: f64) {
        let current = self.get(row, col);
        self.set(row, col, current + value);
    }

    /// Iterates over non-zero cells as `(row, col, value)`.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.cells.iter().map(|(&(r, c), &v)| (r, c, v))
    }

    pub fn to_dense(&self) -> DenseMatrix {
        let mut dense = DenseMatrix::zeros(self.rows, self.cols);
        for (r, c, v) in self.iter() {
            dense[(r, c)] = v;
        }
        dense
    }
}
