//! Dense and sparse representation matrices.
//!
//! Rows are features, columns are planning units. The canonical form used
//! throughout the pipeline is [`SparseMatrix`] after [`SparseMatrix::canonicalize`]:
//! triplets sorted column-major, duplicate positions summed, exact zeros
//! dropped. Non-finite values are deliberately retained so that validation
//! can report them.

use serde::{Deserialize, Serialize};

use crate::error::ReserveError;

/// A row-major dense matrix.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DenseMatrix {
    pub nrow: usize,
    pub ncol: usize,
    /// `nrow * ncol` values, row-major.
    pub values: Vec<f64>,
}

impl DenseMatrix {
    /// Creates a dense matrix, checking that the value count matches the shape.
    pub fn new(nrow: usize, ncol: usize, values: Vec<f64>) -> Result<Self, ReserveError> {
        if values.len() != nrow.saturating_mul(ncol) {
            return Err(ReserveError::dimension(
                "dense matrix values",
                nrow.saturating_mul(ncol),
                values.len(),
            ));
        }
        Ok(Self { nrow, ncol, values })
    }

    /// Builds a dense matrix from a slice of equally sized rows.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, ReserveError> {
        let ncol = rows.first().map_or(0, Vec::len);
        let mut values = Vec::with_capacity(rows.len() * ncol);
        for row in rows {
            if row.len() != ncol {
                return Err(ReserveError::dimension("dense matrix row", ncol, row.len()));
            }
            values.extend_from_slice(row);
        }
        Ok(Self {
            nrow: rows.len(),
            ncol,
            values,
        })
    }

    /// Returns the value at `(row, col)`.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.ncol + col]
    }
}

/// A sparse matrix in triplet (coordinate) form with 0-based offsets.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseMatrix {
    pub nrow: usize,
    pub ncol: usize,
    /// Row offsets of the stored values.
    pub rows: Vec<usize>,
    /// Column offsets of the stored values.
    pub cols: Vec<usize>,
    /// Stored values.
    pub values: Vec<f64>,
    /// Optional per-value labels; stripped on canonicalization.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
}

impl SparseMatrix {
    /// Creates an empty matrix with the given extents.
    pub fn new(nrow: usize, ncol: usize) -> Self {
        Self {
            nrow,
            ncol,
            ..Default::default()
        }
    }

    /// Creates a matrix from `(row, col, value)` triplets without canonicalizing.
    pub fn from_triplets(
        nrow: usize,
        ncol: usize,
        triplets: impl IntoIterator<Item = (usize, usize, f64)>,
    ) -> Self {
        let mut matrix = Self::new(nrow, ncol);
        for (row, col, value) in triplets {
            matrix.push(row, col, value);
        }
        matrix
    }

    /// Appends a triplet.
    pub fn push(&mut self, row: usize, col: usize, value: f64) {
        self.rows.push(row);
        self.cols.push(col);
        self.values.push(value);
    }

    /// Number of stored values.
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Iterates over the stored `(row, col, value)` triplets.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.rows
            .iter()
            .zip(&self.cols)
            .zip(&self.values)
            .map(|((&r, &c), &v)| (r, c, v))
    }

    /// Returns the first stored `(row, col)` that lies outside the declared
    /// extents, if any.
    pub fn out_of_bounds(&self) -> Option<(usize, usize)> {
        self.rows
            .iter()
            .zip(&self.cols)
            .map(|(&r, &c)| (r, c))
            .find(|&(r, c)| r >= self.nrow || c >= self.ncol)
    }

    /// Returns the value stored at `(row, col)`, or 0 if absent.
    ///
    /// Duplicate positions are summed, so this works before canonicalization.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.iter()
            .filter(|&(r, c, _)| r == row && c == col)
            .map(|(_, _, v)| v)
            .sum()
    }

    /// Returns the canonical form: column-major order, duplicates summed,
    /// exact zeros dropped, labels stripped.
    pub fn canonicalize(self) -> Self {
        let Self {
            nrow,
            ncol,
            rows,
            cols,
            values,
            ..
        } = self;

        let mut triplets: Vec<(usize, usize, f64)> = rows
            .into_iter()
            .zip(cols)
            .zip(values)
            .map(|((r, c), v)| (r, c, v))
            .collect();
        triplets.sort_by_key(|&(r, c, _)| (c, r));

        let mut out = Self::new(nrow, ncol);
        for (row, col, value) in triplets {
            let last = out.values.len();
            if last > 0 && out.rows[last - 1] == row && out.cols[last - 1] == col {
                out.values[last - 1] += value;
            } else {
                out.push(row, col, value);
            }
        }

        // NaN compares unequal to zero and therefore survives
        let mut kept = Self::new(nrow, ncol);
        for (row, col, value) in out.iter() {
            if value != 0.0 {
                kept.push(row, col, value);
            }
        }
        kept
    }

    /// Per-row totals (total representation of each feature).
    pub fn row_sums(&self) -> Vec<f64> {
        let mut sums = vec![0.0; self.nrow];
        for (row, _, value) in self.iter() {
            if let Some(sum) = sums.get_mut(row) {
                *sum += value;
            }
        }
        sums
    }

    /// Keeps only the columns whose flag in `keep` is true, renumbering the
    /// surviving columns consecutively. The row count is unchanged.
    pub fn select_columns(&self, keep: &[bool]) -> Self {
        let mut new_index = Vec::with_capacity(keep.len());
        let mut next = 0usize;
        for &k in keep {
            if k {
                new_index.push(Some(next));
                next += 1;
            } else {
                new_index.push(None);
            }
        }

        let mut out = Self::new(self.nrow, next);
        for (row, col, value) in self.iter() {
            if let Some(Some(new_col)) = new_index.get(col) {
                out.push(row, *new_col, value);
            }
        }
        out
    }

    /// Converts to a dense matrix. Intended for inspection of small models.
    pub fn to_dense(&self) -> DenseMatrix {
        let mut values = vec![0.0; self.nrow * self.ncol];
        for (row, col, value) in self.iter() {
            values[row * self.ncol + col] += value;
        }
        DenseMatrix {
            nrow: self.nrow,
            ncol: self.ncol,
            values,
        }
    }
}
