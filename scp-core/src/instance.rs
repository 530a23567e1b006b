//! Sparse set-covering instance.
//!
//! Rows are the elements to cover and columns are the candidate sets. The
//! 0/1 incidence is stored twice, once compressed by row (CSR, row → the
//! columns covering it) and once compressed by column (CSC, column → the
//! rows it covers). The drivers alternate between per-row multiplier
//! updates and per-column reduced-cost sums, so both directions must be
//! O(1) to reach.

use sprs::{CsMat, TriMat};

use crate::error::{ScpError, ScpResult};

/// Immutable set-covering instance.
#[derive(Debug, Clone)]
pub struct ScpInstance {
    /// Cost per column (length `num_cols`).
    costs: Vec<u32>,

    /// Row-major incidence (num_rows × num_cols).
    by_row: CsMat<f64>,

    /// Column-major incidence (num_rows × num_cols).
    by_col: CsMat<f64>,
}

impl ScpInstance {
    /// Build an instance from row-wise incidence lists.
    ///
    /// `rows[r]` lists the 0-based columns covering row `r`. Duplicate
    /// entries collapse into one.
    ///
    /// # Errors
    ///
    /// `InvalidInstance` if either dimension is zero, the cost vector has
    /// the wrong length, an index is out of range, or some row is covered
    /// by no column.
    pub fn new(
        num_rows: usize,
        num_cols: usize,
        costs: Vec<u32>,
        rows: &[Vec<usize>],
    ) -> ScpResult<Self> {
        if num_rows == 0 || num_cols == 0 {
            return Err(ScpError::InvalidInstance(format!(
                "dimensions must be positive, got {}×{}",
                num_rows, num_cols
            )));
        }
        if costs.len() != num_cols {
            return Err(ScpError::InvalidInstance(format!(
                "cost vector has length {}, expected {}",
                costs.len(),
                num_cols
            )));
        }
        if rows.len() != num_rows {
            return Err(ScpError::InvalidInstance(format!(
                "incidence has {} rows, expected {}",
                rows.len(),
                num_rows
            )));
        }

        let mut tri = TriMat::new((num_rows, num_cols));
        for (row, cols) in rows.iter().enumerate() {
            if cols.is_empty() {
                return Err(ScpError::InvalidInstance(format!(
                    "row {} is not covered by any column",
                    row
                )));
            }
            for &col in cols {
                if col >= num_cols {
                    return Err(ScpError::InvalidInstance(format!(
                        "row {} references column {} (num_cols={})",
                        row, col, num_cols
                    )));
                }
                tri.add_triplet(row, col, 1.0);
            }
        }

        let by_row: CsMat<f64> = tri.to_csr();
        let by_col: CsMat<f64> = tri.to_csc();

        Ok(Self { costs, by_row, by_col })
    }

    /// Number of rows (elements to cover).
    pub fn num_rows(&self) -> usize {
        self.by_row.rows()
    }

    /// Number of columns (candidate sets).
    pub fn num_cols(&self) -> usize {
        self.by_row.cols()
    }

    /// Number of distinct (row, column) incidences.
    pub fn num_nonzeros(&self) -> usize {
        self.by_row.nnz()
    }

    /// Cost of column `col`.
    pub fn cost(&self, col: usize) -> u32 {
        self.costs[col]
    }

    /// Cost vector.
    pub fn costs(&self) -> &[u32] {
        &self.costs
    }

    /// Columns covering row `row`, in increasing order.
    pub fn cols_of_row(&self, row: usize) -> &[usize] {
        outer_slice(&self.by_row, row)
    }

    /// Rows covered by column `col`, in increasing order.
    pub fn rows_of_col(&self, col: usize) -> &[usize] {
        outer_slice(&self.by_col, col)
    }

    /// Number of rows covered by column `col`.
    pub fn col_size(&self, col: usize) -> usize {
        self.rows_of_col(col).len()
    }

    /// Number of columns covering row `row`.
    pub fn row_size(&self, row: usize) -> usize {
        self.cols_of_row(row).len()
    }
}

/// Inner indices of outer slot `i` of a compressed matrix.
fn outer_slice(mat: &CsMat<f64>, i: usize) -> &[usize] {
    let range = mat.indptr().outer_inds_sz(i);
    &mat.indices()[range]
}
