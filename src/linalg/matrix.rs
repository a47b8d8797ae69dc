//! Dense row-major matrix with a bounded-condition-number SPD solver.

use crate::error::{ForecastError, Result};
use crate::linalg::Vector;

/// Cached Cholesky factorization state.
///
/// `d` holds the pivot diagonal and `l` the symmetric unit-triangular factor,
/// both empty when a zero pivot made the factorization abort. The sign flags
/// record which pivot classes were encountered.
#[derive(Debug, Clone)]
struct CholeskyFactors {
    d: Vec<f64>,
    l: Vec<f64>,
    zero_pivot: bool,
    #[allow(dead_code)]
    positive_pivot: bool,
    #[allow(dead_code)]
    negative_pivot: bool,
}

/// A dense row-major matrix.
///
/// Instances are created per linear system; the Cholesky factorization is
/// computed lazily on the first [`Matrix::solve_spd`] call and cached for the
/// lifetime of the instance.
#[derive(Debug, Clone)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
    chol: Option<CholeskyFactors>,
}

impl Matrix {
    /// Create a matrix from pre-populated rows.
    ///
    /// Fails on empty input or ragged rows.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let m = rows.len();
        if m == 0 || rows[0].is_empty() {
            return Err(ForecastError::EmptyData);
        }
        let n = rows[0].len();
        let mut data = Vec::with_capacity(m * n);
        for row in &rows {
            if row.len() != n {
                return Err(ForecastError::DimensionMismatch {
                    expected: n,
                    got: row.len(),
                });
            }
            data.extend_from_slice(row);
        }
        Ok(Self {
            rows: m,
            cols: n,
            data,
            chol: None,
        })
    }

    /// Create a zero-filled matrix.
    pub fn zeros(rows: usize, cols: usize) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(ForecastError::InvalidParameter(
                "matrix dimensions must be positive".to_string(),
            ));
        }
        Ok(Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
            chol: None,
        })
    }

    /// Create the symmetric Toeplitz matrix whose first column is `column`:
    /// entry (i, j) is `column[|i - j|]`.
    pub fn toeplitz(column: &[f64]) -> Result<Self> {
        let n = column.len();
        if n == 0 {
            return Err(ForecastError::EmptyData);
        }
        let mut data = Vec::with_capacity(n * n);
        for i in 0..n {
            for j in 0..n {
                data.push(column[i.abs_diff(j)]);
            }
        }
        Ok(Self {
            rows: n,
            cols: n,
            data,
            chol: None,
        })
    }

    /// Number of rows.
    pub fn num_rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn num_cols(&self) -> usize {
        self.cols
    }

    /// Get the element at row `i`, column `j`.
    pub fn get(&self, i: usize, j: usize) -> Result<f64> {
        if i >= self.rows || j >= self.cols {
            return Err(ForecastError::IndexOutOfBounds {
                index: i * self.cols + j,
                size: self.data.len(),
            });
        }
        Ok(self.data[i * self.cols + j])
    }

    /// Set the element at row `i`, column `j`.
    ///
    /// Invalidates the cached factorization.
    pub fn set(&mut self, i: usize, j: usize, value: f64) -> Result<()> {
        if i >= self.rows || j >= self.cols {
            return Err(ForecastError::IndexOutOfBounds {
                index: i * self.cols + j,
                size: self.data.len(),
            });
        }
        self.data[i * self.cols + j] = value;
        self.chol = None;
        Ok(())
    }

    #[inline]
    fn at(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.cols + j]
    }

    /// Multiply this (rows x cols) matrix by a (cols x 1) vector.
    pub fn times_vector(&self, v: &Vector) -> Result<Vector> {
        if self.cols != v.len() {
            return Err(ForecastError::DimensionMismatch {
                expected: self.cols,
                got: v.len(),
            });
        }
        let rhs = v.as_slice();
        let mut out = Vec::with_capacity(self.rows);
        for i in 0..self.rows {
            let row = &self.data[i * self.cols..(i + 1) * self.cols];
            out.push(row.iter().zip(rhs.iter()).map(|(a, b)| a * b).sum());
        }
        Vector::from_vec(out)
    }

    /// Compute A·Aᵗ, the (rows x rows) self-outer-product used to form the
    /// normal equations of a least-squares system.
    pub fn compute_aat(&self) -> Matrix {
        let m = self.rows;
        let n = self.cols;
        let mut data = vec![0.0; m * m];
        for i in 0..m {
            let row_i = &self.data[i * n..(i + 1) * n];
            for j in 0..m {
                let row_j = &self.data[j * n..(j + 1) * n];
                let mut acc = 0.0;
                for k in 0..n {
                    acc += row_i[k] * row_j[k];
                }
                data[i * m + j] = acc;
            }
        }
        Matrix {
            rows: m,
            cols: m,
            data,
            chol: None,
        }
    }

    /// Solve the symmetric positive (semi-)definite system `A·x = b`.
    ///
    /// The factorization is an LDLᵗ-style Cholesky computed column-by-column
    /// ("backward marching"). With `max_condition_number = None` the system is
    /// solved exactly and a zero pivot fails with
    /// [`ForecastError::SingularMatrix`]. With `Some(bound)` every pivot is
    /// clamped so that `|pivot| * bound` never falls below the largest pivot
    /// seen so far, which keeps near-singular systems solvable at the price of
    /// numerical damping.
    ///
    /// Off-diagonal entries are read as `(A[i][j] + A[j][i]) / 2`, so the
    /// input need not be exactly symmetric.
    pub fn solve_spd(&mut self, b: &Vector, max_condition_number: Option<f64>) -> Result<Vector> {
        if self.rows != self.cols {
            return Err(ForecastError::InvalidParameter(format!(
                "SPD solve requires a square matrix, got {}x{}",
                self.rows, self.cols
            )));
        }
        if self.cols != b.len() {
            return Err(ForecastError::DimensionMismatch {
                expected: self.cols,
                got: b.len(),
            });
        }
        let chol = match self.chol.take() {
            Some(factors) => factors,
            None => self.compute_cholesky(max_condition_number),
        };
        if chol.zero_pivot {
            self.chol = Some(chol);
            return Err(ForecastError::SingularMatrix);
        }

        let n = self.rows;
        let bt = b.as_slice();
        // Forward substitution: L·y = b
        let mut y = vec![0.0; n];
        for i in 0..n {
            let mut val = 0.0;
            for j in 0..i {
                val += chol.l[i * n + j] * y[j];
            }
            y[i] = bt[i] - val;
        }
        // Back substitution: Lᵗ·x = D⁻¹·y
        let mut x = bt.to_vec();
        for i in (0..n).rev() {
            let mut val = 0.0;
            for j in (i + 1)..n {
                val += chol.l[i * n + j] * x[j];
            }
            x[i] = y[i] / chol.d[i] - val;
        }
        self.chol = Some(chol);
        Vector::from_vec(x)
    }

    fn compute_cholesky(&self, max_condition_number: Option<f64>) -> CholeskyFactors {
        let n = self.rows;
        let mut d = vec![0.0; n];
        let mut l = vec![0.0; n * n];
        let mut zero_pivot = false;
        let mut positive_pivot = false;
        let mut negative_pivot = false;
        let mut current_max = -1.0_f64;

        for j in 0..n {
            let mut val = 0.0;
            for k in 0..j {
                val += d[k] * l[j * n + k] * l[j * n + k];
            }
            let mut diag = self.at(j, j) - val;
            let diag_sign = if diag == 0.0 {
                0
            } else if diag > 0.0 {
                1
            } else {
                -1
            };
            match diag_sign {
                0 => {
                    if max_condition_number.is_none() {
                        // Singular diagonal with no condition bound: abort.
                        zero_pivot = true;
                        return CholeskyFactors {
                            d: Vec::new(),
                            l: Vec::new(),
                            zero_pivot,
                            positive_pivot,
                            negative_pivot,
                        };
                    }
                    positive_pivot = true;
                }
                1 => positive_pivot = true,
                _ => negative_pivot = true,
            }
            if let Some(bound) = max_condition_number {
                if current_max <= 0.0 {
                    // First pivot: a zero value gets a unit placeholder.
                    if diag_sign == 0 {
                        diag = 1.0;
                    }
                } else if diag_sign == 0 {
                    diag = (current_max / bound).abs();
                } else if (diag * bound).abs() < current_max {
                    diag = diag_sign as f64 * (current_max / bound).abs();
                }
            }
            d[j] = diag;
            if diag.abs() > current_max {
                current_max = diag.abs();
            }
            l[j * n + j] = 1.0;
            for i in (j + 1)..n {
                let mut val = 0.0;
                for k in 0..j {
                    val += d[k] * l[j * n + k] * l[i * n + k];
                }
                let entry = ((self.at(i, j) + self.at(j, i)) / 2.0 - val) / d[j];
                l[j * n + i] = entry;
                l[i * n + j] = entry;
            }
        }
        CholeskyFactors {
            d,
            l,
            zero_pivot,
            positive_pivot,
            negative_pivot,
        }
    }
}
