use crate::linalg::LinalgError;
use crate::traits::Scalar;

use super::Matrix;

impl<T: Scalar> Matrix<T> {
    /// Copy out a `nrows x ncols` block starting at `(row, col)`.
    ///
    /// Returns `OutOfRange` when origin plus extent exceeds the matrix
    /// dimensions.
    ///
    /// ```
    /// use magcal::Matrix;
    /// let m = Matrix::from_fn(3, 3, |i, j| (i * 3 + j) as f64);
    /// let b = m.submatrix(1, 1, 2, 2).unwrap();
    /// assert_eq!(b[(0, 0)], 4.0);
    /// assert_eq!(b[(1, 1)], 8.0);
    ///
    /// assert!(m.submatrix(2, 2, 2, 2).is_err());
    /// ```
    pub fn submatrix(
        &self,
        row: usize,
        col: usize,
        nrows: usize,
        ncols: usize,
    ) -> Result<Matrix<T>, LinalgError> {
        if row + nrows > self.nrows || col + ncols > self.ncols {
            return Err(LinalgError::OutOfRange {
                origin: (row, col),
                extent: (nrows, ncols),
                shape: (self.nrows, self.ncols),
            });
        }
        Ok(Matrix::from_fn(nrows, ncols, |r, c| {
            self[(row + r, col + c)]
        }))
    }
}

impl<T> Matrix<T> {
    /// Interchange rows `a` and `b` in place. No-op when `a == b`.
    pub fn swap_rows(&mut self, a: usize, b: usize) {
        assert!(
            a < self.nrows && b < self.nrows,
            "row interchange ({}, {}) out of bounds for {} rows",
            a,
            b,
            self.nrows,
        );
        if a == b {
            return;
        }
        for j in 0..self.ncols {
            self.data.swap(a * self.ncols + j, b * self.ncols + j);
        }
    }

    /// Interchange columns `a` and `b` in place. No-op when `a == b`.
    pub fn swap_cols(&mut self, a: usize, b: usize) {
        assert!(
            a < self.ncols && b < self.ncols,
            "column interchange ({}, {}) out of bounds for {} columns",
            a,
            b,
            self.ncols,
        );
        if a == b {
            return;
        }
        for i in 0..self.nrows {
            self.data.swap(i * self.ncols + a, i * self.ncols + b);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mat4x5() -> Matrix<i32> {
        Matrix::from_fn(4, 5, |i, j| (i * 5 + j) as i32)
    }

    #[test]
    fn submatrix_extract() {
        let m = mat4x5();
        let b = m.submatrix(1, 1, 2, 3).unwrap();
        assert_eq!(b[(0, 0)], 6);
        assert_eq!(b[(0, 2)], 8);
        assert_eq!(b[(1, 0)], 11);
        assert_eq!(b[(1, 2)], 13);
    }

    #[test]
    fn submatrix_full() {
        let m = mat4x5();
        let full = m.submatrix(0, 0, 4, 5).unwrap();
        assert_eq!(full, m);
    }

    #[test]
    fn submatrix_out_of_range() {
        let m = mat4x5();
        let err = m.submatrix(3, 3, 2, 3).unwrap_err();
        assert_eq!(
            err,
            LinalgError::OutOfRange {
                origin: (3, 3),
                extent: (2, 3),
                shape: (4, 5),
            }
        );
    }

    #[test]
    fn swap_rows_basic() {
        let mut m = mat4x5();
        m.swap_rows(0, 2);
        assert_eq!(m[(0, 0)], 10);
        assert_eq!(m[(2, 4)], 4);
        assert_eq!(m[(1, 0)], 5);
    }

    #[test]
    fn swap_cols_basic() {
        let mut m = mat4x5();
        m.swap_cols(1, 3);
        assert_eq!(m[(0, 1)], 3);
        assert_eq!(m[(0, 3)], 1);
        assert_eq!(m[(3, 1)], 18);
    }

    #[test]
    fn swap_same_index_is_noop() {
        let mut m = mat4x5();
        let orig = m.clone();
        m.swap_rows(2, 2);
        m.swap_cols(4, 4);
        assert_eq!(m, orig);
    }
}
