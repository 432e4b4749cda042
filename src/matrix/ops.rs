use core::ops::{Add, Mul, Sub};

use crate::linalg::LinalgError;
use crate::traits::Scalar;

use super::Matrix;

impl<T: Scalar> Matrix<T> {
    /// Matrix product `self * rhs`.
    ///
    /// Standard triple loop. Unlike the element-wise operators below, shape
    /// violations are reported as a value rather than a panic so the fit
    /// pipeline can surface them through its error taxonomy.
    ///
    /// ```
    /// use magcal::Matrix;
    /// let a = Matrix::from_rows(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    /// let b = Matrix::from_rows(3, 1, &[1.0, 0.0, 1.0]);
    /// let c = a.matmul(&b).unwrap();
    /// assert_eq!(c[(0, 0)], 4.0);
    /// assert_eq!(c[(1, 0)], 10.0);
    ///
    /// assert!(b.matmul(&a).is_err());
    /// ```
    pub fn matmul(&self, rhs: &Matrix<T>) -> Result<Matrix<T>, LinalgError> {
        if self.ncols != rhs.nrows {
            return Err(LinalgError::DimensionMismatch {
                lhs: (self.nrows, self.ncols),
                rhs: (rhs.nrows, rhs.ncols),
            });
        }
        let mut out = Matrix::zeros(self.nrows, rhs.ncols);
        for i in 0..self.nrows {
            for k in 0..self.ncols {
                let aik = self[(i, k)];
                for j in 0..rhs.ncols {
                    out[(i, j)] = out[(i, j)] + aik * rhs[(k, j)];
                }
            }
        }
        Ok(out)
    }

    /// Return the transpose as a new matrix.
    ///
    /// ```
    /// use magcal::Matrix;
    /// let a = Matrix::from_rows(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    /// let t = a.transpose();
    /// assert_eq!(t.nrows(), 3);
    /// assert_eq!(t[(2, 1)], 6.0);
    /// ```
    pub fn transpose(&self) -> Matrix<T> {
        Matrix::from_fn(self.ncols, self.nrows, |i, j| self[(j, i)])
    }

    /// Transpose a square matrix in place.
    ///
    /// Panics if the matrix is not square.
    pub fn transpose_in_place(&mut self) {
        assert!(
            self.is_square(),
            "in-place transpose requires a square matrix, got {}x{}",
            self.nrows,
            self.ncols,
        );
        for i in 0..self.nrows {
            for j in (i + 1)..self.ncols {
                let x = self[(i, j)];
                self[(i, j)] = self[(j, i)];
                self[(j, i)] = x;
            }
        }
    }

    /// Compute `self * self^T` (always square, always symmetric).
    ///
    /// Only the upper triangle is computed; the lower triangle is mirrored.
    ///
    /// ```
    /// use magcal::Matrix;
    /// let a = Matrix::from_rows(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    /// let s = a.self_times_transpose();
    /// assert_eq!(s[(0, 0)], 14.0);
    /// assert_eq!(s[(0, 1)], s[(1, 0)]);
    /// ```
    pub fn self_times_transpose(&self) -> Matrix<T> {
        let m = self.nrows;
        let mut out = Matrix::zeros(m, m);
        for i in 0..m {
            for j in i..m {
                let mut sum = T::zero();
                for k in 0..self.ncols {
                    sum = sum + self[(i, k)] * self[(j, k)];
                }
                out[(i, j)] = sum;
                out[(j, i)] = sum;
            }
        }
        out
    }

    /// Multiply every element by `factor`.
    pub fn scale(&self, factor: T) -> Matrix<T> {
        Matrix {
            data: self.data.iter().map(|&x| x * factor).collect(),
            nrows: self.nrows,
            ncols: self.ncols,
        }
    }
}

// ── Element-wise addition / subtraction ─────────────────────────────

impl<T: Scalar> Add<&Matrix<T>> for &Matrix<T> {
    type Output = Matrix<T>;

    fn add(self, rhs: &Matrix<T>) -> Matrix<T> {
        assert_eq!(
            (self.nrows, self.ncols),
            (rhs.nrows, rhs.ncols),
            "dimension mismatch: {}x{} + {}x{}",
            self.nrows,
            self.ncols,
            rhs.nrows,
            rhs.ncols,
        );
        Matrix {
            data: self
                .data
                .iter()
                .zip(rhs.data.iter())
                .map(|(&a, &b)| a + b)
                .collect(),
            nrows: self.nrows,
            ncols: self.ncols,
        }
    }
}

impl<T: Scalar> Add for Matrix<T> {
    type Output = Matrix<T>;

    fn add(self, rhs: Matrix<T>) -> Matrix<T> {
        &self + &rhs
    }
}

impl<T: Scalar> Sub<&Matrix<T>> for &Matrix<T> {
    type Output = Matrix<T>;

    fn sub(self, rhs: &Matrix<T>) -> Matrix<T> {
        assert_eq!(
            (self.nrows, self.ncols),
            (rhs.nrows, rhs.ncols),
            "dimension mismatch: {}x{} - {}x{}",
            self.nrows,
            self.ncols,
            rhs.nrows,
            rhs.ncols,
        );
        Matrix {
            data: self
                .data
                .iter()
                .zip(rhs.data.iter())
                .map(|(&a, &b)| a - b)
                .collect(),
            nrows: self.nrows,
            ncols: self.ncols,
        }
    }
}

impl<T: Scalar> Sub for Matrix<T> {
    type Output = Matrix<T>;

    fn sub(self, rhs: Matrix<T>) -> Matrix<T> {
        &self - &rhs
    }
}

impl<T: Scalar> Mul<T> for &Matrix<T> {
    type Output = Matrix<T>;

    fn mul(self, rhs: T) -> Matrix<T> {
        self.scale(rhs)
    }
}
