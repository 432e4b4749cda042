use crate::Matrix;
use crate::linalg::LinalgError;
use crate::traits::FloatScalar;

/// Cholesky factorization in place: `A = L * L^T`.
///
/// On success `a` holds the lower triangular factor L with its transpose
/// mirrored into the upper triangle (so the full storage reads as L + U with
/// U = L^T and a shared diagonal). The original matrix is destroyed; callers
/// that still need it must clone first.
///
/// Returns `NotPositiveDefinite` as soon as a computed diagonal pivot is not
/// strictly positive.
pub fn cholesky_in_place<T: FloatScalar>(a: &mut Matrix<T>) -> Result<(), LinalgError> {
    let n = a.nrows();
    assert!(a.is_square(), "Cholesky factorization requires a square matrix");

    for k in 0..n {
        // Subtract the squares of the entries to the left of the diagonal.
        for p in 0..k {
            let lkp = a[(k, p)];
            a[(k, k)] = a[(k, k)] - lkp * lkp;
        }

        if a[(k, k)] <= T::zero() {
            return Err(LinalgError::NotPositiveDefinite);
        }
        a[(k, k)] = a[(k, k)].sqrt();
        let reciprocal = T::one() / a[(k, k)];

        // Column k of the rows below, mirrored into the upper triangle.
        for i in (k + 1)..n {
            for p in 0..k {
                let prod = a[(i, p)] * a[(k, p)];
                a[(i, k)] = a[(i, k)] - prod;
            }
            a[(i, k)] = a[(i, k)] * reciprocal;
            a[(k, i)] = a[(i, k)];
        }
    }

    Ok(())
}

/// Invert a matrix in place given its Cholesky factorization.
///
/// `lu` must hold the output of [`cholesky_in_place`]. The lower triangular
/// factor is inverted in place (diagonal reciprocals, then row-by-row
/// substitution for the off-diagonal entries), then the symmetric product
/// `L^-T * L^-1 = A^-1` is formed, computing each entry once and mirroring.
///
/// Infallible: a successful factorization guarantees a strictly positive
/// diagonal.
pub fn cholesky_invert_in_place<T: FloatScalar>(lu: &mut Matrix<T>) {
    let n = lu.nrows();
    assert!(lu.is_square(), "Cholesky inverse requires a square matrix");

    // Invert the lower triangular factor.
    for k in 0..n {
        lu[(k, k)] = T::one() / lu[(k, k)];
    }
    for i in 1..n {
        for j in 0..i {
            let mut sum = T::zero();
            for k in j..i {
                sum = sum + lu[(i, k)] * lu[(k, j)];
            }
            lu[(i, j)] = T::zero() - lu[(i, i)] * sum;
        }
    }

    // A^-1 = L^-T * L^-1, exploiting symmetry.
    for i in 0..n {
        for j in 0..=i {
            let mut sum = T::zero();
            for k in i..n {
                sum = sum + lu[(k, i)] * lu[(k, j)];
            }
            lu[(i, j)] = sum;
            lu[(j, i)] = sum;
        }
    }
}

impl<T: FloatScalar> Matrix<T> {
    /// Invert a symmetric positive-definite matrix via its Cholesky
    /// factorization, leaving `self` untouched.
    ///
    /// ```
    /// use magcal::Matrix;
    ///
    /// let a = Matrix::from_rows(2, 2, &[4.0_f64, 2.0, 2.0, 3.0]);
    /// let inv = a.cholesky_inverse().unwrap();
    /// let id = a.matmul(&inv).unwrap();
    /// assert!((id[(0, 0)] - 1.0).abs() < 1e-12);
    /// assert!(id[(0, 1)].abs() < 1e-12);
    /// ```
    pub fn cholesky_inverse(&self) -> Result<Matrix<T>, LinalgError> {
        let mut lu = self.clone();
        cholesky_in_place(&mut lu)?;
        cholesky_invert_in_place(&mut lu);
        Ok(lu)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spd_3x3() -> Matrix<f64> {
        Matrix::from_rows(3, 3, &[4.0, 2.0, 1.0, 2.0, 10.0, 3.5, 1.0, 3.5, 4.5])
    }

    fn spd_4x4() -> Matrix<f64> {
        // A * A^T with a diagonally dominant A is positive definite.
        let a = Matrix::from_fn(4, 4, |i, j| {
            ((i + 1) * (j + 1)) as f64 + if i == j { 10.0 } else { 0.0 }
        });
        a.self_times_transpose()
    }

    #[test]
    fn factor_reconstructs() {
        let a = spd_3x3();
        let mut lu = a.clone();
        cholesky_in_place(&mut lu).unwrap();

        // Zero the mirrored upper triangle to recover L alone.
        let l = Matrix::from_fn(3, 3, |i, j| if j <= i { lu[(i, j)] } else { 0.0 });
        let reconstructed = l.self_times_transpose();
        for i in 0..3 {
            for j in 0..3 {
                assert!(
                    (reconstructed[(i, j)] - a[(i, j)]).abs() < 1e-12,
                    "mismatch at ({}, {})",
                    i,
                    j
                );
            }
        }
    }

    #[test]
    fn factor_mirrors_upper_triangle() {
        let mut lu = spd_3x3();
        cholesky_in_place(&mut lu).unwrap();
        for i in 0..3 {
            for j in 0..3 {
                assert_eq!(lu[(i, j)], lu[(j, i)]);
            }
        }
    }

    fn spd_6x6() -> Matrix<f64> {
        let a = Matrix::from_fn(6, 6, |i, j| {
            ((i * 3 + j * 2) % 7) as f64 * 0.5 + if i == j { 8.0 } else { 0.0 }
        });
        a.self_times_transpose()
    }

    #[test]
    fn inverse_times_original_is_identity() {
        for a in [spd_3x3(), spd_4x4(), spd_6x6()] {
            let n = a.nrows();
            let inv = a.cholesky_inverse().unwrap();
            let id = a.matmul(&inv).unwrap();
            for i in 0..n {
                for j in 0..n {
                    let expected = if i == j { 1.0 } else { 0.0 };
                    assert!(
                        (id[(i, j)] - expected).abs() < 1e-9,
                        "id[({}, {})] = {}",
                        i,
                        j,
                        id[(i, j)]
                    );
                }
            }
        }
    }

    #[test]
    fn identity_inverts_to_identity() {
        let id = Matrix::<f64>::identity(5);
        let inv = id.cholesky_inverse().unwrap();
        for i in 0..5 {
            for j in 0..5 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!((inv[(i, j)] - expected).abs() < 1e-15);
            }
        }
    }

    #[test]
    fn not_positive_definite() {
        let a = Matrix::from_rows(2, 2, &[1.0_f64, 5.0, 5.0, 1.0]);
        assert_eq!(
            a.cholesky_inverse().unwrap_err(),
            LinalgError::NotPositiveDefinite
        );
    }

    #[test]
    fn zero_diagonal_rejected() {
        let a = Matrix::<f64>::zeros(3, 3);
        let mut lu = a.clone();
        assert_eq!(
            cholesky_in_place(&mut lu).unwrap_err(),
            LinalgError::NotPositiveDefinite
        );
    }
}
