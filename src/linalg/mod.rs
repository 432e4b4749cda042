pub(crate) mod cholesky;
pub(crate) mod eigen;
pub(crate) mod hessenberg;

pub use cholesky::{cholesky_in_place, cholesky_invert_in_place};
pub use eigen::{DEFAULT_MAX_ITERATIONS, EigenDecomposition, eigen_hessenberg};
pub use hessenberg::hessenberg_in_place;

use thiserror::Error;

/// Errors from the dense linear-algebra routines.
///
/// Returned by the checked matrix operations (`matmul`, `submatrix`), the
/// Cholesky engine, and the eigensolver.
///
/// ```
/// use magcal::{LinalgError, Matrix};
///
/// let not_pd = Matrix::from_rows(2, 2, &[1.0_f64, 5.0, 5.0, 1.0]);
/// assert_eq!(
///     not_pd.cholesky_inverse().unwrap_err(),
///     LinalgError::NotPositiveDefinite,
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LinalgError {
    /// A computed Cholesky pivot was not strictly positive.
    #[error("matrix is not positive definite")]
    NotPositiveDefinite,

    /// The QR iteration hit the per-eigenvalue iteration cap.
    #[error("eigenvalue iteration failed to converge within {max_iterations} iterations")]
    NonConvergence { max_iterations: usize },

    /// Matrix product shapes disagree.
    #[error("dimension mismatch: {}x{} * {}x{}", lhs.0, lhs.1, rhs.0, rhs.1)]
    DimensionMismatch {
        lhs: (usize, usize),
        rhs: (usize, usize),
    },

    /// Submatrix origin plus extent exceeds the source dimensions.
    #[error(
        "submatrix at ({}, {}) of size {}x{} out of range for {}x{} matrix",
        origin.0, origin.1, extent.0, extent.1, shape.0, shape.1
    )]
    OutOfRange {
        origin: (usize, usize),
        extent: (usize, usize),
        shape: (usize, usize),
    },
}
