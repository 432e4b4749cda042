use crate::Matrix;

use super::Sample;

/// Build the n x 10 quadric design matrix.
///
/// Row i holds the ten ellipsoid basis terms for sample i:
/// `[x², y², z², 2yz, 2xz, 2xy, 2x, 2y, 2z, 1]`.
pub(crate) fn design_matrix(samples: &[Sample]) -> Matrix<f64> {
    let n = samples.len();
    let mut d = Matrix::zeros(n, 10);
    for (i, s) in samples.iter().enumerate() {
        let (x, y, z) = (s.x, s.y, s.z);
        d[(i, 0)] = x * x;
        d[(i, 1)] = y * y;
        d[(i, 2)] = z * z;
        d[(i, 3)] = 2.0 * y * z;
        d[(i, 4)] = 2.0 * x * z;
        d[(i, 5)] = 2.0 * x * y;
        d[(i, 6)] = 2.0 * x;
        d[(i, 7)] = 2.0 * y;
        d[(i, 8)] = 2.0 * z;
        d[(i, 9)] = 1.0;
    }
    d
}

/// Form the 10 x 10 scatter matrix `S = Dᵗ·D`.
///
/// Symmetric positive semi-definite by construction.
pub(crate) fn scatter_matrix(design: &Matrix<f64>) -> Matrix<f64> {
    design.transpose().self_times_transpose()
}
