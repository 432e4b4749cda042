//! Ellipsoid-fit magnetometer calibration.
//!
//! Fits raw 3-axis samples to a quadric surface by the constrained direct
//! least-squares method, then derives the hard-iron bias (ellipsoid center)
//! and soft-iron correction (the affine map that sends the ellipsoid onto a
//! sphere of the requested radius).

mod design;

use crate::Matrix;
use crate::error::CalibrationError;
use crate::linalg::{DEFAULT_MAX_ITERATIONS, eigen_hessenberg, hessenberg_in_place};

use design::{design_matrix, scatter_matrix};

/// A raw magnetometer reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Sample {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Result of a calibration fit.
///
/// `correction * (reading - bias)` maps a raw reading onto the sphere of the
/// target radius.
#[derive(Debug, Clone, PartialEq)]
pub struct Calibration {
    /// Hard-iron bias (the fitted ellipsoid center).
    pub bias: [f64; 3],
    /// Soft-iron correction matrix (3 x 3, symmetric).
    pub correction: Matrix<f64>,
}

impl Calibration {
    /// Apply the calibration to a raw reading.
    pub fn apply(&self, sample: Sample) -> [f64; 3] {
        let centered = [
            sample.x - self.bias[0],
            sample.y - self.bias[1],
            sample.z - self.bias[2],
        ];
        let mut out = [0.0; 3];
        for i in 0..3 {
            for j in 0..3 {
                out[i] += self.correction[(i, j)] * centered[j];
            }
        }
        out
    }
}

/// The fit is a 10-parameter least-squares problem; fewer samples leave it
/// underdetermined.
pub const MIN_SAMPLES: usize = 10;

/// Default sphere radius the correction maps onto, in gauss. Matches the
/// nominal local geomagnetic field strength the calibration was tuned for.
pub const DEFAULT_TARGET_RADIUS: f64 = 0.569;

/// The fixed 6 x 6 ellipsoid normalization constraint, pre-inverted.
///
/// Applied to the Schur complement of the scatter matrix; the eigenvector of
/// the product belonging to its largest real eigenvalue is the geometrically
/// valid ellipsoid solution.
fn constraint_matrix() -> Matrix<f64> {
    Matrix::from_rows(
        6,
        6,
        &[
            0.0, 0.5, 0.5, 0.0, 0.0, 0.0, //
            0.5, 0.0, 0.5, 0.0, 0.0, 0.0, //
            0.5, 0.5, 0.0, 0.0, 0.0, 0.0, //
            0.0, 0.0, 0.0, -0.25, 0.0, 0.0, //
            0.0, 0.0, 0.0, 0.0, -0.25, 0.0, //
            0.0, 0.0, 0.0, 0.0, 0.0, -0.25,
        ],
    )
}

/// Fit a calibration to raw samples.
///
/// `target_radius` is the sphere radius corrected readings are scaled onto
/// ([`DEFAULT_TARGET_RADIUS`] for the nominal geomagnetic field).
///
/// Fails with `InsufficientSamples` below [`MIN_SAMPLES`], and propagates
/// `NotPositiveDefinite` (degenerate sample geometry) or `NonConvergence`
/// from the numeric engine unchanged.
///
/// # Example
///
/// ```
/// use magcal::{Sample, fit, DEFAULT_TARGET_RADIUS};
///
/// // Readings on a unit sphere: already calibrated except for scale.
/// let mut samples = Vec::new();
/// for i in 0..24 {
///     let az = i as f64 * 0.7;
///     let pol = 0.4 + (i % 5) as f64 * 0.5;
///     samples.push(Sample::new(
///         pol.sin() * az.cos(),
///         pol.sin() * az.sin(),
///         pol.cos(),
///     ));
/// }
/// let cal = fit(&samples, DEFAULT_TARGET_RADIUS).unwrap();
/// assert!(cal.bias.iter().all(|b| b.abs() < 1e-6));
/// ```
pub fn fit(samples: &[Sample], target_radius: f64) -> Result<Calibration, CalibrationError> {
    if samples.len() < MIN_SAMPLES {
        return Err(CalibrationError::InsufficientSamples {
            got: samples.len(),
        });
    }

    let d = design_matrix(samples);
    let s = scatter_matrix(&d);
    log::debug!("scatter matrix assembled from {} samples", samples.len());

    let s11 = s.submatrix(0, 0, 6, 6)?;
    let s12 = s.submatrix(0, 6, 6, 4)?;
    let s12t = s.submatrix(6, 0, 4, 6)?;
    let s22 = s.submatrix(6, 6, 4, 4)?;

    let s22_inv = s22.cholesky_inverse()?;
    let s22a = s22_inv.matmul(&s12t)?;
    let s22b = s12.matmul(&s22a)?;

    // Schur complement of S22 in the scatter matrix, then the constrained
    // eigenproblem E = C * SS.
    let ss = &s11 - &s22b;
    let mut e = constraint_matrix().matmul(&ss)?;

    let mut transform = hessenberg_in_place(&mut e);
    let (eigen_real, _) = eigen_hessenberg(&mut e, &mut transform, DEFAULT_MAX_ITERATIONS)?;

    // The algebraically largest real part selects the ellipsoid solution;
    // the first index wins ties.
    let mut index = 0;
    let mut maxval = eigen_real[0];
    for (i, val) in eigen_real.iter().enumerate().skip(1) {
        if *val > maxval {
            maxval = *val;
            index = i;
        }
    }
    log::debug!("ellipsoid eigenvalue {} selected at index {}", maxval, index);

    // Unit norm with a non-negative leading component.
    let mut v1 = transform.col(index);
    let norm = v1.iter().map(|x| x * x).sum::<f64>().sqrt();
    for x in v1.iter_mut() {
        *x /= norm;
    }
    if v1[0] < 0.0 {
        for x in v1.iter_mut() {
            *x = -*x;
        }
    }

    // Recover the eliminated linear and constant coefficients.
    let v2 = s22a.matmul(&Matrix::column(&v1))?;

    let q = Matrix::from_rows(
        3,
        3,
        &[
            v1[0], v1[5], v1[4], //
            v1[5], v1[1], v1[3], //
            v1[4], v1[3], v1[2],
        ],
    );
    let u = Matrix::column(&[-v2[(0, 0)], -v2[(1, 0)], -v2[(2, 0)]]);
    let j_term = -v2[(3, 0)];

    let q_inv = q.cholesky_inverse()?;
    let b = q_inv.matmul(&u)?;
    let bias = [-b[(0, 0)], -b[(1, 0)], -b[(2, 0)]];

    let b_col = Matrix::column(&bias);
    let qb = q.matmul(&b_col)?;
    let btqb = (0..3).map(|i| bias[i] * qb[(i, 0)]).sum::<f64>();
    let hmb = (btqb - j_term).sqrt();
    log::debug!("bias = {:?}, fitted field magnitude = {}", bias, hmb);

    // Matrix square root of Q via its (real, symmetric) eigensystem.
    let mut q_work = q.clone();
    let mut vectors = hessenberg_in_place(&mut q_work);
    let (shape_eigs, _) = eigen_hessenberg(&mut q_work, &mut vectors, DEFAULT_MAX_ITERATIONS)?;

    // Orthonormalize the eigenbasis (modified Gram-Schmidt). Q is symmetric,
    // so the basis is orthogonal up to roundoff, but near-degenerate
    // eigenvalues (a nearly spherical sample locus) leave the
    // back-substituted columns skewed, and V·Dz·Vᵗ below is a valid square
    // root only for orthonormal V.
    for j in 0..3 {
        for k in 0..j {
            let dot = (0..3).map(|i| vectors[(i, k)] * vectors[(i, j)]).sum::<f64>();
            for i in 0..3 {
                vectors[(i, j)] -= dot * vectors[(i, k)];
            }
        }
        let norm = (0..3).map(|i| vectors[(i, j)] * vectors[(i, j)]).sum::<f64>().sqrt();
        for i in 0..3 {
            vectors[(i, j)] /= norm;
        }
    }

    let mut dz = Matrix::zeros(3, 3);
    for i in 0..3 {
        dz[(i, i)] = shape_eigs[i].sqrt();
    }

    let vdz = vectors.matmul(&dz)?;
    vectors.transpose_in_place();
    let sq = vdz.matmul(&vectors)?;

    let correction = sq.scale(target_radius / hmb);

    Ok(Calibration { bias, correction })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic grid of points on the unit sphere, away from the poles.
    fn unit_sphere(n_azimuth: usize, n_polar: usize) -> Vec<Sample> {
        let mut out = Vec::with_capacity(n_azimuth * n_polar);
        for p in 0..n_polar {
            let polar = std::f64::consts::PI * (p as f64 + 0.5) / n_polar as f64;
            for a in 0..n_azimuth {
                let azimuth = 2.0 * std::f64::consts::PI * a as f64 / n_azimuth as f64;
                out.push(Sample::new(
                    polar.sin() * azimuth.cos(),
                    polar.sin() * azimuth.sin(),
                    polar.cos(),
                ));
            }
        }
        out
    }

    /// Map sphere points through `s = center + M * u` (ellipsoid locus).
    fn distort(points: &[Sample], m: &Matrix<f64>, center: [f64; 3]) -> Vec<Sample> {
        points
            .iter()
            .map(|u| {
                let uv = [u.x, u.y, u.z];
                let mut s = center;
                for i in 0..3 {
                    for j in 0..3 {
                        s[i] += m[(i, j)] * uv[j];
                    }
                }
                Sample::new(s[0], s[1], s[2])
            })
            .collect()
    }

    #[test]
    fn unit_sphere_yields_zero_bias_and_scaled_identity() {
        let samples = unit_sphere(8, 5);
        let cal = fit(&samples, 1.0).unwrap();

        for b in cal.bias {
            assert!(b.abs() < 1e-8, "bias component {}", b);
        }
        let diag = cal.correction[(0, 0)];
        for i in 0..3 {
            for j in 0..3 {
                let expected = if i == j { diag } else { 0.0 };
                assert!(
                    (cal.correction[(i, j)] - expected).abs() < 1e-8,
                    "correction[({}, {})] = {}",
                    i,
                    j,
                    cal.correction[(i, j)]
                );
            }
        }
        // Corrected readings land on the unit sphere.
        for s in &samples {
            let c = cal.apply(*s);
            let r = (c[0] * c[0] + c[1] * c[1] + c[2] * c[2]).sqrt();
            assert!((r - 1.0).abs() < 1e-8, "radius {}", r);
        }
    }

    #[test]
    fn recovers_known_ellipsoid() {
        let m = Matrix::from_rows(
            3,
            3,
            &[1.3, 0.1, 0.05, 0.1, 0.8, -0.08, 0.05, -0.08, 1.1],
        );
        let center = [0.12, -0.34, 0.21];
        let samples = distort(&unit_sphere(9, 6), &m, center);

        let radius = DEFAULT_TARGET_RADIUS;
        let cal = fit(&samples, radius).unwrap();

        for i in 0..3 {
            assert!(
                (cal.bias[i] - center[i]).abs() < 1e-6,
                "bias[{}] = {} expected {}",
                i,
                cal.bias[i],
                center[i]
            );
        }
        for s in &samples {
            let c = cal.apply(*s);
            let r = (c[0] * c[0] + c[1] * c[1] + c[2] * c[2]).sqrt();
            assert!((r - radius).abs() < 1e-6, "radius {} expected {}", r, radius);
        }
    }

    #[test]
    fn nearly_spherical_locus_still_yields_scaled_identity() {
        // A barely perturbed sphere keeps Q's eigenvalues nearly equal; the
        // square-root step must not amplify the degeneracy.
        let m = Matrix::from_rows(
            3,
            3,
            &[1.0 + 1e-7, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0 - 1e-7],
        );
        let samples = distort(&unit_sphere(8, 5), &m, [0.0, 0.0, 0.0]);
        let cal = fit(&samples, 1.0).unwrap();
        let diag = cal.correction[(0, 0)];
        for i in 0..3 {
            for j in 0..3 {
                if i != j {
                    assert!(
                        cal.correction[(i, j)].abs() < 1e-6,
                        "correction[({}, {})] = {}",
                        i,
                        j,
                        cal.correction[(i, j)]
                    );
                }
            }
            assert!((cal.correction[(i, i)] - diag).abs() < 1e-6);
        }
    }

    #[test]
    fn correction_matrix_is_symmetric() {
        let m = Matrix::from_rows(
            3,
            3,
            &[1.2, 0.08, 0.03, 0.08, 0.9, -0.05, 0.03, -0.05, 1.05],
        );
        let samples = distort(&unit_sphere(9, 6), &m, [0.1, -0.2, 0.15]);
        let cal = fit(&samples, DEFAULT_TARGET_RADIUS).unwrap();
        for i in 0..3 {
            for j in 0..3 {
                assert!(
                    (cal.correction[(i, j)] - cal.correction[(j, i)]).abs() < 1e-9,
                    "asymmetry at ({}, {})",
                    i,
                    j
                );
            }
        }
    }

    #[test]
    fn insufficient_samples() {
        let samples = vec![Sample::new(1.0, 0.0, 0.0); 9];
        assert!(matches!(
            fit(&samples, 1.0),
            Err(CalibrationError::InsufficientSamples { got: 9 })
        ));
    }

    #[test]
    fn deterministic() {
        let samples = distort(
            &unit_sphere(7, 4),
            &Matrix::from_rows(3, 3, &[1.1, 0.0, 0.0, 0.0, 0.9, 0.0, 0.0, 0.0, 1.2]),
            [0.05, 0.02, -0.07],
        );
        let a = fit(&samples, 0.5).unwrap();
        let b = fit(&samples, 0.5).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn degenerate_geometry_is_rejected() {
        // All samples in the z = 0 plane: S22 loses rank.
        let samples: Vec<Sample> = (0..16)
            .map(|i| {
                let t = i as f64 * 0.4;
                Sample::new(t.cos(), t.sin(), 0.0)
            })
            .collect();
        assert!(matches!(
            fit(&samples, 1.0),
            Err(CalibrationError::Numeric(_))
        ));
    }
}
