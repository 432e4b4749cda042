//! 3-axis magnetometer calibration by constrained ellipsoid fitting.
//!
//! Raw magnetometer readings in the presence of hard- and soft-iron
//! distortion trace out an ellipsoid instead of a sphere. This crate fits
//! that ellipsoid directly (a 10-parameter quadric least-squares problem
//! with an ellipsoid-specific normalization constraint) and derives:
//!
//! - the **hard-iron bias**, the fitted ellipsoid center, and
//! - the **soft-iron correction**, the symmetric matrix square root that
//!   maps the centered ellipsoid onto a sphere of a chosen radius.
//!
//! The fit is built on a dense linear-algebra engine exported alongside it:
//!
//! - [`Matrix`]: dense row-major matrices with checked operations
//! - Cholesky factorization and inversion of symmetric positive-definite
//!   matrices ([`cholesky_in_place`], [`Matrix::cholesky_inverse`])
//! - Similarity reduction to upper Hessenberg form with partial pivoting
//!   ([`hessenberg_in_place`])
//! - An implicit double-shift QR eigensolver producing real and
//!   complex-conjugate eigenvalue pairs with eigenvectors
//!   ([`EigenDecomposition`], [`eigen_hessenberg`])
//!
//! # Example
//!
//! ```
//! use magcal::{Sample, fit, DEFAULT_TARGET_RADIUS};
//!
//! let mut samples = Vec::new();
//! for i in 0..30 {
//!     let az = i as f64 * 0.9;
//!     let pol = 0.3 + (i % 6) as f64 * 0.45;
//!     // A sphere offset by a constant bias.
//!     samples.push(Sample::new(
//!         0.2 + pol.sin() * az.cos(),
//!         -0.1 + pol.sin() * az.sin(),
//!         0.05 + pol.cos(),
//!     ));
//! }
//!
//! let cal = fit(&samples, DEFAULT_TARGET_RADIUS).unwrap();
//! assert!((cal.bias[0] - 0.2).abs() < 1e-6);
//! assert!((cal.bias[1] + 0.1).abs() < 1e-6);
//!
//! let corrected = cal.apply(samples[0]);
//! let radius = corrected.iter().map(|c| c * c).sum::<f64>().sqrt();
//! assert!((radius - DEFAULT_TARGET_RADIUS).abs() < 1e-6);
//! ```

mod error;
mod fit;
mod io;
mod linalg;
mod matrix;
mod traits;

pub use error::CalibrationError;
pub use fit::{Calibration, DEFAULT_TARGET_RADIUS, MIN_SAMPLES, Sample, fit};
pub use io::read_samples;
pub use linalg::{
    DEFAULT_MAX_ITERATIONS, EigenDecomposition, LinalgError, cholesky_in_place,
    cholesky_invert_in_place, eigen_hessenberg, hessenberg_in_place,
};
pub use matrix::Matrix;
pub use traits::{FloatScalar, Scalar};
