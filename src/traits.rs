use core::fmt::Debug;
use num_traits::{Float, Num, One, Zero};

/// Trait for types that can be used as matrix elements.
///
/// Blanket-implemented for all types satisfying the bounds.
/// Covers `f32`, `f64`, and all integer types.
pub trait Scalar: Copy + PartialEq + Debug + Zero + One + Num {}

impl<T: Copy + PartialEq + Debug + Zero + One + Num> Scalar for T {}

/// Trait for floating-point matrix elements.
///
/// Required by operations that need `sqrt`, `abs`, `epsilon`, etc.
/// (the Cholesky, Hessenberg, and QR routines). The eigensolver works in
/// real arithmetic throughout and reports complex conjugate eigenvalues as
/// (real, imaginary) value pairs, never as complex matrix elements, so
/// real floats are the only element types the engine needs.
pub trait FloatScalar: Scalar + Float {}

impl<T: Scalar + Float> FloatScalar for T {}
