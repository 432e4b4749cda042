use crate::Matrix;
use crate::linalg::LinalgError;
use crate::linalg::hessenberg::hessenberg_in_place;
use crate::traits::FloatScalar;

/// Default per-eigenvalue iteration cap for the QR iteration.
pub const DEFAULT_MAX_ITERATIONS: usize = 100;

/// Eigenvalues and eigenvectors of a real upper Hessenberg matrix via
/// implicit double-shift (Francis) QR iteration.
///
/// `s` must be the similarity transform satisfying `A * S = S * H` when H was
/// derived from a matrix A (the return value of [`hessenberg_in_place`]), or
/// the identity when H itself is the primary matrix. On return column i of
/// `s` holds the eigenvector for eigenvalue i when that eigenvalue is real;
/// for a complex conjugate pair the lower index i carries the positive
/// imaginary part, column i is the real part of its eigenvector and column
/// i + 1 the imaginary part. The conjugate eigenvalue's eigenvector is the
/// conjugate of that vector.
///
/// `h` is destroyed (overwritten by the deflated quasi-triangular form and
/// back-substitution workspace).
///
/// Returns `(eigen_real, eigen_imag)`, index-aligned with the columns of
/// `s`, or `NonConvergence` when some eigenvalue fails to deflate within
/// `max_iterations` sweeps.
pub fn eigen_hessenberg<T: FloatScalar>(
    h: &mut Matrix<T>,
    s: &mut Matrix<T>,
    max_iterations: usize,
) -> Result<(Vec<T>, Vec<T>), LinalgError> {
    let n = h.nrows();
    assert!(h.is_square(), "eigensolver requires a square matrix");
    assert_eq!(s.nrows(), n, "transform dimensions must match");
    assert_eq!(s.ncols(), n, "transform dimensions must match");

    if n == 0 {
        return Ok((Vec::new(), Vec::new()));
    }

    let eps = T::epsilon();
    let mut re = vec![T::zero(); n];
    let mut im = vec![T::zero(); n];
    // Cumulative exceptional shift of the diagonal.
    let mut shift = T::zero();

    let mut row = n as isize - 1;
    while row >= 0 {
        let mut found = false;

        for iteration in 1..=max_iterations {
            let r = row as usize;

            // Search upward for the first negligible subdiagonal element,
            // relative to the magnitudes of its diagonal neighbors.
            let mut i = r;
            while i > 0 {
                let tol = eps * (h[(i - 1, i - 1)].abs() + h[(i, i)].abs());
                if h[(i, i - 1)].abs() <= tol {
                    break;
                }
                i -= 1;
            }

            match r - i {
                0 => {
                    // The diagonal entry at `r` is a real eigenvalue.
                    h[(r, r)] = h[(r, r)] + shift;
                    re[r] = h[(r, r)];
                    im[r] = T::zero();
                    found = true;
                }
                1 => {
                    // Trailing 2x2 block: two real roots or a conjugate pair.
                    row -= 1;
                    two_eigenvalues(h, s, &mut re, &mut im, row as usize, shift);
                    found = true;
                }
                _ => double_qr_iteration(h, s, i, r, &mut shift, iteration),
            }
            if found {
                break;
            }
        }

        if !found {
            return Err(LinalgError::NonConvergence { max_iterations });
        }
        row -= 1;
    }

    back_substitution(h, &re, &im);
    calculate_eigenvectors(h, s, &re, &im);

    Ok((re, im))
}

/// Solve the trailing 2x2 block at rows (k, k+1) analytically.
///
/// With p = (H[k][k] - H[k+1][k+1]) / 2 and q = p^2 + H[k][k+1]*H[k+1][k]:
/// q > 0 gives two real roots, triangularized by a rotation accumulated into
/// both H and S; q < 0 gives a conjugate pair (no rotation applied).
fn two_eigenvalues<T: FloatScalar>(
    h: &mut Matrix<T>,
    s: &mut Matrix<T>,
    re: &mut [T],
    im: &mut [T],
    k: usize,
    shift: T,
) {
    let half = T::one() / (T::one() + T::one());
    let k1 = k + 1;

    let p = half * (h[(k, k)] - h[(k1, k1)]);
    let x = h[(k, k1)] * h[(k1, k)];
    let discriminant = p * p + x;
    h[(k, k)] = h[(k, k)] + shift;
    h[(k1, k1)] = h[(k1, k1)] + shift;

    if discriminant > T::zero() {
        // Pair of real roots.
        let mut q = discriminant.sqrt();
        if p < T::zero() {
            q = p - q;
        } else {
            q = q + p;
        }
        re[k] = h[(k1, k1)] + q;
        re[k1] = h[(k1, k1)] - x / q;
        im[k] = T::zero();
        im[k1] = T::zero();

        let r = (h[(k1, k)] * h[(k1, k)] + q * q).sqrt();
        let sin = h[(k1, k)] / r;
        let cos = q / r;
        update_row(h, cos, sin, k);
        update_column(h, cos, sin, k);
        update_transformation(s, cos, sin, k);
    } else {
        // Conjugate pair: positive imaginary part at the lower index.
        re[k] = h[(k1, k1)] + p;
        re[k1] = re[k];
        im[k] = discriminant.abs().sqrt();
        im[k1] = T::zero() - im[k];
    }
}

/// Left-multiply rows (k, k+1) by the rotation [[cos, sin], [-sin, cos]].
fn update_row<T: FloatScalar>(h: &mut Matrix<T>, cos: T, sin: T, k: usize) {
    let n = h.ncols();
    for j in k..n {
        let x = h[(k, j)];
        h[(k, j)] = cos * x + sin * h[(k + 1, j)];
        h[(k + 1, j)] = cos * h[(k + 1, j)] - sin * x;
    }
}

/// Right-multiply columns (k, k+1) by the rotation [[cos, -sin], [sin, cos]].
fn update_column<T: FloatScalar>(h: &mut Matrix<T>, cos: T, sin: T, k: usize) {
    for i in 0..=(k + 1) {
        let x = h[(i, k)];
        h[(i, k)] = cos * x + sin * h[(i, k + 1)];
        h[(i, k + 1)] = cos * h[(i, k + 1)] - sin * x;
    }
}

/// Apply the same column rotation to the accumulated transform.
fn update_transformation<T: FloatScalar>(s: &mut Matrix<T>, cos: T, sin: T, k: usize) {
    for i in 0..s.nrows() {
        let x = s[(i, k)];
        s[(i, k)] = cos * x + sin * s[(i, k + 1)];
        s[(i, k + 1)] = cos * s[(i, k + 1)] - sin * x;
    }
}

/// One sweep of the implicit double-shift step over the active block
/// `min_row..=max_row`.
fn double_qr_iteration<T: FloatScalar>(
    h: &mut Matrix<T>,
    s: &mut Matrix<T>,
    min_row: usize,
    max_row: usize,
    shift: &mut T,
    iteration: usize,
) {
    let (trace, det) = product_and_sum_of_shifts(h, max_row, shift, iteration);
    let k = two_consecutive_small_subdiagonal(h, min_row, max_row, trace, det);
    double_qr_step(h, min_row, max_row, k, trace, det, s);
}

/// Trace and determinant of the trailing 2x2 block, used as the implicit
/// double shift.
///
/// Every 10th iteration substitutes an exceptional shift instead: the
/// trailing diagonal entry is added to the cumulative shift and subtracted
/// from the leading diagonal, and an ad hoc trace/determinant derived from
/// the adjacent subdiagonal magnitudes is returned to break stagnation.
fn product_and_sum_of_shifts<T: FloatScalar>(
    h: &mut Matrix<T>,
    max_row: usize,
    shift: &mut T,
    iteration: usize,
) -> (T, T) {
    let min_col = max_row - 1;

    if iteration % 10 == 0 {
        let d = h[(max_row, max_row)];
        *shift = *shift + d;
        for i in 0..=max_row {
            h[(i, i)] = h[(i, i)] - d;
        }
        let w = h[(max_row, min_col)].abs() + h[(min_col, min_col - 1)].abs();
        let det = w * w;
        let half = T::one() / (T::one() + T::one());
        let trace = w * (T::one() + half);
        (trace, det)
    } else {
        let trace = h[(min_col, min_col)] + h[(max_row, max_row)];
        let det = h[(min_col, min_col)] * h[(max_row, max_row)]
            - h[(min_col, max_row)] * h[(max_row, min_col)];
        (trace, det)
    }
}

/// Scan upward from `max_row - 2` for two consecutive small subdiagonal
/// elements, returning the best starting row for the bulge chase (or
/// `min_row` when none qualifies). Also clears the stale entries two and
/// three places below the diagonal in the active block.
fn two_consecutive_small_subdiagonal<T: FloatScalar>(
    h: &mut Matrix<T>,
    min_row: usize,
    max_row: usize,
    trace: T,
    det: T,
) -> usize {
    let eps = T::epsilon();
    let mut k = max_row - 2;

    loop {
        let mut x = (h[(k, k)] * (h[(k, k)] - trace) + det) / h[(k + 1, k)] + h[(k, k + 1)];
        let mut y = h[(k, k)] + h[(k + 1, k + 1)] - trace;
        let mut z = h[(k + 2, k + 1)];
        let s = x.abs() + y.abs() + z.abs();
        x = x / s;
        y = y / s;
        z = z / s;
        if k == min_row {
            break;
        }
        if h[(k, k - 1)].abs() * (y.abs() + z.abs())
            <= eps
                * x.abs()
                * (h[(k - 1, k - 1)].abs() + h[(k, k)].abs() + h[(k + 1, k + 1)].abs())
        {
            break;
        }
        k -= 1;
    }

    for i in (k + 2)..=max_row {
        h[(i, i - 2)] = T::zero();
    }
    for i in (k + 3)..=max_row {
        h[(i, i - 3)] = T::zero();
    }
    k
}

/// Chase the implicit double shift as a bulge from `min_col` down to
/// `max_row - 1`, applying 3-row/3-column transformations across H and
/// accumulating them into S.
fn double_qr_step<T: FloatScalar>(
    h: &mut Matrix<T>,
    min_row: usize,
    max_row: usize,
    min_col: usize,
    trace: T,
    det: T,
    s_mat: &mut Matrix<T>,
) {
    let n = h.nrows();
    let last = max_row - 1;

    let k0 = min_col;
    let mut a = (h[(k0, k0)] * (h[(k0, k0)] - trace) + det) / h[(k0 + 1, k0)] + h[(k0, k0 + 1)];
    let mut b = h[(k0, k0)] + h[(k0 + 1, k0 + 1)] - trace;
    let mut c = h[(k0 + 2, k0 + 1)];
    let mut x = T::zero();
    {
        let s = a.abs() + b.abs() + c.abs();
        a = a / s;
        b = b / s;
        c = c / s;
    }

    for k in min_col..=last {
        if k > min_col {
            c = if k == last { T::zero() } else { h[(k + 2, k - 1)] };
            x = h[(k, k - 1)].abs() + h[(k + 1, k - 1)].abs() + c.abs();
            if x == T::zero() {
                continue;
            }
            a = h[(k, k - 1)] / x;
            b = h[(k + 1, k - 1)] / x;
            c = c / x;
        }

        // Reflection sign follows the sign of the leading component.
        let mut s = (a * a + b * b + c * c).sqrt();
        if a < T::zero() {
            s = T::zero() - s;
        }
        if k > min_col {
            h[(k, k - 1)] = T::zero() - s * x;
        } else if min_row != min_col {
            h[(k, k - 1)] = T::zero() - h[(k, k - 1)];
        }
        a = a + s;
        x = a / s;
        let y = b / s;
        let z = c / s;
        b = b / a;
        c = c / a;

        // Rows k, k+1 (and k+2 while the bulge is three rows tall).
        for j in k..n {
            let mut t = h[(k, j)] + b * h[(k + 1, j)];
            if k != last {
                t = t + c * h[(k + 2, j)];
                h[(k + 2, j)] = h[(k + 2, j)] - t * z;
            }
            h[(k + 1, j)] = h[(k + 1, j)] - t * y;
            h[(k, j)] = h[(k, j)] - t * x;
        }

        // Columns k, k+1, k+2, limited to the rows the bulge can reach.
        let row_end = if k + 3 > max_row { max_row } else { k + 3 };
        for i in 0..=row_end {
            let mut t = x * h[(i, k)] + y * h[(i, k + 1)];
            if k != last {
                t = t + z * h[(i, k + 2)];
                h[(i, k + 2)] = h[(i, k + 2)] - t * c;
            }
            h[(i, k + 1)] = h[(i, k + 1)] - t * b;
            h[(i, k)] = h[(i, k)] - t;
        }

        // Accumulate into the transformation matrix.
        for i in 0..n {
            let mut t = x * s_mat[(i, k)] + y * s_mat[(i, k + 1)];
            if k != last {
                t = t + z * s_mat[(i, k + 2)];
                s_mat[(i, k + 2)] = s_mat[(i, k + 2)] - t * c;
            }
            s_mat[(i, k + 1)] = s_mat[(i, k + 1)] - t * b;
            s_mat[(i, k)] = s_mat[(i, k)] - t;
        }
    }
}

/// a + ib = (x + iy) / (u + iv), computed in real arithmetic.
fn complex_division<T: FloatScalar>(x: T, y: T, u: T, v: T) -> (T, T) {
    let q = u * u + v * v;
    ((x * u + y * v) / q, (y * u - x * v) / q)
}

/// Fill in eigenvector components of the block-triangular H by
/// back-substitution, guarded by a zero tolerance derived from the overall
/// magnitude of the matrix.
fn back_substitution<T: FloatScalar>(h: &mut Matrix<T>, re: &[T], im: &[T]) {
    let n = h.nrows();

    let mut zero_tolerance = h[(0, 0)].abs();
    for i in 1..n {
        for j in (i - 1)..n {
            zero_tolerance = zero_tolerance + h[(i, j)].abs();
        }
    }
    zero_tolerance = zero_tolerance * T::epsilon();

    for row in (0..n).rev() {
        if im[row] == T::zero() {
            back_substitute_real_vector(h, re, im, row, zero_tolerance);
        } else if im[row] < T::zero() {
            back_substitute_complex_vector(h, re, im, row, zero_tolerance);
        }
    }
}

fn back_substitute_real_vector<T: FloatScalar>(
    h: &mut Matrix<T>,
    re: &[T],
    im: &[T],
    row: usize,
    zero_tolerance: T,
) {
    let mut k = row;
    h[(row, row)] = T::one();

    // Carried between a conjugate-pair's two passes.
    let mut u3 = T::zero();
    let mut v1 = T::zero();

    for i in (0..row).rev() {
        let u0 = h[(i, i)] - re[row];
        let mut v0 = h[(i, row)];
        for j in k..row {
            v0 = v0 + h[(i, j)] * h[(j, row)];
        }

        if im[i] < T::zero() {
            u3 = u0;
            v1 = v0;
        } else {
            k = i;
            if im[i] == T::zero() {
                h[(i, row)] = if u0 != T::zero() {
                    T::zero() - v0 / u0
                } else {
                    T::zero() - v0 / zero_tolerance
                };
            } else {
                let u1 = h[(i, i + 1)];
                let u2 = h[(i + 1, i)];
                let mut x = re[i] - re[row];
                x = x * x + im[i] * im[i];
                h[(i, row)] = (u1 * v1 - u3 * v0) / x;
                h[(i + 1, row)] = if u1.abs() > u3.abs() {
                    T::zero() - (v0 + u0 * h[(i, row)]) / u1
                } else {
                    T::zero() - (v1 + u2 * h[(i, row)]) / u3
                };
            }
        }
    }
}

fn back_substitute_complex_vector<T: FloatScalar>(
    h: &mut Matrix<T>,
    re: &[T],
    im: &[T],
    row: usize,
    zero_tolerance: T,
) {
    let two = T::one() + T::one();
    let mut k = row - 1;

    if h[(row, k)].abs() > h[(row - 1, row)].abs() {
        h[(row - 1, k)] = T::zero() - (h[(row, row)] - re[row]) / h[(row, k)];
        h[(row - 1, row)] = T::zero() - im[row] / h[(row, k)];
    } else {
        let (a, b) = complex_division(
            T::zero() - h[(row - 1, row)],
            T::zero(),
            h[(row - 1, k)] - re[row],
            im[row],
        );
        h[(row - 1, k)] = a;
        h[(row - 1, row)] = b;
    }
    h[(row, k)] = T::one();
    h[(row, row)] = T::zero();

    if row < 2 {
        return;
    }

    // Carried between a conjugate-pair's two passes.
    let mut u3 = T::zero();
    let mut v0 = T::zero();
    let mut v1 = T::zero();

    for i in (0..=(row - 2)).rev() {
        let u0 = h[(i, i)] - re[row];
        let mut w0 = h[(i, row)];
        let mut w1 = T::zero();
        for j in k..row {
            w0 = w0 + h[(i, j)] * h[(j, row - 1)];
            w1 = w1 + h[(i, j)] * h[(j, row)];
        }

        if im[i] < T::zero() {
            u3 = u0;
            v0 = w0;
            v1 = w1;
        } else {
            k = i;
            if im[i] == T::zero() {
                let (a, b) = complex_division(T::zero() - w0, T::zero() - w1, u0, im[row]);
                h[(i, row - 1)] = a;
                h[(i, row)] = b;
            } else {
                let u1 = h[(i, i + 1)];
                let u2 = h[(i + 1, i)];
                let mut x = re[i] - re[row];
                let y = two * x * im[row];
                x = x * x + im[i] * im[i] - im[row] * im[row];
                if x == T::zero() && y == T::zero() {
                    x = zero_tolerance
                        * (u0.abs() + u1.abs() + u2.abs() + u3.abs() + im[row].abs());
                }
                let (a, b) = complex_division(
                    u1 * v0 - u3 * w0 + w1 * im[row],
                    u1 * v1 - u3 * w1 - w0 * im[row],
                    x,
                    y,
                );
                h[(i, row - 1)] = a;
                h[(i, row)] = b;
                if u1.abs() > u3.abs() + im[row].abs() {
                    h[(i + 1, row - 1)] =
                        T::zero() - w0 - u0 * h[(i, row - 1)] + im[row] * h[(i, row)] / u1;
                    h[(i + 1, row)] =
                        T::zero() - w1 - u0 * h[(i, row)] - im[row] * h[(i, row - 1)] / u1;
                } else {
                    let (a, b) = complex_division(
                        T::zero() - v0 - u2 * h[(i, row - 1)],
                        T::zero() - v1 - u2 * h[(i, row)],
                        u3,
                        im[row],
                    );
                    h[(i + 1, row - 1)] = a;
                    h[(i + 1, row)] = b;
                }
            }
        }
    }
}

/// Premultiply the back-substituted eigenvectors (expressed in H's basis) by
/// the accumulated transform, writing eigenvectors of the original matrix
/// into the columns of `s`.
fn calculate_eigenvectors<T: FloatScalar>(
    h: &Matrix<T>,
    s: &mut Matrix<T>,
    _re: &[T],
    im: &[T],
) {
    let n = h.nrows();
    for k in (0..n).rev() {
        if im[k] < T::zero() {
            for i in 0..n {
                let mut x = T::zero();
                let mut y = T::zero();
                for j in 0..=k {
                    x = x + s[(i, j)] * h[(j, k - 1)];
                    y = y + s[(i, j)] * h[(j, k)];
                }
                s[(i, k - 1)] = x;
                s[(i, k)] = y;
            }
        } else if im[k] == T::zero() {
            for i in 0..n {
                let mut x = T::zero();
                for j in 0..=k {
                    x = x + s[(i, j)] * h[(j, k)];
                }
                s[(i, k)] = x;
            }
        }
    }
}

/// Eigenvalues and eigenvectors of a general square matrix.
///
/// Clones the input, reduces it to Hessenberg form, and runs the double-shift
/// QR iteration. Column i of [`vectors`](Self::vectors) is the eigenvector
/// for eigenvalue i when real; complex conjugate pairs occupy adjacent
/// indices with the positive imaginary part (and the real/imaginary vector
/// columns) at the lower index.
///
/// # Example
///
/// ```
/// use magcal::{EigenDecomposition, Matrix};
///
/// let a = Matrix::from_rows(2, 2, &[2.0_f64, 1.0, 1.0, 2.0]);
/// let eig = EigenDecomposition::new(&a).unwrap();
/// let (re, im) = eig.eigenvalues();
/// let mut sorted = [re[0], re[1]];
/// sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
/// assert!((sorted[0] - 1.0).abs() < 1e-10);
/// assert!((sorted[1] - 3.0).abs() < 1e-10);
/// assert_eq!(im, &[0.0, 0.0]);
/// ```
#[derive(Debug, Clone)]
pub struct EigenDecomposition<T> {
    re: Vec<T>,
    im: Vec<T>,
    vectors: Matrix<T>,
}

impl<T: FloatScalar> EigenDecomposition<T> {
    /// Decompose with the default iteration cap.
    pub fn new(a: &Matrix<T>) -> Result<Self, LinalgError> {
        Self::with_max_iterations(a, DEFAULT_MAX_ITERATIONS)
    }

    /// Decompose with an explicit per-eigenvalue iteration cap.
    pub fn with_max_iterations(a: &Matrix<T>, max_iterations: usize) -> Result<Self, LinalgError> {
        let mut h = a.clone();
        let mut s = hessenberg_in_place(&mut h);
        let (re, im) = eigen_hessenberg(&mut h, &mut s, max_iterations)?;
        Ok(Self { re, im, vectors: s })
    }

    /// Eigenvalues as `(real_parts, imaginary_parts)` slices.
    #[inline]
    pub fn eigenvalues(&self) -> (&[T], &[T]) {
        (&self.re, &self.im)
    }

    /// Eigenvectors, one per column, index-aligned with the eigenvalues.
    /// Not normalized.
    #[inline]
    pub fn vectors(&self) -> &Matrix<T> {
        &self.vectors
    }
}
