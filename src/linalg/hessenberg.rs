use crate::Matrix;
use crate::traits::FloatScalar;

/// Reduce a square matrix to upper Hessenberg form in place, returning the
/// accumulated similarity transform.
///
/// Uses elementary (Gaussian-elimination-style) transforms with partial
/// pivoting: for each column the largest-magnitude entry below the diagonal
/// is brought to the subdiagonal by a joint row/column interchange, then the
/// entries below it are eliminated by row operations with the compensating
/// column operations that keep the transform a similarity.
///
/// On return `a` holds H and the returned matrix S satisfies `A * S = S * H`,
/// so an eigenvector `v` of H maps to the eigenvector `S * v` of A.
///
/// Matrices of order <= 2 are already Hessenberg; `a` is left untouched and
/// the identity transform is returned.
///
/// A pivot column that is entirely zero below the diagonal needs no
/// elimination (the entries below the subdiagonal are already zero) and is
/// skipped, so diagonal and upper-triangular input passes through
/// unchanged.
pub fn hessenberg_in_place<T: FloatScalar>(a: &mut Matrix<T>) -> Matrix<T> {
    let n = a.nrows();
    assert!(a.is_square(), "Hessenberg reduction requires a square matrix");

    if n <= 2 {
        return Matrix::identity(n);
    }

    let mut perm = vec![0usize; n];
    // Multipliers recorded below the subdiagonal, replayed during the
    // transform reconstruction.
    let mut mult = Matrix::zeros(n, n);

    for col in 0..(n - 2) {
        let pivot_row = col + 1;

        // Partial pivoting: largest magnitude in column `col`, rows
        // pivot_row..n.
        perm[pivot_row] = pivot_row;
        let mut max = T::zero();
        for i in pivot_row..n {
            if a[(i, col)].abs() > max {
                perm[pivot_row] = i;
                max = a[(i, col)].abs();
            }
        }
        // Nothing below the diagonal in this column: already reduced.
        if max == T::zero() {
            continue;
        }
        if perm[pivot_row] != pivot_row {
            a.swap_rows(pivot_row, perm[pivot_row]);
            a.swap_cols(pivot_row, perm[pivot_row]);
        }

        // Zero the entries below the subdiagonal: subtract s times the pivot
        // row from row i, then add s times column i to the pivot column so
        // the net effect stays a similarity.
        for i in (col + 2)..n {
            let s = a[(i, col)] / a[(pivot_row, col)];
            for j in 0..n {
                let x = a[(pivot_row, j)] * s;
                a[(i, j)] = a[(i, j)] - x;
            }
            mult[(i, col)] = s;
            for j in 0..n {
                let x = a[(j, i)] * s;
                a[(j, pivot_row)] = a[(j, pivot_row)] + x;
            }
        }
    }

    // Reconstruct S by replaying the multipliers from the last reduced
    // column back to the first, undoing the pivot interchanges as we go.
    let mut s_t = Matrix::identity(n);
    for i in (1..=(n - 2)).rev() {
        for j in (i + 1)..n {
            s_t[(j, i)] = mult[(j, i - 1)];
        }
        if perm[i] != i {
            for j in i..n {
                s_t[(i, j)] = s_t[(perm[i], j)];
                s_t[(perm[i], j)] = T::zero();
            }
            s_t[(perm[i], i)] = T::one();
        }
    }

    // Elimination leaves roundoff residue below the subdiagonal.
    for i in 2..n {
        for j in 0..(i - 1) {
            a[(i, j)] = T::zero();
        }
    }

    s_t
}
