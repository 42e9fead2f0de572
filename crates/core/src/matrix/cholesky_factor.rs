use sprs::{CsMat, TriMat};

use crate::error::{RelError, Result};

/// Compute a sparse Cholesky factorization A = L·Lᵗ (left-looking).
///
/// Returns L as a lower-triangular sparse matrix in CSC format. `a` must be
/// symmetric positive definite. The factor uses a dense working triangle,
/// so this is intended for subset-sized blocks and cross-checks, not for a
/// full relationship matrix — the full-pedigree factor has a closed sparse
/// form and never goes through here.
///
/// # Errors
/// `RelError::NotPositiveDefinite` if a pivot is non-positive.
pub fn sparse_cholesky_factor(a: &CsMat<f64>) -> Result<CsMat<f64>> {
    let n = a.rows();
    if n != a.cols() {
        return Err(RelError::DimensionMismatch {
            expected: n,
            got: a.cols(),
            context: "sparse_cholesky_factor: matrix must be square".to_string(),
        });
    }

    let mut dense = vec![vec![0.0; n]; n];
    for (val, (row, col)) in a.iter() {
        dense[row][col] = *val;
    }

    let mut l = vec![vec![0.0; n]; n];
    for j in 0..n {
        let mut sum = dense[j][j];
        for k in 0..j {
            sum -= l[j][k] * l[j][k];
        }
        if sum <= 0.0 {
            return Err(RelError::NotPositiveDefinite);
        }
        l[j][j] = sum.sqrt();

        for i in (j + 1)..n {
            let mut sum = dense[i][j];
            for k in 0..j {
                sum -= l[i][k] * l[j][k];
            }
            l[i][j] = sum / l[j][j];
        }
    }

    let mut tri = TriMat::new((n, n));
    for j in 0..n {
        for i in j..n {
            if l[i][j] != 0.0 {
                tri.add_triplet(i, j, l[i][j]);
            }
        }
    }
    Ok(tri.to_csc())
}
