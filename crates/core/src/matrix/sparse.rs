use sprs::{CsMat, TriMat};

use crate::error::{RelError, Result};

/// Incremental sparse matrix builder using triplet (COO) format.
///
/// Duplicate entries at the same (row, col) are summed when converting to
/// compressed form, which is the natural behavior when accumulating
/// parent-slot contributions.
#[derive(Debug)]
pub struct TripletBuilder {
    triplet: TriMat<f64>,
}

impl TripletBuilder {
    /// Create a new builder for a matrix of the given dimensions.
    pub fn new(nrow: usize, ncol: usize) -> Self {
        Self {
            triplet: TriMat::new((nrow, ncol)),
        }
    }

    /// Add a value at (row, col). Duplicate entries will be summed.
    pub fn add(&mut self, row: usize, col: usize, val: f64) {
        self.triplet.add_triplet(row, col, val);
    }

    /// Add a symmetric entry: inserts at both (row, col) and (col, row).
    /// If row == col, only one entry is added.
    pub fn add_symmetric(&mut self, row: usize, col: usize, val: f64) {
        self.triplet.add_triplet(row, col, val);
        if row != col {
            self.triplet.add_triplet(col, row, val);
        }
    }

    /// Convert to a CSC (Compressed Sparse Column) matrix.
    pub fn to_csc(&self) -> CsMat<f64> {
        self.triplet.to_csc()
    }

    /// Convert to a CSR (Compressed Sparse Row) matrix.
    pub fn to_csr(&self) -> CsMat<f64> {
        self.triplet.to_csr()
    }
}

/// Create a sparse identity matrix of dimension n in CSC format.
pub fn sparse_identity(n: usize) -> CsMat<f64> {
    sparse_diagonal(&vec![1.0; n])
}

/// Create a sparse diagonal matrix from a vector of diagonal values.
pub fn sparse_diagonal(diag: &[f64]) -> CsMat<f64> {
    let n = diag.len();
    let mut tri = TriMat::new((n, n));
    for (i, &val) in diag.iter().enumerate() {
        tri.add_triplet(i, i, val);
    }
    tri.to_csc()
}

/// Multiply a sparse matrix by a dense vector: result = A * x.
pub fn spmv(a: &CsMat<f64>, x: &[f64]) -> Vec<f64> {
    assert_eq!(a.cols(), x.len());
    let mut result = vec![0.0; a.rows()];
    for (val, (row, col)) in a.iter() {
        result[row] += val * x[col];
    }
    result
}

/// Solve L * x = b by forward substitution for a sparse lower-triangular L
/// with explicitly stored diagonal (CSR preferred; converted if needed).
///
/// # Errors
/// `RelError::SingularFactor` if a diagonal entry is missing or zero.
pub fn lower_triangular_solve(l: &CsMat<f64>, b: &[f64]) -> Result<Vec<f64>> {
    let n = l.rows();
    if l.cols() != n || b.len() != n {
        return Err(RelError::DimensionMismatch {
            expected: n,
            got: if l.cols() != n { l.cols() } else { b.len() },
            context: "lower_triangular_solve".to_string(),
        });
    }

    let csr = if l.is_csr() { l.clone() } else { l.to_csr() };
    let mut x = b.to_vec();
    for i in 0..n {
        let mut diag = 0.0;
        let mut sum = x[i];
        if let Some(row) = csr.outer_view(i) {
            for (j, &val) in row.iter() {
                if j < i {
                    sum -= val * x[j];
                } else if j == i {
                    diag = val;
                }
            }
        }
        if diag == 0.0 {
            return Err(RelError::SingularFactor(i));
        }
        x[i] = sum / diag;
    }
    Ok(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_triplet_builder_sums_duplicates() {
        let mut builder = TripletBuilder::new(2, 2);
        builder.add(0, 0, 1.5);
        builder.add(0, 0, 2.5);
        let mat = builder.to_csc();
        let result = spmv(&mat, &[1.0, 0.0]);
        assert_relative_eq!(result[0], 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_triplet_symmetric() {
        let mut builder = TripletBuilder::new(3, 3);
        builder.add_symmetric(0, 1, 5.0);
        builder.add_symmetric(2, 2, 3.0);
        let mat = builder.to_csc();
        let result = spmv(&mat, &[1.0, 1.0, 1.0]);
        assert_relative_eq!(result[0], 5.0);
        assert_relative_eq!(result[1], 5.0);
        assert_relative_eq!(result[2], 3.0);
    }

    #[test]
    fn test_identity_and_diagonal() {
        let eye = sparse_identity(3);
        assert_eq!(spmv(&eye, &[1.0, 2.0, 3.0]), vec![1.0, 2.0, 3.0]);

        let d = sparse_diagonal(&[2.0, 3.0, 5.0]);
        assert_eq!(spmv(&d, &[1.0, 1.0, 1.0]), vec![2.0, 3.0, 5.0]);
    }

    #[test]
    fn test_spmv_rectangular() {
        // [[1, 0, 2], [0, 3, 0]]
        let mut builder = TripletBuilder::new(2, 3);
        builder.add(0, 0, 1.0);
        builder.add(0, 2, 2.0);
        builder.add(1, 1, 3.0);
        let mat = builder.to_csc();
        let result = spmv(&mat, &[1.0, 2.0, 3.0]);
        assert_relative_eq!(result[0], 7.0);
        assert_relative_eq!(result[1], 6.0);
    }

    #[test]
    fn test_lower_triangular_solve() {
        // L = [[2, 0, 0], [1, 1, 0], [0, -1, 4]]
        let mut builder = TripletBuilder::new(3, 3);
        builder.add(0, 0, 2.0);
        builder.add(1, 0, 1.0);
        builder.add(1, 1, 1.0);
        builder.add(2, 1, -1.0);
        builder.add(2, 2, 4.0);
        let l = builder.to_csr();

        // b = L * [1, 2, 3] = [2, 3, 10]
        let x = lower_triangular_solve(&l, &[2.0, 3.0, 10.0]).unwrap();
        assert_relative_eq!(x[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(x[1], 2.0, epsilon = 1e-12);
        assert_relative_eq!(x[2], 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_lower_triangular_solve_unit_diagonal() {
        // Unit lower-triangular with two off-diagonal -0.5 entries per row,
        // the shape of a gene-flow inverse.
        let mut builder = TripletBuilder::new(3, 3);
        for i in 0..3 {
            builder.add(i, i, 1.0);
        }
        builder.add(2, 0, -0.5);
        builder.add(2, 1, -0.5);
        let l = builder.to_csr();

        let x = lower_triangular_solve(&l, &[1.0, 0.0, 0.0]).unwrap();
        assert_relative_eq!(x[0], 1.0);
        assert_relative_eq!(x[1], 0.0);
        assert_relative_eq!(x[2], 0.5);
    }

    #[test]
    fn test_singular_factor_detected() {
        let mut builder = TripletBuilder::new(2, 2);
        builder.add(0, 0, 1.0);
        builder.add(1, 0, 1.0);
        // no (1, 1) entry
        let l = builder.to_csr();
        assert!(matches!(
            lower_triangular_solve(&l, &[1.0, 1.0]),
            Err(RelError::SingularFactor(1))
        ));
    }
}
