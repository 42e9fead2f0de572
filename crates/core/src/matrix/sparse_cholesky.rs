//! Sparse Cholesky solves backed by the faer library.
//!
//! Subset extraction solves many independent systems against the same
//! symmetric positive-definite matrix (the relationship inverse), so the
//! factorization is performed once and the factor is reused per right-hand
//! side. faer's AMD-ordered LLT is deterministic for identical input, which
//! keeps repeated extractions reproducible.

use crate::error::{RelError, Result};
use crate::types::SparseMat;

use faer::dyn_stack::{GlobalPodBuffer, PodStack};
use faer::sparse::linalg::cholesky::{factorize_symbolic_cholesky, LltRef, SymbolicCholesky};
use faer::sparse::{CreationError, SparseColMat};
use faer::Parallelism;
use faer::Side;

/// Convert an sprs CSC matrix to faer's column-major sparse format, keeping
/// only the upper triangle (the systems solved here are symmetric).
fn to_faer_upper(matrix: &SparseMat) -> Result<SparseColMat<usize, f64>> {
    let n = matrix.rows();
    if n != matrix.cols() {
        return Err(RelError::DimensionMismatch {
            expected: n,
            got: matrix.cols(),
            context: "sparse Cholesky: matrix must be square".to_string(),
        });
    }

    let csc = if matrix.is_csc() {
        matrix.clone()
    } else {
        matrix.to_csc()
    };

    let mut triplets: Vec<(usize, usize, f64)> = Vec::new();
    for (val, (row, col)) in csc.iter() {
        if row <= col {
            triplets.push((row, col, *val));
        }
    }

    SparseColMat::<usize, f64>::try_new_from_triplets(n, n, &triplets).map_err(|e| match e {
        CreationError::Generic(e) => {
            RelError::CholeskyFailed(format!("failed to create faer sparse matrix: {e}"))
        }
        CreationError::OutOfBounds { row, col } => {
            RelError::CholeskyFailed(format!("index out of bounds: row={row}, col={col}"))
        }
    })
}

/// Sparse LLT factorization of a symmetric positive-definite matrix,
/// factored once and reusable for any number of solves.
pub struct SparseCholeskySolver {
    /// Symbolic factorization (fill-reducing permutation + elimination tree).
    symbolic: SymbolicCholesky<usize>,
    /// Numerical values of the L factor.
    l_values: Vec<f64>,
    /// Dimension of the system.
    dim: usize,
}

impl SparseCholeskySolver {
    /// Analyze the sparsity pattern and factorize numerically.
    ///
    /// Only the upper triangle of `matrix` is used.
    ///
    /// # Errors
    /// `RelError::NotPositiveDefinite` if the numeric factorization fails;
    /// `RelError::CholeskyFailed` on symbolic-analysis or conversion errors.
    pub fn new(matrix: &SparseMat) -> Result<Self> {
        let faer_mat = to_faer_upper(matrix)?;
        let n = matrix.rows();

        let symbolic = factorize_symbolic_cholesky(
            faer_mat.symbolic(),
            Side::Upper,
            Default::default(),
            Default::default(),
        )
        .map_err(|e| RelError::CholeskyFailed(format!("symbolic factorization failed: {e}")))?;

        let mut l_values = vec![0.0f64; symbolic.len_values()];

        let parallelism = Parallelism::None;
        let req = symbolic
            .factorize_numeric_llt_req::<f64>(parallelism)
            .map_err(|e| RelError::CholeskyFailed(format!("memory requirement error: {e}")))?;
        let mut mem = GlobalPodBuffer::new(req);

        symbolic
            .factorize_numeric_llt(
                l_values.as_mut_slice(),
                faer_mat.as_ref(),
                Side::Upper,
                Default::default(),
                parallelism,
                PodStack::new(&mut mem),
            )
            .map_err(|_| RelError::NotPositiveDefinite)?;

        Ok(Self {
            symbolic,
            l_values,
            dim: n,
        })
    }

    /// Solve A * x = b, returning x.
    pub fn solve(&self, rhs: &[f64]) -> Result<Vec<f64>> {
        if rhs.len() != self.dim {
            return Err(RelError::DimensionMismatch {
                expected: self.dim,
                got: rhs.len(),
                context: "sparse Cholesky solve: rhs dimension".to_string(),
            });
        }

        let llt = LltRef::<'_, usize, f64>::new(&self.symbolic, &self.l_values);

        let mut sol_data = rhs.to_vec();
        let sol_mat = faer::mat::from_column_major_slice_mut(&mut sol_data, self.dim, 1);

        let req = self
            .symbolic
            .solve_in_place_req::<f64>(1)
            .map_err(|e| RelError::CholeskyFailed(format!("solve memory error: {e}")))?;
        let mut mem = GlobalPodBuffer::new(req);

        llt.solve_in_place_with_conj(
            faer::Conj::No,
            sol_mat,
            Parallelism::None,
            PodStack::new(&mut mem),
        );

        Ok(sol_data)
    }

    /// Solve A * x = e_j for a standard basis vector, returning column j of
    /// the inverse. This is the workhorse of indirect subset extraction.
    pub fn solve_basis(&self, j: usize) -> Result<Vec<f64>> {
        if j >= self.dim {
            return Err(RelError::DimensionMismatch {
                expected: self.dim,
                got: j,
                context: "sparse Cholesky solve: basis index".to_string(),
            });
        }
        let mut rhs = vec![0.0; self.dim];
        rhs[j] = 1.0;
        self.solve(&rhs)
    }

    /// Dimension of the factored system.
    pub fn dim(&self) -> usize {
        self.dim
    }
}
