// Relationship algebra: gene-flow factors, inbreeding, Mendelian sampling
// variance, and the assembled relationship matrix family.

pub mod assemble;
pub mod geneflow;
pub mod inbreeding;
pub mod mendelian;
pub mod subset;

pub use inbreeding::inbreeding;
pub use mendelian::{
    mendelian_precision, mendelian_precision_diagonal, mendelian_precision_with,
    mendelian_variance, mendelian_variance_diagonal, mendelian_variance_with,
};
pub use subset::extract_subset;

use crate::error::Result;
use crate::matrix::sparse::lower_triangular_solve;
use crate::matrix::{sparse_cholesky_factor, SparseCholeskySolver, TripletBuilder};
use crate::pedigree::PedigreeStore;
use crate::types::SparseMat;

use assemble::{crossproduct, crossproduct_transposed, scale_columns_sqrt, scale_rows_sqrt};
use geneflow::{build_t, build_t_inverse};

/// A sparse matrix whose rows and columns are indexed by external pedigree
/// labels (store order, or the caller's explicit order for subsets).
#[derive(Debug, Clone)]
pub struct LabeledMatrix {
    labels: Vec<String>,
    matrix: SparseMat,
}

impl LabeledMatrix {
    pub(crate) fn new(labels: Vec<String>, matrix: SparseMat) -> Self {
        debug_assert_eq!(labels.len(), matrix.rows());
        debug_assert_eq!(labels.len(), matrix.cols());
        Self { labels, matrix }
    }

    /// Row/column labels.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// The underlying sparse matrix.
    pub fn matrix(&self) -> &SparseMat {
        &self.matrix
    }

    /// Dimension (the matrix is always square).
    pub fn dim(&self) -> usize {
        self.labels.len()
    }

    /// Entry at (row, col), zero if not stored.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.matrix.get(row, col).copied().unwrap_or(0.0)
    }

    pub fn into_parts(self) -> (Vec<String>, SparseMat) {
        (self.labels, self.matrix)
    }
}

fn store_labels(store: &PedigreeStore) -> Vec<String> {
    store.labels().to_vec()
}

/// The gene-flow matrix T, labeled in store order.
pub fn gene_flow(store: &PedigreeStore) -> LabeledMatrix {
    LabeledMatrix::new(store_labels(store), build_t(store))
}

/// The inverse gene-flow matrix T⁻¹ in its O(n)-sparse closed form,
/// labeled in store order.
pub fn gene_flow_inverse(store: &PedigreeStore) -> LabeledMatrix {
    LabeledMatrix::new(store_labels(store), build_t_inverse(store))
}

/// The additive relationship matrix A = T·diag(D)·Tᵗ, assembled as the
/// crossproduct of the scaled factor L = T·diag(√D).
///
/// With `labs`, delegates to [`extract_subset`] — the restriction of A is
/// computed indirectly and full A is never formed.
pub fn relationship_matrix(store: &PedigreeStore, labs: Option<&[&str]>) -> Result<LabeledMatrix> {
    match labs {
        Some(labs) => extract_subset(store, labs),
        None => {
            let f = inbreeding(store);
            let d = mendelian_variance_with(store, &f);
            let l = scale_columns_sqrt(&build_t(store), &d);
            Ok(LabeledMatrix::new(store_labels(store), crossproduct(&l)))
        }
    }
}

/// The inverse relationship matrix A⁻¹ = (T⁻¹)ᵗ·diag(D⁻¹)·T⁻¹, built from
/// the two O(n)-nonzero factors (Henderson). A is never formed and then
/// inverted.
///
/// With `labs`, the inverse of the *restricted* matrix A[labs, labs] is
/// returned (the restriction of A⁻¹ would be a different object): the block
/// is extracted indirectly, then inverted through its sparse Cholesky
/// factorization.
pub fn relationship_inverse(store: &PedigreeStore, labs: Option<&[&str]>) -> Result<LabeledMatrix> {
    match labs {
        Some(labs) => {
            let block = extract_subset(store, labs)?;
            let solver = SparseCholeskySolver::new(block.matrix())?;
            let k = block.dim();
            let mut builder = TripletBuilder::new(k, k);
            for j in 0..k {
                let col = solver.solve_basis(j)?;
                for (i, &v) in col.iter().enumerate() {
                    if v != 0.0 {
                        builder.add(i, j, v);
                    }
                }
            }
            let (labels, _) = block.into_parts();
            Ok(LabeledMatrix::new(labels, builder.to_csc()))
        }
        None => {
            let dinv = mendelian_precision(store);
            let linv = scale_rows_sqrt(&build_t_inverse(store), &dinv);
            Ok(LabeledMatrix::new(
                store_labels(store),
                crossproduct_transposed(&linv),
            ))
        }
    }
}

/// The lower relationship factor L with A = L·Lᵗ.
///
/// For the full pedigree L = T·diag(√D) in closed form — no general sparse
/// Cholesky is needed (the upper factor R = Lᵗ is a transpose view away).
/// For a `labs` restriction the extracted block is factored instead, and
/// the result stays in the same sparse representation as every other
/// output.
pub fn relationship_factor(store: &PedigreeStore, labs: Option<&[&str]>) -> Result<LabeledMatrix> {
    match labs {
        Some(labs) => {
            let block = extract_subset(store, labs)?;
            let factor = sparse_cholesky_factor(block.matrix())?;
            let (labels, _) = block.into_parts();
            Ok(LabeledMatrix::new(labels, factor))
        }
        None => {
            let d = mendelian_variance(store);
            let l = scale_columns_sqrt(&build_t(store), &d);
            Ok(LabeledMatrix::new(store_labels(store), l.to_csc()))
        }
    }
}

/// The inverse relationship factor L⁻¹ = diag(√D⁻¹)·T⁻¹, reusing the
/// existing sparse factors without any matrix inversion. For a `labs`
/// restriction, the block's Cholesky factor is inverted by forward
/// substitution column by column.
pub fn relationship_factor_inverse(
    store: &PedigreeStore,
    labs: Option<&[&str]>,
) -> Result<LabeledMatrix> {
    match labs {
        Some(labs) => {
            let block = extract_subset(store, labs)?;
            let factor = sparse_cholesky_factor(block.matrix())?;
            let k = block.dim();
            let mut builder = TripletBuilder::new(k, k);
            for j in 0..k {
                let mut e = vec![0.0; k];
                e[j] = 1.0;
                let col = lower_triangular_solve(&factor, &e)?;
                for (i, &v) in col.iter().enumerate() {
                    if v != 0.0 {
                        builder.add(i, j, v);
                    }
                }
            }
            let (labels, _) = block.into_parts();
            Ok(LabeledMatrix::new(labels, builder.to_csc()))
        }
        None => {
            let dinv = mendelian_precision(store);
            let linv = scale_rows_sqrt(&build_t_inverse(store), &dinv);
            Ok(LabeledMatrix::new(store_labels(store), linv.to_csc()))
        }
    }
}
