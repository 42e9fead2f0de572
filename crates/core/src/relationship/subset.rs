use rayon::prelude::*;

use crate::error::Result;
use crate::matrix::{SparseCholeskySolver, TripletBuilder};
use crate::pedigree::PedigreeStore;
use crate::relationship::assemble::{crossproduct_transposed, scale_rows_sqrt};
use crate::relationship::geneflow::build_t_inverse;
use crate::relationship::mendelian::mendelian_precision;
use crate::relationship::LabeledMatrix;

/// Number of requested columns above which the solves run in parallel.
const PARALLEL_THRESHOLD: usize = 32;

/// Extract A restricted to `labs` (rows and columns, in the given order)
/// without materializing the full relationship matrix.
///
/// This is the indirect algorithm of Colleau: A⁻¹ is already sparse, so
/// column j of A is the solution of A⁻¹·y = e_j. One sparse Cholesky
/// factorization of A⁻¹ is shared by all k solves; the solves are
/// independent and run in parallel for larger subsets, which leaves the
/// results bitwise identical to the sequential order.
///
/// # Errors
/// `RelError::UnknownLabels` enumerating every requested label absent from
/// the store; `RelError::Validation` on duplicate labels (duplicates are
/// rejected, never silently collapsed).
pub fn extract_subset(store: &PedigreeStore, labs: &[&str]) -> Result<LabeledMatrix> {
    let ids = store.resolve_labels(labs)?;
    let n = store.len();
    let k = ids.len();

    let tinv = build_t_inverse(store);
    let dinv = mendelian_precision(store);
    let ainv = crossproduct_transposed(&scale_rows_sqrt(&tinv, &dinv));
    log::debug!(
        "subset extraction: {} of {} individuals, A-inverse nnz = {}",
        k,
        n,
        ainv.nnz()
    );

    let solver = SparseCholeskySolver::new(&ainv)?;

    let columns: Vec<Vec<f64>> = if k >= PARALLEL_THRESHOLD {
        ids.par_iter()
            .map(|&j| solver.solve_basis(j))
            .collect::<Result<_>>()?
    } else {
        ids.iter()
            .map(|&j| solver.solve_basis(j))
            .collect::<Result<_>>()?
    };

    let mut builder = TripletBuilder::new(k, k);
    for (c, col) in columns.iter().enumerate() {
        for (r, &id) in ids.iter().enumerate() {
            let v = col[id];
            if v != 0.0 {
                builder.add(r, c, v);
            }
        }
    }

    let labels = labs.iter().map(|l| l.to_string()).collect();
    Ok(LabeledMatrix::new(labels, builder.to_csc()))
}
