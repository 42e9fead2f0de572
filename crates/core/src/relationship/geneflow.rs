use sprs::TriMat;

use crate::matrix::TripletBuilder;
use crate::pedigree::PedigreeStore;
use crate::types::SparseMat;

/// Build the inverse gene-flow matrix T⁻¹ in its closed sparse form.
///
/// T⁻¹ is lower unit-triangular with O(n) nonzeros: row i carries 1 on the
/// diagonal and −0.5 at the columns of its known parents.
pub fn build_t_inverse(store: &PedigreeStore) -> SparseMat {
    let n = store.len();
    let mut builder = TripletBuilder::new(n, n);
    for i in 0..n {
        builder.add(i, i, 1.0);
        for p in [store.sire(i), store.dam(i)].into_iter().flatten() {
            builder.add(i, p, -0.5);
        }
    }
    builder.to_csr()
}

/// Derive the gene-flow matrix T by forward substitution of T⁻¹ against
/// each standard basis column.
///
/// Because T⁻¹ is unit-triangular with parent-slot structure, the
/// substitution reduces to `x[i] = e_j[i] + 0.5·(x[sire] + x[dam])` per
/// row, never an explicit dense inversion. T[i, j] is the expected genome
/// fraction ancestor j contributes to individual i and can be dense in the
/// number of ancestors.
pub fn build_t(store: &PedigreeStore) -> SparseMat {
    let n = store.len();
    let mut tri = TriMat::new((n, n));
    let mut x = vec![0.0; n];
    for j in 0..n {
        x[j] = 1.0;
        tri.add_triplet(j, j, 1.0);
        for i in (j + 1)..n {
            let mut v = 0.0;
            for p in [store.sire(i), store.dam(i)].into_iter().flatten() {
                v += 0.5 * x[p];
            }
            x[i] = v;
            if v != 0.0 {
                tri.add_triplet(i, j, v);
            }
        }
        x[j..].fill(0.0);
    }
    tri.to_csr()
}
