use sprs::TriMat;

use crate::types::SparseMat;

/// Scale the columns of a sparse matrix by `√scale[j]`.
///
/// Applied to T this yields the relationship factor L = T·diag(√D), the
/// lower-triangular factor with A = L·Lᵗ.
pub fn scale_columns_sqrt(mat: &SparseMat, scale: &[f64]) -> SparseMat {
    let mut tri = TriMat::new((mat.rows(), mat.cols()));
    for (val, (i, j)) in mat.iter() {
        tri.add_triplet(i, j, val * scale[j].sqrt());
    }
    tri.to_csr()
}

/// Scale the rows of a sparse matrix by `√scale[i]`.
///
/// Applied to T⁻¹ this yields the inverse factor L⁻¹ = diag(√D⁻¹)·T⁻¹,
/// with A⁻¹ = (L⁻¹)ᵗ·L⁻¹.
pub fn scale_rows_sqrt(mat: &SparseMat, scale: &[f64]) -> SparseMat {
    let mut tri = TriMat::new((mat.rows(), mat.cols()));
    for (val, (i, j)) in mat.iter() {
        tri.add_triplet(i, j, val * scale[i].sqrt());
    }
    tri.to_csr()
}

/// Symmetric crossproduct M·Mᵗ of a sparse factor, in CSC form.
///
/// With M = L this assembles A = T·diag(D)·Tᵗ; the scaled-factor
/// crossproduct keeps the output sparse-symmetric without ever forming a
/// dense triple product.
pub fn crossproduct(factor: &SparseMat) -> SparseMat {
    let transposed = factor.transpose_view().to_owned();
    (factor * &transposed).to_csc()
}

/// Symmetric crossproduct Mᵗ·M of a sparse factor, in CSC form.
///
/// With M = L⁻¹ this assembles A⁻¹ = (T⁻¹)ᵗ·diag(D⁻¹)·T⁻¹ — Henderson's
/// construction: A⁻¹ emerges from two O(n)-nonzero factors and stays
/// sparse no matter how dense A itself is. A is never formed and inverted.
pub fn crossproduct_transposed(factor: &SparseMat) -> SparseMat {
    let transposed = factor.transpose_view().to_owned();
    (&transposed * factor).to_csc()
}
