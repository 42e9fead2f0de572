/// The scalar type used throughout the library.
pub type Scalar = f64;

/// Dense matrix type (column-major), used for small cross-checks.
pub type DenseMatrix = nalgebra::DMatrix<Scalar>;

/// Dense vector type.
pub type DenseVector = nalgebra::DVector<Scalar>;

/// Sparse matrix type (CSC or CSR storage).
pub type SparseMat = sprs::CsMat<Scalar>;
