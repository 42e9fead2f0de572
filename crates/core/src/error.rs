use thiserror::Error;

#[derive(Error, Debug)]
pub enum RelError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Pedigree contains a cycle: individual '{0}' is its own ancestor")]
    CyclicPedigree(String),

    #[error("Unknown label(s): {}", .0.join(", "))]
    UnknownLabels(Vec<String>),

    #[error("Dimension mismatch: expected {expected}, got {got} in {context}")]
    DimensionMismatch {
        expected: usize,
        got: usize,
        context: String,
    },

    #[error("Matrix is not positive definite")]
    NotPositiveDefinite,

    #[error("Cholesky factorization failed: {0}")]
    CholeskyFailed(String),

    #[error("Singular triangular factor: zero diagonal at row {0}")]
    SingularFactor(usize),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, RelError>;
