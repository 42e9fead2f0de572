pub mod error;
pub mod matrix;
pub mod pedigree;
pub mod relationship;
pub mod types;

pub use error::{RelError, Result};
pub use pedigree::{complete, prune, CompletedPedigree, PedigreeRows, PedigreeStore};
pub use relationship::{
    extract_subset, gene_flow, gene_flow_inverse, inbreeding, mendelian_precision,
    mendelian_variance, relationship_factor, relationship_factor_inverse, relationship_inverse,
    relationship_matrix, LabeledMatrix,
};
