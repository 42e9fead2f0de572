use crate::matrix::sparse::sparse_diagonal;
use crate::pedigree::PedigreeStore;
use crate::relationship::inbreeding::inbreeding;
use crate::relationship::LabeledMatrix;

/// Mendelian sampling variance of individual `i` given the inbreeding
/// coefficients of its parents: `1 − 0.25·(2 + F_s + F_d)`, an unknown
/// parent contributing F = −1. This yields the familiar cases 1.0 (no
/// parent), 0.75 − 0.25·F_s (one parent) and 0.5 − 0.25·(F_s + F_d).
pub(crate) fn variance_term(store: &PedigreeStore, f: &[f64], i: usize) -> f64 {
    let parent_f = |p: Option<usize>| p.map_or(-1.0, |p| f[p]);
    1.0 - 0.25 * (2.0 + parent_f(store.sire(i)) + parent_f(store.dam(i)))
}

/// Mendelian sampling variances D for a precomputed inbreeding vector.
pub fn mendelian_variance_with(store: &PedigreeStore, f: &[f64]) -> Vec<f64> {
    (0..store.len()).map(|i| variance_term(store, f, i)).collect()
}

/// Mendelian sampling variances D, computing inbreeding on the way.
pub fn mendelian_variance(store: &PedigreeStore) -> Vec<f64> {
    mendelian_variance_with(store, &inbreeding(store))
}

/// Mendelian sampling precisions D⁻¹ (elementwise reciprocal of D).
pub fn mendelian_precision_with(store: &PedigreeStore, f: &[f64]) -> Vec<f64> {
    mendelian_variance_with(store, f).iter().map(|d| 1.0 / d).collect()
}

/// Mendelian sampling precisions D⁻¹, computing inbreeding on the way.
pub fn mendelian_precision(store: &PedigreeStore) -> Vec<f64> {
    mendelian_precision_with(store, &inbreeding(store))
}

/// D as a sparse diagonal matrix, labeled in store order.
pub fn mendelian_variance_diagonal(store: &PedigreeStore) -> LabeledMatrix {
    LabeledMatrix::new(
        store.labels().to_vec(),
        sparse_diagonal(&mendelian_variance(store)),
    )
}

/// D⁻¹ as a sparse diagonal matrix, labeled in store order.
pub fn mendelian_precision_diagonal(store: &PedigreeStore) -> LabeledMatrix {
    LabeledMatrix::new(
        store.labels().to_vec(),
        sparse_diagonal(&mendelian_precision(store)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pedigree::PedigreeRows;
    use approx::assert_relative_eq;

    fn worked_store() -> PedigreeStore {
        PedigreeRows::from_triples(&[
            ("1", None, None),
            ("2", None, None),
            ("3", Some("1"), Some("2")),
            ("4", Some("1"), None),
            ("5", Some("4"), Some("3")),
            ("6", Some("5"), Some("2")),
        ])
        .into_store()
        .unwrap()
    }

    #[test]
    fn test_worked_pedigree_variances() {
        let store = worked_store();
        let d = mendelian_variance(&store);
        let expected = [1.0, 1.0, 0.5, 0.75, 0.5, 0.46875];
        for (i, &e) in expected.iter().enumerate() {
            assert_relative_eq!(d[i], e, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_precision_is_reciprocal() {
        let store = worked_store();
        let d = mendelian_variance(&store);
        let dinv = mendelian_precision(&store);
        for i in 0..store.len() {
            assert_relative_eq!(dinv[i], 1.0 / d[i], epsilon = 1e-12);
        }
    }

    #[test]
    fn test_diagonal_form() {
        let store = worked_store();
        let d = mendelian_variance(&store);
        let diag = mendelian_variance_diagonal(&store);
        assert_eq!(diag.labels(), store.labels());
        assert_eq!(diag.matrix().nnz(), store.len());
        for i in 0..store.len() {
            assert_relative_eq!(diag.get(i, i), d[i]);
        }
    }
}
