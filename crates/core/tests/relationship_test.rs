//! Integration tests for the relationship-matrix pipeline, validated
//! against worked pedigree examples from the quantitative-genetics
//! literature.
//!
//! The 5-animal pedigree and its A-inverse follow Mrode (2014), Linear
//! Models for the Prediction of Animal Breeding Values, Table 2.1. The
//! 6-individual pedigree exercises inbreeding: individuals 5 and 6 both
//! carry F = 0.125.

use approx::assert_relative_eq;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use pedigree_relmat_core::relationship::LabeledMatrix;
use pedigree_relmat_core::types::DenseMatrix;
use pedigree_relmat_core::{
    complete, extract_subset, gene_flow_inverse, inbreeding, mendelian_precision,
    mendelian_variance, prune, relationship_inverse, relationship_matrix, PedigreeRows,
    PedigreeStore,
};

/// sire = (-, -, 1, 1, 4, 5), dam = (-, -, 2, -, 3, 2).
fn inbred_6_pedigree() -> PedigreeStore {
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

/// Mrode Table 2.1 (5 animals, no inbreeding).
fn mrode_5_pedigree() -> PedigreeStore {
    PedigreeRows::from_triples(&[
        ("1", None, None),
        ("2", None, None),
        ("3", Some("1"), None),
        ("4", Some("1"), Some("2")),
        ("5", Some("3"), Some("2")),
    ])
    .into_store()
    .unwrap()
}

fn to_dense(m: &LabeledMatrix) -> DenseMatrix {
    let n = m.dim();
    let mut out = DenseMatrix::zeros(n, n);
    for (val, (i, j)) in m.matrix().iter() {
        out[(i, j)] += *val;
    }
    out
}

#[test]
fn worked_inbreeding_and_variances() {
    let store = inbred_6_pedigree();

    let f = inbreeding(&store);
    let expected_f = [0.0, 0.0, 0.0, 0.0, 0.125, 0.125];
    for (i, &e) in expected_f.iter().enumerate() {
        assert_relative_eq!(f[i], e, epsilon = 1e-12);
    }

    let d = mendelian_variance(&store);
    let expected_d = [1.0, 1.0, 0.5, 0.75, 0.5, 0.46875];
    for (i, &e) in expected_d.iter().enumerate() {
        assert_relative_eq!(d[i], e, epsilon = 1e-12);
    }

    let dinv = mendelian_precision(&store);
    for i in 0..6 {
        assert_relative_eq!(dinv[i], 1.0 / d[i], epsilon = 1e-12);
    }
}

#[test]
fn gene_flow_inverse_closed_form() {
    let store = inbred_6_pedigree();
    let tinv = gene_flow_inverse(&store);

    assert_eq!(tinv.labels(), store.labels());
    let expected_row_3 = [-0.5, -0.5, 1.0, 0.0, 0.0, 0.0];
    for (j, &e) in expected_row_3.iter().enumerate() {
        assert_relative_eq!(tinv.get(2, j), e);
    }
}

#[test]
fn matrix_and_inverse_are_consistent() {
    let store = inbred_6_pedigree();
    let f = inbreeding(&store);

    let a = relationship_matrix(&store, None).unwrap();
    assert_eq!(a.labels(), store.labels());

    let ad = to_dense(&a);
    for i in 0..6 {
        assert_relative_eq!(ad[(i, i)], 1.0 + f[i], epsilon = 1e-12);
        for j in 0..6 {
            assert_relative_eq!(ad[(i, j)], ad[(j, i)], epsilon = 1e-12);
        }
    }

    let ainvd = to_dense(&relationship_inverse(&store, None).unwrap());
    let product = &ad * &ainvd;
    let identity = DenseMatrix::identity(6, 6);
    for i in 0..6 {
        for j in 0..6 {
            assert_relative_eq!(product[(i, j)], identity[(i, j)], epsilon = 1e-9);
        }
    }
}

#[test]
fn mrode_a_inverse_reference_values() {
    let store = mrode_5_pedigree();
    let ainv = to_dense(&relationship_inverse(&store, None).unwrap());

    let expected = [
        [11.0 / 6.0, 0.5, -2.0 / 3.0, -1.0, 0.0],
        [0.5, 2.0, 0.5, -1.0, -1.0],
        [-2.0 / 3.0, 0.5, 11.0 / 6.0, 0.0, -1.0],
        [-1.0, -1.0, 0.0, 2.0, 0.0],
        [0.0, -1.0, -1.0, 0.0, 2.0],
    ];
    for i in 0..5 {
        for j in 0..5 {
            assert_relative_eq!(ainv[(i, j)], expected[i][j], epsilon = 1e-10);
        }
    }
}

#[test]
fn mrode_a_matrix_reference_values() {
    let store = mrode_5_pedigree();
    let a = to_dense(&relationship_matrix(&store, None).unwrap());

    // No inbreeding anywhere in this pedigree.
    for i in 0..5 {
        assert_relative_eq!(a[(i, i)], 1.0, epsilon = 1e-12);
    }
    assert_relative_eq!(a[(0, 2)], 0.5, epsilon = 1e-12);
    assert_relative_eq!(a[(0, 3)], 0.5, epsilon = 1e-12);
    assert_relative_eq!(a[(1, 4)], 0.5, epsilon = 1e-12);
    assert_relative_eq!(a[(3, 4)], 0.375, epsilon = 1e-12);
    assert_relative_eq!(a[(0, 1)], 0.0, epsilon = 1e-12);
}

#[test]
fn permutation_invariance_under_relabeling() {
    // Shuffle row order, let completion restore a valid ordering, and
    // check that every relationship survives keyed by label.
    let triples = [
        ("1", None, None),
        ("2", None, None),
        ("3", Some("1"), Some("2")),
        ("4", Some("1"), None),
        ("5", Some("4"), Some("3")),
        ("6", Some("5"), Some("2")),
    ];
    let reference = relationship_matrix(&inbred_6_pedigree(), None).unwrap();
    let ref_store = inbred_6_pedigree();

    let mut rng = rand::rngs::StdRng::seed_from_u64(42);
    for _ in 0..5 {
        let mut shuffled = triples.to_vec();
        shuffled.shuffle(&mut rng);

        let rows = PedigreeRows::from_triples(&shuffled);
        let store = complete(&rows).unwrap().rows.into_store().unwrap();
        let a = relationship_matrix(&store, None).unwrap();

        for li in ["1", "2", "3", "4", "5", "6"] {
            for lj in ["1", "2", "3", "4", "5", "6"] {
                let orig = reference.get(
                    ref_store.id_of(li).unwrap(),
                    ref_store.id_of(lj).unwrap(),
                );
                let perm = a.get(store.id_of(li).unwrap(), store.id_of(lj).unwrap());
                assert_relative_eq!(perm, orig, epsilon = 1e-12);
            }
        }
    }
}

#[test]
fn subset_extraction_equals_full_restriction() {
    // Labels deliberately different from any internal id.
    let store = PedigreeRows::from_triples(&[
        ("n101", None, None),
        ("n102", None, None),
        ("n103", Some("n101"), Some("n102")),
        ("n104", Some("n101"), None),
        ("n105", Some("n104"), Some("n103")),
        ("n106", Some("n105"), Some("n102")),
    ])
    .into_store()
    .unwrap();

    let full = relationship_matrix(&store, None).unwrap();

    for labs in [
        vec!["n103", "n105", "n106"],
        vec!["n106", "n105", "n103"],
        vec!["n106", "n101"],
        vec!["n101", "n102", "n103", "n104", "n105", "n106"],
    ] {
        let sub = extract_subset(&store, &labs).unwrap();
        assert_eq!(sub.labels().len(), labs.len());
        for (r, rl) in labs.iter().enumerate() {
            assert_eq!(&sub.labels()[r], rl);
            for (c, cl) in labs.iter().enumerate() {
                let i = store.id_of(rl).unwrap();
                let j = store.id_of(cl).unwrap();
                assert_relative_eq!(sub.get(r, c), full.get(i, j), epsilon = 1e-9);
            }
        }
    }
}

#[test]
fn completion_repairs_and_orders() {
    // Parent listed after child and two ancestors never declared.
    let rows = PedigreeRows::from_triples(&[
        ("calf", Some("bull"), Some("cow")),
        ("cow", Some("gsire"), Some("gdam")),
        ("bull", None, None),
    ]);
    let done = complete(&rows).unwrap();
    assert_eq!(done.rows.len(), 5);

    let store = done.rows.into_store().unwrap();
    for i in 0..store.len() {
        for p in [store.sire(i), store.dam(i)].into_iter().flatten() {
            assert!(p < i, "parent {} not before child {}", p, i);
        }
    }
    let calf = store.id_of("calf").unwrap();
    assert_eq!(store.sire(calf), store.id_of("bull"));
    assert_eq!(store.dam(calf), store.id_of("cow"));
}

#[test]
fn prune_generation_budgets() {
    let store = inbred_6_pedigree();

    // Zero generations: selection only.
    let only = prune(&store, &["6"], 0).unwrap();
    assert_eq!(only.labels, vec!["6"]);

    // Beyond the pedigree depth, the result stops changing.
    let at_depth = prune(&store, &["6"], 3).unwrap();
    let beyond = prune(&store, &["6"], 100).unwrap();
    assert_eq!(at_depth.labels, beyond.labels);
    assert_eq!(at_depth.labels, vec!["1", "2", "3", "4", "5", "6"]);

    // The reduced pedigree reproduces the same inbreeding for the kept
    // individuals when all ancestors are retained.
    let sub_store = beyond.into_store().unwrap();
    let f_sub = inbreeding(&sub_store);
    let f_full = inbreeding(&store);
    let id_sub = sub_store.id_of("6").unwrap();
    let id_full = store.id_of("6").unwrap();
    assert_relative_eq!(f_sub[id_sub], f_full[id_full], epsilon = 1e-12);
}

#[test]
fn validation_failures() {
    // Reserved label.
    let rows = PedigreeRows::from_triples(&[("0", None, None)]);
    assert!(rows.into_store().is_err());

    // Mismatched lengths.
    let rows = PedigreeRows {
        labels: vec!["1".into(), "2".into()],
        sires: vec![None, None],
        dams: vec![None],
    };
    assert!(rows.into_store().is_err());

    // Cyclic pedigree.
    let rows = PedigreeRows::from_triples(&[
        ("a", Some("b"), None),
        ("b", Some("a"), None),
    ]);
    assert!(complete(&rows).is_err());
}
