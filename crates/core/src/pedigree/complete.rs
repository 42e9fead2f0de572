use indexmap::IndexMap;

use crate::error::{RelError, Result};
use crate::pedigree::store::{is_unknown_code, parse_parent, PedigreeRows};

/// Result of pedigree completion: rows reordered parents-before-progeny,
/// with one generation number per row.
#[derive(Debug, Clone)]
pub struct CompletedPedigree {
    pub rows: PedigreeRows,
    /// Generation number per row: 0 for founders, else
    /// `1 + max(generation(sire), generation(dam))`.
    pub generations: Vec<u32>,
}

#[derive(Clone, Copy, PartialEq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

/// Complete and order a raw pedigree.
///
/// Parent labels referenced but absent from the label column are prepended
/// as founder rows (in order of first reference). Rows are then stably
/// sorted by ascending generation, which guarantees every known parent
/// precedes its progeny; the result converts to a
/// [`PedigreeStore`](crate::pedigree::PedigreeStore) without dropped links.
///
/// Generation numbers are computed by a depth-first traversal over an
/// explicit stack with a per-individual memo. Chains thousands of
/// generations deep must not exhaust the call stack, so no recursion is
/// used anywhere here.
///
/// # Errors
/// `RelError::CyclicPedigree` if an individual is its own ancestor;
/// `RelError::Validation` for the same row-level defects
/// [`PedigreeStore::from_rows`](crate::pedigree::PedigreeStore::from_rows)
/// rejects (mismatched lengths, reserved or duplicate labels).
pub fn complete(rows: &PedigreeRows) -> Result<CompletedPedigree> {
    let n_input = rows.labels.len();
    if rows.sires.len() != n_input || rows.dams.len() != n_input {
        return Err(RelError::Validation(format!(
            "column lengths differ: {} labels, {} sires, {} dams",
            n_input,
            rows.sires.len(),
            rows.dams.len()
        )));
    }

    let mut declared: IndexMap<String, usize> = IndexMap::with_capacity(n_input);
    for (i, label) in rows.labels.iter().enumerate() {
        if is_unknown_code(label) {
            return Err(RelError::Validation(format!(
                "label '{}' at row {} is reserved for unknown parents",
                label, i
            )));
        }
        if declared.insert(label.clone(), i).is_some() {
            return Err(RelError::Validation(format!("duplicate label '{}'", label)));
        }
    }

    let norm = |p: &Option<String>| p.as_deref().and_then(parse_parent);

    // Parent labels never declared become founder rows, prepended in order
    // of first reference.
    let mut missing: IndexMap<String, ()> = IndexMap::new();
    for i in 0..n_input {
        for parent in [norm(&rows.sires[i]), norm(&rows.dams[i])].into_iter().flatten() {
            if !declared.contains_key(&parent) {
                missing.entry(parent).or_insert(());
            }
        }
    }

    let n = missing.len() + n_input;
    let mut labels: Vec<String> = Vec::with_capacity(n);
    let mut sires: Vec<Option<String>> = Vec::with_capacity(n);
    let mut dams: Vec<Option<String>> = Vec::with_capacity(n);
    for label in missing.keys() {
        labels.push(label.clone());
        sires.push(None);
        dams.push(None);
    }
    for i in 0..n_input {
        labels.push(rows.labels[i].clone());
        sires.push(norm(&rows.sires[i]));
        dams.push(norm(&rows.dams[i]));
    }

    let mut index_of: IndexMap<&str, usize> = IndexMap::with_capacity(n);
    for (i, label) in labels.iter().enumerate() {
        index_of.insert(label.as_str(), i);
    }
    let parent_ids = |i: usize| -> [Option<usize>; 2] {
        [&sires[i], &dams[i]].map(|p| p.as_deref().map(|l| index_of[l]))
    };

    // Generation numbers, bottom-up. The in-progress marker doubles as the
    // cycle detector: reaching an in-progress individual from below means it
    // is its own ancestor.
    let mut generation = vec![0u32; n];
    let mut mark = vec![Mark::Unvisited; n];
    let mut stack: Vec<usize> = Vec::new();

    for start in 0..n {
        if mark[start] != Mark::Unvisited {
            continue;
        }
        stack.push(start);
        while let Some(&i) = stack.last() {
            match mark[i] {
                Mark::Done => {
                    stack.pop();
                }
                Mark::Unvisited => {
                    mark[i] = Mark::InProgress;
                    for p in parent_ids(i).into_iter().flatten() {
                        match mark[p] {
                            Mark::InProgress => {
                                return Err(RelError::CyclicPedigree(labels[p].clone()))
                            }
                            Mark::Unvisited => stack.push(p),
                            Mark::Done => {}
                        }
                    }
                }
                Mark::InProgress => {
                    // Both parents (if any) are Done by now.
                    generation[i] = parent_ids(i)
                        .into_iter()
                        .flatten()
                        .map(|p| generation[p] + 1)
                        .max()
                        .unwrap_or(0);
                    mark[i] = Mark::Done;
                    stack.pop();
                }
            }
        }
    }

    // Stable sort keeps the relative order of rows within a generation, so
    // an already-ordered pedigree comes back unchanged up to row order.
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by_key(|&i| generation[i]);

    let mut out = PedigreeRows::default();
    let mut out_gen = Vec::with_capacity(n);
    for &i in &order {
        out.labels.push(labels[i].clone());
        out.sires.push(sires[i].clone());
        out.dams.push(dams[i].clone());
        out_gen.push(generation[i]);
    }

    Ok(CompletedPedigree {
        rows: out,
        generations: out_gen,
    })
}
