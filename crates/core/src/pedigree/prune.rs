use crate::error::Result;
use crate::pedigree::store::{PedigreeRows, PedigreeStore};

/// Restrict a pedigree to selected individuals plus `n_gen` ancestor
/// generations.
///
/// The frontier is expanded one generation per step: parents of the current
/// selection not yet included are added, then become the next frontier.
/// `n_gen = 0` returns exactly the selected rows; a budget beyond the
/// pedigree's depth drains the frontier early and is idempotent from there
/// on. The stop condition is the loop bound itself — there is no sentinel
/// value.
///
/// Output rows come back in store order, each individual exactly once.
/// Parent fields pointing outside the result are emitted as unknown, so the
/// returned rows are a valid standalone pedigree (and no all-unknown
/// placeholder rows can arise).
///
/// # Errors
/// `RelError::UnknownLabels` listing every selected label absent from the
/// store.
pub fn prune(store: &PedigreeStore, select: &[&str], n_gen: u32) -> Result<PedigreeRows> {
    let ids = store.resolve_labels(select)?;

    let mut keep = vec![false; store.len()];
    for &id in &ids {
        keep[id] = true;
    }

    let mut frontier = ids;
    for _ in 0..n_gen {
        let mut next = Vec::new();
        for &id in &frontier {
            for p in [store.sire(id), store.dam(id)].into_iter().flatten() {
                if !keep[p] {
                    keep[p] = true;
                    next.push(p);
                }
            }
        }
        if next.is_empty() {
            break;
        }
        frontier = next;
    }

    let mut rows = PedigreeRows::default();
    for id in 0..store.len() {
        if !keep[id] {
            continue;
        }
        let parent_label = |p: Option<usize>| {
            p.filter(|&p| keep[p]).map(|p| store.label(p).to_string())
        };
        rows.labels.push(store.label(id).to_string());
        rows.sires.push(parent_label(store.sire(id)));
        rows.dams.push(parent_label(store.dam(id)));
    }
    Ok(rows)
}
