use std::collections::BinaryHeap;

use crate::pedigree::PedigreeStore;
use crate::relationship::mendelian::variance_term;

/// Compute the inbreeding coefficient vector F.
///
/// For individual i with both parents known, F[i] is half the additive
/// relationship between sire and dam over the ancestor sub-pedigree of i;
/// with any parent unknown, F[i] = 0. Rather than tracing sire-dam paths,
/// each F[i] is read off the diagonal identity
///
/// ```text
/// A[i,i] = 1 + F[i] = Σ_j T[i,j]² · D[j]
/// ```
///
/// where the sum runs over the ancestor cone of i. The gene-flow row of i
/// is accumulated over that cone with a max-heap worklist: popping in
/// descending id order guarantees an ancestor's weight is complete before
/// it is expanded, so every (individual, ancestor) pair is visited exactly
/// once per individual (the Meuwissen & Luo bound). The ordering invariant
/// of the store makes a single ascending-id pass sufficient: every D[j]
/// consumed here only involves inbreeding of strictly smaller ids.
///
/// No call recursion anywhere; ancestor chains thousands of generations
/// deep are walked iteratively.
pub fn inbreeding(store: &PedigreeStore) -> Vec<f64> {
    let n = store.len();
    let mut f = vec![0.0; n];

    // Scratch reused across individuals; both are restored to their empty
    // state as the heap drains.
    let mut weight = vec![0.0; n];
    let mut queued = vec![false; n];
    let mut heap: BinaryHeap<usize> = BinaryHeap::new();

    for i in 0..n {
        if store.sire(i).is_none() || store.dam(i).is_none() {
            continue;
        }

        weight[i] = 1.0;
        queued[i] = true;
        heap.push(i);
        let mut self_relationship = 0.0;

        while let Some(j) = heap.pop() {
            queued[j] = false;
            let w = weight[j];
            weight[j] = 0.0;
            self_relationship += w * w * variance_term(store, &f, j);
            for p in [store.sire(j), store.dam(j)].into_iter().flatten() {
                weight[p] += 0.5 * w;
                if !queued[p] {
                    queued[p] = true;
                    heap.push(p);
                }
            }
        }

        f[i] = self_relationship - 1.0;
    }

    f
}
