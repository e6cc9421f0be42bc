//! Reordering of canonical results by rerank scores.
//!
//! The upstream scores documents by the position they were submitted in,
//! so `index` is the join key back to the result list. The output is
//! always a permutation of the input: invalid or duplicate indices are
//! ignored, and results the upstream never referenced keep their original
//! relative order at the tail.

use crate::langsearch::{RankedDoc, SearchResult};

pub(crate) fn apply_ranking(results: Vec<SearchResult>, mut ranked: Vec<RankedDoc>) -> Vec<SearchResult> {
    // Descending score; ties keep the original document order.
    ranked.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.index.cmp(&b.index))
    });

    let mut slots: Vec<Option<SearchResult>> = results.into_iter().map(Some).collect();
    let mut ordered = Vec::with_capacity(slots.len());

    for doc in &ranked {
        let Ok(index) = usize::try_from(doc.index) else {
            continue;
        };
        if let Some(slot) = slots.get_mut(index)
            && let Some(result) = slot.take()
        {
            ordered.push(result);
        }
    }

    // Anything the upstream skipped stays, in original order.
    ordered.extend(slots.into_iter().flatten());
    ordered
}
