//! Reciprocal Rank Fusion for combining vector and lexical rankings

use crate::retrieval::{FusedResult, SearchResult};
use ahash::AHashMap;

/// Fuse two independently ranked result lists with Reciprocal Rank Fusion.
///
/// A document at 1-based rank `r` contributes `alpha / (rank_constant + r)`
/// from the vector list and `(1 - alpha) / (rank_constant + r)` from the
/// lexical list; a document present in only one list receives only that
/// term. Rank-based fusion is robust to the differing score scales of the
/// two retrieval modes.
///
/// The output is sorted descending by fused score, ties broken by document
/// id ascending so the ordering never depends on input order, and truncated
/// to `k` (so its length is `min(k, distinct ids)`). When a document appears
/// in both lists the vector-list payload is the one retained. `alpha = 1`
/// reproduces the vector ranking, `alpha = 0` the lexical ranking.
pub fn reciprocal_rank_fusion(
    vector_results: Vec<SearchResult>,
    lexical_results: Vec<SearchResult>,
    k: usize,
    alpha: f64,
    rank_constant: u32,
) -> Vec<FusedResult> {
    let mut scores: AHashMap<String, (f64, SearchResult)> = AHashMap::new();

    for (rank, result) in vector_results.into_iter().enumerate() {
        let contribution = alpha / (f64::from(rank_constant) + rank as f64 + 1.0);
        scores
            .entry(result.id.clone())
            .and_modify(|(score, _)| *score += contribution)
            .or_insert((contribution, result));
    }

    for (rank, result) in lexical_results.into_iter().enumerate() {
        let contribution = (1.0 - alpha) / (f64::from(rank_constant) + rank as f64 + 1.0);
        scores
            .entry(result.id.clone())
            .and_modify(|(score, _)| *score += contribution)
            .or_insert((contribution, result));
    }

    let mut fused: Vec<(f64, SearchResult)> = scores.into_values().collect();
    fused.sort_by(|a, b| {
        b.0.partial_cmp(&a.0)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.1.id.cmp(&b.1.id))
    });
    fused.truncate(k);

    fused
        .into_iter()
        .map(|(fused_score, result)| FusedResult {
            fused_score,
            result,
        })
        .collect()
}
