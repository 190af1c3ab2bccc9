//! Retrieval: nearest-neighbor candidates re-ranked by Maximal Marginal
//! Relevance so the context drawn from several documents stays diverse
//! instead of repeating near-identical chunks from one file.

use crate::store::SearchResult;

/// Select `top_k` results from `candidates` by MMR.
///
/// `candidates` must be ordered by descending query similarity (as returned
/// by the store). `lambda` trades off query relevance (1.0) against
/// diversity (0.0).
#[must_use]
pub fn mmr_select(
    query: &[f32],
    candidates: Vec<SearchResult>,
    top_k: usize,
    lambda: f64,
) -> Vec<SearchResult> {
    if candidates.len() <= top_k {
        return candidates;
    }

    let mut remaining: Vec<SearchResult> = candidates;
    let mut selected: Vec<SearchResult> = Vec::with_capacity(top_k);

    while selected.len() < top_k && !remaining.is_empty() {
        let mut best_idx = 0;
        let mut best_score = f64::NEG_INFINITY;

        for (i, cand) in remaining.iter().enumerate() {
            let relevance = cosine_similarity(query, &cand.embedding);
            let redundancy = selected
                .iter()
                .map(|s| cosine_similarity(&cand.embedding, &s.embedding))
                .fold(f64::NEG_INFINITY, f64::max);
            let redundancy = if redundancy.is_finite() { redundancy } else { 0.0 };

            let score = lambda * relevance - (1.0 - lambda) * redundancy;
            if score > best_score {
                best_score = score;
                best_idx = i;
            }
        }

        selected.push(remaining.swap_remove(best_idx));
    }

    selected
}

/// Cosine similarity of two equal-length vectors; 0.0 when either is zero.
#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    debug_assert_eq!(a.len(), b.len());

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b) {
        dot += f64::from(*x) * f64::from(*y);
        norm_a += f64::from(*x) * f64::from(*x);
        norm_b += f64::from(*y) * f64::from(*y);
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(name: &str, embedding: Vec<f32>, similarity: f64) -> SearchResult {
        SearchResult {
            filename: name.to_string(),
            content: format!("content of {name}"),
            position: 0,
            similarity,
            embedding,
        }
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-9);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-9);
        assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-9);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn test_mmr_returns_all_when_few_candidates() {
        let candidates = vec![hit("a", vec![1.0, 0.0], 0.9)];
        let out = mmr_select(&[1.0, 0.0], candidates, 5, 0.5);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_mmr_prefers_diversity_over_duplicates() {
        // Two near-duplicates close to the query plus one orthogonal result.
        let query = [1.0, 0.0, 0.0];
        let candidates = vec![
            hit("dup1", vec![1.0, 0.0, 0.0], 1.0),
            hit("dup2", vec![0.999, 0.001, 0.0], 0.999),
            hit("other", vec![0.0, 1.0, 0.0], 0.1),
        ];

        let out = mmr_select(&query, candidates, 2, 0.5);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].filename, "dup1");
        assert_eq!(out[1].filename, "other", "second pick should avoid the near-duplicate");
    }

    #[test]
    fn test_mmr_pure_relevance_keeps_store_order() {
        let query = [1.0, 0.0];
        let candidates = vec![
            hit("best", vec![1.0, 0.0], 1.0),
            hit("good", vec![0.9, 0.1], 0.9),
            hit("meh", vec![0.1, 0.9], 0.2),
        ];

        let out = mmr_select(&query, candidates, 2, 1.0);
        assert_eq!(out[0].filename, "best");
        assert_eq!(out[1].filename, "good");
    }
}
