//! Brute-force similarity ranking: O(n) top-K over caller-supplied embeddings

use crate::similarity::SimilarityMethod;
use crate::vector::Vector;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{debug, warn};

/// A candidate embedding with the payload the caller wants back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankItem<P> {
    pub embedding: Vector,
    pub metadata: P,
}

impl<P> RankItem<P> {
    pub fn new(embedding: impl Into<Vector>, metadata: P) -> Self {
        Self {
            embedding: embedding.into(),
            metadata,
        }
    }
}

/// A scored candidate. Failed items carry `f64::NEG_INFINITY` and an error message.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredMatch<P> {
    pub similarity: f64,
    pub metadata: P,
    /// Position of the item in the input list
    pub index: usize,
    pub method: SimilarityMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<P> ScoredMatch<P> {
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Score every item against `query` and return the `top_k` best, highest first.
///
/// Ties keep their input order, and `-0.0` counts as a tie with `0.0`. An item
/// whose score cannot be computed (wrong dimension, non-finite element or an
/// overflowing score) is kept with a `-∞` score instead of failing the whole
/// ranking.
pub fn find_most_similar<P>(
    query: &Vector,
    items: &[RankItem<P>],
    method: SimilarityMethod,
    top_k: usize,
) -> Vec<ScoredMatch<P>>
where
    P: Clone + Send + Sync,
{
    if items.is_empty() {
        return Vec::new();
    }

    // par_iter().collect() preserves input order, so the stable sort below
    // still breaks ties by position.
    let mut results: Vec<ScoredMatch<P>> = items
        .par_iter()
        .enumerate()
        .map(|(index, item)| match method.score(query, &item.embedding) {
            Ok(similarity) => ScoredMatch {
                similarity,
                metadata: item.metadata.clone(),
                index,
                method,
                error: None,
            },
            Err(e) => {
                warn!(index, %method, error = %e, "failed to score item");
                ScoredMatch {
                    similarity: f64::NEG_INFINITY,
                    metadata: item.metadata.clone(),
                    index,
                    method,
                    error: Some(e.to_string()),
                }
            }
        })
        .collect();

    results.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
    results.truncate(top_k);
    debug!(%method, candidates = items.len(), returned = results.len(), "ranked items");
    results
}

/// Per-method summary produced by [`compare_all_methods`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodComparison<P> {
    pub results: Vec<ScoredMatch<P>>,
    /// Wall-clock time of the ranking, in milliseconds
    pub execution_time: f64,
    pub top_score: Option<f64>,
    pub average_score: Option<f64>,
}

/// Run [`find_most_similar`] once per method for a side-by-side view.
pub fn compare_all_methods<P>(
    query: &Vector,
    items: &[RankItem<P>],
    top_k: usize,
) -> BTreeMap<SimilarityMethod, MethodComparison<P>>
where
    P: Clone + Send + Sync,
{
    SimilarityMethod::ALL
        .iter()
        .map(|&method| {
            let start = Instant::now();
            let results = find_most_similar(query, items, method, top_k);
            let execution_time = start.elapsed().as_secs_f64() * 1000.0;

            let top_score = results.first().map(|r| r.similarity);
            let average_score = if results.is_empty() {
                None
            } else {
                Some(results.iter().map(|r| r.similarity).sum::<f64>() / results.len() as f64)
            };

            (
                method,
                MethodComparison {
                    results,
                    execution_time,
                    top_score,
                    average_score,
                },
            )
        })
        .collect()
}

/// Pick the method whose top score is largest, starting from dot product.
///
/// Scores are compared as-is across methods even though they live on
/// different scales; a method with no results never wins.
pub fn best_method<P>(
    comparison: &BTreeMap<SimilarityMethod, MethodComparison<P>>,
) -> SimilarityMethod {
    let top = |m: SimilarityMethod| comparison.get(&m).and_then(|c| c.top_score);

    SimilarityMethod::ALL
        .iter()
        .copied()
        .fold(SimilarityMethod::DotProduct, |best, method| {
            match (top(method), top(best)) {
                (Some(score), Some(best_score)) if score > best_score => method,
                _ => best,
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn make_items(vectors: &[&[f64]]) -> Vec<RankItem<String>> {
        vectors
            .iter()
            .enumerate()
            .map(|(i, v)| RankItem::new(v.to_vec(), format!("item-{}", i)))
            .collect()
    }

    #[test]
    fn test_dot_product_ranking() {
        let items = make_items(&[&[1.0, 2.0, 3.0], &[2.0, 3.0, 4.0], &[10.0, 20.0, 30.0], &[1.0, 1.0, 1.0]]);
        let query = Vector::new(vec![1.0, 2.0, 3.0]);

        let results = find_most_similar(&query, &items, SimilarityMethod::DotProduct, 2);

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].metadata, "item-2");
        assert_eq!(results[0].similarity, 140.0);
        assert_eq!(results[1].metadata, "item-1");
        assert!(results.iter().all(|r| r.method == SimilarityMethod::DotProduct));
    }

    #[test]
    fn test_euclidean_ranking_prefers_closest() {
        let items = make_items(&[&[10.0, 20.0, 30.0], &[1.0, 2.0, 3.0]]);
        let query = Vector::new(vec![1.0, 2.0, 3.0]);

        let results = find_most_similar(&query, &items, SimilarityMethod::Euclidean, 5);

        assert_eq!(results[0].index, 1);
        assert_relative_eq!(results[0].similarity, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_empty_items() {
        let query = Vector::new(vec![1.0, 2.0]);
        for method in SimilarityMethod::ALL {
            let results = find_most_similar::<String>(&query, &[], method, 3);
            assert!(results.is_empty());
        }
    }

    #[test]
    fn test_ties_keep_input_order() {
        let items = make_items(&[&[1.0, 0.0], &[0.0, 1.0], &[1.0, 0.0], &[1.0, 0.0]]);
        let query = Vector::new(vec![1.0, 0.0]);

        let results = find_most_similar(&query, &items, SimilarityMethod::Cosine, 3);

        let order: Vec<usize> = results.iter().map(|r| r.index).collect();
        assert_eq!(order, vec![0, 2, 3]);
    }

    #[test]
    fn test_signed_zero_ties_keep_input_order() {
        // Both items are orthogonal to the query; the first scores -0.0
        let items = make_items(&[&[0.0, -1.0], &[0.0, 1.0]]);
        let query = Vector::new(vec![-1.0, 0.0]);

        for method in [SimilarityMethod::DotProduct, SimilarityMethod::Cosine] {
            let results = find_most_similar(&query, &items, method, 2);
            let order: Vec<usize> = results.iter().map(|r| r.index).collect();
            assert_eq!(order, vec![0, 1], "{}", method);
            assert!(results.iter().all(|r| r.similarity.is_sign_positive()));
        }
    }

    #[test]
    fn test_overflowing_score_ranks_last() {
        let items = make_items(&[&[1e308, 1e308], &[1.0, 0.0]]);
        let query = Vector::new(vec![1e308, -1e308]);

        let results = find_most_similar(&query, &items, SimilarityMethod::DotProduct, 2);

        assert_eq!(results[0].index, 1);
        assert!(!results[0].is_error());
        assert_eq!(results[1].index, 0);
        assert_eq!(results[1].similarity, f64::NEG_INFINITY);
        assert!(results[1].error.as_deref().unwrap().contains("not finite"));
    }

    #[test]
    fn test_bad_item_does_not_abort_ranking() {
        let items = make_items(&[&[1.0, 2.0], &[1.0, 2.0, 3.0], &[2.0, 2.0]]);
        let query = Vector::new(vec![1.0, 1.0]);

        let results = find_most_similar(&query, &items, SimilarityMethod::DotProduct, 10);

        assert_eq!(results.len(), 3);
        let last = results.last().unwrap();
        assert_eq!(last.index, 1);
        assert_eq!(last.similarity, f64::NEG_INFINITY);
        assert!(last.is_error());
        assert!(!results[0].is_error());
    }

    #[test]
    fn test_top_k_larger_than_items() {
        let items = make_items(&[&[1.0], &[2.0]]);
        let query = Vector::new(vec![1.0]);
        let results = find_most_similar(&query, &items, SimilarityMethod::DotProduct, 10);
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn test_compare_all_methods() {
        let items = make_items(&[&[1.0, 2.0, 3.0], &[3.0, 2.0, 1.0]]);
        let query = Vector::new(vec![1.0, 2.0, 3.0]);

        let comparison = compare_all_methods(&query, &items, 2);

        assert_eq!(comparison.len(), 3);
        let cosine = &comparison[&SimilarityMethod::Cosine];
        assert_relative_eq!(cosine.top_score.unwrap(), 1.0, epsilon = 1e-12);
        assert_eq!(cosine.results.len(), 2);
        let dot = &comparison[&SimilarityMethod::DotProduct];
        assert_relative_eq!(dot.average_score.unwrap(), (14.0 + 10.0) / 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_compare_all_methods_empty() {
        let query = Vector::new(vec![1.0]);
        let comparison = compare_all_methods::<String>(&query, &[], 3);
        for summary in comparison.values() {
            assert!(summary.results.is_empty());
            assert!(summary.top_score.is_none());
            assert!(summary.average_score.is_none());
        }
        assert_eq!(best_method(&comparison), SimilarityMethod::DotProduct);
    }

    #[test]
    fn test_best_method_compares_raw_scores() {
        // Dot product scores grow with magnitude, so it wins over cosine here
        let items = make_items(&[&[10.0, 20.0, 30.0]]);
        let query = Vector::new(vec![1.0, 2.0, 3.0]);
        let comparison = compare_all_methods(&query, &items, 1);
        assert_eq!(best_method(&comparison), SimilarityMethod::DotProduct);

        // Unit vectors: dot == cosine == 1, euclidean score == 1 as well; first wins
        let items = make_items(&[&[1.0, 0.0]]);
        let query = Vector::new(vec![1.0, 0.0]);
        let comparison = compare_all_methods(&query, &items, 1);
        assert_eq!(best_method(&comparison), SimilarityMethod::DotProduct);
    }
}
