//! Ranking tests: the parallel ranker must agree with a sequential full sort.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use smart_docqa::ranker::{find_most_similar, RankItem};
use smart_docqa::{SimilarityMethod, Vector};

fn random_vectors(rng: &mut StdRng, n: usize, dim: usize) -> Vec<Vector> {
    (0..n)
        .map(|_| {
            let data: Vec<f64> = (0..dim).map(|_| rng.gen_range(-1.0..1.0)).collect();
            Vector::new(data)
        })
        .collect()
}

/// Indices of the `k` best items, scored one by one and fully sorted.
fn reference_top_k(query: &Vector, vectors: &[Vector], method: SimilarityMethod, k: usize) -> Vec<usize> {
    let mut scored: Vec<(usize, f64)> = vectors
        .iter()
        .enumerate()
        .map(|(i, v)| (i, method.score(query, v).unwrap()))
        .collect();
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    scored.into_iter().take(k).map(|(i, _)| i).collect()
}

fn check_agreement(n: usize, dim: usize, k: usize, num_queries: usize) {
    let mut rng = StdRng::seed_from_u64(n as u64);
    let vectors = random_vectors(&mut rng, n, dim);
    let items: Vec<RankItem<usize>> = vectors
        .iter()
        .enumerate()
        .map(|(i, v)| RankItem::new(v.clone(), i))
        .collect();

    for query in random_vectors(&mut rng, num_queries, dim) {
        for method in SimilarityMethod::ALL {
            let expected = reference_top_k(&query, &vectors, method, k);
            let actual: Vec<usize> = find_most_similar(&query, &items, method, k)
                .into_iter()
                .map(|r| r.metadata)
                .collect();
            assert_eq!(
                actual, expected,
                "ranking mismatch for n={}, dim={}, k={}, method={}",
                n, dim, k, method
            );
        }
    }
}

#[test]
fn test_agreement_100_vectors() {
    check_agreement(100, 16, 10, 20);
}

#[test]
fn test_agreement_1000_vectors() {
    check_agreement(1000, 64, 10, 10);
}

#[test]
fn test_top_k_larger_than_input() {
    check_agreement(7, 4, 50, 5);
}

#[test]
fn test_results_are_sorted_descending() {
    let mut rng = StdRng::seed_from_u64(99);
    let items: Vec<RankItem<usize>> = random_vectors(&mut rng, 500, 8)
        .into_iter()
        .enumerate()
        .map(|(i, v)| RankItem::new(v, i))
        .collect();
    let query = Vector::new(vec![0.25; 8]);

    for method in SimilarityMethod::ALL {
        let results = find_most_similar(&query, &items, method, items.len());
        assert_eq!(results.len(), items.len());
        assert!(results.windows(2).all(|w| w[0].similarity >= w[1].similarity));
    }
}
