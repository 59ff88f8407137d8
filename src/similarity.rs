//! Similarity functions over embedding vectors

use crate::error::{DocQaError, Result};
use crate::vector::Vector;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Methods for measuring how alike two embeddings are
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityMethod {
    /// Raw dot product
    DotProduct,
    /// Cosine of the angle between the vectors
    Cosine,
    /// Euclidean (L2) distance, mapped to `1 / (1 + d)` when ranking
    Euclidean,
}

impl SimilarityMethod {
    /// All methods, in comparison order.
    pub const ALL: [SimilarityMethod; 3] = [
        SimilarityMethod::DotProduct,
        SimilarityMethod::Cosine,
        SimilarityMethod::Euclidean,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SimilarityMethod::DotProduct => "dot_product",
            SimilarityMethod::Cosine => "cosine",
            SimilarityMethod::Euclidean => "euclidean",
        }
    }

    /// Raw value of the underlying function. For `Euclidean` this is a
    /// distance, so lower means more similar.
    pub fn compute(&self, a: &Vector, b: &Vector) -> Result<f64> {
        match self {
            SimilarityMethod::DotProduct => dot_product(a, b),
            SimilarityMethod::Cosine => cosine_similarity(a, b),
            SimilarityMethod::Euclidean => euclidean_distance(a, b),
        }
    }

    /// Similarity score where higher is always better.
    ///
    /// Fails with `NonFiniteScore` when the arithmetic overflows. A negative
    /// zero is returned as `0.0` so that equal scores compare equal.
    pub fn score(&self, a: &Vector, b: &Vector) -> Result<f64> {
        let raw = self.compute(a, b)?;
        let score = match self {
            SimilarityMethod::Euclidean => 1.0 / (1.0 + raw),
            _ => raw,
        };
        if !score.is_finite() {
            return Err(DocQaError::NonFiniteScore { value: score });
        }
        Ok(if score == 0.0 { 0.0 } else { score })
    }

    pub fn formula(&self) -> &'static str {
        match self {
            SimilarityMethod::DotProduct => "A · B = Σ(Ai * Bi)",
            SimilarityMethod::Cosine => "cos(θ) = (A · B) / (||A|| × ||B||)",
            SimilarityMethod::Euclidean => "d = √(Σ(Ai - Bi)²)",
        }
    }

    pub fn interpretation(&self) -> &'static str {
        match self {
            SimilarityMethod::DotProduct => "Higher values indicate greater similarity",
            SimilarityMethod::Cosine => {
                "Range: [-1, 1]. 1 = identical, 0 = orthogonal, -1 = opposite"
            }
            SimilarityMethod::Euclidean => "Lower values indicate greater similarity",
        }
    }

    /// Human-readable profile used by the comparison endpoint.
    pub fn profile(&self) -> MethodProfile {
        match self {
            SimilarityMethod::DotProduct => MethodProfile {
                description: "Direct multiplication and summation of vector elements",
                advantages: &["Fast computation", "Preserves magnitude information"],
                best_for: "High-dimensional spaces with similar vector scales",
            },
            SimilarityMethod::Cosine => MethodProfile {
                description: "Measures angle between vectors (normalized dot product)",
                advantages: &["Scale invariant", "Range [-1,1]", "Good for text similarity"],
                best_for: "Text similarity and semantic matching",
            },
            SimilarityMethod::Euclidean => MethodProfile {
                description: "Geometric distance between points in n-dimensional space",
                advantages: &["Intuitive distance measure", "Good for clustering"],
                best_for: "Low-dimensional data and clustering applications",
            },
        }
    }
}

impl fmt::Display for SimilarityMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SimilarityMethod {
    type Err = DocQaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "dot_product" => Ok(SimilarityMethod::DotProduct),
            "cosine" => Ok(SimilarityMethod::Cosine),
            "euclidean" => Ok(SimilarityMethod::Euclidean),
            _ => Err(DocQaError::UnknownMethod {
                method: s.to_string(),
            }),
        }
    }
}

/// Static description of a similarity method.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodProfile {
    pub description: &'static str,
    pub advantages: &'static [&'static str],
    pub best_for: &'static str,
}

/// Structural checks shared by every similarity function.
fn check_pair(a: &Vector, b: &Vector) -> Result<()> {
    if !a.has_same_dimension(b) {
        return Err(DocQaError::DimensionMismatch {
            expected: a.dimension(),
            actual: b.dimension(),
        });
    }
    if a.is_empty() {
        return Err(DocQaError::EmptyVector);
    }
    a.validate()?;
    b.validate()
}

/// Compute the dot product of two vectors: Σ aᵢ·bᵢ
pub fn dot_product(a: &Vector, b: &Vector) -> Result<f64> {
    check_pair(a, b)?;
    Ok(a.as_slice()
        .iter()
        .zip(b.as_slice().iter())
        .map(|(x, y)| x * y)
        .sum())
}

/// Compute cosine similarity. Returns exactly 0 when either vector has zero magnitude.
///
/// Both vectors are divided by their largest absolute element first. Cosine
/// is scale invariant, and this keeps the norms finite for huge inputs.
pub fn cosine_similarity(a: &Vector, b: &Vector) -> Result<f64> {
    check_pair(a, b)?;
    let scale_a = max_abs(a);
    let scale_b = max_abs(b);

    if scale_a == 0.0 || scale_b == 0.0 {
        return Ok(0.0);
    }

    let (mut dot, mut norm_a, mut norm_b) = (0.0, 0.0, 0.0);
    for (x, y) in a.as_slice().iter().zip(b.as_slice().iter()) {
        let (x, y) = (x / scale_a, y / scale_b);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    // Clamp to [-1, 1] to absorb floating point error
    Ok((dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(-1.0, 1.0))
}

fn max_abs(v: &Vector) -> f64 {
    v.as_slice().iter().fold(0.0, |m, x| m.max(x.abs()))
}

/// Compute Euclidean (L2) distance between two vectors
pub fn euclidean_distance(a: &Vector, b: &Vector) -> Result<f64> {
    check_pair(a, b)?;
    Ok(a.as_slice()
        .iter()
        .zip(b.as_slice().iter())
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn v(data: &[f64]) -> Vector {
        Vector::new(data.to_vec())
    }

    #[test]
    fn test_dot_product() {
        let dot = dot_product(&v(&[1.0, 2.0, 3.0]), &v(&[4.0, 5.0, 6.0])).unwrap();
        assert_eq!(dot, 32.0);
    }

    #[test]
    fn test_dot_product_negative_values() {
        let dot = dot_product(&v(&[-1.0, -2.0]), &v(&[3.0, 4.0])).unwrap();
        assert_eq!(dot, -11.0);
    }

    #[test]
    fn test_dot_product_large_vectors() {
        let a = Vector::new(vec![1.0; 1536]);
        let b = Vector::new(vec![2.0; 1536]);
        assert_eq!(dot_product(&a, &b).unwrap(), 3072.0);
    }

    #[test]
    fn test_cosine_similarity() {
        let sim = cosine_similarity(&v(&[1.0, 2.0, 3.0]), &v(&[4.0, 5.0, 6.0])).unwrap();
        let expected = 32.0 / (14.0_f64.sqrt() * 77.0_f64.sqrt());
        assert_relative_eq!(sim, expected, epsilon = 1e-12);
    }

    #[test]
    fn test_cosine_orthogonal_and_opposite() {
        let x = v(&[1.0, 0.0, 0.0]);
        assert_relative_eq!(
            cosine_similarity(&x, &v(&[0.0, 1.0, 0.0])).unwrap(),
            0.0,
            epsilon = 1e-12
        );
        assert_relative_eq!(
            cosine_similarity(&x, &v(&[-1.0, 0.0, 0.0])).unwrap(),
            -1.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_cosine_zero_vector_is_zero() {
        let sim = cosine_similarity(&v(&[0.0, 0.0]), &v(&[1.0, 2.0])).unwrap();
        assert_eq!(sim, 0.0);
        let sim = cosine_similarity(&v(&[1.0, 2.0]), &v(&[0.0, 0.0])).unwrap();
        assert_eq!(sim, 0.0);
    }

    #[test]
    fn test_cosine_huge_magnitudes_stay_in_range() {
        let a = v(&[1e200, 1e200]);
        assert_relative_eq!(cosine_similarity(&a, &a).unwrap(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(
            cosine_similarity(&v(&[1e308, 1e308]), &v(&[1e308, -1e308])).unwrap(),
            0.0,
            epsilon = 1e-12
        );
        assert_relative_eq!(
            cosine_similarity(&v(&[1e-300, 0.0]), &v(&[-1e300, 0.0])).unwrap(),
            -1.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_score_rejects_overflow() {
        // 1e308 * 1e308 overflows to +inf and the sum becomes inf - inf = NaN
        let a = v(&[1e308, 1e308]);
        let b = v(&[1e308, -1e308]);
        assert!(dot_product(&a, &b).unwrap().is_nan());
        assert!(matches!(
            SimilarityMethod::DotProduct.score(&a, &b),
            Err(DocQaError::NonFiniteScore { .. })
        ));
        assert!(matches!(
            SimilarityMethod::DotProduct.score(&a, &a),
            Err(DocQaError::NonFiniteScore { .. })
        ));
        assert!(SimilarityMethod::Cosine.score(&a, &b).unwrap().is_finite());
    }

    #[test]
    fn test_score_has_no_negative_zero() {
        let query = v(&[-1.0, 0.0]);
        for method in [SimilarityMethod::DotProduct, SimilarityMethod::Cosine] {
            // -1*0 + 0*(-1) can sum to -0.0
            let score = method.score(&query, &v(&[0.0, -1.0])).unwrap();
            assert_eq!(score, 0.0);
            assert!(score.is_sign_positive(), "{} returned -0.0", method);
        }
    }

    #[test]
    fn test_euclidean_distance() {
        let dist = euclidean_distance(&v(&[1.0, 2.0]), &v(&[4.0, 6.0])).unwrap();
        assert_eq!(dist, 5.0);
    }

    #[test]
    fn test_euclidean_score_mapping() {
        let score = SimilarityMethod::Euclidean
            .score(&v(&[1.0, 2.0]), &v(&[4.0, 6.0]))
            .unwrap();
        assert_relative_eq!(score, 1.0 / 6.0, epsilon = 1e-12);
    }

    #[test]
    fn test_dimension_mismatch() {
        let a = v(&[1.0, 2.0, 3.0]);
        let b = v(&[4.0, 5.0]);
        for method in SimilarityMethod::ALL {
            assert!(matches!(
                method.compute(&a, &b),
                Err(DocQaError::DimensionMismatch { expected: 3, actual: 2 })
            ));
        }
    }

    #[test]
    fn test_empty_vectors() {
        for method in SimilarityMethod::ALL {
            assert_eq!(
                method.compute(&v(&[]), &v(&[])),
                Err(DocQaError::EmptyVector)
            );
        }
    }

    #[test]
    fn test_invalid_element() {
        let result = dot_product(&v(&[1.0, 2.0]), &v(&[1.0, f64::NAN]));
        assert!(matches!(
            result,
            Err(DocQaError::InvalidElement { index: 1, .. })
        ));
    }

    #[test]
    fn test_method_parsing() {
        assert_eq!(
            "Dot_Product".parse::<SimilarityMethod>().unwrap(),
            SimilarityMethod::DotProduct
        );
        assert_eq!(
            "cosine".parse::<SimilarityMethod>().unwrap(),
            SimilarityMethod::Cosine
        );
        assert!(matches!(
            "manhattan".parse::<SimilarityMethod>(),
            Err(DocQaError::UnknownMethod { .. })
        ));
    }

    fn pair() -> impl Strategy<Value = (Vec<f64>, Vec<f64>)> {
        (1usize..32).prop_flat_map(|n| {
            (
                prop::collection::vec(-1e3f64..1e3, n),
                prop::collection::vec(-1e3f64..1e3, n),
            )
        })
    }

    proptest! {
        #[test]
        fn prop_dot_product_symmetric((a, b) in pair()) {
            let (a, b) = (Vector::new(a), Vector::new(b));
            prop_assert_eq!(dot_product(&a, &b).unwrap(), dot_product(&b, &a).unwrap());
        }

        #[test]
        fn prop_euclidean_symmetric_and_zero_on_self((a, b) in pair()) {
            let (a, b) = (Vector::new(a), Vector::new(b));
            prop_assert_eq!(euclidean_distance(&a, &a).unwrap(), 0.0);
            prop_assert_eq!(
                euclidean_distance(&a, &b).unwrap(),
                euclidean_distance(&b, &a).unwrap()
            );
        }

        #[test]
        fn prop_cosine_self_is_one(a in prop::collection::vec(1.0f64..1e3, 1..32)) {
            let a = Vector::new(a);
            prop_assert!((cosine_similarity(&a, &a).unwrap() - 1.0).abs() < 1e-9);
        }

        #[test]
        fn prop_cosine_in_range((a, b) in pair()) {
            let sim = cosine_similarity(&Vector::new(a), &Vector::new(b)).unwrap();
            prop_assert!((-1.0..=1.0).contains(&sim));
        }
    }
}
