//! Embedding vector type

use crate::error::{DocQaError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A fixed-length embedding in n-dimensional space.
///
/// Vectors are plain values: the similarity functions never mutate them and
/// dimensionality agreement is checked per comparison, not at construction.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Vector {
    data: Vec<f64>,
}

impl Vector {
    /// Create a new vector from a Vec<f64>
    pub fn new(data: Vec<f64>) -> Self {
        Self { data }
    }

    /// Get the dimension of the vector
    pub fn dimension(&self) -> usize {
        self.data.len()
    }

    /// Whether the vector has no components
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get the underlying data as a slice
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Check if this vector has the same dimension as another
    pub fn has_same_dimension(&self, other: &Vector) -> bool {
        self.dimension() == other.dimension()
    }

    /// Compute the L2 norm (magnitude) of the vector
    pub fn norm(&self) -> f64 {
        self.data.iter().map(|x| x * x).sum::<f64>().sqrt()
    }

    /// Fail with `InvalidElement` on the first NaN or infinite component.
    pub fn validate(&self) -> Result<()> {
        match self.data.iter().position(|x| !x.is_finite()) {
            Some(index) => Err(DocQaError::InvalidElement {
                index,
                value: self.data[index],
            }),
            None => Ok(()),
        }
    }
}

impl From<Vec<f64>> for Vector {
    fn from(data: Vec<f64>) -> Self {
        Vector::new(data)
    }
}

impl FromStr for Vector {
    type Err = DocQaError;

    /// Parse a vector from a comma-separated string such as `"1.0, 2.0, 3.0"`.
    fn from_str(s: &str) -> Result<Self> {
        let data = s
            .split(',')
            .map(|x| {
                x.trim()
                    .parse::<f64>()
                    .map_err(|_| DocQaError::InvalidVector {
                        reason: format!("Invalid float: {}", x.trim()),
                    })
            })
            .collect::<Result<Vec<f64>>>()?;
        Ok(Vector::new(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_vector_creation() {
        let v = Vector::new(vec![1.0, 2.0, 3.0]);
        assert_eq!(v.dimension(), 3);
        assert_eq!(v.as_slice(), &[1.0, 2.0, 3.0]);
        assert!(!v.is_empty());
    }

    #[test]
    fn test_vector_norm() {
        let v = Vector::new(vec![3.0, 4.0]);
        assert_relative_eq!(v.norm(), 5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_validate_rejects_non_finite() {
        let v = Vector::new(vec![1.0, f64::NAN, 3.0]);
        assert!(matches!(
            v.validate(),
            Err(DocQaError::InvalidElement { index: 1, .. })
        ));

        let v = Vector::new(vec![f64::INFINITY]);
        assert!(v.validate().is_err());
        assert!(Vector::new(vec![0.0, -2.5]).validate().is_ok());
    }

    #[test]
    fn test_from_str() {
        let v: Vector = "1.0, 2.0, 3.0".parse().unwrap();
        assert_eq!(v.dimension(), 3);
        assert_eq!(v.as_slice(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_from_str_invalid() {
        let result = "1.0, abc".parse::<Vector>();
        assert!(matches!(result, Err(DocQaError::InvalidVector { .. })));
    }

    #[test]
    fn test_serde_transparent() {
        let v: Vector = serde_json::from_str("[1.5, 2.0]").unwrap();
        assert_eq!(v.as_slice(), &[1.5, 2.0]);
        assert_eq!(serde_json::to_string(&v).unwrap(), "[1.5,2.0]");
    }
}
