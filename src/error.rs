//! Error types for similarity and prompt operations

use thiserror::Error;

/// Result type alias for DocQA operations
pub type Result<T> = std::result::Result<T, DocQaError>;

/// Error types that can occur in DocQA operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DocQaError {
    #[error("Vector dimensions must match. Got {expected} and {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Vectors cannot be empty")]
    EmptyVector,

    #[error("Invalid number at position {index}: {value}")]
    InvalidElement { index: usize, value: f64 },

    #[error("Unknown similarity method: {method}")]
    UnknownMethod { method: String },

    #[error("Similarity score is not finite: {value}")]
    NonFiniteScore { value: f64 },

    #[error("Invalid vector: {reason}")]
    InvalidVector { reason: String },

    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },
}
