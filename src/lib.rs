//! # Smart DocQA
//!
//! The retrieval and prompting core of a document question-answering system.
//!
//! This library provides:
//! - Similarity functions (dot product, cosine, Euclidean) and brute-force top-K ranking
//! - Question classification and context analysis
//! - Template prompts (zero-shot, one-shot, multi-shot, chain-of-thought)
//! - Adaptive prompt construction driven by question type, context and user expertise
//! - An HTTP API exposing all of the above
//!
//! ## Example
//!
//! ```rust
//! use smart_docqa::ranker::{find_most_similar, RankItem};
//! use smart_docqa::{SimilarityMethod, Vector};
//!
//! let items = vec![
//!     RankItem::new(vec![1.0, 0.0], "east"),
//!     RankItem::new(vec![0.0, 1.0], "north"),
//! ];
//!
//! let query = Vector::new(vec![0.9, 0.1]);
//! let results = find_most_similar(&query, &items, SimilarityMethod::Cosine, 1);
//! assert_eq!(results[0].metadata, "east");
//! ```

pub mod builder;
pub mod classifier;
pub mod config;
pub mod context;
pub mod dynamic;
pub mod error;
pub mod example_bank;
pub mod metrics;
pub mod ranker;
pub mod server;
pub mod similarity;
pub mod strategy;
pub mod templates;
pub mod vector;

pub use classifier::{QuestionClassifier, QuestionType};
pub use context::{ContextAnalyzer, Domain};
pub use dynamic::{DynamicPrompt, DynamicPromptRequest, DynamicPromptService};
pub use error::{DocQaError, Result};
pub use similarity::SimilarityMethod;
pub use strategy::ExpertiseLevel;
pub use templates::PromptTemplates;
pub use vector::Vector;
