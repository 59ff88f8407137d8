//! Rule-based question classification
//!
//! Questions are matched against ordered pattern lists; the first pattern that
//! hits decides the label. Factual patterns are tried before analytical ones,
//! so anything that opens like a fact lookup ("which is better...") stays
//! factual even if later patterns would also match.

use crate::error::DocQaError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Broad intent of a question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    Factual,
    Analytical,
    Comparative,
    Procedural,
    Creative,
}

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::Factual => "factual",
            QuestionType::Analytical => "analytical",
            QuestionType::Comparative => "comparative",
            QuestionType::Procedural => "procedural",
            QuestionType::Creative => "creative",
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestionType {
    type Err = DocQaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "factual" => Ok(QuestionType::Factual),
            "analytical" => Ok(QuestionType::Analytical),
            "comparative" => Ok(QuestionType::Comparative),
            "procedural" => Ok(QuestionType::Procedural),
            "creative" => Ok(QuestionType::Creative),
            other => Err(DocQaError::InvalidInput {
                reason: format!("unknown question type: {}", other),
            }),
        }
    }
}

/// Three-step scale used for question complexity and technical level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Low,
    Medium,
    High,
}

/// Result of classifying a question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionAnalysis {
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub complexity: Level,
    /// In `[0, 1]`
    pub confidence: f64,
    /// Length in characters
    pub length: usize,
    pub word_count: usize,
}

struct QuestionPatterns {
    types: Vec<(Regex, QuestionType)>,
    complexity: Vec<(Regex, Level)>,
}

impl QuestionPatterns {
    fn new() -> Self {
        let compile = |pattern: &str| Regex::new(pattern).expect("question pattern must compile");
        Self {
            types: vec![
                (
                    compile(r"^(what|who|when|where|which|how many|how much)\b"),
                    QuestionType::Factual,
                ),
                (
                    compile(r"^(why|how|explain|analyze|discuss|elaborate)"),
                    QuestionType::Analytical,
                ),
                (
                    compile(r"(compare|contrast|difference|similar|versus|vs\.?|better|worse)"),
                    QuestionType::Comparative,
                ),
                (
                    compile(r"(how to|steps|process|procedure|method|way to)"),
                    QuestionType::Procedural,
                ),
                (
                    compile(r"(imagine|suppose|what if|create|design|suggest)"),
                    QuestionType::Creative,
                ),
            ],
            complexity: vec![
                (
                    compile(r"(analyze|evaluate|synthesize|compare.*contrast|multiple.*factor|relationship.*between)"),
                    Level::High,
                ),
                (
                    compile(r"(explain|describe|discuss|how.*work|why.*important)"),
                    Level::Medium,
                ),
                (compile(r"(what|who|when|where|which|list)"), Level::Low),
            ],
        }
    }
}

fn patterns() -> &'static QuestionPatterns {
    static PATTERNS: OnceLock<QuestionPatterns> = OnceLock::new();
    PATTERNS.get_or_init(QuestionPatterns::new)
}

/// Count whitespace-separated pieces the way a `split(/\s+/)` would:
/// leading or trailing whitespace yields an empty piece, and "" counts as one.
pub(crate) fn word_count(text: &str) -> usize {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    WHITESPACE
        .get_or_init(|| Regex::new(r"\s+").expect("whitespace pattern must compile"))
        .split(text)
        .count()
}

fn first_match<T: Copy>(rules: &[(Regex, T)], text: &str) -> Option<T> {
    rules
        .iter()
        .find(|(pattern, _)| pattern.is_match(text))
        .map(|(_, label)| *label)
}

/// Classifies questions by type and complexity. Stateless.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuestionClassifier;

impl QuestionClassifier {
    pub fn new() -> Self {
        Self
    }

    pub fn classify(&self, question: &str) -> QuestionAnalysis {
        let lower = question.to_lowercase();
        let rules = patterns();

        let (question_type, mut confidence) = match first_match(&rules.types, &lower) {
            Some(question_type) => (question_type, 0.8),
            None => (QuestionType::Factual, 0.6),
        };
        let complexity = first_match(&rules.complexity, &lower).unwrap_or(Level::Medium);

        let length = question.chars().count();
        if length > 100 {
            confidence += 0.1;
        }
        if question.contains('?') {
            confidence += 0.05;
        }

        QuestionAnalysis {
            question_type,
            complexity,
            confidence: f64::min(confidence, 1.0),
            length,
            word_count: word_count(question),
        }
    }
}
