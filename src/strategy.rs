//! Prompt strategy selection
//!
//! Two selectors live here. [`select_strategy`] is a lookup table used by the
//! template generators; [`select_prompt_strategy`] applies priority-ordered
//! rules to full question and context analyses for the adaptive builder.

use crate::classifier::{Level, QuestionAnalysis, QuestionType};
use crate::context::ContextAnalysis;
use crate::error::DocQaError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How sophisticated the end user is assumed to be
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpertiseLevel {
    Beginner,
    #[default]
    Intermediate,
    Expert,
}

impl ExpertiseLevel {
    pub const ALL: [ExpertiseLevel; 3] = [
        ExpertiseLevel::Beginner,
        ExpertiseLevel::Intermediate,
        ExpertiseLevel::Expert,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExpertiseLevel::Beginner => "beginner",
            ExpertiseLevel::Intermediate => "intermediate",
            ExpertiseLevel::Expert => "expert",
        }
    }
}

impl fmt::Display for ExpertiseLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExpertiseLevel {
    type Err = DocQaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "beginner" => Ok(ExpertiseLevel::Beginner),
            "intermediate" => Ok(ExpertiseLevel::Intermediate),
            "expert" => Ok(ExpertiseLevel::Expert),
            other => Err(DocQaError::InvalidInput {
                reason: format!("unknown expertise level: {}", other),
            }),
        }
    }
}

/// A previous exchange with the same user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    #[serde(default)]
    pub question: Option<String>,
}

/// Prior questions longer than this count as complex
const COMPLEX_QUESTION_CHARS: usize = 100;

/// Use `explicit` when given, otherwise infer from the share of long
/// questions in `history`: above 60% is expert, below 20% is beginner.
pub fn determine_expertise_level(
    explicit: Option<ExpertiseLevel>,
    history: &[Interaction],
) -> ExpertiseLevel {
    if let Some(level) = explicit {
        return level;
    }
    if history.is_empty() {
        return ExpertiseLevel::Intermediate;
    }

    let complex = history
        .iter()
        .filter(|i| {
            i.question
                .as_deref()
                .is_some_and(|q| q.chars().count() > COMPLEX_QUESTION_CHARS)
        })
        .count();
    let ratio = complex as f64 / history.len() as f64;

    if ratio > 0.6 {
        ExpertiseLevel::Expert
    } else if ratio < 0.2 {
        ExpertiseLevel::Beginner
    } else {
        ExpertiseLevel::Intermediate
    }
}

/// Template-variant prompting techniques
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptTechnique {
    ZeroShot,
    OneShot,
    MultiShot,
    ChainOfThought,
    FewShotReasoning,
}

impl PromptTechnique {
    pub fn as_str(&self) -> &'static str {
        match self {
            PromptTechnique::ZeroShot => "zero_shot",
            PromptTechnique::OneShot => "one_shot",
            PromptTechnique::MultiShot => "multi_shot",
            PromptTechnique::ChainOfThought => "chain_of_thought",
            PromptTechnique::FewShotReasoning => "few_shot_reasoning",
        }
    }

    pub fn explanation(&self) -> &'static str {
        match self {
            PromptTechnique::ZeroShot => "No examples - efficient for experts and simple questions",
            PromptTechnique::OneShot => "Single example - good balance for most users",
            PromptTechnique::MultiShot => {
                "Multiple examples - best for consistency and complex patterns"
            }
            PromptTechnique::ChainOfThought => {
                "Step-by-step reasoning - ideal for analytical questions"
            }
            PromptTechnique::FewShotReasoning => "Strategy optimized for the given context",
        }
    }
}

impl fmt::Display for PromptTechnique {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lookup-table technique choice. Combinations without an entry use multi-shot.
pub fn select_strategy(question_type: QuestionType, level: ExpertiseLevel) -> PromptTechnique {
    use ExpertiseLevel::*;
    use PromptTechnique::*;

    match (question_type, level) {
        (QuestionType::Factual, Beginner) => OneShot,
        (QuestionType::Factual, Intermediate) => MultiShot,
        (QuestionType::Factual, Expert) => ZeroShot,
        (QuestionType::Analytical, Beginner) => ChainOfThought,
        (QuestionType::Analytical, Intermediate) => MultiShot,
        (QuestionType::Analytical, Expert) => ChainOfThought,
        (QuestionType::Comparative, Beginner | Intermediate) => MultiShot,
        (QuestionType::Comparative, Expert) => FewShotReasoning,
        _ => MultiShot,
    }
}

/// How the context passage is transformed before it goes into the prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextProcessing {
    Raw,
    Summarized,
    Highlighted,
    Structured,
}

impl ContextProcessing {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContextProcessing::Raw => "raw",
            ContextProcessing::Summarized => "summarized",
            ContextProcessing::Highlighted => "highlighted",
            ContextProcessing::Structured => "structured",
        }
    }
}

/// Named configuration driving the adaptive prompt builder
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptStrategy {
    pub name: &'static str,
    pub system_prompt: &'static str,
    pub use_examples: bool,
    pub require_citations: bool,
    pub context_processing: ContextProcessing,
}

impl PromptStrategy {
    pub const SIMPLE_FACTUAL: PromptStrategy = PromptStrategy {
        name: "Simple Factual",
        system_prompt: "Provide clear, accurate answers based on context.",
        use_examples: false,
        require_citations: true,
        context_processing: ContextProcessing::Raw,
    };

    pub const ANALYTICAL_DETAILED: PromptStrategy = PromptStrategy {
        name: "Analytical Detailed",
        system_prompt: "Analyze information thoroughly with detailed explanations.",
        use_examples: true,
        require_citations: true,
        context_processing: ContextProcessing::Highlighted,
    };

    pub const COMPARATIVE_STRUCTURED: PromptStrategy = PromptStrategy {
        name: "Comparative Structured",
        system_prompt: "Compare and contrast systematically with clear structure.",
        use_examples: true,
        require_citations: true,
        context_processing: ContextProcessing::Structured,
    };

    pub const EXPERT_TECHNICAL: PromptStrategy = PromptStrategy {
        name: "Expert Technical",
        system_prompt: "Provide precise, technical responses with domain expertise.",
        use_examples: false,
        require_citations: true,
        context_processing: ContextProcessing::Raw,
    };
}

/// Rule-based strategy choice. Rules are checked in order and the first hit wins:
///
/// 1. expert user and high complexity: expert technical
/// 2. comparative question: comparative structured
/// 3. analytical question or high complexity: analytical detailed
/// 4. anything else: simple factual
///
/// The context analysis is accepted for callers that want to extend the rules;
/// none of the current rules read it.
pub fn select_prompt_strategy(
    question: &QuestionAnalysis,
    _context: &ContextAnalysis,
    level: ExpertiseLevel,
) -> PromptStrategy {
    if level == ExpertiseLevel::Expert && question.complexity == Level::High {
        return PromptStrategy::EXPERT_TECHNICAL;
    }
    if question.question_type == QuestionType::Comparative {
        return PromptStrategy::COMPARATIVE_STRUCTURED;
    }
    if question.question_type == QuestionType::Analytical || question.complexity == Level::High {
        return PromptStrategy::ANALYTICAL_DETAILED;
    }
    PromptStrategy::SIMPLE_FACTUAL
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::QuestionClassifier;
    use crate::context::{ContextAnalyzer, DocumentMetadata};

    fn analyses(question: &str) -> (QuestionAnalysis, ContextAnalysis) {
        (
            QuestionClassifier::new().classify(question),
            ContextAnalyzer::new().analyze("Plain context.", &DocumentMetadata::default()),
        )
    }

    #[test]
    fn test_simple_table() {
        use ExpertiseLevel::*;
        assert_eq!(select_strategy(QuestionType::Factual, Expert), PromptTechnique::ZeroShot);
        assert_eq!(select_strategy(QuestionType::Factual, Beginner), PromptTechnique::OneShot);
        assert_eq!(select_strategy(QuestionType::Analytical, Intermediate), PromptTechnique::MultiShot);
        assert_eq!(select_strategy(QuestionType::Analytical, Expert), PromptTechnique::ChainOfThought);
        assert_eq!(select_strategy(QuestionType::Comparative, Beginner), PromptTechnique::MultiShot);
        assert_eq!(
            select_strategy(QuestionType::Comparative, Expert),
            PromptTechnique::FewShotReasoning
        );
    }

    #[test]
    fn test_simple_table_default() {
        for level in ExpertiseLevel::ALL {
            assert_eq!(select_strategy(QuestionType::Procedural, level), PromptTechnique::MultiShot);
            assert_eq!(select_strategy(QuestionType::Creative, level), PromptTechnique::MultiShot);
        }
    }

    #[test]
    fn test_expert_high_complexity_beats_comparative() {
        let (q, c) = analyses("Compare and contrast TCP with UDP");
        assert_eq!(q.question_type, QuestionType::Comparative);
        assert_eq!(q.complexity, Level::High);

        assert_eq!(
            select_prompt_strategy(&q, &c, ExpertiseLevel::Expert),
            PromptStrategy::EXPERT_TECHNICAL
        );
        assert_eq!(
            select_prompt_strategy(&q, &c, ExpertiseLevel::Beginner),
            PromptStrategy::COMPARATIVE_STRUCTURED
        );
    }

    #[test]
    fn test_analytical_and_factual_rules() {
        let (q, c) = analyses("Why do leaves change color?");
        assert_eq!(
            select_prompt_strategy(&q, &c, ExpertiseLevel::Intermediate),
            PromptStrategy::ANALYTICAL_DETAILED
        );

        let (q, c) = analyses("What is water?");
        assert_eq!(
            select_prompt_strategy(&q, &c, ExpertiseLevel::Expert),
            PromptStrategy::SIMPLE_FACTUAL
        );
    }

    #[test]
    fn test_expertise_inference() {
        let long = Interaction {
            question: Some("x".repeat(150)),
        };
        let short = Interaction {
            question: Some("short".to_string()),
        };

        assert_eq!(
            determine_expertise_level(Some(ExpertiseLevel::Beginner), &[long.clone()]),
            ExpertiseLevel::Beginner
        );
        assert_eq!(determine_expertise_level(None, &[]), ExpertiseLevel::Intermediate);
        assert_eq!(
            determine_expertise_level(None, &vec![long.clone(); 10]),
            ExpertiseLevel::Expert
        );
        assert_eq!(
            determine_expertise_level(None, &[short.clone(), short.clone(), Interaction::default()]),
            ExpertiseLevel::Beginner
        );
        assert_eq!(
            determine_expertise_level(None, &[long, short]),
            ExpertiseLevel::Intermediate
        );
    }

    #[test]
    fn test_level_parsing() {
        assert_eq!("Expert".parse::<ExpertiseLevel>().unwrap(), ExpertiseLevel::Expert);
        assert!("guru".parse::<ExpertiseLevel>().is_err());
    }
}
