//! Adaptive prompt assembly
//!
//! The prompt is a fixed sequence of optional parts joined by newlines:
//! system instructions, special-context note, examples, reasoning scaffold,
//! context block, question block, output format, citation request. Each
//! optional part that fires records an adaptation tag.

use crate::classifier::{Level, QuestionAnalysis, QuestionType};
use crate::context::{ContextAnalysis, Domain};
use crate::error::{DocQaError, Result};
use crate::example_bank::adaptive_examples;
use crate::strategy::{ContextProcessing, ExpertiseLevel, PromptStrategy};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Shape the answer should take
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Structured,
    Detailed,
    Concise,
    Stepwise,
}

impl OutputFormat {
    fn default_for(question_type: QuestionType) -> Self {
        match question_type {
            QuestionType::Factual => OutputFormat::Concise,
            QuestionType::Analytical => OutputFormat::Detailed,
            QuestionType::Comparative => OutputFormat::Structured,
            QuestionType::Procedural => OutputFormat::Stepwise,
            QuestionType::Creative => OutputFormat::Detailed,
        }
    }

    fn instruction(&self) -> &'static str {
        match self {
            OutputFormat::Structured => "\nProvide structured answer with headings and bullet points.",
            OutputFormat::Detailed => "\nProvide comprehensive, detailed answer with explanations.",
            OutputFormat::Concise => "\nProvide concise, direct answer focusing on key points.",
            OutputFormat::Stepwise => "\nBreak down answer into clear, numbered steps.",
        }
    }
}

/// What is known about the person asking
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub expertise_level: Option<ExpertiseLevel>,
    #[serde(default)]
    pub preferred_format: Option<OutputFormat>,
}

/// Everything the builder needs for one prompt
#[derive(Debug, Clone, Copy)]
pub struct BuildRequest<'a> {
    pub question: &'a str,
    pub context: &'a str,
    pub question_analysis: &'a QuestionAnalysis,
    pub context_analysis: &'a ContextAnalysis,
    pub expertise: ExpertiseLevel,
    pub strategy: &'a PromptStrategy,
    pub user_profile: &'a UserProfile,
}

/// Assembled prompt text plus the adaptations applied to it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuiltPrompt {
    pub text: String,
    pub adaptations: Vec<String>,
}

/// Most examples inlined into an adaptive prompt
const MAX_EXAMPLES: usize = 2;

/// Stateless prompt assembler.
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptBuilder;

impl PromptBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn build(&self, req: &BuildRequest<'_>) -> Result<BuiltPrompt> {
        if req.question.trim().is_empty() {
            return Err(DocQaError::InvalidInput {
                reason: "question must not be empty".to_string(),
            });
        }

        let qa = req.question_analysis;
        let mut parts: Vec<String> = Vec::new();
        let mut adaptations: Vec<String> = Vec::new();

        parts.push(system_instructions(req.strategy, req.expertise, qa.question_type));

        if req.context_analysis.needs_special_handling {
            parts.push(special_instructions(&req.context_analysis.domain).to_string());
            adaptations.push("special_context_handling".to_string());
        }

        if req.strategy.use_examples {
            let examples = adaptive_examples(qa.question_type, req.expertise);
            let examples = &examples[..examples.len().min(MAX_EXAMPLES)];
            if !examples.is_empty() {
                parts.push("\nExamples:\n".to_string());
                parts.push(examples.join("\n\n"));
                adaptations.push(format!("added_{}_examples", examples.len()));
            }
        }

        if qa.complexity == Level::High || qa.question_type == QuestionType::Analytical {
            parts.push(chain_of_thought_instructions(qa.question_type).to_string());
            adaptations.push("chain_of_thought_reasoning".to_string());
        }

        parts.push("\n--- CONTEXT ---".to_string());
        parts.push(process_context(req.context, req.strategy.context_processing));
        if req.strategy.context_processing != ContextProcessing::Raw {
            adaptations.push(format!("context_{}", req.strategy.context_processing.as_str()));
        }

        parts.push("\n--- QUESTION ---".to_string());
        parts.push(frame_question(req.question, qa.question_type, req.expertise));

        parts.push(output_instructions(
            qa.question_type,
            req.expertise,
            req.user_profile.preferred_format,
        ));

        if req.strategy.require_citations {
            parts.push(
                "\nInclude confidence level (1-10) and cite specific parts of the context."
                    .to_string(),
            );
            adaptations.push("citations_required".to_string());
        }

        Ok(BuiltPrompt {
            text: parts.join("\n"),
            adaptations,
        })
    }
}

fn system_instructions(
    strategy: &PromptStrategy,
    expertise: ExpertiseLevel,
    question_type: QuestionType,
) -> String {
    let base = match expertise {
        ExpertiseLevel::Beginner => {
            "You are a helpful AI assistant that explains concepts clearly and simply."
        }
        ExpertiseLevel::Intermediate => {
            "You are an AI assistant that provides detailed, accurate information."
        }
        ExpertiseLevel::Expert => "You are an AI assistant that provides precise, technical responses.",
    };
    let type_specific = match question_type {
        QuestionType::Factual => "Focus on providing accurate, specific facts from the context.",
        QuestionType::Analytical => "Analyze the information thoroughly and explain your reasoning.",
        QuestionType::Comparative => "Compare and contrast different aspects systematically.",
        QuestionType::Procedural => "Provide clear, step-by-step instructions.",
        QuestionType::Creative => "Think creatively while staying grounded in the context.",
    };
    let system_prompt = if strategy.system_prompt.is_empty() {
        "Answer based on the provided context."
    } else {
        strategy.system_prompt
    };

    format!("{} {}\n\n{}", base, type_specific, system_prompt)
}

fn special_instructions(domain: &Domain) -> &'static str {
    match domain {
        Domain::Technical => "\nNote: This is technical content. Explain technical terms when needed.",
        Domain::Academic => {
            "\nNote: This is academic content. Maintain scholarly tone and cite sources."
        }
        _ => "\nNote: Handle this content with special care for accuracy.",
    }
}

fn chain_of_thought_instructions(question_type: QuestionType) -> &'static str {
    match question_type {
        QuestionType::Analytical => "\nUse step-by-step reasoning:\n1. Identify key components\n2. Analyze each component\n3. Explain relationships\n4. Draw conclusions",
        QuestionType::Comparative => "\nFollow comparison framework:\n1. Identify items to compare\n2. List comparison criteria\n3. Evaluate against criteria\n4. Summarize differences",
        QuestionType::Procedural => "\nBreak down process:\n1. Identify starting point\n2. List steps in sequence\n3. Explain necessity of each step\n4. Describe expected outcome",
        _ => "\nThink step by step, explaining your reasoning.",
    }
}

fn frame_question(question: &str, question_type: QuestionType, expertise: ExpertiseLevel) -> String {
    use ExpertiseLevel::*;
    use QuestionType::*;

    let prefix = match (expertise, question_type) {
        (Beginner, Factual) => "Please explain in simple terms: ",
        (Beginner, Analytical) => "Help me understand: ",
        (Beginner, Comparative) => "What are the differences regarding: ",
        (Intermediate, Factual) => "Based on the context, ",
        (Intermediate, Analytical) => "Analyze and explain: ",
        (Intermediate, Comparative) => "Compare and evaluate: ",
        (Expert, Analytical) => "Provide detailed analysis of: ",
        (Expert, Comparative) => "Conduct comprehensive comparison: ",
        _ => "",
    };
    format!("{}{}", prefix, question)
}

fn output_instructions(
    question_type: QuestionType,
    expertise: ExpertiseLevel,
    preferred: Option<OutputFormat>,
) -> String {
    let format = preferred.unwrap_or_else(|| OutputFormat::default_for(question_type));
    let suffix = match expertise {
        ExpertiseLevel::Beginner => " Use simple language and explain technical terms.",
        ExpertiseLevel::Intermediate => "",
        ExpertiseLevel::Expert => " Use technical terminology and assume domain knowledge.",
    };
    format!("{}{}", format.instruction(), suffix)
}

/// Transform the context passage according to `mode`.
pub fn process_context(context: &str, mode: ContextProcessing) -> String {
    match mode {
        ContextProcessing::Raw => context.to_string(),
        ContextProcessing::Summarized => summarize_context(context),
        ContextProcessing::Highlighted => highlight_key_points(context),
        ContextProcessing::Structured => structure_context(context),
    }
}

/// Sentences shorter than this (after trimming) are skipped when summarizing
const MIN_SENTENCE_CHARS: usize = 20;
const MAX_SUMMARY_SENTENCES: usize = 5;

fn summarize_context(context: &str) -> String {
    static SENTENCE_END: OnceLock<Regex> = OnceLock::new();
    let sentence_end =
        SENTENCE_END.get_or_init(|| Regex::new(r"[.!?]+").expect("sentence pattern must compile"));

    let sentences: Vec<&str> = sentence_end
        .split(context)
        .filter(|s| s.trim().chars().count() > MIN_SENTENCE_CHARS)
        .collect();
    let keep = MAX_SUMMARY_SENTENCES.min((sentences.len() as f64 * 0.3).ceil() as usize);

    format!("{}.", sentences[..keep].join(". "))
}

fn highlight_key_points(context: &str) -> String {
    static KEYWORDS: OnceLock<Regex> = OnceLock::new();
    KEYWORDS
        .get_or_init(|| {
            Regex::new(r"(?i)\b(important|key|significant|main|primary|essential)\b")
                .expect("keyword pattern must compile")
        })
        .replace_all(context, "**${1}**")
        .into_owned()
}

fn structure_context(context: &str) -> String {
    let paragraphs: Vec<&str> = context
        .split("\n\n")
        .filter(|p| !p.trim().is_empty())
        .collect();
    if paragraphs.len() <= 1 {
        return context.to_string();
    }

    paragraphs
        .iter()
        .enumerate()
        .map(|(i, para)| format!("**Section {}:**\n{}", i + 1, para))
        .collect::<Vec<_>>()
        .join("\n\n")
}
