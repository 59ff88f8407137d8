//! Non-adaptive prompt templates: zero-shot, one-shot, multi-shot,
//! chain-of-thought and few-shot with reasoning.

use crate::classifier::QuestionType;
use crate::context::Domain;
use crate::error::{DocQaError, Result};
use crate::example_bank::{Example, ExampleBank};
use crate::strategy::{select_strategy, ExpertiseLevel, PromptTechnique};
use rand::Rng;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt::Write;
use tracing::debug;

/// Default number of examples for multi-shot prompts
pub const DEFAULT_NUM_EXAMPLES: usize = 3;

const ANSWER_INSTRUCTION: &str = "Answer the following question based on the provided context";

fn push_example(prompt: &mut String, number: usize, example: &Example) {
    // Writing into a String cannot fail
    let _ = write!(
        prompt,
        "Example {}:\nContext: {}\nQuestion: {}\nAnswer: {}\n\n",
        number, example.context, example.question, example.answer
    );
}

/// Generates template-variant prompts from an [`ExampleBank`].
#[derive(Debug, Clone, Default)]
pub struct PromptTemplates {
    bank: ExampleBank,
}

impl PromptTemplates {
    pub fn new(bank: ExampleBank) -> Self {
        Self { bank }
    }

    pub fn bank(&self) -> &ExampleBank {
        &self.bank
    }

    pub fn bank_mut(&mut self) -> &mut ExampleBank {
        &mut self.bank
    }

    /// Instruction, context and question with no examples.
    pub fn zero_shot(&self, question: &str, context: &str) -> String {
        format!(
            "{}:\n\nContext: {}\n\nQuestion: {}\n\nAnswer:",
            ANSWER_INSTRUCTION, context, question
        )
    }

    /// One randomly chosen example from `domain` ahead of the question.
    pub fn one_shot<R: Rng + ?Sized>(
        &self,
        question: &str,
        context: &str,
        domain: &Domain,
        rng: &mut R,
    ) -> Result<String> {
        let example = self
            .bank
            .example(domain, rng)
            .ok_or_else(|| DocQaError::InvalidInput {
                reason: format!("no examples available for domain: {}", domain),
            })?;

        Ok(format!(
            "{}. Here's an example:\n\nExample:\nContext: {}\nQuestion: {}\nAnswer: {}\n\nNow answer this question:\nContext: {}\nQuestion: {}\nAnswer:",
            ANSWER_INSTRUCTION, example.context, example.question, example.answer, context, question
        ))
    }

    /// Up to `num_examples` shuffled examples, numbered from 1.
    pub fn multi_shot<R: Rng + ?Sized>(
        &self,
        question: &str,
        context: &str,
        domain: &Domain,
        num_examples: usize,
        rng: &mut R,
    ) -> String {
        let examples = self.bank.sample(domain, num_examples, rng);
        debug!(%domain, requested = num_examples, used = examples.len(), "building multi-shot prompt");

        let mut prompt = format!("{}. Here are some examples:\n\n", ANSWER_INSTRUCTION);
        for (i, example) in examples.iter().enumerate() {
            push_example(&mut prompt, i + 1, example);
        }
        let _ = write!(
            prompt,
            "Now answer this question:\nContext: {}\nQuestion: {}\nAnswer:",
            context, question
        );
        prompt
    }

    /// Step-by-step scaffold, optionally preceded by the worked examples.
    pub fn chain_of_thought(&self, question: &str, context: &str, include_examples: bool) -> String {
        let mut prompt = String::new();

        if include_examples {
            prompt.push_str("Answer step by step with clear reasoning. Here are examples:\n\n");
            for (i, example) in self.bank.chain_of_thought_examples().iter().enumerate() {
                push_example(&mut prompt, i + 1, example);
            }
        }

        let _ = write!(
            prompt,
            "Now solve this step by step:\nContext: {}\nQuestion: {}\n\n\
             Let's think step by step:\n\
             1. First, I'll identify the key information\n\
             2. Then, I'll analyze what the question is asking\n\
             3. Finally, I'll provide a clear answer\n\n\
             Answer:",
            context, question
        );
        prompt
    }

    /// Examples annotated with their reasoning, then a reasoning/answer trailer.
    pub fn few_shot_with_reasoning(&self, question: &str, context: &str) -> String {
        let mut prompt = String::from("Answer the question with clear reasoning. Examples:\n\n");
        for (i, example) in self.bank.reasoning_examples().iter().enumerate() {
            let _ = write!(
                prompt,
                "Example {}:\nContext: {}\nQuestion: {}\nReasoning: {}\nAnswer: {}\n\n",
                i + 1,
                example.context,
                example.question,
                example.reasoning,
                example.answer
            );
        }
        let _ = write!(
            prompt,
            "Now answer with reasoning:\nContext: {}\nQuestion: {}\n\
             Reasoning: [Explain your thought process]\n\
             Answer: [Your final answer]",
            context, question
        );
        prompt
    }

    /// Pick a technique with [`select_strategy`] and render it with the
    /// general domain and default example count.
    pub fn adaptive<R: Rng + ?Sized>(
        &self,
        question: &str,
        context: &str,
        level: ExpertiseLevel,
        question_type: QuestionType,
        rng: &mut R,
    ) -> Result<(PromptTechnique, String)> {
        let technique = select_strategy(question_type, level);
        let prompt = self.render(technique, question, context, rng)?;
        Ok((technique, prompt))
    }

    /// Render `technique` with default options.
    pub fn render<R: Rng + ?Sized>(
        &self,
        technique: PromptTechnique,
        question: &str,
        context: &str,
        rng: &mut R,
    ) -> Result<String> {
        let general = Domain::General;
        Ok(match technique {
            PromptTechnique::ZeroShot => self.zero_shot(question, context),
            PromptTechnique::OneShot => self.one_shot(question, context, &general, rng)?,
            PromptTechnique::MultiShot => {
                self.multi_shot(question, context, &general, DEFAULT_NUM_EXAMPLES, rng)
            }
            PromptTechnique::ChainOfThought => self.chain_of_thought(question, context, true),
            PromptTechnique::FewShotReasoning => self.few_shot_with_reasoning(question, context),
        })
    }
}

/// Size statistics of a generated prompt
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenAnalysis {
    pub characters: usize,
    pub words: usize,
    /// Rough estimate at four characters per token
    pub estimated_tokens: usize,
    pub lines: usize,
}

impl TokenAnalysis {
    pub fn of(prompt: &str) -> Self {
        let characters = prompt.chars().count();
        Self {
            characters,
            words: crate::classifier::word_count(prompt),
            estimated_tokens: characters.div_ceil(4),
            lines: prompt.split('\n').count(),
        }
    }
}

/// Aggregate quality of a set of model responses against a reference answer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectivenessReport {
    pub accuracy: f64,
    pub consistency: f64,
    pub completeness: f64,
    pub recommendations: Vec<&'static str>,
}

fn words(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// A response is accurate when more than half of the reference words appear in it.
fn is_accurate(response: &str, gold: &str) -> bool {
    let gold_words = words(gold);
    if gold_words.is_empty() {
        return false;
    }
    let gold_set: HashSet<&str> = gold_words.iter().map(String::as_str).collect();
    let overlap = words(response)
        .iter()
        .filter(|w| gold_set.contains(w.as_str()))
        .count();
    overlap as f64 / gold_words.len() as f64 > 0.5
}

/// A response is complete when it is at least 70% as long as the reference.
fn is_complete(response: &str, gold: &str) -> bool {
    response.chars().count() as f64 >= gold.chars().count() as f64 * 0.7
}

/// Words of `a` found in `b`, over the number of distinct words in both.
fn text_similarity(a: &str, b: &str) -> f64 {
    let words_a = words(a);
    let words_b = words(b);
    let set_b: HashSet<&str> = words_b.iter().map(String::as_str).collect();
    let intersection = words_a.iter().filter(|w| set_b.contains(w.as_str())).count();
    let union: HashSet<&str> = words_a
        .iter()
        .chain(words_b.iter())
        .map(String::as_str)
        .collect();
    if union.is_empty() {
        return 0.0;
    }
    intersection as f64 / union.len() as f64
}

fn consistency(responses: &[String]) -> f64 {
    if responses.len() < 2 {
        return 1.0;
    }
    let mut total = 0.0;
    let mut comparisons = 0usize;
    for (i, a) in responses.iter().enumerate() {
        for b in &responses[i + 1..] {
            total += text_similarity(a, b);
            comparisons += 1;
        }
    }
    total / comparisons as f64
}

/// Score `responses` against `gold` and suggest prompt changes.
pub fn analyze_prompt_effectiveness(responses: &[String], gold: &str) -> EffectivenessReport {
    let mut report = EffectivenessReport {
        accuracy: 0.0,
        consistency: 0.0,
        completeness: 0.0,
        recommendations: Vec::new(),
    };
    if responses.is_empty() {
        return report;
    }

    let n = responses.len() as f64;
    report.accuracy = responses.iter().filter(|r| is_accurate(r, gold)).count() as f64 / n;
    report.completeness = responses.iter().filter(|r| is_complete(r, gold)).count() as f64 / n;
    report.consistency = consistency(responses);

    if report.accuracy < 0.7 {
        report.recommendations.push("Consider adding more relevant examples");
    }
    if report.consistency < 0.6 {
        report.recommendations.push("Use more consistent example formats");
    }
    if report.completeness < 0.8 {
        report.recommendations.push("Include examples with more detailed answers");
    }
    report
}
