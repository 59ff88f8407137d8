//! End-to-end adaptive prompt generation with a guaranteed fallback

use crate::builder::{BuildRequest, PromptBuilder, UserProfile};
use crate::classifier::QuestionClassifier;
use crate::context::{ContextAnalyzer, DocumentMetadata};
use crate::error::{DocQaError, Result};
use crate::strategy::{
    determine_expertise_level, select_prompt_strategy, ExpertiseLevel, Interaction,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Strategy name reported when the fallback prompt is used
pub const FALLBACK_STRATEGY: &str = "fallback";
/// Adaptation tag reported when the fallback prompt is used
pub const FALLBACK_ADAPTATION: &str = "fallback_used";

/// Input to [`DynamicPromptService::generate`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DynamicPromptRequest {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub context: String,
    #[serde(default)]
    pub user_profile: UserProfile,
    #[serde(default)]
    pub document_metadata: DocumentMetadata,
    #[serde(default)]
    pub previous_interactions: Vec<Interaction>,
}

impl DynamicPromptRequest {
    pub fn new(question: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            context: context.into(),
            ..Default::default()
        }
    }
}

/// Observability record attached to every generated prompt
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptMetadata {
    /// Question type name, or `unknown` for the fallback prompt
    pub question_type: String,
    pub confidence: f64,
    pub strategy: String,
    pub expertise_level: ExpertiseLevel,
    pub context_length: usize,
    pub prompt_length: usize,
    pub adaptations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DynamicPrompt {
    pub prompt: String,
    pub metadata: PromptMetadata,
}

impl DynamicPrompt {
    pub fn is_fallback(&self) -> bool {
        self.metadata.strategy == FALLBACK_STRATEGY
    }
}

/// Classify, analyze, pick a strategy and build. Holds no per-call state.
#[derive(Debug, Clone, Copy, Default)]
pub struct DynamicPromptService {
    classifier: QuestionClassifier,
    analyzer: ContextAnalyzer,
    builder: PromptBuilder,
}

impl DynamicPromptService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn classifier(&self) -> &QuestionClassifier {
        &self.classifier
    }

    /// Always returns a usable prompt; internal failures produce the fallback.
    pub fn generate(&self, request: &DynamicPromptRequest) -> DynamicPrompt {
        self.try_generate(request).unwrap_or_else(|e| {
            warn!(error = %e, "adaptive prompt generation failed, using fallback");
            fallback_prompt(&request.question, &request.context)
        })
    }

    fn try_generate(&self, request: &DynamicPromptRequest) -> Result<DynamicPrompt> {
        if request.question.trim().is_empty() {
            return Err(DocQaError::InvalidInput {
                reason: "question must not be empty".to_string(),
            });
        }

        let question_analysis = self.classifier.classify(&request.question);
        let context_analysis = self
            .analyzer
            .analyze(&request.context, &request.document_metadata);
        let expertise = determine_expertise_level(
            request.user_profile.expertise_level,
            &request.previous_interactions,
        );
        let strategy = select_prompt_strategy(&question_analysis, &context_analysis, expertise);

        let built = self.builder.build(&BuildRequest {
            question: &request.question,
            context: &request.context,
            question_analysis: &question_analysis,
            context_analysis: &context_analysis,
            expertise,
            strategy: &strategy,
            user_profile: &request.user_profile,
        })?;

        debug!(
            strategy = strategy.name,
            question_type = %question_analysis.question_type,
            %expertise,
            adaptations = built.adaptations.len(),
            "built adaptive prompt"
        );

        Ok(DynamicPrompt {
            metadata: PromptMetadata {
                question_type: question_analysis.question_type.to_string(),
                confidence: question_analysis.confidence,
                strategy: strategy.name.to_string(),
                expertise_level: expertise,
                context_length: request.context.chars().count(),
                prompt_length: built.text.chars().count(),
                adaptations: built.adaptations,
            },
            prompt: built.text,
        })
    }
}

/// Minimal prompt embedding the raw question and context.
pub fn fallback_prompt(question: &str, context: &str) -> DynamicPrompt {
    let prompt = format!(
        "Answer the following question based on the provided context:\n\n\
         Context: {}\n\n\
         Question: {}\n\n\
         Provide a clear, accurate answer based on the context.",
        context, question
    );
    DynamicPrompt {
        metadata: PromptMetadata {
            question_type: "unknown".to_string(),
            confidence: 0.5,
            strategy: FALLBACK_STRATEGY.to_string(),
            expertise_level: ExpertiseLevel::Intermediate,
            context_length: context.chars().count(),
            prompt_length: prompt.chars().count(),
            adaptations: vec![FALLBACK_ADAPTATION.to_string()],
        },
        prompt,
    }
}
