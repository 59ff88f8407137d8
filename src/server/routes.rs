//! HTTP route handlers for the similarity and prompting API.

use crate::classifier::{word_count, QuestionAnalysis, QuestionType};
use crate::context::Domain;
use crate::dynamic::{DynamicPromptRequest, PromptMetadata};
use crate::error::DocQaError;
use crate::ranker::{
    best_method, compare_all_methods, find_most_similar, MethodComparison, RankItem, ScoredMatch,
};
use crate::server::AppState;
use crate::similarity::{MethodProfile, SimilarityMethod};
use crate::strategy::{ExpertiseLevel, Interaction, PromptTechnique};
use crate::templates::{TokenAnalysis, DEFAULT_NUM_EXAMPLES};
use crate::vector::Vector;
use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

type ApiError = (StatusCode, Json<ErrorResponse>);
type ApiResult<T> = Result<Json<T>, ApiError>;

// --- Request/Response types ---

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn bad_request(error: impl Into<String>) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
}

impl From<DocQaError> for ErrorResponse {
    fn from(e: DocQaError) -> Self {
        ErrorResponse {
            error: e.to_string(),
        }
    }
}

fn invalid(e: DocQaError) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(e.into()))
}

fn lock_poisoned<T>(_: T) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "Lock poisoned".to_string(),
        }),
    )
}

/// First `max` characters of `text` followed by `...`.
fn preview(text: &str, max: usize) -> String {
    let mut out: String = text.chars().take(max).collect();
    out.push_str("...");
    out
}

fn require_question_and_context(question: &str, context: &str) -> Result<(), ApiError> {
    if question.trim().is_empty() || context.trim().is_empty() {
        return Err(bad_request("Question and context are required"));
    }
    Ok(())
}

fn default_vector_a() -> Vector {
    Vector::new(vec![1.0, 2.0, 3.0, 4.0, 5.0])
}

fn default_vector_b() -> Vector {
    Vector::new(vec![2.0, 3.0, 4.0, 5.0, 6.0])
}

fn default_method() -> String {
    SimilarityMethod::DotProduct.as_str().to_string()
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarityTestRequest {
    #[serde(default = "default_vector_a")]
    pub vector_a: Vector,
    #[serde(default = "default_vector_b")]
    pub vector_b: Vector,
    #[serde(default = "default_method")]
    pub method: String,
}

#[derive(Serialize)]
pub struct SimilarityExplanation {
    pub formula: &'static str,
    /// Per-element products, dot product only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calculation: Option<String>,
    pub interpretation: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarityTestResponse {
    pub method: SimilarityMethod,
    pub result: f64,
    pub explanation: SimilarityExplanation,
    pub vector_a: Vector,
    pub vector_b: Vector,
    /// Raw values of all three functions (Euclidean as a distance)
    pub comparison: BTreeMap<SimilarityMethod, f64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub query_embedding: Vector,
    #[serde(default)]
    pub items: Vec<RankItem<Value>>,
    pub method: Option<String>,
    pub top_k: Option<usize>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub method: SimilarityMethod,
    pub top_k: usize,
    pub results: Vec<ScoredMatch<Value>>,
    /// Milliseconds
    pub search_time: f64,
    pub total_items: usize,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompareRequest {
    pub query_embedding: Vector,
    #[serde(default)]
    pub items: Vec<RankItem<Value>>,
    pub top_k: Option<usize>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompareAnalysis {
    pub best_method: SimilarityMethod,
    pub total_items: usize,
    pub recommendation: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompareResponse {
    pub comparison: BTreeMap<SimilarityMethod, MethodComparison<Value>>,
    pub method_explanations: BTreeMap<SimilarityMethod, MethodProfile>,
    pub analysis: CompareAnalysis,
}

/// Body shared by the `/api/prompting` endpoints; each uses the fields it needs.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptingRequest {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub context: String,
    #[serde(default)]
    pub domain: Domain,
    pub num_examples: Option<usize>,
    pub include_examples: Option<bool>,
    /// Free-form; unknown labels fall back to multi-shot
    pub user_level: Option<String>,
    pub question_type: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateMetadata {
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<Domain>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_examples: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_examples: Option<bool>,
    pub question_length: usize,
    pub context_length: usize,
    pub prompt_length: usize,
}

impl TemplateMetadata {
    fn new(kind: &'static str, question: &str, context: &str, prompt: &str) -> Self {
        Self {
            kind,
            domain: None,
            num_examples: None,
            include_examples: None,
            question_length: question.chars().count(),
            context_length: context.chars().count(),
            prompt_length: prompt.chars().count(),
        }
    }
}

#[derive(Serialize)]
pub struct TemplateResponse {
    pub success: bool,
    pub prompt: String,
    pub metadata: TemplateMetadata,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TechniqueSummary {
    pub prompt: String,
    pub length: usize,
    pub word_count: usize,
    pub example_count: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TechniqueTradeoffs {
    pub pros: &'static [&'static str],
    pub cons: &'static [&'static str],
    pub best_for: &'static str,
}

#[derive(Serialize)]
pub struct TechniqueComparisonResponse {
    pub question: String,
    pub context: String,
    pub domain: Domain,
    pub comparison: BTreeMap<&'static str, TechniqueSummary>,
    pub analysis: BTreeMap<&'static str, TechniqueTradeoffs>,
    pub recommendations: BTreeMap<&'static str, &'static str>,
}

#[derive(Serialize)]
pub struct EvolutionStep {
    pub prompt: String,
    pub description: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvolutionResponse {
    pub question: String,
    pub domain: Domain,
    pub evolution: BTreeMap<&'static str, EvolutionStep>,
    pub progressive_improvements: &'static [&'static str],
    pub token_analysis: BTreeMap<&'static str, TokenAnalysis>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdaptiveMetadata {
    pub strategy: &'static str,
    pub user_level: String,
    pub question_type: String,
    pub question_length: usize,
    pub context_length: usize,
    pub prompt_length: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdaptiveExplanation {
    pub why: String,
    pub strategy_details: &'static str,
}

#[derive(Serialize)]
pub struct AdaptiveResponse {
    pub success: bool,
    pub prompt: String,
    pub metadata: AdaptiveMetadata,
    pub explanation: AdaptiveExplanation,
}

#[derive(Serialize)]
pub struct DynamicPromptResponse {
    pub success: bool,
    pub prompt: String,
    pub metadata: PromptMetadata,
}

#[derive(Serialize)]
pub struct Variation {
    pub prompt: String,
    pub strategy: String,
    pub adaptations: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariationsResponse {
    pub question: String,
    pub context_length: usize,
    pub variations: BTreeMap<&'static str, Variation>,
}

#[derive(Deserialize)]
pub struct AnalyzeQuestionRequest {
    #[serde(default)]
    pub question: String,
}

#[derive(Serialize)]
pub struct AnalyzeQuestionResponse {
    pub question: String,
    pub analysis: QuestionAnalysis,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Demonstration {
    pub prompt: String,
    pub strategy: String,
    pub expertise_level: ExpertiseLevel,
    pub adaptations: Vec<String>,
    pub prompt_length: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DemonstrationResponse {
    pub question: String,
    pub context_length: usize,
    pub demonstrations: BTreeMap<&'static str, Demonstration>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub example_domains: usize,
}

#[derive(Serialize)]
pub struct MetricsResponse {
    pub total_rankings: u64,
    pub total_similarity_tests: u64,
    pub total_prompts: u64,
    pub total_fallbacks: u64,
    pub avg_ranking_latency_us: f64,
    pub p50_ranking_latency_us: f64,
    pub p95_ranking_latency_us: f64,
    pub p99_ranking_latency_us: f64,
}

// --- Router ---

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/metrics", get(get_metrics))
        .route("/api/similarity/test", post(test_similarity))
        .route("/api/similarity/search", post(search_similar))
        .route("/api/similarity/compare", post(compare_methods))
        .route("/api/prompting/zero-shot", post(zero_shot))
        .route("/api/prompting/one-shot", post(one_shot))
        .route("/api/prompting/multi-shot", post(multi_shot))
        .route("/api/prompting/chain-of-thought", post(chain_of_thought))
        .route("/api/prompting/compare", post(compare_techniques))
        .route("/api/prompting/demonstrate", post(demonstrate_evolution))
        .route("/api/prompting/adaptive", post(adaptive))
        .route("/api/prompts/generate", post(generate_dynamic))
        .route("/api/prompts/test-variations", post(test_variations))
        .route("/api/prompts/analyze-question", post(analyze_question))
        .route("/api/prompts/demonstrate", post(demonstrate_adaptation))
        .with_state(state)
}

// --- Handlers: similarity ---

async fn test_similarity(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SimilarityTestRequest>,
) -> ApiResult<SimilarityTestResponse> {
    let method: SimilarityMethod = req.method.parse().map_err(invalid)?;
    let result = method.compute(&req.vector_a, &req.vector_b).map_err(invalid)?;

    let calculation = (method == SimilarityMethod::DotProduct).then(|| {
        req.vector_a
            .as_slice()
            .iter()
            .zip(req.vector_b.as_slice())
            .map(|(a, b)| format!("{} × {} = {}", a, b, a * b))
            .collect::<Vec<_>>()
            .join(" + ")
    });

    let mut comparison = BTreeMap::new();
    for m in SimilarityMethod::ALL {
        comparison.insert(m, m.compute(&req.vector_a, &req.vector_b).map_err(invalid)?);
    }

    if let Ok(mut metrics) = state.metrics.write() {
        metrics.record_similarity_test();
    }

    Ok(Json(SimilarityTestResponse {
        method,
        result,
        explanation: SimilarityExplanation {
            formula: method.formula(),
            calculation,
            interpretation: method.interpretation(),
        },
        vector_a: req.vector_a,
        vector_b: req.vector_b,
        comparison,
    }))
}

async fn search_similar(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SearchRequest>,
) -> ApiResult<SearchResponse> {
    if req.query_embedding.is_empty() {
        return Err(bad_request("queryEmbedding is required"));
    }
    let method: SimilarityMethod = match &req.method {
        Some(m) => m.parse().map_err(invalid)?,
        None => SimilarityMethod::DotProduct,
    };
    let top_k = req.top_k.unwrap_or(state.config.default_top_k);

    let start = Instant::now();
    let results = find_most_similar(&req.query_embedding, &req.items, method, top_k);
    let elapsed = start.elapsed();

    if let Ok(mut metrics) = state.metrics.write() {
        metrics.record_ranking(elapsed);
    }

    Ok(Json(SearchResponse {
        method,
        top_k,
        results,
        search_time: elapsed.as_secs_f64() * 1000.0,
        total_items: req.items.len(),
    }))
}

async fn compare_methods(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CompareRequest>,
) -> ApiResult<CompareResponse> {
    if req.query_embedding.is_empty() {
        return Err(bad_request("queryEmbedding is required"));
    }
    let top_k = req.top_k.unwrap_or(3);

    let start = Instant::now();
    let comparison = compare_all_methods(&req.query_embedding, &req.items, top_k);
    let elapsed = start.elapsed();

    if let Ok(mut metrics) = state.metrics.write() {
        metrics.record_ranking(elapsed);
    }

    let best = best_method(&comparison);
    let method_explanations = SimilarityMethod::ALL
        .iter()
        .map(|m| (*m, m.profile()))
        .collect();

    Ok(Json(CompareResponse {
        comparison,
        method_explanations,
        analysis: CompareAnalysis {
            best_method: best,
            total_items: req.items.len(),
            recommendation: best.profile().best_for,
        },
    }))
}

// --- Handlers: prompting techniques ---

fn record_prompts(state: &AppState, count: usize) {
    if let Ok(mut metrics) = state.metrics.write() {
        for _ in 0..count {
            metrics.record_prompt(false);
        }
    }
}

async fn zero_shot(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PromptingRequest>,
) -> ApiResult<TemplateResponse> {
    require_question_and_context(&req.question, &req.context)?;

    let prompt = state.templates.zero_shot(&req.question, &req.context);
    record_prompts(&state, 1);

    let mut metadata = TemplateMetadata::new("zero-shot", &req.question, &req.context, &prompt);
    metadata.num_examples = Some(0);
    Ok(Json(TemplateResponse {
        success: true,
        prompt,
        metadata,
    }))
}

async fn one_shot(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PromptingRequest>,
) -> ApiResult<TemplateResponse> {
    require_question_and_context(&req.question, &req.context)?;

    let prompt = state
        .templates
        .one_shot(&req.question, &req.context, &req.domain, &mut state.config.rng())
        .map_err(invalid)?;
    record_prompts(&state, 1);
    info!(domain = %req.domain, "generated one-shot prompt");

    let mut metadata = TemplateMetadata::new("one-shot", &req.question, &req.context, &prompt);
    metadata.domain = Some(req.domain);
    metadata.num_examples = Some(1);
    Ok(Json(TemplateResponse {
        success: true,
        prompt,
        metadata,
    }))
}

async fn multi_shot(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PromptingRequest>,
) -> ApiResult<TemplateResponse> {
    require_question_and_context(&req.question, &req.context)?;

    let num_examples = req.num_examples.unwrap_or(DEFAULT_NUM_EXAMPLES);
    let prompt = state.templates.multi_shot(
        &req.question,
        &req.context,
        &req.domain,
        num_examples,
        &mut state.config.rng(),
    );
    record_prompts(&state, 1);
    info!(domain = %req.domain, num_examples, "generated multi-shot prompt");

    let mut metadata = TemplateMetadata::new("multi-shot", &req.question, &req.context, &prompt);
    metadata.domain = Some(req.domain);
    metadata.num_examples = Some(num_examples);
    Ok(Json(TemplateResponse {
        success: true,
        prompt,
        metadata,
    }))
}

async fn chain_of_thought(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PromptingRequest>,
) -> ApiResult<TemplateResponse> {
    require_question_and_context(&req.question, &req.context)?;

    let include_examples = req.include_examples.unwrap_or(true);
    let prompt = state
        .templates
        .chain_of_thought(&req.question, &req.context, include_examples);
    record_prompts(&state, 1);

    let mut metadata =
        TemplateMetadata::new("chain-of-thought", &req.question, &req.context, &prompt);
    metadata.include_examples = Some(include_examples);
    Ok(Json(TemplateResponse {
        success: true,
        prompt,
        metadata,
    }))
}

async fn compare_techniques(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PromptingRequest>,
) -> ApiResult<TechniqueComparisonResponse> {
    require_question_and_context(&req.question, &req.context)?;

    let templates = &state.templates;
    let mut rng = state.config.rng();
    let (q, c, domain) = (req.question.as_str(), req.context.as_str(), &req.domain);

    let one_shot = templates.one_shot(q, c, domain, &mut rng).map_err(invalid)?;
    let multi_shot = templates.multi_shot(q, c, domain, DEFAULT_NUM_EXAMPLES, &mut rng);
    let multi_shot_examples = templates.bank().examples_for(domain).len().min(DEFAULT_NUM_EXAMPLES);
    let techniques = [
        ("zero-shot", templates.zero_shot(q, c), 0),
        ("one-shot", one_shot, 1),
        ("multi-shot", multi_shot, multi_shot_examples),
        (
            "chain-of-thought",
            templates.chain_of_thought(q, c, true),
            templates.bank().chain_of_thought_examples().len(),
        ),
    ];
    record_prompts(&state, techniques.len());

    let comparison = techniques
        .into_iter()
        .map(|(name, prompt, example_count)| {
            let summary = TechniqueSummary {
                length: prompt.chars().count(),
                word_count: word_count(&prompt),
                example_count,
                prompt,
            };
            (name, summary)
        })
        .collect();

    let analysis = BTreeMap::from([
        (
            "zero-shot",
            TechniqueTradeoffs {
                pros: &["Concise", "Fast", "No example bias"],
                cons: &["May lack guidance", "Inconsistent results"],
                best_for: "Simple factual questions, expert users",
            },
        ),
        (
            "one-shot",
            TechniqueTradeoffs {
                pros: &["Good guidance", "Moderate length", "Clear format"],
                cons: &["Single example bias", "May not cover edge cases"],
                best_for: "Standard questions, intermediate users",
            },
        ),
        (
            "multi-shot",
            TechniqueTradeoffs {
                pros: &["Multiple examples", "Consistent format", "Better coverage"],
                cons: &["Longer prompts", "More tokens", "Example selection bias"],
                best_for: "Complex questions, consistent formatting needed",
            },
        ),
        (
            "chain-of-thought",
            TechniqueTradeoffs {
                pros: &[
                    "Step-by-step reasoning",
                    "Transparent process",
                    "Better for complex problems",
                ],
                cons: &["Longest prompts", "Most tokens", "May over-explain"],
                best_for: "Analytical questions, mathematical problems",
            },
        ),
    ]);

    let recommendations = BTreeMap::from([
        ("forBeginner", "Use multi-shot prompting for consistency"),
        ("forIntermediate", "Use one-shot or multi-shot based on complexity"),
        ("forExpert", "Use zero-shot for efficiency, chain-of-thought for reasoning"),
        ("forComplexQuestions", "Use chain-of-thought prompting"),
        ("forSimpleQuestions", "Use zero-shot or one-shot prompting"),
    ]);

    Ok(Json(TechniqueComparisonResponse {
        context: preview(&req.context, 100),
        question: req.question,
        domain: req.domain,
        comparison,
        analysis,
        recommendations,
    }))
}

const PROGRESSIVE_IMPROVEMENTS: &[&str] = &[
    "Zero-shot: Quick but potentially inconsistent",
    "One-shot: Adds format guidance but may have example bias",
    "Multi-shot (2): Reduces bias, shows pattern variation",
    "Multi-shot (3): Optimal balance of guidance and efficiency",
];

async fn demonstrate_evolution(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PromptingRequest>,
) -> ApiResult<EvolutionResponse> {
    require_question_and_context(&req.question, &req.context)?;

    let templates = &state.templates;
    let mut rng = state.config.rng();
    let (q, c, domain) = (req.question.as_str(), req.context.as_str(), &req.domain);

    let steps = [
        (
            "step1_zero_shot",
            templates.zero_shot(q, c),
            "No examples provided - relies on model's inherent knowledge",
        ),
        (
            "step2_one_shot",
            templates.one_shot(q, c, domain, &mut rng).map_err(invalid)?,
            "Single example to demonstrate desired format and approach",
        ),
        (
            "step3_multi_shot_2",
            templates.multi_shot(q, c, domain, 2, &mut rng),
            "Two examples showing pattern and reducing single-example bias",
        ),
        (
            "step4_multi_shot_3",
            templates.multi_shot(q, c, domain, 3, &mut rng),
            "Three examples providing robust pattern recognition",
        ),
    ];
    record_prompts(&state, steps.len());

    let mut evolution = BTreeMap::new();
    let mut token_analysis = BTreeMap::new();
    for (step, prompt, description) in steps {
        token_analysis.insert(step, TokenAnalysis::of(&prompt));
        evolution.insert(step, EvolutionStep { prompt, description });
    }

    Ok(Json(EvolutionResponse {
        question: req.question,
        domain: req.domain,
        evolution,
        progressive_improvements: PROGRESSIVE_IMPROVEMENTS,
        token_analysis,
    }))
}

async fn adaptive(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PromptingRequest>,
) -> ApiResult<AdaptiveResponse> {
    require_question_and_context(&req.question, &req.context)?;

    let user_level = req
        .user_level
        .unwrap_or_else(|| ExpertiseLevel::default().to_string());
    let question_type = req
        .question_type
        .unwrap_or_else(|| QuestionType::Factual.to_string());

    let mut rng = state.config.rng();
    let (technique, prompt) = match (
        user_level.parse::<ExpertiseLevel>(),
        question_type.parse::<QuestionType>(),
    ) {
        (Ok(level), Ok(qt)) => state
            .templates
            .adaptive(&req.question, &req.context, level, qt, &mut rng)
            .map_err(invalid)?,
        _ => {
            warn!(%user_level, %question_type, "unrecognized adaptive labels, using multi-shot");
            let technique = PromptTechnique::MultiShot;
            let prompt = state
                .templates
                .render(technique, &req.question, &req.context, &mut rng)
                .map_err(invalid)?;
            (technique, prompt)
        }
    };
    record_prompts(&state, 1);
    info!(strategy = %technique, %user_level, "generated adaptive prompt");

    let why = format!(
        "Selected {} because user is {} level asking a {} question",
        technique, user_level, question_type
    );
    Ok(Json(AdaptiveResponse {
        success: true,
        metadata: AdaptiveMetadata {
            strategy: technique.as_str(),
            user_level,
            question_type,
            question_length: req.question.chars().count(),
            context_length: req.context.chars().count(),
            prompt_length: prompt.chars().count(),
        },
        explanation: AdaptiveExplanation {
            why,
            strategy_details: technique.explanation(),
        },
        prompt,
    }))
}

// --- Handlers: dynamic prompts ---

async fn generate_dynamic(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DynamicPromptRequest>,
) -> ApiResult<DynamicPromptResponse> {
    require_question_and_context(&req.question, &req.context)?;

    let result = state.prompts.generate(&req);
    if let Ok(mut metrics) = state.metrics.write() {
        metrics.record_prompt(result.is_fallback());
    }
    info!(
        strategy = %result.metadata.strategy,
        question_type = %result.metadata.question_type,
        "generated dynamic prompt"
    );

    Ok(Json(DynamicPromptResponse {
        success: true,
        prompt: result.prompt,
        metadata: result.metadata,
    }))
}

async fn test_variations(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PromptingRequest>,
) -> ApiResult<VariationsResponse> {
    require_question_and_context(&req.question, &req.context)?;

    let mut variations = BTreeMap::new();
    for level in ExpertiseLevel::ALL {
        let mut request = DynamicPromptRequest::new(req.question.as_str(), req.context.as_str());
        request.user_profile.expertise_level = Some(level);
        let result = state.prompts.generate(&request);
        variations.insert(
            level.as_str(),
            Variation {
                prompt: result.prompt,
                strategy: result.metadata.strategy,
                adaptations: result.metadata.adaptations,
            },
        );
    }
    record_prompts(&state, variations.len());

    Ok(Json(VariationsResponse {
        context_length: req.context.chars().count(),
        question: req.question,
        variations,
    }))
}

async fn analyze_question(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnalyzeQuestionRequest>,
) -> ApiResult<AnalyzeQuestionResponse> {
    if req.question.trim().is_empty() {
        return Err(bad_request("Question is required"));
    }
    let analysis = state.prompts.classifier().classify(&req.question);
    Ok(Json(AnalyzeQuestionResponse {
        question: req.question,
        analysis,
    }))
}

const EXPERIENCED_USER_QUESTION: &str = "Could you walk through a complex question with detailed \
     analysis requirements, covering the trade-offs between the competing approaches?";

async fn demonstrate_adaptation(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PromptingRequest>,
) -> ApiResult<DemonstrationResponse> {
    require_question_and_context(&req.question, &req.context)?;

    let base = DynamicPromptRequest::new(req.question.as_str(), req.context.as_str());
    let mut beginner = base.clone();
    beginner.user_profile.expertise_level = Some(ExpertiseLevel::Beginner);
    let mut expert = base.clone();
    expert.user_profile.expertise_level = Some(ExpertiseLevel::Expert);
    let mut technical = base.clone();
    technical.document_metadata.domain = Some(Domain::Technical);
    let mut academic = base.clone();
    academic.document_metadata.domain = Some(Domain::Academic);
    let mut experienced = base;
    experienced.previous_interactions = vec![
        Interaction {
            question: Some(EXPERIENCED_USER_QUESTION.to_string()),
        };
        10
    ];

    let scenarios = [
        ("Beginner User", beginner),
        ("Expert User", expert),
        ("Technical Context", technical),
        ("Academic Context", academic),
        ("Experienced User", experienced),
    ];

    let demonstrations: BTreeMap<_, _> = scenarios
        .iter()
        .map(|(name, request)| {
            let result = state.prompts.generate(request);
            let demonstration = Demonstration {
                prompt: preview(&result.prompt, 500),
                strategy: result.metadata.strategy,
                expertise_level: result.metadata.expertise_level,
                adaptations: result.metadata.adaptations,
                prompt_length: result.metadata.prompt_length,
            };
            (*name, demonstration)
        })
        .collect();
    record_prompts(&state, demonstrations.len());

    Ok(Json(DemonstrationResponse {
        context_length: req.context.chars().count(),
        question: req.question,
        demonstrations,
    }))
}

// --- Handlers: service ---

async fn index() -> Json<Value> {
    Json(serde_json::json!({
        "name": "smart_docqa",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "similarity": ["/api/similarity/test", "/api/similarity/search", "/api/similarity/compare"],
            "prompting": [
                "/api/prompting/zero-shot",
                "/api/prompting/one-shot",
                "/api/prompting/multi-shot",
                "/api/prompting/chain-of-thought",
                "/api/prompting/compare",
                "/api/prompting/demonstrate",
                "/api/prompting/adaptive"
            ],
            "prompts": [
                "/api/prompts/generate",
                "/api/prompts/test-variations",
                "/api/prompts/analyze-question",
                "/api/prompts/demonstrate"
            ],
            "service": ["/health", "/metrics"]
        }
    }))
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        example_domains: state.templates.bank().domains().len(),
    })
}

async fn get_metrics(State(state): State<Arc<AppState>>) -> ApiResult<MetricsResponse> {
    let metrics = state.metrics.read().map_err(lock_poisoned)?;

    Ok(Json(MetricsResponse {
        total_rankings: metrics.total_rankings(),
        total_similarity_tests: metrics.total_similarity_tests(),
        total_prompts: metrics.total_prompts(),
        total_fallbacks: metrics.total_fallbacks(),
        avg_ranking_latency_us: metrics.avg_ranking_latency_us(),
        p50_ranking_latency_us: metrics.percentile_ranking_latency_us(50.0),
        p95_ranking_latency_us: metrics.percentile_ranking_latency_us(95.0),
        p99_ranking_latency_us: metrics.percentile_ranking_latency_us(99.0),
    }))
}
