//! CLI interface for the DocQA similarity and prompting engines

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use rand::rngs::StdRng;
use rand::SeedableRng;
use smart_docqa::config::ServerConfig;
use smart_docqa::context::DocumentMetadata;
use smart_docqa::ranker::{find_most_similar, RankItem};
use smart_docqa::strategy::PromptTechnique;
use smart_docqa::templates::DEFAULT_NUM_EXAMPLES;
use smart_docqa::{
    ContextAnalyzer, Domain, DynamicPromptRequest, DynamicPromptService, ExpertiseLevel,
    PromptTemplates, QuestionClassifier, SimilarityMethod, Vector,
};
use std::str::FromStr;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "docqa")]
#[command(about = "Similarity ranking and adaptive prompt construction for document Q&A", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(ValueEnum, Clone, Copy)]
enum Technique {
    ZeroShot,
    OneShot,
    MultiShot,
    ChainOfThought,
    FewShotReasoning,
}

impl From<Technique> for PromptTechnique {
    fn from(t: Technique) -> Self {
        match t {
            Technique::ZeroShot => PromptTechnique::ZeroShot,
            Technique::OneShot => PromptTechnique::OneShot,
            Technique::MultiShot => PromptTechnique::MultiShot,
            Technique::ChainOfThought => PromptTechnique::ChainOfThought,
            Technique::FewShotReasoning => PromptTechnique::FewShotReasoning,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Compare two vectors with every similarity function
    Similarity {
        /// First vector as comma-separated values (e.g., "1.0,2.0,3.0")
        a: String,
        /// Second vector as comma-separated values
        b: String,
        /// Method to highlight: dot_product, cosine or euclidean
        #[arg(short, long, default_value = "dot_product")]
        method: SimilarityMethod,
    },
    /// Rank candidate vectors against a query
    Rank {
        /// Query vector as comma-separated values
        query: String,
        /// Candidate vectors, each as comma-separated values
        #[arg(required = true)]
        candidates: Vec<String>,
        #[arg(short, long, default_value = "dot_product")]
        method: SimilarityMethod,
        /// Number of results to return
        #[arg(short, long, default_value = "5")]
        k: usize,
    },
    /// Classify a question's type and complexity
    Classify { question: String },
    /// Analyze a context passage
    AnalyzeContext {
        context: String,
        /// Domain supplied by document metadata
        #[arg(long)]
        domain: Option<Domain>,
        /// Content type supplied by document metadata
        #[arg(long)]
        content_type: Option<String>,
    },
    /// Render a template prompt
    Prompt {
        #[arg(value_enum)]
        technique: Technique,
        question: String,
        context: String,
        #[arg(long, default_value = "general")]
        domain: Domain,
        /// Examples to include in multi-shot prompts
        #[arg(long, default_value_t = DEFAULT_NUM_EXAMPLES)]
        num_examples: usize,
        /// Seed for example selection
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Build an adaptive prompt
    Dynamic {
        question: String,
        context: String,
        /// beginner, intermediate or expert
        #[arg(long)]
        expertise: Option<ExpertiseLevel>,
        #[arg(long)]
        domain: Option<Domain>,
        /// Print prompt and metadata as JSON
        #[arg(long)]
        json: bool,
    },
    /// Start the HTTP API server
    Serve(ServerConfig),
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Similarity { a, b, method } => {
            let a = Vector::from_str(&a)?;
            let b = Vector::from_str(&b)?;
            println!("{}: {:.6}", method, method.compute(&a, &b)?);
            println!("  formula: {}", method.formula());
            println!("  {}", method.interpretation());
            println!("All methods:");
            for m in SimilarityMethod::ALL {
                println!("  {:<12} {:.6}", m.as_str(), m.compute(&a, &b)?);
            }
        }
        Commands::Rank {
            query,
            candidates,
            method,
            k,
        } => {
            let query = Vector::from_str(&query)?;
            let items = candidates
                .iter()
                .map(|c| -> Result<RankItem<String>> {
                    Ok(RankItem::new(Vector::from_str(c)?, c.clone()))
                })
                .collect::<Result<Vec<_>>>()?;

            let results = find_most_similar(&query, &items, method, k);
            println!("Top {} results ({}):", results.len(), method);
            for (i, result) in results.iter().enumerate() {
                match &result.error {
                    Some(e) => println!("{}. [{}] error: {}", i + 1, result.metadata, e),
                    None => println!(
                        "{}. [{}] (similarity: {:.4})",
                        i + 1,
                        result.metadata,
                        result.similarity
                    ),
                }
            }
        }
        Commands::Classify { question } => {
            let analysis = QuestionClassifier::new().classify(&question);
            println!("{}", serde_json::to_string_pretty(&analysis)?);
        }
        Commands::AnalyzeContext {
            context,
            domain,
            content_type,
        } => {
            let metadata = DocumentMetadata {
                domain,
                content_type,
            };
            let analysis = ContextAnalyzer::new().analyze(&context, &metadata);
            println!("{}", serde_json::to_string_pretty(&analysis)?);
        }
        Commands::Prompt {
            technique,
            question,
            context,
            domain,
            num_examples,
            seed,
        } => {
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            let templates = PromptTemplates::default();
            let prompt = match PromptTechnique::from(technique) {
                PromptTechnique::OneShot => {
                    templates.one_shot(&question, &context, &domain, &mut rng)?
                }
                PromptTechnique::MultiShot => {
                    templates.multi_shot(&question, &context, &domain, num_examples, &mut rng)
                }
                other => templates.render(other, &question, &context, &mut rng)?,
            };
            println!("{}", prompt);
        }
        Commands::Dynamic {
            question,
            context,
            expertise,
            domain,
            json,
        } => {
            let mut request = DynamicPromptRequest::new(question, context);
            request.user_profile.expertise_level = expertise;
            request.document_metadata.domain = domain;

            let result = DynamicPromptService::new().generate(&request);
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("{}", result.prompt);
                eprintln!(
                    "strategy: {} | type: {} | expertise: {} | adaptations: {}",
                    result.metadata.strategy,
                    result.metadata.question_type,
                    result.metadata.expertise_level,
                    result.metadata.adaptations.join(", ")
                );
            }
        }
        Commands::Serve(_) => {
            unreachable!("Serve handled separately");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Serve needs the async runtime
    match cli.command {
        Commands::Serve(config) => smart_docqa::server::start(config).await,
        command => run(command),
    }
}
