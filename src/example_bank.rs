//! Worked Q/A examples used when assembling prompts

use crate::classifier::QuestionType;
use crate::context::Domain;
use crate::strategy::ExpertiseLevel;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A worked example: context, question and the expected answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Example {
    pub context: String,
    pub question: String,
    pub answer: String,
}

impl Example {
    pub fn new(
        context: impl Into<String>,
        question: impl Into<String>,
        answer: impl Into<String>,
    ) -> Self {
        Self {
            context: context.into(),
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// An example annotated with the reasoning that leads to the answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReasoningExample {
    pub context: String,
    pub question: String,
    pub reasoning: String,
    pub answer: String,
}

/// Domain-keyed example store. Unknown domains fall back to `general`.
#[derive(Debug, Clone)]
pub struct ExampleBank {
    examples: HashMap<Domain, Vec<Example>>,
    chain_of_thought: Vec<Example>,
    reasoning: Vec<ReasoningExample>,
}

impl Default for ExampleBank {
    fn default() -> Self {
        Self::new()
    }
}

impl ExampleBank {
    /// Create a bank seeded with the built-in examples.
    pub fn new() -> Self {
        let mut examples = HashMap::new();
        examples.insert(
            Domain::General,
            vec![
                Example::new(
                    "Photosynthesis is the process by which plants use sunlight, water, and carbon dioxide to produce glucose and oxygen.",
                    "What is photosynthesis?",
                    "Photosynthesis is the process where plants convert sunlight, water, and carbon dioxide into glucose (food) and oxygen.",
                ),
                Example::new(
                    "The water cycle includes evaporation, condensation, precipitation, and collection. Water evaporates from oceans and lakes, forms clouds, falls as rain, and returns to water bodies.",
                    "How does the water cycle work?",
                    "The water cycle works through four main stages: evaporation (water rises as vapor), condensation (vapor forms clouds), precipitation (rain/snow falls), and collection (water returns to bodies of water).",
                ),
                Example::new(
                    "Gravity is a fundamental force that attracts objects with mass toward each other. On Earth, gravity pulls objects toward the center of the planet.",
                    "What is gravity?",
                    "Gravity is a fundamental force that attracts objects with mass toward each other, which is why objects fall toward Earth's center.",
                ),
            ],
        );
        examples.insert(
            Domain::Technical,
            vec![
                Example::new(
                    "Machine learning algorithms learn patterns from data without being explicitly programmed. They improve performance through experience and can make predictions on new data.",
                    "How do machine learning algorithms work?",
                    "Machine learning algorithms work by learning patterns from training data, then use these patterns to make predictions or decisions on new, unseen data without being explicitly programmed for each specific task.",
                ),
                Example::new(
                    "APIs (Application Programming Interfaces) allow different software applications to communicate with each other. They define the methods and data formats for requesting and exchanging information.",
                    "What is an API?",
                    "An API (Application Programming Interface) is a set of protocols and tools that allows different software applications to communicate and share data with each other in a standardized way.",
                ),
            ],
        );
        examples.insert(
            Domain::Academic,
            vec![Example::new(
                "The scientific method involves observation, hypothesis formation, experimentation, data analysis, and conclusion drawing. It's a systematic approach to understanding natural phenomena.",
                "What are the steps of the scientific method?",
                "The scientific method includes: 1) Observation of phenomena, 2) Forming a hypothesis, 3) Designing and conducting experiments, 4) Analyzing data, and 5) Drawing conclusions that support or refute the hypothesis.",
            )],
        );

        let chain_of_thought = vec![
            Example::new(
                "A company's revenue increased from $100,000 to $150,000 over one year.",
                "What was the percentage increase in revenue?",
                "Let me solve this step by step:\n1. Find the increase: $150,000 - $100,000 = $50,000\n2. Calculate percentage: ($50,000 ÷ $100,000) × 100 = 50%\n3. Therefore, the revenue increased by 50%.",
            ),
            Example::new(
                "A recipe calls for 2 cups of flour to make 12 cookies. You want to make 18 cookies.",
                "How much flour do you need?",
                "Let me work through this:\n1. Find the ratio: 2 cups flour for 12 cookies\n2. Calculate per cookie: 2 ÷ 12 = 0.167 cups per cookie\n3. For 18 cookies: 0.167 × 18 = 3 cups\n4. Therefore, I need 3 cups of flour.",
            ),
        ];

        let reasoning = vec![ReasoningExample {
            context: "Solar panels convert sunlight into electricity using photovoltaic cells. They work best in direct sunlight and their efficiency decreases on cloudy days.".to_string(),
            question: "Why might solar panels produce less electricity in winter?".to_string(),
            reasoning: "I need to consider factors that affect solar panel efficiency in winter: shorter daylight hours, lower sun angle, potential cloud cover, and possible snow coverage blocking panels.".to_string(),
            answer: "Solar panels produce less electricity in winter because of shorter daylight hours, lower sun angles that reduce direct sunlight exposure, increased cloud cover, and potential snow coverage that blocks the panels.".to_string(),
        }];

        Self {
            examples,
            chain_of_thought,
            reasoning,
        }
    }

    /// Examples for `domain`, or the general set if the domain has none.
    pub fn examples_for(&self, domain: &Domain) -> &[Example] {
        match self.examples.get(domain) {
            Some(examples) if !examples.is_empty() => examples,
            _ => self
                .examples
                .get(&Domain::General)
                .map(Vec::as_slice)
                .unwrap_or(&[]),
        }
    }

    /// One example from the domain, chosen uniformly at random.
    pub fn example<R: Rng + ?Sized>(&self, domain: &Domain, rng: &mut R) -> Option<&Example> {
        self.examples_for(domain).choose(rng)
    }

    /// Up to `count` distinct examples from the domain in shuffled order.
    pub fn sample<R: Rng + ?Sized>(
        &self,
        domain: &Domain,
        count: usize,
        rng: &mut R,
    ) -> Vec<&Example> {
        let mut picked: Vec<&Example> = self.examples_for(domain).iter().collect();
        picked.shuffle(rng);
        picked.truncate(count);
        picked
    }

    pub fn chain_of_thought_examples(&self) -> &[Example] {
        &self.chain_of_thought
    }

    pub fn reasoning_examples(&self) -> &[ReasoningExample] {
        &self.reasoning
    }

    /// Register an extra example, creating the domain if needed.
    pub fn add_example(&mut self, domain: Domain, example: Example) {
        self.examples.entry(domain).or_default().push(example);
    }

    /// Domains that currently hold at least one example, sorted by name.
    pub fn domains(&self) -> Vec<&Domain> {
        let mut domains: Vec<&Domain> = self
            .examples
            .iter()
            .filter(|(_, examples)| !examples.is_empty())
            .map(|(domain, _)| domain)
            .collect();
        domains.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        domains
    }
}

/// Short Q/A snippets the adaptive prompt builder inlines, keyed by question
/// type and expertise level. Combinations without an entry get no examples.
pub fn adaptive_examples(
    question_type: QuestionType,
    level: ExpertiseLevel,
) -> &'static [&'static str] {
    use ExpertiseLevel::*;
    use QuestionType::*;

    match (question_type, level) {
        (Factual, Beginner) => &["Q: What is photosynthesis?\nA: Photosynthesis is how plants make food using sunlight."],
        (Factual, Intermediate) => &["Q: How does machine learning work?\nA: Machine learning uses algorithms to find patterns in data."],
        (Factual, Expert) => &["Q: What are quantum entanglement implications?\nA: Quantum entanglement demonstrates non-local correlations between particles."],
        (Analytical, Beginner) => &["Q: Why do leaves change color?\nA: Step by step:\n1. Chlorophyll breaks down\n2. Other pigments become visible\n3. Creates fall colors."],
        (Analytical, Intermediate) => &["Q: What factors contribute to inflation?\nA: Several factors:\n1. Supply/demand imbalances\n2. Monetary policy\n3. External shocks\n4. Consumer expectations"],
        _ => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_unknown_domain_falls_back_to_general() {
        let bank = ExampleBank::new();
        let general = bank.examples_for(&Domain::General);
        let unknown = bank.examples_for(&Domain::from("astrology"));
        assert_eq!(general, unknown);
        assert_eq!(general.len(), 3);
    }

    #[test]
    fn test_example_comes_from_domain() {
        let bank = ExampleBank::new();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..10 {
            let example = bank.example(&Domain::Technical, &mut rng).unwrap();
            assert!(bank.examples_for(&Domain::Technical).contains(example));
        }
    }

    #[test]
    fn test_sample_is_capped_and_distinct() {
        let bank = ExampleBank::new();
        let mut rng = StdRng::seed_from_u64(42);

        let picked = bank.sample(&Domain::General, 10, &mut rng);
        assert_eq!(picked.len(), 3);
        for (i, a) in picked.iter().enumerate() {
            for b in &picked[i + 1..] {
                assert_ne!(a.question, b.question);
            }
        }

        assert_eq!(bank.sample(&Domain::Academic, 2, &mut rng).len(), 1);
        assert!(bank.sample(&Domain::General, 0, &mut rng).is_empty());
    }

    #[test]
    fn test_sample_is_reproducible_with_seed() {
        let bank = ExampleBank::new();
        let a = bank.sample(&Domain::General, 2, &mut StdRng::seed_from_u64(3));
        let b = bank.sample(&Domain::General, 2, &mut StdRng::seed_from_u64(3));
        assert_eq!(a, b);
    }

    #[test]
    fn test_add_example_creates_domain() {
        let mut bank = ExampleBank::new();
        let legal = Domain::from("legal");
        bank.add_example(
            legal.clone(),
            Example::new("A contract needs consideration.", "What makes a contract valid?", "Offer, acceptance and consideration."),
        );
        assert_eq!(bank.examples_for(&legal).len(), 1);
        assert_eq!(bank.domains().len(), 4);
    }

    #[test]
    fn test_adaptive_examples_table() {
        assert_eq!(adaptive_examples(QuestionType::Factual, ExpertiseLevel::Beginner).len(), 1);
        assert!(adaptive_examples(QuestionType::Analytical, ExpertiseLevel::Expert).is_empty());
        assert!(adaptive_examples(QuestionType::Comparative, ExpertiseLevel::Beginner).is_empty());
    }

    #[test]
    fn test_fixed_example_sets() {
        let bank = ExampleBank::new();
        assert_eq!(bank.chain_of_thought_examples().len(), 2);
        assert_eq!(bank.reasoning_examples().len(), 1);
    }
}
