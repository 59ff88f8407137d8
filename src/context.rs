//! Context analysis: domain detection from vocabulary counts

use crate::classifier::{word_count, Level};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Subject area of a context or example set.
///
/// Caller-supplied names that are not one of the built-in domains are kept
/// verbatim in `Custom`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Domain {
    #[default]
    General,
    Technical,
    Academic,
    Custom(String),
}

impl Domain {
    pub fn as_str(&self) -> &str {
        match self {
            Domain::General => "general",
            Domain::Technical => "technical",
            Domain::Academic => "academic",
            Domain::Custom(name) => name,
        }
    }
}

impl From<&str> for Domain {
    fn from(name: &str) -> Self {
        match name {
            "general" => Domain::General,
            "technical" => Domain::Technical,
            "academic" => Domain::Academic,
            other => Domain::Custom(other.to_string()),
        }
    }
}

impl From<String> for Domain {
    fn from(name: String) -> Self {
        Domain::from(name.as_str())
    }
}

impl From<Domain> for String {
    fn from(domain: Domain) -> Self {
        domain.as_str().to_string()
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optional facts the caller already knows about a document. These always
/// win over what the analyzer infers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    #[serde(default)]
    pub domain: Option<Domain>,
    #[serde(default, rename = "type")]
    pub content_type: Option<String>,
}

/// Result of analyzing a context passage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextAnalysis {
    pub length: usize,
    pub word_count: usize,
    pub needs_special_handling: bool,
    pub domain: Domain,
    pub content_type: String,
    pub technical_level: Level,
}

/// Technical vocabulary count above which a context is treated as technical
const TECHNICAL_THRESHOLD: usize = 5;
/// Academic vocabulary count above which a context is treated as academic
const ACADEMIC_THRESHOLD: usize = 3;

struct Vocabulary {
    technical: Regex,
    academic: Regex,
}

fn vocabulary() -> &'static Vocabulary {
    static VOCABULARY: OnceLock<Vocabulary> = OnceLock::new();
    VOCABULARY.get_or_init(|| Vocabulary {
        technical: Regex::new(r"(?i)(algorithm|function|variable|parameter|method|class|object)")
            .expect("technical vocabulary must compile"),
        academic: Regex::new(r"(?i)(research|study|analysis|hypothesis|methodology|findings)")
            .expect("academic vocabulary must compile"),
    })
}

/// Infers domain and technical level of a context passage. Stateless.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContextAnalyzer;

impl ContextAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(&self, context: &str, metadata: &DocumentMetadata) -> ContextAnalysis {
        let mut analysis = ContextAnalysis {
            length: context.chars().count(),
            word_count: word_count(context),
            needs_special_handling: false,
            domain: Domain::General,
            content_type: "text".to_string(),
            technical_level: Level::Medium,
        };

        let vocab = vocabulary();

        if vocab.technical.find_iter(context).count() > TECHNICAL_THRESHOLD {
            analysis.technical_level = Level::High;
            analysis.domain = Domain::Technical;
            analysis.needs_special_handling = true;
        }

        // Runs after the technical check, so academic wins when both trip.
        if vocab.academic.find_iter(context).count() > ACADEMIC_THRESHOLD {
            analysis.domain = Domain::Academic;
            analysis.needs_special_handling = true;
        }

        if let Some(content_type) = &metadata.content_type {
            analysis.content_type = content_type.clone();
        }
        if let Some(domain) = &metadata.domain {
            analysis.domain = domain.clone();
        }

        analysis
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TECHNICAL: &str = "The algorithm uses a recursive function to traverse the binary tree. \
        Each node contains a parameter that determines the method execution. \
        A class wraps every object and each variable is typed.";

    const ACADEMIC: &str = "The research study employed a quantitative methodology to test the \
        hypothesis. The findings suggest significant correlations in the analysis.";

    #[test]
    fn test_vocabulary_compiles() {
        let vocab = vocabulary();
        assert_eq!(vocab.technical.find_iter("Method, CLASS and object").count(), 3);
        assert_eq!(vocab.academic.find_iter("research findings").count(), 2);
    }

    #[test]
    fn test_detects_technical_content() {
        let analysis = ContextAnalyzer::new().analyze(TECHNICAL, &DocumentMetadata::default());
        assert_eq!(analysis.domain, Domain::Technical);
        assert_eq!(analysis.technical_level, Level::High);
        assert!(analysis.needs_special_handling);
    }

    #[test]
    fn test_detects_academic_content() {
        let analysis = ContextAnalyzer::new().analyze(ACADEMIC, &DocumentMetadata::default());
        assert_eq!(analysis.domain, Domain::Academic);
        assert!(analysis.needs_special_handling);
        assert_eq!(analysis.technical_level, Level::Medium);
    }

    #[test]
    fn test_academic_wins_over_technical() {
        let both = format!("{} {}", TECHNICAL, ACADEMIC);
        let analysis = ContextAnalyzer::new().analyze(&both, &DocumentMetadata::default());
        assert_eq!(analysis.domain, Domain::Academic);
        assert_eq!(analysis.technical_level, Level::High);
    }

    #[test]
    fn test_plain_text_is_general() {
        let analysis = ContextAnalyzer::new()
            .analyze("Cats sleep a lot during the day.", &DocumentMetadata::default());
        assert_eq!(analysis.domain, Domain::General);
        assert!(!analysis.needs_special_handling);
        assert_eq!(analysis.content_type, "text");
        assert_eq!(analysis.word_count, 7);
    }

    #[test]
    fn test_threshold_is_strict() {
        // Exactly five technical terms is not enough
        let text = "algorithm function variable parameter method";
        let analysis = ContextAnalyzer::new().analyze(text, &DocumentMetadata::default());
        assert_eq!(analysis.domain, Domain::General);
    }

    #[test]
    fn test_metadata_overrides_inference() {
        let metadata = DocumentMetadata {
            domain: Some(Domain::from("legal")),
            content_type: Some("pdf".to_string()),
        };
        let analysis = ContextAnalyzer::new().analyze(TECHNICAL, &metadata);
        assert_eq!(analysis.domain, Domain::Custom("legal".to_string()));
        assert_eq!(analysis.content_type, "pdf");
        // The override only touches the domain
        assert!(analysis.needs_special_handling);
    }

    #[test]
    fn test_domain_serde() {
        let metadata: DocumentMetadata =
            serde_json::from_str(r#"{"domain": "technical", "type": "markdown"}"#).unwrap();
        assert_eq!(metadata.domain, Some(Domain::Technical));
        assert_eq!(serde_json::to_value(Domain::Academic).unwrap(), "academic");
    }
}
