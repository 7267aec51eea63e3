//! Category and abstraction classification through `generateContent`.

use crate::client::GeminiClient;
use crate::wire::{Content, GenerateRequest, GenerateResponse, GenerationConfig};
use async_trait::async_trait;
use log::debug;
use regex::Regex;
use serde_json::Value;
use std::fmt::Write;
use std::sync::LazyLock;
use trailmap_ontology::Ontology;
use trailmap_protocol::{
    AbstractionLevel, CapabilityError, Classification, TextClassifier,
};

static JSON_OBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("object pattern compiles"));

const DEFAULT_CONFIDENCE: f64 = 0.5;

const LEVEL_EXAMPLES: [(u8, &str); 5] = [
    (1, "introductory basics (e.g. HTML/CSS basics, getting started with Git)"),
    (2, "beginner (e.g. TypeScript basics, React basics)"),
    (3, "intermediate (e.g. React Hooks, practical Next.js)"),
    (4, "advanced (e.g. Server Components, advanced type systems)"),
    (5, "specialist (e.g. performance optimization, custom architecture)"),
];

/// Classifier prompting a Gemini text model with the ontology's categories.
#[derive(Clone)]
pub struct GeminiClassifier {
    client: GeminiClient,
    categories: Vec<(String, String)>,
    fallback_category: String,
}

impl GeminiClassifier {
    pub fn new(client: GeminiClient, ontology: &Ontology) -> Self {
        Self {
            client,
            categories: ontology
                .categories()
                .iter()
                .map(|info| (info.name.clone(), info.description.clone()))
                .collect(),
            fallback_category: ontology.fallback_category().to_string(),
        }
    }
}

#[async_trait]
impl TextClassifier for GeminiClassifier {
    fn is_available(&self) -> bool {
        self.client.has_api_key()
    }

    async fn classify(&self, title: &str, url: &str) -> Result<Classification, CapabilityError> {
        let config = self.client.config();
        let prompt = build_prompt(title, url, &self.categories);
        let request = GenerateRequest {
            contents: vec![Content::text(&prompt)],
            generation_config: GenerationConfig {
                temperature: config.temperature,
                max_output_tokens: config.max_output_tokens,
            },
        };
        let endpoint = self.client.endpoint(&config.classifier_model, "generateContent");
        let response: GenerateResponse = self.client.post(&endpoint, &request).await?;
        let text = response.first_text().ok_or_else(|| {
            CapabilityError::MalformedResponse("response carries no text".to_string())
        })?;
        debug!("classifier reply received (len={})", text.len());
        parse_classification(text, &self.fallback_category)
    }
}

/// Prompt listing the categories and the five abstraction levels.
pub fn build_prompt(title: &str, url: &str, categories: &[(String, String)]) -> String {
    let mut prompt = String::from(
        "Analyze the following learning record and decide its category and abstraction level.\n\n",
    );
    let _ = writeln!(prompt, "Title: {title}");
    let _ = writeln!(prompt, "URL: {url}");
    prompt.push_str("\nCandidate categories:\n");
    for (name, description) in categories {
        let _ = writeln!(prompt, "- {name}: {description}");
    }
    prompt.push_str("\nAbstraction levels:\n");
    for (level, example) in LEVEL_EXAMPLES {
        let _ = writeln!(prompt, "{level}: {example}");
    }
    prompt.push_str(
        "\nAnswer with JSON in this shape:\n\
         {\n  \"category\": \"category name\",\n  \"abstractionLevel\": number (1-5),\n  \
         \"confidence\": number (0.0-1.0),\n  \"reasoning\": \"short reason\"\n}",
    );
    prompt
}

/// Interpret a model reply.
///
/// The first `{` to the last `}` is parsed as JSON. A missing or zero
/// level becomes 3, a missing or zero confidence 0.5, a missing category
/// the fallback; numbers are clamped into range.
pub fn parse_classification(
    text: &str,
    fallback_category: &str,
) -> Result<Classification, CapabilityError> {
    let object = JSON_OBJECT.find(text).ok_or_else(|| {
        CapabilityError::MalformedResponse(format!("no JSON object in reply: {text}"))
    })?;
    let value: Value = serde_json::from_str(object.as_str())
        .map_err(|err| CapabilityError::MalformedResponse(err.to_string()))?;

    let category = value
        .get("category")
        .and_then(Value::as_str)
        .filter(|category| !category.is_empty())
        .unwrap_or(fallback_category)
        .to_string();
    let level = value
        .get("abstractionLevel")
        .and_then(Value::as_f64)
        .filter(|level| *level != 0.0)
        .map(|level| AbstractionLevel::clamped(level.round() as i64))
        .unwrap_or_default();
    let confidence = value
        .get("confidence")
        .and_then(Value::as_f64)
        .filter(|confidence| *confidence != 0.0)
        .unwrap_or(DEFAULT_CONFIDENCE)
        .clamp(0.0, 1.0);
    let reasoning = value
        .get("reasoning")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    Ok(Classification {
        category,
        abstraction_level: level,
        confidence,
        reasoning,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use trailmap_config::GeminiConfig;

    #[test]
    fn parses_fenced_reply() {
        let reply = "```json\n{\"category\": \"Backend\", \"abstractionLevel\": 4, \
                     \"confidence\": 0.9, \"reasoning\": \"server internals\"}\n```";
        let parsed = parse_classification(reply, "Other").expect("parse");
        assert_eq!(
            parsed,
            Classification {
                category: "Backend".to_string(),
                abstraction_level: AbstractionLevel::clamped(4),
                confidence: 0.9,
                reasoning: "server internals".to_string(),
            }
        );
    }

    #[test]
    fn fills_and_clamps_fields() {
        let parsed =
            parse_classification(r#"{"abstractionLevel": 9, "confidence": 3}"#, "Other")
                .expect("parse");
        assert_eq!(parsed.category, "Other");
        assert_eq!(parsed.abstraction_level, AbstractionLevel::MAX);
        assert_eq!(parsed.confidence, 1.0);
        assert_eq!(parsed.reasoning, "");

        let defaults = parse_classification(r#"{"abstractionLevel": 0}"#, "Other").expect("parse");
        assert_eq!(defaults.abstraction_level, AbstractionLevel::DEFAULT);
        assert_eq!(defaults.confidence, 0.5);
    }

    #[test]
    fn rejects_reply_without_json() {
        let err = parse_classification("I cannot help with that.", "Other").unwrap_err();
        assert!(matches!(err, CapabilityError::MalformedResponse(_)));
        let err = parse_classification("{not json}", "Other").unwrap_err();
        assert!(matches!(err, CapabilityError::MalformedResponse(_)));
    }

    #[test]
    fn prompt_lists_categories_and_levels() {
        let ontology = Ontology::builtin();
        let client = GeminiClient::new(GeminiConfig::default(), None).expect("client");
        let classifier = GeminiClassifier::new(client, &ontology);
        let prompt = build_prompt("React入門", "https://react.dev", &classifier.categories);
        assert!(prompt.contains("Title: React入門"));
        assert!(prompt.contains("- React/Next.js: React and the Next.js framework"));
        assert!(prompt.contains("- Other: Other technologies"));
        assert!(prompt.contains("5: specialist"));
        assert!(!classifier.is_available());
    }
}
