//! Schema-constrained entity extraction

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::llm::{ChatProvider, Message};
use crate::domain::DomainError;

/// Structured description of a product feature, extracted by a chat oracle.
///
/// `location` is always a single normalized token, never a list, even when
/// the oracle mentions several jurisdictions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedEntities {
    pub location: String,
    pub age: Vec<String>,
    pub keywords: Vec<String>,
    pub related_regulations: Vec<String>,
}

impl ExtractedEntities {
    /// The all-empty record substituted when the oracle output cannot be
    /// parsed. Classification downstream must still be attemptable.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.location.is_empty()
            && self.age.is_empty()
            && self.keywords.is_empty()
            && self.related_regulations.is_empty()
    }

    /// Render for inclusion in a classification prompt.
    pub fn to_prompt_text(&self) -> String {
        format!(
            "location: {}\nage: {}\nkeywords: {}\nrelated_regulations: {}",
            if self.location.is_empty() { "None" } else { &self.location },
            join_or_none(&self.age),
            join_or_none(&self.keywords),
            join_or_none(&self.related_regulations),
        )
    }
}

fn join_or_none(values: &[String]) -> String {
    if values.is_empty() {
        "None".to_string()
    } else {
        values.join(", ")
    }
}

/// Strip markdown code fences from oracle output. Oracles routinely wrap
/// JSON in ```json blocks despite instructions not to.
pub fn strip_code_fences(text: &str) -> String {
    let text = text.trim();
    if !text.starts_with("```") {
        return text.to_string();
    }

    text.lines()
        .filter(|line| {
            let line = line.trim();
            !line.starts_with("```") && !line.ends_with("```")
        })
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Extracts structured entities from a feature description with one
/// schema-constrained chat completion.
#[derive(Debug, Clone)]
pub struct EntityExtractor {
    provider: Arc<dyn ChatProvider>,
}

impl EntityExtractor {
    pub fn new(provider: Arc<dyn ChatProvider>) -> Self {
        Self { provider }
    }

    /// Extract entities for a feature.
    ///
    /// An unreachable oracle is an error; unparseable oracle output is not:
    /// it degrades to the all-empty record so classification can proceed
    /// with empty context.
    pub async fn extract(
        &self,
        feature_name: &str,
        feature_description: &str,
    ) -> Result<ExtractedEntities, DomainError> {
        let messages = vec![
            Message::system("You are an expert compliance entity extractor."),
            Message::user(Self::prompt(feature_name, feature_description)),
        ];

        let raw = self.provider.complete(messages).await?;

        match Self::parse(&raw) {
            Some(entities) => Ok(entities),
            None => {
                warn!(
                    provider = self.provider.provider_name(),
                    "entity extraction output not parseable, using empty entities"
                );
                Ok(ExtractedEntities::empty())
            }
        }
    }

    fn prompt(feature_name: &str, feature_description: &str) -> String {
        format!(
            "Extract the following entities from this feature:\n\
             - location (jurisdiction, state, or region; a single token such as \"UT\" or \"EU\")\n\
             - age (any mentioned age group or restriction)\n\
             - keywords (important technical / policy terms)\n\
             - related_regulations (if any obvious law/regulation is mentioned)\n\n\
             Respond strictly in JSON format with exactly these keys:\n\
             \"location\" (single string), \"age\" (list of strings),\n\
             \"keywords\" (list of strings), \"related_regulations\" (list of strings).\n\n\
             Feature Name: {feature_name}\n\
             Feature Description: {feature_description}"
        )
    }

    /// Defensive parse of raw oracle text. Oracles return lists where the
    /// schema says scalar and vice versa; every field is coerced.
    fn parse(raw: &str) -> Option<ExtractedEntities> {
        let cleaned = strip_code_fences(raw);
        let value: serde_json::Value = serde_json::from_str(&cleaned).ok()?;
        let obj = value.as_object()?;

        Some(ExtractedEntities {
            location: coerce_single(obj.get("location")),
            age: coerce_list(obj.get("age")),
            keywords: coerce_list(obj.get("keywords")),
            related_regulations: coerce_list(obj.get("related_regulations")),
        })
    }
}

/// Coerce a JSON value to a single trimmed token. Lists and objects are
/// disambiguated by taking the first string found.
fn coerce_single(value: Option<&serde_json::Value>) -> String {
    match value {
        Some(serde_json::Value::String(s)) => s.trim().to_string(),
        Some(serde_json::Value::Array(items)) => items
            .iter()
            .find_map(|v| v.as_str())
            .map(|s| s.trim().to_string())
            .unwrap_or_default(),
        Some(serde_json::Value::Object(map)) => map
            .values()
            .find_map(|v| v.as_str())
            .map(|s| s.trim().to_string())
            .unwrap_or_default(),
        _ => String::new(),
    }
}

/// Coerce a JSON value to a list of strings.
fn coerce_list(value: Option<&serde_json::Value>) -> Vec<String> {
    match value {
        Some(serde_json::Value::Array(items)) => items
            .iter()
            .filter_map(|v| match v {
                serde_json::Value::String(s) => Some(s.trim().to_string()),
                serde_json::Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .filter(|s| !s.is_empty())
            .collect(),
        Some(serde_json::Value::String(s)) if !s.trim().is_empty() => {
            vec![s.trim().to_string()]
        }
        _ => Vec::new(),
    }
}
