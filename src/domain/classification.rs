//! Dual-oracle compliance classification

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::extraction::{strip_code_fences, ExtractedEntities};
use crate::domain::llm::{ChatProvider, Message};
use crate::domain::DomainError;

/// Canonical three-valued classification label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Label {
    /// Clear legal/regulatory obligation drives the feature
    Yes,
    /// Business decision with no stated regulatory driver
    No,
    /// Intent unclear, flagged for human review
    Maybe,
}

impl Label {
    /// Normalize raw oracle output: trimmed, case-insensitive.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "yes" => Some(Self::Yes),
            "no" => Some(Self::No),
            "maybe" => Some(Self::Maybe),
            _ => None,
        }
    }

    pub const ALL: [Label; 3] = [Label::Yes, Label::No, Label::Maybe];
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Yes => write!(f, "Yes"),
            Label::No => write!(f, "No"),
            Label::Maybe => write!(f, "Maybe"),
        }
    }
}

/// A normalized classification from one oracle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub classification: Label,
    pub reasoning: String,
    pub related_regulation: String,
}

impl ClassificationResult {
    /// Fallback record substituted for malformed oracle output. Never a
    /// fatal error.
    pub fn fallback(provider: &str) -> Self {
        Self {
            classification: Label::Maybe,
            reasoning: format!("{} output not valid", provider),
            related_regulation: String::new(),
        }
    }
}

/// Tagged outcome of parsing raw oracle text. Raw text is never trusted
/// past this boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassificationOutcome {
    /// Parsed and all fields valid
    Valid(ClassificationResult),
    /// Parsed as JSON but violating the contract (bad label, wrong shape)
    Invalid { reason: String },
    /// Not parseable as JSON at all
    Unparseable,
}

/// Parse raw oracle output into a tagged outcome.
pub fn parse_classification(raw: &str) -> ClassificationOutcome {
    let cleaned = strip_code_fences(raw);

    let value: serde_json::Value = match serde_json::from_str(&cleaned) {
        Ok(v) => v,
        Err(_) => return ClassificationOutcome::Unparseable,
    };

    let Some(obj) = value.as_object() else {
        return ClassificationOutcome::Invalid {
            reason: "response is not a JSON object".to_string(),
        };
    };

    let Some(raw_label) = obj.get("classification").and_then(|v| v.as_str()) else {
        return ClassificationOutcome::Invalid {
            reason: "missing or non-string classification".to_string(),
        };
    };

    let Some(classification) = Label::parse(raw_label) else {
        return ClassificationOutcome::Invalid {
            reason: format!("unknown classification label: {}", raw_label),
        };
    };

    let reasoning = obj
        .get("reasoning")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .trim()
        .to_string();

    let related_regulation = obj
        .get("related_regulation")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .trim()
        .to_string();

    ClassificationOutcome::Valid(ClassificationResult {
        classification,
        reasoning,
        related_regulation,
    })
}

/// Terminology dictionary for internal feature jargon, injected into the
/// classification prompt so oracles can resolve abbreviations.
pub const DEFAULT_TERMINOLOGY: &str = "\
Terminology Dictionary:
- NR = Not recommended
- PF = Personalized feed
- GH = Geo-handler; a module responsible for routing features based on user region
- CDS = Compliance Detection System
- DRT = Data retention threshold; duration for which logs can be stored
- LCP = Local compliance policy
- Redline = Flag for legal review
- Softblock = A user-level limitation applied silently without notifications
- Spanner = A synthetic name for a rule engine
- ShadowMode = Deploy feature in non-user-impact way to collect analytics only
- T5 = Tier 5 sensitivity data; more critical than T1-T4 in this internal taxonomy
- ASL = Age-sensitive logic
- Glow = A compliance-flagging status used to indicate geo-based alerts
- NSP = Non-shareable policy (content should not be shared externally)
- Jellybean = Feature name for internal parental control system
- EchoTrace = Log tracing mode to verify compliance routing
- BB = Baseline Behavior; standard user behavior used for anomaly detection
- Snowcap = A synthetic codename for the child safety policy framework
- FR = Feature rollout status
- IMT = Internal monitoring trigger";

/// The fixed classification rubric. One parameterized prompt serves both
/// oracles; the terminology dictionary is configurable data, not a second
/// code path.
#[derive(Debug, Clone)]
pub struct ClassificationRubric {
    terminology: Option<String>,
}

impl ClassificationRubric {
    pub fn new() -> Self {
        Self {
            terminology: Some(DEFAULT_TERMINOLOGY.to_string()),
        }
    }

    pub fn without_terminology() -> Self {
        Self { terminology: None }
    }

    pub fn with_terminology(mut self, terminology: impl Into<String>) -> Self {
        self.terminology = Some(terminology.into());
        self
    }

    /// Build the prompt messages for one classification call.
    pub fn messages(&self, entities: &ExtractedEntities, regulation_context: &str) -> Vec<Message> {
        let terminology = self
            .terminology
            .as_deref()
            .map(|t| format!("\nHere is a terminology dictionary:\n{}\n", t))
            .unwrap_or_default();

        let user = format!(
            "Entities extracted:\n{}\n\n\
             Relevant regulation text:\n{}\n{}\n\
             Based on this information:\n\
             1. Reference the terminology dictionary for technical terminologies and abbreviations.\n\
             2. Answer \"Yes\" if the feature is required by law/regulation in specific regions, \
             \"No\" if it is only a business decision, or \"Maybe\" if the intention behind the \
             feature is not stated clearly and needs human review.\n\
             3. Provide a short reasoning (1-2 sentences) on whether this feature is required to \
             comply with legal regulations of specific regions.\n\
             4. If any related regulation/article is relevant, mention it concisely, otherwise use \"None\".\n\n\
             Respond strictly in JSON with exactly these keys:\n\
             \"classification\": \"Yes\" | \"No\" | \"Maybe\",\n\
             \"reasoning\": \"1-2 sentence reasoning\",\n\
             \"related_regulation\": \"main law or article name\"\n\n\
             Rules:\n\
             - Do not create lists or nested objects. Combine all reasoning into one string.\n\
             - Do not infer regulatory requirements if none are explicitly mentioned in the \
             feature description or extracted entities.",
            entities.to_prompt_text(),
            if regulation_context.is_empty() {
                "None"
            } else {
                regulation_context
            },
            terminology,
        );

        vec![Message::system("You are a compliance classifier."), Message::user(user)]
    }
}

impl Default for ClassificationRubric {
    fn default() -> Self {
        Self::new()
    }
}

/// The two oracles' classifications for one feature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DualClassification {
    pub primary: ClassificationResult,
    pub secondary: ClassificationResult,
}

/// Runs the same classification task through a primary and a secondary
/// oracle and normalizes both outputs.
#[derive(Debug, Clone)]
pub struct DualClassifier {
    primary: Arc<dyn ChatProvider>,
    secondary: Arc<dyn ChatProvider>,
    rubric: ClassificationRubric,
}

impl DualClassifier {
    pub fn new(
        primary: Arc<dyn ChatProvider>,
        secondary: Arc<dyn ChatProvider>,
        rubric: ClassificationRubric,
    ) -> Self {
        Self {
            primary,
            secondary,
            rubric,
        }
    }

    /// Classify with both oracles. Both run concurrently on the same
    /// `(entities, regulation_context)` pair.
    pub async fn classify(
        &self,
        entities: &ExtractedEntities,
        regulation_context: &str,
    ) -> Result<DualClassification, DomainError> {
        let messages = self.rubric.messages(entities, regulation_context);

        let (primary, secondary) = tokio::join!(
            Self::classify_one(&self.primary, messages.clone()),
            Self::classify_one(&self.secondary, messages),
        );

        Ok(DualClassification {
            primary: primary?,
            secondary: secondary?,
        })
    }

    /// One oracle call plus normalization. Malformed output collapses to the
    /// fallback record; only an unreachable oracle is an error.
    async fn classify_one(
        provider: &Arc<dyn ChatProvider>,
        messages: Vec<Message>,
    ) -> Result<ClassificationResult, DomainError> {
        let raw = provider.complete(messages).await?;

        match parse_classification(&raw) {
            ClassificationOutcome::Valid(result) => Ok(result),
            ClassificationOutcome::Invalid { reason } => {
                warn!(
                    provider = provider.provider_name(),
                    reason, "classification output invalid, using fallback"
                );
                Ok(ClassificationResult::fallback(provider.provider_name()))
            }
            ClassificationOutcome::Unparseable => {
                warn!(
                    provider = provider.provider_name(),
                    "classification output unparseable, using fallback"
                );
                Ok(ClassificationResult::fallback(provider.provider_name()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::llm::mock::MockChatProvider;

    #[test]
    fn test_label_parse_normalizes() {
        assert_eq!(Label::parse(" yes "), Some(Label::Yes));
        assert_eq!(Label::parse("NO"), Some(Label::No));
        assert_eq!(Label::parse("Maybe"), Some(Label::Maybe));
        assert_eq!(Label::parse("unsure"), None);
        assert_eq!(Label::parse(""), None);
    }

    #[test]
    fn test_parse_classification_valid() {
        let raw = r#"{"classification": "Yes", "reasoning": "Required by the DSA.", "related_regulation": "EU DSA Article 28"}"#;

        let outcome = parse_classification(raw);
        let ClassificationOutcome::Valid(result) = outcome else {
            panic!("expected valid outcome, got {:?}", outcome);
        };
        assert_eq!(result.classification, Label::Yes);
        assert_eq!(result.related_regulation, "EU DSA Article 28");
    }

    #[test]
    fn test_parse_classification_case_and_fences() {
        let raw = "```json\n{\"classification\": \"MAYBE\", \"reasoning\": \"\", \"related_regulation\": \"\"}\n```";

        let outcome = parse_classification(raw);
        assert!(matches!(
            outcome,
            ClassificationOutcome::Valid(ClassificationResult {
                classification: Label::Maybe,
                ..
            })
        ));
    }

    #[test]
    fn test_parse_classification_invalid_label() {
        let raw = r#"{"classification": "Probably", "reasoning": "", "related_regulation": ""}"#;
        assert!(matches!(
            parse_classification(raw),
            ClassificationOutcome::Invalid { .. }
        ));
    }

    #[test]
    fn test_parse_classification_non_json() {
        assert_eq!(
            parse_classification("I think this is fine."),
            ClassificationOutcome::Unparseable
        );
    }

    #[test]
    fn test_parse_classification_non_object() {
        assert!(matches!(
            parse_classification(r#"["Yes"]"#),
            ClassificationOutcome::Invalid { .. }
        ));
    }

    #[test]
    fn test_fallback_record() {
        let fallback = ClassificationResult::fallback("gemini");
        assert_eq!(fallback.classification, Label::Maybe);
        assert_eq!(fallback.reasoning, "gemini output not valid");
        assert_eq!(fallback.related_regulation, "");
    }

    #[test]
    fn test_rubric_includes_terminology_and_context() {
        let rubric = ClassificationRubric::new();
        let entities = ExtractedEntities {
            location: "UT".to_string(),
            ..Default::default()
        };

        let messages = rubric.messages(&entities, "Some regulation text.");
        assert_eq!(messages.len(), 2);
        assert!(messages[1].content.contains("Terminology Dictionary"));
        assert!(messages[1].content.contains("Some regulation text."));
        assert!(messages[1].content.contains("location: UT"));
    }

    #[test]
    fn test_rubric_empty_context_says_none() {
        let rubric = ClassificationRubric::without_terminology();
        let messages = rubric.messages(&ExtractedEntities::empty(), "");
        assert!(messages[1].content.contains("Relevant regulation text:\nNone"));
        assert!(!messages[1].content.contains("Terminology Dictionary"));
    }

    #[tokio::test]
    async fn test_dual_classifier_agreement() {
        let primary = Arc::new(MockChatProvider::new("ollama").with_response(
            r#"{"classification": "Yes", "reasoning": "r", "related_regulation": "DSA"}"#,
        ));
        let secondary = Arc::new(MockChatProvider::new("gemini").with_response(
            r#"{"classification": "yes", "reasoning": "r2", "related_regulation": "DSA"}"#,
        ));
        let classifier = DualClassifier::new(primary, secondary, ClassificationRubric::new());

        let result = classifier
            .classify(&ExtractedEntities::empty(), "context")
            .await
            .unwrap();

        assert_eq!(result.primary.classification, Label::Yes);
        assert_eq!(result.secondary.classification, Label::Yes);
    }

    #[tokio::test]
    async fn test_dual_classifier_malformed_secondary_falls_back() {
        let primary = Arc::new(MockChatProvider::new("ollama").with_response(
            r#"{"classification": "No", "reasoning": "r", "related_regulation": "None"}"#,
        ));
        let secondary =
            Arc::new(MockChatProvider::new("gemini").with_response("not json at all"));
        let classifier = DualClassifier::new(primary, secondary, ClassificationRubric::new());

        let result = classifier
            .classify(&ExtractedEntities::empty(), "")
            .await
            .unwrap();

        assert_eq!(result.primary.classification, Label::No);
        assert_eq!(result.secondary.classification, Label::Maybe);
        assert_eq!(result.secondary.reasoning, "gemini output not valid");
    }

    #[tokio::test]
    async fn test_dual_classifier_unreachable_oracle_is_error() {
        let primary = Arc::new(MockChatProvider::new("ollama").with_error("timeout"));
        let secondary = Arc::new(MockChatProvider::new("gemini").with_response(
            r#"{"classification": "Yes", "reasoning": "", "related_regulation": ""}"#,
        ));
        let classifier = DualClassifier::new(primary, secondary, ClassificationRubric::new());

        let result = classifier.classify(&ExtractedEntities::empty(), "").await;
        assert!(result.is_err());
    }
}
