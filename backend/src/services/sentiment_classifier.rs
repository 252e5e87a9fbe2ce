use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::{ClassifierKind, SentimentConfig};
use crate::models::SentimentClass;

/// Longest input forwarded to the model endpoint
pub const MODEL_MAX_INPUT_CHARS: usize = 512;

const DEFAULT_NEGATIVE_KEYWORDS: &[&str] = &[
    "drop", "falls", "disappoint", "decline", "regulatory", "controversy", "loss", "plunge",
    "cut", "down", "lower", "weak", "bearish", "crash", "sell", "negative",
];

const DEFAULT_POSITIVE_KEYWORDS: &[&str] = &[
    "surge", "beats", "growth", "rise", "positive", "profit", "record", "strong", "up",
    "higher", "bullish", "rally", "gain", "buy",
];

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("classifier request failed: {0}")]
    Request(String),
    #[error("classifier returned status {0}")]
    Status(u16),
    #[error("unexpected classifier response: {0}")]
    Response(String),
    #[error("unknown sentiment label '{0}'")]
    UnknownLabel(String),
}

/// Maps free text to a sentiment class.
#[async_trait]
pub trait TextSentimentClassifier: Send + Sync {
    async fn classify(&self, text: &str) -> Result<SentimentClass, ClassifierError>;
}

// ==============================================================================
// Keyword classifier
// ==============================================================================

/// Substring matching against two keyword lists.
///
/// Negative keywords are checked first: text containing both a negative and a
/// positive keyword is negative.
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    negative: Vec<String>,
    positive: Vec<String>,
}

impl KeywordClassifier {
    pub fn new(negative: Vec<String>, positive: Vec<String>) -> Self {
        let mut neg: Vec<String> = Vec::new();
        for word in negative {
            let word = word.trim().to_lowercase();
            if !word.is_empty() && !neg.contains(&word) {
                neg.push(word);
            }
        }

        // a word on both lists can never match as positive
        let mut pos: Vec<String> = Vec::new();
        for word in positive {
            let word = word.trim().to_lowercase();
            if !word.is_empty() && !neg.contains(&word) && !pos.contains(&word) {
                pos.push(word);
            }
        }

        Self { negative: neg, positive: pos }
    }

    pub fn classify_text(&self, text: &str) -> SentimentClass {
        let text = text.to_lowercase();

        if self.negative.iter().any(|w| text.contains(w.as_str())) {
            SentimentClass::Negative
        } else if self.positive.iter().any(|w| text.contains(w.as_str())) {
            SentimentClass::Positive
        } else {
            SentimentClass::Neutral
        }
    }

    pub fn negative_keywords(&self) -> &[String] {
        &self.negative
    }

    pub fn positive_keywords(&self) -> &[String] {
        &self.positive
    }
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::new(
            DEFAULT_NEGATIVE_KEYWORDS.iter().map(|w| w.to_string()).collect(),
            DEFAULT_POSITIVE_KEYWORDS.iter().map(|w| w.to_string()).collect(),
        )
    }
}

#[async_trait]
impl TextSentimentClassifier for KeywordClassifier {
    async fn classify(&self, text: &str) -> Result<SentimentClass, ClassifierError> {
        Ok(self.classify_text(text))
    }
}

// ==============================================================================
// Model classifier
// ==============================================================================

#[derive(Debug, Serialize)]
struct ModelRequest<'a> {
    inputs: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
struct LabelScore {
    label: String,
    score: f64,
}

// Inference endpoints answer either [[{..}, ..]] or [{..}, ..].
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ModelResponse {
    Nested(Vec<Vec<LabelScore>>),
    Flat(Vec<LabelScore>),
}

/// Delegates to a hosted text-classification model (Hugging Face inference
/// format). The model only knows positive and negative.
pub struct ModelClassifier {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

impl ModelClassifier {
    pub fn new(url: String, api_key: Option<String>, timeout: Duration) -> Result<Self, ClassifierError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClassifierError::Request(e.to_string()))?;

        Ok(Self { client, url, api_key })
    }
}

fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn top_label(body: ModelResponse) -> Result<SentimentClass, ClassifierError> {
    let scores = match body {
        ModelResponse::Nested(mut outer) => {
            if outer.is_empty() {
                Vec::new()
            } else {
                outer.swap_remove(0)
            }
        }
        ModelResponse::Flat(scores) => scores,
    };

    let best = scores
        .into_iter()
        .max_by(|a, b| a.score.total_cmp(&b.score))
        .ok_or_else(|| ClassifierError::Response("no labels".to_string()))?;

    best.label
        .to_lowercase()
        .parse::<SentimentClass>()
        .map_err(|_| ClassifierError::UnknownLabel(best.label))
}

#[async_trait]
impl TextSentimentClassifier for ModelClassifier {
    async fn classify(&self, text: &str) -> Result<SentimentClass, ClassifierError> {
        let inputs = truncate_chars(text, MODEL_MAX_INPUT_CHARS);

        let mut request = self.client.post(&self.url).json(&ModelRequest { inputs });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let resp = request
            .send()
            .await
            .map_err(|e| ClassifierError::Request(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(ClassifierError::Status(resp.status().as_u16()));
        }

        let body: ModelResponse = resp
            .json()
            .await
            .map_err(|e| ClassifierError::Response(e.to_string()))?;

        let class = top_label(body)?;
        debug!("Model classified {} chars as {}", inputs.len(), class);
        Ok(class)
    }
}

/// Build the classifier selected by configuration.
pub fn build_classifier(
    config: &SentimentConfig,
    timeout: Duration,
) -> Result<Arc<dyn TextSentimentClassifier>, ClassifierError> {
    match config.classifier {
        ClassifierKind::Keyword => {
            let defaults = KeywordClassifier::default();
            let negative = config
                .negative_keywords
                .clone()
                .unwrap_or_else(|| defaults.negative_keywords().to_vec());
            let positive = config
                .positive_keywords
                .clone()
                .unwrap_or_else(|| defaults.positive_keywords().to_vec());

            let classifier = KeywordClassifier::new(negative, positive);
            info!(
                "Using keyword sentiment classifier ({} negative, {} positive keywords)",
                classifier.negative_keywords().len(),
                classifier.positive_keywords().len()
            );
            Ok(Arc::new(classifier))
        }
        ClassifierKind::Model => {
            info!("Using model sentiment classifier at {}", config.model_url);
            Ok(Arc::new(ModelClassifier::new(
                config.model_url.clone(),
                config.model_api_key.clone(),
                timeout,
            )?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_checked_before_positive() {
        let classifier = KeywordClassifier::default();
        assert_eq!(
            classifier.classify_text("Shares surge despite regulatory review"),
            SentimentClass::Negative
        );
    }

    #[test]
    fn test_keyword_matching_is_case_insensitive() {
        let classifier = KeywordClassifier::default();
        assert_eq!(classifier.classify_text("Record QUARTER for Apple"), SentimentClass::Positive);
        assert_eq!(classifier.classify_text("Stock PLUNGES after earnings"), SentimentClass::Negative);
        assert_eq!(classifier.classify_text("Annual meeting scheduled"), SentimentClass::Neutral);
    }

    #[test]
    fn test_overlapping_keywords_stay_negative() {
        let classifier = KeywordClassifier::new(
            vec!["miss".into(), "Miss".into()],
            vec!["beat".into(), "miss".into(), "beat".into()],
        );
        assert_eq!(classifier.negative_keywords(), &["miss".to_string()]);
        assert_eq!(classifier.positive_keywords(), &["beat".to_string()]);
    }

    #[test]
    fn test_default_lists_have_no_overlap() {
        let classifier = KeywordClassifier::default();
        assert!(classifier
            .positive_keywords()
            .iter()
            .all(|w| !classifier.negative_keywords().contains(w)));
        assert_eq!(
            classifier.classify_text("analysts turn positive"),
            SentimentClass::Positive
        );
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let text = "é".repeat(600);
        let truncated = truncate_chars(&text, MODEL_MAX_INPUT_CHARS);
        assert_eq!(truncated.chars().count(), MODEL_MAX_INPUT_CHARS);
        assert_eq!(truncate_chars("short", 512), "short");
    }

    #[test]
    fn test_model_response_top_label() {
        let nested: ModelResponse = serde_json::from_str(
            r#"[[{"label": "NEGATIVE", "score": 0.91}, {"label": "POSITIVE", "score": 0.09}]]"#,
        )
        .unwrap();
        assert_eq!(top_label(nested).unwrap(), SentimentClass::Negative);

        let flat: ModelResponse =
            serde_json::from_str(r#"[{"label": "POSITIVE", "score": 0.7}]"#).unwrap();
        assert_eq!(top_label(flat).unwrap(), SentimentClass::Positive);
    }

    #[test]
    fn test_model_response_errors() {
        let empty: ModelResponse = serde_json::from_str("[]").unwrap();
        assert!(top_label(empty).is_err());

        let odd: ModelResponse =
            serde_json::from_str(r#"[{"label": "LABEL_1", "score": 0.7}]"#).unwrap();
        assert!(matches!(top_label(odd), Err(ClassifierError::UnknownLabel(_))));
    }

    #[tokio::test]
    async fn test_keyword_classifier_through_trait() {
        let classifier: Arc<dyn TextSentimentClassifier> = Arc::new(KeywordClassifier::default());
        assert_eq!(
            classifier.classify("Tesla shares crash").await.unwrap(),
            SentimentClass::Negative
        );
    }
}
