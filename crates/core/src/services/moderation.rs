//! Content moderation gate.
//!
//! Every reel and comment passes through an external classifier before it
//! is written. The gate fails closed: when the classifier cannot be
//! reached or its response cannot be read, publication is refused rather
//! than letting unscreened content through.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use koinonia_common::{AppError, AppResult, config::ModerationConfig};

/// Verdict returned by a content classifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifierVerdict {
    /// Whether the content was flagged as unacceptable.
    pub flagged: bool,
    /// Classifier-provided reason, when flagged.
    pub reason: Option<String>,
}

impl ClassifierVerdict {
    /// Verdict for content that passed screening.
    #[must_use]
    pub const fn safe() -> Self {
        Self {
            flagged: false,
            reason: None,
        }
    }
}

/// Outcome of pushing content through the moderation gate.
///
/// Rejection is an expected result, not an error: callers report it to
/// the client as a normal response body.
#[derive(Debug)]
pub enum PublishOutcome<T> {
    /// Content passed screening and was stored.
    Published(T),
    /// Content was flagged; nothing was stored.
    Rejected {
        /// Classifier-provided reason, when given.
        reason: Option<String>,
    },
}

/// Trait for content classification.
///
/// This allows publication services to screen content without depending
/// on a concrete classifier backend.
#[async_trait]
pub trait ContentClassifier: Send + Sync {
    /// Classify a piece of text.
    ///
    /// Blank input is vacuously safe and must not reach the backing
    /// service.
    async fn classify(&self, content: &str) -> AppResult<ClassifierVerdict>;
}

/// Shared handle to the configured classifier.
pub type ModerationGate = Arc<dyn ContentClassifier>;

/// A classifier that accepts everything, for tests or when moderation is
/// disabled.
#[derive(Clone, Default)]
pub struct NoOpClassifier;

#[async_trait]
impl ContentClassifier for NoOpClassifier {
    async fn classify(&self, _content: &str) -> AppResult<ClassifierVerdict> {
        Ok(ClassifierVerdict::safe())
    }
}

#[derive(Serialize)]
struct ClassifyRequest<'a> {
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ClassifyResponse {
    flagged: bool,
    #[serde(default)]
    reason: Option<String>,
}

/// Classifier backed by an external HTTP moderation service.
#[derive(Clone)]
pub struct HttpClassifier {
    http_client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpClassifier {
    /// Create a new HTTP classifier from configuration.
    pub fn new(config: &ModerationConfig) -> AppResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl ContentClassifier for HttpClassifier {
    async fn classify(&self, content: &str) -> AppResult<ClassifierVerdict> {
        // Nothing to screen; skip the round trip.
        if content.trim().is_empty() {
            return Ok(ClassifierVerdict::safe());
        }

        let mut request = self
            .http_client
            .post(&self.endpoint)
            .json(&ClassifyRequest { content });

        if let Some(ref api_key) = self.api_key {
            request = request.header("Authorization", format!("Bearer {api_key}"));
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::ServiceUnavailable(format!("Moderation request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ServiceUnavailable(format!(
                "Moderation service error: {status} - {body}"
            )));
        }

        let verdict: ClassifyResponse = response
            .json()
            .await
            .map_err(|e| AppError::ModerationParse(e.to_string()))?;

        Ok(ClassifierVerdict {
            flagged: verdict.flagged,
            reason: verdict.reason,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_config() -> ModerationConfig {
        ModerationConfig {
            // Closed port: any attempted request fails immediately.
            endpoint: "http://127.0.0.1:9/classify".to_string(),
            api_key: None,
            timeout_seconds: 1,
        }
    }

    #[tokio::test]
    async fn test_blank_content_is_safe_without_calling_service() {
        let classifier = HttpClassifier::new(&test_config()).unwrap();

        for blank in ["", "   ", "\n\t  \n"] {
            let verdict = classifier.classify(blank).await.unwrap();
            assert!(!verdict.flagged);
            assert!(verdict.reason.is_none());
        }
    }

    #[tokio::test]
    async fn test_unreachable_service_is_unavailable() {
        let classifier = HttpClassifier::new(&test_config()).unwrap();

        let result = classifier.classify("Hello world").await;
        assert!(matches!(result, Err(AppError::ServiceUnavailable(_))));
    }

    #[tokio::test]
    async fn test_noop_classifier_accepts_everything() {
        let classifier = NoOpClassifier;

        let verdict = classifier.classify("anything at all").await.unwrap();
        assert!(!verdict.flagged);
    }

    #[test]
    fn test_classify_response_parses_flagged_with_reason() {
        let parsed: ClassifyResponse =
            serde_json::from_value(serde_json::json!({"flagged": true, "reason": "spam"}))
                .unwrap();

        assert!(parsed.flagged);
        assert_eq!(parsed.reason.as_deref(), Some("spam"));
    }

    #[test]
    fn test_classify_response_reason_is_optional() {
        let parsed: ClassifyResponse =
            serde_json::from_value(serde_json::json!({"flagged": false})).unwrap();

        assert!(!parsed.flagged);
        assert!(parsed.reason.is_none());
    }

    #[test]
    fn test_classify_response_without_flag_is_malformed() {
        let result = serde_json::from_value::<ClassifyResponse>(
            serde_json::json!({"verdict": "ok"}),
        );

        assert!(result.is_err());
    }
}
