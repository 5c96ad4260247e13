//! Gemini Backend
//!
//! Google Generative Language REST API. Structured output is requested with
//! `responseMimeType: application/json` plus `responseSchema`; the health
//! probe lists models. The key travels in a header, never in the URL.

use std::time::Instant;

use async_trait::async_trait;

use super::traits::{BackendError, LlmBackend, StructuredPrompt, StructuredReply};
use super::{ensure_success, http_client, probe};

const NAME: &str = "Gemini";
const API_KEY_HEADER: &str = "x-goog-api-key";
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Client for the Gemini API
#[derive(Clone)]
pub struct GeminiBackend {
    api_key: String,
    base_url: String,
    http_client: reqwest::Client,
}

impl GeminiBackend {
    /// Client using `api_key`, at `base_url` or the public endpoint
    pub fn new(api_key: impl Into<String>, base_url: Option<String>) -> Self {
        let base_url = base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        Self {
            api_key: api_key.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client: http_client(),
        }
    }

    fn models_url(&self) -> String {
        format!("{}/v1beta/models", self.base_url)
    }

    fn generate_url(&self, model: &str) -> String {
        format!("{}/{model}:generateContent", self.models_url())
    }

    fn body(prompt: &StructuredPrompt) -> serde_json::Value {
        serde_json::json!({
            "systemInstruction": { "parts": [{ "text": prompt.system }] },
            "contents": [{ "role": "user", "parts": [{ "text": prompt.prompt }] }],
            "generationConfig": {
                "temperature": prompt.temperature,
                "responseMimeType": "application/json",
                "responseSchema": prompt.schema,
            },
        })
    }

    fn generate_request(&self, prompt: &StructuredPrompt) -> reqwest::RequestBuilder {
        self.http_client
            .post(self.generate_url(&prompt.model))
            .header(API_KEY_HEADER, &self.api_key)
            .json(&Self::body(prompt))
    }

    /// Concatenated text parts of the first candidate
    fn answer(data: &serde_json::Value) -> Option<String> {
        let parts = data
            .pointer("/candidates/0/content/parts")?
            .as_array()?;
        let text: String = parts
            .iter()
            .filter_map(|p| p.get("text").and_then(serde_json::Value::as_str))
            .collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

#[async_trait]
impl LlmBackend for GeminiBackend {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn health_check(&self) -> bool {
        probe(
            self.http_client
                .get(self.models_url())
                .header(API_KEY_HEADER, &self.api_key),
        )
        .await
    }

    async fn complete(&self, prompt: &StructuredPrompt) -> Result<StructuredReply, BackendError> {
        let started = Instant::now();
        let response = self.generate_request(prompt).send().await?;
        let data: serde_json::Value = ensure_success(NAME, response).await?.json().await?;

        Ok(StructuredReply {
            json: Self::answer(&data).ok_or(BackendError::EmptyReply(NAME))?,
            tokens_used: data
                .pointer("/usageMetadata/totalTokenCount")
                .and_then(serde_json::Value::as_u64),
            elapsed: started.elapsed(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls() {
        let backend = GeminiBackend::new("k", Some("http://localhost:9999/".to_string()));
        assert_eq!(
            backend.generate_url("gemini-2.0-flash"),
            "http://localhost:9999/v1beta/models/gemini-2.0-flash:generateContent"
        );
        assert_eq!(backend.models_url(), "http://localhost:9999/v1beta/models");

        let backend = GeminiBackend::new("k", None);
        assert!(backend.base_url.starts_with("https://generativelanguage"));
    }

    #[test]
    fn test_body_asks_for_json() {
        let schema = serde_json::json!({"type": "OBJECT"});
        let prompt = StructuredPrompt::new("gemini-2.0-flash", "zookeeper", "describe", schema.clone());
        let body = GeminiBackend::body(&prompt);

        assert_eq!(body["contents"][0]["parts"][0]["text"], "describe");
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "zookeeper");
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(body["generationConfig"]["responseSchema"], schema);
    }

    #[test]
    fn test_api_key_sent_as_header() {
        let backend = GeminiBackend::new("SECRET-KEY-123", Some("http://127.0.0.1:1".to_string()));
        let prompt = StructuredPrompt::new("m", "s", "p", serde_json::json!({}));
        let request = backend.generate_request(&prompt).build().unwrap();

        assert_eq!(request.url().query(), None);
        assert!(!request.url().as_str().contains("SECRET"));
        assert_eq!(request.headers()[API_KEY_HEADER], "SECRET-KEY-123");
    }

    #[tokio::test]
    async fn test_transport_error_does_not_leak_key() {
        // Nothing listens on port 1
        let backend = GeminiBackend::new("SECRET-KEY-123", Some("http://127.0.0.1:1".to_string()));
        let prompt = StructuredPrompt::new("m", "s", "p", serde_json::json!({}));

        let err = backend.complete(&prompt).await.unwrap_err();
        assert!(matches!(err, BackendError::Http(_)));
        assert!(!err.to_string().contains("SECRET-KEY-123"));
    }

    #[test]
    fn test_answer_joins_parts() {
        let data = serde_json::json!({
            "candidates": [{
                "content": { "parts": [{ "text": "{\"a\":" }, { "text": "1}" }] }
            }]
        });
        assert_eq!(GeminiBackend::answer(&data).as_deref(), Some("{\"a\":1}"));

        let empty = serde_json::json!({ "candidates": [] });
        assert_eq!(GeminiBackend::answer(&empty), None);
    }
}
