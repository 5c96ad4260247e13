//! Ollama Backend
//!
//! - `POST /api/generate` with `stream: false`, the schema passed as `format`
//! - `GET /api/tags` as the health probe

use std::time::Instant;

use async_trait::async_trait;

use super::traits::{BackendError, LlmBackend, StructuredPrompt, StructuredReply};
use super::{ensure_success, http_client, probe};

const NAME: &str = "Ollama";

/// Client for a local Ollama server
#[derive(Clone)]
pub struct OllamaBackend {
    base_url: String,
    http_client: reqwest::Client,
}

impl OllamaBackend {
    /// Client for the server at `host:port`
    pub fn new(host: impl AsRef<str>, port: u16) -> Self {
        Self {
            base_url: format!("http://{}:{port}", host.as_ref()),
            http_client: http_client(),
        }
    }

    /// Server root, e.g. `http://localhost:11434`
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn body(prompt: &StructuredPrompt) -> serde_json::Value {
        serde_json::json!({
            "model": prompt.model,
            "system": prompt.system,
            "prompt": prompt.prompt,
            "format": prompt.schema,
            "stream": false,
            "options": { "temperature": prompt.temperature },
        })
    }

    fn answer(data: &serde_json::Value) -> Option<String> {
        data.get("response")
            .and_then(serde_json::Value::as_str)
            .filter(|text| !text.trim().is_empty())
            .map(str::to_string)
    }
}

#[async_trait]
impl LlmBackend for OllamaBackend {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn health_check(&self) -> bool {
        probe(self.http_client.get(format!("{}/api/tags", self.base_url))).await
    }

    async fn complete(&self, prompt: &StructuredPrompt) -> Result<StructuredReply, BackendError> {
        let started = Instant::now();
        let response = self
            .http_client
            .post(format!("{}/api/generate", self.base_url))
            .json(&Self::body(prompt))
            .send()
            .await?;
        let data: serde_json::Value = ensure_success(NAME, response).await?.json().await?;

        Ok(StructuredReply {
            json: Self::answer(&data).ok_or(BackendError::EmptyReply(NAME))?,
            tokens_used: data.get("eval_count").and_then(serde_json::Value::as_u64),
            elapsed: started.elapsed(),
        })
    }
}
