//! LLM Backend Integration
//!
//! Ollama (default) and Gemini behind one [`LlmBackend`] trait. Both are
//! asked for structured JSON output; parsing and contract checks happen in
//! the generation client, not here.
//!
//! ```ignore
//! use exhibit_core::backend::{LlmBackend, OllamaBackend, StructuredPrompt};
//!
//! let backend = OllamaBackend::new("localhost", 11434);
//! let prompt = StructuredPrompt::new("llama3.2", system, question, schema);
//! let reply = backend.complete(&prompt).await?;
//! ```

mod gemini;
mod ollama;
mod traits;

use std::time::Duration;

pub use gemini::GeminiBackend;
pub use ollama::OllamaBackend;
pub use traits::{BackendConfig, BackendError, LlmBackend, StructuredPrompt, StructuredReply};

/// Timeout for health probes
const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

/// HTTP client shared by the backends
///
/// Only the connect phase is bounded here; the whole generation is bounded
/// by the orchestrator.
fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Falling back to default HTTP client");
            reqwest::Client::new()
        })
}

/// Turn a non-success response into [`BackendError::Status`]
async fn ensure_success(
    backend: &'static str,
    response: reqwest::Response,
) -> Result<reqwest::Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(BackendError::Status {
        backend,
        status: status.as_u16(),
        body,
    })
}

/// Probe `request`, treating any failure as unhealthy
async fn probe(request: reqwest::RequestBuilder) -> bool {
    request
        .timeout(HEALTH_TIMEOUT)
        .send()
        .await
        .is_ok_and(|r| r.status().is_success())
}
