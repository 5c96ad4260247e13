//! LLM Backend Traits
//!
//! The generation client only ever asks one kind of question: "answer this
//! prompt with JSON matching this schema". Backends translate that into
//! their provider's wire format.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// A prompt whose answer must be JSON matching `schema`
#[derive(Clone, Debug)]
pub struct StructuredPrompt {
    /// Backend-specific model identifier
    pub model: String,
    /// Standing instructions for the model
    pub system: String,
    /// The question itself
    pub prompt: String,
    /// JSON schema the answer must follow
    pub schema: serde_json::Value,
    /// Sampling temperature, kept within 0.0..=2.0
    pub temperature: f32,
}

impl StructuredPrompt {
    /// Create a prompt at the default temperature
    pub fn new(
        model: impl Into<String>,
        system: impl Into<String>,
        prompt: impl Into<String>,
        schema: serde_json::Value,
    ) -> Self {
        Self {
            model: model.into(),
            system: system.into(),
            prompt: prompt.into(),
            schema,
            temperature: 0.9,
        }
    }

    /// Override sampling temperature
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature.clamp(0.0, 2.0);
        self
    }
}

/// Raw JSON text returned by a backend
#[derive(Clone, Debug)]
pub struct StructuredReply {
    /// The answer, not yet parsed
    pub json: String,
    /// Tokens reported by the provider, if any
    pub tokens_used: Option<u64>,
    /// Wall time of the request
    pub elapsed: Duration,
}

/// Backend failure
#[derive(Debug, Error)]
pub enum BackendError {
    /// Connection, TLS or body decoding failure, URL stripped
    #[error("http request failed: {0}")]
    Http(reqwest::Error),

    /// Non-success status from the provider
    #[error("{backend} returned {status}: {body}")]
    Status {
        /// Backend name
        backend: &'static str,
        /// HTTP status code
        status: u16,
        /// Response body, possibly empty
        body: String,
    },

    /// Successful response without any answer text
    #[error("{0} reply contained no text")]
    EmptyReply(&'static str),
}

impl From<reqwest::Error> for BackendError {
    fn from(e: reqwest::Error) -> Self {
        // Request URLs may carry credentials
        Self::Http(e.without_url())
    }
}

/// A provider that can answer [`StructuredPrompt`]s
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Backend name for logs
    fn name(&self) -> &'static str;

    /// Whether the provider answers at all
    async fn health_check(&self) -> bool;

    /// Ask the prompt and wait for the full answer
    async fn complete(&self, prompt: &StructuredPrompt) -> Result<StructuredReply, BackendError>;
}

/// Which provider to talk to, and where
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BackendConfig {
    /// Local Ollama server
    Ollama {
        /// Host name or address
        host: String,
        /// Port
        port: u16,
    },
    /// Google Generative Language API
    Gemini {
        /// API key
        api_key: String,
        /// Endpoint override, mostly for tests and proxies
        base_url: Option<String>,
    },
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self::ollama("localhost", 11434)
    }
}

impl BackendConfig {
    /// Ollama at `host:port`
    pub fn ollama(host: impl Into<String>, port: u16) -> Self {
        Self::Ollama {
            host: host.into(),
            port,
        }
    }

    /// Gemini at the public endpoint
    pub fn gemini(api_key: impl Into<String>) -> Self {
        Self::Gemini {
            api_key: api_key.into(),
            base_url: None,
        }
    }

    /// Backend name for logs and the status line
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Ollama { .. } => "ollama",
            Self::Gemini { .. } => "gemini",
        }
    }
}
