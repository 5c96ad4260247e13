//! Generation Client
//!
//! Turns a [`UserInput`] into validated [`ExhibitData`] by asking an LLM
//! backend for a structured signboard and checking the reply against the
//! exhibit contract.
//!
//! Every failure collapses into [`GenerationError`]. Callers are not expected
//! to branch on the variant; it exists for logs.

use async_trait::async_trait;
use thiserror::Error;

use crate::backend::{BackendError, LlmBackend, StructuredPrompt};
use crate::model::{ContractViolation, ExhibitData, UserInput};

/// Failure of a generation request
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Backend unreachable or returned an error status
    #[error("backend request failed: {0}")]
    Transport(String),

    /// Reply could not be parsed
    #[error("malformed payload: {0}")]
    Malformed(String),

    /// Reply parsed but broke the exhibit contract
    #[error("payload violates exhibit contract: {0}")]
    Contract(ContractViolation),

    /// No reply within the configured bound
    #[error("generation timed out after {0:?}")]
    Timeout(std::time::Duration),
}

impl From<BackendError> for GenerationError {
    fn from(e: BackendError) -> Self {
        match e {
            BackendError::EmptyReply(_) => Self::Malformed(e.to_string()),
            other => Self::Transport(other.to_string()),
        }
    }
}

impl From<ContractViolation> for GenerationError {
    fn from(v: ContractViolation) -> Self {
        match v {
            ContractViolation::NotJson(msg) => Self::Malformed(msg),
            other => Self::Contract(other),
        }
    }
}

/// Produces exhibit data from user input
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Generate one signboard; suspends until the backend answers
    async fn generate(&self, input: UserInput) -> Result<ExhibitData, GenerationError>;

    /// Whether the underlying service looks reachable
    async fn health_check(&self) -> bool {
        true
    }
}

/// Generation client backed by any [`LlmBackend`]
pub struct LlmGenerationClient<B: LlmBackend> {
    backend: B,
    model: String,
    temperature: f32,
}

impl<B: LlmBackend> LlmGenerationClient<B> {
    /// Create a client for `model` on `backend`
    pub fn new(backend: B, model: impl Into<String>) -> Self {
        Self {
            backend,
            model: model.into(),
            temperature: 0.9,
        }
    }

    /// Override sampling temperature
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Backend in use
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Build the prompt sent for `input`
    #[must_use]
    pub fn build_prompt(&self, input: &UserInput) -> StructuredPrompt {
        StructuredPrompt::new(&self.model, SYSTEM_PROMPT, visitor_prompt(input), exhibit_schema())
            .with_temperature(self.temperature)
    }
}

#[async_trait]
impl<B: LlmBackend> GenerationClient for LlmGenerationClient<B> {
    async fn generate(&self, input: UserInput) -> Result<ExhibitData, GenerationError> {
        let prompt = self.build_prompt(&input);

        tracing::debug!(backend = self.backend.name(), model = %self.model, "Requesting exhibit");

        let reply = self.backend.complete(&prompt).await?;

        tracing::debug!(
            tokens = ?reply.tokens_used,
            elapsed_ms = reply.elapsed.as_millis(),
            "Exhibit payload received"
        );

        Ok(ExhibitData::from_json(&reply.json)?)
    }

    async fn health_check(&self) -> bool {
        self.backend.health_check().await
    }
}

const SYSTEM_PROMPT: &str = "あなたはユーモアあふれる動物園のベテラン飼育員です。\
来園者を一匹の動物として展示するための解説看板を作成します。\
愛情とちょっとした皮肉を込め、本人が笑えるトーンで書いてください。\
出力は指定されたJSONスキーマに厳密に従い、JSON以外の文字を含めないでください。";

fn visitor_prompt(input: &UserInput) -> String {
    format!(
        "以下の人物を動物園の展示動物として紹介する解説看板を作ってください。\n\
         \n\
         展示名: {name}\n\
         生態的特徴（特技・趣味・好きなもの）: {hobby}\n\
         最近観測された行動（悩み・近況）: {worry}\n\
         \n\
         - classification: 架空の分類（例: 霊長目ヒト科ネボスケ属）\n\
         - dangerLevel: 危険度を短く（例: ★★☆☆☆）\n\
         - scientificName: それらしいラテン語風の学名\n\
         - description: 飼育員による解説。2〜3段落、改行を含めてよい\n\
         - stats: stamina / intelligence / laziness / charm を0〜100の整数で\n\
         - funFact: ひとことの豆知識",
        name = input.name,
        hobby = input.hobby,
        worry = input.worry,
    )
}

/// JSON schema describing [`ExhibitData`] on the wire
#[must_use]
pub fn exhibit_schema() -> serde_json::Value {
    let stat = serde_json::json!({ "type": "integer", "minimum": 0, "maximum": 100 });
    serde_json::json!({
        "type": "object",
        "properties": {
            "classification": { "type": "string" },
            "dangerLevel": { "type": "string" },
            "scientificName": { "type": "string" },
            "description": { "type": "string" },
            "stats": {
                "type": "object",
                "properties": {
                    "stamina": stat,
                    "intelligence": stat,
                    "laziness": stat,
                    "charm": stat,
                },
                "required": ["stamina", "intelligence", "laziness", "charm"],
            },
            "funFact": { "type": "string" },
        },
        "required": [
            "classification",
            "dangerLevel",
            "scientificName",
            "description",
            "stats",
            "funFact",
        ],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::StructuredReply;
    use std::sync::Mutex;
    use std::time::Duration;

    struct CannedBackend {
        reply: Result<String, String>,
        seen: Mutex<Vec<StructuredPrompt>>,
    }

    impl CannedBackend {
        fn ok(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn err(msg: &str) -> Self {
            Self {
                reply: Err(msg.to_string()),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LlmBackend for CannedBackend {
        fn name(&self) -> &'static str {
            "Canned"
        }

        async fn health_check(&self) -> bool {
            self.reply.is_ok()
        }

        async fn complete(
            &self,
            prompt: &StructuredPrompt,
        ) -> Result<StructuredReply, BackendError> {
            self.seen.lock().unwrap().push(prompt.clone());
            match &self.reply {
                Ok(json) => Ok(StructuredReply {
                    json: json.clone(),
                    tokens_used: None,
                    elapsed: Duration::ZERO,
                }),
                Err(body) => Err(BackendError::Status {
                    backend: "Canned",
                    status: 503,
                    body: body.clone(),
                }),
            }
        }
    }

    const GOOD: &str = r#"{
        "classification": "霊長目ヒト科",
        "dangerLevel": "★☆☆☆☆",
        "scientificName": "Homo gamerus",
        "description": "夜行性。",
        "stats": {"stamina": 20, "intelligence": 70, "laziness": 95, "charm": 60},
        "funFact": "コントローラーを握ると落ち着く。"
    }"#;

    fn input() -> UserInput {
        UserInput::new("タロウ", "ゲーム", "寝不足")
    }

    #[tokio::test]
    async fn test_generate_success() {
        let client = LlmGenerationClient::new(CannedBackend::ok(GOOD), "test-model");
        let data = client.generate(input()).await.unwrap();
        assert_eq!(data.scientific_name, "Homo gamerus");
        assert_eq!(data.stats.laziness, 95);

        let seen = client.backend().seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].prompt.contains("タロウ"));
        assert!(seen[0].prompt.contains("寝不足"));
        assert_eq!(seen[0].model, "test-model");
        assert_eq!(seen[0].schema, exhibit_schema());
    }

    #[tokio::test]
    async fn test_generate_transport_error() {
        let client = LlmGenerationClient::new(CannedBackend::err("connection refused"), "m");
        let err = client.generate(input()).await.unwrap_err();
        assert!(matches!(err, GenerationError::Transport(_)));
        assert!(!client.health_check().await);
    }

    #[tokio::test]
    async fn test_generate_malformed_and_contract_errors() {
        let client = LlmGenerationClient::new(CannedBackend::ok("ごめんなさい"), "m");
        assert!(matches!(
            client.generate(input()).await.unwrap_err(),
            GenerationError::Malformed(_)
        ));

        let bad = GOOD.replace("\"stamina\": 20", "\"stamina\": 150");
        let client = LlmGenerationClient::new(CannedBackend::ok(&bad), "m");
        assert!(matches!(
            client.generate(input()).await.unwrap_err(),
            GenerationError::Contract(ContractViolation::StatOutOfRange { .. })
        ));
    }

    #[test]
    fn test_empty_reply_counts_as_malformed() {
        let err = GenerationError::from(BackendError::EmptyReply("Canned"));
        assert!(matches!(err, GenerationError::Malformed(_)));
    }

    #[test]
    fn test_schema_requires_everything() {
        let schema = exhibit_schema();
        let required = schema["required"].as_array().unwrap();
        assert_eq!(required.len(), 6);
        assert_eq!(
            schema["properties"]["stats"]["properties"]["charm"]["maximum"],
            serde_json::json!(100)
        );
    }
}
