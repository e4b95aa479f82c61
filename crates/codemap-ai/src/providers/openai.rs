//! OpenAI-compatible HTTP adapter (chat completions + embeddings)

use std::time::Instant;

use codemap_core::{CancelFlag, CodemapError, Result};
use serde::{Deserialize, Serialize};

use crate::client::{
    Completion, CompletionRequest, Embedding, LlmClient, Message, Usage,
};
use crate::config::LlmConfig;
use crate::retry::{error_for_status, error_for_transport, with_retries, RetryPolicy};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    embedding_model: String,
    policy: RetryPolicy,
}

impl OpenAiClient {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| CodemapError::Config(format!("http client: {e}")))?;
        Ok(OpenAiClient {
            http,
            api_key: config.api_key.clone().unwrap_or_default(),
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: config.model.clone(),
            embedding_model: config.embedding_model.clone(),
            policy: RetryPolicy {
                max_retries: config.max_retries,
                deadline: config.timeout,
                ..Default::default()
            },
        })
    }

    async fn post_json<B: Serialize, R: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R> {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| error_for_transport(e, "openai"))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(error_for_status(status, &text, "openai"));
        }
        response
            .json::<R>()
            .await
            .map_err(|e| CodemapError::LlmTransport(format!("openai: bad response body: {e}")))
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    stop: Vec<String>,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    model: Option<String>,
    usage: Option<WireUsage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: WireMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct WireMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct WireUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
    #[serde(default)]
    total_tokens: u32,
}

impl From<WireUsage> for Usage {
    fn from(u: WireUsage) -> Self {
        Usage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        }
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
    model: Option<String>,
    usage: Option<WireUsage>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Deserialize)]
struct ModelsResponse {
    data: Vec<ModelEntry>,
}

#[derive(Deserialize)]
struct ModelEntry {
    id: String,
}

#[async_trait::async_trait]
impl LlmClient for OpenAiClient {
    async fn complete(&self, request: CompletionRequest) -> Result<Completion> {
        let model = request.model.clone().unwrap_or_else(|| self.model.clone());
        let started = Instant::now();
        let cancel = CancelFlag::new();

        let response: ChatResponse = with_retries(&self.policy, &cancel, "complete", || {
            let body = ChatRequest {
                model: &model,
                messages: &request.messages,
                temperature: request.temperature,
                max_tokens: request.max_tokens,
                stop: request.stop.clone(),
            };
            async move { self.post_json("/chat/completions", &body).await }
        })
        .await?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| CodemapError::LlmTransport("openai: empty choices".to_string()))?;
        Ok(Completion {
            content: choice.message.content.unwrap_or_default(),
            model: response.model.unwrap_or(model),
            finish_reason: choice.finish_reason,
            duration: started.elapsed(),
            usage: response.usage.map(Into::into),
        })
    }

    async fn embed(&self, text: &str, model: Option<&str>) -> Result<Embedding> {
        let model = model.unwrap_or(&self.embedding_model).to_string();
        let started = Instant::now();
        let cancel = CancelFlag::new();

        let response: EmbeddingResponse = with_retries(&self.policy, &cancel, "embed", || {
            let body = EmbeddingRequest {
                model: &model,
                input: text,
            };
            async move { self.post_json("/embeddings", &body).await }
        })
        .await?;

        let data = response
            .data
            .into_iter()
            .next()
            .ok_or_else(|| CodemapError::LlmTransport("openai: empty embedding".to_string()))?;
        Ok(Embedding {
            vector: data.embedding,
            model: response.model.unwrap_or(model),
            duration: started.elapsed(),
            usage: response.usage.map(Into::into),
        })
    }

    async fn models(&self) -> Result<Vec<String>> {
        let url = format!("{}/models", self.base_url);
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| error_for_transport(e, "openai"))?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(error_for_status(status, &text, "openai"));
        }
        let parsed: ModelsResponse = response
            .json()
            .await
            .map_err(|e| CodemapError::LlmTransport(format!("openai: bad response body: {e}")))?;
        Ok(parsed.data.into_iter().map(|m| m.id).collect())
    }

    async fn ping(&self) -> Result<()> {
        self.models().await.map(|_| ())
    }

    fn name(&self) -> &str {
        "openai"
    }
}
