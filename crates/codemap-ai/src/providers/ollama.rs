//! Ollama local adapter (`/api/chat`, `/api/embeddings`)

use std::time::Instant;

use codemap_core::{CancelFlag, CodemapError, Result};
use serde::{Deserialize, Serialize};

use crate::client::{Completion, CompletionRequest, Embedding, LlmClient, Message, Usage};
use crate::config::LlmConfig;
use crate::retry::{error_for_status, error_for_transport, with_retries, RetryPolicy};

const DEFAULT_BASE_URL: &str = "http://localhost:11434";

pub struct OllamaClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    embedding_model: String,
    policy: RetryPolicy,
}

impl OllamaClient {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| CodemapError::Config(format!("http client: {e}")))?;
        Ok(OllamaClient {
            http,
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
            .json(body)
            .send()
            .await
            .map_err(|e| error_for_transport(e, "ollama"))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(error_for_status(status, &text, "ollama"));
        }
        response
            .json::<R>()
            .await
            .map_err(|e| CodemapError::LlmTransport(format!("ollama: bad response body: {e}")))
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<ChatOptions>,
}

#[derive(Serialize)]
struct ChatOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: WireMessage,
    #[serde(default)]
    done_reason: Option<String>,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}

#[derive(Deserialize)]
struct WireMessage {
    #[serde(default)]
    content: String,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

#[derive(Deserialize)]
struct TagsResponse {
    models: Vec<TagEntry>,
}

#[derive(Deserialize)]
struct TagEntry {
    name: String,
}

#[async_trait::async_trait]
impl LlmClient for OllamaClient {
    async fn complete(&self, request: CompletionRequest) -> Result<Completion> {
        let model = request.model.clone().unwrap_or_else(|| self.model.clone());
        let started = Instant::now();
        let cancel = CancelFlag::new();

        let options = if request.temperature.is_some() || request.max_tokens.is_some() {
            Some(ChatOptions {
                temperature: request.temperature,
                num_predict: request.max_tokens,
            })
        } else {
            None
        };

        let response: ChatResponse = with_retries(&self.policy, &cancel, "complete", || {
            let body = ChatRequest {
                model: &model,
                messages: &request.messages,
                stream: false,
                options: options.as_ref().map(|o| ChatOptions {
                    temperature: o.temperature,
                    num_predict: o.num_predict,
                }),
            };
            async move { self.post_json("/api/chat", &body).await }
        })
        .await?;

        let usage = match (response.prompt_eval_count, response.eval_count) {
            (None, None) => None,
            (p, c) => {
                let prompt = p.unwrap_or(0);
                let completion = c.unwrap_or(0);
                Some(Usage {
                    prompt_tokens: prompt,
                    completion_tokens: completion,
                    total_tokens: prompt + completion,
                })
            }
        };
        Ok(Completion {
            content: response.message.content,
            model,
            finish_reason: response.done_reason,
            duration: started.elapsed(),
            usage,
        })
    }

    async fn embed(&self, text: &str, model: Option<&str>) -> Result<Embedding> {
        let model = model.unwrap_or(&self.embedding_model).to_string();
        let started = Instant::now();
        let cancel = CancelFlag::new();

        let response: EmbeddingResponse = with_retries(&self.policy, &cancel, "embed", || {
            let body = EmbeddingRequest {
                model: &model,
                prompt: text,
            };
            async move { self.post_json("/api/embeddings", &body).await }
        })
        .await?;

        if response.embedding.is_empty() {
            return Err(CodemapError::LlmTransport(
                "ollama: empty embedding (is the model pulled?)".to_string(),
            ));
        }
        Ok(Embedding {
            vector: response.embedding,
            model,
            duration: started.elapsed(),
            usage: None,
        })
    }

    async fn models(&self) -> Result<Vec<String>> {
        let url = format!("{}/api/tags", self.base_url);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| error_for_transport(e, "ollama"))?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(error_for_status(status, &text, "ollama"));
        }
        let parsed: TagsResponse = response
            .json()
            .await
            .map_err(|e| CodemapError::LlmTransport(format!("ollama: bad response body: {e}")))?;
        Ok(parsed.models.into_iter().map(|m| m.name).collect())
    }

    async fn ping(&self) -> Result<()> {
        self.models().await.map(|_| ())
    }

    fn name(&self) -> &str {
        "ollama"
    }
}
