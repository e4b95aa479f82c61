//! The narrow contract the core consumes LLM services through

use std::time::Duration;

use codemap_core::Result;
use serde::{Deserialize, Serialize};

/// Chat message role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One message in an ordered conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Message {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Message {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Parameters for a completion call. Unset fields fall back to
/// provider defaults.
#[derive(Debug, Clone, Default)]
pub struct CompletionRequest {
    pub messages: Vec<Message>,
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub stop: Vec<String>,
}

impl CompletionRequest {
    pub fn new(messages: Vec<Message>) -> Self {
        CompletionRequest {
            messages,
            ..Default::default()
        }
    }
}

/// Token accounting as reported by the provider.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// A finished completion.
#[derive(Debug, Clone)]
pub struct Completion {
    pub content: String,
    pub model: String,
    pub finish_reason: Option<String>,
    pub duration: Duration,
    pub usage: Option<Usage>,
}

/// An embedding vector for one input text.
#[derive(Debug, Clone)]
pub struct Embedding {
    pub vector: Vec<f32>,
    pub model: String,
    pub duration: Duration,
    pub usage: Option<Usage>,
}

/// Provider-agnostic LLM surface. Every adapter funnels transport
/// failures through the shared error taxonomy so retry decisions stay
/// in one place.
#[async_trait::async_trait]
pub trait LlmClient: Send + Sync {
    /// Run a chat completion.
    async fn complete(&self, request: CompletionRequest) -> Result<Completion>;

    /// Embed one text.
    async fn embed(&self, text: &str, model: Option<&str>) -> Result<Embedding>;

    /// Models the provider reports as available.
    async fn models(&self) -> Result<Vec<String>>;

    /// Reachability and credential probe.
    async fn ping(&self) -> Result<()>;

    /// Human-readable provider name.
    fn name(&self) -> &str;
}
