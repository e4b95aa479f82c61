//! Codemap AI — the LLM client contract, provider adapters and prompts

pub mod cache;
pub mod client;
pub mod config;
pub mod prompt;
pub mod providers;
pub mod retry;


pub use cache::{CachedResponse, ResponseCache};
pub use client::{Completion, CompletionRequest, Embedding, LlmClient, Message, Role, Usage};
pub use config::LlmConfig;
pub use prompt::{
    call_graph_explain_prompt, explain_symbol_prompt, summarize_module_prompt, SymbolSource,
};
pub use providers::{create_client, OllamaClient, OpenAiClient};
pub use retry::{with_retries, RetryPolicy};
