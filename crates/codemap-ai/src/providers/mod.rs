//! Provider adapters behind the `LlmClient` trait

mod ollama;
mod openai;

use std::sync::Arc;

use codemap_core::{CodemapError, Result};

use crate::client::LlmClient;
use crate::config::LlmConfig;

pub use ollama::OllamaClient;
pub use openai::OpenAiClient;

/// Build the configured provider.
pub fn create_client(config: &LlmConfig) -> Result<Arc<dyn LlmClient>> {
    config.validate()?;
    match config.provider.as_str() {
        "openai" => Ok(Arc::new(OpenAiClient::new(config)?)),
        "ollama" => Ok(Arc::new(OllamaClient::new(config)?)),
        other => Err(CodemapError::Config(format!("unknown provider '{other}'"))),
    }
}
