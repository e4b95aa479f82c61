//! LLM provider configuration resolved from the environment

use std::time::Duration;

use codemap_core::{CodemapError, Result};

/// Which provider to talk to and how.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// `openai` or `ollama`.
    pub provider: String,
    pub model: String,
    pub embedding_model: String,
    pub api_key: Option<String>,
    /// Override for the provider's default endpoint.
    pub base_url: Option<String>,
    pub timeout: Duration,
    pub max_retries: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        LlmConfig {
            provider: "openai".to_string(),
            model: "gpt-4o-mini".to_string(),
            embedding_model: "text-embedding-3-small".to_string(),
            api_key: None,
            base_url: None,
            timeout: Duration::from_secs(120),
            max_retries: 3,
        }
    }
}

impl LlmConfig {
    /// Resolve from `CODEMAP_*` environment variables, with
    /// `OPENAI_API_KEY` as the conventional credential fallback.
    pub fn from_env() -> Self {
        let mut cfg = LlmConfig::default();
        if let Ok(provider) = std::env::var("CODEMAP_PROVIDER") {
            cfg.provider = provider.to_lowercase();
        }
        if let Ok(model) = std::env::var("CODEMAP_MODEL") {
            cfg.model = model;
        }
        if let Ok(model) = std::env::var("CODEMAP_EMBEDDING_MODEL") {
            cfg.embedding_model = model;
        }
        cfg.api_key = std::env::var("CODEMAP_API_KEY")
            .or_else(|_| std::env::var("OPENAI_API_KEY"))
            .ok();
        cfg.base_url = std::env::var("CODEMAP_BASE_URL").ok();
        if let Ok(secs) = std::env::var("CODEMAP_TIMEOUT_SECS") {
            if let Ok(secs) = secs.parse::<u64>() {
                cfg.timeout = Duration::from_secs(secs);
            }
        }
        if cfg.provider == "ollama" && cfg.embedding_model.starts_with("text-embedding") {
            cfg.embedding_model = "nomic-embed-text".to_string();
        }
        cfg
    }

    /// Fail early on configurations that can never work.
    pub fn validate(&self) -> Result<()> {
        match self.provider.as_str() {
            "openai" => {
                if self.api_key.as_deref().unwrap_or("").is_empty() {
                    return Err(CodemapError::Config(
                        "provider 'openai' needs an API key; set CODEMAP_API_KEY or OPENAI_API_KEY"
                            .to_string(),
                    ));
                }
                Ok(())
            }
            "ollama" => Ok(()),
            other => Err(CodemapError::Config(format!(
                "unknown provider '{other}' (expected 'openai' or 'ollama')"
            ))),
        }
    }
}
