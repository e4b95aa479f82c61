//! LLM response cache keyed by content hash
//!
//! The key contract is `sha256(source_span) ⊕ operation ⊕ model`;
//! entries live as JSON files under `.codemap/cache/`. Lookups never
//! fail: corrupt or missing entries read as a miss.

use std::path::PathBuf;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

/// One cached LLM response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedResponse {
    pub operation: String,
    pub model: String,
    pub content: String,
    pub created_at: String,
}

/// File-backed response cache.
pub struct ResponseCache {
    dir: PathBuf,
}

impl ResponseCache {
    pub fn new(dir: PathBuf) -> Self {
        ResponseCache { dir }
    }

    /// Cache key for a symbol's source span and one operation/model
    /// pair. `content_hash` is the node's SHA-256 span hash.
    pub fn key(content_hash: &str, operation: &str, model: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(content_hash.as_bytes());
        hasher.update(b"\x1f");
        hasher.update(operation.as_bytes());
        hasher.update(b"\x1f");
        hasher.update(model.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// A miss (or any read problem) is `None`.
    pub fn get(&self, key: &str) -> Option<CachedResponse> {
        let path = self.entry_path(key);
        let data = std::fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&data) {
            Ok(entry) => Some(entry),
            Err(e) => {
                debug!(path = %path.display(), "ignoring corrupt cache entry: {e}");
                None
            }
        }
    }

    /// Store an entry; failures are logged, never raised.
    pub fn put(&self, key: &str, operation: &str, model: &str, content: &str) {
        let entry = CachedResponse {
            operation: operation.to_string(),
            model: model.to_string(),
            content: content.to_string(),
            created_at: Utc::now().to_rfc3339(),
        };
        if let Err(e) = std::fs::create_dir_all(&self.dir) {
            debug!("cannot create cache dir: {e}");
            return;
        }
        let path = self.entry_path(key);
        match serde_json::to_string_pretty(&entry) {
            Ok(json) => {
                if let Err(e) = std::fs::write(&path, json) {
                    debug!(path = %path.display(), "cache write failed: {e}");
                }
            }
            Err(e) => debug!("cache encode failed: {e}"),
        }
    }
}
