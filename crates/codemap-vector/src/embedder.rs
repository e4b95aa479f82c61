//! Materializes embedding vectors for function, method and type nodes

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use codemap_core::{CancelFlag, Graph, Node, NodeKind, Result};
use codemap_ai::LlmClient;
use serde::Serialize;
use tracing::{info, warn};

use crate::index::VectorIndex;

/// Descriptor truncation limits.
const DOC_CHARS: usize = 500;
const SOURCE_CHARS: usize = 1000;

/// Embedder knobs. Transient-failure retries live in the provider
/// adapters (every call already goes through the shared retry helper),
/// so the embedder only decides what to embed and what to skip.
#[derive(Debug, Clone)]
pub struct EmbedderConfig {
    /// Nodes per progress batch.
    pub batch_size: usize,
    /// Append a fenced source snippet to the descriptor.
    pub include_source: bool,
    /// Re-embed nodes that already have a vector.
    pub force: bool,
}

impl Default for EmbedderConfig {
    fn default() -> Self {
        EmbedderConfig {
            batch_size: 10,
            include_source: false,
            force: false,
        }
    }
}

/// Outcome of one embedding run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EmbedStats {
    pub total: usize,
    pub embedded: usize,
    pub skipped: usize,
    pub failed: usize,
    pub duration_ms: u128,
    pub tokens_in: u64,
}

pub struct Embedder {
    client: Arc<dyn LlmClient>,
    config: EmbedderConfig,
}

impl Embedder {
    pub fn new(client: Arc<dyn LlmClient>, config: EmbedderConfig) -> Self {
        Embedder { client, config }
    }

    /// The text a node is embedded from.
    pub fn descriptor(node: &Node, source: Option<&str>) -> String {
        let mut text = format!("{}: {}", node.kind.as_str(), node.name);
        if let Some(signature) = &node.signature {
            text.push_str(&format!("\nSignature: {signature}"));
        }
        if let Some(doc) = &node.doc_string {
            if !doc.is_empty() {
                let doc: String = doc.chars().take(DOC_CHARS).collect();
                text.push_str(&format!("\nDescription: {doc}"));
            }
        }
        text.push_str(&format!("\nLocation: {}", node.path));
        if let Some(source) = source {
            let snippet: String = source.chars().take(SOURCE_CHARS).collect();
            text.push_str(&format!("\n```\n{snippet}\n```"));
        }
        text
    }

    /// Embed every function, method and type node that needs it.
    /// Failures degrade: a node that cannot be embedded is logged,
    /// counted and left unembedded.
    pub async fn embed_graph(
        &self,
        graph: &Graph,
        index: &mut VectorIndex,
        root: Option<&Path>,
        cancel: &CancelFlag,
    ) -> Result<EmbedStats> {
        let started = Instant::now();
        let mut stats = EmbedStats::default();

        let candidates: Vec<&Node> = graph
            .nodes
            .values()
            .filter(|n| {
                matches!(
                    n.kind,
                    NodeKind::Function | NodeKind::Method | NodeKind::Type
                )
            })
            .collect();
        stats.total = candidates.len();

        for batch in candidates.chunks(self.config.batch_size.max(1)) {
            if cancel.is_cancelled() {
                warn!("embedding cancelled after {} nodes", stats.embedded);
                break;
            }
            for node in batch {
                if cancel.is_cancelled() {
                    break;
                }
                if !self.config.force && index.has(node.id) {
                    stats.skipped += 1;
                    continue;
                }

                let source = match (self.config.include_source, root) {
                    (true, Some(root)) => {
                        codemap_scanner::read_span(root, &node.path, node.line, node.end_line).ok()
                    }
                    _ => None,
                };
                let text = Self::descriptor(node, source.as_deref());

                match self.client.embed(&text, None).await {
                    Ok(embedding) => {
                        if let Some(usage) = embedding.usage {
                            stats.tokens_in += usage.prompt_tokens as u64;
                        }
                        match index.add(node.id, embedding.vector, &text) {
                            Ok(()) => stats.embedded += 1,
                            Err(e) => {
                                warn!(node = %node.name, "vector rejected: {e}");
                                stats.failed += 1;
                            }
                        }
                    }
                    Err(e) => {
                        warn!(node = %node.name, "embedding failed: {e}");
                        stats.failed += 1;
                    }
                }
            }
            info!(
                embedded = stats.embedded,
                skipped = stats.skipped,
                failed = stats.failed,
                total = stats.total,
                "embedding progress"
            );
        }

        stats.duration_ms = started.elapsed().as_millis();
        Ok(stats)
    }
}
