//! Hybrid retrieval: vector similarity fused with structural name
//! matching via reciprocal rank fusion

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use codemap_core::{Graph, Node, NodeId, NodeKind, Result};
use codemap_ai::LlmClient;
use serde::Serialize;
use tracing::{debug, warn};

use crate::index::VectorIndex;

/// RRF constant; the standard damping value.
const RRF_K: f32 = 60.0;

/// Context-expansion snippet limit.
const SNIPPET_CHARS: usize = 500;

/// How to search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchMode {
    #[default]
    Hybrid,
    Vector,
    Graph,
}

impl std::str::FromStr for SearchMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hybrid" => Ok(SearchMode::Hybrid),
            "vector" => Ok(SearchMode::Vector),
            "graph" => Ok(SearchMode::Graph),
            other => Err(format!("unknown search mode '{other}'")),
        }
    }
}

/// One retrieval result in the unified shape every mode returns.
#[derive(Debug, Clone, Serialize)]
pub struct HybridResult {
    pub node: Node,
    /// Fused score (RRF for hybrid; the single mode's score otherwise).
    pub score: f32,
    pub vector_score: f32,
    pub graph_score: f32,
    /// Which name rule matched: exact, prefix, contains, words, path.
    pub match_kind: String,
    pub callers: Vec<String>,
    pub callees: Vec<String>,
    pub snippet: Option<String>,
}

/// Retriever configuration.
#[derive(Debug, Clone)]
pub struct Retriever {
    pub vector_weight: f32,
    pub graph_weight: f32,
    pub expand_context: bool,
}

impl Default for Retriever {
    fn default() -> Self {
        Retriever {
            vector_weight: 0.6,
            graph_weight: 0.4,
            expand_context: false,
        }
    }
}

/// A graph-side name match before fusion.
#[derive(Debug, Clone)]
struct NameHit {
    id: NodeId,
    score: f32,
    kind: &'static str,
}

impl Retriever {
    /// Run a search. `client` is only consulted in vector and hybrid
    /// modes; graph mode works offline. A missing or failing embedding
    /// degrades hybrid search to graph-only.
    pub async fn search(
        &self,
        query: &str,
        limit: usize,
        mode: SearchMode,
        graph: &Graph,
        index: &VectorIndex,
        client: Option<&Arc<dyn LlmClient>>,
        root: Option<&Path>,
    ) -> Result<Vec<HybridResult>> {
        let results = match mode {
            SearchMode::Vector => {
                let hits = self.vector_hits(query, limit, graph, index, client).await?;
                hits.into_iter()
                    .filter_map(|(id, score)| {
                        graph.get_node(id).map(|node| HybridResult {
                            node: node.clone(),
                            score,
                            vector_score: score,
                            graph_score: 0.0,
                            match_kind: String::new(),
                            callers: Vec::new(),
                            callees: Vec::new(),
                            snippet: None,
                        })
                    })
                    .take(limit)
                    .collect()
            }
            SearchMode::Graph => {
                let hits = name_search(graph, query);
                hits.into_iter()
                    .filter_map(|hit| {
                        graph.get_node(hit.id).map(|node| HybridResult {
                            node: node.clone(),
                            score: hit.score,
                            vector_score: 0.0,
                            graph_score: hit.score,
                            match_kind: hit.kind.to_string(),
                            callers: Vec::new(),
                            callees: Vec::new(),
                            snippet: None,
                        })
                    })
                    .take(limit)
                    .collect()
            }
            SearchMode::Hybrid => {
                let vector_hits = match self
                    .vector_hits(query, limit * 2, graph, index, client)
                    .await
                {
                    Ok(hits) => hits,
                    Err(e) => {
                        warn!("vector search unavailable, falling back to graph: {e}");
                        Vec::new()
                    }
                };
                let graph_hits = name_search(graph, query);
                self.fuse(graph, vector_hits, graph_hits, limit)
            }
        };

        let mut results = results;
        if self.expand_context {
            for result in &mut results {
                expand(result, graph, root);
            }
        }
        Ok(results)
    }

    /// Vector candidates as `(id, cosine)` with orphans dropped.
    async fn vector_hits(
        &self,
        query: &str,
        k: usize,
        graph: &Graph,
        index: &VectorIndex,
        client: Option<&Arc<dyn LlmClient>>,
    ) -> Result<Vec<(NodeId, f32)>> {
        let client = client.ok_or_else(|| {
            codemap_core::CodemapError::Config("vector search needs an LLM client".to_string())
        })?;
        if index.count() == 0 {
            return Ok(Vec::new());
        }
        let embedding = client.embed(query, None).await?;
        let hits = index.search(&embedding.vector, k)?;
        Ok(hits
            .into_iter()
            .filter(|h| graph.nodes.contains_key(&h.id))
            .map(|h| (h.id, h.score))
            .collect())
    }

    /// Reciprocal rank fusion over the two ranked lists. An item's
    /// contribution sums only over the lists it appears in.
    fn fuse(
        &self,
        graph: &Graph,
        vector_hits: Vec<(NodeId, f32)>,
        graph_hits: Vec<NameHit>,
        limit: usize,
    ) -> Vec<HybridResult> {
        struct Fused {
            rrf: f32,
            vector_score: f32,
            graph_score: f32,
            match_kind: &'static str,
        }
        let mut fused: HashMap<NodeId, Fused> = HashMap::new();

        for (rank, (id, score)) in vector_hits.iter().enumerate() {
            let entry = fused.entry(*id).or_insert(Fused {
                rrf: 0.0,
                vector_score: 0.0,
                graph_score: 0.0,
                match_kind: "",
            });
            entry.rrf += self.vector_weight / (RRF_K + rank as f32 + 1.0);
            entry.vector_score = *score;
        }
        for (rank, hit) in graph_hits.iter().enumerate() {
            let entry = fused.entry(hit.id).or_insert(Fused {
                rrf: 0.0,
                vector_score: 0.0,
                graph_score: 0.0,
                match_kind: "",
            });
            entry.rrf += self.graph_weight / (RRF_K + rank as f32 + 1.0);
            entry.graph_score = hit.score;
            entry.match_kind = hit.kind;
        }

        let mut results: Vec<HybridResult> = fused
            .into_iter()
            .filter_map(|(id, f)| {
                graph.get_node(id).map(|node| HybridResult {
                    node: node.clone(),
                    score: f.rrf,
                    vector_score: f.vector_score,
                    graph_score: f.graph_score,
                    match_kind: f.match_kind.to_string(),
                    callers: Vec::new(),
                    callees: Vec::new(),
                    snippet: None,
                })
            })
            .collect();
        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.node.id.cmp(&b.node.id))
        });
        results.truncate(limit);
        debug!(results = results.len(), "hybrid fusion complete");
        results
    }
}

/// Structural name scoring over symbol nodes (files and packages are
/// skipped). Results order by score descending, node id ascending.
fn name_search(graph: &Graph, query: &str) -> Vec<NameHit> {
    let needle = query.to_lowercase();
    let words: Vec<&str> = needle.split_whitespace().collect();
    let mut hits = Vec::new();

    for node in graph.nodes.values() {
        if matches!(node.kind, NodeKind::File | NodeKind::Package) {
            continue;
        }
        let name = node.name.to_lowercase();

        let (score, kind) = if name == needle {
            (1.0, "exact")
        } else if name.starts_with(&needle) {
            (0.9, "prefix")
        } else if name.contains(&needle) {
            (0.7, "contains")
        } else if words.len() > 1 {
            let haystack = format!(
                "{} {} {}",
                name,
                node.signature.as_deref().unwrap_or("").to_lowercase(),
                node.doc_string.as_deref().unwrap_or("").to_lowercase()
            );
            let matched = words.iter().filter(|w| haystack.contains(*w)).count();
            if matched > 0 {
                (0.5 * matched as f32 / words.len() as f32, "words")
            } else if node.path.to_lowercase().contains(&needle) {
                (0.4, "path")
            } else {
                continue;
            }
        } else if node.path.to_lowercase().contains(&needle) {
            (0.4, "path")
        } else {
            continue;
        };

        hits.push(NameHit {
            id: node.id,
            score,
            kind,
        });
    }

    // Stable ordering: score descending, then id (BTreeMap iteration
    // already yields ids ascending, sort is stable).
    hits.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    hits
}

/// Attach direct callers, callees and a source snippet.
fn expand(result: &mut HybridResult, graph: &Graph, root: Option<&Path>) {
    result.callers = graph
        .get_callers(result.node.id)
        .iter()
        .map(|n| n.name.clone())
        .collect();
    result.callees = graph
        .get_callees(result.node.id)
        .iter()
        .map(|n| n.name.clone())
        .collect();
    if let Some(root) = root {
        if result.node.line > 0 {
            if let Ok(span) = codemap_scanner::read_span(
                root,
                &result.node.path,
                result.node.line,
                result.node.end_line,
            ) {
                result.snippet = Some(span.chars().take(SNIPPET_CHARS).collect());
            }
        }
    }
}
