//! Per-node embedding storage with cosine-similarity search

use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::path::Path;

use codemap_core::{store, CodemapError, Graph, NodeId, Result};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One search hit: node id plus cosine similarity in `[-1, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchHit {
    pub id: NodeId,
    pub score: f32,
}

/// Vector index companion to the graph. Persisted separately so the
/// graph can be rebuilt without discarding embeddings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VectorIndex {
    /// Dimensionality pinned by the first inserted vector; 0 = unset.
    dimension: usize,
    vectors: BTreeMap<NodeId, Vec<f32>>,
    /// The text each vector was embedded from, kept for debugging and
    /// re-embedding decisions.
    texts: BTreeMap<NodeId, String>,
}

impl VectorIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn count(&self) -> usize {
        self.vectors.len()
    }

    pub fn has(&self, id: NodeId) -> bool {
        self.vectors.contains_key(&id)
    }

    pub fn descriptor(&self, id: NodeId) -> Option<&str> {
        self.texts.get(&id).map(|s| s.as_str())
    }

    /// Insert or replace a vector. The first insert pins the index
    /// dimension; later mismatches are rejected.
    pub fn add(&mut self, id: NodeId, vector: Vec<f32>, descriptor: &str) -> Result<()> {
        if vector.is_empty() {
            return Err(CodemapError::Config("refusing empty vector".to_string()));
        }
        if self.dimension == 0 {
            self.dimension = vector.len();
        } else if vector.len() != self.dimension {
            return Err(CodemapError::Config(format!(
                "vector dimension {} does not match index dimension {}",
                vector.len(),
                self.dimension
            )));
        }
        self.vectors.insert(id, vector);
        self.texts.insert(id, descriptor.to_string());
        Ok(())
    }

    pub fn remove(&mut self, id: NodeId) {
        self.vectors.remove(&id);
        self.texts.remove(&id);
    }

    /// Drop vectors whose node no longer exists. Returns how many went.
    pub fn prune_orphans(&mut self, graph: &Graph) -> usize {
        let before = self.vectors.len();
        self.vectors.retain(|id, _| graph.nodes.contains_key(id));
        self.texts.retain(|id, _| graph.nodes.contains_key(id));
        before - self.vectors.len()
    }

    /// Top-k by cosine similarity, descending; ties break by node id.
    /// A query of the wrong dimension is rejected, not silently wrong.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit>> {
        if self.dimension != 0 && query.len() != self.dimension {
            return Err(CodemapError::Config(format!(
                "query dimension {} does not match index dimension {}",
                query.len(),
                self.dimension
            )));
        }
        let mut hits: Vec<SearchHit> = self
            .vectors
            .iter()
            .map(|(id, v)| SearchHit {
                id: *id,
                score: cosine(query, v),
            })
            .collect();
        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.id.cmp(&b.id))
        });
        hits.truncate(k);
        Ok(hits)
    }

    /// Persist next to the graph at `.codemap/vectors.bin`.
    pub fn save(&self, root: &Path) -> Result<()> {
        std::fs::create_dir_all(store::codemap_dir(root))?;
        let encoded = bincode::serialize(self)
            .map_err(|e| CodemapError::Io(format!("vector encode failed: {e}")))?;
        let path = store::vectors_path(root);
        let file = std::fs::File::create(&path)?;
        let mut encoder = GzEncoder::new(file, Compression::default());
        encoder.write_all(&encoded)?;
        encoder.finish()?;
        debug!(vectors = self.count(), path = %path.display(), "vector index saved");
        Ok(())
    }

    pub fn exists(root: &Path) -> bool {
        store::vectors_path(root).is_file()
    }

    pub fn load(root: &Path) -> Result<Self> {
        let path = store::vectors_path(root);
        let file = std::fs::File::open(&path)
            .map_err(|e| CodemapError::Io(format!("cannot open {}: {e}", path.display())))?;
        let mut decoder = GzDecoder::new(file);
        let mut buf = Vec::new();
        decoder
            .read_to_end(&mut buf)
            .map_err(|e| CodemapError::Io(format!("cannot decompress {}: {e}", path.display())))?;
        bincode::deserialize(&buf)
            .map_err(|e| CodemapError::Io(format!("invalid vector file {}: {e}", path.display())))
    }

    /// Load if present, otherwise start empty.
    pub fn load_or_default(root: &Path) -> Self {
        if Self::exists(root) {
            Self::load(root).unwrap_or_else(|e| {
                debug!("starting fresh vector index: {e}");
                Self::new()
            })
        } else {
            Self::new()
        }
    }
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}
