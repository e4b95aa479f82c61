//! Core data structures for the code knowledge graph

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Unique, stable identifier for a node.
///
/// The id is a pure function of `(path, name)` so that two scans of an
/// unchanged file always produce the same ids and incremental rebuilds
/// can find existing nodes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct NodeId(pub u64);

impl NodeId {
    /// Fingerprint of `(file_path, symbol_name)`.
    ///
    /// FNV-1a 64-bit, which is stable across runs, platforms and
    /// releases (std's `DefaultHasher` gives no such guarantee).
    pub fn of(path: &str, name: &str) -> Self {
        const FNV_OFFSET: u64 = 0xcbf29ce484222325;
        const FNV_PRIME: u64 = 0x100000001b3;

        let mut hash = FNV_OFFSET;
        for b in path.bytes().chain(std::iter::once(0x1f)).chain(name.bytes()) {
            hash ^= b as u64;
            hash = hash.wrapping_mul(FNV_PRIME);
        }
        NodeId(hash)
    }

    /// Id for a file node: empty symbol.
    pub fn for_file(path: &str) -> Self {
        Self::of(path, "")
    }

    /// Id for a package node: the import path with empty symbol.
    pub fn for_package(import_path: &str) -> Self {
        Self::of(import_path, "")
    }

    /// Placeholder id for a call whose target is not yet resolved:
    /// empty path plus the callee name as written at the call site.
    pub fn placeholder(callee: &str) -> Self {
        Self::of("", callee)
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Discriminates what kind of code entity a node represents.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum NodeKind {
    File,
    Package,
    Function,
    Method,
    Type,
    Variable,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::File => "file",
            NodeKind::Package => "package",
            NodeKind::Function => "function",
            NodeKind::Method => "method",
            NodeKind::Type => "type",
            NodeKind::Variable => "variable",
        }
    }
}

/// A single node in the knowledge graph.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
    pub name: String,
    /// Path relative to the project root. Empty for external packages.
    pub path: String,
    /// Package the symbol belongs to (language-specific notion).
    pub package: String,
    /// 1-indexed start line; 0 when not applicable (files, packages).
    pub line: u32,
    /// 1-indexed end line; always >= `line` when both are set.
    pub end_line: u32,
    /// Reconstructed textual signature, when the extractor produced one.
    pub signature: Option<String>,
    pub doc_string: Option<String>,
    /// Language-specific visibility rule (capitalization, `pub`, `_`…).
    pub exported: bool,
    /// Declared parameter count; -1 when unknown or variadic.
    pub param_count: i32,
    /// SHA-256 of the source span, used to key cached LLM artifacts.
    pub content_hash: Option<String>,
}

impl Node {
    pub fn new(kind: NodeKind, name: &str, path: &str) -> Self {
        Node {
            id: NodeId::of(path, if kind == NodeKind::File { "" } else { name }),
            kind,
            name: name.to_string(),
            path: path.to_string(),
            package: String::new(),
            line: 0,
            end_line: 0,
            signature: None,
            doc_string: None,
            exported: false,
            param_count: -1,
            content_hash: None,
        }
    }
}

/// What kind of relationship an edge represents.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum EdgeKind {
    Imports,
    Calls,
    Contains,
    Defines,
    References,
}

/// A directed, typed edge. Holds two `NodeId`s rather than references,
/// so the graph is a flat arena with no pointer cycles.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Edge {
    pub from: NodeId,
    pub to: NodeId,
    pub kind: EdgeKind,
    /// Line of the site where the relation occurs, when applicable.
    pub line: u32,
    /// Callee name as written at the call site, kept for late resolution.
    pub call_site: String,
    /// Argument cardinality at the call site; -1 when unknown.
    pub arg_count: i32,
    /// Optional weight; unused by core semantics.
    pub weight: f32,
}

impl Edge {
    pub fn new(from: NodeId, to: NodeId, kind: EdgeKind) -> Self {
        Edge {
            from,
            to,
            kind,
            line: 0,
            call_site: String::new(),
            arg_count: -1,
            weight: 0.0,
        }
    }
}

/// Aggregate counters reported by `Graph::stats`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphStats {
    pub total_nodes: usize,
    pub total_edges: usize,
    pub by_kind: BTreeMap<String, usize>,
    pub file_count: usize,
    pub function_count: usize,
}

/// SHA-256 of a source span, hex-encoded. Used for `Node::content_hash`
/// and as one ingredient of the LLM response-cache key.
pub fn content_hash(source: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source);
    format!("{:x}", hasher.finalize())
}
