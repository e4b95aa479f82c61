//! The graph arena: typed records keyed by deterministic ids

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::model::{Edge, EdgeKind, GraphStats, Node, NodeId, NodeKind};

/// The code knowledge graph.
///
/// Nodes live in a `BTreeMap` so iteration (and therefore
/// serialization) is ordered by id: identical inputs produce
/// byte-identical graph files. Secondary indexes are rebuilt on load
/// and never serialized.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Graph {
    pub nodes: BTreeMap<NodeId, Node>,
    pub edges: Vec<Edge>,
    pub root_path: String,
    /// Epoch seconds of the last completed index run.
    pub last_indexed: i64,
    pub node_count: usize,
    pub edge_count: usize,

    #[serde(skip)]
    nodes_by_path: HashMap<String, Vec<NodeId>>,
    #[serde(skip)]
    nodes_by_name: HashMap<String, Vec<NodeId>>,
    #[serde(skip)]
    edges_by_from: HashMap<NodeId, Vec<usize>>,
    #[serde(skip)]
    edges_by_to: HashMap<NodeId, Vec<usize>>,
}

impl Graph {
    pub fn new(root_path: &str) -> Self {
        Graph {
            root_path: root_path.to_string(),
            ..Default::default()
        }
    }

    /// Insert a node, idempotent by id. A later insertion only fills
    /// optional fields the stored node is missing; it never overwrites.
    pub fn add_node(&mut self, node: Node) {
        match self.nodes.get_mut(&node.id) {
            Some(existing) => {
                if existing.signature.is_none() {
                    existing.signature = node.signature;
                }
                if existing.doc_string.is_none() {
                    existing.doc_string = node.doc_string;
                }
                if existing.content_hash.is_none() {
                    existing.content_hash = node.content_hash;
                }
            }
            None => {
                self.index_node(&node);
                self.nodes.insert(node.id, node);
            }
        }
    }

    /// Append an edge. Duplicates are allowed; callers dedupe if needed.
    pub fn add_edge(&mut self, edge: Edge) {
        let idx = self.edges.len();
        self.edges_by_from.entry(edge.from).or_default().push(idx);
        self.edges_by_to.entry(edge.to).or_default().push(idx);
        self.edges.push(edge);
    }

    pub fn get_node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Case-insensitive substring match over node names, optionally
    /// restricted to one kind. Results come back in id order.
    pub fn find_nodes_by_name(&self, pattern: &str, kind: Option<NodeKind>) -> Vec<&Node> {
        let needle = pattern.to_lowercase();
        self.nodes
            .values()
            .filter(|n| kind.map_or(true, |k| n.kind == k))
            .filter(|n| n.name.to_lowercase().contains(&needle))
            .collect()
    }

    /// All nodes defined at a path, in id order.
    pub fn nodes_at_path(&self, path: &str) -> Vec<&Node> {
        self.nodes_by_path
            .get(path)
            .map(|ids| ids.iter().filter_map(|id| self.nodes.get(id)).collect())
            .unwrap_or_default()
    }

    /// Nodes with an exact name, in id order.
    pub fn nodes_named(&self, name: &str) -> Vec<&Node> {
        self.nodes_by_name
            .get(name)
            .map(|ids| ids.iter().filter_map(|id| self.nodes.get(id)).collect())
            .unwrap_or_default()
    }

    pub fn get_outgoing(&self, id: NodeId) -> Vec<&Edge> {
        self.edges_by_from
            .get(&id)
            .map(|idxs| idxs.iter().map(|&i| &self.edges[i]).collect())
            .unwrap_or_default()
    }

    pub fn get_incoming(&self, id: NodeId) -> Vec<&Edge> {
        self.edges_by_to
            .get(&id)
            .map(|idxs| idxs.iter().map(|&i| &self.edges[i]).collect())
            .unwrap_or_default()
    }

    /// Nodes with a `Calls` edge into `id`, in edge insertion order.
    pub fn get_callers(&self, id: NodeId) -> Vec<&Node> {
        self.get_incoming(id)
            .into_iter()
            .filter(|e| e.kind == EdgeKind::Calls)
            .filter_map(|e| self.nodes.get(&e.from))
            .collect()
    }

    /// Nodes `id` has a `Calls` edge to, in edge insertion order.
    pub fn get_callees(&self, id: NodeId) -> Vec<&Node> {
        self.get_outgoing(id)
            .into_iter()
            .filter(|e| e.kind == EdgeKind::Calls)
            .filter_map(|e| self.nodes.get(&e.to))
            .collect()
    }

    /// Remove every node whose `path` matches and every edge touching
    /// one of them. Drives incremental rebuilds.
    pub fn remove_nodes_for_path(&mut self, path: &str) -> usize {
        let doomed: HashSet<NodeId> = self
            .nodes
            .values()
            .filter(|n| n.path == path)
            .map(|n| n.id)
            .collect();
        if doomed.is_empty() {
            return 0;
        }

        self.nodes.retain(|id, _| !doomed.contains(id));
        self.edges
            .retain(|e| !doomed.contains(&e.from) && !doomed.contains(&e.to));
        self.rebuild_indexes();
        doomed.len()
    }

    /// Remove every `Calls` edge originating from a symbol defined at
    /// `path`. Runs before a file's call sites are re-extracted, so
    /// re-linking cannot duplicate surviving edges.
    pub fn remove_calls_from_path(&mut self, path: &str) -> usize {
        let here: HashSet<NodeId> = self
            .nodes
            .values()
            .filter(|n| n.path == path)
            .map(|n| n.id)
            .collect();
        if here.is_empty() {
            return 0;
        }

        let before = self.edges.len();
        self.edges
            .retain(|e| e.kind != EdgeKind::Calls || !here.contains(&e.from));
        let removed = before - self.edges.len();
        if removed > 0 {
            self.rebuild_indexes();
        }
        removed
    }

    /// Reconstruct all secondary maps from the authoritative
    /// nodes/edges. Must run after deserialization.
    pub fn rebuild_indexes(&mut self) {
        self.nodes_by_path.clear();
        self.nodes_by_name.clear();
        self.edges_by_from.clear();
        self.edges_by_to.clear();

        for node in self.nodes.values() {
            self.nodes_by_path
                .entry(node.path.clone())
                .or_default()
                .push(node.id);
            self.nodes_by_name
                .entry(node.name.clone())
                .or_default()
                .push(node.id);
        }
        for (idx, edge) in self.edges.iter().enumerate() {
            self.edges_by_from.entry(edge.from).or_default().push(idx);
            self.edges_by_to.entry(edge.to).or_default().push(idx);
        }
    }

    fn index_node(&mut self, node: &Node) {
        self.nodes_by_path
            .entry(node.path.clone())
            .or_default()
            .push(node.id);
        self.nodes_by_name
            .entry(node.name.clone())
            .or_default()
            .push(node.id);
    }

    /// Paths of all file-backed nodes (deduplicated, sorted).
    pub fn indexed_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self
            .nodes
            .values()
            .filter(|n| n.kind == NodeKind::File)
            .map(|n| n.path.clone())
            .collect();
        paths.sort();
        paths.dedup();
        paths
    }

    /// Sync the persisted counters with the collections.
    pub fn refresh_counters(&mut self) {
        self.node_count = self.nodes.len();
        self.edge_count = self.edges.len();
    }

    pub fn stats(&self) -> GraphStats {
        let mut by_kind: BTreeMap<String, usize> = BTreeMap::new();
        for node in self.nodes.values() {
            *by_kind.entry(node.kind.as_str().to_string()).or_default() += 1;
        }
        GraphStats {
            total_nodes: self.nodes.len(),
            total_edges: self.edges.len(),
            file_count: by_kind.get("file").copied().unwrap_or(0),
            function_count: by_kind.get("function").copied().unwrap_or(0)
                + by_kind.get("method").copied().unwrap_or(0),
            by_kind,
        }
    }
}
