//! Maps scanner output into graph mutations, then resolves and filters
//! call edges.
//!
//! Calls whose target is not visible in the same file get a placeholder
//! `to` id computed from `(empty path, callee name)`. Resolution happens
//! in one explicit pass once every file has been ingested, so ingestion
//! never needs forward references.

use std::collections::HashMap;

use tracing::debug;

use crate::analysis::{CallAnalysis, FileAnalysis};
use crate::error::{CodemapError, Result};
use crate::graph::Graph;
use crate::model::{Edge, EdgeKind, Node, NodeId, NodeKind};

pub struct GraphBuilder {
    graph: Graph,
}

impl GraphBuilder {
    pub fn new(root_path: &str) -> Self {
        GraphBuilder {
            graph: Graph::new(root_path),
        }
    }

    /// Continue building on top of an existing (trimmed) graph, as the
    /// incremental update path does.
    pub fn with_graph(graph: Graph) -> Self {
        GraphBuilder { graph }
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Phase 1: emit nodes and structural edges for one file.
    pub fn ingest(&mut self, analysis: &FileAnalysis) {
        let path = analysis.path.as_str();
        let file_id = NodeId::for_file(path);

        let file_name = path.rsplit('/').next().unwrap_or(path);
        let mut file_node = Node::new(NodeKind::File, file_name, path);
        file_node.package = analysis.package.clone();
        self.graph.add_node(file_node);

        for f in &analysis.functions {
            let kind = if f.receiver.is_empty() {
                NodeKind::Function
            } else {
                NodeKind::Method
            };
            let mut node = Node::new(kind, &f.name, path);
            node.package = analysis.package.clone();
            node.line = f.line;
            node.end_line = f.end_line;
            node.exported = f.exported;
            node.param_count = f.param_count;
            if !f.signature.is_empty() {
                node.signature = Some(f.signature.clone());
            }
            if !f.doc.is_empty() {
                node.doc_string = Some(f.doc.clone());
            }
            if !f.content_hash.is_empty() {
                node.content_hash = Some(f.content_hash.clone());
            }
            let id = node.id;
            self.graph.add_node(node);

            let mut contains = Edge::new(file_id, id, EdgeKind::Contains);
            contains.line = f.line;
            self.graph.add_edge(contains);
        }

        for t in &analysis.types {
            let mut node = Node::new(NodeKind::Type, &t.name, path);
            node.package = analysis.package.clone();
            node.line = t.line;
            node.end_line = t.end_line;
            node.exported = t.exported;
            if !t.doc.is_empty() {
                node.doc_string = Some(t.doc.clone());
            }
            let id = node.id;
            self.graph.add_node(node);

            let mut contains = Edge::new(file_id, id, EdgeKind::Contains);
            contains.line = t.line;
            self.graph.add_edge(contains);
        }

        for import in &analysis.imports {
            let pkg_name = import
                .rsplit(|c| c == '/' || c == '.')
                .next()
                .unwrap_or(import);
            let pkg_id = NodeId::for_package(import);
            let mut pkg = Node::new(NodeKind::Package, pkg_name, import);
            pkg.id = pkg_id;
            pkg.package = pkg_name.to_string();
            self.graph.add_node(pkg);

            self.graph
                .add_edge(Edge::new(file_id, pkg_id, EdgeKind::Imports));
        }

        // Call edges only make sense when the caller is a function we
        // just emitted for this file; top-level call sites are dropped.
        let local: HashMap<&str, NodeId> = analysis
            .functions
            .iter()
            .map(|f| (f.name.as_str(), NodeId::of(path, &f.name)))
            .collect();

        for call in &analysis.calls {
            let Some(&from) = local.get(call.caller.as_str()) else {
                continue;
            };
            let to = match local.get(call.callee.as_str()) {
                Some(&id) => id,
                None => NodeId::placeholder(&call.callee),
            };
            let mut edge = Edge::new(from, to, EdgeKind::Calls);
            edge.line = call.line;
            edge.call_site = call.callee.clone();
            edge.arg_count = call.arg_count;
            self.graph.add_edge(edge);
        }
    }

    /// Re-link one file's call edges from a fresh per-file call
    /// extraction, without touching its nodes.
    ///
    /// The incremental path uses this for untouched files whose call
    /// targets were just removed and rescanned: their edges into the
    /// removed nodes are gone, and only a call re-extraction can bring
    /// them back. Existing `Calls` edges from the file are dropped
    /// first; unresolved targets get placeholder ids exactly as in
    /// `ingest` and fall to the resolve and filter phases.
    pub fn refresh_calls(&mut self, analysis: &CallAnalysis) {
        let path = analysis.path.as_str();
        self.graph.remove_calls_from_path(path);

        let local: HashMap<String, NodeId> = self
            .graph
            .nodes_at_path(path)
            .iter()
            .filter(|n| matches!(n.kind, NodeKind::Function | NodeKind::Method))
            .map(|n| (n.name.clone(), n.id))
            .collect();

        for call in &analysis.calls {
            let Some(&from) = local.get(call.caller.as_str()) else {
                continue;
            };
            let to = match local.get(call.callee.as_str()) {
                Some(&id) => id,
                None => NodeId::placeholder(&call.callee),
            };
            let mut edge = Edge::new(from, to, EdgeKind::Calls);
            edge.line = call.line;
            edge.call_site = call.callee.clone();
            edge.arg_count = call.arg_count;
            self.graph.add_edge(edge);
        }
    }

    /// Phase 2: rewrite placeholder call targets against a name index
    /// over all function and method nodes.
    ///
    /// Ambiguity is settled by preferring a candidate in the caller's
    /// file, then in the caller's package, then the first candidate in
    /// id order. Calls with no candidate stay unresolved and fall to
    /// the filter pass.
    pub fn resolve_call_edges(&mut self) {
        let mut by_name: HashMap<String, Vec<NodeId>> = HashMap::new();
        for node in self.graph.nodes.values() {
            if matches!(node.kind, NodeKind::Function | NodeKind::Method) {
                by_name.entry(node.name.clone()).or_default().push(node.id);
            }
        }

        let mut rewrites: Vec<(usize, NodeId)> = Vec::new();
        for (idx, edge) in self.graph.edges.iter().enumerate() {
            if edge.kind != EdgeKind::Calls || self.graph.nodes.contains_key(&edge.to) {
                continue;
            }
            let Some(candidates) = by_name.get(edge.call_site.as_str()) else {
                continue;
            };
            let caller = self.graph.get_node(edge.from);
            let chosen = match candidates.len() {
                1 => Some(candidates[0]),
                _ => Self::pick_candidate(&self.graph, caller, candidates),
            };
            if let Some(to) = chosen {
                rewrites.push((idx, to));
            }
        }

        debug!(resolved = rewrites.len(), "resolved call edges");
        for (idx, to) in rewrites {
            self.graph.edges[idx].to = to;
        }
    }

    fn pick_candidate(
        graph: &Graph,
        caller: Option<&Node>,
        candidates: &[NodeId],
    ) -> Option<NodeId> {
        if let Some(caller) = caller {
            if let Some(&id) = candidates.iter().find(|id| {
                graph
                    .get_node(**id)
                    .map_or(false, |n| n.path == caller.path)
            }) {
                return Some(id);
            }
            if let Some(&id) = candidates.iter().find(|id| {
                graph
                    .get_node(**id)
                    .map_or(false, |n| !n.package.is_empty() && n.package == caller.package)
            }) {
                return Some(id);
            }
        }
        candidates.first().copied()
    }

    /// Phase 3: precision filters over `Calls` edges.
    ///
    /// Keeps an edge only when the target exists, the call-site arity
    /// matches the declared parameter count (unknown/variadic always
    /// passes) and, for cross-file calls, the caller's file imports the
    /// callee's package. A package name carrying a path separator marks
    /// a stdlib/external target and passes without an import.
    ///
    /// Returns the number of dropped edges.
    pub fn filter_call_edges(&mut self) -> usize {
        let before = self.graph.edges.len();

        let mut imports_of_file: HashMap<String, Vec<String>> = HashMap::new();
        for edge in &self.graph.edges {
            if edge.kind != EdgeKind::Imports {
                continue;
            }
            let (Some(file), Some(pkg)) =
                (self.graph.get_node(edge.from), self.graph.get_node(edge.to))
            else {
                continue;
            };
            imports_of_file
                .entry(file.path.clone())
                .or_default()
                .push(pkg.path.clone());
        }

        let nodes = &self.graph.nodes;
        self.graph.edges.retain(|edge| {
            if edge.kind != EdgeKind::Calls {
                return true;
            }
            let (Some(caller), Some(callee)) = (nodes.get(&edge.from), nodes.get(&edge.to))
            else {
                return false;
            };

            // Arity gate.
            if callee.param_count >= 0 && edge.arg_count != callee.param_count {
                return false;
            }

            // Import gate. Same-file calls always pass.
            if caller.path == callee.path {
                return true;
            }
            if callee.package.contains('/') {
                return true;
            }
            imports_of_file
                .get(&caller.path)
                .map_or(false, |imports| {
                    imports.iter().any(|imp| import_matches(imp, &callee.package))
                })
        });

        let dropped = before - self.graph.edges.len();
        debug!(dropped, "filtered call edges");
        self.graph.rebuild_indexes();
        dropped
    }

    /// Verify that every surviving edge references known nodes. A
    /// violation is a programming bug in the builder, not user input.
    pub fn check_consistency(&self) -> Result<()> {
        for edge in &self.graph.edges {
            if !self.graph.nodes.contains_key(&edge.from) {
                return Err(CodemapError::BuilderConsistency(format!(
                    "edge {:?} from unknown node {}",
                    edge.kind, edge.from
                )));
            }
            if !self.graph.nodes.contains_key(&edge.to) {
                return Err(CodemapError::BuilderConsistency(format!(
                    "edge {:?} to unknown node {}",
                    edge.kind, edge.to
                )));
            }
        }
        Ok(())
    }

    /// Run resolution and filtering, verify invariants, hand back the
    /// finished graph.
    pub fn finish(mut self) -> Result<Graph> {
        self.resolve_call_edges();
        self.filter_call_edges();
        self.check_consistency()?;
        self.graph.refresh_counters();
        Ok(self.graph)
    }
}

/// Does an import string plausibly pull in package `pkg`?
///
/// Import paths come in several shapes (`fmt`, `github.com/x/p2`,
/// `pkg.mod`, `com.example.app.Thing`, `crate::store`, `b.h`), so a
/// handful of derivations are tried: the whole string, the last path
/// segment, that segment's stem, the last or first dotted segment, the
/// dotted prefix, and the last `::` segment.
fn import_matches(imp: &str, pkg: &str) -> bool {
    if imp == pkg {
        return true;
    }
    if let Some(last) = imp.rsplit('/').next() {
        if last == pkg {
            return true;
        }
        if let Some(stem) = last.split('.').next() {
            if stem == pkg {
                return true;
            }
        }
    }
    if let Some(last) = imp.rsplit('.').next() {
        if last == pkg {
            return true;
        }
    }
    if let Some((prefix, _)) = imp.rsplit_once('.') {
        if prefix == pkg {
            return true;
        }
    }
    if let Some(last) = imp.rsplit("::").next() {
        if last == pkg {
            return true;
        }
    }
    false
}
