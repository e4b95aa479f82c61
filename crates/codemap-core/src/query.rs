//! Structural queries: path finding, caller/callee traversal, lookup

use std::collections::{HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::graph::Graph;
use crate::model::{Edge, EdgeKind, Node, NodeId, NodeKind};

/// A path through the graph, as returned by `find_path`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathResult {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    /// Hop count; `nodes.len() - 1`.
    pub length: usize,
}

/// One node reached by a caller/callee traversal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraversalHit {
    pub node: Node,
    pub depth: usize,
}

/// Read-only query surface over a loaded graph.
pub struct QueryEngine<'g> {
    graph: &'g Graph,
}

impl<'g> QueryEngine<'g> {
    pub fn new(graph: &'g Graph) -> Self {
        QueryEngine { graph }
    }

    /// Substring lookup over node names, optionally filtered by kind.
    pub fn find_by_pattern(&self, pattern: &str, kind: Option<NodeKind>) -> Vec<&'g Node> {
        self.graph.find_nodes_by_name(pattern, kind)
    }

    pub fn outgoing(&self, id: NodeId) -> Vec<&'g Edge> {
        self.graph.get_outgoing(id)
    }

    pub fn incoming(&self, id: NodeId) -> Vec<&'g Edge> {
        self.graph.get_incoming(id)
    }

    /// Breadth-first shortest path on the directed graph, bounded by
    /// `max_depth` hops. Ties break by edge insertion order; the first
    /// path found wins. `from == to` yields a zero-length path.
    pub fn find_path(&self, from: NodeId, to: NodeId, max_depth: usize) -> Option<PathResult> {
        let start = self.graph.get_node(from)?;
        self.graph.get_node(to)?;

        if from == to {
            return Some(PathResult {
                nodes: vec![start.clone()],
                edges: Vec::new(),
                length: 0,
            });
        }

        // predecessor: node -> (previous node, edge taken)
        let mut pred: HashMap<NodeId, (NodeId, Edge)> = HashMap::new();
        let mut depth: HashMap<NodeId, usize> = HashMap::new();
        let mut queue = VecDeque::new();
        depth.insert(from, 0);
        queue.push_back(from);

        while let Some(current) = queue.pop_front() {
            let d = depth[&current];
            if d >= max_depth {
                continue;
            }
            for edge in self.graph.get_outgoing(current) {
                if depth.contains_key(&edge.to) {
                    continue;
                }
                depth.insert(edge.to, d + 1);
                pred.insert(edge.to, (current, edge.clone()));
                if edge.to == to {
                    return Some(self.unwind(from, to, &pred));
                }
                queue.push_back(edge.to);
            }
        }
        None
    }

    fn unwind(
        &self,
        from: NodeId,
        to: NodeId,
        pred: &HashMap<NodeId, (NodeId, Edge)>,
    ) -> PathResult {
        let mut nodes = Vec::new();
        let mut edges = Vec::new();
        let mut current = to;
        while current != from {
            let (prev, edge) = &pred[&current];
            if let Some(node) = self.graph.get_node(current) {
                nodes.push(node.clone());
            }
            edges.push(edge.clone());
            current = *prev;
        }
        if let Some(node) = self.graph.get_node(from) {
            nodes.push(node.clone());
        }
        nodes.reverse();
        edges.reverse();
        PathResult {
            length: edges.len(),
            nodes,
            edges,
        }
    }

    /// Transitive callers of `id`, breadth-first over `Calls` edges,
    /// up to `depth` hops. The root itself is not included.
    pub fn callers(&self, id: NodeId, depth: usize) -> Vec<TraversalHit> {
        self.traverse_calls(id, depth, Direction::Incoming)
    }

    /// Transitive callees of `id`, breadth-first over `Calls` edges.
    pub fn callees(&self, id: NodeId, depth: usize) -> Vec<TraversalHit> {
        self.traverse_calls(id, depth, Direction::Outgoing)
    }

    fn traverse_calls(&self, id: NodeId, depth: usize, dir: Direction) -> Vec<TraversalHit> {
        let mut hits = Vec::new();
        let mut seen: HashSet<NodeId> = HashSet::new();
        seen.insert(id);
        let mut queue = VecDeque::new();
        queue.push_back((id, 0usize));

        while let Some((current, d)) = queue.pop_front() {
            if d >= depth {
                continue;
            }
            let edges = match dir {
                Direction::Outgoing => self.graph.get_outgoing(current),
                Direction::Incoming => self.graph.get_incoming(current),
            };
            for edge in edges {
                if edge.kind != EdgeKind::Calls {
                    continue;
                }
                let next = match dir {
                    Direction::Outgoing => edge.to,
                    Direction::Incoming => edge.from,
                };
                if !seen.insert(next) {
                    continue;
                }
                if let Some(node) = self.graph.get_node(next) {
                    hits.push(TraversalHit {
                        node: node.clone(),
                        depth: d + 1,
                    });
                }
                queue.push_back((next, d + 1));
            }
        }
        hits
    }
}

#[derive(Clone, Copy)]
enum Direction {
    Outgoing,
    Incoming,
}
