//! Unit tests for codemap-core

use crate::analysis::{CallInfo, FileAnalysis, FuncInfo, TypeInfo, TypeMarker};
use crate::builder::GraphBuilder;
use crate::graph::Graph;
use crate::model::{Edge, EdgeKind, Node, NodeId, NodeKind};
use crate::query::QueryEngine;
use crate::store;

fn func(name: &str, line: u32, end_line: u32, param_count: i32) -> FuncInfo {
    FuncInfo {
        name: name.to_string(),
        line,
        end_line,
        param_count,
        exported: true,
        signature: format!("func {name}()"),
        ..Default::default()
    }
}

fn call(caller: &str, callee: &str, line: u32, arg_count: i32) -> CallInfo {
    CallInfo {
        caller: caller.to_string(),
        callee: callee.to_string(),
        line,
        arg_count,
        ..Default::default()
    }
}

#[test]
fn node_ids_are_deterministic() {
    let a = NodeId::of("src/foo.go", "A");
    let b = NodeId::of("src/foo.go", "A");
    assert_eq!(a, b);

    assert_ne!(a, NodeId::of("src/foo.go", "B"));
    assert_ne!(a, NodeId::of("src/bar.go", "A"));

    // The separator keeps (path, name) unambiguous.
    assert_ne!(NodeId::of("ab", "c"), NodeId::of("a", "bc"));
}

#[test]
fn file_and_package_ids_use_empty_symbol() {
    assert_eq!(NodeId::for_file("foo.go"), NodeId::of("foo.go", ""));
    assert_eq!(NodeId::for_package("fmt"), NodeId::of("fmt", ""));
    assert_eq!(NodeId::placeholder("B"), NodeId::of("", "B"));
}

#[test]
fn add_node_is_idempotent_and_merges_optionals() {
    let mut graph = Graph::new(".");
    let mut first = Node::new(NodeKind::Function, "f", "a.go");
    first.line = 3;
    graph.add_node(first);

    let mut second = Node::new(NodeKind::Function, "f", "a.go");
    second.line = 99;
    second.signature = Some("func f()".to_string());
    graph.add_node(second);

    assert_eq!(graph.nodes.len(), 1);
    let stored = graph.get_node(NodeId::of("a.go", "f")).unwrap();
    // Required fields are never overwritten, optionals are filled in.
    assert_eq!(stored.line, 3);
    assert_eq!(stored.signature.as_deref(), Some("func f()"));
}

#[test]
fn rebuild_indexes_is_sound() {
    let mut graph = Graph::new(".");
    for name in ["alpha", "beta"] {
        graph.add_node(Node::new(NodeKind::Function, name, "a.go"));
    }
    graph.add_edge(Edge::new(
        NodeId::of("a.go", "alpha"),
        NodeId::of("a.go", "beta"),
        EdgeKind::Calls,
    ));
    graph.rebuild_indexes();

    for node in graph.nodes.values() {
        assert!(graph.nodes_at_path(&node.path).iter().any(|n| n.id == node.id));
        assert!(graph.nodes_named(&node.name).iter().any(|n| n.id == node.id));
    }
    assert_eq!(graph.get_outgoing(NodeId::of("a.go", "alpha")).len(), 1);
    assert_eq!(graph.get_incoming(NodeId::of("a.go", "beta")).len(), 1);
}

#[test]
fn remove_nodes_for_path_drops_touching_edges() {
    let mut graph = Graph::new(".");
    graph.add_node(Node::new(NodeKind::Function, "a", "a.go"));
    graph.add_node(Node::new(NodeKind::Function, "b", "b.go"));
    graph.add_edge(Edge::new(
        NodeId::of("a.go", "a"),
        NodeId::of("b.go", "b"),
        EdgeKind::Calls,
    ));

    let removed = graph.remove_nodes_for_path("b.go");
    assert_eq!(removed, 1);
    assert!(graph.edges.is_empty());
    assert!(graph.get_node(NodeId::of("a.go", "a")).is_some());
}

/// Single Go file with two functions and one in-file call.
#[test]
fn builder_links_in_file_calls() {
    let analysis = FileAnalysis {
        path: "foo.go".to_string(),
        language: "go".to_string(),
        package: "x".to_string(),
        functions: vec![func("A", 2, 2, 1), func("B", 3, 3, 1)],
        calls: vec![call("A", "B", 2, 1)],
        ..Default::default()
    };

    let mut builder = GraphBuilder::new(".");
    builder.ingest(&analysis);
    let graph = builder.finish().unwrap();

    assert!(graph.get_node(NodeId::for_file("foo.go")).is_some());
    assert!(graph.get_node(NodeId::of("foo.go", "A")).is_some());
    assert!(graph.get_node(NodeId::of("foo.go", "B")).is_some());

    let contains: Vec<_> = graph
        .edges
        .iter()
        .filter(|e| e.kind == EdgeKind::Contains)
        .collect();
    assert_eq!(contains.len(), 2);

    let calls: Vec<_> = graph
        .edges
        .iter()
        .filter(|e| e.kind == EdgeKind::Calls)
        .collect();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].from, NodeId::of("foo.go", "A"));
    assert_eq!(calls[0].to, NodeId::of("foo.go", "B"));
    assert_eq!(calls[0].line, 2);
    assert_eq!(calls[0].arg_count, 1);
}

#[test]
fn arity_gate_drops_mismatched_calls() {
    let analysis = FileAnalysis {
        path: "foo.go".to_string(),
        language: "go".to_string(),
        package: "x".to_string(),
        functions: vec![func("A", 2, 2, 1), func("B", 3, 3, 1)],
        // B takes one parameter but the site passes two.
        calls: vec![call("A", "B", 2, 2)],
        ..Default::default()
    };

    let mut builder = GraphBuilder::new(".");
    builder.ingest(&analysis);
    let graph = builder.finish().unwrap();

    assert!(graph.edges.iter().all(|e| e.kind != EdgeKind::Calls));
}

#[test]
fn variadic_callee_passes_arity_gate() {
    let mut a = func("A", 2, 2, 0);
    a.param_count = 0;
    let mut b = func("B", 3, 3, -1);
    b.param_count = -1;
    let analysis = FileAnalysis {
        path: "foo.go".to_string(),
        language: "go".to_string(),
        package: "x".to_string(),
        functions: vec![a, b],
        calls: vec![call("A", "B", 2, 7)],
        ..Default::default()
    };

    let mut builder = GraphBuilder::new(".");
    builder.ingest(&analysis);
    let graph = builder.finish().unwrap();
    assert_eq!(
        graph.edges.iter().filter(|e| e.kind == EdgeKind::Calls).count(),
        1
    );
}

fn cross_file_pair(with_import: bool) -> Graph {
    let caller = FileAnalysis {
        path: "a.go".to_string(),
        language: "go".to_string(),
        package: "p1".to_string(),
        functions: vec![func("Caller", 2, 4, 0)],
        imports: if with_import {
            vec!["p2".to_string()]
        } else {
            Vec::new()
        },
        calls: vec![call("Caller", "F", 3, 0)],
        ..Default::default()
    };
    let callee = FileAnalysis {
        path: "b.go".to_string(),
        language: "go".to_string(),
        package: "p2".to_string(),
        functions: vec![func("F", 2, 2, 0)],
        ..Default::default()
    };

    let mut builder = GraphBuilder::new(".");
    builder.ingest(&caller);
    builder.ingest(&callee);
    builder.finish().unwrap()
}

#[test]
fn import_gate_requires_an_import() {
    let graph = cross_file_pair(false);
    assert!(graph.edges.iter().all(|e| e.kind != EdgeKind::Calls));

    let graph = cross_file_pair(true);
    let calls: Vec<_> = graph
        .edges
        .iter()
        .filter(|e| e.kind == EdgeKind::Calls)
        .collect();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].to, NodeId::of("b.go", "F"));
}

#[test]
fn resolution_prefers_same_package_candidates() {
    let caller = FileAnalysis {
        path: "a.go".to_string(),
        language: "go".to_string(),
        package: "p1".to_string(),
        functions: vec![func("Caller", 2, 4, 0)],
        calls: vec![call("Caller", "Helper", 3, 0)],
        ..Default::default()
    };
    let same_package = FileAnalysis {
        path: "b.go".to_string(),
        language: "go".to_string(),
        package: "p1".to_string(),
        functions: vec![func("Helper", 2, 3, 0)],
        ..Default::default()
    };
    let other_package = FileAnalysis {
        path: "c.go".to_string(),
        language: "go".to_string(),
        package: "p2".to_string(),
        functions: vec![func("Helper", 2, 3, 0)],
        ..Default::default()
    };

    let mut builder = GraphBuilder::new(".");
    builder.ingest(&other_package);
    builder.ingest(&same_package);
    builder.ingest(&caller);
    builder.resolve_call_edges();

    let calls: Vec<_> = builder
        .graph()
        .edges
        .iter()
        .filter(|e| e.kind == EdgeKind::Calls)
        .collect();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].to, NodeId::of("b.go", "Helper"));
}

#[test]
fn refresh_calls_relinks_after_target_removal() {
    let caller = FileAnalysis {
        path: "a.go".to_string(),
        language: "go".to_string(),
        package: "p1".to_string(),
        functions: vec![func("Caller", 2, 4, 0)],
        imports: vec!["p2".to_string()],
        calls: vec![call("Caller", "F", 3, 0)],
        ..Default::default()
    };
    let callee = FileAnalysis {
        path: "b.go".to_string(),
        language: "go".to_string(),
        package: "p2".to_string(),
        functions: vec![func("F", 2, 2, 0)],
        ..Default::default()
    };

    let mut builder = GraphBuilder::new(".");
    builder.ingest(&caller);
    builder.ingest(&callee);
    let mut graph = builder.finish().unwrap();
    assert_eq!(
        graph.edges.iter().filter(|e| e.kind == EdgeKind::Calls).count(),
        1
    );

    // The callee file changes: its nodes go, and the caller's edge
    // into them goes too.
    graph.remove_nodes_for_path("b.go");
    assert!(graph.edges.iter().all(|e| e.kind != EdgeKind::Calls));

    // Rescan the callee, then re-link the untouched caller from a
    // per-file call extraction.
    let mut builder = GraphBuilder::with_graph(graph);
    builder.ingest(&callee);
    builder.refresh_calls(&crate::analysis::CallAnalysis {
        path: "a.go".to_string(),
        calls: vec![call("Caller", "F", 3, 0)],
    });
    let graph = builder.finish().unwrap();

    let calls: Vec<_> = graph
        .edges
        .iter()
        .filter(|e| e.kind == EdgeKind::Calls)
        .collect();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].from, NodeId::of("a.go", "Caller"));
    assert_eq!(calls[0].to, NodeId::of("b.go", "F"));
}

#[test]
fn refresh_calls_does_not_duplicate_surviving_edges() {
    let analysis = FileAnalysis {
        path: "foo.go".to_string(),
        language: "go".to_string(),
        package: "x".to_string(),
        functions: vec![func("A", 2, 2, 1), func("B", 3, 3, 1)],
        calls: vec![call("A", "B", 2, 1)],
        ..Default::default()
    };

    let mut builder = GraphBuilder::new(".");
    builder.ingest(&analysis);
    builder.refresh_calls(&crate::analysis::CallAnalysis {
        path: "foo.go".to_string(),
        calls: vec![call("A", "B", 2, 1)],
    });
    let graph = builder.finish().unwrap();
    assert_eq!(
        graph.edges.iter().filter(|e| e.kind == EdgeKind::Calls).count(),
        1
    );
}

#[test]
fn unresolved_externals_are_pruned() {
    let analysis = FileAnalysis {
        path: "foo.go".to_string(),
        language: "go".to_string(),
        package: "x".to_string(),
        functions: vec![func("A", 2, 2, 0)],
        calls: vec![call("A", "Nowhere", 2, 0)],
        ..Default::default()
    };

    let mut builder = GraphBuilder::new(".");
    builder.ingest(&analysis);
    let graph = builder.finish().unwrap();
    assert!(graph.edges.iter().all(|e| e.kind != EdgeKind::Calls));
}

fn chain_graph() -> Graph {
    let mut graph = Graph::new(".");
    for name in ["main", "serve", "handle", "respond"] {
        let mut n = Node::new(NodeKind::Function, name, "app.go");
        n.param_count = -1;
        graph.add_node(n);
    }
    for (from, to) in [("main", "serve"), ("serve", "handle"), ("handle", "respond")] {
        graph.add_edge(Edge::new(
            NodeId::of("app.go", from),
            NodeId::of("app.go", to),
            EdgeKind::Calls,
        ));
    }
    graph.rebuild_indexes();
    graph
}

#[test]
fn find_path_walks_the_chain() {
    let graph = chain_graph();
    let engine = QueryEngine::new(&graph);
    let from = NodeId::of("app.go", "main");
    let to = NodeId::of("app.go", "respond");

    let path = engine.find_path(from, to, 5).unwrap();
    assert_eq!(path.length, 3);
    assert_eq!(path.nodes.len(), 4);
    assert_eq!(path.edges.len(), 3);
    assert_eq!(path.nodes[0].name, "main");
    assert_eq!(path.nodes[3].name, "respond");
}

#[test]
fn find_path_respects_max_depth() {
    let graph = chain_graph();
    let engine = QueryEngine::new(&graph);
    let from = NodeId::of("app.go", "main");
    let to = NodeId::of("app.go", "respond");
    assert!(engine.find_path(from, to, 2).is_none());
}

#[test]
fn find_path_to_self_is_zero_length() {
    let graph = chain_graph();
    let engine = QueryEngine::new(&graph);
    let id = NodeId::of("app.go", "main");
    let path = engine.find_path(id, id, 3).unwrap();
    assert_eq!(path.length, 0);
    assert_eq!(path.nodes.len(), 1);
    assert!(path.edges.is_empty());
}

#[test]
fn callers_and_callees_respect_depth() {
    let graph = chain_graph();
    let engine = QueryEngine::new(&graph);
    let handle = NodeId::of("app.go", "handle");

    let callers = engine.callers(handle, 1);
    assert_eq!(callers.len(), 1);
    assert_eq!(callers[0].node.name, "serve");

    let callers = engine.callers(handle, 5);
    assert_eq!(callers.len(), 2);

    let callees = engine.callees(NodeId::of("app.go", "main"), 2);
    let names: Vec<_> = callees.iter().map(|h| h.node.name.as_str()).collect();
    assert_eq!(names, vec!["serve", "handle"]);
}

#[test]
fn save_load_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let mut graph = chain_graph();

    store::save(&mut graph, dir.path()).unwrap();
    assert!(store::exists(dir.path()));
    assert_eq!(graph.node_count, graph.nodes.len());
    assert_eq!(graph.edge_count, graph.edges.len());

    let loaded = store::load(dir.path()).unwrap();
    assert_eq!(loaded.nodes, graph.nodes);
    assert_eq!(loaded.edges, graph.edges);
    assert_eq!(loaded.last_indexed, graph.last_indexed);
    // Indexes come back after load.
    assert!(!loaded.nodes_at_path("app.go").is_empty());
}

#[test]
fn load_rejects_garbage() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(store::codemap_dir(dir.path())).unwrap();
    std::fs::write(store::graph_path(dir.path()), b"not a graph").unwrap();
    assert!(store::load(dir.path()).is_err());
}

#[test]
fn stale_detection_tracks_modifications_and_deletions() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("app.go");
    std::fs::write(&file, "package x\n").unwrap();

    let mut graph = Graph::new(".");
    graph.add_node(Node::new(NodeKind::File, "app.go", "app.go"));
    // Package nodes have no extension and must be skipped.
    let mut pkg = Node::new(NodeKind::Package, "fmt", "fmt");
    pkg.id = NodeId::for_package("fmt");
    graph.add_node(pkg);
    store::save(&mut graph, dir.path()).unwrap();

    assert!(!store::is_stale(&graph, dir.path()));
    assert!(store::modified_files(&graph, dir.path()).is_empty());

    // Push the mtime past last_indexed.
    let later = std::time::SystemTime::now() + std::time::Duration::from_secs(5);
    let f = std::fs::File::options().write(true).open(&file).unwrap();
    f.set_modified(later).unwrap();
    drop(f);

    assert!(store::is_stale(&graph, dir.path()));
    assert_eq!(
        store::modified_files(&graph, dir.path()),
        vec!["app.go".to_string()]
    );

    std::fs::remove_file(&file).unwrap();
    assert_eq!(
        store::deleted_files(&graph, dir.path()),
        vec!["app.go".to_string()]
    );
}

#[test]
fn func_info_round_trips_in_both_shapes() {
    let bare = FuncInfo::named("A");
    let json = serde_json::to_string(&bare).unwrap();
    assert_eq!(json, "\"A\"");
    let back: FuncInfo = serde_json::from_str(&json).unwrap();
    assert_eq!(back, bare);

    let full = func("B", 3, 9, 2);
    let json = serde_json::to_string(&full).unwrap();
    assert!(json.starts_with('{'));
    let back: FuncInfo = serde_json::from_str(&json).unwrap();
    assert_eq!(back, full);
}

#[test]
fn type_info_serializes_markers_lowercase() {
    let t = TypeInfo {
        name: "Config".to_string(),
        marker: TypeMarker::Struct,
        line: 1,
        end_line: 4,
        doc: String::new(),
        exported: true,
        fields: Vec::new(),
        methods: Vec::new(),
    };
    let json = serde_json::to_string(&t).unwrap();
    assert!(json.contains("\"struct\""));
}

#[test]
fn stats_counts_by_kind() {
    let graph = chain_graph();
    let stats = graph.stats();
    assert_eq!(stats.total_nodes, 4);
    assert_eq!(stats.total_edges, 3);
    assert_eq!(stats.function_count, 4);
    assert_eq!(stats.by_kind.get("function"), Some(&4));
}
