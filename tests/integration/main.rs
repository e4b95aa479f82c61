//! End-to-end pipeline tests: scan → build → persist → query

use std::path::Path;

use codemap_core::{store, DetailLevel, EdgeKind, GraphBuilder, NodeId, NodeKind, QueryEngine};
use codemap_scanner as scanner;

fn build(root: &Path) -> codemap_core::Graph {
    let analyses = scanner::scan_for_deps(root, None, DetailLevel::Full).unwrap();
    let mut builder = GraphBuilder::new(&root.to_string_lossy());
    for analysis in &analyses {
        builder.ingest(analysis);
    }
    builder.finish().unwrap()
}

#[test]
fn go_file_produces_nodes_edges_and_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("foo.go"),
        "package x\nfunc A(i int) int { return B(i) }\nfunc B(i int) int { return i + 1 }\n",
    )
    .unwrap();

    let mut graph = build(dir.path());

    // One file node, two function nodes.
    assert!(graph.get_node(NodeId::for_file("foo.go")).is_some());
    let a = graph.get_node(NodeId::of("foo.go", "A")).unwrap();
    let b = graph.get_node(NodeId::of("foo.go", "B")).unwrap();
    assert_eq!(a.kind, NodeKind::Function);
    assert!(a.exported && b.exported);
    assert_eq!(a.param_count, 1);
    assert_eq!(b.param_count, 1);
    assert_eq!(a.line, 2);
    assert!(a.end_line >= a.line);

    let contains = graph
        .edges
        .iter()
        .filter(|e| e.kind == EdgeKind::Contains)
        .count();
    assert_eq!(contains, 2);

    let calls: Vec<_> = graph
        .edges
        .iter()
        .filter(|e| e.kind == EdgeKind::Calls)
        .collect();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].from, a.id);
    assert_eq!(calls[0].to, b.id);
    assert_eq!(calls[0].line, 2);
    assert_eq!(calls[0].arg_count, 1);

    // Persist and reload: same nodes, same edges, not stale.
    store::save(&mut graph, dir.path()).unwrap();
    let loaded = store::load(dir.path()).unwrap();
    assert_eq!(loaded.nodes, graph.nodes);
    assert_eq!(loaded.edges, graph.edges);
    assert_eq!(loaded.node_count, loaded.nodes.len());
    assert!(!store::is_stale(&loaded, dir.path()));
}

#[test]
fn builds_are_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("m.py"),
        "class C:\n    def go(self):\n        return run()\n\ndef run():\n    pass\n",
    )
    .unwrap();
    std::fs::write(dir.path().join("n.py"), "def other():\n    run()\n").unwrap();

    let first = build(dir.path());
    let second = build(dir.path());
    assert_eq!(first.nodes, second.nodes);
    assert_eq!(first.edges, second.edges);
}

#[test]
fn cross_file_calls_respect_the_import_gate() {
    // Caller does not import the callee's package: edge is dropped.
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("a.go"),
        "package p1\nfunc Caller() { F() }\n",
    )
    .unwrap();
    std::fs::write(dir.path().join("b.go"), "package p2\nfunc F() {}\n").unwrap();

    let graph = build(dir.path());
    assert!(graph.edges.iter().all(|e| e.kind != EdgeKind::Calls));

    // Same shape, with the import in place: edge survives.
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("a.go"),
        "package p1\nimport \"p2\"\nfunc Caller() { p2.F() }\n",
    )
    .unwrap();
    std::fs::write(dir.path().join("b.go"), "package p2\nfunc F() {}\n").unwrap();

    let graph = build(dir.path());
    let calls: Vec<_> = graph
        .edges
        .iter()
        .filter(|e| e.kind == EdgeKind::Calls)
        .collect();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].to, NodeId::of("b.go", "F"));
}

#[test]
fn incremental_update_leaves_untouched_files_alone() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("stable.go"),
        "package x\nfunc Stable() {}\n",
    )
    .unwrap();
    std::fs::write(
        dir.path().join("hot.go"),
        "package x\nfunc Hot() {}\n",
    )
    .unwrap();

    let mut graph = build(dir.path());
    store::save(&mut graph, dir.path()).unwrap();
    let before = store::load(dir.path()).unwrap();

    // Bump one file's mtime past last_indexed.
    let later = std::time::SystemTime::now() + std::time::Duration::from_secs(5);
    let f = std::fs::File::options()
        .write(true)
        .open(dir.path().join("hot.go"))
        .unwrap();
    f.set_modified(later).unwrap();
    drop(f);

    let modified = store::modified_files(&before, dir.path());
    assert_eq!(modified, vec!["hot.go".to_string()]);
    assert!(store::deleted_files(&before, dir.path()).is_empty());
    assert!(store::is_stale(&before, dir.path()));

    // Drop the changed file, rescan just it, rebuild on the trimmed graph.
    let mut trimmed = before.clone();
    for path in &modified {
        trimmed.remove_nodes_for_path(path);
    }
    let to_scan: Vec<_> = modified
        .iter()
        .filter_map(|p| scanner::walker::classify(dir.path(), p))
        .collect();
    let analyses = scanner::scan_files(dir.path(), &to_scan, DetailLevel::Full);
    let mut builder = GraphBuilder::with_graph(trimmed);
    for analysis in &analyses {
        builder.ingest(analysis);
    }
    let rebuilt = builder.finish().unwrap();

    // Unchanged content: the rebuilt graph matches the original.
    assert_eq!(rebuilt.nodes, before.nodes);
    assert_eq!(
        rebuilt.edges.len(),
        before.edges.len()
    );
    assert!(rebuilt.get_node(NodeId::of("stable.go", "Stable")).is_some());
    assert!(rebuilt.get_node(NodeId::of("hot.go", "Hot")).is_some());
}

#[test]
fn incremental_update_relinks_callers_of_changed_files() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("a.go"),
        "package p1\nimport \"p2\"\nfunc Caller() { p2.F() }\n",
    )
    .unwrap();
    std::fs::write(dir.path().join("b.go"), "package p2\nfunc F() {}\n").unwrap();

    let mut graph = build(dir.path());
    store::save(&mut graph, dir.path()).unwrap();
    assert_eq!(
        graph.edges.iter().filter(|e| e.kind == EdgeKind::Calls).count(),
        1
    );

    // Rewrite the callee file and bump its mtime past last_indexed.
    std::fs::write(
        dir.path().join("b.go"),
        "package p2\n\nfunc F() {}\n",
    )
    .unwrap();
    let later = std::time::SystemTime::now() + std::time::Duration::from_secs(5);
    let f = std::fs::File::options()
        .write(true)
        .open(dir.path().join("b.go"))
        .unwrap();
    f.set_modified(later).unwrap();
    drop(f);

    let modified = store::modified_files(&graph, dir.path());
    assert_eq!(modified, vec!["b.go".to_string()]);

    // The untouched caller loses its edge with the removed nodes...
    for path in &modified {
        graph.remove_nodes_for_path(path);
    }
    assert!(graph.edges.iter().all(|e| e.kind != EdgeKind::Calls));

    // ...and the per-file call accessor brings it back after rescan.
    let to_scan: Vec<_> = modified
        .iter()
        .filter_map(|p| scanner::walker::classify(dir.path(), p))
        .collect();
    let analyses = scanner::scan_files(dir.path(), &to_scan, DetailLevel::Full);
    let mut builder = GraphBuilder::with_graph(graph);
    for analysis in &analyses {
        builder.ingest(analysis);
    }
    let calls = scanner::extract_calls(dir.path(), "a.go").unwrap();
    builder.refresh_calls(&calls);
    let rebuilt = builder.finish().unwrap();

    let calls: Vec<_> = rebuilt
        .edges
        .iter()
        .filter(|e| e.kind == EdgeKind::Calls)
        .collect();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].from, NodeId::of("a.go", "Caller"));
    assert_eq!(calls[0].to, NodeId::of("b.go", "F"));
}

#[test]
fn deleted_files_disappear_from_the_graph() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("keep.go"), "package x\nfunc Keep() {}\n").unwrap();
    std::fs::write(dir.path().join("gone.go"), "package x\nfunc Gone() {}\n").unwrap();

    let mut graph = build(dir.path());
    store::save(&mut graph, dir.path()).unwrap();
    std::fs::remove_file(dir.path().join("gone.go")).unwrap();

    let deleted = store::deleted_files(&graph, dir.path());
    assert_eq!(deleted, vec!["gone.go".to_string()]);

    for path in &deleted {
        graph.remove_nodes_for_path(path);
    }
    assert!(graph.get_node(NodeId::of("gone.go", "Gone")).is_none());
    assert!(graph.get_node(NodeId::of("keep.go", "Keep")).is_some());
}

#[test]
fn empty_repository_yields_an_empty_graph() {
    let dir = tempfile::tempdir().unwrap();
    let mut graph = build(dir.path());
    assert_eq!(graph.nodes.len(), 0);
    assert_eq!(graph.edges.len(), 0);

    store::save(&mut graph, dir.path()).unwrap();
    let loaded = store::load(dir.path()).unwrap();
    assert_eq!(loaded.nodes.len(), 0);
}

#[test]
fn call_chain_paths_respect_depth_budgets() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("app.go"),
        "package x\nfunc main() { serve() }\nfunc serve() { handle() }\nfunc handle() { respond() }\nfunc respond() {}\n",
    )
    .unwrap();

    let graph = build(dir.path());
    let engine = QueryEngine::new(&graph);
    let from = NodeId::of("app.go", "main");
    let to = NodeId::of("app.go", "respond");

    let path = engine.find_path(from, to, 5).expect("path exists");
    assert_eq!(path.length, 3);
    assert_eq!(path.edges.len(), 3);
    assert!(path.edges.iter().all(|e| e.kind == EdgeKind::Calls));

    assert!(engine.find_path(from, to, 2).is_none());

    let callers = engine.callers(to, 10);
    assert_eq!(callers.len(), 3);
    assert_eq!(callers[0].node.name, "handle");
    assert_eq!(callers[0].depth, 1);
}

#[test]
fn broken_files_do_not_poison_the_scan() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("ok.go"), "package x\nfunc Fine() {}\n").unwrap();
    std::fs::write(dir.path().join("broken.go"), "package x\nfunc (((\n").unwrap();

    let graph = build(dir.path());
    assert!(graph.get_node(NodeId::of("ok.go", "Fine")).is_some());
}
