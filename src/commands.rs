//! CLI command implementations

use std::collections::HashSet;
use std::path::Path;
use std::str::FromStr;

use anyhow::{bail, Context};
use codemap_core::{
    store, CancelFlag, DetailLevel, EdgeKind, Graph, GraphBuilder, Node, NodeKind, QueryEngine,
};
use codemap_scanner as scanner;
use codemap_vector::{Embedder, EmbedderConfig, Retriever, SearchMode, VectorIndex};

/// Build the graph, or refresh it incrementally when one exists.
pub fn index(root: &Path, force: bool) -> anyhow::Result<()> {
    let root_name = root.to_string_lossy().to_string();

    if !force && store::exists(root) {
        let graph = store::load(root).context("loading existing graph")?;
        if !store::is_stale(&graph, root)
            && scanner::new_files(root, None, &graph.indexed_paths()).is_empty()
        {
            tracing::info!("graph is up to date");
            return Ok(());
        }
        return incremental(root, graph);
    }

    tracing::info!("indexing {}", root.display());
    let analyses = scanner::scan_for_deps(root, None, DetailLevel::Full)?;
    let mut builder = GraphBuilder::new(&root_name);
    for analysis in &analyses {
        builder.ingest(analysis);
    }
    let mut graph = builder.finish()?;
    let path = store::save(&mut graph, root)?;

    prune_vectors(root, &graph);
    tracing::info!(
        nodes = graph.node_count,
        edges = graph.edge_count,
        "graph saved to {}",
        path.display()
    );
    Ok(())
}

/// Incremental update: drop what changed, rescan the changed plus new
/// files, re-resolve and re-filter on top of the trimmed graph.
fn incremental(root: &Path, mut graph: Graph) -> anyhow::Result<()> {
    let modified = store::modified_files(&graph, root);
    let deleted = store::deleted_files(&graph, root);
    let new = scanner::new_files(root, None, &graph.indexed_paths());

    tracing::info!(
        modified = modified.len(),
        deleted = deleted.len(),
        new = new.len(),
        "incremental update"
    );

    // Untouched files calling into a changed file are about to lose
    // those edges along with the removed nodes; remember them so their
    // call sites can be re-extracted and re-linked.
    let changed: HashSet<&str> = modified
        .iter()
        .chain(deleted.iter())
        .map(|s| s.as_str())
        .collect();
    let mut affected: Vec<String> = Vec::new();
    for edge in &graph.edges {
        if edge.kind != EdgeKind::Calls {
            continue;
        }
        let (Some(from), Some(to)) = (graph.get_node(edge.from), graph.get_node(edge.to)) else {
            continue;
        };
        if changed.contains(to.path.as_str()) && !changed.contains(from.path.as_str()) {
            affected.push(from.path.clone());
        }
    }
    affected.sort();
    affected.dedup();

    for path in modified.iter().chain(deleted.iter()) {
        graph.remove_nodes_for_path(path);
    }

    let mut to_scan: Vec<(String, scanner::Lang)> = new;
    for rel in &modified {
        if let Some(pair) = scanner::walker::classify(root, rel) {
            to_scan.push(pair);
        }
    }
    to_scan.sort();
    to_scan.dedup_by(|a, b| a.0 == b.0);

    let analyses = scanner::scan_files(root, &to_scan, DetailLevel::Full);
    let mut builder = GraphBuilder::with_graph(graph);
    for analysis in &analyses {
        builder.ingest(analysis);
    }
    for rel in &affected {
        match scanner::extract_calls(root, rel) {
            Ok(calls) => builder.refresh_calls(&calls),
            Err(e) => tracing::warn!(path = %rel, "could not re-link calls: {e}"),
        }
    }
    let mut graph = builder.finish()?;
    store::save(&mut graph, root)?;

    prune_vectors(root, &graph);
    tracing::info!(
        nodes = graph.node_count,
        edges = graph.edge_count,
        "graph updated"
    );
    Ok(())
}

/// Keep the vector index consistent with the graph after a rebuild.
fn prune_vectors(root: &Path, graph: &Graph) {
    if !VectorIndex::exists(root) {
        return;
    }
    let mut index = VectorIndex::load_or_default(root);
    let pruned = index.prune_orphans(graph);
    if pruned > 0 {
        tracing::info!(pruned, "removed orphan vectors");
        if let Err(e) = index.save(root) {
            tracing::warn!("could not save vector index: {e}");
        }
    }
}

pub async fn search(
    root: &Path,
    query: &str,
    mode: &str,
    limit: usize,
    expand: bool,
) -> anyhow::Result<()> {
    let mode = SearchMode::from_str(mode).map_err(|e| anyhow::anyhow!(e))?;
    let graph = load_graph(root)?;
    let index = VectorIndex::load_or_default(root);

    let client = match mode {
        SearchMode::Graph => None,
        _ => {
            let config = codemap_ai::LlmConfig::from_env();
            match codemap_ai::create_client(&config) {
                Ok(client) => Some(client),
                Err(e) => {
                    tracing::warn!("no LLM client, using graph mode: {e}");
                    None
                }
            }
        }
    };

    let retriever = Retriever {
        expand_context: expand,
        ..Default::default()
    };
    let results = retriever
        .search(
            query,
            limit,
            mode,
            &graph,
            &index,
            client.as_ref(),
            Some(root),
        )
        .await?;

    if results.is_empty() {
        println!("no results");
        return Ok(());
    }
    for (i, r) in results.iter().enumerate() {
        println!(
            "{:2}. {} {} ({}:{}) score={:.4} vector={:.3} graph={:.3} {}",
            i + 1,
            r.node.kind.as_str(),
            r.node.name,
            r.node.path,
            r.node.line,
            r.score,
            r.vector_score,
            r.graph_score,
            r.match_kind,
        );
        if let Some(signature) = &r.node.signature {
            println!("      {signature}");
        }
        if !r.callers.is_empty() {
            println!("      called by: {}", r.callers.join(", "));
        }
        if !r.callees.is_empty() {
            println!("      calls: {}", r.callees.join(", "));
        }
        if let Some(snippet) = &r.snippet {
            for line in snippet.lines().take(6) {
                println!("      | {line}");
            }
        }
    }
    Ok(())
}

pub fn path(root: &Path, from: &str, to: &str, max_depth: usize) -> anyhow::Result<()> {
    let graph = load_graph(root)?;
    let from_node = resolve_symbol(&graph, from)?;
    let to_node = resolve_symbol(&graph, to)?;

    let engine = QueryEngine::new(&graph);
    match engine.find_path(from_node.id, to_node.id, max_depth) {
        Some(result) => {
            println!("path of length {}:", result.length);
            for (i, node) in result.nodes.iter().enumerate() {
                if i > 0 {
                    let edge = &result.edges[i - 1];
                    println!("    --{:?}-->", edge.kind);
                }
                println!("  {} ({}:{})", node.name, node.path, node.line);
            }
        }
        None => println!(
            "no path from '{}' to '{}' within {} hops",
            from_node.name, to_node.name, max_depth
        ),
    }
    Ok(())
}

pub fn neighbors(root: &Path, name: &str, depth: usize, incoming: bool) -> anyhow::Result<()> {
    let graph = load_graph(root)?;
    let node = resolve_symbol(&graph, name)?;
    let engine = QueryEngine::new(&graph);

    let hits = if incoming {
        engine.callers(node.id, depth)
    } else {
        engine.callees(node.id, depth)
    };
    let what = if incoming { "callers" } else { "callees" };

    if hits.is_empty() {
        println!("no {what} of '{}'", node.name);
        return Ok(());
    }
    println!("{what} of '{}':", node.name);
    for hit in hits {
        println!(
            "  {}{} ({}:{})",
            "  ".repeat(hit.depth - 1),
            hit.node.name,
            hit.node.path,
            hit.node.line
        );
    }
    Ok(())
}

/// Explain one symbol with its direct call graph, going through the
/// response cache keyed on the symbol's content hash.
pub async fn explain(root: &Path, name: &str, no_cache: bool) -> anyhow::Result<()> {
    let graph = load_graph(root)?;
    let node = resolve_symbol(&graph, name)?;

    let source = scanner::read_span(root, &node.path, node.line, node.end_line)
        .with_context(|| format!("reading source of {}", node.path))?;
    let content_hash = node
        .content_hash
        .clone()
        .unwrap_or_else(|| codemap_core::content_hash(source.as_bytes()));

    let config = codemap_ai::LlmConfig::from_env();
    let cache = codemap_ai::ResponseCache::new(store::cache_dir(root));
    let key = codemap_ai::ResponseCache::key(&content_hash, "explain", &config.model);

    if !no_cache {
        if let Some(hit) = cache.get(&key) {
            tracing::debug!("explain served from cache");
            println!("{}", hit.content);
            return Ok(());
        }
    }

    let callers: Vec<String> = graph
        .get_callers(node.id)
        .iter()
        .map(|n| n.name.clone())
        .collect();
    let callees: Vec<String> = graph
        .get_callees(node.id)
        .iter()
        .map(|n| n.name.clone())
        .collect();
    let symbol = codemap_ai::SymbolSource {
        name: node.name.clone(),
        language: language_of(&node.path),
        signature: node.signature.clone(),
        doc: node.doc_string.clone(),
        source,
    };
    let messages = codemap_ai::call_graph_explain_prompt(&symbol, &callers, &callees);

    let client = codemap_ai::create_client(&config)?;
    let completion = client
        .complete(codemap_ai::CompletionRequest::new(messages))
        .await?;

    cache.put(&key, "explain", &completion.model, &completion.content);
    println!("{}", completion.content);
    Ok(())
}

/// Summarize every indexed file under a directory prefix.
pub async fn summarize(root: &Path, module: &str) -> anyhow::Result<()> {
    let graph = load_graph(root)?;
    let prefix = module.trim_end_matches('/');

    let mut sources: Vec<(String, String)> = Vec::new();
    for path in graph.indexed_paths() {
        if path == prefix || path.starts_with(&format!("{prefix}/")) {
            if let Ok(source) = scanner::read_span(root, &path, 0, 0) {
                sources.push((path, source));
            }
        }
    }
    if sources.is_empty() {
        bail!("no indexed files under '{module}'");
    }

    let combined_hash = {
        let mut all = String::new();
        for (_, source) in &sources {
            all.push_str(source);
        }
        codemap_core::content_hash(all.as_bytes())
    };

    let config = codemap_ai::LlmConfig::from_env();
    let cache = codemap_ai::ResponseCache::new(store::cache_dir(root));
    let key = codemap_ai::ResponseCache::key(&combined_hash, "summarize", &config.model);
    if let Some(hit) = cache.get(&key) {
        tracing::debug!("summary served from cache");
        println!("{}", hit.content);
        return Ok(());
    }

    let messages = codemap_ai::summarize_module_prompt(prefix, &sources);
    let client = codemap_ai::create_client(&config)?;
    let completion = client
        .complete(codemap_ai::CompletionRequest::new(messages))
        .await?;

    cache.put(&key, "summarize", &completion.model, &completion.content);
    println!("{}", completion.content);
    Ok(())
}

fn language_of(path: &str) -> String {
    scanner::detect_language(Path::new(path))
        .map(|l| l.name().to_string())
        .unwrap_or_default()
}

pub async fn embed(
    root: &Path,
    force: bool,
    batch_size: usize,
    with_source: bool,
) -> anyhow::Result<()> {
    let graph = load_graph(root)?;
    let mut index = VectorIndex::load_or_default(root);

    let config = codemap_ai::LlmConfig::from_env();
    let client = codemap_ai::create_client(&config)?;
    tracing::info!(provider = client.name(), "embedding with {}", config.embedding_model);

    let embedder = Embedder::new(
        client,
        EmbedderConfig {
            batch_size,
            force,
            include_source: with_source,
            ..Default::default()
        },
    );
    let stats = embedder
        .embed_graph(&graph, &mut index, Some(root), &CancelFlag::new())
        .await?;
    index.save(root)?;

    println!(
        "embedded {} of {} nodes ({} skipped, {} failed) in {}ms, {} prompt tokens",
        stats.embedded, stats.total, stats.skipped, stats.failed, stats.duration_ms, stats.tokens_in
    );
    Ok(())
}

pub fn stats(root: &Path) -> anyhow::Result<()> {
    let graph = load_graph(root)?;
    let stats = graph.stats();

    println!("root: {}", graph.root_path);
    if graph.last_indexed > 0 {
        if let Some(ts) = chrono::DateTime::from_timestamp(graph.last_indexed, 0) {
            println!("last indexed: {}", ts.to_rfc3339());
        }
    }
    println!("nodes: {}", stats.total_nodes);
    println!("edges: {}", stats.total_edges);
    println!("files: {}", stats.file_count);
    println!("functions: {}", stats.function_count);
    for (kind, count) in &stats.by_kind {
        println!("  {kind}: {count}");
    }
    if VectorIndex::exists(root) {
        let index = VectorIndex::load_or_default(root);
        println!(
            "vectors: {} (dimension {})",
            index.count(),
            index.dimension()
        );
    }
    Ok(())
}

pub fn clear(root: &Path) -> anyhow::Result<()> {
    store::clear(root)?;
    tracing::info!("removed {}", store::codemap_dir(root).display());
    Ok(())
}

fn load_graph(root: &Path) -> anyhow::Result<Graph> {
    if !store::exists(root) {
        bail!(
            "no graph at {}; run `codemap index` first",
            store::graph_path(root).display()
        );
    }
    Ok(store::load(root)?)
}

/// Look a symbol up by exact name first, then substring; ambiguity
/// resolves to the first match in id order.
fn resolve_symbol<'g>(graph: &'g Graph, name: &str) -> anyhow::Result<&'g Node> {
    let symbol_kinds = |n: &&Node| {
        matches!(
            n.kind,
            NodeKind::Function | NodeKind::Method | NodeKind::Type
        )
    };
    let exact: Vec<&Node> = graph
        .nodes_named(name)
        .into_iter()
        .filter(|n| symbol_kinds(n))
        .collect();
    if let Some(node) = exact.first() {
        if exact.len() > 1 {
            tracing::warn!("'{name}' is ambiguous ({} matches), using {}", exact.len(), node.path);
        }
        return Ok(node);
    }
    let fuzzy = graph.find_nodes_by_name(name, None);
    fuzzy
        .into_iter()
        .find(symbol_kinds)
        .ok_or_else(|| anyhow::anyhow!("no symbol named '{name}' in the graph"))
}
