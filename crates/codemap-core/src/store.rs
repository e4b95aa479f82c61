//! Durable persistence for the graph under `<root>/.codemap/`

use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use tracing::debug;

use crate::error::{CodemapError, Result};
use crate::graph::Graph;

/// Directory holding all persisted artifacts.
pub const CODEMAP_DIR: &str = ".codemap";

/// Graph file name.
pub const GRAPH_FILE: &str = "graph.bin";

/// Vector index file name.
pub const VECTORS_FILE: &str = "vectors.bin";

/// LLM response cache directory name.
pub const CACHE_DIR: &str = "cache";

pub fn codemap_dir(root: &Path) -> PathBuf {
    root.join(CODEMAP_DIR)
}

pub fn graph_path(root: &Path) -> PathBuf {
    codemap_dir(root).join(GRAPH_FILE)
}

pub fn vectors_path(root: &Path) -> PathBuf {
    codemap_dir(root).join(VECTORS_FILE)
}

pub fn cache_dir(root: &Path) -> PathBuf {
    codemap_dir(root).join(CACHE_DIR)
}

pub fn exists(root: &Path) -> bool {
    graph_path(root).is_file()
}

/// Epoch seconds now.
fn now_epoch() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// Serialize, compress and write the graph. Stamps `last_indexed` and
/// syncs the counters before encoding.
pub fn save(graph: &mut Graph, root: &Path) -> Result<PathBuf> {
    let dir = codemap_dir(root);
    fs::create_dir_all(&dir)?;

    graph.last_indexed = now_epoch();
    graph.refresh_counters();

    let encoded = bincode::serialize(graph)
        .map_err(|e| CodemapError::Io(format!("graph encode failed: {e}")))?;
    let path = graph_path(root);
    let file = fs::File::create(&path)?;
    let mut encoder = GzEncoder::new(file, Compression::default());
    encoder.write_all(&encoded)?;
    encoder.finish()?;

    debug!(
        nodes = graph.node_count,
        edges = graph.edge_count,
        path = %path.display(),
        "graph saved"
    );
    Ok(path)
}

/// Read, decompress and decode the graph, then rebuild the secondary
/// indexes. Rejects files that fail to decode.
pub fn load(root: &Path) -> Result<Graph> {
    let path = graph_path(root);
    let file = fs::File::open(&path)
        .map_err(|e| CodemapError::Io(format!("cannot open {}: {e}", path.display())))?;
    let mut decoder = GzDecoder::new(file);
    let mut buf = Vec::new();
    decoder
        .read_to_end(&mut buf)
        .map_err(|e| CodemapError::Io(format!("cannot decompress {}: {e}", path.display())))?;

    let mut graph: Graph = bincode::deserialize(&buf)
        .map_err(|e| CodemapError::Io(format!("invalid graph file {}: {e}", path.display())))?;
    graph.rebuild_indexes();
    Ok(graph)
}

/// True if any indexed file has been modified after `last_indexed`, or
/// deleted. Paths without a file extension (package nodes) are skipped.
pub fn is_stale(graph: &Graph, root: &Path) -> bool {
    for path in file_backed_paths(graph) {
        match fs::metadata(root.join(&path)) {
            Ok(meta) => {
                if mtime_epoch(&meta) > graph.last_indexed {
                    return true;
                }
            }
            Err(_) => return true,
        }
    }
    false
}

/// Files whose mtime is strictly after `graph.last_indexed`.
pub fn modified_files(graph: &Graph, root: &Path) -> Vec<String> {
    let mut out = Vec::new();
    for path in file_backed_paths(graph) {
        if let Ok(meta) = fs::metadata(root.join(&path)) {
            if mtime_epoch(&meta) > graph.last_indexed {
                out.push(path);
            }
        }
    }
    out
}

/// Indexed files that no longer exist on disk.
pub fn deleted_files(graph: &Graph, root: &Path) -> Vec<String> {
    file_backed_paths(graph)
        .into_iter()
        .filter(|p| !root.join(p).exists())
        .collect()
}

fn file_backed_paths(graph: &Graph) -> Vec<String> {
    graph
        .indexed_paths()
        .into_iter()
        .filter(|p| Path::new(p).extension().is_some())
        .collect()
}

fn mtime_epoch(meta: &fs::Metadata) -> i64 {
    meta.modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_secs() as i64)
        .unwrap_or(i64::MAX)
}

/// Remove the whole `.codemap` directory.
pub fn clear(root: &Path) -> Result<()> {
    let dir = codemap_dir(root);
    if dir.exists() {
        fs::remove_dir_all(&dir)?;
    }
    Ok(())
}
