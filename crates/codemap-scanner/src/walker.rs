//! Repository walking and batch scanning
//!
//! Files parse in parallel, but results are path-sorted before they
//! reach the builder so a scan of the same tree always feeds the
//! builder in the same order.

use std::path::Path;

use codemap_core::{CallAnalysis, CodemapError, DetailLevel, FileAnalysis, Result};
use ignore::gitignore::Gitignore;
use ignore::WalkBuilder;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::extractor;
use crate::grammar::{self, Lang};

/// Upper bound on a single source file; larger files are skipped the
/// way generated bundles usually deserve.
const MAX_FILE_BYTES: u64 = 2 * 1024 * 1024;

/// List every parseable source file under `root`, honoring `.gitignore`
/// rules plus an optional extra matcher. Paths come back root-relative
/// and sorted.
pub fn list_source_files(root: &Path, extra_ignore: Option<&Gitignore>) -> Vec<(String, Lang)> {
    let mut files = Vec::new();
    for entry in WalkBuilder::new(root)
        .hidden(true)
        .require_git(false)
        .build()
    {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!("walk error: {e}");
                continue;
            }
        };
        if !entry.file_type().map_or(false, |t| t.is_file()) {
            continue;
        }
        let path = entry.path();
        if let Some(matcher) = extra_ignore {
            if matcher.matched(path, false).is_ignore() {
                continue;
            }
        }
        let Some(lang) = grammar::detect_language(path) else {
            continue;
        };
        if entry.metadata().map_or(false, |m| m.len() > MAX_FILE_BYTES) {
            debug!(path = %path.display(), "skipping oversized file");
            continue;
        }
        let rel = relative_path(root, path);
        if rel.starts_with(".codemap/") {
            continue;
        }
        files.push((rel, lang));
    }
    files.sort();
    files
}

/// Scan the whole tree. Files that fail to read or parse contribute
/// nothing beyond a warning; the scan keeps going.
pub fn scan_for_deps(
    root: &Path,
    extra_ignore: Option<&Gitignore>,
    detail: DetailLevel,
) -> Result<Vec<FileAnalysis>> {
    let files = list_source_files(root, extra_ignore);
    Ok(scan_files(root, &files, detail))
}

/// Scan a known set of root-relative files (the incremental path).
pub fn scan_files(
    root: &Path,
    files: &[(String, Lang)],
    detail: DetailLevel,
) -> Vec<FileAnalysis> {
    let mut analyses: Vec<FileAnalysis> = files
        .par_iter()
        .filter_map(|(rel, lang)| {
            if !lang.grammar_bundled() {
                debug!(path = %rel, %lang, "no grammar bundled, skipping");
                return None;
            }
            match scan_one(root, rel, *lang, detail) {
                Ok(analysis) => Some(analysis),
                Err(e) => {
                    warn!(path = %rel, "skipping file: {e}");
                    None
                }
            }
        })
        .collect();
    // Parallel collection order is nondeterministic; the builder needs
    // a canonical feed.
    analyses.sort_by(|a, b| a.path.cmp(&b.path));
    analyses
}

fn scan_one(root: &Path, rel: &str, lang: Lang, detail: DetailLevel) -> Result<FileAnalysis> {
    let full = root.join(rel);
    let source = std::fs::read_to_string(&full)
        .map_err(|e| CodemapError::Io(format!("cannot read {}: {e}", full.display())))?;
    extractor::analyze_source(rel, &source, lang, detail)
}

/// Per-file call accessor used by the incremental builder.
pub fn extract_calls(root: &Path, rel: &str) -> Result<CallAnalysis> {
    let full = root.join(rel);
    let lang = grammar::detect_language(&full).ok_or_else(|| {
        CodemapError::Parse(format!("unsupported file type: {}", full.display()))
    })?;
    let source = std::fs::read_to_string(&full)
        .map_err(|e| CodemapError::Io(format!("cannot read {}: {e}", full.display())))?;
    let analysis = extractor::analyze_source(rel, &source, lang, DetailLevel::Full)?;
    Ok(CallAnalysis {
        path: analysis.path,
        calls: analysis.calls,
    })
}

/// Read the source span of a symbol, for snippets and prompts.
pub fn read_span(root: &Path, rel: &str, line: u32, end_line: u32) -> Result<String> {
    let full = root.join(rel);
    let source = std::fs::read_to_string(&full)
        .map_err(|e| CodemapError::Io(format!("cannot read {}: {e}", full.display())))?;
    if line == 0 {
        return Ok(source);
    }
    let start = (line as usize).saturating_sub(1);
    let end = (end_line as usize).max(start + 1);
    Ok(source
        .lines()
        .skip(start)
        .take(end - start)
        .collect::<Vec<_>>()
        .join("\n"))
}

fn relative_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

/// Root-relative paths currently on disk that the graph does not know
/// about yet.
pub fn new_files(
    root: &Path,
    extra_ignore: Option<&Gitignore>,
    known: &[String],
) -> Vec<(String, Lang)> {
    let known: std::collections::HashSet<&str> = known.iter().map(|s| s.as_str()).collect();
    list_source_files(root, extra_ignore)
        .into_iter()
        .filter(|(rel, _)| !known.contains(rel.as_str()))
        .collect()
}

/// Resolve a root-relative path back to a `(path, lang)` pair when the
/// language is still supported.
pub fn classify(root: &Path, rel: &str) -> Option<(String, Lang)> {
    let lang = grammar::detect_language(&root.join(rel))?;
    Some((rel.to_string(), lang))
}
