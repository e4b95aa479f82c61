//! Query-driven symbol, type, import and call extraction
//!
//! One generic runner serves every language: the per-language query
//! strings in `languages/` share a capture-name contract, and the
//! remaining differences (signature shape, visibility rule, parameter
//! counting quirks) are small per-language switches below.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, OnceLock};

use codemap_core::{
    content_hash, CallInfo, DetailLevel, FileAnalysis, FuncInfo, Result, TypeInfo, TypeMarker,
};
use tracing::{debug, warn};
use tree_sitter::{Node, Query, QueryCursor, StreamingIterator};

use crate::grammar::{self, Lang};
use crate::languages;

/// Compiled query set for one language, built once per process.
struct CompiledQueries {
    symbols: Option<Query>,
    imports: Option<Query>,
    calls: Option<Query>,
    package: Option<Query>,
}

fn compile_first(
    language: &tree_sitter::Language,
    variants: &[&str],
    lang: Lang,
    what: &str,
) -> Option<Query> {
    if variants.is_empty() {
        return None;
    }
    for variant in variants {
        match Query::new(language, variant) {
            Ok(q) => return Some(q),
            Err(e) => debug!(%lang, what, "query variant rejected: {e}"),
        }
    }
    warn!(%lang, what, "all query variants failed to compile");
    None
}

fn compiled(lang: Lang) -> Result<Arc<CompiledQueries>> {
    static CACHE: OnceLock<Mutex<HashMap<Lang, Arc<CompiledQueries>>>> = OnceLock::new();
    let cache = CACHE.get_or_init(|| Mutex::new(HashMap::new()));

    if let Some(found) = cache.lock().unwrap().get(&lang) {
        return Ok(found.clone());
    }

    let language = grammar::grammar(lang)?;
    let queries = languages::queries_for(lang);
    let built = Arc::new(CompiledQueries {
        symbols: compile_first(&language, queries.symbols, lang, "symbols"),
        imports: compile_first(&language, queries.imports, lang, "imports"),
        calls: compile_first(&language, queries.calls, lang, "calls"),
        package: compile_first(&language, queries.package, lang, "package"),
    });
    cache.lock().unwrap().insert(lang, built.clone());
    Ok(built)
}

/// A symbol span used for method classification and caller lookup.
#[derive(Debug, Clone)]
struct SymbolSpan {
    name: String,
    line: u32,
    end_line: u32,
}

/// Analyze one source buffer. `path` is the project-relative path that
/// ends up in the emitted records.
pub fn analyze_source(
    path: &str,
    source: &str,
    lang: Lang,
    detail: DetailLevel,
) -> Result<FileAnalysis> {
    let tree = grammar::parse(source.as_bytes(), lang)?;
    let queries = compiled(lang)?;
    let root = tree.root_node();
    let bytes = source.as_bytes();

    let mut analysis = FileAnalysis {
        path: path.to_string(),
        language: lang.name().to_string(),
        ..Default::default()
    };

    let mut containers: Vec<SymbolSpan> = Vec::new();

    if let Some(query) = &queries.symbols {
        extract_symbols(query, root, bytes, lang, detail, &mut analysis, &mut containers);
    }
    classify_methods(&mut analysis.functions, &containers);
    dedupe_functions(&mut analysis.functions);

    if let Some(query) = &queries.imports {
        analysis.imports = extract_imports(query, root, bytes);
    }

    if detail == DetailLevel::Full {
        if let Some(query) = &queries.calls {
            let spans: Vec<SymbolSpan> = analysis
                .functions
                .iter()
                .map(|f| SymbolSpan {
                    name: f.name.clone(),
                    line: f.line,
                    end_line: f.end_line,
                })
                .collect();
            analysis.calls = extract_calls(query, root, bytes, &spans);
        }
    }

    analysis.package = derive_package(&queries, root, bytes, path);
    Ok(analysis)
}

fn node_text<'a>(node: Node<'a>, source: &'a [u8]) -> &'a str {
    node.utf8_text(source).unwrap_or("")
}

fn start_line(node: Node) -> u32 {
    node.start_position().row as u32 + 1
}

fn end_line(node: Node) -> u32 {
    node.end_position().row as u32 + 1
}

#[allow(clippy::too_many_arguments)]
fn extract_symbols(
    query: &Query,
    root: Node,
    source: &[u8],
    lang: Lang,
    detail: DetailLevel,
    analysis: &mut FileAnalysis,
    containers: &mut Vec<SymbolSpan>,
) {
    let capture_names = query.capture_names();
    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(query, root, source);

    while let Some(m) = matches.next() {
        let mut func_name = None;
        let mut func_def: Option<Node> = None;
        let mut params: Option<Node> = None;
        let mut result: Option<Node> = None;
        let mut receiver: Option<Node> = None;
        let mut has_vis = false;
        let mut type_name = None;
        let mut type_def: Option<Node> = None;
        let mut marker = None;
        let mut container_name = None;
        let mut container_def: Option<Node> = None;

        for cap in m.captures {
            let node = cap.node;
            match capture_names[cap.index as usize] {
                "func.name" => func_name = Some(node_text(node, source).to_string()),
                "func.def" => func_def = Some(node),
                "func.params" => params = Some(node),
                "func.result" => result = Some(node),
                "func.receiver" => receiver = Some(node),
                "func.vis" | "type.vis" => has_vis = true,
                "type.name" => type_name = Some(node_text(node, source).to_string()),
                "type.def" => type_def = Some(node),
                "type.struct" => marker = Some(TypeMarker::Struct),
                "type.class" => marker = Some(TypeMarker::Class),
                "type.interface" => marker = Some(TypeMarker::Interface),
                "type.trait" => marker = Some(TypeMarker::Trait),
                "type.enum" => marker = Some(TypeMarker::Enum),
                "type.alias" => marker = Some(TypeMarker::Alias),
                "type.protocol" => marker = Some(TypeMarker::Protocol),
                "container.name" => container_name = Some(node_text(node, source).to_string()),
                "container.def" => container_def = Some(node),
                _ => {}
            }
        }

        if let (Some(name), Some(def)) = (func_name, func_def) {
            let params_text = params.map(|p| node_text(p, source).to_string());
            let result_text = result.map(|r| node_text(r, source).to_string());
            let receiver_text = receiver
                .map(|r| receiver_type_name(node_text(r, source)))
                .unwrap_or_default();

            let mut f = FuncInfo {
                name: name.clone(),
                receiver: receiver_text,
                line: start_line(def),
                end_line: end_line(def),
                exported: is_exported(lang, &name, has_vis),
                param_count: params_text
                    .as_deref()
                    .map(|p| count_params(p, lang))
                    .unwrap_or(-1),
                ..Default::default()
            };
            if detail != DetailLevel::Names {
                f.params = params_text.clone().unwrap_or_default();
                f.result = result_text.clone().unwrap_or_default();
                f.signature = build_signature(
                    lang,
                    &f.name,
                    &f.receiver,
                    params_text.as_deref(),
                    result_text.as_deref(),
                    def,
                    source,
                );
                f.content_hash = content_hash(node_text(def, source).as_bytes());
            }
            if detail == DetailLevel::Full {
                f.doc = doc_comment(def, source);
            }
            analysis.functions.push(f);
        } else if let (Some(name), Some(def), Some(marker)) = (type_name, type_def, marker) {
            let mut t = TypeInfo {
                name: name.clone(),
                marker,
                line: start_line(def),
                end_line: end_line(def),
                doc: String::new(),
                exported: is_exported(lang, &name, has_vis),
                fields: Vec::new(),
                methods: Vec::new(),
            };
            if detail == DetailLevel::Full {
                t.doc = doc_comment(def, source);
            }
            // Class-like types double as method containers.
            if matches!(
                t.marker,
                TypeMarker::Class | TypeMarker::Struct | TypeMarker::Trait
            ) {
                containers.push(SymbolSpan {
                    name: t.name.clone(),
                    line: t.line,
                    end_line: t.end_line,
                });
            }
            analysis.types.push(t);
        } else if let (Some(name), Some(def)) = (container_name, container_def) {
            containers.push(SymbolSpan {
                name,
                line: start_line(def),
                end_line: end_line(def),
            });
        }
    }
}

/// Functions nested inside a class/impl span become methods of the
/// innermost such container, unless the grammar already supplied a
/// receiver (Go).
fn classify_methods(functions: &mut [FuncInfo], containers: &[SymbolSpan]) {
    if containers.is_empty() {
        return;
    }
    for f in functions.iter_mut() {
        if !f.receiver.is_empty() {
            continue;
        }
        let innermost = containers
            .iter()
            .filter(|c| c.line <= f.line && f.end_line <= c.end_line)
            .max_by_key(|c| c.line);
        if let Some(container) = innermost {
            f.receiver = container.name.clone();
        }
    }
}

/// Duplicate `(name, line)` pairs collapse to the first entry.
fn dedupe_functions(functions: &mut Vec<FuncInfo>) {
    let mut seen: HashSet<(String, u32)> = HashSet::new();
    functions.retain(|f| seen.insert((f.name.clone(), f.line)));
}

fn extract_imports(query: &Query, root: Node, source: &[u8]) -> Vec<String> {
    let capture_names = query.capture_names();
    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(query, root, source);
    let mut imports = Vec::new();
    let mut seen = HashSet::new();

    while let Some(m) = matches.next() {
        for cap in m.captures {
            if capture_names[cap.index as usize] != "import.path" {
                continue;
            }
            let raw = node_text(cap.node, source)
                .trim_matches(|c| c == '"' || c == '\'' || c == '`' || c == '<' || c == '>')
                .to_string();
            if !raw.is_empty() && seen.insert(raw.clone()) {
                imports.push(raw);
            }
        }
    }
    imports
}

fn extract_calls(
    query: &Query,
    root: Node,
    source: &[u8],
    functions: &[SymbolSpan],
) -> Vec<CallInfo> {
    let capture_names = query.capture_names();
    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(query, root, source);
    let mut calls = Vec::new();
    let mut seen: HashSet<(String, u32, i32)> = HashSet::new();

    while let Some(m) = matches.next() {
        let mut name = None;
        let mut receiver = String::new();
        let mut args: Option<Node> = None;
        let mut site: Option<Node> = None;

        for cap in m.captures {
            let node = cap.node;
            match capture_names[cap.index as usize] {
                "call.name" => name = Some(node_text(node, source).to_string()),
                "call.receiver" => {
                    receiver = node_text(node, source).chars().take(64).collect();
                }
                "call.args" => args = Some(node),
                "call" => site = Some(node),
                _ => {}
            }
        }

        let Some(callee) = name else { continue };
        let line = site.map(start_line).unwrap_or(0);
        let arg_count = args
            .map(|a| count_args(node_text(a, source)))
            .unwrap_or(-1);
        let caller = functions
            .iter()
            .filter(|f| f.line <= line && line <= f.end_line)
            .max_by_key(|f| f.line)
            .map(|f| f.name.clone())
            .unwrap_or_default();

        if seen.insert((callee.clone(), line, arg_count)) {
            calls.push(CallInfo {
                callee,
                caller,
                receiver,
                line,
                arg_count,
            });
        }
    }
    calls
}

fn derive_package(queries: &CompiledQueries, root: Node, source: &[u8], path: &str) -> String {
    if let Some(query) = &queries.package {
        let capture_names = query.capture_names();
        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(query, root, source);
        while let Some(m) = matches.next() {
            for cap in m.captures {
                if capture_names[cap.index as usize] == "package" {
                    let text = node_text(cap.node, source).trim().to_string();
                    if !text.is_empty() {
                        return text;
                    }
                }
            }
        }
    }
    file_stem(path)
}

fn file_stem(path: &str) -> String {
    let base = path.rsplit('/').next().unwrap_or(path);
    base.split('.').next().unwrap_or(base).to_string()
}

/// Pull the bare type name out of a Go receiver list like `(s *Server)`.
fn receiver_type_name(text: &str) -> String {
    text.trim_matches(|c| c == '(' || c == ')')
        .split_whitespace()
        .last()
        .unwrap_or("")
        .trim_start_matches(|c| c == '*' || c == '&')
        .to_string()
}

fn is_exported(lang: Lang, name: &str, has_vis: bool) -> bool {
    match lang {
        Lang::Go => name.chars().next().map_or(false, |c| c.is_uppercase()),
        Lang::Python => !name.starts_with('_'),
        Lang::Rust => has_vis,
        _ => true,
    }
}

/// Count declared parameters from the raw parameter-list text.
/// Variadic forms yield -1; implicit receivers (`self`, `cls`) do not
/// count.
fn count_params(text: &str, lang: Lang) -> i32 {
    let inner = strip_outer_parens(text);
    if inner.is_empty() {
        return 0;
    }
    if inner.contains("...") {
        return -1;
    }

    let parts = split_top_level(inner);
    let mut count = 0i32;
    for (i, part) in parts.iter().enumerate() {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        match lang {
            Lang::Python | Lang::Ruby if part.starts_with('*') => return -1,
            Lang::Python if i == 0 && (part == "self" || part == "cls") => {}
            Lang::Rust if i == 0 && is_self_param(part) => {}
            _ => count += 1,
        }
    }
    count
}

fn is_self_param(part: &str) -> bool {
    let stripped = part.trim_start_matches(['&', ' ']).trim_start_matches("mut ");
    stripped == "self" || stripped.starts_with("self:")
}

/// Count call-site arguments from the raw argument-list text. Spread
/// forms yield -1.
fn count_args(text: &str) -> i32 {
    let inner = strip_outer_parens(text);
    if inner.is_empty() {
        return 0;
    }
    if inner.contains("...") {
        return -1;
    }
    split_top_level(inner)
        .iter()
        .filter(|p| !p.trim().is_empty())
        .count() as i32
}

fn strip_outer_parens(text: &str) -> &str {
    let t = text.trim();
    let t = t.strip_prefix('(').unwrap_or(t);
    let t = t.strip_suffix(')').unwrap_or(t);
    t.trim().trim_end_matches(',')
}

/// Split on commas that sit outside every bracket pair.
fn split_top_level(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut angle = 0i32;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match c {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth -= 1,
            '<' => angle += 1,
            '>' => {
                if angle > 0 {
                    angle -= 1;
                }
            }
            ',' if depth == 0 && angle == 0 => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

fn build_signature(
    lang: Lang,
    name: &str,
    receiver: &str,
    params: Option<&str>,
    result: Option<&str>,
    def: Node,
    source: &[u8],
) -> String {
    let Some(params) = params else {
        return first_line(def, source);
    };
    let result = result.unwrap_or("");
    let sig = match lang {
        Lang::Go => {
            let recv = if receiver.is_empty() {
                String::new()
            } else {
                format!("({receiver}) ")
            };
            format!("func {recv}{name}{params} {result}")
        }
        Lang::Python => {
            if result.is_empty() {
                format!("def {name}{params}")
            } else {
                format!("def {name}{params} -> {result}")
            }
        }
        Lang::Rust => {
            if result.is_empty() {
                format!("fn {name}{params}")
            } else {
                format!("fn {name}{params} -> {result}")
            }
        }
        Lang::JavaScript | Lang::TypeScript | Lang::Tsx => {
            format!("function {name}{params}{result}")
        }
        Lang::Java | Lang::C | Lang::Cpp | Lang::CSharp => {
            format!("{result} {name}{params}")
        }
        Lang::Php => format!("function {name}{params}{result}"),
        Lang::Ruby => format!("def {name}{params}"),
        Lang::Bash => format!("{name}()"),
        _ => return first_line(def, source),
    };
    sig.trim().to_string()
}

fn first_line(def: Node, source: &[u8]) -> String {
    let text = node_text(def, source);
    let line = text.lines().next().unwrap_or("").trim();
    line.chars().take(160).collect()
}

/// Comment block immediately above a definition, markers stripped.
fn doc_comment(def: Node, source: &[u8]) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut cursor = def;
    while let Some(prev) = cursor.prev_named_sibling() {
        if !prev.kind().contains("comment") {
            break;
        }
        // Adjacent lines only; a blank line ends the block.
        if start_line(cursor) > end_line(prev) + 1 {
            break;
        }
        let text = node_text(prev, source);
        for line in text.lines().rev() {
            let cleaned = line
                .trim()
                .trim_start_matches("///")
                .trim_start_matches("//!")
                .trim_start_matches("//")
                .trim_start_matches("/*")
                .trim_start_matches('*')
                .trim_end_matches("*/")
                .trim();
            lines.push(cleaned.to_string());
        }
        cursor = prev;
    }
    lines.reverse();
    let doc = lines.join("\n").trim().to_string();
    doc
}
