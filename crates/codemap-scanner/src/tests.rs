//! Unit tests for codemap-scanner

use std::path::Path;

use codemap_core::{DetailLevel, TypeMarker};

use crate::grammar::{self, Lang};
use crate::{analyze_source, walker};

#[test]
fn detects_languages_by_extension() {
    let cases = [
        ("main.go", Some(Lang::Go)),
        ("app.py", Some(Lang::Python)),
        ("index.js", Some(Lang::JavaScript)),
        ("view.tsx", Some(Lang::Tsx)),
        ("lib.rs", Some(Lang::Rust)),
        ("tool.rb", Some(Lang::Ruby)),
        ("core.c", Some(Lang::C)),
        ("core.cc", Some(Lang::Cpp)),
        ("Main.java", Some(Lang::Java)),
        ("App.swift", Some(Lang::Swift)),
        ("App.kt", Some(Lang::Kotlin)),
        ("Program.cs", Some(Lang::CSharp)),
        ("index.php", Some(Lang::Php)),
        ("main.dart", Some(Lang::Dart)),
        ("stats.r", Some(Lang::R)),
        ("run.sh", Some(Lang::Bash)),
        ("README.md", None),
    ];
    for (file, expected) in cases {
        assert_eq!(
            grammar::detect_language(Path::new(file)),
            expected,
            "wrong language for {file}"
        );
    }
}

#[test]
fn missing_grammars_error_cleanly() {
    assert!(grammar::has_grammars());
    assert!(!Lang::Kotlin.grammar_bundled());
    assert!(!Lang::R.grammar_bundled());
    let err = grammar::grammar(Lang::Kotlin).unwrap_err();
    assert!(err.to_string().contains("kotlin"));
}

#[test]
fn go_extraction_covers_functions_calls_and_package() {
    let source = r#"package x

// A increments through B.
func A(i int) int { return B(i) }

func B(i int) int { return i + 1 }
"#;
    let analysis = analyze_source("foo.go", source, Lang::Go, DetailLevel::Full).unwrap();

    assert_eq!(analysis.package, "x");
    assert_eq!(analysis.functions.len(), 2);

    let a = &analysis.functions[0];
    assert_eq!(a.name, "A");
    assert!(a.exported);
    assert_eq!(a.param_count, 1);
    assert_eq!(a.line, 4);
    assert!(a.signature.starts_with("func A(i int)"));
    assert!(a.doc.contains("increments"));
    assert!(!a.content_hash.is_empty());

    let call = analysis
        .calls
        .iter()
        .find(|c| c.callee == "B")
        .expect("call to B");
    assert_eq!(call.caller, "A");
    assert_eq!(call.arg_count, 1);
    assert_eq!(call.line, 4);
}

#[test]
fn go_methods_carry_their_receiver() {
    let source = r#"package srv

type Server struct{}

func (s *Server) Handle(req string) error { return nil }

func helper() {}
"#;
    let analysis = analyze_source("srv.go", source, Lang::Go, DetailLevel::Full).unwrap();

    let handle = analysis
        .functions
        .iter()
        .find(|f| f.name == "Handle")
        .unwrap();
    assert_eq!(handle.receiver, "Server");
    assert_eq!(handle.param_count, 1);

    let helper = analysis
        .functions
        .iter()
        .find(|f| f.name == "helper")
        .unwrap();
    assert!(helper.receiver.is_empty());
    assert!(!helper.exported);

    let server = analysis.types.iter().find(|t| t.name == "Server").unwrap();
    assert_eq!(server.marker, TypeMarker::Struct);
}

#[test]
fn go_variadic_params_report_unknown_arity() {
    let source = "package x\n\nfunc V(parts ...string) {}\n";
    let analysis = analyze_source("v.go", source, Lang::Go, DetailLevel::Full).unwrap();
    assert_eq!(analysis.functions[0].param_count, -1);
}

#[test]
fn python_classes_make_methods_and_respect_underscores() {
    let source = r#"import os
from collections import abc

class Parser:
    def parse(self, text):
        return self._clean(text)

    def _clean(self, text):
        return text.strip()

def main():
    p = Parser()
    p.parse("x")
"#;
    let analysis = analyze_source("parser.py", source, Lang::Python, DetailLevel::Full).unwrap();

    assert_eq!(analysis.package, "parser");
    assert!(analysis.imports.contains(&"os".to_string()));
    assert!(analysis.imports.contains(&"collections".to_string()));

    let parse = analysis.functions.iter().find(|f| f.name == "parse").unwrap();
    assert_eq!(parse.receiver, "Parser");
    assert!(parse.exported);
    // self does not count.
    assert_eq!(parse.param_count, 1);

    let clean = analysis.functions.iter().find(|f| f.name == "_clean").unwrap();
    assert!(!clean.exported);

    let main = analysis.functions.iter().find(|f| f.name == "main").unwrap();
    assert!(main.receiver.is_empty());

    let call = analysis.calls.iter().find(|c| c.callee == "parse").unwrap();
    assert_eq!(call.caller, "main");
    assert_eq!(call.receiver, "p");
}

#[test]
fn rust_visibility_comes_from_pub_markers() {
    let source = r#"pub struct Store;

impl Store {
    pub fn open(path: &str) -> Self { Store }
    fn internal(&self) {}
}

pub fn run() { helper(2); }

fn helper(n: usize) {}
"#;
    let analysis = analyze_source("store.rs", source, Lang::Rust, DetailLevel::Full).unwrap();

    let open = analysis.functions.iter().find(|f| f.name == "open").unwrap();
    assert!(open.exported);
    assert_eq!(open.receiver, "Store");
    assert_eq!(open.param_count, 1);

    let internal = analysis
        .functions
        .iter()
        .find(|f| f.name == "internal")
        .unwrap();
    assert!(!internal.exported);
    // &self does not count.
    assert_eq!(internal.param_count, 0);

    let helper = analysis.functions.iter().find(|f| f.name == "helper").unwrap();
    assert!(!helper.exported);

    let call = analysis.calls.iter().find(|c| c.callee == "helper").unwrap();
    assert_eq!(call.caller, "run");
    assert_eq!(call.arg_count, 1);

    let store = analysis.types.iter().find(|t| t.name == "Store").unwrap();
    assert_eq!(store.marker, TypeMarker::Struct);
    assert!(store.exported);
}

#[test]
fn typescript_interfaces_and_arrows_are_extracted() {
    let source = r#"import { api } from "./client";

interface Config {
    retries: number;
}

export function load(path: string): Config {
    return parse(path);
}

const parse = (path: string): Config => {
    return api.fetch(path);
};
"#;
    let analysis = analyze_source("config.ts", source, Lang::TypeScript, DetailLevel::Full).unwrap();

    assert_eq!(analysis.imports, vec!["./client".to_string()]);

    let config = analysis.types.iter().find(|t| t.name == "Config").unwrap();
    assert_eq!(config.marker, TypeMarker::Interface);

    assert!(analysis.functions.iter().any(|f| f.name == "load"));
    assert!(analysis.functions.iter().any(|f| f.name == "parse"));

    let fetch = analysis.calls.iter().find(|c| c.callee == "fetch").unwrap();
    assert_eq!(fetch.receiver, "api");
}

#[test]
fn duplicate_name_line_pairs_collapse() {
    // Arrow-function patterns can double-match; dedupe keeps one entry.
    let source = "const f = (a) => a;\nconst f2 = (b) => b;\n";
    let analysis = analyze_source("d.js", source, Lang::JavaScript, DetailLevel::Full).unwrap();
    let f_entries = analysis.functions.iter().filter(|f| f.name == "f").count();
    assert_eq!(f_entries, 1);
}

#[test]
fn syntactically_broken_files_still_scan() {
    // tree-sitter recovers; the scan yields what it can.
    let source = "package x\n\nfunc Good() {}\n\nfunc Broken( {{{\n";
    let analysis = analyze_source("bad.go", source, Lang::Go, DetailLevel::Full).unwrap();
    assert!(analysis.functions.iter().any(|f| f.name == "Good"));
}

#[test]
fn names_detail_skips_signatures_and_calls() {
    let source = "package x\n\nfunc A(i int) int { return B(i) }\nfunc B(i int) int { return i }\n";
    let analysis = analyze_source("foo.go", source, Lang::Go, DetailLevel::Names).unwrap();
    assert_eq!(analysis.functions.len(), 2);
    assert!(analysis.functions[0].signature.is_empty());
    assert!(analysis.calls.is_empty());
}

#[test]
fn walker_honors_gitignore_and_sorts() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(".gitignore"), "vendor/\n").unwrap();
    std::fs::create_dir_all(dir.path().join("vendor")).unwrap();
    std::fs::write(dir.path().join("vendor/skip.go"), "package v\n").unwrap();
    std::fs::write(dir.path().join("b.go"), "package x\n").unwrap();
    std::fs::write(dir.path().join("a.go"), "package x\n").unwrap();
    std::fs::write(dir.path().join("notes.txt"), "hi\n").unwrap();

    let files = walker::list_source_files(dir.path(), None);
    let paths: Vec<&str> = files.iter().map(|(p, _)| p.as_str()).collect();
    assert_eq!(paths, vec!["a.go", "b.go"]);
}

#[test]
fn scan_for_deps_returns_path_sorted_analyses() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("z.go"), "package x\nfunc Z() {}\n").unwrap();
    std::fs::write(dir.path().join("a.py"), "def a():\n    pass\n").unwrap();

    let analyses = walker::scan_for_deps(dir.path(), None, DetailLevel::Full).unwrap();
    let paths: Vec<&str> = analyses.iter().map(|a| a.path.as_str()).collect();
    assert_eq!(paths, vec!["a.py", "z.go"]);
    assert_eq!(analyses[1].language, "go");
}

#[test]
fn extract_calls_reads_a_single_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("m.go"),
        "package x\n\nfunc A() { B() }\nfunc B() {}\n",
    )
    .unwrap();

    let calls = walker::extract_calls(dir.path(), "m.go").unwrap();
    assert_eq!(calls.path, "m.go");
    assert_eq!(calls.calls.len(), 1);
    assert_eq!(calls.calls[0].callee, "B");
}

#[test]
fn read_span_slices_lines() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("s.go"), "l1\nl2\nl3\nl4\n").unwrap();
    let span = walker::read_span(dir.path(), "s.go", 2, 3).unwrap();
    assert_eq!(span, "l2\nl3");
}
