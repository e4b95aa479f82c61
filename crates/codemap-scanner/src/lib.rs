//! Codemap Scanner — language detection and AST-driven extraction

pub mod extractor;
pub mod grammar;
pub mod languages;
pub mod walker;

#[cfg(test)]
pub mod tests;

pub use extractor::analyze_source;
pub use grammar::{detect_language, grammar, has_grammars, parse, Lang};
pub use walker::{extract_calls, list_source_files, new_files, read_span, scan_files, scan_for_deps};
