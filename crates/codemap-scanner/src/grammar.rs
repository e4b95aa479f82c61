//! Language detection and tree-sitter grammar registry
//!
//! Grammars are compiled into the binary. Kotlin and R are detected by
//! extension but carry no bundled grammar (their crates pin
//! incompatible tree-sitter versions); asking for their parser yields a
//! user-actionable error instead of a crash.

use std::path::Path;

use codemap_core::{CodemapError, Result};
use tree_sitter::{Language, Parser, Tree};

/// Languages the scanner understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Lang {
    Go,
    Python,
    JavaScript,
    TypeScript,
    Tsx,
    Rust,
    Ruby,
    C,
    Cpp,
    Java,
    Swift,
    Kotlin,
    CSharp,
    Php,
    Dart,
    R,
    Bash,
}

impl Lang {
    pub fn name(&self) -> &'static str {
        match self {
            Lang::Go => "go",
            Lang::Python => "python",
            Lang::JavaScript => "javascript",
            Lang::TypeScript => "typescript",
            Lang::Tsx => "tsx",
            Lang::Rust => "rust",
            Lang::Ruby => "ruby",
            Lang::C => "c",
            Lang::Cpp => "cpp",
            Lang::Java => "java",
            Lang::Swift => "swift",
            Lang::Kotlin => "kotlin",
            Lang::CSharp => "csharp",
            Lang::Php => "php",
            Lang::Dart => "dart",
            Lang::R => "r",
            Lang::Bash => "bash",
        }
    }

    /// Whether a grammar is compiled in for this language.
    pub fn grammar_bundled(&self) -> bool {
        !matches!(self, Lang::Kotlin | Lang::R)
    }
}

impl std::fmt::Display for Lang {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Map a file extension to a language id.
pub fn detect_language(path: &Path) -> Option<Lang> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    match ext.as_str() {
        "go" => Some(Lang::Go),
        "py" | "pyi" => Some(Lang::Python),
        "js" | "jsx" | "mjs" | "cjs" => Some(Lang::JavaScript),
        "ts" => Some(Lang::TypeScript),
        "tsx" => Some(Lang::Tsx),
        "rs" => Some(Lang::Rust),
        "rb" => Some(Lang::Ruby),
        "c" | "h" => Some(Lang::C),
        "cpp" | "cc" | "cxx" | "hpp" | "hh" => Some(Lang::Cpp),
        "java" => Some(Lang::Java),
        "swift" => Some(Lang::Swift),
        "kt" | "kts" => Some(Lang::Kotlin),
        "cs" => Some(Lang::CSharp),
        "php" => Some(Lang::Php),
        "dart" => Some(Lang::Dart),
        "r" => Some(Lang::R),
        "sh" | "bash" => Some(Lang::Bash),
        _ => None,
    }
}

/// The tree-sitter grammar for a language, or a clean error when the
/// grammar is not bundled.
pub fn grammar(lang: Lang) -> Result<Language> {
    let language: Language = match lang {
        Lang::Go => tree_sitter_go::LANGUAGE.into(),
        Lang::Python => tree_sitter_python::LANGUAGE.into(),
        Lang::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
        Lang::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
        Lang::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
        Lang::Rust => tree_sitter_rust::LANGUAGE.into(),
        Lang::Ruby => tree_sitter_ruby::LANGUAGE.into(),
        Lang::C => tree_sitter_c::LANGUAGE.into(),
        Lang::Cpp => tree_sitter_cpp::LANGUAGE.into(),
        Lang::Java => tree_sitter_java::LANGUAGE.into(),
        Lang::Swift => tree_sitter_swift::LANGUAGE.into(),
        Lang::CSharp => tree_sitter_c_sharp::LANGUAGE.into(),
        Lang::Php => tree_sitter_php::LANGUAGE_PHP.into(),
        Lang::Dart => tree_sitter_dart_orchard::LANGUAGE.into(),
        Lang::Bash => tree_sitter_bash::LANGUAGE.into(),
        Lang::Kotlin | Lang::R => {
            return Err(CodemapError::Io(format!(
                "no grammar bundled for {lang}; files are listed but not parsed"
            )))
        }
    };
    Ok(language)
}

/// True when at least one grammar is available in this build.
pub fn has_grammars() -> bool {
    true
}

/// Parse a source buffer with the grammar for `lang`.
pub fn parse(source: &[u8], lang: Lang) -> Result<Tree> {
    let language = grammar(lang)?;
    let mut parser = Parser::new();
    parser
        .set_language(&language)
        .map_err(|e| CodemapError::Parse(format!("cannot load {lang} grammar: {e}")))?;
    parser
        .parse(source, None)
        .ok_or_else(|| CodemapError::Parse(format!("{lang} parser produced no tree")))
}
