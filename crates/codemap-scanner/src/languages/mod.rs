//! Per-language tree-sitter queries
//!
//! Every language supplies up to four query sets, each given as a list
//! of variants: the first variant that compiles against the active
//! grammar wins, so a grammar bump that renames one node degrades a
//! single category instead of the whole language.
//!
//! Capture names form a uniform contract consumed by the extractor:
//!
//! - functions: `func.def`, `func.name`, `func.params?`, `func.result?`,
//!   `func.receiver?`, `func.vis?`
//! - types: `type.def`, `type.name`, plus exactly one marker capture of
//!   `type.struct`, `type.class`, `type.interface`, `type.trait`,
//!   `type.enum`, `type.alias`, `type.protocol`; `type.vis?`
//! - containers that give nested functions a receiver without emitting
//!   a node of their own (Rust `impl` blocks): `container.def`,
//!   `container.name`
//! - imports: `import`, `import.path`
//! - calls: `call`, `call.name`, `call.receiver?`, `call.args?`
//! - package declaration (languages that have one): `package`

mod bash;
mod c;
mod cpp;
mod csharp;
mod dart;
mod go;
mod java;
mod javascript;
mod php;
mod python;
mod ruby;
mod rust;
mod swift;
mod typescript;

use crate::grammar::Lang;

/// The query sets for one language.
pub struct LanguageQueries {
    pub symbols: &'static [&'static str],
    pub imports: &'static [&'static str],
    pub calls: &'static [&'static str],
    pub package: &'static [&'static str],
}

impl LanguageQueries {
    pub const fn empty() -> Self {
        LanguageQueries {
            symbols: &[],
            imports: &[],
            calls: &[],
            package: &[],
        }
    }
}

/// Queries for a language. Languages without a bundled grammar get an
/// empty set; the caller never reaches them with a parse tree anyway.
pub fn queries_for(lang: Lang) -> &'static LanguageQueries {
    match lang {
        Lang::Go => &go::QUERIES,
        Lang::Python => &python::QUERIES,
        Lang::JavaScript => &javascript::QUERIES,
        Lang::TypeScript | Lang::Tsx => &typescript::QUERIES,
        Lang::Rust => &rust::QUERIES,
        Lang::Ruby => &ruby::QUERIES,
        Lang::C => &c::QUERIES,
        Lang::Cpp => &cpp::QUERIES,
        Lang::Java => &java::QUERIES,
        Lang::Swift => &swift::QUERIES,
        Lang::CSharp => &csharp::QUERIES,
        Lang::Php => &php::QUERIES,
        Lang::Dart => &dart::QUERIES,
        Lang::Bash => &bash::QUERIES,
        Lang::Kotlin | Lang::R => {
            const EMPTY: LanguageQueries = LanguageQueries::empty();
            &EMPTY
        }
    }
}
