//! Dart queries
//!
//! Call extraction is best-effort: the orchard grammar models call
//! sites as selector chains, which the fallback variant approximates.

use super::LanguageQueries;

pub const QUERIES: LanguageQueries = LanguageQueries {
    symbols: &[
        r#"
        (function_declaration name: (identifier) @func.name) @func.def
        (method_declaration name: (identifier) @func.name) @func.def
        (class_declaration name: (identifier) @type.name) @type.def @type.class
        (enum_declaration name: (identifier) @type.name) @type.def @type.enum
        "#,
        r#"
        (function_declaration (identifier) @func.name) @func.def
        (class_declaration (identifier) @type.name) @type.def @type.class
        "#,
    ],
    imports: &[r#"
        (import_or_export (import_specification (uri) @import.path)) @import
    "#],
    calls: &[r#"
        ((identifier) @call.name (selector (argument_part (arguments) @call.args))) @call
    "#],
    package: &[],
};
