//! Swift queries
//!
//! The Swift grammar moves faster than most; the fallback variants
//! keep symbol extraction alive when a field name shifts.

use super::LanguageQueries;

pub const QUERIES: LanguageQueries = LanguageQueries {
    symbols: &[
        r#"
        (function_declaration name: (simple_identifier) @func.name) @func.def
        (class_declaration name: (type_identifier) @type.name) @type.def @type.class
        (protocol_declaration name: (type_identifier) @type.name) @type.def @type.protocol
        "#,
        r#"
        (function_declaration (simple_identifier) @func.name) @func.def
        (class_declaration (type_identifier) @type.name) @type.def @type.class
        "#,
    ],
    imports: &[r#"
        (import_declaration (identifier) @import.path) @import
    "#],
    calls: &[r#"
        (call_expression (simple_identifier) @call.name) @call
    "#],
    package: &[],
};
