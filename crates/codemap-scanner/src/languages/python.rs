//! Python queries
//!
//! Methods are not distinguished here; the extractor classifies any
//! function nested inside a captured class span.

use super::LanguageQueries;

pub const QUERIES: LanguageQueries = LanguageQueries {
    symbols: &[r#"
        (function_definition
          name: (identifier) @func.name
          parameters: (parameters) @func.params
          return_type: (type)? @func.result) @func.def

        (class_definition name: (identifier) @type.name) @type.def @type.class
    "#],
    imports: &[r#"
        (import_statement name: (dotted_name) @import.path) @import
        (import_statement name: (aliased_import name: (dotted_name) @import.path)) @import
        (import_from_statement module_name: (dotted_name) @import.path) @import
    "#],
    calls: &[r#"
        (call
          function: (identifier) @call.name
          arguments: (argument_list) @call.args) @call

        (call
          function: (attribute
            object: (_) @call.receiver
            attribute: (identifier) @call.name)
          arguments: (argument_list) @call.args) @call
    "#],
    package: &[],
};
