//! Ruby queries
//!
//! Modules are reported with the class marker; the fixed marker set
//! has no closer fit.

use super::LanguageQueries;

pub const QUERIES: LanguageQueries = LanguageQueries {
    symbols: &[r#"
        (method
          name: (identifier) @func.name
          parameters: (method_parameters)? @func.params) @func.def

        (singleton_method
          name: (identifier) @func.name
          parameters: (method_parameters)? @func.params) @func.def

        (class name: (constant) @type.name) @type.def @type.class
        (module name: (constant) @type.name) @type.def @type.class
    "#],
    imports: &[r#"
        (call
          method: (identifier) @import.fn
          arguments: (argument_list (string (string_content) @import.path))
          (#eq? @import.fn "require")) @import

        (call
          method: (identifier) @import.fn
          arguments: (argument_list (string (string_content) @import.path))
          (#eq? @import.fn "require_relative")) @import
    "#],
    calls: &[r#"
        (call
          receiver: (_)? @call.receiver
          method: (identifier) @call.name
          arguments: (argument_list)? @call.args) @call
    "#],
    package: &[],
};
