//! PHP queries

use super::LanguageQueries;

pub const QUERIES: LanguageQueries = LanguageQueries {
    symbols: &[r#"
        (function_definition
          name: (name) @func.name
          parameters: (formal_parameters) @func.params) @func.def

        (method_declaration
          name: (name) @func.name
          parameters: (formal_parameters) @func.params) @func.def

        (class_declaration name: (name) @type.name) @type.def @type.class
        (interface_declaration name: (name) @type.name) @type.def @type.interface
        (enum_declaration name: (name) @type.name) @type.def @type.enum
    "#],
    imports: &[r#"
        (namespace_use_declaration
          (namespace_use_clause (qualified_name) @import.path)) @import
    "#],
    calls: &[r#"
        (function_call_expression
          function: (name) @call.name
          arguments: (arguments) @call.args) @call

        (member_call_expression
          object: (_) @call.receiver
          name: (name) @call.name
          arguments: (arguments) @call.args) @call
    "#],
    package: &[r#"
        (namespace_definition name: (namespace_name) @package)
    "#],
};
