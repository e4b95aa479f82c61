//! Go queries

use super::LanguageQueries;

pub const QUERIES: LanguageQueries = LanguageQueries {
    symbols: &[r#"
        (function_declaration
          name: (identifier) @func.name
          parameters: (parameter_list) @func.params
          result: (_)? @func.result) @func.def

        (method_declaration
          receiver: (parameter_list) @func.receiver
          name: (field_identifier) @func.name
          parameters: (parameter_list) @func.params
          result: (_)? @func.result) @func.def

        (type_declaration
          (type_spec name: (type_identifier) @type.name type: (struct_type) @type.struct)) @type.def
        (type_declaration
          (type_spec name: (type_identifier) @type.name type: (interface_type) @type.interface)) @type.def
        (type_declaration
          (type_spec name: (type_identifier) @type.name
            type: [(type_identifier) (qualified_type) (map_type) (slice_type) (function_type)] @type.alias)) @type.def
    "#],
    imports: &[r#"
        (import_spec path: (interpreted_string_literal) @import.path) @import
    "#],
    calls: &[r#"
        (call_expression
          function: (identifier) @call.name
          arguments: (argument_list) @call.args) @call

        (call_expression
          function: (selector_expression
            operand: (_) @call.receiver
            field: (field_identifier) @call.name)
          arguments: (argument_list) @call.args) @call
    "#],
    package: &[r#"
        (package_clause (package_identifier) @package)
    "#],
};
