//! JavaScript queries

use super::LanguageQueries;

pub const QUERIES: LanguageQueries = LanguageQueries {
    symbols: &[r#"
        (function_declaration
          name: (identifier) @func.name
          parameters: (formal_parameters) @func.params) @func.def

        (method_definition
          name: (property_identifier) @func.name
          parameters: (formal_parameters) @func.params) @func.def

        (variable_declarator
          name: (identifier) @func.name
          value: (arrow_function parameters: (formal_parameters) @func.params)) @func.def

        (class_declaration name: (identifier) @type.name) @type.def @type.class
    "#],
    imports: &[r#"
        (import_statement source: (string) @import.path) @import
        (call_expression
          function: (identifier) @import.fn
          arguments: (arguments (string) @import.path)
          (#eq? @import.fn "require")) @import
    "#],
    calls: &[r#"
        (call_expression
          function: (identifier) @call.name
          arguments: (arguments) @call.args) @call

        (call_expression
          function: (member_expression
            object: (_) @call.receiver
            property: (property_identifier) @call.name)
          arguments: (arguments) @call.args) @call
    "#],
    package: &[],
};
