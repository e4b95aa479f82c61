//! TypeScript queries (shared by .ts and .tsx)

use super::LanguageQueries;

pub const QUERIES: LanguageQueries = LanguageQueries {
    symbols: &[r#"
        (function_declaration
          name: (identifier) @func.name
          parameters: (formal_parameters) @func.params
          return_type: (type_annotation)? @func.result) @func.def

        (method_definition
          name: (property_identifier) @func.name
          parameters: (formal_parameters) @func.params
          return_type: (type_annotation)? @func.result) @func.def

        (variable_declarator
          name: (identifier) @func.name
          value: (arrow_function parameters: (formal_parameters) @func.params)) @func.def

        (class_declaration name: (type_identifier) @type.name) @type.def @type.class
        (interface_declaration name: (type_identifier) @type.name) @type.def @type.interface
        (type_alias_declaration name: (type_identifier) @type.name) @type.def @type.alias
        (enum_declaration name: (identifier) @type.name) @type.def @type.enum
    "#],
    imports: &[r#"
        (import_statement source: (string) @import.path) @import
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
