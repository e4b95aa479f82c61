//! Java queries

use super::LanguageQueries;

pub const QUERIES: LanguageQueries = LanguageQueries {
    symbols: &[r#"
        (method_declaration
          type: (_) @func.result
          name: (identifier) @func.name
          parameters: (formal_parameters) @func.params) @func.def

        (constructor_declaration
          name: (identifier) @func.name
          parameters: (formal_parameters) @func.params) @func.def

        (class_declaration name: (identifier) @type.name) @type.def @type.class
        (interface_declaration name: (identifier) @type.name) @type.def @type.interface
        (enum_declaration name: (identifier) @type.name) @type.def @type.enum
    "#],
    imports: &[r#"
        (import_declaration (scoped_identifier) @import.path) @import
    "#],
    calls: &[r#"
        (method_invocation
          object: (_)? @call.receiver
          name: (identifier) @call.name
          arguments: (argument_list) @call.args) @call

        (object_creation_expression
          type: (type_identifier) @call.name
          arguments: (argument_list) @call.args) @call
    "#],
    package: &[r#"
        (package_declaration (scoped_identifier) @package)
    "#],
};
