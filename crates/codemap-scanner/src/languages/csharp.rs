//! C# queries

use super::LanguageQueries;

pub const QUERIES: LanguageQueries = LanguageQueries {
    symbols: &[r#"
        (method_declaration
          name: (identifier) @func.name
          parameters: (parameter_list) @func.params) @func.def

        (constructor_declaration
          name: (identifier) @func.name
          parameters: (parameter_list) @func.params) @func.def

        (class_declaration name: (identifier) @type.name) @type.def @type.class
        (interface_declaration name: (identifier) @type.name) @type.def @type.interface
        (struct_declaration name: (identifier) @type.name) @type.def @type.struct
        (enum_declaration name: (identifier) @type.name) @type.def @type.enum
    "#],
    imports: &[r#"
        (using_directive (qualified_name) @import.path) @import
        (using_directive (identifier) @import.path) @import
    "#],
    calls: &[r#"
        (invocation_expression
          function: (identifier) @call.name
          arguments: (argument_list) @call.args) @call

        (invocation_expression
          function: (member_access_expression
            expression: (_) @call.receiver
            name: (identifier) @call.name)
          arguments: (argument_list) @call.args) @call
    "#],
    package: &[],
};
