//! C++ queries
//!
//! In-class method bodies use a `field_identifier` declarator;
//! out-of-class definitions a `qualified_identifier`. Both patterns
//! funnel into the same capture names.

use super::LanguageQueries;

pub const QUERIES: LanguageQueries = LanguageQueries {
    symbols: &[r#"
        (function_definition
          type: (_)? @func.result
          declarator: (function_declarator
            declarator: (identifier) @func.name
            parameters: (parameter_list) @func.params)) @func.def

        (function_definition
          type: (_)? @func.result
          declarator: (function_declarator
            declarator: (field_identifier) @func.name
            parameters: (parameter_list) @func.params)) @func.def

        (function_definition
          type: (_)? @func.result
          declarator: (function_declarator
            declarator: (qualified_identifier name: (identifier) @func.name)
            parameters: (parameter_list) @func.params)) @func.def

        (class_specifier
          name: (type_identifier) @type.name
          body: (field_declaration_list)) @type.def @type.class
        (struct_specifier
          name: (type_identifier) @type.name
          body: (field_declaration_list)) @type.def @type.struct
        (enum_specifier
          name: (type_identifier) @type.name
          body: (enumerator_list)) @type.def @type.enum
    "#],
    imports: &[r#"
        (preproc_include path: (string_literal) @import.path) @import
        (preproc_include path: (system_lib_string) @import.path) @import
    "#],
    calls: &[r#"
        (call_expression
          function: (identifier) @call.name
          arguments: (argument_list) @call.args) @call

        (call_expression
          function: (field_expression
            argument: (_) @call.receiver
            field: (field_identifier) @call.name)
          arguments: (argument_list) @call.args) @call
    "#],
    package: &[],
};
