//! C queries

use super::LanguageQueries;

pub const QUERIES: LanguageQueries = LanguageQueries {
    symbols: &[r#"
        (function_definition
          type: (_) @func.result
          declarator: (function_declarator
            declarator: (identifier) @func.name
            parameters: (parameter_list) @func.params)) @func.def

        (struct_specifier
          name: (type_identifier) @type.name
          body: (field_declaration_list)) @type.def @type.struct
        (enum_specifier
          name: (type_identifier) @type.name
          body: (enumerator_list)) @type.def @type.enum
        (type_definition declarator: (type_identifier) @type.name) @type.def @type.alias
    "#],
    imports: &[r#"
        (preproc_include path: (string_literal) @import.path) @import
        (preproc_include path: (system_lib_string) @import.path) @import
    "#],
    calls: &[r#"
        (call_expression
          function: (identifier) @call.name
          arguments: (argument_list) @call.args) @call
    "#],
    package: &[],
};
