//! Rust queries
//!
//! `impl` blocks are captured as containers only: the methods inside
//! get the impl type as their receiver, while the type node itself
//! comes from the struct/enum declaration.

use super::LanguageQueries;

pub const QUERIES: LanguageQueries = LanguageQueries {
    symbols: &[r#"
        (function_item
          (visibility_modifier)? @func.vis
          name: (identifier) @func.name
          parameters: (parameters) @func.params
          return_type: (_)? @func.result) @func.def

        (struct_item (visibility_modifier)? @type.vis name: (type_identifier) @type.name) @type.def @type.struct
        (enum_item (visibility_modifier)? @type.vis name: (type_identifier) @type.name) @type.def @type.enum
        (trait_item (visibility_modifier)? @type.vis name: (type_identifier) @type.name) @type.def @type.trait
        (type_item (visibility_modifier)? @type.vis name: (type_identifier) @type.name) @type.def @type.alias

        (impl_item type: (type_identifier) @container.name) @container.def
        (impl_item type: (generic_type type: (type_identifier) @container.name)) @container.def
    "#],
    imports: &[r#"
        (use_declaration argument: (_) @import.path) @import
    "#],
    calls: &[r#"
        (call_expression
          function: (identifier) @call.name
          arguments: (arguments) @call.args) @call

        (call_expression
          function: (scoped_identifier name: (identifier) @call.name)
          arguments: (arguments) @call.args) @call

        (call_expression
          function: (field_expression
            value: (_) @call.receiver
            field: (field_identifier) @call.name)
          arguments: (arguments) @call.args) @call
    "#],
    package: &[],
};
