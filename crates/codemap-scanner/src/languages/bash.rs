//! Bash queries
//!
//! Shell functions declare no parameters, so every function reports an
//! unknown arity and the call filter never drops on arity grounds.

use super::LanguageQueries;

pub const QUERIES: LanguageQueries = LanguageQueries {
    symbols: &[r#"
        (function_definition name: (word) @func.name) @func.def
    "#],
    imports: &[r#"
        (command
          name: (command_name (word) @import.fn)
          argument: (word) @import.path
          (#eq? @import.fn "source")) @import
    "#],
    calls: &[r#"
        (command name: (command_name (word) @call.name)) @call
    "#],
    package: &[],
};
