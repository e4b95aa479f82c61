//! Transient scanner output consumed by the graph builder

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// How much detail a scan fills in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailLevel {
    /// Names and positions only.
    Names,
    /// Plus reconstructed signatures and visibility.
    Signatures,
    /// Plus call sites and doc strings.
    Full,
}

/// Everything extracted from a single source file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FileAnalysis {
    pub path: String,
    pub language: String,
    /// Package the file belongs to (language-specific: Go package
    /// clause, Python module name, directory name elsewhere).
    pub package: String,
    pub functions: Vec<FuncInfo>,
    pub types: Vec<TypeInfo>,
    pub imports: Vec<String>,
    pub calls: Vec<CallInfo>,
}

/// A function or method declaration.
///
/// Serializes to JSON either as a bare name string (when only `name`
/// is set) or as a full object. Consumers that only read names keep
/// working against either shape.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FuncInfo {
    pub name: String,
    /// Receiver type for methods; empty for free functions.
    pub receiver: String,
    pub params: String,
    pub result: String,
    pub signature: String,
    pub doc: String,
    pub line: u32,
    pub end_line: u32,
    pub exported: bool,
    /// Declared parameter count; -1 for variadic or unknown.
    pub param_count: i32,
    /// SHA-256 of the definition's source span; empty when not computed.
    pub content_hash: String,
}

impl FuncInfo {
    pub fn named(name: &str) -> Self {
        FuncInfo {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// True when every field except `name` still holds its default.
    fn is_bare(&self) -> bool {
        self.receiver.is_empty()
            && self.params.is_empty()
            && self.result.is_empty()
            && self.signature.is_empty()
            && self.doc.is_empty()
            && self.line == 0
            && self.end_line == 0
            && !self.exported
            && self.param_count == 0
            && self.content_hash.is_empty()
    }
}

/// Mirror of `FuncInfo` used for the full-object wire shape.
#[derive(Serialize, Deserialize)]
struct FuncInfoRepr {
    name: String,
    #[serde(default)]
    receiver: String,
    #[serde(default)]
    params: String,
    #[serde(default)]
    result: String,
    #[serde(default)]
    signature: String,
    #[serde(default)]
    doc: String,
    #[serde(default)]
    line: u32,
    #[serde(default)]
    end_line: u32,
    #[serde(default)]
    exported: bool,
    #[serde(default)]
    param_count: i32,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    content_hash: String,
}

impl Serialize for FuncInfo {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.is_bare() {
            serializer.serialize_str(&self.name)
        } else {
            FuncInfoRepr {
                name: self.name.clone(),
                receiver: self.receiver.clone(),
                params: self.params.clone(),
                result: self.result.clone(),
                signature: self.signature.clone(),
                doc: self.doc.clone(),
                line: self.line,
                end_line: self.end_line,
                exported: self.exported,
                param_count: self.param_count,
                content_hash: self.content_hash.clone(),
            }
            .serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for FuncInfo {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Bare(String),
            Full(FuncInfoRepr),
        }

        match Wire::deserialize(deserializer)? {
            Wire::Bare(name) => Ok(FuncInfo::named(&name)),
            Wire::Full(r) => {
                if r.name.is_empty() {
                    return Err(de::Error::custom("function info requires a name"));
                }
                Ok(FuncInfo {
                    name: r.name,
                    receiver: r.receiver,
                    params: r.params,
                    result: r.result,
                    signature: r.signature,
                    doc: r.doc,
                    line: r.line,
                    end_line: r.end_line,
                    exported: r.exported,
                    param_count: r.param_count,
                    content_hash: r.content_hash,
                })
            }
        }
    }
}

/// Which marker a type declaration matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeMarker {
    Struct,
    Class,
    Interface,
    Trait,
    Enum,
    Alias,
    Protocol,
}

/// A type declaration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TypeInfo {
    pub name: String,
    pub marker: TypeMarker,
    pub line: u32,
    pub end_line: u32,
    #[serde(default)]
    pub doc: String,
    #[serde(default)]
    pub exported: bool,
    #[serde(default)]
    pub fields: Vec<String>,
    #[serde(default)]
    pub methods: Vec<String>,
}

/// A call site.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CallInfo {
    /// Callee name as written (without receiver qualification).
    pub callee: String,
    /// Enclosing function at the call site; empty at top level.
    pub caller: String,
    /// Receiver expression, where the syntax exposes one.
    pub receiver: String,
    pub line: u32,
    /// -1 when the argument list cannot be counted (spread forms).
    pub arg_count: i32,
}

/// Per-file call accessor used by the incremental builder.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CallAnalysis {
    pub path: String,
    pub calls: Vec<CallInfo>,
}
