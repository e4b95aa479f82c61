//! Prompt builders — the only textual artifacts the core sends to an LLM

use crate::client::Message;

/// System prompt for symbol explanations.
pub const EXPLAIN_SYSTEM_PROMPT: &str = "You are an expert code reader. Explain what the given \
symbol does, how it is used, and anything surprising about it. Be concrete and concise; do not \
restate the code line by line.";

/// System prompt for module summaries.
pub const SUMMARIZE_SYSTEM_PROMPT: &str = "You are an expert code reader. Summarize the module \
below: its purpose, its main entry points, and how its files relate. Three to six sentences.";

/// Lines kept per file in a module summary.
const MODULE_SNIPPET_LINES: usize = 100;

/// Everything known about a symbol worth showing to the model.
#[derive(Debug, Clone, Default)]
pub struct SymbolSource {
    pub name: String,
    pub language: String,
    pub signature: Option<String>,
    pub doc: Option<String>,
    pub source: String,
}

/// Prompt asking the model to explain one symbol.
pub fn explain_symbol_prompt(symbol: &SymbolSource) -> Vec<Message> {
    let mut user = format!(
        "Explain the symbol `{}`.\n\n```{}\n{}\n```",
        symbol.name, symbol.language, symbol.source
    );
    if let Some(signature) = &symbol.signature {
        user.push_str(&format!("\n\nSignature: `{signature}`"));
    }
    if let Some(doc) = &symbol.doc {
        if !doc.is_empty() {
            user.push_str(&format!("\n\nExisting documentation:\n{doc}"));
        }
    }
    vec![Message::system(EXPLAIN_SYSTEM_PROMPT), Message::user(user)]
}

/// Prompt asking the model to summarize a module from its files. Each
/// file contributes at most 100 lines.
pub fn summarize_module_prompt(module_path: &str, sources: &[(String, String)]) -> Vec<Message> {
    let mut user = format!("Summarize the module `{module_path}`.\n");
    for (file, source) in sources {
        let snippet: Vec<&str> = source.lines().take(MODULE_SNIPPET_LINES).collect();
        let truncated = if source.lines().count() > MODULE_SNIPPET_LINES {
            "\n… (truncated)"
        } else {
            ""
        };
        user.push_str(&format!(
            "\n`{file}`:\n```\n{}{truncated}\n```\n",
            snippet.join("\n")
        ));
    }
    vec![Message::system(SUMMARIZE_SYSTEM_PROMPT), Message::user(user)]
}

/// Symbol explanation enriched with its direct call graph.
pub fn call_graph_explain_prompt(
    symbol: &SymbolSource,
    callers: &[String],
    callees: &[String],
) -> Vec<Message> {
    let mut messages = explain_symbol_prompt(symbol);
    let mut context = String::new();
    if !callers.is_empty() {
        context.push_str(&format!("\n\nCalled by: {}", callers.join(", ")));
    }
    if !callees.is_empty() {
        context.push_str(&format!("\nCalls: {}", callees.join(", ")));
    }
    if !context.is_empty() {
        if let Some(user) = messages.last_mut() {
            user.content.push_str(&context);
        }
    }
    messages
}
