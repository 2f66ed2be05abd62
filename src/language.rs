//! Language Support - tree-sitter grammar selection
//!
//! All grammar configuration lives here: which tree-sitter language parses a
//! given module, and which file extensions count as TypeScript sources.

use anyhow::Result;
use std::path::Path;

/// Get tree-sitter language parser for a given language name
///
/// # Supported Languages
///
/// **typescript**: `.ts`, `.d.ts`, `.mts`, `.cts`
/// **tsx**: `.tsx`, plus `.js`/`.jsx` (the TSX grammar is a superset that accepts JSX)
pub fn get_tree_sitter_language(language: &str) -> Result<tree_sitter::Language> {
    match language {
        "typescript" => Ok(tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()),
        "tsx" => Ok(tree_sitter_typescript::LANGUAGE_TSX.into()),
        _ => Err(anyhow::anyhow!(
            "Unsupported language: '{}'. Supported languages: typescript, tsx",
            language
        )),
    }
}

/// Detect language from file extension
///
/// Returns the language name that can be passed to `get_tree_sitter_language()`.
pub fn detect_language_from_extension(extension: &str) -> Option<&'static str> {
    match extension {
        "ts" | "mts" | "cts" => Some("typescript"),
        "tsx" | "js" | "jsx" | "mjs" | "cjs" => Some("tsx"),
        _ => None,
    }
}

/// Detect the grammar for a module path, defaulting to TypeScript
pub fn detect_language(path: &Path) -> &'static str {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(detect_language_from_extension)
        .unwrap_or("typescript")
}
