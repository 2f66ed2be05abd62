// Import binding lookup
//
// Maps a local name back to the module specifier it was imported from, and
// loads relative specifiers through the module cache.

use std::sync::Arc;

use tracing::debug;

use super::PropsExtractor;
use crate::error::ApiError;
use crate::extractors::base::{NodeData, NodeRef, QueryStep, SyntaxKind, SyntaxTree};
use crate::utils::paths::resolve_module_specifier;

/// Export name of a module's default binding
pub(super) const DEFAULT_EXPORT: &str = "default";

/// Where a local name comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct ImportBinding {
    /// Name exported by the source module (`default` for default imports)
    pub imported: String,
    /// Module specifier exactly as written
    pub source: String,
}

/// Find the import that binds `local` in this module
///
/// Named specifiers (`import { A as local }`) are checked before default
/// imports (`import local from`). Namespace imports never bind a type name.
pub(super) fn find_import_binding(root: NodeRef<'_>, local: &str) -> Option<ImportBinding> {
    let named = root.query_match(&[
        QueryStep::descendant(SyntaxKind::NamedImports),
        QueryStep::child(SyntaxKind::ImportSpecifier).filter(|n| n.name() == Some(local)),
    ]);
    if let Some(specifier) = named {
        let NodeData::ImportSpecifier { name, .. } = specifier.data() else {
            return None;
        };
        return import_source(specifier).map(|source| ImportBinding {
            imported: name.clone(),
            source,
        });
    }

    let default = root.query_match(&[
        QueryStep::descendant(SyntaxKind::ImportClause),
        QueryStep::child(SyntaxKind::Identifier).filter(|n| n.name() == Some(local)),
    ])?;
    import_source(default).map(|source| ImportBinding {
        imported: DEFAULT_EXPORT.to_string(),
        source,
    })
}

/// Module specifier of the declaration `node` sits in
fn import_source(node: NodeRef<'_>) -> Option<String> {
    let declaration = node.ancestor(|n| n.is(SyntaxKind::ImportDeclaration))?;
    string_child(declaration)
}

/// Value of the first direct `StringLiteral` child
pub(super) fn string_child(node: NodeRef<'_>) -> Option<String> {
    match node.child(|n| n.is(SyntaxKind::StringLiteral), Some(1))?.data() {
        NodeData::StringLiteral { value } => Some(value.clone()),
        _ => None,
    }
}

/// Only `./` and `../` specifiers point into the project
pub(super) fn is_relative(specifier: &str) -> bool {
    specifier == "."
        || specifier == ".."
        || specifier.starts_with("./")
        || specifier.starts_with("../")
}

/// Load the module a relative specifier in `from` refers to
pub(super) fn load_import(
    ex: &mut PropsExtractor<'_>,
    from: &SyntaxTree,
    specifier: &str,
) -> Result<Arc<SyntaxTree>, ApiError> {
    let target = resolve_module_specifier(from.path(), specifier);
    debug!(
        "🔗 Following '{}' from {} to {}",
        specifier,
        from.path().display(),
        target.display()
    );
    ex.cache_mut().get_or_load(&target)
}
