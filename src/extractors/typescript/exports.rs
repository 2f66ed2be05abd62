// Export resolution
//
// Finds the prop-type name of a module's default-exported component. Three
// idioms are tried in order:
//
// 1. `class X extends Base<P> {}` exported by name (`export default X`,
//    `export { X as default }`)
// 2. `export default class X extends Base<P> {}`
// 3. a default export that is itself imported or re-exported from a relative
//    module, followed exactly one hop

use std::sync::Arc;

use tracing::debug;

use super::imports::{find_import_binding, is_relative, load_import, string_child, DEFAULT_EXPORT};
use super::PropsExtractor;
use crate::error::ApiError;
use crate::extractors::base::{
    HeritageToken, NodeData, NodeRef, QueryStep, SyntaxKind, SyntaxTree,
};

/// A prop-type name plus the module whose scope it must be resolved in
#[derive(Debug, Clone)]
pub struct PropTypeRef {
    pub module: Arc<SyntaxTree>,
    pub name: String,
}

/// How a module's default export is bound
#[derive(Debug, Clone, PartialEq, Eq)]
enum DefaultExport {
    /// A name declared or imported in this module
    Local(String),
    /// `export { name as default } from 'source'`
    Forwarded { imported: String, source: String },
}

pub(super) fn find_prop_type(
    ex: &mut PropsExtractor<'_>,
    module: &Arc<SyntaxTree>,
) -> Result<Option<PropTypeRef>, ApiError> {
    let root = module.root();
    if let Some(name) = find_local_prop_type(root) {
        return Ok(Some(PropTypeRef {
            module: Arc::clone(module),
            name,
        }));
    }
    find_reexported_prop_type(ex, module)
}

/// Idioms 1 and 2, within a single module
fn find_local_prop_type(root: NodeRef<'_>) -> Option<String> {
    find_export_define(root).or_else(|| find_export_directly(root))
}

/// Idiom 1: default export names a class declared in this module
fn find_export_define(root: NodeRef<'_>) -> Option<String> {
    let Some(DefaultExport::Local(local)) = default_export(root) else {
        return None;
    };
    let class = find_class(root, &local)?;
    class_prop_type(class)
}

/// Idiom 2: `export default class X extends Base<P>`
fn find_export_directly(root: NodeRef<'_>) -> Option<String> {
    root.query_match(&[
        QueryStep::descendant(SyntaxKind::ExportKeyword),
        QueryStep::next(SyntaxKind::DefaultKeyword),
        QueryStep::next(SyntaxKind::Identifier),
        QueryStep::next(SyntaxKind::HeritageClause),
        QueryStep::child(SyntaxKind::ExpressionWithTypeArguments),
        QueryStep::descendant(SyntaxKind::TypeReference),
    ])
    .and_then(|reference| reference.name())
    .map(str::to_string)
}

/// Idiom 3: the default export comes from another module
fn find_reexported_prop_type(
    ex: &mut PropsExtractor<'_>,
    module: &Arc<SyntaxTree>,
) -> Result<Option<PropTypeRef>, ApiError> {
    let Some((imported, source)) = forwarded_binding(module.root(), DEFAULT_EXPORT) else {
        return Ok(None);
    };
    if !is_relative(&source) {
        debug!(
            "Default export of {} comes from package '{}', not followed",
            module.path().display(),
            source
        );
        return Ok(None);
    }

    let target = load_import(ex, module, &source)?;
    let target_root = target.root();
    let name = if imported == DEFAULT_EXPORT {
        find_local_prop_type(target_root)
    } else {
        find_class(target_root, &imported).and_then(class_prop_type)
    };

    match name {
        Some(name) => Ok(Some(PropTypeRef {
            module: Arc::clone(&target),
            name,
        })),
        None if forwarded_binding(target_root, &imported).is_some() => {
            Err(ApiError::UnsupportedExportChain {
                path: module.path().to_path_buf(),
            })
        }
        None => Ok(None),
    }
}

/// The binding behind `export default` in this module, if any
fn default_export(root: NodeRef<'_>) -> Option<DefaultExport> {
    // export default Name;
    if let Some(value) = root.query_match(&[
        QueryStep::descendant(SyntaxKind::ExportAssignment),
        QueryStep::child(SyntaxKind::Identifier),
    ]) {
        return value.name().map(|name| DefaultExport::Local(name.to_string()));
    }

    // export { Name as default } [from '...']
    let specifier = find_export_specifier(root, DEFAULT_EXPORT)?;
    let NodeData::ExportSpecifier { name, .. } = specifier.data() else {
        return None;
    };
    let declaration = specifier.ancestor(|n| n.is(SyntaxKind::ExportDeclaration))?;
    Some(match string_child(declaration) {
        Some(source) => DefaultExport::Forwarded {
            imported: name.clone(),
            source,
        },
        None => DefaultExport::Local(name.clone()),
    })
}

/// `(imported name, specifier)` when export `exported` is bound by another module
fn forwarded_binding(root: NodeRef<'_>, exported: &str) -> Option<(String, String)> {
    let local = if exported == DEFAULT_EXPORT {
        match default_export(root)? {
            DefaultExport::Forwarded { imported, source } => return Some((imported, source)),
            DefaultExport::Local(local) => local,
        }
    } else {
        match find_export_specifier(root, exported) {
            Some(specifier) => {
                let NodeData::ExportSpecifier { name, .. } = specifier.data() else {
                    return None;
                };
                let declaration = specifier.ancestor(|n| n.is(SyntaxKind::ExportDeclaration))?;
                if let Some(source) = string_child(declaration) {
                    return Some((name.clone(), source));
                }
                name.clone()
            }
            None => exported.to_string(),
        }
    };

    find_import_binding(root, &local).map(|binding| (binding.imported, binding.source))
}

fn find_export_specifier<'t>(root: NodeRef<'t>, exported: &str) -> Option<NodeRef<'t>> {
    root.query_match(&[
        QueryStep::descendant(SyntaxKind::ExportDeclaration),
        QueryStep::child(SyntaxKind::NamedExports),
        QueryStep::child(SyntaxKind::ExportSpecifier).filter(|n| n.name() == Some(exported)),
    ])
}

fn find_class<'t>(root: NodeRef<'t>, name: &str) -> Option<NodeRef<'t>> {
    root.child(
        |n| n.is(SyntaxKind::ClassDeclaration) && n.name() == Some(name),
        None,
    )
}

/// First type reference, in level order, among the `extends` target's type arguments
fn class_prop_type(class: NodeRef<'_>) -> Option<String> {
    class
        .query_match(&[
            QueryStep::child(SyntaxKind::HeritageClause).filter(|n| {
                matches!(
                    n.data(),
                    NodeData::HeritageClause {
                        token: HeritageToken::Extends
                    }
                )
            }),
            QueryStep::child(SyntaxKind::ExpressionWithTypeArguments),
            QueryStep::descendant(SyntaxKind::TypeReference),
        ])
        .and_then(|reference| reference.name())
        .map(str::to_string)
}
