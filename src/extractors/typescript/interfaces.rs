// Type resolution
//
// Expands an interface or type alias into its ordered property names. Bases
// named in `extends` (or intersected into an alias) contribute their
// properties first, in clause order, followed by the type's own members.

use std::sync::Arc;

use tracing::debug;

use super::imports::{find_import_binding, is_relative, load_import, DEFAULT_EXPORT};
use super::PropsExtractor;
use crate::error::ApiError;
use crate::extractors::base::{
    HeritageToken, NodeData, NodeRef, QueryStep, Relation, SyntaxKind, SyntaxTree,
};

pub(super) fn resolve_type(
    ex: &mut PropsExtractor<'_>,
    module: &Arc<SyntaxTree>,
    name: &str,
) -> Result<Vec<String>, ApiError> {
    if let Some(props) = find_inline_definition(ex, module, name)? {
        return Ok(props);
    }
    if let Some(props) = find_related_definition(ex, module, name)? {
        return Ok(props);
    }
    Err(ApiError::TypeNotFound {
        path: module.path().to_path_buf(),
        name: name.to_string(),
    })
}

/// Look for the declaration of `name` in this module only
fn find_inline_definition(
    ex: &mut PropsExtractor<'_>,
    module: &Arc<SyntaxTree>,
    name: &str,
) -> Result<Option<Vec<String>>, ApiError> {
    let Some(declaration) = find_declaration(module.root(), name) else {
        return Ok(None);
    };

    if !ex.enter(module.path(), name) {
        return Err(ApiError::CyclicReference {
            path: module.path().to_path_buf(),
            name: name.to_string(),
        });
    }
    let props = collect_props(ex, module, declaration);
    ex.leave(module.path(), name);

    props.map(Some)
}

/// Look for `name` in the relative module it is imported from, one hop only
fn find_related_definition(
    ex: &mut PropsExtractor<'_>,
    module: &Arc<SyntaxTree>,
    name: &str,
) -> Result<Option<Vec<String>>, ApiError> {
    let Some(binding) = find_import_binding(module.root(), name) else {
        return Ok(None);
    };
    if binding.imported == DEFAULT_EXPORT {
        return Ok(None);
    }
    if !is_relative(&binding.source) {
        debug!(
            "`{}` comes from package '{}', not followed",
            name, binding.source
        );
        return Ok(None);
    }

    let linked = load_import(ex, module, &binding.source)?;
    find_inline_definition(ex, &linked, &binding.imported)
}

fn find_declaration<'t>(root: NodeRef<'t>, name: &str) -> Option<NodeRef<'t>> {
    root.query_match(&[QueryStep::new(Relation::Descendant, None).filter(|n| {
        matches!(
            n.kind(),
            SyntaxKind::InterfaceDeclaration | SyntaxKind::TypeAliasDeclaration
        ) && n.name() == Some(name)
    })])
}

fn collect_props(
    ex: &mut PropsExtractor<'_>,
    module: &Arc<SyntaxTree>,
    declaration: NodeRef<'_>,
) -> Result<Vec<String>, ApiError> {
    let mut bases = Vec::new();
    let mut own = Vec::new();

    match declaration.data() {
        NodeData::InterfaceDeclaration { .. } => {
            for clause in declaration.children().filter(is_extends_clause) {
                bases.extend(heritage_targets(clause));
            }
            own.extend(member_names(declaration));
        }
        NodeData::TypeAliasDeclaration { .. } => {
            let value = declaration.children().find(|n| {
                matches!(
                    n.kind(),
                    SyntaxKind::TypeLiteral | SyntaxKind::IntersectionType | SyntaxKind::TypeReference
                )
            });
            if let Some(value) = value {
                alias_shape(value, &mut bases, &mut own);
            }
        }
        _ => {}
    }

    let mut props = Vec::new();
    for base in bases {
        props.extend(resolve_type(ex, module, &base)?);
    }
    props.extend(own);
    Ok(props)
}

fn is_extends_clause(node: &NodeRef<'_>) -> bool {
    matches!(
        node.data(),
        NodeData::HeritageClause {
            token: HeritageToken::Extends
        }
    )
}

/// Base type names of one heritage clause, in order
fn heritage_targets<'t>(clause: NodeRef<'t>) -> impl Iterator<Item = String> + 't {
    clause
        .children()
        .filter(|target| target.is(SyntaxKind::ExpressionWithTypeArguments))
        .filter_map(|target| target.child(|n| n.is(SyntaxKind::Identifier), Some(1)))
        .filter_map(|identifier| identifier.name().map(str::to_string))
}

fn member_names<'t>(node: NodeRef<'t>) -> impl Iterator<Item = String> + 't {
    node.children().filter_map(|member| match member.data() {
        NodeData::PropertySignature { name } | NodeData::MethodSignature { name } => {
            Some(name.clone())
        }
        _ => None,
    })
}

/// Split an alias value into base references and literal members
fn alias_shape(value: NodeRef<'_>, bases: &mut Vec<String>, own: &mut Vec<String>) {
    match value.data() {
        NodeData::TypeReference { name } => bases.push(name.clone()),
        NodeData::TypeLiteral => own.extend(member_names(value)),
        NodeData::IntersectionType => {
            for operand in value.children() {
                match operand.data() {
                    NodeData::TypeReference { name } => bases.push(name.clone()),
                    NodeData::TypeLiteral => own.extend(member_names(operand)),
                    _ => {}
                }
            }
        }
        _ => {}
    }
}
