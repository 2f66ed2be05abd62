//! tree-sitter parser adapter
//!
//! Parses TypeScript/TSX with tree-sitter and lowers the concrete tree into a
//! [`SyntaxTree`]. The lowering keeps the compiler-style shape the resolvers
//! query against:
//!
//! - `export` / `default` on a declaration become `ExportKeyword` /
//!   `DefaultKeyword` nodes ahead of the declaration's name
//! - class and interface heritage becomes `HeritageClause` nodes holding one
//!   `ExpressionWithTypeArguments` per target
//! - interface members sit directly under the `InterfaceDeclaration`
//! - everything else is kept as `Unknown` so descendant searches still see it

use std::path::Path;

use anyhow::Context;
use tracing::debug;
use tree_sitter::{Node, Parser};

use crate::error::ApiError;
use crate::extractors::base::{HeritageToken, NodeData, NodeId, Span, SyntaxTree};
use crate::language::{detect_language, get_tree_sitter_language};

/// Turns source text into a lowered syntax tree
pub trait SourceParser {
    fn parse(&mut self, source: String, path: &Path) -> Result<SyntaxTree, ApiError>;
}

/// tree-sitter backed parser holding one parser per grammar
pub struct TsParser {
    typescript: Parser,
    tsx: Parser,
}

impl TsParser {
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self {
            typescript: parser_for("typescript")?,
            tsx: parser_for("tsx")?,
        })
    }
}

fn parser_for(language: &str) -> anyhow::Result<Parser> {
    let grammar = get_tree_sitter_language(language)?;
    let mut parser = Parser::new();
    parser
        .set_language(&grammar)
        .with_context(|| format!("Failed to load the {} grammar", language))?;
    Ok(parser)
}

impl SourceParser for TsParser {
    fn parse(&mut self, source: String, path: &Path) -> Result<SyntaxTree, ApiError> {
        let language = detect_language(path);
        let parser = match language {
            "tsx" => &mut self.tsx,
            _ => &mut self.typescript,
        };

        let Some(tree) = parser.parse(&source, None) else {
            return Err(ApiError::ParseError {
                path: path.to_path_buf(),
                line: 1,
                column: 0,
            });
        };

        let root = tree.root_node();
        if root.has_error() {
            let (line, column) = first_error(root)
                .map(|node| {
                    let position = node.start_position();
                    (position.row + 1, position.column)
                })
                .unwrap_or((1, 0));
            return Err(ApiError::ParseError {
                path: path.to_path_buf(),
                line,
                column,
            });
        }

        let lowered = SyntaxTree::with_root(
            path.to_path_buf(),
            source,
            NodeData::SourceFile,
            span_of(root),
        );
        let mut lowering = Lowering { tree: lowered };
        let root_id = lowering.tree.root_id();
        lowering.lower_children(root, root_id);

        debug!(
            "Parsed {} as {} ({} nodes)",
            path.display(),
            language,
            lowering.tree.len()
        );
        Ok(lowering.tree)
    }
}

/// Depth-first search for the first ERROR or MISSING node
fn first_error(node: Node) -> Option<Node> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let children: Vec<Node> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error)
}

fn span_of(node: Node) -> Span {
    Span::new(node.start_byte(), node.end_byte())
}

fn named_children(node: Node) -> Vec<Node> {
    let mut cursor = node.walk();
    let children = node
        .named_children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .collect();
    children
}

fn all_children(node: Node) -> Vec<Node> {
    let mut cursor = node.walk();
    let children = node.children(&mut cursor).collect();
    children
}

fn is_class(node: Node) -> bool {
    matches!(
        node.kind(),
        "class_declaration" | "abstract_class_declaration" | "class"
    )
}

type Modifier = (NodeData, Span);

struct Lowering {
    tree: SyntaxTree,
}

impl Lowering {
    fn text(&self, node: Node) -> String {
        self.tree
            .source()
            .get(node.start_byte()..node.end_byte())
            .unwrap_or("")
            .to_string()
    }

    fn unquoted(&self, node: Node) -> String {
        self.text(node)
            .trim_matches(|c| c == '"' || c == '\'' || c == '`')
            .to_string()
    }

    fn push(&mut self, parent: NodeId, data: NodeData, node: Node) -> NodeId {
        self.tree.push(parent, data, span_of(node))
    }

    fn push_modifiers(&mut self, parent: NodeId, modifiers: &[Modifier]) {
        for (data, span) in modifiers {
            self.tree.push(parent, data.clone(), *span);
        }
    }

    fn push_identifier(&mut self, parent: NodeId, node: Node) -> NodeId {
        let name = self.text(node);
        self.push(parent, NodeData::Identifier { name }, node)
    }

    fn lower_children(&mut self, node: Node, parent: NodeId) {
        for child in named_children(node) {
            self.lower(child, parent);
        }
    }

    fn lower(&mut self, node: Node, parent: NodeId) {
        self.lower_with(node, parent, &[]);
    }

    fn lower_with(&mut self, node: Node, parent: NodeId, modifiers: &[Modifier]) {
        match node.kind() {
            "import_statement" => self.lower_import(node, parent),
            "export_statement" => self.lower_export(node, parent),
            "class_declaration" | "abstract_class_declaration" | "class" => {
                self.lower_class(node, parent, modifiers)
            }
            "interface_declaration" => self.lower_interface(node, parent, modifiers),
            "type_alias_declaration" => self.lower_type_alias(node, parent, modifiers),
            "identifier"
            | "property_identifier"
            | "private_property_identifier"
            | "shorthand_property_identifier"
            | "type_identifier" => {
                self.push_identifier(parent, node);
            }
            "string" => self.lower_string(node, parent),
            _ => self.lower_unknown(node, parent, modifiers),
        }
    }

    fn lower_unknown(&mut self, node: Node, parent: NodeId, modifiers: &[Modifier]) {
        let id = self.push(
            parent,
            NodeData::Unknown {
                raw_kind: node.kind(),
            },
            node,
        );
        self.push_modifiers(id, modifiers);
        self.lower_children(node, id);
    }

    fn lower_string(&mut self, node: Node, parent: NodeId) {
        let value = self.unquoted(node);
        self.push(parent, NodeData::StringLiteral { value }, node);
    }

    // ------------------------------------------------------------------
    // Imports
    // ------------------------------------------------------------------

    fn lower_import(&mut self, node: Node, parent: NodeId) {
        let id = self.push(parent, NodeData::ImportDeclaration, node);
        for child in named_children(node) {
            match child.kind() {
                "import_clause" => self.lower_import_clause(child, id),
                _ => self.lower(child, id),
            }
        }
    }

    fn lower_import_clause(&mut self, node: Node, parent: NodeId) {
        let id = self.push(parent, NodeData::ImportClause, node);
        for child in named_children(node) {
            match child.kind() {
                "named_imports" => {
                    let named = self.push(id, NodeData::NamedImports, child);
                    for specifier in named_children(child) {
                        if specifier.kind() == "import_specifier" {
                            self.lower_specifier(specifier, named, true);
                        }
                    }
                }
                _ => self.lower(child, id),
            }
        }
    }

    /// `name [as alias]` in an import or export clause
    fn lower_specifier(&mut self, node: Node, parent: NodeId, is_import: bool) {
        let Some(name_node) = node.child_by_field_name("name") else {
            self.lower_unknown(node, parent, &[]);
            return;
        };
        let alias_node = node.child_by_field_name("alias");
        let name = self.unquoted(name_node);
        let alias = alias_node.map(|alias| self.unquoted(alias));

        let data = if is_import {
            NodeData::ImportSpecifier { name, alias }
        } else {
            NodeData::ExportSpecifier { name, alias }
        };
        let id = self.push(parent, data, node);
        self.push_identifier(id, name_node);
        if let Some(alias) = alias_node {
            self.push_identifier(id, alias);
        }
    }

    // ------------------------------------------------------------------
    // Exports
    // ------------------------------------------------------------------

    fn lower_export(&mut self, node: Node, parent: NodeId) {
        let children = all_children(node);
        let mut modifiers: Vec<Modifier> = Vec::new();
        if let Some(token) = children.iter().find(|c| c.kind() == "export") {
            modifiers.push((NodeData::ExportKeyword, span_of(*token)));
        }
        if let Some(token) = children.iter().find(|c| c.kind() == "default") {
            modifiers.push((NodeData::DefaultKeyword, span_of(*token)));
        }

        if let Some(declaration) = node.child_by_field_name("declaration") {
            self.lower_with(declaration, parent, &modifiers);
            return;
        }

        if let Some(value) = node.child_by_field_name("value") {
            if is_class(value) {
                self.lower_with(value, parent, &modifiers);
            } else {
                let id = self.push(parent, NodeData::ExportAssignment, node);
                self.lower(value, id);
            }
            return;
        }

        // `export = value;`
        if children.iter().any(|c| c.kind() == "=") {
            let id = self.push(parent, NodeData::ExportAssignment, node);
            self.lower_children(node, id);
            return;
        }

        if let Some(clause) = children.iter().find(|c| c.kind() == "export_clause") {
            let id = self.push(parent, NodeData::ExportDeclaration, node);
            let named = self.push(id, NodeData::NamedExports, *clause);
            for specifier in named_children(*clause) {
                if specifier.kind() == "export_specifier" {
                    self.lower_specifier(specifier, named, false);
                }
            }
            if let Some(source) = node.child_by_field_name("source") {
                self.lower_string(source, id);
            }
            return;
        }

        // `export * from '...'`, `export as namespace X`
        self.lower_unknown(node, parent, &[]);
    }

    // ------------------------------------------------------------------
    // Declarations
    // ------------------------------------------------------------------

    fn lower_class(&mut self, node: Node, parent: NodeId, modifiers: &[Modifier]) {
        let name_node = node.child_by_field_name("name");
        let name = name_node.map(|n| self.text(n));
        let id = self.push(parent, NodeData::ClassDeclaration { name }, node);
        self.push_modifiers(id, modifiers);

        for child in named_children(node) {
            match child.kind() {
                // Dropped so the modifier keywords stay adjacent to the name.
                "decorator" => {}
                "class_heritage" => self.lower_class_heritage(child, id),
                _ if Some(child.id()) == name_node.map(|n| n.id()) => {
                    self.push_identifier(id, child);
                }
                _ => self.lower(child, id),
            }
        }
    }

    fn lower_class_heritage(&mut self, node: Node, class: NodeId) {
        let clauses = named_children(node);
        let has_clauses = clauses
            .iter()
            .any(|c| matches!(c.kind(), "extends_clause" | "implements_clause"));

        if !has_clauses {
            // JavaScript shape: `extends <expr>` directly under class_heritage
            let heritage = self.push(
                class,
                NodeData::HeritageClause {
                    token: HeritageToken::Extends,
                },
                node,
            );
            self.lower_extends_targets(node, heritage);
            return;
        }

        for clause in clauses {
            match clause.kind() {
                "extends_clause" => {
                    let heritage = self.push(
                        class,
                        NodeData::HeritageClause {
                            token: HeritageToken::Extends,
                        },
                        clause,
                    );
                    self.lower_extends_targets(clause, heritage);
                }
                "implements_clause" => {
                    let heritage = self.push(
                        class,
                        NodeData::HeritageClause {
                            token: HeritageToken::Implements,
                        },
                        clause,
                    );
                    for target in named_children(clause) {
                        self.lower_heritage_type(target, heritage);
                    }
                }
                _ => self.lower(clause, class),
            }
        }
    }

    /// Pair each `extends` value expression with the type arguments after it
    fn lower_extends_targets(&mut self, clause: Node, heritage: NodeId) {
        let mut current: Option<NodeId> = None;
        for child in named_children(clause) {
            if child.kind() == "type_arguments" {
                let target = match current {
                    Some(target) => target,
                    None => self.push(heritage, NodeData::ExpressionWithTypeArguments, child),
                };
                self.lower_type_arguments(child, target);
            } else if child.kind() == "instantiation_expression" {
                let target = self.push(heritage, NodeData::ExpressionWithTypeArguments, child);
                for part in named_children(child) {
                    if part.kind() == "type_arguments" {
                        self.lower_type_arguments(part, target);
                    } else {
                        self.lower(part, target);
                    }
                }
                current = Some(target);
            } else {
                let target = self.push(heritage, NodeData::ExpressionWithTypeArguments, child);
                self.lower(child, target);
                current = Some(target);
            }
        }
    }

    /// A heritage target written in type syntax (`implements`, interface `extends`)
    fn lower_heritage_type(&mut self, node: Node, heritage: NodeId) {
        let target = self.push(heritage, NodeData::ExpressionWithTypeArguments, node);
        if node.kind() == "generic_type" {
            let name_node = node
                .child_by_field_name("name")
                .or_else(|| named_children(node).into_iter().next());
            if let Some(name_node) = name_node {
                self.push_identifier(target, name_node);
            }
            if let Some(arguments) = node.child_by_field_name("type_arguments") {
                self.lower_type_arguments(arguments, target);
            }
        } else {
            self.push_identifier(target, node);
        }
    }

    fn lower_interface(&mut self, node: Node, parent: NodeId, modifiers: &[Modifier]) {
        let name_node = node.child_by_field_name("name");
        let name = name_node.map(|n| self.text(n)).unwrap_or_default();
        let id = self.push(parent, NodeData::InterfaceDeclaration { name }, node);
        self.push_modifiers(id, modifiers);

        for child in named_children(node) {
            match child.kind() {
                _ if Some(child.id()) == name_node.map(|n| n.id()) => {
                    self.push_identifier(id, child);
                }
                "extends_type_clause" => {
                    let heritage = self.push(
                        id,
                        NodeData::HeritageClause {
                            token: HeritageToken::Extends,
                        },
                        child,
                    );
                    for target in named_children(child) {
                        self.lower_heritage_type(target, heritage);
                    }
                }
                "interface_body" | "object_type" => {
                    for member in named_children(child) {
                        self.lower_member(member, id);
                    }
                }
                _ => self.lower(child, id),
            }
        }
    }

    fn lower_type_alias(&mut self, node: Node, parent: NodeId, modifiers: &[Modifier]) {
        let name_node = node.child_by_field_name("name");
        let value_node = node.child_by_field_name("value");
        let name = name_node.map(|n| self.text(n)).unwrap_or_default();
        let id = self.push(parent, NodeData::TypeAliasDeclaration { name }, node);
        self.push_modifiers(id, modifiers);

        for child in named_children(node) {
            if Some(child.id()) == name_node.map(|n| n.id()) {
                self.push_identifier(id, child);
            } else if Some(child.id()) == value_node.map(|n| n.id()) {
                self.lower_type(child, id);
            } else {
                self.lower(child, id);
            }
        }
    }

    fn lower_member(&mut self, node: Node, parent: NodeId) {
        let name_node = node.child_by_field_name("name");
        match (node.kind(), name_node) {
            ("property_signature", Some(name_node)) => {
                let name = self.unquoted(name_node);
                let id = self.push(parent, NodeData::PropertySignature { name }, node);
                self.push_identifier(id, name_node);
                if let Some(annotation) = node.child_by_field_name("type") {
                    self.lower_type(annotation, id);
                }
            }
            ("method_signature", Some(name_node)) => {
                let name = self.unquoted(name_node);
                let id = self.push(parent, NodeData::MethodSignature { name }, node);
                self.push_identifier(id, name_node);
            }
            _ => self.lower(node, parent),
        }
    }

    // ------------------------------------------------------------------
    // Types
    // ------------------------------------------------------------------

    fn lower_type_arguments(&mut self, node: Node, parent: NodeId) {
        for argument in named_children(node) {
            self.lower_type(argument, parent);
        }
    }

    fn lower_type(&mut self, node: Node, parent: NodeId) {
        match node.kind() {
            "type_identifier" | "nested_type_identifier" => {
                let name = self.text(node);
                let id = self.push(parent, NodeData::TypeReference { name }, node);
                self.push_identifier(id, node);
            }
            "generic_type" => {
                let name_node = node
                    .child_by_field_name("name")
                    .or_else(|| named_children(node).into_iter().next());
                let name = name_node.map(|n| self.text(n)).unwrap_or_default();
                let id = self.push(parent, NodeData::TypeReference { name }, node);
                if let Some(name_node) = name_node {
                    self.push_identifier(id, name_node);
                }
                if let Some(arguments) = node.child_by_field_name("type_arguments") {
                    self.lower_type_arguments(arguments, id);
                }
            }
            "object_type" => {
                let id = self.push(parent, NodeData::TypeLiteral, node);
                for member in named_children(node) {
                    self.lower_member(member, id);
                }
            }
            "intersection_type" => {
                let id = self.push(parent, NodeData::IntersectionType, node);
                self.lower_intersection_operands(node, id);
            }
            // Transparent wrappers
            "type_annotation" | "parenthesized_type" => {
                for inner in named_children(node) {
                    self.lower_type(inner, parent);
                }
            }
            "identifier" | "property_identifier" => {
                self.push_identifier(parent, node);
            }
            "string" => self.lower_string(node, parent),
            _ => {
                let id = self.push(
                    parent,
                    NodeData::Unknown {
                        raw_kind: node.kind(),
                    },
                    node,
                );
                for inner in named_children(node) {
                    self.lower_type(inner, id);
                }
            }
        }
    }

    /// tree-sitter nests `A & B & C` left-deep; flatten it into one operand list
    fn lower_intersection_operands(&mut self, node: Node, intersection: NodeId) {
        for operand in named_children(node) {
            if operand.kind() == "intersection_type" {
                self.lower_intersection_operands(operand, intersection);
            } else {
                self.lower_type(operand, intersection);
            }
        }
    }
}
