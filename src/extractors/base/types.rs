// Syntax model shared by every extractor
//
// The tree-sitter CST is lowered into this arena so that the resolvers work on a
// closed set of node kinds with typed payloads instead of probing raw node text.

use std::path::{Path, PathBuf};

/// Byte range of a node in the original source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Index of a node inside its [`SyntaxTree`] arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

/// Payload-free node tag used by query filters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxKind {
    SourceFile,
    ExportKeyword,
    DefaultKeyword,
    ExportAssignment,
    ExportDeclaration,
    NamedExports,
    ExportSpecifier,
    ClassDeclaration,
    InterfaceDeclaration,
    TypeAliasDeclaration,
    HeritageClause,
    ExpressionWithTypeArguments,
    TypeReference,
    TypeLiteral,
    IntersectionType,
    PropertySignature,
    MethodSignature,
    Identifier,
    ImportDeclaration,
    ImportClause,
    NamedImports,
    ImportSpecifier,
    StringLiteral,
    Unknown,
}

/// Which keyword introduced a heritage clause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeritageToken {
    Extends,
    Implements,
}

/// Kind-specific node payload
///
/// Every kind the resolvers consume is its own variant; everything else the
/// grammar produces is kept as `Unknown` so breadth-first searches still see it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    SourceFile,
    ExportKeyword,
    DefaultKeyword,
    /// `export default <expr>;` or `export = <expr>;`
    ExportAssignment,
    /// `export { ... } [from '...']`
    ExportDeclaration,
    NamedExports,
    /// `name as alias` inside an export clause
    ExportSpecifier {
        name: String,
        alias: Option<String>,
    },
    ClassDeclaration {
        name: Option<String>,
    },
    InterfaceDeclaration {
        name: String,
    },
    TypeAliasDeclaration {
        name: String,
    },
    HeritageClause {
        token: HeritageToken,
    },
    /// One heritage target such as `Component<Props>`
    ExpressionWithTypeArguments,
    TypeReference {
        name: String,
    },
    TypeLiteral,
    IntersectionType,
    PropertySignature {
        name: String,
    },
    MethodSignature {
        name: String,
    },
    Identifier {
        name: String,
    },
    ImportDeclaration,
    ImportClause,
    NamedImports,
    /// `name as alias` inside an import clause
    ImportSpecifier {
        name: String,
        alias: Option<String>,
    },
    StringLiteral {
        value: String,
    },
    Unknown {
        raw_kind: &'static str,
    },
}

impl NodeData {
    pub fn kind(&self) -> SyntaxKind {
        match self {
            NodeData::SourceFile => SyntaxKind::SourceFile,
            NodeData::ExportKeyword => SyntaxKind::ExportKeyword,
            NodeData::DefaultKeyword => SyntaxKind::DefaultKeyword,
            NodeData::ExportAssignment => SyntaxKind::ExportAssignment,
            NodeData::ExportDeclaration => SyntaxKind::ExportDeclaration,
            NodeData::NamedExports => SyntaxKind::NamedExports,
            NodeData::ExportSpecifier { .. } => SyntaxKind::ExportSpecifier,
            NodeData::ClassDeclaration { .. } => SyntaxKind::ClassDeclaration,
            NodeData::InterfaceDeclaration { .. } => SyntaxKind::InterfaceDeclaration,
            NodeData::TypeAliasDeclaration { .. } => SyntaxKind::TypeAliasDeclaration,
            NodeData::HeritageClause { .. } => SyntaxKind::HeritageClause,
            NodeData::ExpressionWithTypeArguments => SyntaxKind::ExpressionWithTypeArguments,
            NodeData::TypeReference { .. } => SyntaxKind::TypeReference,
            NodeData::TypeLiteral => SyntaxKind::TypeLiteral,
            NodeData::IntersectionType => SyntaxKind::IntersectionType,
            NodeData::PropertySignature { .. } => SyntaxKind::PropertySignature,
            NodeData::MethodSignature { .. } => SyntaxKind::MethodSignature,
            NodeData::Identifier { .. } => SyntaxKind::Identifier,
            NodeData::ImportDeclaration => SyntaxKind::ImportDeclaration,
            NodeData::ImportClause => SyntaxKind::ImportClause,
            NodeData::NamedImports => SyntaxKind::NamedImports,
            NodeData::ImportSpecifier { .. } => SyntaxKind::ImportSpecifier,
            NodeData::StringLiteral { .. } => SyntaxKind::StringLiteral,
            NodeData::Unknown { .. } => SyntaxKind::Unknown,
        }
    }

    /// The name a node declares or refers to, for kinds that carry one
    ///
    /// Specifiers report their local binding name (the alias when present).
    pub fn name(&self) -> Option<&str> {
        match self {
            NodeData::ClassDeclaration { name } => name.as_deref(),
            NodeData::InterfaceDeclaration { name }
            | NodeData::TypeAliasDeclaration { name }
            | NodeData::TypeReference { name }
            | NodeData::PropertySignature { name }
            | NodeData::MethodSignature { name }
            | NodeData::Identifier { name } => Some(name),
            NodeData::ExportSpecifier { name, alias } | NodeData::ImportSpecifier { name, alias } => {
                Some(alias.as_deref().unwrap_or(name))
            }
            NodeData::SourceFile
            | NodeData::ExportKeyword
            | NodeData::DefaultKeyword
            | NodeData::ExportAssignment
            | NodeData::ExportDeclaration
            | NodeData::NamedExports
            | NodeData::HeritageClause { .. }
            | NodeData::ExpressionWithTypeArguments
            | NodeData::TypeLiteral
            | NodeData::IntersectionType
            | NodeData::ImportDeclaration
            | NodeData::ImportClause
            | NodeData::NamedImports
            | NodeData::StringLiteral { .. }
            | NodeData::Unknown { .. } => None,
        }
    }
}

/// One arena slot: payload, span and tree links
#[derive(Debug, Clone)]
pub struct SyntaxNode {
    pub data: NodeData,
    pub span: Span,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

/// A parsed module: its resolved path, source text and lowered node arena
///
/// The root is always the node at index 0. Nodes are only ever appended while
/// the tree is built; once handed out a tree is immutable.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    path: PathBuf,
    source: String,
    nodes: Vec<SyntaxNode>,
}

impl SyntaxTree {
    pub(crate) fn with_root(path: PathBuf, source: String, root: NodeData, span: Span) -> Self {
        Self {
            path,
            source,
            nodes: vec![SyntaxNode {
                data: root,
                span,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// Append a node under `parent`, after any children it already has
    pub(crate) fn push(&mut self, parent: NodeId, data: NodeData, span: Span) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(SyntaxNode {
            data,
            span,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.index()].children.push(id);
        id
    }

    pub fn root_id(&self) -> NodeId {
        NodeId::new(0)
    }

    /// Resolved path of the module this tree was parsed from
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeId) -> Option<&SyntaxNode> {
        self.nodes.get(id.index())
    }

    pub(crate) fn slot(&self, id: NodeId) -> &SyntaxNode {
        &self.nodes[id.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(name: &str) -> NodeData {
        NodeData::Identifier {
            name: name.to_string(),
        }
    }

    #[test]
    fn test_push_links_parent_and_children_in_order() {
        let mut tree = SyntaxTree::with_root(
            PathBuf::from("/tmp/a.ts"),
            String::new(),
            NodeData::SourceFile,
            Span::new(0, 10),
        );
        let root = tree.root_id();
        let first = tree.push(root, ident("a"), Span::new(0, 1));
        let second = tree.push(root, ident("b"), Span::new(2, 3));

        assert_eq!(tree.slot(root).children, vec![first, second]);
        assert_eq!(tree.slot(first).parent, Some(root));
        assert_eq!(tree.slot(root).parent, None);
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn test_node_id_keeps_indices_past_u32() {
        let index = u32::MAX as usize + 7;
        assert_eq!(NodeId::new(index).index(), index);
        assert!(NodeId::new(index) > NodeId::new(u32::MAX as usize));
    }

    #[test]
    fn test_specifier_name_prefers_alias() {
        let aliased = NodeData::ImportSpecifier {
            name: "Inner".to_string(),
            alias: Some("Outer".to_string()),
        };
        let plain = NodeData::ExportSpecifier {
            name: "Button".to_string(),
            alias: None,
        };

        assert_eq!(aliased.name(), Some("Outer"));
        assert_eq!(plain.name(), Some("Button"));
        assert_eq!(aliased.kind(), SyntaxKind::ImportSpecifier);
    }

    #[test]
    fn test_anonymous_class_has_no_name() {
        let class = NodeData::ClassDeclaration { name: None };
        assert_eq!(class.name(), None);
        assert_eq!(NodeData::TypeLiteral.name(), None);
    }

    #[test]
    fn test_span_len() {
        assert_eq!(Span::new(4, 9).len(), 5);
        assert!(Span::new(3, 3).is_empty());
    }
}
