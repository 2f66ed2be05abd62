// Base syntax model and navigation for propscan
//
// - types.rs: the lowered syntax arena (SyntaxTree, NodeData, SyntaxKind)
// - tree_methods.rs: NodeRef navigation (siblings, ancestors, BFS, traverse)
// - query.rs: declarative multi-step path queries

pub mod query;
pub mod tree_methods;
pub mod types;

pub use query::{QueryStep, Relation};
pub use tree_methods::{Descendants, NodeRef, Walk};
pub use types::{HeritageToken, NodeData, NodeId, Span, SyntaxKind, SyntaxNode, SyntaxTree};
