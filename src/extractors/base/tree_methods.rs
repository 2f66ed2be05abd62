// Tree navigation methods over the lowered syntax arena
//
// `NodeRef` is the navigable view of one node: sibling, ancestor and
// breadth-first descendant search, plus the level-by-level `traverse` walk.

use std::collections::VecDeque;
use std::fmt;
use std::path::Path;

use super::types::{NodeData, NodeId, Span, SyntaxKind, SyntaxNode, SyntaxTree};

/// Callback verdict for [`NodeRef::traverse`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Walk {
    /// Queue this node's children for the next level
    Continue,
    /// Leave this node's children out of the next level; siblings are unaffected
    SkipChildren,
}

/// A node plus the tree it lives in
///
/// Copying or re-wrapping a `NodeRef` is free and yields an equal value, so two
/// refs to the same node are interchangeable everywhere.
#[derive(Clone, Copy)]
pub struct NodeRef<'t> {
    tree: &'t SyntaxTree,
    id: NodeId,
}

impl PartialEq for NodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for NodeRef<'_> {}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("id", &self.id)
            .field("data", self.data())
            .field("span", &self.span())
            .finish()
    }
}

impl SyntaxTree {
    pub fn root(&self) -> NodeRef<'_> {
        NodeRef::wrap(self, self.root_id())
    }

    pub fn node(&self, id: NodeId) -> NodeRef<'_> {
        NodeRef::wrap(self, id)
    }
}

impl<'t> NodeRef<'t> {
    pub fn wrap(tree: &'t SyntaxTree, id: NodeId) -> Self {
        Self { tree, id }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn tree(&self) -> &'t SyntaxTree {
        self.tree
    }

    /// Path of the module that owns this node
    pub fn module_path(&self) -> &'t Path {
        self.tree.path()
    }

    fn slot(&self) -> &'t SyntaxNode {
        self.tree.slot(self.id)
    }

    pub fn data(&self) -> &'t NodeData {
        &self.slot().data
    }

    pub fn kind(&self) -> SyntaxKind {
        self.data().kind()
    }

    pub fn name(&self) -> Option<&'t str> {
        self.data().name()
    }

    pub fn span(&self) -> Span {
        self.slot().span
    }

    /// Source text covered by this node
    pub fn text(&self) -> &'t str {
        let span = self.span();
        self.tree.source().get(span.start..span.end).unwrap_or("")
    }

    pub fn is(&self, kind: SyntaxKind) -> bool {
        self.kind() == kind
    }

    pub fn children(&self) -> impl DoubleEndedIterator<Item = NodeRef<'t>> + ExactSizeIterator + 't {
        let tree = self.tree;
        self.slot()
            .children
            .iter()
            .map(move |&id| NodeRef::wrap(tree, id))
    }

    /// Siblings after this node under the same parent, nearest first
    fn following_siblings(&self) -> impl Iterator<Item = NodeRef<'t>> + 't {
        let tree = self.tree;
        let id = self.id;
        let siblings: &'t [NodeId] = match self.slot().parent {
            Some(parent) => &tree.slot(parent).children,
            None => &[],
        };
        let start = siblings
            .iter()
            .position(|&sibling| sibling == id)
            .map_or(siblings.len(), |index| index + 1);
        siblings[start..]
            .iter()
            .map(move |&sibling| NodeRef::wrap(tree, sibling))
    }

    /// The immediately following sibling
    pub fn next(&self) -> Option<NodeRef<'t>> {
        self.following_siblings().next()
    }

    /// The immediately following sibling, only if it satisfies `predicate`
    pub fn next_if(&self, predicate: impl Fn(NodeRef<'t>) -> bool) -> Option<NodeRef<'t>> {
        self.next().filter(|node| predicate(*node))
    }

    /// First following sibling (not necessarily adjacent) satisfying `predicate`
    pub fn closest(&self, predicate: impl Fn(NodeRef<'t>) -> bool) -> Option<NodeRef<'t>> {
        self.following_siblings().find(|node| predicate(*node))
    }

    /// Breadth-first search of the descendants, excluding this node
    ///
    /// `max_depth` bounds the search: `Some(1)` only looks at direct children.
    pub fn child(
        &self,
        predicate: impl Fn(NodeRef<'t>) -> bool,
        max_depth: Option<usize>,
    ) -> Option<NodeRef<'t>> {
        self.descendants()
            .max_depth(max_depth)
            .map(|(node, _)| node)
            .find(|node| predicate(*node))
    }

    /// The immediate parent, `None` at the root
    pub fn parent(&self) -> Option<NodeRef<'t>> {
        self.slot().parent.map(|id| NodeRef::wrap(self.tree, id))
    }

    /// Nearest strict ancestor satisfying `predicate`
    pub fn ancestor(&self, predicate: impl Fn(NodeRef<'t>) -> bool) -> Option<NodeRef<'t>> {
        let mut current = self.parent();
        while let Some(node) = current {
            if predicate(node) {
                return Some(node);
            }
            current = node.parent();
        }
        None
    }

    /// Lazy breadth-first sequence of `(descendant, depth)`, depth starting at 1
    pub fn descendants(&self) -> Descendants<'t> {
        Descendants::new(*self)
    }

    /// Level-by-level walk starting with this node at depth 0
    ///
    /// Returning [`Walk::SkipChildren`] prunes only that node's subtree; the rest
    /// of the level and everything queued from it is still visited.
    pub fn traverse<F>(&self, mut callback: F, max_depth: Option<usize>)
    where
        F: FnMut(NodeRef<'t>, usize) -> Walk,
    {
        let mut frontier = vec![*self];
        let mut depth = 0;

        while !frontier.is_empty() && max_depth.map_or(true, |max| depth <= max) {
            let mut next_level = Vec::new();
            for node in frontier {
                if callback(node, depth) == Walk::Continue {
                    next_level.extend(node.children());
                }
            }
            frontier = next_level;
            depth += 1;
        }
    }
}

/// Restartable breadth-first iterator over a node's descendants
///
/// Cloning the iterator snapshots its position, so a search can be resumed or
/// replayed from any point.
#[derive(Clone)]
pub struct Descendants<'t> {
    tree: &'t SyntaxTree,
    queue: VecDeque<(NodeId, usize)>,
    max_depth: Option<usize>,
}

impl<'t> Descendants<'t> {
    fn new(start: NodeRef<'t>) -> Self {
        let queue = start
            .slot()
            .children
            .iter()
            .map(|&id| (id, 1))
            .collect();
        Self {
            tree: start.tree,
            queue,
            max_depth: None,
        }
    }

    /// Stop descending below `max_depth`; `None` means unbounded
    pub fn max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        if let Some(max) = max_depth {
            self.queue.retain(|&(_, depth)| depth <= max);
        }
        self
    }
}

impl<'t> Iterator for Descendants<'t> {
    type Item = (NodeRef<'t>, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let (id, depth) = self.queue.pop_front()?;
        if self.max_depth.map_or(true, |max| depth < max) {
            self.queue.extend(
                self.tree
                    .slot(id)
                    .children
                    .iter()
                    .map(|&child| (child, depth + 1)),
            );
        }
        Some((NodeRef::wrap(self.tree, id), depth))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::typescript::parse_source;

    const SAMPLE: &str = r#"
import { Base } from './base';

export interface ButtonProps extends Base {
  size: string;
  onClick(): void;
}

export default class Button extends Component<ButtonProps> {}
"#;

    fn sample() -> SyntaxTree {
        parse_source(SAMPLE, "button.tsx").unwrap()
    }

    fn find<'t>(tree: &'t SyntaxTree, kind: SyntaxKind) -> NodeRef<'t> {
        tree.root().child(|n| n.is(kind), None).unwrap()
    }

    #[test]
    fn test_wrapping_is_idempotent() {
        let tree = sample();
        let root = tree.root();
        let rewrapped = NodeRef::wrap(root.tree(), root.id());

        assert_eq!(root, rewrapped);
        assert_eq!(tree.node(tree.root_id()), root);
    }

    #[test]
    fn test_next_returns_immediate_sibling() {
        let tree = sample();
        let export = find(&tree, SyntaxKind::ExportKeyword);

        let next = export.next().unwrap();
        assert_eq!(next.kind(), SyntaxKind::Identifier);
        assert_eq!(next.name(), Some("ButtonProps"));

        assert!(export.next_if(|n| n.is(SyntaxKind::HeritageClause)).is_none());
    }

    #[test]
    fn test_next_is_none_for_last_child_and_root() {
        let tree = sample();
        let root = tree.root();
        assert!(root.next().is_none());

        let last = root.children().last().unwrap();
        assert!(last.next().is_none());
    }

    #[test]
    fn test_closest_skips_non_matching_siblings() {
        let tree = sample();
        let name = find(&tree, SyntaxKind::InterfaceDeclaration)
            .child(|n| n.is(SyntaxKind::Identifier), Some(1))
            .unwrap();

        let property = name.closest(|n| n.is(SyntaxKind::PropertySignature)).unwrap();
        assert_eq!(property.name(), Some("size"));
        assert!(property.closest(|n| n.is(SyntaxKind::ClassDeclaration)).is_none());
    }

    #[test]
    fn test_child_is_breadth_first_and_depth_bounded() {
        let tree = sample();
        let root = tree.root();

        // The import specifier identifier is deeper than the interface name.
        let first_ident = root.child(|n| n.is(SyntaxKind::Identifier), None).unwrap();
        assert_eq!(first_ident.name(), Some("ButtonProps"));

        assert!(root.child(|n| n.is(SyntaxKind::Identifier), Some(1)).is_none());
        assert!(root.child(|n| n.is(SyntaxKind::SourceFile), None).is_none());
    }

    #[test]
    fn test_parent_and_ancestor() {
        let tree = sample();
        let specifier = find(&tree, SyntaxKind::ImportSpecifier);

        assert_eq!(specifier.parent().unwrap().kind(), SyntaxKind::NamedImports);
        let import = specifier
            .ancestor(|n| n.is(SyntaxKind::ImportDeclaration))
            .unwrap();
        assert_eq!(import.kind(), SyntaxKind::ImportDeclaration);
        assert!(specifier.ancestor(|n| n.is(SyntaxKind::ClassDeclaration)).is_none());
        assert!(tree.root().parent().is_none());
    }

    #[test]
    fn test_traverse_skip_prunes_only_that_subtree() {
        let tree = sample();
        let mut seen = Vec::new();

        tree.root().traverse(
            |node, depth| {
                seen.push((node.kind(), depth));
                if node.is(SyntaxKind::ImportDeclaration) {
                    Walk::SkipChildren
                } else {
                    Walk::Continue
                }
            },
            None,
        );

        assert_eq!(seen[0], (SyntaxKind::SourceFile, 0));
        assert!(!seen.iter().any(|(kind, _)| *kind == SyntaxKind::ImportClause));
        // Siblings of the pruned import and their subtrees are still walked.
        assert!(seen.contains(&(SyntaxKind::PropertySignature, 2)));
        assert!(seen.contains(&(SyntaxKind::TypeReference, 4)));
    }

    #[test]
    fn test_traverse_respects_max_depth() {
        let tree = sample();
        let mut max_seen = 0;
        tree.root().traverse(
            |_, depth| {
                max_seen = max_seen.max(depth);
                Walk::Continue
            },
            Some(1),
        );
        assert_eq!(max_seen, 1);
    }

    #[test]
    fn test_descendants_are_in_level_order() {
        let tree = sample();
        let depths: Vec<usize> = tree.root().descendants().map(|(_, d)| d).collect();

        assert!(depths.windows(2).all(|pair| pair[0] <= pair[1]));
        assert_eq!(depths.len(), tree.len() - 1);
    }

    #[test]
    fn test_descendants_clone_resumes_from_same_point() {
        let tree = sample();
        let mut iter = tree.root().descendants();
        iter.next();
        let snapshot = iter.clone();

        let rest: Vec<_> = iter.map(|(n, _)| n.id()).collect();
        let replay: Vec<_> = snapshot.map(|(n, _)| n.id()).collect();
        assert_eq!(rest, replay);
    }

    #[test]
    fn test_text_slices_source() {
        let tree = sample();
        let property = find(&tree, SyntaxKind::PropertySignature);
        assert!(property.text().starts_with("size"));
        assert!(property.module_path().ends_with("button.tsx"));
    }
}
