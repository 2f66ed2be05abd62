// Declarative path queries over the syntax arena
//
// A query is a slice of steps. Each step moves from the current node to a
// descendant, a direct child, or the immediate next sibling, and filters by kind
// and an optional predicate. Descendant steps backtrack across every candidate
// in breadth-first order until the rest of the query resolves.

use std::fmt;

use super::tree_methods::NodeRef;
use super::types::SyntaxKind;

/// How a step moves away from the node it starts at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// Any descendant, breadth-first
    Descendant,
    /// Depth-1 descendants only
    DirectChild,
    /// The immediate next sibling; no further siblings are tried
    NextSibling,
}

type Predicate<'p> = Box<dyn Fn(NodeRef<'_>) -> bool + 'p>;

/// One step of a path query
pub struct QueryStep<'p> {
    relation: Relation,
    kind: Option<SyntaxKind>,
    predicate: Option<Predicate<'p>>,
}

impl fmt::Debug for QueryStep<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryStep")
            .field("relation", &self.relation)
            .field("kind", &self.kind)
            .field("predicate", &self.predicate.is_some())
            .finish()
    }
}

impl<'p> QueryStep<'p> {
    pub fn new(relation: Relation, kind: Option<SyntaxKind>) -> Self {
        Self {
            relation,
            kind,
            predicate: None,
        }
    }

    pub fn descendant(kind: SyntaxKind) -> Self {
        Self::new(Relation::Descendant, Some(kind))
    }

    pub fn child(kind: SyntaxKind) -> Self {
        Self::new(Relation::DirectChild, Some(kind))
    }

    pub fn next(kind: SyntaxKind) -> Self {
        Self::new(Relation::NextSibling, Some(kind))
    }

    /// Add a predicate the node must satisfy in addition to the kind filter
    pub fn filter(mut self, predicate: impl Fn(NodeRef<'_>) -> bool + 'p) -> Self {
        self.predicate = Some(Box::new(predicate));
        self
    }

    pub fn relation(&self) -> Relation {
        self.relation
    }

    pub fn matches(&self, node: NodeRef<'_>) -> bool {
        if self.kind.is_some_and(|kind| !node.is(kind)) {
            return false;
        }
        self.predicate.as_ref().map_or(true, |predicate| predicate(node))
    }
}

impl<'t> NodeRef<'t> {
    /// Resolve `query` starting at this node
    ///
    /// An empty query resolves to this node. Returns `None` when no chain of
    /// candidates satisfies every step.
    pub fn query_match(&self, query: &[QueryStep<'_>]) -> Option<NodeRef<'t>> {
        let Some((step, rest)) = query.split_first() else {
            return Some(*self);
        };

        match step.relation {
            Relation::NextSibling => self
                .next()
                .filter(|sibling| step.matches(*sibling))
                .and_then(|sibling| sibling.query_match(rest)),
            Relation::Descendant | Relation::DirectChild => {
                let max_depth = (step.relation == Relation::DirectChild).then_some(1);
                self.descendants()
                    .max_depth(max_depth)
                    .map(|(candidate, _)| candidate)
                    .filter(|candidate| step.matches(*candidate))
                    .find_map(|candidate| candidate.query_match(rest))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::base::types::NodeData;
    use crate::extractors::typescript::parse_source;

    const SAMPLE: &str = r#"
interface First { a: string }
interface Second { b: string }

export default class Panel extends Base<Second> {}
"#;

    #[test]
    fn test_empty_query_is_identity() {
        let tree = parse_source(SAMPLE, "panel.ts").unwrap();
        let root = tree.root();
        assert_eq!(root.query_match(&[]), Some(root));

        let class = root
            .child(|n| n.is(SyntaxKind::ClassDeclaration), None)
            .unwrap();
        assert_eq!(class.query_match(&[]), Some(class));
    }

    #[test]
    fn test_missing_first_step_returns_none() {
        let tree = parse_source(SAMPLE, "panel.ts").unwrap();
        let result = tree
            .root()
            .query_match(&[QueryStep::descendant(SyntaxKind::ImportDeclaration)]);
        assert!(result.is_none());
    }

    #[test]
    fn test_descendant_step_backtracks_across_candidates() {
        let tree = parse_source(SAMPLE, "panel.ts").unwrap();

        // The first interface has no `b` member; the match must come from the second.
        let found = tree.root().query_match(&[
            QueryStep::descendant(SyntaxKind::InterfaceDeclaration),
            QueryStep::child(SyntaxKind::PropertySignature).filter(|n| n.name() == Some("b")),
        ]);

        let found = found.unwrap();
        assert_eq!(found.name(), Some("b"));
        assert_eq!(found.parent().unwrap().name(), Some("Second"));
    }

    #[test]
    fn test_direct_child_step_is_depth_bounded() {
        let tree = parse_source(SAMPLE, "panel.ts").unwrap();
        let nested = tree
            .root()
            .query_match(&[QueryStep::child(SyntaxKind::PropertySignature)]);
        assert!(nested.is_none());
    }

    #[test]
    fn test_sibling_chain_resolves_export_default_heritage() {
        let tree = parse_source(SAMPLE, "panel.ts").unwrap();
        let reference = tree.root().query_match(&[
            QueryStep::descendant(SyntaxKind::ExportKeyword),
            QueryStep::next(SyntaxKind::DefaultKeyword),
            QueryStep::next(SyntaxKind::Identifier),
            QueryStep::next(SyntaxKind::HeritageClause),
            QueryStep::child(SyntaxKind::ExpressionWithTypeArguments),
            QueryStep::child(SyntaxKind::TypeReference),
        ]);

        let reference = reference.unwrap();
        assert_eq!(
            reference.data(),
            &NodeData::TypeReference {
                name: "Second".to_string()
            }
        );
    }

    #[test]
    fn test_sibling_step_does_not_skip_ahead() {
        let tree = parse_source(SAMPLE, "panel.ts").unwrap();
        // `Panel` sits between `default` and the heritage clause.
        let result = tree.root().query_match(&[
            QueryStep::descendant(SyntaxKind::DefaultKeyword),
            QueryStep::next(SyntaxKind::HeritageClause),
        ]);
        assert!(result.is_none());
    }

    #[test]
    fn test_step_without_kind_uses_predicate_only() {
        let tree = parse_source(SAMPLE, "panel.ts").unwrap();
        let step = QueryStep::new(Relation::Descendant, None).filter(|n| n.name() == Some("a"));
        let found = tree.root().query_match(&[step]).unwrap();
        assert_eq!(found.kind(), SyntaxKind::PropertySignature);
    }
}
