//! Depth-first traversal with explicit control flow

use crate::SyntaxTree;
use crate::node::NodeId;

/// What the walk does after a node has been visited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitControl {
    /// Descend into the children
    Continue,
    /// Skip the children, then carry on with the next sibling
    SkipChildren,
    /// End the whole walk
    Stop,
}

/// Callbacks of [`SyntaxTree::walk`]
pub trait TreeVisitor {
    /// Called before the children of `node`
    fn visit(&mut self, tree: &SyntaxTree, node: NodeId) -> VisitControl;

    /// Called once the children of `node` are done, or skipped
    fn leave(&mut self, _tree: &SyntaxTree, _node: NodeId) {}
}

enum Step {
    Enter(NodeId),
    Leave(NodeId),
}

impl SyntaxTree {
    /// Walk the whole tree from its root
    ///
    /// Returns [`VisitControl::Stop`] if the visitor stopped the walk early.
    pub fn walk(&self, visitor: &mut impl TreeVisitor) -> VisitControl {
        self.walk_from(self.root(), visitor)
    }

    /// Walk the subtree rooted at `start`
    ///
    /// The walk uses its own stack, so depth is bounded by memory rather than
    /// the call stack.
    pub fn walk_from(&self, start: NodeId, visitor: &mut impl TreeVisitor) -> VisitControl {
        let mut stack = vec![Step::Enter(start)];
        while let Some(step) = stack.pop() {
            match step {
                Step::Enter(node) => match visitor.visit(self, node) {
                    VisitControl::Stop => return VisitControl::Stop,
                    VisitControl::SkipChildren => visitor.leave(self, node),
                    VisitControl::Continue => {
                        stack.push(Step::Leave(node));
                        stack.extend(self.children(node).iter().rev().map(|child| Step::Enter(*child)));
                    }
                },
                Step::Leave(node) => visitor.leave(self, node),
            }
        }
        VisitControl::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NodeKind;
    use cb_span::Position;
    use cb_syntax::{ParagraphHeader, Statement, StatementKind};

    struct Collect {
        seen: Vec<String>,
        skip: &'static str,
        stop: &'static str,
    }

    impl TreeVisitor for Collect {
        fn visit(&mut self, tree: &SyntaxTree, node: NodeId) -> VisitControl {
            let label = tree.get(node).kind.label();
            self.seen.push(label.clone());
            if label == self.stop {
                VisitControl::Stop
            } else if label == self.skip {
                VisitControl::SkipChildren
            } else {
                VisitControl::Continue
            }
        }
    }

    fn sample() -> SyntaxTree {
        let mut tree = SyntaxTree::new();
        for name in ["FIRST", "SECOND"] {
            let paragraph = tree.add_child(
                tree.root(),
                NodeKind::Paragraph(ParagraphHeader {
                    name: name.to_owned(),
                    position: Position::new(1, 8),
                }),
            );
            for kind in [StatementKind::Move, StatementKind::Display] {
                tree.add_child(
                    paragraph,
                    NodeKind::Statement(Statement {
                        kind,
                        position: Position::new(2, 12),
                    }),
                );
            }
        }
        tree
    }

    #[test]
    fn test_skip_children() {
        let tree = sample();
        let mut visitor = Collect {
            seen: Vec::new(),
            skip: "Paragraph FIRST",
            stop: "",
        };
        assert_eq!(tree.walk(&mut visitor), VisitControl::Continue);
        assert_eq!(
            visitor.seen,
            vec!["SourceFile", "Paragraph FIRST", "Paragraph SECOND", "Move", "Display"]
        );
    }

    #[test]
    fn test_stop_ends_walk() {
        let tree = sample();
        let mut visitor = Collect {
            seen: Vec::new(),
            skip: "",
            stop: "Move",
        };
        assert_eq!(tree.walk(&mut visitor), VisitControl::Stop);
        assert_eq!(visitor.seen, vec!["SourceFile", "Paragraph FIRST", "Move"]);
    }
}
