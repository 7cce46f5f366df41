//! The program tree built from the event stream
//!
//! Nodes live in an arena owned by [`SyntaxTree`]. A node keeps the code
//! element it was built from, the flags of the section or procedure it sits
//! in, and an optional [`SemanticData`] handle into the symbol table. The tree
//! never owns symbols.

pub mod node;
pub mod visitor;

pub use node::{DataDefinition, Node, NodeFlags, NodeId, NodeKind, SemanticData};
pub use visitor::{TreeVisitor, VisitControl};

use cb_arena::Arena;

/// Arena-backed tree rooted at a source file node
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    nodes: Arena<Node>,
    root: NodeId,
}

impl SyntaxTree {
    /// Create a tree holding only its root
    #[must_use]
    pub fn new() -> Self {
        let mut nodes = Arena::new();
        let root = nodes.alloc(Node::new(NodeKind::SourceFile, None));
        Self { nodes, root }
    }

    /// Root source file node
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Append a new node under `parent`
    pub fn add_child(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let child = self.nodes.alloc(Node::new(kind, Some(parent)));
        self.nodes[parent].children.push(child);
        child
    }

    /// Node behind `id`
    #[must_use]
    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    /// Mutable node behind `id`
    pub fn get_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id]
    }

    /// Parent of `id`
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].parent
    }

    /// Children of `id` in source order
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id].children
    }

    /// Strict ancestors of `id`, nearest first
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.nodes[id].parent, |current| self.nodes[*current].parent)
    }

    /// Number of nodes, root included
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree holds only its root
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Nodes whose data definition carries `name`, in source order
    #[must_use]
    pub fn find_data(&self, name: &str) -> Vec<NodeId> {
        struct Finder<'a> {
            name: &'a str,
            found: Vec<NodeId>,
        }
        impl TreeVisitor for Finder<'_> {
            fn visit(&mut self, tree: &SyntaxTree, node: NodeId) -> VisitControl {
                let definition = tree.get(node).data_definition();
                if definition.and_then(|definition| definition.name()) == Some(self.name) {
                    self.found.push(node);
                }
                VisitControl::Continue
            }
        }

        let mut finder = Finder {
            name,
            found: Vec::new(),
        };
        self.walk(&mut finder);
        finder.found
    }

    /// Indented one-line-per-node rendering
    #[must_use]
    pub fn outline(&self) -> String {
        struct Outline {
            text: String,
            depth: usize,
        }
        impl TreeVisitor for Outline {
            fn visit(&mut self, tree: &SyntaxTree, node: NodeId) -> VisitControl {
                self.text.push_str(&"  ".repeat(self.depth));
                self.text.push_str(&tree.get(node).kind.label());
                self.text.push('\n');
                self.depth += 1;
                VisitControl::Continue
            }

            fn leave(&mut self, _tree: &SyntaxTree, _node: NodeId) {
                self.depth -= 1;
            }
        }

        let mut outline = Outline {
            text: String::new(),
            depth: 0,
        };
        self.walk(&mut outline);
        outline.text
    }
}

impl Default for SyntaxTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cb_span::Position;
    use cb_syntax::{DataDescriptionEntry, ProgramIdentification};
    use expect_test::expect;

    #[test]
    fn test_add_child_links_parent() {
        let mut tree = SyntaxTree::new();
        let program = tree.add_child(
            tree.root(),
            NodeKind::Program(ProgramIdentification::new("MAIN", Position::new(1, 8))),
        );
        let item = tree.add_child(
            program,
            NodeKind::DataDescription(Box::new(DataDescriptionEntry::new(1, "A", Position::new(3, 8)))),
        );

        assert_eq!(tree.parent(item), Some(program));
        assert_eq!(tree.children(program), &[item]);
        assert_eq!(tree.ancestors(item).collect::<Vec<_>>(), vec![program, tree.root()]);
        assert_eq!(tree.find_data("A"), vec![item]);
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn test_outline() {
        let mut tree = SyntaxTree::new();
        let program = tree.add_child(
            tree.root(),
            NodeKind::Program(ProgramIdentification::new("MAIN", Position::new(1, 8))),
        );
        let record = tree.add_child(
            program,
            NodeKind::DataDescription(Box::new(DataDescriptionEntry::new(1, "REC", Position::new(3, 8)))),
        );
        tree.add_child(
            record,
            NodeKind::DataDescription(Box::new(DataDescriptionEntry::new(5, "FIELD", Position::new(4, 8)))),
        );

        expect![[r#"
            SourceFile
              Program MAIN
                01 REC
                  05 FIELD
        "#]]
        .assert_eq(&tree.outline());
    }
}
