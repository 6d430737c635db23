//! Structural edits
//!
//! Lists, optionals and tuples are ordinary containers whose kind has a
//! [`Shape`] in the tree's grammar. Edits go through short-lived handles
//! borrowed from the tree:
//!
//! ```rust,ignore
//! let body = tree.find(SyntaxKind::StatementList).unwrap();
//! let line = tree.available_lines(body)?[0];
//! let statement = Tree::from_source(python(), SyntaxKind::Call, "print(1)");
//! tree.list_mut(body)?.add_at_line(line, statement)?;
//! ```
//!
//! Whenever a child appears in or disappears from a container that had
//! other visible content, the parent decides where to splice or strip one
//! separating whitespace token (the becoming-visible protocol).

mod list;
mod optional;
mod padding;
mod trailing;
mod tuple;

pub use list::ListMut;
pub use optional::OptionalMut;

use tracing::debug;

use crate::error::SpliceError;
use crate::grammar::{ChildSpacing, ListPolicy, OptionalPolicy, Shape};
use crate::result::Result;
use crate::syntax::{ContainerId, Graft, NodeId, SyntaxKind, TokenId, Tree};

const ENCLOSURES: &[(&str, &str)] = &[
    ("(", ")"),
    ("[", "]"),
    ("{", "}"),
    ("<", ">"),
    ("'", "'"),
    ("\"", "\""),
];

impl Tree {
    /// Edit handle for a list container
    pub fn list_mut(&mut self, id: ContainerId) -> Result<ListMut<'_>> {
        let policy = self.list_policy_of(id)?.clone();
        Ok(ListMut::new(self, id, policy))
    }

    /// Edit handle for an optional container
    pub fn optional_mut(&mut self, id: ContainerId) -> Result<OptionalMut<'_>> {
        let policy = self.optional_policy_of(id)?.clone();
        Ok(OptionalMut::new(self, id, policy))
    }

    pub(crate) fn list_policy_of(&self, id: ContainerId) -> Result<&ListPolicy> {
        let kind = self.kind(id);
        self.grammar()
            .list_policy(kind)
            .ok_or_else(|| SpliceError::wrong_shape(kind, "list"))
    }

    pub(crate) fn optional_policy_of(&self, id: ContainerId) -> Result<&OptionalPolicy> {
        let kind = self.kind(id);
        self.grammar()
            .optional_policy(kind)
            .ok_or_else(|| SpliceError::wrong_shape(kind, "optional"))
    }

    /// Whether a list or optional accepts nodes of a kind, directly or by
    /// wrapping them
    pub fn can_add(&self, container: ContainerId, kind: SyntaxKind) -> bool {
        match self.grammar().shape(self.kind(container)) {
            Shape::List(policy) => policy.accepts(kind),
            Shape::Optional(policy) => policy.accepts(kind),
            _ => false,
        }
    }

    /// Lines at which a list accepts a new element
    pub fn available_lines(&self, list: ContainerId) -> Result<Vec<usize>> {
        let policy = self.list_policy_of(list)?;
        Ok(self.list_available_lines(list, policy))
    }

    /// Elements of a list, or the element of an optional
    pub fn elements(&self, container: ContainerId) -> Vec<ContainerId> {
        match self.grammar().shape(self.kind(container)) {
            Shape::List(policy) => self.list_elements(container, policy),
            Shape::Optional(policy) => self.optional_element(container, policy).into_iter().collect(),
            Shape::Tuple(_) => self.tuple_elements(container),
            _ => Vec::new(),
        }
    }

    /// Remove a node, letting its parent clean up around it.
    ///
    /// List elements take their delimiter and one side of whitespace with
    /// them; an optional loses its prefix and postfix with its element; a
    /// plain container that would be left without visible content is
    /// removed as well.
    pub fn remove(&mut self, node: impl Into<NodeId>) -> Result<()> {
        let node = node.into();
        if node == NodeId::Container(self.root()) {
            return Err(SpliceError::RootRemoval);
        }
        if let NodeId::Container(id) = node {
            if self.kind(id) == SyntaxKind::Comment && self.parent(id).is_none() {
                debug!(?id, "removing comment");
                self.remove_comment(id);
                return Ok(());
            }
            if self.grammar().optional_policy(self.kind(id)).is_some() {
                return self.optional_mut(id)?.clear();
            }
        }
        match self.parent(node) {
            Some(parent) => self.propagate_removal(parent, node),
            None => Ok(()),
        }
    }

    /// Either delete `child` from `parent`, or remove `parent` itself when
    /// nothing else in it is visible
    pub(crate) fn propagate_removal(&mut self, parent: ContainerId, child: NodeId) -> Result<()> {
        let grammar = self.grammar().clone();
        match grammar.shape(self.kind(parent)) {
            Shape::List(policy) if policy.accepts(self.kind(child)) => {
                let element = child
                    .as_container()
                    .ok_or(SpliceError::NotAnElement { container: self.kind(parent) })?;
                self.list_mut(parent)?.remove(element).map(|_| ())
            }
            Shape::Optional(_) => self.optional_mut(parent)?.clear(),
            Shape::Comment => self.remove(parent),
            _ => {
                let others_visible = self
                    .children(parent)
                    .iter()
                    .any(|other| *other != child && self.is_visible(*other));
                if !others_visible && parent != self.root() {
                    return self.remove(parent);
                }
                let ids = self.visible_token_ids(child);
                self.remove_child(parent, child);
                self.tokens.remove_ids(&ids);
                self.update_comments();
                Ok(())
            }
        }
    }

    /// Swap a node for a fragment, splicing the fragment's visible tokens
    /// where the node's were
    pub fn replace(&mut self, node: ContainerId, mut fragment: Tree) -> Result<ContainerId> {
        if node == self.root() {
            return Err(SpliceError::RootRemoval);
        }
        let parent = self
            .parent(node)
            .ok_or_else(|| SpliceError::internal_error("cannot replace a detached node"))?;

        // Lists and optionals keep holding only the kinds they accept
        let kind = fragment.kind(fragment.root());
        let element = match self.grammar().shape(self.kind(parent)) {
            Shape::List(policy) => Some((policy.accepts(kind), policy.element)),
            Shape::Optional(policy) => Some((policy.accepts(kind), policy.element)),
            _ => None,
        };
        if let Some((accepted, element)) = element {
            if !accepted {
                return Err(SpliceError::kind_mismatch(self.kind(parent), kind));
            }
            if kind != element {
                fragment.wrap_root(element);
            }
        }
        debug!(kind = %self.kind(node), with = %fragment.kind(fragment.root()), "replacing node");

        let start = self
            .token_range(node)
            .map_or_else(|| self.token_range_with_trivia(node).start, |range| range.start);
        let ids = self.visible_token_ids(node);
        self.tokens.remove_ids(&ids);

        let graft = self.graft_visible(fragment);
        self.tokens.insert(start, graft.tokens.iter().copied());

        let position = self
            .children(parent)
            .iter()
            .position(|child| *child == NodeId::Container(node))
            .ok_or_else(|| SpliceError::internal_error("node missing from its parent"))?;
        self.container_mut(parent).children[position] = NodeId::Container(graft.root);
        self.set_parent(NodeId::Container(node), None);
        self.set_parent(NodeId::Container(graft.root), Some(parent));
        self.update_comments();
        Ok(graft.root)
    }

    /// Move a fragment's arenas in, keeping only its visible token range
    pub(crate) fn graft_visible(&mut self, fragment: Tree) -> Graft {
        let range = fragment.token_range(fragment.root());
        let mut graft = self.graft(fragment);
        graft.tokens = match range {
            Some(range) => graft.tokens[range].to_vec(),
            None => Vec::new(),
        };
        graft
    }

    /// Create a token unless the text is empty
    pub(crate) fn literal(&mut self, text: &str) -> Option<TokenId> {
        (!text.is_empty()).then(|| self.create_token(text))
    }

    /// Whether the visible neighbors of a node are a matching bracket pair
    pub(crate) fn inside_enclosure(&self, node: NodeId) -> bool {
        let (Some(left), Some(right)) = (self.right_most_left(node), self.left_most_right(node))
        else {
            return false;
        };
        let (left, right) = (self.tokens.get(left).text(), self.tokens.get(right).text());
        ENCLOSURES
            .iter()
            .any(|(open, close)| *open == left && *close == right)
    }

    /// Ask the node's parent to make room for it, returning the stream
    /// position its content goes to
    pub(crate) fn setup_spacing_before_becoming_visible(&mut self, node: ContainerId) -> usize {
        match self.parent(node) {
            Some(parent) => self.setup_spacing_for_child(parent, NodeId::Container(node)),
            None => self.token_range_with_trivia(node).start,
        }
    }

    pub(crate) fn remove_spacing_before_becoming_invisible(&mut self, node: ContainerId) {
        if let Some(parent) = self.parent(node) {
            self.remove_spacing_for_child(parent, NodeId::Container(node));
        }
    }

    fn setup_spacing_for_child(&mut self, parent: ContainerId, child: NodeId) -> usize {
        let grammar = self.grammar().clone();
        match grammar.shape(self.kind(parent)) {
            Shape::Tuple(policy) => self.tuple_setup_spacing(parent, child, policy.delimiter),
            Shape::Plain(ChildSpacing::None) => self.token_range_with_trivia(child).end,
            _ => {
                let trivia = self.token_range_with_trivia(child);
                if self.inside_enclosure(child) {
                    return trivia.end;
                }
                let Some(range) = self.token_range(parent) else {
                    return trivia.end;
                };
                let space = self.create_token(" ");
                if range.start < trivia.start {
                    self.tokens.insert_one(trivia.start, space);
                    trivia.start + 1
                } else {
                    self.tokens.insert_one(trivia.end, space);
                    trivia.end
                }
            }
        }
    }

    fn remove_spacing_for_child(&mut self, parent: ContainerId, child: NodeId) {
        let grammar = self.grammar().clone();
        match grammar.shape(self.kind(parent)) {
            Shape::Tuple(policy) => self.tuple_remove_spacing(parent, child, policy.delimiter),
            Shape::Plain(ChildSpacing::None) => {}
            _ => {
                if self.inside_enclosure(child) {
                    return;
                }
                let (Some(range), Some(child_range)) =
                    (self.token_range(parent), self.token_range(child))
                else {
                    return;
                };
                if range.start < child_range.start
                    && self.tokens.at(child_range.start - 1).is_whitespace()
                {
                    self.tokens.remove(child_range.start - 1..child_range.start);
                } else if range.end > child_range.end {
                    let right = self.tokens.at(child_range.end);
                    if right.is_whitespace() && !right.is_newline() {
                        self.tokens.remove(child_range.end..child_range.end + 1);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{javascript, python};
    use crate::syntax::TreeBuilder;

    fn call(source: &str) -> Tree {
        let mut builder = TreeBuilder::new(javascript(), source);
        builder.node(SyntaxKind::Program, |b| {
            b.node(SyntaxKind::Call, |b| {
                b.node(SyntaxKind::Identifier, |b| {
                    b.token("f");
                });
                b.token("(");
                b.node(SyntaxKind::ArgumentList, |b| {
                    b.node(SyntaxKind::Argument, |b| {
                        b.token("a");
                    });
                });
                b.token(")");
            });
        });
        builder.finish().unwrap()
    }

    #[test]
    fn test_enclosure_detection() {
        let tree = call("f(a)\n");
        let list = tree.find(SyntaxKind::ArgumentList).unwrap();
        assert!(tree.inside_enclosure(list.into()));
        let name = tree.find(SyntaxKind::Identifier).unwrap();
        assert!(!tree.inside_enclosure(name.into()));
    }

    #[test]
    fn test_remove_root_is_rejected() {
        let mut tree = call("f(a)\n");
        let root = tree.root();
        assert!(matches!(tree.remove(root), Err(SpliceError::RootRemoval)));
    }

    #[test]
    fn test_remove_cascades_through_plain_containers() {
        let mut tree = call("f(a)\n");
        let name = tree.find(SyntaxKind::Identifier).unwrap();
        let token = tree.children(name)[0];
        tree.remove(token).unwrap();
        assert_eq!(tree.text(), "(a)\n");
        assert_eq!(tree.parent(name), None);
    }

    #[test]
    fn test_replace_swaps_visible_tokens() {
        let mut tree = call("f(a)\n");
        let argument = tree.find(SyntaxKind::Argument).unwrap();
        let fragment = Tree::from_source(javascript(), SyntaxKind::Argument, "b + c");
        let replacement = tree.replace(argument, fragment).unwrap();
        assert_eq!(tree.text(), "f(b + c)\n");
        assert_eq!(tree.visible_text(replacement), "b + c");
        assert_eq!(tree.elements(tree.find(SyntaxKind::ArgumentList).unwrap()), vec![replacement]);
    }

    #[test]
    fn test_replace_rejects_kinds_the_list_refuses() {
        let mut tree = call("f(a)\n");
        let list = tree.find(SyntaxKind::ArgumentList).unwrap();
        let argument = tree.find(SyntaxKind::Argument).unwrap();
        let fragment = Tree::from_source(javascript(), SyntaxKind::Class, "class A {}");

        let result = tree.replace(argument, fragment);
        assert!(matches!(
            result,
            Err(SpliceError::KindMismatch {
                container: SyntaxKind::ArgumentList,
                found: SyntaxKind::Class,
            })
        ));
        assert_eq!(tree.text(), "f(a)\n");
        assert_eq!(tree.elements(list), vec![argument]);
    }

    #[test]
    fn test_can_add_reads_policies() {
        let mut builder = TreeBuilder::new(python(), "x\n");
        builder.node(SyntaxKind::Program, |b| {
            b.node(SyntaxKind::StatementList, |b| {
                b.node(SyntaxKind::Statement, |b| {
                    b.token("x");
                });
            });
        });
        let mut tree = builder.finish().unwrap();
        let list = tree.find(SyntaxKind::StatementList).unwrap();
        assert!(tree.can_add(list, SyntaxKind::Function));
        assert!(!tree.can_add(list, SyntaxKind::Argument));
        assert!(!tree.can_add(tree.root(), SyntaxKind::Statement));
        assert!(tree.list_mut(tree.root()).is_err());
    }
}
