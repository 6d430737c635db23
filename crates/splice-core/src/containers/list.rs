use std::ops::Range;

use tracing::debug;

use crate::error::SpliceError;
use crate::grammar::{ListPolicy, Shape};
use crate::indent;
use crate::result::Result;
use crate::syntax::{ContainerId, NodeId, SyntaxKind, TokenId, Tree};

/// Edit handle for a list container, see [`Tree::list_mut`]
#[derive(Debug)]
pub struct ListMut<'a> {
    pub(super) tree: &'a mut Tree,
    pub(super) id: ContainerId,
    pub(super) policy: ListPolicy,
}

impl Tree {
    pub(crate) fn list_elements(&self, id: ContainerId, policy: &ListPolicy) -> Vec<ContainerId> {
        self.children(id)
            .iter()
            .filter_map(|child| child.as_container())
            .filter(|child| policy.accepts(self.kind(*child)))
            .collect()
    }

    pub(crate) fn is_top_level(&self, id: ContainerId) -> bool {
        indent::indent(self, id).is_empty()
    }

    /// A list squeezed between two tokens of one line, e.g. `{}` in
    /// `if (x) {}`
    fn inside_line_interior(&self, id: ContainerId) -> bool {
        let trivia = self.token_range_with_trivia(id);
        let lines = self.tokens.lines_of(trivia.clone());
        lines.start + 1 == lines.end && trivia.start > 0 && trivia.end < self.tokens.len()
    }

    fn available_line_range(&self, id: ContainerId, policy: &ListPolicy) -> Range<usize> {
        let mut range = self.token_range_with_trivia(id);
        if self.inside_line_interior(id) {
            let line = self.tokens.line_of(range.start);
            return line + 1..line + 2;
        }

        // Lists open above, like decorators, stay contiguous with their content
        let bounded_above = policy.bounded_above.applies(self.is_top_level(id));
        if !bounded_above {
            range.start = self.token_range(id).map_or(range.end, |visible| visible.start);
        }
        let mut lines = self.tokens.lines_of(range.clone());
        if !bounded_above {
            return lines;
        }

        // The opening line holds the `{` or `:` unless nothing precedes the list
        if range.start != 0 {
            lines.start += 1;
        }
        if range.end == self.tokens.len() {
            lines.end += 1;
        }
        lines
    }

    pub(crate) fn list_available_lines(&self, id: ContainerId, policy: &ListPolicy) -> Vec<usize> {
        if policy.trailing_clauses && !self.newline_spacing(id, policy) {
            return self.inline_clause_lines(id, policy);
        }
        let occupied: Vec<Range<usize>> = self
            .children(id)
            .iter()
            .filter_map(|child| self.line_range(*child))
            .collect();
        self.available_line_range(id, policy)
            .filter(|line| {
                !occupied
                    .iter()
                    .any(|range| range.start < *line && *line < range.end)
            })
            .collect()
    }

    fn current_placeholder(&self, id: ContainerId, policy: &ListPolicy) -> Option<ContainerId> {
        let placeholder = policy.placeholder.as_ref()?;
        if !placeholder.scope.applies(self.is_top_level(id)) {
            return None;
        }
        match self.list_elements(id, policy).as_slice() {
            [element] if self.visible_text(*element) == placeholder.text => Some(*element),
            _ => None,
        }
    }

    fn inside_optional(&self, id: ContainerId) -> Option<ContainerId> {
        let parent = self.parent(id)?;
        match self.grammar().shape(self.kind(parent)) {
            Shape::Optional(policy) if policy.element == self.kind(id) => Some(parent),
            _ => None,
        }
    }
}

impl<'a> ListMut<'a> {
    pub(crate) fn new(tree: &'a mut Tree, id: ContainerId, policy: ListPolicy) -> Self {
        Self { tree, id, policy }
    }

    pub fn id(&self) -> ContainerId {
        self.id
    }

    pub fn policy(&self) -> &ListPolicy {
        &self.policy
    }

    pub fn elements(&self) -> Vec<ContainerId> {
        self.tree.list_elements(self.id, &self.policy)
    }

    /// Lines at which [`add_at_line`](Self::add_at_line) accepts an element
    pub fn available_lines(&self) -> Vec<usize> {
        self.tree.list_available_lines(self.id, &self.policy)
    }

    pub fn can_add(&self, kind: SyntaxKind) -> bool {
        self.policy.accepts(kind)
    }

    pub(super) fn top_level(&self) -> bool {
        self.tree.is_top_level(self.id)
    }

    fn kind(&self) -> SyntaxKind {
        self.tree.kind(self.id)
    }

    fn check_kind(&self, fragment: &Tree) -> Result<SyntaxKind> {
        let kind = fragment.kind(fragment.root());
        if kind == SyntaxKind::Comment || self.policy.accepts(kind) {
            Ok(kind)
        } else {
            Err(SpliceError::kind_mismatch(self.kind(), kind))
        }
    }

    fn wrap(&self, fragment: &mut Tree) {
        let kind = fragment.kind(fragment.root());
        if kind != SyntaxKind::Comment && kind != self.policy.element {
            fragment.wrap_root(self.policy.element);
        }
    }

    /// Insert a fragment at the start of a line.
    ///
    /// Inner kinds are wrapped in the element kind, the fragment is indented
    /// to the list, and a lone placeholder element is replaced. A `Comment`
    /// fragment becomes a standalone comment instead of an element.
    pub fn add_at_line(&mut self, line: usize, fragment: Tree) -> Result<ContainerId> {
        let kind = self.check_kind(&fragment)?;
        debug!(list = %self.kind(), line, %kind, "adding element at line");

        if self.policy.trailing_clauses && !self.tree.newline_spacing(self.id, &self.policy) {
            return self.add_inline_clause(line, fragment);
        }
        let is_comment = kind == SyntaxKind::Comment;
        let added = self.insert_at_line(line, fragment, is_comment)?;
        if self.policy.is_padded() {
            self.pad_around(added, is_comment);
        }
        Ok(added)
    }

    fn insert_at_line(
        &mut self,
        line: usize,
        mut fragment: Tree,
        is_comment: bool,
    ) -> Result<ContainerId> {
        self.wrap(&mut fragment);
        let placeholder = self.tree.current_placeholder(self.id, &self.policy);

        let mut line = line;
        if self.tree.inside_line_interior(self.id) {
            self.setup_line_below();
            if let Some(last) = self.available_lines().last() {
                line = *last;
            }
        }
        let available = self.available_lines();
        if !available.contains(&line) {
            return Err(SpliceError::line_unavailable(line, available));
        }

        let unit = indent::indent(self.tree, self.id);
        let root = fragment.root();
        indent::increase_indentation(&mut fragment, root, &unit);
        let added = self.tree.add_tokens_at_line(line, fragment);
        if !is_comment {
            self.tree.add_child_by_position(self.id, NodeId::Container(added));
            self.insert_delimiter(added);
        }
        self.tree.update_comments();

        if let Some(placeholder) = placeholder {
            self.remove(placeholder)?;
        }
        Ok(added)
    }

    fn insert_delimiter(&mut self, element: ContainerId) {
        let elements = self.elements();
        let Some(index) = elements.iter().position(|other| *other == element) else {
            return;
        };
        if elements.len() < 2 {
            return;
        }
        let anchor = if index == elements.len() - 1 {
            elements[index - 1]
        } else {
            element
        };
        let Some(at) = self.tree.token_range(anchor).map(|range| range.end) else {
            return;
        };
        if let Some(delimiter) = self.tree.literal(self.policy.delimiter) {
            self.tree.tokens.insert_one(at, delimiter);
            self.tree.add_child_by_position(self.id, NodeId::Token(delimiter));
        }
    }

    /// Insert a fragment as the `index`-th element, on the same line as its
    /// neighbors
    pub fn add(&mut self, index: usize, fragment: Tree) -> Result<ContainerId> {
        let kind = self.check_kind(&fragment)?;
        let elements = self.elements();
        if index > elements.len() {
            return Err(SpliceError::IndexOutOfBounds {
                container: self.kind(),
                index,
                len: elements.len(),
            });
        }
        debug!(list = %self.kind(), index, %kind, "adding element");

        let mut fragment = fragment;
        self.wrap(&mut fragment);
        let placeholder = self.tree.current_placeholder(self.id, &self.policy);
        let graft = self.tree.graft_visible(fragment);
        let root = NodeId::Container(graft.root);
        let delimiter = self.tree.literal(self.policy.delimiter);

        let (token_index, child_index, tokens, children): (usize, usize, Vec<TokenId>, Vec<NodeId>) =
            if index > 0 {
                let previous = elements[index - 1];
                let child_index = self
                    .tree
                    .children(self.id)
                    .iter()
                    .position(|child| *child == NodeId::Container(previous))
                    .map_or(0, |position| position + 1);
                let token_index = self.tree.token_range(previous).map_or_else(
                    || self.tree.token_range_with_trivia(previous).end,
                    |range| range.end,
                );
                let space = self.tree.create_token(" ");
                let tokens = delimiter
                    .into_iter()
                    .chain(std::iter::once(space))
                    .chain(graft.tokens.iter().copied())
                    .collect();
                let children = delimiter
                    .map(NodeId::Token)
                    .into_iter()
                    .chain(std::iter::once(root))
                    .collect();
                (token_index, child_index, tokens, children)
            } else if let Some(range) = (!elements.is_empty())
                .then(|| self.tree.token_range(self.id))
                .flatten()
            {
                let space = self.tree.create_token(" ");
                let tokens = graft
                    .tokens
                    .iter()
                    .copied()
                    .chain(delimiter)
                    .chain(std::iter::once(space))
                    .collect();
                let children = std::iter::once(root)
                    .chain(delimiter.map(NodeId::Token))
                    .collect();
                (range.start, 0, tokens, children)
            } else {
                let token_index = self.tree.setup_spacing_before_becoming_visible(self.id);
                (token_index, 0, graft.tokens.clone(), vec![root])
            };

        self.tree.tokens.insert(token_index, tokens);
        for (offset, child) in children.into_iter().enumerate() {
            self.tree.insert_child(self.id, child_index + offset, child);
        }
        self.tree.update_comments();

        if let Some(placeholder) = placeholder {
            self.remove(placeholder)?;
        }
        Ok(graft.root)
    }

    /// Remove an element, returning its tokens as a free-standing fragment
    pub fn remove(&mut self, element: ContainerId) -> Result<Tree> {
        if self.tree.parent(element) != Some(self.id) {
            if self.elements().is_empty() {
                return Err(SpliceError::empty_container(self.kind()));
            }
            return Err(SpliceError::NotAnElement {
                container: self.kind(),
            });
        }
        debug!(list = %self.kind(), element = %self.tree.kind(element), "removing element");
        if self.policy.is_padded() {
            self.remove_padded(element)
        } else {
            self.remove_element(element)
        }
    }

    pub(super) fn remove_element(&mut self, element: ContainerId) -> Result<Tree> {
        let ids = self.tree.visible_token_ids(element);
        let fragment = self.tree.extract(element, &ids);

        if self.elements().len() == 1 {
            if let Some(optional) = self.tree.inside_optional(self.id) {
                self.tree.optional_mut(optional)?.clear()?;
                return Ok(fragment);
            }
        }

        self.remove_delimiter(element);
        if let Some(range) = self.tree.token_range(element) {
            let removal = self.tree.tokens.include_line_whitespace_on_one_side(range);
            self.tree.tokens.remove(removal);
        }
        self.tree.update_comments();
        self.tree.remove_child(self.id, NodeId::Container(element));
        self.add_placeholder_if_empty()?;
        Ok(fragment)
    }

    fn remove_delimiter(&mut self, element: ContainerId) {
        if self.policy.delimiter.is_empty() {
            return;
        }
        let children = self.tree.children(self.id);
        let Some(index) = children
            .iter()
            .position(|child| *child == NodeId::Container(element))
        else {
            return;
        };
        let neighbor = if index > 0 {
            children.get(index - 1)
        } else {
            children.get(index + 1)
        };
        let Some(NodeId::Token(delimiter)) = neighbor.copied() else {
            return;
        };
        if let Some(position) = self.tree.tokens.get(delimiter).index() {
            self.tree.tokens.remove(position..position + 1);
        }
        self.tree.remove_child(self.id, NodeId::Token(delimiter));
    }

    fn add_placeholder_if_empty(&mut self) -> Result<()> {
        let Some(placeholder) = self.policy.placeholder.clone() else {
            return Ok(());
        };
        if !self.elements().is_empty() || !placeholder.scope.applies(self.top_level()) {
            return Ok(());
        }
        let Some(line) = self.available_lines().first().copied() else {
            return Ok(());
        };
        let fragment = Tree::from_source(
            self.tree.grammar().clone(),
            self.policy.element,
            placeholder.text,
        );
        self.add_at_line(line, fragment).map(|_| ())
    }

    fn retained_first(&self) -> Option<ContainerId> {
        let first = *self.elements().first()?;
        let text = self.tree.visible_text(first);
        self.policy
            .retained_first
            .iter()
            .any(|retained| *retained == text)
            .then_some(first)
    }

    /// Remove every element.
    ///
    /// A list enclosed on both sides keeps its closing token on its own
    /// line; an empty list that declares a placeholder gets it back.
    pub fn clear(&mut self) -> Result<()> {
        debug!(list = %self.kind(), elements = self.elements().len(), "clearing list");
        if let Some(retained) = self.retained_first() {
            for element in self.elements().into_iter().rev() {
                if element != retained {
                    self.remove(element)?;
                }
            }
            return Ok(());
        }

        let top_level = self.top_level();
        let bounded_above = self.policy.bounded_above.applies(top_level);
        let bounded_below = self.policy.bounded_below.applies(top_level);
        let closing_indent = indent::parent_indent(self.tree, self.id);

        let mut range = self.tree.token_range_with_trivia(self.id);
        let visible = self.tree.token_range(self.id);
        if self.policy.multiline {
            if !bounded_below {
                range.end = visible.map_or(range.start, |visible| visible.end);
            } else if !bounded_above {
                range.start = visible.map_or(range.end, |visible| visible.start);
            }
        }
        self.tree.clear_children(self.id);
        self.tree.tokens.remove(range.clone());

        if self.policy.multiline && bounded_above && bounded_below {
            let newline = self.tree.tokens.create_newline();
            let indentation = self.tree.literal(&closing_indent);
            self.tree
                .tokens
                .insert(range.start, std::iter::once(newline).chain(indentation));
        }
        self.tree.update_comments();

        if let Some(optional) = self.tree.inside_optional(self.id) {
            self.tree.optional_mut(optional)?.clear()?;
        }
        self.add_placeholder_if_empty()
    }

    /// Move an inline body onto its own lines, and the closing token onto
    /// the line after it
    fn setup_line_below(&mut self) {
        loop {
            let range = self.tree.token_range_with_trivia(self.id);
            if range.is_empty() || !self.tree.tokens.at(range.start).is_whitespace() {
                break;
            }
            self.tree.tokens.remove(range.start..range.start + 1);
        }
        loop {
            let range = self.tree.token_range_with_trivia(self.id);
            if range.is_empty() || !self.tree.tokens.at(range.end - 1).is_whitespace() {
                break;
            }
            self.tree.tokens.remove(range.end - 1..range.end);
        }

        let range = self.tree.token_range_with_trivia(self.id);
        if !range.is_empty() {
            let unit = indent::indent(self.tree, self.id);
            let newline = self.tree.tokens.create_newline();
            let indentation = self.tree.literal(&unit);
            self.tree
                .tokens
                .insert(range.start, std::iter::once(newline).chain(indentation));
        }

        let closing = indent::parent_indent(self.tree, self.id);
        let end = self.tree.token_range_with_trivia(self.id).end;
        let newline = self.tree.tokens.create_newline();
        let indentation = self.tree.literal(&closing);
        self.tree
            .tokens
            .insert(end, std::iter::once(newline).chain(indentation));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{javascript, python};
    use crate::syntax::TreeBuilder;

    fn arguments(source: &str, names: &[&str]) -> Tree {
        let mut builder = TreeBuilder::new(javascript(), source);
        builder.node(SyntaxKind::Program, |b| {
            b.node(SyntaxKind::Call, |b| {
                b.tokens(&["f", "("]);
                b.node(SyntaxKind::ArgumentList, |b| {
                    for (index, name) in names.iter().enumerate() {
                        if index > 0 {
                            b.token(",");
                        }
                        b.node(SyntaxKind::Argument, |b| {
                            b.token(name);
                        });
                    }
                });
                b.token(")");
            });
        });
        builder.finish().unwrap()
    }

    fn argument(text: &str) -> Tree {
        Tree::from_source(javascript(), SyntaxKind::Argument, text)
    }

    #[test]
    fn test_add_to_empty_argument_list() {
        let mut tree = arguments("f()\n", &[]);
        let list = tree.find(SyntaxKind::ArgumentList).unwrap();
        tree.list_mut(list).unwrap().add(0, argument("x")).unwrap();
        assert_eq!(tree.text(), "f(x)\n");
    }

    #[test]
    fn test_add_before_and_after() {
        let mut tree = arguments("f(b)\n", &["b"]);
        let list = tree.find(SyntaxKind::ArgumentList).unwrap();
        let mut handle = tree.list_mut(list).unwrap();
        handle.add(0, argument("a")).unwrap();
        handle.add(2, argument("c")).unwrap();
        assert_eq!(tree.text(), "f(a, b, c)\n");
        assert_eq!(tree.elements(list).len(), 3);
        assert_eq!(tree.children(list).len(), 5);
    }

    #[test]
    fn test_add_out_of_bounds() {
        let mut tree = arguments("f(a)\n", &["a"]);
        let list = tree.find(SyntaxKind::ArgumentList).unwrap();
        let result = tree.list_mut(list).unwrap().add(3, argument("x"));
        assert!(matches!(result, Err(SpliceError::IndexOutOfBounds { len: 1, .. })));
        assert_eq!(tree.text(), "f(a)\n");
    }

    #[test]
    fn test_remove_takes_delimiter() {
        let mut tree = arguments("f(a, b, c)\n", &["a", "b", "c"]);
        let list = tree.find(SyntaxKind::ArgumentList).unwrap();
        let elements = tree.elements(list);

        let removed = tree.list_mut(list).unwrap().remove(elements[1]).unwrap();
        assert_eq!(tree.text(), "f(a, c)\n");
        assert_eq!(removed.text(), "b");

        tree.list_mut(list).unwrap().remove(elements[0]).unwrap();
        assert_eq!(tree.text(), "f(c)\n");
    }

    #[test]
    fn test_remove_rejects_foreign_nodes() {
        let mut tree = arguments("f(a)\n", &["a"]);
        let list = tree.find(SyntaxKind::ArgumentList).unwrap();
        let call = tree.find(SyntaxKind::Call).unwrap();
        let result = tree.list_mut(list).unwrap().remove(call);
        assert!(matches!(result, Err(SpliceError::NotAnElement { .. })));
    }

    #[test]
    fn test_remove_from_empty_list() {
        let mut tree = arguments("f()\n", &[]);
        let list = tree.find(SyntaxKind::ArgumentList).unwrap();
        let call = tree.find(SyntaxKind::Call).unwrap();
        let result = tree.list_mut(list).unwrap().remove(call);
        assert!(matches!(result, Err(SpliceError::EmptyContainer { .. })));
    }

    #[test]
    fn test_clear_delimited_list() {
        let mut tree = arguments("f(a, b)\n", &["a", "b"]);
        let list = tree.find(SyntaxKind::ArgumentList).unwrap();
        tree.list_mut(list).unwrap().clear().unwrap();
        assert_eq!(tree.text(), "f()\n");
        assert!(tree.elements(list).is_empty());
    }

    #[test]
    fn test_kind_mismatch_leaves_tree_untouched() {
        let mut tree = arguments("f(a)\n", &["a"]);
        let list = tree.find(SyntaxKind::ArgumentList).unwrap();
        let fragment = Tree::from_source(javascript(), SyntaxKind::Class, "class A {}");
        let result = tree.list_mut(list).unwrap().add(1, fragment);
        assert!(matches!(result, Err(SpliceError::KindMismatch { .. })));
        assert_eq!(tree.text(), "f(a)\n");
    }

    #[test]
    fn test_explode_inline_block() {
        let source = "if (x) {}\n";
        let mut builder = TreeBuilder::new(javascript(), source);
        builder.node(SyntaxKind::Program, |b| {
            b.node(SyntaxKind::If, |b| {
                b.tokens(&["if", "(", "x", ")"]);
                b.node(SyntaxKind::EnclosedBody, |b| {
                    b.token("{");
                    b.node(SyntaxKind::StatementList, |_| {});
                    b.token("}");
                });
            });
        });
        let mut tree = builder.finish().unwrap();
        let list = tree.find(SyntaxKind::StatementList).unwrap();
        assert_eq!(tree.available_lines(list).unwrap(), vec![1]);

        let statement = Tree::from_source(javascript(), SyntaxKind::Call, "a();");
        tree.list_mut(list).unwrap().add_at_line(1, statement).unwrap();
        assert_eq!(tree.text(), "if (x) {\n  a();\n}\n");
    }

    #[test]
    fn test_retained_first_parameter() {
        let source = "def f(self, a, b):\n    pass\n";
        let mut builder = TreeBuilder::new(python(), source);
        builder.node(SyntaxKind::Program, |b| {
            b.node(SyntaxKind::Function, |b| {
                b.tokens(&["def", "f", "("]);
                b.node(SyntaxKind::ParameterList, |b| {
                    for (index, name) in ["self", "a", "b"].iter().enumerate() {
                        if index > 0 {
                            b.token(",");
                        }
                        b.node(SyntaxKind::Parameter, |b| {
                            b.token(name);
                        });
                    }
                });
                b.tokens(&[")", ":", "pass"]);
            });
        });
        let mut tree = builder.finish().unwrap();
        let list = tree.find(SyntaxKind::ParameterList).unwrap();
        tree.list_mut(list).unwrap().clear().unwrap();
        assert_eq!(tree.text(), "def f(self):\n    pass\n");
    }
}
