//! Node identities and navigation
//!
//! Nodes live in arenas owned by their [`Tree`]: tokens in the
//! [`TokenStream`](super::TokenStream) slab, containers in the tree's
//! container arena. A [`NodeId`] addresses either. Parent links are ids, so
//! navigation in both directions is O(1) without reference cycles.
//!
//! Ranges are derived, never stored on containers: a container's range is
//! the span from its first to its last descendant token currently in the
//! stream.

use std::ops::Range;

use biome_text_size::{TextRange, TextSize};

use super::{SyntaxKind, Tree};

/// Index of a token in its tree's token slab
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenId(u32);

impl TokenId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index as u32)
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Index of a container in its tree's container arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContainerId(u32);

impl ContainerId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index as u32)
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// A token or a container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeId {
    Token(TokenId),
    Container(ContainerId),
}

impl NodeId {
    pub fn as_container(self) -> Option<ContainerId> {
        match self {
            NodeId::Container(id) => Some(id),
            NodeId::Token(_) => None,
        }
    }

    pub fn as_token(self) -> Option<TokenId> {
        match self {
            NodeId::Token(id) => Some(id),
            NodeId::Container(_) => None,
        }
    }

    pub(crate) fn shifted(self, tokens: usize, containers: usize) -> Self {
        match self {
            NodeId::Token(id) => NodeId::Token(TokenId::new(id.index() + tokens)),
            NodeId::Container(id) => NodeId::Container(ContainerId::new(id.index() + containers)),
        }
    }
}

impl From<TokenId> for NodeId {
    fn from(id: TokenId) -> Self {
        NodeId::Token(id)
    }
}

impl From<ContainerId> for NodeId {
    fn from(id: ContainerId) -> Self {
        NodeId::Container(id)
    }
}

/// A composite node with ordered children
#[derive(Debug, Clone)]
pub(crate) struct Container {
    pub(crate) kind: SyntaxKind,
    pub(crate) parent: Option<ContainerId>,
    pub(crate) children: Vec<NodeId>,
}

impl Container {
    pub(crate) fn new(kind: SyntaxKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
        }
    }
}

impl Tree {
    fn container(&self, id: ContainerId) -> &Container {
        &self.containers[id.index()]
    }

    pub(crate) fn container_mut(&mut self, id: ContainerId) -> &mut Container {
        &mut self.containers[id.index()]
    }

    pub fn kind(&self, node: impl Into<NodeId>) -> SyntaxKind {
        match node.into() {
            NodeId::Token(id) if self.tokens.get(id).is_newline() => SyntaxKind::Newline,
            NodeId::Token(_) => SyntaxKind::Token,
            NodeId::Container(id) => self.container(id).kind,
        }
    }

    pub fn parent(&self, node: impl Into<NodeId>) -> Option<ContainerId> {
        match node.into() {
            NodeId::Token(id) => self.tokens.get(id).parent(),
            NodeId::Container(id) => self.container(id).parent,
        }
    }

    pub fn children(&self, id: ContainerId) -> &[NodeId] {
        &self.container(id).children
    }

    /// Children that are containers of the given kind
    pub fn children_of_kind(&self, id: ContainerId, kind: SyntaxKind) -> Vec<ContainerId> {
        self.children(id)
            .iter()
            .filter_map(|child| child.as_container())
            .filter(|child| self.kind(*child) == kind)
            .collect()
    }

    pub fn child_of_kind(&self, id: ContainerId, kind: SyntaxKind) -> Option<ContainerId> {
        self.children(id)
            .iter()
            .filter_map(|child| child.as_container())
            .find(|child| self.kind(*child) == kind)
    }

    /// Strict ancestors, nearest first
    pub fn ancestors(&self, node: impl Into<NodeId>) -> impl Iterator<Item = ContainerId> + '_ {
        std::iter::successors(self.parent(node), move |id| self.parent(*id))
    }

    /// Whether `ancestor` is `node` or one of its ancestors
    pub fn contains(&self, ancestor: ContainerId, node: impl Into<NodeId>) -> bool {
        let node = node.into();
        node == NodeId::Container(ancestor) || self.ancestors(node).any(|id| id == ancestor)
    }

    /// Containers of a subtree in pre-order, `id` included
    pub fn descendants(&self, id: ContainerId) -> Vec<ContainerId> {
        let mut result = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            result.push(current);
            for child in self.children(current).iter().rev() {
                if let NodeId::Container(child) = child {
                    stack.push(*child);
                }
            }
        }
        result
    }

    /// First container of a kind under the root, in pre-order
    pub fn find(&self, kind: SyntaxKind) -> Option<ContainerId> {
        self.find_in(self.root(), kind)
    }

    pub fn find_in(&self, id: ContainerId, kind: SyntaxKind) -> Option<ContainerId> {
        self.descendants(id)
            .into_iter()
            .find(|candidate| self.kind(*candidate) == kind)
    }

    /// Every container of a kind under the root, in pre-order
    pub fn find_all(&self, kind: SyntaxKind) -> Vec<ContainerId> {
        self.descendants(self.root())
            .into_iter()
            .filter(|candidate| self.kind(*candidate) == kind)
            .collect()
    }

    /// Leftmost descendant token still in the stream
    pub fn first_token(&self, node: impl Into<NodeId>) -> Option<TokenId> {
        match node.into() {
            NodeId::Token(id) => self.tokens.contains(id).then_some(id),
            NodeId::Container(id) => self
                .children(id)
                .iter()
                .find_map(|child| self.first_token(*child)),
        }
    }

    /// Rightmost descendant token still in the stream
    pub fn last_token(&self, node: impl Into<NodeId>) -> Option<TokenId> {
        match node.into() {
            NodeId::Token(id) => self.tokens.contains(id).then_some(id),
            NodeId::Container(id) => self
                .children(id)
                .iter()
                .rev()
                .find_map(|child| self.last_token(*child)),
        }
    }

    /// Whether the node has any token in the stream
    pub fn is_visible(&self, node: impl Into<NodeId>) -> bool {
        self.first_token(node).is_some()
    }

    /// Stream positions from the first to the last visible token
    pub fn token_range(&self, node: impl Into<NodeId>) -> Option<Range<usize>> {
        let node = node.into();
        let first = self.first_token(node)?;
        let last = self.last_token(node)?;
        let start = self.tokens.get(first).index()?;
        let stop = self.tokens.get(last).index()?;
        Some(start..stop + 1)
    }

    /// Closest visible token left of the node, outside of it
    pub fn right_most_left(&self, node: impl Into<NodeId>) -> Option<TokenId> {
        let mut current = node.into();
        while let Some(parent) = self.parent(current) {
            let siblings = self.children(parent);
            let position = siblings.iter().position(|child| *child == current)?;
            if let Some(token) = siblings[..position]
                .iter()
                .rev()
                .find_map(|sibling| self.last_token(*sibling))
            {
                return Some(token);
            }
            current = NodeId::Container(parent);
        }
        None
    }

    /// Closest visible token right of the node, outside of it
    pub fn left_most_right(&self, node: impl Into<NodeId>) -> Option<TokenId> {
        let mut current = node.into();
        while let Some(parent) = self.parent(current) {
            let siblings = self.children(parent);
            let position = siblings.iter().position(|child| *child == current)?;
            if let Some(token) = siblings[position + 1..]
                .iter()
                .find_map(|sibling| self.first_token(*sibling))
            {
                return Some(token);
            }
            current = NodeId::Container(parent);
        }
        None
    }

    /// Stream positions between the neighboring visible tokens, i.e. the
    /// node plus the whitespace and comments around it
    pub fn token_range_with_trivia(&self, node: impl Into<NodeId>) -> Range<usize> {
        let node = node.into();
        let start = self
            .right_most_left(node)
            .and_then(|token| self.tokens.get(token).index())
            .map_or(0, |index| index + 1);
        let stop = self
            .left_most_right(node)
            .and_then(|token| self.tokens.get(token).index())
            .unwrap_or(self.tokens.len());
        start..stop.max(start)
    }

    /// Byte range of the node; an invisible node gets an empty range where
    /// its content would go
    pub fn range(&self, node: impl Into<NodeId>) -> TextRange {
        let node = node.into();
        match self.token_range(node) {
            Some(range) => TextRange::new(
                self.tokens.at(range.start).range().start(),
                self.tokens.at(range.end - 1).range().end(),
            ),
            None => {
                let offset = self
                    .right_most_left(node)
                    .map_or(TextSize::from(0), |token| self.tokens.get(token).range().end());
                TextRange::empty(offset)
            }
        }
    }

    /// Lines spanned by the visible tokens
    pub fn line_range(&self, node: impl Into<NodeId>) -> Option<Range<usize>> {
        self.token_range(node)
            .map(|range| self.tokens.lines_of(range))
    }

    /// Text from the first to the last visible token
    pub fn visible_text(&self, node: impl Into<NodeId>) -> String {
        self.token_range(node)
            .map(|range| self.tokens.text_of(range))
            .unwrap_or_default()
    }

    /// Text of the node plus surrounding whitespace and comments
    pub fn text_with_trivia(&self, node: impl Into<NodeId>) -> String {
        self.tokens.text_of(self.token_range_with_trivia(node))
    }

    /// Stream ids of the visible range, hidden tokens in between included
    pub(crate) fn visible_token_ids(&self, node: impl Into<NodeId>) -> Vec<TokenId> {
        self.token_range(node)
            .map(|range| self.tokens.ids()[range].to_vec())
            .unwrap_or_default()
    }

    pub(crate) fn set_parent(&mut self, node: NodeId, parent: Option<ContainerId>) {
        match node {
            NodeId::Token(id) => self.tokens.get_mut(id).parent = parent,
            NodeId::Container(id) => self.container_mut(id).parent = parent,
        }
    }

    pub(crate) fn insert_child(&mut self, parent: ContainerId, index: usize, node: NodeId) {
        self.container_mut(parent).children.insert(index, node);
        self.set_parent(node, Some(parent));
    }

    pub(crate) fn push_child(&mut self, parent: ContainerId, node: NodeId) {
        self.container_mut(parent).children.push(node);
        self.set_parent(node, Some(parent));
    }

    /// Detach a child from its parent's child list, returning its position
    pub(crate) fn remove_child(&mut self, parent: ContainerId, node: NodeId) -> Option<usize> {
        let position = self.children(parent).iter().position(|child| *child == node)?;
        self.container_mut(parent).children.remove(position);
        self.set_parent(node, None);
        Some(position)
    }

    pub(crate) fn clear_children(&mut self, parent: ContainerId) {
        let children = std::mem::take(&mut self.container_mut(parent).children);
        for child in children {
            self.set_parent(child, None);
        }
    }

    /// Insert a child before the first sibling that starts at or after it
    /// in the stream
    pub(crate) fn add_child_by_position(&mut self, parent: ContainerId, node: NodeId) {
        let start = self.token_range(node).map_or(usize::MAX, |range| range.start);
        let index = self
            .children(parent)
            .iter()
            .position(|child| {
                self.token_range(*child)
                    .is_some_and(|range| range.start >= start)
            })
            .unwrap_or(self.children(parent).len());
        self.insert_child(parent, index, node);
    }

    pub(crate) fn create_container(&mut self, kind: SyntaxKind) -> ContainerId {
        let id = ContainerId::new(self.containers.len());
        self.containers.push(Container::new(kind));
        id
    }

    pub(crate) fn create_token(&mut self, text: impl Into<String>) -> TokenId {
        self.tokens.create(text)
    }
}
