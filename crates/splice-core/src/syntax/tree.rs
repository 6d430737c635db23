//! The tree: one token stream, one root container and its comments
//!
//! A [`Tree`] is one parsed unit, a whole file or a free-standing fragment
//! about to be inserted somewhere. Fragments are spliced into a target
//! with [`Tree::add_tokens`] or [`Tree::add_tokens_at_line`], which move the
//! fragment's arenas into the target and re-home every id.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::node::Container;
use super::{ContainerId, NodeId, SyntaxKind, TokenId, TokenStream};
use crate::grammar::Grammar;
use crate::indent;

/// Position of the first syntax error of the source a tree was built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntaxError {
    /// Zero-based line
    pub line: usize,
    /// Byte column within the line
    pub column: usize,
    /// Absolute byte offset
    pub offset: usize,
}

impl SyntaxError {
    /// Locate an offset in a source text; an offset inside a character
    /// moves back to that character's start
    pub fn at_offset(source: &str, offset: usize) -> Self {
        let mut offset = offset.min(source.len());
        while !source.is_char_boundary(offset) {
            offset -= 1;
        }
        let before = &source[..offset];
        let line = before.matches('\n').count();
        let line_start = before.rfind('\n').map_or(0, |index| index + 1);
        Self {
            line,
            column: offset - line_start,
            offset,
        }
    }
}

/// Result of moving a fragment's arenas into a tree
#[derive(Debug)]
pub(crate) struct Graft {
    pub(crate) root: ContainerId,
    /// The fragment's stream, re-homed, in order
    pub(crate) tokens: Vec<TokenId>,
    token_offset: usize,
}

impl Graft {
    /// Re-home a token id of the original fragment
    pub(crate) fn token(&self, id: TokenId) -> TokenId {
        TokenId::new(id.index() + self.token_offset)
    }
}

/// Owning context of one parsed unit
#[derive(Debug, Clone)]
pub struct Tree {
    grammar: Arc<Grammar>,
    pub(crate) tokens: TokenStream,
    pub(crate) containers: Vec<Container>,
    root: ContainerId,
    comments: Vec<ContainerId>,
    syntax_error: Option<SyntaxError>,
}

impl Tree {
    pub(crate) fn from_parts(
        grammar: Arc<Grammar>,
        tokens: TokenStream,
        containers: Vec<Container>,
        root: ContainerId,
        comments: Vec<ContainerId>,
    ) -> Self {
        Self {
            grammar,
            tokens,
            containers,
            root,
            comments,
            syntax_error: None,
        }
    }

    pub fn grammar(&self) -> &Arc<Grammar> {
        &self.grammar
    }

    pub fn root(&self) -> ContainerId {
        self.root
    }

    pub fn tokens(&self) -> &TokenStream {
        &self.tokens
    }

    /// Comment nodes, in stream order
    pub fn comments(&self) -> &[ContainerId] {
        &self.comments
    }

    pub fn syntax_error(&self) -> Option<SyntaxError> {
        self.syntax_error
    }

    pub fn set_syntax_error(&mut self, error: Option<SyntaxError>) {
        self.syntax_error = error;
    }

    /// The exact current source
    pub fn text(&self) -> String {
        self.tokens.text()
    }

    /// Text of the root's visible range, without leading and trailing
    /// whitespace or comments
    pub fn code(&self) -> String {
        self.visible_text(self.root)
    }

    /// Wrap the root of a fragment in a new container
    pub fn wrap_root(&mut self, kind: SyntaxKind) -> ContainerId {
        let wrapper = self.create_container(kind);
        let root = self.root;
        self.push_child(wrapper, NodeId::Container(root));
        self.root = wrapper;
        wrapper
    }

    pub(crate) fn ends_with_newline(&self) -> bool {
        self.tokens
            .ids()
            .last()
            .is_some_and(|id| self.tokens.get(*id).is_newline())
    }

    pub(crate) fn ensure_trailing_newline(&mut self) {
        if !self.tokens.is_empty() && !self.ends_with_newline() {
            let newline = self.tokens.create_newline();
            self.tokens.insert_one(self.tokens.len(), newline);
        }
    }

    /// Move a fragment's tokens and containers into this tree's arenas
    /// without touching the stream
    pub(crate) fn graft(&mut self, fragment: Tree) -> Graft {
        let token_offset = self.tokens.allocated();
        let container_offset = self.containers.len();

        for index in 0..fragment.tokens.allocated() {
            let token = fragment.tokens.get(TokenId::new(index));
            let id = self.tokens.create(token.text());
            self.tokens.get_mut(id).parent = token
                .parent()
                .map(|parent| ContainerId::new(parent.index() + container_offset));
        }
        for container in fragment.containers {
            self.containers.push(Container {
                kind: container.kind,
                parent: container
                    .parent
                    .map(|parent| ContainerId::new(parent.index() + container_offset)),
                children: container
                    .children
                    .into_iter()
                    .map(|child| child.shifted(token_offset, container_offset))
                    .collect(),
            });
        }

        Graft {
            root: ContainerId::new(fragment.root.index() + container_offset),
            tokens: fragment
                .tokens
                .ids()
                .iter()
                .map(|id| TokenId::new(id.index() + token_offset))
                .collect(),
            token_offset,
        }
    }

    /// Splice every token of a fragment at a stream position, returning the
    /// fragment's root re-homed into this tree
    pub fn add_tokens(&mut self, index: usize, fragment: Tree) -> ContainerId {
        let graft = self.graft(fragment);
        trace!(index, count = graft.tokens.len(), "splicing fragment");
        self.tokens.insert(index, graft.tokens);
        graft.root
    }

    /// Splice a fragment at the start of a line, terminating it with a
    /// newline; lines past the end append to the tree
    pub fn add_tokens_at_line(&mut self, line: usize, mut fragment: Tree) -> ContainerId {
        let index = if line >= self.tokens.line_count() {
            self.ensure_trailing_newline();
            self.tokens.len()
        } else {
            self.tokens.line_token_range(line).start
        };
        fragment.ensure_trailing_newline();
        self.add_tokens(index, fragment)
    }

    fn comment_owner(&self, mut current: Option<ContainerId>) -> Option<ContainerId> {
        while let Some(id) = current {
            if self.kind(id) == SyntaxKind::Comment {
                return Some(id);
            }
            current = self.parent(id);
        }
        None
    }

    /// Rebuild the comment list from the tokens currently in the stream
    pub fn update_comments(&mut self) {
        let mut comments = Vec::new();
        for (_, token) in self.tokens.iter() {
            if let Some(comment) = self.comment_owner(token.parent()) {
                if !comments.contains(&comment) {
                    comments.push(comment);
                }
            }
        }
        self.comments = comments;
    }

    pub(crate) fn set_comments(&mut self, comments: Vec<ContainerId>) {
        self.comments = comments;
    }

    /// Delete a comment and the whitespace on one side of it
    pub fn remove_comment(&mut self, comment: ContainerId) {
        self.comments.retain(|id| *id != comment);
        if let Some(range) = self.token_range(comment) {
            let removal = self.tokens.include_line_whitespace_on_one_side(range);
            self.tokens.remove(removal);
        }
    }

    /// Drop tokens that belong to no node and are not whitespace
    pub fn remove_hidden_tokens(&mut self) {
        let unattributed: Vec<TokenId> = self
            .tokens
            .iter()
            .filter(|(_, token)| token.parent().is_none() && !token.is_whitespace())
            .map(|(id, _)| id)
            .collect();
        trace!(count = unattributed.len(), "removing unattributed tokens");
        self.tokens.remove_ids(&unattributed);
    }

    /// Copy a container subtree and the given stream tokens into a new tree
    pub(crate) fn extract(&self, root: ContainerId, token_ids: &[TokenId]) -> Tree {
        let mut tokens = TokenStream::new();
        let mut token_map = HashMap::with_capacity(token_ids.len());
        for id in token_ids {
            token_map.insert(*id, tokens.create(self.tokens.get(*id).text()));
        }

        let mut containers = Vec::new();
        let new_root = self.copy_container(root, None, &token_map, &mut containers, &mut tokens);
        let mut comments = Vec::new();
        for comment in &self.comments {
            if *comment == root {
                comments.push(new_root);
                continue;
            }
            let inside = self.descendants(*comment).iter().all(|id| {
                self.children(*id)
                    .iter()
                    .filter_map(|child| child.as_token())
                    .all(|token| token_map.contains_key(&token))
            });
            if inside && self.is_visible(*comment) {
                comments.push(self.copy_container(
                    *comment,
                    None,
                    &token_map,
                    &mut containers,
                    &mut tokens,
                ));
            }
        }

        tokens.insert(0, token_ids.iter().map(|id| token_map[id]));
        Tree::from_parts(self.grammar.clone(), tokens, containers, new_root, comments)
    }

    fn copy_container(
        &self,
        id: ContainerId,
        parent: Option<ContainerId>,
        token_map: &HashMap<TokenId, TokenId>,
        containers: &mut Vec<Container>,
        tokens: &mut TokenStream,
    ) -> ContainerId {
        let new_id = ContainerId::new(containers.len());
        containers.push(Container {
            kind: self.kind(id),
            parent,
            children: Vec::new(),
        });

        let mut children = Vec::new();
        for child in self.children(id) {
            match child {
                NodeId::Token(token) => {
                    if let Some(copy) = token_map.get(token) {
                        tokens.get_mut(*copy).parent = Some(new_id);
                        children.push(NodeId::Token(*copy));
                    }
                }
                NodeId::Container(container) => {
                    let copy =
                        self.copy_container(*container, Some(new_id), token_map, containers, tokens);
                    children.push(NodeId::Container(copy));
                }
            }
        }
        containers[new_id.index()].children = children;
        new_id
    }

    /// Deep-copy a subtree into an independent tree.
    ///
    /// The root clones with its whole stream. Any other node clones its
    /// visible range, ends with a newline and loses its own indentation, so
    /// it can be re-inserted at any depth.
    pub fn clone_subtree(&self, node: ContainerId) -> Tree {
        let range = if node == self.root {
            0..self.tokens.len()
        } else {
            self.token_range(node).unwrap_or(0..0)
        };
        let ids = self.tokens.ids()[range].to_vec();
        let mut tree = self.extract(node, &ids);
        if node != self.root {
            tree.ensure_trailing_newline();
            let unit = indent::indent(self, node);
            let root = tree.root();
            indent::decrease_indentation(&mut tree, root, &unit);
        }
        tree.syntax_error = self.syntax_error;
        tree
    }
}
