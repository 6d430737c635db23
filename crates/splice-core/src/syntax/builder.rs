//! Tree construction
//!
//! A converter walks its parse tree and reports containers, visible tokens
//! and comments to a [`TreeBuilder`]. `finish()` then interleaves the
//! hidden tokens: every gap between two visible tokens becomes newline
//! tokens, an indentation token for whitespace at the start of a line and
//! one token for any remaining text of the line.
//!
//! ```rust,ignore
//! let mut builder = TreeBuilder::new(python(), "import a\n");
//! builder.node(SyntaxKind::Program, |b| {
//!     b.node(SyntaxKind::ImportList, |b| {
//!         b.node(SyntaxKind::Statement, |b| {
//!             b.tokens(&["import", "a"]);
//!         });
//!     });
//! });
//! let tree = builder.finish()?;
//! ```

use std::ops::Range;
use std::sync::Arc;

use tracing::debug;

use super::node::Container;
use super::{ContainerId, NodeId, SyntaxError, SyntaxKind, TokenId, TokenStream, Tree};
use crate::error::SpliceError;
use crate::grammar::Grammar;
use crate::result::Result;

const LINE_COMMENT_PREFIXES: &[&str] = &["#", "//"];
const ENCLOSED_COMMENTS: &[(&str, &str)] = &[("/*", "*/"), ("<!--", "-->")];

/// Builds a [`Tree`] over a source text
#[derive(Debug)]
pub struct TreeBuilder {
    grammar: Arc<Grammar>,
    source: String,
    tokens: TokenStream,
    containers: Vec<Container>,
    stack: Vec<ContainerId>,
    root: Option<ContainerId>,
    comments: Vec<ContainerId>,
    visible: Vec<(usize, TokenId)>,
    cursor: usize,
    errors: Vec<String>,
    syntax_error: Option<SyntaxError>,
}

impl TreeBuilder {
    pub fn new(grammar: Arc<Grammar>, source: impl Into<String>) -> Self {
        Self {
            grammar,
            source: source.into(),
            tokens: TokenStream::new(),
            containers: Vec::new(),
            stack: Vec::new(),
            root: None,
            comments: Vec::new(),
            visible: Vec::new(),
            cursor: 0,
            errors: Vec::new(),
            syntax_error: None,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    fn alloc(&mut self, kind: SyntaxKind) -> ContainerId {
        let id = ContainerId::new(self.containers.len());
        self.containers.push(Container::new(kind));
        id
    }

    fn attach(&mut self, parent: ContainerId, child: NodeId) {
        self.containers[parent.index()].children.push(child);
        match child {
            NodeId::Token(id) => self.tokens.get_mut(id).parent = Some(parent),
            NodeId::Container(id) => self.containers[id.index()].parent = Some(parent),
        }
    }

    /// Open a container; the first container opened becomes the root
    pub fn start_node(&mut self, kind: SyntaxKind) -> &mut Self {
        let id = self.alloc(kind);
        match self.stack.last().copied() {
            Some(parent) => self.attach(parent, NodeId::Container(id)),
            None if self.root.is_none() => {
                self.root = Some(id);
                if kind == SyntaxKind::Comment {
                    self.comments.push(id);
                }
            }
            None => self.errors.push(format!("second root node {kind}")),
        }
        self.stack.push(id);
        self
    }

    pub fn finish_node(&mut self) -> &mut Self {
        if self.stack.pop().is_none() {
            self.errors.push("finish_node without an open node".to_string());
        }
        self
    }

    /// Open a container, run `f` inside it and close it
    pub fn node(&mut self, kind: SyntaxKind, f: impl FnOnce(&mut Self)) -> &mut Self {
        self.start_node(kind);
        f(self);
        self.finish_node()
    }

    /// Add the next occurrence of `text` after the previous token
    pub fn token(&mut self, text: &str) -> &mut Self {
        match self.find(text) {
            Some(range) => self.token_at(range),
            None => {
                self.errors
                    .push(format!("token '{text}' not found after offset {}", self.cursor));
                self
            }
        }
    }

    pub fn tokens(&mut self, texts: &[&str]) -> &mut Self {
        for text in texts {
            self.token(text);
        }
        self
    }

    /// Add a visible token covering a byte range of the source
    pub fn token_at(&mut self, range: Range<usize>) -> &mut Self {
        let Some(parent) = self.stack.last().copied() else {
            self.errors.push(format!("token at {range:?} outside of any node"));
            return self;
        };
        if !self.check_range(&range) {
            return self;
        }
        let id = self.tokens.create(&self.source[range.clone()]);
        self.attach(parent, NodeId::Token(id));
        self.visible.push((range.start, id));
        self.cursor = range.end;
        self
    }

    /// Add the next occurrence of a comment text
    pub fn comment(&mut self, text: &str) -> &mut Self {
        match self.find(text) {
            Some(range) => self.comment_at(range),
            None => {
                self.errors
                    .push(format!("comment '{text}' not found after offset {}", self.cursor));
                self
            }
        }
    }

    /// Add a comment covering a byte range.
    ///
    /// The comment gets a prefix token (`#`, `//`, `/*`, `<!--`), a
    /// comment-text container with the non-whitespace run of every line and,
    /// for enclosed comments, a postfix token.
    pub fn comment_at(&mut self, range: Range<usize>) -> &mut Self {
        if !self.check_range(&range) {
            return self;
        }
        let text = &self.source[range.clone()];
        let (prefix, postfix) = comment_delimiters(text);
        let body = range.start + prefix..range.end - postfix;

        let comment = self.alloc(SyntaxKind::Comment);
        if prefix > 0 {
            self.comment_token(comment, range.start..body.start);
        }
        let comment_text = self.alloc(SyntaxKind::CommentText);
        self.attach(comment, NodeId::Container(comment_text));
        for line in non_whitespace_lines(&self.source, body.clone()) {
            self.comment_token(comment_text, line);
        }
        if postfix > 0 {
            self.comment_token(comment, body.end..range.end);
        }
        self.comments.push(comment);
        self.cursor = range.end;
        self
    }

    fn comment_token(&mut self, parent: ContainerId, range: Range<usize>) {
        let id = self.tokens.create(&self.source[range.clone()]);
        self.attach(parent, NodeId::Token(id));
        self.visible.push((range.start, id));
    }

    /// Add a container whose tokens are the non-whitespace run of every line
    /// of a range
    pub fn text_node_at(&mut self, kind: SyntaxKind, range: Range<usize>) -> &mut Self {
        if !self.check_range(&range) {
            return self;
        }
        self.start_node(kind);
        for line in non_whitespace_lines(&self.source, range) {
            self.token_at(line);
        }
        self.finish_node()
    }

    /// Record the first syntax error of the source
    pub fn syntax_error_at(&mut self, offset: usize) -> &mut Self {
        if self.syntax_error.is_none() {
            self.syntax_error = Some(SyntaxError::at_offset(&self.source, offset));
        }
        self
    }

    fn find(&self, text: &str) -> Option<Range<usize>> {
        let start = self.cursor + self.source.get(self.cursor..)?.find(text)?;
        Some(start..start + text.len())
    }

    fn check_range(&mut self, range: &Range<usize>) -> bool {
        let valid = range.start <= range.end
            && range.end <= self.source.len()
            && range.start >= self.cursor
            && self.source.is_char_boundary(range.start)
            && self.source.is_char_boundary(range.end);
        if !valid {
            self.errors.push(format!(
                "range {range:?} is out of order or out of bounds (cursor {}, length {})",
                self.cursor,
                self.source.len()
            ));
        }
        valid
    }

    /// Interleave hidden tokens and produce the tree
    pub fn finish(mut self) -> Result<Tree> {
        if let Some(error) = self.errors.first() {
            return Err(SpliceError::build_error(error.clone()));
        }
        if !self.stack.is_empty() {
            return Err(SpliceError::build_error(format!(
                "{} node(s) left open",
                self.stack.len()
            )));
        }
        let Some(root) = self.root else {
            return Err(SpliceError::build_error("no root node"));
        };

        let mut visible = std::mem::take(&mut self.visible);
        visible.sort_by_key(|(start, _)| *start);

        let mut order = Vec::with_capacity(visible.len() * 2);
        let mut position = 0;
        for (start, id) in visible {
            for range in hidden_ranges(&self.source, position, start) {
                order.push(self.tokens.create(&self.source[range]));
            }
            position = start + self.tokens.get(id).text().len();
            order.push(id);
        }
        for range in hidden_ranges(&self.source, position, self.source.len()) {
            order.push(self.tokens.create(&self.source[range]));
        }
        self.tokens.insert(0, order);

        debug!(
            tokens = self.tokens.len(),
            containers = self.containers.len(),
            comments = self.comments.len(),
            "built tree"
        );
        let mut tree = Tree::from_parts(
            self.grammar,
            self.tokens,
            self.containers,
            root,
            self.comments,
        );
        tree.update_comments();
        tree.set_syntax_error(self.syntax_error);
        Ok(tree)
    }
}

impl Tree {
    /// A single-container fragment whose non-whitespace tokens are the
    /// container's children
    pub fn from_source(grammar: Arc<Grammar>, kind: SyntaxKind, source: &str) -> Tree {
        let mut tokens = TokenStream::new();
        let root = ContainerId::new(0);
        let mut container = Container::new(kind);

        let ids: Vec<TokenId> = hidden_ranges(source, 0, source.len())
            .into_iter()
            .map(|range| tokens.create(&source[range]))
            .collect();
        for id in &ids {
            if !tokens.get(*id).is_whitespace() {
                tokens.get_mut(*id).parent = Some(root);
                container.children.push(NodeId::Token(*id));
            }
        }
        tokens.insert(0, ids);

        let comments = if kind == SyntaxKind::Comment {
            vec![root]
        } else {
            Vec::new()
        };
        Tree::from_parts(grammar, tokens, vec![container], root, comments)
    }
}

/// Lengths of the opening and closing delimiters of a comment
fn comment_delimiters(text: &str) -> (usize, usize) {
    for (open, close) in ENCLOSED_COMMENTS {
        if text.starts_with(open) && text.len() >= open.len() + close.len() && text.ends_with(close)
        {
            return (open.len(), close.len());
        }
    }
    LINE_COMMENT_PREFIXES
        .iter()
        .find(|prefix| text.starts_with(*prefix))
        .map_or((0, 0), |prefix| (prefix.len(), 0))
}

/// The non-whitespace span of every line in a range
pub(crate) fn non_whitespace_lines(source: &str, range: Range<usize>) -> Vec<Range<usize>> {
    let mut result = Vec::new();
    let mut line_start = range.start;
    for line in source[range.clone()].split('\n') {
        let trimmed_start = line.len() - line.trim_start().len();
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            let start = line_start + trimmed_start;
            result.push(start..start + trimmed.len());
        }
        line_start += line.len() + 1;
    }
    result
}

/// Split a gap between visible tokens into hidden token ranges
pub(crate) fn hidden_ranges(source: &str, mut start: usize, stop: usize) -> Vec<Range<usize>> {
    let bytes = source.as_bytes();
    let mut ranges = Vec::new();
    while start < stop {
        if bytes[start] == b'\n' {
            ranges.push(start..start + 1);
            start += 1;
            continue;
        }

        let line_end = source[start..stop].find('\n').map_or(stop, |index| start + index);
        let at_line_start = start == 0 || bytes[start - 1] == b'\n';
        if at_line_start {
            let line = &source[start..line_end];
            let content = start + (line.len() - line.trim_start().len());
            if content > start {
                ranges.push(start..content);
            }
            if content < line_end {
                ranges.push(content..line_end);
            }
        } else {
            ranges.push(start..line_end);
        }
        start = line_end;
    }
    ranges
}
