//! Parse-tree conversion
//!
//! An external parser hands over a generic [`ParseTree`]: node type name,
//! optional field name, byte offsets and children. The [`Converter`] maps it
//! onto a [`Tree`] through the grammar:
//!
//! - types the grammar knows (by alias or kind name) become containers
//! - unknown types with children are inlined into their parent
//! - leaves become visible tokens, whitespace-only leaves are dropped
//! - a known leaf becomes a container with one token per non-blank line
//! - comment types become comment nodes
//! - the first `ERROR` node sets the tree's syntax error and is skipped
//!
//! Nodes of a list's or optional's inner kinds are wrapped in the element
//! kind, so a `function_definition` directly under a statement list ends up
//! as `statement > function`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::SpliceError;
use crate::grammar::{Grammar, Shape};
use crate::result::Result;
use crate::syntax::{SyntaxKind, Tree, TreeBuilder, non_whitespace_lines};

const ERROR_TYPE: &str = "ERROR";

/// A node of an external parser's tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseTree {
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub start: usize,
    pub stop: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ParseTree>,
}

impl ParseTree {
    pub fn leaf(node_type: impl Into<String>, start: usize, stop: usize) -> Self {
        Self {
            node_type: node_type.into(),
            field: None,
            start,
            stop,
            children: Vec::new(),
        }
    }

    pub fn node(
        node_type: impl Into<String>,
        start: usize,
        stop: usize,
        children: Vec<ParseTree>,
    ) -> Self {
        Self {
            children,
            ..Self::leaf(node_type, start, stop)
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| SpliceError::conversion_error(format!("invalid parse tree: {e}")))
    }

    fn validate(&self, source: &str) -> Result<()> {
        if self.start > self.stop
            || self.stop > source.len()
            || !source.is_char_boundary(self.start)
            || !source.is_char_boundary(self.stop)
        {
            return Err(SpliceError::conversion_error(format!(
                "{} node spans {}..{}, which is not a character range of a {}-byte source",
                self.node_type,
                self.start,
                self.stop,
                source.len()
            )));
        }
        self.children.iter().try_for_each(|child| child.validate(source))
    }
}

/// Turns parse trees into splice trees for one grammar
#[derive(Debug, Clone)]
pub struct Converter {
    grammar: Arc<Grammar>,
    strip_unattributed: bool,
}

impl Converter {
    pub fn new(grammar: Arc<Grammar>) -> Self {
        Self {
            grammar,
            strip_unattributed: false,
        }
    }

    /// Drop the text of skipped nodes (e.g. `ERROR`) from the stream
    pub fn strip_unattributed_tokens(mut self, strip: bool) -> Self {
        self.strip_unattributed = strip;
        self
    }

    pub fn grammar(&self) -> &Arc<Grammar> {
        &self.grammar
    }

    pub fn convert(&self, source: &str, parse_tree: &ParseTree) -> Result<Tree> {
        parse_tree.validate(source)?;
        let mut builder = TreeBuilder::new(self.grammar.clone(), source);

        let root = self
            .grammar
            .kind_for(&parse_tree.node_type)
            .unwrap_or(SyntaxKind::Program);
        builder.start_node(root);
        for child in &parse_tree.children {
            self.visit(&mut builder, source, child, root);
        }
        builder.finish_node();

        let mut tree = builder.finish()?;
        if self.strip_unattributed {
            tree.remove_hidden_tokens();
        }
        debug!(
            language = %self.grammar.language(),
            tokens = tree.tokens().len(),
            syntax_error = tree.syntax_error().is_some(),
            "converted parse tree"
        );
        Ok(tree)
    }

    fn visit(&self, builder: &mut TreeBuilder, source: &str, node: &ParseTree, parent: SyntaxKind) {
        let range = node.start..node.stop;
        if node.node_type == ERROR_TYPE {
            trace!(offset = node.start, "syntax error");
            builder.syntax_error_at(node.start);
            return;
        }
        if self.grammar.is_comment_type(&node.node_type) {
            builder.comment_at(range);
            return;
        }

        let text = &source[range.clone()];
        // Anonymous leaves are named after their text, like `import` or `(`
        let anonymous = node.children.is_empty() && text == node.node_type;
        let kind = (!anonymous)
            .then(|| self.grammar.kind_for(&node.node_type))
            .flatten();

        match kind {
            Some(kind) => {
                let wrapper = self.wrapper(parent, kind);
                if let Some(wrapper) = wrapper {
                    builder.start_node(wrapper);
                }
                if node.children.is_empty() {
                    builder.text_node_at(kind, range);
                } else {
                    builder.start_node(kind);
                    for child in &node.children {
                        self.visit(builder, source, child, kind);
                    }
                    builder.finish_node();
                }
                if wrapper.is_some() {
                    builder.finish_node();
                }
            }
            None if !node.children.is_empty() => {
                for child in &node.children {
                    self.visit(builder, source, child, parent);
                }
            }
            None => {
                for line in non_whitespace_lines(source, range) {
                    builder.token_at(line);
                }
            }
        }
    }

    /// Element kind to wrap `kind` in when it is only an inner kind of the
    /// parent
    fn wrapper(&self, parent: SyntaxKind, kind: SyntaxKind) -> Option<SyntaxKind> {
        let (element, inner) = match self.grammar.shape(parent) {
            Shape::List(policy) => (policy.element, &policy.inner),
            Shape::Optional(policy) => (policy.element, &policy.inner),
            _ => return None,
        };
        (kind != element && inner.contains(&kind)).then_some(element)
    }
}
