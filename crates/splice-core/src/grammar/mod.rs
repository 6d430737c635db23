//! Per-language container policies
//!
//! Every grammar construct is a [`SyntaxKind`]; a [`Grammar`] decides which
//! kinds behave as lists, optionals, tuples or indentation aligners and with
//! which parameters. The edit operations in [`crate::containers`] read these
//! policies instead of dispatching on per-construct types.
//!
//! # Architecture
//!
//! ```text
//! SyntaxKind ──► Grammar::shape(kind) ──► Shape
//!                                          ├─ Plain(ChildSpacing)
//!                                          ├─ List(ListPolicy)
//!                                          ├─ Optional(OptionalPolicy)
//!                                          ├─ Tuple(TuplePolicy)
//!                                          ├─ IndentAligner
//!                                          └─ Comment
//! ```

mod javascript;
mod python;

pub use javascript::javascript;
pub use python::python;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::syntax::SyntaxKind;

/// Languages with a built-in grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    JavaScript,
}

impl Language {
    pub const ALL: &'static [Language] = &[Language::Python, Language::JavaScript];

    pub const fn name(self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::JavaScript => "javascript",
        }
    }

    /// The built-in grammar for this language
    pub fn grammar(self) -> Arc<Grammar> {
        match self {
            Language::Python => python(),
            Language::JavaScript => javascript(),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "python" | "py" => Ok(Language::Python),
            "javascript" | "js" => Ok(Language::JavaScript),
            other => Err(format!("unsupported language '{other}'")),
        }
    }
}

/// Where a policy applies, relative to the indentation of the container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Always,
    Never,
    /// Only when the container sits at indentation `""`
    TopLevel,
    /// Only when the container is indented
    Nested,
}

impl Scope {
    pub fn applies(self, top_level: bool) -> bool {
        match self {
            Scope::Always => true,
            Scope::Never => false,
            Scope::TopLevel => top_level,
            Scope::Nested => !top_level,
        }
    }
}

/// Synthetic element materialized in an empty list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    pub text: &'static str,
    pub scope: Scope,
}

/// Minimum blank lines around elements whose inner kind matches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlankLineRule {
    pub kind: SyntaxKind,
    pub lines: usize,
    pub scope: Scope,
}

/// Parameters of a list container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListPolicy {
    pub element: SyntaxKind,
    /// Kinds auto-wrapped into `element` on insertion
    pub inner: Vec<SyntaxKind>,
    pub delimiter: &'static str,
    pub multiline: bool,
    pub bounded_above: Scope,
    pub bounded_below: Scope,
    pub placeholder: Option<Placeholder>,
    /// Blank-line rules; `Some` makes the list line-padded
    pub padding: Option<Vec<BlankLineRule>>,
    /// Dangling clauses such as `else if`/`catch`, never bounded below
    pub trailing_clauses: bool,
    /// Leading elements kept by `clear()`, e.g. `self`
    pub retained_first: Vec<&'static str>,
}

impl ListPolicy {
    /// A delimited, single-line list such as an argument list
    pub fn delimited(element: SyntaxKind, delimiter: &'static str) -> Self {
        Self {
            element,
            inner: Vec::new(),
            delimiter,
            multiline: false,
            bounded_above: Scope::Always,
            bounded_below: Scope::Always,
            placeholder: None,
            padding: None,
            trailing_clauses: false,
            retained_first: Vec::new(),
        }
    }

    /// A line-oriented list of statements or declarations
    pub fn lines(element: SyntaxKind) -> Self {
        Self {
            multiline: true,
            padding: Some(Vec::new()),
            ..Self::delimited(element, "")
        }
    }

    /// Chained clauses hanging off the previous block
    pub fn trailing(element: SyntaxKind, multiline: bool) -> Self {
        Self {
            multiline,
            bounded_below: Scope::Never,
            trailing_clauses: true,
            ..Self::delimited(element, "")
        }
    }

    pub fn inner(mut self, kinds: &[SyntaxKind]) -> Self {
        self.inner = kinds.to_vec();
        self
    }

    pub fn bounded(mut self, above: Scope, below: Scope) -> Self {
        self.bounded_above = above;
        self.bounded_below = below;
        self
    }

    pub fn placeholder(mut self, text: &'static str, scope: Scope) -> Self {
        self.placeholder = Some(Placeholder { text, scope });
        self
    }

    pub fn blank_lines(mut self, kind: SyntaxKind, lines: usize, scope: Scope) -> Self {
        self.padding
            .get_or_insert_with(Vec::new)
            .push(BlankLineRule { kind, lines, scope });
        self
    }

    pub fn multiline(mut self, multiline: bool) -> Self {
        self.multiline = multiline;
        self
    }

    pub fn retain_first(mut self, texts: &[&'static str]) -> Self {
        self.retained_first = texts.to_vec();
        self
    }

    pub fn accepts(&self, kind: SyntaxKind) -> bool {
        kind == self.element || self.inner.contains(&kind)
    }

    pub fn is_padded(&self) -> bool {
        self.padding.is_some()
    }
}

/// Where an optional splices its content when it becomes present
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Through the parent's becoming-visible protocol
    Spaced,
    /// Directly after the previous visible token, no separator
    Adjacent,
    /// On a new line after the anchoring construct
    Multiline,
    /// On the anchoring construct's last line, after one space
    TrailingInline,
}

/// Parameters of an optional container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionalPolicy {
    pub element: SyntaxKind,
    pub inner: Vec<SyntaxKind>,
    pub prefix: &'static str,
    pub postfix: &'static str,
    pub placement: Placement,
}

impl OptionalPolicy {
    pub fn new(element: SyntaxKind) -> Self {
        Self {
            element,
            inner: Vec::new(),
            prefix: "",
            postfix: "",
            placement: Placement::Spaced,
        }
    }

    pub fn prefix(mut self, prefix: &'static str) -> Self {
        self.prefix = prefix;
        self
    }

    pub fn enclosed(mut self, prefix: &'static str, postfix: &'static str) -> Self {
        self.prefix = prefix;
        self.postfix = postfix;
        self
    }

    pub fn inner(mut self, kinds: &[SyntaxKind]) -> Self {
        self.inner = kinds.to_vec();
        self
    }

    pub fn placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    pub fn accepts(&self, kind: SyntaxKind) -> bool {
        kind == self.element || self.inner.contains(&kind)
    }

    pub fn is_multiline(&self) -> bool {
        matches!(
            self.placement,
            Placement::Multiline | Placement::TrailingInline
        )
    }
}

/// Parameters of a fixed-arity tuple of optional slots
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TuplePolicy {
    pub delimiter: &'static str,
}

/// How a plain container separates a child that becomes visible
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChildSpacing {
    /// One space on the left, else on the right
    #[default]
    Space,
    /// Splice the child without any separator
    None,
}

/// The behavior of a kind inside one grammar
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    Plain(ChildSpacing),
    List(ListPolicy),
    Optional(OptionalPolicy),
    Tuple(TuplePolicy),
    /// Block body whose indentation nested content aligns to
    IndentAligner,
    Comment,
}

const PLAIN: Shape = Shape::Plain(ChildSpacing::Space);
const COMMENT: Shape = Shape::Comment;

/// Container policies and parse-tree mapping for one language
#[derive(Debug, Clone)]
pub struct Grammar {
    language: Language,
    indent_width: usize,
    use_tabs: bool,
    shapes: HashMap<SyntaxKind, Shape>,
    aliases: HashMap<&'static str, SyntaxKind>,
    comment_types: Vec<&'static str>,
}

impl Grammar {
    pub fn new(language: Language, indent_width: usize) -> Self {
        Self {
            language,
            indent_width,
            use_tabs: false,
            shapes: HashMap::new(),
            aliases: HashMap::new(),
            comment_types: vec!["comment"],
        }
    }

    pub fn with(mut self, kind: SyntaxKind, shape: Shape) -> Self {
        self.shapes.insert(kind, shape);
        self
    }

    pub fn list(self, kind: SyntaxKind, policy: ListPolicy) -> Self {
        self.with(kind, Shape::List(policy))
    }

    pub fn optional(self, kind: SyntaxKind, policy: OptionalPolicy) -> Self {
        self.with(kind, Shape::Optional(policy))
    }

    /// Map a parse-tree node type onto a kind
    pub fn alias(mut self, type_name: &'static str, kind: SyntaxKind) -> Self {
        self.aliases.insert(type_name, kind);
        self
    }

    pub fn comment_type(mut self, type_name: &'static str) -> Self {
        if !self.comment_types.contains(&type_name) {
            self.comment_types.push(type_name);
        }
        self
    }

    /// Override the default indentation width
    pub fn with_indent_width(mut self, width: usize) -> Self {
        self.indent_width = width;
        self
    }

    /// Indent with tabs when the source gives no hint
    pub fn with_tabs(mut self, use_tabs: bool) -> Self {
        self.use_tabs = use_tabs;
        self
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Width of one default indentation unit, in spaces
    pub fn indent_width(&self) -> usize {
        self.indent_width
    }

    pub fn uses_tabs(&self) -> bool {
        self.use_tabs
    }

    pub fn shape(&self, kind: SyntaxKind) -> &Shape {
        if kind == SyntaxKind::Comment {
            return &COMMENT;
        }
        self.shapes.get(&kind).unwrap_or(&PLAIN)
    }

    pub fn list_policy(&self, kind: SyntaxKind) -> Option<&ListPolicy> {
        match self.shape(kind) {
            Shape::List(policy) => Some(policy),
            _ => None,
        }
    }

    pub fn optional_policy(&self, kind: SyntaxKind) -> Option<&OptionalPolicy> {
        match self.shape(kind) {
            Shape::Optional(policy) => Some(policy),
            _ => None,
        }
    }

    pub fn tuple_policy(&self, kind: SyntaxKind) -> Option<&TuplePolicy> {
        match self.shape(kind) {
            Shape::Tuple(policy) => Some(policy),
            _ => None,
        }
    }

    pub fn is_aligner(&self, kind: SyntaxKind) -> bool {
        matches!(self.shape(kind), Shape::IndentAligner)
    }

    /// Kind for a parse-tree node type, by alias first, then by kind name
    pub fn kind_for(&self, type_name: &str) -> Option<SyntaxKind> {
        self.aliases
            .get(type_name)
            .copied()
            .or_else(|| SyntaxKind::from_name(type_name))
            .filter(|kind| !kind.is_token())
    }

    pub fn is_comment_type(&self, type_name: &str) -> bool {
        self.comment_types.contains(&type_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_kinds_are_plain() {
        let grammar = python();
        assert_eq!(grammar.shape(SyntaxKind::Identifier), &PLAIN);
        assert_eq!(grammar.shape(SyntaxKind::Comment), &Shape::Comment);
    }

    #[test]
    fn test_kind_for_prefers_aliases() {
        let grammar = python();
        assert_eq!(
            grammar.kind_for("function_definition"),
            Some(SyntaxKind::Function)
        );
        assert_eq!(grammar.kind_for("statement_list"), Some(SyntaxKind::StatementList));
        assert_eq!(grammar.kind_for("token"), None);
        assert_eq!(grammar.kind_for("binary_operator"), None);
    }

    #[test]
    fn test_scope_applies() {
        assert!(Scope::TopLevel.applies(true));
        assert!(!Scope::TopLevel.applies(false));
        assert!(Scope::Nested.applies(false));
        assert!(!Scope::Never.applies(true));
    }

    #[test]
    fn test_language_parsing() {
        assert_eq!("py".parse::<Language>(), Ok(Language::Python));
        assert_eq!("JavaScript".parse::<Language>(), Ok(Language::JavaScript));
        assert!("cobol".parse::<Language>().is_err());
    }
}
