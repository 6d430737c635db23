//! Format-preserving syntax trees
//!
//! This module holds the tree itself: the token stream, the node arena and
//! the construction step. Structural edits live in [`crate::containers`].
//!
//! # Architecture
//!
//! ```text
//! Tree
//!  ├─ TokenStream   every token, code and hidden, in source order
//!  ├─ containers    arena of composite nodes (kind, parent, children)
//!  ├─ root          ContainerId of the top node
//!  └─ comments      Comment containers, outside the ordinary hierarchy
//! ```
//!
//! Key invariants, holding after every operation:
//! - concatenating the stream reproduces the exact source
//! - a node's range lies inside its parent's range
//! - comments are never children of ordinary containers
//!
//! # Example
//!
//! ```rust,ignore
//! use splice_core::grammar::python;
//! use splice_core::syntax::{SyntaxKind, TreeBuilder};
//!
//! let mut builder = TreeBuilder::new(python(), "x = 1\n");
//! builder.node(SyntaxKind::Program, |b| {
//!     b.tokens(&["x", "=", "1"]);
//! });
//! let tree = builder.finish()?;
//! assert_eq!(tree.text(), "x = 1\n");
//! ```

mod builder;
mod debug;
mod kind;
mod node;
mod stream;
mod tree;

pub use builder::TreeBuilder;
pub use debug::DebugNode;
pub use kind::SyntaxKind;
pub use node::{ContainerId, NodeId, TokenId};
pub use stream::{Token, TokenStream, is_whitespace};
pub use tree::{SyntaxError, Tree};

pub(crate) use builder::non_whitespace_lines;
pub(crate) use tree::Graft;
