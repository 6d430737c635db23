//! Splice Core
//!
//! Format-preserving, mutable concrete syntax trees for structural source
//! edits. A [`Tree`] keeps every character of its source, whitespace and
//! comments included, and structural edits (insert a statement at a line,
//! remove an argument, set a base class) keep the rest of the file exactly
//! as it was while producing conventionally formatted new code.
//!
//! ```rust,ignore
//! use splice_core::{Converter, ParseTree, SyntaxKind, Tree, python};
//!
//! let tree = Converter::new(python()).convert(source, &ParseTree::from_json(json)?)?;
//! let body = tree.find(SyntaxKind::StatementList).unwrap();
//! let line = tree.available_lines(body)?[0];
//! let call = Tree::from_source(python(), SyntaxKind::Call, "print(1)");
//! tree.list_mut(body)?.add_at_line(line, call)?;
//! ```

pub mod cache;
pub mod config;
pub mod containers;
pub mod convert;
pub mod error;
pub mod grammar;
pub mod indent;
pub mod result;
pub mod syntax;

pub use cache::{CacheStats, Frontend, TreeCache, TreeFactory};
pub use config::{
    CacheConfig, ConfigLoader, ConstructionConfig, EngineConfig, IndentationConfig,
};
pub use containers::{ListMut, OptionalMut};
pub use convert::{Converter, ParseTree};
pub use error::{ErrorKind, SpliceError};
pub use grammar::{
    ChildSpacing, Grammar, Language, ListPolicy, OptionalPolicy, Placement, Scope, Shape,
    TuplePolicy, javascript, python,
};
pub use result::{Result, ResultExt};
pub use syntax::{
    ContainerId, DebugNode, NodeId, SyntaxError, SyntaxKind, TokenId, TokenStream, Tree,
    TreeBuilder,
};

/// Initialize the tracing subscriber for logging
pub fn init_tracing() {
    init_tracing_with("splice=info");
}

/// Initialize tracing with a fallback directive used when `RUST_LOG` is unset
pub fn init_tracing_with(default_directive: &str) {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true),
        )
        .try_init();
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
