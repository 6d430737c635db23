//! Configuration system for splice
//!
//! Settings come from `splice.toml` (or `.splice.toml`, `splice.json`),
//! discovered by walking up from the working directory. Every field is
//! optional; missing sections keep their defaults.
//!
//! ## Example Configuration
//!
//! ```toml
//! [cache]
//! maxEntries = 1000
//! ttlSeconds = 300
//!
//! [construction]
//! stripUnattributedTokens = false
//!
//! [indentation]
//! useTabs = false
//!
//! [indentation.defaultWidth]
//! python = 4
//! javascript = 2
//! ```

mod engine_config;
mod loader;

pub use engine_config::{CacheConfig, ConstructionConfig, EngineConfig, IndentationConfig};
pub use loader::{CONFIG_FILE_NAMES, ConfigLoader};
