//! Engine configuration types

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::SpliceError;
use crate::grammar::{Grammar, Language};
use crate::result::Result;

/// Root of `splice.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    pub cache: CacheConfig,
    pub construction: ConstructionConfig,
    pub indentation: IndentationConfig,
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.cache.max_entries == 0 {
            return Err(SpliceError::config_error("cache.maxEntries must be at least 1"));
        }
        if let Some((language, _)) = self
            .indentation
            .default_width
            .iter()
            .find(|(_, width)| **width == 0)
        {
            return Err(SpliceError::config_error(format!(
                "indentation.defaultWidth.{language} must be at least 1"
            )));
        }
        Ok(())
    }
}

/// Parsed-tree cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CacheConfig {
    /// Entries kept before the oldest is evicted
    pub max_entries: usize,
    /// Entry lifetime, counted from insertion
    pub ttl_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 1000,
            ttl_seconds: 300,
        }
    }
}

/// Tree construction
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConstructionConfig {
    /// Drop non-whitespace text no parse-tree node claimed
    pub strip_unattributed_tokens: bool,
}

/// Fallback indentation, used when a source gives no hint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IndentationConfig {
    pub default_width: BTreeMap<Language, usize>,
    pub use_tabs: Option<bool>,
}

impl IndentationConfig {
    /// The built-in grammar of a language with these overrides applied
    pub fn grammar_for(&self, language: Language) -> Arc<Grammar> {
        let grammar = language.grammar();
        let width = self.default_width.get(&language).copied();
        if width.is_none() && self.use_tabs.is_none() {
            return grammar;
        }
        let mut grammar = grammar.as_ref().clone();
        if let Some(width) = width {
            grammar = grammar.with_indent_width(width);
        }
        if let Some(use_tabs) = self.use_tabs {
            grammar = grammar.with_tabs(use_tabs);
        }
        Arc::new(grammar)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.cache.max_entries, 1000);
        assert_eq!(config.cache.ttl_seconds, 300);
        assert!(!config.construction.strip_unattributed_tokens);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_grammar_overrides() {
        let mut indentation = IndentationConfig::default();
        assert!(Arc::ptr_eq(
            &indentation.grammar_for(Language::Python),
            &Language::Python.grammar()
        ));

        indentation.default_width.insert(Language::Python, 2);
        indentation.use_tabs = Some(true);
        let grammar = indentation.grammar_for(Language::Python);
        assert_eq!(grammar.indent_width(), 2);
        assert!(grammar.uses_tabs());
        assert_eq!(Language::Python.grammar().indent_width(), 4);
    }

    #[test]
    fn test_zero_width_is_rejected() {
        let mut config = EngineConfig::default();
        config.indentation.default_width.insert(Language::JavaScript, 0);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("defaultWidth.javascript"));
    }
}
