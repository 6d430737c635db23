//! Shared parse results
//!
//! Parsed trees are cached by (source, language) as `Arc<Tree>`. A cached
//! tree is never mutated: [`TreeFactory::parse`] hands out a deep clone for
//! editing, [`TreeFactory::parse_shared`] the shared read-only instance.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::{debug, trace};

use crate::config::{CacheConfig, EngineConfig};
use crate::convert::{Converter, ParseTree};
use crate::error::SpliceError;
use crate::grammar::{Grammar, Language};
use crate::result::Result;
use crate::syntax::Tree;

/// External parser producing generic parse trees for one language
pub trait Frontend: Send + Sync {
    fn language(&self) -> Language;

    fn parse(&self, source: &str) -> Result<ParseTree>;
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    source: String,
    language: Language,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    tree: Arc<Tree>,
    written: Instant,
    sequence: u64,
}

/// Bounded, expiring map from (source, language) to parsed trees
#[derive(Debug)]
pub struct TreeCache {
    entries: DashMap<CacheKey, CacheEntry>,
    max_entries: usize,
    ttl: Duration,
    sequence: AtomicU64,
}

impl TreeCache {
    pub fn new(max_entries: usize, ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            max_entries,
            ttl,
            sequence: AtomicU64::new(0),
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.max_entries, Duration::from_secs(config.ttl_seconds))
    }

    /// A live entry; expired entries are dropped on the way
    pub fn get(&self, source: &str, language: Language) -> Option<Arc<Tree>> {
        let key = CacheKey {
            source: source.to_string(),
            language,
        };
        let entry = self.entries.get(&key).map(|entry| entry.clone())?;
        if entry.written.elapsed() >= self.ttl {
            trace!(%language, "cache entry expired");
            self.entries.remove(&key);
            return None;
        }
        Some(entry.tree)
    }

    pub fn insert(&self, source: &str, language: Language, tree: Arc<Tree>) {
        let key = CacheKey {
            source: source.to_string(),
            language,
        };
        let entry = CacheEntry {
            tree,
            written: Instant::now(),
            sequence: self.sequence.fetch_add(1, Ordering::Relaxed),
        };
        self.entries.insert(key, entry);
        self.evict_if_needed();
    }

    /// Drop the oldest insertions until the cache fits
    fn evict_if_needed(&self) {
        while self.entries.len() > self.max_entries {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|entry| entry.value().sequence)
                .map(|entry| entry.key().clone());
            match oldest {
                Some(key) => {
                    trace!(language = %key.language, "evicting cache entry");
                    self.entries.remove(&key);
                }
                None => break,
            }
        }
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            size: self.len(),
            capacity: self.max_entries,
        }
    }
}

impl Default for TreeCache {
    fn default() -> Self {
        Self::from_config(&CacheConfig::default())
    }
}

/// Cache statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub size: usize,
    pub capacity: usize,
}

impl CacheStats {
    /// Cache utilization as a percentage
    pub fn utilization(&self) -> f64 {
        if self.capacity == 0 {
            0.0
        } else {
            (self.size as f64 / self.capacity as f64) * 100.0
        }
    }
}

/// Parses sources through registered frontends, read-through the cache
pub struct TreeFactory {
    frontends: HashMap<Language, Box<dyn Frontend>>,
    converters: HashMap<Language, Converter>,
    cache: TreeCache,
}

impl TreeFactory {
    pub fn new(config: &EngineConfig) -> Self {
        let converters = Language::ALL
            .iter()
            .map(|language| {
                let converter = Converter::new(config.indentation.grammar_for(*language))
                    .strip_unattributed_tokens(config.construction.strip_unattributed_tokens);
                (*language, converter)
            })
            .collect();
        Self {
            frontends: HashMap::new(),
            converters,
            cache: TreeCache::from_config(&config.cache),
        }
    }

    pub fn register(&mut self, frontend: Box<dyn Frontend>) -> &mut Self {
        debug!(language = %frontend.language(), "registering frontend");
        self.frontends.insert(frontend.language(), frontend);
        self
    }

    pub fn cache(&self) -> &TreeCache {
        &self.cache
    }

    /// The grammar trees of a language are built with
    pub fn grammar(&self, language: Language) -> Arc<Grammar> {
        self.converters
            .get(&language)
            .map_or_else(|| language.grammar(), |converter| converter.grammar().clone())
    }

    /// The cached, read-only tree of a source
    pub fn parse_shared(&self, source: &str, language: Language) -> Result<Arc<Tree>> {
        if let Some(tree) = self.cache.get(source, language) {
            debug!(%language, "tree cache hit");
            return Ok(tree);
        }
        debug!(%language, bytes = source.len(), "tree cache miss");

        let frontend = self
            .frontends
            .get(&language)
            .ok_or_else(|| SpliceError::MissingFrontend {
                language: language.to_string(),
            })?;
        let parse_tree = frontend.parse(source)?;
        let tree = match self.converters.get(&language) {
            Some(converter) => converter.convert(source, &parse_tree)?,
            None => Converter::new(language.grammar()).convert(source, &parse_tree)?,
        };
        let tree = Arc::new(tree);
        self.cache.insert(source, language, tree.clone());
        Ok(tree)
    }

    /// An editable deep copy of the cached tree
    pub fn parse(&self, source: &str, language: Language) -> Result<Tree> {
        self.parse_shared(source, language)
            .map(|shared| shared.as_ref().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::SyntaxKind;
    use std::sync::atomic::AtomicUsize;

    struct Identifiers {
        calls: Arc<AtomicUsize>,
    }

    impl Frontend for Identifiers {
        fn language(&self) -> Language {
            Language::Python
        }

        fn parse(&self, source: &str) -> Result<ParseTree> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let stop = source.trim_end().len();
            Ok(ParseTree::node(
                "module",
                0,
                source.len(),
                vec![ParseTree::leaf("identifier", 0, stop)],
            ))
        }
    }

    fn factory(calls: &Arc<AtomicUsize>) -> TreeFactory {
        let mut factory = TreeFactory::new(&EngineConfig::default());
        factory.register(Box::new(Identifiers {
            calls: calls.clone(),
        }));
        factory
    }

    #[test]
    fn test_parse_shared_hits_the_cache() {
        let calls = Arc::new(AtomicUsize::new(0));
        let factory = factory(&calls);

        let first = factory.parse_shared("x\n", Language::Python).unwrap();
        let second = factory.parse_shared("x\n", Language::Python).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(factory.cache().len(), 1);
    }

    #[test]
    fn test_parse_returns_an_independent_clone() {
        let calls = Arc::new(AtomicUsize::new(0));
        let factory = factory(&calls);

        let mut owned = factory.parse("x\n", Language::Python).unwrap();
        let identifier = owned.find(SyntaxKind::Identifier).unwrap();
        let fragment = Tree::from_source(owned.grammar().clone(), SyntaxKind::Identifier, "y");
        owned.replace(identifier, fragment).unwrap();
        assert_eq!(owned.text(), "y\n");

        let shared = factory.parse_shared("x\n", Language::Python).unwrap();
        assert_eq!(shared.text(), "x\n");
    }

    #[test]
    fn test_missing_frontend() {
        let calls = Arc::new(AtomicUsize::new(0));
        let factory = factory(&calls);
        let result = factory.parse_shared("f()\n", Language::JavaScript);
        assert!(matches!(result, Err(SpliceError::MissingFrontend { .. })));
    }

    #[test]
    fn test_oldest_insertion_is_evicted() {
        let cache = TreeCache::new(2, Duration::from_secs(60));
        let grammar = Language::Python.grammar();
        for source in ["a", "b", "c"] {
            let tree = Tree::from_source(grammar.clone(), SyntaxKind::Program, source);
            cache.insert(source, Language::Python, Arc::new(tree));
        }
        assert_eq!(cache.len(), 2);
        assert!(cache.get("a", Language::Python).is_none());
        assert!(cache.get("c", Language::Python).is_some());
        assert_eq!(cache.stats().utilization(), 100.0);
    }

    #[test]
    fn test_expired_entries_are_dropped() {
        let cache = TreeCache::new(10, Duration::ZERO);
        let tree = Tree::from_source(Language::Python.grammar(), SyntaxKind::Program, "a");
        cache.insert("a", Language::Python, Arc::new(tree));
        assert!(cache.get("a", Language::Python).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_languages_are_separate_keys() {
        let cache = TreeCache::default();
        let tree = Arc::new(Tree::from_source(
            Language::Python.grammar(),
            SyntaxKind::Program,
            "a",
        ));
        cache.insert("a", Language::Python, tree);
        assert!(cache.get("a", Language::JavaScript).is_none());
    }
}
