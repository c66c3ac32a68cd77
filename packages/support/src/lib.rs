//! Stack-trace source map retrieval hook
//!
//! The stack-trace rewriting engine asks for a source map by module
//! identifier when it rewrites a frame. This crate owns the registration
//! side of that contract: a [`SourceMapRegistry`] holds the user-supplied
//! lookup, and the engine calls [`SourceMapRegistry::retrieve_source_map`]
//! on demand. A process-wide registry is provided for the common case of a
//! single runner per process; tests and embedders composing several
//! subsystems can own private registries instead.

use once_cell::sync::Lazy;
use std::sync::RwLock;
use tracing::debug;
use vitenode_sourcemap::SourceMap;

/// User-supplied map lookup, keyed by module source identifier.
pub type SourceMapLookup = Box<dyn Fn(&str) -> Option<SourceMap> + Send + Sync>;

/// A retrieval result handed to the stack-trace engine.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSourceMap {
    pub url: String,
    pub map: SourceMap,
}

/// Holds the installed source map lookup. Last registration wins; there is
/// no stacking or chaining of hooks.
#[derive(Default)]
pub struct SourceMapRegistry {
    retrieve: Option<SourceMapLookup>,
}

impl SourceMapRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `lookup`, dropping any previously installed hook.
    pub fn install<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<SourceMap> + Send + Sync + 'static,
    {
        if self.retrieve.is_some() {
            debug!("Replacing installed source map lookup");
        }
        self.retrieve = Some(Box::new(lookup));
    }

    /// Whether a lookup is currently installed.
    pub fn is_installed(&self) -> bool {
        self.retrieve.is_some()
    }

    /// Retrieve the map for `source` through the installed lookup.
    ///
    /// `None` when no lookup is installed or the lookup has no map for this
    /// source; neither case is an error.
    pub fn retrieve_source_map(&self, source: &str) -> Option<ResolvedSourceMap> {
        let lookup = self.retrieve.as_ref()?;
        match lookup(source) {
            Some(map) => {
                debug!(source = %source, "Retrieved source map for stack trace");
                Some(ResolvedSourceMap {
                    url: source.to_string(),
                    map,
                })
            }
            None => {
                debug!(source = %source, "No source map for source");
                None
            }
        }
    }
}

static REGISTRY: Lazy<RwLock<SourceMapRegistry>> =
    Lazy::new(|| RwLock::new(SourceMapRegistry::new()));

/// Install `lookup` into the process-wide registry.
///
/// One writer per call, last registration wins. Embedders composing
/// multiple source-map-aware subsystems must coordinate externally.
pub fn install_sourcemaps_support<F>(lookup: F)
where
    F: Fn(&str) -> Option<SourceMap> + Send + Sync + 'static,
{
    REGISTRY
        .write()
        .expect("source map registry lock poisoned")
        .install(lookup);
}

/// Retrieve a map for `source` through the process-wide registry.
pub fn retrieve_source_map(source: &str) -> Option<ResolvedSourceMap> {
    REGISTRY
        .read()
        .expect("source map registry lock poisoned")
        .retrieve_source_map(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_map(tag: &str) -> SourceMap {
        serde_json::from_value(json!({
            "version": 3,
            "sources": [tag],
            "mappings": "AAAA",
        }))
        .unwrap()
    }

    #[test]
    fn test_uninstalled_registry_retrieves_nothing() {
        let registry = SourceMapRegistry::new();
        assert!(!registry.is_installed());
        assert_eq!(registry.retrieve_source_map("/proj/src/app.js"), None);
    }

    #[test]
    fn test_retrieval_wraps_lookup_hit() {
        let mut registry = SourceMapRegistry::new();
        registry.install(|source| {
            if source == "/proj/src/app.js" {
                Some(test_map("app.js"))
            } else {
                None
            }
        });

        let resolved = registry.retrieve_source_map("/proj/src/app.js").unwrap();
        assert_eq!(resolved.url, "/proj/src/app.js");
        assert_eq!(resolved.map, test_map("app.js"));
    }

    #[test]
    fn test_lookup_miss_is_not_an_error() {
        let mut registry = SourceMapRegistry::new();
        registry.install(|_| None);

        assert!(registry.is_installed());
        assert_eq!(registry.retrieve_source_map("/proj/src/app.js"), None);
    }

    #[test]
    fn test_last_registration_wins() {
        let mut registry = SourceMapRegistry::new();
        registry.install(|_| Some(test_map("first")));
        registry.install(|_| Some(test_map("second")));

        let resolved = registry.retrieve_source_map("any").unwrap();
        assert_eq!(resolved.map, test_map("second"));
    }

    #[test]
    fn test_process_wide_install_and_retrieve() {
        install_sourcemaps_support(|source| {
            if source == "global.js" {
                Some(test_map("global.js"))
            } else {
                None
            }
        });

        let resolved = retrieve_source_map("global.js").unwrap();
        assert_eq!(resolved.url, "global.js");
        assert_eq!(retrieve_source_map("missing.js"), None);
    }
}
