use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;

/// Encoded source map attached to a transformed module.
///
/// The map is treated as an opaque structured value: only the `sources`
/// list is ever rewritten, and every other field (`version`, `mappings`,
/// `names`, `sourcesContent`, ...) round-trips through the flattened
/// `extra` map untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SourceMap {
    /// Ordered source file paths. Entries may be empty or null, and the
    /// whole list may be absent; both round-trip unchanged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<Option<String>>>,

    /// Every other source map field, passed through unchanged.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl SourceMap {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Output of the upstream transform pipeline: module code plus the source
/// map describing it, if the transform produced one.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformedModule {
    pub code: String,
    pub map: Option<SourceMap>,
}

impl TransformedModule {
    pub fn new(code: impl Into<String>, map: Option<SourceMap>) -> Self {
        Self {
            code: code.into(),
            map,
        }
    }
}

/// Filesystem context for inlining a module's source map.
#[derive(Debug, Clone)]
pub struct InlineOptions {
    /// Project root path of the module being processed
    pub root: PathBuf,
    /// Absolute path of the module's file
    pub filepath: PathBuf,
}

impl InlineOptions {
    pub fn new(root: impl Into<PathBuf>, filepath: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            filepath: filepath.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unknown_fields_round_trip() {
        let json = json!({
            "version": 3,
            "sources": ["main.js", null, ""],
            "mappings": "AAAA;AACA",
            "names": ["foo"],
        });

        let map: SourceMap = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(
            map.sources,
            Some(vec![
                Some("main.js".to_string()),
                None,
                Some(String::new())
            ])
        );
        assert_eq!(map.extra.get("version"), Some(&json!(3)));
        assert_eq!(map.extra.get("mappings"), Some(&json!("AAAA;AACA")));

        let back = serde_json::to_value(&map).unwrap();
        assert_eq!(back, json);
    }

    #[test]
    fn test_absent_sources_stays_absent() {
        let map: SourceMap = serde_json::from_value(json!({ "version": 3 })).unwrap();
        assert_eq!(map.sources, None);

        let back = serde_json::to_value(&map).unwrap();
        assert_eq!(back, json!({ "version": 3 }));
    }
}
