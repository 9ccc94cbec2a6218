//! Shared per-run data map
//!
//! One `SourceData` is built per pipeline run: source name -> fetched value,
//! with processor outputs merged in under their output keys. Detectors and
//! escalation tools read it; nothing mutates it after the processor stage.

use serde_json::Value;
use std::collections::HashMap;

/// Name-keyed map of source values for one pipeline run
#[derive(Debug, Clone, Default)]
pub struct SourceData {
    values: HashMap<String, Value>,
}

impl SourceData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value under a source name or processor output key
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    /// Look up a value by name; absent names are "no data", never an error
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// A view restricted to the given names, for handing a processor exactly
    /// the inputs it declared. Names without a value are simply absent.
    pub fn restricted_to(&self, names: &[String]) -> SourceData {
        let values = names
            .iter()
            .filter_map(|n| self.values.get(n).map(|v| (n.clone(), v.clone())))
            .collect();
        Self { values }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn restricted_view_drops_undeclared_names() {
        let mut data = SourceData::new();
        data.insert("a", json!(1));
        data.insert("b", json!(2));

        let view = data.restricted_to(&["a".to_string(), "missing".to_string()]);
        assert!(view.contains("a"));
        assert!(!view.contains("b"));
        assert!(!view.contains("missing"));
        assert_eq!(view.len(), 1);

        let empty = data.restricted_to(&[]);
        assert!(empty.is_empty());
    }
}
