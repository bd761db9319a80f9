//! The keyword arguments handed to a backend's `setup()` call.

use anyhow::{bail, Context, Result};
use serde::Serialize;
use serde_json::{Map, Value};

/// An ordered `setup()` keyword mapping.
///
/// Keys keep insertion order. When merging, the first writer of a key
/// wins, so metadata can never be shadowed by layout or builder arguments.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SetupConfig {
    args: Map<String, Value>,
}

impl SetupConfig {
    pub fn new() -> Self {
        SetupConfig::default()
    }

    /// Convert a serializable struct or map into setup arguments.
    pub fn from_serializable<T: Serialize>(value: &T) -> Result<Self> {
        match serde_json::to_value(value).context("failed to serialize setup arguments")? {
            Value::Object(args) => Ok(SetupConfig { args }),
            other => bail!("setup arguments must be a mapping, got {}", other),
        }
    }

    /// Set a key, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.args.insert(key.into(), value.into());
    }

    /// Set a key from any serializable value.
    pub fn insert_serialized<T: Serialize>(&mut self, key: &str, value: &T) -> Result<()> {
        let value = serde_json::to_value(value)
            .with_context(|| format!("failed to serialize `{}`", key))?;
        self.args.insert(key.to_string(), value);
        Ok(())
    }

    /// Merge parts in order; the first occurrence of each key is kept.
    pub fn merged(parts: impl IntoIterator<Item = SetupConfig>) -> Self {
        let mut merged = SetupConfig::new();
        for part in parts {
            for (key, value) in part.args {
                if merged.args.contains_key(&key) {
                    tracing::debug!("Ignoring duplicate setup argument `{}`", key);
                    continue;
                }
                merged.args.insert(key, value);
            }
        }
        merged
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.args.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.args.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.args.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }
}
