//! Backend registry.
//!
//! Registry construction never fails and performs no I/O; backends only
//! describe how to build their setup arguments.

use std::collections::HashMap;

use crate::builder::backend::{BackendKind, BuildBackend};
use crate::builder::setuptools::LegacyBackend;
use crate::builder::skbuild::CMakeBackend;

/// Registry of build backends, keyed by path.
pub struct BackendRegistry {
    backends: HashMap<BackendKind, Box<dyn BuildBackend>>,
}

impl BackendRegistry {
    /// Create a registry with both built-in backends.
    pub fn new() -> Self {
        let mut registry = BackendRegistry {
            backends: HashMap::new(),
        };

        registry.register(Box::new(LegacyBackend::new()));
        registry.register(Box::new(CMakeBackend::new()));

        registry
    }

    /// Register a backend, replacing any with the same kind.
    pub fn register(&mut self, backend: Box<dyn BuildBackend>) {
        self.backends.insert(backend.kind(), backend);
    }

    /// Get a backend by kind.
    pub fn get(&self, kind: BackendKind) -> Option<&dyn BuildBackend> {
        self.backends.get(&kind).map(|b| b.as_ref())
    }

    /// All backends, legacy first.
    pub fn all(&self) -> Vec<&dyn BuildBackend> {
        let mut all: Vec<&dyn BuildBackend> = self.backends.values().map(|b| b.as_ref()).collect();
        all.sort_by_key(|b| b.kind() != BackendKind::Legacy);
        all
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::new()
    }
}
