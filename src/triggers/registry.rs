//! Prototype registry.
//!
//! The registry owns every trigger prototype loaded at boot, keyed by
//! vnum. Attaching a trigger clones the `Arc`, never the prototype.

use std::path::Path;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::core::Vnum;

use super::loader::{parse_triggers, LoadError};
use super::prototype::TriggerPrototype;

/// All known trigger prototypes.
#[derive(Clone, Debug, Default)]
pub struct PrototypeRegistry {
    prototypes: FxHashMap<Vnum, Arc<TriggerPrototype>>,
}

impl PrototypeRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a prototype, replacing any with the same vnum.
    pub fn register(&mut self, proto: TriggerPrototype) -> Arc<TriggerPrototype> {
        let proto = Arc::new(proto);
        self.prototypes.insert(proto.vnum, Arc::clone(&proto));
        proto
    }

    /// Look a prototype up.
    #[must_use]
    pub fn get(&self, vnum: Vnum) -> Option<&Arc<TriggerPrototype>> {
        self.prototypes.get(&vnum)
    }

    /// Remove a prototype. Attached instances keep their copy.
    pub fn unregister(&mut self, vnum: Vnum) -> Option<Arc<TriggerPrototype>> {
        self.prototypes.remove(&vnum)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.prototypes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.prototypes.is_empty()
    }

    /// Iterate in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<TriggerPrototype>> {
        self.prototypes.values()
    }

    /// Parse trigger records from text and register them.
    ///
    /// Returns the number loaded. A vnum already in the registry is an
    /// error.
    pub fn load_str(&mut self, text: &str) -> Result<usize, LoadError> {
        let parsed = parse_triggers(text)?;
        if let Some(dup) = parsed.iter().find(|p| self.prototypes.contains_key(&p.vnum)) {
            return Err(LoadError::Duplicate(dup.vnum));
        }
        let count = parsed.len();
        for proto in parsed {
            self.register(proto);
        }
        Ok(count)
    }

    /// Load a trigger file from disk.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<usize, LoadError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.display().to_string(),
            source,
        })?;
        self.load_str(&text)
    }
}
