//! Per-entity script containers.

use im::Vector;

use crate::core::Handle;
use crate::script::VarTable;

use super::types::{AttachKind, TriggerFlags};

/// Everything scripted about one entity: its attached triggers in firing
/// order, its global variables and the union of its triggers' event bits.
///
/// The trigger list is a persistent vector so dispatch can snapshot it in
/// O(1) before running scripts that may attach or detach.
#[derive(Clone, Debug)]
pub struct ScriptContainer {
    pub(crate) kind: AttachKind,
    pub(crate) triggers: Vector<Handle>,
    pub(crate) types: TriggerFlags,
    pub(crate) globals: VarTable,
}

impl ScriptContainer {
    /// Create an empty container for an entity of `kind`.
    #[must_use]
    pub fn new(kind: AttachKind) -> Self {
        Self {
            kind,
            triggers: Vector::new(),
            types: TriggerFlags::EMPTY,
            globals: VarTable::new(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> AttachKind {
        self.kind
    }

    /// Attached triggers in firing order.
    #[must_use]
    pub fn triggers(&self) -> &Vector<Handle> {
        &self.triggers
    }

    /// Union of the attached triggers' event bits.
    #[must_use]
    pub fn types(&self) -> TriggerFlags {
        self.types
    }

    #[must_use]
    pub fn has_type(&self, bits: TriggerFlags) -> bool {
        self.types.intersects(bits)
    }

    #[must_use]
    pub fn globals(&self) -> &VarTable {
        &self.globals
    }

    pub fn globals_mut(&mut self) -> &mut VarTable {
        &mut self.globals
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty()
    }

    /// Insert at `position`, clamped to the list; `None` appends.
    pub(crate) fn insert(&mut self, handle: Handle, position: Option<usize>) {
        let at = position.map_or(self.triggers.len(), |p| p.min(self.triggers.len()));
        self.triggers.insert(at, handle);
    }

    pub(crate) fn remove(&mut self, handle: Handle) -> bool {
        match self.triggers.index_of(&handle) {
            Some(at) => {
                self.triggers.remove(at);
                true
            }
            None => false,
        }
    }
}
