//! Attached trigger instances.

use std::sync::Arc;

use crate::core::Uid;
use crate::script::{VarTable, WaitId};

use super::prototype::TriggerPrototype;

/// A live copy of a prototype attached to one owner.
///
/// The instance carries all per-run state. `depth` is zero while the
/// trigger is idle; dispatch only fires idle triggers.
#[derive(Clone, Debug)]
pub struct TriggerInstance {
    pub(crate) proto: Arc<TriggerPrototype>,
    pub(crate) owner: Uid,
    pub(crate) depth: u32,
    pub(crate) loops: u32,
    pub(crate) resume_at: Option<usize>,
    pub(crate) wait: Option<WaitId>,
    pub(crate) locals: VarTable,
}

impl TriggerInstance {
    /// Create an idle instance.
    #[must_use]
    pub fn new(proto: Arc<TriggerPrototype>, owner: Uid) -> Self {
        Self {
            proto,
            owner,
            depth: 0,
            loops: 0,
            resume_at: None,
            wait: None,
            locals: VarTable::new(),
        }
    }

    #[must_use]
    pub fn proto(&self) -> &Arc<TriggerPrototype> {
        &self.proto
    }

    #[must_use]
    pub fn owner(&self) -> Uid {
        self.owner
    }

    /// Nesting depth of the current run. Zero when idle.
    #[must_use]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.depth == 0
    }

    /// Loop iterations in the current run.
    #[must_use]
    pub fn loops(&self) -> u32 {
        self.loops
    }

    /// Line a suspended run resumes at.
    #[must_use]
    pub fn resume_at(&self) -> Option<usize> {
        self.resume_at
    }

    /// The pending wait, if suspended.
    #[must_use]
    pub fn wait(&self) -> Option<WaitId> {
        self.wait
    }

    #[must_use]
    pub fn locals(&self) -> &VarTable {
        &self.locals
    }

    /// Mutable locals, for binding event variables before a run.
    pub fn locals_mut(&mut self) -> &mut VarTable {
        &mut self.locals
    }

    /// Return to the idle state.
    pub(crate) fn reset(&mut self) {
        self.depth = 0;
        self.loops = 0;
        self.resume_at = None;
        self.wait = None;
        self.locals.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::triggers::types::AttachKind;

    #[test]
    fn test_reset() {
        let proto = Arc::new(TriggerPrototype::new(1, "t", AttachKind::Room));
        let mut inst = TriggerInstance::new(proto, Uid::room(0));
        assert!(inst.is_idle());

        inst.depth = 2;
        inst.loops = 7;
        inst.resume_at = Some(4);
        inst.wait = Some(WaitId(3));
        inst.locals_mut().set("x", "1");

        inst.reset();
        assert!(inst.is_idle());
        assert_eq!(inst.loops(), 0);
        assert_eq!(inst.resume_at(), None);
        assert_eq!(inst.wait(), None);
        assert!(inst.locals().is_empty());
    }
}
