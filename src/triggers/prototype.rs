//! Trigger prototypes.
//!
//! A prototype is the boot-time definition of a trigger: what it attaches
//! to, which events wake it, its numeric and text arguments, and its
//! compiled body. Prototypes never change after boot; attached instances
//! share them through an `Arc`.

use serde::{Deserialize, Serialize};

use crate::core::Vnum;
use crate::script::Script;

use super::types::{mtrig, otrig, AttachKind, TriggerFlags};

/// A trigger definition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerPrototype {
    pub vnum: Vnum,

    /// Human-readable name (for logs and `stat`).
    pub name: String,

    pub attach: AttachKind,

    /// Event bits, interpreted per [`AttachKind`].
    pub flags: TriggerFlags,

    /// Numeric argument: a percent chance, a threshold, a time of day or
    /// a match mode depending on the event.
    pub narg: i32,

    /// Text argument: keywords, a phrase, or a command name.
    pub arg: String,

    pub script: Script,
}

impl TriggerPrototype {
    /// Create a prototype with no events and an empty body.
    pub fn new(vnum: Vnum, name: impl Into<String>, attach: AttachKind) -> Self {
        Self {
            vnum,
            name: name.into(),
            attach,
            flags: TriggerFlags::EMPTY,
            narg: 0,
            arg: String::new(),
            script: Script::default(),
        }
    }

    /// Set the event bits (builder pattern).
    #[must_use]
    pub fn with_flags(mut self, flags: TriggerFlags) -> Self {
        self.flags = flags;
        self
    }

    #[must_use]
    pub fn with_narg(mut self, narg: i32) -> Self {
        self.narg = narg;
        self
    }

    #[must_use]
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.arg = arg.into();
        self
    }

    /// Compile and set the body (builder pattern).
    #[must_use]
    pub fn with_commands(mut self, body: &str) -> Self {
        self.script = Script::compile(body);
        self
    }

    /// Death triggers run even when the owner is asleep or casting.
    #[must_use]
    pub fn is_death_trigger(&self) -> bool {
        match self.attach {
            AttachKind::Mobile => self.flags.intersects(mtrig::DEATH),
            AttachKind::Object => self.flags.intersects(otrig::DEATH),
            AttachKind::Room => false,
        }
    }
}
