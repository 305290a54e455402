//! Trigger dispatch.
//!
//! One entry point per game event. The host game calls these at the moment
//! an event happens (a character enters a room, an object is dropped, a
//! command is typed). Each function finds the owning entities, picks the
//! trigger to fire by its type bit and its gate, binds the event variables
//! into the trigger's locals and runs it.
//!
//! ## Key Components
//!
//! - [`mobile`]: events seen by mobiles (`*_mtrigger`)
//! - [`object`]: events seen by objects (`*_otrigger`)
//! - [`room`]: events seen by rooms (`*_wtrigger`)
//! - [`matching`]: command, word and phrase matching for text args
//!
//! ## Results
//!
//! Functions that gate a game action return a `#[must_use]` `bool`: `true`
//! lets the action happen, `false` blocks it. A script blocks by ending with
//! `return 0`. Command dispatch returns `true` when a trigger consumed the
//! command, in which case the game should not interpret it further.
//!
//! ## Gates
//!
//! A trigger is considered only when its type bit is set and it is idle.
//! Most triggers then roll their numeric arg as a percent chance; time
//! triggers compare it with the hour, bribe and hit-percent triggers use it
//! as a threshold, and command, speech and act triggers match their text
//! arg. In a scan over several entities at most one trigger fires per
//! entity.

pub mod matching;
pub mod mobile;
pub mod object;
pub mod room;

pub use matching::{command_matches, is_substring, word_check};
pub use mobile::ActEvent;

use crate::core::{Handle, ScriptRng, Uid};
use crate::engine::{RunMode, ScriptEngine};
use crate::script::script_log;
use crate::triggers::{AttachKind, TriggerFlags, TriggerPrototype};
use crate::world::World;

/// Bit shared by every attach kind: random triggers.
const RANDOM_BIT: TriggerFlags = TriggerFlags::bit(1);
/// Bit shared by every attach kind: fire even in zones without players.
const GLOBAL_BIT: TriggerFlags = TriggerFlags::bit(0);
/// Bit shared by every attach kind: hourly time triggers.
const TIME_BIT: TriggerFlags = TriggerFlags::bit(19);

/// The door command behind a door trigger.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DoorAction {
    Open,
    Close,
    Unlock,
    Lock,
    Pick,
}

impl DoorAction {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            DoorAction::Open => "open",
            DoorAction::Close => "close",
            DoorAction::Unlock => "unlock",
            DoorAction::Lock => "lock",
            DoorAction::Pick => "pick",
        }
    }
}

/// How an object is being consumed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConsumeKind {
    Eat,
    Drink,
    Quaff,
}

impl ConsumeKind {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            ConsumeKind::Eat => "eat",
            ConsumeKind::Drink => "drink",
            ConsumeKind::Quaff => "quaff",
        }
    }
}

/// Event variables bound into a trigger before it runs.
pub(crate) type Bindings<'a> = &'a [(&'a str, String)];

/// The `actor` binding.
pub(crate) fn actor_var(actor: Uid) -> (&'static str, String) {
    ("actor", actor.to_string())
}

/// Characters whose actions may fire triggers.
pub(crate) fn susceptible(world: &dyn World, uid: Uid) -> bool {
    world
        .character_by_uid(uid)
        .is_some_and(|ch| ch.susceptible_to_triggers())
}

/// Mobiles that run scripts.
pub(crate) fn performs_scripts(world: &dyn World, uid: Uid) -> bool {
    world
        .character_by_uid(uid)
        .is_some_and(|ch| ch.performs_scripts())
}

/// Text-arg gate shared by speech and act triggers.
pub(crate) fn text_matches(proto: &TriggerPrototype, text: &str) -> bool {
    if proto.narg != 0 {
        word_check(text, &proto.arg)
    } else {
        is_substring(&proto.arg, text)
    }
}

/// Skip text-arg triggers without an arg.
pub(crate) fn has_text_arg(proto: &TriggerPrototype) -> bool {
    if proto.arg.trim().is_empty() {
        script_log(proto, "trigger has no text argument");
        return false;
    }
    true
}

impl ScriptEngine {
    /// The first idle trigger of `owner` with any of `bits` whose gate
    /// passes.
    pub(crate) fn find_trigger(
        &mut self,
        owner: Uid,
        bits: TriggerFlags,
        mut gate: impl FnMut(&TriggerPrototype, &mut ScriptRng) -> bool,
    ) -> Option<Handle> {
        let container = self.containers.get(&owner)?;
        if !container.has_type(bits) {
            return None;
        }
        let triggers = &self.triggers;
        let rng = &mut self.rng;
        container.triggers.iter().copied().find(|&handle| {
            triggers.get(handle).is_some_and(|inst| {
                inst.proto.flags.intersects(bits) && inst.is_idle() && gate(&*inst.proto, &mut *rng)
            })
        })
    }

    /// Bind event variables and start a fresh run.
    pub(crate) fn fire(
        &mut self,
        world: &mut dyn World,
        handle: Handle,
        bindings: Bindings<'_>,
    ) -> i32 {
        if let Some(inst) = self.triggers.get_mut(handle) {
            for (name, value) in bindings {
                inst.locals.set(*name, value.as_str());
            }
        }
        self.run_trigger(world, handle, RunMode::New)
    }

    /// Find and fire the first matching trigger. `None` if nothing fired.
    pub(crate) fn fire_first(
        &mut self,
        world: &mut dyn World,
        owner: Uid,
        bits: TriggerFlags,
        gate: impl FnMut(&TriggerPrototype, &mut ScriptRng) -> bool,
        bindings: Bindings<'_>,
    ) -> Option<i32> {
        let handle = self.find_trigger(owner, bits, gate)?;
        Some(self.fire(world, handle, bindings))
    }

    /// Scan every entity with random triggers. Called by the pulse loop.
    pub(crate) fn check_random_triggers(&mut self, world: &mut dyn World) {
        for (owner, kind, global) in self.owners_with(RANDOM_BIT) {
            let active = global || self.zone_active(&*world, owner, kind);
            match kind {
                AttachKind::Mobile if active => self.random_mtrigger(world, owner),
                AttachKind::Object => self.random_otrigger(world, owner),
                AttachKind::Room if active => self.random_wtrigger(world, owner),
                _ => {}
            }
        }
    }

    /// Scan every entity with time triggers. Called when the hour changes.
    pub(crate) fn check_time_triggers(&mut self, world: &mut dyn World) {
        for (owner, kind, _) in self.owners_with(TIME_BIT) {
            match kind {
                AttachKind::Mobile => self.time_mtrigger(world, owner),
                AttachKind::Object => self.time_otrigger(world, owner),
                AttachKind::Room => self.time_wtrigger(world, owner),
            }
        }
    }

    /// Owners whose containers have `bits`, in UID order.
    fn owners_with(&self, bits: TriggerFlags) -> Vec<(Uid, AttachKind, bool)> {
        let mut owners: Vec<_> = self
            .containers
            .iter()
            .filter(|(_, c)| c.has_type(bits))
            .map(|(&uid, c)| (uid, c.kind, c.has_type(GLOBAL_BIT)))
            .collect();
        owners.sort_unstable_by_key(|&(uid, _, _)| uid);
        owners
    }

    fn zone_active(&self, world: &dyn World, owner: Uid, kind: AttachKind) -> bool {
        let room = match kind {
            AttachKind::Room => world.room_by_uid(owner),
            _ => world.room_of(owner),
        };
        room.is_some_and(|room| world.zone_is_active(room.zone))
    }
}
