//! The script engine.
//!
//! [`ScriptEngine`] owns every piece of script state in the game: the
//! prototype registry, one [`ScriptContainer`] per scripted entity, the
//! arena of attached [`TriggerInstance`]s, the wait queue, and the RNG.
//! The host game owns the entities themselves and lends them to the engine
//! through [`World`] on every call.
//!
//! ## Usage
//!
//! ```
//! use rust_mudscript::engine::ScriptEngine;
//! use rust_mudscript::games::simple::SimpleWorld;
//! use rust_mudscript::triggers::{wtrig, AttachKind, PrototypeRegistry, TriggerPrototype};
//! use rust_mudscript::ScriptConfig;
//!
//! let mut protos = PrototypeRegistry::new();
//! protos.register(
//!     TriggerPrototype::new(10, "greeting", AttachKind::Room)
//!         .with_flags(wtrig::SPEECH)
//!         .with_arg("hello")
//!         .with_commands("echo Hello yourself, %actor.name%."),
//! );
//!
//! let mut world = SimpleWorld::new();
//! let room = world.add_room(3001, "The Temple");
//! let bob = world.add_player("Bob", room);
//!
//! let mut engine = ScriptEngine::new(ScriptConfig::default(), protos);
//! engine.attach(&world, 10, room, None).unwrap();
//!
//! engine.speech_wtrigger(&mut world, bob, "well hello there");
//! assert_eq!(world.messages().last().map(String::as_str), Some("Hello yourself, Bob."));
//! ```

mod driver;
mod inspect;

pub use driver::RunMode;

use rustc_hash::FxHashMap;
use thiserror::Error;
use tracing::debug;

use crate::core::{Arena, EntityRef, Handle, ScriptConfig, ScriptRng, Uid, Vnum};
use crate::script::WaitQueue;
use crate::triggers::{AttachKind, PrototypeRegistry, ScriptContainer, TriggerInstance};
use crate::world::World;

/// Why a trigger could not be attached.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AttachError {
    #[error("no trigger with vnum {0}")]
    UnknownTrigger(Vnum),

    #[error("no entity with UID {}", .0.raw())]
    NoSuchTarget(Uid),

    #[error("trigger {vnum} is a {expected} trigger and cannot attach to a {found}")]
    WrongKind {
        vnum: Vnum,
        expected: AttachKind,
        found: AttachKind,
    },

    #[error("mobile triggers cannot attach to players (UID {})", .0.raw())]
    PlayerTarget(Uid),
}

/// All script state for one game.
#[derive(Debug)]
pub struct ScriptEngine {
    pub(crate) config: ScriptConfig,
    pub(crate) prototypes: PrototypeRegistry,
    pub(crate) containers: FxHashMap<Uid, ScriptContainer>,
    pub(crate) triggers: Arena<TriggerInstance>,
    pub(crate) waits: WaitQueue,
    pub(crate) rng: ScriptRng,
    pub(crate) pulse_count: u64,
    /// Runs currently on the call stack.
    pub(crate) depth: u32,
    pub(crate) last_hour: Option<u32>,
}

impl ScriptEngine {
    /// Create an engine over a loaded prototype registry.
    #[must_use]
    pub fn new(config: ScriptConfig, prototypes: PrototypeRegistry) -> Self {
        let rng = ScriptRng::new(config.rng_seed);
        Self {
            config,
            prototypes,
            containers: FxHashMap::default(),
            triggers: Arena::new(),
            waits: WaitQueue::new(),
            rng,
            pulse_count: 0,
            depth: 0,
            last_hour: None,
        }
    }

    // === Accessors ===

    #[must_use]
    pub fn config(&self) -> &ScriptConfig {
        &self.config
    }

    #[must_use]
    pub fn prototypes(&self) -> &PrototypeRegistry {
        &self.prototypes
    }

    /// Pulses elapsed since the engine started.
    #[must_use]
    pub fn pulse_count(&self) -> u64 {
        self.pulse_count
    }

    #[must_use]
    pub fn container(&self, owner: Uid) -> Option<&ScriptContainer> {
        self.containers.get(&owner)
    }

    #[must_use]
    pub fn trigger(&self, handle: Handle) -> Option<&TriggerInstance> {
        self.triggers.get(handle)
    }

    pub fn trigger_mut(&mut self, handle: Handle) -> Option<&mut TriggerInstance> {
        self.triggers.get_mut(handle)
    }

    /// Number of attached trigger instances across all entities.
    #[must_use]
    pub fn attached_count(&self) -> usize {
        self.triggers.len()
    }

    /// Number of suspended runs waiting to resume.
    #[must_use]
    pub fn pending_waits(&self) -> usize {
        self.waits.len()
    }

    /// Read a global variable of an entity.
    #[must_use]
    pub fn global_var(&self, owner: Uid, name: &str) -> Option<&str> {
        self.containers.get(&owner)?.globals.get(name)
    }

    /// Set a global variable. The entity must have a script container.
    pub fn set_global(&mut self, owner: Uid, name: &str, value: &str) -> bool {
        match self.containers.get_mut(&owner) {
            Some(container) => {
                container.globals.set(name, value);
                true
            }
            None => false,
        }
    }

    // === Attachment ===

    /// Attach a copy of prototype `vnum` to `target`.
    ///
    /// `position` is an index into the entity's trigger list, clamped to
    /// its length; `None` appends.
    pub fn attach(
        &mut self,
        world: &dyn World,
        vnum: Vnum,
        target: Uid,
        position: Option<usize>,
    ) -> Result<Handle, AttachError> {
        let proto = self
            .prototypes
            .get(vnum)
            .cloned()
            .ok_or(AttachError::UnknownTrigger(vnum))?;

        let kind = match world.resolve(target) {
            EntityRef::Character(handle) => match world.character(handle) {
                Some(ch) if ch.is_npc() => AttachKind::Mobile,
                Some(_) => return Err(AttachError::PlayerTarget(target)),
                None => return Err(AttachError::NoSuchTarget(target)),
            },
            EntityRef::Object(_) => AttachKind::Object,
            EntityRef::Room(_) => AttachKind::Room,
            EntityRef::None => return Err(AttachError::NoSuchTarget(target)),
        };
        if proto.attach != kind {
            return Err(AttachError::WrongKind {
                vnum,
                expected: proto.attach,
                found: kind,
            });
        }

        let flags = proto.flags;
        let handle = self.triggers.insert(TriggerInstance::new(proto, target));
        let container = self
            .containers
            .entry(target)
            .or_insert_with(|| ScriptContainer::new(kind));
        container.insert(handle, position);
        container.types |= flags;

        debug!(target: "scripts", vnum, owner = target.raw(), "attached trigger");
        Ok(handle)
    }

    /// Detach one trigger from `target`.
    ///
    /// `spec` is `N` (the Nth trigger), `name` (the first whose name
    /// matches) or `N.name` (the Nth whose name matches). Returns false if
    /// nothing matched.
    pub fn detach(&mut self, target: Uid, spec: &str) -> bool {
        let Some(container) = self.containers.get(&target) else {
            return false;
        };
        let Some(handle) = find_by_spec(container, &self.triggers, spec) else {
            return false;
        };
        self.remove_instance(target, handle);
        true
    }

    /// Detach every trigger from `target`.
    pub fn detach_all(&mut self, target: Uid) -> usize {
        let Some(container) = self.containers.remove(&target) else {
            return 0;
        };
        for &handle in container.triggers.iter() {
            self.drop_instance(handle);
        }
        debug!(target: "scripts", owner = target.raw(), "detached all triggers");
        container.triggers.len()
    }

    /// Forget an entity that is leaving the world.
    ///
    /// Drops its container, instances and pending waits. A run of one of
    /// its triggers that is on the stack stops after its current command.
    pub fn extract_entity(&mut self, uid: Uid) {
        if let Some(container) = self.containers.remove(&uid) {
            for &handle in container.triggers.iter() {
                self.triggers.remove(handle);
            }
        }
        let cancelled = self.waits.cancel_owner(uid);
        if cancelled > 0 {
            debug!(target: "scripts", owner = uid.raw(), cancelled, "cancelled waits of extracted entity");
        }
    }

    fn remove_instance(&mut self, owner: Uid, handle: Handle) {
        self.drop_instance(handle);

        let Some(container) = self.containers.get_mut(&owner) else {
            return;
        };
        container.remove(handle);
        if container.is_empty() {
            self.containers.remove(&owner);
            debug!(target: "scripts", owner = owner.raw(), "freed empty script container");
            return;
        }

        let triggers = &self.triggers;
        container.types = container
            .triggers
            .iter()
            .filter_map(|&h| triggers.get(h))
            .fold(Default::default(), |acc, inst| acc | inst.proto.flags);
    }

    fn drop_instance(&mut self, handle: Handle) {
        if let Some(inst) = self.triggers.remove(handle) {
            if let Some(id) = inst.wait {
                self.waits.cancel(id);
            }
            debug!(target: "scripts", vnum = inst.proto.vnum, owner = inst.owner.raw(), "detached trigger");
        }
    }

    // === Pulse ===

    /// Advance one pulse.
    ///
    /// Resumes every continuation that has come due, scans random
    /// triggers every `random_check_interval` pulses, and runs time
    /// triggers when the game hour changes.
    pub fn pulse(&mut self, world: &mut dyn World) {
        self.pulse_count += 1;

        while let Some((id, cont)) = self.waits.pop_due(self.pulse_count) {
            let current = self
                .triggers
                .get(cont.trigger)
                .is_some_and(|inst| inst.wait == Some(id));
            if current {
                debug!(target: "scripts", owner = cont.owner.raw(), line = cont.resume_at, "resuming trigger");
                self.run_trigger(world, cont.trigger, RunMode::Resume);
            }
        }

        let interval = u64::from(self.config.random_check_interval);
        if interval > 0 && self.pulse_count % interval == 0 {
            self.check_random_triggers(world);
        }

        let hour = world.time().hours;
        match self.last_hour.replace(hour) {
            Some(previous) if previous != hour => self.check_time_triggers(world),
            _ => {}
        }
    }
}

/// Resolve a detach spec against a container's trigger list.
fn find_by_spec(
    container: &ScriptContainer,
    triggers: &Arena<TriggerInstance>,
    spec: &str,
) -> Option<Handle> {
    let spec = spec.trim();
    let (nth, name) = match spec.split_once('.') {
        Some((n, name)) => (crate::core::text::atoi(n), Some(name)),
        None if spec.starts_with(|c: char| c.is_ascii_digit()) => {
            (crate::core::text::atoi(spec), None)
        }
        None => (1, Some(spec)),
    };
    let nth = usize::try_from(nth).unwrap_or(0).max(1);

    container
        .triggers
        .iter()
        .copied()
        .filter(|&h| match name {
            Some(name) => triggers
                .get(h)
                .is_some_and(|inst| crate::core::text::isname(name, &inst.proto.name)),
            None => true,
        })
        .nth(nth - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::simple::SimpleWorld;
    use crate::triggers::{mtrig, otrig, TriggerPrototype};

    fn engine() -> ScriptEngine {
        let mut protos = PrototypeRegistry::new();
        protos.register(
            TriggerPrototype::new(1, "guard greet", AttachKind::Mobile).with_flags(mtrig::GREET),
        );
        protos.register(
            TriggerPrototype::new(2, "guard speech", AttachKind::Mobile).with_flags(mtrig::SPEECH),
        );
        protos.register(
            TriggerPrototype::new(3, "sword timer", AttachKind::Object).with_flags(otrig::TIMER),
        );
        ScriptEngine::new(ScriptConfig::default(), protos)
    }

    #[test]
    fn test_attach_checks_kind() {
        let mut world = SimpleWorld::new();
        let room = world.add_room(100, "Hall");
        let guard = world.add_mobile(1000, "guard", room);
        let player = world.add_player("Ann", room);
        let mut engine = engine();

        assert!(engine.attach(&world, 1, guard, None).is_ok());
        assert_eq!(
            engine.attach(&world, 99, guard, None),
            Err(AttachError::UnknownTrigger(99))
        );
        assert_eq!(
            engine.attach(&world, 3, guard, None),
            Err(AttachError::WrongKind {
                vnum: 3,
                expected: AttachKind::Object,
                found: AttachKind::Mobile
            })
        );
        assert_eq!(
            engine.attach(&world, 1, player, None),
            Err(AttachError::PlayerTarget(player))
        );
        assert_eq!(
            engine.attach(&world, 1, Uid::new(999_999), None),
            Err(AttachError::NoSuchTarget(Uid::new(999_999)))
        );
    }

    #[test]
    fn test_type_mask_tracks_attach_and_detach() {
        let mut world = SimpleWorld::new();
        let room = world.add_room(100, "Hall");
        let guard = world.add_mobile(1000, "guard", room);
        let mut engine = engine();

        engine.attach(&world, 1, guard, None).unwrap();
        engine.attach(&world, 2, guard, None).unwrap();
        let types = engine.container(guard).unwrap().types();
        assert!(types.contains(mtrig::GREET | mtrig::SPEECH));

        assert!(engine.detach(guard, "1"));
        let types = engine.container(guard).unwrap().types();
        assert!(!types.intersects(mtrig::GREET));
        assert!(types.intersects(mtrig::SPEECH));
    }

    #[test]
    fn test_detach_specs() {
        let mut world = SimpleWorld::new();
        let room = world.add_room(100, "Hall");
        let guard = world.add_mobile(1000, "guard", room);
        let mut engine = engine();

        let greet = engine.attach(&world, 1, guard, None).unwrap();
        let speech = engine.attach(&world, 2, guard, None).unwrap();
        let greet2 = engine.attach(&world, 1, guard, None).unwrap();

        assert!(!engine.detach(guard, "nothing"));
        assert!(engine.detach(guard, "2.greet"));
        assert!(engine.trigger(greet2).is_none());
        assert!(engine.detach(guard, "speech"));
        assert!(engine.trigger(speech).is_none());
        assert!(engine.trigger(greet).is_some());

        assert!(engine.detach(guard, "1"));
        assert!(engine.container(guard).is_none());
        assert!(!engine.detach(guard, "1"));
    }

    #[test]
    fn test_attach_position() {
        let mut world = SimpleWorld::new();
        let room = world.add_room(100, "Hall");
        let guard = world.add_mobile(1000, "guard", room);
        let mut engine = engine();

        let a = engine.attach(&world, 1, guard, None).unwrap();
        let b = engine.attach(&world, 2, guard, Some(0)).unwrap();
        let order: Vec<Handle> = engine.container(guard).unwrap().triggers().iter().copied().collect();
        assert_eq!(order, vec![b, a]);
    }

    #[test]
    fn test_extract_drops_everything() {
        let mut world = SimpleWorld::new();
        let room = world.add_room(100, "Hall");
        let guard = world.add_mobile(1000, "guard", room);
        let mut engine = engine();

        let handle = engine.attach(&world, 1, guard, None).unwrap();
        engine.set_global(guard, "mood", "grumpy");
        engine.extract_entity(guard);

        assert!(engine.trigger(handle).is_none());
        assert!(engine.container(guard).is_none());
        assert_eq!(engine.global_var(guard, "mood"), None);
        assert_eq!(engine.attached_count(), 0);
    }
}
