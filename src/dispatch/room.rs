//! Room trigger dispatch.

use crate::core::Uid;
use crate::engine::ScriptEngine;
use crate::triggers::{wtrig, TriggerFlags};
use crate::world::{Direction, ObjectLocation, World};

use super::{actor_var, command_matches, has_text_arg, susceptible, text_matches, DoorAction};

fn room_of(world: &dyn World, actor: Uid) -> Option<Uid> {
    world.room_of(actor).map(|room| room.uid)
}

impl ScriptEngine {
    fn fire_room(
        &mut self,
        world: &mut dyn World,
        room: Uid,
        bits: TriggerFlags,
        bindings: &[(&str, String)],
    ) -> Option<i32> {
        self.fire_first(world, room, bits, |proto, rng| rng.percent_chance(proto.narg), bindings)
    }

    /// Random trigger check for one room.
    pub fn random_wtrigger(&mut self, world: &mut dyn World, room: Uid) {
        self.fire_room(world, room, wtrig::RANDOM, &[]);
    }

    /// `actor` is about to enter `room` heading `dir`.
    #[must_use]
    pub fn preentry_wtrigger(&mut self, world: &mut dyn World, room: Uid, actor: Uid, dir: Direction) -> bool {
        if !susceptible(&*world, actor) {
            return true;
        }
        self.fire_room(
            world,
            room,
            wtrig::PREENTRY,
            &[
                ("direction", dir.reverse().name().to_string()),
                actor_var(actor),
            ],
        )
        .map_or(true, |result| result != 0)
    }

    /// `actor` has just entered its current room heading `dir`.
    #[must_use]
    pub fn postentry_wtrigger(&mut self, world: &mut dyn World, actor: Uid, dir: Direction) -> bool {
        if !susceptible(&*world, actor) {
            return true;
        }
        let Some(room) = room_of(&*world, actor) else {
            return true;
        };
        self.fire_room(
            world,
            room,
            wtrig::POSTENTRY,
            &[
                ("direction", dir.reverse().name().to_string()),
                actor_var(actor),
            ],
        )
        .map_or(true, |result| result != 0)
    }

    /// The zone holding `room` was reset.
    pub fn reset_wtrigger(&mut self, world: &mut dyn World, room: Uid) {
        self.fire_room(world, room, wtrig::RESET, &[]);
    }

    /// `actor` typed `cmd arg`. Returns true if the room consumed it.
    /// Actors triggers ignore get false, so the game runs the command.
    #[must_use]
    pub fn command_wtrigger(&mut self, world: &mut dyn World, actor: Uid, cmd: &str, arg: &str) -> bool {
        if !susceptible(&*world, actor) {
            return false;
        }
        let Some(room) = room_of(&*world, actor) else {
            return false;
        };
        self.fire_first(
            world,
            room,
            wtrig::COMMAND,
            |proto, _| has_text_arg(proto) && command_matches(&proto.arg, cmd),
            &[
                actor_var(actor),
                ("arg", arg.trim_start().to_string()),
                ("cmd", cmd.trim_start().to_string()),
            ],
        )
        .is_some_and(|result| result != 0)
    }

    /// `actor` said `speech` in its room.
    pub fn speech_wtrigger(&mut self, world: &mut dyn World, actor: Uid, speech: &str) {
        if !susceptible(&*world, actor) {
            return;
        }
        let Some(room) = room_of(&*world, actor) else {
            return;
        };
        self.fire_first(
            world,
            room,
            wtrig::SPEECH,
            |proto, _| has_text_arg(proto) && text_matches(proto, speech),
            &[actor_var(actor), ("speech", speech.to_string())],
        );
    }

    /// `actor` is dropping `obj` in its room. Blocked if the script took
    /// the object away from the actor.
    #[must_use]
    pub fn drop_wtrigger(&mut self, world: &mut dyn World, obj: Uid, actor: Uid) -> bool {
        if !susceptible(&*world, actor) {
            return true;
        }
        let Some(room) = room_of(&*world, actor) else {
            return true;
        };
        match self.fire_room(
            world,
            room,
            wtrig::DROP,
            &[actor_var(actor), ("object", obj.to_string())],
        ) {
            Some(result) => {
                let still_carried = world
                    .object_by_uid(obj)
                    .is_some_and(|o| o.location == ObjectLocation::Carried(actor));
                still_carried && result != 0
            }
            None => true,
        }
    }

    /// `actor` is casting spell `spellnum` in its room.
    #[must_use]
    pub fn cast_wtrigger(
        &mut self,
        world: &mut dyn World,
        actor: Uid,
        victim: Option<Uid>,
        obj: Option<Uid>,
        spellnum: i32,
        spell: &str,
    ) -> bool {
        if !susceptible(&*world, actor) {
            return true;
        }
        let Some(room) = room_of(&*world, actor) else {
            return true;
        };
        let mut bindings = vec![actor_var(actor)];
        if let Some(victim) = victim {
            bindings.push(("victim", victim.to_string()));
        }
        if let Some(obj) = obj {
            bindings.push(("object", obj.to_string()));
        }
        bindings.push(("spellnum", spellnum.to_string()));
        bindings.push(("spell", spell.to_string()));

        self.fire_room(world, room, wtrig::CAST, &bindings)
            .map_or(true, |result| result != 0)
    }

    /// `actor` is leaving `room` toward `dir`.
    #[must_use]
    pub fn leave_wtrigger(&mut self, world: &mut dyn World, room: Uid, actor: Uid, dir: Direction) -> bool {
        if !susceptible(&*world, actor) {
            return true;
        }
        self.fire_room(
            world,
            room,
            wtrig::LEAVE,
            &[("direction", dir.name().to_string()), actor_var(actor)],
        )
        .map_or(true, |result| result != 0)
    }

    /// `actor` is working the door toward `dir` in its room.
    #[must_use]
    pub fn door_wtrigger(&mut self, world: &mut dyn World, actor: Uid, action: DoorAction, dir: Direction) -> bool {
        if !susceptible(&*world, actor) {
            return true;
        }
        let Some(room) = room_of(&*world, actor) else {
            return true;
        };
        self.fire_room(
            world,
            room,
            wtrig::DOOR,
            &[
                ("cmd", action.name().to_string()),
                ("direction", dir.name().to_string()),
                actor_var(actor),
            ],
        )
        .map_or(true, |result| result != 0)
    }

    /// Hourly check for one room.
    pub fn time_wtrigger(&mut self, world: &mut dyn World, room: Uid) {
        let hour = world.time().hours;
        self.fire_first(
            world,
            room,
            wtrig::TIME,
            |proto, _| i64::from(proto.narg) == i64::from(hour),
            &[("time", hour.to_string())],
        );
    }
}
