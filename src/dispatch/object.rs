//! Object trigger dispatch.

use crate::core::Uid;
use crate::engine::ScriptEngine;
use crate::triggers::{otrig, TriggerFlags};
use crate::world::{Direction, ObjectLocation, World};

use super::{actor_var, command_matches, has_text_arg, susceptible, ConsumeKind};

fn exists(world: &dyn World, obj: Uid) -> bool {
    world.object_by_uid(obj).is_some()
}

fn carried_by(world: &dyn World, obj: Uid, actor: Uid) -> bool {
    world
        .object_by_uid(obj)
        .is_some_and(|o| o.location == ObjectLocation::Carried(actor))
}

/// Worn items of a character, in wear-position order.
fn equipment(world: &dyn World, ch: Uid) -> Vec<Uid> {
    world
        .character_by_uid(ch)
        .map(|ch| ch.equipment.values().copied().collect())
        .unwrap_or_default()
}

impl ScriptEngine {
    /// Percent-gated single-trigger check used by most object events.
    fn fire_percent(
        &mut self,
        world: &mut dyn World,
        obj: Uid,
        bits: TriggerFlags,
        bindings: &[(&str, String)],
    ) -> Option<i32> {
        self.fire_first(world, obj, bits, |proto, rng| rng.percent_chance(proto.narg), bindings)
    }

    /// Random trigger check for one object.
    pub fn random_otrigger(&mut self, world: &mut dyn World, obj: Uid) {
        self.fire_percent(world, obj, otrig::RANDOM, &[]);
    }

    /// The object's decay timer ran out. Returning false keeps the object.
    #[must_use]
    pub fn timer_otrigger(&mut self, world: &mut dyn World, obj: Uid) -> bool {
        self.fire_percent(world, obj, otrig::TIMER, &[])
            .map_or(true, |result| result != 0)
    }

    /// `actor` is picking `obj` up.
    #[must_use]
    pub fn get_otrigger(&mut self, world: &mut dyn World, obj: Uid, actor: Uid) -> bool {
        if !susceptible(&*world, actor) {
            return true;
        }
        match self.fire_percent(world, obj, otrig::GET, &[actor_var(actor)]) {
            Some(result) => result != 0 && exists(&*world, obj),
            None => true,
        }
    }

    /// `actor` typed `cmd arg`. Checks worn items, then carried items, then
    /// items on the floor, each against its trigger's scope bits. Returns
    /// true if an object consumed the command.
    ///
    /// An actor triggers ignore (a wizard-invisible immortal) gets false,
    /// so the game still runs their command, matching the room and mobile
    /// command triggers.
    #[must_use]
    pub fn command_otrigger(&mut self, world: &mut dyn World, actor: Uid, cmd: &str, arg: &str) -> bool {
        if !susceptible(&*world, actor) {
            return false;
        }

        let inventory = world
            .character_by_uid(actor)
            .map(|ch| ch.inventory.clone())
            .unwrap_or_default();
        let floor = world
            .room_of(actor)
            .map(|room| room.contents.clone())
            .unwrap_or_default();
        let scopes = [
            (otrig::SCOPE_EQUIP, equipment(&*world, actor)),
            (otrig::SCOPE_INVENTORY, inventory),
            (otrig::SCOPE_ROOM, floor),
        ];

        for (scope, objects) in scopes {
            for obj in objects {
                let fired = self.fire_first(
                    world,
                    obj,
                    otrig::COMMAND,
                    |proto, _| {
                        proto.narg & scope != 0
                            && has_text_arg(proto)
                            && command_matches(&proto.arg, cmd)
                    },
                    &[
                        actor_var(actor),
                        ("arg", arg.trim_start().to_string()),
                        ("cmd", cmd.trim_start().to_string()),
                    ],
                );
                if fired.is_some_and(|result| result != 0) {
                    return true;
                }
            }
        }
        false
    }

    /// `actor` hit `victim` for `damage`. Fires attack triggers on the
    /// attacker's equipment and defend triggers on the victim's.
    pub fn attack_otrigger(&mut self, world: &mut dyn World, actor: Uid, victim: Uid, damage: i32) {
        if !susceptible(&*world, actor) {
            return;
        }
        let bindings = [
            ("damage", damage.to_string()),
            actor_var(actor),
            ("victim", victim.to_string()),
        ];
        for obj in equipment(&*world, actor) {
            self.fire_percent(world, obj, otrig::ATTACK, &bindings);
        }
        for obj in equipment(&*world, victim) {
            self.fire_percent(world, obj, otrig::DEFEND, &bindings);
        }
    }

    /// `actor` is putting `obj` on at wear position `position`.
    #[must_use]
    pub fn wear_otrigger(&mut self, world: &mut dyn World, obj: Uid, actor: Uid, position: usize) -> bool {
        if !susceptible(&*world, actor) {
            return true;
        }
        match self.fire_first(
            world,
            obj,
            otrig::WEAR,
            |_, _| true,
            &[("position", position.to_string()), actor_var(actor)],
        ) {
            Some(result) => result != 0 && exists(&*world, obj),
            None => true,
        }
    }

    /// `actor` died. The first worn item with a death trigger decides.
    #[must_use]
    pub fn death_otrigger(&mut self, world: &mut dyn World, actor: Uid) -> bool {
        for obj in equipment(&*world, actor) {
            if let Some(result) = self.fire_first(world, obj, otrig::DEATH, |_, _| true, &[actor_var(actor)]) {
                return result != 0;
            }
        }
        true
    }

    /// `actor` is dropping `obj`.
    #[must_use]
    pub fn drop_otrigger(&mut self, world: &mut dyn World, obj: Uid, actor: Uid) -> bool {
        self.holder_event(world, obj, actor, otrig::DROP)
    }

    /// `actor` is taking `obj` off.
    #[must_use]
    pub fn remove_otrigger(&mut self, world: &mut dyn World, obj: Uid, actor: Uid) -> bool {
        self.holder_event(world, obj, actor, otrig::REMOVE)
    }

    fn holder_event(&mut self, world: &mut dyn World, obj: Uid, actor: Uid, bits: TriggerFlags) -> bool {
        if !susceptible(&*world, actor) {
            return true;
        }
        match self.fire_percent(world, obj, bits, &[actor_var(actor)]) {
            Some(result) => result != 0 && exists(&*world, obj),
            None => true,
        }
    }

    /// `actor` is handing `obj` to `victim`. Blocked if the script moved or
    /// destroyed the object.
    #[must_use]
    pub fn give_otrigger(&mut self, world: &mut dyn World, obj: Uid, actor: Uid, victim: Uid) -> bool {
        if !susceptible(&*world, actor) {
            return true;
        }
        match self.fire_percent(
            world,
            obj,
            otrig::GIVE,
            &[actor_var(actor), ("victim", victim.to_string())],
        ) {
            Some(result) => result != 0 && carried_by(&*world, obj, actor),
            None => true,
        }
    }

    /// `obj` was just loaded into the world.
    pub fn load_otrigger(&mut self, world: &mut dyn World, obj: Uid) {
        self.fire_percent(world, obj, otrig::LOAD, &[]);
    }

    /// `actor` is casting spell `spellnum` at `obj`.
    #[must_use]
    pub fn cast_otrigger(
        &mut self,
        world: &mut dyn World,
        actor: Uid,
        obj: Uid,
        spellnum: i32,
        spell: &str,
    ) -> bool {
        if !susceptible(&*world, actor) {
            return true;
        }
        self.fire_percent(
            world,
            obj,
            otrig::CAST,
            &[
                actor_var(actor),
                ("spellnum", spellnum.to_string()),
                ("spell", spell.to_string()),
            ],
        )
        .map_or(true, |result| result != 0)
    }

    /// `actor` is leaving `room`. Every object on the floor may react;
    /// any of them can block.
    #[must_use]
    pub fn leave_otrigger(
        &mut self,
        world: &mut dyn World,
        room: Uid,
        actor: Uid,
        dir: Option<Direction>,
    ) -> bool {
        if !susceptible(&*world, actor) {
            return true;
        }
        let contents = world
            .room_by_uid(room)
            .map(|r| r.contents.clone())
            .unwrap_or_default();
        let bindings = [
            ("direction", dir.map_or("none", Direction::name).to_string()),
            actor_var(actor),
        ];

        let mut allowed = true;
        for obj in contents {
            if let Some(result) = self.fire_percent(world, obj, otrig::LEAVE, &bindings) {
                allowed = allowed && result != 0;
            }
        }
        allowed
    }

    /// `actor` is eating, drinking or quaffing `obj`.
    #[must_use]
    pub fn consume_otrigger(
        &mut self,
        world: &mut dyn World,
        obj: Uid,
        actor: Uid,
        kind: ConsumeKind,
    ) -> bool {
        if !susceptible(&*world, actor) {
            return true;
        }
        match self.fire_first(
            world,
            obj,
            otrig::CONSUME,
            |_, _| true,
            &[actor_var(actor), ("command", kind.name().to_string())],
        ) {
            Some(result) => result != 0 && exists(&*world, obj),
            None => true,
        }
    }

    /// Hourly check for one object.
    pub fn time_otrigger(&mut self, world: &mut dyn World, obj: Uid) {
        let hour = world.time().hours;
        self.fire_first(
            world,
            obj,
            otrig::TIME,
            |proto, _| i64::from(proto.narg) == i64::from(hour),
            &[("time", hour.to_string())],
        );
    }
}
