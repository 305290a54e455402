//! Mobile trigger dispatch.

use crate::core::{Uid, Vnum};
use crate::engine::ScriptEngine;
use crate::triggers::mtrig;
use crate::world::{Coins, Direction, World};

use super::{actor_var, has_text_arg, performs_scripts, susceptible, text_matches, DoorAction};

/// The parties of an act message.
#[derive(Clone, Copy, Debug)]
pub struct ActEvent<'a> {
    pub actor: Uid,
    pub victim: Option<Uid>,
    pub object: Option<Uid>,
    pub target: Option<Uid>,
    pub arg: Option<&'a str>,
    pub arg2: Option<&'a str>,
}

/// Characters present in the actor's room, captured before any script runs.
fn room_people(world: &dyn World, actor: Uid) -> Vec<Uid> {
    world
        .room_of(actor)
        .map(|room| room.people.clone())
        .unwrap_or_default()
}

/// A scripted mobile that notices what `actor` does: awake, not fighting,
/// and not the actor itself.
fn is_watcher(world: &dyn World, mob: Uid, actor: Uid) -> bool {
    mob != actor
        && world.character_by_uid(mob).is_some_and(|ch| {
            ch.performs_scripts() && ch.is_awake() && ch.fighting.is_none()
        })
}

impl ScriptEngine {
    /// Random trigger check for one mobile.
    pub fn random_mtrigger(&mut self, world: &mut dyn World, mob: Uid) {
        if !performs_scripts(&*world, mob) || !susceptible(&*world, mob) {
            return;
        }
        self.fire_first(
            world,
            mob,
            mtrig::RANDOM,
            |proto, rng| rng.percent_chance(proto.narg),
            &[],
        );
    }

    /// Coins were given to `mob`. Fires when their total value reaches the
    /// trigger's numeric arg.
    pub fn bribe_mtrigger(&mut self, world: &mut dyn World, mob: Uid, actor: Uid, coins: Coins) {
        if !performs_scripts(&*world, mob) || !susceptible(&*world, actor) || !susceptible(&*world, mob) {
            return;
        }
        let value = coins.value();
        self.fire_first(
            world,
            mob,
            mtrig::BRIBE,
            |proto, _| value >= i64::from(proto.narg),
            &[
                ("value", value.to_string()),
                ("platinum", coins.platinum.to_string()),
                ("gold", coins.gold.to_string()),
                ("silver", coins.silver.to_string()),
                ("copper", coins.copper.to_string()),
                actor_var(actor),
            ],
        );
    }

    /// `actor` entered a room heading `dir`. Every watching mobile may
    /// greet; returns false if any of them blocked the entry.
    #[must_use]
    pub fn greet_mtrigger(&mut self, world: &mut dyn World, actor: Uid, dir: Direction) -> bool {
        if !susceptible(&*world, actor) {
            return true;
        }

        let mut allowed = true;
        for mob in room_people(&*world, actor) {
            if !is_watcher(&*world, mob, actor) {
                continue;
            }
            let sees = world.can_see(mob, actor);
            let fired = self.fire_first(
                world,
                mob,
                mtrig::GREET | mtrig::GREET_ALL,
                |proto, rng| {
                    ((sees && proto.flags.intersects(mtrig::GREET))
                        || proto.flags.intersects(mtrig::GREET_ALL))
                        && rng.percent_chance(proto.narg)
                },
                &[
                    ("direction", dir.reverse().name().to_string()),
                    actor_var(actor),
                ],
            );
            if let Some(result) = fired {
                if result == 0 {
                    allowed = false;
                }
                if world.character_by_uid(mob).is_none() || world.character_by_uid(actor).is_none() {
                    return false;
                }
            }
        }
        allowed
    }

    /// `mob` is about to enter room `destination`.
    #[must_use]
    pub fn entry_mtrigger(&mut self, world: &mut dyn World, mob: Uid, destination: Vnum) -> bool {
        if !performs_scripts(&*world, mob) || !susceptible(&*world, mob) {
            return true;
        }
        match self.fire_first(
            world,
            mob,
            mtrig::ENTRY,
            |proto, rng| rng.percent_chance(proto.narg),
            &[("destination", destination.to_string())],
        ) {
            Some(result) => result != 0 && world.character_by_uid(mob).is_some(),
            None => true,
        }
    }

    /// `actor` typed `cmd arg`. Returns true if a mobile in the room
    /// consumed the command.
    #[must_use]
    pub fn command_mtrigger(&mut self, world: &mut dyn World, actor: Uid, cmd: &str, arg: &str) -> bool {
        if !susceptible(&*world, actor) {
            return false;
        }
        for mob in room_people(&*world, actor) {
            if !performs_scripts(&*world, mob) {
                continue;
            }
            let fired = self.fire_first(
                world,
                mob,
                mtrig::COMMAND,
                |proto, _| has_text_arg(proto) && super::command_matches(&proto.arg, cmd),
                &[
                    actor_var(actor),
                    ("arg", arg.trim_start().to_string()),
                    ("cmd", cmd.trim_start().to_string()),
                ],
            );
            if let Some(result) = fired {
                return result != 0;
            }
        }
        false
    }

    /// `actor` said `speech` aloud. Every awake mobile in the room other
    /// than the speaker may react.
    pub fn speech_mtrigger(&mut self, world: &mut dyn World, actor: Uid, speech: &str) {
        if !susceptible(&*world, actor) {
            return;
        }
        for mob in room_people(&*world, actor) {
            let listening = mob != actor
                && world
                    .character_by_uid(mob)
                    .is_some_and(|ch| ch.performs_scripts() && ch.is_awake());
            if listening {
                self.fire_speech(world, mob, actor, speech);
            }
        }
    }

    /// `actor` spoke to `mob` directly (ask, whisper, tell).
    pub fn speech_to_mtrigger(&mut self, world: &mut dyn World, actor: Uid, mob: Uid, speech: &str) {
        if !susceptible(&*world, actor) || !susceptible(&*world, mob) || actor == mob {
            return;
        }
        let listening = world
            .character_by_uid(mob)
            .is_some_and(|ch| ch.performs_scripts() && ch.is_awake());
        if listening {
            self.fire_speech(world, mob, actor, speech);
        }
    }

    fn fire_speech(&mut self, world: &mut dyn World, mob: Uid, actor: Uid, speech: &str) {
        self.fire_first(
            world,
            mob,
            mtrig::SPEECH | mtrig::SPEECH_TO,
            |proto, _| has_text_arg(proto) && text_matches(proto, speech),
            &[actor_var(actor), ("speech", speech.to_string())],
        );
    }

    /// `mob` saw the act message `text`.
    pub fn act_mtrigger(&mut self, world: &mut dyn World, mob: Uid, text: &str, event: &ActEvent<'_>) {
        if !susceptible(&*world, event.actor) || !performs_scripts(&*world, mob) {
            return;
        }

        let mut bindings = vec![actor_var(event.actor)];
        let uids = [
            ("victim", event.victim),
            ("object", event.object),
            ("target", event.target),
        ];
        bindings.extend(
            uids.into_iter()
                .filter_map(|(name, uid)| uid.map(|uid| (name, uid.to_string()))),
        );
        if let Some(arg) = event.arg {
            bindings.push(("arg", arg.trim_start().to_string()));
        }
        if let Some(arg2) = event.arg2 {
            bindings.push(("arg2", arg2.trim_start().to_string()));
        }
        bindings.push(("act", text.to_string()));

        self.fire_first(
            world,
            mob,
            mtrig::ACT,
            |proto, _| has_text_arg(proto) && text_matches(proto, text),
            &bindings,
        );
    }

    /// Combat round check for a fighting mobile.
    pub fn fight_mtrigger(&mut self, world: &mut dyn World, mob: Uid) {
        let Some(opponent) = self.scripted_fighter(&*world, mob) else {
            return;
        };
        self.fire_first(
            world,
            mob,
            mtrig::FIGHT,
            |proto, rng| rng.percent_chance(proto.narg),
            &[actor_var(opponent)],
        );
    }

    /// Fires when a fighting mobile's hit points drop to the trigger's
    /// percentage of its maximum.
    pub fn hitprcnt_mtrigger(&mut self, world: &mut dyn World, mob: Uid) {
        let Some(opponent) = self.scripted_fighter(&*world, mob) else {
            return;
        };
        let Some(percent) = world
            .character_by_uid(mob)
            .filter(|ch| ch.max_hit > 0)
            .map(|ch| i64::from(ch.hit) * 100 / i64::from(ch.max_hit))
        else {
            return;
        };
        self.fire_first(
            world,
            mob,
            mtrig::HIT_PERCENT,
            |proto, _| percent <= i64::from(proto.narg),
            &[actor_var(opponent)],
        );
    }

    fn scripted_fighter(&self, world: &dyn World, mob: Uid) -> Option<Uid> {
        world
            .character_by_uid(mob)
            .filter(|ch| ch.performs_scripts())?
            .fighting
    }

    /// `actor` is giving `object` to `mob`. A receive trigger that is still
    /// running refuses the item.
    #[must_use]
    pub fn receive_mtrigger(&mut self, world: &mut dyn World, mob: Uid, actor: Uid, object: Uid) -> bool {
        if !performs_scripts(&*world, mob) || !susceptible(&*world, actor) || !susceptible(&*world, mob) {
            return true;
        }
        let Some(container) = self.containers.get(&mob).filter(|c| c.has_type(mtrig::RECEIVE)) else {
            return true;
        };

        for handle in container.triggers.clone() {
            let Some(inst) = self.triggers.get(handle) else {
                continue;
            };
            if !inst.proto.flags.intersects(mtrig::RECEIVE) {
                continue;
            }
            if !inst.is_idle() {
                return false;
            }
            if self.rng.percent_chance(inst.proto.narg) {
                let result = self.fire(
                    world,
                    handle,
                    &[actor_var(actor), ("object", object.to_string())],
                );
                return result != 0;
            }
        }
        true
    }

    /// `mob` is dying. Every death trigger runs; the last one decides.
    #[must_use]
    pub fn death_mtrigger(&mut self, world: &mut dyn World, mob: Uid, actor: Option<Uid>) -> bool {
        if !performs_scripts(&*world, mob)
            || !susceptible(&*world, mob)
            || actor.is_some_and(|actor| !susceptible(&*world, actor))
        {
            return true;
        }
        let Some(container) = self.containers.get(&mob).filter(|c| c.has_type(mtrig::DEATH)) else {
            return true;
        };

        let bindings: Vec<_> = actor.map(actor_var).into_iter().collect();
        let mut result = 1;
        for handle in container.triggers.clone() {
            let ready = self
                .triggers
                .get(handle)
                .is_some_and(|inst| inst.proto.flags.intersects(mtrig::DEATH) && inst.is_idle());
            if ready {
                result = self.fire(world, handle, &bindings);
            }
        }
        result != 0
    }

    /// `mob` was just loaded into the world.
    pub fn load_mtrigger(&mut self, world: &mut dyn World, mob: Uid) {
        if !susceptible(&*world, mob) {
            return;
        }
        self.fire_first(
            world,
            mob,
            mtrig::LOAD,
            |proto, rng| rng.percent_chance(proto.narg),
            &[],
        );
    }

    /// `actor` is casting spell `spellnum` at `mob`.
    #[must_use]
    pub fn cast_mtrigger(
        &mut self,
        world: &mut dyn World,
        actor: Uid,
        mob: Uid,
        spellnum: i32,
        spell: &str,
    ) -> bool {
        if !performs_scripts(&*world, mob) || !susceptible(&*world, actor) || !susceptible(&*world, mob) {
            return true;
        }
        self.fire_first(
            world,
            mob,
            mtrig::CAST,
            |proto, rng| rng.percent_chance(proto.narg),
            &[
                actor_var(actor),
                ("spellnum", spellnum.to_string()),
                ("spell", spell.to_string()),
            ],
        )
        .map_or(true, |result| result != 0)
    }

    /// `actor` is leaving the room toward `dir` (`None` for non-exit moves
    /// such as teleports).
    #[must_use]
    pub fn leave_mtrigger(&mut self, world: &mut dyn World, actor: Uid, dir: Option<Direction>) -> bool {
        if !susceptible(&*world, actor) {
            return true;
        }
        let direction = dir.map_or("none", Direction::name);
        for mob in room_people(&*world, actor) {
            if !is_watcher(&*world, mob, actor) || !world.can_see(mob, actor) {
                continue;
            }
            let fired = self.fire_first(
                world,
                mob,
                mtrig::LEAVE,
                |proto, rng| rng.percent_chance(proto.narg),
                &[("direction", direction.to_string()), actor_var(actor)],
            );
            if let Some(result) = fired {
                return result != 0;
            }
        }
        true
    }

    /// `actor` is working the door toward `dir`.
    #[must_use]
    pub fn door_mtrigger(
        &mut self,
        world: &mut dyn World,
        actor: Uid,
        action: DoorAction,
        dir: Direction,
    ) -> bool {
        if !susceptible(&*world, actor) {
            return true;
        }
        for mob in room_people(&*world, actor) {
            if !is_watcher(&*world, mob, actor) || !world.can_see(mob, actor) {
                continue;
            }
            let fired = self.fire_first(
                world,
                mob,
                mtrig::DOOR,
                |proto, rng| rng.percent_chance(proto.narg),
                &[
                    ("cmd", action.name().to_string()),
                    ("direction", dir.name().to_string()),
                    actor_var(actor),
                ],
            );
            if let Some(result) = fired {
                return result != 0;
            }
        }
        true
    }

    /// Hourly check for one mobile.
    pub fn time_mtrigger(&mut self, world: &mut dyn World, mob: Uid) {
        if !performs_scripts(&*world, mob) || !susceptible(&*world, mob) {
            return;
        }
        let hour = world.time().hours;
        self.fire_first(
            world,
            mob,
            mtrig::TIME,
            |proto, _| i64::from(proto.narg) == i64::from(hour),
            &[("time", hour.to_string())],
        );
    }
}
