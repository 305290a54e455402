//! The game world as seen by the scripting engine.
//!
//! The engine does not own characters, objects or rooms. The host game
//! implements [`World`] to let scripts look entities up, read their fields,
//! and run ordinary game commands.
//!
//! ## Design Philosophy
//!
//! `World` is the seam between the generic interpreter and the concrete
//! game. Everything a script can
//! observe flows through it as read-only [`Character`], [`Object`] and
//! [`Room`] records. The one thing a script can *do* is
//! [`World::execute`]: run one line of game-command text as its owner. The
//! world passes itself and the engine back into dispatch calls from
//! there, which is how a script's `say` wakes another mobile's speech
//! trigger.

pub mod entities;

pub use entities::{
    Abilities, Character, Coins, Direction, Exit, Object, ObjectLocation, Position, Room, Sex,
};

use serde::{Deserialize, Serialize};

use crate::core::{EntityRef, Handle, ScriptRng, Uid, Vnum};
use crate::engine::ScriptEngine;

/// Hours in a mud day.
pub const HOURS_PER_DAY: u32 = 24;
/// Days in a mud month.
pub const DAYS_PER_MONTH: u32 = 35;
/// Months in a mud year.
pub const MONTHS_PER_YEAR: u32 = 17;

/// Deepest object-in-object chain followed by [`World::room_of`].
const MAX_CONTAINER_NESTING: usize = 32;

/// In-game calendar time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameTime {
    pub hours: u32,
    pub day: u32,
    pub month: u32,
    pub year: u32,
}

impl GameTime {
    /// Hours elapsed since the start of year zero.
    #[must_use]
    pub fn stamp(&self) -> u64 {
        let days = (u64::from(self.year) * u64::from(MONTHS_PER_YEAR) + u64::from(self.month))
            * u64::from(DAYS_PER_MONTH)
            + u64::from(self.day);
        days * u64::from(HOURS_PER_DAY) + u64::from(self.hours)
    }
}

/// Summary of a mobile or object prototype.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PrototypeInfo {
    pub short_desc: String,
    /// Live instances in the world.
    pub count: usize,
}

/// Host game interface.
pub trait World {
    /// Resolve a UID to a live entity, or [`EntityRef::None`].
    fn resolve(&self, uid: Uid) -> EntityRef;

    fn character(&self, handle: Handle) -> Option<&Character>;

    fn object(&self, handle: Handle) -> Option<&Object>;

    fn room(&self, handle: Handle) -> Option<&Room>;

    fn room_by_vnum(&self, vnum: Vnum) -> Option<&Room>;

    /// Current game time.
    fn time(&self) -> GameTime;

    fn mobile_prototype(&self, vnum: Vnum) -> Option<PrototypeInfo>;

    fn object_prototype(&self, vnum: Vnum) -> Option<PrototypeInfo>;

    /// Run one line of game-command text as `actor`.
    ///
    /// The world is free to call back into `engine` (for example to fire
    /// speech triggers for a `say`).
    fn execute(&mut self, engine: &mut ScriptEngine, actor: Uid, command: &str);

    /// Visibility test used by `can_be_seen` and `random.char`.
    fn can_see(&self, _viewer: Uid, _target: Uid) -> bool {
        true
    }

    /// Whether any player is in the zone. Random and time triggers skip
    /// inactive zones unless flagged global.
    fn zone_is_active(&self, _zone: u32) -> bool {
        true
    }

    /// Pick a random room, optionally restricted to one zone.
    fn random_room(&self, _rng: &mut ScriptRng, _zone: Option<u32>) -> Option<Uid> {
        None
    }

    /// Find an entity by keyword, searching outward from `near`.
    fn find_by_name(&self, _near: Uid, _name: &str) -> EntityRef {
        EntityRef::None
    }

    // === Convenience Methods ===

    fn character_by_uid(&self, uid: Uid) -> Option<&Character> {
        match self.resolve(uid) {
            EntityRef::Character(handle) => self.character(handle),
            _ => None,
        }
    }

    fn object_by_uid(&self, uid: Uid) -> Option<&Object> {
        match self.resolve(uid) {
            EntityRef::Object(handle) => self.object(handle),
            _ => None,
        }
    }

    fn room_by_uid(&self, uid: Uid) -> Option<&Room> {
        match self.resolve(uid) {
            EntityRef::Room(handle) => self.room(handle),
            _ => None,
        }
    }

    /// The room an entity is in. Objects follow their carrier or container.
    fn room_of(&self, uid: Uid) -> Option<&Room> {
        let mut current = uid;
        for _ in 0..MAX_CONTAINER_NESTING {
            match self.resolve(current) {
                EntityRef::Room(handle) => return self.room(handle),
                EntityRef::Character(handle) => {
                    return self.character(handle)?.in_room.and_then(|r| self.room_by_uid(r))
                }
                EntityRef::Object(handle) => {
                    current = match self.object(handle)?.location {
                        ObjectLocation::Room(room) => room,
                        ObjectLocation::Carried(holder) => holder,
                        ObjectLocation::Worn { by, .. } => by,
                        ObjectLocation::Inside(container) => container,
                        ObjectLocation::Nowhere => return None,
                    };
                }
                EntityRef::None => return None,
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_stamp() {
        let t = GameTime {
            hours: 5,
            day: 1,
            month: 0,
            year: 0,
        };
        assert_eq!(t.stamp(), 29);

        let later = GameTime { year: 1, ..t };
        assert_eq!(
            later.stamp() - t.stamp(),
            u64::from(MONTHS_PER_YEAR * DAYS_PER_MONTH * HOURS_PER_DAY)
        );
    }
}
