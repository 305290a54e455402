//! Entity field catalogue.
//!
//! `%var.field[value]%` on a character, object or room reads one field of
//! the live entity. Relations come back as UIDs so they can be chained
//! through another variable; flag sets come back as space-separated names.

use crate::core::flags::{search_block, sprint_bits};
use crate::core::text::{atoi, is_number, isname};
use crate::core::{EntityRef, Uid};
use crate::world::entities::{
    EFFECT_FLAGS, EXIT_FLAGS, EXTRA_FLAGS, MOB_FLAGS, PLAYER_FLAGS, ROOM_EFFECTS, ROOM_FLAGS,
    WEAR_POSITIONS,
};
use crate::world::{Character, Direction, Object, ObjectLocation, Room, World};

use super::expr::flag;
use super::script_log;
use super::subst::SubstContext;

fn uid_or_empty(uid: Option<Uid>) -> String {
    uid.map(|u| u.to_string()).unwrap_or_default()
}

impl SubstContext<'_> {
    /// Read `field` from a resolved entity.
    pub(super) fn entity_field(
        &self,
        target: EntityRef,
        var: &str,
        field: &str,
        value: &str,
    ) -> String {
        let world = self.world;
        let name = field.to_ascii_lowercase();
        let result = match target {
            EntityRef::Character(handle) => world
                .character(handle)
                .map(|ch| self.char_field(ch, &name, value)),
            EntityRef::Object(handle) => world
                .object(handle)
                .map(|obj| self.obj_field(obj, &name, value)),
            EntityRef::Room(handle) => world
                .room(handle)
                .map(|room| self.room_field(room, &name, value)),
            EntityRef::None => None,
        };

        match result {
            Some(Some(text)) => text,
            Some(None) => {
                script_log(
                    self.trigger,
                    format_args!("unknown {} field '{field}'", target.kind_name()),
                );
                String::new()
            }
            None => {
                script_log(
                    self.trigger,
                    format_args!(
                        "attempt to access field '{field}' on previously extracted UID variable '{var}'"
                    ),
                );
                String::new()
            }
        }
    }

    fn flagged(&self, bits: u64, table: &[&str], value: &str) -> String {
        match search_block(value.trim(), table, false) {
            Some(bit) => flag(bits & (1 << bit) != 0),
            None => {
                script_log(self.trigger, format_args!("unrecognized flag '{value}'"));
                "0".to_string()
            }
        }
    }

    fn char_field(&self, ch: &Character, field: &str, value: &str) -> Option<String> {
        let world = self.world;
        let flag_names = if ch.is_npc() { MOB_FLAGS } else { PLAYER_FLAGS };

        if let Some(score) = ch.abilities.get(field) {
            return Some(score.to_string());
        }
        if let Some(score) = field
            .strip_prefix("real_")
            .and_then(|ability| ch.real_abilities.get(ability))
        {
            return Some(score.to_string());
        }

        let text = match field {
            "name" => ch.name.clone(),
            "alias" => ch.aliases.clone(),
            "title" => ch.title.clone(),
            "p" | "hisher" => ch.sex.his_her().to_string(),
            "o" | "himher" => ch.sex.him_her().to_string(),
            "n" | "heshe" => ch.sex.he_she().to_string(),
            "vnum" => ch.vnum.unwrap_or(-1).to_string(),
            "id" => ch.uid.raw().to_string(),
            "sex" | "gender" => ch.sex.name().to_string(),
            "class" => ch.class.clone(),
            "race" => ch.race.clone(),
            "level" => ch.level.to_string(),
            "weight" => ch.weight.to_string(),
            "height" => ch.height.to_string(),
            "size" => ch.size.clone(),
            "hit" => ch.hit.to_string(),
            "maxhit" => ch.max_hit.to_string(),
            "move" => ch.moves.to_string(),
            "maxmove" => ch.max_moves.to_string(),
            "armor" => ch.armor.to_string(),
            "hitroll" => ch.hitroll.to_string(),
            "damroll" => ch.damroll.to_string(),
            "exp" => ch.exp.to_string(),
            "align" | "alignment" => ch.alignment.to_string(),
            "platinum" => ch.coins.platinum.to_string(),
            "gold" => ch.coins.gold.to_string(),
            "silver" => ch.coins.silver.to_string(),
            "copper" => ch.coins.copper.to_string(),
            "flags" => sprint_bits(ch.flags, flag_names),
            "flagged" => self.flagged(ch.flags, flag_names, value),
            "eff_flags" | "aff_flags" => sprint_bits(ch.effect_flags, EFFECT_FLAGS),
            "eff_flagged" | "aff_flagged" => self.flagged(ch.effect_flags, EFFECT_FLAGS, value),
            "spells" => ch.spells.join(" "),
            "has_spell" => flag(ch.spells.iter().any(|s| s.eq_ignore_ascii_case(value.trim()))),
            "fighting" => uid_or_empty(ch.fighting),
            "hunting" => uid_or_empty(ch.hunting),
            "riding" => uid_or_empty(ch.riding),
            "ridden_by" => uid_or_empty(ch.ridden_by),
            "master" => uid_or_empty(ch.master),
            "next_in_room" => {
                let next = world.room_of(ch.uid).and_then(|room| {
                    let at = room.people.iter().position(|&uid| uid == ch.uid)?;
                    room.people.get(at + 1).copied()
                });
                uid_or_empty(next)
            }
            "group_size" => group_of(world, ch).len().to_string(),
            "group_member" => {
                let n = usize::try_from(atoi(value)).unwrap_or(0);
                let member = n.checked_sub(1).and_then(|i| group_of(world, ch).get(i).copied());
                uid_or_empty(member)
            }
            "inventory" => item_list_field(world, &ch.inventory, value),
            "worn" => worn_field(ch, value),
            "wearing" => {
                let vnum = atoi(value);
                flag(ch.equipment.values().any(|&uid| {
                    world
                        .object_by_uid(uid)
                        .is_some_and(|obj| i64::from(obj.vnum) == vnum)
                }))
            }
            "position" => ch.position.name().to_string(),
            "room" => uid_or_empty(world.room_of(ch.uid).map(|room| room.uid)),
            "skill" | "talent" => ch
                .skills
                .get(&value.trim().to_ascii_lowercase())
                .copied()
                .unwrap_or(0)
                .to_string(),
            "can_be_seen" => flag(world.can_see(self.owner, ch.uid)),
            _ => return None,
        };
        Some(text)
    }

    fn obj_field(&self, obj: &Object, field: &str, value: &str) -> Option<String> {
        let world = self.world;
        let text = match field {
            "name" => obj.aliases.clone(),
            "shortdesc" => obj.short_desc.clone(),
            "description" => obj.description.clone(),
            "vnum" => obj.vnum.to_string(),
            "type" => obj.item_type.clone(),
            "id" => obj.uid.raw().to_string(),
            "weight" => obj.weight.to_string(),
            "cost" => obj.cost.to_string(),
            "level" => obj.level.to_string(),
            "val0" => obj.values[0].to_string(),
            "val1" => obj.values[1].to_string(),
            "val2" => obj.values[2].to_string(),
            "val3" => obj.values[3].to_string(),
            "timer" => obj.timer.to_string(),
            "flags" => sprint_bits(obj.flags, EXTRA_FLAGS),
            "flagged" => self.flagged(obj.flags, EXTRA_FLAGS, value),
            "spells" => obj.spells.join(" "),
            "has_spell" => flag(obj.spells.iter().any(|s| s.eq_ignore_ascii_case(value.trim()))),
            "room" => uid_or_empty(world.room_of(obj.uid).map(|room| room.uid)),
            "carried_by" => match obj.location {
                ObjectLocation::Carried(holder) => holder.to_string(),
                _ => String::new(),
            },
            "worn_by" => match obj.location {
                ObjectLocation::Worn { by, .. } => by.to_string(),
                _ => String::new(),
            },
            "worn_on" => match obj.location {
                ObjectLocation::Worn { position, .. } => WEAR_POSITIONS
                    .get(position)
                    .copied()
                    .unwrap_or_default()
                    .to_string(),
                _ => String::new(),
            },
            "contents" => item_list_field(world, &obj.contents, value),
            _ => return None,
        };
        Some(text)
    }

    fn room_field(&self, room: &Room, field: &str, value: &str) -> Option<String> {
        let world = self.world;

        if let Some(dir) = Direction::from_name(field) {
            return exit_field(world, room, dir, value);
        }

        let text = match field {
            "name" => room.name.clone(),
            "vnum" => room.vnum.to_string(),
            "id" => room.uid.raw().to_string(),
            "sector" => room.sector.clone(),
            "is_dark" => flag(room.dark),
            "flags" => sprint_bits(room.flags, ROOM_FLAGS),
            "flagged" => self.flagged(room.flags, ROOM_FLAGS, value),
            "effects" => sprint_bits(room.effects, ROOM_EFFECTS),
            "has_effect" => self.flagged(room.effects, ROOM_EFFECTS, value),
            "people" => people_field(world, &room.people, value),
            "objects" => item_list_field(world, &room.contents, value),
            _ => return None,
        };
        Some(text)
    }
}

/// Members of the group `ch` belongs to, leader first.
fn group_of<'w>(world: &'w dyn World, ch: &'w Character) -> &'w [Uid] {
    if !ch.group.is_empty() {
        return &ch.group;
    }
    ch.master
        .and_then(|leader| world.character_by_uid(leader))
        .map(|leader| leader.group.as_slice())
        .unwrap_or_default()
}

/// `[""]` first item, `[count]`, `[<vnum>]` first with that vnum, `[<name>]`.
fn item_list_field(world: &dyn World, items: &[Uid], value: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        return uid_or_empty(items.first().copied());
    }
    if value.eq_ignore_ascii_case("count") {
        return items.len().to_string();
    }

    let found = items.iter().copied().find(|&uid| {
        world.object_by_uid(uid).is_some_and(|obj| {
            if is_number(value) {
                i64::from(obj.vnum) == atoi(value)
            } else {
                isname(value, &obj.aliases)
            }
        })
    });
    uid_or_empty(found)
}

/// `[""]` first person, `[count]`, `[<vnum>]` first mobile with that vnum.
fn people_field(world: &dyn World, people: &[Uid], value: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        return uid_or_empty(people.first().copied());
    }
    if value.eq_ignore_ascii_case("count") {
        return people.len().to_string();
    }

    let found = people.iter().copied().find(|&uid| {
        world.character_by_uid(uid).is_some_and(|ch| {
            if is_number(value) {
                ch.vnum.is_some_and(|v| i64::from(v) == atoi(value))
            } else {
                isname(value, &ch.aliases)
            }
        })
    });
    uid_or_empty(found)
}

/// `[count]`, `[<position name>]` or `[<position number>]`.
fn worn_field(ch: &Character, value: &str) -> String {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("count") {
        return ch.equipment.len().to_string();
    }
    let position = if is_number(value) {
        usize::try_from(atoi(value)).ok()
    } else {
        search_block(value, WEAR_POSITIONS, true)
    };
    uid_or_empty(position.and_then(|pos| ch.equipment.get(&pos).copied()))
}

fn exit_field(world: &dyn World, room: &Room, dir: Direction, value: &str) -> Option<String> {
    let Some(exit) = room.exit(dir) else {
        return Some(String::new());
    };
    let text = match value.trim().to_ascii_lowercase().as_str() {
        "" => exit.to_room.unwrap_or(-1).to_string(),
        "room" => uid_or_empty(
            exit.to_room
                .and_then(|vnum| world.room_by_vnum(vnum))
                .map(|target| target.uid),
        ),
        "key" => exit.key.unwrap_or(-1).to_string(),
        "bits" => sprint_bits(exit.flags, EXIT_FLAGS),
        _ => return None,
    };
    Some(text)
}
