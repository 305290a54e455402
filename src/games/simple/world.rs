//! In-memory world implementation.

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::core::text::{isname, split_word};
use crate::core::{Arena, EntityRef, Handle, ScriptRng, Uid, Vnum, FIRST_MOBILE_ID};
use crate::engine::ScriptEngine;
use crate::world::{
    Character, Direction, Exit, GameTime, Object, ObjectLocation, Position, PrototypeInfo, Room,
    World,
};

/// A small world held entirely in memory.
///
/// Rooms, characters and objects live in generational arenas. Every
/// command a script runs through [`World::execute`] is interpreted here,
/// and anything visible it produces is appended to [`messages`].
///
/// [`messages`]: SimpleWorld::messages
#[derive(Clone, Debug)]
pub struct SimpleWorld {
    characters: Arena<Character>,
    objects: Arena<Object>,
    rooms: Arena<Room>,
    index: FxHashMap<Uid, EntityRef>,
    room_vnums: FxHashMap<Vnum, Uid>,
    /// Short descriptions by prototype vnum.
    mobile_protos: FxHashMap<Vnum, String>,
    object_protos: FxHashMap<Vnum, String>,
    next_uid: u64,
    next_room: u32,
    time: GameTime,
    messages: Vec<String>,
}

impl Default for SimpleWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl SimpleWorld {
    /// Create an empty world at hour zero of day one.
    #[must_use]
    pub fn new() -> Self {
        Self {
            characters: Arena::new(),
            objects: Arena::new(),
            rooms: Arena::new(),
            index: FxHashMap::default(),
            room_vnums: FxHashMap::default(),
            mobile_protos: FxHashMap::default(),
            object_protos: FxHashMap::default(),
            next_uid: FIRST_MOBILE_ID,
            next_room: 0,
            time: GameTime::default(),
            messages: Vec::new(),
        }
    }

    fn allocate_uid(&mut self) -> Uid {
        let uid = Uid::new(self.next_uid);
        self.next_uid += 1;
        uid
    }

    // === Building ===

    /// Add a room. Its zone is `vnum / 100`.
    pub fn add_room(&mut self, vnum: Vnum, name: &str) -> Uid {
        let uid = Uid::room(self.next_room);
        self.next_room += 1;
        let handle = self.rooms.insert(Room {
            uid,
            vnum,
            zone: u32::try_from(vnum / 100).unwrap_or(0),
            name: name.to_string(),
            ..Room::default()
        });
        self.index.insert(uid, EntityRef::Room(handle));
        self.room_vnums.insert(vnum, uid);
        uid
    }

    /// Connect `from` to `to` heading `dir`, and `to` back to `from`.
    pub fn link(&mut self, from: Uid, dir: Direction, to: Uid) {
        let (Some(from_vnum), Some(to_vnum)) = (
            self.room_by_uid(from).map(|r| r.vnum),
            self.room_by_uid(to).map(|r| r.vnum),
        ) else {
            return;
        };
        if let Some(room) = self.room_mut(from) {
            room.exits[dir.index()] = Some(Exit {
                to_room: Some(to_vnum),
                ..Exit::default()
            });
        }
        if let Some(room) = self.room_mut(to) {
            room.exits[dir.reverse().index()] = Some(Exit {
                to_room: Some(from_vnum),
                ..Exit::default()
            });
        }
    }

    /// Add a player character to `room`.
    pub fn add_player(&mut self, name: &str, room: Uid) -> Uid {
        self.add_character(None, name, room)
    }

    /// Add a mobile of prototype `vnum` to `room`. The first mobile of a
    /// prototype defines its short description.
    pub fn add_mobile(&mut self, vnum: Vnum, name: &str, room: Uid) -> Uid {
        self.mobile_protos
            .entry(vnum)
            .or_insert_with(|| name.to_string());
        self.add_character(Some(vnum), name, room)
    }

    fn add_character(&mut self, vnum: Option<Vnum>, name: &str, room: Uid) -> Uid {
        let uid = self.allocate_uid();
        let handle = self.characters.insert(Character {
            uid,
            vnum,
            aliases: name.to_lowercase(),
            name: name.to_string(),
            level: 1,
            hit: 20,
            max_hit: 20,
            moves: 50,
            max_moves: 50,
            position: Position::Standing,
            ..Character::default()
        });
        self.index.insert(uid, EntityRef::Character(handle));
        self.place_character(uid, room);
        uid
    }

    /// Add an object of prototype `vnum` at `location`.
    pub fn add_object(&mut self, vnum: Vnum, name: &str, location: ObjectLocation) -> Uid {
        self.object_protos
            .entry(vnum)
            .or_insert_with(|| name.to_string());
        let uid = self.allocate_uid();
        let handle = self.objects.insert(Object {
            uid,
            vnum,
            aliases: split_word(name).1.to_lowercase(),
            short_desc: name.to_string(),
            ..Object::default()
        });
        self.index.insert(uid, EntityRef::Object(handle));
        self.place_object(uid, location);
        uid
    }

    // === Mutation ===

    pub fn character_mut(&mut self, uid: Uid) -> Option<&mut Character> {
        match self.index.get(&uid) {
            Some(&EntityRef::Character(handle)) => self.characters.get_mut(handle),
            _ => None,
        }
    }

    pub fn object_mut(&mut self, uid: Uid) -> Option<&mut Object> {
        match self.index.get(&uid) {
            Some(&EntityRef::Object(handle)) => self.objects.get_mut(handle),
            _ => None,
        }
    }

    pub fn room_mut(&mut self, uid: Uid) -> Option<&mut Room> {
        match self.index.get(&uid) {
            Some(&EntityRef::Room(handle)) => self.rooms.get_mut(handle),
            _ => None,
        }
    }

    /// Set the current hour of the game clock.
    pub fn set_hour(&mut self, hour: u32) {
        self.time.hours = hour % crate::world::HOURS_PER_DAY;
    }

    pub fn set_time(&mut self, time: GameTime) {
        self.time = time;
    }

    /// Move a character into `room` without firing any trigger.
    pub fn place_character(&mut self, uid: Uid, room: Uid) {
        let Some(old) = self.character_by_uid(uid).map(|ch| ch.in_room) else {
            return;
        };
        if let Some(old) = old.and_then(|old| self.room_mut(old)) {
            old.people.retain(|&p| p != uid);
        }
        if let Some(new) = self.room_mut(room) {
            new.people.push(uid);
        }
        if let Some(ch) = self.character_mut(uid) {
            ch.in_room = Some(room);
        }
    }

    /// Move an object to `location` without firing any trigger.
    pub fn place_object(&mut self, uid: Uid, location: ObjectLocation) {
        let Some(old) = self.object_by_uid(uid).map(|obj| obj.location) else {
            return;
        };
        self.unlink_object(uid, old);
        match location {
            ObjectLocation::Room(room) => {
                if let Some(room) = self.room_mut(room) {
                    room.contents.push(uid);
                }
            }
            ObjectLocation::Carried(holder) => {
                if let Some(ch) = self.character_mut(holder) {
                    ch.inventory.push(uid);
                }
            }
            ObjectLocation::Worn { by, position } => {
                if let Some(ch) = self.character_mut(by) {
                    ch.equipment.insert(position, uid);
                }
            }
            ObjectLocation::Inside(container) => {
                if let Some(container) = self.object_mut(container) {
                    container.contents.push(uid);
                }
            }
            ObjectLocation::Nowhere => {}
        }
        if let Some(obj) = self.object_mut(uid) {
            obj.location = location;
        }
    }

    fn unlink_object(&mut self, uid: Uid, location: ObjectLocation) {
        match location {
            ObjectLocation::Room(room) => {
                if let Some(room) = self.room_mut(room) {
                    room.contents.retain(|&o| o != uid);
                }
            }
            ObjectLocation::Carried(holder) => {
                if let Some(ch) = self.character_mut(holder) {
                    ch.inventory.retain(|&o| o != uid);
                }
            }
            ObjectLocation::Worn { by, position } => {
                if let Some(ch) = self.character_mut(by) {
                    ch.equipment.remove(&position);
                }
            }
            ObjectLocation::Inside(container) => {
                if let Some(container) = self.object_mut(container) {
                    container.contents.retain(|&o| o != uid);
                }
            }
            ObjectLocation::Nowhere => {}
        }
    }

    /// Remove an entity and everything it carries or contains from the
    /// world. Returns the UIDs that were removed.
    pub fn extract(&mut self, uid: Uid) -> Vec<Uid> {
        let mut removed = Vec::new();
        self.extract_into(uid, &mut removed);
        removed
    }

    fn extract_into(&mut self, uid: Uid, removed: &mut Vec<Uid>) {
        match self.index.get(&uid).copied() {
            Some(EntityRef::Character(handle)) => {
                let Some(ch) = self.characters.get(handle) else {
                    return;
                };
                let carried: Vec<Uid> = ch
                    .inventory
                    .iter()
                    .chain(ch.equipment.values())
                    .copied()
                    .collect();
                let room = ch.in_room;
                for obj in carried {
                    self.extract_into(obj, removed);
                }
                if let Some(room) = room.and_then(|r| self.room_mut(r)) {
                    room.people.retain(|&p| p != uid);
                }
                self.characters.remove(handle);
            }
            Some(EntityRef::Object(handle)) => {
                let Some(obj) = self.objects.get(handle) else {
                    return;
                };
                let contents = obj.contents.clone();
                let location = obj.location;
                for inner in contents {
                    self.extract_into(inner, removed);
                }
                self.unlink_object(uid, location);
                self.objects.remove(handle);
            }
            _ => return,
        }
        self.index.remove(&uid);
        removed.push(uid);
    }

    /// Extract an entity and tell the engine to forget it and everything
    /// it carried.
    pub fn purge(&mut self, engine: &mut ScriptEngine, uid: Uid) {
        for gone in self.extract(uid) {
            engine.extract_entity(gone);
        }
    }

    // === Messages ===

    /// Every line produced so far, oldest first.
    #[must_use]
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn clear_messages(&mut self) {
        self.messages.clear();
    }

    // === Game Actions ===

    /// Handle a line typed by `actor`: command triggers get the first
    /// chance to consume it, then it runs as an ordinary command.
    pub fn interpret(&mut self, engine: &mut ScriptEngine, actor: Uid, line: &str) {
        let (cmd, arg) = split_word(line.trim());
        if cmd.is_empty() {
            return;
        }
        if engine.command_wtrigger(self, actor, cmd, arg)
            || engine.command_mtrigger(self, actor, cmd, arg)
            || engine.command_otrigger(self, actor, cmd, arg)
        {
            return;
        }
        self.execute(engine, actor, line);
    }

    /// Walk `actor` through the exit toward `dir`, running leave, entry
    /// and greet triggers on the way. Returns true if the actor moved.
    pub fn walk(&mut self, engine: &mut ScriptEngine, actor: Uid, dir: Direction) -> bool {
        let Some((from, to_vnum)) = self
            .room_of(actor)
            .and_then(|room| Some((room.uid, room.exit(dir)?.to_room?)))
        else {
            return false;
        };
        let Some(to) = self.room_vnums.get(&to_vnum).copied() else {
            return false;
        };

        let still_here = |world: &Self| world.character_by_uid(actor).and_then(|ch| ch.in_room) == Some(from);
        if !engine.leave_mtrigger(self, actor, Some(dir)) || !still_here(self) {
            return false;
        }
        if !engine.leave_wtrigger(self, from, actor, dir) || !still_here(self) {
            return false;
        }
        if !engine.leave_otrigger(self, from, actor, Some(dir)) || !still_here(self) {
            return false;
        }
        if !engine.entry_mtrigger(self, actor, to_vnum) {
            return false;
        }
        if !engine.preentry_wtrigger(self, to, actor, dir) {
            return false;
        }

        self.place_character(actor, to);
        if !engine.greet_mtrigger(self, actor, dir) {
            if self.character_by_uid(actor).is_some() {
                self.place_character(actor, from);
            }
            return false;
        }
        let _ = engine.postentry_wtrigger(self, actor, dir);
        true
    }

    // === Commands ===

    fn display_name(&self, uid: Uid) -> String {
        match self.resolve(uid) {
            EntityRef::Character(h) => self.characters.get(h).map(|c| c.name.clone()),
            EntityRef::Object(h) => self.objects.get(h).map(|o| o.short_desc.clone()),
            EntityRef::Room(h) => self.rooms.get(h).map(|r| r.name.clone()),
            EntityRef::None => None,
        }
        .unwrap_or_default()
    }

    /// A UID, or a keyword searched for near `near`.
    fn lookup(&self, near: Uid, text: &str) -> Option<Uid> {
        if let Some(uid) = Uid::parse(text) {
            return self.index.contains_key(&uid).then_some(uid);
        }
        match self.find_by_name(near, text) {
            EntityRef::Character(h) => self.characters.get(h).map(|c| c.uid),
            EntityRef::Object(h) => self.objects.get(h).map(|o| o.uid),
            EntityRef::Room(h) => self.rooms.get(h).map(|r| r.uid),
            EntityRef::None => None,
        }
    }

    fn do_say(&mut self, engine: &mut ScriptEngine, actor: Uid, text: &str) {
        let name = self.display_name(actor);
        self.messages.push(format!("{name} says, '{text}'"));
        engine.speech_mtrigger(self, actor, text);
        engine.speech_wtrigger(self, actor, text);
    }

    /// `purge` with no argument clears every mobile and object from the
    /// actor's room, sparing players and the actor itself.
    fn do_purge(&mut self, engine: &mut ScriptEngine, actor: Uid, arg: &str) {
        let targets: Vec<Uid> = if arg.is_empty() {
            let Some(room) = self.room_of(actor) else {
                return;
            };
            room.people
                .iter()
                .chain(&room.contents)
                .copied()
                .filter(|&uid| uid != actor)
                .filter(|&uid| self.character_by_uid(uid).map_or(true, Character::is_npc))
                .collect()
        } else {
            match self.lookup(actor, arg) {
                Some(uid) if !uid.is_room_range() => vec![uid],
                _ => {
                    debug!(target: "world", arg, "purge target not found");
                    return;
                }
            }
        };
        for uid in targets {
            if self.character_by_uid(uid).is_some_and(|ch| !ch.is_npc()) {
                continue;
            }
            self.purge(engine, uid);
        }
    }

    fn do_attach(&mut self, engine: &mut ScriptEngine, actor: Uid, arg: &str) {
        let (vnum, target) = split_word(arg);
        let Ok(vnum) = vnum.parse::<Vnum>() else {
            debug!(target: "world", arg, "attach needs a trigger vnum");
            return;
        };
        let Some(target) = self.lookup(actor, target) else {
            debug!(target: "world", arg, "attach target not found");
            return;
        };
        if let Err(err) = engine.attach(&*self, vnum, target, None) {
            debug!(target: "world", %err, "attach failed");
        }
    }

    fn do_detach(&mut self, engine: &mut ScriptEngine, actor: Uid, arg: &str) {
        let (target, spec) = split_word(arg);
        let Some(target) = self.lookup(actor, target) else {
            debug!(target: "world", arg, "detach target not found");
            return;
        };
        if spec.eq_ignore_ascii_case("all") {
            engine.detach_all(target);
        } else {
            engine.detach(target, spec);
        }
    }

    fn do_goto(&mut self, actor: Uid, arg: &str) {
        let destination = arg
            .trim()
            .parse::<Vnum>()
            .ok()
            .and_then(|vnum| self.room_vnums.get(&vnum).copied())
            .or_else(|| Uid::parse(arg).filter(|uid| self.room_by_uid(*uid).is_some()));
        match destination {
            Some(room) => self.place_character(actor, room),
            None => debug!(target: "world", arg, "goto destination not found"),
        }
    }
}

impl World for SimpleWorld {
    fn resolve(&self, uid: Uid) -> EntityRef {
        self.index.get(&uid).copied().unwrap_or_default()
    }

    fn character(&self, handle: Handle) -> Option<&Character> {
        self.characters.get(handle)
    }

    fn object(&self, handle: Handle) -> Option<&Object> {
        self.objects.get(handle)
    }

    fn room(&self, handle: Handle) -> Option<&Room> {
        self.rooms.get(handle)
    }

    fn room_by_vnum(&self, vnum: Vnum) -> Option<&Room> {
        self.room_vnums
            .get(&vnum)
            .and_then(|&uid| self.room_by_uid(uid))
    }

    fn time(&self) -> GameTime {
        self.time
    }

    fn mobile_prototype(&self, vnum: Vnum) -> Option<PrototypeInfo> {
        let short_desc = self.mobile_protos.get(&vnum)?.clone();
        let count = self
            .characters
            .iter()
            .filter(|(_, ch)| ch.vnum == Some(vnum))
            .count();
        Some(PrototypeInfo { short_desc, count })
    }

    fn object_prototype(&self, vnum: Vnum) -> Option<PrototypeInfo> {
        let short_desc = self.object_protos.get(&vnum)?.clone();
        let count = self
            .objects
            .iter()
            .filter(|(_, obj)| obj.vnum == vnum)
            .count();
        Some(PrototypeInfo { short_desc, count })
    }

    fn execute(&mut self, engine: &mut ScriptEngine, actor: Uid, command: &str) {
        let (cmd, arg) = split_word(command.trim_start());
        match cmd.to_ascii_lowercase().as_str() {
            "echo" => self.messages.push(arg.to_string()),
            "emote" => {
                let name = self.display_name(actor);
                self.messages.push(format!("{name} {arg}"));
            }
            "say" => self.do_say(engine, actor, arg),
            "purge" => self.do_purge(engine, actor, arg),
            "attach" => self.do_attach(engine, actor, arg),
            "detach" => self.do_detach(engine, actor, arg),
            "goto" => self.do_goto(actor, arg),
            "" => {}
            _ => debug!(target: "world", actor = actor.raw(), command, "unknown command"),
        }
    }

    /// Invisible characters are seen only by viewers of at least their
    /// invisibility level.
    fn can_see(&self, viewer: Uid, target: Uid) -> bool {
        let level = self.character_by_uid(viewer).map_or(0, |ch| ch.level);
        self.character_by_uid(target)
            .map_or(true, |ch| ch.invis_level <= level)
    }

    /// A zone is active while a player is in it.
    fn zone_is_active(&self, zone: u32) -> bool {
        self.characters.iter().any(|(_, ch)| {
            !ch.is_npc()
                && ch
                    .in_room
                    .and_then(|room| self.room_by_uid(room))
                    .is_some_and(|room| room.zone == zone)
        })
    }

    fn random_room(&self, rng: &mut ScriptRng, zone: Option<u32>) -> Option<Uid> {
        let mut rooms: Vec<Uid> = self
            .rooms
            .iter()
            .map(|(_, room)| room)
            .filter(|room| zone.map_or(true, |zone| room.zone == zone))
            .map(|room| room.uid)
            .collect();
        rooms.sort_unstable();
        rng.choose(&rooms).copied()
    }

    /// Search the room around `near`, then what `near` carries, then the
    /// whole world.
    fn find_by_name(&self, near: Uid, name: &str) -> EntityRef {
        let name = name.trim();
        let here = self.room_of(near);

        let people = here.map(|room| room.people.as_slice()).unwrap_or_default();
        if let Some(&uid) = people
            .iter()
            .find(|&&uid| self.character_by_uid(uid).is_some_and(|ch| isname(name, &ch.aliases)))
        {
            return self.resolve(uid);
        }

        let carried = self
            .character_by_uid(near)
            .map(|ch| ch.inventory.as_slice())
            .unwrap_or_default();
        let floor = here.map(|room| room.contents.as_slice()).unwrap_or_default();
        if let Some(&uid) = carried
            .iter()
            .chain(floor)
            .find(|&&uid| self.object_by_uid(uid).is_some_and(|obj| isname(name, &obj.aliases)))
        {
            return self.resolve(uid);
        }

        let character = self
            .characters
            .iter()
            .filter(|(_, ch)| isname(name, &ch.aliases))
            .min_by_key(|(_, ch)| ch.uid)
            .map(|(handle, _)| EntityRef::Character(handle));
        let object = || {
            self.objects
                .iter()
                .filter(|(_, obj)| isname(name, &obj.aliases))
                .min_by_key(|(_, obj)| obj.uid)
                .map(|(handle, _)| EntityRef::Object(handle))
        };
        character.or_else(object).unwrap_or_default()
    }
}
