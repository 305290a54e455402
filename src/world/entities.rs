//! Read-only entity records consumed by the field catalogue.
//!
//! The host game owns its characters, objects and rooms. It exposes them to
//! the scripting engine as these plain records, and the engine only ever
//! reads them. Relations (who is fighting whom, where an object lies) are
//! stored as [`Uid`]s so a destroyed target simply stops resolving.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::core::{Uid, Vnum};

/// Names for mobile flag bits.
pub const MOB_FLAGS: &[&str] = &[
    "SPEC", "SENTINEL", "SCAVENGER", "ISNPC", "AWARE", "AGGRESSIVE", "STAY-ZONE", "WIMPY",
    "AGGR_EVIL", "AGGR_GOOD", "AGGR_NEUTRAL", "MEMORY", "HELPER", "NOCHARM", "NOSUMMON",
    "NOSLEEP", "NOBASH", "NOBLIND", "NOSCRIPT",
];

/// Mobile flag: this mobile never runs scripts.
pub const MOB_NOSCRIPT: u64 = 1 << 18;

/// Names for player flag bits.
pub const PLAYER_FLAGS: &[&str] = &[
    "KILLER", "THIEF", "FROZEN", "DONTSET", "WRITING", "MAILING", "CSH", "SITEOK", "NOSHOUT",
    "NOTITLE", "DELETED", "LOADRM", "NO_WIZL", "NO_DEL", "INVST", "CRYO",
];

/// Names for character effect bits.
pub const EFFECT_FLAGS: &[&str] = &[
    "BLIND", "INVIS", "DET-ALIGN", "DET-INVIS", "DET-MAGIC", "SENSE-LIFE", "WATWALK", "SANCT",
    "GROUP", "CURSE", "INFRA", "POISON", "PROT-EVIL", "PROT-GOOD", "SLEEP", "NO_TRACK",
    "FLY", "UNUSED", "SNEAK", "HIDE", "UNUSED", "CHARM",
];

/// Names for object extra flag bits.
pub const EXTRA_FLAGS: &[&str] = &[
    "GLOW", "HUM", "NO_RENT", "NO_DONATE", "NO_INVIS", "INVISIBLE", "MAGIC", "NO_DROP",
    "BLESS", "ANTI_GOOD", "ANTI_EVIL", "ANTI_NEUTRAL", "ANTI_MAGE", "ANTI_CLERIC",
    "ANTI_THIEF", "ANTI_WARRIOR", "NO_SELL",
];

/// Names for room flag bits.
pub const ROOM_FLAGS: &[&str] = &[
    "DARK", "DEATH", "NO_MOB", "INDOORS", "PEACEFUL", "SOUNDPROOF", "NO_TRACK", "NO_MAGIC",
    "TUNNEL", "PRIVATE", "GODROOM", "HOUSE", "HCRSH", "ATRIUM", "OLC", "*",
];

/// Names for room effect bits.
pub const ROOM_EFFECTS: &[&str] = &["FOG", "DARKNESS", "CONT_LIGHT", "FOREST", "CIRCLE_FIRE"];

/// Names for exit bits.
pub const EXIT_FLAGS: &[&str] = &["DOOR", "CLOSED", "LOCKED", "PICKPROOF", "HIDDEN"];

/// Names of equipment positions, indexed by position number.
pub const WEAR_POSITIONS: &[&str] = &[
    "light", "rfinger", "lfinger", "neck1", "neck2", "body", "head", "legs", "feet", "hands",
    "arms", "shield", "about", "waist", "rwrist", "lwrist", "wield", "hold",
];

/// Compass directions, in exit-table order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    East,
    South,
    West,
    Up,
    Down,
}

impl Direction {
    /// All directions in exit-table order.
    pub const ALL: [Direction; 6] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
        Direction::Up,
        Direction::Down,
    ];

    /// Lower-case name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Direction::North => "north",
            Direction::East => "east",
            Direction::South => "south",
            Direction::West => "west",
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }

    /// The direction leading back.
    #[must_use]
    pub const fn reverse(self) -> Self {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }

    /// Look a direction up by exact name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.name().eq_ignore_ascii_case(name))
    }

    /// Position in the exit table.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Character sex, with the pronoun sets scripts ask for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
    #[default]
    Neutral,
    Male,
    Female,
}

impl Sex {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Sex::Neutral => "neutral",
            Sex::Male => "male",
            Sex::Female => "female",
        }
    }

    #[must_use]
    pub const fn his_her(self) -> &'static str {
        match self {
            Sex::Neutral => "its",
            Sex::Male => "his",
            Sex::Female => "her",
        }
    }

    #[must_use]
    pub const fn him_her(self) -> &'static str {
        match self {
            Sex::Neutral => "it",
            Sex::Male => "him",
            Sex::Female => "her",
        }
    }

    #[must_use]
    pub const fn he_she(self) -> &'static str {
        match self {
            Sex::Neutral => "it",
            Sex::Male => "he",
            Sex::Female => "she",
        }
    }
}

/// Character posture.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Position {
    Dead,
    MortallyWounded,
    Incapacitated,
    Stunned,
    Sleeping,
    Resting,
    Sitting,
    Fighting,
    #[default]
    Standing,
}

impl Position {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Position::Dead => "dead",
            Position::MortallyWounded => "mortally wounded",
            Position::Incapacitated => "incapacitated",
            Position::Stunned => "stunned",
            Position::Sleeping => "sleeping",
            Position::Resting => "resting",
            Position::Sitting => "sitting",
            Position::Fighting => "fighting",
            Position::Standing => "standing",
        }
    }

    /// Anything above sleeping counts as awake.
    #[must_use]
    pub fn is_awake(self) -> bool {
        self > Position::Sleeping
    }
}

/// The six ability scores.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Abilities {
    pub str: i32,
    pub int: i32,
    pub wis: i32,
    pub dex: i32,
    pub con: i32,
    pub cha: i32,
}

impl Abilities {
    /// Look a score up by its short name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<i32> {
        match name {
            "str" => Some(self.str),
            "int" => Some(self.int),
            "wis" => Some(self.wis),
            "dex" => Some(self.dex),
            "con" => Some(self.con),
            "cha" => Some(self.cha),
            _ => None,
        }
    }
}

/// Money in four denominations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coins {
    pub platinum: i64,
    pub gold: i64,
    pub silver: i64,
    pub copper: i64,
}

impl Coins {
    /// Create a purse.
    #[must_use]
    pub const fn new(platinum: i64, gold: i64, silver: i64, copper: i64) -> Self {
        Self {
            platinum,
            gold,
            silver,
            copper,
        }
    }

    /// Total value in copper.
    #[must_use]
    pub const fn value(&self) -> i64 {
        self.platinum * 1000 + self.gold * 100 + self.silver * 10 + self.copper
    }
}

/// A player or mobile.
#[derive(Clone, Debug, Default)]
pub struct Character {
    pub uid: Uid,
    /// Prototype vnum. `None` for players.
    pub vnum: Option<Vnum>,
    /// Keyword list used for name matching.
    pub aliases: String,
    /// Display name ("the town guard" or a player's name).
    pub name: String,
    pub title: String,
    pub sex: Sex,
    pub class: String,
    pub race: String,
    pub level: i32,
    pub weight: i32,
    pub height: i32,
    pub size: String,
    pub abilities: Abilities,
    pub real_abilities: Abilities,
    pub hit: i32,
    pub max_hit: i32,
    pub moves: i32,
    pub max_moves: i32,
    pub armor: i32,
    pub hitroll: i32,
    pub damroll: i32,
    pub exp: i64,
    pub alignment: i32,
    pub coins: Coins,
    /// Mobile flags for NPCs, player flags otherwise.
    pub flags: u64,
    pub effect_flags: u64,
    pub spells: Vec<String>,
    pub skills: FxHashMap<String, i32>,
    pub position: Position,
    pub casting: bool,
    pub invis_level: i32,
    pub in_room: Option<Uid>,
    pub fighting: Option<Uid>,
    pub hunting: Option<Uid>,
    pub riding: Option<Uid>,
    pub ridden_by: Option<Uid>,
    pub master: Option<Uid>,
    /// Group members, leader included, when this character leads a group.
    pub group: Vec<Uid>,
    pub inventory: Vec<Uid>,
    /// Worn items by position number.
    pub equipment: BTreeMap<usize, Uid>,
}

impl Character {
    #[must_use]
    pub fn is_npc(&self) -> bool {
        self.vnum.is_some()
    }

    /// NPCs run scripts unless flagged otherwise.
    #[must_use]
    pub fn performs_scripts(&self) -> bool {
        self.is_npc() && self.flags & MOB_NOSCRIPT == 0
    }

    /// Events caused by this character may fire triggers.
    #[must_use]
    pub fn susceptible_to_triggers(&self) -> bool {
        self.invis_level == 0
    }

    #[must_use]
    pub fn is_awake(&self) -> bool {
        self.position.is_awake()
    }
}

/// Where an object currently is.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectLocation {
    #[default]
    Nowhere,
    Room(Uid),
    Carried(Uid),
    Worn { by: Uid, position: usize },
    Inside(Uid),
}

/// An item.
#[derive(Clone, Debug, Default)]
pub struct Object {
    pub uid: Uid,
    pub vnum: Vnum,
    pub aliases: String,
    pub short_desc: String,
    pub description: String,
    pub item_type: String,
    pub weight: i32,
    pub cost: i32,
    pub level: i32,
    pub values: [i32; 4],
    pub timer: i32,
    pub flags: u64,
    pub spells: Vec<String>,
    pub location: ObjectLocation,
    pub contents: Vec<Uid>,
}

/// One exit of a room.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exit {
    pub to_room: Option<Vnum>,
    /// Key object vnum, if the door locks.
    pub key: Option<Vnum>,
    pub flags: u64,
}

/// A room.
#[derive(Clone, Debug, Default)]
pub struct Room {
    pub uid: Uid,
    pub vnum: Vnum,
    pub zone: u32,
    pub name: String,
    pub sector: String,
    pub dark: bool,
    pub flags: u64,
    pub effects: u64,
    pub exits: [Option<Exit>; 6],
    pub people: Vec<Uid>,
    pub contents: Vec<Uid>,
}

impl Room {
    /// The exit in a direction, if any.
    #[must_use]
    pub fn exit(&self, dir: Direction) -> Option<&Exit> {
        self.exits[dir.index()].as_ref()
    }
}
