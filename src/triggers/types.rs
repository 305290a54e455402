//! Attach kinds and trigger-type bits.
//!
//! Each attach kind has its own set of event bits. The same bit number means
//! different things for mobiles, objects and rooms (bit 3 is Speech on a
//! mobile but Attack on an object), so masks are only meaningful together
//! with their [`AttachKind`].

use std::ops::{BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};

/// What kind of entity a trigger attaches to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttachKind {
    Mobile,
    Object,
    Room,
}

impl AttachKind {
    /// Decode the numeric attach type used in definition files.
    #[must_use]
    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(AttachKind::Mobile),
            1 => Some(AttachKind::Object),
            2 => Some(AttachKind::Room),
            _ => None,
        }
    }

    /// Numeric attach type used in definition files.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            AttachKind::Mobile => 0,
            AttachKind::Object => 1,
            AttachKind::Room => 2,
        }
    }

    /// Display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            AttachKind::Mobile => "Mobile",
            AttachKind::Object => "Object",
            AttachKind::Room => "Room",
        }
    }

    /// Decode the admin-command keyword (`mtr`, `otr`, `wtr`).
    #[must_use]
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word.to_ascii_lowercase().as_str() {
            "mtr" | "mob" | "mobile" => Some(AttachKind::Mobile),
            "otr" | "obj" | "object" => Some(AttachKind::Object),
            "wtr" | "room" | "world" => Some(AttachKind::Room),
            _ => None,
        }
    }

    /// Names of the trigger-type bits for this kind.
    #[must_use]
    pub const fn type_names(self) -> &'static [&'static str] {
        match self {
            AttachKind::Mobile => MTRIG_NAMES,
            AttachKind::Object => OTRIG_NAMES,
            AttachKind::Room => WTRIG_NAMES,
        }
    }
}

impl std::fmt::Display for AttachKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A set of trigger-type bits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TriggerFlags(pub u64);

impl TriggerFlags {
    /// No bits set.
    pub const EMPTY: Self = Self(0);

    /// Create from raw bits.
    #[must_use]
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    /// Single bit.
    #[must_use]
    pub const fn bit(n: u32) -> Self {
        Self(1 << n)
    }

    #[must_use]
    pub const fn bits(self) -> u64 {
        self.0
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True if any bit of `other` is set.
    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// True if every bit of `other` is set.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for TriggerFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for TriggerFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Mobile trigger types.
pub mod mtrig {
    use super::TriggerFlags;

    pub const GLOBAL: TriggerFlags = TriggerFlags::bit(0);
    pub const RANDOM: TriggerFlags = TriggerFlags::bit(1);
    pub const COMMAND: TriggerFlags = TriggerFlags::bit(2);
    pub const SPEECH: TriggerFlags = TriggerFlags::bit(3);
    pub const ACT: TriggerFlags = TriggerFlags::bit(4);
    pub const DEATH: TriggerFlags = TriggerFlags::bit(5);
    pub const GREET: TriggerFlags = TriggerFlags::bit(6);
    pub const GREET_ALL: TriggerFlags = TriggerFlags::bit(7);
    pub const ENTRY: TriggerFlags = TriggerFlags::bit(8);
    pub const RECEIVE: TriggerFlags = TriggerFlags::bit(9);
    pub const FIGHT: TriggerFlags = TriggerFlags::bit(10);
    pub const HIT_PERCENT: TriggerFlags = TriggerFlags::bit(11);
    pub const BRIBE: TriggerFlags = TriggerFlags::bit(12);
    pub const SPEECH_TO: TriggerFlags = TriggerFlags::bit(13);
    pub const LOAD: TriggerFlags = TriggerFlags::bit(14);
    pub const CAST: TriggerFlags = TriggerFlags::bit(15);
    pub const LEAVE: TriggerFlags = TriggerFlags::bit(16);
    pub const DOOR: TriggerFlags = TriggerFlags::bit(17);
    pub const TIME: TriggerFlags = TriggerFlags::bit(19);
}

/// Object trigger types.
pub mod otrig {
    use super::TriggerFlags;

    pub const GLOBAL: TriggerFlags = TriggerFlags::bit(0);
    pub const RANDOM: TriggerFlags = TriggerFlags::bit(1);
    pub const COMMAND: TriggerFlags = TriggerFlags::bit(2);
    pub const ATTACK: TriggerFlags = TriggerFlags::bit(3);
    pub const DEFEND: TriggerFlags = TriggerFlags::bit(4);
    pub const TIMER: TriggerFlags = TriggerFlags::bit(5);
    pub const GET: TriggerFlags = TriggerFlags::bit(6);
    pub const DROP: TriggerFlags = TriggerFlags::bit(7);
    pub const GIVE: TriggerFlags = TriggerFlags::bit(8);
    pub const WEAR: TriggerFlags = TriggerFlags::bit(9);
    pub const DEATH: TriggerFlags = TriggerFlags::bit(10);
    pub const REMOVE: TriggerFlags = TriggerFlags::bit(11);
    pub const LOAD: TriggerFlags = TriggerFlags::bit(14);
    pub const CAST: TriggerFlags = TriggerFlags::bit(15);
    pub const LEAVE: TriggerFlags = TriggerFlags::bit(16);
    pub const CONSUME: TriggerFlags = TriggerFlags::bit(18);
    pub const TIME: TriggerFlags = TriggerFlags::bit(19);

    /// Command-trigger scope bits, carried in the numeric arg.
    pub const SCOPE_EQUIP: i32 = 1;
    pub const SCOPE_INVENTORY: i32 = 2;
    pub const SCOPE_ROOM: i32 = 4;
}

/// Room trigger types.
pub mod wtrig {
    use super::TriggerFlags;

    pub const GLOBAL: TriggerFlags = TriggerFlags::bit(0);
    pub const RANDOM: TriggerFlags = TriggerFlags::bit(1);
    pub const COMMAND: TriggerFlags = TriggerFlags::bit(2);
    pub const SPEECH: TriggerFlags = TriggerFlags::bit(3);
    pub const RESET: TriggerFlags = TriggerFlags::bit(5);
    pub const PREENTRY: TriggerFlags = TriggerFlags::bit(6);
    pub const DROP: TriggerFlags = TriggerFlags::bit(7);
    pub const POSTENTRY: TriggerFlags = TriggerFlags::bit(8);
    pub const CAST: TriggerFlags = TriggerFlags::bit(15);
    pub const LEAVE: TriggerFlags = TriggerFlags::bit(16);
    pub const DOOR: TriggerFlags = TriggerFlags::bit(17);
    pub const TIME: TriggerFlags = TriggerFlags::bit(19);
}

const MTRIG_NAMES: &[&str] = &[
    "Global", "Random", "Command", "Speech", "Act", "Death", "Greet", "Greet-All", "Entry",
    "Receive", "Fight", "HitPrcnt", "Bribe", "SpeechTo", "Load", "Cast", "Leave", "Door",
    "UNUSED", "Time",
];

const OTRIG_NAMES: &[&str] = &[
    "Global", "Random", "Command", "Attack", "Defend", "Timer", "Get", "Drop", "Give", "Wear",
    "Death", "Remove", "UNUSED", "UNUSED", "Load", "Cast", "Leave", "UNUSED", "Consume", "Time",
];

const WTRIG_NAMES: &[&str] = &[
    "Global", "Random", "Command", "Speech", "UNUSED", "Reset", "Preentry", "Drop", "Postentry",
    "UNUSED", "UNUSED", "UNUSED", "UNUSED", "UNUSED", "UNUSED", "Cast", "Leave", "Door",
    "UNUSED", "Time",
];
