//! Entity identification system.
//!
//! Every live character, object and room has a unique [`Uid`]. Scripts carry
//! UIDs around inside plain string variables, so a UID also has a text form:
//! the [`UID_SIGIL`] byte followed by the decimal id.
//!
//! ## ID Layout
//!
//! - `ROOM_ID_BASE..`: rooms, as `ROOM_ID_BASE + room index`
//! - `FIRST_MOBILE_ID..`: characters and objects, allocated monotonically and
//!   never reused
//!
//! Resolving a UID is the world's job. The world answers with an
//! [`EntityRef`] whose [`Handle`] is generation-checked, so a handle captured
//! before an entity was destroyed never reaches its replacement.
//!
//! ## Usage
//!
//! ```
//! use rust_mudscript::core::{Uid, UID_SIGIL};
//!
//! let uid = Uid::new(100_042);
//! let text = uid.to_string();
//! assert!(text.starts_with(UID_SIGIL));
//! assert_eq!(Uid::parse(&text), Some(uid));
//!
//! // Plain numbers are not UIDs
//! assert_eq!(Uid::parse("100042"), None);
//! ```

use serde::{Deserialize, Serialize};

/// Marker byte that prefixes a UID in script text.
pub const UID_SIGIL: char = '\u{5}';

/// Rooms are addressed as `ROOM_ID_BASE + room index`.
pub const ROOM_ID_BASE: u64 = 50_000;

/// First id handed out to characters and objects.
pub const FIRST_MOBILE_ID: u64 = 100_000;

/// Virtual number of a prototype (trigger, mobile, object or room).
pub type Vnum = i32;

/// Unique identifier for a live game entity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Uid(pub u64);

impl Uid {
    /// Create a new UID.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// UID of the room with the given world index.
    #[must_use]
    pub const fn room(index: u32) -> Self {
        Self(ROOM_ID_BASE + index as u64)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Check whether this id falls in the room range.
    #[must_use]
    pub const fn is_room_range(self) -> bool {
        self.0 >= ROOM_ID_BASE && self.0 < FIRST_MOBILE_ID
    }

    /// Parse the sigil-tagged text form.
    ///
    /// Leading whitespace is skipped. Anything after the digits is ignored.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let rest = text.trim_start().strip_prefix(UID_SIGIL)?;
        let end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        rest[..end].parse().ok().map(Self)
    }
}

impl std::fmt::Display for Uid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", UID_SIGIL, self.0)
    }
}

/// Generation-checked index into an [`Arena`](super::Arena).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Handle {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl Handle {
    /// Slot index (for debugging and display).
    #[must_use]
    pub const fn index(self) -> u32 {
        self.index
    }

    /// Generation of the slot when this handle was issued.
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl std::fmt::Display for Handle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

/// A resolved reference to a live entity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityRef {
    Character(Handle),
    Object(Handle),
    Room(Handle),
    #[default]
    None,
}

impl EntityRef {
    /// True when the reference points at nothing.
    #[must_use]
    pub const fn is_none(self) -> bool {
        matches!(self, EntityRef::None)
    }

    /// Short label used in log lines.
    #[must_use]
    pub const fn kind_name(self) -> &'static str {
        match self {
            EntityRef::Character(_) => "char",
            EntityRef::Object(_) => "obj",
            EntityRef::Room(_) => "room",
            EntityRef::None => "nothing",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uid_text_form() {
        let uid = Uid::new(123_456);
        assert_eq!(uid.to_string(), "\u{5}123456");
        assert_eq!(Uid::parse("\u{5}123456"), Some(uid));
        assert_eq!(Uid::parse("  \u{5}123456 trailing"), Some(uid));
    }

    #[test]
    fn test_uid_parse_rejects_plain_text() {
        assert_eq!(Uid::parse(""), None);
        assert_eq!(Uid::parse("guard"), None);
        assert_eq!(Uid::parse("3001"), None);
        assert_eq!(Uid::parse("\u{5}"), None);
        assert_eq!(Uid::parse("\u{5}abc"), None);
    }

    #[test]
    fn test_room_range() {
        let room = Uid::room(12);
        assert_eq!(room.raw(), ROOM_ID_BASE + 12);
        assert!(room.is_room_range());
        assert!(!Uid::new(FIRST_MOBILE_ID).is_room_range());
    }

    #[test]
    fn test_entity_ref_default() {
        assert!(EntityRef::default().is_none());
        assert_eq!(EntityRef::default().kind_name(), "nothing");
    }
}
