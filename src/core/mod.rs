//! Core engine types: UIDs, arenas, RNG, configuration, flags, text helpers.
//!
//! This module contains the building blocks shared by every other part of
//! the engine. It knows nothing about triggers or scripts.

pub mod arena;
pub mod config;
pub mod entity;
pub mod flags;
pub mod rng;
pub mod text;

pub use arena::Arena;
pub use config::{ConfigError, ScriptConfig};
pub use entity::{EntityRef, Handle, Uid, Vnum, FIRST_MOBILE_ID, ROOM_ID_BASE, UID_SIGIL};
pub use rng::{ScriptRng, ScriptRngState};
