//! # rust-mudscript
//!
//! An embedded trigger-scripting engine for text MUDs.
//!
//! Mobiles, objects and rooms carry event-driven scripts written in a small
//! line-oriented language. A shared interpreter runs them: it evaluates
//! expressions with fixed operator precedence, expands `%var.field%`
//! references against live game entities, follows nested `if`, `while`
//! and `switch` blocks, and suspends a script on `wait` until a later
//! pulse.
//!
//! ## Design Principles
//!
//! 1. **The Game Owns the World**: The engine never stores characters,
//!    objects or rooms. The host lends them through the [`World`] trait on
//!    every call and runs script commands through [`World::execute`].
//!
//! 2. **Identity by UID**: Scripts hold entities as [`Uid`] text. A
//!    destroyed entity's UID simply stops resolving, and generation-checked
//!    handles keep stale continuations from firing.
//!
//! 3. **Scripts Never Crash the Game**: Authoring mistakes are logged
//!    through `tracing` and degrade to no-ops or empty values. Only boot
//!    problems (bad trigger files, bad configuration, bad attachments)
//!    surface as errors.
//!
//! ## Modules
//!
//! - `core`: UIDs, arenas, RNG, configuration, flag tables, text helpers
//! - `world`: The `World` trait and the entity records scripts read
//! - `triggers`: Prototypes, the boot loader, instances and containers
//! - `script`: Compiled scripts, variables, expressions, substitution, waits
//! - `engine`: Engine state, the script driver, attach/detach, pulses
//! - `dispatch`: One entry point per game event
//! - `games`: A small in-memory world for tests and examples

pub mod core;
pub mod world;
pub mod triggers;
pub mod script;
pub mod engine;
pub mod dispatch;
pub mod games;

// Re-export commonly used types
pub use crate::core::{
    Arena, ConfigError, EntityRef, Handle,
    ScriptConfig, ScriptRng, ScriptRngState,
    Uid, Vnum, UID_SIGIL,
};

pub use crate::world::{
    Character, Coins, Direction, GameTime, Object, ObjectLocation,
    Position, PrototypeInfo, Room, World,
};

pub use crate::triggers::{
    mtrig, otrig, wtrig, parse_triggers, AttachKind, LoadError,
    PrototypeRegistry, ScriptContainer, TriggerFlags, TriggerInstance, TriggerPrototype,
};

pub use crate::script::{Script, VarTable, WaitId, WaitQueue};

pub use crate::engine::{AttachError, RunMode, ScriptEngine};

pub use crate::dispatch::{ActEvent, ConsumeKind, DoorAction};
