//! Trigger definitions and attachment.
//!
//! Triggers let mobiles, objects and rooms react to game events with
//! scripts. Definitions are loaded once at boot; attaching one to an entity
//! creates a live instance in that entity's script container.
//!
//! ## Key Components
//!
//! - [`AttachKind`]: mobile, object or room
//! - [`TriggerFlags`]: event bits, with per-kind constants in [`mtrig`],
//!   [`otrig`] and [`wtrig`]
//! - [`TriggerPrototype`]: an immutable definition with a compiled body
//! - [`PrototypeRegistry`]: every loaded prototype, by vnum
//! - [`TriggerInstance`]: an attached copy with its own run state
//! - [`ScriptContainer`]: an entity's ordered triggers and global variables
//!
//! ## Design Philosophy
//!
//! The event vocabulary belongs to the content, not the engine: the bit
//! layout is the classic DG Scripts one, and the
//! [`dispatch`](crate::dispatch) layer decides which bits an event wakes.
//! Prototypes are shared through `Arc`; an instance never observes a
//! half-edited definition.
//!
//! ## Example Usage
//!
//! ```
//! use rust_mudscript::triggers::{mtrig, AttachKind, PrototypeRegistry, TriggerPrototype};
//!
//! let mut registry = PrototypeRegistry::new();
//! registry.register(
//!     TriggerPrototype::new(1200, "greeter", AttachKind::Mobile)
//!         .with_flags(mtrig::GREET)
//!         .with_narg(100)
//!         .with_commands("say Welcome, %actor.name%!"),
//! );
//!
//! let proto = registry.get(1200).unwrap();
//! assert!(proto.flags.intersects(mtrig::GREET));
//! ```

pub mod container;
pub mod instance;
pub mod loader;
pub mod prototype;
pub mod registry;
pub mod types;

pub use container::ScriptContainer;
pub use instance::TriggerInstance;
pub use loader::{parse_triggers, LoadError};
pub use prototype::TriggerPrototype;
pub use registry::PrototypeRegistry;
pub use types::{mtrig, otrig, wtrig, AttachKind, TriggerFlags};
