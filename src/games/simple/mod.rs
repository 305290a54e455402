//! A small in-memory world for exercising the engine.
//!
//! Rooms, players, mobiles and objects are created directly with builder
//! calls. Scripts can run a handful of commands against it:
//!
//! - `echo <text>`: records the text
//! - `emote <text>`: records the owner's name followed by the text
//! - `say <text>`: records the speech and fires speech triggers
//! - `purge [target]`: extracts a target, or every mobile and object in
//!   the room
//! - `attach <vnum> <target>` / `detach <target> <spec|all>`
//! - `goto <room vnum>`: moves the owner without firing triggers
//!
//! Everything else is ignored. [`SimpleWorld::walk`] and
//! [`SimpleWorld::interpret`] drive movement and typed commands through the
//! dispatch layer the way a full game would.

mod world;

pub use world::SimpleWorld;
