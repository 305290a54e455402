//! Worlds built on the engine.

pub mod simple;
