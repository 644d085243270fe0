//! SwordSong combat and progression engine.
//!
//! The engine is a library: a front end (chat bot, console) drives encounters
//! through [`combat::CombatEngine`] and renders the structured results.

pub mod combat;
pub mod commands;
pub mod config;
pub mod entities;
pub mod persistence;
pub mod random;
pub mod world;
