//! Server-side entity definitions.

pub mod player;
mod monster;

pub use player::{Character, CharacterUpdate, FightStats, CombatStats};
pub use monster::MonsterInstance;
