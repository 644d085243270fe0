//! Structured results the combat engine hands back to front ends.
//!
//! Nothing in here is formatted for display; rendering is the caller's job.

use serde::{Deserialize, Serialize};

use crate::SkillDef;

// =============================================================================
// Encounter State
// =============================================================================

/// How an encounter ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resolution {
    Victory,
    Defeat,
    Fled,
}

/// Whose move it is in an encounter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnState {
    PlayerTurn,
    MonsterTurn,
    Resolved(Resolution),
}

/// Timed effects that can sit on a combatant
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StatusEffect {
    DefensiveStance,
}

// =============================================================================
// Turn Results
// =============================================================================

/// What the player's action did
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlayerAction {
    /// Plain attack or damaging skill
    Attack { skill: Option<String>, damage: u32 },
    Heal { skill: String, amount: u32, new_health: u32 },
    DefensiveStance { skill: String, turns: u32 },
}

/// Result of a monster's turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonsterTurnReport {
    pub monster_name: String,
    pub damage: u32,
    /// Whether a defensive stance halved the hit
    pub reduced: bool,
    pub player_health: u32,
    pub player_max_health: u32,
    pub player_defeated: bool,
    /// Turn number the player acts on next; unchanged on defeat
    pub turn_count: u32,
}

// =============================================================================
// Rewards
// =============================================================================

/// Stat gains from one reward call (may span several levels)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelUp {
    pub new_level: u32,
    pub levels_gained: u32,
    pub health_increase: u32,
    pub attack_increase: u32,
    pub defense_increase: u32,
    pub mana_increase: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LootDrop {
    pub name: String,
    pub quantity: u32,
}

/// Everything granted for a victory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardSummary {
    pub xp: u32,
    pub coins: u32,
    pub items: Vec<LootDrop>,
    pub level_up: Option<LevelUp>,
}

// =============================================================================
// Skill Menu
// =============================================================================

/// One row of the skill menu
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillAvailability {
    pub skill: SkillDef,
    pub cooldown_remaining: u32,
    pub can_use: bool,
}
