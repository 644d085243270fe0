//! Skill definitions shared between the combat engine and its front ends.

use serde::{Deserialize, Serialize};

// =============================================================================
// Skill Types
// =============================================================================

/// What a skill does when it resolves on the player's turn
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SkillEffect {
    /// Attack the monster with the attacker's attack scaled by `damage_multiplier`
    #[serde(rename_all = "camelCase")]
    Strike { damage_multiplier: f64 },
    /// Restore `heal_percent` of the caster's maximum health
    #[serde(rename_all = "camelCase")]
    Heal { heal_percent: f64 },
    /// Halve incoming monster damage for `duration` monster turns
    #[serde(rename_all = "camelCase")]
    DefensiveStance { duration: u32 },
}

/// Skill definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillDef {
    /// Display name, also the lookup key
    pub name: String,
    /// Description for the skill menu
    pub description: String,
    /// Mana deducted when the skill is used
    pub mana_cost: u32,
    /// Cooldown in completed turns
    pub cooldown: u32,
    pub effect: SkillEffect,
}

impl SkillDef {
    /// Damage multiplier applied by the damage model, if this skill deals damage
    pub fn damage_multiplier(&self) -> Option<f64> {
        match self.effect {
            SkillEffect::Strike { damage_multiplier } => Some(damage_multiplier),
            _ => None,
        }
    }
}

// =============================================================================
// Skill Definitions
// =============================================================================

/// Get all built-in skill definitions, in menu order
pub fn get_skill_definitions() -> Vec<SkillDef> {
    vec![
        SkillDef {
            name: "Power Strike".into(),
            description: "A powerful strike that deals 150% damage.".into(),
            mana_cost: 10,
            cooldown: 3,
            effect: SkillEffect::Strike { damage_multiplier: 1.5 },
        },
        SkillDef {
            name: "Fire Ball".into(),
            description: "A magical ball of fire dealing 2x damage.".into(),
            mana_cost: 20,
            cooldown: 4,
            effect: SkillEffect::Strike { damage_multiplier: 2.0 },
        },
        SkillDef {
            name: "Healing Pulse".into(),
            description: "A magical pulse that heals 40% of your maximum health.".into(),
            mana_cost: 15,
            cooldown: 4,
            effect: SkillEffect::Heal { heal_percent: 0.4 },
        },
        SkillDef {
            name: "Defensive Stance".into(),
            description: "Take 50% less damage for 3 turns.".into(),
            mana_cost: 20,
            cooldown: 5,
            effect: SkillEffect::DefensiveStance { duration: 3 },
        },
    ]
}

/// Static skill table the engine resolves skill names against
#[derive(Debug, Clone, PartialEq)]
pub struct SkillCatalog {
    skills: Vec<SkillDef>,
}

impl SkillCatalog {
    pub fn new(skills: Vec<SkillDef>) -> Self {
        Self { skills }
    }

    /// Get skill by name (exact match)
    pub fn get(&self, name: &str) -> Option<&SkillDef> {
        self.skills.iter().find(|s| s.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SkillDef> {
        self.skills.iter()
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }
}

impl Default for SkillCatalog {
    fn default() -> Self {
        Self::new(get_skill_definitions())
    }
}
