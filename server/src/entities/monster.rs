//! Monster instances spawned into encounters.

use std::collections::BTreeMap;

use serde::Serialize;
use swordsong_shared::{LootEntry, MonsterTemplate, Rarity};

use super::CombatStats;

/// A live copy of a template, owned by one encounter
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonsterInstance {
    pub name: String,
    pub description: String,
    pub current_health: u32,
    pub max_health: u32,
    pub attack: u32,
    pub defense: u32,
    pub rarity: Rarity,
    pub xp_reward: u32,
    pub loot_table: BTreeMap<String, LootEntry>,
}

impl MonsterInstance {
    pub fn from_template(template: &MonsterTemplate) -> Self {
        Self {
            name: template.name.clone(),
            description: template.description.clone(),
            current_health: template.health,
            max_health: template.health,
            attack: template.attack,
            defense: template.defense,
            rarity: template.rarity,
            xp_reward: template.xp_reward,
            loot_table: template.loot_table.clone(),
        }
    }

    pub fn combat_stats(&self) -> CombatStats {
        CombatStats {
            attack: self.attack,
            defense: self.defense,
        }
    }

    /// Take damage
    pub fn take_damage(&mut self, damage: u32) {
        self.current_health = self.current_health.saturating_sub(damage);
    }

    pub fn is_defeated(&self) -> bool {
        self.current_health == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slime() -> MonsterTemplate {
        MonsterTemplate {
            name: "Slime".into(),
            description: "Wobbly.".into(),
            health: 12,
            attack: 3,
            defense: 1,
            rarity: Rarity::Common,
            xp_reward: 5,
            loot_table: BTreeMap::new(),
        }
    }

    #[test]
    fn test_instance_starts_at_full_health() {
        let m = MonsterInstance::from_template(&slime());
        assert_eq!(m.current_health, 12);
        assert_eq!(m.max_health, 12);
        assert!(!m.is_defeated());
    }

    #[test]
    fn test_overkill_saturates_at_zero() {
        let mut m = MonsterInstance::from_template(&slime());
        m.take_damage(5);
        assert_eq!(m.current_health, 7);
        m.take_damage(100);
        assert_eq!(m.current_health, 0);
        assert!(m.is_defeated());
    }
}
