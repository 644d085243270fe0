//! Server-side character record.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use swordsong_shared::ActorId;

/// Starting stats for a newly enrolled character
pub const STARTING_LEVEL: u32 = 1;
pub const STARTING_XP_TO_LEVEL: u32 = 100;
pub const STARTING_HEALTH: u32 = 100;
pub const STARTING_ATTACK: u32 = 10;
pub const STARTING_DEFENSE: u32 = 5;
pub const STARTING_MANA: u32 = 50;

/// A player's persistent character
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub id: ActorId,
    pub name: String,
    pub level: u32,
    pub xp: u32,
    pub xp_to_level: u32,
    pub health: u32,
    pub max_health: u32,
    pub attack: u32,
    pub defense: u32,
    pub mana: u32,
    pub max_mana: u32,
    pub coins: u64,
    pub current_area: String,
    /// Item name -> quantity; quantities are always > 0
    pub inventory: BTreeMap<String, u32>,
}

impl Character {
    /// Create a level 1 character in `area`
    pub fn new(id: ActorId, name: impl Into<String>, area: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            level: STARTING_LEVEL,
            xp: 0,
            xp_to_level: STARTING_XP_TO_LEVEL,
            health: STARTING_HEALTH,
            max_health: STARTING_HEALTH,
            attack: STARTING_ATTACK,
            defense: STARTING_DEFENSE,
            mana: STARTING_MANA,
            max_mana: STARTING_MANA,
            coins: 0,
            current_area: area.into(),
            inventory: BTreeMap::new(),
        }
    }

    pub fn combat_stats(&self) -> CombatStats {
        CombatStats {
            attack: self.attack,
            defense: self.defense,
        }
    }

    /// Check if dead
    pub fn is_dead(&self) -> bool {
        self.health == 0
    }

    /// Apply a partial update, keeping health and mana within their maximums
    pub fn apply(&mut self, update: &CharacterUpdate) {
        if let Some(level) = update.level {
            self.level = level.max(1);
        }
        if let Some(xp) = update.xp {
            self.xp = xp;
        }
        if let Some(xp_to_level) = update.xp_to_level {
            self.xp_to_level = xp_to_level;
        }
        if let Some(max_health) = update.max_health {
            self.max_health = max_health;
        }
        if let Some(health) = update.health {
            self.health = health;
        }
        if let Some(attack) = update.attack {
            self.attack = attack;
        }
        if let Some(defense) = update.defense {
            self.defense = defense;
        }
        if let Some(max_mana) = update.max_mana {
            self.max_mana = max_mana;
        }
        if let Some(mana) = update.mana {
            self.mana = mana;
        }
        if let Some(coins) = update.coins {
            self.coins = coins;
        }
        if let Some(area) = &update.current_area {
            self.current_area = area.clone();
        }
        self.health = self.health.min(self.max_health);
        self.mana = self.mana.min(self.max_mana);
    }
}

/// Attack/defense pair fed to the damage model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CombatStats {
    pub attack: u32,
    pub defense: u32,
}

/// Partial character update; `None` fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharacterUpdate {
    pub level: Option<u32>,
    pub xp: Option<u32>,
    pub xp_to_level: Option<u32>,
    pub health: Option<u32>,
    pub max_health: Option<u32>,
    pub attack: Option<u32>,
    pub defense: Option<u32>,
    pub mana: Option<u32>,
    pub max_mana: Option<u32>,
    pub coins: Option<u64>,
    pub current_area: Option<String>,
}

impl CharacterUpdate {
    pub fn health(health: u32) -> Self {
        Self { health: Some(health), ..Self::default() }
    }

    pub fn mana(mana: u32) -> Self {
        Self { mana: Some(mana), ..Self::default() }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Fight counters that drive forced boss spawns
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FightStats {
    pub total_fights: u32,
    pub fights_since_boss: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_character_defaults() {
        let c = Character::new(7, "Aria", "forest");
        assert_eq!(c.level, 1);
        assert_eq!(c.xp_to_level, 100);
        assert_eq!((c.health, c.max_health), (100, 100));
        assert_eq!((c.mana, c.max_mana), (50, 50));
        assert_eq!(c.combat_stats(), CombatStats { attack: 10, defense: 5 });
        assert!(!c.is_dead());
    }

    #[test]
    fn test_apply_clamps_health_and_mana() {
        let mut c = Character::new(1, "Aria", "forest");
        c.apply(&CharacterUpdate {
            health: Some(500),
            mana: Some(80),
            ..CharacterUpdate::default()
        });
        assert_eq!(c.health, 100);
        assert_eq!(c.mana, 50);

        c.apply(&CharacterUpdate {
            max_health: Some(120),
            health: Some(120),
            level: Some(0),
            ..CharacterUpdate::default()
        });
        assert_eq!(c.health, 120);
        assert_eq!(c.level, 1);
    }

    #[test]
    fn test_empty_update() {
        assert!(CharacterUpdate::default().is_empty());
        assert!(!CharacterUpdate::mana(3).is_empty());
    }
}
