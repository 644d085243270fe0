//! Shared entity definitions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Opaque, stable identifier of the player behind a character (a chat user id)
pub type ActorId = u64;

/// Monster rarity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Legendary,
    Boss,
}

impl Rarity {
    /// Number of copies a template gets in the weighted spawn pool.
    /// Bosses never enter the pool; they are forced instead.
    pub fn spawn_weight(&self) -> Option<u32> {
        match self {
            Self::Common => Some(60),
            Self::Uncommon => Some(25),
            Self::Rare => Some(12),
            Self::Legendary => Some(3),
            Self::Boss => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Common => "common",
            Self::Uncommon => "uncommon",
            Self::Rare => "rare",
            Self::Legendary => "legendary",
            Self::Boss => "boss",
        }
    }
}

/// Quantity granted by a loot entry: either fixed or a uniform `[min, max]` roll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LootQuantity {
    Fixed(u32),
    Range(u32, u32),
}

/// Loot table entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LootEntry {
    /// Drop chance in percent (1-100)
    pub chance: u32,
    pub quantity: LootQuantity,
    #[serde(default)]
    pub sell_price: u32,
    #[serde(default)]
    pub description: String,
}

/// Static monster definition, keyed by area
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonsterTemplate {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub health: u32,
    pub attack: u32,
    pub defense: u32,
    pub rarity: Rarity,
    pub xp_reward: u32,
    /// Item name -> drop rule. Ordered so loot rolls are reproducible.
    #[serde(default)]
    pub loot_table: BTreeMap<String, LootEntry>,
}

/// An area's spawnable monsters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AreaDefinition {
    pub monsters: Vec<MonsterTemplate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loot_quantity_accepts_number_or_pair() {
        let fixed: LootEntry = serde_json::from_str(r#"{"chance": 50, "quantity": 2}"#).unwrap();
        assert_eq!(fixed.quantity, LootQuantity::Fixed(2));

        let ranged: LootEntry =
            serde_json::from_str(r#"{"chance": 10, "quantity": [1, 3], "sellPrice": 4}"#).unwrap();
        assert_eq!(ranged.quantity, LootQuantity::Range(1, 3));
        assert_eq!(ranged.sell_price, 4);
    }

    #[test]
    fn test_boss_has_no_spawn_weight() {
        assert_eq!(Rarity::Boss.spawn_weight(), None);
        let total: u32 = [Rarity::Common, Rarity::Uncommon, Rarity::Rare, Rarity::Legendary]
            .iter()
            .filter_map(Rarity::spawn_weight)
            .sum();
        assert_eq!(total, 100);
    }
}
