//! Static game world data: areas and the monsters that live in them.

mod spawner;

pub use spawner::{select_monster, SpawnPick, BOSS_FORCE_THRESHOLD};

use std::collections::BTreeMap;
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};
use swordsong_shared::{AreaDefinition, LootEntry, LootQuantity, MonsterTemplate, Rarity};
use thiserror::Error;

/// Area new characters start in when the data does not name one
const DEFAULT_STARTING_AREA: &str = "forest";

#[derive(Debug, Error)]
pub enum WorldDataError {
    #[error("failed to read world data: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed world data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("starting area {0:?} is not defined")]
    UnknownStartingArea(String),
}

/// Read-only mapping of area id -> spawnable monsters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaCatalog {
    #[serde(default = "default_starting_area")]
    starting_area: String,
    areas: BTreeMap<String, AreaDefinition>,
}

fn default_starting_area() -> String {
    DEFAULT_STARTING_AREA.to_string()
}

impl AreaCatalog {
    pub fn new(
        starting_area: impl Into<String>,
        areas: BTreeMap<String, AreaDefinition>,
    ) -> Result<Self, WorldDataError> {
        let catalog = Self {
            starting_area: starting_area.into(),
            areas,
        };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Parse the `areas.json` format
    pub fn from_json(json: &str) -> Result<Self, WorldDataError> {
        let catalog: Self = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Load areas from a JSON file
    pub fn load(path: &Path) -> Result<Self, WorldDataError> {
        let json = std::fs::read_to_string(path)?;
        let catalog = Self::from_json(&json)?;
        info!("Loaded {} areas from {:?}", catalog.areas.len(), path);
        Ok(catalog)
    }

    fn validate(&self) -> Result<(), WorldDataError> {
        if self.areas.contains_key(&self.starting_area) {
            Ok(())
        } else {
            Err(WorldDataError::UnknownStartingArea(self.starting_area.clone()))
        }
    }

    pub fn area(&self, area_id: &str) -> Option<&AreaDefinition> {
        self.areas.get(area_id)
    }

    pub fn starting_area(&self) -> &str {
        &self.starting_area
    }

    pub fn area_ids(&self) -> impl Iterator<Item = &str> {
        self.areas.keys().map(String::as_str)
    }

    /// Built-in areas, used when no data file is available
    pub fn with_defaults() -> Self {
        let mut areas = BTreeMap::new();

        areas.insert(
            "forest".to_string(),
            AreaDefinition {
                monsters: vec![
                    monster(
                        "Slime",
                        "A wobbling blob of green goo.",
                        20,
                        5,
                        1,
                        Rarity::Common,
                        10,
                        &[("Slime Gel", 50, LootQuantity::Range(1, 3), 2)],
                    ),
                    monster(
                        "Wolf",
                        "A hungry grey wolf stalking the undergrowth.",
                        30,
                        8,
                        3,
                        Rarity::Common,
                        15,
                        &[("Wolf Pelt", 40, LootQuantity::Fixed(1), 5)],
                    ),
                    monster(
                        "Goblin",
                        "A sneaky goblin with a rusty dagger.",
                        40,
                        10,
                        4,
                        Rarity::Uncommon,
                        25,
                        &[
                            ("Goblin Ear", 60, LootQuantity::Fixed(1), 4),
                            ("Health Potion", 15, LootQuantity::Fixed(1), 10),
                        ],
                    ),
                    monster(
                        "Forest Troll",
                        "A hulking troll covered in moss.",
                        80,
                        14,
                        8,
                        Rarity::Rare,
                        60,
                        &[("Troll Hide", 50, LootQuantity::Fixed(1), 20)],
                    ),
                    monster(
                        "Ancient Treant",
                        "The forest itself has come to life.",
                        150,
                        18,
                        12,
                        Rarity::Legendary,
                        150,
                        &[("Heartwood", 100, LootQuantity::Fixed(1), 75)],
                    ),
                    monster(
                        "Goblin Warlord",
                        "The warlord of every goblin in the forest.",
                        200,
                        20,
                        10,
                        Rarity::Boss,
                        250,
                        &[
                            ("Warlord's Axe", 100, LootQuantity::Fixed(1), 150),
                            ("Health Potion", 50, LootQuantity::Range(1, 2), 10),
                        ],
                    ),
                ],
            },
        );

        areas.insert(
            "caves".to_string(),
            AreaDefinition {
                monsters: vec![
                    monster(
                        "Cave Bat",
                        "It screeches as it dives at you.",
                        18,
                        7,
                        2,
                        Rarity::Common,
                        12,
                        &[("Bat Wing", 50, LootQuantity::Range(1, 2), 3)],
                    ),
                    monster(
                        "Skeleton",
                        "Rattling bones animated by dark magic.",
                        45,
                        12,
                        6,
                        Rarity::Uncommon,
                        30,
                        &[("Bone Dust", 60, LootQuantity::Range(1, 3), 4)],
                    ),
                    monster(
                        "Crystal Golem",
                        "A construct of glowing crystal.",
                        100,
                        15,
                        14,
                        Rarity::Rare,
                        80,
                        &[("Crystal Shard", 70, LootQuantity::Range(1, 2), 25)],
                    ),
                    monster(
                        "Lich King",
                        "An undead sorcerer on a throne of bones.",
                        260,
                        24,
                        14,
                        Rarity::Boss,
                        320,
                        &[("Lich Crown", 100, LootQuantity::Fixed(1), 200)],
                    ),
                ],
            },
        );

        Self {
            starting_area: default_starting_area(),
            areas,
        }
    }
}

impl Default for AreaCatalog {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[allow(clippy::too_many_arguments)]
fn monster(
    name: &str,
    description: &str,
    health: u32,
    attack: u32,
    defense: u32,
    rarity: Rarity,
    xp_reward: u32,
    loot: &[(&str, u32, LootQuantity, u32)],
) -> MonsterTemplate {
    MonsterTemplate {
        name: name.to_string(),
        description: description.to_string(),
        health,
        attack,
        defense,
        rarity,
        xp_reward,
        loot_table: loot
            .iter()
            .map(|(item, chance, quantity, sell_price)| {
                (
                    item.to_string(),
                    LootEntry {
                        chance: *chance,
                        quantity: *quantity,
                        sell_price: *sell_price,
                        description: String::new(),
                    },
                )
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_have_a_boss_per_area() {
        let catalog = AreaCatalog::with_defaults();
        assert_eq!(catalog.starting_area(), "forest");
        for id in catalog.area_ids() {
            let area = catalog.area(id).unwrap();
            assert!(area.monsters.iter().any(|m| m.rarity == Rarity::Boss), "{id} has no boss");
        }
    }

    #[test]
    fn test_from_json_uses_data_file_format() {
        let json = r#"{
            "areas": {
                "forest": {
                    "monsters": [
                        {"name": "Slime", "health": 10, "attack": 2, "defense": 0,
                         "rarity": "common", "xpReward": 4,
                         "lootTable": {"Slime Gel": {"chance": 50, "quantity": [1, 2]}}}
                    ]
                }
            }
        }"#;
        let catalog = AreaCatalog::from_json(json).unwrap();
        let forest = catalog.area("forest").unwrap();
        assert_eq!(forest.monsters[0].xp_reward, 4);
        assert_eq!(
            forest.monsters[0].loot_table["Slime Gel"].quantity,
            LootQuantity::Range(1, 2)
        );
        assert!(catalog.area("swamp").is_none());
    }

    #[test]
    fn test_starting_area_must_exist() {
        let json = r#"{"startingArea": "swamp", "areas": {"forest": {"monsters": []}}}"#;
        assert!(matches!(
            AreaCatalog::from_json(json),
            Err(WorldDataError::UnknownStartingArea(area)) if area == "swamp"
        ));
    }

    #[test]
    fn test_shipped_data_file_parses() {
        let json = include_str!("../../../data/areas.json");
        let catalog = AreaCatalog::from_json(json).unwrap();
        assert_eq!(catalog, AreaCatalog::with_defaults());
    }
}
