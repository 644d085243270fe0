//! Victory rewards: experience, leveling, coins and loot.

use std::collections::BTreeMap;

use log::info;
use swordsong_shared::{LevelUp, LootDrop, LootEntry, LootQuantity};

use crate::entities::{Character, CharacterUpdate};
use crate::random::RandomProvider;

/// Added to `xp_to_level` per level reached, times the new level
pub const XP_STEP_PER_LEVEL: u32 = 50;
pub const LEVEL_UP_HEALTH: u32 = 20;
pub const LEVEL_UP_ATTACK: u32 = 4;
pub const LEVEL_UP_DEFENSE: u32 = 2;
pub const LEVEL_UP_MANA: u32 = 10;

/// Grant `xp_gain` to `character`.
///
/// Levels cascade while the remaining xp still reaches the next threshold.
/// Any level gained refills health and mana to the new maximums.
pub fn apply_experience(character: &Character, xp_gain: u32) -> (CharacterUpdate, Option<LevelUp>) {
    let mut xp = character.xp.saturating_add(xp_gain);
    let mut level = character.level;
    let mut xp_to_level = character.xp_to_level;
    let mut levels_gained = 0;

    while xp >= xp_to_level {
        xp -= xp_to_level;
        level += 1;
        levels_gained += 1;
        xp_to_level = xp_to_level.saturating_add(level.saturating_mul(XP_STEP_PER_LEVEL));
    }

    if levels_gained == 0 {
        let update = CharacterUpdate {
            xp: Some(xp),
            ..CharacterUpdate::default()
        };
        return (update, None);
    }

    let level_up = LevelUp {
        new_level: level,
        levels_gained,
        health_increase: LEVEL_UP_HEALTH * levels_gained,
        attack_increase: LEVEL_UP_ATTACK * levels_gained,
        defense_increase: LEVEL_UP_DEFENSE * levels_gained,
        mana_increase: LEVEL_UP_MANA * levels_gained,
    };
    let max_health = character.max_health.saturating_add(level_up.health_increase);
    let max_mana = character.max_mana.saturating_add(level_up.mana_increase);

    info!("{} reached level {}", character.name, level);

    let update = CharacterUpdate {
        level: Some(level),
        xp: Some(xp),
        xp_to_level: Some(xp_to_level),
        max_health: Some(max_health),
        health: Some(max_health),
        attack: Some(character.attack.saturating_add(level_up.attack_increase)),
        defense: Some(character.defense.saturating_add(level_up.defense_increase)),
        max_mana: Some(max_mana),
        mana: Some(max_mana),
        ..CharacterUpdate::default()
    };
    (update, Some(level_up))
}

/// Coins for a victory, uniform in `[xp_reward / 2, xp_reward]`
pub fn roll_coins<R: RandomProvider + ?Sized>(xp_reward: u32, rng: &mut R) -> u32 {
    rng.roll(xp_reward / 2, xp_reward)
}

/// Roll every loot table entry once, in table order
pub fn roll_loot<R: RandomProvider + ?Sized>(
    loot_table: &BTreeMap<String, LootEntry>,
    rng: &mut R,
) -> Vec<LootDrop> {
    let mut drops = Vec::new();
    for (name, entry) in loot_table {
        if rng.roll(1, 100) > entry.chance {
            continue;
        }
        let quantity = match entry.quantity {
            LootQuantity::Fixed(q) => q,
            LootQuantity::Range(a, b) => rng.roll(a.min(b), a.max(b)),
        };
        if quantity > 0 {
            drops.push(LootDrop {
                name: name.clone(),
                quantity,
            });
        }
    }
    drops
}
