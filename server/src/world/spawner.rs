//! Monster selection for an area.
//!
//! Regular spawns draw uniformly from a pool where each template appears
//! once per point of its rarity weight. After enough fights without a boss,
//! a boss is forced instead of drawing from the pool.

use log::{debug, info};
use swordsong_shared::{AreaDefinition, MonsterTemplate, Rarity};

use crate::entities::FightStats;
use crate::random::RandomProvider;

/// Fights without a boss after which the next spawn is a boss
pub const BOSS_FORCE_THRESHOLD: u32 = 15;

/// Template chosen for the next encounter
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpawnPick<'a> {
    /// Forced by the boss counter
    Boss(&'a MonsterTemplate),
    /// Drawn from the weighted pool
    Regular(&'a MonsterTemplate),
}

impl<'a> SpawnPick<'a> {
    pub fn template(&self) -> &'a MonsterTemplate {
        match self {
            Self::Boss(t) | Self::Regular(t) => t,
        }
    }

    /// Fight counters to persist after this spawn
    pub fn next_stats(&self, stats: FightStats) -> FightStats {
        match self {
            Self::Boss(_) => FightStats {
                fights_since_boss: 0,
                ..stats
            },
            Self::Regular(_) => FightStats {
                total_fights: stats.total_fights + 1,
                fights_since_boss: stats.fights_since_boss + 1,
            },
        }
    }
}

/// Select the next monster for an area.
/// Returns `None` if the area has nothing eligible to spawn.
pub fn select_monster<'a, R: RandomProvider + ?Sized>(
    area: &'a AreaDefinition,
    stats: FightStats,
    rng: &mut R,
) -> Option<SpawnPick<'a>> {
    if stats.fights_since_boss >= BOSS_FORCE_THRESHOLD {
        let bosses: Vec<&MonsterTemplate> = area
            .monsters
            .iter()
            .filter(|m| m.rarity == Rarity::Boss)
            .collect();
        if !bosses.is_empty() {
            let boss = bosses[rng.pick(bosses.len())];
            info!("Forcing boss spawn {} after {} fights", boss.name, stats.fights_since_boss);
            return Some(SpawnPick::Boss(boss));
        }
    }

    let mut pool: Vec<&MonsterTemplate> = Vec::new();
    for monster in &area.monsters {
        if let Some(weight) = monster.rarity.spawn_weight() {
            pool.extend(std::iter::repeat(monster).take(weight as usize));
        }
    }

    if pool.is_empty() {
        return None;
    }

    let selected = pool[rng.pick(pool.len())];
    debug!("Selected {} from a pool of {}", selected.name, pool.len());
    Some(SpawnPick::Regular(selected))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::{ScriptedRandom, StdRandom};
    use std::collections::BTreeMap;

    fn template(name: &str, rarity: Rarity) -> MonsterTemplate {
        MonsterTemplate {
            name: name.into(),
            description: String::new(),
            health: 10,
            attack: 1,
            defense: 1,
            rarity,
            xp_reward: 1,
            loot_table: BTreeMap::new(),
        }
    }

    fn area() -> AreaDefinition {
        AreaDefinition {
            monsters: vec![
                template("Rat", Rarity::Common),
                template("Fox", Rarity::Uncommon),
                template("Dragon", Rarity::Boss),
            ],
        }
    }

    #[test]
    fn test_pool_is_sized_by_rarity_weight() {
        let area = area();
        // Indices 0..60 are the common entry, 60..85 the uncommon one.
        let mut rng = ScriptedRandom::new().with_picks([59, 60, 84]);
        let stats = FightStats::default();

        assert_eq!(select_monster(&area, stats, &mut rng).unwrap().template().name, "Rat");
        assert_eq!(select_monster(&area, stats, &mut rng).unwrap().template().name, "Fox");
        assert_eq!(select_monster(&area, stats, &mut rng).unwrap().template().name, "Fox");
    }

    #[test]
    fn test_bosses_never_drawn_from_pool() {
        let area = area();
        let mut rng = StdRandom::seeded(11);
        for _ in 0..500 {
            let pick = select_monster(&area, FightStats::default(), &mut rng).unwrap();
            assert!(matches!(pick, SpawnPick::Regular(t) if t.rarity != Rarity::Boss));
        }
    }

    #[test]
    fn test_boss_forced_on_fifteenth_fight() {
        let area = area();
        let mut rng = ScriptedRandom::new();

        let before = FightStats { total_fights: 14, fights_since_boss: 14 };
        let pick = select_monster(&area, before, &mut rng).unwrap();
        assert!(matches!(pick, SpawnPick::Regular(_)));
        assert_eq!(pick.next_stats(before), FightStats { total_fights: 15, fights_since_boss: 15 });

        let due = FightStats { total_fights: 15, fights_since_boss: 15 };
        let pick = select_monster(&area, due, &mut rng).unwrap();
        assert!(matches!(pick, SpawnPick::Boss(t) if t.name == "Dragon"));
        assert_eq!(pick.next_stats(due), FightStats { total_fights: 15, fights_since_boss: 0 });
    }

    #[test]
    fn test_boss_due_without_boss_falls_back_to_pool() {
        let area = AreaDefinition { monsters: vec![template("Rat", Rarity::Common)] };
        let due = FightStats { total_fights: 40, fights_since_boss: 40 };
        let pick = select_monster(&area, due, &mut ScriptedRandom::new()).unwrap();
        assert!(matches!(pick, SpawnPick::Regular(_)));
        assert_eq!(pick.next_stats(due).fights_since_boss, 41);
    }

    #[test]
    fn test_empty_pool_spawns_nothing() {
        let only_boss = AreaDefinition { monsters: vec![template("Dragon", Rarity::Boss)] };
        assert!(select_monster(&only_boss, FightStats::default(), &mut ScriptedRandom::new()).is_none());
        assert!(select_monster(&AreaDefinition::default(), FightStats::default(), &mut ScriptedRandom::new()).is_none());
    }
}
