//! Combat resolution engine.
//!
//! [`CombatEngine`] owns the encounter registry and drives every turn through
//! a [`CharacterStore`]. It returns structured results only; rendering and turn
//! timeouts belong to the caller.
//!
//! A typical encounter:
//!
//! 1. `begin_encounter` (or `spawn_monster` + `start_combat`)
//! 2. `process_player_attack`; on a lethal hit, `distribute_rewards` with the
//!    returned [`DefeatedMonster`] then `end_combat`
//! 3. otherwise `process_monster_turn`; on defeat, `end_combat`
//! 4. repeat from 2, or `flee`

mod damage;
mod error;
mod registry;
mod rewards;

pub use damage::{compute_damage, damage_with_variance, DAMAGE_VARIANCE_MAX, DAMAGE_VARIANCE_MIN, MIN_DAMAGE};
pub use error::CombatError;
pub use registry::{CombatSession, EncounterRegistry};
pub use rewards::{apply_experience, roll_coins, roll_loot};

use log::{debug, error, info, warn};
use swordsong_shared::{
    ActorId, MonsterTurnReport, PlayerAction, Resolution, RewardSummary, SkillAvailability,
    SkillCatalog, SkillEffect, StatusEffect, TurnState,
};

use crate::entities::{Character, CharacterUpdate, MonsterInstance};
use crate::persistence::CharacterStore;
use crate::random::RandomProvider;
use crate::world::{select_monster, AreaCatalog};

/// Flee succeeds when a 1-100 roll is at or below this
pub const FLEE_SUCCESS_THRESHOLD: u32 = 70;
/// Multiplier on monster damage while a defensive stance is up
pub const DEFENSIVE_STANCE_REDUCTION: f64 = 0.5;
/// Number of ticks a campfire rest heals for
pub const REST_TICKS: u32 = 10;
/// Share of max health restored per rest tick (rounded up)
pub const REST_TICK_PERCENT: f64 = 0.1;

/// Proof that a monster was killed; consumed by [`CombatEngine::distribute_rewards`].
///
/// Only the engine can create one and it cannot be cloned, so each victory
/// pays out at most once.
#[derive(Debug)]
pub struct DefeatedMonster {
    actor: ActorId,
    monster: MonsterInstance,
}

impl DefeatedMonster {
    pub fn actor(&self) -> ActorId {
        self.actor
    }

    pub fn monster(&self) -> &MonsterInstance {
        &self.monster
    }
}

/// Result of a player attack or skill
#[derive(Debug)]
pub struct AttackOutcome {
    pub action: PlayerAction,
    pub monster_health: u32,
    pub monster_max_health: u32,
    pub player_health: u32,
    pub player_mana: u32,
    /// Set when the action killed the monster; the session is now `Resolved(Victory)`
    pub defeated: Option<DefeatedMonster>,
}

impl AttackOutcome {
    pub fn monster_defeated(&self) -> bool {
        self.defeated.is_some()
    }
}

/// Result of a flee attempt
#[derive(Debug)]
pub enum FleeOutcome {
    /// The session has been ended; this is its final state
    Escaped(CombatSession),
    /// The monster got a free turn
    Caught(MonsterTurnReport),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestOutcome {
    pub restored: u32,
    pub health: u32,
    pub max_health: u32,
}

/// Turn-based combat over a character store
pub struct CombatEngine<S, R> {
    store: S,
    registry: EncounterRegistry,
    areas: AreaCatalog,
    skills: SkillCatalog,
    rng: R,
}

impl<S: CharacterStore, R: RandomProvider> CombatEngine<S, R> {
    pub fn new(
        store: S,
        registry: EncounterRegistry,
        areas: AreaCatalog,
        skills: SkillCatalog,
        rng: R,
    ) -> Self {
        Self {
            store,
            registry,
            areas,
            skills,
            rng,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }

    pub fn areas(&self) -> &AreaCatalog {
        &self.areas
    }

    pub fn skills(&self) -> &SkillCatalog {
        &self.skills
    }

    pub fn registry(&self) -> &EncounterRegistry {
        &self.registry
    }

    // =========================================================================
    // Characters
    // =========================================================================

    /// Create a level 1 character in the starting area
    pub fn enroll(&mut self, actor: ActorId, name: &str) -> Result<Character, CombatError> {
        if self.store.get_character(actor).is_some() {
            return Err(CombatError::AlreadyEnrolled(actor));
        }
        let character = Character::new(actor, name, self.areas.starting_area());
        self.store.create_character(character.clone())?;
        self.store.initialize_fight_stats(actor)?;
        info!("Actor {} enrolled as {}", actor, name);
        Ok(character)
    }

    /// Leave the guild: end any encounter and delete everything the actor owns
    pub fn retire(&mut self, actor: ActorId) -> Result<(), CombatError> {
        self.store.delete_character(actor)?;
        self.registry.end_combat(actor);
        info!("Actor {} retired", actor);
        Ok(())
    }

    pub fn character(&self, actor: ActorId) -> Result<Character, CombatError> {
        self.store
            .get_character(actor)
            .ok_or(CombatError::CharacterNotFound(actor))
    }

    pub fn inventory(&self, actor: ActorId) -> Result<Vec<(String, u32)>, CombatError> {
        self.character(actor)?;
        Ok(self.store.get_inventory(actor))
    }

    /// Heal at the campfire; not allowed mid-encounter
    pub fn rest(&mut self, actor: ActorId) -> Result<RestOutcome, CombatError> {
        if self.registry.contains(actor) {
            return Err(CombatError::AlreadyInCombat);
        }
        let character = self.character(actor)?;

        let tick = (character.max_health as f64 * REST_TICK_PERCENT).ceil() as u32;
        let mut health = character.health;
        for _ in 0..REST_TICKS {
            health = health.saturating_add(tick).min(character.max_health);
        }

        if health != character.health {
            self.store.update_character(actor, &CharacterUpdate::health(health))?;
        }
        debug!("Actor {} rested to {}/{}", actor, health, character.max_health);
        Ok(RestOutcome {
            restored: health.saturating_sub(character.health),
            health,
            max_health: character.max_health,
        })
    }

    // =========================================================================
    // Encounters
    // =========================================================================

    /// Pick and instantiate the next monster for `area_id`, updating fight stats
    pub fn spawn_monster(&mut self, actor: ActorId, area_id: &str) -> Result<MonsterInstance, CombatError> {
        if self.registry.contains(actor) {
            return Err(CombatError::AlreadyInCombat);
        }
        let area = self
            .areas
            .area(area_id)
            .ok_or_else(|| CombatError::UnknownArea(area_id.to_string()))?;
        let stats = self.store.initialize_fight_stats(actor)?;

        let pick = select_monster(area, stats, &mut self.rng)
            .ok_or_else(|| CombatError::NoMonstersAvailable(area_id.to_string()))?;
        self.store.update_fight_stats(actor, pick.next_stats(stats))?;

        Ok(MonsterInstance::from_template(pick.template()))
    }

    pub fn start_combat(
        &mut self,
        actor: ActorId,
        monster: MonsterInstance,
    ) -> Result<&CombatSession, CombatError> {
        info!("Actor {} engaged {} ({})", actor, monster.name, monster.rarity.name());
        self.registry.start_combat(actor, monster)
    }

    /// Spawn a monster in the character's current area and start fighting it
    pub fn begin_encounter(&mut self, actor: ActorId) -> Result<&CombatSession, CombatError> {
        let character = self.character(actor)?;
        if self.registry.contains(actor) {
            return Err(CombatError::AlreadyInCombat);
        }
        if character.is_dead() {
            return Err(CombatError::TooWeakToFight);
        }
        let monster = self.spawn_monster(actor, &character.current_area)?;
        self.start_combat(actor, monster)
    }

    pub fn combat_state(&self, actor: ActorId) -> Option<&CombatSession> {
        self.registry.get(actor)
    }

    /// End the actor's encounter. Safe to call when there is none.
    pub fn end_combat(&mut self, actor: ActorId) -> Option<CombatSession> {
        let session = self.registry.end_combat(actor)?;
        info!("Actor {} left combat with {} after {} turns", actor, session.monster.name, session.turn_count);
        Some(session)
    }

    fn session_in(&self, actor: ActorId, expected: TurnState) -> Result<&CombatSession, CombatError> {
        let session = self.registry.get(actor).ok_or(CombatError::NoActiveCombat)?;
        if session.is_resolved() {
            return Err(CombatError::CombatResolved);
        }
        match session.turn {
            turn if turn == expected => Ok(session),
            _ if expected == TurnState::PlayerTurn => Err(CombatError::NotPlayerTurn),
            _ => Err(CombatError::NotMonsterTurn),
        }
    }

    fn session_mut(&mut self, actor: ActorId) -> Result<&mut CombatSession, CombatError> {
        self.registry.get_mut(actor).ok_or(CombatError::NoActiveCombat)
    }

    // =========================================================================
    // Turns
    // =========================================================================

    /// Resolve the player's action: a plain attack, or the named skill.
    ///
    /// Mana and cooldown are committed before the effect lands. Nothing is
    /// mutated when the action is rejected.
    pub fn process_player_attack(
        &mut self,
        actor: ActorId,
        skill_name: Option<&str>,
    ) -> Result<AttackOutcome, CombatError> {
        let monster_stats = self.session_in(actor, TurnState::PlayerTurn)?.monster.combat_stats();
        let character = self.character(actor)?;

        let skill = match skill_name {
            Some(name) => {
                let skill = self
                    .skills
                    .get(name)
                    .ok_or_else(|| CombatError::UnknownSkill(name.to_string()))?
                    .clone();
                let turns_left = self.store.get_skill_cooldown(actor, &skill.name);
                if turns_left > 0 {
                    return Err(CombatError::SkillOnCooldown {
                        skill: skill.name,
                        turns_left,
                    });
                }
                if character.mana < skill.mana_cost {
                    return Err(CombatError::InsufficientMana {
                        have: character.mana,
                        need: skill.mana_cost,
                    });
                }
                Some(skill)
            }
            None => None,
        };

        let mut update = CharacterUpdate::default();
        let action = match &skill {
            Some(skill) => {
                update.mana = Some(character.mana - skill.mana_cost);
                match skill.effect {
                    SkillEffect::Heal { heal_percent } => {
                        let amount = (character.max_health as f64 * heal_percent).floor() as u32;
                        let new_health = character.health.saturating_add(amount).min(character.max_health);
                        update.health = Some(new_health);
                        PlayerAction::Heal {
                            skill: skill.name.clone(),
                            amount,
                            new_health,
                        }
                    }
                    SkillEffect::DefensiveStance { duration } => PlayerAction::DefensiveStance {
                        skill: skill.name.clone(),
                        turns: duration,
                    },
                    SkillEffect::Strike { damage_multiplier } => PlayerAction::Attack {
                        skill: Some(skill.name.clone()),
                        damage: compute_damage(
                            character.combat_stats(),
                            monster_stats,
                            Some(damage_multiplier),
                            &mut self.rng,
                        ),
                    },
                }
            }
            None => PlayerAction::Attack {
                skill: None,
                damage: compute_damage(character.combat_stats(), monster_stats, None, &mut self.rng),
            },
        };

        if !update.is_empty() {
            self.store.update_character(actor, &update)?;
        }
        if let Some(skill) = &skill {
            if let Err(e) = self.store.set_skill_cooldown(actor, &skill.name, skill.cooldown) {
                let restore = CharacterUpdate {
                    health: Some(character.health),
                    mana: Some(character.mana),
                    ..CharacterUpdate::default()
                };
                if let Err(rollback) = self.store.update_character(actor, &restore) {
                    error!("Actor {} left with spent mana after failed cooldown write: {}", actor, rollback);
                }
                return Err(e.into());
            }
        }

        let session = self.session_mut(actor)?;
        match &action {
            PlayerAction::Attack { damage, .. } => session.monster.take_damage(*damage),
            PlayerAction::DefensiveStance { turns, .. } => {
                session.player_effects.insert(StatusEffect::DefensiveStance, *turns);
            }
            PlayerAction::Heal { .. } => {}
        }
        debug!("Actor {} {:?}; {} at {}", actor, action, session.monster.name, session.monster.current_health);

        let defeated = if session.monster.is_defeated() {
            session.turn = TurnState::Resolved(Resolution::Victory);
            info!("Actor {} defeated {}", actor, session.monster.name);
            Some(DefeatedMonster {
                actor,
                monster: session.monster.clone(),
            })
        } else {
            session.turn = TurnState::MonsterTurn;
            None
        };

        Ok(AttackOutcome {
            action,
            monster_health: session.monster.current_health,
            monster_max_health: session.monster.max_health,
            player_health: update.health.unwrap_or(character.health),
            player_mana: update.mana.unwrap_or(character.mana),
            defeated,
        })
    }

    /// Resolve the monster's single attack
    pub fn process_monster_turn(&mut self, actor: ActorId) -> Result<MonsterTurnReport, CombatError> {
        let session = self.session_in(actor, TurnState::MonsterTurn)?;
        let monster_stats = session.monster.combat_stats();
        let reduced = session.player_effect(StatusEffect::DefensiveStance) > 0;
        let character = self.character(actor)?;

        let mut damage = compute_damage(monster_stats, character.combat_stats(), None, &mut self.rng);
        if reduced {
            damage = (damage as f64 * DEFENSIVE_STANCE_REDUCTION).floor() as u32;
        }
        let player_health = character.health.saturating_sub(damage);
        self.store.update_character(actor, &CharacterUpdate::health(player_health))?;

        let session = self.session_mut(actor)?;
        if reduced {
            if let Some(turns) = session.player_effects.get_mut(&StatusEffect::DefensiveStance) {
                *turns -= 1;
                if *turns == 0 {
                    session.player_effects.remove(&StatusEffect::DefensiveStance);
                }
            }
        }

        let player_defeated = player_health == 0;
        if player_defeated {
            session.turn = TurnState::Resolved(Resolution::Defeat);
            info!("Actor {} was defeated by {}", actor, session.monster.name);
        } else {
            session.turn_count += 1;
            session.turn = TurnState::PlayerTurn;
        }
        let report = MonsterTurnReport {
            monster_name: session.monster.name.clone(),
            damage,
            reduced,
            player_health,
            player_max_health: character.max_health,
            player_defeated,
            turn_count: session.turn_count,
        };
        debug!("Actor {} took {} from {}", actor, damage, report.monster_name);

        if !player_defeated {
            if let Err(e) = self.store.update_skill_cooldowns(actor) {
                warn!("Failed to tick cooldowns for actor {}: {}", actor, e);
            }
        }
        Ok(report)
    }

    /// Try to escape. On failure the monster attacks immediately.
    pub fn flee(&mut self, actor: ActorId) -> Result<FleeOutcome, CombatError> {
        self.session_in(actor, TurnState::PlayerTurn)?;

        let roll = self.rng.roll(1, 100);
        if roll <= FLEE_SUCCESS_THRESHOLD {
            let mut session = self.end_combat(actor).ok_or(CombatError::NoActiveCombat)?;
            session.turn = TurnState::Resolved(Resolution::Fled);
            return Ok(FleeOutcome::Escaped(session));
        }

        debug!("Actor {} failed to flee (rolled {})", actor, roll);
        self.session_mut(actor)?.turn = TurnState::MonsterTurn;
        match self.process_monster_turn(actor) {
            Ok(report) => Ok(FleeOutcome::Caught(report)),
            Err(e) => {
                if let Some(session) = self.registry.get_mut(actor) {
                    session.turn = TurnState::PlayerTurn;
                }
                Err(e)
            }
        }
    }

    // =========================================================================
    // Rewards
    // =========================================================================

    /// Grant xp, coins and loot for a kill and commit them to the store
    pub fn distribute_rewards(&mut self, defeated: DefeatedMonster) -> Result<RewardSummary, CombatError> {
        let DefeatedMonster { actor, monster } = defeated;
        let character = self.character(actor)?;

        let xp = monster.xp_reward;
        let coins = roll_coins(xp, &mut self.rng);
        let items = roll_loot(&monster.loot_table, &mut self.rng);

        let (mut update, level_up) = apply_experience(&character, xp);
        update.coins = Some(character.coins.saturating_add(u64::from(coins)));

        // Loot first, character last; any failure takes back what was added
        let mut added = Vec::with_capacity(items.len());
        let mut result = Ok(());
        for drop in &items {
            result = self.store.add_item(actor, &drop.name, drop.quantity);
            if result.is_err() {
                break;
            }
            added.push(drop);
        }
        if result.is_ok() {
            result = self.store.update_character(actor, &update);
        }
        if let Err(e) = result {
            for drop in added {
                if let Err(rollback) = self.store.remove_item(actor, &drop.name, drop.quantity) {
                    error!(
                        "Actor {} kept {} x{} after failed reward write: {}",
                        actor, drop.name, drop.quantity, rollback
                    );
                }
            }
            return Err(e.into());
        }

        info!("Actor {} earned {} xp, {} coins, {} items from {}", actor, xp, coins, items.len(), monster.name);
        Ok(RewardSummary {
            xp,
            coins,
            items,
            level_up,
        })
    }

    // =========================================================================
    // Skills
    // =========================================================================

    pub fn available_skills(&self, actor: ActorId) -> Result<Vec<SkillAvailability>, CombatError> {
        let character = self.character(actor)?;
        Ok(self
            .skills
            .iter()
            .map(|skill| {
                let cooldown_remaining = self.store.get_skill_cooldown(actor, &skill.name);
                SkillAvailability {
                    skill: skill.clone(),
                    cooldown_remaining,
                    can_use: cooldown_remaining == 0 && character.mana >= skill.mana_cost,
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;
    use crate::random::ScriptedRandom;
    use std::collections::BTreeMap;
    use swordsong_shared::{AreaDefinition, MonsterTemplate, Rarity};

    fn template(name: &str, health: u32, rarity: Rarity) -> MonsterTemplate {
        MonsterTemplate {
            name: name.into(),
            description: String::new(),
            health,
            attack: 5,
            defense: 2,
            rarity,
            xp_reward: 20,
            loot_table: BTreeMap::new(),
        }
    }

    fn engine() -> CombatEngine<MemoryStore, ScriptedRandom> {
        let areas = AreaCatalog::new(
            "meadow",
            BTreeMap::from([(
                "meadow".to_string(),
                AreaDefinition {
                    monsters: vec![template("Rat", 10, Rarity::Common)],
                },
            )]),
        )
        .unwrap();
        let mut engine = CombatEngine::new(
            MemoryStore::new(),
            EncounterRegistry::new(),
            areas,
            SkillCatalog::default(),
            ScriptedRandom::new(),
        );
        engine.enroll(1, "Aria").unwrap();
        engine
    }

    #[test]
    fn test_enroll_twice() {
        let mut engine = engine();
        assert_eq!(engine.enroll(1, "Again").unwrap_err(), CombatError::AlreadyEnrolled(1));
        assert_eq!(engine.character(1).unwrap().current_area, "meadow");
    }

    #[test]
    fn test_action_without_combat() {
        let mut engine = engine();
        assert_eq!(engine.process_player_attack(1, None).unwrap_err(), CombatError::NoActiveCombat);
        assert_eq!(engine.process_monster_turn(1).unwrap_err(), CombatError::NoActiveCombat);
        assert_eq!(engine.flee(1).unwrap_err(), CombatError::NoActiveCombat);
    }

    #[test]
    fn test_out_of_turn_actions_rejected() {
        let mut engine = engine();
        engine.begin_encounter(1).unwrap();
        assert_eq!(engine.process_monster_turn(1).unwrap_err(), CombatError::NotMonsterTurn);

        // 10 - 1 = 9 damage leaves the rat at 1
        engine.process_player_attack(1, None).unwrap();
        assert_eq!(engine.process_player_attack(1, None).unwrap_err(), CombatError::NotPlayerTurn);
        assert_eq!(engine.flee(1).unwrap_err(), CombatError::NotPlayerTurn);
    }

    #[test]
    fn test_lethal_hit_resolves_victory() {
        let mut engine = engine();
        engine.begin_encounter(1).unwrap();
        engine.process_player_attack(1, None).unwrap();
        engine.process_monster_turn(1).unwrap();

        let outcome = engine.process_player_attack(1, None).unwrap();
        assert!(outcome.monster_defeated());
        assert_eq!(outcome.monster_health, 0);
        assert_eq!(
            engine.combat_state(1).unwrap().turn,
            TurnState::Resolved(Resolution::Victory)
        );
        assert_eq!(engine.process_monster_turn(1).unwrap_err(), CombatError::CombatResolved);
        assert_eq!(engine.process_player_attack(1, None).unwrap_err(), CombatError::CombatResolved);

        let summary = engine.distribute_rewards(outcome.defeated.unwrap()).unwrap();
        assert_eq!(summary.xp, 20);
        assert_eq!(engine.character(1).unwrap().xp, 20);
        assert!(engine.end_combat(1).is_some());
    }

    #[test]
    fn test_unknown_skill_mutates_nothing() {
        let mut engine = engine();
        engine.begin_encounter(1).unwrap();
        assert_eq!(
            engine.process_player_attack(1, Some("Meteor")).unwrap_err(),
            CombatError::UnknownSkill("Meteor".into())
        );
        assert_eq!(engine.character(1).unwrap().mana, 50);
        assert_eq!(engine.combat_state(1).unwrap().turn, TurnState::PlayerTurn);
    }

    #[test]
    fn test_healing_pulse() {
        let mut engine = engine();
        engine.store_mut().update_character(1, &CharacterUpdate::health(30)).unwrap();
        engine.begin_encounter(1).unwrap();

        let outcome = engine.process_player_attack(1, Some("Healing Pulse")).unwrap();
        assert_eq!(
            outcome.action,
            PlayerAction::Heal { skill: "Healing Pulse".into(), amount: 40, new_health: 70 }
        );
        assert_eq!(outcome.monster_health, 10);
        let c = engine.character(1).unwrap();
        assert_eq!((c.health, c.mana), (70, 35));
        assert_eq!(engine.combat_state(1).unwrap().turn, TurnState::MonsterTurn);
    }

    #[test]
    fn test_defensive_stance_halves_and_expires() {
        let mut engine = engine();
        engine.begin_encounter(1).unwrap();
        engine.process_player_attack(1, Some("Defensive Stance")).unwrap();
        assert_eq!(engine.combat_state(1).unwrap().player_effect(StatusEffect::DefensiveStance), 3);

        // Monster: 5 - 5 * 0.5 = 2.5 -> 2, halved -> 1
        for remaining in [2, 1, 0] {
            let report = engine.process_monster_turn(1).unwrap();
            assert!(report.reduced);
            assert_eq!(report.damage, 1);
            let session = engine.combat_state(1).unwrap();
            assert_eq!(session.player_effect(StatusEffect::DefensiveStance), remaining);
            engine.registry.get_mut(1).unwrap().turn = TurnState::MonsterTurn;
        }
        assert!(engine.combat_state(1).unwrap().player_effects.is_empty());

        let report = engine.process_monster_turn(1).unwrap();
        assert!(!report.reduced);
        assert_eq!(report.damage, 2);
    }

    #[test]
    fn test_defeat_resolves_session() {
        let mut engine = engine();
        engine.store_mut().update_character(1, &CharacterUpdate::health(2)).unwrap();
        engine.begin_encounter(1).unwrap();
        engine.process_player_attack(1, None).unwrap();

        let report = engine.process_monster_turn(1).unwrap();
        assert!(report.player_defeated);
        assert_eq!(report.player_health, 0);
        assert_eq!(report.turn_count, 1);
        assert_eq!(
            engine.combat_state(1).unwrap().turn,
            TurnState::Resolved(Resolution::Defeat)
        );

        engine.end_combat(1);
        assert_eq!(engine.begin_encounter(1).unwrap_err(), CombatError::TooWeakToFight);
    }

    #[test]
    fn test_successful_flee_ends_session() {
        let mut engine = engine();
        engine.rng_mut().push_roll(70);
        engine.begin_encounter(1).unwrap();

        match engine.flee(1).unwrap() {
            FleeOutcome::Escaped(session) => {
                assert_eq!(session.turn, TurnState::Resolved(Resolution::Fled));
            }
            FleeOutcome::Caught(_) => panic!("roll of 70 should escape"),
        }
        assert!(engine.combat_state(1).is_none());
    }

    #[test]
    fn test_rest_outside_combat_only() {
        let mut engine = engine();
        engine.store_mut().update_character(1, &CharacterUpdate::health(1)).unwrap();
        let outcome = engine.rest(1).unwrap();
        assert_eq!(outcome, RestOutcome { restored: 99, health: 100, max_health: 100 });

        engine.begin_encounter(1).unwrap();
        assert_eq!(engine.rest(1).unwrap_err(), CombatError::AlreadyInCombat);
    }

    #[test]
    fn test_rest_with_overfull_health() {
        let mut engine = engine();
        engine.store_mut().update_character(1, &CharacterUpdate::health(130)).unwrap();
        let outcome = engine.rest(1).unwrap();
        assert_eq!(outcome, RestOutcome { restored: 0, health: 100, max_health: 100 });
        assert_eq!(engine.character(1).unwrap().health, 100);
    }

    #[test]
    fn test_retire_ends_combat_and_deletes() {
        let mut engine = engine();
        engine.begin_encounter(1).unwrap();
        engine.retire(1).unwrap();
        assert!(engine.combat_state(1).is_none());
        assert_eq!(engine.character(1).unwrap_err(), CombatError::CharacterNotFound(1));
        assert_eq!(engine.retire(1).unwrap_err(), CombatError::CharacterNotFound(1));
    }

    #[test]
    fn test_spawn_unknown_area() {
        let mut engine = engine();
        assert_eq!(
            engine.spawn_monster(1, "volcano").unwrap_err(),
            CombatError::UnknownArea("volcano".into())
        );
    }

    #[test]
    fn test_available_skills() {
        let mut engine = engine();
        engine.store_mut().update_character(1, &CharacterUpdate::mana(15)).unwrap();
        engine.store_mut().set_skill_cooldown(1, "Power Strike", 2).unwrap();

        let skills = engine.available_skills(1).unwrap();
        let row = |name: &str| skills.iter().find(|s| s.skill.name == name).unwrap();
        assert_eq!(row("Power Strike").cooldown_remaining, 2);
        assert!(!row("Power Strike").can_use);
        assert!(!row("Fire Ball").can_use);
        assert!(row("Healing Pulse").can_use);
        assert!(!row("Defensive Stance").can_use);
    }
}
