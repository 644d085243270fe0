//! Character store contract and its in-memory implementation.
//!
//! The engine reads and writes characters only through [`CharacterStore`].
//! [`MemoryStore`] keeps every actor in memory and, when given a
//! [`PersistenceHandle`], queues a snapshot after each successful mutation so
//! the game loop never waits on the database.

use std::collections::{BTreeMap, HashMap};

use log::debug;
use serde::{Deserialize, Serialize};
use swordsong_shared::ActorId;
use thiserror::Error;

use super::PersistenceHandle;
use crate::entities::{Character, CharacterUpdate, FightStats};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("no character for actor {0}")]
    CharacterNotFound(ActorId),

    #[error("actor {0} already has a character")]
    AlreadyExists(ActorId),

    #[error("quantity must be greater than 0")]
    InvalidQuantity,

    #[error("{item} not in inventory")]
    ItemNotFound { item: String },

    #[error("not enough {item}: have {have}, need {need}")]
    InsufficientQuantity { item: String, have: u32, need: u32 },

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Per-actor persistence contract used by the combat engine.
///
/// Mutations take `&mut self`: a store has a single writer, so a turn's
/// read-modify-write on one actor cannot interleave with another operation.
pub trait CharacterStore {
    fn get_character(&self, id: ActorId) -> Option<Character>;

    fn create_character(&mut self, character: Character) -> Result<(), StoreError>;

    fn update_character(&mut self, id: ActorId, update: &CharacterUpdate) -> Result<(), StoreError>;

    /// Remove the character along with its inventory, fight stats and cooldowns
    fn delete_character(&mut self, id: ActorId) -> Result<(), StoreError>;

    fn get_inventory(&self, id: ActorId) -> Vec<(String, u32)>;

    fn add_item(&mut self, id: ActorId, item: &str, quantity: u32) -> Result<(), StoreError>;

    fn remove_item(&mut self, id: ActorId, item: &str, quantity: u32) -> Result<(), StoreError>;

    fn get_fight_stats(&self, id: ActorId) -> Option<FightStats>;

    /// Create zeroed fight stats if missing; returns the current stats
    fn initialize_fight_stats(&mut self, id: ActorId) -> Result<FightStats, StoreError>;

    fn update_fight_stats(&mut self, id: ActorId, stats: FightStats) -> Result<(), StoreError>;

    /// Remaining turns; 0 when the skill is ready
    fn get_skill_cooldown(&self, id: ActorId, skill: &str) -> u32;

    fn set_skill_cooldown(&mut self, id: ActorId, skill: &str, turns: u32) -> Result<(), StoreError>;

    fn is_skill_on_cooldown(&self, id: ActorId, skill: &str) -> bool {
        self.get_skill_cooldown(id, skill) > 0
    }

    /// Decrement every active cooldown by one turn, pruning those that reach 0
    fn update_skill_cooldowns(&mut self, id: ActorId) -> Result<(), StoreError>;
}

/// Everything persisted for one actor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorSnapshot {
    pub character: Character,
    pub fight_stats: Option<FightStats>,
    /// Skill name -> remaining turns, only entries > 0
    pub cooldowns: BTreeMap<String, u32>,
}

impl ActorSnapshot {
    pub fn new(character: Character) -> Self {
        Self {
            character,
            fight_stats: None,
            cooldowns: BTreeMap::new(),
        }
    }
}

/// In-memory character store with optional write-behind persistence
#[derive(Debug, Default)]
pub struct MemoryStore {
    actors: HashMap<ActorId, ActorSnapshot>,
    persistence: Option<PersistenceHandle>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a snapshot on `handle` after every successful mutation
    pub fn with_persistence(mut self, handle: PersistenceHandle) -> Self {
        self.persistence = Some(handle);
        self
    }

    /// Seed the store with previously saved actors. Health and mana are capped at their maximums.
    pub fn with_snapshots(mut self, snapshots: impl IntoIterator<Item = ActorSnapshot>) -> Self {
        for mut snapshot in snapshots {
            let c = &mut snapshot.character;
            c.health = c.health.min(c.max_health);
            c.mana = c.mana.min(c.max_mana);
            self.actors.insert(snapshot.character.id, snapshot);
        }
        self
    }

    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    pub fn snapshot(&self, id: ActorId) -> Option<&ActorSnapshot> {
        self.actors.get(&id)
    }

    fn actor_mut(&mut self, id: ActorId) -> Result<&mut ActorSnapshot, StoreError> {
        self.actors.get_mut(&id).ok_or(StoreError::CharacterNotFound(id))
    }

    fn persist(&self, id: ActorId) {
        if let (Some(handle), Some(snapshot)) = (&self.persistence, self.actors.get(&id)) {
            handle.save_actor(snapshot.clone());
        }
    }
}

impl CharacterStore for MemoryStore {
    fn get_character(&self, id: ActorId) -> Option<Character> {
        self.actors.get(&id).map(|a| a.character.clone())
    }

    fn create_character(&mut self, character: Character) -> Result<(), StoreError> {
        let id = character.id;
        if self.actors.contains_key(&id) {
            return Err(StoreError::AlreadyExists(id));
        }
        self.actors.insert(id, ActorSnapshot::new(character));
        self.persist(id);
        Ok(())
    }

    fn update_character(&mut self, id: ActorId, update: &CharacterUpdate) -> Result<(), StoreError> {
        if update.is_empty() {
            return Ok(());
        }
        self.actor_mut(id)?.character.apply(update);
        self.persist(id);
        Ok(())
    }

    fn delete_character(&mut self, id: ActorId) -> Result<(), StoreError> {
        self.actors.remove(&id).ok_or(StoreError::CharacterNotFound(id))?;
        if let Some(handle) = &self.persistence {
            handle.delete_actor(id);
        }
        Ok(())
    }

    fn get_inventory(&self, id: ActorId) -> Vec<(String, u32)> {
        self.actors
            .get(&id)
            .map(|a| {
                a.character
                    .inventory
                    .iter()
                    .map(|(name, qty)| (name.clone(), *qty))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn add_item(&mut self, id: ActorId, item: &str, quantity: u32) -> Result<(), StoreError> {
        if quantity == 0 {
            return Err(StoreError::InvalidQuantity);
        }
        let actor = self.actor_mut(id)?;
        let slot = actor.character.inventory.entry(item.to_string()).or_insert(0);
        *slot = slot.saturating_add(quantity);
        self.persist(id);
        Ok(())
    }

    fn remove_item(&mut self, id: ActorId, item: &str, quantity: u32) -> Result<(), StoreError> {
        if quantity == 0 {
            return Err(StoreError::InvalidQuantity);
        }
        let actor = self.actor_mut(id)?;
        let have = *actor
            .character
            .inventory
            .get(item)
            .ok_or_else(|| StoreError::ItemNotFound { item: item.to_string() })?;
        if have < quantity {
            return Err(StoreError::InsufficientQuantity {
                item: item.to_string(),
                have,
                need: quantity,
            });
        }
        if have == quantity {
            actor.character.inventory.remove(item);
        } else {
            actor.character.inventory.insert(item.to_string(), have - quantity);
        }
        self.persist(id);
        Ok(())
    }

    fn get_fight_stats(&self, id: ActorId) -> Option<FightStats> {
        self.actors.get(&id).and_then(|a| a.fight_stats)
    }

    fn initialize_fight_stats(&mut self, id: ActorId) -> Result<FightStats, StoreError> {
        let actor = self.actor_mut(id)?;
        if let Some(stats) = actor.fight_stats {
            return Ok(stats);
        }
        actor.fight_stats = Some(FightStats::default());
        self.persist(id);
        Ok(FightStats::default())
    }

    fn update_fight_stats(&mut self, id: ActorId, stats: FightStats) -> Result<(), StoreError> {
        self.actor_mut(id)?.fight_stats = Some(stats);
        self.persist(id);
        Ok(())
    }

    fn get_skill_cooldown(&self, id: ActorId, skill: &str) -> u32 {
        self.actors
            .get(&id)
            .and_then(|a| a.cooldowns.get(skill).copied())
            .unwrap_or(0)
    }

    fn set_skill_cooldown(&mut self, id: ActorId, skill: &str, turns: u32) -> Result<(), StoreError> {
        let actor = self.actor_mut(id)?;
        if turns == 0 {
            actor.cooldowns.remove(skill);
        } else {
            actor.cooldowns.insert(skill.to_string(), turns);
        }
        self.persist(id);
        Ok(())
    }

    fn update_skill_cooldowns(&mut self, id: ActorId) -> Result<(), StoreError> {
        let actor = self.actor_mut(id)?;
        if actor.cooldowns.is_empty() {
            return Ok(());
        }
        for turns in actor.cooldowns.values_mut() {
            *turns = turns.saturating_sub(1);
        }
        actor.cooldowns.retain(|_, turns| *turns > 0);
        debug!("Actor {} cooldowns now {:?}", id, actor.cooldowns);
        self.persist(id);
        Ok(())
    }
}
