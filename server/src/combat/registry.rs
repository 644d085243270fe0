//! Live encounters, one per actor.

use std::collections::{BTreeMap, HashMap};

use swordsong_shared::{ActorId, StatusEffect, TurnState};

use super::CombatError;
use crate::entities::MonsterInstance;

/// One active encounter between an actor and a monster
#[derive(Debug, Clone, PartialEq)]
pub struct CombatSession {
    pub monster: MonsterInstance,
    pub turn: TurnState,
    /// Starts at 1, incremented after each completed monster turn
    pub turn_count: u32,
    /// Effect -> remaining monster turns
    pub player_effects: BTreeMap<StatusEffect, u32>,
    /// Unused by the current monster AI
    pub monster_effects: BTreeMap<StatusEffect, u32>,
}

impl CombatSession {
    fn new(monster: MonsterInstance) -> Self {
        Self {
            monster,
            turn: TurnState::PlayerTurn,
            turn_count: 1,
            player_effects: BTreeMap::new(),
            monster_effects: BTreeMap::new(),
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self.turn, TurnState::Resolved(_))
    }

    /// Remaining turns of a player effect, 0 if absent
    pub fn player_effect(&self, effect: StatusEffect) -> u32 {
        self.player_effects.get(&effect).copied().unwrap_or(0)
    }
}

/// Actor id -> active session
#[derive(Debug, Default)]
pub struct EncounterRegistry {
    sessions: HashMap<ActorId, CombatSession>,
}

impl EncounterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session in `PlayerTurn`; fails if the actor already has one
    pub fn start_combat(
        &mut self,
        actor: ActorId,
        monster: MonsterInstance,
    ) -> Result<&CombatSession, CombatError> {
        use std::collections::hash_map::Entry;

        match self.sessions.entry(actor) {
            Entry::Occupied(_) => Err(CombatError::AlreadyInCombat),
            Entry::Vacant(slot) => Ok(slot.insert(CombatSession::new(monster))),
        }
    }

    pub fn get(&self, actor: ActorId) -> Option<&CombatSession> {
        self.sessions.get(&actor)
    }

    pub fn get_mut(&mut self, actor: ActorId) -> Option<&mut CombatSession> {
        self.sessions.get_mut(&actor)
    }

    pub fn contains(&self, actor: ActorId) -> bool {
        self.sessions.contains_key(&actor)
    }

    /// Remove the actor's session, if any
    pub fn end_combat(&mut self, actor: ActorId) -> Option<CombatSession> {
        self.sessions.remove(&actor)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
