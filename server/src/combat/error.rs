//! Recoverable failures returned by the combat engine.

use swordsong_shared::ActorId;
use thiserror::Error;

use crate::persistence::StoreError;

/// Every failure is per-actor; the caller renders a message and carries on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CombatError {
    #[error("actor {0} has no character")]
    CharacterNotFound(ActorId),

    #[error("actor {0} already has a character")]
    AlreadyEnrolled(ActorId),

    #[error("no active combat")]
    NoActiveCombat,

    #[error("already in combat")]
    AlreadyInCombat,

    #[error("not the player's turn")]
    NotPlayerTurn,

    #[error("not the monster's turn")]
    NotMonsterTurn,

    /// The encounter was won or lost and only awaits `end_combat`
    #[error("combat is already over")]
    CombatResolved,

    #[error("{skill} is on cooldown for {turns_left} more turns")]
    SkillOnCooldown { skill: String, turns_left: u32 },

    #[error("not enough mana: have {have}, need {need}")]
    InsufficientMana { have: u32, need: u32 },

    #[error("unknown skill {0:?}")]
    UnknownSkill(String),

    #[error("unknown area {0:?}")]
    UnknownArea(String),

    #[error("no monsters available in {0}")]
    NoMonstersAvailable(String),

    #[error("too weak to fight")]
    TooWeakToFight,

    #[error("persistence error: {0}")]
    Persistence(String),
}

impl From<StoreError> for CombatError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::CharacterNotFound(id) => Self::CharacterNotFound(id),
            StoreError::AlreadyExists(id) => Self::AlreadyEnrolled(id),
            other => Self::Persistence(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_map_to_combat_errors() {
        assert_eq!(
            CombatError::from(StoreError::CharacterNotFound(4)),
            CombatError::CharacterNotFound(4)
        );
        assert_eq!(
            CombatError::from(StoreError::Unavailable("disk full".into())),
            CombatError::Persistence("store unavailable: disk full".into())
        );
    }
}
