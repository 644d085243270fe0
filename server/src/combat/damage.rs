//! Damage model shared by player and monster attacks.

use crate::entities::CombatStats;
use crate::random::RandomProvider;

pub const DAMAGE_VARIANCE_MIN: f64 = 0.8;
pub const DAMAGE_VARIANCE_MAX: f64 = 1.2;
pub const MIN_DAMAGE: u32 = 1;
/// Fraction of the defender's defense subtracted from the attack
const DEFENSE_FACTOR: f64 = 0.5;

/// Damage for a fixed variance factor.
///
/// `(attack * multiplier - defense * 0.5) * variance`, floored, never below 1.
pub fn damage_with_variance(
    attacker: CombatStats,
    defender: CombatStats,
    multiplier: Option<f64>,
    variance: f64,
) -> u32 {
    let multiplier = multiplier.unwrap_or(1.0);
    let base = attacker.attack as f64 * multiplier - defender.defense as f64 * DEFENSE_FACTOR;
    let damage = (base * variance).floor();

    // `as` saturates and NaN falls through `max` to the floor
    damage.max(MIN_DAMAGE as f64) as u32
}

/// Roll variance from `rng` and compute damage
pub fn compute_damage<R: RandomProvider + ?Sized>(
    attacker: CombatStats,
    defender: CombatStats,
    multiplier: Option<f64>,
    rng: &mut R,
) -> u32 {
    let variance = rng.uniform(DAMAGE_VARIANCE_MIN, DAMAGE_VARIANCE_MAX);
    damage_with_variance(attacker, defender, multiplier, variance)
}
