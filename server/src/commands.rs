//! Console command system: the text front end for the combat engine.
//!
//! Each line is one command. A leading `.` is accepted, matching the chat
//! bot prefix. All user-facing text is produced here; the engine only
//! returns structured results.

use swordsong_shared::{
    ActorId, MonsterTurnReport, PlayerAction, RewardSummary, TurnState,
};

use crate::combat::{AttackOutcome, CombatEngine, CombatError, FleeOutcome};
use crate::persistence::CharacterStore;
use crate::random::RandomProvider;

/// Result of executing a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    /// Whether the command was successful
    pub success: bool,
    /// Message to display to the user
    pub message: String,
    /// The front end should stop reading input
    pub quit: bool,
}

impl CommandResult {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            quit: false,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            quit: false,
        }
    }

    fn quit(message: impl Into<String>) -> Self {
        Self {
            quit: true,
            ..Self::success(message)
        }
    }
}

impl From<CombatError> for CommandResult {
    fn from(err: CombatError) -> Self {
        Self::error(describe_error(&err))
    }
}

/// Parse and execute a console command.
/// Returns None for blank input.
pub fn parse_and_execute<S: CharacterStore, R: RandomProvider>(
    content: &str,
    actor: ActorId,
    engine: &mut CombatEngine<S, R>,
) -> Option<CommandResult> {
    let content = content.trim();
    let content = content.strip_prefix('.').unwrap_or(content);

    let parts: Vec<&str> = content.split_whitespace().collect();
    if parts.is_empty() {
        return None;
    }

    let command = parts[0].to_lowercase();
    let args = &parts[1..];

    Some(match command.as_str() {
        "help" => cmd_help(),
        "start" | "enroll" => cmd_start(actor, args, engine),
        "profile" | "stats" => cmd_profile(actor, engine),
        "inventory" | "inv" => cmd_inventory(actor, engine),
        "rest" => cmd_rest(actor, engine),
        "retire" => cmd_retire(actor, engine),
        "quit" | "exit" => CommandResult::quit("Farewell, adventurer."),

        // === Combat ===
        "fight" => cmd_fight(actor, engine),
        "attack" => cmd_action(actor, None, engine),
        "skill" => {
            if args.is_empty() {
                CommandResult::error("Usage: skill <name>")
            } else {
                let name = args.join(" ");
                match resolve_skill_name(&name, engine) {
                    Some(skill) => cmd_action(actor, Some(&skill), engine),
                    None => CommandResult::error(format!("Unknown skill: {}", name)),
                }
            }
        }
        "skills" => cmd_skills(actor, engine),
        "flee" | "run" => cmd_flee(actor, engine),

        _ => CommandResult::error(format!("Unknown command: {} (try help)", command)),
    })
}

/// End the actor's encounter after the turn timer ran out
pub fn expire_encounter<S: CharacterStore, R: RandomProvider>(
    actor: ActorId,
    engine: &mut CombatEngine<S, R>,
) -> Option<CommandResult> {
    let session = engine.end_combat(actor)?;
    Some(CommandResult::error(format!(
        "You hesitated too long. The {} wanders off and the fight is over.",
        session.monster.name
    )))
}

fn describe_error(err: &CombatError) -> String {
    match err {
        CombatError::CharacterNotFound(_) => {
            "You have no character yet. Type `start <name>` to join the guild.".to_string()
        }
        CombatError::AlreadyEnrolled(_) => "You are already a member of the guild.".to_string(),
        CombatError::NoActiveCombat => "You are not in combat. Type `fight` to find a monster.".to_string(),
        CombatError::AlreadyInCombat => "You are already in combat!".to_string(),
        CombatError::NotPlayerTurn => "Wait for your turn.".to_string(),
        CombatError::SkillOnCooldown { skill, turns_left } => {
            format!("{} is on cooldown for {} more turn(s).", skill, turns_left)
        }
        CombatError::InsufficientMana { have, need } => {
            format!("Not enough mana! You need {} but have {}.", need, have)
        }
        CombatError::NoMonstersAvailable(area) => format!("No monsters roam the {} right now.", area),
        CombatError::TooWeakToFight => "You are too weak to fight. Type `rest` first.".to_string(),
        other => format!("Error: {}", other),
    }
}

/// Case-insensitive lookup so `skill fire ball` works
fn resolve_skill_name<S: CharacterStore, R: RandomProvider>(
    name: &str,
    engine: &CombatEngine<S, R>,
) -> Option<String> {
    engine
        .skills()
        .iter()
        .find(|s| s.name.eq_ignore_ascii_case(name))
        .map(|s| s.name.clone())
}

// =============================================================================
// Character Commands
// =============================================================================

fn cmd_help() -> CommandResult {
    let mut help = String::from("Available commands:\n");
    help.push_str("  start <name> - Join the guild\n");
    help.push_str("  profile - Show your stats\n");
    help.push_str("  inventory - Show your items\n");
    help.push_str("  rest - Rest at the campfire\n");
    help.push_str("  retire - Leave the guild (deletes your character)\n");
    help.push_str("\nCombat:\n");
    help.push_str("  fight - Look for a monster\n");
    help.push_str("  attack - Basic attack\n");
    help.push_str("  skill <name> - Use a skill\n");
    help.push_str("  skills - List skills and cooldowns\n");
    help.push_str("  flee - Try to run away\n");
    help.push_str("\n  quit - Exit\n");
    CommandResult::success(help)
}

fn cmd_start<S: CharacterStore, R: RandomProvider>(
    actor: ActorId,
    args: &[&str],
    engine: &mut CombatEngine<S, R>,
) -> CommandResult {
    if args.is_empty() {
        return CommandResult::error("Usage: start <name>");
    }
    let name = args.join(" ");
    match engine.enroll(actor, &name) {
        Ok(c) => CommandResult::success(format!(
            "Welcome to the guild, {}! You arrive in the {}. Type `fight` to begin.",
            c.name, c.current_area
        )),
        Err(e) => e.into(),
    }
}

fn cmd_profile<S: CharacterStore, R: RandomProvider>(
    actor: ActorId,
    engine: &CombatEngine<S, R>,
) -> CommandResult {
    let c = match engine.character(actor) {
        Ok(c) => c,
        Err(e) => return e.into(),
    };
    let mut msg = format!("{} - Level {}\n", c.name, c.level);
    msg.push_str(&format!("  XP: {}/{}\n", c.xp, c.xp_to_level));
    msg.push_str(&format!("  HP: {}/{}\n", c.health, c.max_health));
    msg.push_str(&format!("  MP: {}/{}\n", c.mana, c.max_mana));
    msg.push_str(&format!("  ATK: {}  DEF: {}\n", c.attack, c.defense));
    msg.push_str(&format!("  Coins: {}\n", c.coins));
    msg.push_str(&format!("  Area: {}", c.current_area));
    CommandResult::success(msg)
}

fn cmd_inventory<S: CharacterStore, R: RandomProvider>(
    actor: ActorId,
    engine: &CombatEngine<S, R>,
) -> CommandResult {
    let items = match engine.inventory(actor) {
        Ok(items) => items,
        Err(e) => return e.into(),
    };
    if items.is_empty() {
        return CommandResult::success("Your inventory is empty.");
    }
    let mut msg = String::from("Inventory:\n");
    for (name, quantity) in items {
        msg.push_str(&format!("  {} x{}\n", name, quantity));
    }
    CommandResult::success(msg.trim_end())
}

fn cmd_rest<S: CharacterStore, R: RandomProvider>(
    actor: ActorId,
    engine: &mut CombatEngine<S, R>,
) -> CommandResult {
    match engine.rest(actor) {
        Ok(rest) if rest.restored == 0 => CommandResult::success("You are already at full health."),
        Ok(rest) => CommandResult::success(format!(
            "You rest by the campfire and recover {} HP ({}/{}).",
            rest.restored, rest.health, rest.max_health
        )),
        Err(e) => e.into(),
    }
}

fn cmd_retire<S: CharacterStore, R: RandomProvider>(
    actor: ActorId,
    engine: &mut CombatEngine<S, R>,
) -> CommandResult {
    match engine.retire(actor) {
        Ok(()) => CommandResult::success("You hand in your guild badge. Your adventure ends here."),
        Err(e) => e.into(),
    }
}

// =============================================================================
// Combat Commands
// =============================================================================

fn cmd_fight<S: CharacterStore, R: RandomProvider>(
    actor: ActorId,
    engine: &mut CombatEngine<S, R>,
) -> CommandResult {
    let session = match engine.begin_encounter(actor) {
        Ok(session) => session,
        Err(e) => return e.into(),
    };
    let m = &session.monster;
    CommandResult::success(format!(
        "A wild {} ({}) appears!\n  {}\n  HP: {}/{}  ATK: {}  DEF: {}\nYour move: attack, skill <name>, or flee.",
        m.name,
        m.rarity.name(),
        m.description,
        m.current_health,
        m.max_health,
        m.attack,
        m.defense
    ))
}

fn cmd_skills<S: CharacterStore, R: RandomProvider>(
    actor: ActorId,
    engine: &CombatEngine<S, R>,
) -> CommandResult {
    let skills = match engine.available_skills(actor) {
        Ok(skills) => skills,
        Err(e) => return e.into(),
    };
    let mut msg = String::from("Skills:\n");
    for row in skills {
        let status = if row.can_use {
            "ready".to_string()
        } else if row.cooldown_remaining > 0 {
            format!("cooldown {}", row.cooldown_remaining)
        } else {
            "not enough mana".to_string()
        };
        let power = row
            .skill
            .damage_multiplier()
            .map(|m| format!(", x{:.1} dmg", m))
            .unwrap_or_default();
        msg.push_str(&format!(
            "  {} ({} MP, cd {}{}) [{}] - {}\n",
            row.skill.name, row.skill.mana_cost, row.skill.cooldown, power, status, row.skill.description
        ));
    }
    CommandResult::success(msg.trim_end())
}

/// Player action followed by either rewards or the monster's reply
fn cmd_action<S: CharacterStore, R: RandomProvider>(
    actor: ActorId,
    skill: Option<&str>,
    engine: &mut CombatEngine<S, R>,
) -> CommandResult {
    let outcome = match engine.process_player_attack(actor, skill) {
        Ok(outcome) => outcome,
        Err(e) => return e.into(),
    };
    let mut msg = describe_action(&outcome);

    if let Some(defeated) = outcome.defeated {
        let name = defeated.monster().name.clone();
        msg.push_str(&format!("\nVictory! The {} is defeated.", name));
        let result = engine.distribute_rewards(defeated);
        engine.end_combat(actor);
        return match result {
            Ok(rewards) => {
                msg.push_str(&describe_rewards(&rewards));
                CommandResult::success(msg)
            }
            Err(e) => {
                msg.push('\n');
                msg.push_str(&describe_error(&e));
                CommandResult::error(msg)
            }
        };
    }

    monster_reply(actor, msg, engine)
}

fn cmd_flee<S: CharacterStore, R: RandomProvider>(
    actor: ActorId,
    engine: &mut CombatEngine<S, R>,
) -> CommandResult {
    match engine.flee(actor) {
        Ok(FleeOutcome::Escaped(session)) => {
            CommandResult::success(format!("You escaped from the {}!", session.monster.name))
        }
        Ok(FleeOutcome::Caught(report)) => {
            let mut msg = String::from("You failed to escape!");
            msg.push_str(&describe_monster_turn(&report));
            if report.player_defeated {
                engine.end_combat(actor);
            }
            CommandResult::success(msg)
        }
        Err(e) => e.into(),
    }
}

fn monster_reply<S: CharacterStore, R: RandomProvider>(
    actor: ActorId,
    mut msg: String,
    engine: &mut CombatEngine<S, R>,
) -> CommandResult {
    match engine.process_monster_turn(actor) {
        Ok(report) => {
            msg.push_str(&describe_monster_turn(&report));
            if report.player_defeated {
                engine.end_combat(actor);
            }
            CommandResult::success(msg)
        }
        Err(e) => {
            // A stuck monster turn cannot be retried from the console
            if engine.combat_state(actor).map(|s| s.turn) == Some(TurnState::MonsterTurn) {
                engine.end_combat(actor);
            }
            msg.push('\n');
            msg.push_str(&describe_error(&e));
            CommandResult::error(msg)
        }
    }
}

// =============================================================================
// Rendering
// =============================================================================

fn describe_action(outcome: &AttackOutcome) -> String {
    let mut msg = match &outcome.action {
        PlayerAction::Attack { skill: None, damage } => format!("You attack for {} damage.", damage),
        PlayerAction::Attack { skill: Some(skill), damage } => {
            format!("You use {} for {} damage!", skill, damage)
        }
        PlayerAction::Heal { skill, amount, new_health } => {
            format!("You use {} and heal {} HP (now {}).", skill, amount, new_health)
        }
        PlayerAction::DefensiveStance { skill, turns } => {
            format!("You take up a {} for {} turns.", skill, turns)
        }
    };
    msg.push_str(&format!(
        "\n  Monster HP: {}/{}  |  Your HP: {}  MP: {}",
        outcome.monster_health, outcome.monster_max_health, outcome.player_health, outcome.player_mana
    ));
    msg
}

fn describe_monster_turn(report: &MonsterTurnReport) -> String {
    let mut msg = format!("\nThe {} attacks for {} damage", report.monster_name, report.damage);
    if report.reduced {
        msg.push_str(" (reduced by your stance)");
    }
    msg.push_str(&format!(
        ". Your HP: {}/{}",
        report.player_health, report.player_max_health
    ));
    if report.player_defeated {
        msg.push_str("\nYou have been defeated! Rest before fighting again.");
    } else {
        msg.push_str(&format!("\nTurn {} - your move.", report.turn_count));
    }
    msg
}

fn describe_rewards(rewards: &RewardSummary) -> String {
    let mut msg = format!("\n  +{} XP, +{} coins", rewards.xp, rewards.coins);
    for item in &rewards.items {
        msg.push_str(&format!("\n  Loot: {} x{}", item.name, item.quantity));
    }
    if let Some(level_up) = &rewards.level_up {
        msg.push_str(&format!(
            "\nLEVEL UP! You are now level {} (+{} HP, +{} ATK, +{} DEF, +{} MP).",
            level_up.new_level,
            level_up.health_increase,
            level_up.attack_increase,
            level_up.defense_increase,
            level_up.mana_increase
        ));
    }
    msg
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::EncounterRegistry;
    use crate::persistence::MemoryStore;
    use crate::random::ScriptedRandom;
    use crate::world::AreaCatalog;
    use swordsong_shared::SkillCatalog;

    fn engine() -> CombatEngine<MemoryStore, ScriptedRandom> {
        CombatEngine::new(
            MemoryStore::new(),
            EncounterRegistry::new(),
            AreaCatalog::with_defaults(),
            SkillCatalog::default(),
            ScriptedRandom::new(),
        )
    }

    fn run(engine: &mut CombatEngine<MemoryStore, ScriptedRandom>, line: &str) -> CommandResult {
        parse_and_execute(line, 1, engine).unwrap()
    }

    #[test]
    fn test_blank_and_unknown() {
        let mut engine = engine();
        assert!(parse_and_execute("   ", 1, &mut engine).is_none());
        assert!(!run(&mut engine, "dance").success);
        assert!(run(&mut engine, ".quit").quit);
    }

    #[test]
    fn test_requires_character() {
        let mut engine = engine();
        let result = run(&mut engine, "fight");
        assert!(!result.success);
        assert!(result.message.contains("start <name>"));
    }

    #[test]
    fn test_fight_until_victory() {
        let mut engine = engine();
        assert!(run(&mut engine, "start Aria").success);
        // Slime: 20 HP, each hit does 9
        assert!(run(&mut engine, ".fight").message.contains("Slime"));

        let first = run(&mut engine, "attack");
        assert!(first.message.contains("Turn 2"));
        run(&mut engine, "attack");
        let last = run(&mut engine, "attack");
        assert!(last.success);
        assert!(last.message.contains("Victory"));
        assert!(last.message.contains("+10 XP"));
        assert!(engine.combat_state(1).is_none());

        assert!(run(&mut engine, "inventory").message.contains("Slime Gel x1"));
    }

    #[test]
    fn test_skill_names_are_case_insensitive() {
        let mut engine = engine();
        run(&mut engine, "start Aria");
        run(&mut engine, "fight");
        let result = run(&mut engine, "skill power strike");
        assert!(result.success, "{}", result.message);
        assert!(result.message.contains("Power Strike"));

        let skills = run(&mut engine, "skills");
        assert!(skills.message.contains("cooldown 2"));
        assert!(skills.message.contains("Fire Ball (20 MP, cd 4, x2.0 dmg)"));
        assert!(!run(&mut engine, "skill Meteor").success);
    }

    #[test]
    fn test_expire_encounter() {
        let mut engine = engine();
        run(&mut engine, "start Aria");
        assert!(expire_encounter(1, &mut engine).is_none());
        run(&mut engine, "fight");
        let result = expire_encounter(1, &mut engine).unwrap();
        assert!(result.message.contains("Slime"));
        assert!(engine.combat_state(1).is_none());
    }
}
