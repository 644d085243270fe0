//! SwordSong console server
//!
//! Reads commands from stdin and drives a single console player through the
//! combat engine. Progress is written behind to SQLite.

use log::{debug, error, info};
use swordsong_shared::SkillCatalog;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{sleep_until, Instant};

use swordsong_server::combat::{CombatEngine, EncounterRegistry};
use swordsong_server::commands::{expire_encounter, parse_and_execute};
use swordsong_server::config::ServerConfig;
use swordsong_server::persistence::{self, MemoryStore};
use swordsong_server::random::StdRandom;
use swordsong_server::world::AreaCatalog;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ServerConfig::from_env();
    info!("Starting SwordSong...");
    info!("Turn timeout: {}s", config.turn_timeout.as_secs());

    // Initialize persistence and restore saved characters
    let persistence = match persistence::init(&config.database_url).await {
        Ok(p) => {
            info!("Persistence layer initialized ({})", config.database_url);
            Some(p)
        }
        Err(e) => {
            error!("Failed to initialize persistence: {}", e);
            error!("Running without persistence (progress will not be saved)");
            None
        }
    };

    let mut store = MemoryStore::new();
    if let Some((handle, _)) = &persistence {
        let snapshots = handle.load_all().await;
        store = store.with_snapshots(snapshots).with_persistence(handle.clone());
    }

    // Load game data
    let areas_path = config.areas_path();
    let areas = match AreaCatalog::load(&areas_path) {
        Ok(areas) => areas,
        Err(e) => {
            error!("Failed to load areas from {:?}: {}", areas_path, e);
            error!("Using fallback built-in areas");
            AreaCatalog::with_defaults()
        }
    };

    let mut engine = CombatEngine::new(
        store,
        EncounterRegistry::new(),
        areas,
        SkillCatalog::default(),
        StdRandom::from_entropy(),
    );
    let actor = config.console_actor;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut save_timer = tokio::time::interval(config.save_interval);
    save_timer.tick().await;

    // Deadline for the player's next move while an encounter is live
    let mut turn_deadline: Option<Instant> = None;

    println!("Welcome to SwordSong! Type `help` for commands.");

    loop {
        let turn_timeout = async move {
            match turn_deadline {
                Some(deadline) => sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            line = lines.next_line() => {
                match line {
                    Ok(Some(line)) => {
                        if let Some(result) = parse_and_execute(&line, actor, &mut engine) {
                            println!("{}", result.message);
                            if result.quit {
                                break;
                            }
                        }
                        turn_deadline = engine
                            .combat_state(actor)
                            .map(|_| Instant::now() + config.turn_timeout);
                    }
                    Ok(None) => break,
                    Err(e) => {
                        error!("Failed to read input: {}", e);
                        break;
                    }
                }
            }

            _ = turn_timeout => {
                if let Some(result) = expire_encounter(actor, &mut engine) {
                    info!("Encounter for actor {} timed out", actor);
                    println!("{}", result.message);
                }
                turn_deadline = None;
            }

            _ = save_timer.tick() => {
                if let Some((handle, _)) = &persistence {
                    handle.flush().await;
                    debug!("Periodic flush complete");
                }
            }
        }
    }

    // Abandon any live encounter and drain pending writes
    engine.end_combat(actor);
    if let Some((handle, task)) = persistence {
        handle.flush().await;
        handle.shutdown().await;
        if let Err(e) = task.await {
            error!("Persistence task failed: {}", e);
        }
    }
    info!("SwordSong stopped");
}
