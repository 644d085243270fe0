//! Server configuration.
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use swordsong_shared::ActorId;

/// Default SQLite database (relative to the working directory)
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/game.db";
/// Default directory holding `areas.json`
pub const DEFAULT_DATA_DIR: &str = "data";
/// How long the player has to act before an encounter is abandoned
pub const DEFAULT_TURN_TIMEOUT_SECS: u64 = 180;
/// How often pending writes are flushed
pub const DEFAULT_SAVE_INTERVAL_SECS: u64 = 60;
/// Actor id used by the console front end
pub const DEFAULT_CONSOLE_ACTOR: ActorId = 1;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    pub database_url: String,
    pub data_dir: PathBuf,
    pub turn_timeout: Duration,
    pub save_interval: Duration,
    pub console_actor: ActorId,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            turn_timeout: Duration::from_secs(DEFAULT_TURN_TIMEOUT_SECS),
            save_interval: Duration::from_secs(DEFAULT_SAVE_INTERVAL_SECS),
            console_actor: DEFAULT_CONSOLE_ACTOR,
        }
    }
}

impl ServerConfig {
    /// Construct configuration from the environment, loading `.env` first.
    ///
    /// Environment variables:
    /// - `SWORDSONG_DATABASE_URL` - sqlx database URL
    /// - `SWORDSONG_DATA_DIR` - directory containing `areas.json`
    /// - `SWORDSONG_TURN_TIMEOUT_SECS` - seconds to act before combat ends (min 1)
    /// - `SWORDSONG_SAVE_INTERVAL_SECS` - seconds between persistence flushes (min 1)
    /// - `SWORDSONG_CONSOLE_ACTOR` - actor id of the console player
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unparsable values keep the default
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(url) = lookup("SWORDSONG_DATABASE_URL") {
            config.database_url = url;
        }
        if let Some(dir) = lookup("SWORDSONG_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(secs) = parse::<u64>(&lookup, "SWORDSONG_TURN_TIMEOUT_SECS") {
            config.turn_timeout = Duration::from_secs(secs.max(1));
        }
        if let Some(secs) = parse::<u64>(&lookup, "SWORDSONG_SAVE_INTERVAL_SECS") {
            config.save_interval = Duration::from_secs(secs.max(1));
        }
        if let Some(actor) = parse::<ActorId>(&lookup, "SWORDSONG_CONSOLE_ACTOR") {
            config.console_actor = actor;
        }

        config
    }

    pub fn areas_path(&self) -> PathBuf {
        self.data_dir.join("areas.json")
    }
}

fn parse<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    lookup(key)?.trim().parse().ok()
}
