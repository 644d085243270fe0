//! SQLite database operations.

use std::collections::BTreeMap;
use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use swordsong_shared::ActorId;

use super::ActorSnapshot;
use crate::entities::{Character, FightStats};

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS characters (
        actor_id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        level INTEGER NOT NULL DEFAULT 1,
        xp INTEGER NOT NULL DEFAULT 0,
        xp_to_level INTEGER NOT NULL DEFAULT 100,
        health INTEGER NOT NULL DEFAULT 100,
        max_health INTEGER NOT NULL DEFAULT 100,
        attack INTEGER NOT NULL DEFAULT 10,
        defense INTEGER NOT NULL DEFAULT 5,
        mana INTEGER NOT NULL DEFAULT 50,
        max_mana INTEGER NOT NULL DEFAULT 50,
        coins INTEGER NOT NULL DEFAULT 0,
        current_area TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS inventory (
        actor_id INTEGER NOT NULL REFERENCES characters(actor_id) ON DELETE CASCADE,
        item_name TEXT NOT NULL,
        quantity INTEGER NOT NULL,
        PRIMARY KEY (actor_id, item_name)
    )",
    "CREATE TABLE IF NOT EXISTS fight_stats (
        actor_id INTEGER PRIMARY KEY REFERENCES characters(actor_id) ON DELETE CASCADE,
        total_fights INTEGER NOT NULL DEFAULT 0,
        fights_since_boss INTEGER NOT NULL DEFAULT 0
    )",
    "CREATE TABLE IF NOT EXISTS skill_cooldowns (
        actor_id INTEGER NOT NULL REFERENCES characters(actor_id) ON DELETE CASCADE,
        skill_name TEXT NOT NULL,
        turns_remaining INTEGER NOT NULL,
        PRIMARY KEY (actor_id, skill_name)
    )",
];

/// Actor ids are stored bit-for-bit in SQLite's signed INTEGER column
fn to_db_id(id: ActorId) -> i64 {
    id as i64
}

fn from_db_id(id: i64) -> ActorId {
    id as ActorId
}

fn get_u32(row: &SqliteRow, column: &str) -> Result<u32, sqlx::Error> {
    let value: i64 = row.try_get(column)?;
    u32::try_from(value).map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

/// Database connection wrapper
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect to the database, creating the file and schema if needed
    pub async fn connect(url: &str) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        // `sqlite::memory:` lives only as long as its connection
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.create_schema().await?;
        Ok(db)
    }

    async fn create_schema(&self) -> Result<(), sqlx::Error> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    // =========================================================================
    // Actor Operations
    // =========================================================================

    /// Save an actor snapshot (replaces inventory, fight stats and cooldowns)
    pub async fn save_actor(&self, snapshot: &ActorSnapshot) -> Result<(), sqlx::Error> {
        let c = &snapshot.character;
        let actor_id = to_db_id(c.id);
        let coins = i64::try_from(c.coins).map_err(|e| sqlx::Error::Encode(Box::new(e)))?;

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO characters (actor_id, name, level, xp, xp_to_level, health, max_health,
                                     attack, defense, mana, max_mana, coins, current_area)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
             ON CONFLICT (actor_id) DO UPDATE SET
                name = excluded.name,
                level = excluded.level,
                xp = excluded.xp,
                xp_to_level = excluded.xp_to_level,
                health = excluded.health,
                max_health = excluded.max_health,
                attack = excluded.attack,
                defense = excluded.defense,
                mana = excluded.mana,
                max_mana = excluded.max_mana,
                coins = excluded.coins,
                current_area = excluded.current_area"
        )
            .bind(actor_id)
            .bind(&c.name)
            .bind(i64::from(c.level))
            .bind(i64::from(c.xp))
            .bind(i64::from(c.xp_to_level))
            .bind(i64::from(c.health))
            .bind(i64::from(c.max_health))
            .bind(i64::from(c.attack))
            .bind(i64::from(c.defense))
            .bind(i64::from(c.mana))
            .bind(i64::from(c.max_mana))
            .bind(coins)
            .bind(&c.current_area)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM inventory WHERE actor_id = $1")
            .bind(actor_id)
            .execute(&mut *tx)
            .await?;
        for (item, quantity) in &c.inventory {
            sqlx::query("INSERT INTO inventory (actor_id, item_name, quantity) VALUES ($1, $2, $3)")
                .bind(actor_id)
                .bind(item)
                .bind(i64::from(*quantity))
                .execute(&mut *tx)
                .await?;
        }

        match snapshot.fight_stats {
            Some(stats) => {
                sqlx::query(
                    "INSERT INTO fight_stats (actor_id, total_fights, fights_since_boss)
                     VALUES ($1, $2, $3)
                     ON CONFLICT (actor_id) DO UPDATE SET
                        total_fights = excluded.total_fights,
                        fights_since_boss = excluded.fights_since_boss"
                )
                    .bind(actor_id)
                    .bind(i64::from(stats.total_fights))
                    .bind(i64::from(stats.fights_since_boss))
                    .execute(&mut *tx)
                    .await?;
            }
            None => {
                sqlx::query("DELETE FROM fight_stats WHERE actor_id = $1")
                    .bind(actor_id)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        sqlx::query("DELETE FROM skill_cooldowns WHERE actor_id = $1")
            .bind(actor_id)
            .execute(&mut *tx)
            .await?;
        for (skill, turns) in &snapshot.cooldowns {
            sqlx::query(
                "INSERT INTO skill_cooldowns (actor_id, skill_name, turns_remaining) VALUES ($1, $2, $3)"
            )
                .bind(actor_id)
                .bind(skill)
                .bind(i64::from(*turns))
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Delete an actor (cascade removes inventory, fight stats and cooldowns)
    pub async fn delete_actor(&self, actor_id: ActorId) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM characters WHERE actor_id = $1")
            .bind(to_db_id(actor_id))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Load every saved actor
    pub async fn load_all_actors(&self) -> Result<Vec<ActorSnapshot>, sqlx::Error> {
        let characters = sqlx::query("SELECT * FROM characters ORDER BY actor_id")
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(character_from_row)
            .collect::<Result<Vec<_>, sqlx::Error>>()?;

        let mut actors = Vec::with_capacity(characters.len());
        for character in characters {
            actors.push(self.load_snapshot(character).await?);
        }
        Ok(actors)
    }

    /// Attach inventory, fight stats and cooldowns to a loaded character
    async fn load_snapshot(&self, mut character: Character) -> Result<ActorSnapshot, sqlx::Error> {
        let actor_id = to_db_id(character.id);

        character.inventory = sqlx::query("SELECT item_name, quantity FROM inventory WHERE actor_id = $1")
            .bind(actor_id)
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(|r| -> Result<(String, u32), sqlx::Error> {
                Ok((r.try_get("item_name")?, get_u32(r, "quantity")?))
            })
            .collect::<Result<BTreeMap<_, _>, sqlx::Error>>()?;

        let fight_stats = sqlx::query(
            "SELECT total_fights, fights_since_boss FROM fight_stats WHERE actor_id = $1"
        )
            .bind(actor_id)
            .fetch_optional(&self.pool)
            .await?
            .map(|r| -> Result<FightStats, sqlx::Error> {
                Ok(FightStats {
                    total_fights: get_u32(&r, "total_fights")?,
                    fights_since_boss: get_u32(&r, "fights_since_boss")?,
                })
            })
            .transpose()?;

        let cooldowns = sqlx::query(
            "SELECT skill_name, turns_remaining FROM skill_cooldowns
             WHERE actor_id = $1 AND turns_remaining > 0"
        )
            .bind(actor_id)
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(|r| -> Result<(String, u32), sqlx::Error> {
                Ok((r.try_get("skill_name")?, get_u32(r, "turns_remaining")?))
            })
            .collect::<Result<BTreeMap<_, _>, sqlx::Error>>()?;

        Ok(ActorSnapshot {
            character,
            fight_stats,
            cooldowns,
        })
    }
}

/// Build a character from a `characters` row; inventory is loaded separately
fn character_from_row(row: &SqliteRow) -> Result<Character, sqlx::Error> {
    let coins: i64 = row.try_get("coins")?;
    Ok(Character {
        id: from_db_id(row.try_get("actor_id")?),
        name: row.try_get("name")?,
        level: get_u32(row, "level")?,
        xp: get_u32(row, "xp")?,
        xp_to_level: get_u32(row, "xp_to_level")?,
        health: get_u32(row, "health")?,
        max_health: get_u32(row, "max_health")?,
        attack: get_u32(row, "attack")?,
        defense: get_u32(row, "defense")?,
        mana: get_u32(row, "mana")?,
        max_mana: get_u32(row, "max_mana")?,
        coins: u64::try_from(coins).map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
        current_area: row.try_get("current_area")?,
        inventory: BTreeMap::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory_db() -> Database {
        Database::connect("sqlite::memory:").await.unwrap()
    }

    fn snapshot() -> ActorSnapshot {
        let mut character = Character::new(u64::MAX - 3, "Aria", "caves");
        character.coins = 42;
        character.inventory.insert("Bat Wing".into(), 2);
        ActorSnapshot {
            character,
            fight_stats: Some(FightStats { total_fights: 9, fights_since_boss: 4 }),
            cooldowns: BTreeMap::from([("Fire Ball".to_string(), 3)]),
        }
    }

    #[tokio::test]
    async fn test_save_and_load_round_trip() {
        let db = memory_db().await;
        let saved = snapshot();
        db.save_actor(&saved).await.unwrap();

        let loaded = db.load_all_actors().await.unwrap();
        assert_eq!(loaded, vec![saved]);
    }

    #[tokio::test]
    async fn test_coins_beyond_i64_are_rejected() {
        let db = memory_db().await;
        let mut s = snapshot();
        s.character.coins = u64::MAX;
        assert!(matches!(db.save_actor(&s).await, Err(sqlx::Error::Encode(_))));
        assert!(db.load_all_actors().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_replaces_previous_state() {
        let db = memory_db().await;
        let mut s = snapshot();
        db.save_actor(&s).await.unwrap();

        s.character.inventory.clear();
        s.cooldowns.clear();
        s.fight_stats = None;
        s.character.level = 4;
        db.save_actor(&s).await.unwrap();

        let all = db.load_all_actors().await.unwrap();
        assert_eq!(all, vec![s]);
    }

    #[tokio::test]
    async fn test_delete_cascades() {
        let db = memory_db().await;
        let s = snapshot();
        db.save_actor(&s).await.unwrap();
        db.delete_actor(s.character.id).await.unwrap();

        assert!(db.load_all_actors().await.unwrap().is_empty());
        let leftover: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM inventory")
            .fetch_one(&db.pool)
            .await
            .unwrap();
        assert_eq!(leftover, 0);
    }
}
