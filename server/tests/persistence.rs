//! Write-behind persistence against an in-memory SQLite database.

use swordsong_server::entities::{Character, CharacterUpdate, FightStats};
use swordsong_server::persistence::{self, CharacterStore, Database, MemoryStore};

async fn store_with_database() -> (MemoryStore, persistence::PersistenceHandle) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    let (handle, _task) = persistence::spawn(db);
    (MemoryStore::new().with_persistence(handle.clone()), handle)
}

#[tokio::test]
async fn mutations_reach_the_database() {
    let (mut store, handle) = store_with_database().await;

    store
        .create_character(Character::new(11, "Aria", "forest"))
        .unwrap();
    store.update_character(11, &CharacterUpdate::health(64)).unwrap();
    store.add_item(11, "Wolf Pelt", 3).unwrap();
    store
        .update_fight_stats(11, FightStats { total_fights: 4, fights_since_boss: 4 })
        .unwrap();
    store.set_skill_cooldown(11, "Power Strike", 3).unwrap();
    handle.flush().await;

    let saved = handle.load_all().await;
    assert_eq!(saved.len(), 1);
    assert_eq!(&saved[0], store.snapshot(11).unwrap());
    assert_eq!(saved[0].character.health, 64);
    assert_eq!(saved[0].cooldowns["Power Strike"], 3);

    handle.shutdown().await;
}

#[tokio::test]
async fn restart_restores_characters() {
    let (mut store, handle) = store_with_database().await;
    store
        .create_character(Character::new(1, "Aria", "forest"))
        .unwrap();
    store
        .create_character(Character::new(2, "Bram", "caves"))
        .unwrap();
    store.delete_character(1).unwrap();
    handle.flush().await;

    let restored = MemoryStore::new().with_snapshots(handle.load_all().await);
    assert_eq!(restored.len(), 1);
    assert!(restored.get_character(1).is_none());
    assert_eq!(restored.get_character(2).unwrap().current_area, "caves");

    handle.shutdown().await;
}

#[tokio::test]
async fn handle_survives_task_shutdown() {
    let (mut store, handle) = store_with_database().await;
    handle.shutdown().await;
    handle.flush().await;

    // Writes after shutdown are dropped with a warning, never an error
    store
        .create_character(Character::new(5, "Late", "forest"))
        .unwrap();
    assert!(handle.load_all().await.is_empty());
}
