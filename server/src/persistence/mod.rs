//! Persistence layer for the combat engine.
//!
//! The engine works against an in-memory [`MemoryStore`]. Durable writes happen
//! in a background task that owns the database: the store queues snapshots and
//! never blocks on I/O.

mod database;
mod store;

pub use database::Database;
pub use store::{ActorSnapshot, CharacterStore, MemoryStore, StoreError};

use log::{error, info, warn};
use swordsong_shared::ActorId;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

/// Queue depth for pending persistence commands
const COMMAND_BUFFER: usize = 256;

/// Commands sent to the persistence background task
#[derive(Debug)]
pub enum PersistenceCommand {
    /// Upsert an actor's full snapshot
    SaveActor(Box<ActorSnapshot>),
    /// Remove an actor and everything it owns
    DeleteActor { actor_id: ActorId },
    /// Load every saved actor (response sent via oneshot channel)
    LoadAll {
        response: oneshot::Sender<Vec<ActorSnapshot>>,
    },
    /// Acknowledge once every earlier command has been processed
    Flush { done: oneshot::Sender<()> },
    /// Shutdown the persistence task
    Shutdown,
}

/// Handle for sending commands to the persistence task
#[derive(Debug, Clone)]
pub struct PersistenceHandle {
    sender: mpsc::Sender<PersistenceCommand>,
}

impl PersistenceHandle {
    /// Save actor state (fire and forget - non-blocking)
    pub fn save_actor(&self, snapshot: ActorSnapshot) {
        let actor_id = snapshot.character.id;
        if let Err(e) = self.sender.try_send(PersistenceCommand::SaveActor(Box::new(snapshot))) {
            warn!("Dropped save for actor {}: {}", actor_id, e);
        }
    }

    /// Delete actor state (fire and forget - non-blocking)
    pub fn delete_actor(&self, actor_id: ActorId) {
        if let Err(e) = self.sender.try_send(PersistenceCommand::DeleteActor { actor_id }) {
            warn!("Dropped delete for actor {}: {}", actor_id, e);
        }
    }

    /// Load all saved actors (async - use at startup)
    pub async fn load_all(&self) -> Vec<ActorSnapshot> {
        let (tx, rx) = oneshot::channel();
        if self.sender.send(PersistenceCommand::LoadAll { response: tx }).await.is_err() {
            return Vec::new();
        }
        rx.await.unwrap_or_default()
    }

    /// Wait until every queued write has reached the database
    pub async fn flush(&self) {
        let (tx, rx) = oneshot::channel();
        if self.sender.send(PersistenceCommand::Flush { done: tx }).await.is_ok() {
            let _ = rx.await;
        }
    }

    /// Shutdown the persistence task
    pub async fn shutdown(&self) {
        let _ = self.sender.send(PersistenceCommand::Shutdown).await;
    }
}

/// Connect to the database and spawn the background task.
/// Returns a handle for sending commands and the task's join handle.
pub async fn init(database_url: &str) -> Result<(PersistenceHandle, JoinHandle<()>), sqlx::Error> {
    let db = Database::connect(database_url).await?;
    info!("Connected to database");
    Ok(spawn(db))
}

/// Spawn the background task on an already connected database
pub fn spawn(db: Database) -> (PersistenceHandle, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
    let task = tokio::spawn(persistence_task(db, rx));
    info!("Persistence background task started");
    (PersistenceHandle { sender: tx }, task)
}

/// Background task that handles all persistence operations
async fn persistence_task(db: Database, mut rx: mpsc::Receiver<PersistenceCommand>) {
    info!("Persistence task running");

    while let Some(cmd) = rx.recv().await {
        match cmd {
            PersistenceCommand::SaveActor(snapshot) => {
                if let Err(e) = db.save_actor(&snapshot).await {
                    error!("Failed to save actor {} to database: {}", snapshot.character.id, e);
                }
            }

            PersistenceCommand::DeleteActor { actor_id } => {
                if let Err(e) = db.delete_actor(actor_id).await {
                    error!("Failed to delete actor {} from database: {}", actor_id, e);
                }
            }

            PersistenceCommand::LoadAll { response } => {
                let actors = match db.load_all_actors().await {
                    Ok(actors) => {
                        info!("Loaded {} actors from database", actors.len());
                        actors
                    }
                    Err(e) => {
                        error!("Failed to load actors: {}", e);
                        Vec::new()
                    }
                };
                let _ = response.send(actors);
            }

            PersistenceCommand::Flush { done } => {
                let _ = done.send(());
            }

            PersistenceCommand::Shutdown => {
                info!("Persistence task shutting down");
                break;
            }
        }
    }

    db.close().await;
    info!("Persistence task stopped");
}
