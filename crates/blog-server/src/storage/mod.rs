//! Storage layer
//!
//! SQLite (embedded) when a database is configured, with an in-memory
//! relational store emulator as the fallback and test double.

pub mod db;
pub mod memory;

pub use db::Database;
pub use memory::MemoryStore;

use blog_core::BlogStore;
use std::sync::Arc;
use tracing::{info, warn};

/// Open the configured database, falling back to the in-memory store when
/// nothing is configured or the connection fails.
pub async fn connect_store(database_path: Option<&str>) -> Arc<dyn BlogStore> {
    match database_path {
        Some(path) => match Database::new(path).await {
            Ok(db) => Arc::new(db),
            Err(e) => {
                warn!("Database unavailable: {:#}", e);
                warn!("Falling back to the in-memory store (data will not survive restarts)");
                Arc::new(MemoryStore::new())
            }
        },
        None => {
            info!("No database configured, using in-memory store");
            Arc::new(MemoryStore::new())
        }
    }
}
