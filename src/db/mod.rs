//! Storage layer
//!
//! `DocumentStore` is the seam between the ranking core and the database.
//! `MongoStore` backs production, `MemoryStore` backs dev mode and tests.

pub mod memory;
pub mod mongo;
pub mod schemas;
pub mod store;

use std::sync::Arc;
use tracing::{error, info, warn};

pub use memory::MemoryStore;
pub use mongo::{MongoClient, MongoStore};
pub use store::{DocumentPath, DocumentStore, StoreLayout};

use crate::config::Args;
use crate::types::Result;

/// Connect the configured store.
///
/// In dev mode an unreachable MongoDB falls back to an empty in-memory store.
pub async fn connect(args: &Args) -> Result<Arc<dyn DocumentStore>> {
    let connected = match MongoClient::new(&args.mongodb_uri, &args.mongodb_db).await {
        Ok(client) => MongoStore::new(client, &args.store_layout()).await,
        Err(e) => Err(e),
    };

    match connected {
        Ok(store) => {
            info!("MongoDB store ready");
            Ok(Arc::new(store))
        }
        Err(e) if args.dev_mode => {
            warn!("MongoDB unavailable (dev mode, continuing with in-memory store): {}", e);
            Ok(Arc::new(MemoryStore::new()))
        }
        Err(e) => {
            error!("MongoDB connection failed: {}", e);
            Err(e)
        }
    }
}
