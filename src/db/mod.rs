pub mod connection;
pub mod memory;
pub mod migrations;
pub mod models;
pub mod postgres;
pub mod store;

use std::sync::Arc;

use tracing::info;

use crate::config::{Config, StorageBackend};
use crate::db::memory::MemoryStore;
use crate::db::postgres::PgStore;
pub use crate::db::store::{Store, StoreError};

/// Build the store selected by the configuration
///
/// Connects to PostgreSQL when configured; the schema is not touched here.
pub async fn open_store(config: &Config) -> Result<Arc<dyn Store>, StoreError> {
    match (config.storage_backend, config.database_url.as_deref()) {
        (StorageBackend::Postgres, Some(database_url)) => {
            let pool = connection::get_connection(database_url, config.max_db_connections).await?;
            Ok(Arc::new(PgStore::new(pool)))
        }
        (StorageBackend::Postgres, None) => Err(StoreError::Database(sqlx::Error::Configuration(
            "DATABASE_URL is required for the postgres backend".into(),
        ))),
        (StorageBackend::Memory, _) => {
            info!("Using in-memory store; data is lost on shutdown");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
