use std::sync::Arc;

use redis::aio::ConnectionManager;

use crate::config::{Config, StorageBackend};
use crate::crypto::short_id::{IdGenerator, RandomIdGenerator};
use crate::error::Result;
use crate::repositories::{
    session::{MemorySessionStore, RedisSessionStore, SessionStore},
    url::{MappingStore, MemoryMappingStore, PgMappingStore},
    user::{MemoryUserStore, PgUserStore, UserStore},
};

/// The application's state.
#[derive(Clone)]
pub struct AppState {
    /// Short id to URL mappings.
    pub mappings: Arc<dyn MappingStore>,
    /// User accounts.
    pub users: Arc<dyn UserStore>,
    /// Login sessions.
    pub sessions: Arc<dyn SessionStore>,
    /// Candidate short id source.
    pub ids: Arc<dyn IdGenerator>,
    /// The application's configuration.
    pub config: Config,
}

impl AppState {
    /// Creates a new `AppState`, connecting to the configured backend.
    ///
    /// # Arguments
    ///
    /// * `config` - The application's configuration.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `AppState`.
    pub async fn new(config: &Config) -> Result<Self> {
        match config.storage {
            StorageBackend::Memory => {
                tracing::warn!("⚠️ Using in-memory storage, data is lost on restart");
                Ok(Self::in_memory(config))
            }
            StorageBackend::Postgres => {
                let database_url = config.database_url.as_deref().ok_or_else(|| {
                    crate::error::AppError::Internal("DATABASE_URL is not set".to_string())
                })?;
                let db = crate::db::create_pool(database_url)?;
                crate::db::run_migrations(&db).await?;
                tracing::info!("✅ PostgreSQL Pool initialized and schema applied");

                let redis_client = redis::Client::open(config.redis_url.as_str())?;
                let redis = ConnectionManager::new(redis_client).await?;
                tracing::info!("✅ Redis Connection Manager initialized (pooled)");

                Ok(Self::from_parts(
                    config,
                    Arc::new(PgMappingStore::new(db.clone())),
                    Arc::new(PgUserStore::new(db)),
                    Arc::new(RedisSessionStore::new(redis)),
                    Arc::new(RandomIdGenerator::new(config.short_id_length)),
                ))
            }
        }
    }

    /// Creates an `AppState` backed entirely by process memory.
    pub fn in_memory(config: &Config) -> Self {
        Self::from_parts(
            config,
            Arc::new(MemoryMappingStore::new()),
            Arc::new(MemoryUserStore::new()),
            Arc::new(MemorySessionStore::new()),
            Arc::new(RandomIdGenerator::new(config.short_id_length)),
        )
    }

    /// Assembles an `AppState` from explicit components.
    pub fn from_parts(
        config: &Config,
        mappings: Arc<dyn MappingStore>,
        users: Arc<dyn UserStore>,
        sessions: Arc<dyn SessionStore>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        Self {
            mappings,
            users,
            sessions,
            ids,
            config: config.clone(),
        }
    }
}
