use std::collections::HashMap;

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use tokio::sync::RwLock;

use crate::{
    error::{AppError, Result},
    models::session::Session,
};

/// Session storage keyed by the digest of the session token.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn save(&self, key: &str, session: &Session) -> Result<()>;

    async fn get(&self, key: &str) -> Result<Option<Session>>;

    async fn delete(&self, key: &str) -> Result<()>;
}

/// Redis-backed session store. Entries carry a TTL matching the session.
#[derive(Clone)]
pub struct RedisSessionStore {
    redis: ConnectionManager,
}

impl RedisSessionStore {
    pub fn new(redis: ConnectionManager) -> Self {
        Self { redis }
    }

    fn redis_key(key: &str) -> String {
        format!("session:{}", key)
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn save(&self, key: &str, session: &Session) -> Result<()> {
        let session_json = sonic_rs::to_string(session)
            .map_err(|e| AppError::Internal(format!("Session serialization failed: {}", e)))?;

        let mut redis = self.redis.clone();
        let _: () = redis
            .set_ex(Self::redis_key(key), &session_json, session.ttl_seconds())
            .await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Session>> {
        let mut redis = self.redis.clone();
        let session_json: Option<String> = redis.get(Self::redis_key(key)).await?;

        match session_json {
            Some(json) => {
                let session = sonic_rs::from_str(&json).map_err(|e| {
                    AppError::Internal(format!("Invalid session JSON: {}", e))
                })?;
                Ok(Some(session))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut redis = self.redis.clone();
        let _: () = redis.del(Self::redis_key(key)).await?;
        Ok(())
    }
}

/// In-process session store. Expiry is enforced by the auth service on read;
/// expired entries are also pruned whenever a session is saved.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn save(&self, key: &str, session: &Session) -> Result<()> {
        let now = chrono::Utc::now();
        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, existing| !existing.is_expired_at(now));
        sessions.insert(key.to_string(), session.clone());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Session>> {
        Ok(self.sessions.read().await.get(key).cloned())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.sessions.write().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[tokio::test]
    async fn save_get_delete() {
        let store = MemorySessionStore::new();
        let session = Session::new(Uuid::new_v4(), chrono::Duration::days(1));

        store.save("k", &session).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some(session));

        store.delete("k").await.unwrap();
        assert!(store.get("k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_prunes_expired_sessions() {
        let store = MemorySessionStore::new();
        let mut stale = Session::new(Uuid::new_v4(), chrono::Duration::days(1));
        stale.expires_at = stale.created_at - chrono::Duration::seconds(1);
        store.save("stale", &stale).await.unwrap();

        let fresh = Session::new(Uuid::new_v4(), chrono::Duration::days(1));
        store.save("fresh", &fresh).await.unwrap();

        assert!(store.get("stale").await.unwrap().is_none());
        assert_eq!(store.get("fresh").await.unwrap(), Some(fresh));
        assert_eq!(store.sessions.read().await.len(), 1);
    }
}
