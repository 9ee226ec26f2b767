use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use deadpool_postgres::Pool;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::user::User,
};

/// Account storage. Emails are unique; callers pass them normalized.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Creates an account, failing with `DuplicateAccount` if the email is taken.
    async fn create(&self, name: &str, email: &str, password_hash: &str) -> Result<User>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<User>>;
}

/// PostgreSQL-backed account store.
#[derive(Clone)]
pub struct PgUserStore {
    pool: Pool,
}

impl PgUserStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, name: &str, email: &str, password_hash: &str) -> Result<User> {
        let client = self.pool.get().await?;
        let id = Uuid::new_v4();
        let row = client
            .query_opt(
                r#"
                INSERT INTO users (id, name, email, password_hash)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (email) DO NOTHING
                RETURNING id, name, email, password_hash, created_at
                "#,
                &[&id, &name, &email, &password_hash],
            )
            .await?;

        row.as_ref().map(User::from).ok_or(AppError::DuplicateAccount)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                r#"
                SELECT id, name, email, password_hash, created_at
                FROM users
                WHERE email = $1
                "#,
                &[&email],
            )
            .await?;
        Ok(row.as_ref().map(User::from))
    }

    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<User>> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                r#"
                SELECT id, name, email, password_hash, created_at
                FROM users
                WHERE id = $1
                "#,
                &[&user_id],
            )
            .await?;
        Ok(row.as_ref().map(User::from))
    }
}

/// In-process account store keyed by email.
#[derive(Default)]
pub struct MemoryUserStore {
    by_email: RwLock<HashMap<String, User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, name: &str, email: &str, password_hash: &str) -> Result<User> {
        let mut users = self.by_email.write().await;
        if users.contains_key(email) {
            return Err(AppError::DuplicateAccount);
        }

        let user = User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };
        users.insert(email.to_string(), user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self.by_email.read().await.get(email).cloned())
    }

    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<User>> {
        Ok(self
            .by_email
            .read()
            .await
            .values()
            .find(|user| user.id == user_id)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn email_is_unique() {
        let store = MemoryUserStore::new();
        let ada = store.create("Ada", "ada@example.com", "hash").await.unwrap();

        let err = store.create("Imposter", "ada@example.com", "other").await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateAccount));

        let found = store.find_by_email("ada@example.com").await.unwrap().unwrap();
        assert_eq!(found.id, ada.id);
        assert_eq!(found.name, "Ada");
    }

    #[tokio::test]
    async fn finds_by_id() {
        let store = MemoryUserStore::new();
        let user = store.create("Grace", "grace@example.com", "hash").await.unwrap();

        assert_eq!(store.find_by_id(user.id).await.unwrap().unwrap().email, "grace@example.com");
        assert!(store.find_by_id(Uuid::new_v4()).await.unwrap().is_none());
    }
}
