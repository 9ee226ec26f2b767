use std::collections::HashMap;

use async_trait::async_trait;
use deadpool_postgres::Pool;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::url_mapping::UrlMapping,
};

/// Durable `short_id -> UrlMapping` associations.
///
/// `put` is an atomic insert-if-absent: of two concurrent puts for the same
/// id exactly one succeeds and the other gets `AppError::DuplicateKey`.
/// Deleted ids are tombstoned and keep blocking `put`.
#[async_trait]
pub trait MappingStore: Send + Sync {
    /// Inserts a mapping, failing with `DuplicateKey` if the id was ever used.
    async fn put(&self, mapping: &UrlMapping) -> Result<()>;

    /// Looks up a live mapping.
    async fn get(&self, short_id: &str) -> Result<Option<UrlMapping>>;

    /// Lists the live mappings created by `owner_id`, newest first.
    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<UrlMapping>>;

    /// Tombstones a live mapping owned by `owner_id`.
    ///
    /// # Returns
    ///
    /// `true` if a mapping was deleted.
    async fn delete(&self, short_id: &str, owner_id: Uuid) -> Result<bool>;
}

/// PostgreSQL-backed mapping store.
#[derive(Clone)]
pub struct PgMappingStore {
    pool: Pool,
}

impl PgMappingStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MappingStore for PgMappingStore {
    async fn put(&self, mapping: &UrlMapping) -> Result<()> {
        let client = self.pool.get().await?;
        let inserted = client
            .execute(
                r#"
                INSERT INTO url_mappings (short_id, original_url, owner_id, created_at)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (short_id) DO NOTHING
                "#,
                &[
                    &mapping.short_id,
                    &mapping.original_url,
                    &mapping.owner_id,
                    &mapping.created_at,
                ],
            )
            .await?;

        if inserted == 0 {
            return Err(AppError::DuplicateKey);
        }
        Ok(())
    }

    async fn get(&self, short_id: &str) -> Result<Option<UrlMapping>> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                r#"
                SELECT short_id, original_url, owner_id, created_at
                FROM url_mappings
                WHERE short_id = $1 AND is_deleted = false
                "#,
                &[&short_id],
            )
            .await?;
        Ok(row.as_ref().map(UrlMapping::from))
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<UrlMapping>> {
        let client = self.pool.get().await?;
        let rows = client
            .query(
                r#"
                SELECT short_id, original_url, owner_id, created_at
                FROM url_mappings
                WHERE owner_id = $1 AND is_deleted = false
                ORDER BY created_at DESC
                "#,
                &[&owner_id],
            )
            .await?;
        Ok(rows.iter().map(UrlMapping::from).collect())
    }

    async fn delete(&self, short_id: &str, owner_id: Uuid) -> Result<bool> {
        let client = self.pool.get().await?;
        let deleted = client
            .execute(
                r#"
                UPDATE url_mappings
                SET is_deleted = true, deleted_at = NOW()
                WHERE short_id = $1 AND owner_id = $2 AND is_deleted = false
                "#,
                &[&short_id, &owner_id],
            )
            .await?;
        Ok(deleted > 0)
    }
}

struct StoredMapping {
    mapping: UrlMapping,
    deleted: bool,
}

/// In-process mapping store. The write lock makes check-and-insert atomic.
#[derive(Default)]
pub struct MemoryMappingStore {
    entries: RwLock<HashMap<String, StoredMapping>>,
}

impl MemoryMappingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MappingStore for MemoryMappingStore {
    async fn put(&self, mapping: &UrlMapping) -> Result<()> {
        let mut entries = self.entries.write().await;
        match entries.entry(mapping.short_id.clone()) {
            std::collections::hash_map::Entry::Occupied(_) => Err(AppError::DuplicateKey),
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(StoredMapping {
                    mapping: mapping.clone(),
                    deleted: false,
                });
                Ok(())
            }
        }
    }

    async fn get(&self, short_id: &str) -> Result<Option<UrlMapping>> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(short_id)
            .filter(|stored| !stored.deleted)
            .map(|stored| stored.mapping.clone()))
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<UrlMapping>> {
        let entries = self.entries.read().await;
        let mut owned: Vec<UrlMapping> = entries
            .values()
            .filter(|stored| !stored.deleted && stored.mapping.owner_id == Some(owner_id))
            .map(|stored| stored.mapping.clone())
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned)
    }

    async fn delete(&self, short_id: &str, owner_id: Uuid) -> Result<bool> {
        let mut entries = self.entries.write().await;
        match entries.get_mut(short_id) {
            Some(stored) if !stored.deleted && stored.mapping.owner_id == Some(owner_id) => {
                stored.deleted = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn mapping(id: &str, url: &str, owner: Option<Uuid>) -> UrlMapping {
        UrlMapping::new(id.to_string(), url.to_string(), owner)
    }

    #[tokio::test]
    async fn put_then_get_round_trips() {
        let store = MemoryMappingStore::new();
        store.put(&mapping("abc1234", "https://example.com", None)).await.unwrap();

        let found = store.get("abc1234").await.unwrap().unwrap();
        assert_eq!(found.original_url, "https://example.com");
        assert!(store.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn second_put_of_same_id_is_rejected() {
        let store = MemoryMappingStore::new();
        store.put(&mapping("dup", "https://a.example", None)).await.unwrap();

        let err = store.put(&mapping("dup", "https://b.example", None)).await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateKey));
        assert_eq!(
            store.get("dup").await.unwrap().unwrap().original_url,
            "https://a.example"
        );
    }

    #[tokio::test]
    async fn concurrent_puts_commit_exactly_once() {
        let store = Arc::new(MemoryMappingStore::new());
        let handles: Vec<_> = (0..32)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .put(&mapping("race", &format!("https://{}.example", i), None))
                        .await
                })
            })
            .collect();

        let mut wins = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                wins += 1;
            }
        }
        assert_eq!(wins, 1);
    }

    #[tokio::test]
    async fn deleted_ids_stop_resolving_but_stay_reserved() {
        let store = MemoryMappingStore::new();
        let owner = Uuid::new_v4();
        store.put(&mapping("gone", "https://example.com", Some(owner))).await.unwrap();

        assert!(!store.delete("gone", Uuid::new_v4()).await.unwrap());
        assert!(store.delete("gone", owner).await.unwrap());
        assert!(!store.delete("gone", owner).await.unwrap());

        assert!(store.get("gone").await.unwrap().is_none());
        let err = store.put(&mapping("gone", "https://other.example", None)).await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateKey));
    }

    #[tokio::test]
    async fn lists_only_live_owned_mappings() {
        let store = MemoryMappingStore::new();
        let owner = Uuid::new_v4();
        store.put(&mapping("one", "https://1.example", Some(owner))).await.unwrap();
        store.put(&mapping("two", "https://2.example", Some(owner))).await.unwrap();
        store.put(&mapping("anon", "https://3.example", None)).await.unwrap();
        store.delete("one", owner).await.unwrap();

        let owned = store.list_by_owner(owner).await.unwrap();
        assert_eq!(owned.len(), 1);
        assert_eq!(owned[0].short_id, "two");
    }
}
