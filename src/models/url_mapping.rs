use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;
use uuid::Uuid;

/// A short id and the URL it redirects to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlMapping {
    /// The opaque short id.
    pub short_id: String,
    /// The redirect target.
    pub original_url: String,
    /// The account that created the mapping, if the request was authenticated.
    pub owner_id: Option<Uuid>,
    /// The timestamp when the mapping was created.
    pub created_at: DateTime<Utc>,
}

impl UrlMapping {
    /// Creates a mapping stamped with the current time.
    pub fn new(short_id: String, original_url: String, owner_id: Option<Uuid>) -> Self {
        Self {
            short_id,
            original_url,
            owner_id,
            created_at: Utc::now(),
        }
    }
}

impl From<&Row> for UrlMapping {
    fn from(row: &Row) -> Self {
        Self {
            short_id: row.get("short_id"),
            original_url: row.get("original_url"),
            owner_id: row.get("owner_id"),
            created_at: row.get("created_at"),
        }
    }
}
