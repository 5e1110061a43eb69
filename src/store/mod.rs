//! Persistence of user records.
//!
//! A [`RecordStore`] owns the persisted representation and enforces id
//! uniqueness on insert. Id allocation is read-then-compute
//! ([`RecordStore::next_id`]); callers that need race-free allocation
//! must serialize `next_id` + `insert` themselves.

pub mod memory;
pub mod sql;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::lib::errors::StoreError;

pub use memory::MemoryStore;
pub use sql::SqlStore;

/// Connection string prefix for the volatile in-process backend.
pub const MEMORY_URL_PREFIX: &str = "memory:";
/// Connection string prefix for the SQLite backend.
pub const SQLITE_URL_PREFIX: &str = "sqlite:";

/// Persisted user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub address: String,
    pub phone: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Caller-supplied fields of a user that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub address: String,
    pub phone: String,
}

impl NewUser {
    /// Attach a store-assigned id and creation timestamps.
    pub fn into_record(self, id: i64, now: DateTime<Utc>) -> User {
        User {
            id,
            name: self.name,
            email: self.email,
            address: self.address,
            phone: self.phone,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Storage seam shared by every backend.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Short backend label used in logs.
    fn backend(&self) -> &'static str;

    /// Every stored record, ordered by ascending id.
    async fn find_all(&self) -> Result<Vec<User>, StoreError>;

    /// Exact-match lookup; absence is `Ok(None)`.
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, StoreError>;

    /// One greater than the current maximum id, or `1` when empty.
    async fn next_id(&self) -> Result<i64, StoreError>;

    /// Persist a record and return its id; `DuplicateKey` on collision.
    async fn insert(&self, record: &User) -> Result<i64, StoreError>;
}

/// Open the backend selected by the connection string scheme.
pub async fn open_store(
    url: &str,
    max_connections: u32,
) -> Result<Arc<dyn RecordStore>, StoreError> {
    let store: Arc<dyn RecordStore> = if url.starts_with(MEMORY_URL_PREFIX) {
        Arc::new(MemoryStore::new())
    } else if url.starts_with(SQLITE_URL_PREFIX) {
        Arc::new(SqlStore::connect(url, max_connections).await?)
    } else {
        return Err(StoreError::UnsupportedUrl {
            url: redact_url(url),
        });
    };

    info!(
        target: "user_registry::store",
        backend = store.backend(),
        "Record store opened"
    );
    Ok(store)
}

/// Keep the scheme of a connection string and drop everything after it.
pub fn redact_url(url: &str) -> String {
    match url.split_once(':') {
        Some((scheme, _)) => format!("{scheme}:…"),
        None => "<unparsable>".into(),
    }
}
