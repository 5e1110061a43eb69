use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{RecordStore, User};
use crate::lib::errors::StoreError;

/// Volatile store keyed by id; contents live as long as the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<BTreeMap<i64, User>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn find_all(&self) -> Result<Vec<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.values().cloned().collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn next_id(&self) -> Result<i64, StoreError> {
        let users = self.users.read().await;
        Ok(users.keys().next_back().map_or(1, |max| max + 1))
    }

    async fn insert(&self, record: &User) -> Result<i64, StoreError> {
        let mut users = self.users.write().await;
        if users.contains_key(&record.id) {
            return Err(StoreError::DuplicateKey { id: record.id });
        }
        users.insert(record.id, record.clone());
        Ok(record.id)
    }
}
