use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info};

use super::write_queue::UserWriteQueue;
use crate::{
    lib::errors::StoreError,
    store::{NewUser, RecordStore, User},
};

/// Outcome of a single-user lookup. Absence is an expected result, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserLookup {
    Found(User),
    NotFound,
}

/// Errors surfaced by [`UserRepository`].
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("`{field}` is required")]
    MissingField { field: &'static str },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Typed access to the record store used by every capability handler.
#[derive(Clone)]
pub struct UserRepository {
    store: Arc<dyn RecordStore>,
    writes: UserWriteQueue,
}

impl UserRepository {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            writes: UserWriteQueue::new(),
        }
    }

    pub fn backend(&self) -> &'static str {
        self.store.backend()
    }

    /// Number of creates waiting for the single-writer slot.
    pub fn pending_writes(&self) -> usize {
        self.writes.pending_writes()
    }

    pub async fn list_users(&self) -> Result<Vec<User>, RepositoryError> {
        Ok(self.store.find_all().await?)
    }

    pub async fn get_user(&self, id: i64) -> Result<UserLookup, RepositoryError> {
        let lookup = match self.store.find_by_id(id).await? {
            Some(user) => UserLookup::Found(user),
            None => UserLookup::NotFound,
        };
        Ok(lookup)
    }

    /// Allocate the next id and insert the record while holding the write turn.
    pub async fn create_user(&self, input: NewUser) -> Result<i64, RepositoryError> {
        ensure_present(&input)?;

        let turn = self.writes.wait_for_turn().await;
        debug!(
            target: "user_registry::store",
            ticket_id = %turn.ticket().ticket_id,
            waited_ms = turn.ticket().waited().num_milliseconds(),
            pending_writes = self.pending_writes(),
            "Acquired user write turn"
        );
        let id = self.store.next_id().await?;
        let record = input.into_record(id, Utc::now());
        let id = self.store.insert(&record).await?;
        drop(turn);

        info!(
            target: "user_registry::store",
            user_id = id,
            backend = self.store.backend(),
            "User created"
        );
        Ok(id)
    }
}

/// Parse the text form of a user id. Only strictly positive integers are ids.
pub fn parse_user_id(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok().filter(|id| *id > 0)
}

fn ensure_present(input: &NewUser) -> Result<(), RepositoryError> {
    let fields = [
        ("name", &input.name),
        ("email", &input.email),
        ("address", &input.address),
        ("phone", &input.phone),
    ];
    for (field, value) in fields {
        if value.is_empty() {
            return Err(RepositoryError::MissingField { field });
        }
    }
    Ok(())
}
