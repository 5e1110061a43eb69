//! SQLite-backed record store.
//!
//! The `users` table is created on connect when missing. `id` is the
//! primary key, so a colliding insert fails in the database itself and is
//! reported as [`StoreError::DuplicateKey`].

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::error;

use super::{RecordStore, User};
use crate::lib::errors::StoreError;

const CREATE_USERS_TABLE: &str = "CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY NOT NULL,
    name TEXT NOT NULL,
    email TEXT NOT NULL,
    address TEXT NOT NULL,
    phone TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
)";

const SELECT_USER_COLUMNS: &str =
    "SELECT id, name, email, address, phone, created_at, updated_at FROM users";

/// Record store persisted in a SQLite database.
#[derive(Debug, Clone)]
pub struct SqlStore {
    pool: SqlitePool,
}

impl SqlStore {
    /// Connect to `url` and make sure the `users` table exists.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|source| StoreError::Connect { source })?
            .create_if_missing(true);

        // Every connection to `:memory:` opens a separate database.
        let in_memory = url.contains(":memory:") || url.contains("mode=memory");
        let mut pool_options = SqlitePoolOptions::new();
        pool_options = if in_memory {
            pool_options
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            pool_options.max_connections(max_connections)
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|source| StoreError::Connect { source })?;

        let store = Self { pool };
        store.ensure_schema().await?;
        Ok(store)
    }

    async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(CREATE_USERS_TABLE)
            .execute(&self.pool)
            .await
            .map_err(|source| StoreError::Connect { source })?;
        Ok(())
    }
}

#[async_trait]
impl RecordStore for SqlStore {
    fn backend(&self) -> &'static str {
        "sqlite"
    }

    async fn find_all(&self) -> Result<Vec<User>, StoreError> {
        let rows = sqlx::query_as::<_, User>(&format!("{SELECT_USER_COLUMNS} ORDER BY id"))
            .fetch_all(&self.pool)
            .await
            .map_err(query_error)?;
        Ok(rows)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, User>(&format!("{SELECT_USER_COLUMNS} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(query_error)?;
        Ok(row)
    }

    async fn next_id(&self) -> Result<i64, StoreError> {
        let next = sqlx::query_scalar::<_, i64>("SELECT COALESCE(MAX(id), 0) + 1 FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(query_error)?;
        Ok(next)
    }

    async fn insert(&self, record: &User) -> Result<i64, StoreError> {
        sqlx::query(
            "INSERT INTO users (id, name, email, address, phone, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(record.id)
        .bind(&record.name)
        .bind(&record.email)
        .bind(&record.address)
        .bind(&record.phone)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|err| map_unique_violation(err, record.id))?;
        Ok(record.id)
    }
}

fn query_error(source: sqlx::Error) -> StoreError {
    error!(
        target: "user_registry::store",
        error = %source,
        "Record store query failed"
    );
    StoreError::Query { source }
}

/// Map a primary key collision to `DuplicateKey`.
fn map_unique_violation(err: sqlx::Error, id: i64) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.is_unique_violation() {
            return StoreError::DuplicateKey { id };
        }
    }
    query_error(err)
}
