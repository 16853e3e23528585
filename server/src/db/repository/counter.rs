//! Sequence Counter Repository
//!
//! One document per sequence domain. The increment is a single SurrealQL
//! statement, which the engine applies atomically, so two concurrent
//! allocators can never read the same value.

use super::{BaseRepository, RepoResult};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "counter";

#[derive(Clone)]
pub struct CounterRepository {
    base: BaseRepository,
}

impl CounterRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Atomically increment a counter and return the new value.
    /// Returns `None` when no counter document exists for the key yet
    /// (the caller seeds it via [`CounterRepository::create`]).
    pub async fn increment(&self, key: &str) -> RepoResult<Option<i64>> {
        let key_owned = key.to_string();
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE type::thing($table, $key) SET value += 1 RETURN AFTER",
            )
            .bind(("table", TABLE))
            .bind(("key", key_owned))
            .await?;
        let value: Option<i64> = result.take((0, "value"))?;
        Ok(value)
    }

    /// Create a counter document with an initial value. A concurrent creator
    /// loses with `RepoError::Duplicate`, which allocation treats as "someone
    /// else seeded it, increment again".
    pub async fn create(&self, key: &str, initial: i64) -> RepoResult<()> {
        let key_owned = key.to_string();
        self.base
            .db()
            .query("CREATE type::thing($table, $key) SET value = $value")
            .bind(("table", TABLE))
            .bind(("key", key_owned))
            .bind(("value", initial))
            .await?
            .check()?;
        Ok(())
    }

    /// Current value without incrementing (diagnostics only)
    pub async fn peek(&self, key: &str) -> RepoResult<Option<i64>> {
        let key_owned = key.to_string();
        let mut result = self
            .base
            .db()
            .query("SELECT value FROM type::thing($table, $key)")
            .bind(("table", TABLE))
            .bind(("key", key_owned))
            .await?;
        let value: Option<i64> = result.take((0, "value"))?;
        Ok(value)
    }
}
