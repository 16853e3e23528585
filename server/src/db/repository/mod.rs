//! Repository Module
//!
//! CRUD access to the embedded SurrealDB tables. Everything above this layer
//! speaks [`RepoError`]; raw `surrealdb::Error`s never escape.

// Catalog
pub mod category;
pub mod product;

// Budgets
pub mod budget;

// Sequencing
pub mod counter;

// Re-exports
pub use budget::BudgetRepository;
pub use category::CategoryRepository;
pub use counter::CounterRepository;
pub use product::ProductRepository;

use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        let msg = err.to_string();
        // Unique index violations and double CREATEs come back as plain
        // database errors; they are the conflict signal the services retry on.
        if msg.contains("already contains") || msg.contains("already exists") {
            RepoError::Duplicate(msg)
        } else {
            RepoError::Database(msg)
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

// =============================================================================
// ID Convention: "table:id" strings at the API surface, RecordId internally
// =============================================================================

/// Parse an id that may or may not carry its table prefix
/// (e.g. "product:abc" or "abc" -> RecordId for table "product").
pub fn parse_record(table: &str, id: &str) -> RepoResult<RecordId> {
    if let Some((prefix, key)) = id.split_once(':') {
        if prefix != table {
            return Err(RepoError::Validation(format!(
                "Expected {} id, got {}",
                table, id
            )));
        }
        Ok(RecordId::from_table_key(table, key))
    } else {
        Ok(RecordId::from_table_key(table, id))
    }
}

/// Base repository with database reference
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }
}
