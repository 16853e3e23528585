//! Database Module
//!
//! Opens the embedded SurrealDB store and applies the schema pass.

pub mod models;
pub mod repository;

use crate::config::Config;
use crate::utils::{AppError, AppResult};
use std::path::Path;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, RocksDb};

/// Database service owning the embedded SurrealDB handle
#[derive(Clone)]
pub struct DbService {
    pub db: Surreal<Db>,
}

impl DbService {
    /// Open (or create) the store under the configured data directory
    pub async fn new(config: &Config) -> AppResult<Self> {
        let path = Path::new(&config.data_dir).join("catalogo.db");
        Self::open(&path, &config.db_namespace, &config.db_name).await
    }

    /// Open a store at an explicit path (tests use a temp dir here)
    pub async fn open(path: &Path, namespace: &str, database: &str) -> AppResult<Self> {
        let db: Surreal<Db> = Surreal::new::<RocksDb>(path)
            .await
            .map_err(|e| AppError::Database(format!("Failed to open database: {e}")))?;
        db.use_ns(namespace)
            .use_db(database)
            .await
            .map_err(|e| AppError::Database(format!("Failed to select namespace: {e}")))?;

        define_schema(&db).await?;
        tracing::info!(path = %path.display(), "Database ready");

        Ok(Self { db })
    }
}

/// Idempotent schema pass.
///
/// The unique indexes are the storage-layer backstop for the sequence and
/// identity invariants: a racing insert that slips past the atomic counters
/// fails here as a duplicate, and the caller re-allocates.
async fn define_schema(db: &Surreal<Db>) -> AppResult<()> {
    let statements = [
        "DEFINE INDEX IF NOT EXISTS category_nombre ON TABLE category FIELDS nombre UNIQUE",
        "DEFINE INDEX IF NOT EXISTS product_referencia ON TABLE product FIELDS referencia UNIQUE",
        "DEFINE INDEX IF NOT EXISTS product_numero ON TABLE product FIELDS numero_producto UNIQUE",
        "DEFINE INDEX IF NOT EXISTS budget_numero_pedido ON TABLE budget FIELDS numero_pedido UNIQUE",
        "DEFINE INDEX IF NOT EXISTS budget_numero_presupuesto ON TABLE budget FIELDS numero_presupuesto UNIQUE",
        // Rank fields are unique too: the staged swap parks the displaced
        // record on a negative rank, so no step of a move ever writes a
        // duplicate, and a racing writer loses with a duplicate error.
        "DEFINE INDEX IF NOT EXISTS product_categoria_orden ON TABLE product FIELDS categoria, orden_categoria UNIQUE",
        "DEFINE INDEX IF NOT EXISTS category_orden ON TABLE category FIELDS orden UNIQUE",
    ];

    for statement in statements {
        db.query(statement)
            .await
            .map_err(|e| AppError::Database(format!("Schema definition failed: {e}")))?
            .check()
            .map_err(|e| AppError::Database(format!("Schema definition failed: {e}")))?;
    }
    Ok(())
}
