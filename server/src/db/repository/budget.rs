//! Budget Repository

use super::{BaseRepository, RepoError, RepoResult, parse_record};
use crate::db::models::{Budget, BudgetStatus, BudgetUpdate, StatusHistoryEntry};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "budget";

#[derive(Clone)]
pub struct BudgetRepository {
    base: BaseRepository,
}

impl BudgetRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Insert a new budget. Numbers and the seeded history entry must already
    /// be in place (budget service).
    pub async fn create(&self, budget: Budget) -> RepoResult<Budget> {
        let created: Option<Budget> = self.base.db().create(TABLE).content(budget).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create budget".to_string()))
    }

    /// Find budget by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Budget>> {
        let record = parse_record(TABLE, id)?;
        let budget: Option<Budget> = self.base.db().select(record).await?;
        Ok(budget)
    }

    /// Find budget by its human-facing order code
    pub async fn find_by_numero_pedido(&self, numero_pedido: &str) -> RepoResult<Option<Budget>> {
        let numero = numero_pedido.to_string();
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM budget WHERE numero_pedido = $numero LIMIT 1")
            .bind(("numero", numero))
            .await?;
        let budgets: Vec<Budget> = result.take(0)?;
        Ok(budgets.into_iter().next())
    }

    /// Find budget by quote number
    pub async fn find_by_numero_presupuesto(&self, numero: i64) -> RepoResult<Option<Budget>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM budget WHERE numero_presupuesto = $numero LIMIT 1")
            .bind(("numero", numero))
            .await?;
        let budgets: Vec<Budget> = result.take(0)?;
        Ok(budgets.into_iter().next())
    }

    /// Set a new status and append its history entry in one atomic statement,
    /// so no reader can see the status without its history record.
    pub async fn update_estado(
        &self,
        id: &str,
        estado: BudgetStatus,
        entry: StatusHistoryEntry,
    ) -> RepoResult<Budget> {
        let record = parse_record(TABLE, id)?;
        let mut result = self
            .base
            .db()
            .query("UPDATE $record SET estado = $estado, historial_estados += $entry RETURN AFTER")
            .bind(("record", record))
            .bind(("estado", estado))
            .bind(("entry", entry))
            .await?;
        let budgets: Vec<Budget> = result.take(0)?;
        budgets
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Budget {} not found", id)))
    }

    /// Merge non-lifecycle fields into a budget
    pub async fn update(&self, id: &str, data: BudgetUpdate) -> RepoResult<Budget> {
        let record = parse_record(TABLE, id)?;
        self.base
            .db()
            .query("UPDATE $record MERGE $data")
            .bind(("record", record.clone()))
            .bind(("data", data))
            .await?;

        let updated: Option<Budget> = self.base.db().select(record).await?;
        updated.ok_or_else(|| RepoError::NotFound(format!("Budget {} not found", id)))
    }

    /// Budgets still waiting for a first action, newest first
    pub async fn find_pending(&self) -> RepoResult<Vec<Budget>> {
        let budgets: Vec<Budget> = self
            .base
            .db()
            .query("SELECT * FROM budget WHERE estado = 'pendiente' ORDER BY created_at DESC")
            .await?
            .take(0)?;
        Ok(budgets)
    }

    /// Still-actionable budgets carrying an expiry date. The cutoff
    /// comparison happens in the service, on parsed timestamps.
    pub async fn find_expirable(&self) -> RepoResult<Vec<Budget>> {
        let budgets: Vec<Budget> = self
            .base
            .db()
            .query(
                "SELECT * FROM budget \
                 WHERE fecha_vencimiento != NONE \
                 AND estado NOT IN ['completado', 'cancelado']",
            )
            .await?
            .take(0)?;
        Ok(budgets)
    }

    /// Count budgets whose order code starts with a given prefix
    /// (used to seed the daily counter on migrated data)
    pub async fn count_numero_pedido_prefix(&self, prefix: &str) -> RepoResult<i64> {
        let prefix_owned = prefix.to_string();
        let mut result = self
            .base
            .db()
            .query(
                "SELECT count() FROM budget \
                 WHERE string::starts_with(numero_pedido, $prefix) GROUP ALL",
            )
            .bind(("prefix", prefix_owned))
            .await?;
        let count: Option<i64> = result.take((0, "count"))?;
        Ok(count.unwrap_or(0))
    }

    /// Highest quote number on record (counter seeding for migrated data)
    pub async fn max_numero_presupuesto(&self) -> RepoResult<Option<i64>> {
        let mut result = self
            .base
            .db()
            .query("SELECT math::max(numero_presupuesto) AS max FROM budget GROUP ALL")
            .await?;
        let max: Option<i64> = result.take((0, "max"))?;
        Ok(max)
    }

    /// Hard delete a budget
    pub async fn delete(&self, id: &str) -> RepoResult<Option<Budget>> {
        let record = parse_record(TABLE, id)?;
        let deleted: Option<Budget> = self.base.db().delete(record).await?;
        Ok(deleted)
    }
}
