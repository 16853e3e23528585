//! Positional Ordering
//!
//! Single writer for the ordinal rank fields: `orden` on categories and
//! `orden_categoria` on products (scoped per category). Everything that moves
//! a rank goes through here; the repositories and update DTOs deliberately
//! have no way to touch these fields.
//!
//! A swap never goes through a window where two live documents share a rank:
//! the displaced document is parked on a negative rank inside a transaction,
//! the mover takes the target, and the displaced one lands on the vacated
//! rank before the commit.

use crate::db::repository::parse_record;
use crate::utils::{AppError, AppResult};
use serde::Deserialize;
use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;

/// Which way a single step moves (Up = towards rank 1)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// The two ranked families
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankKind {
    /// Products, ranked inside their category
    Product,
    /// Categories, ranked globally
    Category,
}

impl RankKind {
    fn table(&self) -> &'static str {
        match self {
            RankKind::Product => "product",
            RankKind::Category => "category",
        }
    }

    fn rank_field(&self) -> &'static str {
        match self {
            RankKind::Product => "orden_categoria",
            RankKind::Category => "orden",
        }
    }

    fn grouped(&self) -> bool {
        matches!(self, RankKind::Product)
    }
}

/// Rank projection of one document
#[derive(Debug, Deserialize)]
struct RankedRow {
    id: String,
    rank: i64,
    #[serde(default)]
    categoria: Option<String>,
}

#[derive(Clone)]
pub struct OrderingService {
    db: Surreal<Db>,
}

impl OrderingService {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    /// Rank for a new member of the group: max + 1, or 1 for an empty group
    pub async fn next_rank(&self, kind: RankKind, grupo: Option<&str>) -> AppResult<i64> {
        let sql = if kind.grouped() {
            format!(
                "SELECT math::max({rank}) AS max FROM {table} WHERE categoria = $grupo GROUP ALL",
                rank = kind.rank_field(),
                table = kind.table()
            )
        } else {
            format!(
                "SELECT math::max({rank}) AS max FROM {table} GROUP ALL",
                rank = kind.rank_field(),
                table = kind.table()
            )
        };
        let grupo_owned = grupo.unwrap_or_default().to_string();
        let mut result = self.db.query(sql).bind(("grupo", grupo_owned)).await?;
        let max: Option<i64> = result
            .take((0, "max"))?;
        Ok(max.unwrap_or(0) + 1)
    }

    /// Swap the item one step up or down with its rank neighbour.
    /// At the edge of the group this is a no-move, reported as such.
    pub async fn move_step(
        &self,
        kind: RankKind,
        id: &str,
        direction: Direction,
    ) -> AppResult<()> {
        let item = self.locate(kind, id).await?;
        let rows = self.group_rows(kind, item.categoria.as_deref()).await?;
        Self::check_rank_integrity(kind, &rows)?;

        // Ranks are unique within the group at this point, so the item's
        // rank identifies its slot.
        let idx = rows
            .iter()
            .position(|r| r.rank == item.rank)
            .ok_or_else(|| AppError::Internal("Ranked item missing from its own group".to_string()))?;

        let neighbour_idx = match direction {
            Direction::Up => {
                if idx == 0 {
                    return Err(AppError::Boundary(
                        "Already at the first position".to_string(),
                    ));
                }
                idx - 1
            }
            Direction::Down => {
                if idx + 1 >= rows.len() {
                    return Err(AppError::Boundary(
                        "Already at the last position".to_string(),
                    ));
                }
                idx + 1
            }
        };

        let neighbour = &rows[neighbour_idx];
        let item_record = parse_record(kind.table(), &rows[idx].id)?;
        let neighbour_record = parse_record(kind.table(), &neighbour.id)?;
        self.swap_ranks(kind, item_record, item.rank, neighbour_record, neighbour.rank)
            .await?;

        tracing::debug!(
            table = kind.table(),
            id,
            from = item.rank,
            to = neighbour.rank,
            "Rank step"
        );
        Ok(())
    }

    /// Move the item straight to a target rank. If another document holds it,
    /// the two exchange ranks; a vacant target is taken directly.
    pub async fn move_to_position(&self, kind: RankKind, id: &str, target: i64) -> AppResult<()> {
        if target < 1 {
            return Err(AppError::Validation(format!(
                "Rank must be 1 or greater, got {target}"
            )));
        }

        let item = self.locate(kind, id).await?;
        if item.rank == target {
            return Ok(());
        }

        let rows = self.group_rows(kind, item.categoria.as_deref()).await?;
        Self::check_rank_integrity(kind, &rows)?;

        let item_record = parse_record(kind.table(), id)?;
        match rows.iter().find(|r| r.rank == target) {
            Some(occupant) => {
                let occupant_record = parse_record(kind.table(), &occupant.id)?;
                self.swap_ranks(kind, occupant_record, target, item_record, item.rank)
                    .await?;
            }
            None => {
                let sql = format!(
                    "UPDATE $record SET {rank} = $target",
                    rank = kind.rank_field()
                );
                self.db
                    .query(sql)
                    .bind(("record", item_record))
                    .bind(("target", target))
                    .await?
                    .check()?;
            }
        }

        tracing::debug!(table = kind.table(), id, from = item.rank, to = target, "Rank move");
        Ok(())
    }

    /// Close the hole a removed rank leaves behind: every higher rank in the
    /// group shifts down by one, keeping the sequence dense.
    ///
    /// The shift runs in ascending rank order inside one transaction, so
    /// every row moves into the slot the previous one just vacated and the
    /// unique rank index is satisfied at every step.
    pub async fn close_gap(
        &self,
        kind: RankKind,
        grupo: Option<&str>,
        removed_rank: i64,
    ) -> AppResult<()> {
        let rows = self.group_rows(kind, grupo).await?;
        let shifting: Vec<&RankedRow> =
            rows.iter().filter(|r| r.rank > removed_rank).collect();
        if shifting.is_empty() {
            return Ok(());
        }

        let mut sql = String::from("BEGIN TRANSACTION; ");
        for i in 0..shifting.len() {
            sql.push_str(&format!(
                "UPDATE $record_{i} SET {rank} = $rank_{i}; ",
                rank = kind.rank_field()
            ));
        }
        sql.push_str("COMMIT TRANSACTION;");

        let mut query = self.db.query(sql);
        for (i, row) in shifting.iter().enumerate() {
            let record = parse_record(kind.table(), &row.id)?;
            query = query
                .bind((format!("record_{i}"), record))
                .bind((format!("rank_{i}"), row.rank - 1));
        }
        query.await?.check()?;
        Ok(())
    }

    /// Move a product to another category: it appends at the end of the new
    /// group, and its old group closes the gap it leaves.
    pub async fn reassign_group(&self, product_id: &str, nueva_categoria: &str) -> AppResult<()> {
        let item = self.locate(RankKind::Product, product_id).await?;
        let old_categoria = item
            .categoria
            .clone()
            .ok_or_else(|| AppError::Internal("Product row without categoria".to_string()))?;
        if old_categoria == nueva_categoria {
            return Ok(());
        }

        let new_rank = self
            .next_rank(RankKind::Product, Some(nueva_categoria))
            .await?;
        let record = parse_record(RankKind::Product.table(), product_id)?;
        self.db
            .query("UPDATE $record SET categoria = $categoria, orden_categoria = $rank")
            .bind(("record", record))
            .bind(("categoria", nueva_categoria.to_string()))
            .bind(("rank", new_rank))
            .await?
            .check()?;

        self.close_gap(RankKind::Product, Some(&old_categoria), item.rank)
            .await?;

        tracing::info!(
            product = product_id,
            from = %old_categoria,
            to = %nueva_categoria,
            rank = new_rank,
            "Product moved between categories"
        );
        Ok(())
    }

    /// Rank projection of the item, or NotFound
    async fn locate(&self, kind: RankKind, id: &str) -> AppResult<RankedRow> {
        let record = parse_record(kind.table(), id)?;
        let sql = if kind.grouped() {
            format!(
                "SELECT <string>id AS id, {rank} AS rank, categoria FROM {table} WHERE id = $record",
                rank = kind.rank_field(),
                table = kind.table()
            )
        } else {
            format!(
                "SELECT <string>id AS id, {rank} AS rank FROM {table} WHERE id = $record",
                rank = kind.rank_field(),
                table = kind.table()
            )
        };
        let mut result = self.db.query(sql).bind(("record", record)).await?;
        let rows: Vec<RankedRow> = result.take(0)?;
        rows.into_iter().next().ok_or_else(|| {
            AppError::NotFound(format!("{} {} not found", kind.table(), id))
        })
    }

    /// Whole group as rank projections, sorted ascending
    async fn group_rows(&self, kind: RankKind, grupo: Option<&str>) -> AppResult<Vec<RankedRow>> {
        let sql = if kind.grouped() {
            format!(
                "SELECT <string>id AS id, {rank} AS rank, categoria FROM {table} WHERE categoria = $grupo",
                rank = kind.rank_field(),
                table = kind.table()
            )
        } else {
            format!(
                "SELECT <string>id AS id, {rank} AS rank FROM {table}",
                rank = kind.rank_field(),
                table = kind.table()
            )
        };
        let grupo_owned = grupo.unwrap_or_default().to_string();
        let mut result = self.db.query(sql).bind(("grupo", grupo_owned)).await?;
        let mut rows: Vec<RankedRow> = result.take(0)?;
        rows.sort_by_key(|r| r.rank);
        Ok(rows)
    }

    /// A duplicated rank means the group is corrupt; refuse to move anything
    /// until it is repaired.
    fn check_rank_integrity(kind: RankKind, rows: &[RankedRow]) -> AppResult<()> {
        for pair in rows.windows(2) {
            if pair[0].rank == pair[1].rank {
                return Err(AppError::Conflict(format!(
                    "Duplicate rank {} in {} ordering",
                    pair[0].rank,
                    kind.table()
                )));
            }
        }
        Ok(())
    }

    /// Exchange two ranks in one transaction. `a` parks on a negative
    /// staging rank first, so no two documents ever share a live rank.
    async fn swap_ranks(
        &self,
        kind: RankKind,
        a: RecordId,
        rank_a: i64,
        b: RecordId,
        rank_b: i64,
    ) -> AppResult<()> {
        let sql = format!(
            "BEGIN TRANSACTION; \
             UPDATE $a SET {rank} = $staging; \
             UPDATE $b SET {rank} = $rank_a; \
             UPDATE $a SET {rank} = $rank_b; \
             COMMIT TRANSACTION;",
            rank = kind.rank_field()
        );
        self.db
            .query(sql)
            .bind(("a", a))
            .bind(("b", b))
            .bind(("staging", -rank_a))
            .bind(("rank_a", rank_a))
            .bind(("rank_b", rank_b))
            .await?
            .check()?;
        Ok(())
    }
}
