//! Category Repository

use super::{BaseRepository, RepoError, RepoResult, parse_record};
use crate::db::models::{Category, CategoryUpdate};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "category";

#[derive(Clone)]
pub struct CategoryRepository {
    base: BaseRepository,
}

impl CategoryRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find all categories ordered by rank
    pub async fn find_all(&self) -> RepoResult<Vec<Category>> {
        let categories: Vec<Category> = self
            .base
            .db()
            .query("SELECT * FROM category ORDER BY orden")
            .await?
            .take(0)?;
        Ok(categories)
    }

    /// Find published categories ordered by rank
    pub async fn find_published(&self) -> RepoResult<Vec<Category>> {
        let categories: Vec<Category> = self
            .base
            .db()
            .query("SELECT * FROM category WHERE publicado = true ORDER BY orden")
            .await?
            .take(0)?;
        Ok(categories)
    }

    /// Published categories featured on the "novedades" sections, rank order
    pub async fn find_novedades(&self) -> RepoResult<Vec<Category>> {
        let categories: Vec<Category> = self
            .base
            .db()
            .query(
                "SELECT * FROM category \
                 WHERE publicado = true AND configuracion_especial = true \
                 ORDER BY orden",
            )
            .await?
            .take(0)?;
        Ok(categories)
    }

    /// Find category by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Category>> {
        let record = parse_record(TABLE, id)?;
        let category: Option<Category> = self.base.db().select(record).await?;
        Ok(category)
    }

    /// Find category by name
    pub async fn find_by_nombre(&self, nombre: &str) -> RepoResult<Option<Category>> {
        let nombre_owned = nombre.to_string();
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM category WHERE nombre = $nombre LIMIT 1")
            .bind(("nombre", nombre_owned))
            .await?;
        let categories: Vec<Category> = result.take(0)?;
        Ok(categories.into_iter().next())
    }

    /// Find the category holding a given rank, if any
    pub async fn find_by_orden(&self, orden: i64) -> RepoResult<Option<Category>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM category WHERE orden = $orden LIMIT 1")
            .bind(("orden", orden))
            .await?;
        let categories: Vec<Category> = result.take(0)?;
        Ok(categories.into_iter().next())
    }

    /// Insert a new category. Rank must already be decided by the caller
    /// (catalog service + ordering service).
    pub async fn create(&self, category: Category) -> RepoResult<Category> {
        let created: Option<Category> = self.base.db().create(TABLE).content(category).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create category".to_string()))
    }

    /// Merge non-rank fields into a category
    pub async fn update(&self, id: &str, data: CategoryUpdate) -> RepoResult<Category> {
        let record = parse_record(TABLE, id)?;
        self.base
            .db()
            .query("UPDATE $record MERGE $data")
            .bind(("record", record.clone()))
            .bind(("data", data))
            .await?;

        let updated: Option<Category> = self.base.db().select(record).await?;
        updated.ok_or_else(|| RepoError::NotFound(format!("Category {} not found", id)))
    }

    /// Hard delete a category
    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        let record = parse_record(TABLE, id)?;
        let deleted: Option<Category> = self.base.db().delete(record).await?;
        Ok(deleted.is_some())
    }
}
