//! Product Repository

use super::{BaseRepository, RepoError, RepoResult, parse_record};
use crate::db::models::{Product, ProductUpdate};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "product";

#[derive(Clone)]
pub struct ProductRepository {
    base: BaseRepository,
}

impl ProductRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find product by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Product>> {
        let record = parse_record(TABLE, id)?;
        let product: Option<Product> = self.base.db().select(record).await?;
        Ok(product)
    }

    /// Find product by its unique commercial reference
    pub async fn find_by_referencia(&self, referencia: &str) -> RepoResult<Option<Product>> {
        let referencia_owned = referencia.to_string();
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM product WHERE referencia = $referencia LIMIT 1")
            .bind(("referencia", referencia_owned))
            .await?;
        let products: Vec<Product> = result.take(0)?;
        Ok(products.into_iter().next())
    }

    /// All products of one category, rank order
    pub async fn find_by_categoria(&self, categoria: &str) -> RepoResult<Vec<Product>> {
        let categoria_owned = categoria.to_string();
        let products: Vec<Product> = self
            .base
            .db()
            .query("SELECT * FROM product WHERE categoria = $categoria ORDER BY orden_categoria")
            .bind(("categoria", categoria_owned))
            .await?
            .take(0)?;
        Ok(products)
    }

    /// Number of products referencing a category
    pub async fn count_by_categoria(&self, categoria: &str) -> RepoResult<i64> {
        let categoria_owned = categoria.to_string();
        let mut result = self
            .base
            .db()
            .query("SELECT count() FROM product WHERE categoria = $categoria GROUP ALL")
            .bind(("categoria", categoria_owned))
            .await?;
        let count: Option<i64> = result.take((0, "count"))?;
        Ok(count.unwrap_or(0))
    }

    /// Highest product number on record (counter seeding for migrated data)
    pub async fn max_numero_producto(&self) -> RepoResult<Option<i64>> {
        let mut result = self
            .base
            .db()
            .query("SELECT math::max(numero_producto) AS max FROM product GROUP ALL")
            .await?;
        let max: Option<i64> = result.take((0, "max"))?;
        Ok(max)
    }

    /// Insert a new product. Sequence number and rank must already be decided
    /// by the caller (catalog service + sequence/ordering services).
    pub async fn create(&self, product: Product) -> RepoResult<Product> {
        let created: Option<Product> = self.base.db().create(TABLE).content(product).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create product".to_string()))
    }

    /// Merge non-rank fields into a product
    pub async fn update(&self, id: &str, data: ProductUpdate) -> RepoResult<Product> {
        let record = parse_record(TABLE, id)?;
        self.base
            .db()
            .query("UPDATE $record MERGE $data")
            .bind(("record", record.clone()))
            .bind(("data", data))
            .await?;

        let updated: Option<Product> = self.base.db().select(record).await?;
        updated.ok_or_else(|| RepoError::NotFound(format!("Product {} not found", id)))
    }

    /// Hard delete a product
    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        let record = parse_record(TABLE, id)?;
        let deleted: Option<Product> = self.base.db().delete(record).await?;
        Ok(deleted.is_some())
    }
}
