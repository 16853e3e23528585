//! Catalog Service
//!
//! Orchestrates products and categories: identity (unique names, references
//! and product numbers), rank assignment through the ordering service and
//! the guards around category deletion.

use crate::db::models::{
    Category, CategoryCreate, CategoryUpdate, Product, ProductCreate, ProductUpdate,
};
use crate::db::repository::{CategoryRepository, ProductRepository, RepoError};
use crate::services::ordering::{Direction, OrderingService, RankKind};
use crate::services::sequence::{SequenceDomain, SequenceService};
use crate::utils::{AppError, AppResult};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

/// Bounded retries when a concurrent creator wins a product number first
const MAX_CREATE_ATTEMPTS: usize = 3;

#[derive(Clone)]
pub struct CatalogService {
    products: ProductRepository,
    categories: CategoryRepository,
    ordering: OrderingService,
    sequence: SequenceService,
}

impl CatalogService {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            products: ProductRepository::new(db.clone()),
            categories: CategoryRepository::new(db.clone()),
            ordering: OrderingService::new(db.clone()),
            sequence: SequenceService::new(db),
        }
    }

    // ========== Products ==========

    /// Create a product: unique reference, fresh product number and a rank
    /// at the end of its category (or the explicit one when given).
    pub async fn create_product(&self, data: ProductCreate) -> AppResult<Product> {
        let categoria = normalize_categoria(&data.categoria);
        self.require_category(&categoria).await?;
        check_imagenes(&data.imagenes)?;

        if self
            .products
            .find_by_referencia(&data.referencia)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(format!(
                "A product with reference '{}' already exists",
                data.referencia
            )));
        }

        let orden_categoria = match data.orden_categoria {
            Some(rank) if rank >= 1 => rank,
            Some(rank) => {
                return Err(AppError::Validation(format!(
                    "Rank must be 1 or greater, got {rank}"
                )));
            }
            None => {
                self.ordering
                    .next_rank(RankKind::Product, Some(&categoria))
                    .await?
            }
        };

        let mut last_err = AppError::Internal("Product creation never attempted".to_string());
        for attempt in 1..=MAX_CREATE_ATTEMPTS {
            let numero_producto = self.sequence.allocate(SequenceDomain::Producto).await?;
            let product = Product {
                id: None,
                numero_producto,
                nombre: data.nombre.clone(),
                referencia: data.referencia.clone(),
                descripcion: data.descripcion.clone(),
                categoria: categoria.clone(),
                imagenes: data.imagenes.clone(),
                cantidad_minima: data.cantidad_minima.unwrap_or(1),
                precio: data.precio,
                orden_categoria,
                publicado: data.publicado.unwrap_or(true),
            };
            match self.products.create(product).await {
                Ok(created) => {
                    tracing::info!(
                        referencia = %created.referencia,
                        numero_producto = created.numero_producto,
                        categoria = %created.categoria,
                        rank = created.orden_categoria,
                        "Product created"
                    );
                    return Ok(created);
                }
                Err(RepoError::Duplicate(msg)) => {
                    tracing::warn!(attempt, error = %msg, "Product insert collision, retrying");
                    last_err = AppError::Conflict(msg);
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(last_err)
    }

    pub async fn find_product(&self, id: &str) -> AppResult<Product> {
        self.products
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Product {} not found", id)))
    }

    pub async fn find_product_by_referencia(&self, referencia: &str) -> AppResult<Product> {
        self.products
            .find_by_referencia(referencia)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Product '{}' not found", referencia)))
    }

    /// Products of one category in display order
    pub async fn products_by_category(&self, categoria: &str) -> AppResult<Vec<Product>> {
        Ok(self
            .products
            .find_by_categoria(&normalize_categoria(categoria))
            .await?)
    }

    /// Merge non-rank product fields. A new reference must stay unique.
    pub async fn update_product(&self, id: &str, data: ProductUpdate) -> AppResult<Product> {
        if let Some(imagenes) = &data.imagenes {
            check_imagenes(imagenes)?;
        }
        if let Some(referencia) = &data.referencia
            && let Some(existing) = self.products.find_by_referencia(referencia).await?
            && existing.id.as_ref().map(|r| r.to_string()) != Some(normalize_id("product", id))
        {
            return Err(AppError::Conflict(format!(
                "A product with reference '{}' already exists",
                referencia
            )));
        }
        Ok(self.products.update(id, data).await?)
    }

    /// Delete a product and close the rank gap it leaves in its category
    pub async fn delete_product(&self, id: &str) -> AppResult<()> {
        let product = self.find_product(id).await?;
        self.products.delete(id).await?;
        self.ordering
            .close_gap(
                RankKind::Product,
                Some(&product.categoria),
                product.orden_categoria,
            )
            .await?;
        tracing::info!(
            referencia = %product.referencia,
            categoria = %product.categoria,
            "Product deleted"
        );
        Ok(())
    }

    /// Swap the product with its rank neighbour inside its category
    pub async fn move_product(&self, id: &str, direction: Direction) -> AppResult<()> {
        self.ordering
            .move_step(RankKind::Product, id, direction)
            .await
    }

    /// Put the product on an explicit rank inside its category
    pub async fn set_product_position(&self, id: &str, orden: i64) -> AppResult<()> {
        self.ordering
            .move_to_position(RankKind::Product, id, orden)
            .await
    }

    /// Move the product to another category (appends at its end)
    pub async fn change_product_category(
        &self,
        id: &str,
        nueva_categoria: &str,
    ) -> AppResult<()> {
        let categoria = normalize_categoria(nueva_categoria);
        self.require_category(&categoria).await?;
        self.ordering.reassign_group(id, &categoria).await
    }

    // ========== Categories ==========

    /// Create a category: unique name, rank at the end of the catalog or an
    /// explicit free one. An occupied explicit rank is rejected, not shifted.
    pub async fn create_category(&self, data: CategoryCreate) -> AppResult<Category> {
        let nombre = normalize_categoria(&data.nombre);
        if nombre.is_empty() {
            return Err(AppError::Validation(
                "Category name must not be empty".to_string(),
            ));
        }
        if self.categories.find_by_nombre(&nombre).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "A category named '{}' already exists",
                nombre
            )));
        }

        let orden = match data.orden {
            Some(rank) if rank < 1 => {
                return Err(AppError::Validation(format!(
                    "Rank must be 1 or greater, got {rank}"
                )));
            }
            Some(rank) => {
                if self.categories.find_by_orden(rank).await?.is_some() {
                    return Err(AppError::Conflict(format!(
                        "Rank {} is already taken",
                        rank
                    )));
                }
                rank
            }
            None => self.ordering.next_rank(RankKind::Category, None).await?,
        };

        let category = Category {
            id: None,
            nombre,
            descripcion: data.descripcion,
            orden,
            publicado: data.publicado.unwrap_or(true),
            configuracion_especial: data.configuracion_especial.unwrap_or(false),
        };
        let created = self.categories.create(category).await?;
        tracing::info!(nombre = %created.nombre, rank = created.orden, "Category created");
        Ok(created)
    }

    pub async fn find_category(&self, id: &str) -> AppResult<Category> {
        self.categories
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Category {} not found", id)))
    }

    /// All categories in display order
    pub async fn all_categories(&self) -> AppResult<Vec<Category>> {
        Ok(self.categories.find_all().await?)
    }

    /// Published categories in display order
    pub async fn published_categories(&self) -> AppResult<Vec<Category>> {
        Ok(self.categories.find_published().await?)
    }

    /// Published categories flagged for the "novedades" landing sections
    pub async fn novedades_categories(&self) -> AppResult<Vec<Category>> {
        Ok(self.categories.find_novedades().await?)
    }

    /// Merge non-rank category fields. A new name must stay unique.
    pub async fn update_category(&self, id: &str, data: CategoryUpdate) -> AppResult<Category> {
        let mut data = data;
        if let Some(nombre) = &data.nombre {
            let nombre = normalize_categoria(nombre);
            if let Some(existing) = self.categories.find_by_nombre(&nombre).await?
                && existing.id.as_ref().map(|r| r.to_string())
                    != Some(normalize_id("category", id))
            {
                return Err(AppError::Conflict(format!(
                    "A category named '{}' already exists",
                    nombre
                )));
            }
            data.nombre = Some(nombre);
        }
        Ok(self.categories.update(id, data).await?)
    }

    /// Delete a category. Refused while products still reference it; on
    /// success the catalog-wide rank gap is closed.
    pub async fn delete_category(&self, id: &str) -> AppResult<()> {
        let category = self.find_category(id).await?;
        let in_use = self.products.count_by_categoria(&category.nombre).await?;
        if in_use > 0 {
            return Err(AppError::Validation(format!(
                "Category '{}' still has {} product(s)",
                category.nombre, in_use
            )));
        }
        self.categories.delete(id).await?;
        self.ordering
            .close_gap(RankKind::Category, None, category.orden)
            .await?;
        tracing::info!(nombre = %category.nombre, "Category deleted");
        Ok(())
    }

    /// Swap the category with its rank neighbour
    pub async fn move_category(&self, id: &str, direction: Direction) -> AppResult<()> {
        self.ordering
            .move_step(RankKind::Category, id, direction)
            .await
    }

    /// Put the category on an explicit rank
    pub async fn set_category_position(&self, id: &str, orden: i64) -> AppResult<()> {
        self.ordering
            .move_to_position(RankKind::Category, id, orden)
            .await
    }

    async fn require_category(&self, nombre: &str) -> AppResult<()> {
        if self.categories.find_by_nombre(nombre).await?.is_none() {
            return Err(AppError::Validation(format!(
                "Unknown category '{}'",
                nombre
            )));
        }
        Ok(())
    }
}

const MAX_IMAGENES: usize = 3;

fn check_imagenes(imagenes: &[String]) -> AppResult<()> {
    if imagenes.len() > MAX_IMAGENES {
        return Err(AppError::Validation(format!(
            "A product holds at most {MAX_IMAGENES} images, got {}",
            imagenes.len()
        )));
    }
    Ok(())
}

/// Category names are stored lowercase and trimmed, matching how products
/// reference them.
fn normalize_categoria(nombre: &str) -> String {
    nombre.trim().to_lowercase()
}

/// Canonical `table:key` form of an id for equality checks
fn normalize_id(table: &str, id: &str) -> String {
    match id.split_once(':') {
        Some(_) => id.to_string(),
        None => format!("{table}:{id}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categoria_is_lowercased_and_trimmed() {
        assert_eq!(normalize_categoria("  Chocolates "), "chocolates");
        assert_eq!(normalize_categoria("TURRONES"), "turrones");
    }

    #[test]
    fn bare_and_prefixed_ids_normalize_alike() {
        assert_eq!(normalize_id("product", "abc"), "product:abc");
        assert_eq!(normalize_id("product", "product:abc"), "product:abc");
    }
}
