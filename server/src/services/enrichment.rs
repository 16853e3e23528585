//! Reference Enrichment
//!
//! Budget lines hold weak string references into the product table. This
//! resolver joins them with live catalog data for presentation, degrading
//! per line instead of failing the read: a dangling or malformed reference
//! yields a sentinel line, never an error. Storage failures do propagate.

use crate::db::models::{Budget, BudgetLineItem, BudgetStatus, ClientData, Product, StatusHistoryEntry};
use crate::db::repository::{BudgetRepository, ProductRepository, parse_record};
use crate::utils::{AppError, AppResult};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

/// Display name for a line whose product no longer exists
pub const UNRESOLVED_NOMBRE: &str = "Producto no encontrado";

/// Outcome of resolving one weak product reference
#[derive(Debug, Clone)]
pub enum Resolution {
    Resolved(Box<Product>),
    Unresolved,
}

impl Resolution {
    pub fn is_resolved(&self) -> bool {
        matches!(self, Resolution::Resolved(_))
    }
}

/// One budget line joined with catalog data (or the sentinel)
#[derive(Debug, Clone, Serialize)]
pub struct EnrichedLineItem {
    pub product_id: String,
    pub nombre: String,
    pub referencia: String,
    pub categoria: String,
    pub imagen: String,
    pub cantidad: u32,
    pub precio_unitario: Option<Decimal>,
    pub subtotal: Option<Decimal>,
    pub resuelto: bool,
}

/// Presentation projection of a budget with every line enriched
#[derive(Debug, Clone, Serialize)]
pub struct EnrichedBudget {
    pub id: Option<String>,
    pub numero_pedido: String,
    pub numero_presupuesto: i64,
    pub cliente: ClientData,
    pub estado: BudgetStatus,
    pub historial_estados: Vec<StatusHistoryEntry>,
    pub precio_total: Option<Decimal>,
    pub notas: Option<String>,
    pub fecha_vencimiento: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub productos: Vec<EnrichedLineItem>,
}

#[derive(Clone)]
pub struct EnrichmentService {
    products: ProductRepository,
    budgets: BudgetRepository,
    placeholder_image: String,
}

impl EnrichmentService {
    pub fn new(db: Surreal<Db>, placeholder_image: impl Into<String>) -> Self {
        Self {
            products: ProductRepository::new(db.clone()),
            budgets: BudgetRepository::new(db),
            placeholder_image: placeholder_image.into(),
        }
    }

    /// Enrich every line of a budget. The output has exactly one line per
    /// input line, in the same order.
    pub async fn enrich(&self, budget: &Budget) -> AppResult<EnrichedBudget> {
        let mut productos = Vec::with_capacity(budget.productos.len());
        for line in &budget.productos {
            let resolution = self.resolve(&line.product_id).await?;
            productos.push(self.merge(line, resolution));
        }

        Ok(EnrichedBudget {
            id: budget.id.as_ref().map(|id| id.to_string()),
            numero_pedido: budget.numero_pedido.clone(),
            numero_presupuesto: budget.numero_presupuesto,
            cliente: budget.cliente.clone(),
            estado: budget.estado,
            historial_estados: budget.historial_estados.clone(),
            precio_total: budget.precio_total,
            notas: budget.notas.clone(),
            fecha_vencimiento: budget.fecha_vencimiento,
            created_at: budget.created_at,
            productos,
        })
    }

    pub async fn enrich_by_id(&self, id: &str) -> AppResult<EnrichedBudget> {
        let budget = self
            .budgets
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Budget {} not found", id)))?;
        self.enrich(&budget).await
    }

    pub async fn enrich_by_order_number(&self, numero_pedido: &str) -> AppResult<EnrichedBudget> {
        let budget = self
            .budgets
            .find_by_numero_pedido(numero_pedido)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Budget {} not found", numero_pedido)))?;
        self.enrich(&budget).await
    }

    pub async fn enrich_by_numero_presupuesto(&self, numero: i64) -> AppResult<EnrichedBudget> {
        let budget = self
            .budgets
            .find_by_numero_presupuesto(numero)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Budget #{} not found", numero)))?;
        self.enrich(&budget).await
    }

    /// Resolve one weak reference. Malformed ids degrade like missing ones.
    pub async fn resolve(&self, product_id: &str) -> AppResult<Resolution> {
        if product_id.trim().is_empty() {
            return Ok(Resolution::Unresolved);
        }
        let found = match parse_record("product", product_id) {
            Ok(_) => self.products.find_by_id(product_id).await?,
            Err(_) => None,
        };
        Ok(found
            .map(|p| Resolution::Resolved(Box::new(p)))
            .unwrap_or(Resolution::Unresolved))
    }

    fn merge(&self, line: &BudgetLineItem, resolution: Resolution) -> EnrichedLineItem {
        match resolution {
            Resolution::Resolved(product) => EnrichedLineItem {
                product_id: line.product_id.clone(),
                nombre: product.nombre.clone(),
                referencia: product.referencia.clone(),
                categoria: product.categoria.clone(),
                imagen: product
                    .imagenes
                    .first()
                    .cloned()
                    .unwrap_or_else(|| self.placeholder_image.clone()),
                cantidad: line.cantidad,
                precio_unitario: line.precio_unitario,
                subtotal: line.subtotal,
                resuelto: true,
            },
            Resolution::Unresolved => EnrichedLineItem {
                product_id: line.product_id.clone(),
                nombre: UNRESOLVED_NOMBRE.to_string(),
                referencia: line.referencia.clone(),
                categoria: String::new(),
                imagen: self.placeholder_image.clone(),
                cantidad: line.cantidad,
                precio_unitario: line.precio_unitario,
                subtotal: line.subtotal,
                resuelto: false,
            },
        }
    }
}
