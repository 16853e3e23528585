//! Product Model

use super::serde_helpers;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

pub type ProductId = RecordId;

/// Product model
///
/// `categoria` is a weak reference: the lowercase category *name*, as the
/// storefront stores it. `orden_categoria` is the 1-based rank inside that
/// category; dense and unique per category, written only by the ordering
/// service after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<ProductId>,
    /// Global monotonic product number, unique across the catalog
    #[serde(default)]
    pub numero_producto: i64,
    pub nombre: String,
    pub referencia: String,
    #[serde(default)]
    pub descripcion: String,
    pub categoria: String,
    /// Up to 3 images; the first is the display image
    #[serde(default)]
    pub imagenes: Vec<String>,
    #[serde(default = "default_cantidad_minima")]
    pub cantidad_minima: u32,
    pub precio: Option<Decimal>,
    #[serde(default)]
    pub orden_categoria: i64,
    #[serde(default = "default_true", deserialize_with = "serde_helpers::bool_true")]
    pub publicado: bool,
}

fn default_true() -> bool {
    true
}

fn default_cantidad_minima() -> u32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCreate {
    pub nombre: String,
    pub referencia: String,
    #[serde(default)]
    pub descripcion: String,
    pub categoria: String,
    #[serde(default)]
    pub imagenes: Vec<String>,
    pub cantidad_minima: Option<u32>,
    pub precio: Option<Decimal>,
    /// Explicit rank inside the category; next available when omitted
    pub orden_categoria: Option<i64>,
    pub publicado: Option<bool>,
}

/// Partial update payload. `categoria` and `orden_categoria` are absent on
/// purpose: group changes and rank moves go through the ordering service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nombre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referencia: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descripcion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imagenes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cantidad_minima: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precio: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publicado: Option<bool>,
}
