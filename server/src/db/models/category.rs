//! Category Model

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

pub type CategoryId = RecordId;

/// Category model
///
/// `orden` is the category's 1-based rank in the catalog-wide display order.
/// It is dense and unique across all categories; only the ordering service
/// writes it after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<CategoryId>,
    pub nombre: String,
    #[serde(default)]
    pub descripcion: String,
    #[serde(default)]
    pub orden: i64,
    #[serde(default = "default_true", deserialize_with = "serde_helpers::bool_true")]
    pub publicado: bool,
    /// Featured on the "novedades" landing sections
    #[serde(default)]
    pub configuracion_especial: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryCreate {
    pub nombre: String,
    #[serde(default)]
    pub descripcion: String,
    /// Explicit rank; next available when omitted
    pub orden: Option<i64>,
    pub publicado: Option<bool>,
    pub configuracion_especial: Option<bool>,
}

/// Partial update payload. Rank moves go through the ordering service, so
/// `orden` is deliberately not part of this shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nombre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descripcion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publicado: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configuracion_especial: Option<bool>,
}
