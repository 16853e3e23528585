//! Budget (presupuesto) Model

use super::serde_helpers;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

pub type BudgetId = RecordId;

/// Budget lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetStatus {
    Pendiente,
    EnProceso,
    Enviado,
    Aprobado,
    Rechazado,
    Completado,
    Cancelado,
}

impl BudgetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetStatus::Pendiente => "pendiente",
            BudgetStatus::EnProceso => "en_proceso",
            BudgetStatus::Enviado => "enviado",
            BudgetStatus::Aprobado => "aprobado",
            BudgetStatus::Rechazado => "rechazado",
            BudgetStatus::Completado => "completado",
            BudgetStatus::Cancelado => "cancelado",
        }
    }

    /// Terminal states admit no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BudgetStatus::Rechazado | BudgetStatus::Completado | BudgetStatus::Cancelado
        )
    }

    /// Transition graph:
    /// pendiente → en_proceso → enviado → aprobado | rechazado;
    /// aprobado → completado; any non-terminal state → cancelado.
    pub fn can_transition_to(&self, next: BudgetStatus) -> bool {
        use BudgetStatus::*;
        match (self, next) {
            (current, Cancelado) if !current.is_terminal() => true,
            (Pendiente, EnProceso) => true,
            (EnProceso, Enviado) => true,
            (Enviado, Aprobado) | (Enviado, Rechazado) => true,
            (Aprobado, Completado) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for BudgetStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client contact block embedded in a budget
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientData {
    pub email: String,
    pub nombre: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telefono: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub empresa: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direccion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detalles: Option<String>,
}

/// One budget line. `product_id` is a weak string reference into the product
/// table; `precio_unitario` is the price captured at quote time and stays
/// untouched by later catalog price changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetLineItem {
    pub product_id: String,
    pub nombre: String,
    pub referencia: String,
    pub cantidad: u32,
    pub precio_unitario: Option<Decimal>,
    pub subtotal: Option<Decimal>,
}

/// Append-only status history entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusHistoryEntry {
    pub estado: BudgetStatus,
    pub fecha: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notas: Option<String>,
}

/// Budget model
///
/// Invariant: `historial_estados` only ever grows, and its last entry's
/// `estado` equals the document's current `estado`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Budget {
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<BudgetId>,
    /// Human-facing order code, `LOG-YYMMDD-NNN`, unique
    pub numero_pedido: String,
    /// Global monotonic quote number, unique
    pub numero_presupuesto: i64,
    pub cliente: ClientData,
    pub productos: Vec<BudgetLineItem>,
    pub estado: BudgetStatus,
    #[serde(default)]
    pub historial_estados: Vec<StatusHistoryEntry>,
    pub precio_total: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notas: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fecha_vencimiento: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Budget {
    /// Last history entry, which by invariant mirrors the current status
    pub fn last_history_entry(&self) -> Option<&StatusHistoryEntry> {
        self.historial_estados.last()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetLineItemCreate {
    pub product_id: String,
    pub nombre: String,
    pub referencia: String,
    pub cantidad: u32,
    pub precio_unitario: Option<Decimal>,
    pub subtotal: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetCreate {
    pub cliente: ClientData,
    pub productos: Vec<BudgetLineItemCreate>,
    /// Explicit total; computed from line subtotals when omitted
    pub precio_total: Option<Decimal>,
    pub notas: Option<String>,
    pub fecha_vencimiento: Option<DateTime<Utc>>,
}

/// Partial update payload for non-lifecycle fields. Status changes go
/// through the budget service so history stays consistent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notas: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precio_total: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fecha_vencimiento: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_graph_happy_path() {
        use BudgetStatus::*;
        assert!(Pendiente.can_transition_to(EnProceso));
        assert!(EnProceso.can_transition_to(Enviado));
        assert!(Enviado.can_transition_to(Aprobado));
        assert!(Enviado.can_transition_to(Rechazado));
        assert!(Aprobado.can_transition_to(Completado));
    }

    #[test]
    fn any_active_state_can_cancel() {
        use BudgetStatus::*;
        for estado in [Pendiente, EnProceso, Enviado, Aprobado] {
            assert!(estado.can_transition_to(Cancelado), "{estado} should cancel");
        }
    }

    #[test]
    fn terminal_states_admit_nothing() {
        use BudgetStatus::*;
        for estado in [Rechazado, Completado, Cancelado] {
            for next in [
                Pendiente, EnProceso, Enviado, Aprobado, Rechazado, Completado, Cancelado,
            ] {
                assert!(!estado.can_transition_to(next), "{estado} -> {next}");
            }
        }
    }

    #[test]
    fn no_skipping_stages() {
        use BudgetStatus::*;
        assert!(!Pendiente.can_transition_to(Enviado));
        assert!(!Pendiente.can_transition_to(Aprobado));
        assert!(!EnProceso.can_transition_to(Completado));
        assert!(!Enviado.can_transition_to(Completado));
    }

    #[test]
    fn status_serializes_lowercase() {
        let s = serde_json::to_string(&BudgetStatus::EnProceso).unwrap();
        assert_eq!(s, "\"en_proceso\"");
        let s = serde_json::to_string(&BudgetStatus::Pendiente).unwrap();
        assert_eq!(s, "\"pendiente\"");
    }
}
