//! Budget Lifecycle
//!
//! Creation (number allocation, line normalization, seeded history) and the
//! status state machine. The status and its history entry are written in one
//! atomic repository statement, so the history always mirrors the status.

use crate::db::models::{
    Budget, BudgetCreate, BudgetLineItem, BudgetLineItemCreate, BudgetStatus, BudgetUpdate,
    StatusHistoryEntry,
};
use crate::db::repository::{BudgetRepository, RepoError};
use crate::notify::{Notification, NotificationSender, send_best_effort};
use crate::services::sequence::{SequenceDomain, SequenceService};
use crate::utils::{AppError, AppResult};
use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::json;
use std::sync::Arc;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

/// Bounded retries when a concurrent creator wins a number first
const MAX_CREATE_ATTEMPTS: usize = 3;

#[derive(Clone)]
pub struct BudgetService {
    budgets: BudgetRepository,
    sequence: SequenceService,
    notifier: Arc<dyn NotificationSender>,
    admin_email: String,
}

impl BudgetService {
    pub fn new(
        db: Surreal<Db>,
        notifier: Arc<dyn NotificationSender>,
        admin_email: impl Into<String>,
    ) -> Self {
        Self {
            budgets: BudgetRepository::new(db.clone()),
            sequence: SequenceService::new(db),
            notifier,
            admin_email: admin_email.into(),
        }
    }

    /// Create a budget: allocate both numbers, normalize the lines, seed the
    /// history with a `pendiente` entry and notify both parties best-effort.
    ///
    /// Losing a number race surfaces as a duplicate insert; the whole
    /// allocation is retried with fresh numbers, a bounded number of times.
    pub async fn create(&self, data: BudgetCreate) -> AppResult<Budget> {
        if data.productos.is_empty() {
            return Err(AppError::Validation(
                "A budget needs at least one line item".to_string(),
            ));
        }

        let productos: Vec<BudgetLineItem> =
            data.productos.iter().map(Self::normalize_line).collect();
        let precio_total = data.precio_total.or_else(|| {
            Some(
                productos
                    .iter()
                    .filter_map(|line| line.subtotal)
                    .sum::<Decimal>(),
            )
        });

        let mut last_err = AppError::Internal("Budget creation never attempted".to_string());
        for attempt in 1..=MAX_CREATE_ATTEMPTS {
            let numero_presupuesto = self.sequence.allocate(SequenceDomain::Presupuesto).await?;
            let daily = self.sequence.allocate(SequenceDomain::PedidoDiario).await?;
            let numero_pedido = SequenceService::order_number(daily);

            let now = Utc::now();
            let budget = Budget {
                id: None,
                numero_pedido,
                numero_presupuesto,
                cliente: data.cliente.clone(),
                productos: productos.clone(),
                estado: BudgetStatus::Pendiente,
                historial_estados: vec![StatusHistoryEntry {
                    estado: BudgetStatus::Pendiente,
                    fecha: now,
                    notas: Some("Presupuesto creado".to_string()),
                }],
                precio_total,
                notas: data.notas.clone(),
                fecha_vencimiento: data.fecha_vencimiento,
                created_at: now,
            };

            match self.budgets.create(budget).await {
                Ok(saved) => {
                    tracing::info!(
                        numero_pedido = %saved.numero_pedido,
                        numero_presupuesto = saved.numero_presupuesto,
                        "Budget created"
                    );
                    self.notify_created(&saved);
                    return Ok(saved);
                }
                Err(RepoError::Duplicate(msg)) => {
                    tracing::warn!(attempt, error = %msg, "Budget number collision, retrying");
                    last_err = AppError::Conflict(msg);
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(last_err)
    }

    /// Apply a status transition. Same-status requests return the budget
    /// unchanged without touching the history; anything the transition graph
    /// forbids is rejected.
    pub async fn change_status(
        &self,
        id: &str,
        estado: BudgetStatus,
        nota: Option<String>,
    ) -> AppResult<Budget> {
        let budget = self
            .budgets
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Budget {} not found", id)))?;

        if budget.estado == estado {
            return Ok(budget);
        }
        if !budget.estado.can_transition_to(estado) {
            return Err(AppError::Validation(format!(
                "Invalid status transition: {} -> {}",
                budget.estado, estado
            )));
        }

        let entry = StatusHistoryEntry {
            estado,
            fecha: Utc::now(),
            notas: Some(nota.unwrap_or_else(|| format!("Estado cambiado a {estado}"))),
        };
        let updated = self.budgets.update_estado(id, estado, entry).await?;

        tracing::info!(
            numero_pedido = %updated.numero_pedido,
            from = %budget.estado,
            to = %estado,
            "Budget status changed"
        );
        self.notify_status(&updated, budget.estado);
        Ok(updated)
    }

    pub async fn find_by_id(&self, id: &str) -> AppResult<Budget> {
        self.budgets
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Budget {} not found", id)))
    }

    pub async fn find_by_order_number(&self, numero_pedido: &str) -> AppResult<Budget> {
        self.budgets
            .find_by_numero_pedido(numero_pedido)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Budget {} not found", numero_pedido)))
    }

    /// Budgets still waiting for a first action, newest first
    pub async fn pending(&self) -> AppResult<Vec<Budget>> {
        Ok(self.budgets.find_pending().await?)
    }

    /// Still-actionable budgets whose expiry date is in the past
    pub async fn expired(&self) -> AppResult<Vec<Budget>> {
        let now = Utc::now();
        let mut expired: Vec<Budget> = self
            .budgets
            .find_expirable()
            .await?
            .into_iter()
            .filter(|b| b.fecha_vencimiento.is_some_and(|venc| venc < now))
            .collect();
        expired.sort_by_key(|b| b.fecha_vencimiento);
        Ok(expired)
    }

    /// Merge non-lifecycle fields
    pub async fn update(&self, id: &str, data: BudgetUpdate) -> AppResult<Budget> {
        Ok(self.budgets.update(id, data).await?)
    }

    /// Remove a budget; its history goes with the document
    pub async fn remove(&self, id: &str) -> AppResult<Budget> {
        self.budgets
            .delete(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Budget {} not found", id)))
    }

    fn normalize_line(line: &BudgetLineItemCreate) -> BudgetLineItem {
        let subtotal = line.subtotal.or_else(|| {
            line.precio_unitario
                .map(|precio| precio * Decimal::from(line.cantidad))
        });
        BudgetLineItem {
            product_id: line.product_id.clone(),
            nombre: line.nombre.clone(),
            referencia: line.referencia.clone(),
            cantidad: line.cantidad,
            precio_unitario: line.precio_unitario,
            subtotal,
        }
    }

    fn notify_created(&self, budget: &Budget) {
        let resumen = json!({
            "numero_pedido": budget.numero_pedido,
            "numero_presupuesto": budget.numero_presupuesto,
            "cliente": budget.cliente.nombre,
            "lineas": budget.productos.len(),
            "precio_total": budget.precio_total,
        });
        send_best_effort(
            self.notifier.clone(),
            Notification::new(
                budget.cliente.email.clone(),
                format!("Presupuesto {} recibido", budget.numero_pedido),
                resumen.clone(),
            ),
        );
        send_best_effort(
            self.notifier.clone(),
            Notification::new(
                self.admin_email.clone(),
                format!("Nuevo presupuesto {}", budget.numero_pedido),
                resumen,
            ),
        );
    }

    fn notify_status(&self, budget: &Budget, previous: BudgetStatus) {
        send_best_effort(
            self.notifier.clone(),
            Notification::new(
                budget.cliente.email.clone(),
                format!("Presupuesto {} actualizado", budget.numero_pedido),
                json!({
                    "numero_pedido": budget.numero_pedido,
                    "estado_anterior": previous,
                    "estado": budget.estado,
                }),
            ),
        );
    }
}
