//! Notification Module
//!
//! Best-effort outbound notifications (client and administrator mail, in the
//! surrounding system). Delivery transport is out of scope here; the engine
//! only needs the fire-and-forget contract: a failed send is logged and
//! absorbed, it never fails the business operation that triggered it.

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

/// Notification channel failure. Never crosses a service boundary.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Notification channel failed: {0}")]
    Channel(String),
}

/// Outbound message
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub id: Uuid,
    pub destinatario: String,
    pub asunto: String,
    pub cuerpo: serde_json::Value,
}

impl Notification {
    pub fn new(
        destinatario: impl Into<String>,
        asunto: impl Into<String>,
        cuerpo: serde_json::Value,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            destinatario: destinatario.into(),
            asunto: asunto.into(),
            cuerpo,
        }
    }
}

/// Outbound notification sender
#[async_trait]
pub trait NotificationSender: Send + Sync {
    async fn send(&self, notification: Notification) -> Result<(), NotifyError>;
}

/// Default sender: writes the notification to the log. The surrounding
/// system swaps in a real mail transport behind the same trait.
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

#[async_trait]
impl NotificationSender for LogNotifier {
    async fn send(&self, notification: Notification) -> Result<(), NotifyError> {
        tracing::info!(
            id = %notification.id,
            destinatario = %notification.destinatario,
            asunto = %notification.asunto,
            "Notification dispatched"
        );
        Ok(())
    }
}

/// Dispatch on a background task; log and absorb any failure.
pub fn send_best_effort(sender: Arc<dyn NotificationSender>, notification: Notification) {
    tokio::spawn(async move {
        let id = notification.id;
        let asunto = notification.asunto.clone();
        if let Err(e) = sender.send(notification).await {
            tracing::warn!(id = %id, asunto = %asunto, error = %e, "Notification failed");
        }
    });
}
