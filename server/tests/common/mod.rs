//! Shared test harness: temp-dir database, capturing notifier, fixtures.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tienda_server::config::Config;
use tienda_server::db::DbService;
use tienda_server::db::models::{BudgetCreate, BudgetLineItemCreate, CategoryCreate, ClientData, ProductCreate};
use tienda_server::notify::{Notification, NotificationSender, NotifyError};
use tienda_server::state::AppState;

pub const PLACEHOLDER: &str = "/images/placeholder.png";

/// Records every notification instead of sending it
#[derive(Default)]
pub struct CapturingNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl CapturingNotifier {
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }

    /// Notifications are dispatched on background tasks; poll briefly
    /// until at least `count` arrived.
    pub async fn wait_for(&self, count: usize) -> Vec<Notification> {
        for _ in 0..100 {
            {
                let sent = self.sent.lock().unwrap();
                if sent.len() >= count {
                    return sent.clone();
                }
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.sent()
    }
}

#[async_trait::async_trait]
impl NotificationSender for CapturingNotifier {
    async fn send(&self, notification: Notification) -> Result<(), NotifyError> {
        self.sent.lock().unwrap().push(notification);
        Ok(())
    }
}

fn test_config() -> Config {
    Config {
        data_dir: String::new(),
        db_namespace: "test".to_string(),
        db_name: "test".to_string(),
        environment: "test".to_string(),
        log_level: "debug".to_string(),
        log_dir: None,
        admin_email: "admin@example.com".to_string(),
        placeholder_image: PLACEHOLDER.to_string(),
    }
}

pub async fn setup() -> (AppState, Arc<CapturingNotifier>, TempDir) {
    let dir = tempfile::tempdir().expect("temp dir");
    let db = DbService::open(&dir.path().join("test.db"), "test", "test")
        .await
        .expect("open database");
    let notifier = Arc::new(CapturingNotifier::default());
    let state = AppState::with_db(test_config(), db, notifier.clone());
    (state, notifier, dir)
}

pub fn category(nombre: &str) -> CategoryCreate {
    CategoryCreate {
        nombre: nombre.to_string(),
        descripcion: format!("Categoría {nombre}"),
        orden: None,
        publicado: None,
        configuracion_especial: None,
    }
}

pub fn product(nombre: &str, referencia: &str, categoria: &str) -> ProductCreate {
    ProductCreate {
        nombre: nombre.to_string(),
        referencia: referencia.to_string(),
        descripcion: String::new(),
        categoria: categoria.to_string(),
        imagenes: vec![],
        cantidad_minima: None,
        precio: None,
        orden_categoria: None,
        publicado: None,
    }
}

pub fn client() -> ClientData {
    ClientData {
        email: "cliente@example.com".to_string(),
        nombre: "Cliente de Prueba".to_string(),
        telefono: None,
        empresa: None,
        direccion: None,
        detalles: None,
    }
}

pub fn budget(lines: Vec<BudgetLineItemCreate>) -> BudgetCreate {
    BudgetCreate {
        cliente: client(),
        productos: lines,
        precio_total: None,
        notas: None,
        fecha_vencimiento: None,
    }
}

pub fn line(
    product_id: &str,
    cantidad: u32,
    precio_unitario: Option<rust_decimal::Decimal>,
) -> BudgetLineItemCreate {
    BudgetLineItemCreate {
        product_id: product_id.to_string(),
        nombre: "Línea".to_string(),
        referencia: "REF".to_string(),
        cantidad,
        precio_unitario,
        subtotal: None,
    }
}
