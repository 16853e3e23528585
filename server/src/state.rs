//! Shared application state

use crate::config::Config;
use crate::db::DbService;
use crate::notify::{LogNotifier, NotificationSender};
use crate::services::{BudgetService, CatalogService, EnrichmentService};
use crate::utils::AppResult;
use std::sync::Arc;

/// Everything a caller needs, wired once at startup
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub db: DbService,
    pub catalog: CatalogService,
    pub budgets: BudgetService,
    pub enrichment: EnrichmentService,
}

impl AppState {
    /// Open the configured store and wire the services with the default
    /// log-backed notifier.
    pub async fn new(config: Config) -> AppResult<Self> {
        let db = DbService::new(&config).await?;
        Ok(Self::with_db(config, db, Arc::new(LogNotifier)))
    }

    /// Wire the services onto an already-open store. Tests use this with a
    /// temp-dir database and a capturing notifier.
    pub fn with_db(
        config: Config,
        db: DbService,
        notifier: Arc<dyn NotificationSender>,
    ) -> Self {
        let handle = db.db.clone();
        let catalog = CatalogService::new(handle.clone());
        let budgets = BudgetService::new(handle.clone(), notifier, config.admin_email.clone());
        let enrichment = EnrichmentService::new(handle, config.placeholder_image.clone());
        Self {
            config,
            db,
            catalog,
            budgets,
            enrichment,
        }
    }
}
