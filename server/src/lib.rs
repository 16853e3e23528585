//! Catalog and budget engine for the storefront admin backend.
//!
//! Embedded-database core behind the admin API: sequenced numbering for
//! products and budgets, dense positional ordering for catalog display,
//! the budget status lifecycle and presentation-time enrichment of weak
//! product references.

pub mod config;
pub mod db;
pub mod notify;
pub mod services;
pub mod state;
pub mod utils;

pub use config::Config;
pub use state::AppState;
pub use utils::{AppError, AppResult};
