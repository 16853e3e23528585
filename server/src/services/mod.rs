//! Service layer
//!
//! - [`sequence`]: atomic counters behind the human-facing numbers
//! - [`ordering`]: the single writer for the ordinal rank fields
//! - [`catalog_service`]: product and category orchestration
//! - [`budget_service`]: budget creation and the status state machine
//! - [`enrichment`]: joining weak budget references with catalog data

pub mod budget_service;
pub mod catalog_service;
pub mod enrichment;
pub mod ordering;
pub mod sequence;

pub use budget_service::BudgetService;
pub use catalog_service::CatalogService;
pub use enrichment::{EnrichedBudget, EnrichedLineItem, EnrichmentService, Resolution};
pub use ordering::{Direction, OrderingService, RankKind};
pub use sequence::{SequenceDomain, SequenceService};
