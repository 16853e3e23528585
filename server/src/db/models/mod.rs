//! Persisted document shapes and their Create/Update payloads

pub mod budget;
pub mod category;
pub mod counter;
pub mod product;
pub mod serde_helpers;

pub use budget::{
    Budget, BudgetCreate, BudgetId, BudgetLineItem, BudgetLineItemCreate, BudgetStatus,
    BudgetUpdate, ClientData, StatusHistoryEntry,
};
pub use category::{Category, CategoryCreate, CategoryId, CategoryUpdate};
pub use counter::Counter;
pub use product::{Product, ProductCreate, ProductId, ProductUpdate};
