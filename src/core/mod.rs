//! Core budgeting logic and abstractions

pub mod budget;
pub mod config;
pub mod error;
pub mod log;
pub mod model;
pub mod report;
pub mod store;
pub mod validation;

// Re-export main types for cleaner imports
pub use error::{BudgetError, StoreError};
pub use model::{Category, Collection, ExpenditureItem, IncomeRecord, Period, Profile, Snapshot};
pub use store::{RowStore, Table};
