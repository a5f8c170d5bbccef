//! Terminal presentation of sessions, budgets and reports.

pub mod budget;
pub mod expenditure;
pub mod profile;
pub mod report;
pub mod setup;
pub mod ui;
