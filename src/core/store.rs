//! Row store abstraction: the remote tables a user's data lives in.

use crate::core::error::StoreError;
use crate::core::model::Collection;
use async_trait::async_trait;
use serde_json::Value;
use std::fmt::Display;
use uuid::Uuid;

/// The closed set of tables the client reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Profiles,
    Income,
    Expenditures(Collection),
}

impl Table {
    pub fn name(&self) -> String {
        match self {
            Table::Profiles => "profiles".to_string(),
            Table::Income => "income".to_string(),
            Table::Expenditures(collection) => collection.table_name(),
        }
    }

    /// Column holding the owning user's id.
    pub fn owner_column(&self) -> &'static str {
        match self {
            Table::Profiles | Table::Income => "id",
            Table::Expenditures(_) => "owner_id",
        }
    }

    /// Column identifying a single row.
    pub fn key_column(&self) -> &'static str {
        match self {
            Table::Profiles | Table::Income => "id",
            Table::Expenditures(_) => "expenditure_id",
        }
    }

    pub fn all() -> Vec<Table> {
        let mut tables = vec![Table::Profiles, Table::Income];
        tables.extend(Collection::ALL.iter().copied().map(Table::Expenditures));
        tables
    }
}

impl Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Reads a uuid column out of a raw row.
pub fn row_uuid(row: &Value, column: &str) -> Option<Uuid> {
    row.get(column)
        .and_then(Value::as_str)
        .and_then(|s| Uuid::parse_str(s).ok())
}

/// CRUD over untyped rows, with no multi-row guarantees.
#[async_trait]
pub trait RowStore: Send + Sync {
    /// All rows of `table` owned by `owner`.
    async fn select(&self, table: Table, owner: Uuid) -> Result<Vec<Value>, StoreError>;

    async fn insert(&self, table: Table, row: Value) -> Result<(), StoreError>;

    /// Overwrites the columns present in `row` on the row owned by `owner`.
    /// Fails with `NotFound` if there is none.
    async fn update(&self, table: Table, owner: Uuid, row: Value) -> Result<(), StoreError>;

    /// Deletes the row whose key column equals `key`, reporting whether one existed.
    async fn delete(&self, table: Table, key: Uuid) -> Result<bool, StoreError>;
}
