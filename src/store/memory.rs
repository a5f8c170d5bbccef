use crate::core::error::StoreError;
use crate::core::store::{RowStore, Table, row_uuid};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

/// Merges the columns of `patch` into `row`.
pub(crate) fn merge_columns(row: &mut Value, patch: Value) {
    if let (Value::Object(target), Value::Object(source)) = (row, patch) {
        for (column, value) in source {
            target.insert(column, value);
        }
    }
}

/// In-memory row store, for tests and throwaway sessions.
#[derive(Clone, Default)]
pub struct MemoryRowStore {
    inner: Arc<Mutex<HashMap<Table, Vec<Value>>>>,
}

impl MemoryRowStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub(crate) async fn row_count(&self, table: Table) -> usize {
        self.inner.lock().await.get(&table).map_or(0, Vec::len)
    }
}

#[async_trait]
impl RowStore for MemoryRowStore {
    async fn select(&self, table: Table, owner: Uuid) -> Result<Vec<Value>, StoreError> {
        let tables = self.inner.lock().await;
        let rows: Vec<Value> = tables
            .get(&table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| row_uuid(row, table.owner_column()) == Some(owner))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        debug!(%table, %owner, count = rows.len(), "Memory SELECT");
        Ok(rows)
    }

    async fn insert(&self, table: Table, row: Value) -> Result<(), StoreError> {
        let key = row_uuid(&row, table.key_column()).ok_or_else(|| StoreError::Malformed {
            table: table.name(),
            reason: format!("missing {}", table.key_column()),
        })?;

        let mut tables = self.inner.lock().await;
        let rows = tables.entry(table).or_default();
        if rows
            .iter()
            .any(|existing| row_uuid(existing, table.key_column()) == Some(key))
        {
            return Err(StoreError::Backend(format!(
                "duplicate key {key} in {table}"
            )));
        }
        debug!(%table, %key, "Memory INSERT");
        rows.push(row);
        Ok(())
    }

    async fn update(&self, table: Table, owner: Uuid, row: Value) -> Result<(), StoreError> {
        let mut tables = self.inner.lock().await;
        let existing = tables.get_mut(&table).and_then(|rows| {
            rows.iter_mut()
                .find(|existing| row_uuid(existing, table.owner_column()) == Some(owner))
        });
        match existing {
            Some(existing) => {
                merge_columns(existing, row);
                debug!(%table, %owner, "Memory UPDATE");
                Ok(())
            }
            None => Err(StoreError::NotFound {
                table: table.name(),
                key: owner,
            }),
        }
    }

    async fn delete(&self, table: Table, key: Uuid) -> Result<bool, StoreError> {
        let mut tables = self.inner.lock().await;
        let Some(rows) = tables.get_mut(&table) else {
            return Ok(false);
        };
        let before = rows.len();
        rows.retain(|row| row_uuid(row, table.key_column()) != Some(key));
        let removed = rows.len() != before;
        debug!(%table, %key, removed, "Memory DELETE");
        Ok(removed)
    }
}
