use crate::core::error::StoreError;
use crate::core::store::{RowStore, Table, row_uuid};
use crate::store::memory::merge_columns;
use async_trait::async_trait;
use fjall::{Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Row store persisted in a fjall keyspace, one partition per table.
///
/// Rows are stored as JSON keyed by the table's key column.
pub struct DiskRowStore {
    keyspace: Arc<Keyspace>,
    partitions: HashMap<Table, PartitionHandle>,
}

impl DiskRowStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        std::fs::create_dir_all(path)?;
        let keyspace = fjall::Config::new(path.join("fjall_db")).open()?;

        let mut partitions = HashMap::new();
        for table in Table::all() {
            let partition =
                keyspace.open_partition(&table.name(), PartitionCreateOptions::default())?;
            partitions.insert(table, partition);
        }
        debug!(path = %path.display(), "Opened disk row store");

        Ok(Self {
            keyspace: Arc::new(keyspace),
            partitions,
        })
    }

    fn partition(&self, table: Table) -> Result<&PartitionHandle, StoreError> {
        self.partitions
            .get(&table)
            .ok_or_else(|| StoreError::Backend(format!("no partition for {table}")))
    }

    fn persist(&self) -> Result<(), StoreError> {
        self.keyspace.persist(PersistMode::SyncAll)?;
        Ok(())
    }

    fn rows(&self, table: Table) -> Result<Vec<(Vec<u8>, Value)>, StoreError> {
        let mut rows = Vec::new();
        for entry in self.partition(table)?.iter() {
            let (key, value) = entry?;
            rows.push((key.to_vec(), serde_json::from_slice(&value)?));
        }
        Ok(rows)
    }
}

#[async_trait]
impl RowStore for DiskRowStore {
    async fn select(&self, table: Table, owner: Uuid) -> Result<Vec<Value>, StoreError> {
        let rows: Vec<Value> = self
            .rows(table)?
            .into_iter()
            .map(|(_, row)| row)
            .filter(|row| row_uuid(row, table.owner_column()) == Some(owner))
            .collect();
        debug!(%table, %owner, count = rows.len(), "Disk SELECT");
        Ok(rows)
    }

    async fn insert(&self, table: Table, row: Value) -> Result<(), StoreError> {
        let key = row_uuid(&row, table.key_column()).ok_or_else(|| StoreError::Malformed {
            table: table.name(),
            reason: format!("missing {}", table.key_column()),
        })?;

        let partition = self.partition(table)?;
        if partition.contains_key(key.as_bytes())? {
            return Err(StoreError::Backend(format!(
                "duplicate key {key} in {table}"
            )));
        }
        partition.insert(key.as_bytes().to_vec(), serde_json::to_vec(&row)?)?;
        self.persist()?;
        debug!(%table, %key, "Disk INSERT");
        Ok(())
    }

    async fn update(&self, table: Table, owner: Uuid, row: Value) -> Result<(), StoreError> {
        let existing = self
            .rows(table)?
            .into_iter()
            .find(|(_, existing)| row_uuid(existing, table.owner_column()) == Some(owner));

        let Some((key, mut existing)) = existing else {
            return Err(StoreError::NotFound {
                table: table.name(),
                key: owner,
            });
        };
        merge_columns(&mut existing, row);
        self.partition(table)?
            .insert(key, serde_json::to_vec(&existing)?)?;
        self.persist()?;
        debug!(%table, %owner, "Disk UPDATE");
        Ok(())
    }

    async fn delete(&self, table: Table, key: Uuid) -> Result<bool, StoreError> {
        let partition = self.partition(table)?;
        if !partition.contains_key(key.as_bytes())? {
            return Ok(false);
        }
        partition.remove(key.as_bytes().to_vec())?;
        self.persist()?;
        debug!(%table, %key, "Disk DELETE");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{Category, Collection, Period};
    use serde_json::json;
    use tempfile::tempdir;

    fn wants() -> Table {
        Table::Expenditures(Collection::new(Category::Wants, Period::Yearly))
    }

    #[tokio::test]
    async fn test_disk_store_insert_select_delete() {
        let dir = tempdir().unwrap();
        let store = DiskRowStore::open(dir.path()).unwrap();
        let owner = Uuid::new_v4();
        let id = Uuid::new_v4();

        assert!(store.select(wants(), owner).await.unwrap().is_empty());

        store
            .insert(wants(), json!({ "expenditure_id": id, "owner_id": owner, "cost": 12.5 }))
            .await
            .unwrap();
        let rows = store.select(wants(), owner).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["cost"], 12.5);
        assert!(store.select(wants(), Uuid::new_v4()).await.unwrap().is_empty());

        assert!(store.delete(wants(), id).await.unwrap());
        assert!(!store.delete(wants(), id).await.unwrap());
        assert!(store.select(wants(), owner).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_disk_store_update_by_owner() {
        let dir = tempdir().unwrap();
        let store = DiskRowStore::open(dir.path()).unwrap();
        let owner = Uuid::new_v4();

        store
            .insert(Table::Profiles, json!({ "id": owner, "first_name": "Sam" }))
            .await
            .unwrap();
        assert!(
            store
                .insert(Table::Profiles, json!({ "id": owner, "first_name": "Sam" }))
                .await
                .is_err()
        );

        store
            .update(Table::Profiles, owner, json!({ "first_name": "Samantha" }))
            .await
            .unwrap();
        let rows = store.select(Table::Profiles, owner).await.unwrap();
        assert_eq!(rows[0]["first_name"], "Samantha");

        let missing = store
            .update(Table::Profiles, Uuid::new_v4(), json!({}))
            .await;
        assert!(matches!(missing, Err(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_disk_store_survives_reopen() {
        let dir = tempdir().unwrap();
        let owner = Uuid::new_v4();
        {
            let store = DiskRowStore::open(dir.path()).unwrap();
            store
                .insert(Table::Income, json!({ "id": owner, "income": 2000.0 }))
                .await
                .unwrap();
        }

        let store = DiskRowStore::open(dir.path()).unwrap();
        let rows = store.select(Table::Income, owner).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["income"], 2000.0);
    }
}
