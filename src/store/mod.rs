pub mod disk;
pub mod memory;
pub mod records;
pub mod rest;

use crate::core::config::{AppConfig, StoreConfig};
use anyhow::{Context, Result};
use disk::DiskRowStore;
use memory::MemoryRowStore;
pub use records::BudgetStore;
use rest::RestRowStore;
use std::sync::Arc;
use tracing::debug;

/// Opens the row store selected in the config.
pub fn open_store(config: &AppConfig) -> Result<BudgetStore> {
    let rows: Arc<dyn crate::core::store::RowStore> = match &config.store {
        StoreConfig::Memory => {
            debug!("Using in-memory store");
            Arc::new(MemoryRowStore::new())
        }
        StoreConfig::Disk { .. } => {
            let path = config.default_data_path()?;
            debug!("Using disk store at {}", path.display());
            Arc::new(
                DiskRowStore::open(&path)
                    .with_context(|| format!("Failed to open data store at {}", path.display()))?,
            )
        }
        StoreConfig::Rest { base_url, api_key } => {
            debug!("Using remote store at {}", base_url);
            Arc::new(RestRowStore::new(base_url, api_key)?)
        }
    };
    Ok(BudgetStore::new(rows))
}
