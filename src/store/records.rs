//! Typed rows and the mapping between them and domain types.
//!
//! Rows are deserialized strictly: unknown columns, missing columns and
//! out-of-range values are rejected as `StoreError::Malformed` instead of
//! being defaulted.

use crate::core::error::StoreError;
use crate::core::model::{Collection, ExpenditureItem, IncomeRecord, Profile};
use crate::core::store::{RowStore, Table};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileRow {
    pub id: Uuid,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IncomeRow {
    pub id: Uuid,
    pub income: f64,
    pub goal: f64,
    pub needs: f64,
    pub wants: f64,
    pub savings: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExpenditureRow {
    pub expenditure_id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub cost: f64,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

fn malformed(table: Table, reason: impl ToString) -> StoreError {
    StoreError::Malformed {
        table: table.name(),
        reason: reason.to_string(),
    }
}

fn decode<T: DeserializeOwned>(table: Table, row: Value) -> Result<T, StoreError> {
    serde_json::from_value(row).map_err(|e| malformed(table, e))
}

impl From<&Profile> for ProfileRow {
    fn from(profile: &Profile) -> Self {
        ProfileRow {
            id: profile.id,
            username: Some(profile.username.clone()),
            first_name: Some(profile.first_name.clone()),
            last_name: Some(profile.last_name.clone()),
            email: Some(profile.email.clone()),
        }
    }
}

pub fn profile_from_row(row: ProfileRow) -> Result<Profile, StoreError> {
    let first_name = row
        .first_name
        .ok_or_else(|| malformed(Table::Profiles, "missing first_name"))?;
    Ok(Profile {
        id: row.id,
        username: row.username.unwrap_or_default(),
        first_name,
        last_name: row.last_name.unwrap_or_default(),
        email: row.email.unwrap_or_default(),
    })
}

impl IncomeRow {
    pub fn new(owner: Uuid, record: &IncomeRecord) -> Self {
        IncomeRow {
            id: owner,
            income: record.income,
            goal: record.goal,
            needs: record.needs,
            wants: record.wants,
            savings: record.savings,
        }
    }
}

pub fn income_from_row(row: IncomeRow) -> Result<IncomeRecord, StoreError> {
    let values = [row.income, row.goal, row.needs, row.wants, row.savings];
    if values.iter().any(|v| !v.is_finite()) {
        return Err(malformed(Table::Income, "non-finite amount"));
    }
    Ok(IncomeRecord {
        income: row.income,
        goal: row.goal,
        needs: row.needs,
        wants: row.wants,
        savings: row.savings,
    })
}

impl ExpenditureRow {
    pub fn new(owner: Uuid, item: &ExpenditureItem) -> Self {
        ExpenditureRow {
            expenditure_id: item.id,
            owner_id: owner,
            title: item.title.clone(),
            cost: item.cost,
            description: item.description.clone(),
            created_at: item.created_at,
        }
    }
}

pub fn expenditure_from_row(
    collection: Collection,
    row: ExpenditureRow,
) -> Result<ExpenditureItem, StoreError> {
    let table = Table::Expenditures(collection);
    if row.title.trim().is_empty() {
        return Err(malformed(table, "empty title"));
    }
    if !row.cost.is_finite() || row.cost < 0.0 {
        return Err(malformed(table, format!("invalid cost {}", row.cost)));
    }
    Ok(ExpenditureItem {
        id: row.expenditure_id,
        title: row.title,
        cost: row.cost,
        description: row.description.filter(|d| !d.is_empty()),
        created_at: row.created_at,
        category: collection.category,
        period: collection.period,
    })
}

/// Typed access to a user's tables over any [`RowStore`].
#[derive(Clone)]
pub struct BudgetStore {
    rows: Arc<dyn RowStore>,
}

impl BudgetStore {
    pub fn new(rows: Arc<dyn RowStore>) -> Self {
        Self { rows }
    }

    pub async fn fetch_profile(&self, owner: Uuid) -> Result<Option<Profile>, StoreError> {
        let rows = self.rows.select(Table::Profiles, owner).await?;
        debug!(%owner, count = rows.len(), "Fetched profile rows");
        rows.into_iter()
            .next()
            .map(|row| decode::<ProfileRow>(Table::Profiles, row).and_then(profile_from_row))
            .transpose()
    }

    pub async fn insert_profile(&self, profile: &Profile) -> Result<(), StoreError> {
        let row = serde_json::to_value(ProfileRow::from(profile))?;
        self.rows.insert(Table::Profiles, row).await
    }

    pub async fn update_profile(&self, profile: &Profile) -> Result<(), StoreError> {
        let row = serde_json::to_value(ProfileRow::from(profile))?;
        self.rows.update(Table::Profiles, profile.id, row).await
    }

    pub async fn delete_profile(&self, id: Uuid) -> Result<bool, StoreError> {
        self.rows.delete(Table::Profiles, id).await
    }

    pub async fn fetch_income(&self, owner: Uuid) -> Result<Option<IncomeRecord>, StoreError> {
        let rows = self.rows.select(Table::Income, owner).await?;
        debug!(%owner, count = rows.len(), "Fetched income rows");
        rows.into_iter()
            .next()
            .map(|row| decode::<IncomeRow>(Table::Income, row).and_then(income_from_row))
            .transpose()
    }

    pub async fn insert_income(&self, owner: Uuid, record: &IncomeRecord) -> Result<(), StoreError> {
        let row = serde_json::to_value(IncomeRow::new(owner, record))?;
        self.rows.insert(Table::Income, row).await
    }

    pub async fn update_income(&self, owner: Uuid, record: &IncomeRecord) -> Result<(), StoreError> {
        let row = serde_json::to_value(IncomeRow::new(owner, record))?;
        self.rows.update(Table::Income, owner, row).await
    }

    /// Updates the income row, creating it when the owner has none yet.
    pub async fn save_income(&self, owner: Uuid, record: &IncomeRecord) -> Result<(), StoreError> {
        match self.update_income(owner, record).await {
            Err(StoreError::NotFound { .. }) => {
                debug!(%owner, "No income row to update, inserting one");
                self.insert_income(owner, record).await
            }
            other => other,
        }
    }

    pub async fn fetch_expenditures(
        &self,
        owner: Uuid,
        collection: Collection,
    ) -> Result<Vec<ExpenditureItem>, StoreError> {
        let table = Table::Expenditures(collection);
        let rows = self.rows.select(table, owner).await?;
        debug!(%owner, %table, count = rows.len(), "Fetched expenditure rows");
        rows.into_iter()
            .map(|row| {
                decode::<ExpenditureRow>(table, row)
                    .and_then(|row| expenditure_from_row(collection, row))
            })
            .collect()
    }

    pub async fn insert_expenditure(
        &self,
        owner: Uuid,
        collection: Collection,
        item: &ExpenditureItem,
    ) -> Result<(), StoreError> {
        let row = serde_json::to_value(ExpenditureRow::new(owner, item))?;
        self.rows.insert(Table::Expenditures(collection), row).await
    }

    pub async fn delete_expenditure(
        &self,
        collection: Collection,
        id: Uuid,
    ) -> Result<bool, StoreError> {
        self.rows.delete(Table::Expenditures(collection), id).await
    }
}
