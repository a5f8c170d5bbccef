//! A signed-in user's view of their data.
//!
//! A [`Session`] is created on sign-up or sign-in and consumed on sign-out.
//! Every mutation is awaited to completion before a full re-fetch of the
//! snapshot starts; a failed mutation or refresh leaves the previous
//! snapshot in place.

use crate::core::budget::{self, PurchaseCheck};
use crate::core::error::BudgetError;
use crate::core::model::{
    Category, Collection, ExpenditureDraft, ExpenditureItem, IncomeRecord, Period, Profile,
    ProfileDraft, Snapshot,
};
use crate::core::validation;
use crate::store::BudgetStore;
use chrono::{NaiveDate, Utc};
use futures::future::try_join_all;
use std::collections::HashMap;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub struct Session {
    store: BudgetStore,
    user_id: Uuid,
    snapshot: Snapshot,
}

impl Session {
    /// Creates the profile and income records of a new user and opens a session for them.
    pub async fn sign_up(
        store: BudgetStore,
        draft: ProfileDraft,
        income: IncomeRecord,
    ) -> Result<Self, BudgetError> {
        validation::validate_profile(&draft)?;
        validation::validate_income(&income)?;

        let profile = Profile {
            id: Uuid::new_v4(),
            username: draft.username.trim().to_string(),
            first_name: draft.first_name.trim().to_string(),
            last_name: draft.last_name.trim().to_string(),
            email: draft.email.trim().to_string(),
        };
        store.insert_profile(&profile).await?;
        if let Err(e) = store.insert_income(profile.id, &income).await {
            warn!(user_id = %profile.id, error = %e, "Income insert failed, removing new profile");
            if let Err(cleanup) = store.delete_profile(profile.id).await {
                warn!(user_id = %profile.id, error = %cleanup, "Failed to remove orphaned profile");
            }
            return Err(e.into());
        }
        info!(user_id = %profile.id, "Signed up new user");

        Self::sign_in(store, profile.id).await
    }

    pub async fn sign_in(store: BudgetStore, user_id: Uuid) -> Result<Self, BudgetError> {
        let snapshot = load_snapshot(&store, user_id).await?;
        info!(%user_id, "Session opened");
        Ok(Self {
            store,
            user_id,
            snapshot,
        })
    }

    /// Ends the session, dropping the cached snapshot.
    pub fn sign_out(self) {
        info!(user_id = %self.user_id, "Session closed");
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Re-fetches everything, replacing the snapshot only if every fetch succeeds.
    pub async fn refresh(&mut self) -> Result<(), BudgetError> {
        self.snapshot = load_snapshot(&self.store, self.user_id).await?;
        debug!(user_id = %self.user_id, "Snapshot refreshed");
        Ok(())
    }

    /// Records a new expenditure in the monthly and yearly collections of its category.
    pub async fn submit_expenditure(
        &mut self,
        draft: ExpenditureDraft,
    ) -> Result<ExpenditureItem, BudgetError> {
        validation::validate_expenditure(&draft)?;

        let item = ExpenditureItem {
            id: Uuid::new_v4(),
            title: draft.title.trim().to_string(),
            cost: draft.cost,
            description: draft
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            created_at: Utc::now(),
            category: draft.category,
            period: Period::Monthly,
        };
        let mut written = Vec::new();
        for period in Period::ALL {
            let collection = Collection::new(item.category, period);
            if let Err(e) = self
                .store
                .insert_expenditure(self.user_id, collection, &item)
                .await
            {
                warn!(id = %item.id, %period, error = %e, "Expenditure insert failed, rolling back");
                for collection in written {
                    if let Err(cleanup) = self.store.delete_expenditure(collection, item.id).await {
                        warn!(id = %item.id, error = %cleanup, "Failed to roll back expenditure");
                    }
                }
                return Err(e.into());
            }
            written.push(collection);
        }
        info!(id = %item.id, category = %item.category, cost = item.cost, "Expenditure recorded");

        self.refresh().await?;
        Ok(item)
    }

    /// Removes an expenditure from every collection it appears in.
    pub async fn delete_expenditure(&mut self, id: Uuid) -> Result<(), BudgetError> {
        let mut removed = false;
        for collection in Collection::ALL {
            removed |= self.store.delete_expenditure(collection, id).await?;
        }
        if !removed {
            return Err(BudgetError::UnknownExpenditure(id));
        }
        info!(%id, "Expenditure deleted");

        self.refresh().await
    }

    pub async fn update_income(&mut self, income: IncomeRecord) -> Result<(), BudgetError> {
        validation::validate_income(&income)?;
        self.store.save_income(self.user_id, &income).await?;
        info!(user_id = %self.user_id, "Income updated");
        self.refresh().await
    }

    pub async fn update_profile(
        &mut self,
        first_name: &str,
        last_name: &str,
        username: &str,
    ) -> Result<(), BudgetError> {
        let draft = ProfileDraft {
            username: username.trim().to_string(),
            first_name: first_name.trim().to_string(),
            last_name: last_name.trim().to_string(),
            email: self.snapshot.profile.email.clone(),
        };
        validation::validate_profile(&draft)?;

        let profile = Profile {
            id: self.user_id,
            username: draft.username,
            first_name: draft.first_name,
            last_name: draft.last_name,
            email: draft.email,
        };
        self.store.update_profile(&profile).await?;
        info!(user_id = %self.user_id, "Profile updated");
        self.refresh().await
    }

    /// Warnings for spending `amount` on `category` in the month containing `as_of`.
    pub fn check_purchase(
        &self,
        category: Category,
        amount: f64,
        as_of: NaiveDate,
        threshold: f64,
    ) -> PurchaseCheck {
        budget::assess_purchase(&self.snapshot, category, amount, as_of, threshold)
    }
}

async fn load_snapshot(store: &BudgetStore, user_id: Uuid) -> Result<Snapshot, BudgetError> {
    let (profile, income, lists) = futures::try_join!(
        store.fetch_profile(user_id),
        store.fetch_income(user_id),
        try_join_all(Collection::ALL.map(|collection| async move {
            store
                .fetch_expenditures(user_id, collection)
                .await
                .map(|items| (collection, items))
        })),
    )?;

    let profile = profile.ok_or(BudgetError::UnknownUser(user_id))?;
    // Users who never finished setup have no income row yet.
    let income = income.unwrap_or_default();
    let expenditures: HashMap<Collection, Vec<ExpenditureItem>> = lists.into_iter().collect();

    Ok(Snapshot {
        profile,
        income,
        expenditures,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::StoreError;
    use crate::core::store::{RowStore, Table};
    use crate::core::validation::ValidationError;
    use crate::store::memory::MemoryRowStore;
    use async_trait::async_trait;
    use serde_json::Value;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn income() -> IncomeRecord {
        IncomeRecord {
            income: 2000.0,
            goal: 300.0,
            needs: 50.0,
            wants: 30.0,
            savings: 20.0,
        }
    }

    fn profile_draft() -> ProfileDraft {
        ProfileDraft {
            username: "sam".to_string(),
            first_name: "Sam".to_string(),
            last_name: "Jacob".to_string(),
            email: "sam@example.com".to_string(),
        }
    }

    fn draft(category: Category, title: &str, cost: f64) -> ExpenditureDraft {
        ExpenditureDraft {
            category,
            title: title.to_string(),
            cost,
            description: Some("  ".to_string()),
        }
    }

    async fn new_session() -> Session {
        let store = BudgetStore::new(Arc::new(MemoryRowStore::new()));
        Session::sign_up(store, profile_draft(), income())
            .await
            .unwrap()
    }

    fn today() -> NaiveDate {
        Utc::now().date_naive()
    }

    /// Delegates to memory but fails every select once `failing` is set,
    /// and every insert into `rejected_table`.
    struct FlakyRowStore {
        inner: MemoryRowStore,
        failing: AtomicBool,
        rejected_table: Option<Table>,
    }

    impl FlakyRowStore {
        fn new(inner: MemoryRowStore, rejected_table: Option<Table>) -> Self {
            Self {
                inner,
                failing: AtomicBool::new(false),
                rejected_table,
            }
        }
    }

    #[async_trait]
    impl RowStore for FlakyRowStore {
        async fn select(&self, table: Table, owner: Uuid) -> Result<Vec<Value>, StoreError> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(StoreError::Backend("connection reset".to_string()));
            }
            self.inner.select(table, owner).await
        }

        async fn insert(&self, table: Table, row: Value) -> Result<(), StoreError> {
            if self.rejected_table == Some(table) {
                return Err(StoreError::Backend("insert refused".to_string()));
            }
            self.inner.insert(table, row).await
        }

        async fn update(&self, table: Table, owner: Uuid, row: Value) -> Result<(), StoreError> {
            self.inner.update(table, owner, row).await
        }

        async fn delete(&self, table: Table, key: Uuid) -> Result<bool, StoreError> {
            self.inner.delete(table, key).await
        }
    }

    #[tokio::test]
    async fn test_sign_up_loads_snapshot() {
        let session = new_session().await;
        let snapshot = session.snapshot();
        assert_eq!(snapshot.profile.first_name, "Sam");
        assert_eq!(snapshot.profile.id, session.user_id());
        assert_eq!(snapshot.income, income());
        assert!(Collection::ALL.iter().all(|c| snapshot.items(*c).is_empty()));
    }

    #[tokio::test]
    async fn test_sign_up_rejects_bad_allocation_before_store_call() {
        let store = BudgetStore::new(Arc::new(MemoryRowStore::new()));
        let bad = IncomeRecord {
            savings: 19.0,
            ..income()
        };
        let result = Session::sign_up(store, profile_draft(), bad).await;
        assert!(matches!(
            result,
            Err(BudgetError::Validation(ValidationError::AllocationSum { .. }))
        ));
    }

    #[tokio::test]
    async fn test_sign_in_unknown_user() {
        let store = BudgetStore::new(Arc::new(MemoryRowStore::new()));
        let user = Uuid::new_v4();
        let result = Session::sign_in(store, user).await;
        assert!(matches!(result, Err(BudgetError::UnknownUser(id)) if id == user));
    }

    #[tokio::test]
    async fn test_sign_in_without_income_uses_zero_budget() {
        let store = BudgetStore::new(Arc::new(MemoryRowStore::new()));
        let profile = Profile {
            id: Uuid::new_v4(),
            username: "kim".to_string(),
            first_name: "Kim".to_string(),
            last_name: String::new(),
            email: "kim@example.com".to_string(),
        };
        store.insert_profile(&profile).await.unwrap();

        let session = Session::sign_in(store, profile.id).await.unwrap();
        assert_eq!(session.snapshot().income, IncomeRecord::default());
    }

    #[tokio::test]
    async fn test_submit_expenditure_refreshes_both_periods() {
        let mut session = new_session().await;
        let item = session
            .submit_expenditure(draft(Category::Needs, " Rent ", 900.0))
            .await
            .unwrap();
        assert_eq!(item.title, "Rent");
        assert_eq!(item.description, None);

        let snapshot = session.snapshot();
        for period in Period::ALL {
            let items = snapshot.items(Collection::new(Category::Needs, period));
            assert_eq!(items.len(), 1);
            assert_eq!(items[0].id, item.id);
            assert_eq!(items[0].period, period);
        }
        assert!(
            snapshot
                .items(Collection::new(Category::Wants, Period::Monthly))
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_submit_expenditure_rejects_empty_title() {
        let mut session = new_session().await;
        let result = session
            .submit_expenditure(draft(Category::Wants, "", 10.0))
            .await;
        assert!(matches!(
            result,
            Err(BudgetError::Validation(ValidationError::MissingField("Title")))
        ));
    }

    #[tokio::test]
    async fn test_delete_expenditure_removes_from_every_list() {
        let mut session = new_session().await;
        let rent = session
            .submit_expenditure(draft(Category::Needs, "Rent", 900.0))
            .await
            .unwrap();
        let coffee = session
            .submit_expenditure(draft(Category::Wants, "Coffee", 4.0))
            .await
            .unwrap();

        session.delete_expenditure(rent.id).await.unwrap();

        let snapshot = session.snapshot();
        assert!(snapshot.find(rent.id).is_none());
        assert!(
            Collection::ALL
                .iter()
                .all(|c| snapshot.items(*c).iter().all(|i| i.id != rent.id))
        );
        assert!(snapshot.find(coffee.id).is_some());

        let again = session.delete_expenditure(rent.id).await;
        assert!(matches!(again, Err(BudgetError::UnknownExpenditure(_))));
    }

    #[tokio::test]
    async fn test_update_income_and_profile() {
        let mut session = new_session().await;
        let edited = IncomeRecord {
            income: 3000.0,
            needs: 60.0,
            wants: 20.0,
            ..income()
        };
        session.update_income(edited).await.unwrap();
        assert_eq!(session.snapshot().income, edited);

        let bad = IncomeRecord {
            needs: 70.0,
            ..edited
        };
        assert!(session.update_income(bad).await.is_err());
        assert_eq!(session.snapshot().income, edited);

        session
            .update_profile("Samantha", "Jacob", "sjacob")
            .await
            .unwrap();
        let profile = &session.snapshot().profile;
        assert_eq!(profile.first_name, "Samantha");
        assert_eq!(profile.username, "sjacob");
        assert_eq!(profile.email, "sam@example.com");
    }

    #[tokio::test]
    async fn test_update_income_creates_missing_row() {
        let store = BudgetStore::new(Arc::new(MemoryRowStore::new()));
        let profile = Profile {
            id: Uuid::new_v4(),
            username: "kim".to_string(),
            first_name: "Kim".to_string(),
            last_name: String::new(),
            email: "kim@example.com".to_string(),
        };
        store.insert_profile(&profile).await.unwrap();

        let mut session = Session::sign_in(store.clone(), profile.id).await.unwrap();
        assert_eq!(session.snapshot().income, IncomeRecord::default());

        session.update_income(income()).await.unwrap();
        assert_eq!(session.snapshot().income, income());
        assert_eq!(store.fetch_income(profile.id).await.unwrap(), Some(income()));
    }

    #[tokio::test]
    async fn test_failed_yearly_insert_rolls_back_monthly_row() {
        let memory = MemoryRowStore::new();
        let yearly_wants = Table::Expenditures(Collection::new(Category::Wants, Period::Yearly));
        let rows = Arc::new(FlakyRowStore::new(memory.clone(), Some(yearly_wants)));
        let mut session = Session::sign_up(BudgetStore::new(rows), profile_draft(), income())
            .await
            .unwrap();

        let result = session
            .submit_expenditure(draft(Category::Wants, "Cinema", 12.0))
            .await;
        assert!(matches!(result, Err(BudgetError::Store(_))));

        let monthly_wants = Table::Expenditures(Collection::new(Category::Wants, Period::Monthly));
        assert!(
            memory
                .select(monthly_wants, session.user_id())
                .await
                .unwrap()
                .is_empty()
        );
        assert!(
            session
                .snapshot()
                .items(Collection::new(Category::Wants, Period::Monthly))
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_failed_income_insert_removes_new_profile() {
        let memory = MemoryRowStore::new();
        let rows = Arc::new(FlakyRowStore::new(memory.clone(), Some(Table::Income)));

        let result = Session::sign_up(BudgetStore::new(rows), profile_draft(), income()).await;
        assert!(matches!(result, Err(BudgetError::Store(_))));

        assert_eq!(memory.row_count(Table::Profiles).await, 0);
    }

    #[tokio::test]
    async fn test_check_purchase_uses_snapshot() {
        let mut session = new_session().await;
        session
            .submit_expenditure(draft(Category::Needs, "Rent", 900.0))
            .await
            .unwrap();

        let check = session.check_purchase(Category::Needs, 50.0, today(), 95.0);
        assert_eq!(check.projected_usage, Some(95.0));
        assert!(check.overspend);

        let check = session.check_purchase(Category::Needs, 10.0, today(), 95.0);
        assert!(!check.overspend);
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_snapshot() {
        let rows = Arc::new(FlakyRowStore::new(MemoryRowStore::new(), None));
        let store = BudgetStore::new(rows.clone());
        let mut session = Session::sign_up(store, profile_draft(), income())
            .await
            .unwrap();
        session
            .submit_expenditure(draft(Category::Wants, "Cinema", 12.0))
            .await
            .unwrap();

        rows.failing.store(true, Ordering::SeqCst);
        let result = session.refresh().await;
        assert!(matches!(result, Err(BudgetError::Store(_))));
        assert_eq!(
            session
                .snapshot()
                .items(Collection::new(Category::Wants, Period::Monthly))
                .len(),
            1
        );

        session.sign_out();
    }
}
