//! Domain types shared by the derivation engine, the store boundary and the session.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;
use uuid::Uuid;

/// A budget bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Needs,
    Wants,
    Savings,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Needs, Category::Wants, Category::Savings];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Needs => "needs",
            Category::Wants => "wants",
            Category::Savings => "savings",
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Category::Needs => "Needs",
                Category::Wants => "Wants",
                Category::Savings => "Savings",
            }
        )
    }
}

impl FromStr for Category {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "needs" | "need" => Ok(Category::Needs),
            "wants" | "want" => Ok(Category::Wants),
            "savings" | "saving" => Ok(Category::Savings),
            _ => Err(anyhow::anyhow!("Invalid category: {}", s)),
        }
    }
}

/// Aggregation window for expenditures and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Monthly,
    Yearly,
}

impl Period {
    pub const ALL: [Period; 2] = [Period::Monthly, Period::Yearly];

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Monthly => "monthly",
            Period::Yearly => "yearly",
        }
    }

    /// Whether `timestamp` falls inside the window that contains `as_of`.
    pub fn contains(&self, timestamp: DateTime<Utc>, as_of: NaiveDate) -> bool {
        let date = timestamp.date_naive();
        match self {
            Period::Monthly => date.year() == as_of.year() && date.month() == as_of.month(),
            Period::Yearly => date.year() == as_of.year(),
        }
    }
}

impl Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Period::Monthly => "Monthly",
                Period::Yearly => "Yearly",
            }
        )
    }
}

impl FromStr for Period {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "monthly" | "month" | "m" => Ok(Period::Monthly),
            "yearly" | "year" | "y" => Ok(Period::Yearly),
            _ => Err(anyhow::anyhow!("Invalid period: {}", s)),
        }
    }
}

/// One expenditure collection: a category within a period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct Collection {
    pub category: Category,
    pub period: Period,
}

impl Collection {
    pub const ALL: [Collection; 6] = [
        Collection::new(Category::Needs, Period::Monthly),
        Collection::new(Category::Wants, Period::Monthly),
        Collection::new(Category::Savings, Period::Monthly),
        Collection::new(Category::Needs, Period::Yearly),
        Collection::new(Category::Wants, Period::Yearly),
        Collection::new(Category::Savings, Period::Yearly),
    ];

    pub const fn new(category: Category, period: Period) -> Self {
        Self { category, period }
    }

    /// Remote table holding this collection, e.g. `monthly_needs`.
    pub fn table_name(&self) -> String {
        format!("{}_{}", self.period.as_str(), self.category.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl Profile {
    pub fn display_name(&self) -> String {
        if self.last_name.is_empty() {
            self.first_name.clone()
        } else {
            format!("{} {}", self.first_name, self.last_name)
        }
    }
}

/// Monthly income, savings goal and the needs/wants/savings split in percent.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct IncomeRecord {
    pub income: f64,
    pub goal: f64,
    pub needs: f64,
    pub wants: f64,
    pub savings: f64,
}

impl IncomeRecord {
    pub fn percent(&self, category: Category) -> f64 {
        match category {
            Category::Needs => self.needs,
            Category::Wants => self.wants,
            Category::Savings => self.savings,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenditureItem {
    pub id: Uuid,
    pub title: String,
    pub cost: f64,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub category: Category,
    pub period: Period,
}

/// User input for a new expenditure, before validation.
#[derive(Debug, Clone)]
pub struct ExpenditureDraft {
    pub category: Category,
    pub title: String,
    pub cost: f64,
    pub description: Option<String>,
}

/// User input for sign-up, before validation.
#[derive(Debug, Clone)]
pub struct ProfileDraft {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// Everything loaded for one user, replaced wholesale on each refresh.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub profile: Profile,
    pub income: IncomeRecord,
    pub expenditures: HashMap<Collection, Vec<ExpenditureItem>>,
}

impl Snapshot {
    pub fn new(profile: Profile, income: IncomeRecord) -> Self {
        Self {
            profile,
            income,
            expenditures: HashMap::new(),
        }
    }

    pub fn items(&self, collection: Collection) -> &[ExpenditureItem] {
        self.expenditures
            .get(&collection)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Items of `category` in the `period` window containing `as_of`.
    pub fn items_in_period(
        &self,
        category: Category,
        period: Period,
        as_of: NaiveDate,
    ) -> impl Iterator<Item = &ExpenditureItem> {
        self.items(Collection::new(category, period))
            .iter()
            .filter(move |item| period.contains(item.created_at, as_of))
    }

    pub fn find(&self, id: Uuid) -> Option<&ExpenditureItem> {
        self.expenditures.values().flatten().find(|item| item.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_collection_table_names() {
        let names: Vec<String> = Collection::ALL.iter().map(Collection::table_name).collect();
        assert_eq!(
            names,
            vec![
                "monthly_needs",
                "monthly_wants",
                "monthly_savings",
                "yearly_needs",
                "yearly_wants",
                "yearly_savings"
            ]
        );
    }

    #[test]
    fn test_category_from_str() {
        assert_eq!("Needs".parse::<Category>().unwrap(), Category::Needs);
        assert_eq!("want".parse::<Category>().unwrap(), Category::Wants);
        assert!("rent".parse::<Category>().is_err());
    }

    #[test]
    fn test_period_contains() {
        let as_of = NaiveDate::from_ymd_opt(2025, 10, 15).unwrap();
        let october = Utc.with_ymd_and_hms(2025, 10, 28, 12, 0, 0).unwrap();
        let september = Utc.with_ymd_and_hms(2025, 9, 18, 12, 0, 0).unwrap();
        let last_year = Utc.with_ymd_and_hms(2024, 10, 1, 12, 0, 0).unwrap();

        assert!(Period::Monthly.contains(october, as_of));
        assert!(!Period::Monthly.contains(september, as_of));
        assert!(Period::Yearly.contains(september, as_of));
        assert!(!Period::Yearly.contains(last_year, as_of));
    }
}
