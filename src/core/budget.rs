//! Budget derivation: category budgets, usage ratios and purchase warnings.
//!
//! Every function here is pure and total over finite inputs. Stored
//! allocations are trusted as-is, so percentages that do not sum to 100 are
//! computed with rather than rejected.
use crate::core::model::{Category, ExpenditureItem, IncomeRecord, Period, Snapshot};
use chrono::NaiveDate;
use tracing::debug;

/// Projected usage, in percent of the category budget, at which a purchase is flagged.
pub const OVERSPEND_THRESHOLD: f64 = 95.0;

/// Amount budgeted for a category: `income * percent / 100`.
pub fn category_budget(income: f64, percent: f64) -> f64 {
    if percent == 0.0 {
        return 0.0;
    }
    income * percent / 100.0
}

/// Percent of `budget` consumed by `spent`. A budget of zero or less reads as 0%.
pub fn usage_ratio(spent: f64, budget: f64) -> f64 {
    if budget <= 0.0 {
        return 0.0;
    }
    spent / budget * 100.0
}

/// Clamps a usage percentage into [0, 100] for progress bars.
pub fn clamp_progress(percent: f64) -> f64 {
    if percent.is_nan() {
        return 0.0;
    }
    percent.clamp(0.0, 100.0)
}

/// Spent amounts per category for one period.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CategoryTotals {
    pub needs: f64,
    pub wants: f64,
    pub savings: f64,
}

impl CategoryTotals {
    pub fn from_items<'a>(items: impl IntoIterator<Item = &'a ExpenditureItem>) -> Self {
        let mut totals = Self::default();
        for item in items {
            totals.add(item.category, item.cost);
        }
        totals
    }

    pub fn get(&self, category: Category) -> f64 {
        match category {
            Category::Needs => self.needs,
            Category::Wants => self.wants,
            Category::Savings => self.savings,
        }
    }

    pub fn add(&mut self, category: Category, amount: f64) {
        match category {
            Category::Needs => self.needs += amount,
            Category::Wants => self.wants += amount,
            Category::Savings => self.savings += amount,
        }
    }

    pub fn sum(&self) -> f64 {
        self.needs + self.wants + self.savings
    }

    /// Income minus everything spent so far.
    pub fn leftover(&self, income: f64) -> f64 {
        income - self.sum()
    }
}

/// True when a purchase moves leftover income from at-or-above `goal` to below it.
///
/// Purchases in the savings category never break the goal, and neither does
/// anything once savings alone already cover it. A leftover that is already
/// below the goal is not reported again.
pub fn would_break_goal(
    totals: &CategoryTotals,
    income: f64,
    goal: f64,
    category: Category,
    amount: f64,
) -> bool {
    if category == Category::Savings || goal <= 0.0 {
        return false;
    }
    if totals.savings >= goal {
        return false;
    }
    let leftover_before = totals.leftover(income);
    leftover_before >= goal && leftover_before - amount < goal
}

/// Usage of the category budget after spending `amount` on top of `current_spent`.
///
/// `None` for savings, which carries no overspend warning, and for categories
/// without a positive budget.
pub fn projected_category_usage(
    category: Category,
    current_spent: f64,
    amount: f64,
    income: f64,
    percent: f64,
) -> Option<f64> {
    if category == Category::Savings {
        return None;
    }
    let budget = category_budget(income, percent);
    if budget <= 0.0 {
        return None;
    }
    Some((current_spent + amount) / budget * 100.0)
}

pub fn is_overspend_warning(projected_usage: f64, threshold: f64) -> bool {
    projected_usage >= threshold
}

/// Budget state of one category within a period.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategorySummary {
    pub category: Category,
    pub percent: f64,
    pub budget: f64,
    pub spent: f64,
    pub usage: f64,
}

impl CategorySummary {
    pub fn remaining(&self) -> f64 {
        self.budget - self.spent
    }
}

/// Totals of `snapshot` for the `period` window containing `as_of`.
pub fn period_totals(snapshot: &Snapshot, period: Period, as_of: NaiveDate) -> CategoryTotals {
    let mut totals = CategoryTotals::default();
    for category in Category::ALL {
        for item in snapshot.items_in_period(category, period, as_of) {
            totals.add(category, item.cost);
        }
    }
    totals
}

/// Per-category budget, spend and usage for the monthly budget screen.
///
/// Yearly budgets are twelve months of income.
pub fn summarize(snapshot: &Snapshot, period: Period, as_of: NaiveDate) -> Vec<CategorySummary> {
    let totals = period_totals(snapshot, period, as_of);
    let income = period_income(&snapshot.income, period);
    Category::ALL
        .iter()
        .map(|&category| {
            let percent = snapshot.income.percent(category);
            let budget = category_budget(income, percent);
            let spent = totals.get(category);
            CategorySummary {
                category,
                percent,
                budget,
                spent,
                usage: usage_ratio(spent, budget),
            }
        })
        .collect()
}

/// Income available over one `period`.
pub fn period_income(income: &IncomeRecord, period: Period) -> f64 {
    match period {
        Period::Monthly => income.income,
        Period::Yearly => income.income * 12.0,
    }
}

/// Warnings to show before confirming a purchase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PurchaseCheck {
    pub projected_usage: Option<f64>,
    pub overspend: bool,
    pub breaks_goal: bool,
}

impl PurchaseCheck {
    pub fn has_warnings(&self) -> bool {
        self.overspend || self.breaks_goal
    }
}

/// Evaluates a prospective monthly purchase against the snapshot.
pub fn assess_purchase(
    snapshot: &Snapshot,
    category: Category,
    amount: f64,
    as_of: NaiveDate,
    threshold: f64,
) -> PurchaseCheck {
    let totals = period_totals(snapshot, Period::Monthly, as_of);
    let income = &snapshot.income;
    let projected_usage = projected_category_usage(
        category,
        totals.get(category),
        amount,
        income.income,
        income.percent(category),
    );
    let overspend = projected_usage.is_some_and(|usage| is_overspend_warning(usage, threshold));
    let breaks_goal = would_break_goal(&totals, income.income, income.goal, category, amount);
    debug!(
        %category,
        amount,
        ?projected_usage,
        overspend,
        breaks_goal,
        "Assessed purchase"
    );
    PurchaseCheck {
        projected_usage,
        overspend,
        breaks_goal,
    }
}
