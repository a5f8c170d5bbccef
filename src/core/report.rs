//! Monthly, yearly and goal reports derived from a snapshot.
use crate::core::budget::{self, CategoryTotals};
use crate::core::model::{Category, ExpenditureItem, Period, Snapshot};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use uuid::Uuid;

/// Headline figures for the reports screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReportCards {
    /// Percent of monthly income spent this month.
    pub monthly_used: f64,
    /// Percent of twelve months of income spent this year.
    pub yearly_used: f64,
    /// Percent of the goal covered by what is left this month, within [0, 100].
    pub goal_met: f64,
    /// Income not yet spent this month, never negative.
    pub saved: f64,
}

impl ReportCards {
    pub fn goal_reached(&self) -> bool {
        self.goal_met >= 100.0
    }
}

pub fn report_cards(snapshot: &Snapshot, as_of: NaiveDate) -> ReportCards {
    let income = snapshot.income.income;
    let goal = snapshot.income.goal;
    let monthly_total = budget::period_totals(snapshot, Period::Monthly, as_of).sum();
    let yearly_total = budget::period_totals(snapshot, Period::Yearly, as_of).sum();

    let leftover = income - monthly_total;
    let goal_met = if goal > 0.0 {
        budget::clamp_progress(leftover / goal * 100.0)
    } else {
        0.0
    };

    ReportCards {
        monthly_used: budget::usage_ratio(monthly_total, income),
        yearly_used: budget::usage_ratio(yearly_total, income * 12.0),
        goal_met,
        saved: leftover.max(0.0),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportLine {
    pub id: Uuid,
    pub title: String,
    pub amount: f64,
    /// Share of the category's monthly budget.
    pub percentage: f64,
    pub description: Option<String>,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyReport {
    pub year: i32,
    pub month: u32,
    pub needs: Vec<ReportLine>,
    pub wants: Vec<ReportLine>,
    pub savings: Vec<ReportLine>,
}

impl MonthlyReport {
    pub fn lines(&self, category: Category) -> &[ReportLine] {
        match category {
            Category::Needs => &self.needs,
            Category::Wants => &self.wants,
            Category::Savings => &self.savings,
        }
    }
}

fn report_line(item: &ExpenditureItem, category_budget: f64) -> ReportLine {
    ReportLine {
        id: item.id,
        title: item.title.clone(),
        amount: item.cost,
        percentage: budget::usage_ratio(item.cost, category_budget),
        description: item.description.clone(),
        date: item.created_at,
    }
}

/// Items of the month containing `as_of`, oldest first, per category.
pub fn monthly_report(snapshot: &Snapshot, as_of: NaiveDate) -> MonthlyReport {
    let lines_for = |category: Category| {
        let category_budget =
            budget::category_budget(snapshot.income.income, snapshot.income.percent(category));
        let mut lines: Vec<ReportLine> = snapshot
            .items_in_period(category, Period::Monthly, as_of)
            .map(|item| report_line(item, category_budget))
            .collect();
        lines.sort_by_key(|line| line.date);
        lines
    };

    MonthlyReport {
        year: as_of.year(),
        month: as_of.month(),
        needs: lines_for(Category::Needs),
        wants: lines_for(Category::Wants),
        savings: lines_for(Category::Savings),
    }
}

/// Spending per month of one calendar year.
#[derive(Debug, Clone, PartialEq)]
pub struct YearlySummary {
    pub year: i32,
    pub saved_amount: f64,
    /// Index 0 is January.
    pub months: [CategoryTotals; 12],
}

impl YearlySummary {
    pub fn first_half(&self) -> &[CategoryTotals] {
        &self.months[..6]
    }

    pub fn second_half(&self) -> &[CategoryTotals] {
        &self.months[6..]
    }

    pub fn total(&self) -> CategoryTotals {
        let mut total = CategoryTotals::default();
        for month in &self.months {
            for category in Category::ALL {
                total.add(category, month.get(category));
            }
        }
        total
    }
}

/// Buckets the yearly collections of the year containing `as_of` by month.
pub fn yearly_summary(snapshot: &Snapshot, as_of: NaiveDate) -> YearlySummary {
    let mut months = [CategoryTotals::default(); 12];
    for category in Category::ALL {
        for item in snapshot.items_in_period(category, Period::Yearly, as_of) {
            let index = item.created_at.month0() as usize;
            months[index].add(category, item.cost);
        }
    }

    let mut summary = YearlySummary {
        year: as_of.year(),
        saved_amount: 0.0,
        months,
    };
    summary.saved_amount = summary.total().savings;
    summary
}
