use super::ui;
use crate::core::budget::{self, CategorySummary};
use crate::core::model::{Period, Snapshot};
use anyhow::Result;
use chrono::NaiveDate;
use comfy_table::Cell;

/// Prints the needs/wants/savings breakdown for the period containing `as_of`.
pub fn run(
    snapshot: &Snapshot,
    period: Period,
    as_of: NaiveDate,
    currency: &str,
    threshold: f64,
) -> Result<()> {
    let summary = budget::summarize(snapshot, period, as_of);
    let income = budget::period_income(&snapshot.income, period);
    let totals = budget::period_totals(snapshot, period, as_of);

    println!(
        "\n{} budget for {}\n",
        ui::style_text(&period.to_string(), ui::StyleType::Title),
        snapshot.profile.display_name()
    );
    println!("{}", budget_table(&summary, currency, threshold));

    println!(
        "\n{} {}",
        ui::style_text("Budgeted:", ui::StyleType::TotalLabel),
        ui::format_money(income, currency)
    );
    println!(
        "{} {}",
        ui::style_text("Spent:", ui::StyleType::TotalLabel),
        ui::format_money(totals.sum(), currency)
    );
    println!(
        "{} {}",
        ui::style_text("Left over:", ui::StyleType::TotalLabel),
        ui::style_text(
            &ui::format_money(totals.leftover(income), currency),
            ui::StyleType::TotalValue
        )
    );
    if period == Period::Monthly && snapshot.income.goal > 0.0 {
        let goal = snapshot.income.goal;
        let status = if totals.leftover(income) >= goal {
            ui::style_text("on track", ui::StyleType::TotalValue)
        } else {
            ui::style_text("behind", ui::StyleType::Warning)
        };
        println!(
            "{} {} ({status})",
            ui::style_text("Monthly goal:", ui::StyleType::TotalLabel),
            ui::format_money(goal, currency)
        );
    }

    ui::print_separator();
    Ok(())
}

fn budget_table(summary: &[CategorySummary], currency: &str, threshold: f64) -> comfy_table::Table {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Category"),
        ui::header_cell("Allocated"),
        ui::header_cell("Budget"),
        ui::header_cell("Spent"),
        ui::header_cell("Remaining"),
        ui::header_cell("Used"),
        ui::header_cell("Progress"),
    ]);

    for row in summary {
        table.add_row(vec![
            Cell::new(row.category.to_string()),
            Cell::new(format!("{:.0}%", row.percent)),
            ui::money_cell(row.budget, currency),
            ui::money_cell(row.spent, currency),
            ui::money_cell(row.remaining(), currency),
            ui::usage_cell(row.usage, threshold),
            Cell::new(ui::progress_bar(row.usage)),
        ]);
    }
    table
}
