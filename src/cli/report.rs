use super::ui;
use crate::core::model::{Category, Snapshot};
use crate::core::report::{self, MonthlyReport, YearlySummary};
use anyhow::Result;
use chrono::NaiveDate;
use comfy_table::{Cell, CellAlignment};

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

pub fn cards(snapshot: &Snapshot, as_of: NaiveDate, currency: &str) -> Result<()> {
    let cards = report::report_cards(snapshot, as_of);

    println!("\n{}\n", ui::style_text("Reports", ui::StyleType::Title));
    println!(
        "{:<10} {} Used: {:.0}%",
        "Monthly",
        ui::progress_bar(cards.monthly_used),
        cards.monthly_used
    );
    println!(
        "{:<10} {} Used: {:.0}%",
        "Yearly",
        ui::progress_bar(cards.yearly_used),
        cards.yearly_used
    );
    let goal_line = format!(
        "{:<10} {} Met {:.0}%, Saved {} this month!",
        "Goal",
        ui::progress_bar(cards.goal_met),
        cards.goal_met,
        ui::format_money(cards.saved, currency)
    );
    if cards.goal_reached() {
        println!("{}", ui::style_text(&goal_line, ui::StyleType::TotalValue));
    } else {
        println!("{goal_line}");
    }

    ui::print_separator();
    Ok(())
}

pub fn monthly(snapshot: &Snapshot, as_of: NaiveDate, currency: &str) -> Result<()> {
    let report = report::monthly_report(snapshot, as_of);
    print_monthly(&report, currency);
    Ok(())
}

fn print_monthly(report: &MonthlyReport, currency: &str) {
    println!(
        "\n{}\n",
        ui::style_text(
            &format!("Monthly report {}-{:02}", report.year, report.month),
            ui::StyleType::Title
        )
    );

    for category in Category::ALL {
        println!("{}", ui::style_text(&category.to_string(), ui::StyleType::TotalLabel));
        let lines = report.lines(category);
        if lines.is_empty() {
            println!("  {}", ui::style_text("Nothing this month", ui::StyleType::Subtle));
            continue;
        }
        for line in lines {
            println!(
                "  {} – {} ({:.0}%)  {}",
                line.title,
                ui::format_money(line.amount, currency),
                line.percentage,
                line.date.format("%m/%d")
            );
            if let Some(description) = &line.description {
                println!("    {}", ui::style_text(description, ui::StyleType::Subtle));
            }
        }
    }
    ui::print_separator();
}

pub fn yearly(snapshot: &Snapshot, as_of: NaiveDate, currency: &str) -> Result<()> {
    let summary = report::yearly_summary(snapshot, as_of);
    println!("{}", yearly_table(&summary, currency));
    println!(
        "\n{} {}",
        ui::style_text("Saved this year:", ui::StyleType::TotalLabel),
        ui::style_text(
            &ui::format_money(summary.saved_amount, currency),
            ui::StyleType::TotalValue
        )
    );
    ui::print_separator();
    Ok(())
}

fn yearly_table(summary: &YearlySummary, currency: &str) -> comfy_table::Table {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell(&summary.year.to_string()),
        ui::header_cell("Needs"),
        ui::header_cell("Wants"),
        ui::header_cell("Savings"),
        ui::header_cell("Total"),
    ]);

    let halves = [summary.first_half(), summary.second_half()];
    for (half, months) in halves.iter().enumerate() {
        for (offset, totals) in months.iter().enumerate() {
            let mut row = vec![Cell::new(MONTHS[half * 6 + offset])];
            for category in Category::ALL {
                row.push(ui::money_cell(totals.get(category), currency));
            }
            row.push(
                Cell::new(ui::format_money(totals.sum(), currency))
                    .set_alignment(CellAlignment::Right),
            );
            table.add_row(row);
        }
    }
    table
}
