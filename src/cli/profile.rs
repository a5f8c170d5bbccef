use super::ui;
use crate::core::budget;
use crate::core::model::{Category, Snapshot};
use anyhow::Result;
use comfy_table::Cell;

/// Shows who is signed in and their income setup.
pub fn show(snapshot: &Snapshot, currency: &str) -> Result<()> {
    let profile = &snapshot.profile;
    let income = &snapshot.income;

    println!(
        "\n{}\n",
        ui::style_text(&profile.display_name(), ui::StyleType::Title)
    );
    println!("Username: {}", profile.username);
    println!("Email:    {}", profile.email);
    println!(
        "User id:  {}",
        ui::style_text(&profile.id.to_string(), ui::StyleType::Subtle)
    );

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Category"),
        ui::header_cell("Allocated"),
        ui::header_cell("Monthly budget"),
    ]);
    for category in Category::ALL {
        let percent = income.percent(category);
        table.add_row(vec![
            Cell::new(category.to_string()),
            Cell::new(format!("{percent:.0}%")),
            ui::money_cell(budget::category_budget(income.income, percent), currency),
        ]);
    }

    println!(
        "\n{} {}",
        ui::style_text("Monthly income:", ui::StyleType::TotalLabel),
        ui::format_money(income.income, currency)
    );
    println!(
        "{} {}\n",
        ui::style_text("Savings goal:", ui::StyleType::TotalLabel),
        ui::format_money(income.goal, currency)
    );
    println!("{table}");

    let allocated = income.needs + income.wants + income.savings;
    if (allocated - 100.0).abs() > 1e-6 {
        println!(
            "{}",
            ui::style_text(
                &format!("Allocation adds up to {allocated:.0}%, edit your income to fix it."),
                ui::StyleType::Warning
            )
        );
    }
    Ok(())
}
