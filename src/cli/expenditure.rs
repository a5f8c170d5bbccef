use super::ui;
use crate::core::budget::{self, PurchaseCheck};
use crate::core::model::{Category, ExpenditureDraft, Period, Snapshot};
use crate::session::Session;
use anyhow::{Result, bail};
use chrono::{NaiveDate, Utc};
use comfy_table::Cell;
use tracing::warn;
use uuid::Uuid;

fn warning_lines(check: &PurchaseCheck, category: Category, threshold: f64) -> Vec<String> {
    let mut lines = Vec::new();
    if check.overspend {
        let usage = check.projected_usage.unwrap_or_default();
        lines.push(format!(
            "This purchase brings {category} to {usage:.0}% of its budget (warning at {threshold:.0}%)."
        ));
    }
    if check.breaks_goal {
        lines.push("This purchase puts your monthly savings goal out of reach.".to_string());
    }
    lines
}

/// Records an expenditure. Purchases that trigger a warning are only recorded with `confirmed`.
pub async fn add(
    session: &mut Session,
    draft: ExpenditureDraft,
    confirmed: bool,
    currency: &str,
    threshold: f64,
) -> Result<()> {
    let today = Utc::now().date_naive();
    let check = session.check_purchase(draft.category, draft.cost, today, threshold);
    let warnings = warning_lines(&check, draft.category, threshold);
    for line in &warnings {
        println!("{}", ui::style_text(line, ui::StyleType::Warning));
    }
    if !warnings.is_empty() && !confirmed {
        warn!(category = %draft.category, cost = draft.cost, "Purchase not confirmed");
        bail!("Expenditure not recorded; re-run with --yes to confirm");
    }

    let item = session.submit_expenditure(draft).await?;
    println!(
        "Added {} ({}) to {}: {}",
        ui::style_text(&item.title, ui::StyleType::TotalLabel),
        ui::format_money(item.cost, currency),
        item.category,
        ui::style_text(&item.id.to_string(), ui::StyleType::Subtle)
    );
    Ok(())
}

/// Lists the items of `category` for `period`, each with its share of the category budget.
pub fn list(
    snapshot: &Snapshot,
    category: Category,
    period: Period,
    as_of: NaiveDate,
    currency: &str,
) -> Result<()> {
    let income = budget::period_income(&snapshot.income, period);
    let category_budget = budget::category_budget(income, snapshot.income.percent(category));
    let mut items: Vec<_> = snapshot.items_in_period(category, period, as_of).collect();
    items.sort_by_key(|item| item.created_at);

    println!(
        "\n{} {}\n",
        ui::style_text(&period.to_string(), ui::StyleType::Title),
        ui::style_text(&category.to_string(), ui::StyleType::Title)
    );
    if items.is_empty() {
        println!("{}", ui::style_text("No expenditures yet.", ui::StyleType::Subtle));
        return Ok(());
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Date"),
        ui::header_cell("Title"),
        ui::header_cell("Amount"),
        ui::header_cell("Of budget"),
        ui::header_cell("Description"),
        ui::header_cell("Id"),
    ]);
    for item in &items {
        table.add_row(vec![
            Cell::new(item.created_at.format("%m/%d").to_string()),
            Cell::new(&item.title),
            ui::money_cell(item.cost, currency),
            Cell::new(format!(
                "{:.0}%",
                budget::usage_ratio(item.cost, category_budget)
            )),
            Cell::new(item.description.as_deref().unwrap_or("")),
            Cell::new(ui::style_text(&item.id.to_string(), ui::StyleType::Subtle)),
        ]);
    }
    println!("{table}");

    let total: f64 = items.iter().map(|item| item.cost).sum();
    println!(
        "\n{} {}",
        ui::style_text("Total:", ui::StyleType::TotalLabel),
        ui::format_money(total, currency)
    );
    Ok(())
}

pub async fn delete(session: &mut Session, id: Uuid) -> Result<()> {
    let title = session
        .snapshot()
        .find(id)
        .map(|item| item.title.clone())
        .unwrap_or_else(|| id.to_string());
    session.delete_expenditure(id).await?;
    println!("Deleted {title}");

    let today = Utc::now().date_naive();
    let remaining: usize = Category::ALL
        .iter()
        .map(|&c| session.snapshot().items_in_period(c, Period::Monthly, today).count())
        .sum();
    println!(
        "{}",
        ui::style_text(
            &format!("{remaining} expenditures left this month"),
            ui::StyleType::Subtle
        )
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warning_lines() {
        let check = PurchaseCheck {
            projected_usage: Some(97.4),
            overspend: true,
            breaks_goal: true,
        };
        let lines = warning_lines(&check, Category::Wants, 95.0);
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "This purchase brings Wants to 97% of its budget (warning at 95%)."
        );

        let quiet = PurchaseCheck {
            projected_usage: Some(10.0),
            overspend: false,
            breaks_goal: false,
        };
        assert!(warning_lines(&quiet, Category::Needs, 95.0).is_empty());
    }
}
