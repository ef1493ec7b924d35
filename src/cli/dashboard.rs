use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::error::{PennyError, Result};
use crate::fmt::{money, relative_date};
use crate::metrics;

pub async fn run() -> Result<()> {
    let store = super::open_store();
    let (api, _session) = super::protected_client(&store)?;

    // Transactions and budget load in parallel; a failed budget fetch
    // degrades to "no limits" instead of taking the whole dashboard down.
    let (transactions, budget) = tokio::join!(api.transactions(), api.current_budget());
    let transactions = transactions?;
    let budget = match budget {
        Ok(b) => b,
        Err(PennyError::AuthenticationFailure) => return Err(PennyError::AuthenticationFailure),
        Err(e) => {
            eprintln!(
                "{}",
                format!("Warning: budget unavailable ({e}); showing dashboard without limits")
                    .yellow()
            );
            None
        }
    };

    let today = chrono::Local::now().date_naive();
    let summary = metrics::summarize(&transactions, today, budget.as_ref());

    let mut cards = Table::new();
    cards.set_header(vec!["", "Amount"]);
    cards.add_row(vec![
        Cell::new("Today's Expense"),
        Cell::new(money(summary.today_expense)),
    ]);
    cards.add_row(vec![
        Cell::new("Monthly Expense"),
        Cell::new(money(summary.monthly_expense)),
    ]);
    cards.add_row(vec![
        Cell::new("Monthly Budget"),
        Cell::new(money(summary.monthly_budget)),
    ]);
    let remaining = if summary.remaining_budget >= 0.0 {
        money(summary.remaining_budget).green().to_string()
    } else {
        money(summary.remaining_budget).red().to_string()
    };
    cards.add_row(vec![Cell::new("Remaining Budget"), Cell::new(remaining)]);
    println!("Dashboard\n{cards}");

    let mut week = Table::new();
    week.set_header(vec!["Date", "Day", "Spent"]);
    for day in &summary.expense_by_day {
        week.add_row(vec![
            Cell::new(day.date.to_string()),
            Cell::new(day.date.format("%a").to_string()),
            Cell::new(money(day.amount)),
        ]);
    }
    println!("\nLast 7 Days\n{week}");

    if !summary.expense_by_category.is_empty() {
        let mut cats = Table::new();
        cats.set_header(vec!["Category", "Amount", "%"]);
        for c in &summary.expense_by_category {
            cats.add_row(vec![
                Cell::new(&c.name),
                Cell::new(money(c.amount)),
                Cell::new(format!("{:.1}%", c.pct)),
            ]);
        }
        println!("\nTop Categories\n{cats}");
    }

    if !summary.recent_transactions.is_empty() {
        let mut recent = Table::new();
        recent.set_header(vec!["When", "Type", "Category", "Amount", "Description"]);
        for t in &summary.recent_transactions {
            let amount = match t.kind {
                crate::models::TransactionType::Expense => money(t.amount).red().to_string(),
                crate::models::TransactionType::Income => money(t.amount).green().to_string(),
            };
            recent.add_row(vec![
                Cell::new(relative_date(t.date, today)),
                Cell::new(t.kind.as_str()),
                Cell::new(t.category.as_deref().unwrap_or("Other")),
                Cell::new(amount),
                Cell::new(t.description.as_deref().unwrap_or("")),
            ]);
        }
        println!("\nRecent Transactions\n{recent}");
    }

    if let Some(b) = &budget {
        super::print_alerts(&metrics::status_alerts(
            b,
            summary.today_expense,
            summary.monthly_expense,
        ));
    }
    Ok(())
}
