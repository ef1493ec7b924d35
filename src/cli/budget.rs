use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::error::{PennyError, Result};
use crate::fmt::money;
use crate::metrics::{monthly_expense, status_alerts, today_expense};
use crate::models::Budget;

pub async fn show() -> Result<()> {
    let store = super::open_store();
    let (api, _) = super::protected_client(&store)?;

    let (budget, transactions) = tokio::join!(api.current_budget(), api.transactions());
    let budget = match budget? {
        Some(b) => b,
        None => {
            println!("No budget set. Create one with: penny budget set --daily <n> --monthly <n>");
            return Ok(());
        }
    };
    // Spending figures are nice to have here but not essential; show the
    // limits on their own if the transaction fetch fails.
    let transactions = match transactions {
        Ok(t) => t,
        Err(PennyError::AuthenticationFailure) => return Err(PennyError::AuthenticationFailure),
        Err(e) => {
            eprintln!("{}", format!("Could not load transactions: {e}").yellow());
            Vec::new()
        }
    };

    let today = chrono::Local::now().date_naive();
    let daily_spent = today_expense(&transactions, today);
    let monthly_spent = monthly_expense(&transactions, today);

    let mut table = Table::new();
    table.set_header(vec!["Period", "Limit", "Spent", "Used", "Remaining"]);
    for (period, limit, spent) in [
        ("Daily", budget.daily_limit, daily_spent),
        ("Monthly", budget.monthly_limit, monthly_spent),
    ] {
        let (used, remaining) = if limit > 0.0 {
            (
                format!("{:.1}%", spent / limit * 100.0),
                money(limit - spent),
            )
        } else {
            ("-".to_string(), "-".to_string())
        };
        let remaining = if limit > 0.0 && spent > limit {
            remaining.red().to_string()
        } else {
            remaining
        };
        table.add_row(vec![
            Cell::new(period),
            Cell::new(money(limit)),
            Cell::new(money(spent)),
            Cell::new(used),
            Cell::new(remaining),
        ]);
    }
    println!("{table}");

    super::print_alerts(&status_alerts(&budget, daily_spent, monthly_spent));
    Ok(())
}

pub async fn set(daily: f64, monthly: f64) -> Result<()> {
    if daily < 0.0 || monthly < 0.0 {
        return Err(PennyError::Other("Limits must not be negative".to_string()));
    }

    let store = super::open_store();
    let (api, _) = super::protected_client(&store)?;

    let existing = api.current_budget().await?;
    let budget = Budget {
        id: existing.as_ref().and_then(|b| b.id),
        daily_limit: daily,
        monthly_limit: monthly,
    };
    let saved = match budget.id {
        Some(id) => api.update_budget(id, &budget).await?,
        None => api.create_budget(&budget).await?,
    };
    println!(
        "Budget saved: {} daily, {} monthly",
        money(saved.daily_limit),
        money(saved.monthly_limit)
    );
    Ok(())
}
