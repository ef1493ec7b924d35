use chrono::{Datelike, NaiveDate};
use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::error::{PennyError, Result};
use crate::filters::{month_bounds, TransactionFilter};
use crate::fmt::money;
use crate::metrics::{self, BudgetAlert};
use crate::models::{Budget, Transaction, TransactionType};

fn parse_date(s: &str) -> Result<NaiveDate> {
    s.parse()
        .map_err(|_| PennyError::Other(format!("Invalid date: {s} (expected YYYY-MM-DD)")))
}

fn parse_kind(s: &str) -> Result<TransactionType> {
    s.parse().map_err(PennyError::Other)
}

#[allow(clippy::too_many_arguments)]
fn build_filter(
    month: &Option<String>,
    from_date: Option<String>,
    to_date: Option<String>,
    kind: Option<String>,
    category: Option<String>,
    search: Option<String>,
    amount_min: Option<f64>,
    amount_max: Option<f64>,
) -> Result<TransactionFilter> {
    let (mut date_from, mut date_to) = (None, None);
    if let Some((y, m)) = super::parse_month_opt(month)? {
        let (first, last) = month_bounds(y, m)
            .ok_or_else(|| PennyError::Other(format!("Invalid month: {y:04}-{m:02}")))?;
        date_from = Some(first);
        date_to = Some(last);
    }
    if let Some(from) = from_date {
        date_from = Some(parse_date(&from)?);
    }
    if let Some(to) = to_date {
        date_to = Some(parse_date(&to)?);
    }
    Ok(TransactionFilter {
        search,
        date_from,
        date_to,
        amount_min,
        amount_max,
        category,
        kind: kind.as_deref().map(parse_kind).transpose()?,
    })
}

#[allow(clippy::too_many_arguments)]
pub async fn list(
    month: Option<String>,
    from_date: Option<String>,
    to_date: Option<String>,
    kind: Option<String>,
    category: Option<String>,
    search: Option<String>,
    amount_min: Option<f64>,
    amount_max: Option<f64>,
) -> Result<()> {
    let store = super::open_store();
    let (api, _) = super::protected_client(&store)?;
    let filter = build_filter(
        &month, from_date, to_date, kind, category, search, amount_min, amount_max,
    )?;

    let mut rows = filter.apply(&api.transactions().await?);
    rows.sort_by(|a, b| b.date.cmp(&a.date));

    if rows.is_empty() {
        println!("No transactions found.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Date", "Type", "Category", "Amount", "Description"]);
    let mut net = 0.0f64;
    for t in &rows {
        let amount = match t.kind {
            TransactionType::Expense => {
                net -= t.amount;
                money(t.amount).red().to_string()
            }
            TransactionType::Income => {
                net += t.amount;
                money(t.amount).green().to_string()
            }
        };
        table.add_row(vec![
            Cell::new(t.id.map(|i| i.to_string()).unwrap_or_default()),
            Cell::new(t.date.to_string()),
            Cell::new(t.kind.as_str()),
            Cell::new(t.category.as_deref().unwrap_or("Other")),
            Cell::new(amount),
            Cell::new(t.description.as_deref().unwrap_or("")),
        ]);
    }
    println!(
        "Transactions ({} shown, net: {})\n{table}",
        rows.len(),
        money(net)
    );
    Ok(())
}

pub async fn add(
    amount: f64,
    kind: String,
    category: String,
    description: Option<String>,
    date: Option<String>,
) -> Result<()> {
    if amount <= 0.0 {
        return Err(PennyError::Other("Amount must be positive".to_string()));
    }
    let kind = parse_kind(&kind)?;
    let today = chrono::Local::now().date_naive();
    let date = match date {
        Some(s) => parse_date(&s)?,
        None => today,
    };

    let store = super::open_store();
    let (api, _) = super::protected_client(&store)?;

    // Snapshot prior spend and the budget for threshold-crossing alerts.
    // An expired token aborts before anything is written; any other fetch
    // failure degrades to "no alerts" rather than alerting from a blank
    // prior, which would re-announce an already-exceeded budget.
    let (prior, budget) = tokio::join!(api.transactions(), api.current_budget());
    let snapshot = match (prior, budget) {
        (Err(PennyError::AuthenticationFailure), _)
        | (_, Err(PennyError::AuthenticationFailure)) => {
            return Err(PennyError::AuthenticationFailure)
        }
        (Ok(prior), Ok(budget)) => budget.map(|b| (prior, b)),
        (Err(e), _) | (_, Err(e)) => {
            eprintln!(
                "{}",
                format!("Warning: could not check budget limits ({e})").yellow()
            );
            None
        }
    };

    let created = api
        .create_transaction(&Transaction {
            id: None,
            amount,
            kind,
            category: Some(category),
            description,
            date,
        })
        .await?;

    println!(
        "Saved {} of {} on {} ({})",
        created.kind.as_str().to_lowercase(),
        money(created.amount),
        created.date,
        created.category.as_deref().unwrap_or("Other"),
    );

    if kind == TransactionType::Expense {
        if let Some((prior, budget)) = snapshot {
            super::print_alerts(&submission_alerts(&prior, &budget, amount, date, today));
        }
    }
    Ok(())
}

/// Crossing alerts for a newly saved expense, computed against the spend
/// snapshot taken before submission. A backdated expense leaves the daily
/// total alone; one from another month leaves the monthly total alone.
fn submission_alerts(
    prior: &[Transaction],
    budget: &Budget,
    amount: f64,
    date: NaiveDate,
    today: NaiveDate,
) -> Vec<BudgetAlert> {
    let old_daily = metrics::today_expense(prior, today);
    let old_monthly = metrics::monthly_expense(prior, today);
    let new_daily = if date == today { old_daily + amount } else { old_daily };
    let new_monthly = if date.month() == today.month() && date.year() == today.year() {
        old_monthly + amount
    } else {
        old_monthly
    };
    metrics::crossing_alerts(budget, old_daily, new_daily, old_monthly, new_monthly)
}

pub async fn delete(id: i64) -> Result<()> {
    let store = super::open_store();
    let (api, _) = super::protected_client(&store)?;
    api.delete_transaction(id).await?;
    println!("Deleted transaction {id}.");
    Ok(())
}

pub async fn export(output: String, format: String, month: Option<String>) -> Result<()> {
    let store = super::open_store();
    let (api, _) = super::protected_client(&store)?;
    let filter = build_filter(&month, None, None, None, None, None, None, None)?;
    let mut rows = filter.apply(&api.transactions().await?);
    rows.sort_by(|a, b| a.date.cmp(&b.date));

    match format.as_str() {
        "csv" => {
            let mut writer = csv::Writer::from_path(&output)?;
            writer.write_record(["Date", "Type", "Category", "Amount", "Description"])?;
            for t in &rows {
                writer.write_record([
                    t.date.to_string(),
                    t.kind.as_str().to_string(),
                    t.category.clone().unwrap_or_else(|| "N/A".to_string()),
                    format!("{:.2}", t.amount),
                    t.description.clone().unwrap_or_default(),
                ])?;
            }
            writer.flush()?;
        }
        "json" => {
            std::fs::write(&output, serde_json::to_string_pretty(&rows)?)?;
        }
        other => {
            return Err(PennyError::Other(format!(
                "Unknown export format: {other} (expected csv or json)"
            )))
        }
    }
    println!("Exported {} transactions to {output}", rows.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{AlertTier, BudgetPeriod};

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn expense(amount: f64, date: &str) -> Transaction {
        Transaction {
            id: None,
            amount,
            kind: TransactionType::Expense,
            category: Some("food".to_string()),
            description: None,
            date: d(date),
        }
    }

    fn budget(daily: f64, monthly: f64) -> Budget {
        Budget {
            id: None,
            daily_limit: daily,
            monthly_limit: monthly,
        }
    }

    #[test]
    fn test_submission_alerts_fire_on_newly_crossed_bound() {
        let today = d("2024-06-10");
        let prior = vec![expense(70.0, "2024-06-10")];
        let alerts = submission_alerts(&prior, &budget(100.0, 1000.0), 40.0, today, today);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].period, BudgetPeriod::Daily);
        assert_eq!(alerts[0].tier, AlertTier::Exceeded);
        assert_eq!(alerts[0].spent, 110.0);
    }

    #[test]
    fn test_submission_alerts_skip_already_exceeded_budget() {
        // The budget was blown before this expense; its prior spend must
        // suppress a repeat announcement.
        let today = d("2024-06-10");
        let prior = vec![expense(150.0, "2024-06-10")];
        let alerts = submission_alerts(&prior, &budget(100.0, 1000.0), 20.0, today, today);
        assert!(alerts.is_empty());
    }

    #[test]
    fn test_backdated_expense_leaves_daily_total_alone() {
        let today = d("2024-06-10");
        let alerts = submission_alerts(&[], &budget(100.0, 100.0), 120.0, d("2024-06-09"), today);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].period, BudgetPeriod::Monthly);
        assert_eq!(alerts[0].tier, AlertTier::Exceeded);
    }

    #[test]
    fn test_other_month_expense_triggers_no_alerts() {
        let today = d("2024-06-10");
        let alerts = submission_alerts(&[], &budget(100.0, 100.0), 500.0, d("2024-05-01"), today);
        assert!(alerts.is_empty());
    }
}
