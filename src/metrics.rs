//! Derived metrics over a fetched transaction list: the dashboard
//! view-model and budget-threshold alerts.
//!
//! Everything here is a pure synchronous pass over immutable data:
//! call in, compute, return. All date comparisons are on the calendar
//! date only; amounts are positive and `type` carries direction.

use chrono::{Datelike, Duration, NaiveDate};

use crate::fmt::capitalize;
use crate::models::{Budget, Transaction, TransactionType};

// ---------------------------------------------------------------------------
// Dashboard summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct DayExpense {
    pub date: NaiveDate,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryExpense {
    pub name: String,
    pub amount: f64,
    /// Share of the displayed top-five total, so the shown rows always
    /// sum to 100%. Categories cut from the display do not dilute it.
    pub pct: f64,
}

#[derive(Debug, Clone)]
pub struct DashboardSummary {
    pub today_expense: f64,
    pub monthly_expense: f64,
    pub monthly_budget: f64,
    /// May be negative: that signals over-budget, not an error.
    pub remaining_budget: f64,
    pub expense_by_day: Vec<DayExpense>,
    pub expense_by_category: Vec<CategoryExpense>,
    pub recent_transactions: Vec<Transaction>,
}

fn expense_on(transactions: &[Transaction], date: NaiveDate) -> f64 {
    transactions
        .iter()
        .filter(|t| t.kind == TransactionType::Expense && t.date == date)
        .map(|t| t.amount)
        .sum()
}

pub fn today_expense(transactions: &[Transaction], today: NaiveDate) -> f64 {
    expense_on(transactions, today)
}

pub fn monthly_expense(transactions: &[Transaction], today: NaiveDate) -> f64 {
    transactions
        .iter()
        .filter(|t| {
            t.kind == TransactionType::Expense
                && t.date.month() == today.month()
                && t.date.year() == today.year()
        })
        .map(|t| t.amount)
        .sum()
}

/// Spending per day for the trailing 7 calendar days including `today`,
/// oldest first. Always exactly 7 entries; days with no expenses are zero.
pub fn expense_by_day(transactions: &[Transaction], today: NaiveDate) -> Vec<DayExpense> {
    (0..7)
        .rev()
        .map(|i| {
            let date = today - Duration::days(i);
            DayExpense {
                date,
                amount: expense_on(transactions, date),
            }
        })
        .collect()
}

/// Expense totals per category, descending, truncated to the top five.
/// Ties keep first-encountered order (the sort is stable); a missing or
/// empty category falls back to "Other".
pub fn expense_by_category(transactions: &[Transaction]) -> Vec<CategoryExpense> {
    let mut groups: Vec<(String, f64)> = Vec::new();
    for t in transactions.iter().filter(|t| t.kind == TransactionType::Expense) {
        let name = t
            .category
            .as_deref()
            .filter(|c| !c.is_empty())
            .unwrap_or("Other");
        match groups.iter_mut().find(|(n, _)| n == name) {
            Some((_, sum)) => *sum += t.amount,
            None => groups.push((name.to_string(), t.amount)),
        }
    }

    groups.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    groups.truncate(5);
    // Percentages are shares of the rows that survived the cut, not of
    // overall spending.
    let total: f64 = groups.iter().map(|(_, v)| v).sum();

    groups
        .into_iter()
        .map(|(name, amount)| CategoryExpense {
            name: capitalize(&name),
            amount,
            pct: if total > 0.0 { amount / total * 100.0 } else { 0.0 },
        })
        .collect()
}

/// All transactions, newest first, truncated to five. Same-day order is
/// preserved as fetched.
pub fn recent_transactions(transactions: &[Transaction]) -> Vec<Transaction> {
    let mut sorted = transactions.to_vec();
    sorted.sort_by(|a, b| b.date.cmp(&a.date));
    sorted.truncate(5);
    sorted
}

/// Build the full dashboard view-model for one fetched snapshot.
pub fn summarize(
    transactions: &[Transaction],
    today: NaiveDate,
    budget: Option<&Budget>,
) -> DashboardSummary {
    let monthly = monthly_expense(transactions, today);
    let monthly_budget = budget.map(|b| b.monthly_limit).unwrap_or(0.0);
    DashboardSummary {
        today_expense: today_expense(transactions, today),
        monthly_expense: monthly,
        monthly_budget,
        remaining_budget: monthly_budget - monthly,
        expense_by_day: expense_by_day(transactions, today),
        expense_by_category: expense_by_category(transactions),
        recent_transactions: recent_transactions(transactions),
    }
}

// ---------------------------------------------------------------------------
// Budget alerts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetPeriod {
    Daily,
    Monthly,
}

impl BudgetPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Monthly => "monthly",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertTier {
    /// Informational notice at the 50% mark.
    Halfway,
    /// 80% or more of the limit spent.
    Approaching,
    /// Limit spent or blown through.
    Exceeded,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BudgetAlert {
    pub period: BudgetPeriod,
    pub tier: AlertTier,
    pub spent: f64,
    pub limit: f64,
    pub pct: f64,
}

/// Recompute-time alert for one limit. Skipped entirely when the limit is
/// zero or negative; otherwise only the highest matching tier fires. The
/// halfway notice only fires in the [50, 51) band so it shows up once
/// rather than on every recompute between 50% and 80%.
pub fn status_alert(period: BudgetPeriod, spent: f64, limit: f64) -> Option<BudgetAlert> {
    if limit <= 0.0 {
        return None;
    }
    let pct = spent / limit * 100.0;
    let tier = if pct >= 100.0 {
        AlertTier::Exceeded
    } else if pct >= 80.0 {
        AlertTier::Approaching
    } else if (50.0..51.0).contains(&pct) {
        AlertTier::Halfway
    } else {
        return None;
    };
    Some(BudgetAlert {
        period,
        tier,
        spent,
        limit,
        pct,
    })
}

/// Submission-time alert: fires only when the new expense carries spending
/// across a tier bound the old spending was still below, so an
/// already-exceeded budget does not re-alert on every expense. Explicitly
/// a function of old and new percentages with no hidden "already alerted"
/// flag. The halfway notice is recompute-only and never fires here.
pub fn crossing_alert(
    period: BudgetPeriod,
    old_spent: f64,
    new_spent: f64,
    limit: f64,
) -> Option<BudgetAlert> {
    if limit <= 0.0 {
        return None;
    }
    let old_pct = old_spent / limit * 100.0;
    let new_pct = new_spent / limit * 100.0;
    let tier = if new_pct >= 100.0 && old_pct < 100.0 {
        AlertTier::Exceeded
    } else if new_pct >= 80.0 && old_pct < 80.0 {
        AlertTier::Approaching
    } else {
        return None;
    };
    Some(BudgetAlert {
        period,
        tier,
        spent: new_spent,
        limit,
        pct: new_pct,
    })
}

/// Recompute-time alerts for both limits, daily first.
pub fn status_alerts(budget: &Budget, daily_spent: f64, monthly_spent: f64) -> Vec<BudgetAlert> {
    [
        status_alert(BudgetPeriod::Daily, daily_spent, budget.daily_limit),
        status_alert(BudgetPeriod::Monthly, monthly_spent, budget.monthly_limit),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// Submission-time alerts for both limits, daily first.
pub fn crossing_alerts(
    budget: &Budget,
    old_daily: f64,
    new_daily: f64,
    old_monthly: f64,
    new_monthly: f64,
) -> Vec<BudgetAlert> {
    [
        crossing_alert(BudgetPeriod::Daily, old_daily, new_daily, budget.daily_limit),
        crossing_alert(
            BudgetPeriod::Monthly,
            old_monthly,
            new_monthly,
            budget.monthly_limit,
        ),
    ]
    .into_iter()
    .flatten()
    .collect()
}
