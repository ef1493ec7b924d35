pub mod auth;
pub mod budget;
pub mod dashboard;
pub mod init;
pub mod report;
pub mod status;
pub mod transactions;

use clap::{Parser, Subcommand};
use colored::Colorize;

use crate::api::ApiClient;
use crate::error::{PennyError, Result};
use crate::fmt::{capitalize, money};
use crate::metrics::{AlertTier, BudgetAlert};
use crate::session::{self, FileStore, Session, SessionStore};
use crate::settings;

#[derive(Parser)]
#[command(name = "penny", about = "Terminal client for the Smart Expense Tracker API.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Point penny at an Expense Tracker server.
    Init {
        /// Base URL of the backend (default: http://localhost:8080)
        #[arg(long)]
        server: Option<String>,
    },
    /// Create an account and start a session.
    Register {
        username: String,
        /// Full name
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
    },
    /// Log in and save the session.
    Login { username: String },
    /// End the session. Server notification is best-effort.
    Logout,
    /// Request a password-reset email.
    ForgotPassword { email: String },
    /// Set a new password using the token from the reset email.
    ResetPassword {
        /// Token from the reset email
        #[arg(long)]
        token: String,
    },
    /// Confirm an email address using the token from the verification email.
    VerifyEmail {
        /// Token from the verification email
        #[arg(long)]
        token: String,
    },
    /// Show server and session status.
    Status,
    /// Spending overview: today, this month, 7-day trend, top categories.
    Dashboard,
    /// Work with transactions.
    Tx {
        #[command(subcommand)]
        command: TxCommands,
    },
    /// View or set budget limits.
    Budget {
        #[command(subcommand)]
        command: BudgetCommands,
    },
    /// Server-computed reports.
    Report {
        #[command(subcommand)]
        command: ReportCommands,
    },
}

#[derive(Subcommand)]
pub enum TxCommands {
    /// List transactions with optional filters.
    List {
        /// Month filter: YYYY-MM
        #[arg(long)]
        month: Option<String>,
        /// Start date: YYYY-MM-DD
        #[arg(long = "from")]
        from_date: Option<String>,
        /// End date: YYYY-MM-DD
        #[arg(long = "to")]
        to_date: Option<String>,
        /// income or expense
        #[arg(long = "type")]
        kind: Option<String>,
        /// Filter by category name
        #[arg(long)]
        category: Option<String>,
        /// Substring match on description, category, or amount
        #[arg(long)]
        search: Option<String>,
        /// Minimum amount
        #[arg(long = "min")]
        amount_min: Option<f64>,
        /// Maximum amount
        #[arg(long = "max")]
        amount_max: Option<f64>,
    },
    /// Record a transaction.
    Add {
        /// Amount (positive)
        amount: f64,
        /// income or expense
        #[arg(long = "type", default_value = "expense")]
        kind: String,
        /// Category name
        #[arg(long)]
        category: String,
        #[arg(long)]
        description: Option<String>,
        /// Date: YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
    },
    /// Delete a transaction by ID.
    Delete { id: i64 },
    /// Export transactions to CSV or JSON.
    Export {
        /// Output file path
        output: String,
        /// csv or json
        #[arg(long, default_value = "csv")]
        format: String,
        /// Month filter: YYYY-MM
        #[arg(long)]
        month: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum BudgetCommands {
    /// Current limits and spending against them.
    Show,
    /// Create or update the budget limits.
    Set {
        /// Daily limit
        #[arg(long)]
        daily: f64,
        /// Monthly limit
        #[arg(long)]
        monthly: f64,
    },
}

#[derive(Subcommand)]
pub enum ReportCommands {
    /// Income/expense statistics for a month.
    Monthly {
        /// Month: YYYY-MM (default: current month)
        #[arg(long)]
        month: Option<String>,
    },
    /// Expense totals per category.
    Category,
    /// Single-day summary.
    Daily {
        /// Date: YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
    },
    /// Overall totals: income, expenses, balance.
    Summary,
}

/// Parse an optional `--month YYYY-MM` flag. Absent is `Ok(None)`;
/// present but malformed is an error rather than a silent no-op.
pub(crate) fn parse_month_opt(month: &Option<String>) -> Result<Option<(i32, u32)>> {
    let Some(m) = month else {
        return Ok(None);
    };
    m.split_once('-')
        .and_then(|(y, mo)| Some((y.parse().ok()?, mo.parse().ok()?)))
        .map(Some)
        .ok_or_else(|| PennyError::Other(format!("Invalid month: {m} (expected YYYY-MM)")))
}

/// The per-command route guard: re-check the stored session, then build a
/// client that carries its bearer token. Every protected handler starts
/// here, so a session cleared between commands is caught immediately.
pub(crate) fn protected_client(store: &dyn SessionStore) -> Result<(ApiClient, Session)> {
    let session = session::require(store)?;
    let config = settings::load_settings();
    let api = ApiClient::from_settings(&config, Some(session.access_token.clone()))?;
    Ok((api, session))
}

pub(crate) fn open_store() -> FileStore {
    FileStore::open_default()
}

pub(crate) fn print_alerts(alerts: &[BudgetAlert]) {
    for a in alerts {
        let period = a.period.as_str();
        match a.tier {
            AlertTier::Exceeded => eprintln!(
                "{}",
                format!(
                    "{} budget exceeded! You've spent {} of {}",
                    capitalize(period),
                    money(a.spent),
                    money(a.limit)
                )
                .red()
                .bold()
            ),
            AlertTier::Approaching => eprintln!(
                "{}",
                format!(
                    "Approaching {} budget limit ({:.0}%), {} remaining",
                    period,
                    a.pct,
                    money(a.limit - a.spent)
                )
                .yellow()
            ),
            AlertTier::Halfway => println!(
                "You've used 50% of your {} budget. {} remaining",
                period,
                money(a.limit - a.spent)
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_month_absent() {
        assert!(matches!(parse_month_opt(&None), Ok(None)));
    }

    #[test]
    fn test_parse_month_well_formed() {
        let m = Some("2024-06".to_string());
        assert!(matches!(parse_month_opt(&m), Ok(Some((2024, 6)))));
    }

    #[test]
    fn test_parse_month_malformed_is_an_error() {
        for bad in ["garbage", "202406", "2024-", "-06", "June 2024"] {
            let m = Some(bad.to_string());
            assert!(parse_month_opt(&m).is_err(), "should reject {bad:?}");
        }
    }
}
