mod api;
mod cli;
mod error;
mod filters;
mod fmt;
mod metrics;
mod models;
mod session;
mod settings;

use clap::Parser;
use colored::Colorize;

use cli::{BudgetCommands, Cli, Commands, ReportCommands, TxCommands};
use error::PennyError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init { server } => cli::init::run(server),
        Commands::Register {
            username,
            name,
            email,
        } => cli::auth::register(&username, &name, &email).await,
        Commands::Login { username } => cli::auth::login(&username).await,
        Commands::Logout => cli::auth::logout().await,
        Commands::ForgotPassword { email } => cli::auth::forgot_password(&email).await,
        Commands::ResetPassword { token } => cli::auth::reset_password(&token).await,
        Commands::VerifyEmail { token } => cli::auth::verify_email(&token).await,
        Commands::Status => cli::status::run(),
        Commands::Dashboard => cli::dashboard::run().await,
        Commands::Tx { command } => match command {
            TxCommands::List {
                month,
                from_date,
                to_date,
                kind,
                category,
                search,
                amount_min,
                amount_max,
            } => {
                cli::transactions::list(
                    month, from_date, to_date, kind, category, search, amount_min, amount_max,
                )
                .await
            }
            TxCommands::Add {
                amount,
                kind,
                category,
                description,
                date,
            } => cli::transactions::add(amount, kind, category, description, date).await,
            TxCommands::Delete { id } => cli::transactions::delete(id).await,
            TxCommands::Export {
                output,
                format,
                month,
            } => cli::transactions::export(output, format, month).await,
        },
        Commands::Budget { command } => match command {
            BudgetCommands::Show => cli::budget::show().await,
            BudgetCommands::Set { daily, monthly } => cli::budget::set(daily, monthly).await,
        },
        Commands::Report { command } => match command {
            ReportCommands::Monthly { month } => cli::report::monthly(month).await,
            ReportCommands::Category => cli::report::category().await,
            ReportCommands::Daily { date } => cli::report::daily(date).await,
            ReportCommands::Summary => cli::report::summary().await,
        },
    };

    if let Err(e) = result {
        match e {
            // A rejected token means the stored session is stale. Drop it so
            // the next command prompts for a fresh login instead of failing
            // the same way.
            PennyError::AuthenticationFailure => {
                let mut store = session::FileStore::open_default();
                session::clear_session(&mut store);
                eprintln!(
                    "{}",
                    "Your session is no longer valid. Run `penny login <username>` to continue."
                        .yellow()
                );
            }
            PennyError::Validation { message, errors } => {
                eprintln!("Error: {message}");
                for (field, detail) in errors {
                    eprintln!("  {field}: {detail}");
                }
            }
            PennyError::Network(e) => {
                eprintln!("Error: {e}");
                eprintln!("Check the server address (`penny init --server <url>`) and try again.");
            }
            other => eprintln!("Error: {other}"),
        }
        std::process::exit(1);
    }
}
