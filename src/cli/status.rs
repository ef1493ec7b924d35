use colored::Colorize;

use crate::error::Result;
use crate::session::GuardState;
use crate::settings;

pub fn run() -> Result<()> {
    let config = settings::load_settings();
    let store = super::open_store();

    println!("Server: {}", config.api_base_url);
    match GuardState::evaluate(&store) {
        GuardState::Authenticated(session) => {
            println!("Logged in as {} ({})", session.username.bold(), session.email);
            println!("Account enabled: {}", "yes".green());
        }
        _ => {
            println!("{}", "Not logged in.".yellow());
            println!("Run `penny login <username>` to start a session.");
        }
    }
    Ok(())
}
