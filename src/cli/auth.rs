use colored::Colorize;
use zeroize::Zeroize;

use crate::api::ApiClient;
use crate::error::{PennyError, Result};
use crate::session;
use crate::settings;

pub async fn login(username: &str) -> Result<()> {
    let config = settings::load_settings();
    let api = ApiClient::from_settings(&config, None)?;

    let mut password = rpassword::prompt_password("Password: ")?;
    let outcome = api.login(username, &password).await;
    password.zeroize();
    let session = outcome?;

    let mut store = super::open_store();
    session::save_session(
        &mut store,
        &session.access_token,
        &session.username,
        &session.email,
        session.enabled,
    )?;
    println!(
        "Logged in as {} ({})",
        session.username.bold(),
        session.email
    );
    Ok(())
}

/// Prompt for a new password twice and validate before anything leaves
/// the process. Rejected input is wiped immediately.
fn prompt_new_password(label: &str) -> Result<String> {
    let mut password = rpassword::prompt_password(label)?;
    let mut confirm = rpassword::prompt_password("Confirm password: ")?;
    let matching = password == confirm;
    confirm.zeroize();
    if !matching {
        password.zeroize();
        return Err(PennyError::Other("Passwords do not match".to_string()));
    }
    if password.len() < 6 {
        password.zeroize();
        return Err(PennyError::Other(
            "Password must be at least 6 characters".to_string(),
        ));
    }
    Ok(password)
}

pub async fn register(username: &str, full_name: &str, email: &str) -> Result<()> {
    let config = settings::load_settings();
    let api = ApiClient::from_settings(&config, None)?;

    let mut password = prompt_new_password("Password (min 6 characters): ")?;
    let outcome = api.register(full_name, username, email, &password).await;
    password.zeroize();
    let session = outcome?;

    let mut store = super::open_store();
    session::save_session(
        &mut store,
        &session.access_token,
        &session.username,
        &session.email,
        session.enabled,
    )?;
    println!(
        "Welcome, {}! Your account is ready and you are logged in.",
        session.username.bold()
    );
    Ok(())
}

pub async fn forgot_password(email: &str) -> Result<()> {
    let config = settings::load_settings();
    let api = ApiClient::from_settings(&config, None)?;
    println!("{}", api.forgot_password(email).await?);
    Ok(())
}

pub async fn reset_password(token: &str) -> Result<()> {
    let config = settings::load_settings();
    let api = ApiClient::from_settings(&config, None)?;

    let mut password = prompt_new_password("New password (min 6 characters): ")?;
    let outcome = api.reset_password(token, &password).await;
    password.zeroize();

    println!("{}", outcome?);
    println!("Log in with `penny login <username>` to continue.");
    Ok(())
}

pub async fn verify_email(token: &str) -> Result<()> {
    let config = settings::load_settings();
    let api = ApiClient::from_settings(&config, None)?;
    println!("{}", api.verify_email(token).await?);
    Ok(())
}

pub async fn logout() -> Result<()> {
    let mut store = super::open_store();

    // Tell the server first, but only best-effort: an unreachable backend
    // must not keep the local session alive.
    if let Some(session) = session::load_session(&store) {
        let config = settings::load_settings();
        if let Ok(api) = ApiClient::from_settings(&config, Some(session.access_token)) {
            api.logout().await;
        }
    }

    session::clear_session(&mut store);
    println!("Logged out.");
    Ok(())
}
