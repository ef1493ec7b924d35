use crate::error::Result;
use crate::settings::{self, Settings};

pub fn run(server: Option<String>) -> Result<()> {
    let mut config = settings::load_settings();
    if let Some(url) = server {
        config.api_base_url = url.trim_end_matches('/').to_string();
    } else {
        config = Settings::default();
    }
    settings::save_settings(&config)?;
    println!("penny is set up. Server: {}", config.api_base_url);
    println!("Next: `penny register <username> --name <name> --email <email>` or `penny login <username>`");
    Ok(())
}
