use colored::Colorize;

use crate::error::{FlowError, Result};
use crate::settings::{load_settings, save_settings, settings_path, API_URL_ENV};

pub fn run(api_url: Option<String>, currency: Option<String>) -> Result<()> {
    let mut settings = load_settings();
    let changed = api_url.is_some() || currency.is_some();

    if let Some(url) = api_url {
        let url = url.trim().trim_end_matches('/').to_string();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(FlowError::Settings(format!(
                "API URL must start with http:// or https://, got {url}"
            )));
        }
        settings.api_base_url = url;
    }
    if let Some(symbol) = currency {
        settings.currency_symbol = symbol;
    }
    if changed {
        save_settings(&settings)?;
        println!("{} Settings saved.", "✓".green());
    }

    println!("Settings:  {}", settings_path().display());
    println!("API URL:   {}", settings.api_base_url);
    if std::env::var(API_URL_ENV).is_ok() {
        println!("           (overridden by {API_URL_ENV}: {})", settings.effective_api_url());
    }
    println!("Currency:  {}", settings.currency_symbol);
    println!(
        "Signed in: {}",
        if settings.auth_token.is_some() { "yes" } else { "no" }
    );
    Ok(())
}
