use colored::Colorize;
use zeroize::Zeroize;

use super::{client, runtime};
use crate::api::AuthResponse;
use crate::error::{FlowError, Result};
use crate::settings::store_token;

fn read_password(label: &str) -> Result<String> {
    let password = rpassword::prompt_password(label)?;
    if password.is_empty() {
        return Err(FlowError::Validation("Password is required".into()));
    }
    Ok(password)
}

fn finish(reply: AuthResponse, verb: &str) -> Result<()> {
    if let Some(message) = &reply.message {
        println!("{message}");
    }
    match reply.token {
        Some(token) => {
            store_token(Some(token))?;
            let who = reply
                .user
                .as_ref()
                .map(|u| u.display_name().to_string())
                .unwrap_or_default();
            println!("{} {verb} {who}", "✓".green());
        }
        None => println!(
            "The backend did not return a token. Run `frugalflow google` to sign in via the browser."
        ),
    }
    Ok(())
}

pub fn login(email: &str) -> Result<()> {
    let mut password = read_password("Password: ")?;
    let api = client()?;
    let reply = runtime()?.block_on(api.login(email, &password));
    password.zeroize();
    finish(reply?, "Signed in as")
}

pub fn register(email: &str) -> Result<()> {
    let mut password = read_password("Choose a password: ")?;
    let mut confirm = read_password("Confirm password: ")?;
    let matches = password == confirm;
    confirm.zeroize();
    if !matches {
        password.zeroize();
        return Err(FlowError::Validation("Passwords do not match".into()));
    }
    let api = client()?;
    let reply = runtime()?.block_on(api.register(email, &password));
    password.zeroize();
    finish(reply?, "Registered")
}

pub fn logout() -> Result<()> {
    let api = client()?;
    if api.has_token() {
        // The local token goes regardless of what the backend says.
        if let Err(e) = runtime()?.block_on(api.logout()) {
            tracing::warn!("logout request failed: {e}");
        }
    }
    store_token(None)?;
    println!("Signed out.");
    Ok(())
}

pub fn google() -> Result<()> {
    let api = client()?;
    println!("Backend: {}", api.base_url());
    println!("Open this URL in your browser to sign in with Google:\n");
    println!("  {}\n", api.google_auth_url().cyan());
    println!("Then copy the `token` value from the redirect and run `frugalflow token <TOKEN>`.");
    Ok(())
}

pub fn token(token: &str) -> Result<()> {
    let token = token.trim();
    if token.is_empty() {
        return Err(FlowError::Validation("Token is empty".into()));
    }
    store_token(Some(token.to_string()))?;
    println!("Token saved.");
    Ok(())
}

pub fn whoami() -> Result<()> {
    let api = client()?;
    let user = runtime()?.block_on(api.me())?;
    println!("{}", user.display_name().bold());
    if let Some(email) = &user.email {
        println!("{email}");
    }
    Ok(())
}
