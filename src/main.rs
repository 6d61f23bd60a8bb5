mod api;
mod categories;
mod cli;
mod dashboard;
mod error;
mod filter;
mod fmt;
mod form;
mod models;
mod report;
mod settings;
mod state;
mod store;
mod tui;

use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
}

fn open_log(path: &Path) -> std::io::Result<File> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Commands log to stderr. The dashboard owns the terminal, so it logs to a
/// file next to the settings instead, or nowhere if that file is unusable.
fn init_logging(interactive: bool) {
    if !interactive {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter())
            .with_writer(std::io::stderr)
            .init();
        return;
    }
    let path = settings::log_path();
    match open_log(&path) {
        Ok(file) => tracing_subscriber::fmt()
            .with_env_filter(env_filter())
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init(),
        Err(e) => {
            eprintln!("Logging disabled: cannot open {}: {e}", path.display());
            tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_writer(std::io::sink)
                .init();
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Dashboard);
    init_logging(matches!(command, Commands::Dashboard));

    let result = match command {
        Commands::Login { email } => cli::auth::login(&email),
        Commands::Register { email } => cli::auth::register(&email),
        Commands::Logout => cli::auth::logout(),
        Commands::Google => cli::auth::google(),
        Commands::Token { token } => cli::auth::token(&token),
        Commands::Whoami => cli::auth::whoami(),
        Commands::List { filters } => cli::transactions::list(filters),
        Commands::Summary { filters } => cli::transactions::summary(filters),
        Commands::Add { fields } => cli::transactions::add(fields),
        Commands::Edit { id, fields } => cli::transactions::edit(&id, fields),
        Commands::Delete { id } => cli::transactions::delete(&id),
        Commands::Report => cli::report::run(),
        Commands::Config { api_url, currency } => cli::config::run(api_url, currency),
        Commands::Dashboard => cli::dashboard::run(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        if e.is_unauthorized() {
            eprintln!("Run `frugalflow login --email <EMAIL>` or `frugalflow google` to sign in.");
        }
        std::process::exit(1);
    }
}
