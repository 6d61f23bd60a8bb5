pub mod auth;
pub mod config;
pub mod dashboard;
pub mod report;
pub mod transactions;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::api::ApiClient;
use crate::error::Result;
use crate::filter::FilterCriteria;
use crate::models::{parse_date, TransactionType};
use crate::settings::load_settings;

pub(crate) fn client() -> Result<ApiClient> {
    ApiClient::from_settings(&load_settings())
}

pub(crate) fn runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?)
}

fn date_arg(s: &str) -> std::result::Result<NaiveDate, String> {
    parse_date(s)
}

#[derive(Parser)]
#[command(name = "frugalflow", about = "Track income and expenses from the terminal.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in with email and password.
    Login {
        #[arg(long)]
        email: String,
    },
    /// Create an account with email and password.
    Register {
        #[arg(long)]
        email: String,
    },
    /// Sign out and forget the stored token.
    Logout,
    /// Print the Google sign-in URL.
    Google,
    /// Store a token received from the Google sign-in redirect.
    Token {
        /// Value of the `token` query parameter
        token: String,
    },
    /// Show the signed-in user.
    Whoami,
    /// List transactions, optionally filtered.
    List {
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Show income, expense and balance totals.
    Summary {
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Record a new transaction.
    Add {
        #[command(flatten)]
        fields: TransactionArgs,
    },
    /// Replace all fields of an existing transaction.
    Edit {
        /// Transaction ID (shown in `frugalflow list --ids`)
        id: String,
        #[command(flatten)]
        fields: TransactionArgs,
    },
    /// Delete a transaction.
    Delete {
        /// Transaction ID
        id: String,
    },
    /// Generate the monthly AI summary and advice.
    Report,
    /// Show or change settings.
    Config {
        /// Backend base URL
        #[arg(long = "api-url")]
        api_url: Option<String>,
        /// Currency symbol used for display
        #[arg(long)]
        currency: Option<String>,
    },
    /// Interactive dashboard (default).
    Dashboard,
}

#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// income or expense
    #[arg(long = "type")]
    pub kind: Option<TransactionType>,
    /// Category name
    #[arg(long)]
    pub category: Option<String>,
    /// Start date: YYYY-MM-DD
    #[arg(long = "from", value_parser = date_arg)]
    pub start_date: Option<NaiveDate>,
    /// End date: YYYY-MM-DD
    #[arg(long = "to", value_parser = date_arg)]
    pub end_date: Option<NaiveDate>,
    /// Show transaction IDs
    #[arg(long)]
    pub ids: bool,
}

impl FilterArgs {
    pub fn criteria(&self) -> FilterCriteria {
        FilterCriteria {
            kind: self.kind,
            category: self.category.clone(),
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct TransactionArgs {
    /// income or expense
    #[arg(long = "type")]
    pub kind: TransactionType,
    /// Category name; use "Others" together with --custom-category
    #[arg(long)]
    pub category: String,
    /// Name for a custom category
    #[arg(long = "custom-category")]
    pub custom_category: Option<String>,
    /// Amount, e.g. 1250.50
    #[arg(long)]
    pub amount: String,
    /// Date: YYYY-MM-DD (default: today)
    #[arg(long)]
    pub date: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
}
