//! Shopfront CLI - storefront and admin API access from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Who does the current session belong to?
//! shop-cli whoami
//!
//! # Sign in first (password from SHOPFRONT_PASSWORD), then list users
//! shop-cli --email admin@example.com --path /adminLogin users list
//!
//! # Show a product with its size/color facets and pick a variant
//! shop-cli products show 5 --size M --color BLUE
//! ```
//!
//! # Commands
//!
//! - `whoami` - Check the session and print it
//! - `logout` - End the session
//! - `products list|show` - Browse products
//! - `categories` - List categories
//! - `options` - List option groups or the values of one group
//! - `users list` - List users through the admin API

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use clap::{Parser, Subcommand};
use shopfront_client::navigation::{HOME_PAGE, MemoryNavigator};
use shopfront_client::telemetry;
use shopfront_client::{ClientConfig, ShopState};

mod commands;

use commands::CliError;

#[derive(Parser)]
#[command(name = "shop-cli")]
#[command(author, version, about = "Shopfront CLI tools")]
struct Cli {
    /// Page the session acts from (decides auth-page and admin-area handling)
    #[arg(long, global = true, default_value = HOME_PAGE)]
    path: String,

    /// Sign in with this email before running the command
    #[arg(long, global = true)]
    email: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the session and print it
    Whoami,
    /// End the session
    Logout,
    /// Browse products
    Products {
        #[command(subcommand)]
        action: ProductsAction,
    },
    /// List categories
    Categories,
    /// List option groups, or the values of one group
    Options {
        /// Option group ID
        #[arg(short, long)]
        group: Option<i64>,
    },
    /// Manage users (admin API)
    Users {
        #[command(subcommand)]
        action: UsersAction,
    },
}

#[derive(Subcommand)]
enum ProductsAction {
    /// List all products
    List,
    /// Show one product with its facets
    Show {
        /// Product ID
        id: i64,

        /// Size to select (defaults to the first SKU's)
        #[arg(short, long)]
        size: Option<String>,

        /// Color to select (defaults to the first SKU's)
        #[arg(short, long)]
        color: Option<String>,
    },
}

#[derive(Subcommand)]
enum UsersAction {
    /// List all users
    List,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            telemetry::init_tracing(telemetry::DEFAULT_LOG_FILTER);
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = telemetry::init_sentry(&config);
    telemetry::init_tracing(telemetry::DEFAULT_LOG_FILTER);

    if let Err(e) = run(cli, config).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: ClientConfig) -> Result<(), CliError> {
    let navigator = Arc::new(MemoryNavigator::new(cli.path));
    let state = ShopState::new(config, navigator)?;

    if let Some(email) = cli.email.as_deref() {
        commands::session::sign_in(&state, email).await?;
    }

    match cli.command {
        Commands::Whoami => commands::session::whoami(&state).await,
        Commands::Logout => commands::session::logout(&state).await,
        Commands::Products { action } => match action {
            ProductsAction::List => commands::catalog::list_products(&state).await?,
            ProductsAction::Show { id, size, color } => {
                commands::catalog::show_product(&state, id, size, color).await?;
            }
        },
        Commands::Categories => commands::catalog::categories(&state).await?,
        Commands::Options { group } => commands::catalog::options(&state, group).await?,
        Commands::Users { action } => match action {
            UsersAction::List => commands::users::list(&state).await?,
        },
    }
    Ok(())
}
