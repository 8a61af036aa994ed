//! Mobile Shop CLI - browse the catalog, manage the cart, and check out.
//!
//! # Usage
//!
//! ```bash
//! # List products, optionally filtered by brand or model
//! shop products --search acer
//!
//! # Add the first color/storage of a product to the cart
//! shop cart add ZmGrkLRPXOTpxsU4jjAcv
//!
//! # Check out
//! shop checkout --name "Ada" --email ada@example.com --address "1 Main St"
//! ```
//!
//! # Commands
//!
//! - `products` / `product` - Catalog listing and detail (cached for an hour)
//! - `cart` - Show, add, update, remove, clear
//! - `checkout` - Turn the cart into an order
//! - `orders` - Order history
//! - `cache clear` - Drop cached catalog responses

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use mobile_shop_storefront::config::StorefrontConfig;
use mobile_shop_storefront::error::AppError;
use mobile_shop_storefront::state::AppState;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "shop")]
#[command(author, version, about = "Mobile Shop storefront")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List products
    Products {
        /// Only show products whose brand or model contains this text
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Show one product with its options
    Product {
        /// Product ID
        id: String,
    },
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Turn the cart into an order
    Checkout {
        /// Customer name
        #[arg(short, long)]
        name: String,

        /// Customer email
        #[arg(short, long)]
        email: String,

        /// Shipping address
        #[arg(short, long)]
        address: String,
    },
    /// Show order history, newest first
    Orders,
    /// Manage the catalog response cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show cart lines and totals
    Show,
    /// Add a product variant
    Add {
        /// Product ID
        id: String,

        /// Color code (default: first listed color)
        #[arg(short, long)]
        color: Option<i64>,

        /// Storage code (default: first listed storage)
        #[arg(short, long)]
        storage: Option<i64>,

        /// Units to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Set the quantity of a line
    Update {
        /// Line number as shown by `cart show`
        index: usize,

        /// New quantity
        #[arg(allow_hyphen_values = true)]
        quantity: String,
    },
    /// Remove a line
    Remove {
        /// Line number as shown by `cart show`
        index: usize,
    },
    /// Remove every line
    Clear,
}

#[derive(Subcommand)]
enum CacheAction {
    /// Drop every cached response
    Clear,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        tracing::Level::TRACE => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing() {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "mobile_shop_storefront=info,mobile_shop_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
#[allow(clippy::print_stderr)]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Configuration is needed before Sentry, and Sentry before tracing
    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };
    let _sentry_guard = init_sentry(&config);
    init_tracing();

    let result = match AppState::new(config) {
        Ok(state) => run(cli, &state).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            e.report();
            eprintln!("error: {}", e.user_message());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, state: &AppState) -> Result<(), AppError> {
    match cli.command {
        Commands::Products { search } => {
            commands::products::list(state, search.as_deref()).await?;
        }
        Commands::Product { id } => commands::products::show(state, &id).await?,
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(state).await,
            CartAction::Add {
                id,
                color,
                storage,
                quantity,
            } => commands::cart::add(state, &id, color, storage, quantity).await?,
            CartAction::Update { index, quantity } => {
                commands::cart::update(state, index, &quantity)?;
            }
            CartAction::Remove { index } => commands::cart::remove(state, index)?,
            CartAction::Clear => commands::cart::clear(state),
        },
        Commands::Checkout {
            name,
            email,
            address,
        } => commands::orders::checkout(state, name, email, address)?,
        Commands::Orders => commands::orders::list(state),
        Commands::Cache { action } => match action {
            CacheAction::Clear => commands::cache::clear(state)?,
        },
    }
    Ok(())
}
