//! # Rocket Cart CLI Entry Point
//!
//! A thin terminal shell over [`CartStore`]: one operation per invocation.
//!
//! ## Startup Sequence
//! 1. Parse arguments
//! 2. Initialize tracing (stderr, `RUST_LOG` aware)
//! 3. Load `CartConfig` (file, then environment)
//! 4. Open the SQLite database and run migrations
//! 5. Build the HTTP catalog client and the store
//! 6. Run the command, print notices to stderr and JSON to stdout
//!
//! ## Usage
//! ```text
//! rocket-cli show
//! rocket-cli add 3
//! rocket-cli set 3 2
//! rocket-cli remove 3
//! rocket-cli --config ./cart.toml totals
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use rocket_cart::{CartConfig, CartStore, ChannelNotifier, Collaborators, HttpCatalogClient};
use rocket_core::{ProductId, UpdateProductAmount};
use rocket_db::{Database, DbConfig};

/// Exit code when the operation ended in a user-facing notice.
const EXIT_NOTICE: i32 = 2;

#[derive(Debug, Parser)]
#[command(name = "rocket-cli", version, about = "Shopping cart for the Rocket Shoes catalog")]
struct Cli {
    /// Path to a cart.toml (defaults to the platform config directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the cart
    Show,
    /// Print item count, quantity and subtotal
    Totals,
    /// Add one unit of a product
    Add { id: u64 },
    /// Remove a product entirely
    Remove { id: u64 },
    /// Set the amount of a product already in the cart
    Set {
        id: u64,
        #[arg(allow_negative_numbers = true)]
        amount: i64,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing();
    debug!(?cli, "Parsed arguments");

    let config = CartConfig::load(cli.config)?;

    let db_path = config
        .storage
        .database_path()
        .ok_or("no database path configured and no platform data directory available")?;
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    info!(?db_path, "Database path determined");
    let db = Database::new(DbConfig::new(&db_path)).await?;

    let api = Arc::new(HttpCatalogClient::from_settings(&config.api)?);
    let (notifier, mut notices) = ChannelNotifier::new();
    let store = CartStore::init(
        Collaborators::from_api(api, Arc::new(db.kv()), Arc::new(notifier)),
        &config.storage,
    )
    .await?;

    match cli.command {
        Command::Show => {}
        Command::Totals => {
            println!("{}", serde_json::to_string_pretty(&store.totals())?);
            db.close().await;
            return Ok(());
        }
        Command::Add { id } => store.add_product(ProductId(id)).await,
        Command::Remove { id } => store.remove_product(ProductId(id)).await,
        Command::Set { id, amount } => {
            store
                .update_product_amount(UpdateProductAmount {
                    product_id: ProductId(id),
                    amount,
                })
                .await
        }
    }

    let mut reported = false;
    while let Ok(message) = notices.try_recv() {
        eprintln!("{}", message);
        reported = true;
    }

    println!("{}", serde_json::to_string_pretty(store.cart().as_ref())?);
    db.close().await;

    if reported {
        std::process::exit(EXIT_NOTICE);
    }
    Ok(())
}

/// Initializes the tracing subscriber.
///
/// Logs go to stderr so stdout stays machine readable.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,rocket=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
