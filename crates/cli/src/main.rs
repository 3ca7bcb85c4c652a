//! CommerceWave CLI - database migrations and catalog inspection.
//!
//! # Usage
//!
//! ```bash
//! # Run storefront database migrations (including the session table)
//! cw-cli migrate
//!
//! # Print the built-in catalog
//! cw-cli catalog
//! cw-cli catalog --format json
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

use commands::catalog::Format;

#[derive(Parser)]
#[command(name = "cw-cli")]
#[command(author, version, about = "CommerceWave CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run storefront database migrations
    Migrate,
    /// Print the built-in product catalog
    Catalog {
        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: Format,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::storefront().await?,
        Commands::Catalog { format } => commands::catalog::print(format)?,
    }
    Ok(())
}
