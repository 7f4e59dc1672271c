//! Airdrop Scout API server
//!
//! A CLI tool and HTTP service for browsing NFT collections and wallet
//! activity across EVM networks: supported-chain catalog, curated
//! collections per chain, wallet statistics over JSON-RPC, and a
//! per-address experience point ledger.
//!
//! ```sh
//! scout init            # Generate default config.toml
//! scout serve           # Start the server
//! ```

mod address;
mod chain;
mod cmd;
mod collections;
mod config;
mod error;
mod routes;
mod signal;
mod telemetry;
mod xp;

use clap::Parser;
use cmd::{Cli, Commands};

#[tokio::main]
#[allow(clippy::print_stderr)]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init { output, force } => cmd::init::run(&output, force),
        Commands::Serve { config } => cmd::serve::run(&config).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
