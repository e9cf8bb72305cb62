#![warn(clippy::all, clippy::pedantic)]

use anyhow::Result;
use clap::Parser;
use looklab::cli::{self, Cli};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Rustls needs a process-level CryptoProvider picked explicitly when
    // more than one could be linked in.
    if let Err(e) = rustls::crypto::ring::default_provider().install_default() {
        eprintln!("Warning: Failed to install default crypto provider: {e:?}");
    }

    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    cli::run(Cli::parse()).await
}
