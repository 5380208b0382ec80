//! Tallarin Activation Server
//!
//! Issues signed license files, validates them for clients, and keeps the
//! list of revoked licenses.
//!
//! Usage:
//!   tallarin-activation-server --port 5000
//!
//! The signing key pair and the revocation list are kept in files next to
//! the server; missing keys are generated on first start.

use std::{path::PathBuf, sync::Arc};
use anyhow::{Context, Result};
use clap::Parser;
use tallarin_activation_server::{AppState, build_router, load_or_generate};
use tallarin_license::DEFAULT_KEY_BITS;
use tallarin_revocation::JsonFileRegistry;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "tallarin-activation-server")]
#[command(about = "Tallarin license activation server")]
struct Args {
    /// Address to bind the HTTP API to
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Port for the HTTP API
    #[arg(short, long, default_value = "5000")]
    port: u16,

    /// Path to the private signing key (PEM)
    #[arg(long, default_value = "private_key.pem")]
    private_key: PathBuf,

    /// Path to the public key handed to clients (PEM)
    #[arg(long, default_value = "public_key.pem")]
    public_key: PathBuf,

    /// Path to the revoked license list (JSON)
    #[arg(long, default_value = "revoked_licenses.json")]
    revoked: PathBuf,

    /// RSA modulus size for newly generated keys
    #[arg(long, default_value_t = DEFAULT_KEY_BITS)]
    key_bits: usize,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .compact()
        .init();

    info!("Tallarin Activation Server starting...");
    let keys = load_or_generate(&args.private_key, &args.public_key, args.key_bits)?;
    let registry = JsonFileRegistry::open(&args.revoked)
        .with_context(|| format!("Failed to open revocation list {}", args.revoked.display()))?;
    info!(
        revoked = registry.path().display().to_string(),
        "Revocation list loaded"
    );

    let state = AppState::new(keys, Arc::new(registry)).context("Failed to export public key")?;
    let app = build_router(Arc::new(state));

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    println!("\n========================================");
    println!("  Tallarin Activation Server Running");
    println!("========================================");
    println!("  Private key: {}", args.private_key.display());
    println!("  Public key:  {}", args.public_key.display());
    println!("  Revoked:     {}", args.revoked.display());
    println!("  Listening:   http://{addr}");
    println!("========================================\n");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown requested"),
        Err(e) => {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
