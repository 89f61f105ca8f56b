//! Smart Drainage Monitor - Main Entry Point

use api::{init_logging, run_server, Settings};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env is normal in production; the environment is used as is.
    let dotenv = dotenvy::dotenv();
    init_logging();

    if let Err(e) = dotenv {
        if !e.not_found() {
            warn!("Failed to load .env: {}", e);
        }
    }

    info!("=== Smart Drainage Monitor v{} ===", env!("CARGO_PKG_VERSION"));

    let settings = Settings::load()?;
    run_server(settings).await?;

    Ok(())
}
