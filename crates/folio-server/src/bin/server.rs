//! Folio Server Binary

use anyhow::{bail, Result};
use folio_server::config::validate_config;
use folio_server::{Server, ServerConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional
    dotenvy::dotenv().ok();
    let config = ServerConfig::from_env()?;

    folio_common_log::init(config.logging.to_log_config())?;

    if let Err(errors) = validate_config(&config) {
        for err in &errors {
            error!(error = %err, "invalid configuration");
        }
        bail!("configuration has {} error(s)", errors.len());
    }

    info!("Starting Folio Server v{}", env!("CARGO_PKG_VERSION"));

    let server = Server::new(config)?;
    server.run().await?;

    info!("Server shutdown complete");
    Ok(())
}
