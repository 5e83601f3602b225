//! Web File Manager - Entry Point
//!
//! Serves a directory tree over HTTP to a fixed set of users.

use log::{error, info};

use web_file_manager::error::ServerError;
use web_file_manager::{Server, ServerConfig};

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("Launching web file manager...");

    if let Err(e) = run().await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), ServerError> {
    let config = ServerConfig::load()?;
    let server = Server::new(config).await?;
    server.start().await
}
