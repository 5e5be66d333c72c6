use crate::{config::Config, logger::setup_logger, shutdown::shutdown_signal};
use anyhow::{Context, Result};
use log::info;

mod config;
mod errors;
mod extract;
mod handlers;
mod logger;
mod models;
mod shutdown;

#[tokio::main]
async fn main() -> Result<()> {
    setup_logger()?;

    let config = Config::from_env()?;
    let addrs = config.listen_addrs();
    let app = handlers::router();

    let listener = tokio::net::TcpListener::bind(&addrs[..])
        .await
        .with_context(|| format!("Failed to bind port {}", config.port))?;
    let addr = listener.local_addr()?;
    info!(
        "About to listen on {addr}. Go to https://127.0.0.1:{}/",
        config.port
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
