use log::{error, info};
use tokio::net::TcpListener;

mod config;
mod error;
mod handlers;
mod models;
mod routes;
mod state;

#[cfg(test)]
mod tests;

use config::{ServiceConfig, StartupError};

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run().await {
        error!("checkin-service failed: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), StartupError> {
    let config = ServiceConfig::from_env()?;
    let app = routes::create_router(&config)?;

    let listener = TcpListener::bind(("0.0.0.0", config.port)).await?;
    info!("Check-in service listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
