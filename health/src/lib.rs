pub mod api;
pub mod join;
pub mod models;
pub mod reports;
pub mod services;
pub mod stats;

#[cfg(test)]
mod testing;

use std::sync::Arc;
use common::config::Settings;
use common::{Error, Result};
use models::{Report, ReportKind};
use services::HealthService;
use tokio::net::TcpListener;
use std::net::SocketAddr;
use tracing::info;

/// Serves the health API until the listener fails.
pub async fn run_server(settings: &Settings) -> Result<()> {
    let service = Arc::new(HealthService::new(settings));
    let api_router = api::routes(service);

    let addr = SocketAddr::from(([0, 0, 0, 0], settings.api_port));
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "Health API listening");
    axum::serve(listener, api_router).await?;

    Ok(())
}

/// Computes one report against the instance configured under `[looker]`.
pub async fn run_report(settings: &Settings, test_id: &str) -> Result<Report> {
    let kind: ReportKind = test_id.parse()?;
    let looker = settings.looker.as_ref().ok_or_else(|| {
        Error::InvalidInput("no [looker] section in the configuration".into())
    })?;

    HealthService::new(settings).run(kind, looker).await
}
