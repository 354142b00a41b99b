//! IoT Dashboard - Administrative web front end for an IoT REST backend
//!
//! Renders device, reading, alert and user management pages server side and
//! forwards every data operation to the backend with the caller's bearer token.

pub mod api;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod guard;
pub mod io;
pub mod load_state;
pub mod mock;
pub mod model;
pub mod pages;
pub mod session;
pub mod views;


pub use config::{load_config, Config};
pub use error::{DashboardError, Result};

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::api::ApiClient;
use crate::dashboard::AppState;
use crate::io::ReqwestHttpClient;

/// Build the application state for the given configuration
pub fn app_state(config: &Config) -> Result<AppState> {
    let http: Arc<dyn io::HttpClient> = Arc::new(ReqwestHttpClient::new(Duration::from_secs(
        config.backend.timeout_seconds,
    ))?);
    Ok(AppState {
        api: ApiClient::new(http, config.backend.base_url.clone()),
        session: config.session.clone(),
    })
}

/// Serve the dashboard on an already bound listener until `cancel` fires
pub async fn serve(config: &Config, listener: TcpListener, cancel: CancellationToken) -> Result<()> {
    let router = dashboard::build_router(app_state(config)?);
    tracing::info!(
        "Dashboard listening on http://{} (backend {})",
        listener.local_addr()?,
        config.backend.base_url
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            cancel.cancelled().await;
        })
        .await?;

    tracing::debug!("Dashboard stopped");
    Ok(())
}

/// Run the dashboard with the given configuration
pub async fn run(config: Config) -> Result<()> {
    let addr = format!("{}:{}", config.server.bind_address, config.server.port);
    let listener = TcpListener::bind(&addr).await.map_err(|e| {
        DashboardError::Config(format!("Failed to bind dashboard to {}: {}", addr, e))
    })?;

    let cancel = CancellationToken::new();
    let cancel_for_signal = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Shutdown signal received");
                cancel_for_signal.cancel();
            }
            Err(e) => tracing::error!("Failed to listen for ctrl-c: {}", e),
        }
    });

    serve(&config, listener, cancel).await
}
