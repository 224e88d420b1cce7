//! HTTP surface for UK mobile coverage checks.
//!
//! Exposes `/health`, a single-postcode lookup and a bounded bulk lookup
//! over a [`coverage_core::CoverageChecker`] that combines postcodes.io with
//! the local Ofcom store.
#![forbid(unsafe_code)]

use std::{net::SocketAddr, sync::Arc};

use axum::Router;
use coverage_core::CoverageChecker;
use coverage_data::{DatasetManager, HttpGeoLookup, HttpGeoLookupConfig};
use log::{info, warn};
use tokio::net::TcpListener;

pub mod api;
mod config;
mod error;

pub use api::{MAX_BULK_POSTCODES, SERVICE_NAME, build_app};
pub use config::{DEFAULT_ADDR, ServerArgs, ServerConfig};
pub use error::ServerError;

/// Start the server and block until it shuts down.
///
/// # Errors
///
/// Returns [`ServerError`] when configuration cannot be resolved, the
/// geocoder or runtime cannot be built, or the listener fails.
pub fn run(args: ServerArgs) -> Result<(), ServerError> {
    let config = ServerConfig::try_from(args)?;
    let geocoder = HttpGeoLookup::with_config(HttpGeoLookupConfig::new(
        config.geocoder_url.clone(),
    ))
    .map_err(|source| ServerError::BuildGeocoder {
        base_url: config.geocoder_url.clone(),
        source,
    })?;
    let manager = DatasetManager::new(config.data_dir.clone());
    if !manager.store_path().is_file() {
        warn!(
            "No coverage store at {}; run `mobile-coverage setup` first",
            manager.store_path()
        );
    }
    let checker = Arc::new(CoverageChecker::new(geocoder, manager));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(ServerError::BuildRuntime)?;
    let outcome = runtime.block_on(serve(config.addr, build_app(Arc::clone(&checker))));
    // The geocoder owns a runtime, which must not be dropped inside another.
    drop(runtime);
    drop(checker);
    outcome
}

async fn serve(addr: SocketAddr, app: Router) -> Result<(), ServerError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;
    info!("{SERVICE_NAME} listening on http://{addr}");
    info!("  GET  /health");
    info!("  GET  /api/mobile/{{postcode}}");
    info!("  POST /api/mobile/bulk");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ServerError::Serve)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for ctrl-c: {err}");
        std::future::pending::<()>().await;
    }
    info!("received shutdown signal, starting graceful shutdown");
}
