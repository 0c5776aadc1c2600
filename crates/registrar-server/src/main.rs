//! Registrar server entry point.

use anyhow::Context;
use registrar_db::DbManager;
use registrar_server::config::Settings;
use registrar_server::{AppState, router, telemetry};
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();

    let settings = Settings::load().context("loading configuration")?;
    telemetry::init_tracing(&settings.logging);

    info!(version = env!("CARGO_PKG_VERSION"), "Starting registrar server");

    let db = DbManager::connect(&settings.database.to_db_config())
        .await
        .context("connecting to SurrealDB")?;
    registrar_db::run_migrations(db.client())
        .await
        .context("running migrations")?;
    info!(schema_version = registrar_db::latest_version(), "Migrations complete");

    let state = AppState::new(db.client().clone(), settings.auth_config())
        .context("initialising authentication")?;

    let addr = settings.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, "Listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    db.shutdown().await;
    info!("Registrar server stopped");
    Ok(())
}

/// Resolve on SIGINT or SIGTERM. A handler that cannot be installed
/// never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
