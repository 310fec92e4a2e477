mod api;
mod config;

use api::{
    clean_handler, export_counts_handler, export_full_handler, generate_handler,
    import_counts_handler, import_full_handler, reset_handler, state_handler, AppState,
};
use axum::routing::{get, post};
use axum::Router;
use config::Config;
use fairdraw_core::Session;
use parking_lot::Mutex;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    let config = if Path::new("config.toml").exists() {
        match Config::load(Path::new("config.toml")) {
            Ok(c) => {
                tracing::info!("loaded config from config.toml");
                c
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to load config.toml, using defaults");
                Config::default_config()
            }
        }
    } else {
        tracing::info!("no config.toml found, using defaults");
        Config::default_config()
    };

    let mut session = Session::new();
    restore_state_file(&mut session, &config);

    let state = Arc::new(AppState {
        session: Mutex::new(session),
    });

    let router = Router::new()
        .route("/api/generate", post(generate_handler))
        .route("/api/reset", post(reset_handler))
        .route("/api/clean", post(clean_handler))
        .route("/api/state", get(state_handler))
        .route(
            "/api/progress/counts",
            get(export_counts_handler).post(import_counts_handler),
        )
        .route(
            "/api/progress/full",
            get(export_full_handler).post(import_full_handler),
        )
        .with_state(state);

    let listen_addr = config.server.listen_addr.clone();
    tracing::info!(listen = %listen_addr, "batch server starting");

    let listener = tokio::net::TcpListener::bind(&listen_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind to {listen_addr}: {e}"));

    let serve = axum::serve(listener, router).with_graceful_shutdown(shutdown_signal());
    if let Err(e) = serve.await {
        tracing::error!(error = %e, "server error");
    }

    tracing::info!("batch server shut down");
}

/// Restore a full-progress snapshot at startup when the config names one.
/// A missing or malformed file is logged and skipped; the session starts
/// fresh.
fn restore_state_file(session: &mut Session, config: &Config) {
    let Some(path) = &config.session.state_file else {
        return;
    };
    match std::fs::read_to_string(path) {
        Ok(text) => match session.import_full(&text) {
            Ok(full) => {
                tracing::info!(
                    path = %path.display(),
                    entries = full.table.len(),
                    "restored progress from state file"
                );
            }
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "state file rejected, starting fresh");
            }
        },
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "could not read state file, starting fresh");
        }
    }
}

/// Listen for SIGINT (Ctrl+C) or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("SIGTERM handler");
        tokio::select! {
            _ = ctrl_c => {},
            _ = sigterm.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
    }

    tracing::info!("shutdown signal received, draining connections...");
}
