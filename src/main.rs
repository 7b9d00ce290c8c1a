use anyhow::Result;
use axum::Router;
use std::{fs, io::ErrorKind, path::Path, sync::Arc};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

mod config;
mod errors;
mod handlers;
mod models;
mod routes;
mod services;
mod storage;

use services::AppState;
use storage::{HttpBlobStore, LocalStore};

#[tokio::main]
async fn main() -> Result<()> {
    // --- Logging setup ---
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // --- Parse config ---
    let cfg = config::AppConfig::from_env_and_args()?;

    tracing::info!("Starting media-store with config: {:?}", cfg);

    // --- Ensure the managed static subtree exists ---
    let uploads_dir = Path::new(&cfg.static_root).join(services::paths::ROOT_PREFIX);
    if !uploads_dir.exists() {
        fs::create_dir_all(&uploads_dir)?;
        tracing::info!(
            "Created static uploads directory at {}",
            uploads_dir.display()
        );
    }

    // --- Initialize backends + services ---
    let blob = Arc::new(HttpBlobStore::new(
        &cfg.storage_url,
        &cfg.storage_key,
        &cfg.bucket,
    ));
    let local = LocalStore::new(&cfg.static_root);
    let state = AppState::new(blob, local);

    // --- Build router ---
    let app: Router = routes::routes::routes().with_state(state);

    // --- Start server ---
    let addr = cfg.addr();
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err)
            if err.kind() == ErrorKind::PermissionDenied
                && matches!(cfg.host.as_str(), "0.0.0.0" | "::") =>
        {
            let fallback_addr = format!("127.0.0.1:{}", cfg.port);
            tracing::warn!(
                "Permission denied binding to {} ({}). Falling back to {}",
                addr,
                err,
                fallback_addr
            );
            TcpListener::bind(&fallback_addr).await?
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!("Server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
