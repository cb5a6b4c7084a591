use anyhow::Result;
use axum::{ServiceExt, extract::Request};
use sqlx::postgres::PgPoolOptions;
use std::{fs, io::ErrorKind, path::Path, sync::Arc};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

mod config;
mod errors;
mod handlers;
mod middleware;
mod models;
mod routes;
mod services;
mod state;

use services::{
    cloudinary::CloudinaryClient, session::TokenSessionResolver,
    storage_adapter::MediaStorageAdapter,
};

#[tokio::main]
async fn main() -> Result<()> {
    // --- Logging setup ---
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // --- Parse config + migrate flag ---
    let (cfg, migrate) = config::AppConfig::from_env_and_args()?;

    tracing::info!("Starting hecta-cms with config: {:?}", cfg);

    if cfg.database_url.is_empty() {
        anyhow::bail!("DATABASE_URI is not set");
    }
    if cfg.secret.is_empty() {
        tracing::warn!("PAYLOAD_SECRET is empty; session tokens are signed with an empty key");
    }
    if !cfg.cloudinary.is_configured() {
        tracing::warn!("Cloudinary credentials are incomplete; media uploads will fail");
    }

    // --- Initialize Postgres connection ---
    let db: Arc<sqlx::PgPool> = Arc::new(
        PgPoolOptions::new()
            .max_connections(5)
            .connect(&cfg.database_url)
            .await?,
    );

    // --- Handle migration mode ---
    if migrate {
        run_migrations(&db).await?;
        tracing::info!("Database migration complete.");
        return Ok(()); // exit after migration
    }

    // --- Initialize storage adapter + session resolver ---
    let cfg = Arc::new(cfg);
    let store = Arc::new(CloudinaryClient::new(cfg.cloudinary.clone()));
    let adapter = MediaStorageAdapter::new(
        store,
        cfg.upload_failure,
        cfg.cloudinary.delivery_root(),
    );
    tracing::info!("Media upload failure policy: {}", adapter.on_failure());
    let sessions = Arc::new(TokenSessionResolver::new(&cfg.secret));

    // --- Build router ---
    let state = state::AppState::new(cfg.clone(), db, adapter, sessions);
    let app = routes::routes::app(state);

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
    axum::serve(listener, ServiceExt::<Request>::into_make_service(app)).await?;

    Ok(())
}

/// Run Postgres migrations manually from the bundled SQL file.
async fn run_migrations(db: &Arc<sqlx::PgPool>) -> Result<()> {
    let path = "migrations/0001_init.sql";

    if !Path::new(path).exists() {
        anyhow::bail!("Migration file not found: {}", path);
    }

    let sql = fs::read_to_string(path)?;
    let statements = sql
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>();

    tracing::info!("Running {} migration statements...", statements.len());

    for stmt in statements {
        tracing::debug!("Executing migration SQL: {}", stmt);
        sqlx::query(stmt).execute(&**db).await?;
    }

    Ok(())
}
