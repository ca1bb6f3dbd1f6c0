#![allow(dead_code)]
//! Entry point. Loads configuration, connects the database and Redis,
//! builds the LLM/embedding/metadata collaborators, then starts the web
//! server and the background orchestrator + worker pool concurrently.
//!
//! The web server binds and starts serving before the orchestrator tick
//! loop or worker consumers have run a single iteration — there is no
//! slow model load to wait out here (unlike the teacher's BERTimbau
//! warm-up), but keeping request-serving independent of background-task
//! startup still means a slow Redis connection never delays `/health`.

mod chat;
mod chunker;
mod config;
mod db;
mod error;
mod extract;
mod feed;
mod jobs;
mod knowledge;
mod library;
mod llm;
mod metadata;
mod orchestrator;
mod pipeline;
mod reading;
mod recommendations;
mod retrieval;
mod topics;
mod web;
mod worker;

use std::sync::Arc;

use anyhow::Result;
use parking_lot::{Mutex, RwLock};
use tokio::sync::broadcast;
use tracing_subscriber::EnvFilter;

use crate::config::{ModelRegistry, Settings};
use crate::llm::openrouter::OpenRouterClient;
use crate::llm::embedding::HttpEmbeddingClient;
use crate::metadata::GoogleBooksClient;
use crate::web::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = Settings::load()?;
    tracing::info!(api_host = %settings.api_host, api_port = settings.api_port, "starting");

    let db = db::connect(&settings.database_url).await?;
    tracing::info!("database connected, migrations applied");

    let redis_client = redis::Client::open(settings.redis_url.clone())?;
    let redis = redis::aio::ConnectionManager::new(redis_client).await?;

    let model_registry = Arc::new(ModelRegistry::new(settings.default_model.clone()));
    let llm = Arc::new(OpenRouterClient::new(settings.openrouter_api_key.clone(), model_registry.clone()));
    let embedder = Arc::new(HttpEmbeddingClient::new(settings.embedding_base_url.clone(), settings.embedding_model.clone()));
    let metadata = Arc::new(GoogleBooksClient::new());

    let covers_dir = std::path::PathBuf::from(&settings.covers_path);
    tokio::fs::create_dir_all(&covers_dir).await.ok();

    let (processing_tx, _) = broadcast::channel(256);
    let processing_tx = Arc::new(processing_tx);

    let settings_lock = Arc::new(RwLock::new(settings.clone()));

    let state = AppState {
        db: db.clone(),
        llm,
        embedder,
        metadata,
        model_registry,
        settings: settings_lock.clone(),
        redis,
        covers_dir: covers_dir.clone(),
        processing_tx,
        scan_tasks: Arc::new(Mutex::new(std::collections::HashMap::new())),
    };

    let pipeline_ctx = state.pipeline_context();
    let app = web::create_router(state);

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);

    let redis_url = settings.redis_url.clone();
    let intensity_settings = settings_lock.clone();
    let orchestrator_handle = tokio::spawn(orchestrator::run(
        db.clone(),
        redis_url.clone(),
        move || intensity_settings.read().orchestrator_intensity,
        shutdown_rx.clone(),
    ));

    let worker_redis_url = redis_url.clone();
    let worker_handle =
        tokio::spawn(async move { worker::run(&worker_redis_url, pipeline_ctx, shutdown_rx.clone()).await });

    let addr = format!("{}:{}", settings.api_host, settings.api_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "server listening");

    let serve_result = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await;

    let _ = shutdown_tx.send(true);
    let _ = orchestrator_handle.await;
    let _ = worker_handle.await;

    serve_result?;
    Ok(())
}
