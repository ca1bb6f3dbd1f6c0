//! Shared Axum application state. A single construction-time struct,
//! cloned per request (spec §9 — process-wide singletons owned by the
//! application root and passed to components via construction).

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use sea_orm::DatabaseConnection;
use tokio::sync::broadcast;

use crate::config::{ModelRegistry, Settings};
use crate::library::ImportSummary;
use crate::llm::{EmbeddingClient, LlmClient};
use crate::metadata::MetadataClient;
use crate::pipeline::PipelineContext;
use crate::web::events::ProcessingEvent;

#[derive(Clone, Debug)]
pub enum ScanTaskStatus {
    Running,
    Done(ImportSummary),
    Failed(String),
}

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub llm: Arc<dyn LlmClient>,
    pub embedder: Arc<dyn EmbeddingClient>,
    pub metadata: Arc<dyn MetadataClient>,
    pub model_registry: Arc<ModelRegistry>,
    pub settings: Arc<parking_lot::RwLock<Settings>>,
    pub redis: redis::aio::ConnectionManager,
    pub covers_dir: std::path::PathBuf,
    pub processing_tx: Arc<broadcast::Sender<ProcessingEvent>>,
    pub scan_tasks: Arc<Mutex<HashMap<String, ScanTaskStatus>>>,
}

impl AppState {
    pub fn pipeline_context(&self) -> PipelineContext {
        PipelineContext {
            db: self.db.clone(),
            llm: self.llm.clone(),
            embedder: self.embedder.clone(),
            metadata: self.metadata.clone(),
            covers_dir: self.covers_dir.clone(),
        }
    }
}
