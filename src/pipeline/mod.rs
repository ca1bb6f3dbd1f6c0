//! Pipeline Coordinator: owns the stage graph `extract -> chunk -> embed ->
//! insights_pass_1 -> enrichment`, with out-of-band refinement edges
//! `insights_pass_1 -> insights_pass_2 -> insights_pass_3` driven only by
//! the orchestrator (spec §4.D).

pub mod stages;

use std::sync::Arc;

use sea_orm::{DatabaseConnection, EntityTrait, Set};

use crate::db::entities::{Book, BookActiveModel, BookEntity};
use crate::llm::{EmbeddingClient, LlmClient};
use crate::metadata::MetadataClient;

/// Shared handles every stage executor needs. Constructed once at startup
/// and cloned cheaply (all fields are `Arc`s) into each dispatch.
#[derive(Clone)]
pub struct PipelineContext {
    pub db: DatabaseConnection,
    pub llm: Arc<dyn LlmClient>,
    pub embedder: Arc<dyn EmbeddingClient>,
    pub metadata: Arc<dyn MetadataClient>,
    pub covers_dir: std::path::PathBuf,
}

/// Public entry point: dispatches the first stage. Safe to call repeatedly
/// for the same book — each executor is idempotent within an attempt.
pub async fn process_book(ctx: &PipelineContext, book_id: i32) -> anyhow::Result<()> {
    stages::extract::run(ctx, book_id).await
}

/// Re-invokes the stage matching a book's current intermediate status.
/// Idempotency holds because extract/chunk/embed all recompute from
/// scratch rather than resuming partial state.
pub async fn resume_processing(ctx: &PipelineContext, book_id: i32, status: &str) -> anyhow::Result<()> {
    use crate::db::entities::book::status as book_status;
    match status {
        s if s == book_status::EXTRACTING => stages::extract::run(ctx, book_id).await,
        s if s == book_status::CHUNKING => stages::chunk::run(ctx, book_id).await,
        s if s == book_status::EMBEDDING => stages::embed::run(ctx, book_id).await,
        _ => stages::extract::run(ctx, book_id).await,
    }
}

/// Orchestrator-only edge: runs an additional insight pass at `pass_level`.
pub async fn refine_insights(ctx: &PipelineContext, book_id: i32, pass_level: i32) -> anyhow::Result<()> {
    stages::insights::run(ctx, book_id, pass_level).await
}

pub async fn enrich_book(ctx: &PipelineContext, book_id: i32) -> anyhow::Result<()> {
    stages::enrichment::run(ctx, book_id).await
}

/// Stamps `Book.processing_status`. Every stage executor calls this at
/// entry (to its own stage name) and on success (to the next stage or
/// `completed`) per the common envelope (spec §4.C).
pub(crate) async fn set_book_status(ctx: &PipelineContext, book_id: i32, status: &str) -> anyhow::Result<()> {
    let Some(book) = BookEntity::find_by_id(book_id).one(&ctx.db).await? else {
        return Ok(());
    };
    let mut active: BookActiveModel = book.into();
    active.processing_status = Set(status.to_string());
    active.updated_at = Set(chrono::Utc::now().into());
    sea_orm::ActiveModelTrait::update(active, &ctx.db).await?;
    Ok(())
}

pub(crate) async fn load_book(ctx: &PipelineContext, book_id: i32) -> anyhow::Result<Option<Book>> {
    Ok(BookEntity::find_by_id(book_id).one(&ctx.db).await?)
}
