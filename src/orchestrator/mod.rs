//! Orchestrator Brain (spec §4.F): a periodic ticker that, on each wake,
//! scans the database in strict priority order and dispatches at most one
//! action. Cadence is driven by `OrchestratorIntensity`; `Paused` means no
//! dispatch at all.

use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect};

use crate::config::OrchestratorIntensity;
use crate::db::entities::*;
use crate::worker::{self, Task};

const MAX_REFINEMENT_LEVEL: i32 = 3;
const UNREAD_FEED_FLOOR: u64 = 5;
const INTERMEDIATE_STATUSES: &[&str] = &[book::status::EXTRACTING, book::status::CHUNKING, book::status::EMBEDDING];

/// Runs the tick loop until `shutdown` resolves. Each tick's cadence is
/// re-read from `intensity` so a config change takes effect on the next
/// sleep without a restart.
pub async fn run(
    db: DatabaseConnection,
    redis_url: String,
    intensity: impl Fn() -> OrchestratorIntensity + Send + 'static,
    mut shutdown: tokio::sync::watch::Receiver<bool>,
) -> anyhow::Result<()> {
    let client = redis::Client::open(redis_url)?;
    let mut redis = redis::aio::ConnectionManager::new(client).await?;

    loop {
        let Some(interval) = intensity().tick_seconds() else {
            // Paused: still observe shutdown, re-check intensity periodically.
            tokio::select! {
                _ = tokio::time::sleep(std::time::Duration::from_secs(30)) => continue,
                _ = shutdown.changed() => return Ok(()),
            }
        };

        tokio::select! {
            _ = tokio::time::sleep(std::time::Duration::from_secs(interval)) => {}
            _ = shutdown.changed() => return Ok(()),
        }

        if let Err(e) = tick(&db, &mut redis).await {
            tracing::error!(error = %e, "orchestrator tick failed");
        }
    }
}

/// Runs exactly one priority scan and dispatch. Exposed standalone for
/// tests and for a manual `/config` trigger.
pub async fn tick(db: &DatabaseConnection, redis: &mut redis::aio::ConnectionManager) -> anyhow::Result<()> {
    if let Some(book) = find_pending_book(db).await? {
        tracing::info!(book_id = book.id, "orchestrator: dispatching process_book");
        worker::dispatch(redis, Task::ProcessBook { book_id: book.id }).await?;
        return Ok(());
    }

    if let Some(book) = find_stuck_book(db).await? {
        tracing::info!(book_id = book.id, status = %book.processing_status, "orchestrator: dispatching resume_processing");
        worker::dispatch(
            redis,
            Task::ResumeProcessing { book_id: book.id, status: book.processing_status.clone() },
        )
        .await?;
        return Ok(());
    }

    if let Some((book_id, pass_level)) = find_refinement_candidate(db).await? {
        tracing::info!(book_id, pass_level, "orchestrator: dispatching refine_insights");
        worker::dispatch(redis, Task::RefineInsights { book_id, pass_level }).await?;
        return Ok(());
    }

    if unread_feed_count(db).await? < UNREAD_FEED_FLOOR {
        tracing::info!("orchestrator: dispatching generate_feed");
        worker::dispatch(redis, Task::GenerateFeed).await?;
        return Ok(());
    }

    if let Some(book) = find_enrichment_candidate(db).await? {
        tracing::info!(book_id = book.id, "orchestrator: dispatching enrich_book");
        worker::dispatch(redis, Task::EnrichBook { book_id: book.id }).await?;
        return Ok(());
    }

    Ok(())
}

async fn find_pending_book(db: &DatabaseConnection) -> anyhow::Result<Option<Book>> {
    Ok(BookEntity::find()
        .filter(BookColumn::ProcessingStatus.eq(book::status::PENDING))
        .order_by_asc(BookColumn::CreatedAt)
        .one(db)
        .await?)
}

async fn find_stuck_book(db: &DatabaseConnection) -> anyhow::Result<Option<Book>> {
    Ok(BookEntity::find()
        .filter(BookColumn::ProcessingStatus.is_in(INTERMEDIATE_STATUSES.to_vec()))
        .order_by_asc(BookColumn::UpdatedAt)
        .one(db)
        .await?)
}

async fn find_refinement_candidate(db: &DatabaseConnection) -> anyhow::Result<Option<(i32, i32)>> {
    let completed = BookEntity::find()
        .filter(BookColumn::ProcessingStatus.eq(book::status::COMPLETED))
        .order_by_asc(BookColumn::CreatedAt)
        .all(db)
        .await?;

    for b in completed {
        let max_level = BookInsightEntity::find()
            .filter(BookInsightColumn::BookId.eq(b.id))
            .order_by_desc(BookInsightColumn::RefinementLevel)
            .one(db)
            .await?
            .map(|i| i.refinement_level)
            .unwrap_or(0);

        if max_level < MAX_REFINEMENT_LEVEL {
            return Ok(Some((b.id, max_level + 1)));
        }
    }
    Ok(None)
}

async fn unread_feed_count(db: &DatabaseConnection) -> anyhow::Result<u64> {
    use sea_orm::PaginatorTrait;
    Ok(FeedItemEntity::find()
        .filter(FeedItemColumn::IsRead.eq(false))
        .count(db)
        .await?)
}

async fn find_enrichment_candidate(db: &DatabaseConnection) -> anyhow::Result<Option<Book>> {
    Ok(BookEntity::find()
        .filter(BookColumn::ProcessingStatus.eq(book::status::COMPLETED))
        .filter(BookColumn::Description.is_null())
        .order_by_asc(BookColumn::CreatedAt)
        .one(db)
        .await?)
}
