//! Worker Pool (spec §4.E): named Redis-backed queues — `processing`
//! (extract, chunk) and `llm` (insights, enrichment, feed, topic) — each
//! with bounded concurrency. Delivery is at-least-once; the job-row
//! `claim` in `jobs` guards against duplicate execution, so workers
//! never need their own dedup.
//!
//! Embed has no queue of its own: the chunk stage chains straight into it
//! in-process (`Box::pin(super::embed::run)` in `pipeline/stages/chunk.rs`),
//! so it runs under the `processing` queue's concurrency cap rather than an
//! independent one.

use std::sync::Arc;

use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;

use crate::pipeline::PipelineContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Queue {
    Processing,
    Llm,
}

impl Queue {
    fn key(self) -> &'static str {
        match self {
            Queue::Processing => "bookflix:queue:processing",
            Queue::Llm => "bookflix:queue:llm",
        }
    }

    /// Recommended default concurrency per queue (spec §4.E).
    fn default_concurrency(self) -> usize {
        match self {
            Queue::Processing => 2,
            Queue::Llm => 4,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum Task {
    ProcessBook { book_id: i32 },
    ResumeProcessing { book_id: i32, status: String },
    RefineInsights { book_id: i32, pass_level: i32 },
    EnrichBook { book_id: i32 },
    GenerateFeed,
    RebuildTopics,
}

impl Task {
    fn queue(&self) -> Queue {
        match self {
            Task::ProcessBook { .. } | Task::ResumeProcessing { .. } => Queue::Processing,
            Task::RefineInsights { .. } | Task::EnrichBook { .. } | Task::GenerateFeed | Task::RebuildTopics => {
                Queue::Llm
            }
        }
    }
}

/// Pushes a task onto its named queue. Called by the orchestrator and by
/// the library import flow; never invokes pipeline code directly.
pub async fn dispatch(redis: &mut redis::aio::ConnectionManager, task: Task) -> anyhow::Result<()> {
    let payload = serde_json::to_string(&task)?;
    redis.rpush::<_, _, ()>(task.queue().key(), payload).await?;
    Ok(())
}

/// Runs one blocking-pop consumer loop per queue, bounded by a semaphore,
/// until `shutdown` resolves. Spawn from `main` as a background task set.
pub async fn run(
    redis_url: &str,
    ctx: PipelineContext,
    mut shutdown: tokio::sync::watch::Receiver<bool>,
) -> anyhow::Result<()> {
    let queues = [Queue::Processing, Queue::Llm];
    let mut handles = Vec::new();

    for queue in queues {
        let redis_url = redis_url.to_string();
        let ctx = ctx.clone();
        let mut shutdown = shutdown.clone();
        handles.push(tokio::spawn(async move {
            if let Err(e) = consume_queue(&redis_url, queue, ctx, &mut shutdown).await {
                tracing::error!(?queue, error = %e, "worker queue consumer exited with error");
            }
        }));
    }

    shutdown.changed().await.ok();
    for h in handles {
        h.abort();
    }
    Ok(())
}

async fn consume_queue(
    redis_url: &str,
    queue: Queue,
    ctx: PipelineContext,
    shutdown: &mut tokio::sync::watch::Receiver<bool>,
) -> anyhow::Result<()> {
    let client = redis::Client::open(redis_url)?;
    let mut conn = client.get_multiplexed_async_connection().await?;
    let semaphore = Arc::new(Semaphore::new(queue.default_concurrency()));

    loop {
        if *shutdown.borrow() {
            return Ok(());
        }

        let popped: Option<(String, String)> = conn.blpop(queue.key(), 5.0).await?;
        let Some((_, payload)) = popped else {
            continue;
        };

        let task: Task = match serde_json::from_str(&payload) {
            Ok(t) => t,
            Err(e) => {
                tracing::error!(error = %e, "dropping malformed task payload");
                continue;
            }
        };

        let permit = semaphore.clone().acquire_owned().await?;
        let ctx = ctx.clone();
        tokio::spawn(async move {
            let _permit = permit;
            if let Err(e) = execute(&ctx, task).await {
                tracing::error!(error = %e, "task execution failed");
            }
        });
    }
}

async fn execute(ctx: &PipelineContext, task: Task) -> anyhow::Result<()> {
    match task {
        Task::ProcessBook { book_id } => crate::pipeline::process_book(ctx, book_id).await,
        Task::ResumeProcessing { book_id, status } => {
            crate::pipeline::resume_processing(ctx, book_id, &status).await
        }
        Task::RefineInsights { book_id, pass_level } => {
            crate::pipeline::refine_insights(ctx, book_id, pass_level).await
        }
        Task::EnrichBook { book_id } => crate::pipeline::enrich_book(ctx, book_id).await,
        Task::GenerateFeed => crate::feed::generate_feed(ctx).await,
        Task::RebuildTopics => crate::topics::rebuild(ctx).await,
    }
}
