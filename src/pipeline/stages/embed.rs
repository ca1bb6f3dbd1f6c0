//! Embed stage (spec §4.C). Selects chunks with a null embedding ordered
//! by `chunk_index`, embeds in batches, writes vectors back through raw
//! SQL (pgvector has no sea-orm column type), and commits progress after
//! every batch so it is observable mid-run. Schedules Insights pass 1.

use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    Set, Statement,
};

use crate::db::entities::*;
use crate::db::vector::to_pgvector_literal;
use crate::llm::EmbeddingClient;
use crate::pipeline::{load_book, set_book_status, PipelineContext};

const DEFAULT_BATCH_SIZE: usize = 64;

pub async fn run(ctx: &PipelineContext, book_id: i32) -> anyhow::Result<()> {
    let Some(job) = crate::jobs::claim(&ctx.db, book_id, processing_job::stage::EMBED, None).await? else {
        return Ok(());
    };

    if load_book(ctx, book_id).await?.is_none() {
        crate::jobs::mark(&ctx.db, &job, processing_job::status::FAILED, Some("book not found".into())).await?;
        return Ok(());
    }

    set_book_status(ctx, book_id, book::status::EMBEDDING).await?;

    match do_embed(ctx, book_id).await {
        Ok(()) => {
            crate::jobs::mark(&ctx.db, &job, processing_job::status::COMPLETED, None).await?;
            Box::pin(super::insights::run(ctx, book_id, 1)).await?;
        }
        Err(e) => {
            tracing::error!(book_id, error = %e, "embed stage failed");
            crate::jobs::mark(&ctx.db, &job, processing_job::status::FAILED, Some(e.to_string())).await?;
            // Embed is not a required stage (spec §4.C point 4): the book stays
            // in `embedding` so the Orchestrator's resume rule can retry it.
        }
    }

    Ok(())
}

async fn do_embed(ctx: &PipelineContext, book_id: i32) -> anyhow::Result<()> {
    let total = BookChunkEntity::find()
        .filter(BookChunkColumn::BookId.eq(book_id))
        .count(&ctx.db)
        .await?;

    if total == 0 {
        return Ok(());
    }

    let mut embedded: u64 = total
        - BookChunkEntity::find()
            .filter(BookChunkColumn::BookId.eq(book_id))
            .filter(BookChunkColumn::HasEmbedding.eq(false))
            .count(&ctx.db)
            .await?;

    loop {
        let batch = BookChunkEntity::find()
            .filter(BookChunkColumn::BookId.eq(book_id))
            .filter(BookChunkColumn::HasEmbedding.eq(false))
            .order_by_asc(BookChunkColumn::ChunkIndex)
            .limit(DEFAULT_BATCH_SIZE as u64)
            .all(&ctx.db)
            .await?;

        if batch.is_empty() {
            break;
        }

        let texts: Vec<String> = batch.iter().map(|c| c.content.clone()).collect();
        let vectors = ctx.embedder.embed(&texts).await?;

        for (chunk, vector) in batch.iter().zip(vectors.iter()) {
            ctx.db
                .execute(Statement::from_sql_and_values(
                    ctx.db.get_database_backend(),
                    "UPDATE book_chunk SET embedding = $1::vector, has_embedding = true WHERE id = $2",
                    [to_pgvector_literal(vector).into(), chunk.id.into()],
                ))
                .await?;
        }

        embedded += batch.len() as u64;
        let progress = ((embedded as f64 / total as f64) * 100.0).round() as i32;

        if let Some(book) = load_book(ctx, book_id).await? {
            let mut active: BookActiveModel = book.into();
            active.processing_progress = Set(progress);
            active.updated_at = Set(chrono::Utc::now().into());
            sea_orm::ActiveModelTrait::update(active, &ctx.db).await?;
        }
    }

    Ok(())
}
