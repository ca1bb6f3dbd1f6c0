//! Chunk stage (spec §4.C). Re-extracts in-memory (no raw page text is
//! stored), deletes and re-inserts chunks so the stage is idempotent
//! (S5), and stamps per-chunk FTS vectors. Schedules Embed on success.

use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, Set};

use crate::chunker::{chunk_pages, Page};
use crate::db::entities::*;
use crate::pipeline::{load_book, set_book_status, PipelineContext};

pub async fn run(ctx: &PipelineContext, book_id: i32) -> anyhow::Result<()> {
    let Some(job) = crate::jobs::claim(&ctx.db, book_id, processing_job::stage::CHUNK, None).await? else {
        return Ok(());
    };

    let Some(book) = load_book(ctx, book_id).await? else {
        crate::jobs::mark(&ctx.db, &job, processing_job::status::FAILED, Some("book not found".into())).await?;
        return Ok(());
    };

    set_book_status(ctx, book_id, book::status::CHUNKING).await?;

    match do_chunk(ctx, &book).await {
        Ok(()) => {
            crate::jobs::mark(&ctx.db, &job, processing_job::status::COMPLETED, None).await?;
            set_book_status(ctx, book_id, book::status::EMBEDDING).await?;
            Box::pin(super::embed::run(ctx, book_id)).await?;
        }
        Err(e) => {
            tracing::error!(book_id, error = %e, "chunk stage failed");
            crate::jobs::mark(&ctx.db, &job, processing_job::status::FAILED, Some(e.to_string())).await?;
            set_book_status(ctx, book_id, book::status::FAILED).await?;
        }
    }

    Ok(())
}

async fn do_chunk(ctx: &PipelineContext, book: &Book) -> anyhow::Result<()> {
    let file = BookFileEntity::find()
        .filter(BookFileColumn::BookId.eq(book.id))
        .one(&ctx.db)
        .await?
        .ok_or_else(|| anyhow::anyhow!("no BookFile for book {}", book.id))?;

    let path = std::path::PathBuf::from(&file.file_path);
    let file_type = file.file_type.clone();
    let extracted = tokio::task::spawn_blocking(move || {
        let extractor = crate::extract::for_file_type(&file_type);
        extractor.extract(&path)
    })
    .await??;

    let pages: Vec<Page> = extracted
        .pages
        .into_iter()
        .map(|p| Page {
            text: p.text,
            page_number: p.page_number,
            chapter: p.chapter,
        })
        .collect();

    let chunks = chunk_pages(&pages, crate::chunker::DEFAULT_CHUNK_SIZE, crate::chunker::DEFAULT_CHUNK_OVERLAP, 0);

    BookChunkEntity::delete_many()
        .filter(BookChunkColumn::BookId.eq(book.id))
        .exec(&ctx.db)
        .await?;

    for c in chunks {
        sea_orm::ActiveModelTrait::insert(
            BookChunkActiveModel {
                book_id: Set(book.id),
                chunk_index: Set(c.chunk_index),
                content: Set(c.content),
                page_number: Set(c.page_number),
                chapter: Set(c.chapter),
                token_count: Set(c.token_count),
                has_embedding: Set(false),
                ..Default::default()
            },
            &ctx.db,
        )
        .await?;
    }

    Ok(())
}
