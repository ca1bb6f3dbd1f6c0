//! Extract stage (spec §4.C). Reads the book's sole file, dispatches to
//! the PDF/EPUB extractor, updates title/author only if the book still
//! carries its filename-derived default, saves the cover, and stamps the
//! book-level FTS vector. Schedules Chunk on success.

use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set, Statement};

use crate::db::entities::*;
use crate::library::parse_filename;
use crate::pipeline::{load_book, set_book_status, PipelineContext};

const FTS_SAMPLE_BYTES: usize = 5 * 1024;

pub async fn run(ctx: &PipelineContext, book_id: i32) -> anyhow::Result<()> {
    let Some(job) = crate::jobs::claim(&ctx.db, book_id, processing_job::stage::EXTRACT, None).await? else {
        return Ok(());
    };

    let Some(book) = load_book(ctx, book_id).await? else {
        tracing::error!(book_id, "extract: book not found, cannot claim further");
        crate::jobs::mark(&ctx.db, &job, processing_job::status::FAILED, Some("book not found".into())).await?;
        return Ok(());
    };

    set_book_status(ctx, book_id, book::status::EXTRACTING).await?;

    let result = do_extract(ctx, &book).await;

    match result {
        Ok(()) => {
            crate::jobs::mark(&ctx.db, &job, processing_job::status::COMPLETED, None).await?;
            set_book_status(ctx, book_id, book::status::CHUNKING).await?;
            Box::pin(super::chunk::run(ctx, book_id)).await?;
        }
        Err(e) => {
            tracing::error!(book_id, error = %e, "extract stage failed");
            crate::jobs::mark(&ctx.db, &job, processing_job::status::FAILED, Some(e.to_string())).await?;
            set_book_status(ctx, book_id, book::status::FAILED).await?;
        }
    }

    Ok(())
}

async fn do_extract(ctx: &PipelineContext, book: &Book) -> anyhow::Result<()> {
    let file = BookFileEntity::find()
        .filter(BookFileColumn::BookId.eq(book.id))
        .one(&ctx.db)
        .await?
        .ok_or_else(|| anyhow::anyhow!("no BookFile for book {}", book.id))?;

    let path = std::path::PathBuf::from(&file.file_path);
    let file_type = file.file_type.clone();
    let extracted = {
        let path = path.clone();
        tokio::task::spawn_blocking(move || {
            let extractor = crate::extract::for_file_type(&file_type);
            extractor.extract(&path)
        })
        .await??
    };

    let parsed_default = parse_filename(&path);
    let title_is_default = book.title == parsed_default.title;

    let mut active: BookActiveModel = book.clone().into();
    if title_is_default {
        if let Some(title) = &extracted.title {
            active.title = Set(title.clone());
        }
        if let Some(author) = &extracted.author {
            active.author = Set(Some(author.clone()));
        }
    }
    active.page_count = Set(Some(extracted.pages.len() as i32));
    sea_orm::ActiveModelTrait::update(active, &ctx.db).await?;

    if let Some(cover_bytes) = &extracted.cover {
        match crate::extract::cover::resize_and_save(&ctx.covers_dir, book.id, cover_bytes) {
            Ok(filename) => {
                let mut active: BookActiveModel = BookEntity::find_by_id(book.id)
                    .one(&ctx.db)
                    .await?
                    .ok_or_else(|| anyhow::anyhow!("book disappeared mid-extract"))?
                    .into();
                active.cover_path = Set(Some(filename));
                sea_orm::ActiveModelTrait::update(active, &ctx.db).await?;
            }
            Err(e) => tracing::warn!(book_id = book.id, error = %e, "cover save failed, continuing"),
        }
    }

    let body: String = extracted.pages.iter().map(|p| p.text.as_str()).collect();
    let sample: String = body.chars().take(FTS_SAMPLE_BYTES).collect();
    let author = book.author.clone().unwrap_or_default();
    let fts_input = format!("{} {} {}", book.title, author, sample);

    ctx.db
        .execute(Statement::from_sql_and_values(
            ctx.db.get_database_backend(),
            r#"UPDATE book SET search_vector = to_tsvector('english', $1) WHERE id = $2"#,
            [fts_input.into(), book.id.into()],
        ))
        .await?;

    Ok(())
}
