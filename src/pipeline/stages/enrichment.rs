//! Enrichment stage (spec §4.C). Queries the external metadata capability,
//! persists the raw payload unconditionally, and fills Book fields only
//! where currently empty (S7, SPEC_FULL §B.7 decision 1 — including
//! `rating`). A provider miss is a `completed` outcome, not a failure.

use sea_orm::Set;

use crate::db::entities::*;
use crate::pipeline::{load_book, PipelineContext};

const COVER_FETCH_TIMEOUT_SECS: u64 = 15;

pub async fn run(ctx: &PipelineContext, book_id: i32) -> anyhow::Result<()> {
    let Some(job) = crate::jobs::claim(&ctx.db, book_id, processing_job::stage::ENRICHMENT, None).await? else {
        return Ok(());
    };

    let Some(book) = load_book(ctx, book_id).await? else {
        crate::jobs::mark(&ctx.db, &job, processing_job::status::FAILED, Some("book not found".into())).await?;
        return Ok(());
    };

    match do_enrich(ctx, &book).await {
        Ok(()) => {
            crate::jobs::mark(&ctx.db, &job, processing_job::status::COMPLETED, None).await?;
        }
        Err(e) => {
            tracing::error!(book_id, error = %e, "enrichment stage failed");
            crate::jobs::mark(&ctx.db, &job, processing_job::status::FAILED, Some(e.to_string())).await?;
        }
    }

    Ok(())
}

async fn do_enrich(ctx: &PipelineContext, book: &Book) -> anyhow::Result<()> {
    let result = ctx.metadata.lookup(&book.title, book.author.as_deref()).await?;

    let Some(metadata) = result else {
        return Ok(());
    };

    sea_orm::ActiveModelTrait::insert(
        ExternalMetadataActiveModel {
            book_id: Set(book.id),
            raw_payload: Set(metadata.raw.clone()),
            created_at: Set(chrono::Utc::now().into()),
            ..Default::default()
        },
        &ctx.db,
    )
    .await?;

    let mut active: BookActiveModel = book.clone().into();
    let mut dirty = false;

    if book.description.is_none() {
        if let Some(v) = &metadata.description {
            active.description = Set(Some(v.clone()));
            dirty = true;
        }
    }
    if book.isbn.is_none() {
        if let Some(v) = &metadata.isbn_13 {
            active.isbn = Set(Some(v.clone()));
            dirty = true;
        }
    }
    if book.publisher.is_none() {
        if let Some(v) = &metadata.publisher {
            active.publisher = Set(Some(v.clone()));
            dirty = true;
        }
    }
    if book.published_date.is_none() {
        if let Some(v) = &metadata.published_date {
            active.published_date = Set(Some(v.clone()));
            dirty = true;
        }
    }
    if book.page_count.is_none() {
        if let Some(v) = metadata.page_count {
            active.page_count = Set(Some(v));
            dirty = true;
        }
    }
    if book.rating.is_none() {
        if let Some(v) = metadata.rating {
            active.rating = Set(Some(v));
            dirty = true;
        }
    }

    if dirty {
        active.updated_at = Set(chrono::Utc::now().into());
        sea_orm::ActiveModelTrait::update(active, &ctx.db).await?;
    }

    if book.cover_path.is_none() {
        if let Some(url) = &metadata.thumbnail_url {
            if let Err(e) = fetch_and_save_cover(ctx, book.id, url).await {
                tracing::warn!(book_id = book.id, error = %e, "cover fetch from metadata thumbnail failed");
            }
        }
    }

    Ok(())
}

async fn fetch_and_save_cover(ctx: &PipelineContext, book_id: i32, url: &str) -> anyhow::Result<()> {
    let http = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(COVER_FETCH_TIMEOUT_SECS))
        .build()?;
    let bytes = http.get(url).send().await?.error_for_status()?.bytes().await?;
    let filename = crate::extract::cover::resize_and_save(&ctx.covers_dir, book_id, &bytes)?;

    if let Some(book) = load_book(ctx, book_id).await? {
        let mut active: BookActiveModel = book.into();
        active.cover_path = Set(Some(filename));
        active.updated_at = Set(chrono::Utc::now().into());
        sea_orm::ActiveModelTrait::update(active, &ctx.db).await?;
    }

    Ok(())
}
