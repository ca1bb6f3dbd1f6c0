//! Insights stage (spec §4.C). Pass 1 samples the first 20 chunks; passes
//! 2/3 sample 50. Issues three independent LLM calls (concepts,
//! frameworks, takeaways); a failure in one is logged and does not abort
//! the others (S6). Success, even partial, marks the book `completed`
//! and schedules Enrichment.

use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set};

use crate::db::entities::*;
use crate::llm::prompts;
use crate::llm::ChatMessage;
use crate::pipeline::{load_book, set_book_status, PipelineContext};

const PASS_1_SAMPLE: u64 = 20;
const PASS_2_3_SAMPLE: u64 = 50;
const CONTENT_LIMIT: usize = 50_000;
const DEFAULT_IMPORTANCE: i32 = 5;

pub async fn run(ctx: &PipelineContext, book_id: i32, pass_level: i32) -> anyhow::Result<()> {
    let stage = processing_job::stage::insights_pass(pass_level);
    let Some(job) = crate::jobs::claim(&ctx.db, book_id, stage, None).await? else {
        return Ok(());
    };

    let Some(book) = load_book(ctx, book_id).await? else {
        crate::jobs::mark(&ctx.db, &job, processing_job::status::FAILED, Some("book not found".into())).await?;
        return Ok(());
    };

    set_book_status(ctx, book_id, book::status::GENERATING_INSIGHTS).await?;

    match do_insights(ctx, &book, pass_level).await {
        Ok(()) => {
            crate::jobs::mark(&ctx.db, &job, processing_job::status::COMPLETED, None).await?;

            if let Some(b) = load_book(ctx, book_id).await? {
                let mut active: BookActiveModel = b.into();
                active.processing_status = Set(book::status::COMPLETED.to_string());
                active.processing_progress = Set(100);
                active.updated_at = Set(chrono::Utc::now().into());
                sea_orm::ActiveModelTrait::update(active, &ctx.db).await?;
            }

            if pass_level == 1 {
                Box::pin(super::enrichment::run(ctx, book_id)).await?;
            }
        }
        Err(e) => {
            tracing::error!(book_id, pass_level, error = %e, "insights stage failed outright");
            crate::jobs::mark(&ctx.db, &job, processing_job::status::FAILED, Some(e.to_string())).await?;
        }
    }

    Ok(())
}

async fn do_insights(ctx: &PipelineContext, book: &Book, pass_level: i32) -> anyhow::Result<()> {
    let sample_size = if pass_level == 1 { PASS_1_SAMPLE } else { PASS_2_3_SAMPLE };

    let chunks = BookChunkEntity::find()
        .filter(BookChunkColumn::BookId.eq(book.id))
        .order_by_asc(BookChunkColumn::ChunkIndex)
        .limit(sample_size)
        .all(&ctx.db)
        .await?;

    let joined: String = chunks
        .iter()
        .map(|c| c.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n---\n\n");
    let content: String = joined.chars().take(CONTENT_LIMIT).collect();

    let author = book.author.clone().unwrap_or_default();

    let extractions: &[(&str, &str)] = &[
        (book_insight::insight_type::KEY_CONCEPT, prompts::EXTRACT_KEY_CONCEPTS),
        (book_insight::insight_type::FRAMEWORK, prompts::EXTRACT_FRAMEWORKS),
        (book_insight::insight_type::TAKEAWAY, prompts::EXTRACT_TAKEAWAYS),
    ];

    for (insight_type, template) in extractions {
        if let Err(e) = run_extraction(ctx, book, &author, &content, insight_type, template, pass_level).await {
            tracing::warn!(book_id = book.id, insight_type, error = %e, "insight sub-extraction failed, continuing");
        }
    }

    Ok(())
}

async fn run_extraction(
    ctx: &PipelineContext,
    book: &Book,
    author: &str,
    content: &str,
    insight_type: &str,
    template: &str,
    pass_level: i32,
) -> anyhow::Result<()> {
    let prompt = template
        .replace("{title}", &book.title)
        .replace("{author}", author)
        .replace("{content}", content);

    let messages = vec![
        ChatMessage::new("system", prompts::SYSTEM_INSIGHT),
        ChatMessage::new("user", prompt),
    ];

    let response = ctx.llm.complete(&messages, "insight").await?;
    let items = parse_items(&response, insight_type);

    for item in items {
        let title = item.get("title").and_then(|v| v.as_str()).unwrap_or("").to_string();
        if title.is_empty() {
            continue;
        }
        let content = item.get("content").and_then(|v| v.as_str()).unwrap_or("").to_string();
        let supporting_quote = item.get("supporting_quote").and_then(|v| v.as_str()).map(str::to_string);
        let importance = item
            .get("importance")
            .and_then(|v| v.as_i64())
            .map(|v| v as i32)
            .unwrap_or(DEFAULT_IMPORTANCE);

        let embedding = ctx.embedder.embed_one(&format!("{title}: {content}")).await?;

        let inserted = sea_orm::ActiveModelTrait::insert(
            BookInsightActiveModel {
                book_id: Set(book.id),
                insight_type: Set(insight_type.to_string()),
                title: Set(title),
                content: Set(content),
                supporting_quote: Set(supporting_quote),
                importance: Set(importance.clamp(1, 10)),
                refinement_level: Set(pass_level),
                has_embedding: Set(true),
                created_at: Set(chrono::Utc::now().into()),
                ..Default::default()
            },
            &ctx.db,
        )
        .await?;

        sea_orm::ConnectionTrait::execute(
            &ctx.db,
            sea_orm::Statement::from_sql_and_values(
                sea_orm::ConnectionTrait::get_database_backend(&ctx.db),
                "UPDATE book_insight SET embedding = $1::vector WHERE id = $2",
                [crate::db::vector::to_pgvector_literal(&embedding).into(), inserted.id.into()],
            ),
        )
        .await?;
    }

    Ok(())
}

/// Best-effort JSON parse: the array lives under a key named after the
/// plural of `insight_type` (`concepts`/`frameworks`/`takeaways`) per the
/// prompt's declared response shape. Any parse failure yields no items
/// rather than failing the stage (spec §9 "JSON parsing is best-effort").
fn parse_items(response: &str, insight_type: &str) -> Vec<serde_json::Value> {
    let key = match insight_type {
        t if t == book_insight::insight_type::KEY_CONCEPT => "concepts",
        t if t == book_insight::insight_type::FRAMEWORK => "frameworks",
        _ => "takeaways",
    };

    let Ok(parsed) = serde_json::from_str::<serde_json::Value>(response.trim()) else {
        return Vec::new();
    };

    parsed
        .get(key)
        .and_then(|v| v.as_array())
        .cloned()
        .unwrap_or_default()
}
