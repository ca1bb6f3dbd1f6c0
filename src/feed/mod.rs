//! AI-generated social feed (SPEC_FULL §B.2, grounded on `feed_service.py`):
//! a read path over `FeedItem` rows, plus a daily TIL generator driven by
//! `GENERATE_FEED_TIL` and dispatched by the orchestrator's feed-floor rule.

use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, Order, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, Statement,
};

use crate::db::entities::*;
use crate::llm::prompts::GENERATE_FEED_TIL;
use crate::llm::{ChatMessage, LlmClient};
use crate::pipeline::PipelineContext;

const DEFAULT_TIL_COUNT: i64 = 3;

#[derive(serde::Deserialize)]
struct TilResponse {
    title: Option<String>,
    content: Option<String>,
}

#[derive(FromQueryResult)]
struct RandomInsightId {
    id: i32,
}

pub async fn get_feed(
    db: &DatabaseConnection,
    skip: u64,
    limit: u64,
    unread_only: bool,
) -> anyhow::Result<(Vec<FeedItem>, u64)> {
    let mut query = FeedItemEntity::find();
    let mut count_query = FeedItemEntity::find();
    if unread_only {
        query = query.filter(FeedItemColumn::IsRead.eq(false));
        count_query = count_query.filter(FeedItemColumn::IsRead.eq(false));
    }

    let total = count_query.count(db).await?;
    let items = query
        .order_by(FeedItemColumn::IsPinned, Order::Desc)
        .order_by(FeedItemColumn::CreatedAt, Order::Desc)
        .offset(skip)
        .limit(limit)
        .all(db)
        .await?;

    Ok((items, total))
}

pub async fn mark_read(db: &DatabaseConnection, item_id: i32) -> anyhow::Result<Option<FeedItem>> {
    let Some(item) = FeedItemEntity::find_by_id(item_id).one(db).await? else {
        return Ok(None);
    };
    let mut active: FeedItemActiveModel = item.into();
    active.is_read = Set(true);
    Ok(Some(sea_orm::ActiveModelTrait::update(active, db).await?))
}

pub async fn toggle_pin(db: &DatabaseConnection, item_id: i32) -> anyhow::Result<Option<FeedItem>> {
    let Some(item) = FeedItemEntity::find_by_id(item_id).one(db).await? else {
        return Ok(None);
    };
    let currently_pinned = item.is_pinned;
    let mut active: FeedItemActiveModel = item.into();
    active.is_pinned = Set(!currently_pinned);
    Ok(Some(sea_orm::ActiveModelTrait::update(active, db).await?))
}

/// Entry point for `Task::GenerateFeed`: samples a handful of recent
/// key-concept insights and turns each into a TIL feed item.
pub async fn generate_feed(ctx: &PipelineContext) -> anyhow::Result<()> {
    generate_til_items(&ctx.db, ctx.llm.as_ref(), DEFAULT_TIL_COUNT).await?;
    Ok(())
}

async fn generate_til_items(
    db: &DatabaseConnection,
    llm: &dyn LlmClient,
    limit: i64,
) -> anyhow::Result<Vec<FeedItem>> {
    let sample_ids = RandomInsightId::find_by_statement(Statement::from_sql_and_values(
        db.get_database_backend(),
        "SELECT id FROM book_insight WHERE insight_type = $1 ORDER BY random() LIMIT $2",
        [book_insight::insight_type::KEY_CONCEPT.into(), limit.into()],
    ))
    .all(db)
    .await?;

    let mut items = Vec::new();
    for row in sample_ids {
        let Some(insight) = BookInsightEntity::find_by_id(row.id).one(db).await? else {
            continue;
        };
        let Some(book) = BookEntity::find_by_id(insight.book_id).one(db).await? else {
            continue;
        };

        let author = book.author.clone().unwrap_or_else(|| "Unknown".to_string());
        let prompt = render_til_prompt(&insight.title, &insight.content, &book.title, &author);

        let response = match llm.complete(&[ChatMessage::new("user", prompt)], "feed").await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(error = %e, insight_id = insight.id, "TIL generation failed");
                continue;
            }
        };

        let parsed: TilResponse = match serde_json::from_str(&response) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(error = %e, insight_id = insight.id, "TIL response was not valid JSON");
                continue;
            }
        };

        let inserted = sea_orm::ActiveModelTrait::insert(
            FeedItemActiveModel {
                item_type: Set(feed_item::item_type::TIL.to_string()),
                title: Set(parsed.title.unwrap_or_else(|| format!("TIL: {}", insight.title))),
                content: Set(parsed.content.unwrap_or_else(|| insight.content.clone())),
                book_ids: Set(serde_json::json!([book.id])),
                metadata_json: Set(Some(serde_json::json!({ "insight_id": insight.id }))),
                is_read: Set(false),
                is_pinned: Set(false),
                created_at: Set(chrono::Utc::now().into()),
                ..Default::default()
            },
            db,
        )
        .await?;

        items.push(inserted);
    }

    Ok(items)
}

fn render_til_prompt(insight_title: &str, insight_content: &str, book_title: &str, author: &str) -> String {
    GENERATE_FEED_TIL
        .replace("{insight_title}", insight_title)
        .replace("{insight_content}", insight_content)
        .replace("{book_title}", book_title)
        .replace("{author}", author)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_substitutes_all_placeholders() {
        let prompt = render_til_prompt("Compounding", "Small gains add up.", "Atomic Habits", "James Clear");
        assert!(prompt.contains("Compounding"));
        assert!(prompt.contains("Small gains add up."));
        assert!(prompt.contains("Atomic Habits"));
        assert!(prompt.contains("James Clear"));
        assert!(!prompt.contains("{insight_title}"));
        assert!(!prompt.contains("{author}"));
    }
}
