//! `GET /insights/*` (spec §6): read paths over `BookInsight`, plus a
//! manual regenerate trigger that re-dispatches the insights stage.

use axum::extract::{Path, State};
use axum::Json;
use sea_orm::{ColumnTrait, EntityTrait, Order, QueryFilter, QueryOrder, QuerySelect};

use crate::db::entities::*;
use crate::error::{AppError, AppResult};
use crate::knowledge::{self, ConnectionDetail};
use crate::web::state::AppState;

pub async fn by_book(State(state): State<AppState>, Path(book_id): Path<i32>) -> AppResult<Json<Vec<BookInsight>>> {
    let insights = BookInsightEntity::find()
        .filter(BookInsightColumn::BookId.eq(book_id))
        .order_by(BookInsightColumn::Importance, Order::Desc)
        .all(&state.db)
        .await?;
    Ok(Json(insights))
}

pub async fn get_insight(State(state): State<AppState>, Path(id): Path<i32>) -> AppResult<Json<BookInsight>> {
    let insight = BookInsightEntity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("insight {id}")))?;
    Ok(Json(insight))
}

#[derive(serde::Serialize)]
pub struct ConnectionsResponse {
    pub connections: Vec<ConnectionSummary>,
}

#[derive(serde::Serialize)]
pub struct ConnectionSummary {
    pub connection_id: i32,
    pub connection_type: String,
    pub strength: f32,
    pub other_book_title: Option<String>,
}

pub async fn connections(State(state): State<AppState>, Path(id): Path<i32>) -> AppResult<Json<ConnectionsResponse>> {
    let all: Vec<ConnectionDetail> = knowledge::get_knowledge_connections(&state.db, 200).await?;
    let connections = all
        .into_iter()
        .filter_map(|detail| {
            let (a, b) = (&detail.insight_a.0, &detail.insight_b.0);
            let (mine, other, other_book) = if a.id == id {
                (a, b, &detail.insight_b.1)
            } else if b.id == id {
                (b, a, &detail.insight_a.1)
            } else {
                return None;
            };
            let _ = mine;
            let _ = other;
            Some(ConnectionSummary {
                connection_id: detail.connection.id,
                connection_type: detail.connection.connection_type.clone(),
                strength: detail.connection.strength,
                other_book_title: other_book.as_ref().map(|b| b.title.clone()),
            })
        })
        .collect();

    Ok(Json(ConnectionsResponse { connections }))
}

pub async fn concepts(State(state): State<AppState>) -> AppResult<Json<Vec<BookInsight>>> {
    let insights = BookInsightEntity::find()
        .filter(BookInsightColumn::InsightType.eq(book_insight::insight_type::KEY_CONCEPT))
        .order_by(BookInsightColumn::CreatedAt, Order::Desc)
        .limit(50)
        .all(&state.db)
        .await?;
    Ok(Json(insights))
}

pub async fn frameworks(State(state): State<AppState>) -> AppResult<Json<Vec<BookInsight>>> {
    let insights = BookInsightEntity::find()
        .filter(BookInsightColumn::InsightType.eq(book_insight::insight_type::FRAMEWORK))
        .order_by(BookInsightColumn::CreatedAt, Order::Desc)
        .limit(50)
        .all(&state.db)
        .await?;
    Ok(Json(insights))
}

pub async fn regenerate(State(state): State<AppState>, Path(book_id): Path<i32>) -> AppResult<Json<serde_json::Value>> {
    let max_level = BookInsightEntity::find()
        .filter(BookInsightColumn::BookId.eq(book_id))
        .order_by(BookInsightColumn::RefinementLevel, Order::Desc)
        .one(&state.db)
        .await?
        .map(|i| i.refinement_level)
        .unwrap_or(0);
    let next_level = (max_level + 1).min(3);

    let ctx = state.pipeline_context();
    tokio::spawn(async move {
        if let Err(e) = crate::pipeline::refine_insights(&ctx, book_id, next_level).await {
            tracing::error!(error = %e, book_id, "manual insight regeneration failed");
        }
    });
    Ok(Json(serde_json::json!({ "book_id": book_id, "pass_level": next_level, "message": "regeneration scheduled" })))
}
