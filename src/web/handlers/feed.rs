//! `GET/POST/PATCH /feed*` (spec §6), grounded on `feed_service.py`.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::db::entities::FeedItem;
use crate::error::{AppError, AppResult};
use crate::feed;
use crate::web::state::AppState;

#[derive(Deserialize)]
pub struct FeedQuery {
    #[serde(default)]
    skip: u64,
    #[serde(default = "default_limit")]
    limit: u64,
    #[serde(default)]
    unread_only: bool,
}

fn default_limit() -> u64 {
    20
}

#[derive(Serialize)]
pub struct FeedResponse {
    pub items: Vec<FeedItem>,
    pub total: u64,
}

pub async fn get_feed(State(state): State<AppState>, Query(q): Query<FeedQuery>) -> AppResult<Json<FeedResponse>> {
    let (items, total) = feed::get_feed(&state.db, q.skip, q.limit, q.unread_only).await?;
    Ok(Json(FeedResponse { items, total }))
}

pub async fn generate(State(state): State<AppState>) -> AppResult<Json<serde_json::Value>> {
    let ctx = state.pipeline_context();
    feed::generate_feed(&ctx).await?;
    Ok(Json(serde_json::json!({ "message": "feed generated" })))
}

#[derive(Deserialize)]
pub struct PatchFeedBody {
    #[serde(default)]
    pub mark_read: bool,
    #[serde(default)]
    pub toggle_pin: bool,
}

pub async fn patch_item(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(body): Json<PatchFeedBody>,
) -> AppResult<Json<FeedItem>> {
    let mut item = None;
    if body.mark_read {
        item = feed::mark_read(&state.db, id).await?;
    }
    if body.toggle_pin {
        item = feed::toggle_pin(&state.db, id).await?;
    }
    item.ok_or_else(|| AppError::NotFound(format!("feed item {id}"))).map(Json)
}

pub async fn daily_digest(State(state): State<AppState>) -> AppResult<Json<FeedResponse>> {
    let (items, total) = feed::get_feed(&state.db, 0, 10, false).await?;
    Ok(Json(FeedResponse { items, total }))
}
