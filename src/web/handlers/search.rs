//! `GET /search*` (spec §4.G/§6): the hybrid retriever's HTTP surface.

use axum::extract::{Query, State};
use axum::Json;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QuerySelect};
use serde::{Deserialize, Serialize};

use crate::db::entities::*;
use crate::error::{AppError, AppResult};
use crate::retrieval::{self, RetrievedChunk};
use crate::web::state::AppState;

#[derive(Deserialize)]
pub struct SearchQuery {
    q: String,
    #[serde(default = "default_limit")]
    limit: usize,
    #[serde(default)]
    book_ids: Option<String>,
}

fn default_limit() -> usize {
    20
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub results: Vec<RetrievedChunk>,
    pub query: String,
}

pub async fn search(State(state): State<AppState>, Query(q): Query<SearchQuery>) -> AppResult<Json<SearchResponse>> {
    if q.q.trim().is_empty() {
        return Err(AppError::Validation("q must not be empty".to_string()));
    }

    let book_ids = parse_book_ids(q.book_ids.as_deref());
    let results = retrieval::hybrid_search(&state.db, state.embedder.as_ref(), &q.q, q.limit, book_ids.as_deref()).await?;
    Ok(Json(SearchResponse { results, query: q.q }))
}

#[derive(Deserialize)]
pub struct SuggestQuery {
    q: String,
}

#[derive(Serialize)]
pub struct SuggestResponse {
    pub suggestions: Vec<String>,
}

/// Lightweight prefix suggestion over book titles; full hybrid search is
/// reserved for the main `/search` endpoint.
pub async fn suggest(State(state): State<AppState>, Query(q): Query<SuggestQuery>) -> AppResult<Json<SuggestResponse>> {
    let books = BookEntity::find()
        .filter(BookColumn::Title.starts_with(&q.q))
        .limit(10)
        .all(&state.db)
        .await?;
    Ok(Json(SuggestResponse {
        suggestions: books.into_iter().map(|b| b.title).collect(),
    }))
}

pub async fn search_books(State(state): State<AppState>, Query(q): Query<SearchQuery>) -> AppResult<Json<Vec<Book>>> {
    let pattern = format!("%{}%", q.q);
    let books = BookEntity::find()
        .filter(BookColumn::Title.like(&pattern))
        .limit(q.limit as u64)
        .all(&state.db)
        .await?;
    Ok(Json(books))
}

fn parse_book_ids(raw: Option<&str>) -> Option<Vec<i32>> {
    let raw = raw?;
    let ids: Vec<i32> = raw.split(',').filter_map(|s| s.trim().parse().ok()).collect();
    if ids.is_empty() {
        None
    } else {
        Some(ids)
    }
}
