//! `GET/PUT /reading/*` (spec §6), grounded on `reading_service.py`.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use crate::db::entities::{ReadingProgress, ReadingSession};
use crate::error::{AppError, AppResult};
use crate::reading::{self, ReadingStats};
use crate::web::state::AppState;

pub async fn get_progress(State(state): State<AppState>, Path(book_id): Path<i32>) -> AppResult<Json<Option<ReadingProgress>>> {
    Ok(Json(reading::get_reading_progress(&state.db, book_id).await?))
}

#[derive(Deserialize)]
pub struct PutProgressBody {
    pub current_page: Option<i32>,
    pub total_pages: Option<i32>,
    pub epub_cfi: Option<String>,
}

pub async fn put_progress(
    State(state): State<AppState>,
    Path(book_id): Path<i32>,
    Json(body): Json<PutProgressBody>,
) -> AppResult<Json<ReadingProgress>> {
    let progress =
        reading::update_reading_progress(&state.db, book_id, body.current_page, body.total_pages, body.epub_cfi).await?;
    Ok(Json(progress))
}

pub async fn start_session(State(state): State<AppState>, Path(book_id): Path<i32>) -> AppResult<Json<ReadingSession>> {
    Ok(Json(reading::start_reading_session(&state.db, book_id).await?))
}

#[derive(Deserialize)]
pub struct EndSessionQuery {
    pub pages_read: i32,
}

pub async fn end_session(
    State(state): State<AppState>,
    Path(session_id): Path<i32>,
    Query(q): Query<EndSessionQuery>,
) -> AppResult<Json<ReadingSession>> {
    reading::end_reading_session(&state.db, session_id, q.pages_read)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("reading session {session_id}")))
        .map(Json)
}

pub async fn stats(State(state): State<AppState>) -> AppResult<Json<ReadingStats>> {
    Ok(Json(reading::get_reading_stats(&state.db).await?))
}
