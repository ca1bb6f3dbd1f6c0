//! `GET /recommendations*` (spec §6), grounded on `recommendation_service.py`.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::db::entities::Book;
use crate::error::AppResult;
use crate::recommendations;
use crate::web::state::AppState;

#[derive(Deserialize)]
pub struct LimitQuery {
    #[serde(default = "default_limit")]
    limit: usize,
}

fn default_limit() -> usize {
    10
}

pub async fn recommendations_handler(State(state): State<AppState>, Query(q): Query<LimitQuery>) -> AppResult<Json<Vec<Book>>> {
    Ok(Json(recommendations::get_recommendations(&state.db, q.limit).await?))
}

#[derive(Serialize)]
pub struct SimilarBookEntry {
    pub book: Book,
    pub similarity: f64,
}

pub async fn similar(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(q): Query<LimitQuery>,
) -> AppResult<Json<Vec<SimilarBookEntry>>> {
    let similar = recommendations::get_similar_books(&state.db, id, q.limit).await?;
    Ok(Json(
        similar.into_iter().map(|s| SimilarBookEntry { book: s.book, similarity: s.similarity }).collect(),
    ))
}
