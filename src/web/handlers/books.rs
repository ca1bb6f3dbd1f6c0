//! `GET/PATCH/DELETE /books*` (spec §6). Thin CRUD over the `Book` entity;
//! out of core scope per spec §1, kept functional rather than elaborate.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use sea_orm::{ColumnTrait, EntityTrait, Order, QueryFilter, QueryOrder, QuerySelect, Set};
use serde::Deserialize;

use crate::db::entities::*;
use crate::error::{AppError, AppResult};
use crate::web::state::AppState;

#[derive(Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    skip: u64,
    #[serde(default = "default_limit")]
    limit: u64,
}

fn default_limit() -> u64 {
    50
}

pub async fn list_books(State(state): State<AppState>, Query(q): Query<ListQuery>) -> AppResult<Json<Vec<Book>>> {
    let books = BookEntity::find()
        .order_by(BookColumn::CreatedAt, Order::Desc)
        .offset(q.skip)
        .limit(q.limit)
        .all(&state.db)
        .await?;
    Ok(Json(books))
}

pub async fn get_book(State(state): State<AppState>, Path(id): Path<i32>) -> AppResult<Json<Book>> {
    let book = BookEntity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("book {id}")))?;
    Ok(Json(book))
}

#[derive(Deserialize)]
pub struct PatchBookBody {
    pub title: Option<String>,
    pub author: Option<String>,
    pub rating: Option<f32>,
}

pub async fn patch_book(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(body): Json<PatchBookBody>,
) -> AppResult<Json<Book>> {
    let book = BookEntity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("book {id}")))?;

    let mut active: BookActiveModel = book.into();
    if let Some(title) = body.title {
        active.title = Set(title);
    }
    if let Some(author) = body.author {
        active.author = Set(Some(author));
    }
    if let Some(rating) = body.rating {
        active.rating = Set(Some(rating));
    }
    active.updated_at = Set(chrono::Utc::now().into());

    let updated = sea_orm::ActiveModelTrait::update(active, &state.db).await?;
    Ok(Json(updated))
}

pub async fn delete_book(State(state): State<AppState>, Path(id): Path<i32>) -> AppResult<impl IntoResponse> {
    let result = BookEntity::delete_by_id(id).exec(&state.db).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound(format!("book {id}")));
    }
    Ok(axum::http::StatusCode::NO_CONTENT)
}

pub async fn book_file(State(state): State<AppState>, Path(id): Path<i32>) -> AppResult<impl IntoResponse> {
    let file = BookFileEntity::find()
        .filter(BookFileColumn::BookId.eq(id))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("file for book {id}")))?;

    let bytes = tokio::fs::read(&file.file_path)
        .await
        .map_err(|e| AppError::Internal(e.into()))?;
    Ok(bytes)
}

pub async fn book_cover(State(state): State<AppState>, Path(id): Path<i32>) -> AppResult<impl IntoResponse> {
    let book = BookEntity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("book {id}")))?;
    let cover_path = book.cover_path.ok_or_else(|| AppError::NotFound(format!("cover for book {id}")))?;

    let bytes = tokio::fs::read(&cover_path)
        .await
        .map_err(|e| AppError::Internal(e.into()))?;
    Ok(([(axum::http::header::CONTENT_TYPE, "image/png")], bytes))
}

pub async fn recent_books(State(state): State<AppState>) -> AppResult<Json<Vec<Book>>> {
    let books = BookEntity::find()
        .order_by(BookColumn::CreatedAt, Order::Desc)
        .limit(20)
        .all(&state.db)
        .await?;
    Ok(Json(books))
}

pub async fn continue_reading(State(state): State<AppState>) -> AppResult<Json<Vec<Book>>> {
    let progress = ReadingProgressEntity::find()
        .filter(ReadingProgressColumn::Status.eq(reading_progress::status::READING))
        .order_by(ReadingProgressColumn::LastReadAt, Order::Desc)
        .limit(20)
        .all(&state.db)
        .await?;

    let mut books = Vec::with_capacity(progress.len());
    for p in progress {
        if let Some(book) = BookEntity::find_by_id(p.book_id).one(&state.db).await? {
            books.push(book);
        }
    }
    Ok(Json(books))
}
