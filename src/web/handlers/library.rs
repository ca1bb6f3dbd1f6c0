//! `POST/GET /library/*` (spec §6): directory scan + import, library stats,
//! and the list of books currently mid-pipeline.

use axum::extract::{Path, State};
use axum::Json;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};

use crate::db::entities::*;
use crate::error::{AppError, AppResult};
use crate::library::{self, LibraryStats};
use crate::web::state::{AppState, ScanTaskStatus};

#[derive(Deserialize)]
pub struct ScanBody {
    pub directory: String,
}

#[derive(Serialize)]
pub struct ScanAccepted {
    pub task_id: String,
    pub directory: String,
    pub message: String,
}

pub async fn scan(State(state): State<AppState>, Json(body): Json<ScanBody>) -> Json<ScanAccepted> {
    let task_id = uuid::Uuid::new_v4().to_string();
    state.scan_tasks.lock().insert(task_id.clone(), ScanTaskStatus::Running);

    let db = state.db.clone();
    let directory = body.directory.clone();
    let tasks = state.scan_tasks.clone();
    let id_for_task = task_id.clone();
    tokio::spawn(async move {
        let files = library::scan_directory(std::path::Path::new(&directory));
        let summary = library::import_books(&db, &files).await;
        tasks.lock().insert(id_for_task, ScanTaskStatus::Done(summary));
    });

    Json(ScanAccepted {
        task_id,
        directory: body.directory,
        message: "scan started".to_string(),
    })
}

#[derive(Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScanStatusResponse {
    Running,
    Completed { result: library::ImportSummary },
    Failed { error: String },
}

pub async fn scan_status(State(state): State<AppState>, Path(task_id): Path<String>) -> AppResult<Json<ScanStatusResponse>> {
    let status = state
        .scan_tasks
        .lock()
        .get(&task_id)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("scan task {task_id}")))?;

    Ok(Json(match status {
        ScanTaskStatus::Running => ScanStatusResponse::Running,
        ScanTaskStatus::Done(result) => ScanStatusResponse::Completed { result },
        ScanTaskStatus::Failed(error) => ScanStatusResponse::Failed { error },
    }))
}

pub async fn import(State(state): State<AppState>, Json(body): Json<ScanBody>) -> Json<library::ImportSummary> {
    let files = library::scan_directory(std::path::Path::new(&body.directory));
    Json(library::import_books(&state.db, &files).await)
}

pub async fn stats(State(state): State<AppState>) -> AppResult<Json<LibraryStats>> {
    Ok(Json(library::get_library_stats(&state.db).await?))
}

pub async fn processing(State(state): State<AppState>) -> AppResult<Json<Vec<Book>>> {
    let books = BookEntity::find()
        .filter(BookColumn::ProcessingStatus.is_in([
            book::status::PENDING,
            book::status::EXTRACTING,
            book::status::CHUNKING,
            book::status::EMBEDDING,
            book::status::GENERATING_INSIGHTS,
        ]))
        .order_by_asc(BookColumn::UpdatedAt)
        .all(&state.db)
        .await?;
    Ok(Json(books))
}
