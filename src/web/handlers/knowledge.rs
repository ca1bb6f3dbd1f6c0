//! `GET /knowledge/*` (spec §6), grounded on `knowledge_service.py`.

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use crate::db::entities::LearningPath;
use crate::error::{AppError, AppResult};
use crate::knowledge;
use crate::web::state::AppState;

const DEFAULT_CONNECTION_LIMIT: u64 = 50;

pub async fn learning_paths(State(state): State<AppState>) -> AppResult<Json<Vec<LearningPath>>> {
    Ok(Json(knowledge::get_learning_paths(&state.db).await?))
}

#[derive(Serialize)]
pub struct LearningPathBookEntry {
    pub book: crate::db::entities::Book,
    pub position: i32,
    pub rationale: Option<String>,
}

#[derive(Serialize)]
pub struct LearningPathDetail {
    pub path: LearningPath,
    pub books: Vec<LearningPathBookEntry>,
}

pub async fn learning_path(State(state): State<AppState>, Path(id): Path<i32>) -> AppResult<Json<LearningPathDetail>> {
    let detail = knowledge::get_learning_path(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("learning path {id}")))?;
    Ok(Json(LearningPathDetail {
        path: detail.path,
        books: detail
            .books
            .into_iter()
            .map(|b| LearningPathBookEntry { book: b.book, position: b.position, rationale: b.rationale })
            .collect(),
    }))
}

#[derive(Serialize)]
pub struct ConnectionEntry {
    pub connection_id: i32,
    pub connection_type: String,
    pub strength: f32,
    pub description: Option<String>,
    pub book_a_title: String,
    pub book_b_title: String,
}

pub async fn connections(State(state): State<AppState>) -> AppResult<Json<Vec<ConnectionEntry>>> {
    let details = knowledge::get_knowledge_connections(&state.db, DEFAULT_CONNECTION_LIMIT).await?;
    Ok(Json(
        details
            .into_iter()
            .map(|d| ConnectionEntry {
                connection_id: d.connection.id,
                connection_type: d.connection.connection_type,
                strength: d.connection.strength,
                description: d.connection.description,
                book_a_title: d.insight_a.1.map(|b| b.title).unwrap_or_default(),
                book_b_title: d.insight_b.1.map(|b| b.title).unwrap_or_default(),
            })
            .collect(),
    ))
}

#[derive(Serialize)]
pub struct MapNode {
    pub id: i32,
    pub title: String,
    pub author: Option<String>,
}

#[derive(Serialize)]
pub struct MapEdge {
    pub source: i32,
    pub target: i32,
    pub strength: f32,
    pub description: Option<String>,
}

#[derive(Serialize)]
pub struct MapResponse {
    pub nodes: Vec<MapNode>,
    pub edges: Vec<MapEdge>,
}

pub async fn map(State(state): State<AppState>) -> AppResult<Json<MapResponse>> {
    let map = knowledge::get_knowledge_map(&state.db).await?;
    Ok(Json(MapResponse {
        nodes: map.nodes.into_iter().map(|n| MapNode { id: n.id, title: n.title, author: n.author }).collect(),
        edges: map
            .edges
            .into_iter()
            .map(|e| MapEdge { source: e.source, target: e.target, strength: e.strength, description: e.description })
            .collect(),
    }))
}
