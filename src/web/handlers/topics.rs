//! `GET /topics*` (spec §6), grounded on `topic_service.py`.

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use crate::db::entities::Topic;
use crate::error::{AppError, AppResult};
use crate::topics;
use crate::web::state::AppState;

pub async fn list_topics(State(state): State<AppState>) -> AppResult<Json<Vec<Topic>>> {
    Ok(Json(topics::get_topics(&state.db).await?))
}

#[derive(Serialize)]
pub struct GraphNode {
    pub id: i32,
    pub name: String,
    pub book_count: i32,
    pub color: String,
}

#[derive(Serialize)]
pub struct GraphEdge {
    pub source: i32,
    pub target: i32,
    pub strength: f32,
}

#[derive(Serialize)]
pub struct GraphResponse {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

pub async fn graph(State(state): State<AppState>) -> AppResult<Json<GraphResponse>> {
    let graph = topics::get_topic_graph(&state.db).await?;
    Ok(Json(GraphResponse {
        nodes: graph
            .nodes
            .into_iter()
            .map(|t| GraphNode { id: t.id, name: t.name, book_count: t.book_count, color: t.color })
            .collect(),
        edges: graph
            .edges
            .into_iter()
            .map(|r| GraphEdge { source: r.topic_a_id, target: r.topic_b_id, strength: r.strength })
            .collect(),
    }))
}

#[derive(Serialize)]
pub struct TopicDetail {
    pub topic: Topic,
    pub books: Vec<crate::db::entities::Book>,
}

pub async fn get_topic(State(state): State<AppState>, Path(id): Path<i32>) -> AppResult<Json<TopicDetail>> {
    let (topic, books) = topics::get_topic_with_books(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("topic {id}")))?;
    Ok(Json(TopicDetail { topic, books }))
}
