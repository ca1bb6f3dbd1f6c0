//! `POST/GET /chat/sessions*` and `/ws/chat/{session_id}` (spec §4.H/§6).

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use futures_util::{SinkExt, StreamExt};
use sea_orm::{ColumnTrait, EntityTrait, Order, QueryFilter, QueryOrder, Set};
use serde::Deserialize;

use crate::chat;
use crate::db::entities::*;
use crate::error::{AppError, AppResult};
use crate::web::events::{ChatClientMessage, ChatServerFrame};
use crate::web::state::AppState;

#[derive(Deserialize)]
pub struct CreateSessionBody {
    pub title: Option<String>,
    #[serde(default)]
    pub book_ids: Vec<i32>,
}

pub async fn create_session(State(state): State<AppState>, Json(body): Json<CreateSessionBody>) -> AppResult<Json<ChatSession>> {
    let now = chrono::Utc::now();
    let inserted = sea_orm::ActiveModelTrait::insert(
        ChatSessionActiveModel {
            title: Set(body.title),
            book_ids: Set(serde_json::json!(body.book_ids)),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        },
        &state.db,
    )
    .await?;
    Ok(Json(inserted))
}

pub async fn list_sessions(State(state): State<AppState>) -> AppResult<Json<Vec<ChatSession>>> {
    let sessions = ChatSessionEntity::find()
        .order_by(ChatSessionColumn::UpdatedAt, Order::Desc)
        .all(&state.db)
        .await?;
    Ok(Json(sessions))
}

pub async fn list_messages(State(state): State<AppState>, Path(session_id): Path<i32>) -> AppResult<Json<Vec<ChatMessage>>> {
    let messages = ChatMessageEntity::find()
        .filter(ChatMessageColumn::SessionId.eq(session_id))
        .order_by_asc(ChatMessageColumn::CreatedAt)
        .all(&state.db)
        .await?;
    Ok(Json(messages))
}

#[derive(Deserialize)]
pub struct SendMessageBody {
    pub content: String,
}

pub async fn send_message(
    State(state): State<AppState>,
    Path(session_id): Path<i32>,
    Json(body): Json<SendMessageBody>,
) -> AppResult<Json<ChatMessage>> {
    let session = ChatSessionEntity::find_by_id(session_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("chat session {session_id}")))?;

    let reply = chat::send(&state.db, state.llm.as_ref(), state.embedder.as_ref(), &session, &body.content).await?;
    Ok(Json(reply))
}

pub async fn ws_chat(
    ws: WebSocketUpgrade,
    Path(session_id): Path<i32>,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let session = ChatSessionEntity::find_by_id(session_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("chat session {session_id}")))?;

    Ok(ws.on_upgrade(move |socket| handle_chat_socket(socket, state, session)))
}

async fn handle_chat_socket(socket: WebSocket, state: AppState, session: ChatSession) {
    let (mut sender, mut receiver) = socket.split();

    while let Some(Ok(msg)) = receiver.next().await {
        let Message::Text(text) = msg else { continue };
        let Ok(ChatClientMessage::Message { content }) = serde_json::from_str(&text) else {
            continue;
        };

        let mut stream = chat::stream(&state.db, state.llm.as_ref(), state.embedder.as_ref(), &session, &content);
        while let Some(event) = stream.next().await {
            let frame: ChatServerFrame = event.into();
            let Ok(payload) = serde_json::to_string(&frame) else { continue };
            if sender.send(Message::Text(payload.into())).await.is_err() {
                return;
            }
        }
    }
}
