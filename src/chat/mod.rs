//! RAG Chat Assembler (spec §4.H). Persists the user turn, retrieves
//! context via the Hybrid Retriever, shapes the message list, and either
//! completes or streams the assistant reply with source attributions.
//! Chat history (last 10 prior messages) is included in both paths
//! (SPEC_FULL §B.7.3 — resolves the spec-vs-original discrepancy in favor
//! of spec.md).

use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, Order, QueryFilter, QueryOrder, QuerySelect, Set};
use serde::Serialize;

use crate::db::entities::{
    chat_message, ChatMessageActiveModel, ChatMessageColumn, ChatMessageEntity,
    ChatMessage as ChatMessageRow, ChatSession,
};
use crate::llm::{prompts, ChatMessage, EmbeddingClient, LlmClient};
use crate::retrieval::{hybrid_search, RetrievedChunk};

const RETRIEVAL_LIMIT: usize = 8;
const HISTORY_LIMIT: u64 = 10;
const SNIPPET_LEN: usize = 200;
const NO_CONTEXT: &str = "No relevant content found.";

#[derive(Debug, Clone, Serialize)]
pub struct SourceChunk {
    pub chunk_id: i32,
    pub book_title: String,
    pub page_number: Option<i32>,
    pub snippet: String,
}

#[derive(Debug, Clone)]
pub enum StreamEvent {
    Content(String),
    Sources(Vec<SourceChunk>),
    Done { message_id: i32 },
    Error(String),
}

/// Non-streaming path: a single LLM call.
pub async fn send(
    db: &DatabaseConnection,
    llm: &dyn LlmClient,
    embedder: &dyn EmbeddingClient,
    session: &ChatSession,
    user_text: &str,
) -> anyhow::Result<ChatMessageRow> {
    persist_user_message(db, session.id, user_text).await?;

    let book_ids = session_book_ids(session);
    let chunks = hybrid_search(db, embedder, user_text, RETRIEVAL_LIMIT, book_ids.as_deref()).await?;
    let context = build_context(&chunks);
    let messages = build_message_list(db, session.id, &context, user_text).await?;

    let reply = llm.complete(&messages, "chat").await?;
    let sources = to_sources(&chunks);

    persist_assistant_message(db, session.id, &reply, &sources).await
}

/// Streaming path: emits content deltas, then persists the assistant
/// message, then emits sources and a done marker.
pub fn stream<'a>(
    db: &'a DatabaseConnection,
    llm: &'a dyn LlmClient,
    embedder: &'a dyn EmbeddingClient,
    session: &'a ChatSession,
    user_text: &'a str,
) -> BoxStream<'a, StreamEvent> {
    Box::pin(async_stream::stream! {
        if let Err(e) = persist_user_message(db, session.id, user_text).await {
            yield StreamEvent::Error(e.to_string());
            return;
        }

        let book_ids = session_book_ids(session);
        let chunks = match hybrid_search(db, embedder, user_text, RETRIEVAL_LIMIT, book_ids.as_deref()).await {
            Ok(c) => c,
            Err(e) => {
                yield StreamEvent::Error(e.to_string());
                return;
            }
        };
        let context = build_context(&chunks);

        let messages = match build_message_list(db, session.id, &context, user_text).await {
            Ok(m) => m,
            Err(e) => {
                yield StreamEvent::Error(e.to_string());
                return;
            }
        };

        let mut delta_stream = match llm.stream(&messages, "chat").await {
            Ok(s) => s,
            Err(e) => {
                yield StreamEvent::Error(e.to_string());
                return;
            }
        };

        let mut full_reply = String::new();
        while let Some(delta) = delta_stream.next().await {
            match delta {
                Ok(d) => {
                    full_reply.push_str(&d);
                    yield StreamEvent::Content(d);
                }
                Err(e) => {
                    yield StreamEvent::Error(e.to_string());
                    return;
                }
            }
        }

        let sources = to_sources(&chunks);
        match persist_assistant_message(db, session.id, &full_reply, &sources).await {
            Ok(saved) => {
                yield StreamEvent::Sources(sources);
                yield StreamEvent::Done { message_id: saved.id };
            }
            Err(e) => yield StreamEvent::Error(e.to_string()),
        }
    })
}

fn session_book_ids(session: &ChatSession) -> Option<Vec<i32>> {
    let ids: Vec<i32> = serde_json::from_value(session.book_ids.clone()).unwrap_or_default();
    if ids.is_empty() {
        None
    } else {
        Some(ids)
    }
}

fn build_context(chunks: &[RetrievedChunk]) -> String {
    if chunks.is_empty() {
        return NO_CONTEXT.to_string();
    }
    chunks
        .iter()
        .map(|c| {
            let page = c.page_number.map(|p| p.to_string()).unwrap_or_else(|| "?".to_string());
            format!("[{} - p.{}]\n{}", c.book_title, page, c.content)
        })
        .collect::<Vec<_>>()
        .join("\n\n---\n\n")
}

fn to_sources(chunks: &[RetrievedChunk]) -> Vec<SourceChunk> {
    chunks
        .iter()
        .map(|c| SourceChunk {
            chunk_id: c.chunk_id,
            book_title: c.book_title.clone(),
            page_number: c.page_number,
            snippet: c.content.chars().take(SNIPPET_LEN).collect(),
        })
        .collect()
}

async fn build_message_list(
    db: &DatabaseConnection,
    session_id: i32,
    context: &str,
    user_text: &str,
) -> anyhow::Result<Vec<ChatMessage>> {
    let mut history = ChatMessageEntity::find()
        .filter(ChatMessageColumn::SessionId.eq(session_id))
        .order_by(ChatMessageColumn::CreatedAt, Order::Desc)
        .limit(HISTORY_LIMIT + 1)
        .all(db)
        .await?;

    // Exclude the just-inserted user row, then restore chronological order.
    if !history.is_empty() {
        history.remove(0);
    }
    history.reverse();

    let mut messages = vec![ChatMessage::new("system", prompts::CHAT_SYSTEM)];
    messages.extend(history.into_iter().map(|m| ChatMessage::new(m.role, m.content)));

    let prompt = prompts::CHAT_WITH_CONTEXT
        .replace("{context}", context)
        .replace("{question}", user_text);
    messages.push(ChatMessage::new("user", prompt));

    Ok(messages)
}

async fn persist_user_message(db: &DatabaseConnection, session_id: i32, content: &str) -> anyhow::Result<ChatMessageRow> {
    Ok(sea_orm::ActiveModelTrait::insert(
        ChatMessageActiveModel {
            session_id: Set(session_id),
            role: Set(chat_message::role::USER.to_string()),
            content: Set(content.to_string()),
            source_chunks: Set(serde_json::json!([])),
            created_at: Set(chrono::Utc::now().into()),
            ..Default::default()
        },
        db,
    )
    .await?)
}

async fn persist_assistant_message(
    db: &DatabaseConnection,
    session_id: i32,
    content: &str,
    sources: &[SourceChunk],
) -> anyhow::Result<ChatMessageRow> {
    Ok(sea_orm::ActiveModelTrait::insert(
        ChatMessageActiveModel {
            session_id: Set(session_id),
            role: Set(chat_message::role::ASSISTANT.to_string()),
            content: Set(content.to_string()),
            source_chunks: Set(serde_json::to_value(sources)?),
            created_at: Set(chrono::Utc::now().into()),
            ..Default::default()
        },
        db,
    )
    .await?)
}

