//! WebSocket event payloads (spec §6). `/ws/processing` broadcasts
//! `ProcessingEvent`s; `/ws/chat/{session_id}` frames mirror `chat::StreamEvent`.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProcessingEvent {
    StatusChanged { book_id: i32, status: String, progress: i32 },
    JobFailed { book_id: i32, stage: String, error: String },
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProcessingClientMessage {
    Ping,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Pong {
    Pong,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatClientMessage {
    Message { content: String },
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatServerFrame {
    Content { data: String },
    Sources { data: Vec<crate::chat::SourceChunk> },
    Done { data: DoneData },
    Error { data: String },
}

#[derive(Debug, Serialize)]
pub struct DoneData {
    pub message_id: i32,
}

impl From<crate::chat::StreamEvent> for ChatServerFrame {
    fn from(e: crate::chat::StreamEvent) -> Self {
        match e {
            crate::chat::StreamEvent::Content(data) => ChatServerFrame::Content { data },
            crate::chat::StreamEvent::Sources(data) => ChatServerFrame::Sources { data },
            crate::chat::StreamEvent::Done { message_id } => ChatServerFrame::Done { data: DoneData { message_id } },
            crate::chat::StreamEvent::Error(data) => ChatServerFrame::Error { data },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn processing_event_tags_by_snake_case_variant() {
        let event = ProcessingEvent::StatusChanged { book_id: 1, status: "embedding".into(), progress: 40 };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "status_changed");
        assert_eq!(json["book_id"], 1);
        assert_eq!(json["progress"], 40);
    }

    #[test]
    fn client_ping_parses_from_tagged_json() {
        let msg: ProcessingClientMessage = serde_json::from_str(r#"{"type":"ping"}"#).unwrap();
        assert!(matches!(msg, ProcessingClientMessage::Ping));
    }

    #[test]
    fn chat_client_message_parses_content() {
        let msg: ChatClientMessage = serde_json::from_str(r#"{"type":"message","content":"hello"}"#).unwrap();
        let ChatClientMessage::Message { content } = msg;
        assert_eq!(content, "hello");
    }

    #[test]
    fn stream_event_converts_to_tagged_frame() {
        let frame: ChatServerFrame = crate::chat::StreamEvent::Done { message_id: 7 }.into();
        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["type"], "done");
        assert_eq!(json["data"]["message_id"], 7);
    }
}
