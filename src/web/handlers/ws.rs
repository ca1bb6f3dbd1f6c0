//! `/ws/processing` (spec §6): broadcasts `ProcessingEvent`s as stage
//! transitions happen elsewhere in the pipeline; replies to client pings.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;

use crate::web::events::{Pong, ProcessingClientMessage};
use crate::web::state::AppState;

pub async fn ws_processing(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_processing_socket(socket, state))
}

async fn handle_processing_socket(mut socket: WebSocket, state: AppState) {
    let mut rx = state.processing_tx.subscribe();

    loop {
        tokio::select! {
            event = rx.recv() => {
                let Ok(event) = event else { break };
                let Ok(payload) = serde_json::to_string(&event) else { continue };
                if socket.send(Message::Text(payload.into())).await.is_err() {
                    break;
                }
            }
            incoming = socket.recv() => {
                let Some(Ok(msg)) = incoming else { break };
                let Message::Text(text) = msg else { continue };
                if serde_json::from_str::<ProcessingClientMessage>(&text).is_ok() {
                    let Ok(payload) = serde_json::to_string(&Pong::Pong) else { continue };
                    if socket.send(Message::Text(payload.into())).await.is_err() {
                        break;
                    }
                }
            }
        }
    }
}
