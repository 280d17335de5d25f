//! WebSocket upgrade + message loop. Each client message is parsed as JSON and
//! forwarded to core logic. We reply with a single JSON message per request.
//!
//! Each connection owns one `LearnerSession`. Messages are handled strictly one
//! at a time, so a connection never has two model calls in flight.

use std::sync::Arc;

use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{debug, error, info, instrument};

use crate::logic::*;
use crate::protocol::{quiz_state_out, ClientWsMessage, ErrorOut, ServerWsMessage};
use crate::seeds::concept_cards;
use crate::session::LearnerSession;
use crate::state::AppState;

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "gerund_master", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "gerund_master", "WebSocket connected");
  let mut session = LearnerSession::new();

  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        let reply_msg = match serde_json::from_str::<ClientWsMessage>(&txt) {
          Ok(incoming) => {
            debug!(target: "gerund_master", "WS received: {:?}", &incoming);
            handle_client_ws(incoming, &state, &mut session).await
          }
          Err(e) => ServerWsMessage::Error { error: ErrorOut::plain("INVALID_JSON", format!("Invalid JSON: {}", e)) },
        };

        let out = serde_json::to_string(&reply_msg).unwrap_or_else(|e| {
          serde_json::json!({ "type": "error", "error": { "code": "SERIALIZATION", "message": e.to_string() } }).to_string()
        });

        if let Err(e) = socket.send(Message::Text(out)).await {
          error!(target: "gerund_master", error = %e, "WS send error");
          break;
        }
      }
      Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
      Message::Close(_) => break,
      _ => {}
    }
  }
  info!(target: "gerund_master", "WebSocket disconnected; session discarded");
}

#[instrument(level = "info", skip_all)]
pub async fn handle_client_ws(msg: ClientWsMessage, state: &AppState, session: &mut LearnerSession) -> ServerWsMessage {
  match msg {
    ClientWsMessage::Ping => ServerWsMessage::Pong,

    ClientWsMessage::Navigate { view } => {
      session.navigate(view);
      ServerWsMessage::View { view: session.view }
    }

    ClientWsMessage::Concepts => ServerWsMessage::Concepts { cards: concept_cards() },

    ClientWsMessage::StartQuiz { difficulty } => start_quiz(state, session, difficulty).await,

    ClientWsMessage::Answer { option } => submit_answer(session, option),

    ClientWsMessage::NextQuestion => next_question(session),

    ClientWsMessage::RestartQuiz => restart_quiz(session),

    ClientWsMessage::ChatSend { text } => chat_send(state, session, &text).await,

    ClientWsMessage::ChatReset => chat_reset(session),

    ClientWsMessage::QuizState => ServerWsMessage::QuizState { quiz: quiz_state_out(&session.quiz) },

    ClientWsMessage::ChatTranscript => ServerWsMessage::ChatTranscript { messages: session.chat.messages().to_vec() },
  }
}
