use axum::{
    Extension,
    extract::{
        Path, State,
        ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use app::engine::registry::SharedSession;
use app::scheduler;
use app::state::AppState;
use models::schemas::game::{SessionStatus, Side};
use models::schemas::player::Principal;
use models::schemas::wire::{ClientFrame, ServerFrame};

use crate::error::ApiError;

/// One bidirectional connection per seat per session.
pub async fn session_ws(
    ws: WebSocketUpgrade,
    Path(id): Path<String>,
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Response, ApiError> {
    let session = state
        .sessions
        .get(&id)
        .ok_or_else(|| ApiError::new(StatusCode::NOT_FOUND, "session not found"))?;

    Ok(ws.on_upgrade(move |socket| handle_socket(state, session, id, principal, socket)))
}

/// Per-connection task: an explicit receive loop plus a writer task draining
/// this seat's send queue. Outbound frames are queued, never awaited by the
/// simulation; a slow socket only ever delays itself.
async fn handle_socket(
    state: AppState,
    session: SharedSession,
    session_id: String,
    principal: Principal,
    socket: WebSocket,
) {
    let (mut sink, mut stream) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerFrame>();

    let bind_result = session.lock().unwrap().bind(principal.clone(), tx.clone());
    let side = match bind_result {
        Ok(side) => side,
        Err(err) => {
            // session full: refuse without touching the existing seats
            let frame = ServerFrame::Error {
                message: err.to_string(),
            };
            if let Ok(text) = serde_json::to_string(&frame) {
                let _ = sink.send(Message::Text(text.into())).await;
            }
            let _ = sink
                .send(Message::Close(Some(CloseFrame {
                    code: 1008,
                    reason: "session full".into(),
                })))
                .await;
            return;
        }
    };

    debug!(session = %session_id, user = principal.id, ?side, "seat bound");
    let _ = tx.send(ServerFrame::Connected { seat: side });

    let writer = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            let Ok(text) = serde_json::to_string(&frame) else {
                continue;
            };
            if sink.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    let both_seated = {
        let guard = session.lock().unwrap();
        guard.seat_count() == 2 && guard.status() == SessionStatus::Waiting
    };
    if both_seated {
        if let Err(err) = scheduler::start_session(&state, &session) {
            warn!(session = %session_id, "auto-start failed: {err}");
        }
    }

    while let Some(Ok(message)) = stream.next().await {
        match message {
            Message::Text(text) => match serde_json::from_str::<ClientFrame>(&text) {
                Ok(frame) => handle_frame(&state, &session, side, frame, &tx),
                Err(err) => {
                    // bad input is answered on the same connection and never
                    // tears the session down
                    let _ = tx.send(ServerFrame::Error {
                        message: format!("invalid frame: {err}"),
                    });
                }
            },
            Message::Binary(_) => {
                let _ = tx.send(ServerFrame::Error {
                    message: "binary frames are not supported".into(),
                });
            }
            Message::Close(_) => break,
            Message::Ping(_) | Message::Pong(_) => {}
        }
    }

    drop(tx);
    state.sessions.handle_disconnect(&session_id, side);
    let _ = writer.await;
    debug!(session = %session_id, user = principal.id, ?side, "seat released");
}

fn handle_frame(
    state: &AppState,
    session: &SharedSession,
    side: Side,
    frame: ClientFrame,
    tx: &mpsc::UnboundedSender<ServerFrame>,
) {
    match frame {
        ClientFrame::Paddle { direction } => {
            session.lock().unwrap().apply_intent(side, direction);
        }
        ClientFrame::Start => {
            if let Err(err) = scheduler::start_session(state, session) {
                let _ = tx.send(ServerFrame::Error {
                    message: err.to_string(),
                });
            }
        }
        ClientFrame::Stop => scheduler::stop_session(session),
        ClientFrame::Ping => {
            let _ = tx.send(ServerFrame::Pong);
        }
    }
}
