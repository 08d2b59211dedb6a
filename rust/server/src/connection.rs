//! Per-socket lifecycle: the join handshake, the frame pump into the
//! coordinator, and the writer task draining this bot's outbound queue.

use std::time::Duration;

use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};
use warp::ws::{Message, WebSocket};

use crate::coordinator::{Command, ConnectionHandle, OUTBOUND_QUEUE_CAPACITY};
use crate::protocol::{classify_frame, ErrorCode, InboundFrame, ServerMessage};

use pokerd_engine::tournament::MAX_NAME_LEN;

/// How long a fresh connection has to present its join message.
pub const JOIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Drive one bot connection from handshake to disconnect.
pub async fn handle_connection(ws: WebSocket, commands: mpsc::Sender<Command>) {
    let (mut sink, mut stream) = ws.split();

    // ---- join handshake: one valid join frame within the deadline ----
    let first = match tokio::time::timeout(JOIN_TIMEOUT, next_text(&mut stream)).await {
        Ok(Some(text)) => text,
        Ok(None) => return,
        Err(_) => {
            send_direct(
                &mut sink,
                ServerMessage::error(
                    ErrorCode::BadJoin,
                    "No join message received within 10 seconds.",
                ),
            )
            .await;
            return;
        }
    };

    let name = match classify_frame(&first) {
        InboundFrame::Join { name } => name,
        InboundFrame::BadJson => {
            send_direct(
                &mut sink,
                ServerMessage::error(ErrorCode::BadJoin, "Expected JSON 'join' message."),
            )
            .await;
            return;
        }
        InboundFrame::Action { .. } | InboundFrame::UnknownType { .. } => {
            send_direct(
                &mut sink,
                ServerMessage::error(
                    ErrorCode::BadJoin,
                    "First message must be {\"type\": \"join\", \"name\": \"...\"}.",
                ),
            )
            .await;
            return;
        }
    };

    if name.is_empty() || name.chars().count() > MAX_NAME_LEN {
        send_direct(
            &mut sink,
            ServerMessage::error(
                ErrorCode::BadName,
                "Name must be 1-32 non-whitespace characters.",
            ),
        )
        .await;
        return;
    }

    // ---- registration ----
    let (out_tx, mut out_rx) = mpsc::channel::<ServerMessage>(OUTBOUND_QUEUE_CAPACITY);
    let (reply_tx, reply_rx) = oneshot::channel();
    if commands
        .send(Command::Join {
            name: name.clone(),
            handle: ConnectionHandle::new(out_tx.clone()),
            reply: reply_tx,
        })
        .await
        .is_err()
    {
        return;
    }
    let seat = match reply_rx.await {
        Ok(Ok(seat)) => seat,
        Ok(Err((code, message))) => {
            send_direct(&mut sink, ServerMessage::error(code, message)).await;
            return;
        }
        // the coordinator is gone; the tournament ended under us
        Err(_) => {
            send_direct(
                &mut sink,
                ServerMessage::error(
                    ErrorCode::TournamentStarted,
                    "Tournament already in progress.",
                ),
            )
            .await;
            return;
        }
    };
    info!(seat, name = %name, "registered");

    // ---- writer: drain the outbound queue onto the socket ----
    let writer = tokio::spawn(async move {
        while let Some(msg) = out_rx.recv().await {
            let text = match serde_json::to_string(&msg) {
                Ok(text) => text,
                Err(err) => {
                    warn!(error = %err, "unserializable outbound message dropped");
                    continue;
                }
            };
            if sink.send(Message::text(text)).await.is_err() {
                break;
            }
        }
        let _ = sink.close().await;
    });

    // ---- message pump ----
    while let Some(text) = next_text(&mut stream).await {
        match classify_frame(&text) {
            InboundFrame::Action { payload } => {
                if commands
                    .send(Command::Action { seat, payload })
                    .await
                    .is_err()
                {
                    break;
                }
            }
            InboundFrame::BadJson => {
                let err =
                    ServerMessage::error(ErrorCode::BadJson, "Message is not valid JSON.");
                if out_tx.try_send(err).is_err() {
                    break;
                }
            }
            InboundFrame::Join { .. } => {
                let err = ServerMessage::error(
                    ErrorCode::UnknownType,
                    "Unknown message type: 'join'. Expected 'action'.",
                );
                if out_tx.try_send(err).is_err() {
                    break;
                }
            }
            InboundFrame::UnknownType { found } => {
                let err = ServerMessage::error(
                    ErrorCode::UnknownType,
                    format!("Unknown message type: {found:?}. Expected 'action'."),
                );
                if out_tx.try_send(err).is_err() {
                    break;
                }
            }
        }
    }

    debug!(seat, "connection closed");
    let _ = commands.send(Command::Disconnect { seat }).await;
    writer.abort();
}

/// Next inbound text frame, skipping pings and binary noise. None on
/// close or transport error.
async fn next_text(
    stream: &mut (impl StreamExt<Item = Result<Message, warp::Error>> + Unpin),
) -> Option<String> {
    while let Some(frame) = stream.next().await {
        match frame {
            Ok(msg) if msg.is_text() => {
                return msg.to_str().ok().map(str::to_string);
            }
            Ok(msg) if msg.is_close() => return None,
            Ok(_) => continue,
            Err(_) => return None,
        }
    }
    None
}

async fn send_direct(sink: &mut SplitSink<WebSocket, Message>, msg: ServerMessage) {
    if let Ok(text) = serde_json::to_string(&msg) {
        let _ = sink.send(Message::text(text)).await;
    }
    let _ = sink.close().await;
}
