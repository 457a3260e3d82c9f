//! Push channel: one websocket per observer.
//!
//! The socket is write-only from the server's side. Each observer gets the
//! current snapshot on connect and a fresh snapshot after every mutation.
//! Anything the client sends is ignored, apart from close.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use tracing::{debug, error};
use wow_engine::MutationEngine;

use crate::router::AppState;

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| observe(socket, state.engine))
}

async fn observe(socket: WebSocket, engine: Arc<MutationEngine>) {
    let mut subscription = match engine.connect_observer().await {
        Ok(subscription) => subscription,
        Err(err) => {
            error!(error = %err, "could not register observer");
            return;
        }
    };
    let id = subscription.id();
    debug!(observer = %id, "push channel open");

    let (mut sink, mut stream) = socket.split();
    loop {
        tokio::select! {
            frame = subscription.recv() => match frame {
                Some(frame) => {
                    if sink.send(Message::Text(frame.to_string())).await.is_err() {
                        break;
                    }
                }
                // Pruned by the hub.
                None => break,
            },
            incoming = stream.next() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => debug!(observer = %id, "ignoring inbound message"),
            },
        }
    }

    engine.disconnect_observer(id);
    debug!(observer = %id, "push channel closed");
}
