//! Pixel sync channel
//!
//! Every viewer joins the single `pixel-sync` group implicitly on connect;
//! there is no subscribe message. The handshake doubles as the device
//! identity issuance point: a request presenting no recognized token gets a
//! fresh one on the upgrade response, registered before any mutation can
//! reference it. Fan-out is best effort; a viewer that falls behind just
//! misses frames until the next one.

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    http::{
        header::{COOKIE, SET_COOKIE},
        HeaderMap, HeaderValue,
    },
    response::Response,
    routing::get,
    Router,
};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tessella_board::{
    generate_token, issue_cookie, token_from_cookie_header, BoardService, ClientMessage,
    ServerMessage, SYNC_GROUP,
};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Sync channel router
pub fn sync_routes(service: Arc<BoardService>) -> Router {
    Router::new()
        .route("/ws/pixel-sync", get(sync_handler))
        .with_state(service)
}

/// WebSocket upgrade handler.
///
/// Recognize-or-issue runs here, once per new device: a presented token that
/// matches a ledger entry is left alone; anything else gets a fresh token
/// attached to the upgrade response as a `device-id` cookie.
async fn sync_handler(
    ws: WebSocketUpgrade,
    State(service): State<Arc<BoardService>>,
    headers: HeaderMap,
) -> Response {
    let presented = headers
        .get(COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(token_from_cookie_header);

    let recognized = match &presented {
        Some(token) => service.is_registered(token).await,
        None => false,
    };
    let issued = if recognized {
        None
    } else {
        let token = generate_token();
        service.register_device(&token).await;
        info!(group = SYNC_GROUP, "Issued new device token");
        Some(token)
    };

    let mut response = ws.on_upgrade(move |socket| handle_socket(socket, service));
    if let Some(token) = issued {
        if let Ok(value) = HeaderValue::from_str(&issue_cookie(&token)) {
            response.headers_mut().append(SET_COOKIE, value);
        }
    }
    response
}

/// Handle one viewer connection
async fn handle_socket(socket: WebSocket, service: Arc<BoardService>) {
    let connection_id = Uuid::new_v4();
    info!(
        connection_id = %connection_id,
        group = SYNC_GROUP,
        "Viewer connected"
    );

    let (mut sender, mut receiver) = socket.split();
    let mut updates = service.hub().subscribe();

    // A late joiner should not have to wait for the next mutation to render
    let welcome = ServerMessage::canvas_updated(service.snapshot().await);
    if send_message(&mut sender, &welcome).await.is_err() {
        return;
    }

    // Forward broadcast frames to this viewer
    let sender = Arc::new(tokio::sync::Mutex::new(sender));
    let sender_for_updates = sender.clone();
    let forward_handle = tokio::spawn(async move {
        loop {
            match updates.recv().await {
                Ok(message) => {
                    let mut sender = sender_for_updates.lock().await;
                    if send_message(&mut sender, &message).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(missed)) => {
                    // The next frame carries the whole board; nothing to replay
                    debug!(connection_id = %connection_id, missed, "Viewer lagging behind broadcast");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    // Main message loop
    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(ClientMessage::Ping) => {
                    let mut sender = sender.lock().await;
                    let _ = send_message(&mut sender, &ServerMessage::Pong).await;
                }
                Err(err) => {
                    debug!(connection_id = %connection_id, error = %err, "Ignoring unknown client message");
                }
            },
            Ok(Message::Close(_)) => {
                info!(connection_id = %connection_id, "Viewer closed connection");
                break;
            }
            Ok(Message::Ping(data)) => {
                let mut sender = sender.lock().await;
                let _ = sender.send(Message::Pong(data)).await;
            }
            Err(err) => {
                warn!(connection_id = %connection_id, error = %err, "WebSocket error");
                break;
            }
            _ => {}
        }
    }

    forward_handle.abort();
    info!(connection_id = %connection_id, "Viewer disconnected");
}

/// Send a server message as JSON text
async fn send_message(
    sender: &mut futures::stream::SplitSink<WebSocket, Message>,
    message: &ServerMessage,
) -> Result<(), String> {
    let json = serde_json::to_string(message).map_err(|e| e.to_string())?;
    sender
        .send(Message::Text(json))
        .await
        .map_err(|e| e.to_string())
}
