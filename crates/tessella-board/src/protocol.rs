//! Sync channel protocol
//!
//! Message types for the `pixel-sync` WebSocket group. There is no explicit
//! subscribe message: joining the group is implicit on connection, and the
//! server pushes full-frame updates rather than diffs.

use serde::{Deserialize, Serialize};

/// The single logical group every viewer joins on connect
pub const SYNC_GROUP: &str = "pixel-sync";

/// Messages sent from client to server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Keep-alive
    Ping,
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// Full-frame sync: the whole board as RGBA bytes, row-major
    #[serde(rename = "canvas updated")]
    CanvasUpdated {
        /// Complete buffer snapshot, identical to the read-full-board encoding
        canvas: Vec<u8>,
    },

    /// Keep-alive reply
    #[serde(rename = "pong")]
    Pong,
}

impl ServerMessage {
    /// Build a full-frame update from a board snapshot
    #[must_use]
    pub fn canvas_updated(snapshot: Vec<u8>) -> Self {
        Self::CanvasUpdated { canvas: snapshot }
    }
}
