//! Broadcast hub
//!
//! Fans board updates out to every subscribed viewer with best-effort
//! semantics: no acknowledgment, no retry, no backpressure. A slow receiver
//! that falls behind the channel buffer simply misses frames until the next
//! one arrives.

use tokio::sync::broadcast;

use crate::protocol::ServerMessage;

/// Frames buffered per subscriber before a lagging receiver starts missing
const CHANNEL_CAPACITY: usize = 64;

/// Single-group fan-out for board updates.
///
/// Receivers subscribe on connection and are implicitly pruned when their
/// connection task drops; `viewer_count` is therefore the live-connection
/// count used by the ledger sweep.
#[derive(Debug)]
pub struct BroadcastHub {
    tx: broadcast::Sender<ServerMessage>,
}

impl BroadcastHub {
    /// Create a hub with no subscribers
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Join the group
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ServerMessage> {
        self.tx.subscribe()
    }

    /// Emit one full-frame update to every viewer.
    ///
    /// A send with zero subscribers is not an error; the frame is dropped.
    pub fn publish_frame(&self, snapshot: Vec<u8>) {
        let _ = self.tx.send(ServerMessage::canvas_updated(snapshot));
    }

    /// Number of currently connected viewers
    #[must_use]
    pub fn viewer_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for BroadcastHub {
    fn default() -> Self {
        Self::new()
    }
}
