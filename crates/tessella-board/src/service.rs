//! Board service
//!
//! The single service object owning the board and the cooldown ledger,
//! constructed once at startup and shared by reference with every handler.
//! One mutex guards the pair; cooldown check-and-consume, the buffer write,
//! and the snapshot capture execute as one critical section with no await
//! point inside, so per-device mutations are totally ordered and a broadcast
//! frame always reflects the buffer at the instant of emission.

use chrono::Duration;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info};

use crate::board::{PixelBoard, PlacePixelRequest, Rgb};
use crate::broadcast::BroadcastHub;
use crate::cooldown::CooldownLedger;
use crate::error::{Error, Result};
use crate::persist::PersistHandle;
use crate::reset::ResetGuard;
use crate::store::BoardStore;

struct Shared {
    board: PixelBoard,
    ledger: CooldownLedger,
}

/// Shared state and orchestration for the collaborative board
pub struct BoardService {
    shared: Mutex<Shared>,
    hub: BroadcastHub,
    store: Arc<BoardStore>,
    persist: PersistHandle,
    guard: ResetGuard,
    cooldown: Duration,
}

impl BoardService {
    /// Assemble the service from its parts
    #[must_use]
    pub fn new(
        board: PixelBoard,
        store: Arc<BoardStore>,
        persist: PersistHandle,
        guard: ResetGuard,
        cooldown_secs: u64,
    ) -> Self {
        Self {
            shared: Mutex::new(Shared {
                board,
                ledger: CooldownLedger::new(),
            }),
            hub: BroadcastHub::new(),
            store,
            persist,
            guard,
            cooldown: Duration::seconds(cooldown_secs as i64),
        }
    }

    /// The fan-out hub viewers subscribe to
    #[must_use]
    pub fn hub(&self) -> &BroadcastHub {
        &self.hub
    }

    /// Current board contents
    pub async fn snapshot(&self) -> Vec<u8> {
        self.shared.lock().await.board.snapshot()
    }

    /// Register a device token; no-op if already known
    pub async fn register_device(&self, token: &str) {
        self.shared.lock().await.ledger.register(token);
    }

    /// Whether a presented token matches a ledger entry
    pub async fn is_registered(&self, token: &str) -> bool {
        self.shared.lock().await.ledger.is_registered(token)
    }

    /// Validate, cooldown-gate, and apply one pixel mutation.
    ///
    /// On acceptance the new full frame is broadcast and the write is queued
    /// for persistence; neither is awaited for durability. Validation runs
    /// before the cooldown check so a rejected request never consumes the
    /// device's window.
    pub async fn place_pixel(&self, token: Option<&str>, req: &PlacePixelRequest) -> Result<()> {
        let token = token.ok_or(Error::MissingCredential)?;

        let (index, color) = {
            let mut shared = self.shared.lock().await;
            let change = shared.board.validate(req)?;
            shared.ledger.check_and_consume(token, self.cooldown)?;
            shared.board.apply(&change);
            // Emitting under the lock keeps frame order identical to buffer
            // order; the send itself never blocks
            self.hub.publish_frame(shared.board.snapshot());
            (
                shared.board.linear_index(change.x, change.y),
                change.color,
            )
        };

        self.persist.enqueue_pixel(index, color);
        Ok(())
    }

    /// Verify the shared secret, then reset every pixel to the given color.
    ///
    /// The new frame is broadcast immediately; the bulk persistence write is
    /// awaited before returning. A storage failure at that point is logged
    /// rather than surfaced, since the in-memory board has already moved.
    pub async fn reset(&self, candidate_secret: &str, color: Rgb) -> Result<()> {
        if !self.guard.verify(candidate_secret) {
            return Err(Error::WrongSecret);
        }

        {
            let mut shared = self.shared.lock().await;
            shared.board.full_reset(color);
            self.hub.publish_frame(shared.board.snapshot());
        }

        info!(r = color.r, g = color.g, b = color.b, "Board reset accepted");

        if let Err(err) = self.store.persist_all(color).await {
            error!(
                r = color.r,
                g = color.g,
                b = color.b,
                error = %err,
                "Failed to persist board reset"
            );
        }
        Ok(())
    }

    /// Drop all ledger entries if no viewer is connected.
    ///
    /// Called from the periodic sweep task; returns how many entries were
    /// dropped (zero when viewers are present or the ledger was empty).
    pub async fn clear_ledger_if_idle(&self) -> usize {
        if self.hub.viewer_count() > 0 {
            return 0;
        }
        self.shared.lock().await.ledger.clear()
    }

    /// Currently connected viewers
    #[must_use]
    pub fn viewer_count(&self) -> usize {
        self.hub.viewer_count()
    }

    /// Tracked device tokens
    pub async fn ledger_len(&self) -> usize {
        self.shared.lock().await.ledger.len()
    }
}
