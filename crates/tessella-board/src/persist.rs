//! Asynchronous persistence worker
//!
//! Accepted mutations are durable at-most-once. The mutation path enqueues a
//! write and returns without awaiting it; a dedicated worker task drains the
//! queue. Failures are logged with enough context to reconcile by hand but
//! never propagate back to the client: the in-memory board stays the source
//! of truth for the live session, and durability is observed on the next
//! process restart.

use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

use crate::board::Rgb;
use crate::store::BoardStore;

/// Queued writes before enqueue starts dropping
const QUEUE_CAPACITY: usize = 256;

#[derive(Debug)]
enum PersistCommand {
    Pixel { index: u64, color: Rgb },
}

/// Fire-and-forget handle to the persistence worker
#[derive(Clone)]
pub struct PersistHandle {
    tx: mpsc::Sender<PersistCommand>,
}

impl PersistHandle {
    /// Queue one pixel write without waiting for durability.
    ///
    /// A full queue drops the write and logs it; the at-most-once contract
    /// already tolerates lost writes.
    pub fn enqueue_pixel(&self, index: u64, color: Rgb) {
        if self
            .tx
            .try_send(PersistCommand::Pixel { index, color })
            .is_err()
        {
            warn!(
                pixel = index,
                r = color.r,
                g = color.g,
                b = color.b,
                "Persistence queue full, dropping pixel write"
            );
        }
    }
}

/// Spawn the worker task draining queued writes into the store.
///
/// The worker exits once every handle is dropped and the queue is empty.
pub fn spawn_persistence_worker(store: Arc<BoardStore>) -> PersistHandle {
    let (tx, mut rx) = mpsc::channel(QUEUE_CAPACITY);

    tokio::spawn(async move {
        while let Some(command) = rx.recv().await {
            match command {
                PersistCommand::Pixel { index, color } => {
                    if let Err(err) = store.persist_pixel(index, color).await {
                        error!(
                            pixel = index,
                            r = color.r,
                            g = color.g,
                            b = color.b,
                            error = %err,
                            "Failed to persist pixel write"
                        );
                    }
                }
            }
        }
        debug!("Persistence worker stopped");
    });

    PersistHandle { tx }
}
