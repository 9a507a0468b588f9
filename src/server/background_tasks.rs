//! Background task startup functions
//!
//! Contains the periodic cooldown ledger sweep.

use std::sync::Arc;
use tessella_board::BoardService;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Start the ledger sweep task.
///
/// Every `interval_secs` the sweep checks the live viewer count and, if it is
/// zero, drops every cooldown entry. This bounds ledger growth between busy
/// periods; it is an approximate cleanup, not a per-device expiry, and a
/// device cleared this way is simply re-registered on its next handshake.
pub fn start_ledger_sweep(
    service: Arc<BoardService>,
    interval_secs: u64,
    shutdown: CancellationToken,
) {
    tokio::spawn(async move {
        let interval = tokio::time::Duration::from_secs(interval_secs);
        loop {
            tokio::select! {
                _ = tokio::time::sleep(interval) => {
                    let dropped = service.clear_ledger_if_idle().await;
                    if dropped > 0 {
                        info!(dropped, "Ledger sweep: no viewers connected, cleared entries");
                    } else {
                        debug!(viewers = service.viewer_count(), "Ledger sweep: nothing to clear");
                    }
                }
                _ = shutdown.cancelled() => {
                    info!("Ledger sweep shutting down");
                    break;
                }
            }
        }
    });
    info!(interval_secs, "Ledger sweep task started");
}
