//! Tessella Board - Collaborative Pixel Canvas Core
//!
//! This crate provides the core of the shared pixel canvas:
//! - Board: the authoritative in-memory RGBA grid and mutation validation
//! - Cooldown: per-device minimum interval between accepted writes
//! - Device: opaque token issuance and cookie handling
//! - Broadcast: full-frame fan-out to every connected viewer
//! - Store: SQLite reconciliation (seed, reload, per-pixel and bulk writes)
//! - Persist: fire-and-forget persistence worker behind a bounded queue
//! - Reset: shared-secret guard for the full-board reset
//! - Service: the single object owning board + ledger under one lock
//!
//! ## Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use tessella_board::{
//!     BoardService, BoardStore, PersistHandle, ResetGuard, Rgb,
//!     spawn_persistence_worker,
//! };
//!
//! let store = Arc::new(BoardStore::new(pool));
//! store.init().await?;
//! let board = store.load_or_initialize(16, 16, Rgb::WHITE).await?;
//! let persist = spawn_persistence_worker(store.clone());
//! let guard = ResetGuard::new(digest_from_config);
//! let service = Arc::new(BoardService::new(board, store, persist, guard, 10));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod board;
pub mod broadcast;
pub mod cooldown;
pub mod device;
pub mod error;
pub mod persist;
pub mod protocol;
pub mod reset;
pub mod service;
pub mod store;

// Re-export main types
pub use board::{ColorInput, PixelBoard, PixelChange, PlacePixelRequest, Rgb};
pub use broadcast::BroadcastHub;
pub use cooldown::CooldownLedger;
pub use device::{generate_token, issue_cookie, token_from_cookie_header, DEVICE_COOKIE};
pub use error::{Error, Result};
pub use persist::{spawn_persistence_worker, PersistHandle};
pub use protocol::{ClientMessage, ServerMessage, SYNC_GROUP};
pub use reset::ResetGuard;
pub use service::BoardService;
pub use store::BoardStore;
