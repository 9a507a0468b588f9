//! WebSocket transport for Tessella
//!
//! Delivers full-frame board updates to every connected viewer and issues
//! device credentials on the handshake.

pub mod sync;

pub use sync::sync_routes;
