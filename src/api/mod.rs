//! Web API module for Tessella
//!
//! Provides REST endpoints for:
//! - Reading the full board
//! - Submitting single-pixel mutations
//! - The secret-gated full reset
//! - Health checks

pub mod board;
pub mod health;

use axum::Router;
use std::sync::Arc;
use tessella_board::BoardService;

pub use board::board_routes;
pub use health::health_routes;

/// Create the API router with all endpoints
pub fn api_router(service: Arc<BoardService>) -> Router {
    Router::new()
        .merge(board_routes(service))
        .merge(health_routes())
}
