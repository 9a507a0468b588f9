//! Board endpoints
//!
//! - `GET /api/board` — full RGBA buffer as a JSON byte array
//! - `POST /api/board/pixel` — one cooldown-gated pixel write
//! - `POST /api/board/reset` — secret-gated full reset
//!
//! Mutation rejections (missing/unknown credential, too soon, bad
//! coordinates or color, malformed body) all map to 400 with a distinct
//! plain-text reason. An accepted mutation returns 202: propagation happens
//! over the sync channel, and durability is not awaited.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    extract::{Query, State},
    http::{header::COOKIE, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tessella_board::{token_from_cookie_header, BoardService, Error, PlacePixelRequest, Rgb};
use tracing::warn;

/// Board endpoint router
pub fn board_routes(service: Arc<BoardService>) -> Router {
    Router::new()
        .route("/api/board", get(get_board))
        .route("/api/board/pixel", post(place_pixel))
        .route("/api/board/reset", post(reset_board))
        .with_state(service)
}

/// Full current board state, straight from memory
async fn get_board(State(service): State<Arc<BoardService>>) -> Json<Vec<u8>> {
    Json(service.snapshot().await)
}

/// Submit one pixel mutation
async fn place_pixel(
    State(service): State<Arc<BoardService>>,
    headers: HeaderMap,
    payload: Result<Json<PlacePixelRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match payload {
        Ok(json) => json,
        Err(rejection) => {
            return (StatusCode::BAD_REQUEST, rejection.body_text()).into_response()
        }
    };

    let token = headers
        .get(COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(token_from_cookie_header);

    match service.place_pixel(token.as_deref(), &req).await {
        Ok(()) => StatusCode::ACCEPTED.into_response(),
        Err(err) if err.is_rejection() => {
            (StatusCode::BAD_REQUEST, err.to_string()).into_response()
        }
        Err(err) => {
            warn!(error = %err, "Pixel mutation failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "internal error").into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
struct ResetParams {
    /// Target color as a comma-separated "r,g,b" triplet
    color: String,
    /// Candidate reset secret
    secret: String,
}

/// Reset every pixel to one color, gated by the shared secret.
///
/// The success response is sent only after the bulk persistence write has
/// completed; a secret mismatch answers with plain text rather than an error
/// status, matching the original endpoint behavior.
async fn reset_board(
    State(service): State<Arc<BoardService>>,
    params: Result<Query<ResetParams>, QueryRejection>,
) -> Response {
    let Query(params) = match params {
        Ok(query) => query,
        Err(rejection) => {
            return (StatusCode::BAD_REQUEST, rejection.body_text()).into_response()
        }
    };

    let color: Rgb = match params.color.parse() {
        Ok(color) => color,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                "malformed color, expected \"r,g,b\"",
            )
                .into_response()
        }
    };

    match service.reset(&params.secret, color).await {
        Ok(()) => (StatusCode::OK, "board reset").into_response(),
        Err(Error::WrongSecret) => (StatusCode::OK, "wrong guess").into_response(),
        Err(err) => {
            warn!(error = %err, "Board reset failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "internal error").into_response()
        }
    }
}
