//! HTTP routes
//!
//! | Path                       | Method | Operation                |
//! |----------------------------|--------|--------------------------|
//! | `/api/leaderboard/submit`  | POST   | submit a score           |
//! | `/api/leaderboard/get`     | GET    | top-N query              |
//! | `/api/leaderboard/delete`  | POST   | remove a player          |
//! | `/api/leaderboard/ws`      | GET    | websocket live updates   |

use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use crate::actor::LeaderboardHandle;
use crate::error::LeaderboardError;
use crate::protocol::{
    DeleteRequest, ErrorResponse, LeaderboardResponse, SubmitRequest, SuccessResponse,
};

use super::ws;

/// Build the leaderboard router
pub fn router(handle: LeaderboardHandle, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/api/leaderboard/submit", post(submit))
        .route("/api/leaderboard/get", get(get_leaderboard))
        .route("/api/leaderboard/delete", post(delete))
        .route("/api/leaderboard/ws", get(ws::upgrade))
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(handle)
}

#[derive(Debug, Deserialize)]
struct GetParams {
    limit: Option<usize>,
}

async fn submit(State(handle): State<LeaderboardHandle>, body: Bytes) -> Response {
    let submission = match serde_json::from_slice::<SubmitRequest>(&body) {
        Ok(request) => request.validate(),
        Err(e) => {
            tracing::debug!(error = %e, "Undecodable submit body");
            return bad_request("Invalid request");
        }
    };

    let submission = match submission {
        Ok(submission) => submission,
        Err(e) => {
            tracing::debug!(error = %e, "Invalid submission");
            return bad_request("Invalid request");
        }
    };

    match handle.submit(submission).await {
        Ok(_) => Json(SuccessResponse::ok()).into_response(),
        Err(e) => error_response(e, "Invalid request"),
    }
}

async fn get_leaderboard(
    State(handle): State<LeaderboardHandle>,
    Query(params): Query<GetParams>,
) -> Response {
    let limit = params.limit.unwrap_or(handle.default_limit());

    match handle.get_leaderboard(limit).await {
        Ok(leaderboard) => Json(LeaderboardResponse { leaderboard }).into_response(),
        Err(e) => error_response(e, "Invalid request"),
    }
}

async fn delete(State(handle): State<LeaderboardHandle>, body: Bytes) -> Response {
    let player_id = match serde_json::from_slice::<DeleteRequest>(&body)
        .ok()
        .and_then(|request| request.player_id())
    {
        Some(id) => id,
        None => return bad_request("Player ID is required"),
    };

    match handle.delete_score(&player_id).await {
        Ok(_) => Json(SuccessResponse::with_message(format!(
            "Player {player_id} deleted"
        )))
        .into_response(),
        Err(e) => error_response(e, "Player ID is required"),
    }
}

async fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "Not found").into_response()
}

fn bad_request(message: &'static str) -> Response {
    (StatusCode::BAD_REQUEST, message).into_response()
}

fn error_response(err: LeaderboardError, validation_message: &'static str) -> Response {
    match err {
        LeaderboardError::Validation(_) => bad_request(validation_message),
        err => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: err.to_string(),
            }),
        )
            .into_response(),
    }
}
