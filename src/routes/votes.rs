use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    routing::{get, post},
};

use crate::{
    dto::room::{RoundVotesResponse, SubmitVoteRequest, VoteRecord},
    error::AppError,
    routes::auth::require_identity,
    services::vote_service,
    state::{
        SharedState,
        room::{MemberId, RoomCode},
    },
};

/// Vote casting and round history routes. Every route requires a bearer token.
pub fn router(state: SharedState) -> Router<SharedState> {
    Router::new()
        .route("/rooms/{code}/vote", post(submit_vote))
        .route("/rooms/{code}/rounds/{round}/votes", get(round_votes))
        .route_layer(middleware::from_fn_with_state(state, require_identity))
}

/// Cast or replace the caller's vote for the current round.
#[utoipa::path(
    post,
    path = "/rooms/{code}/vote",
    tag = "votes",
    security(("bearer" = [])),
    params(("code" = String, Path, description = "Room code, any letter case")),
    request_body = SubmitVoteRequest,
    responses(
        (status = 204, description = "Vote recorded"),
        (status = 400, description = "Value outside the deck", body = crate::error::ErrorBody),
        (status = 403, description = "Caller is not a member", body = crate::error::ErrorBody),
        (status = 404, description = "Room not found", body = crate::error::ErrorBody),
        (status = 409, description = "Votes are already revealed", body = crate::error::ErrorBody)
    )
)]
pub async fn submit_vote(
    State(state): State<SharedState>,
    Extension(member): Extension<MemberId>,
    Path(code): Path<String>,
    Json(payload): Json<SubmitVoteRequest>,
) -> Result<StatusCode, AppError> {
    let code = RoomCode::parse(&code)?;
    vote_service::submit_vote(&state, &code, &member, &payload.value).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Read every vote of a played round. Host only.
#[utoipa::path(
    get,
    path = "/rooms/{code}/rounds/{round}/votes",
    tag = "votes",
    security(("bearer" = [])),
    params(
        ("code" = String, Path, description = "Room code, any letter case"),
        ("round" = u32, Path, description = "Round number, starting at 1")
    ),
    responses(
        (status = 200, description = "Votes of the round in join order", body = RoundVotesResponse),
        (status = 403, description = "Caller is not the host", body = crate::error::ErrorBody),
        (status = 404, description = "Room or round not found", body = crate::error::ErrorBody),
        (status = 409, description = "Round still open", body = crate::error::ErrorBody)
    )
)]
pub async fn round_votes(
    State(state): State<SharedState>,
    Extension(member): Extension<MemberId>,
    Path((code, round)): Path<(String, u32)>,
) -> Result<Json<RoundVotesResponse>, AppError> {
    let code = RoomCode::parse(&code)?;
    let votes = vote_service::round_history(&state, &code, &member, round).await?;
    Ok(Json(RoundVotesResponse {
        code: code.to_string(),
        round,
        votes: votes.iter().map(VoteRecord::from).collect(),
    }))
}
