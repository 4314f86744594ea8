use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    middleware,
    routing::{get, post},
};
use validator::Validate;

use crate::{
    dto::{
        phase::VisibleRoomPhase,
        room::{
            CreateRoomRequest, CreateRoomResponse, JoinRoomRequest, JoinRoomResponse,
            KickMemberRequest, PhaseResponse, RemovalResponse, RoomSummary, SetTopicRequest,
            TopicResponse,
        },
        view::RoomView,
    },
    error::AppError,
    routes::auth::require_identity,
    services::{
        read_model,
        room_service::{self, JoinOutcome},
    },
    state::{
        SharedState,
        room::{MemberId, RoomCode},
    },
};

/// Room membership and round lifecycle routes. Every route requires a bearer token.
pub fn router(state: SharedState) -> Router<SharedState> {
    Router::new()
        .route("/rooms", get(list_rooms).post(create_room))
        .route("/rooms/{code}", get(get_room))
        .route("/rooms/{code}/join", post(join_room))
        .route("/rooms/{code}/leave", post(leave_room))
        .route("/rooms/{code}/kick", post(kick_member))
        .route("/rooms/{code}/topic", post(set_topic))
        .route("/rooms/{code}/reveal", post(reveal))
        .route("/rooms/{code}/versus", post(trigger_versus))
        .route("/rooms/{code}/next-round", post(next_round))
        .route_layer(middleware::from_fn_with_state(state, require_identity))
}

/// List the rooms the caller belongs to.
#[utoipa::path(
    get,
    path = "/rooms",
    tag = "rooms",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Rooms of the caller", body = [RoomSummary]),
        (status = 401, description = "Missing or unknown credential", body = crate::error::ErrorBody)
    )
)]
pub async fn list_rooms(
    State(state): State<SharedState>,
    Extension(member): Extension<MemberId>,
) -> Result<Json<Vec<RoomSummary>>, AppError> {
    Ok(Json(room_service::list_rooms(&state, &member).await?))
}

/// Open a room hosted by the caller.
#[utoipa::path(
    post,
    path = "/rooms",
    tag = "rooms",
    security(("bearer" = [])),
    request_body = CreateRoomRequest,
    responses(
        (status = 200, description = "Room created", body = CreateRoomResponse),
        (status = 400, description = "Invalid name or password", body = crate::error::ErrorBody)
    )
)]
pub async fn create_room(
    State(state): State<SharedState>,
    Extension(member): Extension<MemberId>,
    Json(payload): Json<CreateRoomRequest>,
) -> Result<Json<CreateRoomResponse>, AppError> {
    payload.validate()?;
    let code = room_service::create_room(
        &state,
        &member,
        &payload.name,
        payload.password.as_deref(),
    )
    .await?;
    Ok(Json(CreateRoomResponse {
        code: code.to_string(),
    }))
}

/// Poll the caller's view of a room.
#[utoipa::path(
    get,
    path = "/rooms/{code}",
    tag = "rooms",
    security(("bearer" = [])),
    params(("code" = String, Path, description = "Room code, any letter case")),
    responses(
        (status = 200, description = "Room view", body = RoomView),
        (status = 403, description = "Caller is not a member", body = crate::error::ErrorBody),
        (status = 404, description = "Room not found", body = crate::error::ErrorBody)
    )
)]
pub async fn get_room(
    State(state): State<SharedState>,
    Extension(member): Extension<MemberId>,
    Path(code): Path<String>,
) -> Result<Json<RoomView>, AppError> {
    let code = RoomCode::parse(&code)?;
    Ok(Json(read_model::room_view(&state, &code, &member).await?))
}

/// Join a room. Send `{}` when the room has no password.
#[utoipa::path(
    post,
    path = "/rooms/{code}/join",
    tag = "rooms",
    security(("bearer" = [])),
    params(("code" = String, Path, description = "Room code, any letter case")),
    request_body = JoinRoomRequest,
    responses(
        (status = 200, description = "Caller is a member", body = JoinRoomResponse),
        (status = 403, description = "Wrong or missing password", body = crate::error::ErrorBody),
        (status = 404, description = "Room not found", body = crate::error::ErrorBody)
    )
)]
pub async fn join_room(
    State(state): State<SharedState>,
    Extension(member): Extension<MemberId>,
    Path(code): Path<String>,
    Json(payload): Json<JoinRoomRequest>,
) -> Result<Json<JoinRoomResponse>, AppError> {
    payload.validate()?;
    let code = RoomCode::parse(&code)?;
    let outcome =
        room_service::join_room(&state, &code, &member, payload.password.as_deref()).await?;
    Ok(Json(JoinRoomResponse {
        code: code.to_string(),
        already_member: outcome == JoinOutcome::AlreadyMember,
    }))
}

/// Leave a room. The room is deleted when the last member leaves.
#[utoipa::path(
    post,
    path = "/rooms/{code}/leave",
    tag = "rooms",
    security(("bearer" = [])),
    params(("code" = String, Path, description = "Room code, any letter case")),
    responses(
        (status = 200, description = "Caller left the room", body = RemovalResponse),
        (status = 403, description = "Caller is not a member", body = crate::error::ErrorBody),
        (status = 404, description = "Room not found", body = crate::error::ErrorBody)
    )
)]
pub async fn leave_room(
    State(state): State<SharedState>,
    Extension(member): Extension<MemberId>,
    Path(code): Path<String>,
) -> Result<Json<RemovalResponse>, AppError> {
    let code = RoomCode::parse(&code)?;
    let outcome = room_service::leave_room(&state, &code, &member).await?;
    Ok(Json(RemovalResponse::new(&code, &member, outcome)))
}

/// Remove another member. Host only.
#[utoipa::path(
    post,
    path = "/rooms/{code}/kick",
    tag = "rooms",
    security(("bearer" = [])),
    params(("code" = String, Path, description = "Room code, any letter case")),
    request_body = KickMemberRequest,
    responses(
        (status = 200, description = "Member removed", body = RemovalResponse),
        (status = 400, description = "Host tried to kick themselves", body = crate::error::ErrorBody),
        (status = 403, description = "Caller is not the host", body = crate::error::ErrorBody),
        (status = 404, description = "Room or member not found", body = crate::error::ErrorBody)
    )
)]
pub async fn kick_member(
    State(state): State<SharedState>,
    Extension(member): Extension<MemberId>,
    Path(code): Path<String>,
    Json(payload): Json<KickMemberRequest>,
) -> Result<Json<RemovalResponse>, AppError> {
    payload.validate()?;
    let code = RoomCode::parse(&code)?;
    let target = MemberId::new(payload.member_id);
    let outcome = room_service::kick_member(&state, &code, &member, &target).await?;
    Ok(Json(RemovalResponse::new(&code, &target, outcome)))
}

/// Set or clear the topic. Host only.
#[utoipa::path(
    post,
    path = "/rooms/{code}/topic",
    tag = "rooms",
    security(("bearer" = [])),
    params(("code" = String, Path, description = "Room code, any letter case")),
    request_body = SetTopicRequest,
    responses(
        (status = 200, description = "Topic updated", body = TopicResponse),
        (status = 403, description = "Caller is not the host", body = crate::error::ErrorBody),
        (status = 404, description = "Room not found", body = crate::error::ErrorBody)
    )
)]
pub async fn set_topic(
    State(state): State<SharedState>,
    Extension(member): Extension<MemberId>,
    Path(code): Path<String>,
    Json(payload): Json<SetTopicRequest>,
) -> Result<Json<TopicResponse>, AppError> {
    payload.validate()?;
    let code = RoomCode::parse(&code)?;
    let topic = room_service::set_topic(&state, &code, &member, payload.topic.as_deref()).await?;
    Ok(Json(TopicResponse { topic }))
}

/// Reveal the votes of the current round. Host only.
#[utoipa::path(
    post,
    path = "/rooms/{code}/reveal",
    tag = "rooms",
    security(("bearer" = [])),
    params(("code" = String, Path, description = "Room code, any letter case")),
    responses(
        (status = 200, description = "Votes revealed", body = PhaseResponse),
        (status = 403, description = "Caller is not the host", body = crate::error::ErrorBody),
        (status = 409, description = "Room is not voting", body = crate::error::ErrorBody)
    )
)]
pub async fn reveal(
    State(state): State<SharedState>,
    Extension(member): Extension<MemberId>,
    Path(code): Path<String>,
) -> Result<Json<PhaseResponse>, AppError> {
    let code = RoomCode::parse(&code)?;
    let room = room_service::reveal(&state, &code, &member).await?;
    Ok(Json(PhaseResponse::from(&room)))
}

/// Compare the lowest and highest voters. Host only.
#[utoipa::path(
    post,
    path = "/rooms/{code}/versus",
    tag = "rooms",
    security(("bearer" = [])),
    params(("code" = String, Path, description = "Room code, any letter case")),
    responses(
        (status = 200, description = "Versus started", body = PhaseResponse),
        (status = 403, description = "Caller is not the host", body = crate::error::ErrorBody),
        (status = 409, description = "Votes are not revealed", body = crate::error::ErrorBody)
    )
)]
pub async fn trigger_versus(
    State(state): State<SharedState>,
    Extension(member): Extension<MemberId>,
    Path(code): Path<String>,
) -> Result<Json<PhaseResponse>, AppError> {
    let code = RoomCode::parse(&code)?;
    let room = room_service::trigger_versus(&state, &code, &member).await?;
    Ok(Json(PhaseResponse::from(&room)))
}

/// Start the next round. Host only, from any phase.
#[utoipa::path(
    post,
    path = "/rooms/{code}/next-round",
    tag = "rooms",
    security(("bearer" = [])),
    params(("code" = String, Path, description = "Room code, any letter case")),
    responses(
        (status = 200, description = "New round started", body = PhaseResponse),
        (status = 403, description = "Caller is not the host", body = crate::error::ErrorBody),
        (status = 404, description = "Room not found", body = crate::error::ErrorBody)
    )
)]
pub async fn next_round(
    State(state): State<SharedState>,
    Extension(member): Extension<MemberId>,
    Path(code): Path<String>,
) -> Result<Json<PhaseResponse>, AppError> {
    let code = RoomCode::parse(&code)?;
    let round = room_service::next_round(&state, &code, &member).await?;
    Ok(Json(PhaseResponse {
        code: code.to_string(),
        phase: VisibleRoomPhase::Voting,
        round,
    }))
}
