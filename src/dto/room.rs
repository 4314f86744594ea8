use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    dao::models::{RoomEntity, VoteEntity},
    dto::{format_system_time, phase::VisibleRoomPhase},
    services::room_service::RemovalOutcome,
    state::room::{MemberId, RoomCode},
};

/// Payload used to open a new room.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateRoomRequest {
    /// Display name, at most 64 characters once trimmed.
    #[validate(length(min = 1))]
    pub name: String,
    /// Optional password members must provide to join.
    #[serde(default)]
    #[validate(length(max = 128))]
    pub password: Option<String>,
}

/// Payload accompanying a join request. Send `{}` for open rooms.
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub struct JoinRoomRequest {
    #[serde(default)]
    #[validate(length(max = 128))]
    pub password: Option<String>,
}

/// Host request to remove another member.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct KickMemberRequest {
    #[validate(length(min = 1))]
    pub member_id: String,
}

/// Host request to change the topic. `null` or a blank string clears it.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct SetTopicRequest {
    /// New topic, at most 256 characters once trimmed.
    #[serde(default)]
    pub topic: Option<String>,
}

/// Vote cast for the current round: one of `1 2 3 5 8 13 21 34 55 89 ?`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SubmitVoteRequest {
    pub value: String,
}

/// Code of a freshly created room.
#[derive(Debug, Serialize, ToSchema)]
pub struct CreateRoomResponse {
    pub code: String,
}

/// Result of a join request.
#[derive(Debug, Serialize, ToSchema)]
pub struct JoinRoomResponse {
    pub code: String,
    /// `true` when the caller was already a member and nothing changed.
    pub already_member: bool,
}

/// Result of a member leaving or being removed.
#[derive(Debug, Serialize, ToSchema)]
pub struct RemovalResponse {
    pub code: String,
    pub member_id: String,
    /// The last member left and the room no longer exists.
    pub room_deleted: bool,
    /// Member promoted to host, when the removed member was the host.
    pub new_host: Option<String>,
}

impl RemovalResponse {
    pub fn new(code: &RoomCode, member: &MemberId, outcome: RemovalOutcome) -> Self {
        Self {
            code: code.to_string(),
            member_id: member.to_string(),
            room_deleted: outcome.room_deleted,
            new_host: outcome.new_host.map(|host| host.to_string()),
        }
    }
}

/// Topic after an update.
#[derive(Debug, Serialize, ToSchema)]
pub struct TopicResponse {
    pub topic: Option<String>,
}

/// Phase and round after a host transition.
#[derive(Debug, Serialize, ToSchema)]
pub struct PhaseResponse {
    pub code: String,
    pub phase: VisibleRoomPhase,
    pub round: u32,
}

impl From<&RoomEntity> for PhaseResponse {
    fn from(room: &RoomEntity) -> Self {
        Self {
            code: room.code.to_string(),
            phase: room.phase.into(),
            round: room.round,
        }
    }
}

/// Entry of the caller's room list.
#[derive(Debug, Serialize, ToSchema)]
pub struct RoomSummary {
    pub code: String,
    pub name: String,
    pub phase: VisibleRoomPhase,
    pub member_count: usize,
    /// Whether the caller hosts this room.
    pub is_host: bool,
}

/// One vote of a past or revealed round.
#[derive(Debug, Serialize, ToSchema)]
pub struct VoteRecord {
    pub member_id: String,
    pub value: String,
    /// RFC 3339 timestamp of the vote.
    pub cast_at: String,
}

impl From<&VoteEntity> for VoteRecord {
    fn from(vote: &VoteEntity) -> Self {
        Self {
            member_id: vote.member_id.to_string(),
            value: vote.value.to_string(),
            cast_at: format_system_time(vote.created_at),
        }
    }
}

/// Every vote recorded for one round.
#[derive(Debug, Serialize, ToSchema)]
pub struct RoundVotesResponse {
    pub code: String,
    pub round: u32,
    pub votes: Vec<VoteRecord>,
}
