use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    dto::phase::VisibleRoomPhase,
    services::statistics::{HeadToHead, VoteStatistics},
};

/// Snapshot of a room as seen by one member.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RoomView {
    pub code: String,
    pub name: String,
    pub phase: VisibleRoomPhase,
    pub round: u32,
    pub topic: Option<String>,
    pub host_id: String,
    /// Whether the viewer is the host.
    pub is_host: bool,
    /// Whether joining requires a password.
    pub password_protected: bool,
    /// Members in join order.
    pub members: Vec<MemberView>,
    /// Present once votes are revealed and at least one is numeric.
    pub statistics: Option<VoteStatistics>,
    /// Present only in the versus phase.
    pub head_to_head: Option<HeadToHead>,
}

/// Member entry of a [`RoomView`].
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MemberView {
    pub member_id: String,
    pub is_host: bool,
    pub has_voted: bool,
    /// Vote of the current round, hidden while voting.
    pub vote: Option<String>,
    /// RFC 3339 timestamp of the join.
    pub joined_at: String,
}
