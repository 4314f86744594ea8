use serde::Serialize;
use utoipa::ToSchema;

use crate::state::state_machine::RoomPhase;

/// Room phase exposed to polling clients.
#[derive(Debug, Serialize, ToSchema, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VisibleRoomPhase {
    /// Members are casting hidden votes.
    Voting,
    /// Votes and statistics are visible.
    Revealed,
    /// Lowest and highest voters are compared.
    Versus,
}

impl From<RoomPhase> for VisibleRoomPhase {
    fn from(value: RoomPhase) -> Self {
        match value {
            RoomPhase::Voting => VisibleRoomPhase::Voting,
            RoomPhase::Revealed => VisibleRoomPhase::Revealed,
            RoomPhase::Versus => VisibleRoomPhase::Versus,
        }
    }
}
