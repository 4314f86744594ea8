use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use uuid::Uuid;

use crate::state::{
    room::{MemberId, RoomCode, VoteValue},
    state_machine::{RoomPhase, RoomStateMachine},
};

/// Persisted room record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoomEntity {
    /// Unique room code, also the lookup key.
    pub code: RoomCode,
    /// Display name chosen by the creator.
    pub name: String,
    /// Member currently holding host privileges.
    pub host_id: MemberId,
    /// Current phase of the round.
    pub phase: RoomPhase,
    /// Topic being estimated, if the host set one.
    pub topic: Option<String>,
    /// Round counter, starting at 1.
    pub round: u32,
    /// Argon2 PHC string gating membership, when the room is protected.
    pub password_hash: Option<String>,
    /// Creation timestamp.
    pub created_at: SystemTime,
}

impl RoomEntity {
    /// Build the record of a brand-new room: voting, round 1, no topic.
    pub fn new(
        code: RoomCode,
        name: String,
        host_id: MemberId,
        password_hash: Option<String>,
        created_at: SystemTime,
    ) -> Self {
        let machine = RoomStateMachine::new();
        Self {
            code,
            name,
            host_id,
            phase: machine.phase(),
            topic: None,
            round: machine.round(),
            password_hash,
            created_at,
        }
    }

    /// State machine view over the persisted phase and round.
    pub fn state_machine(&self) -> RoomStateMachine {
        RoomStateMachine::from_parts(self.phase, self.round)
    }
}

/// Membership of a member in a room.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MembershipEntity {
    /// Room the member belongs to.
    pub room: RoomCode,
    /// Member identifier.
    pub member_id: MemberId,
    /// When the member joined.
    pub joined_at: SystemTime,
    /// Store-assigned insertion sequence, used to totally order equal `joined_at`.
    pub seq: u64,
}

/// A cast vote for one round.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VoteEntity {
    /// Stable identifier of the vote record.
    pub id: Uuid,
    /// Room the vote belongs to.
    pub room: RoomCode,
    /// Member who cast the vote.
    pub member_id: MemberId,
    /// Round the vote was cast in.
    pub round: u32,
    /// Card picked by the member.
    pub value: VoteValue,
    /// When the vote was cast.
    pub created_at: SystemTime,
}

impl VoteEntity {
    /// Build a new vote record with a fresh identifier.
    pub fn new(room: RoomCode, member_id: MemberId, round: u32, value: VoteValue) -> Self {
        Self {
            id: Uuid::new_v4(),
            room,
            member_id,
            round,
            value,
            created_at: SystemTime::now(),
        }
    }
}
