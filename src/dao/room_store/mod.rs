pub mod memory;

use std::time::SystemTime;

use crate::dao::models::{MembershipEntity, RoomEntity, VoteEntity};
use crate::dao::storage::StorageResult;
use crate::state::room::{MemberId, RoomCode};
use futures::future::BoxFuture;

/// Abstraction over the persistence layer for rooms, memberships and votes.
///
/// Every method is a single atomic record operation. Multi-step sequences
/// (leave then reassign host, for instance) are serialized by the caller
/// through the per-room locks.
pub trait RoomStore: Send + Sync {
    /// Insert `room` with its host as sole member. Returns `false` without
    /// writing anything when the code is already taken.
    fn create_room(
        &self,
        room: RoomEntity,
        host_joined_at: SystemTime,
    ) -> BoxFuture<'static, StorageResult<bool>>;
    fn find_room(&self, code: RoomCode) -> BoxFuture<'static, StorageResult<Option<RoomEntity>>>;
    /// Overwrite the mutable fields (phase, round, topic, host) of an existing room.
    fn save_room(&self, room: RoomEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Delete a room together with its memberships and every vote of every round.
    fn delete_room(&self, code: RoomCode) -> BoxFuture<'static, StorageResult<bool>>;
    fn rooms_for_member(
        &self,
        member: MemberId,
    ) -> BoxFuture<'static, StorageResult<Vec<RoomEntity>>>;

    /// Insert a membership. Returns `false` when the member already belongs to the room.
    fn insert_member(
        &self,
        code: RoomCode,
        member: MemberId,
        joined_at: SystemTime,
    ) -> BoxFuture<'static, StorageResult<bool>>;
    fn find_member(
        &self,
        code: RoomCode,
        member: MemberId,
    ) -> BoxFuture<'static, StorageResult<Option<MembershipEntity>>>;
    /// Memberships of a room in insertion order.
    fn list_members(
        &self,
        code: RoomCode,
    ) -> BoxFuture<'static, StorageResult<Vec<MembershipEntity>>>;
    fn delete_member(
        &self,
        code: RoomCode,
        member: MemberId,
    ) -> BoxFuture<'static, StorageResult<bool>>;

    /// Atomically delete any vote for `(room, member, round)` and insert `vote`.
    fn replace_vote(&self, vote: VoteEntity) -> BoxFuture<'static, StorageResult<()>>;
    fn delete_vote(
        &self,
        code: RoomCode,
        member: MemberId,
        round: u32,
    ) -> BoxFuture<'static, StorageResult<bool>>;
    fn votes_for_round(
        &self,
        code: RoomCode,
        round: u32,
    ) -> BoxFuture<'static, StorageResult<Vec<VoteEntity>>>;

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
}
