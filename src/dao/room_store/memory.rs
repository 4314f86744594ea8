//! Process-local [`RoomStore`] backed by concurrent maps.

use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::SystemTime,
};

use dashmap::{DashMap, mapref::entry::Entry};
use futures::future::BoxFuture;
use indexmap::IndexMap;

use crate::{
    dao::{
        models::{MembershipEntity, RoomEntity, VoteEntity},
        room_store::RoomStore,
        storage::StorageResult,
    },
    state::room::{MemberId, RoomCode},
};

#[derive(Debug, Default)]
struct Tables {
    rooms: DashMap<RoomCode, RoomEntity>,
    members: DashMap<RoomCode, IndexMap<MemberId, MembershipEntity>>,
    votes: DashMap<RoomCode, Vec<VoteEntity>>,
    next_seq: AtomicU64,
}

impl Tables {
    fn next_seq(&self) -> u64 {
        self.next_seq.fetch_add(1, Ordering::Relaxed)
    }

    fn create_room(&self, room: RoomEntity, host_joined_at: SystemTime) -> bool {
        match self.rooms.entry(room.code.clone()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                let host = MembershipEntity {
                    room: room.code.clone(),
                    member_id: room.host_id.clone(),
                    joined_at: host_joined_at,
                    seq: self.next_seq(),
                };
                let mut members = IndexMap::new();
                members.insert(host.member_id.clone(), host);
                self.members.insert(room.code.clone(), members);
                slot.insert(room);
                true
            }
        }
    }

    fn save_room(&self, room: RoomEntity) {
        if let Some(mut existing) = self.rooms.get_mut(&room.code) {
            *existing = room;
        }
    }

    fn delete_room(&self, code: &RoomCode) -> bool {
        let removed = self.rooms.remove(code).is_some();
        self.members.remove(code);
        self.votes.remove(code);
        removed
    }

    fn rooms_for_member(&self, member: &MemberId) -> Vec<RoomEntity> {
        let codes: Vec<RoomCode> = self
            .members
            .iter()
            .filter(|entry| entry.value().contains_key(member))
            .map(|entry| entry.key().clone())
            .collect();

        let mut rooms: Vec<RoomEntity> = codes
            .iter()
            .filter_map(|code| self.rooms.get(code).map(|room| room.value().clone()))
            .collect();
        rooms.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.code.cmp(&b.code)));
        rooms
    }

    fn insert_member(&self, code: &RoomCode, member: MemberId, joined_at: SystemTime) -> bool {
        let Some(mut members) = self.members.get_mut(code) else {
            return false;
        };
        if members.contains_key(&member) {
            return false;
        }

        let membership = MembershipEntity {
            room: code.clone(),
            member_id: member.clone(),
            joined_at,
            seq: self.next_seq(),
        };
        members.insert(member, membership);
        true
    }

    fn find_member(&self, code: &RoomCode, member: &MemberId) -> Option<MembershipEntity> {
        self.members
            .get(code)
            .and_then(|members| members.get(member).cloned())
    }

    fn list_members(&self, code: &RoomCode) -> Vec<MembershipEntity> {
        self.members
            .get(code)
            .map(|members| members.values().cloned().collect())
            .unwrap_or_default()
    }

    fn delete_member(&self, code: &RoomCode, member: &MemberId) -> bool {
        self.members
            .get_mut(code)
            .is_some_and(|mut members| members.shift_remove(member).is_some())
    }

    fn replace_vote(&self, vote: VoteEntity) {
        let mut votes = self.votes.entry(vote.room.clone()).or_default();
        votes.retain(|existing| {
            !(existing.member_id == vote.member_id && existing.round == vote.round)
        });
        votes.push(vote);
    }

    fn delete_vote(&self, code: &RoomCode, member: &MemberId, round: u32) -> bool {
        let Some(mut votes) = self.votes.get_mut(code) else {
            return false;
        };
        let before = votes.len();
        votes.retain(|existing| !(existing.member_id == *member && existing.round == round));
        votes.len() != before
    }

    fn votes_for_round(&self, code: &RoomCode, round: u32) -> Vec<VoteEntity> {
        self.votes
            .get(code)
            .map(|votes| {
                votes
                    .iter()
                    .filter(|vote| vote.round == round)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// In-memory room store. Cloning shares the same tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryRoomStore {
    tables: Arc<Tables>,
}

impl MemoryRoomStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live rooms.
    pub fn room_count(&self) -> usize {
        self.tables.rooms.len()
    }
}

impl RoomStore for MemoryRoomStore {
    fn create_room(
        &self,
        room: RoomEntity,
        host_joined_at: SystemTime,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let tables = self.tables.clone();
        Box::pin(async move { Ok(tables.create_room(room, host_joined_at)) })
    }

    fn find_room(&self, code: RoomCode) -> BoxFuture<'static, StorageResult<Option<RoomEntity>>> {
        let tables = self.tables.clone();
        Box::pin(async move { Ok(tables.rooms.get(&code).map(|room| room.value().clone())) })
    }

    fn save_room(&self, room: RoomEntity) -> BoxFuture<'static, StorageResult<()>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            tables.save_room(room);
            Ok(())
        })
    }

    fn delete_room(&self, code: RoomCode) -> BoxFuture<'static, StorageResult<bool>> {
        let tables = self.tables.clone();
        Box::pin(async move { Ok(tables.delete_room(&code)) })
    }

    fn rooms_for_member(
        &self,
        member: MemberId,
    ) -> BoxFuture<'static, StorageResult<Vec<RoomEntity>>> {
        let tables = self.tables.clone();
        Box::pin(async move { Ok(tables.rooms_for_member(&member)) })
    }

    fn insert_member(
        &self,
        code: RoomCode,
        member: MemberId,
        joined_at: SystemTime,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let tables = self.tables.clone();
        Box::pin(async move { Ok(tables.insert_member(&code, member, joined_at)) })
    }

    fn find_member(
        &self,
        code: RoomCode,
        member: MemberId,
    ) -> BoxFuture<'static, StorageResult<Option<MembershipEntity>>> {
        let tables = self.tables.clone();
        Box::pin(async move { Ok(tables.find_member(&code, &member)) })
    }

    fn list_members(
        &self,
        code: RoomCode,
    ) -> BoxFuture<'static, StorageResult<Vec<MembershipEntity>>> {
        let tables = self.tables.clone();
        Box::pin(async move { Ok(tables.list_members(&code)) })
    }

    fn delete_member(
        &self,
        code: RoomCode,
        member: MemberId,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let tables = self.tables.clone();
        Box::pin(async move { Ok(tables.delete_member(&code, &member)) })
    }

    fn replace_vote(&self, vote: VoteEntity) -> BoxFuture<'static, StorageResult<()>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            tables.replace_vote(vote);
            Ok(())
        })
    }

    fn delete_vote(
        &self,
        code: RoomCode,
        member: MemberId,
        round: u32,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let tables = self.tables.clone();
        Box::pin(async move { Ok(tables.delete_vote(&code, &member, round)) })
    }

    fn votes_for_round(
        &self,
        code: RoomCode,
        round: u32,
    ) -> BoxFuture<'static, StorageResult<Vec<VoteEntity>>> {
        let tables = self.tables.clone();
        Box::pin(async move { Ok(tables.votes_for_round(&code, round)) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async move { Ok(()) })
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, UNIX_EPOCH};

    use super::*;
    use crate::state::room::VoteValue;

    fn room(code: &str, host: &str) -> RoomEntity {
        RoomEntity::new(
            RoomCode::parse(code).unwrap(),
            "Sprint planning".into(),
            MemberId::new(host),
            None,
            UNIX_EPOCH,
        )
    }

    #[tokio::test]
    async fn create_room_refuses_taken_codes() {
        let store = MemoryRoomStore::new();
        assert!(store.create_room(room("AAAAAA", "host"), UNIX_EPOCH).await.unwrap());
        assert!(!store.create_room(room("AAAAAA", "other"), UNIX_EPOCH).await.unwrap());

        let code = RoomCode::parse("AAAAAA").unwrap();
        let members = store.list_members(code.clone()).await.unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].member_id, MemberId::new("host"));
        let stored = store.find_room(code).await.unwrap().unwrap();
        assert_eq!(stored.host_id, MemberId::new("host"));
    }

    #[tokio::test]
    async fn members_keep_insertion_order_and_sequence() {
        let store = MemoryRoomStore::new();
        let code = RoomCode::parse("AAAAAA").unwrap();
        store.create_room(room("AAAAAA", "host"), UNIX_EPOCH).await.unwrap();

        for name in ["b", "c", "d"] {
            assert!(
                store
                    .insert_member(code.clone(), MemberId::new(name), UNIX_EPOCH)
                    .await
                    .unwrap()
            );
        }
        assert!(!store.insert_member(code.clone(), MemberId::new("b"), UNIX_EPOCH).await.unwrap());

        store.delete_member(code.clone(), MemberId::new("c")).await.unwrap();
        let members = store.list_members(code).await.unwrap();
        let ids: Vec<&str> = members.iter().map(|m| m.member_id.as_str()).collect();
        assert_eq!(ids, ["host", "b", "d"]);
        assert!(members.windows(2).all(|pair| pair[0].seq < pair[1].seq));
    }

    #[tokio::test]
    async fn replace_vote_keeps_one_vote_per_round() {
        let store = MemoryRoomStore::new();
        let code = RoomCode::parse("AAAAAA").unwrap();
        let member = MemberId::new("host");
        store.create_room(room("AAAAAA", "host"), UNIX_EPOCH).await.unwrap();

        for value in [VoteValue::Points(3), VoteValue::Points(8)] {
            store
                .replace_vote(VoteEntity::new(code.clone(), member.clone(), 1, value))
                .await
                .unwrap();
        }
        store
            .replace_vote(VoteEntity::new(code.clone(), member.clone(), 2, VoteValue::Unknown))
            .await
            .unwrap();

        let first = store.votes_for_round(code.clone(), 1).await.unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].value, VoteValue::Points(8));
        assert_eq!(store.votes_for_round(code, 2).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_room_cascades() {
        let store = MemoryRoomStore::new();
        let code = RoomCode::parse("AAAAAA").unwrap();
        let member = MemberId::new("host");
        store.create_room(room("AAAAAA", "host"), UNIX_EPOCH).await.unwrap();
        store
            .replace_vote(VoteEntity::new(code.clone(), member.clone(), 1, VoteValue::Points(5)))
            .await
            .unwrap();

        assert!(store.delete_room(code.clone()).await.unwrap());
        assert!(store.find_room(code.clone()).await.unwrap().is_none());
        assert!(store.list_members(code.clone()).await.unwrap().is_empty());
        assert!(store.votes_for_round(code.clone(), 1).await.unwrap().is_empty());
        assert!(store.rooms_for_member(member).await.unwrap().is_empty());
        assert!(!store.delete_room(code).await.unwrap());
    }

    #[tokio::test]
    async fn rooms_for_member_lists_oldest_first() {
        let store = MemoryRoomStore::new();
        let mut newer = room("BBBBBB", "host");
        newer.created_at = UNIX_EPOCH + Duration::from_secs(5);
        store.create_room(newer, UNIX_EPOCH).await.unwrap();
        store.create_room(room("AAAAAA", "host"), UNIX_EPOCH).await.unwrap();
        store.create_room(room("CCCCCC", "someone"), UNIX_EPOCH).await.unwrap();

        let rooms = store.rooms_for_member(MemberId::new("host")).await.unwrap();
        let codes: Vec<&str> = rooms.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(codes, ["AAAAAA", "BBBBBB"]);
    }
}
