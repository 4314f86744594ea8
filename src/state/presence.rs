use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::state::room::{MemberId, RoomCode};

/// In-memory "last seen" registry keyed by `(room, member)`.
///
/// Nothing here is persisted: a restart simply forgets everybody, and a pair
/// that was never marked is never reported as inactive.
#[derive(Debug, Default)]
pub struct PresenceTracker {
    last_seen: DashMap<(RoomCode, MemberId), Instant>,
}

impl PresenceTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record activity for `member` in `room` at `now`.
    pub fn mark_seen(&self, room: &RoomCode, member: &MemberId, now: Instant) {
        self.last_seen.insert((room.clone(), member.clone()), now);
    }

    /// Last recorded activity for a pair, if any.
    pub fn last_seen(&self, room: &RoomCode, member: &MemberId) -> Option<Instant> {
        self.last_seen
            .get(&(room.clone(), member.clone()))
            .map(|entry| *entry.value())
    }

    /// Every tracked pair whose last activity is strictly older than `now - timeout`.
    pub fn inactive_since(&self, timeout: Duration, now: Instant) -> Vec<(RoomCode, MemberId)> {
        self.last_seen
            .iter()
            .filter(|entry| now.saturating_duration_since(*entry.value()) > timeout)
            .map(|entry| entry.key().clone())
            .collect()
    }

    /// Stop tracking a pair.
    pub fn forget(&self, room: &RoomCode, member: &MemberId) {
        self.last_seen.remove(&(room.clone(), member.clone()));
    }

    /// Stop tracking every member of a deleted room.
    pub fn forget_room(&self, room: &RoomCode) {
        self.last_seen.retain(|(code, _), _| code != room);
    }

    /// Number of tracked pairs.
    pub fn len(&self) -> usize {
        self.last_seen.len()
    }

    /// Whether no pair is tracked.
    pub fn is_empty(&self) -> bool {
        self.last_seen.is_empty()
    }
}
