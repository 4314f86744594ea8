use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{OwnedRwLockReadGuard, OwnedRwLockWriteGuard, RwLock};

use crate::state::room::RoomCode;

/// Lazily created per-room guards.
///
/// Mutations hold the write side for their whole multi-step sequence and
/// readers hold the read side, so unrelated rooms never contend. An entry
/// lives only while some task holds or waits on it, which keeps the table
/// bounded by in-flight rooms and drops the entries of deleted rooms.
#[derive(Debug, Default)]
pub struct RoomLocks {
    locks: DashMap<RoomCode, Arc<RwLock<()>>>,
}

/// Exclusive access to one room.
pub type RoomWriteGuard<'a> = RoomGuard<'a, OwnedRwLockWriteGuard<()>>;
/// Shared access to one room.
pub type RoomReadGuard<'a> = RoomGuard<'a, OwnedRwLockReadGuard<()>>;

/// Held room lock. Dropping it unlocks the room, then discards the table
/// entry if nobody else is using it.
#[derive(Debug)]
pub struct RoomGuard<'a, G> {
    guard: Option<G>,
    locks: &'a RoomLocks,
    room: RoomCode,
}

impl<G> Drop for RoomGuard<'_, G> {
    fn drop(&mut self) {
        self.guard.take();
        self.locks.release(&self.room);
    }
}

impl RoomLocks {
    /// Create an empty lock table.
    pub fn new() -> Self {
        Self::default()
    }

    fn handle(&self, room: &RoomCode) -> Arc<RwLock<()>> {
        self.locks.entry(room.clone()).or_default().clone()
    }

    /// Acquire exclusive access to `room`.
    pub async fn write(&self, room: &RoomCode) -> RoomWriteGuard<'_> {
        let guard = self.handle(room).write_owned().await;
        RoomGuard {
            guard: Some(guard),
            locks: self,
            room: room.clone(),
        }
    }

    /// Acquire shared access to `room`.
    pub async fn read(&self, room: &RoomCode) -> RoomReadGuard<'_> {
        let guard = self.handle(room).read_owned().await;
        RoomGuard {
            guard: Some(guard),
            locks: self,
            room: room.clone(),
        }
    }

    // The strong count is checked under the shard lock that `handle` clones
    // under, so an entry is never removed while a task holds or awaits it.
    fn release(&self, room: &RoomCode) {
        self.locks
            .remove_if(room, |_, lock| Arc::strong_count(lock) == 1);
    }

    /// Number of rooms with a live guard entry.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    /// Whether no guard entry exists.
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
