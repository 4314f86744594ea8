use serde::Serialize;
use utoipa::ToSchema;

/// Health payload returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// "ok" when the room store answers, "degraded" otherwise.
    pub status: String,
    /// Number of (room, member) pairs currently tracked for presence.
    pub tracked_members: usize,
}

impl HealthResponse {
    /// The room store answered its health probe.
    pub fn ok(tracked_members: usize) -> Self {
        Self {
            status: "ok".to_string(),
            tracked_members,
        }
    }

    /// The room store failed its health probe.
    pub fn degraded(tracked_members: usize) -> Self {
        Self {
            status: "degraded".to_string(),
            tracked_members,
        }
    }
}
