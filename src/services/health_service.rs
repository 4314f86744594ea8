use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Probe the room store and report how many members are being tracked.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    let tracked = state.presence().len();

    match state.store().health_check().await {
        Ok(()) => HealthResponse::ok(tracked),
        Err(err) => {
            warn!(error = %err, "room store health check failed");
            HealthResponse::degraded(tracked)
        }
    }
}
