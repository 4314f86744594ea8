use serde::Serialize;
use utoipa::ToSchema;

use crate::config::AppConfig;

/// Settings a polling client needs before it starts.
#[derive(Debug, Serialize, ToSchema)]
pub struct ClientConfigResponse {
    /// How often clients should refresh a room view, in milliseconds.
    pub polling_rate_ms: u64,
}

impl From<&AppConfig> for ClientConfigResponse {
    fn from(config: &AppConfig) -> Self {
        Self {
            polling_rate_ms: u64::try_from(config.polling_rate().as_millis()).unwrap_or(u64::MAX),
        }
    }
}
