use axum::{Json, Router, extract::State, routing::get};

use crate::{dto::config::ClientConfigResponse, state::SharedState};

#[utoipa::path(
    get,
    path = "/config",
    tag = "config",
    responses((status = 200, description = "Client polling settings", body = ClientConfigResponse))
)]
/// Tell clients how often to poll room views.
pub async fn client_config(State(state): State<SharedState>) -> Json<ClientConfigResponse> {
    Json(ClientConfigResponse::from(state.config()))
}

/// Unauthenticated client bootstrap routes.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/config", get(client_config))
}
