use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the wildguess backend.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::config::client_config,
        crate::routes::rooms::list_rooms,
        crate::routes::rooms::create_room,
        crate::routes::rooms::get_room,
        crate::routes::rooms::join_room,
        crate::routes::rooms::leave_room,
        crate::routes::rooms::kick_member,
        crate::routes::rooms::set_topic,
        crate::routes::rooms::reveal,
        crate::routes::rooms::trigger_versus,
        crate::routes::rooms::next_round,
        crate::routes::votes::submit_vote,
        crate::routes::votes::round_votes,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::config::ClientConfigResponse,
            crate::dto::phase::VisibleRoomPhase,
            crate::dto::room::CreateRoomRequest,
            crate::dto::room::CreateRoomResponse,
            crate::dto::room::JoinRoomRequest,
            crate::dto::room::JoinRoomResponse,
            crate::dto::room::KickMemberRequest,
            crate::dto::room::SetTopicRequest,
            crate::dto::room::SubmitVoteRequest,
            crate::dto::room::RemovalResponse,
            crate::dto::room::TopicResponse,
            crate::dto::room::PhaseResponse,
            crate::dto::room::RoomSummary,
            crate::dto::room::VoteRecord,
            crate::dto::room::RoundVotesResponse,
            crate::dto::view::RoomView,
            crate::dto::view::MemberView,
            crate::services::statistics::VoteStatistics,
            crate::services::statistics::HeadToHead,
            crate::services::statistics::Contender,
            crate::error::ErrorBody,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "config", description = "Client bootstrap settings"),
        (name = "rooms", description = "Room membership and round lifecycle"),
        (name = "votes", description = "Casting and reading votes"),
    )
)]
pub struct ApiDoc;

/// Registers the `bearer` scheme referenced by the room routes.
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
        );
    }
}
