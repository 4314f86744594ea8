use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};

use crate::{
    error::{AppError, ServiceError},
    state::SharedState,
};

const BEARER_PREFIX: &str = "Bearer ";

/// Resolve `Authorization: Bearer <credential>` into a
/// [`MemberId`](crate::state::room::MemberId) request extension.
pub async fn require_identity(
    State(state): State<SharedState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let credential = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix(BEARER_PREFIX))
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| {
            ServiceError::Unauthenticated("missing bearer token in `Authorization` header".into())
        })?;

    let member = state
        .identities()
        .resolve(credential)
        .ok_or_else(|| ServiceError::Unauthenticated("unknown credential".into()))?;

    req.extensions_mut().insert(member);
    Ok(next.run(req).await)
}
