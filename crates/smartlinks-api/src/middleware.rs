use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::auth::AppState;
use crate::error::{ApiError, AUTH_REQUIRED, TOKEN_INVALID};

/// Extract and validate the bearer token from the Authorization header, then
/// hand the claims to the handler through request extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| ApiError::Auth(AUTH_REQUIRED.into()))?;

    let claims = state.tokens.verify(token).map_err(|e| {
        debug!("Rejected bearer token: {}", e);
        ApiError::Auth(TOKEN_INVALID.into())
    })?;

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}
