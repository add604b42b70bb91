use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::auth::{self, AppState};
use crate::error::{ApiError, ROUTE_NOT_FOUND};
use crate::links;
use crate::middleware::require_auth;
use crate::public;

/// The JSON API, mounted under `/api`. Static assets, CORS and tracing are
/// layered on by the binary.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/public/{slug}", get(public::list_by_slug));

    let protected_routes = Router::new()
        .route("/auth/me", get(auth::me))
        .route("/links/create", post(links::create))
        .route("/links/my-links", get(links::list_mine))
        .route("/links/{id}", put(links::update).delete(links::delete))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    // Unknown /api paths answer JSON, never the client shell.
    let api = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .fallback(not_found);

    Router::new().nest("/api", api).with_state(state)
}

async fn not_found() -> ApiError {
    ApiError::NotFound(ROUTE_NOT_FOUND.into())
}
