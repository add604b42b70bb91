use axum::{
    Json,
    extract::{Path, State},
};
use tracing::debug;

use smartlinks_types::api::PublicLinksResponse;
use smartlinks_types::models::PublicLink;

use crate::auth::AppState;
use crate::error::{ApiError, PAGE_NOT_FOUND};
use crate::links::link_from_row;
use crate::run_blocking;

/// GET /api/public/{slug} — no authentication.
pub async fn list_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<PublicLinksResponse>, ApiError> {
    let db = state.clone();
    let lookup = slug.clone();
    let rows = run_blocking(move || {
        let Some(user) = db.db.get_user_by_slug(&lookup)? else {
            return Ok(None);
        };
        Ok(Some(db.db.get_links_by_owner(&user.id)?))
    })
    .await?;

    let Some(rows) = rows else {
        debug!(slug = %slug, "Unknown public slug");
        return Err(ApiError::NotFound(PAGE_NOT_FOUND.into()));
    };

    Ok(Json(PublicLinksResponse {
        links: rows
            .into_iter()
            .map(|row| PublicLink::from(link_from_row(row)))
            .collect(),
    }))
}
