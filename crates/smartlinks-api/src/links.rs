use axum::{
    Extension, Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
};
use tracing::{info, warn};
use url::Url;

use smartlinks_db::models::LinkRow;
use smartlinks_types::api::{Claims, LinkRequest, MyLinksResponse};
use smartlinks_types::models::Link;

use crate::auth::AppState;
use crate::error::{ApiError, LINK_NOT_FOUND, TOKEN_INVALID};
use crate::run_blocking;

pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_URL_LEN: usize = 2048;

/// POST /api/links/create
pub async fn create(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    payload: Result<Json<LinkRequest>, JsonRejection>,
) -> Result<Json<Link>, ApiError> {
    let Json(req) = payload?;
    let (title, url) = validate_link(&req.title, &req.url)?;

    let db = state.clone();
    let owner = claims.sub.to_string();
    let row = run_blocking(move || db.db.insert_link(&owner, &title, &url)).await?;

    info!(owner = %claims.sub, link_id = row.id, "Link created");
    Ok(Json(link_from_row(row)))
}

/// GET /api/links/my-links
pub async fn list_mine(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<MyLinksResponse>, ApiError> {
    let db = state.clone();
    let owner = claims.sub.to_string();
    let (user, rows) = run_blocking(move || {
        let user = db.db.get_user_by_id(&owner)?;
        let rows = db.db.get_links_by_owner(&owner)?;
        Ok((user, rows))
    })
    .await?;

    let user = user.ok_or_else(|| ApiError::Auth(TOKEN_INVALID.into()))?;

    Ok(Json(MyLinksResponse {
        links: rows.into_iter().map(link_from_row).collect(),
        slug: user.slug,
    }))
}

/// PUT /api/links/{id} — owner only.
pub async fn update(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<LinkRequest>, JsonRejection>,
) -> Result<Json<Link>, ApiError> {
    let Path(id) = path?;
    let Json(req) = payload?;
    let (title, url) = validate_link(&req.title, &req.url)?;

    let db = state.clone();
    let owner = claims.sub.to_string();
    let row = run_blocking(move || db.db.update_link(id, &owner, &title, &url))
        .await?
        .ok_or_else(|| ApiError::NotFound(LINK_NOT_FOUND.into()))?;

    info!(owner = %claims.sub, link_id = id, "Link updated");
    Ok(Json(link_from_row(row)))
}

/// DELETE /api/links/{id} — owner only.
pub async fn delete(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = path?;

    let db = state.clone();
    let owner = claims.sub.to_string();
    let deleted = run_blocking(move || db.db.delete_link(id, &owner)).await?;
    if !deleted {
        return Err(ApiError::NotFound(LINK_NOT_FOUND.into()));
    }

    info!(owner = %claims.sub, link_id = id, "Link deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Trim and check a title/url pair. Only absolute http(s) URLs with a host
/// are accepted.
pub fn validate_link(title: &str, url: &str) -> Result<(String, String), ApiError> {
    let title = title.trim();
    let url = url.trim();

    if title.is_empty() || url.is_empty() {
        return Err(ApiError::Validation("Titre et URL requis".into()));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(ApiError::Validation(format!(
            "Titre trop long (max {} caractères)",
            MAX_TITLE_LEN
        )));
    }
    if url.len() > MAX_URL_LEN {
        return Err(ApiError::Validation("URL trop longue".into()));
    }

    let parsed = Url::parse(url).map_err(|_| ApiError::Validation("URL invalide".into()))?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return Err(ApiError::Validation("URL invalide".into()));
    }

    Ok((title.to_string(), url.to_string()))
}

pub(crate) fn link_from_row(row: LinkRow) -> Link {
    let created_at = row
        .created_at
        .parse::<chrono::DateTime<chrono::Utc>>()
        .unwrap_or_else(|e| {
            warn!("Corrupt created_at '{}' on link {}: {}", row.created_at, row.id, e);
            chrono::DateTime::default()
        });

    Link {
        id: row.id,
        title: row.title,
        url: row.url,
        created_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_http_and_https() {
        let (title, url) = validate_link("  Insta ", " https://instagram.com/a ").unwrap();
        assert_eq!(title, "Insta");
        assert_eq!(url, "https://instagram.com/a");
        assert!(validate_link("Blog", "http://blog.example/path?q=1").is_ok());
    }

    #[test]
    fn rejects_empty_fields() {
        assert!(matches!(validate_link("", "https://a.example"), Err(ApiError::Validation(_))));
        assert!(matches!(validate_link("t", "   "), Err(ApiError::Validation(_))));
    }

    #[test]
    fn rejects_malformed_urls() {
        for url in ["instagram.com/a", "not a url", "javascript:alert(1)", "ftp://files.example", "mailto:a@x.com"] {
            assert!(
                matches!(validate_link("t", url), Err(ApiError::Validation(_))),
                "accepted {}",
                url
            );
        }
    }

    #[test]
    fn rejects_oversized_input() {
        let title = "t".repeat(MAX_TITLE_LEN + 1);
        assert!(validate_link(&title, "https://a.example").is_err());
        let url = format!("https://a.example/{}", "x".repeat(MAX_URL_LEN));
        assert!(validate_link("t", &url).is_err());
    }

    #[test]
    fn row_timestamp_is_parsed() {
        let link = link_from_row(LinkRow {
            id: 1,
            owner_id: "u".into(),
            title: "t".into(),
            url: "https://a.example".into(),
            created_at: "2026-10-19T08:30:00.125Z".into(),
        });
        assert_eq!(link.created_at.to_rfc3339(), "2026-10-19T08:30:00.125+00:00");
    }
}
