use std::sync::Arc;

use anyhow::anyhow;
use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
};
use rand::{Rng, distr::Alphanumeric};
use tracing::{debug, info, warn};
use uuid::Uuid;

use smartlinks_db::{Database, InsertUser};
use smartlinks_types::api::{
    Claims, LoginRequest, LoginResponse, MeResponse, RegisterRequest, RegisterResponse,
};

use crate::error::{
    ApiError, EMAIL_TAKEN, INVALID_CREDENTIALS, MISSING_CREDENTIALS, REGISTERED, TOKEN_INVALID,
};
use crate::run_blocking;
use crate::token::TokenConfig;

const MAX_SLUG_LEN: usize = 32;
const SLUG_SUFFIX_LEN: usize = 4;
const SLUG_ATTEMPTS: usize = 5;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub tokens: TokenConfig,
}

impl AppStateInner {
    pub fn new(db: Database, tokens: TokenConfig) -> AppState {
        Arc::new(Self { db, tokens })
    }
}

/// POST /api/auth/register — creates the user and its public slug. Does not
/// log the user in.
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Json<RegisterResponse>, ApiError> {
    let Json(req) = payload?;

    let email = normalize_email(req.email.as_deref().unwrap_or_default());
    let password = req.password.unwrap_or_default();
    // Whitespace-only passwords count as missing; others are kept verbatim.
    if email.is_empty() || password.trim().is_empty() {
        warn!("Registration rejected: missing fields");
        return Err(ApiError::Validation(MISSING_CREDENTIALS.into()));
    }

    let password_hash = run_blocking(move || hash_password(&password)).await?;

    let user_id = Uuid::new_v4().to_string();
    let base = slug_base(&email);

    for attempt in 0..SLUG_ATTEMPTS {
        let slug = if attempt == 0 {
            base.clone()
        } else {
            format!("{}-{}", base, random_suffix())
        };

        // The insert is the uniqueness check; there is no prior lookup.
        let db = state.clone();
        let (uid, em, hash, sl) = (user_id.clone(), email.clone(), password_hash.clone(), slug.clone());
        let outcome = run_blocking(move || db.db.create_user(&uid, &em, &hash, &sl)).await?;

        match outcome {
            InsertUser::Created => {
                info!(email = %email, slug = %slug, "User registered");
                return Ok(Json(RegisterResponse {
                    message: REGISTERED.into(),
                }));
            }
            InsertUser::EmailTaken => {
                warn!(email = %email, "Registration rejected: email already in use");
                return Err(ApiError::Conflict(EMAIL_TAKEN.into()));
            }
            InsertUser::SlugTaken => {
                debug!(slug = %slug, "Slug taken, retrying with suffix");
            }
        }
    }

    Err(ApiError::Store(anyhow!(
        "no free slug for base '{}' after {} attempts",
        base,
        SLUG_ATTEMPTS
    )))
}

/// POST /api/auth/login — returns a session token. Unknown email and wrong
/// password produce the same error.
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(req) = payload?;
    let email = normalize_email(req.email.as_deref().unwrap_or_default());

    let db = state.clone();
    let em = email.clone();
    let user = run_blocking(move || db.db.get_user_by_email(&em)).await?;

    let Some(user) = user else {
        warn!(email = %email, "Login failed: unknown email");
        return Err(ApiError::Auth(INVALID_CREDENTIALS.into()));
    };

    let password = req.password.unwrap_or_default();
    let stored = user.password.clone();
    let valid = run_blocking(move || verify_password(&password, &stored)).await?;
    if !valid {
        warn!(email = %email, "Login failed: wrong password");
        return Err(ApiError::Auth(INVALID_CREDENTIALS.into()));
    }

    let user_id: Uuid = user
        .id
        .parse()
        .map_err(|e| ApiError::Store(anyhow!("corrupt user id '{}': {}", user.id, e)))?;

    let token = state.tokens.issue(user_id, &user.email)?;

    info!(email = %email, "User logged in");
    Ok(Json(LoginResponse { token }))
}

/// GET /api/auth/me — resolves the bearer token to the stored user.
pub async fn me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<MeResponse>, ApiError> {
    let db = state.clone();
    let uid = claims.sub.to_string();
    let user = run_blocking(move || db.db.get_user_by_id(&uid))
        .await?
        .ok_or_else(|| ApiError::Auth(TOKEN_INVALID.into()))?;

    Ok(Json(MeResponse {
        user_id: claims.sub,
        email: user.email,
        slug: user.slug,
    }))
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Derive a URL-safe slug from the local part of an email address.
pub(crate) fn slug_base(email: &str) -> String {
    let local = email.split('@').next().unwrap_or_default();

    let mut slug = String::with_capacity(local.len());
    for c in local.chars() {
        let c = c.to_ascii_lowercase();
        if c.is_ascii_alphanumeric() {
            slug.push(c);
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }

    let slug: String = slug.trim_matches('-').chars().take(MAX_SLUG_LEN).collect();
    let slug = slug.trim_end_matches('-');
    if slug.is_empty() {
        "user".to_string()
    } else {
        slug.to_string()
    }
}

fn random_suffix() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(SLUG_SUFFIX_LEN)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect()
}

fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| anyhow!("password hashing failed: {}", e))
}

fn verify_password(password: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| anyhow!("stored hash unreadable: {}", e))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_comes_from_local_part() {
        assert_eq!(slug_base("a@x.com"), "a");
        assert_eq!(slug_base("john.doe+tag@x.com"), "john-doe-tag");
        assert_eq!(slug_base("__Ana__@x.com"), "ana");
    }

    #[test]
    fn slug_falls_back_when_nothing_usable() {
        assert_eq!(slug_base("@x.com"), "user");
        assert_eq!(slug_base("éé@x.com"), "user");
    }

    #[test]
    fn slug_is_capped() {
        let email = format!("{}@x.com", "a".repeat(100));
        assert_eq!(slug_base(&email).len(), MAX_SLUG_LEN);
    }

    #[test]
    fn suffix_is_url_safe() {
        let suffix = random_suffix();
        assert_eq!(suffix.len(), SLUG_SUFFIX_LEN);
        assert!(suffix.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    #[test]
    fn emails_are_normalized() {
        assert_eq!(normalize_email("  A@X.com "), "a@x.com");
    }

    #[test]
    fn password_hash_is_salted_and_verifies() {
        let first = hash_password("pw1").unwrap();
        let second = hash_password("pw1").unwrap();
        assert_ne!(first, second);
        assert!(!first.contains("pw1"));
        assert!(verify_password("pw1", &first).unwrap());
        assert!(!verify_password("pw2", &first).unwrap());
    }
}
