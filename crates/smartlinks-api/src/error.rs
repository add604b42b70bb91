use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{debug, error};

use smartlinks_types::api::ErrorResponse;

// User-facing messages. The product ships in French.
pub const MISSING_CREDENTIALS: &str = "Email et mot de passe requis";
pub const EMAIL_TAKEN: &str = "Email déjà utilisé";
pub const REGISTERED: &str = "Inscription réussie";
pub const INVALID_CREDENTIALS: &str = "Identifiants invalides";
pub const AUTH_REQUIRED: &str = "Authentification requise";
pub const TOKEN_INVALID: &str = "Jeton invalide ou expiré";
pub const PAGE_NOT_FOUND: &str = "Page introuvable";
pub const LINK_NOT_FOUND: &str = "Lien introuvable";
pub const ROUTE_NOT_FOUND: &str = "Ressource introuvable";
pub const BAD_REQUEST: &str = "Requête invalide";
pub const SERVER_ERROR: &str = "Erreur serveur";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Auth(String),

    #[error("{0}")]
    NotFound(String),

    /// Never shown to the caller beyond a generic message.
    #[error("store error: {0:#}")]
    Store(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::Conflict(_) => StatusCode::BAD_REQUEST,
            ApiError::Auth(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match self {
            ApiError::Store(e) => {
                error!("Store failure: {:#}", e);
                SERVER_ERROR.to_string()
            }
            ApiError::Validation(m)
            | ApiError::Conflict(m)
            | ApiError::Auth(m)
            | ApiError::NotFound(m) => m,
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        debug!("Rejected JSON body: {}", rejection.body_text());
        ApiError::Validation(BAD_REQUEST.into())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        debug!("Rejected path: {}", rejection.body_text());
        ApiError::Validation(BAD_REQUEST.into())
    }
}
