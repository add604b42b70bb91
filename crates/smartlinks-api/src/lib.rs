pub mod auth;
pub mod error;
pub mod links;
pub mod middleware;
pub mod public;
mod routes;
pub mod token;

pub use auth::{AppState, AppStateInner};
pub use error::ApiError;
pub use routes::router;

use tracing::error;

/// Run a blocking closure (SQLite access, password hashing) off the async
/// runtime and fold both failure layers into a store error.
pub(crate) async fn run_blocking<F, T>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Store(e.into())
        })?
        .map_err(ApiError::Store)
}
