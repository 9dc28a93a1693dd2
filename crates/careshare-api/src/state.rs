use std::sync::Arc;

use careshare_db::Database;
use tracing::error;

use crate::error::ApiError;

pub type AppState = Arc<AppStateInner>;

/// Everything a handler needs, built once at startup and injected via `State`.
pub struct AppStateInner {
    pub db: Database,
    pub session: SessionSettings,
}

#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// HS256 key for session cookies.
    pub secret: String,
    pub ttl: chrono::Duration,
    pub cookie_secure: bool,
}

/// Run a blocking database call off the async runtime. Any storage failure
/// becomes `StorageUnavailable`.
pub(crate) async fn db_call<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    blocking(move || f(&state.db)).await
}

/// Run CPU-bound or blocking work (SQLite, argon2) on the blocking pool.
pub(crate) async fn blocking<F, T>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::StorageUnavailable(e.into())
        })?
        .map_err(ApiError::StorageUnavailable)
}
