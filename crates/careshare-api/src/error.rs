use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// No entity with the requested id
    #[error("{resource} not found")]
    NotFound { resource: &'static str },

    /// Authenticated, but the record belongs to someone else
    #[error("Not allowed to modify this {resource}")]
    Unauthorized { resource: &'static str },

    /// No valid session
    #[error("Not authenticated")]
    Unauthenticated,

    /// Login failed; deliberately does not say which part was wrong
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("An account with this {field} already exists")]
    DuplicateEmail { field: &'static str },

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    StorageUnavailable(#[from] anyhow::Error),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Unauthorized { .. } => StatusCode::FORBIDDEN,
            Self::Unauthenticated => StatusCode::SEE_OTHER,
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::DuplicateEmail { .. } => StatusCode::CONFLICT,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Message safe to show to the client. Storage errors never leak detail.
    pub fn user_message(&self) -> String {
        match self {
            Self::StorageUnavailable(_) => "Service temporarily unavailable".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            Self::StorageUnavailable(e) => tracing::error!("Storage error: {:#}", e),
            Self::Unauthenticated | Self::InvalidCredentials | Self::Unauthorized { .. } => {
                tracing::info!("Authorization error: {}", self)
            }
            Self::DuplicateEmail { .. } => tracing::warn!("Conflict: {}", self),
            Self::NotFound { .. } | Self::Validation(_) => tracing::debug!("Client error: {}", self),
        }

        if let Self::Unauthenticated = self {
            return Redirect::to("/login").into_response();
        }

        let body = json!({ "error": self.user_message() });
        (self.status_code(), axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_errors_are_sanitized() {
        let err = ApiError::StorageUnavailable(anyhow::anyhow!("disk I/O error at /var/db"));
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.user_message(), "Service temporarily unavailable");
    }

    #[test]
    fn unauthenticated_redirects_to_login() {
        let response = ApiError::Unauthenticated.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()["location"], "/login");
    }

    #[test]
    fn kinds_map_to_distinct_statuses() {
        assert_eq!(ApiError::NotFound { resource: "Item" }.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::Unauthorized { resource: "item" }.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::DuplicateEmail { field: "email" }.status_code(), StatusCode::CONFLICT);
        assert_eq!(ApiError::validation("title is required").user_message(), "title is required");
    }
}
