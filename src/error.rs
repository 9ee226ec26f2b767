use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// The application's error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// A PostgreSQL error.
    #[error("Database error: {0}")]
    Database(#[from] tokio_postgres::Error),

    /// The connection pool could not hand out a client.
    #[error("Pool error: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),

    /// A Redis error.
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// The submitted target is not an absolute http(s) URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// A request payload failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A short id is already taken.
    #[error("Short id already exists")]
    DuplicateKey,

    /// Every generated candidate collided.
    #[error("Could not generate a free short id")]
    GenerationExhausted,

    /// A resource not found error.
    #[error("Resource not found")]
    NotFound,

    /// Email or password did not match.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// No valid session on a route that needs one.
    #[error("Authentication required")]
    Unauthorized,

    /// Signup with an email that already has an account.
    #[error("An account with this email already exists")]
    DuplicateAccount,

    /// An internal server error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

/// A `Result` type that uses `AppError` as the error type.
pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    /// The machine-readable reason sent in the `error` field.
    pub fn reason(&self) -> &'static str {
        match self {
            AppError::Database(_)
            | AppError::Pool(_)
            | AppError::Redis(_)
            | AppError::Internal(_) => "internal",
            AppError::InvalidUrl(_) => "invalid_url",
            AppError::Validation(_) => "validation_failed",
            AppError::DuplicateKey => "duplicate_key",
            AppError::GenerationExhausted => "generation_exhausted",
            AppError::NotFound => "not_found",
            AppError::InvalidCredentials => "invalid_credentials",
            AppError::Unauthorized => "unauthenticated",
            AppError::DuplicateAccount => "duplicate_account",
        }
    }

    /// The HTTP status this error is surfaced as.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Database(_)
            | AppError::Pool(_)
            | AppError::Redis(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InvalidUrl(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::DuplicateKey | AppError::DuplicateAccount => StatusCode::CONFLICT,
            AppError::GenerationExhausted => StatusCode::SERVICE_UNAVAILABLE,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::InvalidCredentials | AppError::Unauthorized => StatusCode::UNAUTHORIZED,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = match &self {
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                "Internal server error".to_string()
            }

            AppError::Pool(e) => {
                tracing::error!("Pool error: {}", e);
                "Internal server error".to_string()
            }

            AppError::Redis(e) => {
                tracing::error!("Redis error: {}", e);
                "Internal server error".to_string()
            }

            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal server error".to_string()
            }

            AppError::InvalidUrl(msg) | AppError::Validation(msg) => {
                tracing::debug!("Rejected payload: {}", msg);
                msg.clone()
            }

            AppError::GenerationExhausted => {
                tracing::error!("Short id space exhausted, consider raising SHORT_ID_LENGTH");
                self.to_string()
            }

            AppError::InvalidCredentials | AppError::Unauthorized => {
                tracing::warn!("Authentication failed: {}", self);
                self.to_string()
            }

            AppError::DuplicateKey | AppError::DuplicateAccount | AppError::NotFound => {
                tracing::debug!("{}", self);
                self.to_string()
            }
        };

        let body = sonic_rs::to_string(&sonic_rs::json!({
            "error": self.reason(),
            "message": message
        }))
        .unwrap_or_else(|_| r#"{"error":"internal","message":"Internal server error"}"#.to_string());

        (
            self.status(),
            [(header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_failures_share_one_status_and_reason() {
        let err = AppError::InvalidCredentials;
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.reason(), "invalid_credentials");
        assert_eq!(err.to_string(), "Invalid email or password");
    }

    #[test]
    fn internal_errors_hide_details() {
        let response = AppError::Internal("pool exploded at 0xdead".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn taxonomy_maps_to_http_statuses() {
        assert_eq!(AppError::InvalidUrl("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::DuplicateAccount.status(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::GenerationExhausted.status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(AppError::Unauthorized.reason(), "unauthenticated");
    }
}
