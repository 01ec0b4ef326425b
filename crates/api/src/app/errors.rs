use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use courseforge_auth::{PasswordError, TokenError};
use courseforge_core::DomainError;
use courseforge_store::StoreError;

/// Everything a handler can fail with, mapped onto the HTTP status and
/// `{"error", "message"}` body the clients consume.
///
/// The `message` is user-facing; store/crypto detail never crosses this
/// boundary (it is logged where the conversion happens instead).
#[derive(Debug)]
pub enum ApiError {
    /// 400 — missing or malformed input.
    Validation(String),

    /// 401 — bad credentials, or a missing/invalid/expired token.
    Auth(String),

    /// 403 — authenticated, but the role or ownership check failed.
    Forbidden(String),

    /// 404 — the addressed record does not exist.
    NotFound(String),

    /// 409 — uniqueness conflict (duplicate email, repeat enrollment).
    Conflict(String),

    /// 500 — unexpected failure; generic body, detail logged.
    Internal,
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Auth(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Auth(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "validation_error",
            ApiError::Auth(_) => "auth_error",
            ApiError::Forbidden(_) => "forbidden",
            ApiError::NotFound(_) => "not_found",
            ApiError::Conflict(_) => "conflict",
            ApiError::Internal => "internal_error",
        }
    }

    fn message(&self) -> &str {
        match self {
            ApiError::Validation(msg)
            | ApiError::Auth(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg) => msg,
            ApiError::Internal => "Server error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        json_error(self.status(), self.code(), self.message())
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(msg) => ApiError::Conflict(msg),
            StoreError::MissingReference(msg) => ApiError::NotFound(msg),
            StoreError::Backend { .. } => {
                tracing::error!(error = %err, "store failure");
                ApiError::Internal
            }
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Signing(detail) => {
                tracing::error!(%detail, "token signing failed");
                ApiError::Internal
            }
            TokenError::Expired | TokenError::Invalid(_) => {
                ApiError::auth("Missing or invalid token")
            }
        }
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        tracing::error!(error = %err, "password hashing failure");
        ApiError::Internal
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) | DomainError::InvalidId(msg) => {
                ApiError::Validation(msg)
            }
            DomainError::NotFound => ApiError::not_found("Not found"),
            DomainError::Conflict(msg) => ApiError::Conflict(msg),
            DomainError::Unauthorized => ApiError::forbidden("Unauthorized"),
        }
    }
}
