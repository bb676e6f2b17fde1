use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use crate::auth::tokens::TokenError;

/// Application-wide error. Every variant carries a stable `code` that the
/// client can switch on; the HTTP status is derived from that code.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Auth(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    JwtVerification(String),
    #[error("{0}")]
    JwtTokenInvalid(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("User not found")]
    UserNotFound,
    #[error("User already exists")]
    UserAlreadyExists,
    #[error("{0}")]
    UserValidation(String),
    #[error("Failed to create user")]
    UserCreationFailed,
    #[error("Ingredient not found")]
    IngredientNotFound,
    #[error("Ingredient already exists")]
    IngredientAlreadyExists,
    #[error("Inventory item not found")]
    InventoryNotFound,
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Code to status lookup. Codes missing here render as 500.
static STATUS_BY_CODE: &[(&str, StatusCode)] = &[
    ("AUTH_ERROR", StatusCode::UNAUTHORIZED),
    ("UNAUTHORIZED", StatusCode::UNAUTHORIZED),
    ("JWT_VERIFICATION_FAILED", StatusCode::UNAUTHORIZED),
    ("JWT_TOKEN_INVALID", StatusCode::UNAUTHORIZED),
    ("FORBIDDEN", StatusCode::FORBIDDEN),
    ("USER_NOT_FOUND", StatusCode::NOT_FOUND),
    ("USER_ALREADY_EXISTS", StatusCode::CONFLICT),
    ("USER_VALIDATION_ERROR", StatusCode::BAD_REQUEST),
    ("USER_CREATION_FAILED", StatusCode::INTERNAL_SERVER_ERROR),
    ("INGREDIENT_NOT_FOUND", StatusCode::NOT_FOUND),
    ("INGREDIENT_ALREADY_EXISTS", StatusCode::CONFLICT),
    ("INVENTORY_NOT_FOUND", StatusCode::NOT_FOUND),
    ("VALIDATION_ERROR", StatusCode::BAD_REQUEST),
    ("INTERNAL_SERVER_ERROR", StatusCode::INTERNAL_SERVER_ERROR),
];

pub fn status_for_code(code: &str) -> StatusCode {
    STATUS_BY_CODE
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, status)| *status)
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Auth(_) => "AUTH_ERROR",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::JwtVerification(_) => "JWT_VERIFICATION_FAILED",
            AppError::JwtTokenInvalid(_) => "JWT_TOKEN_INVALID",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::UserNotFound => "USER_NOT_FOUND",
            AppError::UserAlreadyExists => "USER_ALREADY_EXISTS",
            AppError::UserValidation(_) => "USER_VALIDATION_ERROR",
            AppError::UserCreationFailed => "USER_CREATION_FAILED",
            AppError::IngredientNotFound => "INGREDIENT_NOT_FOUND",
            AppError::IngredientAlreadyExists => "INGREDIENT_ALREADY_EXISTS",
            AppError::InventoryNotFound => "INVENTORY_NOT_FOUND",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Internal(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        status_for_code(self.code())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    /// Message safe to show to clients.
    fn public_message(&self) -> String {
        match self {
            AppError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<TokenError> for AppError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Invalid(reason) => AppError::JwtTokenInvalid(reason.to_string()),
            TokenError::VerificationFailed(inner) => AppError::JwtVerification(inner.to_string()),
            TokenError::Signing(inner) => AppError::Internal(anyhow::anyhow!("jwt signing: {inner}")),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    message: String,
    code: &'static str,
}

#[derive(Debug, Serialize)]
struct ErrorEnvelope {
    success: bool,
    error: ErrorBody,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(code = self.code(), error = ?self, "request failed");
        }
        let body = ErrorEnvelope {
            success: false,
            error: ErrorBody {
                message: self.public_message(),
                code: self.code(),
            },
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn body_json(err: AppError) -> (StatusCode, Value) {
        let res = err.into_response();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn status_table_covers_taxonomy() {
        assert_eq!(AppError::Auth("x".into()).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::unauthorized("x").status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::UserNotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::UserAlreadyExists.status(), StatusCode::CONFLICT);
        assert_eq!(AppError::UserValidation("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::UserCreationFailed.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(AppError::forbidden("x").status(), StatusCode::FORBIDDEN);
        assert_eq!(
            AppError::Internal(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn unknown_code_defaults_to_500() {
        assert_eq!(status_for_code("SOMETHING_NEW"), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(status_for_code(""), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn renders_failure_envelope() {
        let (status, body) = body_json(AppError::Auth("Invalid credentials".into())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["message"], "Invalid credentials");
        assert_eq!(body["error"]["code"], "AUTH_ERROR");
    }

    #[tokio::test]
    async fn internal_errors_hide_their_cause() {
        let err = AppError::Internal(anyhow::anyhow!("connection refused on 10.0.0.3:5432"));
        let (status, body) = body_json(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["message"], "Internal server error");
        assert!(!body.to_string().contains("10.0.0.3"));
    }

    #[test]
    fn token_errors_keep_their_codes() {
        let err: AppError = TokenError::Invalid("missing userId").into();
        assert_eq!(err.code(), "JWT_TOKEN_INVALID");
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }
}
