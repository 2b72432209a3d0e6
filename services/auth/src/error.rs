use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Auth service domain error variants.
///
/// The status mapping is a client contract: 401 means re-authenticate, 403
/// means the session principal may not do this (or the account died after
/// token issuance), 400 means the request itself is wrong.
#[derive(Debug, thiserror::Error)]
pub enum AuthServiceError {
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("missing or invalid session token")]
    Unauthenticated,
    #[error("access restricted to another account type")]
    Forbidden,
    #[error("account invalid or deactivated")]
    AccountInvalid,
    #[error("no active account for this channel")]
    NotFound,
    #[error("reset code invalid or expired")]
    InvalidOrExpired,
    #[error("verification token invalid or expired")]
    InvalidToken,
    #[error("password must be at least 6 characters")]
    WeakPassword,
    #[error("{0}")]
    InvalidInput(String),
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl AuthServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::Forbidden => "FORBIDDEN",
            Self::AccountInvalid => "ACCOUNT_INVALID",
            Self::NotFound => "NOT_FOUND",
            Self::InvalidOrExpired => "CODE_INVALID_OR_EXPIRED",
            Self::InvalidToken => "TOKEN_INVALID",
            Self::WeakPassword => "WEAK_PASSWORD",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl IntoResponse for AuthServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::InvalidCredentials | Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Forbidden | Self::AccountInvalid => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::InvalidOrExpired
            | Self::InvalidToken
            | Self::WeakPassword
            | Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // 4xx are expected client outcomes and already visible in the access
        // log; only internal faults carry an anyhow chain worth recording.
        // The client gets the generic message, never the chain.
        if let Self::Internal(ref e) = self {
            tracing::error!(error = %e, kind = "INTERNAL", "internal error");
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}
