use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::api::ErrorResponse;
use crate::AuthError;

/// converts `AuthError` into appropriate HTTP responses
#[derive(Debug)]
pub struct AppError(pub AuthError);

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        Self(err)
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            AuthError::InvalidCredentials
            | AuthError::InvalidToken
            | AuthError::ExpiredToken
            | AuthError::RevokedToken => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden(_) => StatusCode::FORBIDDEN,
            AuthError::UserNotFound | AuthError::TeamNotFound | AuthError::MemberNotFound => {
                StatusCode::NOT_FOUND
            }
            AuthError::Validation(_)
            | AuthError::DuplicateEmail
            | AuthError::DuplicateOAuthAccount
            | AuthError::AlreadyMember
            | AuthError::InvalidOperation(_)
            | AuthError::InvalidRole(_) => StatusCode::BAD_REQUEST,
            AuthError::CorruptCredential
            | AuthError::PasswordHashError
            | AuthError::ConfigurationError(_)
            | AuthError::DatabaseError(_)
            | AuthError::StoreUnavailable(_)
            | AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::error!(target: "teamward", "msg=\"request failed\", error=\"{}\"", self.0);
        } else if self.0.is_unauthenticated() {
            // the precise reason only goes to the log
            log::info!(target: "teamward", "msg=\"unauthenticated request\", reason=\"{}\"", self.0);
        }

        (status, Json(ErrorResponse::from(self.0))).into_response()
    }
}
