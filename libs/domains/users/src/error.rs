use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_helpers::ErrorResponse;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("User not found with ID: {0}")]
    NotFound(i64),

    #[error("User not found with email: {0}")]
    NotFoundByEmail(String),

    #[error("{0}")]
    Validation(String),

    #[error("User with this email already exists")]
    DuplicateEmail(String),

    #[error("User with this username already exists")]
    DuplicateUsername(String),

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Failed to publish user event: {0}")]
    Publish(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type UserResult<T> = Result<T, UserError>;

impl UserError {
    fn status(&self) -> StatusCode {
        match self {
            UserError::NotFound(_) | UserError::NotFoundByEmail(_) => StatusCode::NOT_FOUND,
            UserError::Validation(_)
            | UserError::DuplicateEmail(_)
            | UserError::DuplicateUsername(_) => StatusCode::BAD_REQUEST,
            UserError::PasswordHash(_) | UserError::Publish(_) | UserError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            UserError::NotFound(_) | UserError::NotFoundByEmail(_) => "NotFound",
            UserError::Validation(_) => "BadRequest",
            UserError::DuplicateEmail(_) | UserError::DuplicateUsername(_) => "Duplicate",
            _ => "InternalServerError",
        }
    }

    fn into_error_response(self, status: StatusCode) -> Response {
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "Internal error");
            "An internal server error occurred".to_string()
        } else {
            self.to_string()
        };

        let kind = if status == StatusCode::NOT_FOUND {
            "NotFound"
        } else {
            self.kind()
        };

        ErrorResponse::new(kind, message).into_response_with(status)
    }
}

/// Create/update mapping: validation and duplicates are 400.
impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        let status = self.status();
        self.into_error_response(status)
    }
}

/// Error wrapper for lookups by id/email and deletes.
///
/// An invalid id is reported as 404 here rather than 400, the same as a missing user.
#[derive(Debug)]
pub struct LookupError(pub UserError);

impl From<UserError> for LookupError {
    fn from(err: UserError) -> Self {
        Self(err)
    }
}

impl IntoResponse for LookupError {
    fn into_response(self) -> Response {
        let status = match self.0.status() {
            StatusCode::BAD_REQUEST => StatusCode::NOT_FOUND,
            other => other,
        };
        self.0.into_error_response(status)
    }
}
