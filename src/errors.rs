use axum::http::StatusCode;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ConfigMissing,
    AuthRequired,
    SessionExpired,
    Fetch,
    Validation,
    Write,
    Busy,
    Internal,
}

#[derive(Debug)]
pub struct AppError {
    pub kind: ErrorKind,
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    fn new(kind: ErrorKind, status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            kind,
            status,
            message: message.into(),
        }
    }

    pub fn config_missing() -> Self {
        Self::new(
            ErrorKind::ConfigMissing,
            StatusCode::SERVICE_UNAVAILABLE,
            "configuration required",
        )
    }

    pub fn auth_required() -> Self {
        Self::new(ErrorKind::AuthRequired, StatusCode::UNAUTHORIZED, "login required")
    }

    pub fn session_expired() -> Self {
        Self::new(
            ErrorKind::SessionExpired,
            StatusCode::UNAUTHORIZED,
            "Your session has expired. Please log in again.",
        )
    }

    pub fn fetch(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Fetch, StatusCode::BAD_GATEWAY, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, StatusCode::UNPROCESSABLE_ENTITY, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, StatusCode::BAD_REQUEST, message)
    }

    pub fn write(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Write, StatusCode::BAD_GATEWAY, message)
    }

    pub fn busy() -> Self {
        Self::new(ErrorKind::Busy, StatusCode::CONFLICT, "a recording is already in progress")
    }

    pub fn internal(err: impl std::error::Error) -> Self {
        Self::new(
            ErrorKind::Internal,
            StatusCode::INTERNAL_SERVER_ERROR,
            err.to_string(),
        )
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::internal(err)
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}
