/// Error Handling Module
///
/// Unified error type for the application, mapping every failure class to an
/// HTTP status and a structured JSON body. Storage-layer failures surface as
/// generic internal errors; no retries happen at this layer.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use std::error::Error as StdError;
use std::fmt;

/// Validation errors for input data, caught before touching storage
#[derive(Debug, Clone)]
pub enum ValidationError {
    EmptyField(&'static str),
    TooShort(&'static str, usize),
    TooLong(&'static str, usize),
    InvalidFormat(String),
    SuspiciousContent(&'static str),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyField(field) => write!(f, "{} is empty", field),
            ValidationError::TooShort(field, min) => {
                write!(f, "{} is too short (minimum {} characters)", field, min)
            }
            ValidationError::TooLong(field, max) => {
                write!(f, "{} is too long (maximum {} characters)", field, max)
            }
            ValidationError::InvalidFormat(msg) => write!(f, "{}", msg),
            ValidationError::SuspiciousContent(field) => {
                write!(f, "{} contains suspicious content", field)
            }
        }
    }
}

impl StdError for ValidationError {}

/// Duplicate-entry conflicts. Uniqueness of usernames, emails, and role names
/// is public information, so these are reported specifically.
#[derive(Debug, Clone)]
pub enum ConflictError {
    DuplicateUsername,
    DuplicateEmail,
    RoleExists,
}

impl fmt::Display for ConflictError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictError::DuplicateUsername => write!(f, "username already exists"),
            ConflictError::DuplicateEmail => write!(f, "email already registered"),
            ConflictError::RoleExists => write!(f, "role already exists"),
        }
    }
}

impl StdError for ConflictError {}

/// Unknown target entities
#[derive(Debug, Clone)]
pub enum NotFoundError {
    User,
    Role,
}

impl fmt::Display for NotFoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotFoundError::User => write!(f, "user not found"),
            NotFoundError::Role => write!(f, "role not found"),
        }
    }
}

impl StdError for NotFoundError {}

/// Authentication errors.
///
/// `InvalidCredentials` covers both unknown-username and wrong-password so
/// login responses never reveal whether a username exists.
#[derive(Debug, Clone)]
pub enum AuthError {
    InvalidCredentials,
    InvalidRefreshToken,
    TokenExpired,
    TokenInvalid,
    MissingToken,
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::InvalidCredentials => write!(f, "Invalid credentials"),
            AuthError::InvalidRefreshToken => write!(f, "Invalid refresh token"),
            AuthError::TokenExpired => write!(f, "Token has expired"),
            AuthError::TokenInvalid => write!(f, "Invalid token"),
            AuthError::MissingToken => write!(f, "Missing authentication token"),
        }
    }
}

impl StdError for AuthError {}

/// Central error type that all application errors map to
#[derive(Debug)]
pub enum AppError {
    Validation(ValidationError),
    Conflict(ConflictError),
    NotFound(NotFoundError),
    Auth(AuthError),
    Forbidden,
    Database(String),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(e) => write!(f, "{}", e),
            AppError::Conflict(e) => write!(f, "{}", e),
            AppError::NotFound(e) => write!(f, "{}", e),
            AppError::Auth(e) => write!(f, "{}", e),
            AppError::Forbidden => write!(f, "insufficient role"),
            AppError::Database(msg) => write!(f, "Database error: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl StdError for AppError {}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err)
    }
}

impl From<ConflictError> for AppError {
    fn from(err: ConflictError) -> Self {
        AppError::Conflict(err)
    }
}

impl From<NotFoundError> for AppError {
    fn from(err: NotFoundError) -> Self {
        AppError::NotFound(err)
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError::Auth(err)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        // Unique-index violations carry the constraint name; everything else
        // is an opaque storage failure.
        if let sqlx::Error::Database(db) = &err {
            if db.code().as_deref() == Some("23505") {
                return match db.constraint() {
                    Some("users_username_key") => {
                        AppError::Conflict(ConflictError::DuplicateUsername)
                    }
                    Some("users_email_key") => AppError::Conflict(ConflictError::DuplicateEmail),
                    Some("roles_name_key") => AppError::Conflict(ConflictError::RoleExists),
                    _ => AppError::Database(err.to_string()),
                };
            }
        }
        AppError::Database(err.to_string())
    }
}

/// Error response structure for HTTP responses
#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    /// Unique error ID for tracking
    pub error_id: String,
    /// Human-readable error message
    pub message: String,
    /// Error code for client-side handling
    pub code: String,
    /// HTTP status code
    pub status: u16,
    /// Timestamp when error occurred
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_id: String, message: String, code: String, status: u16) -> Self {
        Self {
            error_id,
            message,
            code,
            status,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

impl AppError {
    /// Status, client-facing code, and client-facing message for this error.
    /// Database and internal details never reach the client.
    fn response_parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Validation(e) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string()),
            AppError::Conflict(e) => {
                let code = match e {
                    ConflictError::DuplicateUsername => "DUPLICATE_USERNAME",
                    ConflictError::DuplicateEmail => "DUPLICATE_EMAIL",
                    ConflictError::RoleExists => "ROLE_EXISTS",
                };
                (StatusCode::CONFLICT, code, e.to_string())
            }
            AppError::NotFound(e) => (StatusCode::NOT_FOUND, "NOT_FOUND", e.to_string()),
            AppError::Auth(e) => {
                let (code, message) = match e {
                    AuthError::InvalidCredentials => ("INVALID_CREDENTIALS", "Invalid credentials"),
                    AuthError::InvalidRefreshToken => {
                        ("INVALID_REFRESH_TOKEN", "Invalid refresh token")
                    }
                    AuthError::TokenExpired | AuthError::TokenInvalid => {
                        ("TOKEN_INVALID", "Invalid or expired token")
                    }
                    AuthError::MissingToken => ("MISSING_TOKEN", "Missing authentication token"),
                };
                (StatusCode::UNAUTHORIZED, code, message.to_string())
            }
            AppError::Forbidden => (
                StatusCode::FORBIDDEN,
                "FORBIDDEN",
                "Insufficient role".to_string(),
            ),
            AppError::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "Internal server error".to_string(),
            ),
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "Internal server error".to_string(),
            ),
        }
    }

    fn log(&self, error_id: &str) {
        match self {
            AppError::Validation(e) => {
                tracing::warn!(error_id = error_id, error = %e, "Validation error");
            }
            AppError::Conflict(e) => {
                tracing::warn!(error_id = error_id, error = %e, "Duplicate entry attempt");
            }
            AppError::NotFound(e) => {
                tracing::info!(error_id = error_id, error = %e, "Target not found");
            }
            AppError::Auth(e) => {
                tracing::warn!(error_id = error_id, error = %e, "Authentication error");
            }
            AppError::Forbidden => {
                tracing::warn!(error_id = error_id, "Authorization denied");
            }
            AppError::Database(msg) => {
                tracing::error!(error_id = error_id, error = %msg, "Database error");
            }
            AppError::Internal(msg) => {
                tracing::error!(error_id = error_id, error = %msg, "Internal error");
            }
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let error_id = uuid::Uuid::new_v4().to_string();
        self.log(&error_id);

        let (status, code, message) = self.response_parts();
        let body = ErrorResponse::new(error_id, message, code.to_string(), status.as_u16());

        HttpResponse::build(status).json(body)
    }

    fn status_code(&self) -> StatusCode {
        self.response_parts().0
    }
}
