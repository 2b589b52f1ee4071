//! Error handling module for the club backend.
//!
//! Provides the API error type with mapping to HTTP status codes and the
//! error response envelope.

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::auth::{AuthError, RegistrationError};
use crate::ludotheque::{CatalogError, ValidationError};
use crate::notify::Notification;

/// Error codes as constants to avoid stringly-typed errors.
pub mod codes {
    pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
    pub const FORBIDDEN: &str = "FORBIDDEN";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const CONFLICT: &str = "CONFLICT";
    pub const BAD_REQUEST: &str = "BAD_REQUEST";
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    /// Missing session or bad credentials
    Unauthorized(String),
    /// Session lacks the admin role
    Forbidden(String),
    /// Resource not found
    NotFound(String),
    /// Rejected field value
    Validation { field: String, message: String },
    /// Uniqueness violation
    Conflict(String),
    /// Malformed request body, query or path
    BadRequest(String),
}

impl AppError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Unauthorized(_) => codes::UNAUTHORIZED,
            AppError::Forbidden(_) => codes::FORBIDDEN,
            AppError::NotFound(_) => codes::NOT_FOUND,
            AppError::Validation { .. } => codes::VALIDATION_ERROR,
            AppError::Conflict(_) => codes::CONFLICT,
            AppError::BadRequest(_) => codes::BAD_REQUEST,
        }
    }

    /// Get the error message.
    pub fn message(&self) -> String {
        match self {
            AppError::Unauthorized(msg) => msg.clone(),
            AppError::Forbidden(msg) => msg.clone(),
            AppError::NotFound(msg) => msg.clone(),
            AppError::Validation { message, .. } => message.clone(),
            AppError::Conflict(msg) => msg.clone(),
            AppError::BadRequest(msg) => msg.clone(),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error_code(), self.message())
    }
}

impl std::error::Error for AppError {}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation {
            field: err.field().to_string(),
            message: err.to_string(),
        }
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Validation(e) => e.into(),
            CatalogError::NotFound(_) => AppError::NotFound(err.to_string()),
        }
    }
}

impl From<RegistrationError> for AppError {
    fn from(err: RegistrationError) -> Self {
        match &err {
            RegistrationError::PasswordMismatch => AppError::Validation {
                field: "mot_de_passe_confirm".to_string(),
                message: err.to_string(),
            },
            RegistrationError::MissingField(field) => AppError::Validation {
                field: field.to_string(),
                message: err.to_string(),
            },
            RegistrationError::DuplicateUsername(_) | RegistrationError::DuplicateEmail(_) => {
                AppError::Conflict(err.to_string())
            }
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => AppError::Unauthorized(err.to_string()),
            AuthError::PendingApproval
            | AuthError::AccountDeleted
            | AuthError::AdminProtected(_) => AppError::Forbidden(err.to_string()),
            AuthError::UnknownMember(_) => AppError::NotFound(err.to_string()),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(format!("JSON error: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

/// Error details in the response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Error response envelope.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetails,
    pub notifications: Vec<Notification>,
}

impl ErrorResponse {
    pub fn new(error: &AppError, notifications: Vec<Notification>) -> Self {
        let details = match error {
            AppError::Validation { field, .. } => Some(serde_json::json!({ "field": field })),
            _ => None,
        };

        Self {
            success: false,
            error: ErrorDetails {
                code: error.error_code().to_string(),
                message: error.message(),
                details,
            },
            notifications,
        }
    }
}

/// Wrapper type for errors that carry the notifications raised so far.
pub struct AppErrorWithNotifications {
    pub error: AppError,
    pub notifications: Vec<Notification>,
}

impl From<AppError> for AppErrorWithNotifications {
    fn from(error: AppError) -> Self {
        Self {
            error,
            notifications: Vec::new(),
        }
    }
}

impl IntoResponse for AppErrorWithNotifications {
    fn into_response(self) -> Response {
        let status = self.error.status_code();
        let body = ErrorResponse::new(&self.error, self.notifications);
        (status, Json(body)).into_response()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        AppErrorWithNotifications::from(self).into_response()
    }
}
