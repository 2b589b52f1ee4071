//! REST API module.
//!
//! Handlers translate requests into club operations and wrap the outcome,
//! together with the notifications it raised, in a JSON envelope.

mod auth;
mod ludotheque;
mod members;

pub use auth::*;
pub use ludotheque::*;
pub use members::*;

use axum::{
    extract::{FromRequest, FromRequestParts},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::errors::{AppError, AppErrorWithNotifications};
use crate::notify::{Notification, NotificationLog};

/// JSON body whose rejection is reported in the error envelope.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Query string whose rejection is reported in the error envelope.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

/// Path parameters whose rejection is reported in the error envelope.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);

/// Success response envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
    pub notifications: Vec<Notification>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T, notifications: Vec<Notification>) -> Self {
        Self {
            success: true,
            data,
            notifications,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Response type that can be either success or error.
pub type ApiResult<T> = Result<ApiResponse<T>, AppErrorWithNotifications>;

/// Create a successful API response without notifications.
pub fn success<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(ApiResponse::new(data, Vec::new()))
}

/// Wrap an operation result with the notifications it produced.
pub fn respond<T, E>(result: Result<T, E>, log: NotificationLog) -> ApiResult<T>
where
    T: Serialize,
    E: Into<AppError>,
{
    match result {
        Ok(data) => Ok(ApiResponse::new(data, log.into_entries())),
        Err(e) => Err(AppErrorWithNotifications {
            error: e.into(),
            notifications: log.into_entries(),
        }),
    }
}
