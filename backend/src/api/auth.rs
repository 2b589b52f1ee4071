//! Registration, login and session endpoints.

use axum::{extract::State, Extension};
use serde::Serialize;

use super::{respond, success, ApiJson, ApiResult};
use crate::auth::{Session, SessionToken};
use crate::models::{LoginRequest, MemberView, RegisterRequest};
use crate::notify::NotificationLog;
use crate::AppState;

/// Body returned by a successful login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub session: Session,
}

/// POST /api/auth/register - Register a new member.
pub async fn register(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> ApiResult<MemberView> {
    let mut log = NotificationLog::new();
    let result = state
        .club
        .lock()
        .await
        .register(&request, &mut log)
        .map(|member| MemberView::from(&member));

    respond(result, log)
}

/// POST /api/auth/login - Open a session.
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let mut log = NotificationLog::new();
    let result = state
        .club
        .lock()
        .await
        .login(&request.pseudo, &request.mot_de_passe, &mut log);

    let result = match result {
        Ok(session) => {
            let token = state.sessions.write().await.issue(session.clone());
            Ok(LoginResponse { token, session })
        }
        Err(e) => Err(e),
    };

    respond(result, log)
}

/// POST /api/auth/logout - Close the current session.
pub async fn logout(
    State(state): State<AppState>,
    Extension(token): Extension<SessionToken>,
) -> ApiResult<()> {
    state.sessions.write().await.revoke(&token.0);
    success(())
}

/// GET /api/auth/session - Describe the current session.
pub async fn current_session(Extension(session): Extension<Session>) -> ApiResult<Session> {
    success(session)
}
