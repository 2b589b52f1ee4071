//! Member administration endpoints.

use axum::{extract::State, Extension};

use super::{respond, success, ApiPath, ApiResult};
use crate::auth::{require_admin, Session};
use crate::models::MemberView;
use crate::notify::NotificationLog;
use crate::AppState;

/// GET /api/members - List all members (admin).
pub async fn list_members(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> ApiResult<Vec<MemberView>> {
    require_admin(&session)?;

    let club = state.club.lock().await;
    success(club.members().iter().map(MemberView::from).collect())
}

/// POST /api/members/{pseudo}/admin - Promote a member to admin (admin).
pub async fn grant_admin(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    ApiPath(pseudo): ApiPath<String>,
) -> ApiResult<MemberView> {
    require_admin(&session)?;

    let mut log = NotificationLog::new();
    let result = state.club.lock().await.grant_admin(&pseudo, &mut log);

    if result.is_ok() {
        state.sessions.write().await.set_admin(&pseudo, true);
    }

    respond(result.map(|member| MemberView::from(&member)), log)
}

/// POST /api/members/{pseudo}/valider - Approve a pending account (admin).
pub async fn validate_member(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    ApiPath(pseudo): ApiPath<String>,
) -> ApiResult<MemberView> {
    require_admin(&session)?;

    let mut log = NotificationLog::new();
    let result = state.club.lock().await.validate_member(&pseudo, &mut log);
    respond(result.map(|member| MemberView::from(&member)), log)
}

/// DELETE /api/members/{pseudo} - Soft-delete a member and end their sessions (admin).
pub async fn remove_member(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    ApiPath(pseudo): ApiPath<String>,
) -> ApiResult<MemberView> {
    require_admin(&session)?;

    let mut log = NotificationLog::new();
    let result = state.club.lock().await.remove_member(&pseudo, &mut log);

    if result.is_ok() {
        let revoked = state.sessions.write().await.revoke_member(&pseudo);
        tracing::debug!("Revoked {} session(s) of {}", revoked, pseudo);
    }

    respond(result.map(|member| MemberView::from(&member)), log)
}
