//! In-memory session registry and the request layer that enforces it.

use std::collections::HashMap;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::Session;
use crate::errors::{AppError, AppErrorWithNotifications};
use crate::AppState;

/// Alternative header carrying the session token.
pub const SESSION_HEADER: &str = "x-session-token";

/// Token of the session attached to the current request.
#[derive(Debug, Clone)]
pub struct SessionToken(pub String);

/// Live sessions keyed by opaque token. Nothing here is persisted.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: HashMap<String, Session>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a session and return its new token.
    pub fn issue(&mut self, session: Session) -> String {
        let token = uuid::Uuid::new_v4().to_string();
        self.sessions.insert(token.clone(), session);
        token
    }

    pub fn get(&self, token: &str) -> Option<Session> {
        self.sessions.get(token).cloned()
    }

    /// Drop a session; returns whether it existed.
    pub fn revoke(&mut self, token: &str) -> bool {
        self.sessions.remove(token).is_some()
    }

    /// Re-derive the admin flag of every session held by `pseudo`.
    ///
    /// Keyed on the pseudo, which is unique; stored ids may be missing.
    pub fn set_admin(&mut self, pseudo: &str, is_admin: bool) {
        for session in self.sessions.values_mut() {
            if session.pseudo == pseudo {
                session.is_admin = is_admin;
            }
        }
    }

    /// Drop every session held by `pseudo`; returns how many were dropped.
    pub fn revoke_member(&mut self, pseudo: &str) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, session| session.pseudo != pseudo);
        before - self.sessions.len()
    }
}

/// Pull the session token from `x-session-token` or a bearer header.
fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .or_else(|| {
            headers
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.strip_prefix("Bearer "))
        })
        .map(|s| s.trim().to_string())
}

/// Reject requests without a live session; otherwise expose the [`Session`]
/// and its [`SessionToken`] as request extensions.
pub async fn session_layer(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = token_from_headers(request.headers()) else {
        return unauthorized("Connexion requise");
    };

    let session = state.sessions.read().await.get(&token);
    match session {
        Some(session) => {
            request.extensions_mut().insert(session);
            request.extensions_mut().insert(SessionToken(token));
            next.run(request).await
        }
        None => unauthorized("Session invalide ou expirée"),
    }
}

/// Fail unless the session belongs to an admin.
pub fn require_admin(session: &Session) -> Result<(), AppError> {
    if session.is_admin {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Action réservée aux administrateurs".to_string(),
        ))
    }
}

fn unauthorized(message: &str) -> Response {
    AppErrorWithNotifications::from(AppError::Unauthorized(message.to_string())).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use chrono::Utc;

    fn session(member_id: u64, is_admin: bool) -> Session {
        Session {
            member_id,
            pseudo: format!("member-{}", member_id),
            is_admin,
            authenticated_at: Utc::now(),
        }
    }

    #[test]
    fn test_issue_get_revoke() {
        let mut registry = SessionRegistry::new();
        let token = registry.issue(session(1, false));

        assert_eq!(registry.get(&token).unwrap().member_id, 1);
        assert!(registry.revoke(&token));
        assert!(!registry.revoke(&token));
        assert!(registry.get(&token).is_none());
    }

    #[test]
    fn test_tokens_are_distinct() {
        let mut registry = SessionRegistry::new();
        let a = registry.issue(session(1, false));
        let b = registry.issue(session(1, false));
        assert_ne!(a, b);
    }

    #[test]
    fn test_set_admin_updates_live_sessions() {
        let mut registry = SessionRegistry::new();
        let token = registry.issue(session(3, false));
        // Same stored id, different member
        let other = registry.issue(session(3, false));
        registry.sessions.get_mut(&other).unwrap().pseudo = "someone-else".to_string();

        registry.set_admin("member-3", true);
        assert!(registry.get(&token).unwrap().is_admin);
        assert!(!registry.get(&other).unwrap().is_admin);
    }

    #[test]
    fn test_revoke_member_drops_all_their_sessions() {
        let mut registry = SessionRegistry::new();
        let a = registry.issue(session(1, false));
        let b = registry.issue(session(1, false));
        let c = registry.issue(session(2, false));

        assert_eq!(registry.revoke_member("member-1"), 2);
        assert!(registry.get(&a).is_none());
        assert!(registry.get(&b).is_none());
        assert!(registry.get(&c).is_some());
    }

    #[test]
    fn test_token_from_headers() {
        let mut headers = HeaderMap::new();
        assert_eq!(token_from_headers(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        assert_eq!(token_from_headers(&headers).as_deref(), Some("abc"));

        headers.insert(SESSION_HEADER, HeaderValue::from_static("xyz"));
        assert_eq!(token_from_headers(&headers).as_deref(), Some("xyz"));
    }

    #[test]
    fn test_require_admin() {
        assert!(require_admin(&session(1, true)).is_ok());
        assert!(matches!(
            require_admin(&session(2, false)),
            Err(AppError::Forbidden(_))
        ));
    }
}
