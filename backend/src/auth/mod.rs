//! Member registration and login.
//!
//! Operations work on a borrowed [`Store`] and only touch it once every check
//! has passed. Persisting the result is the caller's job.

mod session;

pub use session::*;

use chrono::{DateTime, Utc};
use serde::Serialize;
use subtle::ConstantTimeEq;

use crate::models::{Member, MemberStatus, RegisterRequest, Role, Store};

/// Why a registration was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    PasswordMismatch,
    DuplicateUsername(String),
    DuplicateEmail(String),
    MissingField(&'static str),
}

impl std::fmt::Display for RegistrationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistrationError::PasswordMismatch => {
                write!(f, "Les mots de passe ne correspondent pas")
            }
            RegistrationError::DuplicateUsername(_) => write!(f, "Ce pseudo est déjà utilisé"),
            RegistrationError::DuplicateEmail(_) => write!(f, "Cet email est déjà utilisé"),
            RegistrationError::MissingField(field) => write!(f, "Champ obligatoire: {}", field),
        }
    }
}

impl std::error::Error for RegistrationError {}

/// Why authentication or a member-account change failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    InvalidCredentials,
    /// Registered but not yet validated by an admin
    PendingApproval,
    AccountDeleted,
    UnknownMember(String),
    /// Admin accounts cannot be removed
    AdminProtected(String),
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::InvalidCredentials => write!(f, "Pseudo ou mot de passe incorrect"),
            AuthError::PendingApproval => write!(
                f,
                "Votre compte est en attente de validation par un administrateur"
            ),
            AuthError::AccountDeleted => write!(f, "Ce compte a été supprimé"),
            AuthError::UnknownMember(pseudo) => write!(f, "Membre {} introuvable", pseudo),
            AuthError::AdminProtected(_) => {
                write!(f, "Impossible de supprimer un compte administrateur")
            }
        }
    }
}

impl std::error::Error for AuthError {}

/// Process-local identity established by a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub member_id: u64,
    pub pseudo: String,
    pub is_admin: bool,
    pub authenticated_at: DateTime<Utc>,
}

/// Next member id: one past both the counter and every id already present.
fn next_member_id(store: &Store) -> u64 {
    let max_existing = store.membres.iter().map(Member::id).max().unwrap_or(0);
    store.settings.last_membre_id().max(max_existing) + 1
}

/// Register a new member, pending admin validation.
///
/// New members are plain members; admin rights come from [`grant_admin`].
pub fn register(store: &mut Store, request: &RegisterRequest) -> Result<Member, RegistrationError> {
    if request.pseudo.trim().is_empty() {
        return Err(RegistrationError::MissingField("pseudo"));
    }
    if request.mot_de_passe.is_empty() {
        return Err(RegistrationError::MissingField("mot_de_passe"));
    }
    if request.mot_de_passe != request.mot_de_passe_confirm {
        return Err(RegistrationError::PasswordMismatch);
    }
    if store.find_member(&request.pseudo).is_some() {
        return Err(RegistrationError::DuplicateUsername(request.pseudo.clone()));
    }

    // An empty email field means "no email"
    let email = request
        .email
        .as_ref()
        .filter(|e| !e.trim().is_empty())
        .cloned();
    if let Some(email) = &email {
        if store.membres.iter().any(|m| m.email() == Some(email.as_str())) {
            return Err(RegistrationError::DuplicateEmail(email.clone()));
        }
    }

    let id = next_member_id(store);
    let member = Member {
        id: id.into(),
        pseudo: request.pseudo.clone().into(),
        nom: request.nom.clone().into(),
        prenom: request.prenom.clone().into(),
        email: email.into(),
        mot_de_passe: request.mot_de_passe.clone().into(),
        role: Role::Membre.into(),
        statut: MemberStatus::EnAttente.into(),
        date_inscription: Utc::now().to_rfc3339().into(),
        ..Member::default()
    };

    store.membres.push(member.clone());
    store.settings.last_membre_id = id.into();

    tracing::info!("Registered member {} (id {})", member.pseudo(), id);
    Ok(member)
}

/// Authenticate a member by pseudo and password.
///
/// Deleted accounts are refused, and so are pending accounts unless they
/// already hold the admin role.
pub fn login(store: &Store, pseudo: &str, password: &str) -> Result<Session, AuthError> {
    let member = store
        .find_member(pseudo)
        .filter(|m| {
            m.mot_de_passe
                .get()
                .is_some_and(|stored| constant_time_compare(stored, password))
        })
        .ok_or(AuthError::InvalidCredentials)?;

    match member.status() {
        MemberStatus::Supprime => return Err(AuthError::AccountDeleted),
        MemberStatus::EnAttente if !member.is_admin() => return Err(AuthError::PendingApproval),
        _ => {}
    }

    Ok(Session {
        member_id: member.id(),
        pseudo: member.pseudo().to_string(),
        is_admin: member.is_admin(),
        authenticated_at: Utc::now(),
    })
}

/// Give an existing member the admin role.
pub fn grant_admin(store: &mut Store, pseudo: &str) -> Result<Member, AuthError> {
    let member = store
        .find_member_mut(pseudo)
        .ok_or_else(|| AuthError::UnknownMember(pseudo.to_string()))?;

    member.role = Role::Admin.into();
    Ok(member.clone())
}

/// Approve a pending account so it can log in.
pub fn validate_member(store: &mut Store, pseudo: &str) -> Result<Member, AuthError> {
    let member = store
        .find_member_mut(pseudo)
        .ok_or_else(|| AuthError::UnknownMember(pseudo.to_string()))?;
    if member.status() == MemberStatus::Supprime {
        return Err(AuthError::AccountDeleted);
    }

    member.statut = MemberStatus::Valide.into();
    Ok(member.clone())
}

/// Soft-delete a member. The entry stays in the document with its history.
pub fn remove_member(store: &mut Store, pseudo: &str) -> Result<Member, AuthError> {
    let member = store
        .find_member_mut(pseudo)
        .ok_or_else(|| AuthError::UnknownMember(pseudo.to_string()))?;
    if member.is_admin() {
        return Err(AuthError::AdminProtected(pseudo.to_string()));
    }

    member.supprime = true.into();
    member.date_suppression = Utc::now().to_rfc3339().into();
    member.statut = MemberStatus::Supprime.into();
    Ok(member.clone())
}

/// Perform constant-time string comparison.
fn constant_time_compare(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(pseudo: &str, password: &str, confirm: &str) -> RegisterRequest {
        RegisterRequest {
            pseudo: pseudo.to_string(),
            nom: "Martin".to_string(),
            prenom: "Alice".to_string(),
            email: None,
            mot_de_passe: password.to_string(),
            mot_de_passe_confirm: confirm.to_string(),
        }
    }

    /// Register and validate a member.
    fn approved(store: &mut Store, pseudo: &str, password: &str) {
        register(store, &request(pseudo, password, password)).unwrap();
        validate_member(store, pseudo).unwrap();
    }

    #[test]
    fn test_register_appends_pending_member() {
        let mut store = Store::default();
        let member = register(&mut store, &request("alice", "pw", "pw")).unwrap();

        assert_eq!(member.id(), 1);
        assert_eq!(member.role(), Role::Membre);
        assert_eq!(member.status(), MemberStatus::EnAttente);
        assert_eq!(store.membres.len(), 1);
        assert_eq!(store.settings.last_membre_id(), 1);

        let stored = serde_json::to_value(&store.membres[0]).unwrap();
        assert_eq!(stored["statut"], "en_attente");
        assert_eq!(stored["email"], serde_json::Value::Null);
    }

    #[test]
    fn test_member_id_skips_past_stale_counter() {
        let mut store: Store = serde_json::from_value(json!({
            "membres": [
                { "id": 1, "pseudo": "alice", "mot_de_passe": "pw" },
                { "id": 7, "pseudo": "bob", "mot_de_passe": "pw" }
            ],
            "settings": { "lastGameId": 3 }
        }))
        .unwrap();

        let member = register(&mut store, &request("carol", "pw", "pw")).unwrap();
        assert_eq!(member.id(), 8);
        assert_eq!(store.settings.last_membre_id(), 8);

        let ids: Vec<u64> = store.membres.iter().map(Member::id).collect();
        assert_eq!(ids, vec![1, 7, 8]);
    }

    #[test]
    fn test_register_duplicate_username() {
        let mut store = Store::default();
        register(&mut store, &request("alice", "pw", "pw")).unwrap();

        let err = register(&mut store, &request("alice", "other", "other")).unwrap_err();
        assert_eq!(err, RegistrationError::DuplicateUsername("alice".to_string()));
        assert_eq!(store.membres.len(), 1);
    }

    #[test]
    fn test_username_is_case_sensitive() {
        let mut store = Store::default();
        register(&mut store, &request("alice", "pw", "pw")).unwrap();
        register(&mut store, &request("Alice", "pw", "pw")).unwrap();
        assert_eq!(store.membres.len(), 2);
    }

    #[test]
    fn test_register_password_mismatch() {
        let mut store = Store::default();
        let err = register(&mut store, &request("bob", "pw", "pW")).unwrap_err();

        assert_eq!(err, RegistrationError::PasswordMismatch);
        assert!(store.membres.is_empty());
        assert_eq!(store.settings.last_membre_id(), 0);
    }

    #[test]
    fn test_register_duplicate_email() {
        let mut store = Store::default();
        let mut first = request("alice", "pw", "pw");
        first.email = Some("a@club.fr".to_string());
        register(&mut store, &first).unwrap();

        let mut second = request("bob", "pw", "pw");
        second.email = Some("a@club.fr".to_string());
        assert_eq!(
            register(&mut store, &second).unwrap_err(),
            RegistrationError::DuplicateEmail("a@club.fr".to_string())
        );

        // Blank emails never collide
        let mut third = request("carol", "pw", "pw");
        third.email = Some(String::new());
        let member = register(&mut store, &third).unwrap();
        assert_eq!(member.email(), None);
    }

    #[test]
    fn test_register_blank_pseudo() {
        let mut store = Store::default();
        assert_eq!(
            register(&mut store, &request("  ", "pw", "pw")).unwrap_err(),
            RegistrationError::MissingField("pseudo")
        );
    }

    #[test]
    fn test_login_success_and_failure() {
        let mut store = Store::default();
        approved(&mut store, "alice", "password");

        let session = login(&store, "alice", "password").unwrap();
        assert_eq!(session.pseudo, "alice");
        assert!(!session.is_admin);

        assert_eq!(
            login(&store, "alice", "wrong").unwrap_err(),
            AuthError::InvalidCredentials
        );
        assert_eq!(
            login(&store, "nobody", "password").unwrap_err(),
            AuthError::InvalidCredentials
        );
    }

    #[test]
    fn test_pending_and_deleted_accounts_cannot_log_in() {
        let store: Store = serde_json::from_value(json!({
            "membres": [
                { "id": 1, "pseudo": "bob", "mot_de_passe": "pw", "role": "membre", "statut": "en_attente" },
                { "id": 2, "pseudo": "gone", "mot_de_passe": "pw", "role": "membre", "statut": "supprime", "supprime": true },
                { "id": 3, "pseudo": "old", "mot_de_passe": "pw", "role": "membre" },
                { "id": 4, "pseudo": "boss", "mot_de_passe": "pw", "role": "admin", "statut": "en_attente" }
            ]
        }))
        .unwrap();

        assert_eq!(login(&store, "bob", "pw").unwrap_err(), AuthError::PendingApproval);
        assert_eq!(login(&store, "gone", "pw").unwrap_err(), AuthError::AccountDeleted);
        // Wrong password never reveals the account state
        assert_eq!(login(&store, "bob", "x").unwrap_err(), AuthError::InvalidCredentials);

        assert!(login(&store, "old", "pw").is_ok());
        assert!(login(&store, "boss", "pw").unwrap().is_admin);
    }

    #[test]
    fn test_validate_member_opens_login() {
        let mut store = Store::default();
        register(&mut store, &request("bob", "pw", "pw")).unwrap();
        assert_eq!(login(&store, "bob", "pw").unwrap_err(), AuthError::PendingApproval);

        let member = validate_member(&mut store, "bob").unwrap();
        assert_eq!(member.status(), MemberStatus::Valide);
        assert!(login(&store, "bob", "pw").is_ok());

        assert_eq!(
            validate_member(&mut store, "ghost").unwrap_err(),
            AuthError::UnknownMember("ghost".to_string())
        );
    }

    #[test]
    fn test_remove_member_is_soft() {
        let mut store = Store::default();
        approved(&mut store, "bob", "pw");
        approved(&mut store, "admin", "pw");
        grant_admin(&mut store, "admin").unwrap();

        let removed = remove_member(&mut store, "bob").unwrap();
        assert_eq!(removed.status(), MemberStatus::Supprime);
        assert_eq!(store.membres.len(), 2);
        assert_eq!(login(&store, "bob", "pw").unwrap_err(), AuthError::AccountDeleted);
        assert_eq!(
            validate_member(&mut store, "bob").unwrap_err(),
            AuthError::AccountDeleted
        );

        let stored = serde_json::to_value(&store.membres[0]).unwrap();
        assert_eq!(stored["supprime"], true);
        assert!(stored["date_suppression"].is_string());

        assert_eq!(
            remove_member(&mut store, "admin").unwrap_err(),
            AuthError::AdminProtected("admin".to_string())
        );
    }

    #[test]
    fn test_grant_admin_carries_into_session() {
        let mut store = Store::default();
        register(&mut store, &request("admin", "password", "password")).unwrap();

        let member = grant_admin(&mut store, "admin").unwrap();
        assert!(member.is_admin());
        assert!(login(&store, "admin", "password").unwrap().is_admin);

        assert_eq!(
            grant_admin(&mut store, "ghost").unwrap_err(),
            AuthError::UnknownMember("ghost".to_string())
        );
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("test-key-123", "test-key-123"));
        assert!(!constant_time_compare("test-key-123", "test-key-124"));
        assert!(!constant_time_compare("short", "much-longer-key"));
        assert!(constant_time_compare("", ""));
    }
}
