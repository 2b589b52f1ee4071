//! Club member model matching the stored `membres` entries.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::Stored;

/// Member role; only admins may edit the catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    Membre,
}

/// Account approval state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberStatus {
    /// Registered, waiting for an admin
    EnAttente,
    /// Accounts predating approval carry no status and count as validated
    #[default]
    Valide,
    /// Soft-deleted; the entry stays for history
    Supprime,
}

/// A registered club member.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Member {
    #[serde(default, skip_serializing_if = "Stored::is_absent")]
    pub id: Stored<u64>,
    #[serde(default, skip_serializing_if = "Stored::is_absent")]
    pub pseudo: Stored<String>,
    #[serde(default, skip_serializing_if = "Stored::is_absent")]
    pub nom: Stored<String>,
    #[serde(default, skip_serializing_if = "Stored::is_absent")]
    pub prenom: Stored<String>,
    #[serde(default, skip_serializing_if = "Stored::is_absent")]
    pub email: Stored<Option<String>>,
    #[serde(default, skip_serializing_if = "Stored::is_absent")]
    pub mot_de_passe: Stored<String>,
    #[serde(default, skip_serializing_if = "Stored::is_absent")]
    pub role: Stored<Role>,
    #[serde(default, skip_serializing_if = "Stored::is_absent")]
    pub statut: Stored<MemberStatus>,
    #[serde(default, skip_serializing_if = "Stored::is_absent")]
    pub supprime: Stored<bool>,
    #[serde(default, skip_serializing_if = "Stored::is_absent")]
    pub date_suppression: Stored<String>,
    #[serde(default, skip_serializing_if = "Stored::is_absent")]
    pub date_inscription: Stored<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Member {
    pub fn id(&self) -> u64 {
        self.id.or_zero()
    }

    pub fn pseudo(&self) -> &str {
        self.pseudo.as_str()
    }

    /// Email, if one was given.
    pub fn email(&self) -> Option<&str> {
        self.email
            .get()
            .and_then(|e| e.as_deref())
            .filter(|e| !e.is_empty())
    }

    pub fn role(&self) -> Role {
        self.role.get().copied().unwrap_or_default()
    }

    pub fn is_admin(&self) -> bool {
        self.role() == Role::Admin
    }

    pub fn status(&self) -> MemberStatus {
        if self.supprime.get() == Some(&true) {
            return MemberStatus::Supprime;
        }
        self.statut.get().copied().unwrap_or_default()
    }
}

/// Member as exposed over the API, without the credential.
#[derive(Debug, Clone, Serialize)]
pub struct MemberView {
    pub id: u64,
    pub pseudo: String,
    pub nom: String,
    pub prenom: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub role: Role,
    pub statut: MemberStatus,
    pub date_inscription: String,
}

impl From<&Member> for MemberView {
    fn from(member: &Member) -> Self {
        Self {
            id: member.id(),
            pseudo: member.pseudo().to_string(),
            nom: member.nom.as_str().to_string(),
            prenom: member.prenom.as_str().to_string(),
            email: member.email().map(str::to_string),
            role: member.role(),
            statut: member.status(),
            date_inscription: member.date_inscription.as_str().to_string(),
        }
    }
}

/// Request body of the registration form.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub pseudo: String,
    #[serde(default)]
    pub nom: String,
    #[serde(default)]
    pub prenom: String,
    #[serde(default)]
    pub email: Option<String>,
    pub mot_de_passe: String,
    pub mot_de_passe_confirm: String,
}

/// Request body of the login form.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub pseudo: String,
    pub mot_de_passe: String,
}
