//! Root document holding every persisted collection.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{Game, Member, Stored};

/// The single persisted document containing all application data.
///
/// Every collection is optional on read so older documents load cleanly.
/// Fields this backend does not know about are kept in `extra` and written
/// back untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Store {
    #[serde(default)]
    pub produits: Vec<Value>,
    #[serde(default)]
    pub membres: Vec<Member>,
    #[serde(default)]
    pub transactions: Vec<Value>,
    #[serde(default)]
    pub ludotheque: Vec<Game>,
    #[serde(default)]
    pub adhesions: Vec<Value>,
    #[serde(default)]
    pub evenements: Vec<Value>,
    #[serde(default)]
    pub annonces: Vec<Value>,
    #[serde(default, skip_serializing_if = "Settings::is_empty")]
    pub settings: Settings,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Id counters and other document-wide settings.
///
/// The client bumps counters with `++`, so a counter that was never set is
/// stored as `null`; it reads as 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Stored::is_absent")]
    pub last_game_id: Stored<u64>,
    #[serde(default, skip_serializing_if = "Stored::is_absent")]
    pub last_membre_id: Stored<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Settings {
    pub fn last_game_id(&self) -> u64 {
        self.last_game_id.or_zero()
    }

    pub fn last_membre_id(&self) -> u64 {
        self.last_membre_id.or_zero()
    }

    fn is_empty(&self) -> bool {
        self.last_game_id.is_absent() && self.last_membre_id.is_absent() && self.extra.is_empty()
    }
}

impl Store {
    pub fn find_game(&self, id: u64) -> Option<&Game> {
        self.ludotheque.iter().find(|g| g.id() == id)
    }

    pub fn find_member(&self, pseudo: &str) -> Option<&Member> {
        self.membres
            .iter()
            .find(|m| m.pseudo.get().map(String::as_str) == Some(pseudo))
    }

    pub fn find_member_mut(&mut self, pseudo: &str) -> Option<&mut Member> {
        self.membres
            .iter_mut()
            .find(|m| m.pseudo.get().map(String::as_str) == Some(pseudo))
    }
}
