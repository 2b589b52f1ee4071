//! Whole-document persistence of the [`Store`].
//!
//! Every save rewrites the complete document; there is no field-level merge.

use super::Storage;
use crate::models::Store;

/// Storage key used by the web client.
pub const DEFAULT_STORAGE_KEY: &str = "gdjData";

/// Failure to write the document.
#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Serialize(serde_json::Error),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "storage write failed: {}", e),
            StoreError::Serialize(e) => write!(f, "document serialization failed: {}", e),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io(err)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialize(err)
    }
}

/// The JSON document stored under one key of a [`Storage`] backend.
pub struct PersistentStore {
    storage: Box<dyn Storage>,
    key: String,
}

impl PersistentStore {
    pub fn new(storage: Box<dyn Storage>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Load the saved document.
    ///
    /// A missing, unreadable or unparseable value yields an empty store; the
    /// caller never sees the difference.
    pub fn load(&self) -> Store {
        let raw = match self.storage.read(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::debug!("No saved document under {:?}, starting empty", self.key);
                return Store::default();
            }
            Err(e) => {
                tracing::warn!("Failed to read {:?}: {}, starting empty", self.key, e);
                return Store::default();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(store) => store,
            Err(e) => {
                tracing::warn!("Saved document {:?} is not valid: {}, starting empty", self.key, e);
                Store::default()
            }
        }
    }

    /// Serialize and write the entire document.
    pub fn save(&mut self, store: &Store) -> Result<(), StoreError> {
        let raw = serde_json::to_string(store)?;
        self.storage.write(&self.key, &raw)?;
        tracing::debug!("Saved document {:?} ({} bytes)", self.key, raw.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth;
    use crate::db::{FileStorage, MemoryStorage};
    use crate::models::RegisterRequest;
    use serde_json::{json, Value};
    use tempfile::TempDir;

    fn memory_store() -> PersistentStore {
        PersistentStore::new(Box::new(MemoryStorage::new()), DEFAULT_STORAGE_KEY)
    }

    fn sample_store() -> Store {
        serde_json::from_value(json!({
            "produits": [{ "id": 1, "nom": "Café" }],
            "membres": [{
                "id": 1,
                "pseudo": "alice",
                "nom": "Martin",
                "prenom": "Alice",
                "email": null,
                "mot_de_passe": "pw",
                "role": "admin",
                "statut": "valide",
                "date_inscription": "2025-01-01T00:00:00+00:00"
            }],
            "ludotheque": [{
                "id": 1,
                "nom": "Carcassonne",
                "proprietaire": "club",
                "min_joueurs": 2,
                "max_joueurs": 5,
                "duree": 35,
                "age_min": 7,
                "description": ""
            }],
            "settings": { "lastGameId": 1, "lastMembreId": 1 }
        }))
        .unwrap()
    }

    fn persistent_with(raw: &Value) -> PersistentStore {
        let mut storage = MemoryStorage::new();
        storage.write(DEFAULT_STORAGE_KEY, &raw.to_string()).unwrap();
        PersistentStore::new(Box::new(storage), DEFAULT_STORAGE_KEY)
    }

    fn saved_document(persistent: &PersistentStore) -> Value {
        let raw = persistent.storage.read(DEFAULT_STORAGE_KEY).unwrap().unwrap();
        serde_json::from_str(&raw).unwrap()
    }

    #[test]
    fn test_load_without_saved_document() {
        let store = memory_store().load();
        assert_eq!(store, Store::default());
        assert_eq!(store.settings.last_game_id(), 0);
    }

    #[test]
    fn test_load_corrupt_document_falls_back_to_empty() {
        let mut storage = MemoryStorage::new();
        storage.write(DEFAULT_STORAGE_KEY, "{not json").unwrap();
        let persistent = PersistentStore::new(Box::new(storage), DEFAULT_STORAGE_KEY);

        assert_eq!(persistent.load(), Store::default());
    }

    #[test]
    fn test_save_then_load_reproduces_store() {
        let mut persistent = memory_store();
        let store = sample_store();

        persistent.save(&store).unwrap();
        assert_eq!(persistent.load(), store);
    }

    #[test]
    fn test_save_of_load_keeps_stored_content() {
        let raw = json!({
            "produits": [],
            "membres": [
                { "mot_de_passe": "pw", "pseudo": "alice" },
                { "id": 2, "pseudo": "bob", "mot_de_passe": "pw", "email": null,
                  "role": "membre", "statut": "en_attente", "ardoise": 0 }
            ],
            "transactions": [],
            "ludotheque": [
                {"id": 1001, "nom": "Game 50min", "proprietaire": "Test", "min_joueurs": 1,
                 "max_joueurs": 2, "duree": 50, "age_min": 8, "description": ""},
                {"id": 1002, "nom": "Saisie vide", "min_joueurs": null, "max_joueurs": null,
                 "duree": null, "est_extension": false, "jeu_de_base": null, "image": "x.png"}
            ],
            "adhesions": [],
            "evenements": [],
            "annonces": [],
            "reapprovisionnements": [],
            "settings": { "lastGameId": 1004 }
        });
        let mut persistent = persistent_with(&raw);

        let loaded = persistent.load();
        assert_eq!(loaded.ludotheque.len(), 2);
        assert_eq!(loaded.membres.len(), 2);
        persistent.save(&loaded).unwrap();

        assert_eq!(saved_document(&persistent), raw);
    }

    #[test]
    fn test_blank_game_fields_do_not_erase_the_document() {
        let raw = json!({
            "membres": [
                { "id": 1, "pseudo": "admin", "mot_de_passe": "pw", "role": "admin", "statut": "valide" }
            ],
            "ludotheque": [
                { "id": 1, "nom": "Azul", "min_joueurs": 2, "max_joueurs": 4, "duree": 45 },
                { "id": 2, "nom": "Sans durée", "min_joueurs": 2, "max_joueurs": 4, "duree": null }
            ],
            "settings": { "lastGameId": 2, "lastMembreId": 1 }
        });
        let mut persistent = persistent_with(&raw);

        let mut store = persistent.load();
        assert_eq!(store.ludotheque.len(), 2);
        assert_eq!(store.membres.len(), 1);

        let request = RegisterRequest {
            pseudo: "bob".to_string(),
            nom: String::new(),
            prenom: String::new(),
            email: None,
            mot_de_passe: "pw".to_string(),
            mot_de_passe_confirm: "pw".to_string(),
        };
        auth::register(&mut store, &request).unwrap();
        persistent.save(&store).unwrap();

        let saved = saved_document(&persistent);
        assert_eq!(saved["ludotheque"], raw["ludotheque"]);
        assert_eq!(saved["membres"][0], raw["membres"][0]);
        assert_eq!(saved["membres"][1]["pseudo"], "bob");
        assert_eq!(saved["membres"][1]["id"], 2);
    }

    #[test]
    fn test_file_backed_document_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let store = sample_store();

        {
            let storage = FileStorage::open(temp_dir.path()).unwrap();
            let mut persistent = PersistentStore::new(Box::new(storage), "club");
            persistent.save(&store).unwrap();
        }

        let storage = FileStorage::open(temp_dir.path()).unwrap();
        let persistent = PersistentStore::new(Box::new(storage), "club");
        assert_eq!(persistent.load(), store);
        assert_eq!(persistent.key(), "club");
    }
}
