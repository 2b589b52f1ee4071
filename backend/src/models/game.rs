//! Game model matching the stored ludotheque entries.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::Stored;

/// A lendable game in the club catalog.
///
/// The web client writes `parseInt` results straight into the document, so
/// numeric fields may hold `null`. They read as 0 and are written back
/// untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Game {
    #[serde(default, skip_serializing_if = "Stored::is_absent")]
    pub id: Stored<u64>,
    #[serde(default, skip_serializing_if = "Stored::is_absent")]
    pub nom: Stored<String>,
    #[serde(default, skip_serializing_if = "Stored::is_absent")]
    pub proprietaire: Stored<String>,
    #[serde(default, skip_serializing_if = "Stored::is_absent")]
    pub min_joueurs: Stored<u32>,
    #[serde(default, skip_serializing_if = "Stored::is_absent")]
    pub max_joueurs: Stored<u32>,
    /// Play time in minutes
    #[serde(default, skip_serializing_if = "Stored::is_absent")]
    pub duree: Stored<u32>,
    #[serde(default, skip_serializing_if = "Stored::is_absent")]
    pub age_min: Stored<u32>,
    #[serde(default, skip_serializing_if = "Stored::is_absent")]
    pub description: Stored<String>,
    #[serde(default, skip_serializing_if = "Stored::is_absent")]
    pub est_extension: Stored<bool>,
    /// Id of the base game this extension is attached to
    #[serde(default, skip_serializing_if = "Stored::is_absent")]
    pub jeu_de_base: Stored<Option<u64>>,
    /// Client-side fields (images, categories, BGG data) kept as-is
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Game {
    pub fn id(&self) -> u64 {
        self.id.or_zero()
    }

    pub fn nom(&self) -> &str {
        self.nom.as_str()
    }

    pub fn proprietaire(&self) -> &str {
        self.proprietaire.as_str()
    }

    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    pub fn min_joueurs(&self) -> u32 {
        self.min_joueurs.or_zero()
    }

    pub fn max_joueurs(&self) -> u32 {
        self.max_joueurs.or_zero()
    }

    pub fn duree(&self) -> u32 {
        self.duree.or_zero()
    }

    pub fn age_min(&self) -> u32 {
        self.age_min.or_zero()
    }

    pub fn base_game(&self) -> Option<u64> {
        self.jeu_de_base.get().copied().flatten()
    }

    /// An extension hidden behind its base game in catalog listings.
    pub fn is_attached_extension(&self) -> bool {
        self.est_extension.get() == Some(&true) && self.base_game().is_some()
    }
}

/// Editable game fields, as submitted by the game form.
///
/// Numbers are signed so out-of-range input reaches validation instead of
/// failing deserialization.
#[derive(Debug, Clone, Deserialize)]
pub struct GameFields {
    pub nom: String,
    #[serde(default)]
    pub proprietaire: String,
    pub min_joueurs: i64,
    pub max_joueurs: i64,
    pub duree: i64,
    #[serde(default)]
    pub age_min: i64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub jeu_de_base: Option<u64>,
}

/// Values of a base game folded over its attached extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GameTotals {
    /// Fewest players over the game and its extensions
    pub min_joueurs: u32,
    /// Most players over the game and its extensions
    pub max_joueurs: u32,
    /// Longest play time
    pub duree: u32,
    /// Lowest minimum age
    pub age_min: u32,
    pub nb_extensions: usize,
}

/// One row of the catalog listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogEntry {
    #[serde(flatten)]
    pub game: Game,
    /// Values the duration filter and the ordering were computed on
    pub avec_extensions: GameTotals,
}

/// Query string of the catalog listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListGamesParams {
    /// Duration selector: `all`, `60` (at most 60 min) or `240+` (over 240 min)
    #[serde(default)]
    pub duree: Option<String>,
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub proprietaire: Option<String>,
}

/// Number of catalog games an owner brought.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OwnerCount {
    pub proprietaire: String,
    pub jeux: usize,
}
