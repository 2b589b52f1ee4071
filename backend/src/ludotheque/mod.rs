//! Game catalog engine: creation, edits, and the filtered display order.
//!
//! Listing is a pure read over the catalog. Mutations take the [`Store`]
//! mutably and leave it untouched when they fail.

use std::collections::BTreeMap;
use std::str::FromStr;

use crate::models::{
    CatalogEntry, Game, GameFields, GameTotals, ListGamesParams, OwnerCount, Store, Stored,
};

/// Duration predicate of the catalog listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationFilter {
    /// Keep games lasting at most this many minutes (inclusive)
    AtMost(u32),
    /// Keep games lasting strictly longer than this many minutes
    LongerThan(u32),
}

impl DurationFilter {
    pub fn matches(&self, minutes: u32) -> bool {
        match *self {
            DurationFilter::AtMost(limit) => minutes <= limit,
            DurationFilter::LongerThan(limit) => minutes > limit,
        }
    }

    /// Parse a duration selector; `all` (or blank) means no filter.
    pub fn parse_selector(selector: &str) -> Result<Option<Self>, ValidationError> {
        let selector = selector.trim();
        if selector.is_empty() || selector.eq_ignore_ascii_case("all") {
            return Ok(None);
        }
        selector.parse().map(Some)
    }
}

impl FromStr for DurationFilter {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidDurationSelector(s.to_string());
        match s.strip_suffix('+') {
            Some(limit) => limit
                .parse()
                .map(DurationFilter::LongerThan)
                .map_err(|_| invalid()),
            None => s.parse().map(DurationFilter::AtMost).map_err(|_| invalid()),
        }
    }
}

/// Catalog listing criteria; every criterion is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameQuery {
    pub duration: Option<DurationFilter>,
    /// Case-insensitive match on name, owner or description
    pub search: Option<String>,
    /// Exact owner
    pub owner: Option<String>,
}

impl GameQuery {
    pub fn with_duration(filter: DurationFilter) -> Self {
        Self {
            duration: Some(filter),
            ..Self::default()
        }
    }
}

impl TryFrom<ListGamesParams> for GameQuery {
    type Error = ValidationError;

    fn try_from(params: ListGamesParams) -> Result<Self, Self::Error> {
        let duration = match params.duree.as_deref() {
            Some(selector) => DurationFilter::parse_selector(selector)?,
            None => None,
        };
        Ok(Self {
            duration,
            search: params.q.filter(|q| !q.trim().is_empty()),
            owner: params.proprietaire.filter(|o| !o.is_empty()),
        })
    }
}

/// Rejected game input. Each variant names one offending field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    EmptyName,
    MinPlayersBelowOne(i64),
    MaxPlayersBelowMin { min: i64, max: i64 },
    NegativeDuration(i64),
    NegativeMinAge(i64),
    OutOfRange { field: &'static str, value: i64 },
    UnknownBaseGame(u64),
    InvalidDurationSelector(String),
}

impl ValidationError {
    /// Name of the offending field, as it appears in the game JSON.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::EmptyName => "nom",
            ValidationError::MinPlayersBelowOne(_) => "min_joueurs",
            ValidationError::MaxPlayersBelowMin { .. } => "max_joueurs",
            ValidationError::NegativeDuration(_) => "duree",
            ValidationError::NegativeMinAge(_) => "age_min",
            ValidationError::OutOfRange { field, .. } => field,
            ValidationError::UnknownBaseGame(_) => "jeu_de_base",
            ValidationError::InvalidDurationSelector(_) => "duree",
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::EmptyName => write!(f, "Le nom du jeu est obligatoire"),
            ValidationError::MinPlayersBelowOne(n) => {
                write!(f, "Il faut au moins 1 joueur (reçu {})", n)
            }
            ValidationError::MaxPlayersBelowMin { min, max } => write!(
                f,
                "Le nombre maximum de joueurs ({}) est inférieur au minimum ({})",
                max, min
            ),
            ValidationError::NegativeDuration(n) => write!(f, "Durée négative: {}", n),
            ValidationError::NegativeMinAge(n) => write!(f, "Âge minimum négatif: {}", n),
            ValidationError::OutOfRange { field, value } => {
                write!(f, "Valeur hors limites pour {}: {}", field, value)
            }
            ValidationError::UnknownBaseGame(id) => write!(f, "Jeu de base {} introuvable", id),
            ValidationError::InvalidDurationSelector(s) => {
                write!(f, "Filtre de durée invalide: {}", s)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Failure of a catalog mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    Validation(ValidationError),
    NotFound(u64),
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::Validation(e) => write!(f, "{}", e),
            CatalogError::NotFound(id) => write!(f, "Jeu {} introuvable", id),
        }
    }
}

impl std::error::Error for CatalogError {}

impl From<ValidationError> for CatalogError {
    fn from(err: ValidationError) -> Self {
        CatalogError::Validation(err)
    }
}

/// Field values that passed validation.
struct ValidFields {
    min_joueurs: u32,
    max_joueurs: u32,
    duree: u32,
    age_min: u32,
}

fn to_u32(field: &'static str, value: i64) -> Result<u32, ValidationError> {
    u32::try_from(value).map_err(|_| ValidationError::OutOfRange { field, value })
}

fn validate(fields: &GameFields) -> Result<ValidFields, ValidationError> {
    if fields.nom.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if fields.min_joueurs < 1 {
        return Err(ValidationError::MinPlayersBelowOne(fields.min_joueurs));
    }
    if fields.max_joueurs < fields.min_joueurs {
        return Err(ValidationError::MaxPlayersBelowMin {
            min: fields.min_joueurs,
            max: fields.max_joueurs,
        });
    }
    if fields.duree < 0 {
        return Err(ValidationError::NegativeDuration(fields.duree));
    }
    if fields.age_min < 0 {
        return Err(ValidationError::NegativeMinAge(fields.age_min));
    }

    Ok(ValidFields {
        min_joueurs: to_u32("min_joueurs", fields.min_joueurs)?,
        max_joueurs: to_u32("max_joueurs", fields.max_joueurs)?,
        duree: to_u32("duree", fields.duree)?,
        age_min: to_u32("age_min", fields.age_min)?,
    })
}

/// A base game must exist, differ from `own_id` and not be an extension itself.
fn check_base_game(
    store: &Store,
    base: Option<u64>,
    own_id: Option<u64>,
) -> Result<(), ValidationError> {
    let Some(base_id) = base else {
        return Ok(());
    };
    match store.find_game(base_id) {
        Some(base) if Some(base.id()) != own_id && !base.is_attached_extension() => Ok(()),
        _ => Err(ValidationError::UnknownBaseGame(base_id)),
    }
}

/// Next game id: one past both the counter and every id already present.
fn next_game_id(store: &Store) -> u64 {
    let max_existing = store.ludotheque.iter().map(Game::id).max().unwrap_or(0);
    store.settings.last_game_id().max(max_existing) + 1
}

/// Validate and append a new game, bumping `lastGameId` to its id.
pub fn add_game(store: &mut Store, fields: &GameFields) -> Result<Game, ValidationError> {
    let valid = validate(fields)?;
    check_base_game(store, fields.jeu_de_base, None)?;

    let id = next_game_id(store);
    let mut game = Game {
        id: id.into(),
        nom: fields.nom.trim().to_string().into(),
        proprietaire: fields.proprietaire.trim().to_string().into(),
        min_joueurs: valid.min_joueurs.into(),
        max_joueurs: valid.max_joueurs.into(),
        duree: valid.duree.into(),
        age_min: valid.age_min.into(),
        description: fields.description.clone().into(),
        ..Game::default()
    };
    if let Some(base_id) = fields.jeu_de_base {
        game.est_extension = true.into();
        game.jeu_de_base = Some(base_id).into();
    }

    store.ludotheque.push(game.clone());
    store.settings.last_game_id = id.into();

    tracing::info!("Added game {} ({}) lasting {} min", id, game.nom(), valid.duree);
    Ok(game)
}

/// Clear the extension link of `game`, leaving absent fields absent.
fn detach(game: &mut Game) {
    if !game.est_extension.is_absent() {
        game.est_extension = false.into();
    }
    if !game.jeu_de_base.is_absent() {
        game.jeu_de_base = Stored::Valid(None);
    }
}

/// Replace the editable fields of an existing game.
pub fn update_game(store: &mut Store, id: u64, fields: &GameFields) -> Result<Game, CatalogError> {
    if store.find_game(id).is_none() {
        return Err(CatalogError::NotFound(id));
    }
    let valid = validate(fields)?;
    check_base_game(store, fields.jeu_de_base, Some(id))?;
    if let Some(base_id) = fields.jeu_de_base {
        // A game carrying extensions cannot itself become one
        if store.ludotheque.iter().any(|g| g.base_game() == Some(id)) {
            return Err(ValidationError::UnknownBaseGame(base_id).into());
        }
    }

    let game = store
        .ludotheque
        .iter_mut()
        .find(|g| g.id() == id)
        .ok_or(CatalogError::NotFound(id))?;

    game.nom = fields.nom.trim().to_string().into();
    game.proprietaire = fields.proprietaire.trim().to_string().into();
    game.min_joueurs = valid.min_joueurs.into();
    game.max_joueurs = valid.max_joueurs.into();
    game.duree = valid.duree.into();
    game.age_min = valid.age_min.into();
    game.description = fields.description.clone().into();
    match fields.jeu_de_base {
        Some(base_id) => {
            game.est_extension = true.into();
            game.jeu_de_base = Some(base_id).into();
        }
        None => detach(game),
    }

    tracing::info!("Updated game {}", id);
    Ok(game.clone())
}

/// Remove a game. Its extensions stay in the catalog as standalone games.
pub fn delete_game(store: &mut Store, id: u64) -> Result<Game, CatalogError> {
    let index = store
        .ludotheque
        .iter()
        .position(|g| g.id() == id)
        .ok_or(CatalogError::NotFound(id))?;

    let removed = store.ludotheque.remove(index);
    for game in store
        .ludotheque
        .iter_mut()
        .filter(|g| g.base_game() == Some(id))
    {
        detach(game);
    }

    tracing::info!("Deleted game {} ({})", id, removed.nom());
    Ok(removed)
}

/// Values of `game` folded over its attached extensions: the widest player
/// range, the longest duration and the lowest minimum age.
pub fn totals(catalog: &[Game], game: &Game) -> GameTotals {
    let start = GameTotals {
        min_joueurs: game.min_joueurs(),
        max_joueurs: game.max_joueurs(),
        duree: game.duree(),
        age_min: game.age_min(),
        nb_extensions: 0,
    };
    catalog
        .iter()
        .filter(|g| g.is_attached_extension() && g.base_game() == Some(game.id()))
        .fold(start, |acc, ext| GameTotals {
            min_joueurs: acc.min_joueurs.min(ext.min_joueurs()),
            max_joueurs: acc.max_joueurs.max(ext.max_joueurs()),
            duree: acc.duree.max(ext.duree()),
            age_min: acc.age_min.min(ext.age_min()),
            nb_extensions: acc.nb_extensions + 1,
        })
}

fn matches_search(game: &Game, needle: &str) -> bool {
    let needle = needle.to_lowercase();
    game.nom().to_lowercase().contains(&needle)
        || game.proprietaire().to_lowercase().contains(&needle)
        || game.description().to_lowercase().contains(&needle)
}

/// Games matching `query`, longest first.
///
/// Attached extensions are folded into their base game; the duration filter
/// and the order use the folded duration. The sort is stable, so games of
/// equal duration keep their catalog order.
pub fn list_games(catalog: &[Game], query: &GameQuery) -> Vec<CatalogEntry> {
    let mut listed: Vec<(GameTotals, &Game)> = catalog
        .iter()
        .filter(|game| !game.is_attached_extension())
        .map(|game| (totals(catalog, game), game))
        .filter(|(totals, _)| query.duration.map_or(true, |f| f.matches(totals.duree)))
        .filter(|(_, game)| {
            query
                .search
                .as_deref()
                .map_or(true, |needle| matches_search(game, needle))
        })
        .filter(|(_, game)| {
            query
                .owner
                .as_deref()
                .map_or(true, |owner| game.proprietaire() == owner)
        })
        .collect();

    listed.sort_by(|a, b| b.0.duree.cmp(&a.0.duree));
    listed
        .into_iter()
        .map(|(avec_extensions, game)| CatalogEntry {
            game: game.clone(),
            avec_extensions,
        })
        .collect()
}

/// Owners with the number of catalog games they brought, by owner name.
pub fn owners(catalog: &[Game]) -> Vec<OwnerCount> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for game in catalog.iter().filter(|g| !g.is_attached_extension()) {
        *counts.entry(game.proprietaire()).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(proprietaire, jeux)| OwnerCount {
            proprietaire: proprietaire.to_string(),
            jeux,
        })
        .collect()
}
