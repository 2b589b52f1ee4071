//! The club service: one in-memory [`Store`] plus its persistence.
//!
//! Every mutation follows the same cycle: apply the change to the in-memory
//! document, save the whole document, push it to the remote, then report the
//! outcome. Save and push failures are reported but never roll back the
//! change; the in-memory document stays authoritative for the process.

use crate::auth::{self, AuthError, RegistrationError, Session};
use crate::db::PersistentStore;
use crate::ludotheque::{self, CatalogError, GameQuery, ValidationError};
use crate::models::{
    CatalogEntry, Game, GameFields, Member, OwnerCount, RegisterRequest, Store,
};
use crate::notify::{NotificationKind, Notifier};
use crate::sync::RemoteSync;

pub struct Club {
    persistence: PersistentStore,
    remote: Box<dyn RemoteSync>,
    store: Store,
}

impl Club {
    /// Load the persisted document and start serving from it.
    pub fn open(persistence: PersistentStore, remote: Box<dyn RemoteSync>) -> Self {
        let store = persistence.load();
        tracing::info!(
            "Loaded {:?}: {} members, {} games, lastGameId {}",
            persistence.key(),
            store.membres.len(),
            store.ludotheque.len(),
            store.settings.last_game_id()
        );
        Self {
            persistence,
            remote,
            store,
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    // ==================== MEMBERS ====================

    pub fn register(
        &mut self,
        request: &RegisterRequest,
        notifier: &mut dyn Notifier,
    ) -> Result<Member, RegistrationError> {
        match auth::register(&mut self.store, request) {
            Ok(member) => {
                self.commit(notifier);
                notifier.notify(NotificationKind::Success, "Inscription réussie !");
                Ok(member)
            }
            Err(e) => {
                notifier.notify(NotificationKind::Error, &e.to_string());
                Err(e)
            }
        }
    }

    pub fn login(
        &self,
        pseudo: &str,
        password: &str,
        notifier: &mut dyn Notifier,
    ) -> Result<Session, AuthError> {
        match auth::login(&self.store, pseudo, password) {
            Ok(session) => {
                tracing::info!("Member {} logged in", session.pseudo);
                Ok(session)
            }
            Err(e) => {
                tracing::info!("Failed login for {}", pseudo);
                notifier.notify(NotificationKind::Error, &e.to_string());
                Err(e)
            }
        }
    }

    pub fn grant_admin(
        &mut self,
        pseudo: &str,
        notifier: &mut dyn Notifier,
    ) -> Result<Member, AuthError> {
        match auth::grant_admin(&mut self.store, pseudo) {
            Ok(member) => {
                self.commit(notifier);
                notifier.notify(
                    NotificationKind::Success,
                    &format!("{} est maintenant administrateur", member.pseudo()),
                );
                Ok(member)
            }
            Err(e) => {
                notifier.notify(NotificationKind::Error, &e.to_string());
                Err(e)
            }
        }
    }

    pub fn validate_member(
        &mut self,
        pseudo: &str,
        notifier: &mut dyn Notifier,
    ) -> Result<Member, AuthError> {
        match auth::validate_member(&mut self.store, pseudo) {
            Ok(member) => {
                self.commit(notifier);
                notifier.notify(NotificationKind::Success, "Compte validé !");
                Ok(member)
            }
            Err(e) => {
                notifier.notify(NotificationKind::Error, &e.to_string());
                Err(e)
            }
        }
    }

    pub fn remove_member(
        &mut self,
        pseudo: &str,
        notifier: &mut dyn Notifier,
    ) -> Result<Member, AuthError> {
        match auth::remove_member(&mut self.store, pseudo) {
            Ok(member) => {
                self.commit(notifier);
                notifier.notify(NotificationKind::Success, "Membre supprimé");
                Ok(member)
            }
            Err(e) => {
                notifier.notify(NotificationKind::Error, &e.to_string());
                Err(e)
            }
        }
    }

    pub fn members(&self) -> &[Member] {
        &self.store.membres
    }

    // ==================== LUDOTHEQUE ====================

    pub fn add_game(
        &mut self,
        fields: &GameFields,
        notifier: &mut dyn Notifier,
    ) -> Result<Game, ValidationError> {
        match ludotheque::add_game(&mut self.store, fields) {
            Ok(game) => {
                self.commit(notifier);
                notifier.notify(NotificationKind::Success, "Jeu enregistré avec succès !");
                Ok(game)
            }
            Err(e) => {
                notifier.notify(NotificationKind::Error, &e.to_string());
                Err(e)
            }
        }
    }

    pub fn update_game(
        &mut self,
        id: u64,
        fields: &GameFields,
        notifier: &mut dyn Notifier,
    ) -> Result<Game, CatalogError> {
        match ludotheque::update_game(&mut self.store, id, fields) {
            Ok(game) => {
                self.commit(notifier);
                notifier.notify(NotificationKind::Success, "Jeu modifié avec succès !");
                Ok(game)
            }
            Err(e) => {
                notifier.notify(NotificationKind::Error, &e.to_string());
                Err(e)
            }
        }
    }

    pub fn delete_game(
        &mut self,
        id: u64,
        notifier: &mut dyn Notifier,
    ) -> Result<Game, CatalogError> {
        match ludotheque::delete_game(&mut self.store, id) {
            Ok(game) => {
                self.commit(notifier);
                notifier.notify(NotificationKind::Success, "Jeu supprimé");
                Ok(game)
            }
            Err(e) => {
                notifier.notify(NotificationKind::Error, &e.to_string());
                Err(e)
            }
        }
    }

    pub fn list_games(&self, query: &GameQuery) -> Vec<CatalogEntry> {
        ludotheque::list_games(&self.store.ludotheque, query)
    }

    pub fn get_game(&self, id: u64) -> Option<&Game> {
        self.store.find_game(id)
    }

    pub fn owners(&self) -> Vec<OwnerCount> {
        ludotheque::owners(&self.store.ludotheque)
    }

    /// Save the whole document and push it to the remote.
    fn commit(&mut self, notifier: &mut dyn Notifier) {
        if let Err(e) = self.persistence.save(&self.store) {
            tracing::warn!("Persisting {:?} failed: {}", self.persistence.key(), e);
            notifier.notify(
                NotificationKind::Warning,
                &format!("Sauvegarde locale impossible: {}", e),
            );
        }

        if let Err(e) = self.remote.push(&self.store) {
            tracing::warn!("Remote sync failed: {}", e);
            notifier.notify(NotificationKind::Error, &format!("Erreur réseau: {}", e));
        }
    }
}
