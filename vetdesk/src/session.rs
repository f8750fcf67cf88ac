//! Session store: the single owner of the authenticated identity.
//!
//! Constructed once per process with [`SessionStore::restore`] and torn down
//! with [`SessionStore::logout`]. Views receive it by reference.

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::core::routes::{Route, resolve};
use crate::core::session::{Session, TOKEN_KEY, USER_KEY};
use crate::core::types::AuthResponse;
use crate::io::session_storage::SessionStorage;

pub struct SessionStore<S: SessionStorage> {
    storage: S,
    current: Option<Session>,
}

impl<S: SessionStorage> SessionStore<S> {
    /// Read the persisted session. Never fails: unreadable or corrupted state
    /// is cleared and the store starts logged out.
    pub fn restore(storage: S) -> Self {
        let mut store = Self {
            storage,
            current: None,
        };
        match store.read_persisted() {
            Ok(Some(session)) => {
                debug!(username = session.username(), "session restored");
                store.current = Some(session);
            }
            Ok(None) => debug!("no persisted session"),
            Err(err) => {
                warn!(error = %format!("{:#}", err), "discarding persisted session");
                store.clear_persisted();
            }
        }
        store
    }

    fn read_persisted(&self) -> Result<Option<Session>> {
        let token = self.storage.get(TOKEN_KEY)?;
        let user = self.storage.get(USER_KEY)?;
        match (token, user) {
            (Some(token), Some(user)) => Session::decode(&token, &user).map(Some),
            _ => Ok(None),
        }
    }

    fn clear_persisted(&mut self) {
        for key in [TOKEN_KEY, USER_KEY] {
            if let Err(err) = self.storage.remove(key) {
                warn!(key, error = %format!("{:#}", err), "failed to clear session key");
            }
        }
    }

    /// Persist a fresh session from a successful login or registration.
    ///
    /// On a storage failure the store ends logged out with nothing persisted.
    pub fn login(&mut self, auth: AuthResponse) -> Result<&Session> {
        let session = Session::from_auth(auth);
        let entries = session.encode()?;
        for (key, value) in &entries {
            if let Err(err) = self.storage.set(key, value) {
                self.clear_persisted();
                self.current = None;
                return Err(err);
            }
        }
        info!(username = session.username(), "logged in");
        Ok(self.current.insert(session))
    }

    /// Drop the session and its persisted state unconditionally.
    pub fn logout(&mut self) {
        self.clear_persisted();
        if self.current.take().is_some() {
            info!("logged out");
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }

    pub fn current(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    /// Route to show for `requested` given the current authentication state.
    pub fn gate(&self, requested: Route) -> Route {
        resolve(requested, self.is_authenticated())
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::UserIdentity;
    use crate::io::session_storage::{FileSessionStorage, MemorySessionStorage};

    fn auth(token: &str, username: &str) -> AuthResponse {
        AuthResponse {
            token: token.to_string(),
            user: UserIdentity {
                username: Some(username.to_string()),
                role: Some("VET".to_string()),
                ..UserIdentity::default()
            },
        }
    }

    #[test]
    fn restore_with_corrupted_user_starts_logged_out_and_clears() {
        let storage =
            MemorySessionStorage::with_entries([(TOKEN_KEY, "jwt"), (USER_KEY, "{broken")]);
        let store = SessionStore::restore(storage);
        assert!(!store.is_authenticated());
        assert!(store.storage().is_empty());
        assert_eq!(store.gate(Route::SearchPets), Route::Login);
    }

    #[test]
    fn restore_with_partial_state_keeps_it() {
        let storage = MemorySessionStorage::with_entries([(TOKEN_KEY, "jwt")]);
        let store = SessionStore::restore(storage);
        assert!(!store.is_authenticated());
        assert!(!store.storage().is_empty());
    }

    #[test]
    fn login_persists_and_survives_restart() {
        let temp = tempfile::tempdir().expect("tempdir");
        let dir = temp.path().join("session");

        let mut store = SessionStore::restore(FileSessionStorage::new(&dir));
        assert!(!store.is_authenticated());
        let session = store.login(auth("jwt-1", "vet1")).expect("login");
        assert_eq!(session.token, "jwt-1");
        assert_eq!(store.gate(Route::Root), Route::Home);

        let restored = SessionStore::restore(FileSessionStorage::new(&dir));
        let session = restored.current().expect("restored session");
        assert_eq!(session.username(), "vet1");
        assert_eq!(session.role(), Some("VET"));
    }

    #[test]
    fn logout_clears_everything() {
        let mut store = SessionStore::restore(MemorySessionStorage::default());
        store.login(auth("jwt", "ana")).expect("login");
        store.logout();
        assert!(!store.is_authenticated());
        assert!(store.storage().is_empty());
        store.logout();
    }
}
